pub mod check;
pub mod config;
pub mod inspect;
pub mod record;
pub mod render;
pub mod resolve;
