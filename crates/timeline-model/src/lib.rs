//! Mixcut Timeline Model
//!
//! Core data model for the editing timeline: tracks, clips, media assets,
//! and the playhead. The compositor crates never touch a concrete store
//! directly; they read and mutate the timeline through the
//! [`store::TimelineStore`] seam so tests can inject fake data.

pub mod clip;
pub mod store;
pub mod track;

pub use clip::*;
pub use store::*;
pub use track::*;
