//! Mixcut Interaction Engine
//!
//! Translates pointer input over the preview canvas into timeline store
//! updates: hit-testing positioned clips (handles before bodies, topmost
//! first), running move/resize/rotate drag sessions, and coalescing drag
//! traffic to one store write per frame.

pub mod coords;
pub mod drag;
pub mod hit;

pub use coords::*;
pub use drag::*;
pub use hit::*;
