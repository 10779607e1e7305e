//! Mixcut Common Utilities
//!
//! Shared infrastructure for all Mixcut crates:
//! - Error types and result aliases
//! - Tick-rate gates and watchdog timers for cooperative render loops
//! - Tracing/logging initialization
//! - Persisted editor preferences

pub mod config;
pub mod error;
pub mod logging;
pub mod tick;

pub use config::*;
pub use error::*;
pub use tick::*;
