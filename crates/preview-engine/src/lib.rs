//! Mixcut Preview Engine
//!
//! Real-time compositing and synchronization for the timeline preview.
//! Each cooperative tick samples whichever clips are active at the moving
//! playhead, keeps one playback handle per clip phase-locked to it, and
//! draws the result onto a shared output surface.
//!
//! # Tick Architecture
//!
//! ```text
//! timeline store ──▶ Clip Resolver ──▶ active clips
//!        │                                  │
//!        │          Media Element Pool ◀────┤ (handles per clip id)
//!        │                 │                │
//!        │                 ▼                ▼
//!        │          Playback Synchronizer (seek/rate/volume/pause)
//!        │                                  │
//!        └──▶ Render Loop Controller ──────▶│ render? / idle-skip
//!                                           ▼
//!                                    Frame Compositor
//!                                           │
//!                                           ▼
//!                                    output surface
//! ```
//!
//! A tick fully completes its draw and all synchronizer side effects
//! before the next tick is scheduled; there are no overlapping ticks.

pub mod compositor;
pub mod engine;
pub mod loop_ctrl;
pub mod pool;
pub mod resolver;
pub mod source;
pub mod sync;

pub use engine::PreviewEngine;
pub use resolver::{active_clips, ActiveClip};
