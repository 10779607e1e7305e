//! Mixcut Recording Engine
//!
//! Combines a screen-capture stream with an optional camera overlay and
//! one or more audio sources into a single output for the encoding
//! pipeline. The compositor runs its own cooperative tick loop with two
//! independent rate caps:
//!
//! ```text
//!   screen source  --30fps-->  +--------------------+
//!                              | RecordingCompositor |--> output frame
//!   camera source  --15fps-->  |  (cached overlay)   |
//!                              +--------------------+
//!   mics ----------> AudioMixer ----------------------> output samples
//! ```
//!
//! Compositing only engages when screen and camera are requested
//! together; single-source recordings pass their stream through
//! untouched. The camera rate is deliberately far below the screen rate
//! to keep constrained capture drivers from exhausting their buffer
//! pools.

pub mod capture;
pub mod compositor;
pub mod mixer;
pub mod overlay;
pub mod session;

pub use capture::{
    AudioSource, CaptureOpener, DeviceInfo, DeviceKind, FrameSource, ScreenTarget,
    SyntheticAudioSource, SyntheticFrameSource, SyntheticOpener,
};
pub use compositor::RecordingCompositor;
pub use mixer::mix_or_passthrough;
pub use overlay::{CameraOverlay, OverlayCell, ViewportMapping};
pub use session::{RecordingConfig, RecordingSession, SessionState};
