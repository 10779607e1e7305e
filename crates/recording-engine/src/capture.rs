//! Capture-stream seams and synthetic sources.
//!
//! Real device plumbing lives outside this crate; the engine only sees
//! [`FrameSource`] and [`AudioSource`] streams handed out by a
//! [`CaptureOpener`]. The synthetic implementations at the bottom back
//! the test suite and the CLI demo.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use mixcut_common::{MixcutError, MixcutResult};

/// What part of the screen to capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenTarget {
    /// The full desktop.
    Full,
    /// A specific shareable source (window, monitor) by id.
    Source(String),
}

/// Kind of capture device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Camera,
    Microphone,
    Screen,
}

/// An enumerable capture device.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub id: String,
    pub label: String,
    pub kind: DeviceKind,
}

/// A live video-frame stream (screen or camera).
pub trait FrameSource: Send {
    /// Human-readable stream label for logs.
    fn label(&self) -> &str;

    /// Native resolution of the stream.
    fn resolution(&self) -> (u32, u32);

    /// Grab the current frame. `None` while the device is still warming
    /// up or after the stream stopped.
    fn grab_frame(&mut self) -> Option<Arc<RgbaImage>>;

    /// Stop the stream and release the device.
    fn stop(&mut self);
}

/// A live audio-sample stream. Samples are mono `f32` in `[-1, 1]`.
pub trait AudioSource: Send {
    fn label(&self) -> &str;

    /// Read up to `frames` samples. Shorter reads mean the device has
    /// nothing buffered yet.
    fn read_block(&mut self, frames: usize) -> Vec<f32>;

    fn stop(&mut self);
}

/// Opens capture devices. Device opening is the slow, failure-prone part
/// of starting a recording, so it sits behind this seam; tests and the
/// CLI plug in [`SyntheticOpener`].
pub trait CaptureOpener: Send + Sync {
    fn open_screen(
        &self,
        target: &ScreenTarget,
    ) -> impl std::future::Future<Output = MixcutResult<Box<dyn FrameSource>>> + Send;

    fn open_camera(
        &self,
        device_id: &str,
    ) -> impl std::future::Future<Output = MixcutResult<Box<dyn FrameSource>>> + Send;

    fn open_microphone(
        &self,
        device_id: &str,
    ) -> impl std::future::Future<Output = MixcutResult<Box<dyn AudioSource>>> + Send;

    fn enumerate_devices(&self) -> Vec<DeviceInfo>;
}

/// Solid-color frame stream for tests and demos.
pub struct SyntheticFrameSource {
    label: String,
    width: u32,
    height: u32,
    fill: Rgba<u8>,
    stopped: Arc<AtomicBool>,
}

impl SyntheticFrameSource {
    pub fn new(label: impl Into<String>, width: u32, height: u32, fill: Rgba<u8>) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            fill,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that flips once the stream is stopped, for asserting release
    /// behavior from outside.
    pub fn stopped_flag(&self) -> Arc<AtomicBool> {
        self.stopped.clone()
    }
}

impl FrameSource for SyntheticFrameSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn grab_frame(&mut self) -> Option<Arc<RgbaImage>> {
        if self.stopped.load(Ordering::SeqCst) {
            return None;
        }
        Some(Arc::new(RgbaImage::from_pixel(
            self.width,
            self.height,
            self.fill,
        )))
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

/// Constant-amplitude audio stream for tests and demos.
pub struct SyntheticAudioSource {
    label: String,
    amplitude: f32,
    stopped: Arc<AtomicBool>,
}

impl SyntheticAudioSource {
    pub fn new(label: impl Into<String>, amplitude: f32) -> Self {
        Self {
            label: label.into(),
            amplitude,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn stopped_flag(&self) -> Arc<AtomicBool> {
        self.stopped.clone()
    }
}

impl AudioSource for SyntheticAudioSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn read_block(&mut self, frames: usize) -> Vec<f32> {
        if self.stopped.load(Ordering::SeqCst) {
            return Vec::new();
        }
        vec![self.amplitude; frames]
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

/// Opener handing out synthetic streams, with per-device failure
/// injection so session error paths are testable.
#[derive(Default)]
pub struct SyntheticOpener {
    pub screen_size: (u32, u32),
    pub camera_size: (u32, u32),
    pub fail_screen: bool,
    pub fail_camera: bool,
    pub fail_microphone: bool,
}

impl SyntheticOpener {
    pub fn new() -> Self {
        Self {
            screen_size: (1920, 1080),
            camera_size: (640, 480),
            ..Self::default()
        }
    }
}

impl CaptureOpener for SyntheticOpener {
    async fn open_screen(&self, target: &ScreenTarget) -> MixcutResult<Box<dyn FrameSource>> {
        if self.fail_screen {
            return Err(MixcutError::capture("screen source unavailable"));
        }
        let label = match target {
            ScreenTarget::Full => "screen:full".to_string(),
            ScreenTarget::Source(id) => format!("screen:{id}"),
        };
        Ok(Box::new(SyntheticFrameSource::new(
            label,
            self.screen_size.0,
            self.screen_size.1,
            Rgba([16, 16, 16, 255]),
        )))
    }

    async fn open_camera(&self, device_id: &str) -> MixcutResult<Box<dyn FrameSource>> {
        if self.fail_camera {
            return Err(MixcutError::capture(format!(
                "camera {device_id} failed to open"
            )));
        }
        Ok(Box::new(SyntheticFrameSource::new(
            format!("camera:{device_id}"),
            self.camera_size.0,
            self.camera_size.1,
            Rgba([0, 200, 0, 255]),
        )))
    }

    async fn open_microphone(&self, device_id: &str) -> MixcutResult<Box<dyn AudioSource>> {
        if self.fail_microphone {
            return Err(MixcutError::capture(format!(
                "microphone {device_id} failed to open"
            )));
        }
        Ok(Box::new(SyntheticAudioSource::new(
            format!("mic:{device_id}"),
            0.25,
        )))
    }

    fn enumerate_devices(&self) -> Vec<DeviceInfo> {
        vec![
            DeviceInfo {
                id: "cam0".to_string(),
                label: "Synthetic Camera".to_string(),
                kind: DeviceKind::Camera,
            },
            DeviceInfo {
                id: "mic0".to_string(),
                label: "Synthetic Microphone".to_string(),
                kind: DeviceKind::Microphone,
            },
            DeviceInfo {
                id: "screen0".to_string(),
                label: "Synthetic Screen".to_string(),
                kind: DeviceKind::Screen,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_frame_source_stops() {
        let mut source = SyntheticFrameSource::new("s", 8, 8, Rgba([1, 2, 3, 255]));
        assert!(source.grab_frame().is_some());
        source.stop();
        assert!(source.grab_frame().is_none());
        assert!(source.stopped_flag().load(Ordering::SeqCst));
    }

    #[test]
    fn test_synthetic_audio_block_length() {
        let mut source = SyntheticAudioSource::new("m", 0.5);
        assert_eq!(source.read_block(128).len(), 128);
        source.stop();
        assert!(source.read_block(128).is_empty());
    }

    #[tokio::test]
    async fn test_opener_failure_injection() {
        let opener = SyntheticOpener {
            fail_camera: true,
            ..SyntheticOpener::new()
        };
        assert!(opener.open_screen(&ScreenTarget::Full).await.is_ok());
        assert!(opener.open_camera("cam0").await.is_err());
    }
}
