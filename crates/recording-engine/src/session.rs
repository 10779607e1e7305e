//! Recording session lifecycle.
//!
//! A session opens the requested capture devices, decides whether
//! compositing is needed (screen and camera together), and owns the
//! streams until stop. Device opening is the failure-prone part: any
//! open failure releases the streams the same attempt already opened
//! and surfaces one user-visible error.

use mixcut_common::{MixcutError, MixcutResult};

use crate::capture::{AudioSource, CaptureOpener, FrameSource, ScreenTarget};
use crate::compositor::{RecordingCompositor, CAMERA_FPS, SCREEN_FPS};
use crate::mixer::pull_mixed;
use crate::overlay::{CameraOverlay, OverlayCell, ViewportMapping};

/// What a recording should capture.
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Screen source, if screen capture is requested.
    pub screen: Option<ScreenTarget>,

    /// Camera device id, if camera capture is requested.
    pub camera: Option<String>,

    /// Microphone device ids.
    pub microphones: Vec<String>,

    /// Screen redraw rate when compositing.
    pub screen_fps: u32,

    /// Camera grab rate when compositing.
    pub camera_fps: u32,

    /// Audio block size pulled per mix call.
    pub audio_block_frames: usize,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            screen: Some(ScreenTarget::Full),
            camera: None,
            microphones: Vec::new(),
            screen_fps: SCREEN_FPS,
            camera_fps: CAMERA_FPS,
            audio_block_frames: 1024,
        }
    }
}

/// State of a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
    Stopped,
    /// Start failed; everything it had opened was released.
    Error,
}

/// A recording session coordinating capture streams and compositing.
pub struct RecordingSession<O: CaptureOpener> {
    config: RecordingConfig,
    opener: O,
    state: SessionState,
    screen: Option<Box<dyn FrameSource>>,
    camera: Option<Box<dyn FrameSource>>,
    audio: Vec<Box<dyn AudioSource>>,
    compositor: Option<RecordingCompositor>,
    overlay: OverlayCell,
    mapping: Option<ViewportMapping>,
}

impl<O: CaptureOpener> RecordingSession<O> {
    pub fn new(config: RecordingConfig, opener: O) -> Self {
        Self {
            config,
            opener,
            state: SessionState::Idle,
            screen: None,
            camera: None,
            audio: Vec::new(),
            compositor: None,
            overlay: OverlayCell::new(CameraOverlay::default_for(1920, 1080)),
            mapping: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether this session composites screen and camera together.
    /// Single-source recordings bypass compositing entirely.
    pub fn is_compositing(&self) -> bool {
        self.compositor.is_some()
    }

    /// Open every requested device and begin recording.
    ///
    /// Fails atomically: if any device open fails, streams opened
    /// earlier in the same attempt are released before the error is
    /// returned.
    pub async fn start(&mut self, viewport_w: f64, viewport_h: f64) -> MixcutResult<()> {
        if self.state != SessionState::Idle {
            return Err(MixcutError::capture("session already started"));
        }
        if self.config.screen.is_none() && self.config.camera.is_none() {
            return Err(MixcutError::capture("no video source requested"));
        }

        tracing::info!(
            screen = self.config.screen.is_some(),
            camera = self.config.camera.is_some(),
            microphones = self.config.microphones.len(),
            "starting recording session"
        );

        if let Err(e) = self.open_all().await {
            self.release_streams();
            self.state = SessionState::Error;
            tracing::error!(error = %e, "recording start failed, streams released");
            return Err(e);
        }

        if let (Some(screen), Some(_)) = (&self.screen, &self.camera) {
            let (capture_w, capture_h) = screen.resolution();
            self.overlay
                .set(CameraOverlay::default_for(capture_w, capture_h));
            self.mapping = Some(ViewportMapping::new(
                capture_w, capture_h, viewport_w, viewport_h,
            ));
            self.compositor = Some(RecordingCompositor::new(
                capture_w,
                capture_h,
                self.config.screen_fps,
                self.config.camera_fps,
                self.overlay.clone(),
            ));
            tracing::info!(capture_w, capture_h, "compositing screen + camera");
        }

        self.state = SessionState::Recording;
        tracing::info!("recording session started");
        Ok(())
    }

    async fn open_all(&mut self) -> MixcutResult<()> {
        if let Some(target) = self.config.screen.clone() {
            let screen = self.opener.open_screen(&target).await?;
            tracing::debug!(label = screen.label(), "screen stream opened");
            self.screen = Some(screen);
        }
        if let Some(device_id) = self.config.camera.clone() {
            let camera = self.opener.open_camera(&device_id).await?;
            tracing::debug!(label = camera.label(), "camera stream opened");
            self.camera = Some(camera);
        }
        for device_id in self.config.microphones.clone() {
            let mic = self.opener.open_microphone(&device_id).await?;
            tracing::debug!(label = mic.label(), "microphone stream opened");
            self.audio.push(mic);
        }
        Ok(())
    }

    /// One cooperative video tick. Returns whether a new output frame
    /// was produced.
    pub fn tick(&mut self, now_ns: u64) -> bool {
        if self.state != SessionState::Recording {
            return false;
        }
        match (&mut self.compositor, &mut self.screen, &mut self.camera) {
            (Some(compositor), Some(screen), Some(camera)) => {
                compositor.tick(now_ns, screen.as_mut(), camera.as_mut())
            }
            // Single video source: the stream passes through, nothing
            // to composite here.
            _ => false,
        }
    }

    /// The most recent composited frame, when compositing.
    pub fn composited_frame(&self) -> Option<&image::RgbaImage> {
        self.compositor.as_ref().map(|c| c.frame())
    }

    /// Pull and mix one audio block across all audio sources.
    pub fn mixed_audio_block(&mut self) -> Vec<f32> {
        if self.state != SessionState::Recording {
            return Vec::new();
        }
        pull_mixed(&mut self.audio, self.config.audio_block_frames)
    }

    /// Update the camera overlay from UI-viewport coordinates.
    pub fn set_overlay_from_ui(&self, ui: CameraOverlay) {
        match self.mapping {
            Some(mapping) => self.overlay.set(mapping.to_capture(ui)),
            // No compositing, nothing reads the overlay.
            None => self.overlay.set(ui),
        }
    }

    /// Refresh the viewport↔capture mapping after a UI resize.
    pub fn set_viewport_size(&mut self, viewport_w: f64, viewport_h: f64) {
        if let Some(ref mut mapping) = self.mapping {
            mapping.set_viewport(viewport_w, viewport_h);
        }
    }

    /// Shared overlay cell, for wiring into interaction code.
    pub fn overlay_cell(&self) -> OverlayCell {
        self.overlay.clone()
    }

    /// Stop recording and release every stream. Idempotent.
    pub fn stop(&mut self) {
        if self.state == SessionState::Stopped {
            return;
        }
        self.release_streams();
        self.compositor = None;
        self.state = SessionState::Stopped;
        tracing::info!("recording session stopped");
    }

    fn release_streams(&mut self) {
        if let Some(mut screen) = self.screen.take() {
            screen.stop();
        }
        if let Some(mut camera) = self.camera.take() {
            camera.stop();
        }
        for mut source in self.audio.drain(..) {
            source.stop();
        }
    }
}

impl<O: CaptureOpener> Drop for RecordingSession<O> {
    fn drop(&mut self) {
        self.release_streams();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::SyntheticOpener;

    fn both_sources() -> RecordingConfig {
        RecordingConfig {
            screen: Some(ScreenTarget::Full),
            camera: Some("cam0".to_string()),
            microphones: vec!["mic0".to_string()],
            ..RecordingConfig::default()
        }
    }

    #[tokio::test]
    async fn test_screen_plus_camera_composites() {
        let mut session = RecordingSession::new(both_sources(), SyntheticOpener::new());
        session.start(960.0, 540.0).await.unwrap();
        assert_eq!(session.state(), SessionState::Recording);
        assert!(session.is_compositing());
        assert!(session.tick(0));
        assert!(session.composited_frame().is_some());
    }

    #[tokio::test]
    async fn test_single_source_bypasses_compositing() {
        let config = RecordingConfig {
            camera: None,
            ..both_sources()
        };
        let mut session = RecordingSession::new(config, SyntheticOpener::new());
        session.start(960.0, 540.0).await.unwrap();
        assert!(!session.is_compositing());
        assert!(!session.tick(0));
        assert!(session.composited_frame().is_none());
    }

    #[tokio::test]
    async fn test_camera_failure_releases_screen() {
        let opener = SyntheticOpener {
            fail_camera: true,
            ..SyntheticOpener::new()
        };
        let mut session = RecordingSession::new(both_sources(), opener);
        let err = session.start(960.0, 540.0).await.unwrap_err();
        assert!(err.to_string().contains("cam0"));
        assert_eq!(session.state(), SessionState::Error);
        // The screen stream from the failed attempt is gone.
        assert!(session.screen.is_none());
        assert!(session.audio.is_empty());
    }

    #[tokio::test]
    async fn test_no_sources_is_an_error() {
        let config = RecordingConfig {
            screen: None,
            camera: None,
            ..RecordingConfig::default()
        };
        let mut session = RecordingSession::new(config, SyntheticOpener::new());
        assert!(session.start(960.0, 540.0).await.is_err());
    }

    #[tokio::test]
    async fn test_mixed_audio_sums_sources() {
        let config = RecordingConfig {
            microphones: vec!["mic0".to_string(), "mic1".to_string()],
            ..both_sources()
        };
        let mut session = RecordingSession::new(config, SyntheticOpener::new());
        session.start(960.0, 540.0).await.unwrap();
        let block = session.mixed_audio_block();
        assert_eq!(block.len(), 1024);
        // Two synthetic mics at 0.25 each.
        assert!((block[0] - 0.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_stop_releases_and_idles() {
        let mut session = RecordingSession::new(both_sources(), SyntheticOpener::new());
        session.start(960.0, 540.0).await.unwrap();
        session.stop();
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(!session.tick(0));
        assert!(session.mixed_audio_block().is_empty());
        session.stop(); // idempotent
    }

    #[tokio::test]
    async fn test_overlay_ui_coordinates_map_to_capture() {
        let mut session = RecordingSession::new(both_sources(), SyntheticOpener::new());
        session.start(960.0, 540.0).await.unwrap();

        // 1920x1080 capture in a 960x540 viewport: UI coords double.
        session.set_overlay_from_ui(CameraOverlay {
            x: 800.0,
            y: 410.0,
            width: 160.0,
            height: 120.0,
            visible: true,
        });
        let overlay = session.overlay_cell().get();
        assert!((overlay.x - 1600.0).abs() < 1e-9);
        assert!((overlay.width - 320.0).abs() < 1e-9);
    }
}
