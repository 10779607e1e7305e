//! The recording compositor: screen background plus cached camera overlay.
//!
//! Screen and camera run on independent rate gates. The screen gate
//! (higher rate) establishes the background every tick; the camera gate
//! (markedly lower) refreshes a cached overlay buffer. Every screen tick
//! repaints the last cached camera frame, so the overlay stays put
//! between camera grabs. Hiding the overlay also drops the cache so a
//! stale frame can never reappear on re-show.

use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::RgbaImage;
use mixcut_common::RateGate;

use crate::capture::FrameSource;
use crate::overlay::OverlayCell;

/// Default screen redraw rate in frames per second.
pub const SCREEN_FPS: u32 = 30;

/// Default camera grab rate. Kept well below the screen rate to avoid
/// exhausting capture-driver buffers on constrained devices.
pub const CAMERA_FPS: u32 = 15;

/// Counters for observability and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompositorStats {
    pub screen_frames: u64,
    pub camera_grabs: u64,
}

/// Composites a screen stream and a camera overlay at independent rates.
pub struct RecordingCompositor {
    canvas: RgbaImage,
    screen_gate: RateGate,
    camera_gate: RateGate,
    cached_camera: Option<Arc<RgbaImage>>,
    overlay: OverlayCell,
    stats: CompositorStats,
}

impl RecordingCompositor {
    /// Create a compositor producing frames at the capture resolution.
    pub fn new(capture_w: u32, capture_h: u32, screen_fps: u32, camera_fps: u32, overlay: OverlayCell) -> Self {
        Self {
            canvas: RgbaImage::new(capture_w.max(1), capture_h.max(1)),
            screen_gate: RateGate::new(screen_fps),
            camera_gate: RateGate::new(camera_fps),
            cached_camera: None,
            overlay,
            stats: CompositorStats::default(),
        }
    }

    /// One cooperative tick. Returns whether a new output frame was
    /// produced.
    ///
    /// The overlay cell is read exactly once per tick; both the camera
    /// grab and the paint see the same snapshot.
    pub fn tick(
        &mut self,
        now_ns: u64,
        screen: &mut dyn FrameSource,
        camera: &mut dyn FrameSource,
    ) -> bool {
        let overlay = self.overlay.get();

        if !overlay.visible {
            // Drop the cache so a stale frame never reappears.
            self.cached_camera = None;
        } else if self.camera_gate.should_fire(now_ns) {
            if let Some(frame) = camera.grab_frame() {
                self.cached_camera = Some(frame);
                self.stats.camera_grabs += 1;
            }
        }

        if !self.screen_gate.should_fire(now_ns) {
            return false;
        }

        let Some(screen_frame) = screen.grab_frame() else {
            return false;
        };
        self.paint_background(&screen_frame);

        if overlay.visible {
            if let Some(camera_frame) = self.cached_camera.clone() {
                self.paint_overlay(&camera_frame, overlay.x, overlay.y, overlay.width, overlay.height);
            }
        }

        self.stats.screen_frames += 1;
        true
    }

    fn paint_background(&mut self, frame: &RgbaImage) {
        if frame.dimensions() == self.canvas.dimensions() {
            self.canvas.copy_from_slice(frame.as_raw());
        } else {
            let scaled = imageops::resize(
                frame,
                self.canvas.width(),
                self.canvas.height(),
                FilterType::Triangle,
            );
            self.canvas.copy_from_slice(scaled.as_raw());
        }
    }

    fn paint_overlay(&mut self, frame: &RgbaImage, x: f64, y: f64, w: f64, h: f64) {
        let dest_w = w.round().max(1.0) as u32;
        let dest_h = h.round().max(1.0) as u32;
        let scaled = if frame.dimensions() == (dest_w, dest_h) {
            frame.clone()
        } else {
            imageops::resize(frame, dest_w, dest_h, FilterType::Triangle)
        };
        imageops::overlay(&mut self.canvas, &scaled, x.round() as i64, y.round() as i64);
    }

    /// The most recently composited output frame.
    pub fn frame(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn stats(&self) -> CompositorStats {
        self.stats
    }

    /// Whether a camera frame is currently cached.
    pub fn has_cached_camera(&self) -> bool {
        self.cached_camera.is_some()
    }
}
