//! Camera overlay placement shared between interaction and render tick.
//!
//! The overlay rect lives in capture-pixel space. The UI communicates in
//! viewport pixels, so writes go through [`ViewportMapping`] first. The
//! rect and visibility travel together in one [`OverlayCell`] swap; a
//! render tick reads the cell exactly once and never observes a
//! half-updated rect.

use std::sync::{Arc, Mutex};

/// Camera overlay rect and visibility, in capture pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraOverlay {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub visible: bool,
}

impl CameraOverlay {
    /// Default placement: bottom-right corner at roughly 1/6 canvas width.
    pub fn default_for(capture_w: u32, capture_h: u32) -> Self {
        let width = capture_w as f64 / 6.0;
        let height = width * 0.75;
        Self {
            x: capture_w as f64 - width - 20.0,
            y: capture_h as f64 - height - 20.0,
            width,
            height,
            visible: true,
        }
    }
}

/// Shared cell holding the current overlay state.
///
/// Updates replace the whole value; readers take one snapshot per tick.
#[derive(Debug, Clone)]
pub struct OverlayCell {
    inner: Arc<Mutex<CameraOverlay>>,
}

impl OverlayCell {
    pub fn new(initial: CameraOverlay) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial)),
        }
    }

    /// Replace the overlay state wholesale.
    pub fn set(&self, overlay: CameraOverlay) {
        *self.inner.lock().unwrap() = overlay;
    }

    /// Snapshot the current state.
    pub fn get(&self) -> CameraOverlay {
        *self.inner.lock().unwrap()
    }
}

/// UI-viewport to capture-pixel conversion.
///
/// Derived from capture resolution ÷ current viewport size; the session
/// refreshes it whenever the viewport resizes.
#[derive(Debug, Clone, Copy)]
pub struct ViewportMapping {
    capture_w: u32,
    capture_h: u32,
    viewport_w: f64,
    viewport_h: f64,
}

impl ViewportMapping {
    pub fn new(capture_w: u32, capture_h: u32, viewport_w: f64, viewport_h: f64) -> Self {
        Self {
            capture_w,
            capture_h,
            viewport_w: viewport_w.max(1.0),
            viewport_h: viewport_h.max(1.0),
        }
    }

    /// Refresh for a new viewport size.
    pub fn set_viewport(&mut self, viewport_w: f64, viewport_h: f64) {
        self.viewport_w = viewport_w.max(1.0);
        self.viewport_h = viewport_h.max(1.0);
    }

    pub fn scale_x(&self) -> f64 {
        self.capture_w as f64 / self.viewport_w
    }

    pub fn scale_y(&self) -> f64 {
        self.capture_h as f64 / self.viewport_h
    }

    /// Convert a UI-space overlay into capture pixels.
    pub fn to_capture(&self, ui: CameraOverlay) -> CameraOverlay {
        CameraOverlay {
            x: ui.x * self.scale_x(),
            y: ui.y * self.scale_y(),
            width: ui.width * self.scale_x(),
            height: ui.height * self.scale_y(),
            visible: ui.visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_swaps_wholesale() {
        let cell = OverlayCell::new(CameraOverlay::default_for(1920, 1080));
        let next = CameraOverlay {
            x: 10.0,
            y: 20.0,
            width: 320.0,
            height: 240.0,
            visible: false,
        };
        cell.set(next);
        assert_eq!(cell.get(), next);
    }

    #[test]
    fn test_viewport_mapping_scales_rect() {
        // 1920x1080 capture shown in a 960x540 viewport: 2x scale.
        let mapping = ViewportMapping::new(1920, 1080, 960.0, 540.0);
        let capture = mapping.to_capture(CameraOverlay {
            x: 800.0,
            y: 410.0,
            width: 160.0,
            height: 120.0,
            visible: true,
        });
        assert!((capture.x - 1600.0).abs() < 1e-9);
        assert!((capture.y - 820.0).abs() < 1e-9);
        assert!((capture.width - 320.0).abs() < 1e-9);
        assert!((capture.height - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_mapping_refreshes_on_resize() {
        let mut mapping = ViewportMapping::new(1920, 1080, 960.0, 540.0);
        assert!((mapping.scale_x() - 2.0).abs() < 1e-9);
        mapping.set_viewport(1920.0, 1080.0);
        assert!((mapping.scale_x() - 1.0).abs() < 1e-9);
    }
}
