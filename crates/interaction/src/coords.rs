//! Coordinate transforms between screen, canvas, and clip-local space.
//!
//! Pointer input arrives in screen pixels over a zoomed/panned viewport
//! that letterboxes the canvas. A hit test needs the chain:
//! screen → (zoom/pan) → viewport → (fit scale) → canvas pixels, and for
//! rotated clips an extra inverse rotation into the clip's local frame.

/// A point in whatever space the context says.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// View state mapping the canvas into the on-screen viewport.
#[derive(Debug, Clone, Copy)]
pub struct ViewTransform {
    /// User zoom applied to the viewport content.
    pub zoom: f64,
    /// Pan offset in screen pixels.
    pub pan_x: f64,
    pub pan_y: f64,
    /// On-screen viewport size in pixels.
    pub viewport_w: f64,
    pub viewport_h: f64,
    /// Canvas (surface) size in pixels.
    pub canvas_w: f64,
    pub canvas_h: f64,
}

impl ViewTransform {
    /// Identity view: canvas shown 1:1 in an equally sized viewport.
    pub fn identity(canvas_w: f64, canvas_h: f64) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            viewport_w: canvas_w,
            viewport_h: canvas_h,
            canvas_w,
            canvas_h,
        }
    }

    /// Scale and offset of the canvas letterboxed inside the viewport.
    fn fit(&self) -> (f64, f64, f64) {
        let scale = (self.viewport_w / self.canvas_w).min(self.viewport_h / self.canvas_h);
        let off_x = (self.viewport_w - self.canvas_w * scale) / 2.0;
        let off_y = (self.viewport_h - self.canvas_h * scale) / 2.0;
        (scale, off_x, off_y)
    }

    /// Screen pixels → canvas pixels.
    pub fn screen_to_canvas(&self, p: Point) -> Point {
        // Undo zoom/pan first, then the letterbox fit.
        let vx = (p.x - self.pan_x) / self.zoom;
        let vy = (p.y - self.pan_y) / self.zoom;
        let (scale, off_x, off_y) = self.fit();
        Point::new((vx - off_x) / scale, (vy - off_y) / scale)
    }

    /// Canvas pixels → screen pixels (for placing cursors/overlays).
    pub fn canvas_to_screen(&self, p: Point) -> Point {
        let (scale, off_x, off_y) = self.fit();
        let vx = p.x * scale + off_x;
        let vy = p.y * scale + off_y;
        Point::new(vx * self.zoom + self.pan_x, vy * self.zoom + self.pan_y)
    }
}

/// Rotate a canvas-space point into a clip's local (unrotated) frame.
///
/// `center` is the clip rect's center in canvas pixels and
/// `rotation_deg` the clip's rotation; the result is the point as seen
/// by the unrotated rect.
pub fn to_clip_local(p: Point, center: Point, rotation_deg: f64) -> Point {
    let theta = (-rotation_deg).to_radians();
    let (sin, cos) = theta.sin_cos();
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_roundtrip() {
        let view = ViewTransform::identity(1920.0, 1080.0);
        let p = view.screen_to_canvas(Point::new(400.0, 300.0));
        assert!((p.x - 400.0).abs() < 1e-9);
        assert!((p.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_and_pan_invert() {
        let view = ViewTransform {
            zoom: 2.0,
            pan_x: 50.0,
            pan_y: -20.0,
            viewport_w: 960.0,
            viewport_h: 540.0,
            canvas_w: 1920.0,
            canvas_h: 1080.0,
        };
        let canvas = Point::new(1000.0, 600.0);
        let screen = view.canvas_to_screen(canvas);
        let back = view.screen_to_canvas(screen);
        assert!((back.x - canvas.x).abs() < 1e-6);
        assert!((back.y - canvas.y).abs() < 1e-6);
    }

    #[test]
    fn test_letterbox_offset_applied() {
        // 1920x1080 canvas in a square 1080x1080 viewport: fit scale is
        // 0.5625, vertical bars above/below.
        let view = ViewTransform {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            viewport_w: 1080.0,
            viewport_h: 1080.0,
            canvas_w: 1920.0,
            canvas_h: 1080.0,
        };
        let center = view.screen_to_canvas(Point::new(540.0, 540.0));
        assert!((center.x - 960.0).abs() < 1e-6);
        assert!((center.y - 540.0).abs() < 1e-6);
    }

    #[test]
    fn test_clip_local_inverse_rotation() {
        let center = Point::new(100.0, 100.0);
        // A point directly above center, with the clip rotated 90°,
        // unrotates to directly left of center.
        let local = to_clip_local(Point::new(100.0, 50.0), center, 90.0);
        assert!((local.x - 50.0).abs() < 1e-6);
        assert!((local.y - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_clip_local_zero_rotation_is_identity() {
        let local = to_clip_local(Point::new(3.0, 4.0), Point::new(10.0, 10.0), 0.0);
        assert!((local.x - 3.0).abs() < 1e-9);
        assert!((local.y - 4.0).abs() < 1e-9);
    }
}
