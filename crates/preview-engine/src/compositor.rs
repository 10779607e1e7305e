//! Frame compositor: draws active clips, selection chrome, and the
//! background grid onto the output surface.
//!
//! Downscales below half size go through step-down scaling: the source is
//! iteratively halved into cached offscreen buffers until within 2x of
//! the destination, then drawn from the last buffer. A single large
//! downscale aliases badly; the halving chain does not.

use std::collections::HashMap;
use std::sync::Arc;

use image::{imageops, imageops::FilterType, Rgba, RgbaImage};
use mixcut_common::{MixcutError, MixcutResult};
use mixcut_timeline_model::ClipPosition;

/// Grid line pitch in surface pixels.
pub const GRID_PITCH_PX: u32 = 48;
/// Scale ratio below which step-down scaling kicks in.
pub const STEP_DOWN_TRIGGER: f64 = 0.5;
/// Side length of the drawn corner resize handles.
pub const RESIZE_HANDLE_PX: u32 = 14;
/// Distance of the rotation handle above the rect's top edge.
pub const ROTATION_HANDLE_OFFSET_PX: f64 = 24.0;
/// Intermediate-buffer cache cap; cleared wholesale when exceeded.
const MAX_CACHED_BUFFERS: usize = 128;

const BORDER_COLOR: Rgba<u8> = Rgba([70, 70, 70, 255]);
const GRID_COLOR: Rgba<u8> = Rgba([48, 48, 48, 255]);
const SELECTION_COLOR: Rgba<u8> = Rgba([82, 157, 255, 255]);
const HANDLE_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Axis-aligned rect in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PxRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl PxRect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Corners clockwise from top-left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.x, self.y),
            (self.x + self.w, self.y),
            (self.x + self.w, self.y + self.h),
            (self.x, self.y + self.h),
        ]
    }
}

/// Aspect-preserving "fit" rect: the largest centered rect with the
/// source's aspect ratio inside the destination (letterbox).
pub fn fit_rect(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> PxRect {
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return PxRect {
            x: 0.0,
            y: 0.0,
            w: dst_w as f64,
            h: dst_h as f64,
        };
    }
    let scale = (dst_w as f64 / src_w as f64).min(dst_h as f64 / src_h as f64);
    let w = src_w as f64 * scale;
    let h = src_h as f64 * scale;
    PxRect {
        x: (dst_w as f64 - w) / 2.0,
        y: (dst_h as f64 - h) / 2.0,
        w,
        h,
    }
}

/// Map a normalized placement to surface pixels.
pub fn position_to_rect(pos: &ClipPosition, surface_w: u32, surface_h: u32) -> PxRect {
    PxRect {
        x: pos.x * surface_w as f64,
        y: pos.y * surface_h as f64,
        w: pos.width * surface_w as f64,
        h: pos.height * surface_h as f64,
    }
}

/// Parse a `#rrggbb` hex color, falling back to near-black.
pub fn parse_hex_color(hex: &str) -> Rgba<u8> {
    let stripped = hex.trim().trim_start_matches('#');
    if stripped.len() == 6 {
        if let Ok(value) = u32::from_str_radix(stripped, 16) {
            return Rgba([
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
                255,
            ]);
        }
    }
    Rgba([26, 26, 26, 255])
}

/// One clip's contribution to the frame, in resolver order.
pub struct Layer {
    pub clip_id: String,
    pub frame: Arc<RgbaImage>,
    pub position: Option<ClipPosition>,
    pub selected: bool,
}

/// Owns the output surface and the step-down buffer cache.
pub struct FrameCompositor {
    width: u32,
    height: u32,
    surface: RgbaImage,
    downscale_cache: HashMap<(String, u32, u32), Arc<RgbaImage>>,
}

impl FrameCompositor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            surface: RgbaImage::new(width, height),
            downscale_cache: HashMap::new(),
        }
    }

    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reallocate the surface (e.g. render-scale change). Cached buffers
    /// are dropped; their keys would no longer match anyway.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.surface = RgbaImage::new(width, height);
        self.downscale_cache.clear();
    }

    /// Compose one frame. Layers paint in order, so the caller passes
    /// them background-first.
    pub fn render(
        &mut self,
        background: &str,
        show_grid: bool,
        layers: &[Layer],
    ) -> MixcutResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MixcutError::surface("zero-sized output surface"));
        }

        let bg = parse_hex_color(background);
        for px in self.surface.pixels_mut() {
            *px = bg;
        }

        self.draw_border();
        if show_grid {
            self.draw_grid();
        }

        for layer in layers {
            let rect = match &layer.position {
                Some(pos) => position_to_rect(pos, self.width, self.height),
                None => fit_rect(
                    layer.frame.width(),
                    layer.frame.height(),
                    self.width,
                    self.height,
                ),
            };
            if rect.w < 1.0 || rect.h < 1.0 {
                continue;
            }

            let rotation = layer.position.map(|p| p.rotation).unwrap_or(0.0);
            let scaled = self.scaled_for(&layer.clip_id, &layer.frame, &rect);

            if rotation.abs() < f64::EPSILON {
                imageops::overlay(
                    &mut self.surface,
                    scaled.as_ref(),
                    rect.x.round() as i64,
                    rect.y.round() as i64,
                );
            } else {
                self.draw_rotated(scaled.as_ref(), &rect, rotation);
            }
        }

        // Chrome paints above all clip content.
        for layer in layers {
            if let (true, Some(pos)) = (layer.selected, &layer.position) {
                let rect = position_to_rect(pos, self.width, self.height);
                self.draw_selection_chrome(&rect, pos.rotation);
            }
        }

        Ok(())
    }

    /// Scale a source frame for a destination rect, stepping down through
    /// cached halvings when the ratio falls below [`STEP_DOWN_TRIGGER`].
    fn scaled_for(&mut self, clip_id: &str, frame: &Arc<RgbaImage>, rect: &PxRect) -> Arc<RgbaImage> {
        let dest_w = (rect.w.round() as u32).max(1);
        let dest_h = (rect.h.round() as u32).max(1);

        if self.downscale_cache.len() > MAX_CACHED_BUFFERS {
            self.downscale_cache.clear();
        }

        let mut current = frame.clone();
        let ratio = (dest_w as f64 / current.width().max(1) as f64)
            .min(dest_h as f64 / current.height().max(1) as f64);

        if ratio < STEP_DOWN_TRIGGER {
            // Halve until within 2x of the destination.
            while current.width() > dest_w * 2
                && current.height() > dest_h * 2
                && current.width() > 1
                && current.height() > 1
            {
                let next_w = (current.width() / 2).max(1);
                let next_h = (current.height() / 2).max(1);
                let key = (clip_id.to_string(), next_w, next_h);
                current = match self.downscale_cache.get(&key) {
                    Some(cached) => cached.clone(),
                    None => {
                        let halved = Arc::new(imageops::resize(
                            current.as_ref(),
                            next_w,
                            next_h,
                            FilterType::Triangle,
                        ));
                        self.downscale_cache.insert(key, halved.clone());
                        halved
                    }
                };
            }
        }

        if current.width() != dest_w || current.height() != dest_h {
            current = Arc::new(imageops::resize(
                current.as_ref(),
                dest_w,
                dest_h,
                FilterType::Triangle,
            ));
        }
        current
    }

    /// Inverse-mapped rotated draw: walk the rotated rect's bounding box
    /// and sample the scaled source where the inverse rotation lands
    /// inside the unrotated rect.
    fn draw_rotated(&mut self, scaled: &RgbaImage, rect: &PxRect, rotation_deg: f64) {
        let (cx, cy) = rect.center();
        let theta = rotation_deg.to_radians();
        let (sin, cos) = theta.sin_cos();

        let corners = rect.corners().map(|(px, py)| {
            let dx = px - cx;
            let dy = py - cy;
            (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
        });
        let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min).floor().max(0.0) as u32;
        let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max).ceil().min(self.width as f64) as u32;
        let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min).floor().max(0.0) as u32;
        let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max).ceil().min(self.height as f64) as u32;

        for py in min_y..max_y {
            for px in min_x..max_x {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                // Inverse rotation back into the unrotated rect.
                let lx = dx * cos + dy * sin + rect.w / 2.0;
                let ly = -dx * sin + dy * cos + rect.h / 2.0;
                if lx < 0.0 || ly < 0.0 || lx >= rect.w || ly >= rect.h {
                    continue;
                }
                let sx = (lx / rect.w * scaled.width() as f64) as u32;
                let sy = (ly / rect.h * scaled.height() as f64) as u32;
                if sx < scaled.width() && sy < scaled.height() {
                    self.surface.put_pixel(px, py, *scaled.get_pixel(sx, sy));
                }
            }
        }
    }

    fn draw_border(&mut self) {
        let (w, h) = (self.width, self.height);
        for x in 0..w {
            self.surface.put_pixel(x, 0, BORDER_COLOR);
            self.surface.put_pixel(x, h - 1, BORDER_COLOR);
        }
        for y in 0..h {
            self.surface.put_pixel(0, y, BORDER_COLOR);
            self.surface.put_pixel(w - 1, y, BORDER_COLOR);
        }
    }

    fn draw_grid(&mut self) {
        let (w, h) = (self.width, self.height);
        let mut x = GRID_PITCH_PX;
        while x < w {
            for y in 0..h {
                self.surface.put_pixel(x, y, GRID_COLOR);
            }
            x += GRID_PITCH_PX;
        }
        let mut y = GRID_PITCH_PX;
        while y < h {
            for x in 0..w {
                self.surface.put_pixel(x, y, GRID_COLOR);
            }
            y += GRID_PITCH_PX;
        }
    }

    /// Dashed outline, four corner resize handles, and the top-center
    /// rotation handle, all transformed into the clip's rotated space.
    fn draw_selection_chrome(&mut self, rect: &PxRect, rotation_deg: f64) {
        let (cx, cy) = rect.center();
        let theta = rotation_deg.to_radians();
        let (sin, cos) = theta.sin_cos();
        let rotate = |px: f64, py: f64| {
            let dx = px - cx;
            let dy = py - cy;
            (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
        };

        let corners = rect.corners().map(|(px, py)| rotate(px, py));
        for i in 0..4 {
            let a = corners[i];
            let b = corners[(i + 1) % 4];
            self.draw_dashed_line(a, b, SELECTION_COLOR);
        }

        for (hx, hy) in corners {
            self.fill_square_centered(hx, hy, RESIZE_HANDLE_PX, HANDLE_FILL);
        }

        let (rx, ry) = rotate(cx, rect.y - ROTATION_HANDLE_OFFSET_PX);
        self.fill_circle(rx, ry, 5.0, HANDLE_FILL);
    }

    fn draw_dashed_line(&mut self, a: (f64, f64), b: (f64, f64), color: Rgba<u8>) {
        const DASH_ON: f64 = 6.0;
        const DASH_PERIOD: f64 = 10.0;
        let len = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
        let steps = len.ceil() as u32;
        for i in 0..=steps {
            let d = i as f64;
            if d % DASH_PERIOD >= DASH_ON {
                continue;
            }
            let t = if steps == 0 { 0.0 } else { d / len };
            let x = a.0 + (b.0 - a.0) * t;
            let y = a.1 + (b.1 - a.1) * t;
            self.set_px(x, y, color);
        }
    }

    fn fill_square_centered(&mut self, cx: f64, cy: f64, side: u32, color: Rgba<u8>) {
        let half = side as f64 / 2.0;
        let x0 = (cx - half).floor() as i64;
        let y0 = (cy - half).floor() as i64;
        for dy in 0..side as i64 {
            for dx in 0..side as i64 {
                self.set_px((x0 + dx) as f64, (y0 + dy) as f64, color);
            }
        }
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba<u8>) {
        let r = radius.ceil() as i64;
        for dy in -r..=r {
            for dx in -r..=r {
                if (dx * dx + dy * dy) as f64 <= radius * radius {
                    self.set_px(cx + dx as f64, cy + dy as f64, color);
                }
            }
        }
    }

    fn set_px(&mut self, x: f64, y: f64, color: Rgba<u8>) {
        if x >= 0.0 && y >= 0.0 {
            let (x, y) = (x as u32, y as u32);
            if x < self.width && y < self.height {
                self.surface.put_pixel(x, y, color);
            }
        }
    }

    #[cfg(test)]
    fn cached_buffer_sizes(&self, clip_id: &str) -> Vec<(u32, u32)> {
        let mut sizes: Vec<(u32, u32)> = self
            .downscale_cache
            .keys()
            .filter(|(id, _, _)| id == clip_id)
            .map(|(_, w, h)| (*w, *h))
            .collect();
        sizes.sort();
        sizes
    }
}
