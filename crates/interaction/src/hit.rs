//! Ordered hit-testing over positioned clips.
//!
//! Handles beat bodies, topmost clips beat lower ones: for each clip in
//! reverse resolver order the four corner resize handles are tried
//! first, then the rotation handle, then the body rectangle. The first
//! match ends the search entirely, so a handle on a lower clip never
//! steals a click through an overlapping upper body.

use mixcut_timeline_model::ClipPosition;

use crate::coords::{to_clip_local, Point};

/// Square hotspot edge length of a corner resize handle, in canvas px.
pub const RESIZE_HANDLE_HOTSPOT_PX: f64 = 14.0;

/// Hit radius of the rotation handle, in canvas px.
pub const ROTATION_HANDLE_RADIUS_PX: f64 = 12.0;

/// Distance from the rect's top edge to the rotation handle center.
pub const ROTATION_HANDLE_OFFSET_PX: f64 = 24.0;

/// One of the four resize handles, named by rect corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// The diagonally opposite corner. A resize drag keeps it fixed.
    pub fn opposite(&self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// Corner point of a rect given as (x, y, w, h) in canvas px.
    pub fn point_of(&self, x: f64, y: f64, w: f64, h: f64) -> Point {
        match self {
            Corner::TopLeft => Point::new(x, y),
            Corner::TopRight => Point::new(x + w, y),
            Corner::BottomLeft => Point::new(x, y + h),
            Corner::BottomRight => Point::new(x + w, y + h),
        }
    }
}

/// What part of a clip the pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    ResizeHandle(Corner),
    RotationHandle,
    Body,
}

/// A successful hit test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitTarget {
    pub clip_id: String,
    pub part: HitPart,
}

/// A positioned clip as the hit tester sees it.
#[derive(Debug, Clone)]
pub struct HitCandidate {
    pub clip_id: String,
    pub position: ClipPosition,
}

/// Hit-test a canvas-space point against positioned clips.
///
/// `candidates` must be in resolver paint order (bottom first); the test
/// walks it in reverse so the topmost clip wins. Rotated clips are
/// tested in their local frame, matching how they are drawn.
pub fn hit_test(
    p: Point,
    candidates: &[HitCandidate],
    canvas_w: f64,
    canvas_h: f64,
) -> Option<HitTarget> {
    for candidate in candidates.iter().rev() {
        if let Some(part) = hit_test_clip(p, &candidate.position, canvas_w, canvas_h) {
            return Some(HitTarget {
                clip_id: candidate.clip_id.clone(),
                part,
            });
        }
    }
    None
}

fn hit_test_clip(p: Point, pos: &ClipPosition, canvas_w: f64, canvas_h: f64) -> Option<HitPart> {
    let x = pos.x * canvas_w;
    let y = pos.y * canvas_h;
    let w = pos.width * canvas_w;
    let h = pos.height * canvas_h;
    let center = Point::new(x + w / 2.0, y + h / 2.0);

    let local = if pos.rotation != 0.0 {
        to_clip_local(p, center, pos.rotation)
    } else {
        p
    };

    let half = RESIZE_HANDLE_HOTSPOT_PX / 2.0;
    for corner in Corner::ALL {
        let c = corner.point_of(x, y, w, h);
        if (local.x - c.x).abs() <= half && (local.y - c.y).abs() <= half {
            return Some(HitPart::ResizeHandle(corner));
        }
    }

    let handle = Point::new(center.x, y - ROTATION_HANDLE_OFFSET_PX);
    let dx = local.x - handle.x;
    let dy = local.y - handle.y;
    if (dx * dx + dy * dy).sqrt() <= ROTATION_HANDLE_RADIUS_PX {
        return Some(HitPart::RotationHandle);
    }

    if local.x >= x && local.x <= x + w && local.y >= y && local.y <= y + h {
        return Some(HitPart::Body);
    }

    None
}
