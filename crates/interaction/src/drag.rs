//! Drag sessions: move, resize, and rotate of positioned clips.
//!
//! A session is created from a hit-test result when the pointer goes
//! down and turns subsequent pointer positions into clip placements.
//! Placement math runs every pointer event, but store writes go through
//! [`UpdateCoalescer`] so each animation frame commits at most one
//! update, last value wins.

use std::collections::HashSet;

use mixcut_timeline_model::{ClipPatch, ClipPosition, TimelineStore};

use crate::coords::Point;
use crate::hit::{Corner, HitPart, HitTarget};

/// An in-progress pointer drag over one clip.
#[derive(Debug, Clone)]
pub struct DragSession {
    clip_id: String,
    canvas_w: f64,
    canvas_h: f64,
    mode: DragMode,
}

#[derive(Debug, Clone)]
enum DragMode {
    Move {
        origin: Point,
        initial: ClipPosition,
    },
    Resize {
        corner: Corner,
        /// Opposite corner in normalized coordinates; stays fixed.
        anchor: Point,
        /// Rect center at drag start, canvas px.
        center: Point,
        /// Pointer distance from center at drag start, canvas px.
        start_len: f64,
        start_width: f64,
        /// Source media aspect as height/width, in normalized units.
        aspect: f64,
        initial: ClipPosition,
    },
    Rotate {
        center: Point,
        initial: ClipPosition,
    },
}

impl DragSession {
    /// Start a drag from a hit-test result.
    ///
    /// `source_aspect` is the clip's media aspect ratio (height/width);
    /// resize preserves it rather than the rect's current shape. `None`
    /// falls back to the rect's shape.
    pub fn begin(
        target: &HitTarget,
        pointer: Point,
        position: ClipPosition,
        source_aspect: Option<f64>,
        canvas_w: f64,
        canvas_h: f64,
    ) -> Self {
        let center = Point::new(
            (position.x + position.width / 2.0) * canvas_w,
            (position.y + position.height / 2.0) * canvas_h,
        );
        let mode = match target.part {
            HitPart::Body => DragMode::Move {
                origin: pointer,
                initial: position,
            },
            HitPart::ResizeHandle(corner) => {
                let anchor_px = corner.opposite().point_of(
                    position.x * canvas_w,
                    position.y * canvas_h,
                    position.width * canvas_w,
                    position.height * canvas_h,
                );
                let dx = pointer.x - center.x;
                let dy = pointer.y - center.y;
                DragMode::Resize {
                    corner,
                    anchor: Point::new(anchor_px.x / canvas_w, anchor_px.y / canvas_h),
                    center,
                    start_len: (dx * dx + dy * dy).sqrt(),
                    start_width: position.width,
                    aspect: source_aspect
                        .unwrap_or(position.height / position.width.max(f64::EPSILON)),
                    initial: position,
                }
            }
            HitPart::RotationHandle => DragMode::Rotate {
                center,
                initial: position,
            },
        };
        Self {
            clip_id: target.clip_id.clone(),
            canvas_w,
            canvas_h,
            mode,
        }
    }

    pub fn clip_id(&self) -> &str {
        &self.clip_id
    }

    /// Placement for the current pointer position.
    pub fn placement_at(&self, pointer: Point) -> ClipPosition {
        match &self.mode {
            DragMode::Move { origin, initial } => {
                let dx = (pointer.x - origin.x) / self.canvas_w;
                let dy = (pointer.y - origin.y) / self.canvas_h;
                ClipPosition {
                    x: initial.x + dx,
                    y: initial.y + dy,
                    ..*initial
                }
                .clamped()
            }
            DragMode::Resize {
                corner,
                anchor,
                center,
                start_len,
                start_width,
                aspect,
                initial,
            } => {
                let dx = pointer.x - center.x;
                let dy = pointer.y - center.y;
                let len = (dx * dx + dy * dy).sqrt();
                // A degenerate start offset would blow the ratio up.
                let scale = if *start_len > 1.0 { len / start_len } else { 1.0 };

                let (width, height) = constrain_dimensions(start_width * scale, *aspect);
                // The corner opposite the handle stays put.
                let x = match corner {
                    Corner::TopLeft | Corner::BottomLeft => anchor.x - width,
                    Corner::TopRight | Corner::BottomRight => anchor.x,
                };
                let y = match corner {
                    Corner::TopLeft | Corner::TopRight => anchor.y - height,
                    Corner::BottomLeft | Corner::BottomRight => anchor.y,
                };
                ClipPosition {
                    x,
                    y,
                    width,
                    height,
                    ..*initial
                }
                .clamped()
            }
            DragMode::Rotate { center, initial } => {
                let angle = (pointer.y - center.y)
                    .atan2(pointer.x - center.x)
                    .to_degrees()
                    + 90.0;
                ClipPosition {
                    rotation: angle.rem_euclid(360.0),
                    ..*initial
                }
            }
        }
    }

    /// The store patch for the current pointer position.
    pub fn patch_at(&self, pointer: Point) -> ClipPatch {
        ClipPatch::position(self.placement_at(pointer))
    }
}

/// Scale a width by the drag factor, derive height from the media
/// aspect, and clamp both into `[MIN, 1]` without breaking the aspect.
fn constrain_dimensions(width: f64, aspect: f64) -> (f64, f64) {
    use mixcut_timeline_model::MIN_CLIP_DIMENSION as MIN;

    let mut w = width.clamp(MIN, 1.0);
    let mut h = w * aspect;
    if h > 1.0 {
        h = 1.0;
        w = h / aspect;
    } else if h < MIN {
        h = MIN;
        w = (h / aspect).min(1.0);
    }
    (w, h)
}

/// Bounds drag-update traffic to one store write per animation frame.
///
/// Pointer events arrive faster than frames; the session queues every
/// placement here and the frame callback flushes the newest one.
#[derive(Debug, Default)]
pub struct UpdateCoalescer {
    pending: Option<(String, ClipPatch)>,
}

impl UpdateCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a patch, replacing any not-yet-flushed one.
    pub fn queue(&mut self, clip_id: &str, patch: ClipPatch) {
        self.pending = Some((clip_id.to_string(), patch));
    }

    /// Commit the newest queued patch, if any. Returns whether a store
    /// write happened.
    pub fn flush(&mut self, store: &dyn TimelineStore) -> bool {
        match self.pending.take() {
            Some((clip_id, patch)) => {
                tracing::trace!(clip_id, "flushing coalesced clip update");
                store.update_clip(&clip_id, patch);
                true
            }
            None => false,
        }
    }
}

/// Apply click selection semantics.
///
/// A plain click selects exactly the hit clip; shift-click toggles its
/// membership. Clicking empty canvas clears the selection unless shift
/// is held.
pub fn apply_click_selection(store: &dyn TimelineStore, hit: Option<&HitTarget>, shift: bool) {
    match hit {
        Some(target) => {
            let mut selected = store.selected_clip_ids();
            if shift {
                if !selected.insert(target.clip_id.clone()) {
                    selected.remove(&target.clip_id);
                }
            } else {
                selected = HashSet::from([target.clip_id.clone()]);
            }
            store.set_selected_clip_ids(selected);
        }
        None => {
            if !shift {
                store.set_selected_clip_ids(HashSet::new());
            }
        }
    }
}
