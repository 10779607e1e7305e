//! Clip, placement, and media asset types.
//!
//! Placement coordinates are normalized to `[0.0, 1.0]` relative to the
//! output canvas. Times are in seconds: `start_time`/`duration` on the
//! timeline axis, `trim_start`/`trim_end` on the source-media axis.

use serde::{Deserialize, Serialize};

/// Minimum normalized width/height of a positioned clip.
pub const MIN_CLIP_DIMENSION: f64 = 0.05;

/// A timed reference to a media asset placed on a track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip identifier.
    pub id: String,

    /// Referenced media asset.
    pub asset_id: String,

    /// Timeline position (seconds).
    pub start_time: f64,

    /// Timeline duration (seconds).
    pub duration: f64,

    /// Source-media window start (seconds into the asset).
    pub trim_start: f64,

    /// Source-media window end (seconds into the asset).
    pub trim_end: f64,

    /// Playback speed multiplier, `0.25` to `16.0`.
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Volume multiplier, `0.0` to `2.0`.
    #[serde(default = "default_volume")]
    pub volume: f64,

    /// Audio fade-in length (seconds).
    #[serde(default)]
    pub fade_in: f64,

    /// Audio fade-out length (seconds).
    #[serde(default)]
    pub fade_out: f64,

    /// Canvas placement. `None` means fill the canvas preserving the
    /// source aspect ratio (letterbox).
    #[serde(default)]
    pub position: Option<ClipPosition>,
}

fn default_speed() -> f64 {
    1.0
}

fn default_volume() -> f64 {
    1.0
}

impl Clip {
    /// Timeline end (exclusive).
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Whether the clip's active window `[start, start+duration)` contains
    /// the given timeline time.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time()
    }

    /// Source-media time corresponding to a timeline time.
    ///
    /// Speed affects the playback rate of the handle, not this mapping:
    /// the trim window is defined in real source seconds.
    pub fn source_time_at(&self, timeline_time: f64) -> f64 {
        self.trim_start + (timeline_time - self.start_time)
    }

    /// Fade envelope gain at a timeline time, `[0.0, 1.0]`.
    ///
    /// Linear ramps over `fade_in` seconds from the clip start and
    /// `fade_out` seconds into the clip end. Zero-length fades yield 1.0.
    pub fn fade_gain_at(&self, timeline_time: f64) -> f64 {
        if !self.contains(timeline_time) {
            return 0.0;
        }
        let from_start = timeline_time - self.start_time;
        let to_end = self.end_time() - timeline_time;

        let mut gain = 1.0f64;
        if self.fade_in > 0.0 {
            gain = gain.min(from_start / self.fade_in);
        }
        if self.fade_out > 0.0 {
            gain = gain.min(to_end / self.fade_out);
        }
        gain.clamp(0.0, 1.0)
    }

    /// Validate clip invariants against its asset, returning messages for
    /// each violation.
    pub fn validate(&self, asset: &MediaAsset) -> Vec<String> {
        let mut errors = vec![];
        if self.duration <= 0.0 {
            errors.push(format!("clip {}: non-positive duration", self.id));
        }
        if self.trim_start + self.duration > asset.duration + 1e-9 {
            errors.push(format!(
                "clip {}: trim window exceeds asset duration ({:.3} + {:.3} > {:.3})",
                self.id, self.trim_start, self.duration, asset.duration
            ));
        }
        if !(0.25..=16.0).contains(&self.speed) {
            errors.push(format!("clip {}: speed {} out of range", self.id, self.speed));
        }
        if !(0.0..=2.0).contains(&self.volume) {
            errors.push(format!(
                "clip {}: volume {} out of range",
                self.id, self.volume
            ));
        }
        errors
    }
}

/// Normalized canvas placement of a clip.
///
/// `(0.0, 0.0)` is the top-left of the canvas, `(1.0, 1.0)` the
/// bottom-right. Rotation is in degrees about the rect center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipPosition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,

    /// Rotation in degrees, `[0, 360)`, 0 = upright.
    #[serde(default)]
    pub rotation: f64,

    /// Stacking order among positioned clips on the same track.
    #[serde(default)]
    pub z_index: i32,
}

impl ClipPosition {
    /// Create a placement, clamping dimensions and keeping the rect fully
    /// inside the canvas.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        let width = width.clamp(MIN_CLIP_DIMENSION, 1.0);
        let height = height.clamp(MIN_CLIP_DIMENSION, 1.0);
        Self {
            x: x.clamp(0.0, 1.0 - width),
            y: y.clamp(0.0, 1.0 - height),
            width,
            height,
            rotation: 0.0,
            z_index: 0,
        }
    }

    /// Clamp this placement back into valid bounds.
    pub fn clamped(&self) -> Self {
        let width = self.width.clamp(MIN_CLIP_DIMENSION, 1.0);
        let height = self.height.clamp(MIN_CLIP_DIMENSION, 1.0);
        Self {
            x: self.x.clamp(0.0, 1.0 - width),
            y: self.y.clamp(0.0, 1.0 - height),
            width,
            height,
            rotation: self.rotation.rem_euclid(360.0),
            z_index: self.z_index,
        }
    }

    /// Center of the rect in normalized coordinates.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Kind of media an asset holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

impl MediaKind {
    /// Whether this asset kind has a visual frame to draw.
    pub fn has_video(&self) -> bool {
        matches!(self, MediaKind::Video | MediaKind::Image)
    }

    /// Whether this asset kind carries an audio track.
    pub fn has_audio(&self) -> bool {
        matches!(self, MediaKind::Video | MediaKind::Audio)
    }
}

/// An imported media file. Immutable once imported; owned by the media
/// library, referenced here by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAsset {
    pub id: String,
    pub kind: MediaKind,
    pub path: String,

    /// Media duration in seconds. Images report 0.
    pub duration: f64,

    /// Pixel dimensions. Zero for audio-only assets.
    pub width: u32,
    pub height: u32,
}

impl MediaAsset {
    /// Source pixel aspect ratio as height/width, if the asset has pixels.
    pub fn aspect_h_over_w(&self) -> Option<f64> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(self.height as f64 / self.width as f64)
    }
}

/// The current playhead, read-only for the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayheadState {
    /// Timeline time in seconds.
    pub position: f64,

    /// Whether the user is actively scrubbing.
    pub user_seeking: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_clip() -> Clip {
        Clip {
            id: "c1".to_string(),
            asset_id: "a1".to_string(),
            start_time: 2.0,
            duration: 4.0,
            trim_start: 1.0,
            trim_end: 5.0,
            speed: 1.0,
            volume: 1.0,
            fade_in: 0.0,
            fade_out: 0.0,
            position: None,
        }
    }

    #[test]
    fn test_contains_half_open_interval() {
        let clip = test_clip();
        assert!(!clip.contains(1.999));
        assert!(clip.contains(2.0));
        assert!(clip.contains(5.999));
        assert!(!clip.contains(6.0));
    }

    #[test]
    fn test_source_time_ignores_speed() {
        let mut clip = test_clip();
        clip.start_time = 0.0;
        clip.trim_start = 1.0;
        clip.speed = 2.0;
        // Speed affects playback rate, not the trim/seek mapping.
        assert!((clip.source_time_at(3.0) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_fade_gain_ramps() {
        let mut clip = test_clip();
        clip.fade_in = 1.0;
        clip.fade_out = 2.0;
        assert!((clip.fade_gain_at(2.0) - 0.0).abs() < 1e-9);
        assert!((clip.fade_gain_at(2.5) - 0.5).abs() < 1e-9);
        assert!((clip.fade_gain_at(3.5) - 1.0).abs() < 1e-9);
        assert!((clip.fade_gain_at(5.0) - 0.5).abs() < 1e-9);
        assert_eq!(clip.fade_gain_at(7.0), 0.0);
    }

    #[test]
    fn test_position_new_clamps() {
        let pos = ClipPosition::new(0.9, 0.9, 0.5, 0.5);
        assert!(pos.x + pos.width <= 1.0 + 1e-9);
        assert!(pos.y + pos.height <= 1.0 + 1e-9);
    }

    #[test]
    fn test_position_minimum_dimension() {
        let pos = ClipPosition::new(0.0, 0.0, 0.001, 0.001);
        assert!((pos.width - MIN_CLIP_DIMENSION).abs() < 1e-9);
        assert!((pos.height - MIN_CLIP_DIMENSION).abs() < 1e-9);
    }

    #[test]
    fn test_validate_trim_window() {
        let clip = test_clip();
        let asset = MediaAsset {
            id: "a1".to_string(),
            kind: MediaKind::Video,
            path: "a1.mp4".to_string(),
            duration: 4.0, // trim_start 1.0 + duration 4.0 > 4.0
            width: 1920,
            height: 1080,
        };
        let errors = clip.validate(&asset);
        assert!(errors.iter().any(|e| e.contains("trim window")));
    }

    proptest! {
        #[test]
        fn test_new_position_always_valid(
            x in -2.0f64..3.0,
            y in -2.0f64..3.0,
            w in -1.0f64..3.0,
            h in -1.0f64..3.0,
        ) {
            let pos = ClipPosition::new(x, y, w, h);
            prop_assert!(pos.width >= MIN_CLIP_DIMENSION && pos.width <= 1.0);
            prop_assert!(pos.height >= MIN_CLIP_DIMENSION && pos.height <= 1.0);
            prop_assert!(pos.x >= 0.0 && pos.x + pos.width <= 1.0 + 1e-9);
            prop_assert!(pos.y >= 0.0 && pos.y + pos.height <= 1.0 + 1e-9);
        }

        #[test]
        fn test_clamped_is_valid_and_idempotent(
            x in -2.0f64..3.0,
            y in -2.0f64..3.0,
            w in -1.0f64..3.0,
            h in -1.0f64..3.0,
            rotation in -720.0f64..720.0,
        ) {
            let pos = ClipPosition {
                x,
                y,
                width: w,
                height: h,
                rotation,
                z_index: 0,
            };
            let clamped = pos.clamped();
            prop_assert!(clamped.width >= MIN_CLIP_DIMENSION && clamped.width <= 1.0);
            prop_assert!(clamped.height >= MIN_CLIP_DIMENSION && clamped.height <= 1.0);
            prop_assert!(clamped.x >= 0.0 && clamped.x + clamped.width <= 1.0 + 1e-9);
            prop_assert!(clamped.y >= 0.0 && clamped.y + clamped.height <= 1.0 + 1e-9);
            prop_assert!((0.0..360.0).contains(&clamped.rotation));
            // Already-valid placements pass through unchanged.
            prop_assert_eq!(clamped.clamped(), clamped);
        }
    }

    #[test]
    fn test_aspect_ratio() {
        let asset = MediaAsset {
            id: "a".to_string(),
            kind: MediaKind::Video,
            path: "a.mp4".to_string(),
            duration: 10.0,
            width: 1600,
            height: 1200,
        };
        assert!((asset.aspect_h_over_w().unwrap() - 0.75).abs() < 1e-9);
    }
}
