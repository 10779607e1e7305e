//! Track container and timeline document.

use serde::{Deserialize, Serialize};

use crate::clip::{Clip, MediaAsset};

/// A horizontal lane of clips.
///
/// `order` doubles as display priority: tracks with a higher order paint
/// later, i.e. on top of lower-order tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Display / z priority. Higher paints on top.
    pub order: i32,

    /// Clips in insertion order. Clips within one track never overlap in
    /// time; see [`Track::overlap_errors`].
    pub clips: Vec<Clip>,

    /// Invisible tracks contribute nothing to the preview and hold no
    /// playback handles.
    #[serde(default = "default_true")]
    pub visible: bool,

    /// Locked tracks reject interaction edits.
    #[serde(default)]
    pub locked: bool,
}

fn default_true() -> bool {
    true
}

impl Track {
    /// Create an empty visible track at the given order.
    pub fn new(order: i32) -> Self {
        Self {
            order,
            clips: Vec::new(),
            visible: true,
            locked: false,
        }
    }

    /// Report any pairs of clips on this track whose time windows overlap.
    pub fn overlap_errors(&self) -> Vec<String> {
        let mut errors = vec![];
        let mut sorted: Vec<&Clip> = self.clips.iter().collect();
        sorted.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        for pair in sorted.windows(2) {
            if pair[1].start_time < pair[0].end_time() - 1e-9 {
                errors.push(format!(
                    "track {}: clips {} and {} overlap",
                    self.order, pair[0].id, pair[1].id
                ));
            }
        }
        errors
    }
}

/// A serializable timeline: tracks plus the assets they reference.
///
/// This is the document the CLI and tests load from JSON; the live editor
/// owns the same data behind its store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineDoc {
    pub tracks: Vec<Track>,
    pub assets: Vec<MediaAsset>,
}

impl TimelineDoc {
    /// Parse a timeline document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate the whole document: clip invariants against their assets,
    /// per-track overlap, and dangling asset references.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];
        for track in &self.tracks {
            errors.extend(track.overlap_errors());
            for clip in &track.clips {
                match self.assets.iter().find(|a| a.id == clip.asset_id) {
                    Some(asset) => errors.extend(clip.validate(asset)),
                    None => errors.push(format!(
                        "clip {}: references missing asset {}",
                        clip.id, clip.asset_id
                    )),
                }
            }
        }
        errors
    }

    /// Total timeline length: the latest clip end across all tracks.
    pub fn duration(&self) -> f64 {
        self.tracks
            .iter()
            .flat_map(|t| t.clips.iter())
            .map(|c| c.end_time())
            .fold(0.0, f64::max)
    }
}
