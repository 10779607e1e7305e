//! The store seam between the compositor and the timeline owner.
//!
//! The compositor never reaches into a global store. It receives a
//! `Arc<dyn TimelineStore>` at construction and reads tracks, playhead,
//! and selection through it; the interaction engine writes clip updates
//! back through the same interface. [`MemoryStore`] is the in-process
//! implementation used by tests and the CLI.

use std::collections::HashSet;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::clip::{ClipPosition, MediaAsset, PlayheadState};
use crate::track::{TimelineDoc, Track};

/// Partial clip update, the concrete shape of `update_clip(id, partial)`.
/// Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipPatch {
    pub start_time: Option<f64>,
    pub duration: Option<f64>,
    pub trim_start: Option<f64>,
    pub trim_end: Option<f64>,
    pub speed: Option<f64>,
    pub volume: Option<f64>,
    pub position: Option<ClipPosition>,
}

impl ClipPatch {
    /// A patch that only moves/resizes the clip on the canvas.
    pub fn position(position: ClipPosition) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Read/update interface the compositor is constructed with.
pub trait TimelineStore: Send + Sync {
    /// Current tracks, cheap enough to call every frame.
    fn tracks(&self) -> Vec<Track>;

    /// Look up an asset by id. `None` is expected during async import.
    fn media_asset(&self, asset_id: &str) -> Option<MediaAsset>;

    /// Apply a partial update to a clip. Unknown ids are ignored.
    fn update_clip(&self, clip_id: &str, patch: ClipPatch);

    /// Current playhead position and scrub state.
    fn playhead(&self) -> PlayheadState;

    /// Global transport state.
    fn is_playing(&self) -> bool;

    /// Ids of currently selected clips.
    fn selected_clip_ids(&self) -> HashSet<String>;

    /// Replace the selection set.
    fn set_selected_clip_ids(&self, ids: HashSet<String>);

    /// Preview background color as a `#rrggbb` hex string.
    fn background_color(&self) -> String;

    /// Whether the alignment grid is drawn.
    fn show_grid(&self) -> bool;
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    doc: TimelineDoc,
    playhead: PlayheadState,
    playing: bool,
    selected: HashSet<String>,
    background_color: String,
    show_grid: bool,
}

/// In-memory store implementation for tests and the CLI.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

impl MemoryStore {
    pub fn new(doc: TimelineDoc) -> Self {
        Self {
            inner: Mutex::new(MemoryStoreInner {
                doc,
                background_color: "#1a1a1a".to_string(),
                ..MemoryStoreInner::default()
            }),
        }
    }

    pub fn set_playhead(&self, position: f64, user_seeking: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.playhead = PlayheadState {
            position,
            user_seeking,
        };
    }

    pub fn set_playing(&self, playing: bool) {
        self.inner.lock().unwrap().playing = playing;
    }

    pub fn set_show_grid(&self, show: bool) {
        self.inner.lock().unwrap().show_grid = show;
    }

    pub fn set_background_color(&self, color: impl Into<String>) {
        self.inner.lock().unwrap().background_color = color.into();
    }

    /// Replace the whole document (e.g. after loading a project file).
    pub fn replace_doc(&self, doc: TimelineDoc) {
        self.inner.lock().unwrap().doc = doc;
    }

    /// Snapshot of the current document.
    pub fn doc(&self) -> TimelineDoc {
        self.inner.lock().unwrap().doc.clone()
    }
}

impl TimelineStore for MemoryStore {
    fn tracks(&self) -> Vec<Track> {
        self.inner.lock().unwrap().doc.tracks.clone()
    }

    fn media_asset(&self, asset_id: &str) -> Option<MediaAsset> {
        self.inner
            .lock()
            .unwrap()
            .doc
            .assets
            .iter()
            .find(|a| a.id == asset_id)
            .cloned()
    }

    fn update_clip(&self, clip_id: &str, patch: ClipPatch) {
        let mut inner = self.inner.lock().unwrap();
        for track in &mut inner.doc.tracks {
            if track.locked {
                continue;
            }
            if let Some(clip) = track.clips.iter_mut().find(|c| c.id == clip_id) {
                if let Some(v) = patch.start_time {
                    clip.start_time = v;
                }
                if let Some(v) = patch.duration {
                    clip.duration = v;
                }
                if let Some(v) = patch.trim_start {
                    clip.trim_start = v;
                }
                if let Some(v) = patch.trim_end {
                    clip.trim_end = v;
                }
                if let Some(v) = patch.speed {
                    clip.speed = v.clamp(0.25, 16.0);
                }
                if let Some(v) = patch.volume {
                    clip.volume = v.clamp(0.0, 2.0);
                }
                if let Some(p) = patch.position {
                    clip.position = Some(p.clamped());
                }
                return;
            }
        }
        tracing::debug!(clip_id, "update_clip: no such clip");
    }

    fn playhead(&self) -> PlayheadState {
        self.inner.lock().unwrap().playhead
    }

    fn is_playing(&self) -> bool {
        self.inner.lock().unwrap().playing
    }

    fn selected_clip_ids(&self) -> HashSet<String> {
        self.inner.lock().unwrap().selected.clone()
    }

    fn set_selected_clip_ids(&self, ids: HashSet<String>) {
        self.inner.lock().unwrap().selected = ids;
    }

    fn background_color(&self) -> String {
        self.inner.lock().unwrap().background_color.clone()
    }

    fn show_grid(&self) -> bool {
        self.inner.lock().unwrap().show_grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::{Clip, MediaKind};

    fn store_with_one_clip() -> MemoryStore {
        let mut track = Track::new(0);
        track.clips.push(Clip {
            id: "c1".to_string(),
            asset_id: "a1".to_string(),
            start_time: 0.0,
            duration: 5.0,
            trim_start: 0.0,
            trim_end: 5.0,
            speed: 1.0,
            volume: 1.0,
            fade_in: 0.0,
            fade_out: 0.0,
            position: None,
        });
        MemoryStore::new(TimelineDoc {
            tracks: vec![track],
            assets: vec![MediaAsset {
                id: "a1".to_string(),
                kind: MediaKind::Video,
                path: "a1.mp4".to_string(),
                duration: 30.0,
                width: 1920,
                height: 1080,
            }],
        })
    }

    #[test]
    fn test_update_clip_applies_patch() {
        let store = store_with_one_clip();
        store.update_clip(
            "c1",
            ClipPatch {
                start_time: Some(2.0),
                speed: Some(2.0),
                ..ClipPatch::default()
            },
        );
        let tracks = store.tracks();
        assert!((tracks[0].clips[0].start_time - 2.0).abs() < 1e-9);
        assert!((tracks[0].clips[0].speed - 2.0).abs() < 1e-9);
        // Untouched fields survive.
        assert!((tracks[0].clips[0].duration - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_update_clip_clamps_speed_and_volume() {
        let store = store_with_one_clip();
        store.update_clip(
            "c1",
            ClipPatch {
                speed: Some(100.0),
                volume: Some(-1.0),
                ..ClipPatch::default()
            },
        );
        let clip = store.tracks()[0].clips[0].clone();
        assert!((clip.speed - 16.0).abs() < 1e-9);
        assert_eq!(clip.volume, 0.0);
    }

    #[test]
    fn test_locked_track_rejects_updates() {
        let store = store_with_one_clip();
        {
            let mut doc = store.doc();
            doc.tracks[0].locked = true;
            store.replace_doc(doc);
        }
        store.update_clip(
            "c1",
            ClipPatch {
                start_time: Some(9.0),
                ..ClipPatch::default()
            },
        );
        assert_eq!(store.tracks()[0].clips[0].start_time, 0.0);
    }

    #[test]
    fn test_missing_asset_returns_none() {
        let store = store_with_one_clip();
        assert!(store.media_asset("a1").is_some());
        assert!(store.media_asset("absent").is_none());
    }
}
