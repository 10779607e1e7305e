//! Media element pool: one playback handle per clip that exists on any
//! visible track.
//!
//! Handle lifecycle is tied to *existence in tracks*, not to being under
//! the playhead, so scrubbing across a clip never pays first-frame decode
//! latency. `sync` is idempotent and cheap when nothing changed: it
//! compares the current clip-id set against the previous one before doing
//! any work.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use mixcut_timeline_model::{MediaAsset, Track};

use crate::source::{ClockOpener, DecodableSource, Readiness, SourceOpener};

/// Video and audio handles for one clip.
///
/// Video/image assets get a muted frame-bearing handle; video/audio
/// assets get a separate audio handle. Audio never routes through the
/// video handle (double-playback hazard).
pub struct ClipHandles {
    pub video: Option<DecodableSource>,
    pub audio: Option<DecodableSource>,
    last_readiness: Readiness,
}

impl ClipHandles {
    fn for_asset(asset: &MediaAsset, opener: &dyn SourceOpener) -> Self {
        let video = if asset.kind.has_video() {
            let backend = opener.open_video(asset);
            Some(match asset.kind {
                mixcut_timeline_model::MediaKind::Image => DecodableSource::Image(backend),
                _ => DecodableSource::Video(backend),
            })
        } else {
            None
        };
        let audio = asset
            .kind
            .has_audio()
            .then(|| DecodableSource::Audio(opener.open_audio(asset)));
        Self {
            video,
            audio,
            last_readiness: Readiness::Opening,
        }
    }

    /// Least-ready of the two handles.
    fn readiness(&self) -> Readiness {
        [self.video.as_ref(), self.audio.as_ref()]
            .into_iter()
            .flatten()
            .map(|h| h.readiness())
            .min()
            .unwrap_or(Readiness::CanPlay)
    }

    fn dispose(&mut self) {
        if let Some(ref mut v) = self.video {
            v.dispose();
        }
        if let Some(ref mut a) = self.audio {
            a.dispose();
        }
    }
}

/// Pool of playback handles keyed by clip id.
pub struct MediaPool {
    opener: Arc<dyn SourceOpener>,
    handles: HashMap<String, ClipHandles>,
    known_ids: HashSet<String>,
}

impl MediaPool {
    pub fn new(opener: Arc<dyn SourceOpener>) -> Self {
        Self {
            opener,
            handles: HashMap::new(),
            known_ids: HashSet::new(),
        }
    }

    pub fn with_default_opener() -> Self {
        Self::new(Arc::new(ClockOpener))
    }

    /// Reconcile the pool against the current tracks.
    ///
    /// Creates handles for newly appeared clips (on visible tracks) and
    /// disposes handles whose clip disappeared from every track. Clips
    /// whose asset has not resolved yet stay out of the pool and are
    /// retried on the next sync.
    pub fn sync(&mut self, tracks: &[Track], lookup: &dyn Fn(&str) -> Option<MediaAsset>) {
        let desired: HashSet<String> = tracks
            .iter()
            .filter(|t| t.visible)
            .flat_map(|t| t.clips.iter())
            .map(|c| c.id.clone())
            .collect();

        if desired == self.known_ids {
            return;
        }

        // Dispose handles for clips that no longer exist anywhere.
        let stale: Vec<String> = self
            .handles
            .keys()
            .filter(|id| !desired.contains(*id))
            .cloned()
            .collect();
        for id in stale {
            if let Some(mut handles) = self.handles.remove(&id) {
                handles.dispose();
                tracing::debug!(clip_id = %id, "disposed playback handles");
            }
        }

        // Create handles for new clips whose asset is available.
        for track in tracks.iter().filter(|t| t.visible) {
            for clip in &track.clips {
                if self.handles.contains_key(&clip.id) {
                    continue;
                }
                if let Some(asset) = lookup(&clip.asset_id) {
                    self.handles
                        .insert(clip.id.clone(), ClipHandles::for_asset(&asset, &*self.opener));
                    tracing::debug!(clip_id = %clip.id, asset_id = %asset.id, "created playback handles");
                }
            }
        }

        // Remember the resolved set only; unresolved assets keep the
        // desired/known sets unequal so they are retried next sync.
        self.known_ids = self.handles.keys().cloned().collect();
    }

    pub fn get_mut(&mut self, clip_id: &str) -> Option<&mut ClipHandles> {
        self.handles.get_mut(clip_id)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut ClipHandles)> {
        self.handles.iter_mut()
    }

    pub fn contains(&self, clip_id: &str) -> bool {
        self.handles.contains_key(clip_id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// True if any handle's readiness advanced since the previous poll.
    /// The render loop uses this to schedule a frame for media that
    /// finished loading after the loop went idle.
    pub fn poll_readiness_events(&mut self) -> bool {
        let mut advanced = false;
        for handles in self.handles.values_mut() {
            let now = handles.readiness();
            if now > handles.last_readiness {
                handles.last_readiness = now;
                advanced = true;
            }
        }
        advanced
    }

    /// Dispose every handle. Called on teardown so no decoder outlives
    /// the engine.
    pub fn dispose_all(&mut self) {
        for (_, mut handles) in self.handles.drain() {
            handles.dispose();
        }
        self.known_ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixcut_timeline_model::{Clip, MediaKind};

    fn clip(id: &str, asset_id: &str) -> Clip {
        Clip {
            id: id.to_string(),
            asset_id: asset_id.to_string(),
            start_time: 0.0,
            duration: 5.0,
            trim_start: 0.0,
            trim_end: 5.0,
            speed: 1.0,
            volume: 1.0,
            fade_in: 0.0,
            fade_out: 0.0,
            position: None,
        }
    }

    fn asset(id: &str, kind: MediaKind) -> MediaAsset {
        MediaAsset {
            id: id.to_string(),
            kind,
            path: format!("{id}.bin"),
            duration: 30.0,
            width: 64,
            height: 36,
        }
    }

    fn video_lookup(id: &str) -> Option<MediaAsset> {
        Some(asset(id, MediaKind::Video))
    }

    #[test]
    fn test_sync_creates_video_and_audio_handles() {
        let mut pool = MediaPool::with_default_opener();
        let mut track = Track::new(0);
        track.clips.push(clip("c1", "a1"));

        pool.sync(&[track], &video_lookup);
        assert_eq!(pool.len(), 1);
        let handles = pool.get_mut("c1").unwrap();
        assert!(handles.video.is_some());
        assert!(handles.audio.is_some());
    }

    #[test]
    fn test_audio_asset_gets_no_video_handle() {
        let mut pool = MediaPool::with_default_opener();
        let mut track = Track::new(0);
        track.clips.push(clip("c1", "a1"));
        let lookup = |id: &str| Some(asset(id, MediaKind::Audio));

        pool.sync(&[track], &lookup);
        let handles = pool.get_mut("c1").unwrap();
        assert!(handles.video.is_none());
        assert!(handles.audio.is_some());
    }

    #[test]
    fn test_image_asset_gets_image_handle_only() {
        let mut pool = MediaPool::with_default_opener();
        let mut track = Track::new(0);
        track.clips.push(clip("c1", "a1"));
        let lookup = |id: &str| Some(asset(id, MediaKind::Image));

        pool.sync(&[track], &lookup);
        let handles = pool.get_mut("c1").unwrap();
        assert!(matches!(
            handles.video.as_ref().map(|v| v.kind()),
            Some(crate::source::SourceKind::Image)
        ));
        assert!(handles.audio.is_none());
    }

    #[test]
    fn test_removed_clip_is_disposed() {
        let mut pool = MediaPool::with_default_opener();
        let mut track = Track::new(0);
        track.clips.push(clip("c1", "a1"));
        track.clips.push(clip("c2", "a2"));
        pool.sync(&[track.clone()], &video_lookup);
        assert_eq!(pool.len(), 2);

        track.clips.retain(|c| c.id != "c2");
        pool.sync(&[track], &video_lookup);
        assert_eq!(pool.len(), 1);
        assert!(!pool.contains("c2"));
    }

    #[test]
    fn test_invisible_track_holds_no_handles() {
        let mut pool = MediaPool::with_default_opener();
        let mut track = Track::new(0);
        track.clips.push(clip("c1", "a1"));
        track.visible = false;
        pool.sync(&[track.clone()], &video_lookup);
        assert!(pool.is_empty());

        track.visible = true;
        pool.sync(&[track], &video_lookup);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_sync_idempotent_when_unchanged() {
        let mut pool = MediaPool::with_default_opener();
        let mut track = Track::new(0);
        track.clips.push(clip("c1", "a1"));
        pool.sync(&[track.clone()], &video_lookup);
        pool.get_mut("c1").unwrap().video.as_mut().unwrap().seek(3.0);

        // A second sync with identical tracks must not recreate handles.
        pool.sync(&[track], &video_lookup);
        let pos = pool.get_mut("c1").unwrap().video.as_ref().unwrap().position();
        assert!((pos - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_unresolved_asset_retried_next_sync() {
        let mut pool = MediaPool::with_default_opener();
        let mut track = Track::new(0);
        track.clips.push(clip("c1", "a1"));

        let none = |_: &str| None;
        pool.sync(&[track.clone()], &none);
        assert!(pool.is_empty());

        pool.sync(&[track], &video_lookup);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_readiness_event_fires_once() {
        let mut pool = MediaPool::with_default_opener();
        let mut track = Track::new(0);
        track.clips.push(clip("c1", "a1"));
        pool.sync(&[track], &video_lookup);

        // ClockBackend is immediately CanPlay; the first poll observes the
        // transition, later polls stay quiet.
        assert!(pool.poll_readiness_events());
        assert!(!pool.poll_readiness_events());
    }

    #[test]
    fn test_dispose_all_empties_pool() {
        let mut pool = MediaPool::with_default_opener();
        let mut track = Track::new(0);
        track.clips.push(clip("c1", "a1"));
        pool.sync(&[track], &video_lookup);
        pool.dispose_all();
        assert!(pool.is_empty());
    }
}
