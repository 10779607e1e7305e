//! Clip resolution: which clips are active at a playhead time.

use mixcut_timeline_model::{Clip, MediaAsset, Track};

/// A clip that is active at the sampled time, with its resolved asset and
/// the order of the track it sits on.
#[derive(Debug, Clone)]
pub struct ActiveClip {
    pub clip: Clip,
    pub asset: MediaAsset,
    pub track_order: i32,
}

/// Return the clips active at `time`, sorted by ascending track order so
/// later entries paint over earlier ones (background first, foreground
/// last).
///
/// A clip is active iff its track is visible and
/// `time ∈ [start_time, start_time + duration)`. Clips whose asset cannot
/// be resolved are skipped; that is expected while imports are still
/// loading. Pure function, safe to call every frame.
pub fn active_clips(
    time: f64,
    tracks: &[Track],
    lookup: &dyn Fn(&str) -> Option<MediaAsset>,
) -> Vec<ActiveClip> {
    let mut active: Vec<ActiveClip> = Vec::new();

    for track in tracks {
        if !track.visible {
            continue;
        }
        for clip in &track.clips {
            if !clip.contains(time) {
                continue;
            }
            match lookup(&clip.asset_id) {
                Some(asset) => active.push(ActiveClip {
                    clip: clip.clone(),
                    asset,
                    track_order: track.order,
                }),
                None => {
                    tracing::debug!(clip_id = %clip.id, asset_id = %clip.asset_id, "asset not resolved yet, skipping clip");
                }
            }
        }
    }

    active.sort_by_key(|a| a.track_order);
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixcut_timeline_model::{ClipPosition, MediaKind};

    fn asset(id: &str) -> MediaAsset {
        MediaAsset {
            id: id.to_string(),
            kind: MediaKind::Video,
            path: format!("{id}.mp4"),
            duration: 60.0,
            width: 1920,
            height: 1080,
        }
    }

    fn clip(id: &str, asset_id: &str, start: f64, duration: f64) -> Clip {
        Clip {
            id: id.to_string(),
            asset_id: asset_id.to_string(),
            start_time: start,
            duration,
            trim_start: 0.0,
            trim_end: duration,
            speed: 1.0,
            volume: 1.0,
            fade_in: 0.0,
            fade_out: 0.0,
            position: None,
        }
    }

    fn lookup(_: &str) -> Option<MediaAsset> {
        Some(asset("a"))
    }

    #[test]
    fn test_half_open_interval_membership() {
        let mut track = Track::new(0);
        track.clips.push(clip("c1", "a", 1.0, 2.0));
        let tracks = vec![track];

        assert!(active_clips(0.999, &tracks, &lookup).is_empty());
        assert_eq!(active_clips(1.0, &tracks, &lookup).len(), 1);
        assert_eq!(active_clips(2.999, &tracks, &lookup).len(), 1);
        assert!(active_clips(3.0, &tracks, &lookup).is_empty());
    }

    #[test]
    fn test_sorted_by_ascending_track_order() {
        let mut t2 = Track::new(2);
        t2.clips.push(clip("fg", "a", 0.0, 10.0));
        let mut t0 = Track::new(0);
        t0.clips.push(clip("bg", "a", 0.0, 10.0));
        let mut t1 = Track::new(1);
        t1.clips.push(clip("mid", "a", 0.0, 10.0));

        // Tracks intentionally out of order.
        let tracks = vec![t2, t0, t1];
        let active = active_clips(5.0, &tracks, &lookup);
        let ids: Vec<&str> = active.iter().map(|a| a.clip.id.as_str()).collect();
        assert_eq!(ids, vec!["bg", "mid", "fg"]);
    }

    #[test]
    fn test_invisible_track_excluded() {
        let mut track = Track::new(0);
        track.clips.push(clip("c1", "a", 0.0, 10.0));
        track.visible = false;
        assert!(active_clips(5.0, &[track], &lookup).is_empty());
    }

    #[test]
    fn test_missing_asset_skipped() {
        let mut track = Track::new(0);
        track.clips.push(clip("c1", "pending", 0.0, 10.0));
        let none = |_: &str| None;
        assert!(active_clips(5.0, &[track], &none).is_empty());
    }

    #[test]
    fn test_no_active_clips_returns_empty() {
        let mut track = Track::new(0);
        track.clips.push(clip("c1", "a", 10.0, 5.0));
        assert!(active_clips(3.0, &[track], &lookup).is_empty());
    }

    #[test]
    fn test_layered_scenario_background_then_overlay() {
        // Clip A (no position) spans [0,5) on track 0; clip B (positioned)
        // spans [2,8) on track 1. At t=3 both are active, A first.
        let mut t0 = Track::new(0);
        t0.clips.push(clip("A", "a", 0.0, 5.0));
        let mut t1 = Track::new(1);
        let mut b = clip("B", "a", 2.0, 6.0);
        b.position = Some(ClipPosition {
            x: 0.5,
            y: 0.0,
            width: 0.5,
            height: 0.5,
            rotation: 0.0,
            z_index: 0,
        });
        t1.clips.push(b);

        let active = active_clips(3.0, &[t0, t1], &lookup);
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].clip.id, "A");
        assert!(active[0].clip.position.is_none());
        assert_eq!(active[1].clip.id, "B");
        assert!(active[1].clip.position.is_some());
    }
}
