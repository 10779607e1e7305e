//! Playback synchronizer: keeps pooled handles phase-locked to the
//! playhead.
//!
//! Seeking a decoder is expensive, so the synchronizer only corrects a
//! handle when its position drifts past a threshold. The threshold is
//! asymmetric (looser while playing) and looser still while the user is
//! scrubbing, where actual seeks are additionally throttled to every few
//! ticks to avoid decoder thrash.

use std::collections::HashSet;

use mixcut_timeline_model::PlayheadState;

use crate::pool::MediaPool;
use crate::resolver::ActiveClip;
use crate::source::DecodableSource;

/// Drift tolerance while paused.
pub const SEEK_THRESHOLD_PAUSED: f64 = 0.1;
/// Drift tolerance while playing; looser to reduce needless re-seeks.
pub const SEEK_THRESHOLD_PLAYING: f64 = 0.15;
/// Drift tolerance while the user is actively scrubbing.
pub const SEEK_THRESHOLD_SCRUBBING: f64 = 0.2;
/// While scrubbing, only every Nth tick may issue an actual seek.
pub const SCRUB_SEEK_STRIDE: u64 = 3;

/// Pure seek decision, exercised directly by tests.
pub fn should_seek(
    current: f64,
    target: f64,
    is_playing: bool,
    user_seeking: bool,
    tick: u64,
) -> bool {
    let drift = (current - target).abs();
    if user_seeking {
        return drift > SEEK_THRESHOLD_SCRUBBING && tick % SCRUB_SEEK_STRIDE == 0;
    }
    let threshold = if is_playing {
        SEEK_THRESHOLD_PLAYING
    } else {
        SEEK_THRESHOLD_PAUSED
    };
    drift > threshold
}

/// Drives handle position/rate/volume/transport each tick.
#[derive(Debug, Default)]
pub struct PlaybackSync {
    tick: u64,
}

impl PlaybackSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// One synchronization pass.
    ///
    /// Inactive clips are paused first, so leaving a clip's active window
    /// never leaves stray audio or video running, then every active
    /// clip's handles are converged on the playhead.
    pub fn tick(
        &mut self,
        pool: &mut MediaPool,
        active: &[ActiveClip],
        playhead: PlayheadState,
        is_playing: bool,
    ) {
        self.tick += 1;

        let active_ids: HashSet<&str> = active.iter().map(|a| a.clip.id.as_str()).collect();

        // Pause everything that is not active before touching active
        // clips; ordering matters when a clip left its window this tick.
        for (id, handles) in pool.iter_mut() {
            if active_ids.contains(id.as_str()) {
                continue;
            }
            if let Some(ref mut video) = handles.video {
                pause_if_playing(video);
            }
            if let Some(ref mut audio) = handles.audio {
                pause_if_playing(audio);
            }
        }

        for entry in active {
            let clip = &entry.clip;
            let target = clip.source_time_at(playhead.position);
            let gain = clip.volume * clip.fade_gain_at(playhead.position);

            let Some(handles) = pool.get_mut(&clip.id) else {
                continue;
            };

            if let Some(ref mut video) = handles.video {
                self.converge(video, target, clip.speed, None, playhead, is_playing);
            }
            if let Some(ref mut audio) = handles.audio {
                self.converge(audio, target, clip.speed, Some(gain), playhead, is_playing);
            }
        }
    }

    fn converge(
        &self,
        handle: &mut DecodableSource,
        target: f64,
        speed: f64,
        gain: Option<f64>,
        playhead: PlayheadState,
        is_playing: bool,
    ) {
        if should_seek(
            handle.position(),
            target,
            is_playing,
            playhead.user_seeking,
            self.tick,
        ) {
            handle.seek(target);
        }

        handle.set_rate(speed);
        if let Some(gain) = gain {
            handle.set_volume(gain);
        }

        if is_playing {
            if !handle.is_playing() {
                // Rejection here is steady-state noise when transport is
                // toggled rapidly; not surfaced, not retried.
                if let Err(e) = handle.play() {
                    tracing::trace!(error = %e, "play() rejected");
                }
            }
        } else {
            pause_if_playing(handle);
        }
    }
}

fn pause_if_playing(handle: &mut DecodableSource) {
    if handle.is_playing() {
        handle.pause();
    }
}
