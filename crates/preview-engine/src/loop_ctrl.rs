//! Render loop controller: decides whether a frame is worth producing.
//!
//! The loop is an explicit two-state machine. While **Active** it is
//! scheduled on every frame callback; when nothing observable changed it
//! drops to **Idle** and stops being scheduled (idle-skip). External
//! inputs raise a pending-render flag and wake it. Because media loads
//! asynchronously and may complete after the loop suspended, a
//! low-frequency watchdog re-checks "pending but idle" and restarts the
//! loop; without it a late `CanPlay` would never be drawn.

use mixcut_common::Watchdog;
use mixcut_timeline_model::{ClipPosition, TimelineStore};

/// Watchdog poll interval.
pub const WATCHDOG_INTERVAL_MS: u64 = 50;

/// Scheduling state of the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Scheduled via next-frame callback.
    Active,
    /// Not scheduled; waiting for input or the watchdog.
    Idle,
}

/// Outcome of a tick: draw a frame, or suspend the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    Render,
    Suspend,
}

/// Everything the preview output depends on, captured once per tick and
/// compared structurally against the previous tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    /// Playhead quantized to milliseconds; sub-ms jitter is not visible.
    pub playhead_ms: i64,
    pub is_playing: bool,
    pub background_color: String,
    pub show_grid: bool,
    /// Per-clip placement (id, rect+rotation).
    pub clip_geometry: Vec<(String, Option<ClipPosition>)>,
    /// Sorted selection, so set ordering never fakes a change.
    pub selected: Vec<String>,
}

impl RenderSnapshot {
    /// Capture the current observable state from the store.
    pub fn capture(store: &dyn TimelineStore) -> Self {
        let mut clip_geometry = Vec::new();
        for track in store.tracks() {
            for clip in &track.clips {
                clip_geometry.push((clip.id.clone(), clip.position));
            }
        }
        let mut selected: Vec<String> = store.selected_clip_ids().into_iter().collect();
        selected.sort();
        Self {
            playhead_ms: (store.playhead().position * 1000.0).round() as i64,
            is_playing: store.is_playing(),
            background_color: store.background_color(),
            show_grid: store.show_grid(),
            clip_geometry,
            selected,
        }
    }
}

/// The loop controller proper. Holds owned fields and pure transitions;
/// no externally mutated cells.
#[derive(Debug)]
pub struct RenderLoop {
    state: LoopState,
    last_snapshot: Option<RenderSnapshot>,
    pending_render: bool,
    first_render_done: bool,
    watchdog: Watchdog,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Active,
            last_snapshot: None,
            pending_render: false,
            first_render_done: false,
            watchdog: Watchdog::new(WATCHDOG_INTERVAL_MS),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// External input (prop change, clip mutation, a handle reaching
    /// `CanPlay`). Raises the pending flag and wakes an idle loop.
    /// Returns true if the loop transitioned Idle→Active.
    pub fn request_render(&mut self) -> bool {
        self.pending_render = true;
        if self.state == LoopState::Idle {
            self.state = LoopState::Active;
            true
        } else {
            false
        }
    }

    /// Evaluate one scheduled tick.
    ///
    /// The very first tick always renders. Afterwards the loop suspends
    /// exactly when: transport stopped, nothing pending, no clip seeking,
    /// and the snapshot is unchanged from the previous tick.
    pub fn begin_tick(&mut self, snapshot: RenderSnapshot, any_seeking: bool) -> TickDecision {
        // A stray frame callback can still land after suspension; it must
        // not resurrect the loop on its own.
        if self.state == LoopState::Idle {
            return TickDecision::Suspend;
        }

        let unchanged = self.last_snapshot.as_ref() == Some(&snapshot);
        let skip = !snapshot.is_playing
            && self.first_render_done
            && !self.pending_render
            && !any_seeking
            && unchanged;

        if skip {
            self.state = LoopState::Idle;
            return TickDecision::Suspend;
        }

        self.first_render_done = true;
        self.pending_render = false;
        self.last_snapshot = Some(snapshot);
        TickDecision::Render
    }

    /// Low-frequency idle-recovery check. Returns true when the loop was
    /// idle with a pending render and has been reactivated.
    pub fn watchdog_poll(&mut self, now_ns: u64) -> bool {
        if !self.watchdog.due(now_ns) {
            return false;
        }
        if self.state == LoopState::Idle && self.pending_render {
            self.state = LoopState::Active;
            tracing::debug!("watchdog restarted idle render loop");
            return true;
        }
        false
    }

    /// Drop scheduling entirely (teardown).
    pub fn shutdown(&mut self) {
        self.state = LoopState::Idle;
        self.pending_render = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(playhead_ms: i64, playing: bool) -> RenderSnapshot {
        RenderSnapshot {
            playhead_ms,
            is_playing: playing,
            background_color: "#1a1a1a".to_string(),
            show_grid: false,
            clip_geometry: vec![("c1".to_string(), None)],
            selected: vec![],
        }
    }

    #[test]
    fn test_first_tick_always_renders() {
        let mut ctrl = RenderLoop::new();
        assert_eq!(
            ctrl.begin_tick(snapshot(0, false), false),
            TickDecision::Render
        );
    }

    #[test]
    fn test_idle_skip_after_one_identical_frame() {
        // Paused with no mutation: exactly one frame, then suspension.
        let mut ctrl = RenderLoop::new();
        assert_eq!(
            ctrl.begin_tick(snapshot(0, false), false),
            TickDecision::Render
        );
        assert_eq!(
            ctrl.begin_tick(snapshot(0, false), false),
            TickDecision::Suspend
        );
        assert_eq!(ctrl.state(), LoopState::Idle);
    }

    #[test]
    fn test_playing_never_suspends() {
        let mut ctrl = RenderLoop::new();
        for tick in 0..5 {
            assert_eq!(
                ctrl.begin_tick(snapshot(tick * 16, true), false),
                TickDecision::Render
            );
        }
        // Even an unchanged snapshot keeps rendering while playing.
        assert_eq!(
            ctrl.begin_tick(snapshot(64, true), false),
            TickDecision::Render
        );
    }

    #[test]
    fn test_snapshot_change_renders() {
        let mut ctrl = RenderLoop::new();
        ctrl.begin_tick(snapshot(0, false), false);
        assert_eq!(
            ctrl.begin_tick(snapshot(100, false), false),
            TickDecision::Render
        );
    }

    #[test]
    fn test_seeking_clip_blocks_suspension() {
        let mut ctrl = RenderLoop::new();
        ctrl.begin_tick(snapshot(0, false), false);
        assert_eq!(
            ctrl.begin_tick(snapshot(0, false), true),
            TickDecision::Render
        );
    }

    #[test]
    fn test_request_render_wakes_idle_loop() {
        let mut ctrl = RenderLoop::new();
        ctrl.begin_tick(snapshot(0, false), false);
        ctrl.begin_tick(snapshot(0, false), false);
        assert_eq!(ctrl.state(), LoopState::Idle);

        assert!(ctrl.request_render());
        assert_eq!(ctrl.state(), LoopState::Active);
        assert_eq!(
            ctrl.begin_tick(snapshot(0, false), false),
            TickDecision::Render
        );
    }

    #[test]
    fn test_watchdog_restarts_idle_loop_with_pending_render() {
        let mut ctrl = RenderLoop::new();
        ctrl.begin_tick(snapshot(0, false), false);
        ctrl.begin_tick(snapshot(0, false), false);
        assert_eq!(ctrl.state(), LoopState::Idle);

        // Async decode completed while idle: only the flag is raised,
        // e.g. by a readiness poll that doesn't call request_render.
        ctrl.pending_render = true;

        assert!(!ctrl.watchdog_poll(0)); // arming poll
        assert!(ctrl.watchdog_poll(60_000_000)); // 60ms later
        assert_eq!(ctrl.state(), LoopState::Active);
    }

    #[test]
    fn test_watchdog_quiet_without_pending_render() {
        let mut ctrl = RenderLoop::new();
        ctrl.begin_tick(snapshot(0, false), false);
        ctrl.begin_tick(snapshot(0, false), false);

        assert!(!ctrl.watchdog_poll(0));
        assert!(!ctrl.watchdog_poll(60_000_000));
        assert_eq!(ctrl.state(), LoopState::Idle);
    }

    #[test]
    fn test_selection_order_does_not_fake_change() {
        let mut a = snapshot(0, false);
        a.selected = vec!["x".to_string(), "y".to_string()];
        let b = a.clone();
        assert_eq!(a, b);
    }
}
