//! Preview engine: one cooperative tick wiring resolver, pool,
//! synchronizer, loop controller, and compositor together.

use std::sync::Arc;

use image::RgbaImage;
use mixcut_common::MixcutResult;
use mixcut_timeline_model::TimelineStore;

use crate::compositor::{FrameCompositor, Layer};
use crate::loop_ctrl::{LoopState, RenderLoop, RenderSnapshot, TickDecision};
use crate::pool::MediaPool;
use crate::resolver::active_clips;
use crate::source::{ClockOpener, SourceOpener};
use crate::sync::PlaybackSync;

/// The live preview compositor.
///
/// Constructed with an injected store and source opener; never touches
/// globals. The host calls [`PreviewEngine::tick`] from its frame
/// callback while the loop is active, and [`PreviewEngine::poll_watchdog`]
/// from a coarse timer regardless.
pub struct PreviewEngine {
    store: Arc<dyn TimelineStore>,
    pool: MediaPool,
    playback: PlaybackSync,
    loop_ctrl: RenderLoop,
    compositor: FrameCompositor,
    torn_down: bool,
}

impl PreviewEngine {
    /// Create an engine with the default clock-driven decode backends.
    pub fn new(store: Arc<dyn TimelineStore>, width: u32, height: u32, render_scale: f64) -> Self {
        Self::with_opener(store, Arc::new(ClockOpener), width, height, render_scale)
    }

    pub fn with_opener(
        store: Arc<dyn TimelineStore>,
        opener: Arc<dyn SourceOpener>,
        width: u32,
        height: u32,
        render_scale: f64,
    ) -> Self {
        let scale = render_scale.clamp(0.25, 2.0);
        let surface_w = (width as f64 * scale).round() as u32;
        let surface_h = (height as f64 * scale).round() as u32;
        Self {
            store,
            pool: MediaPool::new(opener),
            playback: PlaybackSync::new(),
            loop_ctrl: RenderLoop::new(),
            compositor: FrameCompositor::new(surface_w, surface_h),
            torn_down: false,
        }
    }

    /// Whether the host should keep scheduling frame callbacks.
    pub fn is_scheduled(&self) -> bool {
        !self.torn_down && self.loop_ctrl.state() == LoopState::Active
    }

    /// External change notification (prop change, clip mutation).
    pub fn notify_change(&mut self) {
        if !self.torn_down {
            self.loop_ctrl.request_render();
        }
    }

    /// The drawable output surface.
    pub fn surface(&self) -> &RgbaImage {
        self.compositor.surface()
    }

    /// Apply a new render-scale preference against the same base size.
    pub fn set_surface_size(&mut self, width: u32, height: u32, render_scale: f64) {
        let scale = render_scale.clamp(0.25, 2.0);
        self.compositor.resize(
            (width as f64 * scale).round() as u32,
            (height as f64 * scale).round() as u32,
        );
        self.loop_ctrl.request_render();
    }

    /// One cooperative frame. Returns whether a frame was rendered.
    ///
    /// The draw and every synchronizer side effect complete before this
    /// returns; the host schedules the next tick only afterwards.
    pub fn tick(&mut self) -> MixcutResult<bool> {
        if self.torn_down {
            return Ok(false);
        }

        let playhead = self.store.playhead();
        let is_playing = self.store.is_playing();
        let snapshot = RenderSnapshot::capture(self.store.as_ref());

        match self.loop_ctrl.begin_tick(snapshot, playhead.user_seeking) {
            TickDecision::Suspend => return Ok(false),
            TickDecision::Render => {}
        }

        let tracks = self.store.tracks();
        let store = self.store.clone();
        let lookup = move |id: &str| store.media_asset(id);

        self.pool.sync(&tracks, &lookup);
        if self.pool.poll_readiness_events() {
            // A handle became ready mid-tick; make sure its first real
            // frame is drawn even if everything else holds still.
            self.loop_ctrl.request_render();
        }

        let active = active_clips(playhead.position, &tracks, &lookup);
        self.playback
            .tick(&mut self.pool, &active, playhead, is_playing);

        let selected = self.store.selected_clip_ids();
        let mut layers = Vec::with_capacity(active.len());
        for entry in &active {
            let Some(handles) = self.pool.get_mut(&entry.clip.id) else {
                continue;
            };
            let Some(frame) = handles.video.as_ref().and_then(|v| v.current_frame()) else {
                // Audio-only clip, or no decoded frame yet.
                continue;
            };
            layers.push(Layer {
                clip_id: entry.clip.id.clone(),
                frame,
                position: entry.clip.position,
                selected: selected.contains(&entry.clip.id),
            });
        }

        let background = self.store.background_color();
        let show_grid = self.store.show_grid();
        if let Err(e) = self.compositor.render(&background, show_grid, &layers) {
            // Surface trouble aborts this tick only; the loop lives on.
            tracing::warn!(error = %e, "render tick aborted");
            return Ok(false);
        }

        Ok(true)
    }

    /// Coarse-timer poll that restarts an idle loop with pending work.
    /// Returns true when the host should resume frame callbacks.
    pub fn poll_watchdog(&mut self, now_ns: u64) -> bool {
        if self.torn_down {
            return false;
        }
        if self.pool.poll_readiness_events() {
            self.loop_ctrl.request_render();
            return true;
        }
        self.loop_ctrl.watchdog_poll(now_ns)
    }

    /// Cancel scheduling and release every playback handle. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.loop_ctrl.shutdown();
        self.pool.dispose_all();
        self.torn_down = true;
        tracing::debug!("preview engine torn down");
    }
}

impl Drop for PreviewEngine {
    fn drop(&mut self) {
        self.teardown();
    }
}
