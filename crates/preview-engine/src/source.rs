//! Playback handles for pooled media.
//!
//! A [`DecodableSource`] is a capability-tagged sum over the three asset
//! kinds rather than a type-branched handle: every variant answers the
//! same transport surface (`seek`, `set_rate`, `play`, `pause`,
//! `position`) so call sites never match on the asset kind. The actual
//! decode resource sits behind the [`MediaBackend`] trait; tests inject a
//! scripted backend, while the default [`ClockBackend`] models position
//! advancement against a monotonic clock.

use std::sync::Arc;
use std::time::Instant;

use image::{Rgba, RgbaImage};
use mixcut_common::{MixcutError, MixcutResult};
use mixcut_timeline_model::{MediaAsset, MediaKind};

/// Load progress of a decode resource. Media loads asynchronously, so a
/// handle may reach `CanPlay` long after the render loop went idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Readiness {
    Opening,
    MetadataLoaded,
    CanPlay,
}

/// The decode/playback resource behind a handle.
pub trait MediaBackend: Send {
    /// Jump to a source-media time in seconds.
    fn seek(&mut self, secs: f64);

    /// Set the playback rate multiplier.
    fn set_rate(&mut self, rate: f64);

    /// Set output gain. Meaningless for video backends, which are muted.
    fn set_volume(&mut self, volume: f64);

    /// Begin or resume playback. May fail transiently when transport
    /// state is toggled rapidly; callers treat that as noise.
    fn play(&mut self) -> MixcutResult<()>;

    /// Pause playback, keeping the decoded state warm.
    fn pause(&mut self);

    fn is_playing(&self) -> bool;

    /// Current source-media position in seconds.
    fn position(&self) -> f64;

    fn readiness(&self) -> Readiness;

    /// Most recently decoded frame, if this backend produces pixels.
    fn current_frame(&self) -> Option<Arc<RgbaImage>>;

    /// Release the decode resource. The handle is dead afterwards.
    fn clear(&mut self);
}

/// Which capability set a handle carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Frame-bearing, always muted (audio routes through a separate
    /// handle to avoid double playback).
    Video,
    /// Audio-only, carries the volume capability.
    Audio,
    /// Static frame; transport operations are accepted and ignored.
    Image,
}

/// A per-clip playback handle.
pub enum DecodableSource {
    Video(Box<dyn MediaBackend>),
    Audio(Box<dyn MediaBackend>),
    Image(Box<dyn MediaBackend>),
}

impl DecodableSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            DecodableSource::Video(_) => SourceKind::Video,
            DecodableSource::Audio(_) => SourceKind::Audio,
            DecodableSource::Image(_) => SourceKind::Image,
        }
    }

    fn backend(&self) -> &dyn MediaBackend {
        match self {
            DecodableSource::Video(b) | DecodableSource::Audio(b) | DecodableSource::Image(b) => {
                b.as_ref()
            }
        }
    }

    fn backend_mut(&mut self) -> &mut dyn MediaBackend {
        match self {
            DecodableSource::Video(b) | DecodableSource::Audio(b) | DecodableSource::Image(b) => {
                b.as_mut()
            }
        }
    }

    pub fn seek(&mut self, secs: f64) {
        if self.kind() != SourceKind::Image {
            self.backend_mut().seek(secs);
        }
    }

    pub fn set_rate(&mut self, rate: f64) {
        if self.kind() != SourceKind::Image {
            self.backend_mut().set_rate(rate);
        }
    }

    /// Volume lands on audio handles only; video handles stay muted.
    pub fn set_volume(&mut self, volume: f64) {
        if self.kind() == SourceKind::Audio {
            self.backend_mut().set_volume(volume);
        }
    }

    pub fn play(&mut self) -> MixcutResult<()> {
        match self.kind() {
            SourceKind::Image => Ok(()),
            _ => self.backend_mut().play(),
        }
    }

    pub fn pause(&mut self) {
        self.backend_mut().pause();
    }

    pub fn is_playing(&self) -> bool {
        self.backend().is_playing()
    }

    pub fn position(&self) -> f64 {
        self.backend().position()
    }

    pub fn readiness(&self) -> Readiness {
        self.backend().readiness()
    }

    pub fn current_frame(&self) -> Option<Arc<RgbaImage>> {
        self.backend().current_frame()
    }

    /// Pause and release the decode resource.
    pub fn dispose(&mut self) {
        self.backend_mut().pause();
        self.backend_mut().clear();
    }
}

/// Creates backends for pooled handles. The engine is constructed with an
/// opener so the decode layer stays swappable (and fakeable in tests).
pub trait SourceOpener: Send + Sync {
    fn open_video(&self, asset: &MediaAsset) -> Box<dyn MediaBackend>;
    fn open_audio(&self, asset: &MediaAsset) -> Box<dyn MediaBackend>;
}

/// Clock-driven backend: position advances in real time while playing,
/// scaled by the playback rate. Frame output is a deterministic stand-in
/// pattern sized like the asset; real decoders live behind the same trait
/// outside this crate.
pub struct ClockBackend {
    position: f64,
    rate: f64,
    volume: f64,
    playing: bool,
    cleared: bool,
    play_anchor: Option<Instant>,
    frame: Option<Arc<RgbaImage>>,
}

impl ClockBackend {
    pub fn for_asset(asset: &MediaAsset) -> Self {
        let frame = if asset.kind.has_video() && asset.width > 0 && asset.height > 0 {
            Some(Arc::new(stand_in_frame(asset)))
        } else {
            None
        };
        Self {
            position: 0.0,
            rate: 1.0,
            volume: 1.0,
            playing: false,
            cleared: false,
            play_anchor: None,
            frame,
        }
    }

    fn settle(&mut self) {
        if let Some(anchor) = self.play_anchor.take() {
            self.position += anchor.elapsed().as_secs_f64() * self.rate;
        }
        if self.playing {
            self.play_anchor = Some(Instant::now());
        }
    }
}

impl MediaBackend for ClockBackend {
    fn seek(&mut self, secs: f64) {
        self.position = secs.max(0.0);
        if self.playing {
            self.play_anchor = Some(Instant::now());
        }
    }

    fn set_rate(&mut self, rate: f64) {
        self.settle();
        self.rate = rate.clamp(0.25, 16.0);
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 2.0);
    }

    fn play(&mut self) -> MixcutResult<()> {
        if self.cleared {
            return Err(MixcutError::playback("play() on a cleared handle"));
        }
        if !self.playing {
            self.playing = true;
            self.play_anchor = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.settle();
        self.playing = false;
        self.play_anchor = None;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn position(&self) -> f64 {
        match self.play_anchor {
            Some(anchor) => self.position + anchor.elapsed().as_secs_f64() * self.rate,
            None => self.position,
        }
    }

    fn readiness(&self) -> Readiness {
        if self.cleared {
            Readiness::Opening
        } else {
            Readiness::CanPlay
        }
    }

    fn current_frame(&self) -> Option<Arc<RgbaImage>> {
        if self.cleared {
            None
        } else {
            self.frame.clone()
        }
    }

    fn clear(&mut self) {
        self.cleared = true;
        self.playing = false;
        self.play_anchor = None;
        self.frame = None;
    }
}

/// Default opener producing [`ClockBackend`] handles.
#[derive(Debug, Default)]
pub struct ClockOpener;

impl SourceOpener for ClockOpener {
    fn open_video(&self, asset: &MediaAsset) -> Box<dyn MediaBackend> {
        Box::new(ClockBackend::for_asset(asset))
    }

    fn open_audio(&self, asset: &MediaAsset) -> Box<dyn MediaBackend> {
        let mut silent = MediaAsset {
            width: 0,
            height: 0,
            ..asset.clone()
        };
        silent.kind = MediaKind::Audio;
        Box::new(ClockBackend::for_asset(&silent))
    }
}

/// Deterministic test-pattern frame derived from the asset id, so two
/// assets never produce identical pixels.
fn stand_in_frame(asset: &MediaAsset) -> RgbaImage {
    let seed = asset.id.bytes().fold(0u32, |acc, b| {
        acc.wrapping_mul(31).wrapping_add(b as u32)
    });
    let base = [
        64 + (seed % 128) as u8,
        64 + ((seed >> 8) % 128) as u8,
        64 + ((seed >> 16) % 128) as u8,
    ];
    let w = asset.width.max(1);
    let h = asset.height.max(1);
    RgbaImage::from_fn(w, h, |x, y| {
        let shade = ((x * 255 / w) / 2 + (y * 255 / h) / 2) as u8;
        Rgba([
            base[0].saturating_add(shade / 4),
            base[1].saturating_add(shade / 4),
            base[2].saturating_add(shade / 4),
            255,
        ])
    })
}
