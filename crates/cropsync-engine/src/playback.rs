// crates/cropsync-engine/src/playback.rs
//
// PlaybackController owns the transport state and is the only thing that
// mutates the attached VideoSource's transport.
//
// The state it exposes is the *last requested* state. A real decoder applies
// seeks and speed changes asynchronously; `pump()` drains the source's events
// and reconciles on every TimeUpdate, which is also when time subscribers fire.
//
// With no source attached every mutator is a logged no-op that returns false.

use tracing::{debug, warn};

use cropsync_core::error::CropError;
use cropsync_core::media_types::SourceEvent;
use cropsync_core::state::{PlaybackRate, PlaybackState};

use crate::source::VideoSource;
use crate::store::{SubscriptionId, Subscribers};

pub struct PlaybackController {
    state:          PlaybackState,
    default_volume: f32,
    source:         Option<Box<dyn VideoSource>>,
    time_listeners: Subscribers<PlaybackState>,
}

impl PlaybackController {
    pub fn new(default_volume: f32) -> Self {
        let default_volume = default_volume.clamp(0.0, 1.0);
        Self {
            state: PlaybackState::new(default_volume),
            default_volume,
            source: None,
            time_listeners: Subscribers::new(),
        }
    }

    // ── Source lifecycle ──────────────────────────────────────────────────────

    /// Attach a source, replacing any previous one. Transport state is created
    /// fresh; the controller's volume and rate are pushed down to the source.
    pub fn attach(&mut self, mut source: Box<dyn VideoSource>) -> Option<Box<dyn VideoSource>> {
        let mut state = PlaybackState::new(self.default_volume);
        state.current_time = source.current_time().max(0.0);
        state.duration     = source.duration().max(0.0);
        source.set_volume(state.volume);
        source.set_playback_rate(state.playback_rate.value());
        self.state = state;
        debug!("[playback] source attached (duration {:.2}s)", state.duration);
        self.source.replace(source)
    }

    /// Detach and return the source. Transport state resets to defaults.
    pub fn detach(&mut self) -> Option<Box<dyn VideoSource>> {
        let old = self.source.take();
        if old.is_some() {
            debug!("[playback] source detached");
        }
        self.state = PlaybackState::new(self.default_volume);
        old
    }

    pub fn has_source(&self) -> bool { self.source.is_some() }

    pub fn source(&self) -> Option<&dyn VideoSource> { self.source.as_deref() }

    pub fn state(&self) -> PlaybackState { self.state }

    fn source_or_warn(&mut self, op: &str) -> Option<&mut Box<dyn VideoSource>> {
        if self.source.is_none() {
            warn!("[playback] {op} ignored: no video source attached");
        }
        self.source.as_mut()
    }

    // ── Transport ─────────────────────────────────────────────────────────────

    /// Returns true when the transport actually changed.
    pub fn play(&mut self) -> bool {
        if self.state.is_playing {
            return false;
        }
        let Some(src) = self.source_or_warn("play") else { return false };
        src.play();
        self.state.is_playing = true;
        true
    }

    pub fn pause(&mut self) -> bool {
        if !self.state.is_playing {
            return false;
        }
        let Some(src) = self.source_or_warn("pause") else { return false };
        src.pause();
        self.state.is_playing = false;
        true
    }

    pub fn toggle(&mut self) -> bool {
        if self.state.is_playing { self.pause() } else { self.play() }
    }

    /// Clamp to `[0, duration]` (only the lower bound while duration is unknown)
    /// and forward to the source. Non-finite input is dropped.
    pub fn seek(&mut self, seconds: f64) -> bool {
        if !seconds.is_finite() {
            warn!("[playback] seek ignored: non-finite target {seconds}");
            return false;
        }
        let duration = self.state.duration;
        let target = if duration > 0.0 { seconds.clamp(0.0, duration) } else { seconds.max(0.0) };
        let Some(src) = self.source_or_warn("seek") else { return false };
        src.set_current_time(target);
        self.state.current_time = target;
        true
    }

    /// Clamp to `[0, 1]`. NaN is dropped.
    pub fn set_volume(&mut self, volume: f32) -> bool {
        if volume.is_nan() {
            warn!("[playback] volume ignored: NaN");
            return false;
        }
        let v = volume.clamp(0.0, 1.0);
        let Some(src) = self.source_or_warn("set_volume") else { return false };
        src.set_volume(v);
        self.state.volume = v;
        true
    }

    /// Only 0.5, 1, 1.5 and 2 are accepted; anything else is rejected and the
    /// previous rate kept. `Ok(false)` means the rate was valid but no source
    /// is attached.
    pub fn set_playback_rate(&mut self, rate: f64) -> Result<bool, CropError> {
        let Some(r) = PlaybackRate::from_value(rate) else {
            warn!("[playback] rejected playback rate {rate}");
            return Err(CropError::InvalidPlaybackRate(rate));
        };
        let Some(src) = self.source_or_warn("set_playback_rate") else { return Ok(false) };
        src.set_playback_rate(r.value());
        self.state.playback_rate = r;
        Ok(true)
    }

    // ── Time subscriptions ────────────────────────────────────────────────────

    /// Fires on every TimeUpdate / MetadataLoaded reconciled by `pump`.
    pub fn on_time_advance(&mut self, callback: impl FnMut(&PlaybackState) + 'static) -> SubscriptionId {
        self.time_listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.time_listeners.unsubscribe(id)
    }

    /// Drain the source's events, reconcile state, notify time subscribers.
    /// Returns the drained events so the caller can react to metadata.
    pub fn pump(&mut self) -> Vec<SourceEvent> {
        let Some(src) = self.source.as_mut() else { return Vec::new() };
        let events = src.poll_events();
        for ev in &events {
            match *ev {
                SourceEvent::MetadataLoaded { duration, .. } => {
                    self.state.duration = duration.max(0.0);
                    self.clamp_time_to_duration();
                    self.time_listeners.notify(&self.state);
                }
                SourceEvent::TimeUpdate { current, duration } => {
                    self.state.duration     = duration.max(0.0);
                    self.state.current_time = current.max(0.0);
                    self.clamp_time_to_duration();
                    self.time_listeners.notify(&self.state);
                }
                SourceEvent::Ended => {
                    self.state.is_playing = false;
                    debug!("[playback] ended at {:.2}s", self.state.current_time);
                }
            }
        }
        events
    }

    fn clamp_time_to_duration(&mut self) {
        if self.state.duration > 0.0 && self.state.current_time > self.state.duration {
            self.state.current_time = self.state.duration;
        }
    }
}
