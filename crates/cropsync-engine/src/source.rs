// crates/cropsync-engine/src/source.rs
//
// VideoSource: the decoder-side collaborator the engine drives.
//
// The engine never decodes anything itself. A source reports its transport
// values, accepts mutations (which it may apply asynchronously), raises
// SourceEvents at its own cadence, and exposes whatever frame it is currently
// showing. Two implementations ship with the crate:
//   MemorySource: deterministic, in-process; steps time only when told to.
//   FeedSource:   channel-backed, for a decoder running on another thread
//                  (see feed.rs).

use cropsync_core::media_types::{FrameSize, SourceEvent, VideoFrame};

pub trait VideoSource {
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    /// 0.0 until metadata has loaded.
    fn duration(&self) -> f64;
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f64);
    fn play(&mut self);
    fn pause(&mut self);
    /// Native pixel dimensions, `None` until metadata has loaded.
    fn native_size(&self) -> Option<FrameSize>;
    /// The frame currently on screen, `None` while nothing is decodable.
    fn current_frame(&self) -> Option<&VideoFrame>;
    /// Drain the events raised since the last call, oldest first.
    fn poll_events(&mut self) -> Vec<SourceEvent>;
}

/// In-process source over a single still frame with a simulated clock.
///
/// Time only moves when `advance` is called, so hosts and tests decide the
/// cadence of `TimeUpdate` events.
pub struct MemorySource {
    frame:        Option<VideoFrame>,
    native:       Option<FrameSize>,
    duration:     f64,
    current_time: f64,
    volume:       f32,
    rate:         f64,
    playing:      bool,
    events:       Vec<SourceEvent>,
}

impl MemorySource {
    /// A source with nothing loaded yet.
    pub fn new() -> Self {
        Self {
            frame:        None,
            native:       None,
            duration:     0.0,
            current_time: 0.0,
            volume:       1.0,
            rate:         1.0,
            playing:      false,
            events:       Vec::new(),
        }
    }

    /// Convenience: a source that has already loaded `frame`.
    pub fn loaded(frame: VideoFrame, duration: f64) -> Self {
        let mut s = Self::new();
        s.load(frame, duration);
        s
    }

    /// Simulate "metadata loaded" followed by the first decodable frame.
    pub fn load(&mut self, frame: VideoFrame, duration: f64) {
        let size = frame.size();
        self.native   = Some(size);
        self.duration = duration.max(0.0);
        self.frame    = Some(frame);
        self.events.push(SourceEvent::MetadataLoaded {
            width:    size.width,
            height:   size.height,
            duration: self.duration,
        });
    }

    /// Swap the pixels on screen without touching the clock.
    pub fn set_frame(&mut self, frame: VideoFrame) {
        self.native = Some(frame.size());
        self.frame  = Some(frame);
    }

    pub fn is_playing(&self) -> bool { self.playing }

    /// Step the clock by `dt` wall seconds when playing. Raises a TimeUpdate,
    /// and Ended when the clock reaches the end of a known duration.
    pub fn advance(&mut self, dt: f64) {
        if !self.playing || !(dt > 0.0) {
            return;
        }
        self.current_time += dt * self.rate;
        let ended = self.duration > 0.0 && self.current_time >= self.duration;
        if ended {
            self.current_time = self.duration;
            self.playing = false;
        }
        self.events.push(SourceEvent::TimeUpdate { current: self.current_time, duration: self.duration });
        if ended {
            self.events.push(SourceEvent::Ended);
        }
    }
}

impl Default for MemorySource {
    fn default() -> Self { Self::new() }
}

impl VideoSource for MemorySource {
    fn current_time(&self) -> f64 { self.current_time }

    fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds;
        if let Some(f) = &mut self.frame {
            f.timestamp = seconds;
        }
        // A seek on a real element fires a time update once the new position lands.
        self.events.push(SourceEvent::TimeUpdate { current: seconds, duration: self.duration });
    }

    fn duration(&self) -> f64 { self.duration }

    fn volume(&self) -> f32 { self.volume }
    fn set_volume(&mut self, volume: f32) { self.volume = volume; }

    fn playback_rate(&self) -> f64 { self.rate }
    fn set_playback_rate(&mut self, rate: f64) { self.rate = rate; }

    fn play(&mut self) { self.playing = true; }
    fn pause(&mut self) { self.playing = false; }

    fn native_size(&self) -> Option<FrameSize> { self.native }

    fn current_frame(&self) -> Option<&VideoFrame> { self.frame.as_ref() }

    fn poll_events(&mut self) -> Vec<SourceEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_loaded_has_no_frame_or_size() {
        let s = MemorySource::new();
        assert!(s.current_frame().is_none());
        assert!(s.native_size().is_none());
        assert_eq!(s.duration(), 0.0);
    }

    #[test]
    fn advance_respects_rate_and_ends_at_duration() {
        let mut s = MemorySource::loaded(VideoFrame::solid(2, 2, 0.0, [0; 4]), 3.0);
        s.poll_events();
        s.set_playback_rate(2.0);
        s.play();
        s.advance(1.0);
        assert_eq!(s.current_time(), 2.0);
        s.advance(1.0);
        assert_eq!(s.current_time(), 3.0);
        assert!(!s.is_playing());
        let events = s.poll_events();
        assert_eq!(events.last(), Some(&SourceEvent::Ended));
    }

    #[test]
    fn advance_while_paused_is_silent() {
        let mut s = MemorySource::loaded(VideoFrame::solid(2, 2, 0.0, [0; 4]), 3.0);
        s.poll_events();
        s.advance(1.0);
        assert!(s.poll_events().is_empty());
    }
}
