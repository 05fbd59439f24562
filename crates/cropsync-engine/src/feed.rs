// crates/cropsync-engine/src/feed.rs
//
// FeedSource: a VideoSource whose decoder lives on another thread.
//
// Two crossbeam channels connect the halves:
//   commands  (engine → decoder, unbounded): seek / play / pause / volume / rate.
//                Never dropped: a lost seek would leave the decoder on the wrong
//                position forever.
//   messages  (decoder → engine, bounded):   metadata, time updates, frames, EOF.
//                Bounded so a decoder running ahead of the display blocks on
//                send(); that IS the rate limiter, no sleep needed.
//
// Frames are latest-wins: poll_events drains the whole channel each call and
// keeps only the newest frame, so the preview never lags behind by a backlog.
//
// The engine side caches the last *requested* transport values and reconciles
// them against the decoder's TimeUpdate messages on the next poll.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError};
use tracing::{debug, warn};

use cropsync_core::media_types::{FrameSize, SourceEvent, VideoFrame};

use crate::source::VideoSource;

/// Engine → decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceCommand {
    Seek(f64),
    Play,
    Pause,
    SetVolume(f32),
    SetPlaybackRate(f64),
}

/// Decoder → engine.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    Metadata { width: u32, height: u32, duration: f64 },
    Time     { current: f64, duration: f64 },
    Frame(VideoFrame),
    Ended,
}

/// Build a connected pair. `capacity` bounds the decoder → engine channel.
pub fn feed_channel(capacity: usize) -> (FeedSource, FeedProducer) {
    let (cmd_tx, cmd_rx) = unbounded();
    let (msg_tx, msg_rx) = bounded(capacity.max(1));
    let source = FeedSource {
        cmd_tx,
        msg_rx,
        current_time: 0.0,
        duration:     0.0,
        volume:       1.0,
        rate:         1.0,
        native:       None,
        frame:        None,
        disconnected: false,
    };
    (source, FeedProducer { cmd_rx, msg_tx })
}

// ── FeedSource ────────────────────────────────────────────────────────────────

pub struct FeedSource {
    cmd_tx:       Sender<SourceCommand>,
    msg_rx:       Receiver<FeedMessage>,
    current_time: f64,
    duration:     f64,
    volume:       f32,
    rate:         f64,
    native:       Option<FrameSize>,
    /// Latest-wins slot for the frame on screen.
    frame:        Option<VideoFrame>,
    /// Set once the producer hangs up so the warning is logged a single time.
    disconnected: bool,
}

impl FeedSource {
    fn send(&mut self, cmd: SourceCommand) {
        if self.cmd_tx.send(cmd).is_err() && !self.disconnected {
            warn!("[feed] decoder hung up, command dropped");
            self.disconnected = true;
        }
    }

    pub fn is_disconnected(&self) -> bool { self.disconnected }
}

impl VideoSource for FeedSource {
    fn current_time(&self) -> f64 { self.current_time }

    fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds;
        self.send(SourceCommand::Seek(seconds));
    }

    fn duration(&self) -> f64 { self.duration }

    fn volume(&self) -> f32 { self.volume }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.send(SourceCommand::SetVolume(volume));
    }

    fn playback_rate(&self) -> f64 { self.rate }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
        self.send(SourceCommand::SetPlaybackRate(rate));
    }

    fn play(&mut self) { self.send(SourceCommand::Play); }

    fn pause(&mut self) { self.send(SourceCommand::Pause); }

    fn native_size(&self) -> Option<FrameSize> { self.native }

    fn current_frame(&self) -> Option<&VideoFrame> { self.frame.as_ref() }

    fn poll_events(&mut self) -> Vec<SourceEvent> {
        let mut events = Vec::new();
        loop {
            match self.msg_rx.try_recv() {
                Ok(FeedMessage::Metadata { width, height, duration }) => {
                    debug!("[feed] metadata {width}x{height}, {duration:.2}s");
                    self.native   = Some(FrameSize::new(width, height));
                    self.duration = duration;
                    events.push(SourceEvent::MetadataLoaded { width, height, duration });
                }
                Ok(FeedMessage::Time { current, duration }) => {
                    self.current_time = current;
                    self.duration     = duration;
                    events.push(SourceEvent::TimeUpdate { current, duration });
                }
                Ok(FeedMessage::Frame(frame)) => {
                    self.frame = Some(frame);
                }
                Ok(FeedMessage::Ended) => events.push(SourceEvent::Ended),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.disconnected {
                        warn!("[feed] decoder hung up, holding last frame");
                        self.disconnected = true;
                    }
                    break;
                }
            }
        }
        events
    }
}

// ── FeedProducer ──────────────────────────────────────────────────────────────

/// Decoder-side half. Move it onto the decode thread.
pub struct FeedProducer {
    cmd_rx: Receiver<SourceCommand>,
    msg_tx: Sender<FeedMessage>,
}

impl FeedProducer {
    /// Blocks while the channel is full. Returns false once the engine side is gone,
    /// which is the decoder's cue to exit.
    pub fn send(&self, msg: FeedMessage) -> bool {
        self.msg_tx.send(msg).is_ok()
    }

    pub fn send_metadata(&self, width: u32, height: u32, duration: f64) -> bool {
        self.send(FeedMessage::Metadata { width, height, duration })
    }

    pub fn send_time(&self, current: f64, duration: f64) -> bool {
        self.send(FeedMessage::Time { current, duration })
    }

    pub fn send_frame(&self, frame: VideoFrame) -> bool {
        self.send(FeedMessage::Frame(frame))
    }

    /// Every command issued since the last call, oldest first.
    pub fn drain_commands(&self) -> Vec<SourceCommand> {
        self.cmd_rx.try_iter().collect()
    }

    /// Receiving end of the command channel, for decoders that block or
    /// `select!` on it instead of polling. The engine keeps the only sender.
    pub fn commands(&self) -> &Receiver<SourceCommand> { &self.cmd_rx }
}
