// crates/cropsync-core/src/media_types.rs
//
// Types that flow between a video source, the engine and a preview surface.
// No channels, no decoder, just plain data.

use crate::error::CropError;
use crate::state::CropRegion;

/// Pixel dimensions of a decoded frame or a drawable surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameSize {
    pub width:  u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self { Self { width, height } }

    pub fn is_empty(&self) -> bool { self.width == 0 || self.height == 0 }

    pub fn byte_len(&self) -> usize { self.width as usize * self.height as usize * 4 }
}

/// One decoded RGBA8 frame sampled from a video source.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoFrame {
    pub width:     u32,
    pub height:    u32,
    /// Presentation time of this frame in seconds.
    pub timestamp: f64,
    pub data:      Vec<u8>, // RGBA
}

impl VideoFrame {
    /// Wraps a packed RGBA buffer, rejecting one whose length disagrees with
    /// the dimensions so the blitters never index out of range.
    pub fn new(width: u32, height: u32, timestamp: f64, data: Vec<u8>) -> Result<Self, CropError> {
        let expected = FrameSize::new(width, height).byte_len();
        if data.len() != expected {
            return Err(CropError::FrameBufferSize { expected, actual: data.len() });
        }
        Ok(Self { width, height, timestamp, data })
    }

    /// A frame filled with a single colour.
    pub fn solid(width: u32, height: u32, timestamp: f64, rgba: [u8; 4]) -> Self {
        let data = rgba.iter().copied().cycle().take(FrameSize::new(width, height).byte_len()).collect();
        Self { width, height, timestamp, data }
    }

    pub fn size(&self) -> FrameSize { FrameSize::new(self.width, self.height) }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }
}

/// A still captured from the cropped region at a single play-head time.
#[derive(Clone, Debug, PartialEq)]
pub struct StillImage {
    pub width:     u32,
    pub height:    u32,
    pub timestamp: f64,
    /// The region (container coordinates) the still was cut from.
    pub region:    CropRegion,
    pub data:      Vec<u8>, // RGBA
}

/// Notifications a video source raises at its own cadence.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    /// Native dimensions are now known; pixels may follow.
    MetadataLoaded { width: u32, height: u32, duration: f64 },
    TimeUpdate     { current: f64, duration: f64 },
    Ended,
}
