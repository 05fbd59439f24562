// crates/cropsync-engine/src/surface.rs
//
// PreviewSurface: the 2D target the render loop paints the cropped frame into.
//
// Hosts wrap whatever they draw with (a GPU texture, a window buffer). The crate
// ships RgbaSurface, a CPU buffer that is enough for headless use and tests.

use cropsync_core::helpers::blit::blit_scaled;
use cropsync_core::media_types::{FrameSize, VideoFrame};
use cropsync_core::state::Rect;

pub trait PreviewSurface {
    fn size(&self) -> FrameSize;
    /// Called when metadata loads so the surface can track the video's aspect.
    fn resize(&mut self, size: FrameSize);
    fn clear(&mut self);
    /// Draw `src` (native frame pixels) of `frame` scaled into `dest` (surface pixels).
    fn draw_subregion(&mut self, frame: &VideoFrame, src: Rect, dest: Rect);
}

/// Packed RGBA8 software surface. Cleared pixels are transparent black.
pub struct RgbaSurface {
    size:   FrameSize,
    pixels: Vec<u8>,
    /// Number of draw_subregion calls since creation.
    draws:  u64,
}

impl RgbaSurface {
    pub fn new(size: FrameSize) -> Self {
        Self { size, pixels: vec![0; size.byte_len()], draws: 0 }
    }

    pub fn pixels(&self) -> &[u8] { &self.pixels }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let i = (y as usize * self.size.width as usize + x as usize) * 4;
        self.pixels.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    pub fn draw_count(&self) -> u64 { self.draws }
}

impl PreviewSurface for RgbaSurface {
    fn size(&self) -> FrameSize { self.size }

    fn resize(&mut self, size: FrameSize) {
        if size != self.size {
            self.size   = size;
            self.pixels = vec![0; size.byte_len()];
        }
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn draw_subregion(&mut self, frame: &VideoFrame, src: Rect, dest: Rect) {
        blit_scaled(frame, src, &mut self.pixels, self.size, dest);
        self.draws += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_then_clear() {
        let mut s = RgbaSurface::new(FrameSize::new(4, 4));
        let f = VideoFrame::solid(8, 8, 0.0, [10, 20, 30, 255]);
        s.draw_subregion(&f, Rect::new(0.0, 0.0, 8.0, 8.0), Rect::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(s.pixel(3, 3), Some([10, 20, 30, 255]));
        assert_eq!(s.draw_count(), 1);
        s.clear();
        assert_eq!(s.pixel(3, 3), Some([0, 0, 0, 0]));
    }

    #[test]
    fn resize_reallocates() {
        let mut s = RgbaSurface::new(FrameSize::new(4, 4));
        s.resize(FrameSize::new(2, 3));
        assert_eq!(s.pixels().len(), 24);
        assert_eq!(s.pixel(1, 2), Some([0, 0, 0, 0]));
        assert_eq!(s.pixel(2, 0), None);
    }
}
