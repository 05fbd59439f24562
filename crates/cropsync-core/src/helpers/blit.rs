// crates/cropsync-core/src/helpers/blit.rs
//
// Scaled RGBA sub-rectangle copies used by the software preview surface and by
// still capture. Nearest-neighbour sampling at pixel centres; rows are written
// in parallel with rayon since every destination row is independent.

use rayon::prelude::*;

use crate::media_types::{FrameSize, VideoFrame};
use crate::state::Rect;

/// Copy `src_rect` of `frame` into `dst_rect` of a packed RGBA buffer of
/// `dst_size`, scaling as needed. Pixels of `dst` outside `dst_rect` are left
/// untouched. Degenerate rectangles are a no-op.
pub fn blit_scaled(
    frame:    &VideoFrame,
    src_rect: Rect,
    dst:      &mut [u8],
    dst_size: FrameSize,
    dst_rect: Rect,
) {
    let sw = frame.width as usize;
    let sh = frame.height as usize;
    let dw = dst_size.width as usize;
    let dh = dst_size.height as usize;
    if sw == 0 || sh == 0 || dw == 0 || dh == 0 || src_rect.is_empty() || dst_rect.is_empty() {
        return;
    }
    if frame.data.len() < sw * sh * 4 || dst.len() < dw * dh * 4 {
        return;
    }

    let x0 = dst_rect.x.max(0.0).floor() as usize;
    let y0 = dst_rect.y.max(0.0).floor() as usize;
    let x1 = (dst_rect.right().min(dw as f64).ceil() as usize).min(dw);
    let y1 = (dst_rect.bottom().min(dh as f64).ceil() as usize).min(dh);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let scale_x = src_rect.width / dst_rect.width;
    let scale_y = src_rect.height / dst_rect.height;
    let max_sx  = (sw - 1) as f64;
    let max_sy  = (sh - 1) as f64;

    dst[..dw * dh * 4]
        .par_chunks_mut(dw * 4)
        .enumerate()
        .skip(y0)
        .take(y1 - y0)
        .for_each(|(row, line)| {
            let sy = (src_rect.y + (row as f64 + 0.5 - dst_rect.y) * scale_y)
                .floor()
                .clamp(0.0, max_sy) as usize;
            let src_line = &frame.data[sy * sw * 4..(sy + 1) * sw * 4];
            for col in x0..x1 {
                let sx = (src_rect.x + (col as f64 + 0.5 - dst_rect.x) * scale_x)
                    .floor()
                    .clamp(0.0, max_sx) as usize;
                line[col * 4..col * 4 + 4].copy_from_slice(&src_line[sx * 4..sx * 4 + 4]);
            }
        });
}

/// Cut `src_rect` out of `frame` at native resolution (pixel-snapped).
/// Returns the buffer and its size; empty when the rectangle is degenerate.
pub fn crop_native(frame: &VideoFrame, src_rect: Rect) -> (Vec<u8>, FrameSize) {
    let x0 = src_rect.x.max(0.0).round() as u32;
    let y0 = src_rect.y.max(0.0).round() as u32;
    let x1 = (src_rect.right().round().max(0.0) as u32).min(frame.width);
    let y1 = (src_rect.bottom().round().max(0.0) as u32).min(frame.height);
    let size = FrameSize::new(x1.saturating_sub(x0), y1.saturating_sub(y0));
    if size.is_empty() {
        return (Vec::new(), FrameSize::new(0, 0));
    }
    let mut out = vec![0u8; size.byte_len()];
    let snapped = Rect::new(x0 as f64, y0 as f64, size.width as f64, size.height as f64);
    let dst_rect = Rect::new(0.0, 0.0, size.width as f64, size.height as f64);
    blit_scaled(frame, snapped, &mut out, size, dst_rect);
    (out, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4×2 frame where pixel (x, y) = [x, y, 0, 255].
    fn gradient() -> VideoFrame {
        let mut data = Vec::new();
        for y in 0..2u8 {
            for x in 0..4u8 {
                data.extend_from_slice(&[x, y, 0, 255]);
            }
        }
        VideoFrame::new(4, 2, 0.0, data).unwrap()
    }

    #[test]
    fn upscale_right_half_fills_destination() {
        let f = gradient();
        let size = FrameSize::new(4, 4);
        let mut dst = vec![0u8; size.byte_len()];
        blit_scaled(&f, Rect::new(2.0, 0.0, 2.0, 2.0), &mut dst, size, Rect::new(0.0, 0.0, 4.0, 4.0));
        // Column 0..2 of dst samples source x=2, column 2..4 samples x=3.
        assert_eq!(&dst[0..4], &[2, 0, 0, 255]);
        assert_eq!(&dst[12..16], &[3, 0, 0, 255]);
        // Bottom row samples source y=1.
        let last = (3 * 4 + 3) * 4;
        assert_eq!(&dst[last..last + 4], &[3, 1, 0, 255]);
    }

    #[test]
    fn outside_dst_rect_is_untouched() {
        let f = gradient();
        let size = FrameSize::new(4, 2);
        let mut dst = vec![9u8; size.byte_len()];
        blit_scaled(&f, Rect::new(0.0, 0.0, 4.0, 2.0), &mut dst, size, Rect::new(0.0, 0.0, 2.0, 2.0));
        assert_eq!(&dst[8..12], &[9, 9, 9, 9]);
    }

    #[test]
    fn crop_native_copies_exact_pixels() {
        let f = gradient();
        let (data, size) = crop_native(&f, Rect::new(1.0, 1.0, 2.0, 1.0));
        assert_eq!(size, FrameSize::new(2, 1));
        assert_eq!(data, vec![1, 1, 0, 255, 2, 1, 0, 255]);
    }

    #[test]
    fn degenerate_rect_is_noop() {
        let f = gradient();
        let (data, size) = crop_native(&f, Rect::new(1.0, 1.0, 0.0, 1.0));
        assert!(data.is_empty());
        assert!(size.is_empty());
    }
}
