// crates/cropsync-core/src/helpers/geometry.rs
//
// Aspect-ratio and rectangle math shared by the crop model, the render loop and
// the still capture path.
//
// Everything here is a pure function over plain f64 with no model state. The crop
// model composes these and is the only place that decides *when* to apply them.

use crate::media_types::FrameSize;
use crate::state::{AspectRatio, Corner, CropRegion, Rect, Size};

/// Numeric width-to-height ratio for the given `AspectRatio` preset.
///
/// ```
/// use cropsync_core::state::AspectRatio;
/// use cropsync_core::helpers::geometry::aspect_ratio_value;
/// let r = aspect_ratio_value(AspectRatio::NineSixteen);
/// assert!((r - 9.0 / 16.0).abs() < 1e-12);
/// ```
pub fn aspect_ratio_value(ar: AspectRatio) -> f64 {
    match ar {
        AspectRatio::NineEighteen => 9.0 / 18.0,
        AspectRatio::NineSixteen  => 9.0 / 16.0,
        AspectRatio::FourThree    => 4.0 / 3.0,
        AspectRatio::ThreeFour    => 3.0 / 4.0,
        AspectRatio::OneOne       => 1.0,
        AspectRatio::FourFive     => 4.0 / 5.0,
    }
}

/// Short label for the given preset, as shown in the shell's ratio picker.
pub fn aspect_ratio_label(ar: AspectRatio) -> &'static str {
    match ar {
        AspectRatio::NineEighteen => "9:18",
        AspectRatio::NineSixteen  => "9:16",
        AspectRatio::FourThree    => "4:3",
        AspectRatio::ThreeFour    => "3:4",
        AspectRatio::OneOne       => "1:1",
        AspectRatio::FourFive     => "4:5",
    }
}

/// A usable ratio is finite and strictly positive.
pub fn is_valid_ratio(ratio: f64) -> bool {
    ratio.is_finite() && ratio > 0.0
}

/// Uniformly scale `(w, h)` down (never up) until it fits inside `max_w × max_h`.
///
/// ```
/// use cropsync_core::helpers::geometry::fit_within;
/// assert_eq!(fit_within(400.0, 200.0, 200.0, 400.0), (200.0, 100.0));
/// assert_eq!(fit_within(10.0, 10.0, 100.0, 100.0), (10.0, 10.0));
/// ```
pub fn fit_within(w: f64, h: f64, max_w: f64, max_h: f64) -> (f64, f64) {
    let mut s = 1.0_f64;
    if w > max_w { s = s.min(max_w / w); }
    if h > max_h { s = s.min(max_h / h); }
    (w * s, h * s)
}

/// Largest rectangle of `ratio` that fits `container`, centered in it.
///
/// ```
/// use cropsync_core::state::Size;
/// use cropsync_core::helpers::geometry::fit_centered;
/// let r = fit_centered(Size::new(640.0, 360.0), 9.0 / 16.0);
/// assert_eq!((r.x, r.y, r.width, r.height), (218.75, 0.0, 202.5, 360.0));
/// ```
pub fn fit_centered(container: Size, ratio: f64) -> Rect {
    let (w, h) = if container.width / container.height > ratio {
        (container.height * ratio, container.height)
    } else {
        (container.width, container.width / ratio)
    };
    Rect::new((container.width - w) / 2.0, (container.height - h) / 2.0, w, h)
}

/// Clamp an origin so a `w × h` box stays inside `container`.
pub fn clamp_origin(x: f64, y: f64, w: f64, h: f64, container: Size) -> (f64, f64) {
    (
        x.clamp(0.0, (container.width - w).max(0.0)),
        y.clamp(0.0, (container.height - h).max(0.0)),
    )
}

/// Room available for a rectangle that keeps `anchor` fixed at `(ax, ay)` and
/// grows away from it.
pub fn space_from_anchor(anchor: Corner, ax: f64, ay: f64, container: Size) -> (f64, f64) {
    let w = if anchor.is_left() { container.width - ax } else { ax };
    let h = if anchor.is_top() { container.height - ay } else { ay };
    (w.max(0.0), h.max(0.0))
}

/// Origin of a `w × h` rectangle whose `anchor` corner sits at `(ax, ay)`.
pub fn origin_from_anchor(anchor: Corner, ax: f64, ay: f64, w: f64, h: f64) -> (f64, f64) {
    let x = if anchor.is_left() { ax } else { ax - w };
    let y = if anchor.is_top() { ay } else { ay - h };
    (x, y)
}

/// Map a region in container coordinates to the frame's native pixel space.
///
/// The video element stretches the frame to fill the container (`object-fill`),
/// so the mapping is an independent linear scale per axis. The result is
/// clipped to the frame.
///
/// ```
/// use cropsync_core::media_types::FrameSize;
/// use cropsync_core::state::{CropRegion, Size};
/// use cropsync_core::helpers::geometry::container_to_native;
/// let region = CropRegion { x: 160.0, y: 90.0, width: 320.0, height: 180.0, aspect_ratio: 16.0 / 9.0 };
/// let src = container_to_native(&region, Size::new(640.0, 360.0), FrameSize::new(1920, 1080));
/// assert_eq!((src.x, src.y, src.width, src.height), (480.0, 270.0, 960.0, 540.0));
/// ```
pub fn container_to_native(region: &CropRegion, container: Size, native: FrameSize) -> Rect {
    let sx = native.width as f64 / container.width;
    let sy = native.height as f64 / container.height;
    let x0 = (region.x * sx).clamp(0.0, native.width as f64);
    let y0 = (region.y * sy).clamp(0.0, native.height as f64);
    let x1 = ((region.x + region.width) * sx).clamp(0.0, native.width as f64);
    let y1 = ((region.y + region.height) * sy).clamp(0.0, native.height as f64);
    Rect::new(x0, y0, x1 - x0, y1 - y0)
}

/// Which corner handle, if any, lies within `radius` of the pointer.
/// The nearest corner wins when handles overlap on a small region.
pub fn hit_corner(px: f64, py: f64, region: &CropRegion, radius: f64) -> Option<Corner> {
    Corner::ALL
        .iter()
        .map(|&c| {
            let (cx, cy) = region.corner(c);
            (c, (px - cx).hypot(py - cy))
        })
        .filter(|&(_, d)| d <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}
