// crates/cropsync-engine/src/crop.rs
//
// CropRegionModel owns the crop rectangle.
//
// Invariants (hold after every public call, no exceptions):
//   0 ≤ x,  0 ≤ y,  x + width ≤ container.width,  y + height ≤ container.height
//   |width / height − aspect_ratio| < epsilon (1e-6 unless configured)
//
// Every mutator computes a complete candidate rectangle, then commits it in one
// assignment; there is no intermediate state for a reader to observe. Callers
// only ever receive copies via `current_region()`.

use tracing::debug;

use cropsync_core::error::CropError;
use cropsync_core::helpers::geometry::{
    clamp_origin, fit_centered, fit_within, hit_corner, is_valid_ratio, origin_from_anchor,
    space_from_anchor,
};
use cropsync_core::state::{Corner, CropRegion, Size};

/// Tolerance the invariants are checked against unless the host configures one.
pub const DEFAULT_EPSILON: f64 = 1e-6;

pub struct CropRegionModel {
    region:    CropRegion,
    container: Size,
    /// Smallest side a resize may produce, unless the container itself is smaller.
    min_size:  f64,
    epsilon:   f64,
}

impl CropRegionModel {
    /// Default region: the largest rectangle of `ratio` that fits, centered.
    pub fn new(container: Size, ratio: f64, min_size: f64) -> Result<Self, CropError> {
        if !container.is_valid() {
            return Err(CropError::InvalidSize { width: container.width, height: container.height });
        }
        if !is_valid_ratio(ratio) {
            return Err(CropError::InvalidAspectRatio(ratio));
        }
        let r = fit_centered(container, ratio);
        Ok(Self {
            region: CropRegion { x: r.x, y: r.y, width: r.width, height: r.height, aspect_ratio: ratio },
            container,
            min_size: if min_size.is_finite() { min_size.max(0.0) } else { 0.0 },
            epsilon:  DEFAULT_EPSILON,
        })
    }

    /// Tolerance for the ratio and bounds checks. Non-finite or non-positive
    /// values keep the current one.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        if epsilon.is_finite() && epsilon > 0.0 {
            self.epsilon = epsilon;
        }
        self
    }

    pub fn epsilon(&self) -> f64 { self.epsilon }

    pub fn current_region(&self) -> CropRegion { self.region }

    pub fn container(&self) -> Size { self.container }

    pub fn aspect_ratio(&self) -> f64 { self.region.aspect_ratio }

    pub fn contains(&self, x: f64, y: f64) -> bool { self.region.contains(x, y) }

    pub fn hit_handle(&self, x: f64, y: f64, radius: f64) -> Option<Corner> {
        hit_corner(x, y, &self.region, radius)
    }

    /// Re-fit to `ratio` around the current center. The region keeps its size
    /// relative to the largest rectangle its ratio allows, so a region that
    /// filled the container still fills it after any sequence of changes.
    /// Never smaller than `min_size` unless the container forces it, then
    /// slid back inside.
    pub fn set_aspect_ratio(&mut self, ratio: f64) -> Result<CropRegion, CropError> {
        if !is_valid_ratio(ratio) {
            return Err(CropError::InvalidAspectRatio(ratio));
        }
        let r = self.region;
        let (cx, cy) = r.center();
        let old_max = fit_centered(self.container, r.aspect_ratio);
        let scale = (r.width / old_max.width).clamp(0.0, 1.0);
        let new_max = fit_centered(self.container, ratio);
        let mut w = new_max.width * scale;
        let mut h = new_max.height * scale;

        let short = w.min(h);
        if short < self.min_size {
            let s = if short > 0.0 { self.min_size / short } else { 1.0 };
            w *= s;
            h *= s;
        }
        let (w, h) = fit_within(w, h, self.container.width, self.container.height);
        if !(w > 0.0 && h > 0.0) {
            return Ok(self.region);
        }
        self.commit(cx - w / 2.0, cy - h / 2.0, w, ratio);
        debug!("[crop] aspect → {ratio:.4}: {:?}", self.region);
        Ok(self.region)
    }

    /// Translate, then clamp the origin so the rectangle stays inside.
    /// Size never changes.
    pub fn move_by(&mut self, dx: f64, dy: f64) -> CropRegion {
        if !(dx.is_finite() && dy.is_finite()) {
            return self.region;
        }
        let r = self.region;
        let (x, y) = clamp_origin(r.x + dx, r.y + dy, r.width, r.height, self.container);
        self.region.x = x;
        self.region.y = y;
        self.region
    }

    /// Resize keeping `anchor` fixed. The ratio stays locked: whichever of
    /// `width` and `height` implies the larger rectangle drives, the other is
    /// derived. Shrinks uniformly to the room available from the anchor.
    pub fn resize_to(&mut self, width: f64, height: f64, anchor: Corner) -> Result<CropRegion, CropError> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(CropError::InvalidSize { width, height });
        }
        let ratio = self.region.aspect_ratio;
        let mut w = width.max(height * ratio);
        let mut h = w / ratio;

        let short = w.min(h);
        if short < self.min_size {
            let s = self.min_size / short;
            w *= s;
            h *= s;
        }

        let (ax, ay) = self.region.corner(anchor);
        let (room_w, room_h) = space_from_anchor(anchor, ax, ay, self.container);
        let (w, h) = fit_within(w, h, room_w, room_h);
        if w <= 0.0 || h <= 0.0 {
            return Ok(self.region);
        }
        let (x, y) = origin_from_anchor(anchor, ax, ay, w, h);
        self.commit(x, y, w, ratio);
        Ok(self.region)
    }

    /// The rendered element was laid out at a new size. Position scales per
    /// axis, size scales uniformly by the smaller factor, then invariants are
    /// re-established.
    pub fn set_container(&mut self, container: Size) -> Result<CropRegion, CropError> {
        if !container.is_valid() {
            return Err(CropError::InvalidSize { width: container.width, height: container.height });
        }
        let sx = container.width / self.container.width;
        let sy = container.height / self.container.height;
        let s  = sx.min(sy);
        let r  = self.region;
        self.container = container;
        self.commit(r.x * sx, r.y * sy, r.width * s, r.aspect_ratio);
        Ok(self.region)
    }

    /// Single write point. Height is always derived from width so the ratio
    /// holds exactly up to one rounding step.
    fn commit(&mut self, x: f64, y: f64, width: f64, ratio: f64) {
        let (w, h) = fit_within(width, width / ratio, self.container.width, self.container.height);
        let (x, y) = clamp_origin(x, y, w, h, self.container);
        self.region = CropRegion { x, y, width: w, height: h, aspect_ratio: ratio };
        debug_assert!(self.region.satisfies_invariants(self.container, self.epsilon));
    }
}
