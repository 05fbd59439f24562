// crates/cropsync-core/src/state.rs
// Pure engine data. No channels, no surfaces, no runtime handles.
// Serializable via serde so the UI shell can mirror snapshots however it likes.
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    NineEighteen,   // 9:18  tall phone / stories
    NineSixteen,    // 9:16  Reels / Shorts
    FourThree,      // 4:3   Classic TV
    ThreeFour,      // 3:4   Portrait photo
    OneOne,         // 1:1   Square
    FourFive,       // 4:5   Instagram portrait
}

impl AspectRatio {
    /// Every preset, in the order the shell should list them.
    pub const ALL: [AspectRatio; 6] = [
        AspectRatio::NineEighteen,
        AspectRatio::NineSixteen,
        AspectRatio::FourThree,
        AspectRatio::ThreeFour,
        AspectRatio::OneOne,
        AspectRatio::FourFive,
    ];
}

impl Default for AspectRatio {
    fn default() -> Self { AspectRatio::NineSixteen }
}

/// The only speeds the transport accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackRate {
    Half,
    Normal,
    OneAndHalf,
    Double,
}

impl PlaybackRate {
    pub const ALL: [PlaybackRate; 4] = [
        PlaybackRate::Half,
        PlaybackRate::Normal,
        PlaybackRate::OneAndHalf,
        PlaybackRate::Double,
    ];

    pub fn value(self) -> f64 {
        match self {
            PlaybackRate::Half       => 0.5,
            PlaybackRate::Normal     => 1.0,
            PlaybackRate::OneAndHalf => 1.5,
            PlaybackRate::Double     => 2.0,
        }
    }

    /// Exact match against the enumerated set. Anything else is `None`.
    ///
    /// ```
    /// use cropsync_core::state::PlaybackRate;
    /// assert_eq!(PlaybackRate::from_value(1.5), Some(PlaybackRate::OneAndHalf));
    /// assert_eq!(PlaybackRate::from_value(3.0), None);
    /// ```
    pub fn from_value(rate: f64) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.value() == rate)
    }
}

impl Default for PlaybackRate {
    fn default() -> Self { PlaybackRate::Normal }
}

/// Transport state as last requested by the controller.
///
/// `duration == 0.0` means "not known yet"; formatting and progress helpers in
/// `helpers::time` treat it that way instead of dividing by it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub current_time:  f64,
    pub duration:      f64,
    pub volume:        f32,
    pub playback_rate: PlaybackRate,
    pub is_playing:    bool,
}

impl PlaybackState {
    pub fn new(volume: f32) -> Self {
        Self {
            current_time:  0.0,
            duration:      0.0,
            volume:        volume.clamp(0.0, 1.0),
            playback_rate: PlaybackRate::Normal,
            is_playing:    false,
        }
    }

    pub fn duration_known(&self) -> bool {
        self.duration > 0.0
    }
}

impl Default for PlaybackState {
    fn default() -> Self { Self::new(1.0) }
}

/// Width/height of the rendered video element the crop region lives in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width:  f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self { Self { width, height } }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Axis-aligned rectangle in whatever space the caller says it is in
/// (container coordinates, native frame pixels, or surface pixels).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x:      f64,
    pub y:      f64,
    pub width:  f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 { self.x + self.width }
    pub fn bottom(&self) -> f64 { self.y + self.height }
    pub fn is_empty(&self) -> bool { self.width <= 0.0 || self.height <= 0.0 }
}

/// Corners of the crop rectangle. Used both as resize handles and as the fixed
/// anchor of a resize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Corner::TopLeft     => Corner::BottomRight,
            Corner::TopRight    => Corner::BottomLeft,
            Corner::BottomLeft  => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    pub fn is_left(self) -> bool { matches!(self, Corner::TopLeft | Corner::BottomLeft) }
    pub fn is_top(self) -> bool { matches!(self, Corner::TopLeft | Corner::TopRight) }
}

/// The crop rectangle in container coordinates plus the ratio it is locked to.
///
/// Only `CropRegionModel` produces these; everyone else receives copies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x:            f64,
    pub y:            f64,
    pub width:        f64,
    pub height:       f64,
    pub aspect_ratio: f64,
}

impl CropRegion {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive on all edges: a press exactly on the border starts a move.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn corner(&self, corner: Corner) -> (f64, f64) {
        match corner {
            Corner::TopLeft     => (self.x, self.y),
            Corner::TopRight    => (self.x + self.width, self.y),
            Corner::BottomLeft  => (self.x, self.y + self.height),
            Corner::BottomRight => (self.x + self.width, self.y + self.height),
        }
    }

    /// True when the region sits inside `container` and honours its ratio,
    /// both to within `eps`. Ratios above 1 are compared relative to their
    /// magnitude, since `width / height` cannot be closer than one rounding
    /// step of the ratio itself.
    pub fn satisfies_invariants(&self, container: Size, eps: f64) -> bool {
        let in_bounds = self.x >= -eps
            && self.y >= -eps
            && self.x + self.width <= container.width + eps
            && self.y + self.height <= container.height + eps;
        let ratio_tol = eps * self.aspect_ratio.max(1.0);
        let ratio_ok = self.height > 0.0
            && (self.width / self.height - self.aspect_ratio).abs() < ratio_tol;
        in_bounds && ratio_ok
    }
}

/// Read-only view handed to the UI shell on every change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub playback:       PlaybackState,
    pub crop:           Option<CropRegion>,
    pub cropping:       bool,
    pub preview_active: bool,
}

impl EngineSnapshot {
    pub fn new(playback: PlaybackState) -> Self {
        Self { playback, crop: None, cropping: false, preview_active: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_rate_rejects_values_outside_the_set() {
        for bad in [0.0, 0.75, 1.25, 3.0, -1.0, f64::NAN] {
            assert_eq!(PlaybackRate::from_value(bad), None, "{bad}");
        }
        for r in PlaybackRate::ALL {
            assert_eq!(PlaybackRate::from_value(r.value()), Some(r));
        }
    }

    #[test]
    fn region_contains_is_edge_inclusive() {
        let r = CropRegion { x: 50.0, y: 50.0, width: 200.0, height: 150.0, aspect_ratio: 4.0 / 3.0 };
        assert!(r.contains(50.0, 50.0));
        assert!(r.contains(250.0, 200.0));
        assert!(!r.contains(49.9, 100.0));
        assert!(!r.contains(100.0, 200.1));
    }

    #[test]
    fn invariants_tolerate_rounding_on_extreme_ratios() {
        let ratio = 1e12;
        let r = CropRegion { x: 0.0, y: 0.0, width: 640.0, height: 640.0 / ratio, aspect_ratio: ratio };
        assert!(r.satisfies_invariants(Size::new(640.0, 360.0), 1e-6));
        let off = CropRegion { width: 641.0, ..r };
        assert!(!off.satisfies_invariants(Size::new(640.0, 360.0), 1e-6));
    }

    #[test]
    fn opposite_corner_round_trips() {
        for c in Corner::ALL {
            assert_eq!(c.opposite().opposite(), c);
            assert_ne!(c.opposite(), c);
        }
    }

    #[test]
    fn snapshot_serializes_for_the_shell() {
        let snap = EngineSnapshot::new(PlaybackState::new(0.8));
        let json = serde_json::to_string(&snap).unwrap();
        let back: EngineSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
