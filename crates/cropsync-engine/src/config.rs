// crates/cropsync-engine/src/config.rs
//
// EngineConfig: tunables the host may persist as JSON. Every field carries a
// serde default, so a partial (or empty) file loads cleanly.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use cropsync_core::media_types::FrameSize;
use cropsync_core::state::{AspectRatio, Size};

/// Smallest tolerance `sanitized` accepts; anything tighter is below f64
/// rounding at container scale.
pub const MIN_EPSILON: f64 = 1e-12;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Preset applied when the cropper starts.
    pub default_aspect:    AspectRatio,
    /// Volume a freshly attached source starts at.
    pub default_volume:    f32,
    /// Layout size of the video element until the host reports one.
    pub default_container: Size,
    /// Preview surface width; height follows the video's native aspect.
    pub preview_width:     u32,
    pub min_crop_size:     f64,
    /// How close (container px) a press must land to a corner to grab it.
    pub handle_hit_radius: f64,
    pub preview_enabled:   bool,
    pub epsilon:           f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_aspect:    AspectRatio::NineSixteen,
            default_volume:    0.8,
            default_container: Size::new(640.0, 360.0),
            preview_width:     640,
            min_crop_size:     16.0,
            handle_hit_radius: 10.0,
            preview_enabled:   true,
            epsilon:           1e-6,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let cfg: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        debug!("[config] loaded {}", path.display());
        Ok(cfg.sanitized())
    }

    /// Replace out-of-range numeric fields with their defaults, logging each.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        if !(self.epsilon.is_finite() && self.epsilon >= MIN_EPSILON) {
            warn!("[config] epsilon {} out of range, using {}", self.epsilon, d.epsilon);
            self.epsilon = d.epsilon;
        }
        if !(self.min_crop_size.is_finite() && self.min_crop_size >= 0.0) {
            warn!("[config] min_crop_size {} out of range, using {}", self.min_crop_size, d.min_crop_size);
            self.min_crop_size = d.min_crop_size;
        }
        if !(self.handle_hit_radius.is_finite() && self.handle_hit_radius >= 0.0) {
            warn!("[config] handle_hit_radius {} out of range, using {}", self.handle_hit_radius, d.handle_hit_radius);
            self.handle_hit_radius = d.handle_hit_radius;
        }
        if !self.default_container.is_valid() {
            warn!("[config] default_container {:?} invalid, using {:?}", self.default_container, d.default_container);
            self.default_container = d.default_container;
        }
        if self.default_volume.is_nan() {
            warn!("[config] default_volume NaN, using {}", d.default_volume);
            self.default_volume = d.default_volume;
        }
        self
    }

    /// Missing or unreadable files fall back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("[config] using defaults: {e:#}");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Preview surface size for a video of `native` pixels: `preview_width`
    /// wide, height following the native aspect, never zero.
    pub fn preview_size(&self, native: FrameSize) -> FrameSize {
        let width = self.preview_width.max(1);
        if native.is_empty() {
            return FrameSize::new(width, ((width as f64) * 9.0 / 16.0).round() as u32);
        }
        let height = (width as f64 * native.height as f64 / native.width as f64).round() as u32;
        FrameSize::new(width, height.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("cropsync.json");
        std::fs::write(&path, r#"{ "default_volume": 0.5, "default_aspect": "OneOne" }"#).unwrap();
        let cfg = EngineConfig::load(&path).unwrap();
        assert_eq!(cfg.default_volume, 0.5);
        assert_eq!(cfg.default_aspect, AspectRatio::OneOne);
        assert_eq!(cfg.preview_width, 640);
    }

    #[test]
    fn save_then_load() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("cropsync.json");
        let cfg  = EngineConfig { min_crop_size: 32.0, preview_enabled: false, ..EngineConfig::default() };
        cfg.save(&path).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap(), cfg);
    }

    #[test]
    fn missing_or_garbage_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(EngineConfig::load_or_default(&dir.path().join("nope.json")), EngineConfig::default());
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(EngineConfig::load(&bad).is_err());
        assert_eq!(EngineConfig::load_or_default(&bad), EngineConfig::default());
    }

    #[test]
    fn load_replaces_bad_epsilon_with_default() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("cropsync.json");
        std::fs::write(&path, r#"{ "epsilon": 0, "min_crop_size": -4 }"#).unwrap();
        let cfg = EngineConfig::load(&path).unwrap();
        assert_eq!(cfg.epsilon, 1e-6);
        assert_eq!(cfg.min_crop_size, 16.0);

        std::fs::write(&path, r#"{ "epsilon": -0.5 }"#).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap().epsilon, 1e-6);
        std::fs::write(&path, r#"{ "epsilon": 0.001 }"#).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap().epsilon, 0.001);
    }

    #[test]
    fn sanitized_leaves_valid_config_alone() {
        let cfg = EngineConfig { epsilon: 1e-9, handle_hit_radius: 0.0, ..EngineConfig::default() };
        assert_eq!(cfg.clone().sanitized(), cfg);
        let bad = EngineConfig { epsilon: f64::INFINITY, default_container: Size::new(0.0, 10.0), ..EngineConfig::default() };
        assert_eq!(bad.sanitized(), EngineConfig::default());
    }

    #[test]
    fn preview_size_follows_native_aspect() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.preview_size(FrameSize::new(1920, 1080)), FrameSize::new(640, 360));
        assert_eq!(cfg.preview_size(FrameSize::new(1080, 1920)), FrameSize::new(640, 1138));
    }
}
