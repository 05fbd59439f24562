// crates/cropsync-engine/src/facade.rs
//
// SyncFacade: the one surface the UI shell talks to.
//
// It owns every component and is the only code that wires them together:
//   pointer events   → HandleResizeController / DragInputController → CropRegionModel
//   transport calls  → PlaybackController → VideoSource
//   display refresh  → PreviewRenderLoop (reads source + model, writes surface)
//   every change     → StateStore → shell subscribers
//
// The host drives two clocks: `pump_source()` at whatever cadence its decoder
// reports time, and `on_display_frame()` once per display refresh. Neither
// blocks.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, warn};

use cropsync_core::commands::CropCommand;
use cropsync_core::error::CropError;
use cropsync_core::helpers::geometry::{aspect_ratio_value, is_valid_ratio};
use cropsync_core::helpers::time::format_progress;
use cropsync_core::media_types::{FrameSize, SourceEvent, StillImage};
use cropsync_core::state::{AspectRatio, CropRegion, EngineSnapshot, PlaybackState, Size};

use crate::config::EngineConfig;
use crate::crop::CropRegionModel;
use crate::drag::{DragInputController, HandleResizeController};
use crate::playback::PlaybackController;
use crate::render_loop::{FrameInputs, PreviewRenderLoop, RenderLoopHandle};
use crate::source::VideoSource;
use crate::still::{capture_still, save_png};
use crate::store::{StateStore, SubscriptionId};
use crate::surface::PreviewSurface;

pub struct SyncFacade<S: PreviewSurface> {
    config:          EngineConfig,
    playback:        PlaybackController,
    /// `Some` exactly while the cropper is running.
    crop:            Option<CropRegionModel>,
    container:       Size,
    /// Ratio the next `start_cropper` uses; tracks `set_aspect_ratio` even
    /// while the cropper is stopped.
    aspect:          f64,
    drag:            DragInputController,
    resize:          HandleResizeController,
    render_loop:     PreviewRenderLoop,
    surface:         S,
    store:           StateStore,
    preview_enabled: bool,
    last_still:      Option<StillImage>,
}

impl<S: PreviewSurface> SyncFacade<S> {
    /// Out-of-range config values are replaced by their defaults (logged).
    pub fn new(config: EngineConfig, surface: S) -> Self {
        let config   = config.sanitized();
        let playback = PlaybackController::new(config.default_volume);
        let store    = StateStore::new(playback.state());
        Self {
            aspect:          aspect_ratio_value(config.default_aspect),
            container:       config.default_container,
            preview_enabled: config.preview_enabled,
            playback,
            crop:            None,
            drag:            DragInputController::new(),
            resize:          HandleResizeController::new(),
            render_loop:     PreviewRenderLoop::new(),
            surface,
            store,
            last_still:      None,
            config,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig { &self.config }

    pub fn snapshot(&self) -> &EngineSnapshot { self.store.snapshot() }

    pub fn playback_state(&self) -> PlaybackState { self.playback.state() }

    pub fn crop_region(&self) -> Option<CropRegion> {
        self.crop.as_ref().map(CropRegionModel::current_region)
    }

    pub fn is_cropping(&self) -> bool { self.crop.is_some() }

    pub fn container(&self) -> Size { self.container }

    pub fn aspect_ratio(&self) -> f64 { self.aspect }

    pub fn surface(&self) -> &S { &self.surface }

    pub fn render_loop(&self) -> &PreviewRenderLoop { &self.render_loop }

    pub fn active_render_handle(&self) -> Option<&RenderLoopHandle> {
        self.render_loop.active_handle()
    }

    pub fn is_dragging(&self) -> bool { self.drag.is_dragging() }

    pub fn is_resizing(&self) -> bool { self.resize.is_resizing() }

    /// "M:SS / M:SS" for the shell's timestamp label.
    pub fn progress_text(&self) -> String {
        let s = self.playback.state();
        format_progress(s.current_time, s.duration)
    }

    // ── Subscriptions ─────────────────────────────────────────────────────────

    /// Full snapshot on every change to any slot.
    pub fn subscribe(&mut self, callback: impl FnMut(&EngineSnapshot) + 'static) -> SubscriptionId {
        self.store.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Playback state at the source's own time-update cadence.
    pub fn on_time_advance(&mut self, callback: impl FnMut(&PlaybackState) + 'static) -> SubscriptionId {
        self.playback.on_time_advance(callback)
    }

    pub fn unsubscribe_time(&mut self, id: SubscriptionId) -> bool {
        self.playback.unsubscribe(id)
    }

    // ── Source ────────────────────────────────────────────────────────────────

    pub fn attach_source(&mut self, source: Box<dyn VideoSource>) -> Option<Box<dyn VideoSource>> {
        let old = self.playback.attach(source);
        self.publish_playback();
        old
    }

    pub fn detach_source(&mut self) -> Option<Box<dyn VideoSource>> {
        let old = self.playback.detach();
        self.publish_playback();
        old
    }

    /// Drain source events. Metadata resizes the preview surface to the
    /// video's native aspect.
    pub fn pump_source(&mut self) -> Vec<SourceEvent> {
        let events = self.playback.pump();
        for ev in &events {
            if let SourceEvent::MetadataLoaded { width, height, .. } = *ev {
                let size = self.config.preview_size(FrameSize::new(width, height));
                debug!("[facade] metadata {width}×{height}, preview surface → {}×{}", size.width, size.height);
                self.surface.resize(size);
            }
        }
        self.publish_playback();
        events
    }

    // ── Transport ─────────────────────────────────────────────────────────────

    pub fn play(&mut self) -> bool {
        let changed = self.playback.play();
        self.publish_playback();
        changed
    }

    pub fn pause(&mut self) -> bool {
        let changed = self.playback.pause();
        self.publish_playback();
        changed
    }

    pub fn toggle_play(&mut self) -> bool {
        let changed = self.playback.toggle();
        self.publish_playback();
        changed
    }

    pub fn seek(&mut self, seconds: f64) -> bool {
        let changed = self.playback.seek(seconds);
        self.publish_playback();
        changed
    }

    pub fn set_volume(&mut self, volume: f32) -> bool {
        let changed = self.playback.set_volume(volume);
        self.publish_playback();
        changed
    }

    pub fn set_playback_rate(&mut self, rate: f64) -> Result<bool, CropError> {
        let applied = self.playback.set_playback_rate(rate)?;
        self.publish_playback();
        Ok(applied)
    }

    // ── Cropper ───────────────────────────────────────────────────────────────

    /// Create the default region (largest fit of the current ratio, centered)
    /// and start the live preview if it is enabled. Calling it while already
    /// cropping keeps the existing region.
    pub fn start_cropper(&mut self) -> Result<CropRegion, CropError> {
        let region = match &self.crop {
            Some(model) => model.current_region(),
            None => {
                let model = CropRegionModel::new(self.container, self.aspect, self.config.min_crop_size)?
                    .with_epsilon(self.config.epsilon);
                let region = model.current_region();
                self.crop = Some(model);
                debug!("[facade] cropper started: {region:?}");
                region
            }
        };
        if self.preview_enabled && !self.render_loop.is_active() {
            self.render_loop.start();
        }
        self.publish_crop();
        Ok(region)
    }

    /// End any pointer session, invalidate the render loop, blank the preview,
    /// discard the region. Returns whether the cropper was running.
    pub fn stop_cropper(&mut self) -> bool {
        self.end_pointer_sessions();
        self.render_loop.cancel_active();
        self.surface.clear();
        let was = self.crop.take().is_some();
        if was {
            debug!("[facade] cropper stopped");
        }
        self.publish_crop();
        was
    }

    /// Validates before touching anything. The new ratio is remembered for
    /// the next start even when the cropper is stopped.
    pub fn set_aspect_ratio(&mut self, ratio: f64) -> Result<Option<CropRegion>, CropError> {
        if !is_valid_ratio(ratio) {
            warn!("[facade] rejected aspect ratio {ratio}");
            return Err(CropError::InvalidAspectRatio(ratio));
        }
        self.aspect = ratio;
        let region = match self.crop.as_mut() {
            Some(model) => Some(model.set_aspect_ratio(ratio)?),
            None => None,
        };
        self.publish_crop();
        Ok(region)
    }

    pub fn set_aspect_preset(&mut self, preset: AspectRatio) -> Result<Option<CropRegion>, CropError> {
        self.set_aspect_ratio(aspect_ratio_value(preset))
    }

    /// The host laid out the video element at a new size.
    pub fn set_container_size(&mut self, width: f64, height: f64) -> Result<(), CropError> {
        let size = Size::new(width, height);
        if !size.is_valid() {
            return Err(CropError::InvalidSize { width, height });
        }
        self.container = size;
        if let Some(model) = self.crop.as_mut() {
            model.set_container(size)?;
        }
        self.publish_crop();
        Ok(())
    }

    /// One native-resolution still of the crop region at the current play
    /// head. Kept until the next capture or `take_static_preview`.
    pub fn generate_static_preview(&mut self) -> Result<&StillImage, CropError> {
        let model  = self.crop.as_ref().ok_or(CropError::CropperInactive)?;
        let source = self.playback.source().ok_or(CropError::NoSource)?;
        let still  = capture_still(source, model)?;
        debug!("[facade] static preview {}×{} @ {:.2}s", still.width, still.height, still.timestamp);
        Ok(self.last_still.insert(still))
    }

    pub fn last_static_preview(&self) -> Option<&StillImage> { self.last_still.as_ref() }

    pub fn take_static_preview(&mut self) -> Option<StillImage> { self.last_still.take() }

    /// Capture and write a PNG in one step.
    pub fn export_static_preview(&mut self, dest: &Path) -> Result<()> {
        let still = self.generate_static_preview()?;
        save_png(still, dest)
    }

    // ── Live preview ──────────────────────────────────────────────────────────

    pub fn enable_preview(&mut self) -> bool {
        self.preview_enabled = true;
        let started = self.crop.is_some() && !self.render_loop.is_active();
        if started {
            self.render_loop.start();
        }
        self.publish_preview();
        started
    }

    pub fn disable_preview(&mut self) -> bool {
        self.preview_enabled = false;
        let cancelled = self.render_loop.cancel_active();
        self.publish_preview();
        cancelled
    }

    pub fn is_preview_enabled(&self) -> bool { self.preview_enabled }

    /// Called by the host once per display refresh. Returns how many paints
    /// reached the surface (0 or 1).
    pub fn on_display_frame(&mut self) -> usize {
        let inputs = FrameInputs { source: self.playback.source(), crop: self.crop.as_ref() };
        self.render_loop.on_display_frame(&inputs, &mut self.surface)
    }

    // ── Pointer ───────────────────────────────────────────────────────────────

    /// Corner handles take priority over moving. Returns whether a session
    /// started.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        let Some(model) = self.crop.as_ref() else { return false };
        if self.drag.is_dragging() || self.resize.is_resizing() {
            return false;
        }
        self.resize.pointer_down(x, y, self.config.handle_hit_radius, model)
            || self.drag.pointer_down(x, y, model)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<CropRegion> {
        let model = self.crop.as_mut()?;
        let region = if self.resize.is_resizing() {
            self.resize.pointer_move(x, y, model)
        } else {
            self.drag.pointer_move(x, y, model)
        };
        if region.is_some() {
            self.publish_crop();
        }
        region
    }

    pub fn pointer_up(&mut self) -> bool { self.end_pointer_sessions() }

    pub fn pointer_cancel(&mut self) -> bool { self.end_pointer_sessions() }

    pub fn pointer_leave(&mut self) -> bool { self.end_pointer_sessions() }

    fn end_pointer_sessions(&mut self) -> bool {
        let a = self.drag.end();
        let b = self.resize.end();
        a || b
    }

    // ── Command dispatch ──────────────────────────────────────────────────────

    pub fn apply(&mut self, cmd: CropCommand) -> Result<(), CropError> {
        match cmd {
            // ── Playback ─────────────────────────────────────────────────────
            CropCommand::Play => { self.play(); }
            CropCommand::Pause => { self.pause(); }
            CropCommand::TogglePlay => { self.toggle_play(); }
            CropCommand::Seek(t) => { self.seek(t); }
            CropCommand::SetVolume(v) => { self.set_volume(v); }
            CropCommand::SetPlaybackRate(r) => { self.set_playback_rate(r)?; }

            // ── Cropper ──────────────────────────────────────────────────────
            CropCommand::StartCropper => { self.start_cropper()?; }
            CropCommand::StopCropper => { self.stop_cropper(); }
            CropCommand::SetAspectRatio(r) => { self.set_aspect_ratio(r)?; }
            CropCommand::SetAspectPreset(p) => { self.set_aspect_preset(p)?; }
            CropCommand::SetContainerSize { width, height } => {
                self.set_container_size(width, height)?;
            }
            CropCommand::GenerateStaticPreview => { self.generate_static_preview()?; }

            // ── Preview ──────────────────────────────────────────────────────
            CropCommand::EnablePreview => { self.enable_preview(); }
            CropCommand::DisablePreview => { self.disable_preview(); }

            // ── Pointer ──────────────────────────────────────────────────────
            CropCommand::PointerDown { x, y } => { self.pointer_down(x, y); }
            CropCommand::PointerMove { x, y } => { self.pointer_move(x, y); }
            CropCommand::PointerUp => { self.pointer_up(); }
            CropCommand::PointerCancel => { self.pointer_cancel(); }
            CropCommand::PointerLeave => { self.pointer_leave(); }
        }
        Ok(())
    }

    // ── Store writes ──────────────────────────────────────────────────────────

    fn publish_playback(&mut self) {
        self.store.publish_playback(self.playback.state());
    }

    fn publish_crop(&mut self) {
        let region = self.crop_region();
        self.store.publish_crop(region);
        self.publish_preview();
    }

    fn publish_preview(&mut self) {
        self.store.publish_preview(self.render_loop.is_active());
    }
}

impl<S: PreviewSurface> Drop for SyncFacade<S> {
    /// The loop is invalidated before the surface field is dropped.
    fn drop(&mut self) {
        if self.render_loop.cancel_active() {
            debug!("[facade] teardown cancelled live preview");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use crate::surface::RgbaSurface;
    use cropsync_core::media_types::VideoFrame;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn facade() -> SyncFacade<RgbaSurface> {
        let mut f = SyncFacade::new(EngineConfig::default(), RgbaSurface::new(FrameSize::new(1, 1)));
        f.attach_source(Box::new(MemorySource::loaded(VideoFrame::solid(1280, 720, 0.0, [5, 6, 7, 255]), 30.0)));
        f.pump_source();
        f
    }

    #[test]
    fn metadata_resizes_surface_to_native_aspect() {
        let f = facade();
        assert_eq!(f.surface().size(), FrameSize::new(640, 360));
        assert_eq!(f.playback_state().duration, 30.0);
        assert_eq!(f.playback_state().volume, 0.8);
    }

    #[test]
    fn stop_cropper_mid_drag_discards_session() {
        let mut f = facade();
        f.start_cropper().unwrap();
        assert!(f.pointer_down(320.0, 180.0));
        assert!(f.is_dragging());
        assert!(f.stop_cropper());
        assert!(!f.is_dragging());
        assert!(f.pointer_move(330.0, 180.0).is_none());
        assert!(f.active_render_handle().is_none());
    }

    #[test]
    fn stop_cropper_blanks_the_preview() {
        let mut f = facade();
        f.start_cropper().unwrap();
        assert_eq!(f.on_display_frame(), 1);
        assert_eq!(f.surface().pixel(320, 180), Some([5, 6, 7, 255]));
        f.stop_cropper();
        assert_eq!(f.surface().pixel(320, 180), Some([0, 0, 0, 0]));
    }

    #[test]
    fn zero_epsilon_in_config_falls_back_to_default() {
        let cfg = EngineConfig { epsilon: 0.0, min_crop_size: f64::NAN, ..EngineConfig::default() };
        let mut f = SyncFacade::new(cfg, RgbaSurface::new(FrameSize::new(8, 8)));
        assert_eq!(f.config().epsilon, EngineConfig::default().epsilon);
        assert_eq!(f.config().min_crop_size, EngineConfig::default().min_crop_size);
        f.set_aspect_ratio(0.3).unwrap();
        let r = f.start_cropper().unwrap();
        assert!(r.satisfies_invariants(f.container(), f.config().epsilon));
    }

    #[test]
    fn corner_press_resizes_instead_of_moving() {
        let mut f = facade();
        let r = f.start_cropper().unwrap();
        let (bx, by) = r.corner(cropsync_core::state::Corner::BottomRight);
        assert!(f.pointer_down(bx - 2.0, by - 2.0));
        assert!(f.is_resizing());
        let after = f.pointer_move(bx - 50.0, by - 50.0).unwrap();
        assert_eq!((after.x, after.y), (r.x, r.y));
        assert!(after.width < r.width);
        assert!(f.pointer_leave());
        assert!(!f.is_resizing());
    }

    #[test]
    fn aspect_change_while_stopped_applies_on_next_start() {
        let mut f = facade();
        assert_eq!(f.set_aspect_preset(AspectRatio::OneOne), Ok(None));
        let r = f.start_cropper().unwrap();
        assert_eq!((r.width, r.height), (360.0, 360.0));
        assert_eq!(f.set_aspect_ratio(0.0), Err(CropError::InvalidAspectRatio(0.0)));
        assert_eq!(f.crop_region(), Some(r));
    }

    #[test]
    fn disabled_preview_never_starts_a_loop() {
        let mut f = facade();
        f.disable_preview();
        f.start_cropper().unwrap();
        assert!(!f.render_loop().is_active());
        assert_eq!(f.on_display_frame(), 0);
        assert!(f.enable_preview());
        assert_eq!(f.on_display_frame(), 1);
        assert!(f.snapshot().preview_active);
    }

    #[test]
    fn static_preview_requires_cropper() {
        let mut f = facade();
        assert_eq!(f.generate_static_preview().err(), Some(CropError::CropperInactive));
        f.start_cropper().unwrap();
        let still = f.generate_static_preview().unwrap();
        assert_eq!((still.width, still.height), (405, 720));
        assert!(f.take_static_preview().is_some());
        assert!(f.last_static_preview().is_none());
    }

    #[test]
    fn subscribers_see_crop_moves() {
        let mut f = facade();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        f.subscribe(move |s| sink.borrow_mut().push(s.crop.map(|r| r.x)));
        f.start_cropper().unwrap();
        f.pointer_down(320.0, 180.0);
        f.pointer_move(300.0, 180.0);
        f.pointer_up();
        let xs = seen.borrow();
        assert_eq!(xs.first().copied().flatten(), Some(218.75));
        assert_eq!(xs.last().copied().flatten(), Some(198.75));
    }

    #[test]
    fn apply_reports_rejections() {
        let mut f = facade();
        assert_eq!(f.apply(CropCommand::SetPlaybackRate(3.0)), Err(CropError::InvalidPlaybackRate(3.0)));
        assert_eq!(f.apply(CropCommand::SetContainerSize { width: -1.0, height: 10.0 }),
                   Err(CropError::InvalidSize { width: -1.0, height: 10.0 }));
        assert!(f.apply(CropCommand::Seek(12.0)).is_ok());
        assert_eq!(f.progress_text(), "0:12 / 0:30");
    }
}
