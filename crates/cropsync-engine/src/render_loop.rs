// crates/cropsync-engine/src/render_loop.rs
//
// PreviewRenderLoop: repaints the cropped sub-frame once per display refresh.
//
// The loop is an explicit scheduler, not a self-capturing callback:
//   FrameScheduler holds the frame requests made during the previous display
//   frame. The host calls `on_display_frame` once per refresh; every request
//   that was due is taken, its handle checked *first*, and only a live handle
//   paints and re-requests the next frame.
//
// Cancellation is cooperative. `cancel` flips the handle's flag synchronously;
// a request already sitting in the queue is discarded at loop-top the next time
// it comes due, so nothing painted under a cancelled handle ever reaches the
// surface. Starting a new loop always cancels the previous one first, so at
// most one handle paints a surface at any time.
//
// Paint cadence is the display's, not the source's TimeUpdate cadence, so the
// preview keeps tracking while the play head is being scrubbed.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use cropsync_core::helpers::geometry::{container_to_native, fit_centered};
use cropsync_core::state::Size;

use crate::crop::CropRegionModel;
use crate::source::VideoSource;
use crate::surface::PreviewSurface;

// ── RenderLoopHandle ──────────────────────────────────────────────────────────

/// Opaque cancellation token for one run of the loop.
#[derive(Clone, Debug)]
pub struct RenderLoopHandle {
    id:        Uuid,
    cancelled: Arc<AtomicBool>,
}

impl RenderLoopHandle {
    fn new() -> Self {
        Self { id: Uuid::new_v4(), cancelled: Arc::new(AtomicBool::new(false)) }
    }

    pub fn id(&self) -> Uuid { self.id }

    pub fn is_cancelled(&self) -> bool { self.cancelled.load(Ordering::Acquire) }

    /// Returns true only for the call that actually cancelled.
    fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::AcqRel)
    }
}

impl PartialEq for RenderLoopHandle {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

// ── FrameScheduler ────────────────────────────────────────────────────────────

/// Requests made during display frame N come due in display frame N + 1.
#[derive(Default)]
pub struct FrameScheduler {
    queue: VecDeque<RenderLoopHandle>,
}

impl FrameScheduler {
    pub fn new() -> Self { Self { queue: VecDeque::new() } }

    pub fn request_frame(&mut self, handle: RenderLoopHandle) {
        self.queue.push_back(handle);
    }

    /// Everything requested before this call; requests made while processing
    /// the returned batch wait for the next display frame.
    pub fn take_due(&mut self) -> Vec<RenderLoopHandle> {
        self.queue.drain(..).collect()
    }

    pub fn pending(&self) -> usize { self.queue.len() }
}

// ── PreviewRenderLoop ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames that reached the surface.
    pub painted:           u64,
    /// Frames rescheduled without painting (no region, no source, no pixels yet).
    pub skipped:           u64,
    /// Due requests discarded because their handle had been cancelled.
    pub dropped_cancelled: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Painted,
    Skipped,
}

/// Everything a frame needs, borrowed for the duration of one display frame.
pub struct FrameInputs<'a> {
    pub source: Option<&'a dyn VideoSource>,
    pub crop:   Option<&'a CropRegionModel>,
}

pub struct PreviewRenderLoop {
    scheduler: FrameScheduler,
    active:    Option<RenderLoopHandle>,
    stats:     RenderStats,
}

impl PreviewRenderLoop {
    pub fn new() -> Self {
        Self { scheduler: FrameScheduler::new(), active: None, stats: RenderStats::default() }
    }

    /// Begin painting. Any loop already running on this surface is cancelled
    /// before the new handle exists.
    pub fn start(&mut self) -> RenderLoopHandle {
        self.cancel_active();
        let handle = RenderLoopHandle::new();
        self.scheduler.request_frame(handle.clone());
        self.active = Some(handle.clone());
        debug!("[render] loop {} started", handle.id());
        handle
    }

    /// Invalidate `handle`. Safe to call any number of times; returns whether
    /// this call was the one that cancelled it.
    pub fn cancel(&mut self, handle: &RenderLoopHandle) -> bool {
        if self.active.as_ref() == Some(handle) {
            self.active = None;
        }
        let cancelled = handle.cancel();
        if cancelled {
            debug!("[render] loop {} cancelled", handle.id());
        }
        cancelled
    }

    pub fn cancel_active(&mut self) -> bool {
        match self.active.take() {
            Some(h) => self.cancel(&h),
            None    => false,
        }
    }

    pub fn is_active(&self) -> bool { self.active.is_some() }

    pub fn active_handle(&self) -> Option<&RenderLoopHandle> { self.active.as_ref() }

    pub fn stats(&self) -> RenderStats { self.stats }

    pub fn pending_frames(&self) -> usize { self.scheduler.pending() }

    /// Run every frame request that is due. Returns how many painted.
    pub fn on_display_frame(&mut self, inputs: &FrameInputs<'_>, surface: &mut dyn PreviewSurface) -> usize {
        let mut painted = 0;
        for handle in self.scheduler.take_due() {
            if handle.is_cancelled() {
                self.stats.dropped_cancelled += 1;
                continue;
            }
            match paint_frame(inputs, surface) {
                FrameOutcome::Painted => {
                    self.stats.painted += 1;
                    painted += 1;
                }
                FrameOutcome::Skipped => self.stats.skipped += 1,
            }
            self.scheduler.request_frame(handle);
        }
        painted
    }
}

impl Default for PreviewRenderLoop {
    fn default() -> Self { Self::new() }
}

/// One frame: map the crop region into native pixels, clear, draw it fitted
/// and centered on the surface. Skips (without touching the surface) when any
/// input is not ready yet.
pub fn paint_frame(inputs: &FrameInputs<'_>, surface: &mut dyn PreviewSurface) -> FrameOutcome {
    let (Some(source), Some(crop)) = (inputs.source, inputs.crop) else {
        return FrameOutcome::Skipped;
    };
    let Some(frame) = source.current_frame() else { return FrameOutcome::Skipped };
    let size = surface.size();
    if frame.size().is_empty() || size.is_empty() {
        return FrameOutcome::Skipped;
    }

    let region = crop.current_region();
    let src = container_to_native(&region, crop.container(), frame.size());
    if src.is_empty() {
        return FrameOutcome::Skipped;
    }
    let dest = fit_centered(Size::new(size.width as f64, size.height as f64), region.aspect_ratio);

    surface.clear();
    surface.draw_subregion(frame, src, dest);
    FrameOutcome::Painted
}
