// crates/cropsync-engine/src/drag.rs
//
// Pointer input → crop geometry.
//
//   DragInputController   Idle ⇄ Dragging. Moves the region. A press outside
//                         the region is ignored so an ordinary move gesture can
//                         never resize.
//   HandleResizeController Idle ⇄ Resizing. Driven only by presses on a corner
//                         handle; calls resize_to anchored at the opposite corner.
//
// Both run to completion per input event and are the only writers of the
// region while a session is live.

use cropsync_core::state::{Corner, CropRegion};

use crate::crop::CropRegionModel;

// ── Move ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    pub pointer_origin:  (f64, f64),
    /// Pointer position at the last processed move. Deltas are taken from here,
    /// not from `pointer_origin`, so clamping at an edge never compounds.
    pub last_pointer:    (f64, f64),
    pub region_at_start: CropRegion,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragState {
    Idle,
    Dragging(DragSession),
}

pub struct DragInputController {
    state: DragState,
}

impl DragInputController {
    pub fn new() -> Self { Self { state: DragState::Idle } }

    pub fn state(&self) -> DragState { self.state }

    pub fn is_dragging(&self) -> bool { matches!(self.state, DragState::Dragging(_)) }

    /// Starts a session when the press lands inside the region. Returns whether
    /// it did. A press while already dragging is ignored.
    pub fn pointer_down(&mut self, x: f64, y: f64, model: &CropRegionModel) -> bool {
        if self.is_dragging() || !model.contains(x, y) {
            return false;
        }
        self.state = DragState::Dragging(DragSession {
            pointer_origin:  (x, y),
            last_pointer:    (x, y),
            region_at_start: model.current_region(),
        });
        true
    }

    /// Applies the delta since the last processed move. `None` when idle.
    pub fn pointer_move(&mut self, x: f64, y: f64, model: &mut CropRegionModel) -> Option<CropRegion> {
        let DragState::Dragging(session) = &mut self.state else { return None };
        let (lx, ly) = session.last_pointer;
        session.last_pointer = (x, y);
        Some(model.move_by(x - lx, y - ly))
    }

    /// Pointer up, pointer cancel, pointer leave and cropper stop all land here.
    /// Returns whether a session was discarded.
    pub fn end(&mut self) -> bool {
        let was = self.is_dragging();
        self.state = DragState::Idle;
        was
    }
}

impl Default for DragInputController {
    fn default() -> Self { Self::new() }
}

// ── Resize by handle ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeSession {
    pub handle:          Corner,
    pub region_at_start: CropRegion,
}

pub struct HandleResizeController {
    session: Option<ResizeSession>,
}

impl HandleResizeController {
    pub fn new() -> Self { Self { session: None } }

    pub fn session(&self) -> Option<ResizeSession> { self.session }

    pub fn is_resizing(&self) -> bool { self.session.is_some() }

    /// Starts a session when the press is within `radius` of a corner handle.
    pub fn pointer_down(&mut self, x: f64, y: f64, radius: f64, model: &CropRegionModel) -> bool {
        if self.session.is_some() {
            return false;
        }
        let Some(handle) = model.hit_handle(x, y, radius) else { return false };
        self.session = Some(ResizeSession { handle, region_at_start: model.current_region() });
        true
    }

    /// The pointer's distance from the fixed opposite corner becomes the
    /// requested size; the model derives the locked dimension.
    pub fn pointer_move(&mut self, x: f64, y: f64, model: &mut CropRegionModel) -> Option<CropRegion> {
        let session = self.session?;
        let anchor = session.handle.opposite();
        let (ax, ay) = session.region_at_start.corner(anchor);
        let w = if session.handle.is_left() { ax - x } else { x - ax };
        let h = if session.handle.is_top() { ay - y } else { y - ay };
        // Crossing over the anchor collapses to the minimum size rather than flipping.
        model.resize_to(w.max(1.0), h.max(1.0), anchor).ok()
    }

    pub fn end(&mut self) -> bool {
        self.session.take().is_some()
    }
}

impl Default for HandleResizeController {
    fn default() -> Self { Self::new() }
}
