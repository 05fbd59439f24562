// crates/cropsync-core/src/commands.rs
//
// Every action the UI shell can ask of the engine is a CropCommand.
// The shell emits these; SyncFacade::apply processes them one at a time.
// Adding a new feature = add a variant here + one match arm in the facade.

use crate::state::AspectRatio;

#[derive(Debug, Clone, PartialEq)]
pub enum CropCommand {
    // ── Playback ─────────────────────────────────────────────────────────────
    Play,
    Pause,
    TogglePlay,
    Seek(f64),
    SetVolume(f32),
    /// Rejected unless the value is one of 0.5, 1, 1.5, 2.
    SetPlaybackRate(f64),

    // ── Cropper ──────────────────────────────────────────────────────────────
    StartCropper,
    StopCropper,
    SetAspectRatio(f64),
    SetAspectPreset(AspectRatio),
    /// The rendered video element was laid out at a new size.
    SetContainerSize { width: f64, height: f64 },
    /// Capture one still at the current region and play-head time.
    GenerateStaticPreview,

    // ── Preview ──────────────────────────────────────────────────────────────
    EnablePreview,
    DisablePreview,

    // ── Pointer (container coordinates) ─────────────────────────────────────
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    PointerCancel,
    /// Pointer left the tracking surface. Ends any session like a cancel.
    PointerLeave,
}
