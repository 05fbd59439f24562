// crates/cropsync-core/src/error.rs
//
// Synchronous rejections raised at the call site. None of these leave state
// half-changed: the caller gets the error and the model is exactly as before.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CropError {
    #[error("aspect ratio must be a positive finite number, got {0}")]
    InvalidAspectRatio(f64),

    #[error("playback rate {0} is not one of 0.5, 1, 1.5, 2")]
    InvalidPlaybackRate(f64),

    #[error("invalid size {width}x{height}")]
    InvalidSize { width: f64, height: f64 },

    #[error("no video source attached")]
    NoSource,

    #[error("cropper is not active")]
    CropperInactive,

    #[error("video frame not available yet")]
    FrameUnavailable,

    #[error("frame buffer holds {actual} bytes, expected {expected}")]
    FrameBufferSize { expected: usize, actual: usize },
}
