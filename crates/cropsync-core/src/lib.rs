// crates/cropsync-core/src/lib.rs
//
// Plain data and math for the crop-sync engine. No channels, no surfaces, no
// sources; cropsync-engine owns all runtime behaviour.

pub mod commands;
pub mod error;
pub mod helpers;
pub mod media_types;
pub mod state;

pub use error::CropError;
