// crates/cropsync-engine/src/lib.rs
//
// Crop-region synchronization engine. No UI toolkit dependency: a shell drives
// it through SyncFacade and reads state back via snapshot subscriptions.
//
// To add a new capability:
//   1. Add a CropCommand variant in cropsync-core
//   2. Implement it on the owning component here
//   3. Wire one match arm in SyncFacade::apply

pub mod config;
pub mod crop;
pub mod drag;
pub mod facade;
pub mod feed;
pub mod playback;
pub mod render_loop;
pub mod source;
pub mod still;
pub mod store;
pub mod surface;

// Re-export the main public API so shells can import from the crate root.
pub use config::EngineConfig;
pub use facade::SyncFacade;
pub use feed::{feed_channel, FeedProducer, FeedSource};
pub use render_loop::RenderLoopHandle;
pub use source::{MemorySource, VideoSource};
pub use surface::{PreviewSurface, RgbaSurface};

pub use cropsync_core::commands::CropCommand;
pub use cropsync_core::error::CropError;
pub use cropsync_core::state::{AspectRatio, CropRegion, EngineSnapshot, PlaybackState};
