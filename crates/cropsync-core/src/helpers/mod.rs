// crates/cropsync-core/src/helpers/mod.rs
pub mod blit;
pub mod geometry;
pub mod time;
