// crates/cropsync-engine/src/still.rs
//
// Static preview: a one-off native-resolution copy of the cropped area of the
// frame currently on screen. Independent of the live render loop.

use std::io::BufWriter;
use std::path::Path;

use anyhow::Result;
use tracing::info;

use cropsync_core::error::CropError;
use cropsync_core::helpers::blit::crop_native;
use cropsync_core::helpers::geometry::container_to_native;
use cropsync_core::media_types::StillImage;

use crate::crop::CropRegionModel;
use crate::source::VideoSource;

/// Copy the crop region out of the source's current frame.
pub fn capture_still(source: &dyn VideoSource, crop: &CropRegionModel) -> Result<StillImage, CropError> {
    let frame  = source.current_frame().ok_or(CropError::FrameUnavailable)?;
    let region = crop.current_region();
    let src    = container_to_native(&region, crop.container(), frame.size());
    let (data, size) = crop_native(frame, src);
    if size.is_empty() {
        return Err(CropError::FrameUnavailable);
    }
    Ok(StillImage {
        width:     size.width,
        height:    size.height,
        timestamp: frame.timestamp,
        region,
        data,
    })
}

/// Write `still` as an 8-bit RGBA PNG.
pub fn save_png(still: &StillImage, dest: &Path) -> Result<()> {
    let file = std::fs::File::create(dest)?;
    let w    = &mut BufWriter::new(file);
    let mut encoder = png::Encoder::new(w, still.width, still.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&still.data)?;
    info!("[still] PNG saved → {} ({}×{})", dest.display(), still.width, still.height);
    Ok(())
}
