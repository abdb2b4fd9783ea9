//! PNG snapshots of a [`PixelSurface`].
//!
//! Feature-gated behind `png` (default on) so hosts that only need the pixel
//! buffer do not pull in the `image` crate.

use crate::PixelSurface;
use driftlines_core::error::WaveError;
use std::path::Path;

/// Writes the surface's current pixels as an RGBA PNG.
///
/// Returns `WaveError::InvalidDimensions` if the dimensions overflow `u32`,
/// or `WaveError::Io` on encode or write failure.
pub fn write_png(surface: &PixelSurface, path: &Path) -> Result<(), WaveError> {
    let w = u32::try_from(surface.width()).map_err(|_| WaveError::InvalidDimensions)?;
    let h = u32::try_from(surface.height()).map_err(|_| WaveError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, surface.pixels().to_vec())
        .ok_or_else(|| WaveError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| WaveError::Io(e.to_string()))?;
    tracing::debug!(path = %path.display(), width = w, height = h, "wrote snapshot");
    Ok(())
}
