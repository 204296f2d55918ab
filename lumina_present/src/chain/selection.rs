/// Pure selection functions for chain construction
///
/// Each takes the surface's answers and picks the parameter the chain will
/// be created with. Kept free of device handles so they can be tested as
/// plain functions.

use crate::device::types::{
    ColorSpace, Extent2d, PixelFormat, PresentMode, SurfaceCaps, SurfaceFormat,
};
use crate::error::{Error, Result};

/// The (format, color space) pair the chain asks for first
pub const PREFERRED_SURFACE_FORMAT: SurfaceFormat = SurfaceFormat {
    format: PixelFormat::B8G8R8A8_SRGB,
    color_space: ColorSpace::SrgbNonlinear,
};

/// Pick a surface format: `preferred` if the surface supports it, else the
/// first format the surface reports.
///
/// A surface is guaranteed to report at least one format.
pub fn find_surface_format(
    available: &[SurfaceFormat],
    preferred: SurfaceFormat,
) -> SurfaceFormat {
    available
        .iter()
        .copied()
        .find(|f| *f == preferred)
        .unwrap_or(available[0])
}

/// Pick a present mode: Mailbox (no tearing, no forced vsync wait), then
/// Immediate (low latency with tearing), falling back to Fifo, the one
/// mode every surface supports.
pub fn find_present_mode(available: &[PresentMode]) -> PresentMode {
    for preferred in [PresentMode::Mailbox, PresentMode::Immediate] {
        if available.contains(&preferred) {
            return preferred;
        }
    }
    PresentMode::Fifo
}

/// Compute the actual chain extent from the surface capabilities
///
/// If the surface reports a fixed extent it is used verbatim; otherwise
/// the requested extent is clamped to the surface's min/max. A zero-area
/// result fails construction; the caller should wait for a resize event
/// and retry.
pub fn find_actual_extent(caps: &SurfaceCaps, requested: Extent2d) -> Result<Extent2d> {
    let extent = match caps.current_extent {
        Some(fixed) => fixed,
        None => Extent2d::new(
            requested.width.clamp(caps.min_image_extent.width, caps.max_image_extent.width),
            requested.height.clamp(caps.min_image_extent.height, caps.max_image_extent.height),
        ),
    };

    if extent.is_degenerate() {
        return Err(Error::InvalidSurfaceDimensions {
            width: extent.width,
            height: extent.height,
        });
    }
    Ok(extent)
}

/// Target image count: one more than the surface minimum, capped at the
/// surface maximum when one is declared (0 means uncapped).
pub fn select_image_count(caps: &SurfaceCaps) -> u32 {
    let count = caps.min_image_count + 1;
    if caps.max_image_count > 0 {
        count.min(caps.max_image_count)
    } else {
        count
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;
