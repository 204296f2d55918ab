/// Conversions between the core presentation model and `ash::vk` types

use ash::vk;
use lumina_present::lumina::device::{
    ColorSpace, Extent2d, PixelFormat, PresentMode, SurfaceCaps, SurfaceFormat,
};
use lumina_present::lumina::Error;

/// Core pixel format to Vulkan format
pub fn vk_format(format: PixelFormat) -> vk::Format {
    match format {
        PixelFormat::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        PixelFormat::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        PixelFormat::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
        PixelFormat::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
    }
}

/// Vulkan format to core pixel format; `None` for formats the core does
/// not model (the surface enumeration skips them)
pub fn pixel_format(format: vk::Format) -> Option<PixelFormat> {
    match format {
        vk::Format::R8G8B8A8_SRGB => Some(PixelFormat::R8G8B8A8_SRGB),
        vk::Format::R8G8B8A8_UNORM => Some(PixelFormat::R8G8B8A8_UNORM),
        vk::Format::B8G8R8A8_SRGB => Some(PixelFormat::B8G8R8A8_SRGB),
        vk::Format::B8G8R8A8_UNORM => Some(PixelFormat::B8G8R8A8_UNORM),
        _ => None,
    }
}

pub fn vk_color_space(color_space: ColorSpace) -> vk::ColorSpaceKHR {
    match color_space {
        ColorSpace::SrgbNonlinear => vk::ColorSpaceKHR::SRGB_NONLINEAR,
    }
}

pub fn color_space(color_space: vk::ColorSpaceKHR) -> Option<ColorSpace> {
    match color_space {
        vk::ColorSpaceKHR::SRGB_NONLINEAR => Some(ColorSpace::SrgbNonlinear),
        _ => None,
    }
}

/// Vulkan surface format to core surface format; `None` when either half
/// is unmodeled
pub fn surface_format(format: vk::SurfaceFormatKHR) -> Option<SurfaceFormat> {
    Some(SurfaceFormat {
        format: pixel_format(format.format)?,
        color_space: color_space(format.color_space)?,
    })
}

pub fn vk_present_mode(mode: PresentMode) -> vk::PresentModeKHR {
    match mode {
        PresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
        PresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
        PresentMode::Fifo => vk::PresentModeKHR::FIFO,
        PresentMode::FifoRelaxed => vk::PresentModeKHR::FIFO_RELAXED,
    }
}

/// Vulkan present mode to core present mode; shared-image modes are not
/// modeled and are skipped during enumeration
pub fn present_mode(mode: vk::PresentModeKHR) -> Option<PresentMode> {
    match mode {
        vk::PresentModeKHR::IMMEDIATE => Some(PresentMode::Immediate),
        vk::PresentModeKHR::MAILBOX => Some(PresentMode::Mailbox),
        vk::PresentModeKHR::FIFO => Some(PresentMode::Fifo),
        vk::PresentModeKHR::FIFO_RELAXED => Some(PresentMode::FifoRelaxed),
        _ => None,
    }
}

/// Vulkan surface capabilities to the core model
///
/// Vulkan reports `u32::MAX` as the current extent when the surface lets
/// the client decide; the core models that as `None`.
pub fn surface_caps(caps: vk::SurfaceCapabilitiesKHR) -> SurfaceCaps {
    let current_extent = if caps.current_extent.width == u32::MAX {
        None
    } else {
        Some(Extent2d::new(caps.current_extent.width, caps.current_extent.height))
    };
    SurfaceCaps {
        min_image_count: caps.min_image_count,
        max_image_count: caps.max_image_count,
        current_extent,
        min_image_extent: Extent2d::new(
            caps.min_image_extent.width,
            caps.min_image_extent.height,
        ),
        max_image_extent: Extent2d::new(
            caps.max_image_extent.width,
            caps.max_image_extent.height,
        ),
    }
}

pub fn vk_extent(extent: Extent2d) -> vk::Extent2D {
    vk::Extent2D {
        width: extent.width,
        height: extent.height,
    }
}

/// Map a Vulkan result code onto the core error enum
///
/// Out-of-memory, device-lost, and surface-lost pass through as their own
/// variants; everything else becomes a backend error carrying `context`.
pub fn map_vk_result(result: vk::Result, context: &str) -> Error {
    match result {
        vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
            Error::OutOfMemory
        }
        vk::Result::ERROR_DEVICE_LOST => Error::DeviceLost,
        vk::Result::ERROR_SURFACE_LOST_KHR => Error::SurfaceLost,
        other => Error::BackendError(format!("{}: {:?}", context, other)),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "vulkan_convert_tests.rs"]
mod tests;
