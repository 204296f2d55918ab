/// Surface and swapchain description types shared between the core and
/// the backend implementations.

/// Pixel dimensions of a surface or image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent2d {
    pub width: u32,
    pub height: u32,
}

impl Extent2d {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero (nothing can be presented)
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Pixel formats a presentable image can use
///
/// Only the formats presentation surfaces commonly expose; backends skip
/// surface formats they cannot map onto this set.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
}

/// Color space of a presentable image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    SrgbNonlinear,
}

/// A (pixel format, color space) pair supported by a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceFormat {
    pub format: PixelFormat,
    pub color_space: ColorSpace,
}

/// Presentation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentMode {
    /// No queueing, may tear, lowest latency
    Immediate,
    /// Low latency without tearing (queued frames are replaced)
    Mailbox,
    /// Strict vsync; the one mode every surface supports
    Fifo,
    /// Vsync that tears instead of waiting when a frame is late
    FifoRelaxed,
}

/// Capabilities reported by a surface at query time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCaps {
    /// Minimum number of presentable images the surface requires
    pub min_image_count: u32,
    /// Maximum number of presentable images (0 = uncapped)
    pub max_image_count: u32,
    /// Extent enforced by the surface; `None` means the client decides
    /// within the min/max bounds
    pub current_extent: Option<Extent2d>,
    pub min_image_extent: Extent2d,
    pub max_image_extent: Extent2d,
}

/// How presentable images are shared between queue families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharingMode {
    /// Owned by a single queue family
    Exclusive,
    /// Shared between the graphics and present families
    Concurrent,
}

/// Parameters for creating a presentable-image chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapchainConfig {
    pub min_image_count: u32,
    pub surface_format: SurfaceFormat,
    pub extent: Extent2d,
    pub present_mode: PresentMode,
    pub sharing: SharingMode,
}

/// Status of a successful acquire or present
///
/// `Suboptimal` means the surface is still presentable but its parameters
/// have drifted (e.g. after a resize the driver has not been told about);
/// the caller uses it as a signal to rebuild the chain on its own schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapchainStatus {
    Optimal,
    Suboptimal,
}
