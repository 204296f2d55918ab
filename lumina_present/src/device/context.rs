/// DeviceContext trait - the seam between the presentation core and the
/// underlying graphics API.

use std::fmt::Debug;

use crate::error::Result;
use crate::device::types::{
    PixelFormat, PresentMode, SurfaceCaps, SurfaceFormat,
    SwapchainConfig, SwapchainStatus,
};

/// Operations the presentation chain needs from a device/surface context
///
/// Backends implement this over their native handles. The chain borrows
/// the context for its entire lifetime and never outlives it; all handle
/// types are plain copyable values whose ownership discipline (every
/// create matched by a destroy) is enforced by the chain.
///
/// All waits use the maximum representable timeout: a hung device produces
/// an indefinite hang rather than a recoverable error, an accepted
/// limitation at this layer.
pub trait DeviceContext {
    type Swapchain: Copy + Eq + Debug;
    type Image: Copy + Eq + Debug;
    type ImageView: Copy + Eq + Debug;
    type Semaphore: Copy + Eq + Debug;
    type Fence: Copy + Eq + Debug;
    type CommandBuffer: Copy + Debug;

    // ===== SURFACE QUERIES =====

    /// Query the surface capabilities as of right now
    fn surface_capabilities(&self) -> Result<SurfaceCaps>;

    /// Enumerate supported surface formats (a surface reports at least one)
    fn surface_formats(&self) -> Result<Vec<SurfaceFormat>>;

    /// Enumerate supported present modes
    fn present_modes(&self) -> Result<Vec<PresentMode>>;

    /// Queue family identifiers as (graphics, present); may be equal
    fn queue_families(&self) -> (u32, u32);

    // ===== SWAPCHAIN =====

    /// Create a presentable-image chain
    ///
    /// `old` is the recycling hint: a still-live previous chain the driver
    /// may cannibalize. Passing it does not destroy it.
    fn create_swapchain(
        &self,
        config: &SwapchainConfig,
        old: Option<Self::Swapchain>,
    ) -> Result<Self::Swapchain>;

    fn destroy_swapchain(&self, swapchain: Self::Swapchain);

    /// Enumerate the images owned by a chain (their count is decided by
    /// the driver, not the caller)
    fn swapchain_images(&self, swapchain: Self::Swapchain) -> Result<Vec<Self::Image>>;

    // ===== PER-IMAGE OBJECTS =====

    fn create_image_view(&self, image: Self::Image, format: PixelFormat)
        -> Result<Self::ImageView>;
    fn destroy_image_view(&self, view: Self::ImageView);

    fn create_semaphore(&self) -> Result<Self::Semaphore>;
    fn destroy_semaphore(&self, semaphore: Self::Semaphore);

    /// Create a fence, optionally already signaled
    fn create_fence(&self, signaled: bool) -> Result<Self::Fence>;
    fn destroy_fence(&self, fence: Self::Fence);

    // ===== SYNCHRONIZATION =====

    /// Block until the fence is signaled (unbounded timeout)
    fn wait_for_fence(&self, fence: Self::Fence) -> Result<()>;

    /// Return the fence to the unsignaled state
    fn reset_fence(&self, fence: Self::Fence) -> Result<()>;

    // ===== FRAME PROTOCOL =====

    /// Request the index of the next presentable image (unbounded timeout)
    ///
    /// `signal` is signaled when the returned image is actually available
    /// to render into.
    fn acquire_next_image(
        &self,
        swapchain: Self::Swapchain,
        signal: Self::Semaphore,
    ) -> Result<(u32, SwapchainStatus)>;

    /// Submit recorded commands to the graphics queue
    ///
    /// Execution waits on `wait`, signals `signal` when rendering
    /// completes, and signals `fence` when all submitted work retires.
    fn submit_graphics(
        &self,
        commands: Self::CommandBuffer,
        wait: Self::Semaphore,
        signal: Self::Semaphore,
        fence: Self::Fence,
    ) -> Result<()>;

    /// Queue the image at `index` for presentation, after `wait` signals
    fn present(
        &self,
        swapchain: Self::Swapchain,
        index: u32,
        wait: Self::Semaphore,
    ) -> Result<SwapchainStatus>;
}
