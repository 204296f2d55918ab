/// Per-image synchronization state
///
/// The fixed-size record attached to each presentable image: an image
/// view, the two semaphores ordering acquire/render/present, and the
/// fence that serializes reuse of the slot.

use crate::device::context::DeviceContext;
use crate::device::types::PixelFormat;
use crate::error::Result;
use crate::lumina_warn;

/// Synchronization record for one presentable image
///
/// All fields are created together and destroyed together. The binding of
/// `image_acquired` to this slot changes over time: the chain's spare
/// semaphore is swapped into whichever slot an acquire returns.
pub struct ImageSync<D: DeviceContext> {
    /// Presentable image, owned by the chain handle
    pub(crate) image: D::Image,
    /// View over `image`, owned by this record
    pub(crate) view: D::ImageView,
    /// Signaled when this image becomes available to render into
    pub(crate) image_acquired: D::Semaphore,
    /// Signaled when rendering into this image completes
    pub(crate) render_finished: D::Semaphore,
    /// Signaled when all work submitted against this image retires.
    /// Created pre-signaled so the first wait never blocks.
    pub(crate) frame_fence: D::Fence,
}

impl<D: DeviceContext> ImageSync<D> {
    /// Create the view and synchronization objects for one image
    ///
    /// Unwinds everything already created on any failure branch.
    pub fn new(device: &D, image: D::Image, format: PixelFormat) -> Result<Self> {
        let view = device.create_image_view(image, format)?;

        let image_acquired = match device.create_semaphore() {
            Ok(s) => s,
            Err(e) => {
                device.destroy_image_view(view);
                return Err(e);
            }
        };

        let render_finished = match device.create_semaphore() {
            Ok(s) => s,
            Err(e) => {
                device.destroy_semaphore(image_acquired);
                device.destroy_image_view(view);
                return Err(e);
            }
        };

        let frame_fence = match device.create_fence(true) {
            Ok(f) => f,
            Err(e) => {
                device.destroy_semaphore(render_finished);
                device.destroy_semaphore(image_acquired);
                device.destroy_image_view(view);
                return Err(e);
            }
        };

        Ok(Self {
            image,
            view,
            image_acquired,
            render_finished,
            frame_fence,
        })
    }

    /// Block until all work submitted against this image retires
    pub fn wait_for_fence(&self, device: &D) -> Result<()> {
        device.wait_for_fence(self.frame_fence)
    }

    /// Release all owned objects
    ///
    /// Destroying a view or semaphore still referenced by in-flight GPU
    /// work is undefined behavior at the API level, so the fence is waited
    /// first. A wait failure here is non-fatal: teardown must be
    /// unconditional, so it is logged and teardown proceeds.
    pub fn destroy(self, device: &D) {
        if let Err(e) = self.wait_for_fence(device) {
            lumina_warn!(
                "lumina::chain",
                "Fence wait failed during image teardown, releasing anyway: {}",
                e
            );
        }
        device.destroy_fence(self.frame_fence);
        device.destroy_semaphore(self.render_finished);
        device.destroy_semaphore(self.image_acquired);
        device.destroy_image_view(self.view);
        // The image itself belongs to the chain handle
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "image_sync_tests.rs"]
mod tests;
