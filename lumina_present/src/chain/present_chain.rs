/// Presentation chain
///
/// Owns the presentable images, their synchronization records, and the
/// acquire/submit/present protocol. Presentation is completely separated
/// from rendering: the caller records commands against the current image
/// and hands them to [`PresentChain::present`], never touching semaphores
/// or fences directly.

use std::mem;
use std::sync::Arc;

use crate::chain::image_sync::ImageSync;
use crate::chain::selection::{
    find_actual_extent, find_present_mode, find_surface_format, select_image_count,
    PREFERRED_SURFACE_FORMAT,
};
use crate::device::context::DeviceContext;
use crate::device::types::{
    Extent2d, PixelFormat, PresentMode, SharingMode, SurfaceFormat, SwapchainConfig,
    SwapchainStatus,
};
use crate::error::{Error, Result};
use crate::{lumina_info, lumina_warn};

/// Device-owned chain state, rebuilt wholesale on recreate
struct ChainState<D: DeviceContext> {
    surface_format: SurfaceFormat,
    present_mode: PresentMode,
    extent: Extent2d,
    handle: D::Swapchain,
    images: Vec<ImageSync<D>>,
    current_index: usize,
    /// The one semaphore not bound to any image slot, armed as the signal
    /// target of the next acquire. Which semaphore an acquire will signal
    /// must be chosen before the acquired index is known, so one floating
    /// semaphore is kept ready and swapped into the winning slot after
    /// the acquire returns.
    next_image_acquired: D::Semaphore,
}

/// The presentable-image chain
///
/// The chain borrows the device context for its entire lifetime (it must
/// not outlive it) and exclusively owns every object it creates: image
/// views, semaphores, fences, and the chain handle itself.
///
/// Frame protocol: the caller renders into [`PresentChain::current_image`]
/// and calls [`PresentChain::present`], which performs fence-wait, submit,
/// present, and next-image acquire as one step. The next frame's image is
/// acquired at the end of the previous `present` call, so a valid current
/// image is available at all times.
pub struct PresentChain<D: DeviceContext> {
    device: Arc<D>,
    state: ChainState<D>,
    /// Set once teardown has run (explicitly, or after a failed recreate
    /// released everything); the remaining handle copies are stale and
    /// must not reach the device.
    destroyed: bool,
}

impl<D: DeviceContext> ChainState<D> {
    /// Construction steps shared by first-time init and recreate
    ///
    /// `old` is the recycling hint. It is destroyed exactly once on every
    /// path out of this function, and never before the create call that
    /// recycles it has been made. On failure, everything created here is
    /// unwound in reverse order before the error propagates.
    fn init(device: &Arc<D>, requested: Extent2d, old: Option<D::Swapchain>) -> Result<Self> {
        let config = match Self::choose_config(device.as_ref(), requested) {
            Ok(config) => config,
            Err(e) => {
                if let Some(old) = old {
                    device.destroy_swapchain(old);
                }
                return Err(e);
            }
        };

        let handle = match device.create_swapchain(&config, old) {
            Ok(handle) => handle,
            Err(e) => {
                if let Some(old) = old {
                    device.destroy_swapchain(old);
                }
                return Err(e);
            }
        };
        // The new handle exists; the recycled chain can now be released
        if let Some(old) = old {
            device.destroy_swapchain(old);
        }

        let mut images =
            match Self::create_slots(device.as_ref(), handle, config.surface_format.format) {
                Ok(images) => images,
                Err(e) => {
                    device.destroy_swapchain(handle);
                    return Err(e);
                }
            };

        let spare = match device.create_semaphore() {
            Ok(spare) => spare,
            Err(e) => {
                for slot in images {
                    slot.destroy(device.as_ref());
                }
                device.destroy_swapchain(handle);
                return Err(e);
            }
        };

        // Initial acquire: arm the spare, then swap it into whichever slot
        // the acquire returned
        let (index, _status) = match device.acquire_next_image(handle, spare) {
            Ok(result) => result,
            Err(e) => {
                device.destroy_semaphore(spare);
                for slot in images {
                    slot.destroy(device.as_ref());
                }
                device.destroy_swapchain(handle);
                return Err(e);
            }
        };

        let mut next_image_acquired = spare;
        mem::swap(
            &mut next_image_acquired,
            &mut images[index as usize].image_acquired,
        );

        Ok(Self {
            surface_format: config.surface_format,
            present_mode: config.present_mode,
            extent: config.extent,
            handle,
            images,
            current_index: index as usize,
            next_image_acquired,
        })
    }

    /// Query the surface and pick every creation parameter
    fn choose_config(device: &D, requested: Extent2d) -> Result<SwapchainConfig> {
        let caps = device.surface_capabilities()?;
        let extent = find_actual_extent(&caps, requested)?;

        let formats = device.surface_formats()?;
        let surface_format = find_surface_format(&formats, PREFERRED_SURFACE_FORMAT);

        let modes = device.present_modes()?;
        let present_mode = find_present_mode(&modes);

        let (graphics_family, present_family) = device.queue_families();
        let sharing = if graphics_family != present_family {
            SharingMode::Concurrent
        } else {
            SharingMode::Exclusive
        };

        Ok(SwapchainConfig {
            min_image_count: select_image_count(&caps),
            surface_format,
            extent,
            present_mode,
            sharing,
        })
    }

    /// Build one synchronization record per image in the chain
    fn create_slots(
        device: &D,
        handle: D::Swapchain,
        format: PixelFormat,
    ) -> Result<Vec<ImageSync<D>>> {
        let images = device.swapchain_images(handle)?;
        let mut slots = Vec::with_capacity(images.len());
        for image in images {
            match ImageSync::new(device, image, format) {
                Ok(slot) => slots.push(slot),
                Err(e) => {
                    for slot in slots {
                        slot.destroy(device);
                    }
                    return Err(e);
                }
            }
        }
        Ok(slots)
    }
}

impl<D: DeviceContext> PresentChain<D> {
    /// Create a presentation chain against the current surface state
    ///
    /// # Arguments
    ///
    /// * `device` - Device/surface context the chain will borrow
    /// * `extent` - Requested pixel dimensions; clamped to what the
    ///   surface supports, or replaced outright if the surface enforces a
    ///   fixed extent
    ///
    /// # Errors
    ///
    /// `InvalidSurfaceDimensions` if the resolved extent has zero area,
    /// `ImageAcquireFailed` if the initial acquire reports neither success
    /// nor suboptimal, plus pass-through device failures. No partially
    /// created resources survive a failed construction.
    pub fn new(device: Arc<D>, extent: Extent2d) -> Result<Self> {
        let state = ChainState::init(&device, extent, None)?;
        lumina_info!(
            "lumina::chain",
            "Presentation chain created: {} images, {}x{}, {:?}",
            state.images.len(),
            state.extent.width,
            state.extent.height,
            state.present_mode
        );
        Ok(Self {
            device,
            state,
            destroyed: false,
        })
    }

    /// Rebuild the chain after a resize or a suboptimal/out-of-date signal
    ///
    /// Destroys everything except the chain handle, then reruns
    /// construction with the still-live handle as the recycling hint so
    /// the driver can transition resources without a visible gap.
    ///
    /// On error the chain has released all of its device objects and is
    /// inert; the caller is expected to drop it and reset the session.
    pub fn recreate(&mut self, extent: Extent2d) -> Result<()> {
        assert!(!self.destroyed, "presentation chain used after destroy");

        self.wait_for_all_fences();
        for slot in self.state.images.drain(..) {
            slot.destroy(self.device.as_ref());
        }
        self.device.destroy_semaphore(self.state.next_image_acquired);

        // The old handle is the only live resource left; init consumes it
        match ChainState::init(&self.device, extent, Some(self.state.handle)) {
            Ok(state) => {
                self.state = state;
                lumina_info!(
                    "lumina::chain",
                    "Presentation chain recreated: {} images, {}x{}",
                    self.state.images.len(),
                    self.state.extent.width,
                    self.state.extent.height
                );
                Ok(())
            }
            Err(e) => {
                self.destroyed = true;
                Err(e)
            }
        }
    }

    // ===== ACCESSORS =====

    /// The image the caller should render into right now
    pub fn current_image(&self) -> D::Image {
        assert!(!self.destroyed, "presentation chain used after destroy");
        self.state.images[self.state.current_index].image
    }

    /// View over the current image and its index in the chain
    pub fn current_view_and_index(&self) -> (D::ImageView, u32) {
        assert!(!self.destroyed, "presentation chain used after destroy");
        let slot = &self.state.images[self.state.current_index];
        (slot.view, self.state.current_index as u32)
    }

    /// Index of the current image
    pub fn current_index(&self) -> u32 {
        self.state.current_index as u32
    }

    /// Current pixel dimensions of the chain
    pub fn extent(&self) -> Extent2d {
        self.state.extent
    }

    /// The (format, color space) the chain was created with
    pub fn surface_format(&self) -> SurfaceFormat {
        self.state.surface_format
    }

    /// The presentation policy the chain was created with
    pub fn present_mode(&self) -> PresentMode {
        self.state.present_mode
    }

    /// Number of presentable images in the chain
    pub fn image_count(&self) -> usize {
        self.state.images.len()
    }

    // ===== FRAME PROTOCOL =====

    /// Submit rendered commands for the current image and present it
    ///
    /// Executed in this exact order every frame:
    ///
    /// 1. Wait on the current slot's fence, then reset it. This blocks
    ///    until the GPU has retired all previously submitted work for the
    ///    slot, bounding how far ahead the CPU can get.
    /// 2. Submit `commands` to the graphics queue: wait on the slot's
    ///    acquired semaphore, signal its render-finished semaphore, signal
    ///    its fence on retirement.
    /// 3. Present the current image, waiting on render-finished.
    /// 4. Immediately acquire the next image with the spare semaphore as
    ///    the signal target, decoupling acquisition latency from frame
    ///    pacing.
    /// 5. Swap the spare with the acquired slot's semaphore and move
    ///    `current_index` there.
    ///
    /// Returns `Suboptimal` when the surface is still presentable but the
    /// chain's parameters have drifted; the caller should `recreate` on
    /// its own schedule. Errors propagate immediately without retry.
    pub fn present(&mut self, commands: D::CommandBuffer) -> Result<SwapchainStatus> {
        if self.destroyed {
            return Err(Error::BackendError(
                "presentation chain used after destroy".to_string(),
            ));
        }

        let (image_acquired, render_finished, frame_fence) = {
            let slot = &self.state.images[self.state.current_index];
            (slot.image_acquired, slot.render_finished, slot.frame_fence)
        };

        // 1. Throttle: the slot's previous submission must retire before
        // its synchronization objects are reused
        self.device.wait_for_fence(frame_fence)?;
        self.device.reset_fence(frame_fence)?;

        // 2. Render
        self.device
            .submit_graphics(commands, image_acquired, render_finished, frame_fence)?;

        // 3. Present
        let present_status =
            self.device
                .present(self.state.handle, self.state.current_index as u32, render_finished)?;

        // 4. Eager acquire for the frame after this one
        let (index, acquire_status) = self
            .device
            .acquire_next_image(self.state.handle, self.state.next_image_acquired)?;

        // 5. The spare was signaled for slot `index`; swap it in
        mem::swap(
            &mut self.state.next_image_acquired,
            &mut self.state.images[index as usize].image_acquired,
        );
        self.state.current_index = index as usize;

        if present_status == SwapchainStatus::Suboptimal
            || acquire_status == SwapchainStatus::Suboptimal
        {
            Ok(SwapchainStatus::Suboptimal)
        } else {
            Ok(SwapchainStatus::Optimal)
        }
    }

    // ===== TEARDOWN =====

    /// Best-effort drain of every slot's fence
    ///
    /// Individual wait failures are logged and swallowed so teardown never
    /// fails outright on one stuck slot.
    pub fn wait_for_all_fences(&self) {
        for slot in &self.state.images {
            if let Err(e) = slot.wait_for_fence(self.device.as_ref()) {
                lumina_warn!(
                    "lumina::chain",
                    "Fence wait failed while draining chain: {}",
                    e
                );
            }
        }
    }

    /// Release every device object the chain owns
    ///
    /// Safe to call more than once; also invoked by `Drop`.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.wait_for_all_fences();
        for slot in self.state.images.drain(..) {
            slot.destroy(self.device.as_ref());
        }
        self.device.destroy_semaphore(self.state.next_image_acquired);
        self.device.destroy_swapchain(self.state.handle);
        self.destroyed = true;
    }
}

impl<D: DeviceContext> Drop for PresentChain<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "present_chain_tests.rs"]
mod tests;
