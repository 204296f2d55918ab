/// VulkanContext - DeviceContext implementation over ash
///
/// Borrows the instance/device/surface the application already created;
/// owns nothing but the loader tables. The presentation core drives all
/// swapchain, image-view, and synchronization lifetimes through this
/// context.

use std::sync::Arc;

use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use lumina_present::lumina::device::{
    DeviceContext, PixelFormat, PresentMode, SurfaceCaps, SurfaceFormat, SwapchainConfig,
    SwapchainStatus, SharingMode,
};
use lumina_present::lumina::{Error, Result};
use lumina_present::lumina_error;

use crate::vulkan_convert as convert;

/// Vulkan device/surface context
pub struct VulkanContext {
    device: Arc<ash::Device>,
    physical_device: vk::PhysicalDevice,

    surface: vk::SurfaceKHR,
    surface_loader: ash::khr::surface::Instance,
    swapchain_loader: ash::khr::swapchain::Device,

    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
    graphics_family: u32,
    present_family: u32,
}

impl VulkanContext {
    /// Build a context from the application's existing Vulkan objects
    ///
    /// # Arguments
    ///
    /// * `instance` - Vulkan instance (for the swapchain loader)
    /// * `device` - Vulkan logical device
    /// * `physical_device` - Physical device for surface queries
    /// * `surface` / `surface_loader` - Window surface and its loader
    /// * `graphics_queue` / `graphics_family` - Rendering queue
    /// * `present_queue` / `present_family` - Presentation queue (may be
    ///   the same queue/family)
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        instance: &ash::Instance,
        device: Arc<ash::Device>,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        surface_loader: ash::khr::surface::Instance,
        graphics_queue: vk::Queue,
        graphics_family: u32,
        present_queue: vk::Queue,
        present_family: u32,
    ) -> Self {
        let swapchain_loader = ash::khr::swapchain::Device::new(instance, &device);
        Self {
            device,
            physical_device,
            surface,
            surface_loader,
            swapchain_loader,
            graphics_queue,
            present_queue,
            graphics_family,
            present_family,
        }
    }

    /// Create a window surface for `window`
    ///
    /// Convenience for applications driving a winit window; the returned
    /// surface is owned by the caller and must outlive the context.
    pub fn create_surface(
        entry: &ash::Entry,
        instance: &ash::Instance,
        window: &winit::window::Window,
    ) -> Result<vk::SurfaceKHR> {
        let display_handle = window
            .display_handle()
            .map_err(|e| lumina_error_from_handle("display handle", e))?;
        let window_handle = window
            .window_handle()
            .map_err(|e| lumina_error_from_handle("window handle", e))?;
        unsafe {
            ash_window::create_surface(
                entry,
                instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| convert::map_vk_result(e, "Failed to create window surface"))
        }
    }

    /// The logical device this context borrows
    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    /// The graphics queue handle
    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }
}

fn lumina_error_from_handle(what: &str, e: raw_window_handle::HandleError) -> Error {
    lumina_error!("lumina::vulkan", "Failed to get {}: {:?}", what, e);
    Error::BackendError(format!("Failed to get {}: {:?}", what, e))
}

impl DeviceContext for VulkanContext {
    type Swapchain = vk::SwapchainKHR;
    type Image = vk::Image;
    type ImageView = vk::ImageView;
    type Semaphore = vk::Semaphore;
    type Fence = vk::Fence;
    type CommandBuffer = vk::CommandBuffer;

    fn surface_capabilities(&self) -> Result<SurfaceCaps> {
        let caps = unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(self.physical_device, self.surface)
                .map_err(|e| convert::map_vk_result(e, "Failed to get surface capabilities"))?
        };
        Ok(convert::surface_caps(caps))
    }

    fn surface_formats(&self) -> Result<Vec<SurfaceFormat>> {
        let formats = unsafe {
            self.surface_loader
                .get_physical_device_surface_formats(self.physical_device, self.surface)
                .map_err(|e| convert::map_vk_result(e, "Failed to get surface formats"))?
        };
        let formats: Vec<SurfaceFormat> = formats
            .into_iter()
            .filter_map(convert::surface_format)
            .collect();
        if formats.is_empty() {
            lumina_error!(
                "lumina::vulkan",
                "Surface reports no format the presentation core models"
            );
            return Err(Error::BackendError(
                "No supported surface format".to_string(),
            ));
        }
        Ok(formats)
    }

    fn present_modes(&self) -> Result<Vec<PresentMode>> {
        let modes = unsafe {
            self.surface_loader
                .get_physical_device_surface_present_modes(self.physical_device, self.surface)
                .map_err(|e| convert::map_vk_result(e, "Failed to get present modes"))?
        };
        Ok(modes.into_iter().filter_map(convert::present_mode).collect())
    }

    fn queue_families(&self) -> (u32, u32) {
        (self.graphics_family, self.present_family)
    }

    fn create_swapchain(
        &self,
        config: &SwapchainConfig,
        old: Option<vk::SwapchainKHR>,
    ) -> Result<vk::SwapchainKHR> {
        // The transform is not part of the core config; take the
        // surface's current one
        let caps = unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(self.physical_device, self.surface)
                .map_err(|e| convert::map_vk_result(e, "Failed to get surface capabilities"))?
        };

        let queue_families = [self.graphics_family, self.present_family];
        let mut create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(self.surface)
            .min_image_count(config.min_image_count)
            .image_format(convert::vk_format(config.surface_format.format))
            .image_color_space(convert::vk_color_space(config.surface_format.color_space))
            .image_extent(convert::vk_extent(config.extent))
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .pre_transform(caps.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(convert::vk_present_mode(config.present_mode))
            .clipped(true)
            .old_swapchain(old.unwrap_or(vk::SwapchainKHR::null()));

        create_info = match config.sharing {
            SharingMode::Concurrent => create_info
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(&queue_families),
            SharingMode::Exclusive => {
                create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            }
        };

        unsafe {
            self.swapchain_loader
                .create_swapchain(&create_info, None)
                .map_err(|e| convert::map_vk_result(e, "Failed to create swapchain"))
        }
    }

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        unsafe {
            self.swapchain_loader.destroy_swapchain(swapchain, None);
        }
    }

    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> Result<Vec<vk::Image>> {
        unsafe {
            self.swapchain_loader
                .get_swapchain_images(swapchain)
                .map_err(|e| convert::map_vk_result(e, "Failed to get swapchain images"))
        }
    }

    fn create_image_view(&self, image: vk::Image, format: PixelFormat) -> Result<vk::ImageView> {
        let create_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(convert::vk_format(format))
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });
        unsafe {
            self.device
                .create_image_view(&create_info, None)
                .map_err(|e| convert::map_vk_result(e, "Failed to create image view"))
        }
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        unsafe {
            self.device.destroy_image_view(view, None);
        }
    }

    fn create_semaphore(&self) -> Result<vk::Semaphore> {
        let create_info = vk::SemaphoreCreateInfo::default();
        unsafe {
            self.device
                .create_semaphore(&create_info, None)
                .map_err(|e| convert::map_vk_result(e, "Failed to create semaphore"))
        }
    }

    fn destroy_semaphore(&self, semaphore: vk::Semaphore) {
        unsafe {
            self.device.destroy_semaphore(semaphore, None);
        }
    }

    fn create_fence(&self, signaled: bool) -> Result<vk::Fence> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let create_info = vk::FenceCreateInfo::default().flags(flags);
        unsafe {
            self.device
                .create_fence(&create_info, None)
                .map_err(|e| convert::map_vk_result(e, "Failed to create fence"))
        }
    }

    fn destroy_fence(&self, fence: vk::Fence) {
        unsafe {
            self.device.destroy_fence(fence, None);
        }
    }

    fn wait_for_fence(&self, fence: vk::Fence) -> Result<()> {
        unsafe {
            self.device
                .wait_for_fences(&[fence], true, u64::MAX)
                .map_err(|e| convert::map_vk_result(e, "Fence wait failed"))
        }
    }

    fn reset_fence(&self, fence: vk::Fence) -> Result<()> {
        unsafe {
            self.device
                .reset_fences(&[fence])
                .map_err(|e| convert::map_vk_result(e, "Fence reset failed"))
        }
    }

    fn acquire_next_image(
        &self,
        swapchain: vk::SwapchainKHR,
        signal: vk::Semaphore,
    ) -> Result<(u32, SwapchainStatus)> {
        let result = unsafe {
            self.swapchain_loader.acquire_next_image(
                swapchain,
                u64::MAX,
                signal,
                vk::Fence::null(),
            )
        };
        match result {
            Ok((index, false)) => Ok((index, SwapchainStatus::Optimal)),
            Ok((index, true)) => Ok((index, SwapchainStatus::Suboptimal)),
            // Neither success nor suboptimal: fatal to this chain instance
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                lumina_error!("lumina::vulkan", "Swapchain out of date during acquire");
                Err(Error::ImageAcquireFailed)
            }
            Err(e) => Err(convert::map_vk_result(e, "Failed to acquire next image")),
        }
    }

    fn submit_graphics(
        &self,
        commands: vk::CommandBuffer,
        wait: vk::Semaphore,
        signal: vk::Semaphore,
        fence: vk::Fence,
    ) -> Result<()> {
        let wait_semaphores = [wait];
        // The acquired image is first touched when color output begins
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [commands];
        let signal_semaphores = [signal];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.device
                .queue_submit(self.graphics_queue, &[submit_info], fence)
                .map_err(|e| convert::map_vk_result(e, "Failed to submit to graphics queue"))
        }
    }

    fn present(
        &self,
        swapchain: vk::SwapchainKHR,
        index: u32,
        wait: vk::Semaphore,
    ) -> Result<SwapchainStatus> {
        let wait_semaphores = [wait];
        let swapchains = [swapchain];
        let image_indices = [index];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = unsafe {
            self.swapchain_loader
                .queue_present(self.present_queue, &present_info)
        };
        match result {
            Ok(false) => Ok(SwapchainStatus::Optimal),
            Ok(true) => Ok(SwapchainStatus::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                lumina_error!("lumina::vulkan", "Swapchain out of date during present");
                Err(Error::SwapchainOutOfDate)
            }
            Err(e) => Err(convert::map_vk_result(e, "Failed to present swapchain image")),
        }
    }
}
