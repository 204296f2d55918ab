/*!
# Lumina Present - Vulkan backend

Implements [`lumina_present::device::DeviceContext`] over `ash`, so the
core presentation chain drives a real Vulkan swapchain.

The backend borrows the instance/device/surface from the application; it
creates none of them and destroys none of them. The application builds a
[`VulkanContext`] from its existing Vulkan objects and hands it to
`PresentChain::new`.
*/

pub mod vulkan_context;
pub mod vulkan_convert;

pub use vulkan_context::VulkanContext;
