/// Mock DeviceContext for unit tests (no GPU required)
///
/// Allocates distinct ids for every created object, records every call in
/// order, tracks live objects so tests can assert leak-freedom, and lets
/// tests script acquire responses and inject failures. Submitted work
/// retires instantly: `submit_graphics` signals its fence immediately.
///
/// Waiting on a fence that is not signaled would deadlock a real device,
/// so the mock panics instead.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::device::context::DeviceContext;
use crate::device::types::{
    Extent2d, ColorSpace, PixelFormat, PresentMode, SurfaceCaps, SurfaceFormat,
    SwapchainConfig, SwapchainStatus,
};
use crate::error::{Error, Result};

/// Opaque handle type shared by all mock objects
pub type MockHandle = u64;

/// One recorded device operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    CreateSwapchain { handle: MockHandle, old: Option<MockHandle>, config: SwapchainConfig },
    DestroySwapchain(MockHandle),
    CreateImageView { handle: MockHandle, image: MockHandle },
    DestroyImageView(MockHandle),
    CreateSemaphore(MockHandle),
    DestroySemaphore(MockHandle),
    CreateFence { handle: MockHandle, signaled: bool },
    DestroyFence(MockHandle),
    WaitFence(MockHandle),
    ResetFence(MockHandle),
    Acquire { swapchain: MockHandle, signal: MockHandle, index: u32 },
    Submit { commands: MockHandle, wait: MockHandle, signal: MockHandle, fence: MockHandle },
    Present { swapchain: MockHandle, index: u32, wait: MockHandle },
}

/// Create/destroy tallies derived from the call log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockCounts {
    pub swapchains_created: u32,
    pub swapchains_destroyed: u32,
    pub views_created: u32,
    pub views_destroyed: u32,
    pub semaphores_created: u32,
    pub semaphores_destroyed: u32,
    pub fences_created: u32,
    pub fences_destroyed: u32,
}

struct MockState {
    next_handle: MockHandle,
    calls: Vec<MockCall>,

    // Configurable surface/device answers
    caps: SurfaceCaps,
    formats: Vec<SurfaceFormat>,
    modes: Vec<PresentMode>,
    graphics_family: u32,
    present_family: u32,
    images_per_chain: u32,
    present_status: SwapchainStatus,

    // Acquire behavior: scripted responses first, then round-robin
    acquire_script: VecDeque<(u32, SwapchainStatus)>,
    acquire_cursor: u32,

    // Live-object tracking
    live_swapchains: HashSet<MockHandle>,
    live_views: HashSet<MockHandle>,
    live_semaphores: HashSet<MockHandle>,
    live_fences: HashSet<MockHandle>,
    chain_images: HashMap<MockHandle, Vec<MockHandle>>,
    signaled_fences: HashSet<MockHandle>,

    // Failure injection
    views_until_failure: Option<u32>,
    semaphores_until_failure: Option<u32>,
    fail_fence_creation: bool,
    fail_acquire: bool,
    fail_submit: bool,
    fail_fence_waits: bool,
}

/// Mock device/surface context
pub struct MockDevice {
    state: RefCell<MockState>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(MockState {
                next_handle: 1,
                calls: Vec::new(),
                caps: SurfaceCaps {
                    min_image_count: 2,
                    max_image_count: 0,
                    current_extent: None,
                    min_image_extent: Extent2d::new(1, 1),
                    max_image_extent: Extent2d::new(4096, 4096),
                },
                formats: vec![
                    SurfaceFormat {
                        format: PixelFormat::B8G8R8A8_SRGB,
                        color_space: ColorSpace::SrgbNonlinear,
                    },
                    SurfaceFormat {
                        format: PixelFormat::R8G8B8A8_UNORM,
                        color_space: ColorSpace::SrgbNonlinear,
                    },
                ],
                modes: vec![PresentMode::Fifo],
                graphics_family: 0,
                present_family: 0,
                images_per_chain: 3,
                present_status: SwapchainStatus::Optimal,
                acquire_script: VecDeque::new(),
                acquire_cursor: 0,
                live_swapchains: HashSet::new(),
                live_views: HashSet::new(),
                live_semaphores: HashSet::new(),
                live_fences: HashSet::new(),
                chain_images: HashMap::new(),
                signaled_fences: HashSet::new(),
                views_until_failure: None,
                semaphores_until_failure: None,
                fail_fence_creation: false,
                fail_acquire: false,
                fail_submit: false,
                fail_fence_waits: false,
            }),
        }
    }

    // ===== CONFIGURATION =====

    pub fn with_caps(self, caps: SurfaceCaps) -> Self {
        self.state.borrow_mut().caps = caps;
        self
    }

    /// Surface enforces a fixed extent (the "driver decides" case)
    pub fn with_fixed_extent(self, width: u32, height: u32) -> Self {
        self.state.borrow_mut().caps.current_extent = Some(Extent2d::new(width, height));
        self
    }

    pub fn with_formats(self, formats: Vec<SurfaceFormat>) -> Self {
        self.state.borrow_mut().formats = formats;
        self
    }

    pub fn with_modes(self, modes: Vec<PresentMode>) -> Self {
        self.state.borrow_mut().modes = modes;
        self
    }

    pub fn with_queue_families(self, graphics: u32, present: u32) -> Self {
        let mut state = self.state.borrow_mut();
        state.graphics_family = graphics;
        state.present_family = present;
        drop(state);
        self
    }

    /// Number of images every created chain reports
    pub fn with_image_count(self, count: u32) -> Self {
        self.state.borrow_mut().images_per_chain = count;
        self
    }

    /// Script the next acquire responses; after the script is exhausted
    /// acquires fall back to round-robin indices
    pub fn with_acquire_script(self, script: Vec<(u32, SwapchainStatus)>) -> Self {
        self.state.borrow_mut().acquire_script = script.into();
        self
    }

    pub fn with_present_status(self, status: SwapchainStatus) -> Self {
        self.state.borrow_mut().present_status = status;
        self
    }

    /// Let `n` image-view creations succeed, then fail the next one
    pub fn fail_after_image_views(self, n: u32) -> Self {
        self.state.borrow_mut().views_until_failure = Some(n);
        self
    }

    /// Let `n` semaphore creations succeed, then fail the next one
    pub fn fail_after_semaphores(self, n: u32) -> Self {
        self.state.borrow_mut().semaphores_until_failure = Some(n);
        self
    }

    pub fn fail_fence_creations(self) -> Self {
        self.state.borrow_mut().fail_fence_creation = true;
        self
    }

    pub fn fail_acquires(self) -> Self {
        self.state.borrow_mut().fail_acquire = true;
        self
    }

    pub fn fail_submits(self) -> Self {
        self.state.borrow_mut().fail_submit = true;
        self
    }

    pub fn fail_fence_waits(self) -> Self {
        self.state.borrow_mut().fail_fence_waits = true;
        self
    }

    /// Flip fence-wait failures on or off after construction (models a
    /// device dying mid-session)
    pub fn set_fail_fence_waits(&self, fail: bool) {
        self.state.borrow_mut().fail_fence_waits = fail;
    }

    // ===== INSPECTION =====

    /// Snapshot of the ordered call log
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.borrow().calls.clone()
    }

    /// Create/destroy tallies derived from the call log
    pub fn counts(&self) -> MockCounts {
        let state = self.state.borrow();
        let mut c = MockCounts::default();
        for call in &state.calls {
            match call {
                MockCall::CreateSwapchain { .. } => c.swapchains_created += 1,
                MockCall::DestroySwapchain(_) => c.swapchains_destroyed += 1,
                MockCall::CreateImageView { .. } => c.views_created += 1,
                MockCall::DestroyImageView(_) => c.views_destroyed += 1,
                MockCall::CreateSemaphore(_) => c.semaphores_created += 1,
                MockCall::DestroySemaphore(_) => c.semaphores_destroyed += 1,
                MockCall::CreateFence { .. } => c.fences_created += 1,
                MockCall::DestroyFence(_) => c.fences_destroyed += 1,
                _ => {}
            }
        }
        c
    }

    /// Total number of live device objects (0 = no leaks)
    pub fn live_objects(&self) -> usize {
        let state = self.state.borrow();
        state.live_swapchains.len()
            + state.live_views.len()
            + state.live_semaphores.len()
            + state.live_fences.len()
    }

    /// Ids of all currently live semaphores
    pub fn live_semaphores(&self) -> HashSet<MockHandle> {
        self.state.borrow().live_semaphores.clone()
    }

    /// Position of the first call matching `pred`, if any
    pub fn position_of(&self, pred: impl Fn(&MockCall) -> bool) -> Option<usize> {
        self.state.borrow().calls.iter().position(|c| pred(c))
    }

    fn alloc(state: &mut MockState) -> MockHandle {
        let handle = state.next_handle;
        state.next_handle += 1;
        handle
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceContext for MockDevice {
    type Swapchain = MockHandle;
    type Image = MockHandle;
    type ImageView = MockHandle;
    type Semaphore = MockHandle;
    type Fence = MockHandle;
    type CommandBuffer = MockHandle;

    fn surface_capabilities(&self) -> Result<SurfaceCaps> {
        Ok(self.state.borrow().caps)
    }

    fn surface_formats(&self) -> Result<Vec<SurfaceFormat>> {
        Ok(self.state.borrow().formats.clone())
    }

    fn present_modes(&self) -> Result<Vec<PresentMode>> {
        Ok(self.state.borrow().modes.clone())
    }

    fn queue_families(&self) -> (u32, u32) {
        let state = self.state.borrow();
        (state.graphics_family, state.present_family)
    }

    fn create_swapchain(
        &self,
        config: &SwapchainConfig,
        old: Option<MockHandle>,
    ) -> Result<MockHandle> {
        let mut state = self.state.borrow_mut();
        if let Some(old) = old {
            assert!(
                state.live_swapchains.contains(&old),
                "recycling hint {} is not a live swapchain",
                old
            );
        }
        let handle = Self::alloc(&mut state);
        let image_count = state.images_per_chain;
        let mut images = Vec::with_capacity(image_count as usize);
        for _ in 0..image_count {
            images.push(Self::alloc(&mut state));
        }
        state.live_swapchains.insert(handle);
        state.chain_images.insert(handle, images);
        state.calls.push(MockCall::CreateSwapchain { handle, old, config: *config });
        Ok(handle)
    }

    fn destroy_swapchain(&self, swapchain: MockHandle) {
        let mut state = self.state.borrow_mut();
        assert!(
            state.live_swapchains.remove(&swapchain),
            "destroying unknown or already-destroyed swapchain {}",
            swapchain
        );
        state.chain_images.remove(&swapchain);
        state.calls.push(MockCall::DestroySwapchain(swapchain));
    }

    fn swapchain_images(&self, swapchain: MockHandle) -> Result<Vec<MockHandle>> {
        let state = self.state.borrow();
        Ok(state.chain_images[&swapchain].clone())
    }

    fn create_image_view(&self, image: MockHandle, _format: PixelFormat) -> Result<MockHandle> {
        let mut state = self.state.borrow_mut();
        if let Some(remaining) = state.views_until_failure {
            if remaining == 0 {
                return Err(Error::OutOfMemory);
            }
            state.views_until_failure = Some(remaining - 1);
        }
        let handle = Self::alloc(&mut state);
        state.live_views.insert(handle);
        state.calls.push(MockCall::CreateImageView { handle, image });
        Ok(handle)
    }

    fn destroy_image_view(&self, view: MockHandle) {
        let mut state = self.state.borrow_mut();
        assert!(
            state.live_views.remove(&view),
            "destroying unknown or already-destroyed image view {}",
            view
        );
        state.calls.push(MockCall::DestroyImageView(view));
    }

    fn create_semaphore(&self) -> Result<MockHandle> {
        let mut state = self.state.borrow_mut();
        if let Some(remaining) = state.semaphores_until_failure {
            if remaining == 0 {
                return Err(Error::OutOfMemory);
            }
            state.semaphores_until_failure = Some(remaining - 1);
        }
        let handle = Self::alloc(&mut state);
        state.live_semaphores.insert(handle);
        state.calls.push(MockCall::CreateSemaphore(handle));
        Ok(handle)
    }

    fn destroy_semaphore(&self, semaphore: MockHandle) {
        let mut state = self.state.borrow_mut();
        assert!(
            state.live_semaphores.remove(&semaphore),
            "destroying unknown or already-destroyed semaphore {}",
            semaphore
        );
        state.calls.push(MockCall::DestroySemaphore(semaphore));
    }

    fn create_fence(&self, signaled: bool) -> Result<MockHandle> {
        let mut state = self.state.borrow_mut();
        if state.fail_fence_creation {
            return Err(Error::OutOfMemory);
        }
        let handle = Self::alloc(&mut state);
        state.live_fences.insert(handle);
        if signaled {
            state.signaled_fences.insert(handle);
        }
        state.calls.push(MockCall::CreateFence { handle, signaled });
        Ok(handle)
    }

    fn destroy_fence(&self, fence: MockHandle) {
        let mut state = self.state.borrow_mut();
        assert!(
            state.live_fences.remove(&fence),
            "destroying unknown or already-destroyed fence {}",
            fence
        );
        state.signaled_fences.remove(&fence);
        state.calls.push(MockCall::DestroyFence(fence));
    }

    fn wait_for_fence(&self, fence: MockHandle) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(MockCall::WaitFence(fence));
        if state.fail_fence_waits {
            return Err(Error::DeviceLost);
        }
        assert!(
            state.signaled_fences.contains(&fence),
            "waiting on unsignaled fence {} would deadlock",
            fence
        );
        Ok(())
    }

    fn reset_fence(&self, fence: MockHandle) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.signaled_fences.remove(&fence);
        state.calls.push(MockCall::ResetFence(fence));
        Ok(())
    }

    fn acquire_next_image(
        &self,
        swapchain: MockHandle,
        signal: MockHandle,
    ) -> Result<(u32, SwapchainStatus)> {
        let mut state = self.state.borrow_mut();
        if state.fail_acquire {
            return Err(Error::ImageAcquireFailed);
        }
        let image_count = state.chain_images[&swapchain].len() as u32;
        let (index, status) = state.acquire_script.pop_front().unwrap_or_else(|| {
            let index = state.acquire_cursor % image_count;
            state.acquire_cursor += 1;
            (index, SwapchainStatus::Optimal)
        });
        assert!(index < image_count, "scripted acquire index out of range");
        state.calls.push(MockCall::Acquire { swapchain, signal, index });
        Ok((index, status))
    }

    fn submit_graphics(
        &self,
        commands: MockHandle,
        wait: MockHandle,
        signal: MockHandle,
        fence: MockHandle,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_submit {
            return Err(Error::DeviceLost);
        }
        assert!(
            !state.signaled_fences.contains(&fence),
            "submitting against a fence {} that was not reset",
            fence
        );
        // Work retires instantly in the mock
        state.signaled_fences.insert(fence);
        state.calls.push(MockCall::Submit { commands, wait, signal, fence });
        Ok(())
    }

    fn present(
        &self,
        swapchain: MockHandle,
        index: u32,
        wait: MockHandle,
    ) -> Result<SwapchainStatus> {
        let mut state = self.state.borrow_mut();
        state.calls.push(MockCall::Present { swapchain, index, wait });
        Ok(state.present_status)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_device_tests.rs"]
mod tests;
