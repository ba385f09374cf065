/// Mock PresentDevice for unit tests (no GPU required)
///
/// Hands out increasing fake handles, records every call in order and lets
/// tests script acquire/present outcomes. Ordering properties such as "the
/// idle wait precedes every destroy" are checked directly on the call log.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::device::{
    ColorSpace, CommandListHandle, Extent2D, Format, ImageHandle, ImageViewHandle, PresentDevice,
    PresentMode, QueueFamilyIndices, ResolutionLimits, SemaphoreHandle, SurfaceCapabilities,
    SurfaceFormat, SurfaceHandle, SwapchainCreateInfo, SwapchainHandle, WindowTarget,
};
use crate::error::{Error, Result};
use crate::swapchain::image_layout::LayoutTransition;

// ============================================================================
// Recorded calls
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    WaitAllQueues,
    CreateSurface(SurfaceHandle),
    DestroySurface(SurfaceHandle),
    CreateSwapchain(SwapchainHandle),
    DestroySwapchain(SwapchainHandle),
    CreateImageView(ImageViewHandle),
    DestroyImageView(ImageViewHandle),
    CreateSemaphore(SemaphoreHandle),
    DestroySemaphore(SemaphoreHandle),
    ExecuteImmediate(Vec<LayoutTransition>),
    RecordTransition(CommandListHandle, LayoutTransition),
    Acquire {
        swapchain: SwapchainHandle,
        signal: SemaphoreHandle,
        result: Result<u32>,
    },
    Present {
        swapchain: SwapchainHandle,
        image_index: u32,
        wait: Vec<SemaphoreHandle>,
        result: Result<()>,
    },
}

impl DeviceCall {
    pub fn is_destroy(&self) -> bool {
        matches!(
            self,
            DeviceCall::DestroySurface(_)
                | DeviceCall::DestroySwapchain(_)
                | DeviceCall::DestroyImageView(_)
                | DeviceCall::DestroySemaphore(_)
        )
    }

    pub fn is_create(&self) -> bool {
        matches!(
            self,
            DeviceCall::CreateSurface(_)
                | DeviceCall::CreateSwapchain(_)
                | DeviceCall::CreateImageView(_)
                | DeviceCall::CreateSemaphore(_)
        )
    }
}

// ============================================================================
// Mock device
// ============================================================================

struct MockState {
    next_handle: u64,
    calls: Vec<DeviceCall>,
    live: FxHashSet<u64>,
    names: Vec<String>,

    limits: ResolutionLimits,
    families: QueueFamilyIndices,
    capabilities: SurfaceCapabilities,
    formats: Vec<SurfaceFormat>,
    present_modes: Vec<PresentMode>,

    images: FxHashMap<SwapchainHandle, Vec<ImageHandle>>,
    next_image: FxHashMap<SwapchainHandle, u32>,
    acquire_script: VecDeque<Result<u32>>,
    present_script: VecDeque<Result<()>>,
    swapchain_failure: Option<Error>,
    wait_failure: Option<Error>,
    swapchain_infos: Vec<SwapchainCreateInfo>,
}

impl MockState {
    fn allocate(&mut self) -> u64 {
        self.next_handle += 1;
        self.live.insert(self.next_handle);
        self.next_handle
    }

    fn release(&mut self, raw: u64) {
        self.live.remove(&raw);
    }
}

pub struct MockPresentDevice {
    state: Mutex<MockState>,
}

impl MockPresentDevice {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_handle: 0,
                calls: Vec::new(),
                live: FxHashSet::default(),
                names: Vec::new(),
                limits: ResolutionLimits::default(),
                families: QueueFamilyIndices { graphics: 0, compute: 0 },
                capabilities: SurfaceCapabilities {
                    min_image_extent: Extent2D::new(1, 1),
                    max_image_extent: Extent2D::new(4096, 4096),
                    min_image_count: 1,
                    max_image_count: 8,
                },
                formats: vec![
                    SurfaceFormat::new(Format::B8G8R8A8_UNORM, ColorSpace::SrgbNonLinear),
                    SurfaceFormat::new(Format::R8G8B8A8_UNORM, ColorSpace::SrgbNonLinear),
                ],
                present_modes: vec![PresentMode::Fifo, PresentMode::Mailbox, PresentMode::Immediate],
                images: FxHashMap::default(),
                next_image: FxHashMap::default(),
                acquire_script: VecDeque::new(),
                present_script: VecDeque::new(),
                swapchain_failure: None,
                wait_failure: None,
                swapchain_infos: Vec::new(),
            }),
        }
    }

    // ===== configuration =====

    pub fn set_capabilities(&self, capabilities: SurfaceCapabilities) {
        self.state.lock().unwrap().capabilities = capabilities;
    }

    pub fn set_queue_families(&self, graphics: u32, compute: u32) {
        self.state.lock().unwrap().families = QueueFamilyIndices { graphics, compute };
    }

    pub fn set_formats(&self, formats: Vec<SurfaceFormat>) {
        self.state.lock().unwrap().formats = formats;
    }

    pub fn set_present_modes(&self, modes: Vec<PresentMode>) {
        self.state.lock().unwrap().present_modes = modes;
    }

    /// Queue the outcome of the next acquire (round-robin once exhausted)
    pub fn push_acquire_result(&self, result: Result<u32>) {
        self.state.lock().unwrap().acquire_script.push_back(result);
    }

    /// Queue the outcome of the next present (success once exhausted)
    pub fn push_present_result(&self, result: Result<()>) {
        self.state.lock().unwrap().present_script.push_back(result);
    }

    /// Make the next swapchain creation fail with `error`
    pub fn fail_next_swapchain(&self, error: Error) {
        self.state.lock().unwrap().swapchain_failure = Some(error);
    }

    /// Make the next idle wait fail with `error`
    pub fn fail_next_wait(&self, error: Error) {
        self.state.lock().unwrap().wait_failure = Some(error);
    }

    // ===== inspection =====

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn acquire_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, DeviceCall::Acquire { .. }))
            .count()
    }

    pub fn wait_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, DeviceCall::WaitAllQueues))
            .count()
    }

    /// (image index, wait set) of every present, successful or not
    pub fn presents(&self) -> Vec<(u32, Vec<SemaphoreHandle>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DeviceCall::Present { image_index, wait, .. } => Some((image_index, wait)),
                _ => None,
            })
            .collect()
    }

    /// Semaphores signaled by every acquire, in call order
    pub fn acquire_signals(&self) -> Vec<SemaphoreHandle> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DeviceCall::Acquire { signal, .. } => Some(signal),
                _ => None,
            })
            .collect()
    }

    pub fn swapchain_infos(&self) -> Vec<SwapchainCreateInfo> {
        self.state.lock().unwrap().swapchain_infos.clone()
    }

    /// Debug names passed to view and semaphore creation, in call order
    pub fn object_names(&self) -> Vec<String> {
        self.state.lock().unwrap().names.clone()
    }

    /// Number of handles created and not yet destroyed
    pub fn live_objects(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }
}

impl Default for MockPresentDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentDevice for MockPresentDevice {
    fn resolution_limits(&self) -> ResolutionLimits {
        self.state.lock().unwrap().limits
    }

    fn queue_family_indices(&self) -> QueueFamilyIndices {
        self.state.lock().unwrap().families
    }

    fn create_surface(&self, _window: &WindowTarget) -> Result<SurfaceHandle> {
        let mut state = self.state.lock().unwrap();
        let handle = SurfaceHandle(state.allocate());
        state.calls.push(DeviceCall::CreateSurface(handle));
        Ok(handle)
    }

    fn destroy_surface(&self, surface: SurfaceHandle) {
        let mut state = self.state.lock().unwrap();
        state.release(surface.0);
        state.calls.push(DeviceCall::DestroySurface(surface));
    }

    fn surface_capabilities(&self, _surface: SurfaceHandle) -> Result<SurfaceCapabilities> {
        Ok(self.state.lock().unwrap().capabilities)
    }

    fn surface_formats(&self, _surface: SurfaceHandle) -> Result<Vec<SurfaceFormat>> {
        Ok(self.state.lock().unwrap().formats.clone())
    }

    fn surface_present_modes(&self, _surface: SurfaceHandle) -> Result<Vec<PresentMode>> {
        Ok(self.state.lock().unwrap().present_modes.clone())
    }

    fn create_swapchain(&self, info: &SwapchainCreateInfo) -> Result<SwapchainHandle> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.swapchain_failure.take() {
            return Err(error);
        }

        let handle = SwapchainHandle(state.allocate());
        let images = (0..info.min_image_count)
            .map(|_| {
                state.next_handle += 1;
                ImageHandle(state.next_handle)
            })
            .collect();
        state.images.insert(handle, images);
        state.swapchain_infos.push(info.clone());
        state.calls.push(DeviceCall::CreateSwapchain(handle));
        Ok(handle)
    }

    fn destroy_swapchain(&self, swapchain: SwapchainHandle) {
        let mut state = self.state.lock().unwrap();
        state.release(swapchain.0);
        state.images.remove(&swapchain);
        state.calls.push(DeviceCall::DestroySwapchain(swapchain));
    }

    fn swapchain_images(&self, swapchain: SwapchainHandle) -> Result<Vec<ImageHandle>> {
        self.state
            .lock()
            .unwrap()
            .images
            .get(&swapchain)
            .cloned()
            .ok_or_else(|| Error::InvalidResource(format!("Unknown swapchain {:?}", swapchain)))
    }

    fn create_image_view(&self, _image: ImageHandle, _format: Format, name: &str) -> Result<ImageViewHandle> {
        let mut state = self.state.lock().unwrap();
        state.names.push(name.to_string());
        let handle = ImageViewHandle(state.allocate());
        state.calls.push(DeviceCall::CreateImageView(handle));
        Ok(handle)
    }

    fn destroy_image_view(&self, view: ImageViewHandle) {
        let mut state = self.state.lock().unwrap();
        state.release(view.0);
        state.calls.push(DeviceCall::DestroyImageView(view));
    }

    fn create_semaphore(&self, name: &str) -> Result<SemaphoreHandle> {
        let mut state = self.state.lock().unwrap();
        state.names.push(name.to_string());
        let handle = SemaphoreHandle(state.allocate());
        state.calls.push(DeviceCall::CreateSemaphore(handle));
        Ok(handle)
    }

    fn destroy_semaphore(&self, semaphore: SemaphoreHandle) {
        let mut state = self.state.lock().unwrap();
        state.release(semaphore.0);
        state.calls.push(DeviceCall::DestroySemaphore(semaphore));
    }

    fn execute_immediate(&self, transitions: &[LayoutTransition]) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(DeviceCall::ExecuteImmediate(transitions.to_vec()));
        Ok(())
    }

    fn record_layout_transition(&self, cmd: CommandListHandle, transition: &LayoutTransition) {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(DeviceCall::RecordTransition(cmd, *transition));
    }

    fn acquire_next_image(
        &self,
        swapchain: SwapchainHandle,
        _timeout_ns: u64,
        signal: SemaphoreHandle,
    ) -> Result<u32> {
        let mut state = self.state.lock().unwrap();
        let result = match state.acquire_script.pop_front() {
            Some(result) => result,
            None => {
                let count = state.images.get(&swapchain).map_or(0, |i| i.len() as u32);
                if count == 0 {
                    Err(Error::BackendError("Acquire on unknown swapchain".to_string()))
                } else {
                    let next = state.next_image.entry(swapchain).or_insert(0);
                    let index = *next % count;
                    *next = index + 1;
                    Ok(index)
                }
            }
        };

        state.calls.push(DeviceCall::Acquire {
            swapchain,
            signal,
            result: result.clone(),
        });
        result
    }

    fn queue_present(
        &self,
        swapchain: SwapchainHandle,
        image_index: u32,
        wait: &[SemaphoreHandle],
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let result = state.present_script.pop_front().unwrap_or(Ok(()));
        state.calls.push(DeviceCall::Present {
            swapchain,
            image_index,
            wait: wait.to_vec(),
            result: result.clone(),
        });
        result
    }

    fn wait_all_queues(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(DeviceCall::WaitAllQueues);
        match state.wait_failure.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
