/// PresentDevice trait - the device/queue abstraction the presentation core drives
///
/// A backend (Vulkan, mock, ...) implements this trait once per logical device.
/// Swapchains receive it as an explicit `Arc<dyn PresentDevice>` at construction;
/// nothing in the core reaches a device through global state.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle};

use crate::device::format::{Format, PresentMode, SurfaceFormat};
use crate::error::{Error, Result};
use crate::swapchain::image_layout::LayoutTransition;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl $name {
            pub const NULL: Self = Self(0);

            pub fn is_null(self) -> bool {
                self.0 == 0
            }
        }
    };
}

define_handle!(
    /// Platform presentation surface
    SurfaceHandle
);
define_handle!(
    /// Device-side swapchain object
    SwapchainHandle
);
define_handle!(
    /// Swapchain-owned backbuffer image
    ImageHandle
);
define_handle!(
    /// View over a backbuffer image
    ImageViewHandle
);
define_handle!(
    /// Binary GPU semaphore
    SemaphoreHandle
);
define_handle!(
    /// Command list in the recording state, owned by the render core
    CommandListHandle
);

/// Native window the surface is created for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowTarget {
    pub display: RawDisplayHandle,
    pub window: RawWindowHandle,
}

impl WindowTarget {
    pub fn new(display: RawDisplayHandle, window: RawWindowHandle) -> Self {
        Self { display, window }
    }

    /// Capture the raw handles of a windowing-toolkit window
    pub fn from_window<W: HasDisplayHandle + HasWindowHandle + ?Sized>(window: &W) -> Result<Self> {
        let display = window
            .display_handle()
            .map_err(|e| Error::InitializationFailed(format!("Failed to get display handle: {}", e)))?;
        let handle = window
            .window_handle()
            .map_err(|e| Error::InitializationFailed(format!("Failed to get window handle: {}", e)))?;

        Ok(Self::new(display.as_raw(), handle.as_raw()))
    }
}

/// Width/height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Clamp component-wise into `[min, max]`
    pub fn clamp(self, min: Extent2D, max: Extent2D) -> Extent2D {
        Extent2D {
            width: self.width.clamp(min.width, max.width.max(min.width)),
            height: self.height.clamp(min.height, max.height.max(min.height)),
        }
    }
}

/// Device-wide bounds on renderable resolutions (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionLimits {
    pub min_dimension: u32,
    pub max_dimension: u32,
}

impl ResolutionLimits {
    pub fn contains(&self, width: u32, height: u32) -> bool {
        (self.min_dimension..=self.max_dimension).contains(&width)
            && (self.min_dimension..=self.max_dimension).contains(&height)
    }
}

impl Default for ResolutionLimits {
    fn default() -> Self {
        Self {
            min_dimension: 1,
            max_dimension: 16384,
        }
    }
}

/// What a surface reports about the swapchains it accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    pub min_image_extent: Extent2D,
    pub max_image_extent: Extent2D,
    pub min_image_count: u32,
    /// 0 means no upper bound
    pub max_image_count: u32,
}

impl SurfaceCapabilities {
    /// Clamp a requested image count into the range the surface accepts
    pub fn clamp_image_count(&self, requested: u32) -> u32 {
        let count = requested.max(self.min_image_count);
        if self.max_image_count > 0 {
            count.min(self.max_image_count)
        } else {
            count
        }
    }
}

/// Queue family indices that may touch backbuffer images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics: u32,
    pub compute: u32,
}

/// Image sharing mode across queue families
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SharingMode {
    Exclusive,
    Concurrent(Vec<u32>),
}

impl SharingMode {
    /// Concurrent only if graphics and compute live in different families
    pub fn for_families(families: QueueFamilyIndices) -> Self {
        if families.graphics != families.compute {
            SharingMode::Concurrent(vec![families.compute, families.graphics])
        } else {
            SharingMode::Exclusive
        }
    }
}

/// Parameters of a device swapchain
///
/// Image usage is always color attachment. A previous swapchain is never
/// carried over: recreation always starts from a freshly created surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapchainCreateInfo {
    pub surface: SurfaceHandle,
    pub min_image_count: u32,
    pub surface_format: SurfaceFormat,
    pub extent: Extent2D,
    pub sharing_mode: SharingMode,
    pub present_mode: PresentMode,
    pub clipped: bool,
}

/// Device/queue abstraction consumed by the presentation core
///
/// All calls are made from the single thread driving a given swapchain.
/// Implementations must be shareable because several swapchains (one per
/// window) may hold the same device.
pub trait PresentDevice: Send + Sync {
    /// Device-wide resolution bounds
    fn resolution_limits(&self) -> ResolutionLimits;

    /// Check a resolution against the device bounds
    fn is_valid_resolution(&self, width: u32, height: u32) -> bool {
        self.resolution_limits().contains(width, height)
    }

    /// Graphics and compute queue family indices
    fn queue_family_indices(&self) -> QueueFamilyIndices;

    fn create_surface(&self, window: &WindowTarget) -> Result<SurfaceHandle>;
    fn destroy_surface(&self, surface: SurfaceHandle);
    fn surface_capabilities(&self, surface: SurfaceHandle) -> Result<SurfaceCapabilities>;
    fn surface_formats(&self, surface: SurfaceHandle) -> Result<Vec<SurfaceFormat>>;
    fn surface_present_modes(&self, surface: SurfaceHandle) -> Result<Vec<PresentMode>>;

    fn create_swapchain(&self, info: &SwapchainCreateInfo) -> Result<SwapchainHandle>;
    fn destroy_swapchain(&self, swapchain: SwapchainHandle);
    fn swapchain_images(&self, swapchain: SwapchainHandle) -> Result<Vec<ImageHandle>>;

    /// Create a 2D color view; `name` also labels the image for debugging
    fn create_image_view(&self, image: ImageHandle, format: Format, name: &str) -> Result<ImageViewHandle>;
    fn destroy_image_view(&self, view: ImageViewHandle);

    fn create_semaphore(&self, name: &str) -> Result<SemaphoreHandle>;
    fn destroy_semaphore(&self, semaphore: SemaphoreHandle);

    /// Record the transitions into a one-shot command buffer, submit it and
    /// block until it has executed
    fn execute_immediate(&self, transitions: &[LayoutTransition]) -> Result<()>;

    /// Record a transition into a command list the render core is recording
    fn record_layout_transition(&self, cmd: CommandListHandle, transition: &LayoutTransition);

    /// Request the next backbuffer, signaling `signal` when it is usable
    ///
    /// Out-of-date and suboptimal surfaces are reported as `Error::SurfaceStale`.
    fn acquire_next_image(
        &self,
        swapchain: SwapchainHandle,
        timeout_ns: u64,
        signal: SemaphoreHandle,
    ) -> Result<u32>;

    /// Queue `image_index` for display once every `wait` semaphore is signaled
    fn queue_present(
        &self,
        swapchain: SwapchainHandle,
        image_index: u32,
        wait: &[SemaphoreHandle],
    ) -> Result<()>;

    /// Block until every queue of the device is idle
    fn wait_all_queues(&self) -> Result<()>;
}
