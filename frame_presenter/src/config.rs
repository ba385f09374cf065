/// Swapchain configuration

use crate::device::{Format, PresentFlags};

/// Upper bound on backbuffers per swapchain
pub const MAX_BUFFER_COUNT: u32 = 4;

/// How many times acquisition retries after recreating a stale surface
pub const ACQUIRE_RETRY_LIMIT: u32 = 3;

/// Acquire timeout, effectively unbounded
pub const ACQUIRE_TIMEOUT_NS: u64 = u64::MAX;

/// Creation parameters of a swapchain
///
/// # Example
///
/// ```
/// use frame_presenter::presenter::{SwapchainDesc, Format, PresentFlags};
///
/// let desc = SwapchainDesc::default()
///     .with_name("main_window")
///     .with_size(1280, 720)
///     .with_format(Format::R8G8B8A8_UNORM)
///     .with_buffer_count(3)
///     .with_flags(PresentFlags::MAILBOX | PresentFlags::FIFO);
/// assert_eq!(desc.buffer_count, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapchainDesc {
    /// Debug name, prefixes the names of owned images and semaphores
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: Format,
    /// Number of backbuffers, `1..=MAX_BUFFER_COUNT`
    pub buffer_count: u32,
    pub flags: PresentFlags,
}

impl Default for SwapchainDesc {
    fn default() -> Self {
        Self {
            name: "swapchain".to_string(),
            width: 800,
            height: 600,
            format: Format::B8G8R8A8_UNORM,
            buffer_count: 2,
            flags: PresentFlags::FIFO,
        }
    }
}

impl SwapchainDesc {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_buffer_count(mut self, buffer_count: u32) -> Self {
        self.buffer_count = buffer_count;
        self
    }

    pub fn with_flags(mut self, flags: PresentFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Whether `buffer_count` is within `1..=MAX_BUFFER_COUNT`
    pub fn has_valid_buffer_count(&self) -> bool {
        (1..=MAX_BUFFER_COUNT).contains(&self.buffer_count)
    }
}
