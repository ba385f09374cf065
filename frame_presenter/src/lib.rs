/*!
# Frame Presenter

Swapchain and presentation synchronization for a GPU renderer.

This crate owns the per-window chain of backbuffers: it acquires the image
to render into, decides which semaphores a present must wait on, tracks
image layouts, and recreates everything when the window is resized or the
surface goes stale. It never touches a GPU API directly: every device call
goes through the [`presenter::PresentDevice`] trait, implemented by a
backend crate (see `frame_presenter_vulkan`).

## Architecture

- **PresentDevice**: device/queue abstraction injected into every swapchain
- **Swapchain**: acquire / present / resize controller for one window
- **SwapchainResource**: one generation of device objects (surface, images, views, semaphores)
- **SemaphoreRing**: acquire semaphores with explicit signaling state
- **ViewportRegistry**: one swapchain and one command pool per native window
*/

// Internal modules
mod config;
mod error;
pub mod device;
pub mod log;
pub mod swapchain;
pub mod viewport;

#[cfg(test)]
mod test_utils;

// Main presenter namespace module
pub mod presenter {
    // Error types
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::{SwapchainDesc, ACQUIRE_RETRY_LIMIT, ACQUIRE_TIMEOUT_NS, MAX_BUFFER_COUNT};

    // Device abstraction
    pub use crate::device::*;

    // Swapchain controller and its parts
    pub use crate::swapchain::*;

    // Multi-window composition
    pub use crate::viewport::*;

    // Global log sink
    pub use crate::log::Logging;

    // Logging sub-module (types only, macros are exported at the crate root)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger, Logging};
    }
}
