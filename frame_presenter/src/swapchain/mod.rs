/// Swapchain module - acquisition, presentation and resizing for one window

pub mod acquire;
pub mod image_layout;
pub mod present;
pub mod resize;
pub mod semaphore;
pub mod submission;
#[allow(clippy::module_inception)]
pub mod swapchain;
pub mod swapchain_resource;

pub use acquire::FrameCursor;
pub use image_layout::{transition_all, Backbuffer, ImageLayout, LayoutTransition};
pub use semaphore::{Semaphore, SemaphoreRing, SemaphoreState};
pub use submission::{CommandPoolRecord, SubmissionPool};
pub use swapchain::{Swapchain, SwapchainId};
pub use swapchain_resource::SwapchainResource;
