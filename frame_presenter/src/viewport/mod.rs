/// Viewport module - one swapchain and one command pool per native window

pub mod viewport_registry;

pub use viewport_registry::{Viewport, ViewportId, ViewportRegistry};
