/// Device module - the backend-facing side of the presentation core

pub mod format;
pub mod present_device;

pub use format::*;
pub use present_device::*;

// Mock device for tests (no GPU required)
#[cfg(test)]
pub mod mock_device;
