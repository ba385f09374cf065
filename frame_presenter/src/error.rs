//! Error types for the frame presenter
//!
//! Every failure the presentation core can observe maps onto one of these
//! variants. Recoverable conditions (stale surface, unsupported resolution)
//! are resolved inside the core; the rest are reported to the caller after
//! being logged.

use std::fmt;

/// Result type for frame presenter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Frame presenter errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Backend-specific failure (Vulkan, mock device, ...)
    ///
    /// Fatal to the current call, never to the process.
    BackendError(String),

    /// Device memory exhausted while creating presentation resources
    OutOfMemory,

    /// Unsupported resolution, buffer count or handle
    ///
    /// Non-fatal: presenting is disabled and owned resources are left untouched.
    InvalidResource(String),

    /// The surface is out of date or suboptimal and must be recreated
    ///
    /// Reported by the device during acquisition and recovered internally
    /// with a forced resize followed by a bounded retry.
    SurfaceStale,

    /// Creation of the presentation resources failed
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of device memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::SurfaceStale => write!(f, "Surface is out of date or suboptimal"),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Whether the error can be recovered by recreating the swapchain
    pub fn is_surface_stale(&self) -> bool {
        matches!(self, Error::SurfaceStale)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
