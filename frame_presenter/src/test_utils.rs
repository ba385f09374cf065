//! Shared helpers for unit tests (no GPU required)

use crate::device::mock_device::MockPresentDevice;
use crate::device::{PresentDevice, WindowTarget};
use crate::log::{LogEntry, LogSeverity, Logger, Logging};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle, WebDisplayHandle, WebWindowHandle};
use std::sync::{Arc, Mutex};

/// Mock device plus the same device as the trait object swapchains take
pub fn mock_device() -> (Arc<MockPresentDevice>, Arc<dyn PresentDevice>) {
    let mock = Arc::new(MockPresentDevice::new());
    let device: Arc<dyn PresentDevice> = mock.clone();
    (mock, device)
}

/// Window handles that only identify a window; the mock device never dereferences them
pub fn test_window() -> WindowTarget {
    WindowTarget::new(
        RawDisplayHandle::Web(WebDisplayHandle::new()),
        RawWindowHandle::Web(WebWindowHandle::new(1)),
    )
}

/// Logger that captures entries so tests can assert on diagnostics
///
/// Cloning shares the captured entries, so one clone can be installed as the
/// global sink while the test keeps the other.
#[derive(Clone, Default)]
pub struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogger {
    /// Install a fresh capture logger as the global sink and return a handle to it
    pub fn install() -> Self {
        let logger = Self::default();
        Logging::set_logger(logger.clone());
        logger
    }

    /// Entries logged under `source` only (other tests may log concurrently)
    pub fn entries_from(&self, source: &str) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.source == source)
            .cloned()
            .collect()
    }

    pub fn count(&self, severity: LogSeverity) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.severity == severity)
            .count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.message.contains(needle))
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}
