/// Acquire semaphores and their explicit signaling state
///
/// The device cannot be asked whether a binary semaphore is signaled, so the
/// state is tracked on the CPU side: Idle -> Signaled when an acquire or a
/// submission signals it, Signaled -> Idle when a present consumes it.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::device::{PresentDevice, SemaphoreHandle};
use crate::error::Result;
use crate::presenter_warn;

/// CPU-side view of a binary semaphore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemaphoreState {
    Idle,
    Signaled,
}

impl SemaphoreState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SemaphoreState::Signaled,
            _ => SemaphoreState::Idle,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            SemaphoreState::Idle => 0,
            SemaphoreState::Signaled => 1,
        }
    }
}

/// Binary semaphore owning its device handle
///
/// The handle is released when the semaphore is dropped. The state is atomic
/// so that a submission layer holding a shared reference can mark it
/// Signaled.
pub struct Semaphore {
    device: Arc<dyn PresentDevice>,
    handle: SemaphoreHandle,
    state: AtomicU8,
    name: String,
}

impl Semaphore {
    pub fn new(device: Arc<dyn PresentDevice>, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let handle = device.create_semaphore(&name)?;

        Ok(Self {
            device,
            handle,
            state: AtomicU8::new(SemaphoreState::Idle.as_u8()),
            name,
        })
    }

    pub fn handle(&self) -> SemaphoreHandle {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SemaphoreState {
        SemaphoreState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set_state(&self, state: SemaphoreState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    pub fn is_signaled(&self) -> bool {
        self.state() == SemaphoreState::Signaled
    }

    /// Replace the device semaphore with a fresh unsignaled one
    ///
    /// A binary semaphore that was signaled but never waited on cannot be
    /// unsignaled in place, so it is destroyed and created again.
    pub fn recreate(&mut self) -> Result<()> {
        let handle = self.device.create_semaphore(&self.name)?;
        let old = std::mem::replace(&mut self.handle, handle);
        self.device.destroy_semaphore(old);
        self.set_state(SemaphoreState::Idle);
        Ok(())
    }
}

impl fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Semaphore")
            .field("handle", &self.handle)
            .field("state", &self.state())
            .field("name", &self.name)
            .finish()
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        self.device.destroy_semaphore(self.handle);
    }
}

/// One acquire semaphore per ring slot
#[derive(Debug, Default)]
pub struct SemaphoreRing {
    slots: Vec<Semaphore>,
}

impl SemaphoreRing {
    /// Create `count` semaphores named `{prefix}_{i}`
    pub fn new(device: &Arc<dyn PresentDevice>, count: u32, prefix: &str) -> Result<Self> {
        let slots = (0..count)
            .map(|i| Semaphore::new(Arc::clone(device), format!("{}_{}", prefix, i)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { slots })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&Semaphore> {
        self.slots.get(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Semaphore> {
        self.slots.iter()
    }

    /// Make `slot` ready to be signaled again
    ///
    /// A slot still Signaled here was never consumed by a present: its frame
    /// was dropped. It is force-reset and a diagnostic is emitted. Returns
    /// whether a reset happened.
    pub fn prepare_for_reuse(&mut self, slot: usize) -> Result<bool> {
        let Some(semaphore) = self.slots.get_mut(slot) else {
            return Ok(false);
        };

        if semaphore.state() == SemaphoreState::Idle {
            return Ok(false);
        }

        presenter_warn!(
            "presenter::Swapchain",
            "Semaphore '{}' was never waited on (dropped frame), resetting it",
            semaphore.name()
        );
        semaphore.recreate()?;
        Ok(true)
    }

    /// Release every semaphore, in slot order
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
#[path = "semaphore_tests.rs"]
mod tests;
