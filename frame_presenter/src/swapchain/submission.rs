/// Submission pools - the render core's side of presentation
///
/// A pool records and submits the frame's commands. Each submission signals
/// the pool's "work submitted" semaphore, and a present must wait on it
/// before the image goes to the display. Pools name the swapchain they
/// render to by id.

use std::sync::Arc;

use crate::device::PresentDevice;
use crate::error::Result;
use crate::swapchain::semaphore::{Semaphore, SemaphoreState};
use crate::swapchain::swapchain::SwapchainId;

/// What the present operation needs to know about a command pool
pub trait SubmissionPool {
    /// Swapchain this pool renders into
    fn target_swapchain(&self) -> SwapchainId;

    /// Semaphore signaled by the pool's latest submission
    fn work_submitted_semaphore(&self) -> &Semaphore;
}

/// A command pool bound to a swapchain, as tracked by the presentation layer
#[derive(Debug)]
pub struct CommandPoolRecord {
    name: String,
    target: SwapchainId,
    semaphore: Semaphore,
}

impl CommandPoolRecord {
    pub fn new(device: &Arc<dyn PresentDevice>, name: impl Into<String>, target: SwapchainId) -> Result<Self> {
        let name = name.into();
        let semaphore = Semaphore::new(Arc::clone(device), format!("{}_work_submitted_semaphore", name))?;

        Ok(Self { name, target, semaphore })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Point the pool at another swapchain, e.g. after a recreation changed its id
    pub fn retarget(&mut self, target: SwapchainId) {
        self.target = target;
    }

    /// Record that the pool's work was submitted and will signal its semaphore
    pub fn mark_submitted(&self) {
        self.semaphore.set_state(SemaphoreState::Signaled);
    }

    pub fn is_pending(&self) -> bool {
        self.semaphore.is_signaled()
    }
}

impl SubmissionPool for CommandPoolRecord {
    fn target_swapchain(&self) -> SwapchainId {
        self.target
    }

    fn work_submitted_semaphore(&self) -> &Semaphore {
        &self.semaphore
    }
}
