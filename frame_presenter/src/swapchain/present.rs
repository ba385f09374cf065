/// Presentation
///
/// The wait set is the active acquire semaphore plus the work-submitted
/// semaphore of every pool that targets this swapchain and has pending
/// work. A successful present consumes them all and acquires the next image.

use crate::device::SemaphoreHandle;
use crate::swapchain::semaphore::{Semaphore, SemaphoreState};
use crate::swapchain::submission::SubmissionPool;
use crate::swapchain::swapchain::Swapchain;
use crate::{presenter_debug, presenter_error, presenter_trace, presenter_warn};

impl Swapchain {
    /// Queue the active backbuffer for display
    ///
    /// Invalid states (no device objects, presenting disabled) are logged and
    /// skipped. When no usable image is held, because the previous acquire
    /// failed, one is acquired first. A failed present is logged and no new
    /// image is acquired.
    pub fn present(&mut self, pools: &[&dyn SubmissionPool]) {
        if self.resource.is_none() {
            presenter_error!(
                "presenter::Swapchain",
                "Can't present '{}', it has no device objects",
                self.desc.name
            );
            return;
        }

        if !self.present_enabled {
            presenter_warn!(
                "presenter::Swapchain",
                "Presenting is disabled for '{}'",
                self.desc.name
            );
            return;
        }

        if !self.holds_acquired_image() {
            presenter_debug!(
                "presenter::Swapchain",
                "No acquired image for '{}', acquiring before present",
                self.desc.name
            );
            if let Err(e) = self.acquire_next_image() {
                presenter_error!("presenter::Swapchain", "Can't present '{}': {}", self.desc.name, e);
                return;
            }
        }

        let Some(resource) = self.resource.as_ref() else {
            return;
        };

        let (Some(slot), Some(image_index)) = (self.cursor.semaphore_index(), self.cursor.image_index()) else {
            presenter_error!(
                "presenter::Swapchain",
                "Can't present '{}', no image has been acquired",
                self.desc.name
            );
            return;
        };

        let Some(acquire) = resource.semaphores().get(slot as usize) else {
            presenter_error!("presenter::Swapchain", "No acquire semaphore in slot {}", slot);
            return;
        };

        // With a single buffer the kept image's acquire was consumed by the
        // first present, so it is presented again without one
        let mut waited: Vec<&Semaphore> = Vec::with_capacity(1 + pools.len());
        if acquire.is_signaled() {
            waited.push(acquire);
        } else if self.desc.buffer_count > 1 {
            presenter_error!(
                "presenter::Swapchain",
                "Acquire semaphore '{}' is not signaled, skipping present",
                acquire.name()
            );
            return;
        }

        waited.extend(
            pools
                .iter()
                .filter(|pool| pool.target_swapchain() == self.id)
                .map(|pool| pool.work_submitted_semaphore())
                .filter(|semaphore| semaphore.is_signaled()),
        );

        let wait: Vec<SemaphoreHandle> = waited.iter().map(|s| s.handle()).collect();
        if let Err(e) = self.device.queue_present(resource.swapchain(), image_index, &wait) {
            presenter_error!("presenter::Swapchain", "Failed to present '{}': {}", self.desc.name, e);
            return;
        }

        for semaphore in &waited {
            semaphore.set_state(SemaphoreState::Idle);
        }

        presenter_trace!(
            "presenter::Swapchain",
            "Presented image {} waiting on {} semaphores",
            image_index,
            wait.len()
        );

        if let Err(e) = self.acquire_next_image() {
            presenter_error!(
                "presenter::Swapchain",
                "Failed to acquire the next image of '{}', retrying at next present: {}",
                self.desc.name,
                e
            );
        }
    }

    /// Whether an image is held whose acquire can still be waited on
    ///
    /// A single-buffer swapchain keeps its image after the acquire semaphore
    /// was consumed.
    fn holds_acquired_image(&self) -> bool {
        match self.cursor.image_index() {
            None => false,
            Some(_) if self.desc.buffer_count == 1 => true,
            Some(_) => self.acquire_semaphore_state() == Some(SemaphoreState::Signaled),
        }
    }
}

#[cfg(test)]
#[path = "present_tests.rs"]
mod tests;
