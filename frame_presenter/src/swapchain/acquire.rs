/// Image acquisition
///
/// Each acquire advances the semaphore slot round-robin, makes sure the
/// slot's semaphore is unsignaled, and asks the device for the next image.
/// A stale surface triggers a forced recreation and another attempt, at
/// most `ACQUIRE_RETRY_LIMIT` times.

use crate::config::{ACQUIRE_RETRY_LIMIT, ACQUIRE_TIMEOUT_NS};
use crate::error::{Error, Result};
use crate::swapchain::semaphore::SemaphoreState;
use crate::swapchain::swapchain::Swapchain;
use crate::{presenter_debug, presenter_info, presenter_trace, presenter_warn};

/// Which semaphore slot and which image the current frame uses
///
/// Both indices are unset until the first acquire of a generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCursor {
    semaphore_index: Option<u32>,
    image_index: Option<u32>,
}

impl FrameCursor {
    pub fn semaphore_index(&self) -> Option<u32> {
        self.semaphore_index
    }

    pub fn image_index(&self) -> Option<u32> {
        self.image_index
    }

    /// Move to the next semaphore slot, wrapping at `buffer_count`
    pub fn advance(&mut self, buffer_count: u32) -> u32 {
        let next = match self.semaphore_index {
            Some(index) => (index + 1) % buffer_count.max(1),
            None => 0,
        };
        self.semaphore_index = Some(next);
        next
    }

    pub fn set_image_index(&mut self, index: u32) {
        self.image_index = Some(index);
    }

    /// Undo a failed acquire: back to `previous`'s slot, holding no image
    pub fn roll_back(&mut self, previous: FrameCursor) {
        self.semaphore_index = previous.semaphore_index;
        self.image_index = None;
    }
}

impl Swapchain {
    /// Acquire the next backbuffer
    ///
    /// With a single buffer the image is acquired once per generation and
    /// then kept. Does nothing while presenting is disabled.
    ///
    /// On failure the cursor is rolled back and no image is held, so the
    /// next present acquires again. Errors are returned unlogged; callers
    /// log them with their own context.
    pub(crate) fn acquire_next_image(&mut self) -> Result<()> {
        for attempt in 0..=ACQUIRE_RETRY_LIMIT {
            if !self.present_enabled {
                presenter_debug!(
                    "presenter::Swapchain",
                    "Presenting disabled for '{}', skipping acquire",
                    self.desc.name
                );
                return Ok(());
            }

            let buffer_count = self.desc.buffer_count;
            let Some(resource) = self.resource.as_mut() else {
                return Err(Error::InvalidResource(format!(
                    "Swapchain '{}' has no device objects to acquire from",
                    self.desc.name
                )));
            };

            if buffer_count == 1 && self.cursor.image_index().is_some() {
                return Ok(());
            }

            let previous = self.cursor;
            let slot = self.cursor.advance(buffer_count);
            if let Err(e) = resource.semaphores_mut().prepare_for_reuse(slot as usize) {
                self.cursor.roll_back(previous);
                return Err(e);
            }

            let Some(semaphore) = resource.semaphores().get(slot as usize) else {
                self.cursor.roll_back(previous);
                return Err(Error::InvalidResource(format!("No acquire semaphore in slot {}", slot)));
            };

            match self
                .device
                .acquire_next_image(resource.swapchain(), ACQUIRE_TIMEOUT_NS, semaphore.handle())
            {
                Ok(index) => {
                    semaphore.set_state(SemaphoreState::Signaled);
                    self.cursor.set_image_index(index);
                    presenter_trace!(
                        "presenter::Swapchain",
                        "Acquired image {} with semaphore slot {}",
                        index,
                        slot
                    );
                    return Ok(());
                }
                Err(Error::SurfaceStale) => {
                    if attempt == ACQUIRE_RETRY_LIMIT {
                        self.cursor.roll_back(previous);
                        break;
                    }
                    presenter_info!(
                        "presenter::Swapchain",
                        "Surface of '{}' is stale, recreating (attempt {}/{})",
                        self.desc.name,
                        attempt + 1,
                        ACQUIRE_RETRY_LIMIT
                    );
                    let (width, height) = (self.width, self.height);
                    if let Err(e) = self.recreate(width, height, true) {
                        self.cursor.roll_back(previous);
                        return Err(e);
                    }
                }
                Err(e) => {
                    self.cursor.roll_back(previous);
                    return Err(e);
                }
            }
        }

        presenter_warn!(
            "presenter::Swapchain",
            "Surface of '{}' stayed stale after {} recreations, giving up",
            self.desc.name,
            ACQUIRE_RETRY_LIMIT
        );
        Err(Error::SurfaceStale)
    }
}

#[cfg(test)]
#[path = "acquire_tests.rs"]
mod tests;
