/// Resizing and recreation
///
/// The resolution is validated first: an invalid one (a minimized window
/// reports 0x0) only disables presenting, and a later valid one enables it
/// again. A recreation waits for every queue to go idle, releases the old
/// generation, builds a new one and assigns a new swapchain id.

use crate::error::Result;
use crate::swapchain::acquire::FrameCursor;
use crate::swapchain::swapchain::{Swapchain, SwapchainId};
use crate::{presenter_debug, presenter_error, presenter_info, presenter_warn};

impl Swapchain {
    /// Resize to `width` x `height`
    ///
    /// Returns true only when the device objects were recreated. Without
    /// `force`, a resize to the current size is a no-op. After a recreation
    /// the first image of the new generation is acquired.
    pub fn resize(&mut self, width: u32, height: u32, force: bool) -> bool {
        match self.recreate(width, height, force) {
            Ok(true) => {
                if let Err(e) = self.acquire_next_image() {
                    presenter_error!(
                        "presenter::Swapchain",
                        "Resized '{}' but failed to acquire its first image: {}",
                        self.desc.name,
                        e
                    );
                }
                true
            }
            Ok(false) => false,
            Err(e) => {
                presenter_error!(
                    "presenter::Swapchain",
                    "Failed to resize '{}' to {}x{}: {}",
                    self.desc.name,
                    width,
                    height,
                    e
                );
                false
            }
        }
    }

    /// Rebuild the device objects at `width` x `height`
    ///
    /// Returns Ok(false) when nothing was recreated. An error leaves the
    /// swapchain without device objects until the next successful resize.
    pub(crate) fn recreate(&mut self, width: u32, height: u32, force: bool) -> Result<bool> {
        self.present_enabled = self.device.is_valid_resolution(width, height);
        if !self.present_enabled {
            presenter_warn!(
                "presenter::Swapchain",
                "{}x{} is an invalid resolution, presenting disabled for '{}'",
                width,
                height,
                self.desc.name
            );
            return Ok(false);
        }

        if !force && self.resource.is_some() && self.width == width && self.height == height {
            presenter_debug!("presenter::Swapchain", "'{}' already {}x{}, resize skipped", self.desc.name, width, height);
            return Ok(false);
        }

        self.device.wait_all_queues()?;

        if let Some(old) = self.resource.take() {
            old.release_after_idle();
        }
        self.cursor = FrameCursor::default();
        self.id = SwapchainId::generate();

        self.width = width;
        self.height = height;
        self.create_resource()?;

        presenter_info!(
            "presenter::Swapchain",
            "Resized '{}' to {}x{}",
            self.desc.name,
            self.width,
            self.height
        );

        Ok(true)
    }
}

#[cfg(test)]
#[path = "resize_tests.rs"]
mod tests;
