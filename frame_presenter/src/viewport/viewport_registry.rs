/// Registry of presentation viewports
///
/// Each native window (main window or detached tool window) gets a viewport
/// holding its swapchain and the command pool that renders into it. The
/// registry owns the device handle and hands it to every swapchain it creates.

use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::config::SwapchainDesc;
use crate::device::{PresentDevice, WindowTarget};
use crate::error::Result;
use crate::swapchain::{CommandPoolRecord, SubmissionPool, Swapchain};
use crate::{presenter_bail, presenter_debug, presenter_error, presenter_warn};

/// Caller-chosen identifier of a viewport (typically the window id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewportId(pub u64);

/// A window's swapchain and its command pool
///
/// The swapchain is declared first so it is dropped first: its teardown
/// waits for the device to go idle before the pool's semaphore is released.
pub struct Viewport {
    swapchain: Swapchain,
    pool: CommandPoolRecord,
}

impl Viewport {
    pub fn swapchain(&self) -> &Swapchain {
        &self.swapchain
    }

    pub fn swapchain_mut(&mut self) -> &mut Swapchain {
        &mut self.swapchain
    }

    pub fn pool(&self) -> &CommandPoolRecord {
        &self.pool
    }

    /// Keep the pool bound to the swapchain's current generation
    fn sync_pool_target(&mut self) {
        if self.pool.target_swapchain() != self.swapchain.id() {
            self.pool.retarget(self.swapchain.id());
        }
    }
}

pub struct ViewportRegistry {
    device: Arc<dyn PresentDevice>,
    viewports: FxHashMap<ViewportId, Viewport>,
}

impl ViewportRegistry {
    pub fn new(device: Arc<dyn PresentDevice>) -> Self {
        Self {
            device,
            viewports: FxHashMap::default(),
        }
    }

    pub fn device(&self) -> &Arc<dyn PresentDevice> {
        &self.device
    }

    /// Create the swapchain and command pool of a new window
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is already registered or if the swapchain
    /// cannot be created.
    pub fn create_viewport(&mut self, id: ViewportId, window: WindowTarget, desc: SwapchainDesc) -> Result<&Viewport> {
        if self.viewports.contains_key(&id) {
            presenter_bail!("presenter::ViewportRegistry", "Viewport {:?} already exists", id);
        }

        let pool_name = format!("{}_cmd_pool", desc.name);
        let swapchain = Swapchain::new(window, Arc::clone(&self.device), desc)?;
        let pool = CommandPoolRecord::new(&self.device, pool_name, swapchain.id())?;

        presenter_debug!(
            "presenter::ViewportRegistry",
            "Created viewport {:?} ({}x{})",
            id,
            swapchain.width(),
            swapchain.height()
        );

        let viewport = self.viewports.entry(id).or_insert(Viewport { swapchain, pool });
        Ok(viewport)
    }

    /// Tear down a window's swapchain and pool
    ///
    /// Returns false if `id` is unknown.
    pub fn destroy_viewport(&mut self, id: ViewportId) -> bool {
        let Some(viewport) = self.viewports.remove(&id) else {
            presenter_warn!("presenter::ViewportRegistry", "Can't destroy unknown viewport {:?}", id);
            return false;
        };

        // A swapchain without device objects skips the idle wait on drop,
        // but the pool's submissions may still be in flight
        if !viewport.swapchain.is_valid() {
            if let Err(e) = self.device.wait_all_queues() {
                presenter_error!(
                    "presenter::ViewportRegistry",
                    "Device idle wait failed while destroying viewport {:?}: {}",
                    id,
                    e
                );
            }
        }

        drop(viewport);
        presenter_debug!("presenter::ViewportRegistry", "Destroyed viewport {:?}", id);
        true
    }

    /// Resize a window's swapchain; true if it was recreated
    pub fn set_viewport_size(&mut self, id: ViewportId, width: u32, height: u32) -> bool {
        let Some(viewport) = self.viewports.get_mut(&id) else {
            presenter_warn!("presenter::ViewportRegistry", "Can't resize unknown viewport {:?}", id);
            return false;
        };

        let resized = viewport.swapchain.resize(width, height, false);
        viewport.sync_pool_target();
        resized
    }

    /// Record that the viewport's pool submitted this frame's work
    pub fn mark_work_submitted(&mut self, id: ViewportId) -> bool {
        match self.viewports.get(&id) {
            Some(viewport) => {
                viewport.pool.mark_submitted();
                true
            }
            None => false,
        }
    }

    /// Present a window's active backbuffer, waiting on its pool's submission
    pub fn present_viewport(&mut self, id: ViewportId) {
        let Some(viewport) = self.viewports.get_mut(&id) else {
            presenter_warn!("presenter::ViewportRegistry", "Can't present unknown viewport {:?}", id);
            return;
        };

        viewport.sync_pool_target();
        let Viewport { swapchain, pool } = &mut *viewport;
        swapchain.present(&[&*pool]);
        viewport.sync_pool_target();
    }

    pub fn viewport(&self, id: ViewportId) -> Option<&Viewport> {
        self.viewports.get(&id)
    }

    pub fn viewport_mut(&mut self, id: ViewportId) -> Option<&mut Viewport> {
        self.viewports.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.viewports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewports.is_empty()
    }

    pub fn ids(&self) -> Vec<ViewportId> {
        self.viewports.keys().copied().collect()
    }
}

#[cfg(test)]
#[path = "viewport_registry_tests.rs"]
mod tests;
