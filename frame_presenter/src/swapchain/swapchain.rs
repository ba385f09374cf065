/// Swapchain - presentation controller for one window
///
/// Owns the current resource generation and the frame cursor. Acquisition,
/// presentation and resizing live in `acquire.rs`, `present.rs` and
/// `resize.rs`; this file holds construction and the accessors.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::SwapchainDesc;
use crate::device::{
    CommandListHandle, Format, ImageHandle, ImageViewHandle, PresentDevice, PresentFlags,
    PresentMode, SurfaceFormat, WindowTarget,
};
use crate::error::{Error, Result};
use crate::swapchain::acquire::FrameCursor;
use crate::swapchain::image_layout::ImageLayout;
use crate::swapchain::semaphore::SemaphoreState;
use crate::swapchain::swapchain_resource::SwapchainResource;
use crate::{presenter_error, presenter_info, presenter_warn};

static NEXT_SWAPCHAIN_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one swapchain generation
///
/// A new id is assigned whenever the device objects are recreated, so caches
/// keyed by it (descriptor sets referencing backbuffer views, pools bound to
/// the swapchain) can tell that they are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SwapchainId(u64);

impl SwapchainId {
    pub(crate) fn generate() -> Self {
        Self(NEXT_SWAPCHAIN_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

pub struct Swapchain {
    pub(crate) device: Arc<dyn PresentDevice>,
    pub(crate) window: WindowTarget,
    pub(crate) desc: SwapchainDesc,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) id: SwapchainId,
    pub(crate) resource: Option<SwapchainResource>,
    pub(crate) present_enabled: bool,
    pub(crate) cursor: FrameCursor,
}

impl Swapchain {
    /// Create a swapchain for `window` and acquire its first image
    ///
    /// An out-of-range buffer count is rejected. An out-of-range resolution
    /// is not an error: the swapchain is returned with presenting disabled
    /// and no device objects, and a later valid resize creates them.
    pub fn new(window: WindowTarget, device: Arc<dyn PresentDevice>, desc: SwapchainDesc) -> Result<Self> {
        if !desc.has_valid_buffer_count() {
            return Err(Error::InvalidResource(format!(
                "Buffer count {} is out of range for swapchain '{}'",
                desc.buffer_count, desc.name
            )));
        }

        let mut swapchain = Self {
            device,
            window,
            width: desc.width,
            height: desc.height,
            desc,
            id: SwapchainId::generate(),
            resource: None,
            present_enabled: false,
            cursor: FrameCursor::default(),
        };

        if !swapchain.device.is_valid_resolution(swapchain.width, swapchain.height) {
            presenter_warn!(
                "presenter::Swapchain",
                "{}x{} is an invalid resolution, presenting disabled for '{}'",
                swapchain.width,
                swapchain.height,
                swapchain.desc.name
            );
            return Ok(swapchain);
        }

        swapchain.create_resource()?;
        swapchain.present_enabled = true;
        if let Err(e) = swapchain.acquire_next_image() {
            presenter_error!(
                "presenter::Swapchain",
                "Failed to acquire the first image of '{}': {}",
                swapchain.desc.name,
                e
            );
            return Err(e);
        }

        presenter_info!(
            "presenter::Swapchain",
            "Swapchain '{}' ready ({}x{}, {} buffers)",
            swapchain.desc.name,
            swapchain.width,
            swapchain.height,
            swapchain.desc.buffer_count
        );

        Ok(swapchain)
    }

    /// Create a resource generation at the current size and adopt its clamped extent
    pub(crate) fn create_resource(&mut self) -> Result<()> {
        let desc = SwapchainDesc {
            width: self.width,
            height: self.height,
            ..self.desc.clone()
        };
        let resource = SwapchainResource::create(&self.device, &self.window, &desc)?;

        let extent = resource.extent();
        self.width = extent.width;
        self.height = extent.height;
        self.resource = Some(resource);
        Ok(())
    }

    // ===== identity and configuration =====

    pub fn id(&self) -> SwapchainId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Requested format; see `surface_format` for the negotiated one
    pub fn format(&self) -> Format {
        self.desc.format
    }

    pub fn buffer_count(&self) -> u32 {
        self.desc.buffer_count
    }

    pub fn flags(&self) -> PresentFlags {
        self.desc.flags
    }

    pub fn window(&self) -> WindowTarget {
        self.window
    }

    pub fn surface_format(&self) -> Option<SurfaceFormat> {
        self.resource.as_ref().map(|r| r.surface_format())
    }

    pub fn present_mode(&self) -> Option<PresentMode> {
        self.resource.as_ref().map(|r| r.present_mode())
    }

    /// Number of images the device actually created
    pub fn image_count(&self) -> u32 {
        self.resource.as_ref().map_or(0, |r| r.backbuffers().len() as u32)
    }

    // ===== frame state =====

    pub fn present_enabled(&self) -> bool {
        self.present_enabled
    }

    /// Whether device objects exist for the current generation
    pub fn is_valid(&self) -> bool {
        self.resource.is_some()
    }

    pub fn image_index(&self) -> Option<u32> {
        self.cursor.image_index()
    }

    pub fn semaphore_index(&self) -> Option<u32> {
        self.cursor.semaphore_index()
    }

    /// Backbuffer image selected by the last acquire
    pub fn image(&self) -> Option<ImageHandle> {
        let index = self.cursor.image_index()?;
        self.resource
            .as_ref()?
            .backbuffers()
            .get(index as usize)
            .map(|b| b.image())
    }

    /// View of the backbuffer selected by the last acquire
    pub fn image_view(&self) -> Option<ImageViewHandle> {
        let index = self.cursor.image_index()?;
        self.resource
            .as_ref()?
            .backbuffers()
            .get(index as usize)
            .map(|b| b.view())
    }

    /// Tracked layout of the active backbuffer
    pub fn layout(&self) -> Option<ImageLayout> {
        let index = self.cursor.image_index()?;
        self.resource
            .as_ref()?
            .backbuffers()
            .get(index as usize)
            .map(|b| b.layout())
    }

    /// Signaling state of the active acquire semaphore
    pub fn acquire_semaphore_state(&self) -> Option<SemaphoreState> {
        let slot = self.cursor.semaphore_index()?;
        self.resource
            .as_ref()?
            .semaphores()
            .get(slot as usize)
            .map(|s| s.state())
    }

    /// Record a transition of the active backbuffer into `cmd`
    ///
    /// Nothing is recorded when the image is already in `layout`, or when no
    /// image is currently acquired.
    pub fn set_layout(&mut self, layout: ImageLayout, cmd: CommandListHandle) {
        let Some(index) = self.cursor.image_index() else {
            return;
        };
        let Some(backbuffer) = self.resource.as_mut().and_then(|r| r.backbuffer_mut(index)) else {
            return;
        };

        if let Some(transition) = backbuffer.transition_to(layout) {
            self.device.record_layout_transition(cmd, &transition);
        }
    }
}

#[cfg(test)]
#[path = "swapchain_tests.rs"]
mod tests;
