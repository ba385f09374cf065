/// SwapchainResource - one generation of device objects behind a swapchain
///
/// Owns the surface, the device swapchain, the backbuffer records (image,
/// view, layout) and the acquire semaphore ring. Everything is created
/// together and released together; dropping the resource waits for the
/// device to go idle before anything is destroyed.

use std::sync::Arc;

use crate::config::SwapchainDesc;
use crate::device::{
    choose_present_mode, negotiate_surface_format, ColorSpace, Extent2D, PresentDevice,
    PresentMode, SharingMode, SurfaceFormat, SurfaceHandle, SwapchainCreateInfo, SwapchainHandle,
    WindowTarget,
};
use crate::error::{Error, Result};
use crate::swapchain::image_layout::{transition_all, Backbuffer, ImageLayout};
use crate::swapchain::semaphore::SemaphoreRing;
use crate::{presenter_debug, presenter_error};

pub struct SwapchainResource {
    device: Arc<dyn PresentDevice>,
    surface: SurfaceHandle,
    swapchain: SwapchainHandle,
    backbuffers: Vec<Backbuffer>,
    semaphores: SemaphoreRing,
    extent: Extent2D,
    surface_format: SurfaceFormat,
    present_mode: PresentMode,
    released: bool,
}

impl SwapchainResource {
    /// Create every device object for one swapchain generation
    ///
    /// The requested size is clamped into the surface's supported extent
    /// range. If any step fails, whatever was already created is released
    /// before the error is returned.
    pub fn create(
        device: &Arc<dyn PresentDevice>,
        window: &WindowTarget,
        desc: &SwapchainDesc,
    ) -> Result<Self> {
        let surface = device.create_surface(window)?;

        let mut resource = Self {
            device: Arc::clone(device),
            surface,
            swapchain: SwapchainHandle::NULL,
            backbuffers: Vec::new(),
            semaphores: SemaphoreRing::default(),
            extent: Extent2D::new(desc.width, desc.height),
            surface_format: SurfaceFormat::new(desc.format, ColorSpace::SrgbNonLinear),
            present_mode: PresentMode::Fifo,
            released: false,
        };
        resource.build(desc)?;

        presenter_debug!(
            "presenter::Swapchain",
            "Created '{}': {}x{}, {:?}, {:?}, {} images",
            desc.name,
            resource.extent.width,
            resource.extent.height,
            resource.surface_format.format,
            resource.present_mode,
            resource.backbuffers.len()
        );

        Ok(resource)
    }

    fn build(&mut self, desc: &SwapchainDesc) -> Result<()> {
        let device = Arc::clone(&self.device);

        let capabilities = device.surface_capabilities(self.surface)?;
        self.extent = Extent2D::new(desc.width, desc.height)
            .clamp(capabilities.min_image_extent, capabilities.max_image_extent);

        let formats = device.surface_formats(self.surface)?;
        self.surface_format = negotiate_surface_format(desc.format, &formats).ok_or_else(|| {
            Error::InitializationFailed("Surface reports no supported formats".to_string())
        })?;

        let present_modes = device.surface_present_modes(self.surface)?;
        self.present_mode = choose_present_mode(desc.flags, &present_modes);

        let info = SwapchainCreateInfo {
            surface: self.surface,
            min_image_count: capabilities.clamp_image_count(desc.buffer_count),
            surface_format: self.surface_format,
            extent: self.extent,
            sharing_mode: SharingMode::for_families(device.queue_family_indices()),
            present_mode: self.present_mode,
            clipped: true,
        };
        self.swapchain = device.create_swapchain(&info)?;

        self.backbuffers = device
            .swapchain_images(self.swapchain)?
            .into_iter()
            .map(Backbuffer::new)
            .collect();

        let transitions = transition_all(&mut self.backbuffers, ImageLayout::ColorAttachmentOptimal);
        device.execute_immediate(&transitions)?;

        for (i, backbuffer) in self.backbuffers.iter_mut().enumerate() {
            let name = format!("{}_image_{}", desc.name, i);
            let view = device.create_image_view(backbuffer.image(), self.surface_format.format, &name)?;
            backbuffer.set_view(view);
        }

        self.semaphores = SemaphoreRing::new(
            &device,
            desc.buffer_count,
            &format!("{}_image_acquired_semaphore", desc.name),
        )?;

        Ok(())
    }

    pub fn surface(&self) -> SurfaceHandle {
        self.surface
    }

    pub fn swapchain(&self) -> SwapchainHandle {
        self.swapchain
    }

    pub fn extent(&self) -> Extent2D {
        self.extent
    }

    pub fn surface_format(&self) -> SurfaceFormat {
        self.surface_format
    }

    pub fn present_mode(&self) -> PresentMode {
        self.present_mode
    }

    pub fn backbuffers(&self) -> &[Backbuffer] {
        &self.backbuffers
    }

    pub fn backbuffer_mut(&mut self, index: u32) -> Option<&mut Backbuffer> {
        self.backbuffers.get_mut(index as usize)
    }

    pub fn semaphores(&self) -> &SemaphoreRing {
        &self.semaphores
    }

    pub fn semaphores_mut(&mut self) -> &mut SemaphoreRing {
        &mut self.semaphores
    }

    /// Release everything once the caller has already waited for device idle
    pub fn release_after_idle(mut self) {
        self.release();
    }

    /// Semaphores, then views, then the swapchain, then the surface
    fn release(&mut self) {
        self.semaphores.clear();

        for backbuffer in &mut self.backbuffers {
            if let Some(view) = backbuffer.take_view() {
                self.device.destroy_image_view(view);
            }
        }
        self.backbuffers.clear();

        if !self.swapchain.is_null() {
            self.device.destroy_swapchain(self.swapchain);
            self.swapchain = SwapchainHandle::NULL;
        }

        if !self.surface.is_null() {
            self.device.destroy_surface(self.surface);
            self.surface = SurfaceHandle::NULL;
        }

        self.released = true;
    }
}

impl Drop for SwapchainResource {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        // Nothing may be released while queued GPU work can still reference it
        match self.device.wait_all_queues() {
            Ok(()) => self.release(),
            Err(e) => presenter_error!(
                "presenter::Swapchain",
                "Device idle wait failed, leaking swapchain resources: {}",
                e
            ),
        }
    }
}

#[cfg(test)]
#[path = "swapchain_resource_tests.rs"]
mod tests;
