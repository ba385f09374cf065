/// VulkanPresentDevice - Vulkan implementation of the PresentDevice trait
///
/// Wraps a Vulkan instance and logical device created by the application.
/// The presenter never creates or destroys the instance or the device; it
/// only creates and destroys the surfaces, swapchains, views, semaphores and
/// the one-shot command pool it uses itself.

use ash::vk;
use ash::vk::Handle;
use frame_presenter::presenter::{
    CommandListHandle, Error, Extent2D, Format, ImageHandle, ImageViewHandle, LayoutTransition,
    PresentDevice, PresentMode, QueueFamilyIndices, ResolutionLimits, Result, SemaphoreHandle,
    SurfaceCapabilities, SurfaceFormat, SurfaceHandle, SwapchainCreateInfo, SwapchainHandle,
    WindowTarget,
};
use frame_presenter::{presenter_debug, presenter_error};
use std::sync::Mutex;

use crate::vulkan_convert::*;

/// Everything the application hands over from its own Vulkan bootstrap
///
/// The instance must have the surface extensions required by the window
/// system enabled (see `ash_window::enumerate_required_extensions`), and the
/// device must have `VK_KHR_swapchain` enabled. With the `vulkan-debug-names`
/// feature the instance also needs `VK_EXT_debug_utils`.
pub struct VulkanDeviceDesc {
    pub entry: ash::Entry,
    pub instance: ash::Instance,
    pub physical_device: vk::PhysicalDevice,
    pub device: ash::Device,
    pub graphics_queue: vk::Queue,
    pub graphics_queue_family: u32,
    pub compute_queue: vk::Queue,
    pub compute_queue_family: u32,
    pub present_queue: vk::Queue,
    pub present_queue_family: u32,
}

/// Vulkan presentation device
///
/// Queue access is serialized internally, so several swapchains driven from
/// different threads may share one `VulkanPresentDevice`.
pub struct VulkanPresentDevice {
    entry: ash::Entry,
    instance: ash::Instance,
    physical_device: vk::PhysicalDevice,
    device: ash::Device,

    graphics_queue: vk::Queue,
    graphics_queue_family: u32,
    compute_queue: vk::Queue,
    compute_queue_family: u32,
    present_queue: vk::Queue,
    present_queue_family: u32,

    surface_loader: ash::khr::surface::Instance,
    swapchain_loader: ash::khr::swapchain::Device,

    /// Transient pool for the one-shot layout transitions done at creation
    immediate_pool: Mutex<vk::CommandPool>,
    /// Held for every queue submission, present and wait
    queue_lock: Mutex<()>,

    resolution_limits: ResolutionLimits,

    #[cfg(feature = "vulkan-debug-names")]
    debug_utils: ash::ext::debug_utils::Device,
}

impl VulkanPresentDevice {
    /// Wrap an application-created Vulkan device
    ///
    /// # Errors
    ///
    /// Returns an error if the one-shot command pool can't be created.
    pub fn new(desc: VulkanDeviceDesc) -> Result<Self> {
        let surface_loader = ash::khr::surface::Instance::new(&desc.entry, &desc.instance);
        let swapchain_loader = ash::khr::swapchain::Device::new(&desc.instance, &desc.device);

        let properties = unsafe { desc.instance.get_physical_device_properties(desc.physical_device) };
        let resolution_limits = ResolutionLimits {
            min_dimension: 1,
            max_dimension: properties.limits.max_image_dimension2_d,
        };

        let pool_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(desc.graphics_queue_family)
            .flags(vk::CommandPoolCreateFlags::TRANSIENT | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
        let immediate_pool = unsafe { desc.device.create_command_pool(&pool_info, None) }.map_err(|e| {
            presenter_error!("presenter::vulkan", "Failed to create immediate command pool: {:?}", e);
            Error::InitializationFailed(format!("Failed to create command pool: {:?}", e))
        })?;

        #[cfg(feature = "vulkan-debug-names")]
        let debug_utils = ash::ext::debug_utils::Device::new(&desc.instance, &desc.device);

        presenter_debug!(
            "presenter::vulkan",
            "Present device ready (graphics family {}, compute family {}, present family {}, max extent {})",
            desc.graphics_queue_family,
            desc.compute_queue_family,
            desc.present_queue_family,
            resolution_limits.max_dimension
        );

        Ok(Self {
            entry: desc.entry,
            instance: desc.instance,
            physical_device: desc.physical_device,
            device: desc.device,
            graphics_queue: desc.graphics_queue,
            graphics_queue_family: desc.graphics_queue_family,
            compute_queue: desc.compute_queue,
            compute_queue_family: desc.compute_queue_family,
            present_queue: desc.present_queue,
            present_queue_family: desc.present_queue_family,
            surface_loader,
            swapchain_loader,
            immediate_pool: Mutex::new(immediate_pool),
            queue_lock: Mutex::new(()),
            resolution_limits,
            #[cfg(feature = "vulkan-debug-names")]
            debug_utils,
        })
    }

    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    fn lock_queues(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.queue_lock
            .lock()
            .map_err(|_| Error::BackendError("Queue lock poisoned".to_string()))
    }

    #[cfg(feature = "vulkan-debug-names")]
    fn set_object_name<T: Handle>(&self, object: T, name: &str) {
        let Ok(name) = std::ffi::CString::new(name) else {
            return;
        };
        let info = vk::DebugUtilsObjectNameInfoEXT::default()
            .object_handle(object)
            .object_name(&name);
        if let Err(e) = unsafe { self.debug_utils.set_debug_utils_object_name(&info) } {
            frame_presenter::presenter_warn!("presenter::vulkan", "Failed to name object '{}': {:?}", name.to_string_lossy(), e);
        }
    }

    #[cfg(not(feature = "vulkan-debug-names"))]
    fn set_object_name<T: Handle>(&self, _object: T, _name: &str) {}

    fn record_barrier(&self, cmd: vk::CommandBuffer, transition: &LayoutTransition) {
        let (src_access, src_stage) = layout_access_and_stage(transition.old_layout);
        let (dst_access, dst_stage) = layout_access_and_stage(transition.new_layout);

        let barrier = vk::ImageMemoryBarrier::default()
            .old_layout(image_layout_to_vk(transition.old_layout))
            .new_layout(image_layout_to_vk(transition.new_layout))
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(image_to_vk(transition.image))
            .subresource_range(color_subresource_range())
            .src_access_mask(src_access)
            .dst_access_mask(dst_access);

        unsafe {
            self.device.cmd_pipeline_barrier(
                cmd,
                src_stage,
                dst_stage,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[barrier],
            );
        }
    }
}

impl PresentDevice for VulkanPresentDevice {
    fn resolution_limits(&self) -> ResolutionLimits {
        self.resolution_limits
    }

    fn queue_family_indices(&self) -> QueueFamilyIndices {
        QueueFamilyIndices {
            graphics: self.graphics_queue_family,
            compute: self.compute_queue_family,
        }
    }

    fn create_surface(&self, window: &WindowTarget) -> Result<SurfaceHandle> {
        let surface = unsafe {
            ash_window::create_surface(&self.entry, &self.instance, window.display, window.window, None)
        }
        .map_err(|e| {
            presenter_error!("presenter::vulkan", "Failed to create surface: {:?}", e);
            Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
        })?;

        let supported = unsafe {
            self.surface_loader.get_physical_device_surface_support(
                self.physical_device,
                self.present_queue_family,
                surface,
            )
        }
        .unwrap_or(false);

        if !supported {
            unsafe { self.surface_loader.destroy_surface(surface, None) };
            presenter_error!(
                "presenter::vulkan",
                "Queue family {} can't present to this surface",
                self.present_queue_family
            );
            return Err(Error::InitializationFailed(
                "Present queue family does not support the surface".to_string(),
            ));
        }

        Ok(SurfaceHandle(surface.as_raw()))
    }

    fn destroy_surface(&self, surface: SurfaceHandle) {
        unsafe { self.surface_loader.destroy_surface(surface_to_vk(surface), None) };
    }

    fn surface_capabilities(&self, surface: SurfaceHandle) -> Result<SurfaceCapabilities> {
        let caps = unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(self.physical_device, surface_to_vk(surface))
        }
        .map_err(|e| vk_error("Failed to get surface capabilities", e))?;

        Ok(SurfaceCapabilities {
            min_image_extent: Extent2D::new(caps.min_image_extent.width, caps.min_image_extent.height),
            max_image_extent: Extent2D::new(caps.max_image_extent.width, caps.max_image_extent.height),
            min_image_count: caps.min_image_count,
            max_image_count: caps.max_image_count,
        })
    }

    fn surface_formats(&self, surface: SurfaceHandle) -> Result<Vec<SurfaceFormat>> {
        let formats = unsafe {
            self.surface_loader
                .get_physical_device_surface_formats(self.physical_device, surface_to_vk(surface))
        }
        .map_err(|e| vk_error("Failed to get surface formats", e))?;

        Ok(formats
            .iter()
            .filter_map(|f| Some(SurfaceFormat::new(format_from_vk(f.format)?, color_space_from_vk(f.color_space)?)))
            .collect())
    }

    fn surface_present_modes(&self, surface: SurfaceHandle) -> Result<Vec<PresentMode>> {
        let modes = unsafe {
            self.surface_loader
                .get_physical_device_surface_present_modes(self.physical_device, surface_to_vk(surface))
        }
        .map_err(|e| vk_error("Failed to get surface present modes", e))?;

        Ok(modes.into_iter().filter_map(present_mode_from_vk).collect())
    }

    fn create_swapchain(&self, info: &SwapchainCreateInfo) -> Result<SwapchainHandle> {
        let surface = surface_to_vk(info.surface);
        let caps = unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(self.physical_device, surface)
        }
        .map_err(|e| vk_error("Failed to get surface capabilities", e))?;

        let (sharing_mode, families) = sharing_mode_to_vk(&info.sharing_mode);
        let create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface)
            .min_image_count(info.min_image_count)
            .image_format(format_to_vk(info.surface_format.format))
            .image_color_space(color_space_to_vk(info.surface_format.color_space))
            .image_extent(vk::Extent2D {
                width: info.extent.width,
                height: info.extent.height,
            })
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(sharing_mode)
            .queue_family_indices(families)
            .pre_transform(caps.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode_to_vk(info.present_mode))
            .clipped(info.clipped);

        let swapchain = unsafe { self.swapchain_loader.create_swapchain(&create_info, None) }
            .map_err(|e| vk_error("Failed to create swapchain", e))?;

        Ok(SwapchainHandle(swapchain.as_raw()))
    }

    fn destroy_swapchain(&self, swapchain: SwapchainHandle) {
        unsafe { self.swapchain_loader.destroy_swapchain(swapchain_to_vk(swapchain), None) };
    }

    fn swapchain_images(&self, swapchain: SwapchainHandle) -> Result<Vec<ImageHandle>> {
        let images = unsafe { self.swapchain_loader.get_swapchain_images(swapchain_to_vk(swapchain)) }
            .map_err(|e| vk_error("Failed to get swapchain images", e))?;

        Ok(images.into_iter().map(|image| ImageHandle(image.as_raw())).collect())
    }

    fn create_image_view(&self, image: ImageHandle, format: Format, name: &str) -> Result<ImageViewHandle> {
        let image = image_to_vk(image);
        let create_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format_to_vk(format))
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(color_subresource_range());

        let view = unsafe { self.device.create_image_view(&create_info, None) }
            .map_err(|e| vk_error("Failed to create swapchain image view", e))?;

        self.set_object_name(image, name);
        self.set_object_name(view, name);

        Ok(ImageViewHandle(view.as_raw()))
    }

    fn destroy_image_view(&self, view: ImageViewHandle) {
        unsafe { self.device.destroy_image_view(image_view_to_vk(view), None) };
    }

    fn create_semaphore(&self, name: &str) -> Result<SemaphoreHandle> {
        let semaphore = unsafe { self.device.create_semaphore(&vk::SemaphoreCreateInfo::default(), None) }
            .map_err(|e| vk_error("Failed to create semaphore", e))?;

        self.set_object_name(semaphore, name);
        Ok(SemaphoreHandle(semaphore.as_raw()))
    }

    fn destroy_semaphore(&self, semaphore: SemaphoreHandle) {
        unsafe { self.device.destroy_semaphore(semaphore_to_vk(semaphore), None) };
    }

    fn execute_immediate(&self, transitions: &[LayoutTransition]) -> Result<()> {
        if transitions.is_empty() {
            return Ok(());
        }

        let pool = self
            .immediate_pool
            .lock()
            .map_err(|_| Error::BackendError("Immediate command pool lock poisoned".to_string()))?;

        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(*pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);

        let cmd = unsafe { self.device.allocate_command_buffers(&alloc_info) }
            .map_err(|e| vk_error("Failed to allocate immediate command buffer", e))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::BackendError("No immediate command buffer allocated".to_string()))?;

        let result = self.submit_immediate(cmd, transitions);

        unsafe { self.device.free_command_buffers(*pool, &[cmd]) };
        result
    }

    fn record_layout_transition(&self, cmd: CommandListHandle, transition: &LayoutTransition) {
        self.record_barrier(command_list_to_vk(cmd), transition);
    }

    fn acquire_next_image(&self, swapchain: SwapchainHandle, timeout_ns: u64, signal: SemaphoreHandle) -> Result<u32> {
        let result = unsafe {
            self.swapchain_loader.acquire_next_image(
                swapchain_to_vk(swapchain),
                timeout_ns,
                semaphore_to_vk(signal),
                vk::Fence::null(),
            )
        };

        match result {
            Ok((index, false)) => Ok(index),
            Ok((_, true)) => Err(Error::SurfaceStale),
            Err(e) => Err(vk_error("Failed to acquire next swapchain image", e)),
        }
    }

    fn queue_present(&self, swapchain: SwapchainHandle, image_index: u32, wait: &[SemaphoreHandle]) -> Result<()> {
        let swapchains = [swapchain_to_vk(swapchain)];
        let image_indices = [image_index];
        let wait_semaphores: Vec<vk::Semaphore> = wait.iter().copied().map(semaphore_to_vk).collect();

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let _queues = self.lock_queues()?;
        match unsafe { self.swapchain_loader.queue_present(self.present_queue, &present_info) } {
            // A suboptimal present still displayed the image
            Ok(_suboptimal) => Ok(()),
            Err(e) => Err(vk_error("Failed to present swapchain image", e)),
        }
    }

    fn wait_all_queues(&self) -> Result<()> {
        let _queues = self.lock_queues()?;

        let mut queues = vec![self.graphics_queue, self.compute_queue, self.present_queue];
        queues.sort_by_key(|q| q.as_raw());
        queues.dedup();

        for queue in queues {
            unsafe { self.device.queue_wait_idle(queue) }.map_err(|e| vk_error("Failed to wait for queue idle", e))?;
        }
        Ok(())
    }
}

impl VulkanPresentDevice {
    fn submit_immediate(&self, cmd: vk::CommandBuffer, transitions: &[LayoutTransition]) -> Result<()> {
        let begin_info = vk::CommandBufferBeginInfo::default().flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        unsafe { self.device.begin_command_buffer(cmd, &begin_info) }
            .map_err(|e| vk_error("Failed to begin immediate command buffer", e))?;

        for transition in transitions {
            self.record_barrier(cmd, transition);
        }

        unsafe { self.device.end_command_buffer(cmd) }
            .map_err(|e| vk_error("Failed to end immediate command buffer", e))?;

        let command_buffers = [cmd];
        let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);

        let _queues = self.lock_queues()?;
        unsafe {
            self.device
                .queue_submit(self.graphics_queue, &[submit_info], vk::Fence::null())
                .map_err(|e| vk_error("Failed to submit immediate commands", e))?;
            self.device
                .queue_wait_idle(self.graphics_queue)
                .map_err(|e| vk_error("Failed to wait for immediate commands", e))?;
        }
        Ok(())
    }
}

impl Drop for VulkanPresentDevice {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();

            if let Ok(pool) = self.immediate_pool.get_mut() {
                if *pool != vk::CommandPool::null() {
                    self.device.destroy_command_pool(*pool, None);
                    *pool = vk::CommandPool::null();
                }
            }
        }
    }
}
