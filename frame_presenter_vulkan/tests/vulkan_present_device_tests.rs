//! Integration tests for VulkanPresentDevice
//!
//! These tests drive real swapchains through the presentation core.
//! All tests require a GPU and a windowing system and are marked with #[ignore].
//!
//! Run with: cargo test --test vulkan_present_device_tests -- --ignored

use ash::vk;
use frame_presenter::presenter::{
    ImageLayout, PresentDevice, PresentMode, Swapchain, SwapchainDesc, ViewportId, ViewportRegistry,
    WindowTarget,
};
use frame_presenter_vulkan::{
    required_device_extensions, required_instance_extensions, VulkanDeviceDesc, VulkanPresentDevice,
};
use raw_window_handle::HasDisplayHandle;
use serial_test::serial;
use std::sync::Arc;
use winit::event_loop::EventLoop;
use winit::window::Window;

/// Instance and device owned by the test, shared with the presenter
struct GpuContext {
    instance: ash::Instance,
    device: ash::Device,
    presenter: Option<Arc<VulkanPresentDevice>>,
}

impl GpuContext {
    fn presenter(&self) -> Arc<dyn PresentDevice> {
        self.presenter.clone().unwrap()
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        // Swapchains built on the presenter must be gone by now
        drop(self.presenter.take());
        unsafe {
            self.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}

/// Helper to create a hidden test window
#[allow(deprecated)]
fn create_test_window() -> (Window, EventLoop<()>) {
    let event_loop = EventLoop::new().unwrap();
    let window_attrs = Window::default_attributes()
        .with_title("Frame Presenter Test")
        .with_inner_size(winit::dpi::LogicalSize::new(800, 600))
        .with_visible(false);
    let window = event_loop.create_window(window_attrs).unwrap();
    (window, event_loop)
}

/// Minimal Vulkan bootstrap: first GPU, one graphics queue that can present
fn create_gpu_context(window: &Window) -> GpuContext {
    unsafe {
        let entry = ash::Entry::load().unwrap();

        let app_info = vk::ApplicationInfo::default()
            .application_name(c"Frame Presenter Tests")
            .api_version(vk::API_VERSION_1_3);

        let display = window.display_handle().unwrap().as_raw();
        let extension_names = required_instance_extensions(display).unwrap();
        let instance_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_extension_names(&extension_names);
        let instance = entry.create_instance(&instance_info, None).unwrap();

        let physical_device = instance.enumerate_physical_devices().unwrap()[0];
        let graphics_family = instance
            .get_physical_device_queue_family_properties(physical_device)
            .iter()
            .position(|qf| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS))
            .unwrap() as u32;

        let priorities = [1.0];
        let queue_infos = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(graphics_family)
            .queue_priorities(&priorities)];
        let device_extensions = required_device_extensions();
        let device_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&device_extensions);
        let device = instance.create_device(physical_device, &device_info, None).unwrap();
        let queue = device.get_device_queue(graphics_family, 0);

        let presenter = VulkanPresentDevice::new(VulkanDeviceDesc {
            entry,
            instance: instance.clone(),
            physical_device,
            device: device.clone(),
            graphics_queue: queue,
            graphics_queue_family: graphics_family,
            compute_queue: queue,
            compute_queue_family: graphics_family,
            present_queue: queue,
            present_queue_family: graphics_family,
        })
        .unwrap();

        GpuContext {
            instance,
            device,
            presenter: Some(Arc::new(presenter)),
        }
    }
}

// ============================================================================
// SWAPCHAIN TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_create_swapchain() {
    let (window, _event_loop) = create_test_window();
    let gpu = create_gpu_context(&window);
    let target = WindowTarget::from_window(&window).unwrap();

    let swapchain = Swapchain::new(target, gpu.presenter(), SwapchainDesc::default().with_name("gpu")).unwrap();

    assert!(swapchain.is_valid());
    assert!(swapchain.present_enabled());
    assert!(swapchain.image_count() >= 1);
    assert_eq!(swapchain.present_mode(), Some(PresentMode::Fifo));
    assert!(swapchain.image().is_some());
    assert_eq!(swapchain.layout(), Some(ImageLayout::ColorAttachmentOptimal));
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_present_frames() {
    let (window, _event_loop) = create_test_window();
    let gpu = create_gpu_context(&window);
    let target = WindowTarget::from_window(&window).unwrap();

    let mut swapchain = Swapchain::new(target, gpu.presenter(), SwapchainDesc::default()).unwrap();
    for _ in 0..6 {
        swapchain.present(&[]);
    }

    assert!(swapchain.is_valid());
    assert!(swapchain.image_index().is_some());
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_resize_recreates_swapchain() {
    let (window, _event_loop) = create_test_window();
    let gpu = create_gpu_context(&window);
    let target = WindowTarget::from_window(&window).unwrap();

    let mut swapchain = Swapchain::new(target, gpu.presenter(), SwapchainDesc::default()).unwrap();
    let id = swapchain.id();
    swapchain.present(&[]);

    // Forced: the surface may clamp to its current size either way
    assert!(swapchain.resize(640, 480, true));

    assert_ne!(swapchain.id(), id);
    assert!(swapchain.is_valid());
    swapchain.present(&[]);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_minimize_restore() {
    let (window, _event_loop) = create_test_window();
    let gpu = create_gpu_context(&window);
    let target = WindowTarget::from_window(&window).unwrap();

    let mut swapchain = Swapchain::new(target, gpu.presenter(), SwapchainDesc::default()).unwrap();

    assert!(!swapchain.resize(0, 0, false));
    assert!(!swapchain.present_enabled());
    swapchain.present(&[]);

    assert!(swapchain.resize(800, 600, true));
    assert!(swapchain.present_enabled());
    swapchain.present(&[]);
}

// ============================================================================
// VIEWPORT TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_viewport_lifecycle() {
    let (window, _event_loop) = create_test_window();
    let gpu = create_gpu_context(&window);
    let target = WindowTarget::from_window(&window).unwrap();

    let mut registry = ViewportRegistry::new(gpu.presenter());
    registry
        .create_viewport(ViewportId(1), target, SwapchainDesc::default().with_name("viewport"))
        .unwrap();

    registry.present_viewport(ViewportId(1));
    registry.present_viewport(ViewportId(1));

    assert!(registry.destroy_viewport(ViewportId(1)));
    assert!(registry.is_empty());
}
