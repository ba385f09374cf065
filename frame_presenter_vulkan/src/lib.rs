/*!
# Frame Presenter - Vulkan Backend

Vulkan implementation of the `frame_presenter` device abstraction, built on
the Ash bindings and `ash-window` for surface creation.

The application keeps ownership of its instance and logical device; this
crate only borrows them to create and destroy presentation objects.
*/

mod vulkan_convert;
mod vulkan_present_device;

pub use vulkan_present_device::{VulkanDeviceDesc, VulkanPresentDevice};

/// Instance extensions the presenter needs on top of the window system ones
///
/// # Example
///
/// ```no_run
/// use frame_presenter_vulkan::required_instance_extensions;
/// # fn run(display: raw_window_handle::RawDisplayHandle) -> Result<(), ash::vk::Result> {
/// let extensions = required_instance_extensions(display)?;
/// // pass `extensions` to vk::InstanceCreateInfo::enabled_extension_names
/// # Ok(())
/// # }
/// ```
pub fn required_instance_extensions(
    display: raw_window_handle::RawDisplayHandle,
) -> Result<Vec<*const std::ffi::c_char>, ash::vk::Result> {
    #[allow(unused_mut)]
    let mut extensions = ash_window::enumerate_required_extensions(display)?.to_vec();

    #[cfg(feature = "vulkan-debug-names")]
    extensions.push(ash::ext::debug_utils::NAME.as_ptr());

    Ok(extensions)
}

/// Device extensions the presenter needs
pub fn required_device_extensions() -> Vec<*const std::ffi::c_char> {
    vec![ash::khr::swapchain::NAME.as_ptr()]
}
