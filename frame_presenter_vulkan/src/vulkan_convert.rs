/// Conversions between presenter types and Vulkan types
///
/// Pure functions, no device access. Handles travel through the core as raw
/// `u64` values and are turned back into Vulkan handles here.

use ash::vk;
use ash::vk::Handle;
use frame_presenter::presenter::{
    ColorSpace, CommandListHandle, Error, Format, ImageHandle, ImageLayout, ImageViewHandle,
    PresentMode, SemaphoreHandle, SharingMode, SurfaceHandle, SwapchainHandle,
};
use frame_presenter::{presenter_err, presenter_error};

// ===== FORMATS =====

pub(crate) fn format_to_vk(format: Format) -> vk::Format {
    match format {
        Format::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        Format::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        Format::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        Format::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
        Format::A2B10G10R10_UNORM => vk::Format::A2B10G10R10_UNORM_PACK32,
        Format::R16G16B16A16_SFLOAT => vk::Format::R16G16B16A16_SFLOAT,
    }
}

/// `None` for formats the presenter has no name for
pub(crate) fn format_from_vk(format: vk::Format) -> Option<Format> {
    match format {
        vk::Format::R8G8B8A8_UNORM => Some(Format::R8G8B8A8_UNORM),
        vk::Format::R8G8B8A8_SRGB => Some(Format::R8G8B8A8_SRGB),
        vk::Format::B8G8R8A8_UNORM => Some(Format::B8G8R8A8_UNORM),
        vk::Format::B8G8R8A8_SRGB => Some(Format::B8G8R8A8_SRGB),
        vk::Format::A2B10G10R10_UNORM_PACK32 => Some(Format::A2B10G10R10_UNORM),
        vk::Format::R16G16B16A16_SFLOAT => Some(Format::R16G16B16A16_SFLOAT),
        _ => None,
    }
}

pub(crate) fn color_space_to_vk(color_space: ColorSpace) -> vk::ColorSpaceKHR {
    match color_space {
        ColorSpace::SrgbNonLinear => vk::ColorSpaceKHR::SRGB_NONLINEAR,
        ColorSpace::ExtendedSrgbLinear => vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT,
        ColorSpace::Hdr10St2084 => vk::ColorSpaceKHR::HDR10_ST2084_EXT,
    }
}

pub(crate) fn color_space_from_vk(color_space: vk::ColorSpaceKHR) -> Option<ColorSpace> {
    match color_space {
        vk::ColorSpaceKHR::SRGB_NONLINEAR => Some(ColorSpace::SrgbNonLinear),
        vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT => Some(ColorSpace::ExtendedSrgbLinear),
        vk::ColorSpaceKHR::HDR10_ST2084_EXT => Some(ColorSpace::Hdr10St2084),
        _ => None,
    }
}

// ===== PRESENT MODES =====

pub(crate) fn present_mode_to_vk(mode: PresentMode) -> vk::PresentModeKHR {
    match mode {
        PresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
        PresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
        PresentMode::Fifo => vk::PresentModeKHR::FIFO,
        PresentMode::FifoRelaxed => vk::PresentModeKHR::FIFO_RELAXED,
    }
}

pub(crate) fn present_mode_from_vk(mode: vk::PresentModeKHR) -> Option<PresentMode> {
    match mode {
        vk::PresentModeKHR::IMMEDIATE => Some(PresentMode::Immediate),
        vk::PresentModeKHR::MAILBOX => Some(PresentMode::Mailbox),
        vk::PresentModeKHR::FIFO => Some(PresentMode::Fifo),
        vk::PresentModeKHR::FIFO_RELAXED => Some(PresentMode::FifoRelaxed),
        _ => None,
    }
}

/// Vulkan sharing mode and the queue family list it needs
pub(crate) fn sharing_mode_to_vk(mode: &SharingMode) -> (vk::SharingMode, &[u32]) {
    match mode {
        SharingMode::Exclusive => (vk::SharingMode::EXCLUSIVE, &[]),
        SharingMode::Concurrent(families) => (vk::SharingMode::CONCURRENT, families.as_slice()),
    }
}

// ===== LAYOUTS =====

pub(crate) fn image_layout_to_vk(layout: ImageLayout) -> vk::ImageLayout {
    match layout {
        ImageLayout::Undefined => vk::ImageLayout::UNDEFINED,
        ImageLayout::ColorAttachmentOptimal => vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        ImageLayout::TransferDstOptimal => vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        ImageLayout::ShaderReadOnlyOptimal => vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        ImageLayout::PresentSrc => vk::ImageLayout::PRESENT_SRC_KHR,
    }
}

/// Access mask and pipeline stage on either side of a barrier touching `layout`
pub(crate) fn layout_access_and_stage(layout: ImageLayout) -> (vk::AccessFlags, vk::PipelineStageFlags) {
    match layout {
        ImageLayout::Undefined => (vk::AccessFlags::empty(), vk::PipelineStageFlags::TOP_OF_PIPE),
        ImageLayout::ColorAttachmentOptimal => (
            vk::AccessFlags::COLOR_ATTACHMENT_READ | vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
        ),
        ImageLayout::TransferDstOptimal => (vk::AccessFlags::TRANSFER_WRITE, vk::PipelineStageFlags::TRANSFER),
        ImageLayout::ShaderReadOnlyOptimal => (vk::AccessFlags::SHADER_READ, vk::PipelineStageFlags::FRAGMENT_SHADER),
        ImageLayout::PresentSrc => (vk::AccessFlags::empty(), vk::PipelineStageFlags::BOTTOM_OF_PIPE),
    }
}

pub(crate) fn color_subresource_range() -> vk::ImageSubresourceRange {
    vk::ImageSubresourceRange {
        aspect_mask: vk::ImageAspectFlags::COLOR,
        base_mip_level: 0,
        level_count: 1,
        base_array_layer: 0,
        layer_count: 1,
    }
}

// ===== HANDLES =====

pub(crate) fn surface_to_vk(handle: SurfaceHandle) -> vk::SurfaceKHR {
    vk::SurfaceKHR::from_raw(handle.0)
}

pub(crate) fn swapchain_to_vk(handle: SwapchainHandle) -> vk::SwapchainKHR {
    vk::SwapchainKHR::from_raw(handle.0)
}

pub(crate) fn image_to_vk(handle: ImageHandle) -> vk::Image {
    vk::Image::from_raw(handle.0)
}

pub(crate) fn image_view_to_vk(handle: ImageViewHandle) -> vk::ImageView {
    vk::ImageView::from_raw(handle.0)
}

pub(crate) fn semaphore_to_vk(handle: SemaphoreHandle) -> vk::Semaphore {
    vk::Semaphore::from_raw(handle.0)
}

pub(crate) fn command_list_to_vk(handle: CommandListHandle) -> vk::CommandBuffer {
    vk::CommandBuffer::from_raw(handle.0)
}

// ===== ERRORS =====

/// Map a failed Vulkan call to a presenter error, logging it
pub(crate) fn vk_error(operation: &str, result: vk::Result) -> Error {
    match result {
        vk::Result::ERROR_OUT_OF_DATE_KHR | vk::Result::SUBOPTIMAL_KHR => Error::SurfaceStale,
        vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
            presenter_error!("presenter::vulkan", "{}: {:?}", operation, result);
            Error::OutOfMemory
        }
        _ => presenter_err!("presenter::vulkan", "{}: {:?}", operation, result),
    }
}

#[cfg(test)]
#[path = "vulkan_convert_tests.rs"]
mod tests;
