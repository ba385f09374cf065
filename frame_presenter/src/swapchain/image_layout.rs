/// Backbuffer records and per-image layout tracking
///
/// Each ring slot keeps its image handle, view handle and current layout in a
/// single `Backbuffer` record, created and destroyed together with the
/// swapchain generation. Transitions are only emitted when the requested
/// layout differs from the tracked one.

use crate::device::{ImageHandle, ImageViewHandle};

/// GPU memory arrangement of a backbuffer image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageLayout {
    #[default]
    Undefined,
    ColorAttachmentOptimal,
    TransferDstOptimal,
    ShaderReadOnlyOptimal,
    PresentSrc,
}

/// A single image layout barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutTransition {
    pub image: ImageHandle,
    pub old_layout: ImageLayout,
    pub new_layout: ImageLayout,
}

/// One backbuffer of the ring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backbuffer {
    image: ImageHandle,
    view: ImageViewHandle,
    layout: ImageLayout,
}

impl Backbuffer {
    /// A freshly retrieved swapchain image: no view yet, layout Undefined
    pub fn new(image: ImageHandle) -> Self {
        Self {
            image,
            view: ImageViewHandle::NULL,
            layout: ImageLayout::Undefined,
        }
    }

    pub fn image(&self) -> ImageHandle {
        self.image
    }

    pub fn view(&self) -> ImageViewHandle {
        self.view
    }

    pub fn layout(&self) -> ImageLayout {
        self.layout
    }

    pub(crate) fn set_view(&mut self, view: ImageViewHandle) {
        self.view = view;
    }

    pub(crate) fn take_view(&mut self) -> Option<ImageViewHandle> {
        let view = std::mem::replace(&mut self.view, ImageViewHandle::NULL);
        (!view.is_null()).then_some(view)
    }

    /// Move the tracked layout to `layout`
    ///
    /// Returns the barrier to record, or `None` when the image is already in
    /// that layout.
    pub fn transition_to(&mut self, layout: ImageLayout) -> Option<LayoutTransition> {
        if self.layout == layout {
            return None;
        }

        let transition = LayoutTransition {
            image: self.image,
            old_layout: self.layout,
            new_layout: layout,
        };
        self.layout = layout;
        Some(transition)
    }
}

/// Transitions moving every backbuffer to `layout`, updating the records
pub fn transition_all(backbuffers: &mut [Backbuffer], layout: ImageLayout) -> Vec<LayoutTransition> {
    backbuffers
        .iter_mut()
        .filter_map(|b| b.transition_to(layout))
        .collect()
}

#[cfg(test)]
#[path = "image_layout_tests.rs"]
mod tests;
