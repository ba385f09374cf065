/// Surface formats, color spaces and present modes
///
/// Also holds the negotiation rules that turn what the caller asked for into
/// what the surface actually supports.

use bitflags::bitflags;

/// Backbuffer pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum Format {
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    B8G8R8A8_UNORM,
    B8G8R8A8_SRGB,
    A2B10G10R10_UNORM,
    R16G16B16A16_SFLOAT,
}

/// Color space the presentation engine interprets the backbuffer in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    SrgbNonLinear,
    ExtendedSrgbLinear,
    Hdr10St2084,
}

/// A (format, color space) pair reported by a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceFormat {
    pub format: Format,
    pub color_space: ColorSpace,
}

impl SurfaceFormat {
    pub const fn new(format: Format, color_space: ColorSpace) -> Self {
        Self { format, color_space }
    }
}

/// Pick the surface format to create the swapchain with
///
/// The requested format wins if the surface supports it in sRGB non-linear
/// color space. Otherwise the first sRGB non-linear entry is used, and as a
/// last resort the first entry the surface reported.
///
/// Returns `None` only when `supported` is empty.
pub fn negotiate_surface_format(
    requested: Format,
    supported: &[SurfaceFormat],
) -> Option<SurfaceFormat> {
    let preferred = SurfaceFormat::new(requested, ColorSpace::SrgbNonLinear);
    if supported.contains(&preferred) {
        return Some(preferred);
    }

    supported
        .iter()
        .find(|f| f.color_space == ColorSpace::SrgbNonLinear)
        .or_else(|| supported.first())
        .copied()
}

/// How presented images are queued for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresentMode {
    /// No vsync, tearing possible
    Immediate,
    /// Vsynced, newest image replaces the queued one
    Mailbox,
    /// Vsynced FIFO queue, always supported
    Fifo,
    /// FIFO that tears instead of waiting when a frame is late
    FifoRelaxed,
}

bitflags! {
    /// Presentation flags requested at swapchain creation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PresentFlags: u32 {
        const IMMEDIATE    = 1 << 0;
        const MAILBOX      = 1 << 1;
        const FIFO         = 1 << 2;
        const FIFO_RELAXED = 1 << 3;
    }
}

impl Default for PresentFlags {
    fn default() -> Self {
        PresentFlags::FIFO
    }
}

/// Derive the present mode from the requested flags
///
/// Requested modes are tried in the order Immediate, Mailbox, FifoRelaxed,
/// Fifo; the first one the surface supports is used. FIFO is the fallback.
pub fn choose_present_mode(flags: PresentFlags, supported: &[PresentMode]) -> PresentMode {
    const PREFERENCE: [(PresentFlags, PresentMode); 4] = [
        (PresentFlags::IMMEDIATE, PresentMode::Immediate),
        (PresentFlags::MAILBOX, PresentMode::Mailbox),
        (PresentFlags::FIFO_RELAXED, PresentMode::FifoRelaxed),
        (PresentFlags::FIFO, PresentMode::Fifo),
    ];

    PREFERENCE
        .iter()
        .find(|(flag, mode)| flags.contains(*flag) && supported.contains(mode))
        .map(|(_, mode)| *mode)
        .unwrap_or(PresentMode::Fifo)
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
