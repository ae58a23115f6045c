use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use super::{GpuInit, SurfaceErrorAction};

/// Usages the presentation blit needs from the window surface.
pub(crate) const REQUIRED_USAGES: wgpu::TextureUsages =
    wgpu::TextureUsages::RENDER_ATTACHMENT.union(wgpu::TextureUsages::COPY_DST);

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = *caps.formats.first()?;

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        if let Some(f) = preferred.into_iter().find(|f| caps.formats.contains(f)) {
            return Some(f);
        }
    }

    Some(first)
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

pub(crate) fn supports_blit(caps: &wgpu::SurfaceCapabilities) -> bool {
    caps.usages.contains(REQUIRED_USAGES)
}

/// Builds the configuration for a window surface of `size`.
///
/// Fails when the surface cannot receive the presentation copy or offers no
/// formats at all. An unsupported present mode falls back to FIFO.
pub(crate) fn configuration(
    caps: &wgpu::SurfaceCapabilities,
    size: PhysicalSize<u32>,
    init: &GpuInit,
) -> Result<wgpu::SurfaceConfiguration> {
    anyhow::ensure!(
        supports_blit(caps),
        "surface does not support {:?} usage (offers {:?})",
        REQUIRED_USAGES,
        caps.usages
    );

    let format =
        choose_surface_format(caps, init.prefer_srgb).context("no supported surface formats")?;

    let present_mode = if caps.present_modes.contains(&init.present_mode) {
        init.present_mode
    } else {
        log::warn!("{:?} not supported, presenting with Fifo", init.present_mode);
        wgpu::PresentMode::Fifo
    };

    Ok(wgpu::SurfaceConfiguration {
        usage: REQUIRED_USAGES,
        format,
        width: size.width,
        height: size.height,
        present_mode,
        alpha_mode: choose_alpha_mode(caps, init.alpha_mode),
        view_formats: vec![],
        desired_maximum_frame_latency: init.desired_maximum_frame_latency,
    })
}

/// Records the new size; the surface is only reconfigured for non-zero sizes
/// (a minimized window reports 0x0).
pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) {
    *size = new_size;
    if new_size.width == 0 || new_size.height == 0 {
        return;
    }

    config.width = new_size.width;
    config.height = new_size.height;
    surface.configure(device, config);
    log::debug!("surface reconfigured to {}x{}", new_size.width, new_size.height);
}

pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    err: wgpu::SurfaceError,
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            if size.width > 0 && size.height > 0 {
                surface.configure(device, config);
            }
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(formats: Vec<wgpu::TextureFormat>, usages: wgpu::TextureUsages) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats,
            present_modes: vec![wgpu::PresentMode::Fifo],
            alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
            usages,
        }
    }

    #[test]
    fn srgb_format_is_preferred_when_offered() {
        let c = caps(
            vec![wgpu::TextureFormat::Bgra8Unorm, wgpu::TextureFormat::Bgra8UnormSrgb],
            REQUIRED_USAGES,
        );
        assert_eq!(choose_surface_format(&c, true), Some(wgpu::TextureFormat::Bgra8UnormSrgb));
        assert_eq!(choose_surface_format(&c, false), Some(wgpu::TextureFormat::Bgra8Unorm));
        assert_eq!(choose_surface_format(&caps(vec![], REQUIRED_USAGES), true), None);
    }

    #[test]
    fn unsupported_alpha_mode_falls_back() {
        let c = caps(vec![wgpu::TextureFormat::Bgra8Unorm], REQUIRED_USAGES);
        let mode = choose_alpha_mode(&c, Some(wgpu::CompositeAlphaMode::PreMultiplied));
        assert_eq!(mode, wgpu::CompositeAlphaMode::Opaque);
    }

    // ── configuration ─────────────────────────────────────────────────────

    #[test]
    fn configuration_targets_blit_usage() {
        let c = caps(vec![wgpu::TextureFormat::Rgba8UnormSrgb], REQUIRED_USAGES);
        let config = configuration(&c, PhysicalSize::new(640, 480), &GpuInit::default()).unwrap();

        assert_eq!(config.usage, REQUIRED_USAGES);
        assert_eq!(config.format, wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.alpha_mode, wgpu::CompositeAlphaMode::Opaque);
    }

    #[test]
    fn configuration_rejects_render_only_surface() {
        let c = caps(vec![wgpu::TextureFormat::Bgra8Unorm], wgpu::TextureUsages::RENDER_ATTACHMENT);
        assert!(configuration(&c, PhysicalSize::new(8, 8), &GpuInit::default()).is_err());
    }

    #[test]
    fn unsupported_present_mode_falls_back_to_fifo() {
        let c = caps(vec![wgpu::TextureFormat::Bgra8Unorm], REQUIRED_USAGES);
        let init = GpuInit {
            present_mode: wgpu::PresentMode::Mailbox,
            ..GpuInit::default()
        };
        let config = configuration(&c, PhysicalSize::new(8, 8), &init).unwrap();
        assert_eq!(config.present_mode, wgpu::PresentMode::Fifo);
    }

    #[test]
    fn blit_needs_copy_destination() {
        let render_only = caps(vec![], wgpu::TextureUsages::RENDER_ATTACHMENT);
        assert!(!supports_blit(&render_only));
        assert!(supports_blit(&caps(vec![], REQUIRED_USAGES | wgpu::TextureUsages::COPY_SRC)));
    }
}
