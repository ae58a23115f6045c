use crate::device::{Gpu, GpuFrame};
use crate::scene::GpuScene;

use super::plan::{PassRecipe, TargetSize};

/// Format of the offscreen depth buffer.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

struct Offscreen {
    size: TargetSize,
    format: wgpu::TextureFormat,
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth: Option<wgpu::TextureView>,
}

impl Offscreen {
    fn new(device: &wgpu::Device, size: TargetSize, format: wgpu::TextureFormat) -> Self {
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("trigon offscreen color"),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        log::debug!("offscreen target allocated at {}x{}", size.width, size.height);

        Self {
            size,
            format,
            color,
            color_view,
            depth: None,
        }
    }

    fn depth_view(&mut self, device: &wgpu::Device) -> &wgpu::TextureView {
        let size = self.size;
        self.depth.get_or_insert_with(|| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("trigon offscreen depth"),
                    size: extent(size),
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: DEPTH_FORMAT,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        })
    }
}

fn extent(size: TargetSize) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width,
        height: size.height,
        depth_or_array_layers: 1,
    }
}

/// Offscreen render target presented by copying onto the window surface.
///
/// The color and depth textures persist across frames and are only
/// reallocated when the requested size or format changes.
#[derive(Default)]
pub struct RenderSurface {
    offscreen: Option<Offscreen>,
}

impl RenderSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a validated frame and presents it.
    pub fn present(
        &mut self,
        gpu: &Gpu<'_>,
        scene: &GpuScene,
        recipe: &PassRecipe,
    ) -> Result<(), wgpu::SurfaceError> {
        let device = gpu.device();
        let format = gpu.surface_format();

        let offscreen = match self.offscreen.take() {
            Some(o) if o.size == recipe.size && o.format == format => o,
            _ => Offscreen::new(device, recipe.size, format),
        };
        let offscreen = self.offscreen.insert(offscreen);

        // Depth is allocated before the frame borrows the color view.
        if recipe.depth_test {
            offscreen.depth_view(device);
        }

        let mut frame = gpu.begin_frame()?;

        {
            let depth_stencil_attachment = match (&offscreen.depth, recipe.clear_depth) {
                (Some(view), Some(depth)) if recipe.depth_test => {
                    Some(wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(depth),
                            store: wgpu::StoreOp::Discard,
                        }),
                        stencil_ops: None,
                    })
                }
                _ => None,
            };

            let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("trigon scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &offscreen.color_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(recipe.clear_color.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let v = recipe.viewport;
            pass.set_viewport(v.x as f32, v.y as f32, v.width as f32, v.height as f32, 0.0, 1.0);

            if let Some(call) = recipe.draw {
                scene.record(&mut pass, call);
            }
        }

        blit(&mut frame, &offscreen.color, recipe.size);
        gpu.submit(frame);
        Ok(())
    }
}

/// Copies the offscreen image onto the acquired surface texture.
///
/// The surface may already have a different size than the frame was planned
/// for; only the overlapping region is copied.
fn blit(frame: &mut GpuFrame, source: &wgpu::Texture, size: TargetSize) {
    let (surface_width, surface_height) = frame.size();
    let copy = TargetSize::new(size.width.min(surface_width), size.height.min(surface_height));
    if copy.is_empty() {
        return;
    }

    frame.encoder.copy_texture_to_texture(
        source.as_image_copy(),
        frame.surface_texture.texture.as_image_copy(),
        extent(copy),
    );
}
