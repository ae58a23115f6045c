use std::num::NonZeroU64;

use image::RgbaImage;

use crate::error::PipelineError;
use crate::geometry::GeometryBuffer;
use crate::shader::{UniformKind, UniformWrites};
use crate::surface::{DrawCall, DEPTH_FORMAT};
use crate::texture::GpuTexture;

use super::blueprint::SceneBlueprint;

/// GPU objects owned by one scene: pipeline, geometry and bindings.
pub struct GpuScene {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    /// Bindings of the program's uniform buffers, one buffer each.
    uniform_buffers: Vec<(u32, wgpu::Buffer)>,
    /// Texture and sampler bindings, when the program samples a texture.
    texture_bindings: Option<(u32, u32)>,
    texture: Option<GpuTexture>,
    /// Rebuilt whenever the texture changes. `None` until every binding the
    /// program declares has a resource.
    bind_group: Option<wgpu::BindGroup>,
    geometry: GeometryBuffer,
}

impl GpuScene {
    /// Uploads the geometry and builds a pipeline rendering into `format`.
    ///
    /// The layout is matched against the program's attributes first, so a
    /// missing or mis-sized attribute fails before any GPU pipeline exists.
    pub fn build(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        blueprint: &SceneBlueprint,
    ) -> Result<Self, PipelineError> {
        let program = blueprint.program();
        let geometry = blueprint.geometry();
        let attributes = geometry.layout().bind(&program.activate())?;

        let mut uniforms: Vec<_> = program.uniforms().collect();
        uniforms.sort_by_key(|(_, loc)| loc.binding);

        let entries: Vec<wgpu::BindGroupLayoutEntry> = uniforms
            .iter()
            .map(|(_, loc)| wgpu::BindGroupLayoutEntry {
                binding: loc.binding,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: match loc.kind {
                    UniformKind::Buffer { size } => wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(size),
                    },
                    UniformKind::Texture => wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    UniformKind::Sampler => {
                        wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
                    }
                },
                count: None,
            })
            .collect();

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("trigon scene bgl"),
            entries: &entries,
        });

        let uniform_buffers = uniforms
            .iter()
            .filter_map(|(name, loc)| match loc.kind {
                UniformKind::Buffer { size } => Some((
                    loc.binding,
                    device.create_buffer(&wgpu::BufferDescriptor {
                        label: Some(*name),
                        size,
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                        mapped_at_creation: false,
                    }),
                )),
                UniformKind::Texture | UniformKind::Sampler => None,
            })
            .collect();

        let binding_of = |kind: UniformKind| {
            uniforms.iter().find(|(_, loc)| loc.kind == kind).map(|(_, loc)| loc.binding)
        };
        let texture_bindings = match (binding_of(UniformKind::Texture), binding_of(UniformKind::Sampler)) {
            (Some(texture), Some(sampler)) => Some((texture, sampler)),
            (None, None) => None,
            _ => {
                return Err(PipelineError::link(
                    "a texture and its sampler must be declared together",
                ));
            }
        };

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("trigon scene pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        // Shader modules only live until the pipeline exists.
        let (vertex_module, fragment_module) = program.create_modules(device);

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("trigon scene pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(program.vertex_entry()),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: geometry.layout().stride_bytes(),
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },

            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(program.fragment_entry()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: geometry.topology().to_wgpu(),
                strip_index_format: geometry.strip_index_format(),
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: blueprint.depth_test().then(|| wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let mut scene = Self {
            pipeline,
            bind_group_layout,
            uniform_buffers,
            texture_bindings,
            texture: None,
            bind_group: None,
            geometry: GeometryBuffer::upload(device, geometry),
        };
        if !blueprint.needs_texture() {
            scene.rebuild_bind_group(device);
        }
        Ok(scene)
    }

    /// Uploads `image` and binds it with its sampler.
    pub fn attach_texture(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, image: &RgbaImage) {
        let texture = GpuTexture::upload(device, queue, image);
        let (width, height) = texture.size();
        self.texture = Some(texture);
        self.rebuild_bind_group(device);
        log::debug!("scene texture bound ({width}x{height})");
    }

    /// Copies staged uniform bytes into their buffers.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, writes: &UniformWrites) {
        for write in writes.iter() {
            if let Some((_, buffer)) = self.uniform_buffers.iter().find(|(b, _)| *b == write.binding) {
                queue.write_buffer(buffer, 0, &write.bytes);
            }
        }
    }

    /// Records the draw into an open render pass.
    pub(crate) fn record(&self, pass: &mut wgpu::RenderPass<'_>, call: DrawCall) {
        let Some(bind_group) = &self.bind_group else {
            log::warn!("draw skipped: scene bindings are incomplete");
            return;
        };

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, self.geometry.vertex_buffer().slice(..));

        let range = call.first..call.first + call.count;
        match self.geometry.index_buffer() {
            Some((buffer, format)) if call.indexed => {
                pass.set_index_buffer(buffer.slice(..), format);
                pass.draw_indexed(range, 0, 0..1);
            }
            _ => pass.draw(range, 0..1),
        }
    }

    fn rebuild_bind_group(&mut self, device: &wgpu::Device) {
        let mut entries: Vec<wgpu::BindGroupEntry> = self
            .uniform_buffers
            .iter()
            .map(|(binding, buffer)| wgpu::BindGroupEntry {
                binding: *binding,
                resource: buffer.as_entire_binding(),
            })
            .collect();

        if let (Some(texture), Some((texture_binding, sampler_binding))) =
            (&self.texture, self.texture_bindings)
        {
            entries.push(wgpu::BindGroupEntry {
                binding: texture_binding,
                resource: wgpu::BindingResource::TextureView(texture.view()),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: sampler_binding,
                resource: wgpu::BindingResource::Sampler(texture.sampler()),
            });
        }

        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("trigon scene bind group"),
            layout: &self.bind_group_layout,
            entries: &entries,
        }));
    }
}
