use crate::device::Gpu;
use crate::error::{PipelineError, RenderError};
use crate::surface::{PassRecipe, RenderSurface, TargetSize};
use crate::texture::{ImageLoader, TextureSlot};
use crate::transform::CameraState;

use super::blueprint::SceneBlueprint;
use super::gpu::GpuScene;
use super::kind::SceneKind;

/// A live scene: its blueprint, the GPU objects built from it and the
/// texture it samples, if any.
pub struct Scene {
    kind: SceneKind,
    blueprint: SceneBlueprint,
    gpu: GpuScene,
    texture: TextureSlot,
}

impl Scene {
    pub fn build(gpu: &Gpu<'_>, kind: SceneKind) -> Result<Self, PipelineError> {
        let blueprint = kind.blueprint()?;
        let gpu_scene = GpuScene::build(gpu.device(), gpu.surface_format(), &blueprint)?;
        log::info!("scene `{kind}` ready");

        Ok(Self {
            kind,
            blueprint,
            gpu: gpu_scene,
            texture: TextureSlot::new(),
        })
    }

    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    pub fn texture(&self) -> &TextureSlot {
        &self.texture
    }

    pub fn needs_texture(&self) -> bool {
        self.blueprint.needs_texture()
    }

    /// Fetches the texture and binds it. A no-op for untextured scenes.
    pub async fn prepare<L: ImageLoader>(
        &mut self,
        gpu: &Gpu<'_>,
        loader: &L,
        uri: &str,
    ) -> Result<(), PipelineError> {
        if !self.needs_texture() {
            return Ok(());
        }
        let image = self.texture.fetch(loader, uri).await?;
        self.gpu.attach_texture(gpu.device(), gpu.queue(), image);
        Ok(())
    }

    /// Renders one frame for `camera` and presents it.
    pub fn render(
        &mut self,
        gpu: &Gpu<'_>,
        surface: &mut RenderSurface,
        camera: CameraState,
    ) -> Result<(), RenderError> {
        let size = gpu.size();
        let plan = self
            .blueprint
            .frame(camera, TargetSize::new(size.width, size.height), &self.texture)?;
        let recipe = PassRecipe::from_steps(&plan.steps)?;

        self.gpu.write_uniforms(gpu.queue(), &plan.uniforms);
        surface.present(gpu, &self.gpu, &recipe)?;
        Ok(())
    }
}
