use crate::error::PipelineError;
use crate::geometry::Geometry;
use crate::shader::{ShaderProgram, UniformWrites};
use crate::surface::{plan_frame, ClearColor, DrawCall, PassDesc, SurfaceStep, TargetSize};
use crate::texture::TextureSlot;
use crate::transform::{CameraState, MatrixBinding, Transform};

/// Everything about a scene that exists without a GPU.
#[derive(Debug)]
pub struct SceneBlueprint {
    pub(super) program: ShaderProgram,
    pub(super) geometry: Geometry,
    pub(super) transform: Transform,
    /// `None` when the transform never writes matrices.
    pub(super) matrices: Option<MatrixBinding>,
    /// Constant `vec4` uniforms written on every render.
    pub(super) colors: Vec<(&'static str, [f32; 4])>,
    pub(super) clear_color: ClearColor,
    pub(super) depth_test: bool,
}

/// Uniform data and surface steps for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub uniforms: UniformWrites,
    pub steps: Vec<SurfaceStep>,
}

impl SceneBlueprint {
    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn matrix_binding(&self) -> Option<MatrixBinding> {
        self.matrices
    }

    pub fn clear_color(&self) -> ClearColor {
        self.clear_color
    }

    pub fn depth_test(&self) -> bool {
        self.depth_test
    }

    /// Returns `true` if nothing can be drawn until a texture is loaded.
    pub fn needs_texture(&self) -> bool {
        self.program.samples_texture()
    }

    pub fn draw_call(&self) -> DrawCall {
        DrawCall {
            first: 0,
            count: self.geometry.element_count(),
            indexed: self.geometry.is_indexed(),
        }
    }

    pub fn pass_desc(&self) -> PassDesc {
        PassDesc {
            clear_color: self.clear_color,
            depth_test: self.depth_test,
            draw: self.draw_call(),
        }
    }

    /// Recomputes the matrices for `camera` and stages every uniform.
    ///
    /// Uniforms the program does not declare are skipped.
    pub fn stage_uniforms(&self, camera: CameraState) -> Result<UniformWrites, PipelineError> {
        let mut program = self.program.activate();

        if let (Some(binding), Some(matrices)) = (self.matrices, self.transform.compute(camera)) {
            let written = binding.write(&mut program, &matrices)?;
            log::trace!("{written} matrix uniform(s) staged");
        }
        for (name, value) in &self.colors {
            program.set_vec4(name, *value)?;
        }

        Ok(program.finish())
    }

    /// Plans one render.
    ///
    /// A textured scene whose slot is not `Ready` fails with `TextureNotReady`
    /// and plans nothing, so no draw can reach an unbound texture.
    pub fn frame(
        &self,
        camera: CameraState,
        surface: TargetSize,
        texture: &TextureSlot,
    ) -> Result<FramePlan, PipelineError> {
        if self.needs_texture() && !texture.is_ready() {
            return Err(PipelineError::TextureNotReady);
        }

        Ok(FramePlan {
            uniforms: self.stage_uniforms(camera)?,
            steps: plan_frame(surface, &self.pass_desc()),
        })
    }
}
