use glam::{Mat4, Vec3};

use crate::error::PipelineError;
use crate::shader::ActiveProgram;

use super::CameraState;

/// Transform variants used by the scenes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Transform {
    /// All stages identity; an identity matrix is still written.
    Identity,
    /// Raw clip-space vertices; no matrix uniform is written at all.
    Passthrough,
    /// `view × model`: look-at from the camera eye, model rotated about Z.
    /// No projection.
    ViewModel { rotation_z_degrees: f32 },
    /// Model only: rotate about Z first, then translate along X.
    RotateTranslate {
        rotation_z_degrees: f32,
        translate_x: f32,
    },
    /// `projection × view × model` with an orthographic projection whose
    /// near/far come from the camera, and an identity model.
    OrthoLookAt {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
    },
}

/// The three transform stages of one render. Omitted stages are identity.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrices {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Matrices {
    pub const IDENTITY: Self = Self {
        model: Mat4::IDENTITY,
        view: Mat4::IDENTITY,
        projection: Mat4::IDENTITY,
    };

    /// `projection × view × model`, applied to column vectors.
    pub fn combined(&self) -> Mat4 {
        self.projection * self.view * self.model
    }

    /// Applies the combined matrix to a point (w = 1) and returns clip xyz.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.combined().project_point3(p)
    }
}

impl Transform {
    /// Computes this render's matrices, `None` for [`Transform::Passthrough`].
    pub fn compute(&self, camera: CameraState) -> Option<Matrices> {
        let look_at = || Mat4::look_at_rh(camera.eye, camera.target, camera.up);

        match *self {
            Transform::Passthrough => None,
            Transform::Identity => Some(Matrices::IDENTITY),
            Transform::ViewModel { rotation_z_degrees } => Some(Matrices {
                model: Mat4::from_rotation_z(rotation_z_degrees.to_radians()),
                view: look_at(),
                projection: Mat4::IDENTITY,
            }),
            Transform::RotateTranslate {
                rotation_z_degrees,
                translate_x,
            } => Some(Matrices {
                model: Mat4::from_translation(Vec3::new(translate_x, 0.0, 0.0))
                    * Mat4::from_rotation_z(rotation_z_degrees.to_radians()),
                view: Mat4::IDENTITY,
                projection: Mat4::IDENTITY,
            }),
            Transform::OrthoLookAt {
                left,
                right,
                bottom,
                top,
            } => Some(Matrices {
                model: Mat4::IDENTITY,
                view: look_at(),
                projection: Mat4::orthographic_rh_gl(
                    left,
                    right,
                    bottom,
                    top,
                    camera.near,
                    camera.far,
                ),
            }),
        }
    }
}

/// Uniform names the matrices are written to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MatrixBinding {
    /// One pre-multiplied `projection × view × model` matrix.
    Combined(&'static str),
    /// Each stage uploaded on its own; the shader multiplies them.
    Separate {
        model: &'static str,
        view: &'static str,
        projection: &'static str,
    },
}

impl MatrixBinding {
    /// Stages the matrices on the active program.
    ///
    /// Names the program does not declare are skipped. Returns the number of
    /// matrices actually staged.
    pub fn write(
        &self,
        program: &mut ActiveProgram<'_>,
        matrices: &Matrices,
    ) -> Result<usize, PipelineError> {
        let writes: Vec<(&str, Mat4)> = match *self {
            MatrixBinding::Combined(name) => vec![(name, matrices.combined())],
            MatrixBinding::Separate {
                model,
                view,
                projection,
            } => vec![
                (model, matrices.model),
                (view, matrices.view),
                (projection, matrices.projection),
            ],
        };

        let mut written = 0;
        for (name, matrix) in writes {
            if program.set_matrix(name, matrix)? {
                written += 1;
            }
        }
        Ok(written)
    }
}
