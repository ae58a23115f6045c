use std::fmt;

use crate::texture::TextureFetchError;

/// Shader pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub(crate) fn naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Errors raised by the rendering pipeline.
///
/// Construction errors (`ShaderCompile`, `ShaderLink`, `IndexOutOfBounds`,
/// `LayoutMismatch`, `AttributeNotFound`) are terminal for the object being
/// built. `UniformNotFound` is soft: callers skip the upload and keep drawing.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    ShaderCompile { stage: ShaderStage, diagnostic: String },
    ShaderLink { diagnostic: String },
    UniformNotFound { name: String },
    AttributeNotFound { name: String },
    IndexOutOfBounds { index: u32, vertex_count: u32 },
    LayoutMismatch { reason: String },
    TextureFetch(TextureFetchError),
    /// A draw was requested before the scene's texture finished loading.
    TextureNotReady,
    /// Surface steps were supplied in an order the GPU cannot honor.
    StepOrder { reason: String },
}

impl PipelineError {
    pub(crate) fn layout(reason: impl Into<String>) -> Self {
        PipelineError::LayoutMismatch { reason: reason.into() }
    }

    pub(crate) fn link(diagnostic: impl Into<String>) -> Self {
        PipelineError::ShaderLink { diagnostic: diagnostic.into() }
    }

    /// Returns `true` for errors that only skip a single upload.
    pub fn is_soft(&self) -> bool {
        matches!(self, PipelineError::UniformNotFound { .. })
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::ShaderCompile { stage, diagnostic } => {
                write!(f, "{stage} shader failed to compile: {diagnostic}")
            }
            PipelineError::ShaderLink { diagnostic } => {
                write!(f, "shader program failed to link: {diagnostic}")
            }
            PipelineError::UniformNotFound { name } => write!(f, "uniform `{name}` not found"),
            PipelineError::AttributeNotFound { name } => {
                write!(f, "attribute `{name}` not found")
            }
            PipelineError::IndexOutOfBounds { index, vertex_count } => write!(
                f,
                "index {index} is out of bounds for {vertex_count} vertices"
            ),
            PipelineError::LayoutMismatch { reason } => {
                write!(f, "vertex layout mismatch: {reason}")
            }
            PipelineError::TextureFetch(err) => write!(f, "{err}"),
            PipelineError::TextureNotReady => f.write_str("texture is not loaded yet"),
            PipelineError::StepOrder { reason } => write!(f, "surface steps out of order: {reason}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::TextureFetch(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TextureFetchError> for PipelineError {
    fn from(err: TextureFetchError) -> Self {
        PipelineError::TextureFetch(err)
    }
}

/// Failure of a single render.
///
/// Pipeline errors come from planning the frame; surface errors from acquiring
/// the window's texture and are mapped to a
/// [`SurfaceErrorAction`](crate::device::SurfaceErrorAction) by the caller.
#[derive(Debug)]
pub enum RenderError {
    Pipeline(PipelineError),
    Surface(wgpu::SurfaceError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Pipeline(err) => write!(f, "{err}"),
            RenderError::Surface(err) => write!(f, "surface error: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Pipeline(err) => Some(err),
            RenderError::Surface(err) => Some(err),
        }
    }
}

impl From<PipelineError> for RenderError {
    fn from(err: PipelineError) -> Self {
        RenderError::Pipeline(err)
    }
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(err: wgpu::SurfaceError) -> Self {
        RenderError::Surface(err)
    }
}
