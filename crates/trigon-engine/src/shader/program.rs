use std::collections::HashMap;

use glam::Mat4;

use crate::error::{PipelineError, ShaderStage};

use super::reflect::{
    compile_stage, float_components, AttributeLocation, ReflectedUniform, StageInterface,
    UniformKind, UniformLocation,
};

/// A linked vertex + fragment program.
///
/// Construction is all-or-nothing: either both stages compile and link, or
/// the caller gets the first error and no program exists.
#[derive(Debug)]
pub struct ShaderProgram {
    vertex_source: String,
    fragment_source: String,
    vertex_entry: String,
    fragment_entry: String,
    attributes: HashMap<String, AttributeLocation>,
    uniforms: HashMap<String, UniformLocation>,
}

impl ShaderProgram {
    /// Compiles both stages and links them.
    ///
    /// The vertex stage is compiled first; a failing vertex stage is reported
    /// even if the fragment stage is also broken.
    pub fn build(vertex_source: &str, fragment_source: &str) -> Result<Self, PipelineError> {
        let vertex = compile_stage(ShaderStage::Vertex, vertex_source)?;
        let fragment = compile_stage(ShaderStage::Fragment, fragment_source)?;

        let attributes = link_attributes(&vertex)?;
        link_varyings(&vertex, &fragment)?;
        let uniforms = link_uniforms(&vertex.uniforms, &fragment.uniforms)?;

        log::debug!(
            "linked program: {} attribute(s), {} uniform(s)",
            attributes.len(),
            uniforms.len()
        );

        Ok(Self {
            vertex_source: vertex_source.to_string(),
            fragment_source: fragment_source.to_string(),
            vertex_entry: vertex.entry_point,
            fragment_entry: fragment.entry_point,
            attributes,
            uniforms,
        })
    }

    /// Makes this program current; locations are only meaningful through the
    /// returned handle.
    pub fn activate(&self) -> ActiveProgram<'_> {
        ActiveProgram {
            program: self,
            writes: UniformWrites::default(),
        }
    }

    pub(crate) fn vertex_entry(&self) -> &str {
        &self.vertex_entry
    }

    pub(crate) fn fragment_entry(&self) -> &str {
        &self.fragment_entry
    }

    pub(crate) fn attributes(&self) -> impl Iterator<Item = (&str, AttributeLocation)> {
        self.attributes.iter().map(|(name, loc)| (name.as_str(), *loc))
    }

    pub(crate) fn uniforms(&self) -> impl Iterator<Item = (&str, UniformLocation)> {
        self.uniforms.iter().map(|(name, loc)| (name.as_str(), *loc))
    }

    /// Returns `true` if the program samples a texture.
    pub fn samples_texture(&self) -> bool {
        self.uniforms
            .values()
            .any(|loc| loc.kind == UniformKind::Texture)
    }

    /// Creates the GPU shader modules for both stages.
    ///
    /// The modules are only needed until the render pipeline is created.
    pub(crate) fn create_modules(
        &self,
        device: &wgpu::Device,
    ) -> (wgpu::ShaderModule, wgpu::ShaderModule) {
        let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("trigon vertex stage"),
            source: wgpu::ShaderSource::Wgsl(self.vertex_source.as_str().into()),
        });
        let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("trigon fragment stage"),
            source: wgpu::ShaderSource::Wgsl(self.fragment_source.as_str().into()),
        });
        (vertex, fragment)
    }
}

/// Program made current for location queries and uniform writes.
pub struct ActiveProgram<'p> {
    program: &'p ShaderProgram,
    writes: UniformWrites,
}

impl<'p> ActiveProgram<'p> {
    pub fn attribute_location(&self, name: &str) -> Result<AttributeLocation, PipelineError> {
        self.program
            .attributes
            .get(name)
            .copied()
            .ok_or_else(|| PipelineError::AttributeNotFound { name: name.to_string() })
    }

    pub fn uniform_location(&self, name: &str) -> Result<UniformLocation, PipelineError> {
        self.program
            .uniforms
            .get(name)
            .copied()
            .ok_or_else(|| PipelineError::UniformNotFound { name: name.to_string() })
    }

    pub(crate) fn program_attributes(&self) -> impl Iterator<Item = (&'p str, AttributeLocation)> {
        self.program.attributes()
    }

    /// Stages a `mat4x4<f32>` write.
    ///
    /// Returns `Ok(false)` when the program has no such uniform; the write is
    /// skipped and rendering continues.
    pub fn set_matrix(&mut self, name: &str, matrix: Mat4) -> Result<bool, PipelineError> {
        self.stage(name, bytemuck::cast_slice(&matrix.to_cols_array()))
    }

    /// Stages a `vec4<f32>` write.
    pub fn set_vec4(&mut self, name: &str, value: [f32; 4]) -> Result<bool, PipelineError> {
        self.stage(name, bytemuck::cast_slice(&value))
    }

    /// Consumes the handle and returns the staged writes.
    pub fn finish(self) -> UniformWrites {
        self.writes
    }

    fn stage(&mut self, name: &str, bytes: &[u8]) -> Result<bool, PipelineError> {
        let location = match self.uniform_location(name) {
            Ok(location) => location,
            Err(err) if err.is_soft() => {
                log::debug!("{err}; skipping upload");
                return Ok(false);
            }
            Err(err) => return Err(err),
        };

        match location.kind {
            UniformKind::Buffer { size } if size == bytes.len() as u64 => {
                self.writes.push(location.binding, bytes.to_vec());
                Ok(true)
            }
            UniformKind::Buffer { size } => Err(PipelineError::layout(format!(
                "uniform `{name}` holds {size} bytes, write has {}",
                bytes.len()
            ))),
            UniformKind::Texture | UniformKind::Sampler => Err(PipelineError::layout(format!(
                "uniform `{name}` is not a buffer"
            ))),
        }
    }
}

/// A single staged uniform buffer write.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformWrite {
    pub binding: u32,
    pub bytes: Vec<u8>,
}

/// Uniform writes collected during one render, applied before the draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformWrites {
    entries: Vec<UniformWrite>,
}

impl UniformWrites {
    /// Later writes to the same binding replace earlier ones.
    fn push(&mut self, binding: u32, bytes: Vec<u8>) {
        self.entries.retain(|w| w.binding != binding);
        self.entries.push(UniformWrite { binding, bytes });
    }

    pub fn iter(&self) -> impl Iterator<Item = &UniformWrite> {
        self.entries.iter()
    }

    pub fn get(&self, binding: u32) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|w| w.binding == binding)
            .map(|w| w.bytes.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── link ──────────────────────────────────────────────────────────────────

fn link_attributes(vertex: &StageInterface) -> Result<HashMap<String, AttributeLocation>, PipelineError> {
    let mut attributes = HashMap::new();
    for input in &vertex.inputs {
        let components = float_components(&input.ty).ok_or_else(|| {
            PipelineError::link(format!(
                "attribute `{}` must be a float scalar or vector",
                input.name
            ))
        })?;
        attributes.insert(
            input.name.clone(),
            AttributeLocation { location: input.location, components },
        );
    }
    Ok(attributes)
}

fn link_varyings(vertex: &StageInterface, fragment: &StageInterface) -> Result<(), PipelineError> {
    for input in &fragment.inputs {
        let Some(output) = vertex.outputs.iter().find(|o| o.location == input.location) else {
            return Err(PipelineError::link(format!(
                "fragment input `{}` at location {} has no matching vertex output",
                input.name, input.location
            )));
        };
        if output.ty != input.ty {
            return Err(PipelineError::link(format!(
                "fragment input `{}` at location {} does not match the type of vertex output `{}`",
                input.name, input.location, output.name
            )));
        }
    }
    Ok(())
}

fn link_uniforms(
    vertex: &[ReflectedUniform],
    fragment: &[ReflectedUniform],
) -> Result<HashMap<String, UniformLocation>, PipelineError> {
    let mut uniforms: HashMap<String, UniformLocation> = HashMap::new();

    for uniform in vertex.iter().chain(fragment) {
        if uniform.group != 0 {
            return Err(PipelineError::link(format!(
                "uniform `{}` uses bind group {}; only group 0 is supported",
                uniform.name, uniform.group
            )));
        }

        if let Some(existing) = uniforms.get(&uniform.name) {
            if *existing != uniform.location {
                return Err(PipelineError::link(format!(
                    "uniform `{}` is declared differently in the vertex and fragment stages",
                    uniform.name
                )));
            }
            continue;
        }

        if let Some((other, _)) = uniforms
            .iter()
            .find(|(_, loc)| loc.binding == uniform.location.binding)
        {
            return Err(PipelineError::link(format!(
                "uniforms `{other}` and `{}` share binding {}",
                uniform.name, uniform.location.binding
            )));
        }

        uniforms.insert(uniform.name.clone(), uniform.location);
    }

    Ok(uniforms)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = r#"
struct VertexInput {
    @location(0) a_position: vec3<f32>,
    @location(1) a_color: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) v_color: vec4<f32>,
};

@group(0) @binding(0) var<uniform> u_matrix: mat4x4<f32>;

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = u_matrix * vec4<f32>(in.a_position, 1.0);
    out.v_color = vec4<f32>(in.a_color, 1.0);
    return out;
}
"#;

    const FS: &str = r#"
@fragment
fn fs_main(@location(0) v_color: vec4<f32>) -> @location(0) vec4<f32> {
    return v_color;
}
"#;

    // ── build ─────────────────────────────────────────────────────────────

    #[test]
    fn build_reflects_attributes_and_uniforms() {
        let program = ShaderProgram::build(VS, FS).unwrap();
        let active = program.activate();

        let pos = active.attribute_location("a_position").unwrap();
        assert_eq!(pos, AttributeLocation { location: 0, components: 3 });
        let color = active.attribute_location("a_color").unwrap();
        assert_eq!(color.location, 1);

        let matrix = active.uniform_location("u_matrix").unwrap();
        assert_eq!(matrix.binding, 0);
        assert_eq!(matrix.kind, UniformKind::Buffer { size: 64 });
    }

    #[test]
    fn vertex_compile_error_names_stage() {
        let err = ShaderProgram::build("fn broken( {", FS).unwrap_err();
        match err {
            PipelineError::ShaderCompile { stage, diagnostic } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!diagnostic.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fragment_compile_error_names_stage() {
        let bad_fs = "@fragment fn fs_main() -> @location(0) vec4<f32> { return undefined_name; }";
        let err = ShaderProgram::build(VS, bad_fs).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ShaderCompile { stage: ShaderStage::Fragment, .. }
        ));
    }

    #[test]
    fn missing_entry_point_is_compile_error() {
        let err = ShaderProgram::build(VS, "fn helper() {}").unwrap_err();
        match err {
            PipelineError::ShaderCompile { stage, diagnostic } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(diagnostic.contains("entry point"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unmatched_fragment_input_fails_link() {
        let fs = r#"
@fragment
fn fs_main(@location(3) v_uv: vec2<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(v_uv, 0.0, 1.0);
}
"#;
        let err = ShaderProgram::build(VS, fs).unwrap_err();
        assert!(matches!(err, PipelineError::ShaderLink { .. }));
    }

    #[test]
    fn mismatched_varying_type_fails_link() {
        let fs = r#"
@fragment
fn fs_main(@location(0) v_color: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(v_color, 1.0);
}
"#;
        let err = ShaderProgram::build(VS, fs).unwrap_err();
        assert!(matches!(err, PipelineError::ShaderLink { .. }));
    }

    // ── locations ─────────────────────────────────────────────────────────

    #[test]
    fn missing_attribute_is_hard_error() {
        let program = ShaderProgram::build(VS, FS).unwrap();
        let err = program.activate().attribute_location("a_normal").unwrap_err();
        assert_eq!(err, PipelineError::AttributeNotFound { name: "a_normal".into() });
        assert!(!err.is_soft());
    }

    #[test]
    fn missing_uniform_write_is_skipped() {
        let program = ShaderProgram::build(VS, FS).unwrap();
        let mut active = program.activate();
        assert_eq!(active.set_matrix("u_view_matrix", Mat4::IDENTITY), Ok(false));
        assert!(active.finish().is_empty());
    }

    #[test]
    fn matrix_write_is_staged_column_major() {
        let program = ShaderProgram::build(VS, FS).unwrap();
        let mut active = program.activate();
        let m = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(active.set_matrix("u_matrix", m), Ok(true));

        let writes = active.finish();
        let bytes = writes.get(0).unwrap();
        let floats: Vec<f32> = bytemuck::pod_collect_to_vec(bytes);
        assert_eq!(&floats[12..15], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn wrong_sized_write_is_rejected() {
        let program = ShaderProgram::build(VS, FS).unwrap();
        let mut active = program.activate();
        let err = active.set_vec4("u_matrix", [0.0; 4]).unwrap_err();
        assert!(matches!(err, PipelineError::LayoutMismatch { .. }));
    }

    #[test]
    fn unused_uniform_is_not_reflected() {
        let vs = r#"
@group(0) @binding(0) var<uniform> u_unused: mat4x4<f32>;

@vertex
fn vs_main(@location(0) a_position: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(a_position, 0.0, 1.0);
}
"#;
        let fs = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }";
        let program = ShaderProgram::build(vs, fs).unwrap();
        assert!(program.activate().uniform_location("u_unused").is_err());
    }
}
