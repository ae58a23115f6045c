use crate::error::PipelineError;
use crate::shader::ActiveProgram;

/// Size of one vertex component in bytes. Only `f32` components are supported.
pub const FLOAT_BYTES: u64 = std::mem::size_of::<f32>() as u64;

/// One named attribute inside an interleaved vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttribute {
    pub name: String,
    /// Float components per vertex (1..=4).
    pub components: u32,
    /// Byte offset from the start of the vertex.
    pub offset_bytes: u64,
}

impl VertexAttribute {
    pub fn new(name: impl Into<String>, components: u32, offset_bytes: u64) -> Self {
        Self {
            name: name.into(),
            components,
            offset_bytes,
        }
    }

    fn end_bytes(&self) -> u64 {
        self.offset_bytes + self.components as u64 * FLOAT_BYTES
    }
}

/// Attribute layout of an interleaved vertex array.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexLayout {
    stride_bytes: u64,
    attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Layout with an explicit stride. Checked when the geometry is built.
    pub fn new(stride_bytes: u64, attributes: Vec<VertexAttribute>) -> Self {
        Self {
            stride_bytes,
            attributes,
        }
    }

    /// Tightly packed layout; offsets and stride follow the field order.
    ///
    /// `interleaved(&[("a_position", 3), ("a_color", 3)])` gives a 24-byte
    /// stride with `a_color` at offset 12.
    pub fn interleaved(fields: &[(&str, u32)]) -> Self {
        let mut offset = 0;
        let attributes = fields
            .iter()
            .map(|(name, components)| {
                let attribute = VertexAttribute::new(*name, *components, offset);
                offset += *components as u64 * FLOAT_BYTES;
                attribute
            })
            .collect();
        Self {
            stride_bytes: offset,
            attributes,
        }
    }

    pub fn stride_bytes(&self) -> u64 {
        self.stride_bytes
    }

    /// Stride expressed in `f32` elements.
    pub fn floats_per_vertex(&self) -> usize {
        (self.stride_bytes / FLOAT_BYTES) as usize
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub(crate) fn validate(&self) -> Result<(), PipelineError> {
        if self.stride_bytes == 0 || self.stride_bytes % FLOAT_BYTES != 0 {
            return Err(PipelineError::layout(format!(
                "stride of {} bytes is not a positive multiple of {FLOAT_BYTES}",
                self.stride_bytes
            )));
        }
        if self.attributes.is_empty() {
            return Err(PipelineError::layout("layout has no attributes"));
        }

        for attribute in &self.attributes {
            if !(1..=4).contains(&attribute.components) {
                return Err(PipelineError::layout(format!(
                    "attribute `{}` has {} components, expected 1 to 4",
                    attribute.name, attribute.components
                )));
            }
            if attribute.offset_bytes % FLOAT_BYTES != 0 {
                return Err(PipelineError::layout(format!(
                    "attribute `{}` offset {} is not float aligned",
                    attribute.name, attribute.offset_bytes
                )));
            }
            if attribute.end_bytes() > self.stride_bytes {
                return Err(PipelineError::layout(format!(
                    "attribute `{}` ends at byte {} past the {}-byte stride",
                    attribute.name,
                    attribute.end_bytes(),
                    self.stride_bytes
                )));
            }
        }

        for (i, a) in self.attributes.iter().enumerate() {
            for b in &self.attributes[i + 1..] {
                if a.name == b.name {
                    return Err(PipelineError::layout(format!(
                        "attribute `{}` is declared twice",
                        a.name
                    )));
                }
                if a.offset_bytes < b.end_bytes() && b.offset_bytes < a.end_bytes() {
                    return Err(PipelineError::layout(format!(
                        "attributes `{}` and `{}` overlap",
                        a.name, b.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Resolves every attribute against the active program.
    ///
    /// Each layout attribute must exist in the program with the same component
    /// count, and every attribute the program reads must be provided.
    pub(crate) fn bind(
        &self,
        program: &ActiveProgram<'_>,
    ) -> Result<Vec<wgpu::VertexAttribute>, PipelineError> {
        let mut bound = Vec::with_capacity(self.attributes.len());

        for attribute in &self.attributes {
            let location = program.attribute_location(&attribute.name)?;
            if location.components != attribute.components {
                return Err(PipelineError::layout(format!(
                    "attribute `{}` supplies {} components, shader reads {}",
                    attribute.name, attribute.components, location.components
                )));
            }
            bound.push(wgpu::VertexAttribute {
                format: vertex_format(attribute.components),
                offset: attribute.offset_bytes,
                shader_location: location.location,
            });
        }

        for (name, _) in program.program_attributes() {
            if self.attribute(name).is_none() {
                return Err(PipelineError::AttributeNotFound {
                    name: name.to_string(),
                });
            }
        }

        Ok(bound)
    }
}

fn vertex_format(components: u32) -> wgpu::VertexFormat {
    match components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::ShaderProgram;

    const VS: &str = r#"
@vertex
fn vs_main(@location(0) a_position: vec2<f32>, @location(1) a_color: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(a_position + a_color.xy * 0.0, 0.0, 1.0);
}
"#;
    const FS: &str = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }";

    #[test]
    fn interleaved_computes_offsets_and_stride() {
        let layout = VertexLayout::interleaved(&[("a_position", 3), ("a_color", 3)]);
        assert_eq!(layout.stride_bytes(), 24);
        assert_eq!(layout.floats_per_vertex(), 6);
        assert_eq!(layout.attribute("a_color").unwrap().offset_bytes, 12);
        layout.validate().unwrap();
    }

    #[test]
    fn attribute_past_stride_is_rejected() {
        let layout = VertexLayout::new(
            12,
            vec![
                VertexAttribute::new("a_position", 3, 0),
                VertexAttribute::new("a_color", 3, 12),
            ],
        );
        assert!(matches!(layout.validate(), Err(PipelineError::LayoutMismatch { .. })));
    }

    #[test]
    fn overlapping_attributes_are_rejected() {
        let layout = VertexLayout::new(
            24,
            vec![
                VertexAttribute::new("a_position", 3, 0),
                VertexAttribute::new("a_color", 3, 8),
            ],
        );
        assert!(matches!(layout.validate(), Err(PipelineError::LayoutMismatch { .. })));
    }

    #[test]
    fn bind_resolves_shader_locations() {
        let program = ShaderProgram::build(VS, FS).unwrap();
        let layout = VertexLayout::interleaved(&[("a_position", 2), ("a_color", 3)]);
        let bound = layout.bind(&program.activate()).unwrap();

        assert_eq!(bound.len(), 2);
        assert_eq!(bound[1].shader_location, 1);
        assert_eq!(bound[1].offset, 8);
        assert_eq!(bound[1].format, wgpu::VertexFormat::Float32x3);
    }

    #[test]
    fn bind_rejects_unknown_attribute() {
        let program = ShaderProgram::build(VS, FS).unwrap();
        let layout =
            VertexLayout::interleaved(&[("a_position", 2), ("a_color", 3), ("a_normal", 3)]);
        let err = layout.bind(&program.activate()).unwrap_err();
        assert_eq!(err, PipelineError::AttributeNotFound { name: "a_normal".into() });
    }

    #[test]
    fn bind_rejects_missing_shader_input() {
        let program = ShaderProgram::build(VS, FS).unwrap();
        let layout = VertexLayout::interleaved(&[("a_position", 2)]);
        let err = layout.bind(&program.activate()).unwrap_err();
        assert_eq!(err, PipelineError::AttributeNotFound { name: "a_color".into() });
    }

    #[test]
    fn bind_rejects_component_mismatch() {
        let program = ShaderProgram::build(VS, FS).unwrap();
        let layout = VertexLayout::interleaved(&[("a_position", 3), ("a_color", 3)]);
        let err = layout.bind(&program.activate()).unwrap_err();
        assert!(matches!(err, PipelineError::LayoutMismatch { .. }));
    }
}
