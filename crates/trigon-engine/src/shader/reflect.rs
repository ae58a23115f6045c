use naga::{AddressSpace, Binding, Handle, Module, ScalarKind, Type, TypeInner};

use crate::error::{PipelineError, ShaderStage};

/// Reflected vertex attribute slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AttributeLocation {
    /// `@location(n)` of the vertex entry-point input.
    pub location: u32,
    /// Float components read by the shader (1..=4).
    pub components: u32,
}

/// Kind of resource behind a uniform name.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformKind {
    /// `var<uniform>` buffer of `size` bytes.
    Buffer { size: u64 },
    /// Sampled 2-D texture.
    Texture,
    Sampler,
}

/// Reflected uniform slot (always in bind group 0).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformLocation {
    pub binding: u32,
    pub kind: UniformKind,
}

/// Location-bound value crossing a stage boundary.
#[derive(Debug, Clone)]
pub(crate) struct Varying {
    pub name: String,
    pub location: u32,
    pub ty: TypeInner,
}

#[derive(Debug, Clone)]
pub(crate) struct ReflectedUniform {
    pub name: String,
    pub group: u32,
    pub location: UniformLocation,
}

/// Everything a single compiled stage exposes to the linker.
#[derive(Debug, Clone)]
pub(crate) struct StageInterface {
    pub entry_point: String,
    pub inputs: Vec<Varying>,
    pub outputs: Vec<Varying>,
    pub uniforms: Vec<ReflectedUniform>,
}

/// Parses and validates one stage, then reflects its interface.
///
/// The naga module is dropped once reflected; the GPU compiles its own copy.
pub(crate) fn compile_stage(
    stage: ShaderStage,
    source: &str,
) -> Result<StageInterface, PipelineError> {
    let compile_error = |diagnostic: String| PipelineError::ShaderCompile { stage, diagnostic };

    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| compile_error(e.emit_to_string(source)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    );
    let info = validator
        .validate(&module)
        .map_err(|e| compile_error(e.emit_to_string(source)))?;

    let mut candidates = module
        .entry_points
        .iter()
        .enumerate()
        .filter(|(_, ep)| ep.stage == stage.naga());

    let (index, entry) = match (candidates.next(), candidates.next()) {
        (Some(found), None) => found,
        (None, _) => return Err(compile_error(format!("no @{stage} entry point"))),
        (Some(_), Some(_)) => {
            return Err(compile_error(format!("more than one @{stage} entry point")));
        }
    };

    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        collect_varyings(&module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    let mut outputs = Vec::new();
    if let Some(result) = &entry.function.result {
        collect_varyings(&module, None, result.ty, result.binding.as_ref(), &mut outputs);
    }

    // Only globals the entry point touches end up in the pipeline layout.
    let usage = info.get_entry_point(index);
    let mut uniforms = Vec::new();
    for (handle, var) in module.global_variables.iter() {
        if usage[handle].is_empty() {
            continue;
        }
        let (Some(binding), Some(name)) = (&var.binding, &var.name) else { continue };

        let kind = match (var.space, &module.types[var.ty].inner) {
            (AddressSpace::Uniform, inner) => UniformKind::Buffer {
                size: inner.size(module.to_ctx()) as u64,
            },
            (AddressSpace::Handle, TypeInner::Image { .. }) => UniformKind::Texture,
            (AddressSpace::Handle, TypeInner::Sampler { .. }) => UniformKind::Sampler,
            _ => continue,
        };

        uniforms.push(ReflectedUniform {
            name: name.clone(),
            group: binding.group,
            location: UniformLocation { binding: binding.binding, kind },
        });
    }

    Ok(StageInterface {
        entry_point: entry.name.clone(),
        inputs,
        outputs,
        uniforms,
    })
}

/// Number of float components for an attribute type, `None` if not a float scalar/vector.
pub(crate) fn float_components(ty: &TypeInner) -> Option<u32> {
    match ty {
        TypeInner::Scalar(scalar) if scalar.kind == ScalarKind::Float => Some(1),
        TypeInner::Vector { size, scalar } if scalar.kind == ScalarKind::Float => {
            Some(*size as u32)
        }
        _ => None,
    }
}

fn collect_varyings(
    module: &Module,
    name: Option<&str>,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<Varying>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(Varying {
            name: name.unwrap_or_default().to_string(),
            location: *location,
            ty: module.types[ty].inner.clone(),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_varyings(
                        module,
                        member.name.as_deref(),
                        member.ty,
                        member.binding.as_ref(),
                        out,
                    );
                }
            }
        }
    }
}
