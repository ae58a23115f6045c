use std::fmt;

use crate::error::PipelineError;
use crate::geometry::{Geometry, IndexData, Topology, VertexLayout};
use crate::shader::ShaderProgram;
use crate::surface::ClearColor;
use crate::transform::{MatrixBinding, Transform};

use super::blueprint::SceneBlueprint;

/// The scenes the engine can render.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SceneKind {
    /// One triangle in a uniform color, no transform.
    FlatTriangle,
    /// A quad sampling the fetched texture.
    TexturedQuad,
    /// A four-vertex colored strip carrying a per-vertex point size.
    PointStrip,
    /// A colored triangle rotated 45° then shifted right.
    RotatedTriangle,
    /// An indexed cube under a camera-driven orthographic projection.
    ColoredCube,
    /// Three overlapping triangles viewed from the camera eye.
    LayeredTriangles,
}

impl SceneKind {
    pub const ALL: [SceneKind; 6] = [
        SceneKind::FlatTriangle,
        SceneKind::TexturedQuad,
        SceneKind::PointStrip,
        SceneKind::RotatedTriangle,
        SceneKind::ColoredCube,
        SceneKind::LayeredTriangles,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SceneKind::FlatTriangle => "flat-triangle",
            SceneKind::TexturedQuad => "textured-quad",
            SceneKind::PointStrip => "point-strip",
            SceneKind::RotatedTriangle => "rotated-triangle",
            SceneKind::ColoredCube => "colored-cube",
            SceneKind::LayeredTriangles => "layered-triangles",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Builds the CPU side of the scene: program, geometry and draw setup.
    ///
    /// Needs no GPU; every shader is compiled and linked here.
    pub fn blueprint(self) -> Result<SceneBlueprint, PipelineError> {
        let bp = match self {
            SceneKind::FlatTriangle => SceneBlueprint {
                program: ShaderProgram::build(
                    include_str!("shaders/flat_triangle.vert.wgsl"),
                    include_str!("shaders/flat_triangle.frag.wgsl"),
                )?,
                geometry: Geometry::new(
                    vec![0.0, 0.5, -0.5, -0.5, 0.5, -0.5],
                    VertexLayout::interleaved(&[("a_position", 2)]),
                    3,
                    None,
                    Topology::TriangleList,
                )?,
                transform: Transform::Identity,
                // The shader has no matrix on purpose; the write is skipped.
                matrices: Some(MatrixBinding::Combined("u_matrix")),
                colors: vec![("u_frag_color", [1.0, 0.0, 0.0, 1.0])],
                clear_color: ClearColor::BLACK,
                depth_test: false,
            },

            SceneKind::TexturedQuad => SceneBlueprint {
                program: ShaderProgram::build(
                    include_str!("shaders/textured_quad.vert.wgsl"),
                    include_str!("shaders/textured_quad.frag.wgsl"),
                )?,
                geometry: Geometry::new(
                    QUAD_VERTICES.to_vec(),
                    VertexLayout::interleaved(&[("a_position", 2), ("a_uv", 2)]),
                    4,
                    None,
                    Topology::TriangleStrip,
                )?,
                transform: Transform::Passthrough,
                matrices: None,
                colors: Vec::new(),
                clear_color: ClearColor::BLACK,
                depth_test: false,
            },

            SceneKind::PointStrip => SceneBlueprint {
                program: ShaderProgram::build(
                    include_str!("shaders/point_strip.vert.wgsl"),
                    include_str!("shaders/vertex_color.frag.wgsl"),
                )?,
                geometry: Geometry::new(
                    STRIP_VERTICES.to_vec(),
                    VertexLayout::interleaved(&[
                        ("a_position", 2),
                        ("a_point_size", 1),
                        ("a_color", 3),
                    ]),
                    4,
                    None,
                    Topology::TriangleStrip,
                )?,
                transform: Transform::Identity,
                matrices: Some(MatrixBinding::Combined("u_matrix")),
                colors: Vec::new(),
                clear_color: ClearColor::BLACK,
                depth_test: false,
            },

            SceneKind::RotatedTriangle => SceneBlueprint {
                program: ShaderProgram::build(
                    include_str!("shaders/rotated_triangle.vert.wgsl"),
                    include_str!("shaders/vertex_color.frag.wgsl"),
                )?,
                geometry: Geometry::new(
                    TRIANGLE_VERTICES.to_vec(),
                    VertexLayout::interleaved(&[("a_position", 2), ("a_color", 3)]),
                    3,
                    None,
                    Topology::TriangleList,
                )?,
                transform: Transform::RotateTranslate {
                    rotation_z_degrees: 45.0,
                    translate_x: 0.5,
                },
                matrices: Some(MatrixBinding::Combined("u_matrix")),
                colors: Vec::new(),
                clear_color: ClearColor::BLACK,
                depth_test: false,
            },

            SceneKind::ColoredCube => SceneBlueprint {
                program: ShaderProgram::build(
                    include_str!("shaders/colored_cube.vert.wgsl"),
                    include_str!("shaders/vertex_color.frag.wgsl"),
                )?,
                geometry: Geometry::new(
                    cube_vertices(),
                    VertexLayout::interleaved(&[("a_position", 3), ("a_color", 3)]),
                    8,
                    Some(IndexData::U16(CUBE_INDICES.to_vec())),
                    Topology::TriangleList,
                )?,
                transform: Transform::OrthoLookAt {
                    left: -1.0,
                    right: 1.0,
                    bottom: -1.0,
                    top: 1.0,
                },
                matrices: Some(MatrixBinding::Separate {
                    model: "u_model",
                    view: "u_view",
                    projection: "u_projection",
                }),
                colors: Vec::new(),
                clear_color: ClearColor::BLACK,
                depth_test: true,
            },

            SceneKind::LayeredTriangles => SceneBlueprint {
                program: ShaderProgram::build(
                    include_str!("shaders/layered_triangles.vert.wgsl"),
                    include_str!("shaders/vertex_color.frag.wgsl"),
                )?,
                geometry: Geometry::new(
                    LAYERED_VERTICES.to_vec(),
                    VertexLayout::interleaved(&[("a_position", 3), ("a_color", 3)]),
                    9,
                    None,
                    Topology::TriangleList,
                )?,
                transform: Transform::ViewModel {
                    rotation_z_degrees: -10.0,
                },
                matrices: Some(MatrixBinding::Combined("u_matrix")),
                colors: Vec::new(),
                clear_color: ClearColor::CYAN,
                // Drawn back to front; later triangles cover earlier ones.
                depth_test: false,
            },
        };

        log::debug!("built blueprint for {self}");
        Ok(bp)
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Corner `i` sits at `x = bit 0`, `y = bit 1`, `z = bit 2` of `i`, shifted to
/// `±0.5`, and is colored by its unit-cube position.
fn cube_vertices() -> Vec<f32> {
    (0..8u32)
        .flat_map(|i| {
            let bit = |b: u32| ((i >> b) & 1) as f32;
            let (x, y, z) = (bit(0), bit(1), bit(2));
            [x - 0.5, y - 0.5, z - 0.5, x, y, z]
        })
        .collect()
}

#[rustfmt::skip]
const QUAD_VERTICES: [f32; 16] = [
    // x, y, u, v
    -0.5,  0.5, 0.0, 1.0,
    -0.5, -0.5, 0.0, 0.0,
     0.5,  0.5, 1.0, 1.0,
     0.5, -0.5, 1.0, 0.0,
];

#[rustfmt::skip]
const STRIP_VERTICES: [f32; 24] = [
    // x, y, size, r, g, b
    -0.5,  0.5, 10.0, 1.0, 0.0, 0.0,
    -0.5, -0.5, 20.0, 0.0, 1.0, 0.0,
     0.5,  0.5, 30.0, 0.0, 0.0, 1.0,
     0.5, -0.5, 40.0, 1.0, 1.0, 0.0,
];

#[rustfmt::skip]
const TRIANGLE_VERTICES: [f32; 15] = [
    // x, y, r, g, b
     0.0,  0.5, 1.0, 0.0, 0.0,
    -0.5, -0.5, 0.0, 1.0, 0.0,
     0.5, -0.5, 0.0, 0.0, 1.0,
];

#[rustfmt::skip]
const CUBE_INDICES: [u16; 36] = [
    4, 5, 7,  4, 7, 6, // +z
    0, 2, 3,  0, 3, 1, // -z
    0, 4, 6,  0, 6, 2, // -x
    1, 3, 7,  1, 7, 5, // +x
    0, 1, 5,  0, 5, 4, // -y
    2, 6, 7,  2, 7, 3, // +y
];

#[rustfmt::skip]
const LAYERED_VERTICES: [f32; 54] = [
    // x, y, z, r, g, b
     0.0,  0.5, -0.4, 0.4, 1.0, 0.4, // green, furthest back
    -0.5, -0.5, -0.4, 0.4, 1.0, 0.4,
     0.5, -0.5, -0.4, 1.0, 0.4, 0.4,

     0.5,  0.4, -0.2, 1.0, 0.4, 0.4, // yellow, middle
    -0.5,  0.4, -0.2, 1.0, 1.0, 0.4,
     0.0, -0.6, -0.2, 1.0, 1.0, 0.4,

     0.0,  0.5,  0.0, 0.4, 0.4, 1.0, // blue, front
    -0.5, -0.5,  0.0, 0.4, 0.4, 1.0,
     0.5, -0.5,  0.0, 1.0, 0.4, 0.4,
];
