use wgpu::util::DeviceExt;

use crate::error::PipelineError;

use super::layout::VertexLayout;

/// Primitive assembly mode for a draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Topology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

impl Topology {
    pub(crate) fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::PointList => wgpu::PrimitiveTopology::PointList,
            Topology::LineList => wgpu::PrimitiveTopology::LineList,
            Topology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }

    fn is_strip(self) -> bool {
        matches!(self, Topology::LineStrip | Topology::TriangleStrip)
    }
}

/// Index data with its element width.
///
/// wgpu has no 8-bit index format; meshes small enough for 8-bit indices use
/// `U16`. The draw's index format is derived from the variant, so the declared
/// width can never disagree with the stored width.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexData {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexData {
    pub fn len(&self) -> usize {
        match self {
            IndexData::U16(v) => v.len(),
            IndexData::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<u32> {
        match self {
            IndexData::U16(v) => v.get(i).map(|&x| x as u32),
            IndexData::U32(v) => v.get(i).copied(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }

    pub fn format(&self) -> wgpu::IndexFormat {
        match self {
            IndexData::U16(_) => wgpu::IndexFormat::Uint16,
            IndexData::U32(_) => wgpu::IndexFormat::Uint32,
        }
    }

    fn bytes(&self) -> &[u8] {
        match self {
            IndexData::U16(v) => bytemuck::cast_slice(v),
            IndexData::U32(v) => bytemuck::cast_slice(v),
        }
    }
}

/// Validated, immutable vertex geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    vertices: Vec<f32>,
    layout: VertexLayout,
    indices: Option<IndexData>,
    topology: Topology,
    vertex_count: u32,
}

impl Geometry {
    /// Validates the layout against the data and every index against the
    /// vertex count.
    ///
    /// The data must hold exactly `vertex_count` vertices of the layout's
    /// stride. A length that merely divides by the stride is not enough: a
    /// layout wider than the real interleaving would read neighboring
    /// vertices as attributes.
    pub fn new(
        vertices: Vec<f32>,
        layout: VertexLayout,
        vertex_count: u32,
        indices: Option<IndexData>,
        topology: Topology,
    ) -> Result<Self, PipelineError> {
        layout.validate()?;

        if vertex_count == 0 || vertices.is_empty() {
            return Err(PipelineError::layout("vertex data is empty"));
        }
        let per_vertex = layout.floats_per_vertex();
        let expected = vertex_count as usize * per_vertex;
        if vertices.len() != expected {
            return Err(PipelineError::layout(format!(
                "{vertex_count} vertices of {per_vertex} floats need {expected} floats, got {}",
                vertices.len()
            )));
        }

        if let Some(indices) = &indices {
            if indices.is_empty() {
                return Err(PipelineError::layout("index data is empty"));
            }
            if let Some(index) = indices.iter().find(|&i| i >= vertex_count) {
                return Err(PipelineError::IndexOutOfBounds {
                    index,
                    vertex_count,
                });
            }
        }

        Ok(Self {
            vertices,
            layout,
            indices,
            topology,
            vertex_count,
        })
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn indices(&self) -> Option<&IndexData> {
        self.indices.as_ref()
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Number of vertices or indices consumed by a full draw.
    pub fn element_count(&self) -> u32 {
        match &self.indices {
            Some(indices) => indices.len() as u32,
            None => self.vertex_count,
        }
    }

    /// Reads one attribute of one vertex.
    pub fn attribute(&self, vertex: u32, name: &str) -> Option<&[f32]> {
        let attribute = self.layout.attribute(name)?;
        if vertex >= self.vertex_count {
            return None;
        }
        let base = vertex as usize * self.layout.floats_per_vertex()
            + (attribute.offset_bytes / super::FLOAT_BYTES) as usize;
        self.vertices.get(base..base + attribute.components as usize)
    }

    /// Vertex indices of each assembled triangle, following topology and indices.
    ///
    /// Strips alternate winding so every triangle keeps the first one's
    /// orientation. Non-triangle topologies produce nothing.
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        let order: Vec<u32> = match &self.indices {
            Some(indices) => indices.iter().collect(),
            None => (0..self.vertex_count).collect(),
        };

        match self.topology {
            Topology::TriangleList => order
                .chunks_exact(3)
                .map(|t| [t[0], t[1], t[2]])
                .collect(),
            Topology::TriangleStrip => order
                .windows(3)
                .enumerate()
                .map(|(i, w)| {
                    if i % 2 == 0 {
                        [w[0], w[1], w[2]]
                    } else {
                        [w[1], w[0], w[2]]
                    }
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn strip_index_format(&self) -> Option<wgpu::IndexFormat> {
        match &self.indices {
            Some(indices) if self.topology.is_strip() => Some(indices.format()),
            _ => None,
        }
    }
}

/// GPU-resident copy of a [`Geometry`]. Static; never re-uploaded.
#[derive(Debug)]
pub struct GeometryBuffer {
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<(wgpu::Buffer, wgpu::IndexFormat)>,
}

impl GeometryBuffer {
    pub fn upload(device: &wgpu::Device, geometry: &Geometry) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("trigon vertex buffer"),
            contents: bytemuck::cast_slice(geometry.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = geometry.indices().map(|indices| {
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("trigon index buffer"),
                contents: indices.bytes(),
                usage: wgpu::BufferUsages::INDEX,
            });
            (buffer, indices.format())
        });

        log::debug!(
            "uploaded {} vertices ({} bytes), indexed: {}",
            geometry.vertex_count(),
            geometry.vertices().len() * std::mem::size_of::<f32>(),
            index_buffer.is_some()
        );

        Self {
            vertex_buffer,
            index_buffer,
        }
    }

    pub(crate) fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub(crate) fn index_buffer(&self) -> Option<(&wgpu::Buffer, wgpu::IndexFormat)> {
        self.index_buffer.as_ref().map(|(buffer, format)| (buffer, *format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xyz_rgb() -> VertexLayout {
        VertexLayout::interleaved(&[("a_position", 3), ("a_color", 3)])
    }

    fn cube_vertices() -> Vec<f32> {
        let mut v = Vec::new();
        for i in 0..8 {
            let x = if i & 1 == 0 { -0.5 } else { 0.5 };
            let y = if i & 2 == 0 { -0.5 } else { 0.5 };
            let z = if i & 4 == 0 { -0.5 } else { 0.5 };
            v.extend_from_slice(&[x, y, z, 1.0, 1.0, 1.0]);
        }
        v
    }

    // ── indices ───────────────────────────────────────────────────────────

    #[test]
    fn index_equal_to_vertex_count_is_out_of_bounds() {
        let err = Geometry::new(
            cube_vertices(),
            xyz_rgb(),
            8,
            Some(IndexData::U16(vec![0, 1, 2, 5, 6, 8])),
            Topology::TriangleList,
        )
        .unwrap_err();
        assert_eq!(err, PipelineError::IndexOutOfBounds { index: 8, vertex_count: 8 });
    }

    #[test]
    fn indices_within_bounds_are_accepted() {
        let geometry = Geometry::new(
            cube_vertices(),
            xyz_rgb(),
            8,
            Some(IndexData::U16(vec![0, 1, 2, 5, 6, 7])),
            Topology::TriangleList,
        )
        .unwrap();
        assert_eq!(geometry.vertex_count(), 8);
        assert_eq!(geometry.element_count(), 6);
        assert_eq!(geometry.indices().unwrap().format(), wgpu::IndexFormat::Uint16);
    }

    #[test]
    fn index_width_follows_storage() {
        let wide = IndexData::U32(vec![0, 1, 2]);
        assert_eq!(wide.format(), wgpu::IndexFormat::Uint32);
        assert_eq!(wide.bytes().len(), 12);
        let narrow = IndexData::U16(vec![0, 1, 2]);
        assert_eq!(narrow.bytes().len(), 6);
    }

    // ── layout vs data ────────────────────────────────────────────────────

    #[test]
    fn stride_larger_than_data_is_rejected() {
        // Three xyz vertices described as six floats per vertex.
        let data = vec![0.0, 0.5, 0.0, -0.5, -0.5, 0.0, 0.5, -0.5, 0.0];
        let err = Geometry::new(data, xyz_rgb(), 3, None, Topology::TriangleList).unwrap_err();
        assert!(matches!(err, PipelineError::LayoutMismatch { .. }));
    }

    #[test]
    fn stride_mismatch_is_rejected_when_length_divides() {
        // Six xyz vertices: 18 floats also split evenly into three 6-float
        // vertices, whose colors would be the next vertex's position.
        let data: Vec<f32> = (0..6)
            .flat_map(|i| [i as f32 * 0.1 - 0.5, -0.5, 0.0])
            .collect();
        assert_eq!(data.len() % xyz_rgb().floats_per_vertex(), 0);

        let err = Geometry::new(data.clone(), xyz_rgb(), 6, None, Topology::TriangleList)
            .unwrap_err();
        assert!(matches!(err, PipelineError::LayoutMismatch { .. }));

        let xyz = VertexLayout::interleaved(&[("a_position", 3)]);
        let geometry = Geometry::new(data, xyz, 6, None, Topology::TriangleList).unwrap();
        assert_eq!(geometry.vertex_count(), 6);
    }

    #[test]
    fn surplus_vertex_data_is_rejected() {
        let err = Geometry::new(cube_vertices(), xyz_rgb(), 7, None, Topology::PointList)
            .unwrap_err();
        assert!(matches!(err, PipelineError::LayoutMismatch { .. }));
    }

    #[test]
    fn empty_vertex_data_is_rejected() {
        let err = Geometry::new(Vec::new(), xyz_rgb(), 0, None, Topology::TriangleList).unwrap_err();
        assert!(matches!(err, PipelineError::LayoutMismatch { .. }));
    }

    #[test]
    fn attribute_reads_interleaved_slot() {
        let geometry = Geometry::new(cube_vertices(), xyz_rgb(), 8, None, Topology::PointList).unwrap();
        assert_eq!(geometry.attribute(3, "a_position"), Some(&[0.5, 0.5, -0.5][..]));
        assert_eq!(geometry.attribute(3, "a_color"), Some(&[1.0, 1.0, 1.0][..]));
        assert_eq!(geometry.attribute(8, "a_position"), None);
        assert_eq!(geometry.attribute(0, "a_uv"), None);
    }

    // ── assembly ──────────────────────────────────────────────────────────

    #[test]
    fn strip_assembles_alternating_triangles() {
        let layout = VertexLayout::interleaved(&[("a_position", 2)]);
        let data = vec![0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0];
        let geometry = Geometry::new(data, layout, 4, None, Topology::TriangleStrip).unwrap();
        assert_eq!(geometry.triangles(), vec![[0, 1, 2], [2, 1, 3]]);
    }

    #[test]
    fn indexed_list_assembles_through_indices() {
        let geometry = Geometry::new(
            cube_vertices(),
            xyz_rgb(),
            8,
            Some(IndexData::U16(vec![7, 6, 5, 0, 1, 2])),
            Topology::TriangleList,
        )
        .unwrap();
        assert_eq!(geometry.triangles(), vec![[7, 6, 5], [0, 1, 2]]);
    }
}
