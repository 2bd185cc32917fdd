//! Vertex formats for the mesh pipeline
//!
//! Meshes arrive either as structured vertices or as a flat stride-3
//! packed buffer (alternating position/normal/color triples) for
//! index-free access. Both forms are validated when the stream is built,
//! never per draw.

use crate::foundation::math::Vec3;
use crate::geometry::GeometryError;

/// Elements per vertex in a packed buffer: position, normal, color
pub const PACKED_STRIDE: usize = 3;

/// A mesh vertex: position, normal, and albedo color
///
/// `#[repr(C)]` keeps the memory layout stable for upload to a vertex
/// buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    /// Local-space position
    pub position: [f32; 3],
    /// Local-space normal
    pub normal: [f32; 3],
    /// Albedo color
    pub color: [f32; 3],
}

unsafe impl bytemuck::Zeroable for Vertex {}
unsafe impl bytemuck::Pod for Vertex {}

impl Vertex {
    /// Create a vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], color: [f32; 3]) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }

    /// Local-space position as a vector
    pub fn position_vec(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    /// Local-space normal as a vector
    pub fn normal_vec(&self) -> Vec3 {
        Vec3::from(self.normal)
    }

    /// Albedo color as a vector
    pub fn color_vec(&self) -> Vec3 {
        Vec3::from(self.color)
    }
}

/// A validated stream of triangle-list vertices
///
/// The packed form stores `[f32; 3]` triples with vertex `i` decoded from
/// fixed offsets `i * 3` (position), `i * 3 + 1` (normal), and
/// `i * 3 + 2` (color).
#[derive(Debug, Clone)]
pub enum VertexStream {
    /// One struct per vertex
    Structured(Vec<Vertex>),
    /// Flat stride-3 packed buffer
    Packed(Vec<[f32; 3]>),
}

impl VertexStream {
    /// Build a structured stream
    ///
    /// # Errors
    /// Returns [`GeometryError::IncompleteTriangles`] if the vertex count
    /// is not a multiple of 3.
    pub fn structured(vertices: Vec<Vertex>) -> Result<Self, GeometryError> {
        if vertices.len() % 3 != 0 {
            return Err(GeometryError::IncompleteTriangles(vertices.len()));
        }
        Ok(Self::Structured(vertices))
    }

    /// Build a packed stream from a flat stride-3 buffer
    ///
    /// # Errors
    /// Returns [`GeometryError::MalformedVertexBuffer`] if the buffer
    /// length is not a multiple of the stride, or
    /// [`GeometryError::IncompleteTriangles`] if the decoded vertex count
    /// is not a multiple of 3.
    pub fn packed(elements: Vec<[f32; 3]>) -> Result<Self, GeometryError> {
        if elements.len() % PACKED_STRIDE != 0 {
            return Err(GeometryError::MalformedVertexBuffer {
                len: elements.len(),
                stride: PACKED_STRIDE,
            });
        }
        let vertex_count = elements.len() / PACKED_STRIDE;
        if vertex_count % 3 != 0 {
            return Err(GeometryError::IncompleteTriangles(vertex_count));
        }
        Ok(Self::Packed(elements))
    }

    /// Number of vertices in the stream
    pub fn vertex_count(&self) -> usize {
        match self {
            Self::Structured(vertices) => vertices.len(),
            Self::Packed(elements) => elements.len() / PACKED_STRIDE,
        }
    }

    /// Number of triangles in the stream
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    /// Decode the vertex at `index`
    ///
    /// # Panics
    /// Panics if `index >= vertex_count()`; draw code iterates within the
    /// validated count.
    pub fn vertex(&self, index: usize) -> Vertex {
        match self {
            Self::Structured(vertices) => vertices[index],
            Self::Packed(elements) => Vertex {
                position: elements[index * PACKED_STRIDE],
                normal: elements[index * PACKED_STRIDE + 1],
                color: elements[index * PACKED_STRIDE + 2],
            },
        }
    }

    /// Iterate over all vertices in order
    pub fn iter(&self) -> impl Iterator<Item = Vertex> + '_ {
        (0..self.vertex_count()).map(move |index| self.vertex(index))
    }
}
