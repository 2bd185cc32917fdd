//! Geometry evaluators
//!
//! Two ways of answering "what surface is visible here", feeding the same
//! lighting accumulator:
//! - [`mesh`]: explicit triangle meshes, rasterized with
//!   perspective-correct interpolation into the G-buffer.
//! - [`sdf`]: implicit metaball surfaces, sphere-traced per pixel.
//!
//! Both produce the shared surface attribute set (albedo, world normal,
//! world position, specular parameters) defined in
//! [`crate::render::shading`].

pub mod mesh;
pub mod sdf;
pub mod shapes;
pub mod vertex;

pub use mesh::{MeshObject, MeshRasterizer, ShadingVariant};
pub use sdf::{smin, sphere_distance, MarchSettings, RayHit, RayMarcher};
pub use vertex::{Vertex, VertexStream};

use thiserror::Error;

/// Geometry validation errors, raised before the frame pipeline runs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A packed vertex buffer's length is not a whole number of vertices
    #[error("packed vertex buffer length {len} is not a multiple of stride {stride}")]
    MalformedVertexBuffer {
        /// Number of `[f32; 3]` elements in the buffer
        len: usize,
        /// The fixed stride (elements per vertex)
        stride: usize,
    },

    /// A vertex stream does not describe whole triangles
    #[error("vertex count {0} is not a multiple of 3; meshes are triangle lists")]
    IncompleteTriangles(usize),

    /// A sphere-tracer tunable is outside its usable range
    #[error("march setting '{name}' must be finite and positive, got {value}")]
    InvalidMarchSetting {
        /// Name of the offending field
        name: &'static str,
        /// The rejected value
        value: f32,
    },
}
