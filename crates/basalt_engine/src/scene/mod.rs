//! Scene data model
//!
//! Plain per-frame data consumed by every pass: camera, model transforms,
//! lights, and metaballs. All of it is owned by the frame orchestrator and
//! passed by reference into the renderers; no pass retains scene state
//! across frames.
//!
//! Configuration errors (capacity overflow, degenerate radii, singular
//! matrices) are rejected here, at scene-build time, so the per-pixel
//! evaluation paths never have to handle them.

pub mod camera;
pub mod lighting;
pub mod metaball;
pub mod transform;

pub use camera::Camera;
pub use lighting::{AmbientLight, PointLight, PointLightSet, MAX_POINT_LIGHTS};
pub use metaball::{Metaball, MetaballField, MAX_METABALLS};
pub use transform::ModelTransform;

use thiserror::Error;

/// Scene construction and validation errors
///
/// All of these are raised before any rendering work is submitted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// A bounded set was pushed past its fixed capacity
    #[error("capacity exceeded: {kind} supports at most {max} entries")]
    CapacityExceeded {
        /// Which bounded set overflowed
        kind: &'static str,
        /// The fixed maximum capacity
        max: usize,
    },

    /// A metaball was created with a non-positive radius
    #[error("metaball radius must be positive, got {0}")]
    DegenerateRadius(f32),

    /// A light was created with a negative intensity
    #[error("light intensity must be non-negative, got {0}")]
    NegativeIntensity(f32),

    /// A specular shininess exponent was zero or negative
    #[error("specular shininess must be positive, got {0}")]
    DegenerateShininess(f32),

    /// The camera view matrix is not invertible
    #[error("view matrix is singular; camera position cannot be reconstructed")]
    SingularViewMatrix,

    /// A model matrix is not invertible
    #[error("model matrix is singular; normal matrix cannot be derived")]
    SingularModelMatrix,
}
