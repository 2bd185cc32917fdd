//! # Rendering pipelines
//!
//! Two pipelines over the shared scene model:
//! - [`deferred`]: rasterizes meshes into G-buffer attachments, then
//!   accumulates point-light and ambient subpasses additively into the
//!   color target.
//! - [`marched`]: a full-screen pass that sphere-traces the metaball field
//!   per pixel and shades hits inline.
//!
//! Both feed the same lighting accumulator in [`shading`], so equivalent
//! surface attributes produce identical colors regardless of which
//! geometry evaluator produced them.

pub mod attachments;
pub mod deferred;
pub mod marched;
pub mod pass;
pub mod shading;
pub mod uniforms;

pub use attachments::{Attachment, GBuffer, RenderTarget};
pub use deferred::DeferredRenderer;
pub use marched::MarchedRenderer;
pub use pass::{PassSchedule, SubpassDesc, WriteOp};
pub use shading::SurfaceAttributes;

use thiserror::Error;

use crate::geometry::GeometryError;
use crate::scene::SceneError;

/// Errors raised while validating a subpass schedule at pipeline build
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A subpass reads an attachment no earlier subpass has written
    #[error("subpass '{subpass}' reads attachment {attachment:?} before any subpass writes it")]
    ReadBeforeWrite {
        /// Name of the offending subpass
        subpass: &'static str,
        /// The attachment read too early
        attachment: attachments::Attachment,
    },

    /// A subpass reads an attachment it writes in the same subpass
    #[error("subpass '{subpass}' reads attachment {attachment:?} that it writes itself")]
    ReadWriteSameSubpass {
        /// Name of the offending subpass
        subpass: &'static str,
        /// The attachment both read and written
        attachment: attachments::Attachment,
    },

    /// Two subpasses replace-write the same attachment in one frame
    #[error("attachment {attachment:?} is replace-written by both '{first}' and '{second}'")]
    WriteConflict {
        /// The doubly-written attachment
        attachment: attachments::Attachment,
        /// The first writer
        first: &'static str,
        /// The second writer
        second: &'static str,
    },

    /// The render target dimensions are unusable
    #[error("render target dimensions must be non-zero, got {width}x{height}")]
    EmptyTarget {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
}

/// Errors raised while driving a renderer through a frame
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A frame operation was invoked out of subpass order
    #[error("'{operation}' called during the {stage} stage; {expected}")]
    OutOfOrder {
        /// The operation that was attempted
        operation: &'static str,
        /// The stage the renderer was actually in
        stage: &'static str,
        /// What the protocol expects instead
        expected: &'static str,
    },

    /// Scene data failed validation
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Geometry data failed validation
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The pipeline schedule failed validation
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
