//! # Basalt Engine
//!
//! A real-time rendering core with two pipelines over one scene model:
//!
//! - **Deferred meshes**: triangle geometry is rasterized into G-buffer
//!   attachments, then point-light and ambient subpasses accumulate
//!   additively into the color target.
//! - **Ray-marched metaballs**: a full-screen pass sphere-traces a
//!   smooth-minimum distance field per pixel and shades hits inline.
//!
//! Both pipelines share the camera, the light model, and the Phong
//! accumulator, so a surface point produces the same color whichever
//! geometry evaluator found it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use basalt_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let camera = Camera::look_at(
//!         Vec3::new(0.0, 1.0, 4.0),
//!         Vec3::zeros(),
//!         Vec3::new(0.0, 1.0, 0.0),
//!         60.0_f32.to_radians(),
//!         4.0 / 3.0,
//!         0.1,
//!         100.0,
//!     )?;
//!
//!     let quad = MeshObject::lit(
//!         VertexStream::structured(shapes::quad([0.8, 0.3, 0.2]))?,
//!         ModelTransform::identity(),
//!         0.5,
//!         32.0,
//!     )?;
//!     let light = PointLight::new(Vec3::new(1.0, 2.0, 2.0), Vec3::new(1.0, 1.0, 1.0), 4.0)?;
//!     let lights = PointLightSet::from_slice(&[light])?;
//!     let ambient = AmbientLight::new(Vec3::new(1.0, 1.0, 1.0), 0.1)?;
//!
//!     let mut renderer = DeferredRenderer::new(800, 600)?;
//!     renderer.start(&camera, &Vec3::zeros())?;
//!     renderer.draw_object(&quad)?;
//!     renderer.draw_point_lights(&lights)?;
//!     renderer.draw_ambient(&ambient)?;
//!     let frame = renderer.finish()?;
//!     let _rgba = frame.to_rgba8();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod geometry;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::config::{Config, ConfigError, RenderSettings};
    pub use crate::foundation::math::{Mat4, Transform, Vec3};
    pub use crate::geometry::{
        shapes,
        sdf::{MarchSettings, RayMarcher},
        MeshObject, ShadingVariant, Vertex, VertexStream,
    };
    pub use crate::render::{
        DeferredRenderer, GBuffer, MarchedRenderer, RenderError, RenderTarget,
    };
    pub use crate::scene::{
        AmbientLight, Camera, Metaball, MetaballField, ModelTransform, PointLight, PointLightSet,
        SceneError,
    };
}
