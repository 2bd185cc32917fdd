//! The deferred mesh pipeline
//!
//! One frame is driven through a fixed subpass protocol:
//!
//! ```text
//! start -> draw_object* -> draw_point_lights -> draw_ambient -> finish
//! ```
//!
//! `start` clears the attachments and snapshots the camera; `draw_object`
//! rasterizes meshes into the G-buffer (or, for unlit objects, straight
//! into the color target); the two lighting calls each run one full-screen
//! subpass that accumulates into the color target; `finish` hands the
//! frame back. Calls outside this order are rejected with
//! [`RenderError::OutOfOrder`] rather than silently producing a frame
//! with stale attachments.

use crate::foundation::math::Vec3;
use crate::geometry::mesh::{MeshObject, MeshRasterizer, ShadingVariant};
use crate::render::attachments::{GBuffer, RenderTarget};
use crate::render::pass::{deferred_schedule, PassSchedule};
use crate::render::shading;
use crate::render::uniforms::PointLightArrayData;
use crate::render::{PipelineError, RenderError};
use crate::scene::camera::Camera;
use crate::scene::lighting::{AmbientLight, PointLight, PointLightSet};

/// Where the renderer is in the frame protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Geometry,
    Lighting,
    Ambient,
}

impl Stage {
    fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Geometry => "geometry",
            Self::Lighting => "point lighting",
            Self::Ambient => "ambient",
        }
    }
}

/// Deferred renderer: G-buffer geometry plus accumulating light subpasses
///
/// Owns its attachments; one instance renders any number of frames at a
/// fixed resolution. The subpass schedule is validated once at
/// construction.
#[derive(Debug)]
pub struct DeferredRenderer {
    schedule: PassSchedule,
    rasterizer: MeshRasterizer,
    gbuffer: GBuffer,
    target: RenderTarget,
    camera: Option<Camera>,
    stage: Stage,
}

impl DeferredRenderer {
    /// Create a renderer for the given resolution
    ///
    /// # Errors
    /// Returns [`PipelineError::EmptyTarget`] for zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self, PipelineError> {
        if width == 0 || height == 0 {
            return Err(PipelineError::EmptyTarget { width, height });
        }
        let schedule = deferred_schedule()?;
        log::debug!(
            "deferred renderer at {width}x{height}, {} subpasses",
            schedule.subpasses().len()
        );
        Ok(Self {
            schedule,
            rasterizer: MeshRasterizer::new(),
            gbuffer: GBuffer::new(width, height),
            target: RenderTarget::new(width, height),
            camera: None,
            stage: Stage::Idle,
        })
    }

    /// The validated subpass schedule this renderer executes
    pub fn schedule(&self) -> &PassSchedule {
        &self.schedule
    }

    fn expect_stage(
        &self,
        operation: &'static str,
        expected_stage: Stage,
        expected: &'static str,
    ) -> Result<(), RenderError> {
        if self.stage == expected_stage {
            Ok(())
        } else {
            Err(RenderError::OutOfOrder {
                operation,
                stage: self.stage.name(),
                expected,
            })
        }
    }

    /// Begin a frame: clear all attachments and snapshot the camera
    ///
    /// # Errors
    /// Returns [`RenderError::OutOfOrder`] if the previous frame was not
    /// finished.
    pub fn start(&mut self, camera: &Camera, clear_color: &Vec3) -> Result<(), RenderError> {
        self.expect_stage("start", Stage::Idle, "finish the previous frame first")?;
        self.gbuffer.clear();
        self.target.clear(clear_color);
        self.camera = Some(camera.clone());
        self.stage = Stage::Geometry;
        Ok(())
    }

    /// Rasterize one mesh object
    ///
    /// Lit objects go into the G-buffer; unlit objects depth-test against
    /// the shared depth plane and write the color target directly.
    ///
    /// # Errors
    /// Returns [`RenderError::OutOfOrder`] outside the geometry stage.
    pub fn draw_object(&mut self, object: &MeshObject) -> Result<(), RenderError> {
        self.expect_stage("draw_object", Stage::Geometry, "call start first")?;
        // Stage invariant: the camera is set while a frame is open.
        let Some(camera) = self.camera.clone() else {
            return Err(RenderError::OutOfOrder {
                operation: "draw_object",
                stage: self.stage.name(),
                expected: "call start first",
            });
        };
        match object.variant() {
            ShadingVariant::Lit => self.rasterizer.draw_lit(&camera, object, &mut self.gbuffer),
            ShadingVariant::Unlit => {
                self.rasterizer
                    .draw_unlit(&camera, object, &mut self.gbuffer, &mut self.target);
            }
        }
        Ok(())
    }

    /// Run the point-light subpass over every covered pixel
    ///
    /// The light set is snapshotted into its fixed-capacity upload layout;
    /// the per-pixel loop iterates exactly the populated prefix.
    ///
    /// # Errors
    /// Returns [`RenderError::OutOfOrder`] outside the geometry stage.
    pub fn draw_point_lights(&mut self, lights: &PointLightSet) -> Result<(), RenderError> {
        self.expect_stage(
            "draw_point_lights",
            Stage::Geometry,
            "draw geometry before lighting",
        )?;
        let Some(camera) = self.camera.as_ref() else {
            return Err(RenderError::OutOfOrder {
                operation: "draw_point_lights",
                stage: self.stage.name(),
                expected: "call start first",
            });
        };
        let camera_position = camera.world_position();

        let frame_lights = PointLightArrayData::from(lights);
        log::trace!("point-light subpass over {} lights", frame_lights.count);

        // Unpack the upload layout once per frame, not once per pixel.
        let active: Vec<PointLight> = frame_lights.lights[..frame_lights.count as usize]
            .iter()
            .map(|data| PointLight {
                position: Vec3::new(data.position[0], data.position[1], data.position[2]),
                color: Vec3::from(data.color),
                intensity: data.intensity,
            })
            .collect();

        for y in 0..self.gbuffer.height() {
            for x in 0..self.gbuffer.width() {
                let Some(surface) = self.gbuffer.surface_at(x, y) else {
                    continue;
                };
                let mut contribution = Vec3::zeros();
                for light in &active {
                    contribution += shading::point_light_term(&surface, &camera_position, light);
                }
                self.target.accumulate(x, y, &contribution);
            }
        }

        self.stage = Stage::Lighting;
        Ok(())
    }

    /// Run the ambient subpass over every covered pixel
    ///
    /// Reads only the albedo attachment.
    ///
    /// # Errors
    /// Returns [`RenderError::OutOfOrder`] unless the point-light subpass
    /// just ran.
    pub fn draw_ambient(&mut self, ambient: &AmbientLight) -> Result<(), RenderError> {
        self.expect_stage(
            "draw_ambient",
            Stage::Lighting,
            "run the point-light subpass first",
        )?;

        for y in 0..self.gbuffer.height() {
            for x in 0..self.gbuffer.width() {
                if self.gbuffer.surface_at(x, y).is_none() {
                    continue;
                }
                let term = shading::ambient_term(&self.gbuffer.albedo_at(x, y), ambient);
                self.target.accumulate(x, y, &term);
            }
        }

        self.stage = Stage::Ambient;
        Ok(())
    }

    /// Finish the frame and hand back the color target
    ///
    /// # Errors
    /// Returns [`RenderError::OutOfOrder`] unless both lighting subpasses
    /// ran.
    pub fn finish(&mut self) -> Result<&RenderTarget, RenderError> {
        self.expect_stage("finish", Stage::Ambient, "run both lighting subpasses first")?;
        self.camera = None;
        self.stage = Stage::Idle;
        Ok(&self.target)
    }

    /// The color target of the most recent frame
    pub fn target(&self) -> &RenderTarget {
        &self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::utils::deg_to_rad;
    use crate::geometry::shapes;
    use crate::geometry::vertex::VertexStream;
    use crate::scene::transform::ModelTransform;
    use approx::assert_relative_eq;

    const SIZE: u32 = 16;

    fn camera() -> Camera {
        Camera::look_at(
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
            deg_to_rad(60.0),
            1.0,
            0.1,
            100.0,
        )
        .unwrap()
    }

    fn quad_object() -> MeshObject {
        let stream = VertexStream::structured(shapes::quad([0.9, 0.4, 0.2])).unwrap();
        MeshObject::lit(stream, ModelTransform::identity(), 0.5, 32.0).unwrap()
    }

    fn scene_lights() -> (PointLightSet, AmbientLight) {
        let light =
            PointLight::new(Vec3::new(0.5, 0.5, 1.5), Vec3::new(1.0, 1.0, 1.0), 2.0).unwrap();
        let lights = PointLightSet::from_slice(&[light]).unwrap();
        let ambient = AmbientLight::new(Vec3::new(1.0, 1.0, 1.0), 0.1).unwrap();
        (lights, ambient)
    }

    fn render_frame(renderer: &mut DeferredRenderer) -> RenderTarget {
        let camera = camera();
        let (lights, ambient) = scene_lights();
        renderer.start(&camera, &Vec3::zeros()).unwrap();
        renderer.draw_object(&quad_object()).unwrap();
        renderer.draw_point_lights(&lights).unwrap();
        renderer.draw_ambient(&ambient).unwrap();
        renderer.finish().unwrap().clone()
    }

    #[test]
    fn zero_sized_targets_are_rejected() {
        assert!(matches!(
            DeferredRenderer::new(0, 16),
            Err(PipelineError::EmptyTarget { .. })
        ));
    }

    #[test]
    fn operations_out_of_protocol_order_are_rejected() {
        let mut renderer = DeferredRenderer::new(SIZE, SIZE).unwrap();
        let (lights, ambient) = scene_lights();

        assert!(matches!(
            renderer.draw_object(&quad_object()),
            Err(RenderError::OutOfOrder { operation: "draw_object", .. })
        ));

        renderer.start(&camera(), &Vec3::zeros()).unwrap();
        // Ambient before the point-light subpass.
        assert!(matches!(
            renderer.draw_ambient(&ambient),
            Err(RenderError::OutOfOrder { operation: "draw_ambient", .. })
        ));
        // Finishing with lighting still pending.
        assert!(matches!(
            renderer.finish(),
            Err(RenderError::OutOfOrder { operation: "finish", .. })
        ));
        // Starting again mid-frame.
        assert!(matches!(
            renderer.start(&camera(), &Vec3::zeros()),
            Err(RenderError::OutOfOrder { operation: "start", .. })
        ));

        renderer.draw_point_lights(&lights).unwrap();
        // Geometry after lighting has begun.
        assert!(matches!(
            renderer.draw_object(&quad_object()),
            Err(RenderError::OutOfOrder { operation: "draw_object", .. })
        ));
        renderer.draw_ambient(&ambient).unwrap();
        renderer.finish().unwrap();
    }

    #[test]
    fn subpasses_sum_to_single_pass_shading() {
        let mut renderer = DeferredRenderer::new(SIZE, SIZE).unwrap();
        let target = render_frame(&mut renderer);

        let camera = camera();
        let (lights, ambient) = scene_lights();
        let center = SIZE / 2;
        let surface = renderer
            .gbuffer
            .surface_at(center, center)
            .expect("quad covers the center");
        let expected = shading::shade(&surface, &camera.world_position(), &lights, &ambient);

        let [r, g, b, _] = target.pixel(center, center);
        assert_relative_eq!(r, expected.x, epsilon = 1e-4);
        assert_relative_eq!(g, expected.y, epsilon = 1e-4);
        assert_relative_eq!(b, expected.z, epsilon = 1e-4);
    }

    #[test]
    fn background_pixels_keep_the_clear_color() {
        let mut renderer = DeferredRenderer::new(SIZE, SIZE).unwrap();
        let camera = camera();
        let (lights, ambient) = scene_lights();
        let clear = Vec3::new(0.1, 0.2, 0.3);

        renderer.start(&camera, &clear).unwrap();
        renderer.draw_object(&quad_object()).unwrap();
        renderer.draw_point_lights(&lights).unwrap();
        renderer.draw_ambient(&ambient).unwrap();
        let target = renderer.finish().unwrap();

        let [r, g, b, _] = target.pixel(0, 0);
        assert_eq!((r, g, b), (0.1, 0.2, 0.3));
    }

    #[test]
    fn unlit_color_passes_through_lighting_unchanged() {
        let mut renderer = DeferredRenderer::new(SIZE, SIZE).unwrap();
        let camera = camera();
        let (lights, ambient) = scene_lights();

        let stream = VertexStream::structured(shapes::quad([0.3, 0.6, 0.9])).unwrap();
        let unlit = MeshObject::unlit(stream, ModelTransform::identity());

        renderer.start(&camera, &Vec3::zeros()).unwrap();
        renderer.draw_object(&unlit).unwrap();
        renderer.draw_point_lights(&lights).unwrap();
        renderer.draw_ambient(&ambient).unwrap();
        let target = renderer.finish().unwrap();

        let center = SIZE / 2;
        let [r, g, b, _] = target.pixel(center, center);
        assert_relative_eq!(r, 0.3, epsilon = 1e-5);
        assert_relative_eq!(g, 0.6, epsilon = 1e-5);
        assert_relative_eq!(b, 0.9, epsilon = 1e-5);
    }

    #[test]
    fn unlit_geometry_occluding_lit_geometry_stays_unlit() {
        let mut renderer = DeferredRenderer::new(SIZE, SIZE).unwrap();
        let camera = camera();
        let (lights, ambient) = scene_lights();

        // Lit quad behind, unlit quad in front: the hidden lit surface
        // must not bleed its lighting onto the unlit pixels.
        let lit_stream = VertexStream::structured(shapes::quad([0.9, 0.4, 0.2])).unwrap();
        let lit = MeshObject::lit(
            lit_stream,
            ModelTransform::from_matrix(crate::foundation::math::Mat4::new_translation(
                &Vec3::new(0.0, 0.0, -0.5),
            ))
            .unwrap(),
            0.5,
            32.0,
        )
        .unwrap();
        let unlit_stream = VertexStream::structured(shapes::quad([0.3, 0.6, 0.9])).unwrap();
        let unlit = MeshObject::unlit(
            unlit_stream,
            ModelTransform::from_matrix(crate::foundation::math::Mat4::new_translation(
                &Vec3::new(0.0, 0.0, 0.5),
            ))
            .unwrap(),
        );

        renderer.start(&camera, &Vec3::zeros()).unwrap();
        renderer.draw_object(&lit).unwrap();
        renderer.draw_object(&unlit).unwrap();
        renderer.draw_point_lights(&lights).unwrap();
        renderer.draw_ambient(&ambient).unwrap();
        let target = renderer.finish().unwrap();

        let center = SIZE / 2;
        let [r, g, b, _] = target.pixel(center, center);
        assert_relative_eq!(r, 0.3, epsilon = 1e-5);
        assert_relative_eq!(g, 0.6, epsilon = 1e-5);
        assert_relative_eq!(b, 0.9, epsilon = 1e-5);
    }

    #[test]
    fn identical_frames_are_deterministic() {
        let mut first = DeferredRenderer::new(SIZE, SIZE).unwrap();
        let mut second = DeferredRenderer::new(SIZE, SIZE).unwrap();
        assert_eq!(render_frame(&mut first), render_frame(&mut second));
    }
}
