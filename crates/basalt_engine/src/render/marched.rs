//! The ray-marched metaball pipeline
//!
//! A single full-screen subpass: every pixel reconstructs its world-space
//! ray from the camera, sphere-traces the metaball field, and shades the
//! hit inline with the same lighting accumulator the deferred pipeline
//! uses. Misses keep the clear color; they are an expected outcome of the
//! march, not a failure.
//!
//! Pixel centers sit at half-integer coordinates and screen Y grows
//! downward, so the NDC Y is flipped when the ray is built.

use crate::foundation::math::Vec3;
use crate::geometry::sdf::{scene_albedo, MarchSettings, RayMarcher};
use crate::render::attachments::RenderTarget;
use crate::render::pass::{marched_schedule, PassSchedule};
use crate::render::shading::{self, SurfaceAttributes};
use crate::render::{PipelineError, RenderError};
use crate::scene::camera::Camera;
use crate::scene::lighting::{AmbientLight, PointLightSet};
use crate::scene::metaball::MetaballField;
use crate::scene::SceneError;

/// Ray-marched renderer over a metaball field
///
/// Owns its color target; one instance renders any number of frames at a
/// fixed resolution. The metaball surface is a single implicit material,
/// so the specular parameters live on the renderer rather than per ball.
#[derive(Debug)]
pub struct MarchedRenderer {
    schedule: PassSchedule,
    marcher: RayMarcher,
    target: RenderTarget,
    specular_intensity: f32,
    shininess: f32,
}

impl MarchedRenderer {
    /// Create a renderer for the given resolution and march settings
    ///
    /// # Errors
    /// Returns [`PipelineError::EmptyTarget`] for zero-sized dimensions and
    /// [`crate::geometry::GeometryError::InvalidMarchSetting`] for tracer
    /// tunables outside their usable range.
    pub fn new(width: u32, height: u32, settings: MarchSettings) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(PipelineError::EmptyTarget { width, height }.into());
        }
        settings.validate()?;
        let schedule = marched_schedule()?;
        log::debug!("marched renderer at {width}x{height}");
        Ok(Self {
            schedule,
            marcher: RayMarcher::new(settings),
            target: RenderTarget::new(width, height),
            specular_intensity: 0.5,
            shininess: 32.0,
        })
    }

    /// The validated subpass schedule this renderer executes
    pub fn schedule(&self) -> &PassSchedule {
        &self.schedule
    }

    /// Replace the implicit surface's specular material
    ///
    /// # Errors
    /// Returns [`SceneError::DegenerateShininess`] unless `shininess` is a
    /// finite positive exponent.
    pub fn set_material(&mut self, specular_intensity: f32, shininess: f32) -> Result<(), SceneError> {
        if !(shininess.is_finite() && shininess > 0.0) {
            return Err(SceneError::DegenerateShininess(shininess));
        }
        self.specular_intensity = specular_intensity;
        self.shininess = shininess;
        Ok(())
    }

    /// Render one frame of the field
    ///
    /// Every pixel either shades a surface hit or keeps `clear_color`.
    pub fn render(
        &mut self,
        camera: &Camera,
        field: &MetaballField,
        lights: &PointLightSet,
        ambient: &AmbientLight,
        clear_color: &Vec3,
    ) -> &RenderTarget {
        let width = self.target.width();
        let height = self.target.height();
        let origin = camera.world_position();
        let blend = self.marcher.settings().blend;

        log::trace!(
            "marching {} metaballs through {width}x{height} pixels",
            field.len()
        );

        self.target.clear(clear_color);
        for y in 0..height {
            for x in 0..width {
                let ndc_x = ((x as f32 + 0.5) / width as f32) * 2.0 - 1.0;
                let ndc_y = 1.0 - ((y as f32 + 0.5) / height as f32) * 2.0;
                let direction = camera.ray_direction(ndc_x, ndc_y);

                let Some(hit) = self.marcher.march(field, &origin, &direction) else {
                    continue;
                };

                let surface = SurfaceAttributes {
                    albedo: scene_albedo(field, &hit.position, blend),
                    normal: self.marcher.surface_normal(field, &hit.position, &direction),
                    position: hit.position,
                    specular_intensity: self.specular_intensity,
                    shininess: self.shininess,
                };
                let color = shading::shade(&surface, &origin, lights, ambient);
                self.target.set(x, y, &color);
            }
        }
        &self.target
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
    use crate::scene::lighting::PointLight;
    use crate::scene::metaball::Metaball;

    const SIZE: u32 = 16;

    fn camera() -> Camera {
        Camera::look_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
            deg_to_rad(60.0),
            1.0,
            0.1,
            100.0,
        )
        .unwrap()
    }

    fn centered_field() -> MetaballField {
        let ball = Metaball::new(Vec3::zeros(), Vec3::new(1.0, 0.2, 0.2), 1.5).unwrap();
        MetaballField::from_slice(&[ball]).unwrap()
    }

    fn scene_lights() -> (PointLightSet, AmbientLight) {
        let light =
            PointLight::new(Vec3::new(2.0, 3.0, 5.0), Vec3::new(1.0, 1.0, 1.0), 20.0).unwrap();
        (
            PointLightSet::from_slice(&[light]).unwrap(),
            AmbientLight::new(Vec3::new(1.0, 1.0, 1.0), 0.1).unwrap(),
        )
    }

    #[test]
    fn zero_sized_targets_are_rejected() {
        assert!(matches!(
            MarchedRenderer::new(16, 0, MarchSettings::default()),
            Err(RenderError::Pipeline(PipelineError::EmptyTarget { .. }))
        ));
    }

    #[test]
    fn unusable_march_settings_are_rejected_at_build() {
        use crate::geometry::GeometryError;

        // A zero blend would divide by zero in the smooth minimum and
        // flood every frame with NaN; the build must refuse it.
        let result = MarchedRenderer::new(
            SIZE,
            SIZE,
            MarchSettings {
                blend: 0.0,
                ..MarchSettings::default()
            },
        );
        assert!(matches!(
            result,
            Err(RenderError::Geometry(
                GeometryError::InvalidMarchSetting { name: "blend", .. }
            ))
        ));

        let result = MarchedRenderer::new(
            SIZE,
            SIZE,
            MarchSettings {
                hit_threshold: f32::NAN,
                ..MarchSettings::default()
            },
        );
        assert!(matches!(
            result,
            Err(RenderError::Geometry(
                GeometryError::InvalidMarchSetting { .. }
            ))
        ));
    }

    #[test]
    fn centered_ball_shades_the_middle_and_misses_the_corners() {
        let mut renderer = MarchedRenderer::new(SIZE, SIZE, MarchSettings::default()).unwrap();
        let (lights, ambient) = scene_lights();
        let clear = Vec3::new(0.05, 0.05, 0.1);

        let target = renderer.render(&camera(), &centered_field(), &lights, &ambient, &clear);

        let center = SIZE / 2;
        let [r, g, b, _] = target.pixel(center, center);
        assert_ne!((r, g, b), (0.05, 0.05, 0.1), "center pixel must be a hit");
        // The ball is red; its lit color keeps red dominant.
        assert!(r > g && r > b);

        let [r, g, b, _] = target.pixel(0, 0);
        assert_eq!((r, g, b), (0.05, 0.05, 0.1), "corner pixel must miss");
    }

    #[test]
    fn empty_field_leaves_only_the_clear_color() {
        let mut renderer = MarchedRenderer::new(SIZE, SIZE, MarchSettings::default()).unwrap();
        let (lights, ambient) = scene_lights();
        let clear = Vec3::new(0.2, 0.0, 0.4);

        let target = renderer.render(&camera(), &MetaballField::new(), &lights, &ambient, &clear);

        for y in 0..SIZE {
            for x in 0..SIZE {
                assert_eq!(target.pixel(x, y), [0.2, 0.0, 0.4, 1.0]);
            }
        }
    }

    #[test]
    fn degenerate_material_is_rejected() {
        let mut renderer = MarchedRenderer::new(SIZE, SIZE, MarchSettings::default()).unwrap();
        assert!(renderer.set_material(1.0, 0.0).is_err());
        assert!(renderer.set_material(1.0, f32::NAN).is_err());
        assert!(renderer.set_material(1.0, 64.0).is_ok());
    }

    #[test]
    fn identical_frames_are_deterministic() {
        let (lights, ambient) = scene_lights();
        let render = || {
            let mut renderer =
                MarchedRenderer::new(SIZE, SIZE, MarchSettings::default()).unwrap();
            renderer
                .render(&camera(), &centered_field(), &lights, &ambient, &Vec3::zeros())
                .clone()
        };
        assert_eq!(render(), render());
    }
}
