//! Phong lighting accumulator
//!
//! The one lighting implementation both geometry evaluators feed. A
//! surface is described by the shared attribute set; whether those
//! attributes were interpolated by the rasterizer or computed by the
//! sphere tracer makes no difference to the result.
//!
//! Attenuation is squared Euclidean distance to the light. Numeric
//! degeneracies (zero-length normals or direction vectors, coincident
//! light and fragment) clamp the affected term to zero instead of
//! producing NaN. No clamping or tone-mapping is applied to the output.

use crate::foundation::math::{utils, Vec3};
use crate::scene::lighting::{AmbientLight, PointLight, PointLightSet};

/// Per-pixel surface description shared by both pipelines
///
/// Produced once per pixel per frame by exactly one geometry evaluator;
/// read-only to the lighting passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceAttributes {
    /// Albedo color
    pub albedo: Vec3,
    /// World-space normal; may be unnormalized as stored
    pub normal: Vec3,
    /// World-space fragment position
    pub position: Vec3,
    /// Specular intensity multiplier
    pub specular_intensity: f32,
    /// Specular shininess exponent
    pub shininess: f32,
}

/// One point light's contribution to a surface point
///
/// `lambertian * color` diffuse plus `specular^shininess` highlight,
/// scaled by the light intensity over the squared distance. A backfacing
/// surface (lambertian <= 0) contributes nothing, specular included.
pub fn point_light_term(surface: &SurfaceAttributes, camera_position: &Vec3, light: &PointLight) -> Vec3 {
    let Some(normal) = surface.normal.try_normalize(f32::EPSILON) else {
        return Vec3::zeros();
    };

    let to_light = light.position - surface.position;
    let distance_squared = to_light.norm_squared();
    let Some(light_dir) = to_light.try_normalize(f32::EPSILON) else {
        // Light sits exactly on the fragment; no defined direction.
        return Vec3::zeros();
    };

    let lambertian = normal.dot(&light_dir).max(0.0);
    if lambertian <= 0.0 {
        return Vec3::zeros();
    }

    let specular = match (camera_position - surface.position).try_normalize(f32::EPSILON) {
        Some(view_dir) => {
            let reflected = utils::reflect(&-light_dir, &normal);
            reflected.dot(&view_dir).max(0.0).powf(surface.shininess)
        }
        None => 0.0,
    };

    (lambertian * light.color + specular * surface.specular_intensity * light.color)
        * (light.intensity / distance_squared)
}

/// The ambient contribution for a surface's albedo
///
/// The ambient subpass reads only the albedo attachment; the ambient
/// light modulates it uniformly.
pub fn ambient_term(albedo: &Vec3, ambient: &AmbientLight) -> Vec3 {
    albedo.component_mul(&ambient.color) * ambient.intensity
}

/// Full shading for one surface point: all point lights plus ambient
///
/// This is what the ray-marched pipeline calls inline per hit; the
/// deferred pipeline computes the same sum spread across its lighting
/// subpasses.
pub fn shade(
    surface: &SurfaceAttributes,
    camera_position: &Vec3,
    lights: &PointLightSet,
    ambient: &AmbientLight,
) -> Vec3 {
    let mut color = Vec3::zeros();
    for light in lights.active() {
        color += point_light_term(surface, camera_position, light);
    }
    color + ambient_term(&surface.albedo, ambient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn facing_surface() -> SurfaceAttributes {
        SurfaceAttributes {
            albedo: Vec3::new(1.0, 1.0, 1.0),
            normal: Vec3::new(0.0, 0.0, 1.0),
            position: Vec3::new(0.0, 0.0, -1.0),
            specular_intensity: 0.0,
            shininess: 16.0,
        }
    }

    #[test]
    fn no_lights_and_zero_ambient_is_black() {
        let surface = facing_surface();
        let color = shade(
            &surface,
            &Vec3::zeros(),
            &PointLightSet::new(),
            &AmbientLight::default(),
        );
        assert_eq!(color, Vec3::zeros());
    }

    #[test]
    fn backfacing_surface_gets_no_specular_regardless_of_shininess() {
        let mut surface = facing_surface();
        surface.specular_intensity = 10.0;
        for shininess in [0.5, 1.0, 64.0, 1024.0] {
            surface.shininess = shininess;
            // Light behind the surface.
            let light =
                PointLight::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(1.0, 1.0, 1.0), 1.0).unwrap();
            let term = point_light_term(&surface, &Vec3::zeros(), &light);
            assert_eq!(term, Vec3::zeros());
        }
    }

    #[test]
    fn head_on_quad_is_fully_lit() {
        // Quad at Z=-1 facing +Z, white light at the origin, intensity 1.
        // light_dir = (0,0,1), lambertian = 1, distance^2 = 1, specular
        // intensity 0, so the accumulated color is exactly (1,1,1).
        let surface = facing_surface();
        let light = PointLight::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), 1.0).unwrap();
        let lights = PointLightSet::from_slice(&[light]).unwrap();
        let color = shade(&surface, &Vec3::zeros(), &lights, &AmbientLight::default());
        assert_relative_eq!(color, Vec3::new(1.0, 1.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn attenuation_is_squared_distance() {
        let surface = facing_surface();
        // Light 3 units along the normal: lambertian = 1, distance^2 = 9.
        let light =
            PointLight::new(Vec3::new(0.0, 0.0, 2.0), Vec3::new(1.0, 1.0, 1.0), 1.0).unwrap();
        let term = point_light_term(&surface, &Vec3::zeros(), &light);
        assert_relative_eq!(term, Vec3::new(1.0, 1.0, 1.0) / 9.0, epsilon = EPSILON);
    }

    #[test]
    fn degenerate_vectors_clamp_to_zero_instead_of_nan() {
        let mut surface = facing_surface();
        surface.normal = Vec3::zeros();
        let light = PointLight::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 1.0, 1.0), 1.0).unwrap();
        assert_eq!(point_light_term(&surface, &Vec3::zeros(), &light), Vec3::zeros());

        // Light exactly on the fragment.
        let surface = facing_surface();
        let coincident =
            PointLight::new(surface.position, Vec3::new(1.0, 1.0, 1.0), 1.0).unwrap();
        let term = point_light_term(&surface, &Vec3::zeros(), &coincident);
        assert!(term.iter().all(|c| c.is_finite()));
        assert_eq!(term, Vec3::zeros());

        // Camera exactly on the fragment: diffuse survives, specular is zero.
        let mut shiny = facing_surface();
        shiny.specular_intensity = 5.0;
        let light = PointLight::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 1.0, 1.0), 1.0).unwrap();
        let term = point_light_term(&shiny, &shiny.position.clone(), &light);
        assert!(term.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn ambient_reads_albedo() {
        let ambient = AmbientLight::new(Vec3::new(1.0, 0.5, 0.25), 0.4).unwrap();
        let term = ambient_term(&Vec3::new(0.5, 1.0, 0.0), &ambient);
        assert_relative_eq!(term, Vec3::new(0.2, 0.2, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn shade_sums_lights_additively() {
        let surface = facing_surface();
        let light = PointLight::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 1.0, 1.0), 1.0).unwrap();
        let one = shade(
            &surface,
            &Vec3::zeros(),
            &PointLightSet::from_slice(&[light]).unwrap(),
            &AmbientLight::default(),
        );
        let two = shade(
            &surface,
            &Vec3::zeros(),
            &PointLightSet::from_slice(&[light, light]).unwrap(),
            &AmbientLight::default(),
        );
        assert_relative_eq!(two, one * 2.0, epsilon = EPSILON);
    }
}
