//! Signed-distance-field evaluation and sphere tracing
//!
//! The implicit geometry evaluator: the scene's distance field is the
//! smooth-minimum blend of every active metaball's sphere distance, and a
//! ray is traced by repeatedly stepping forward by the field value until
//! it lands within the hit threshold or leaves the trace range.
//!
//! Running out of iterations is a defined miss, not an error: the
//! iteration cap bounds work per pixel, and "no surface" is a valid
//! answer.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Vec3};
use crate::geometry::GeometryError;
use crate::scene::metaball::MetaballField;

/// Field value reported for an empty metaball field
///
/// Large enough that any march immediately exceeds its maximum trace
/// distance: an empty scene is always a miss.
pub const EMPTY_FIELD_DISTANCE: f32 = 1.0e9;

/// Tunable parameters of the sphere tracer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarchSettings {
    /// Distance below which the ray is considered to have hit the surface
    pub hit_threshold: f32,
    /// Total travel distance beyond which the march reports a miss
    pub max_distance: f32,
    /// Iteration cap; exhausting it is a miss, never an error
    pub max_steps: u32,
    /// Smooth-minimum blend factor between overlapping metaballs
    pub blend: f32,
    /// Step size for central-difference normal estimation
    pub normal_step: f32,
}

impl MarchSettings {
    /// Check every tunable is inside its usable range
    ///
    /// The distances and the blend factor must be finite and positive (a
    /// non-positive blend would divide by zero inside `smin`), and the
    /// iteration cap must be non-zero. Run at pipeline build, before any
    /// pixel work.
    ///
    /// # Errors
    /// Returns [`GeometryError::InvalidMarchSetting`] naming the first
    /// offending field.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let positive = [
            ("hit_threshold", self.hit_threshold),
            ("max_distance", self.max_distance),
            ("blend", self.blend),
            ("normal_step", self.normal_step),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(GeometryError::InvalidMarchSetting { name, value });
            }
        }
        if self.max_steps == 0 {
            return Err(GeometryError::InvalidMarchSetting {
                name: "max_steps",
                value: 0.0,
            });
        }
        Ok(())
    }
}

impl Default for MarchSettings {
    fn default() -> Self {
        Self {
            hit_threshold: 0.01,
            max_distance: 50.0,
            max_steps: 100,
            blend: 0.5,
            normal_step: 0.001,
        }
    }
}

/// A surface point found by the sphere tracer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space surface point
    pub position: Vec3,
    /// Distance traveled from the ray origin
    pub distance: f32,
}

/// Polynomial smooth minimum
///
/// Blends two distance values into a seamless union instead of a hard
/// `min`. Commutative; the result is at most `min(a, b)` and at least
/// `min(a, b) - k / 4`.
pub fn smin(a: f32, b: f32, k: f32) -> f32 {
    let h = utils::clamp(0.5 + 0.5 * (a - b) / k, 0.0, 1.0);
    utils::lerp(a, b, h) - k * h * (1.0 - h)
}

/// Signed distance from `point` to a sphere surface
pub fn sphere_distance(point: &Vec3, center: &Vec3, radius: f32) -> f32 {
    (point - center).norm() - radius
}

/// Evaluate the blended scene distance field at a point
///
/// Zero active metaballs yields [`EMPTY_FIELD_DISTANCE`], so the march
/// always misses. The fold is seeded from the first ball's own distance;
/// the sentinel never enters `smin`, whose f32 interpolation would
/// otherwise swallow the real distance in the sentinel's rounding
/// granularity.
pub fn scene_distance(field: &MetaballField, point: &Vec3, blend: f32) -> f32 {
    let mut balls = field.active().iter();
    let Some(first) = balls.next() else {
        return EMPTY_FIELD_DISTANCE;
    };
    let mut distance = sphere_distance(point, first.position(), first.radius());
    for ball in balls {
        let ball_distance = sphere_distance(point, ball.position(), ball.radius());
        distance = smin(distance, ball_distance, blend);
    }
    distance
}

/// Evaluate the blended surface color at a point
///
/// Colors are mixed with the same interpolation weights `smin` applies to
/// the distances, so color transitions track the geometric blending.
pub fn scene_albedo(field: &MetaballField, point: &Vec3, blend: f32) -> Vec3 {
    let mut balls = field.active().iter();
    let Some(first) = balls.next() else {
        return Vec3::new(1.0, 1.0, 1.0);
    };
    let mut distance = sphere_distance(point, first.position(), first.radius());
    let mut color = *first.color();
    for ball in balls {
        let ball_distance = sphere_distance(point, ball.position(), ball.radius());
        let h = utils::clamp(0.5 + 0.5 * (distance - ball_distance) / blend, 0.0, 1.0);
        color = color.lerp(ball.color(), h);
        distance = smin(distance, ball_distance, blend);
    }
    color
}

/// Sphere tracer over a metaball field
///
/// Selected once per pipeline build; `march` is invoked per pixel by the
/// marching orchestrator.
#[derive(Debug, Clone, Default)]
pub struct RayMarcher {
    settings: MarchSettings,
}

impl RayMarcher {
    /// Create a tracer with the given settings
    pub fn new(settings: MarchSettings) -> Self {
        Self { settings }
    }

    /// The tracer's tunables
    pub fn settings(&self) -> &MarchSettings {
        &self.settings
    }

    /// Trace a ray through the field
    ///
    /// `direction` must be unit length. Returns `None` on a miss: the ray
    /// either traveled past the maximum trace distance or exhausted the
    /// iteration cap.
    pub fn march(&self, field: &MetaballField, origin: &Vec3, direction: &Vec3) -> Option<RayHit> {
        let mut traveled = 0.0_f32;
        for _ in 0..self.settings.max_steps {
            let point = origin + direction * traveled;
            let distance = scene_distance(field, &point, self.settings.blend);
            if distance < self.settings.hit_threshold {
                return Some(RayHit {
                    position: point,
                    distance: traveled,
                });
            }
            traveled += distance;
            if traveled > self.settings.max_distance {
                return None;
            }
        }
        None
    }

    /// Estimate the surface normal at a hit point
    ///
    /// Central finite differences of the distance field along each axis.
    /// `incoming` is the ray direction, used as an orientation fallback if
    /// the gradient degenerates to zero.
    pub fn surface_normal(&self, field: &MetaballField, point: &Vec3, incoming: &Vec3) -> Vec3 {
        let step = self.settings.normal_step;
        let blend = self.settings.blend;
        let gradient = Vec3::new(
            scene_distance(field, &(point + Vec3::new(step, 0.0, 0.0)), blend)
                - scene_distance(field, &(point - Vec3::new(step, 0.0, 0.0)), blend),
            scene_distance(field, &(point + Vec3::new(0.0, step, 0.0)), blend)
                - scene_distance(field, &(point - Vec3::new(0.0, step, 0.0)), blend),
            scene_distance(field, &(point + Vec3::new(0.0, 0.0, step)), blend)
                - scene_distance(field, &(point - Vec3::new(0.0, 0.0, step)), blend),
        );
        gradient
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| -incoming)
    }
}
