//! Light sources: bounded point-light set and the per-frame ambient light
//!
//! Point lights live in a fixed-capacity array with an explicit active
//! count rather than a growable container; the per-pixel lighting loop
//! iterates a bounded slice and never allocates. Capacity is validated at
//! the boundary, when the set is built.

use crate::foundation::math::{Vec3, Vec4};
use crate::scene::SceneError;

/// Maximum number of point lights active in one frame
pub const MAX_POINT_LIGHTS: usize = 16;

/// A point light radiating in all directions from a world-space position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// World-space position
    pub position: Vec3,
    /// RGB color
    pub color: Vec3,
    /// Intensity multiplier, >= 0
    pub intensity: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 0.0,
        }
    }
}

impl PointLight {
    /// Create a point light
    ///
    /// # Errors
    /// Returns [`SceneError::NegativeIntensity`] if `intensity < 0`.
    pub fn new(position: Vec3, color: Vec3, intensity: f32) -> Result<Self, SceneError> {
        if intensity < 0.0 {
            return Err(SceneError::NegativeIntensity(intensity));
        }
        Ok(Self {
            position,
            color,
            intensity,
        })
    }

    /// The position as a homogeneous point (w = 1)
    pub fn homogeneous_position(&self) -> Vec4 {
        self.position.push(1.0)
    }
}

/// Ambient light applied uniformly to every lit pixel
///
/// Singleton per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    /// RGB color
    pub color: Vec3,
    /// Intensity multiplier, >= 0
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 0.0,
        }
    }
}

impl AmbientLight {
    /// Create an ambient light
    ///
    /// # Errors
    /// Returns [`SceneError::NegativeIntensity`] if `intensity < 0`.
    pub fn new(color: Vec3, intensity: f32) -> Result<Self, SceneError> {
        if intensity < 0.0 {
            return Err(SceneError::NegativeIntensity(intensity));
        }
        Ok(Self { color, intensity })
    }
}

/// Fixed-capacity point-light array with an explicit active count
#[derive(Debug, Clone)]
pub struct PointLightSet {
    lights: [PointLight; MAX_POINT_LIGHTS],
    count: usize,
}

impl Default for PointLightSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PointLightSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            lights: [PointLight::default(); MAX_POINT_LIGHTS],
            count: 0,
        }
    }

    /// Build a set from a slice of lights
    ///
    /// # Errors
    /// Returns [`SceneError::CapacityExceeded`] if the slice holds more
    /// than [`MAX_POINT_LIGHTS`] entries.
    pub fn from_slice(lights: &[PointLight]) -> Result<Self, SceneError> {
        let mut set = Self::new();
        for light in lights {
            set.push(*light)?;
        }
        Ok(set)
    }

    /// Add a light to the set
    ///
    /// # Errors
    /// Returns [`SceneError::CapacityExceeded`] once the fixed capacity is
    /// reached.
    pub fn push(&mut self, light: PointLight) -> Result<(), SceneError> {
        if self.count == MAX_POINT_LIGHTS {
            return Err(SceneError::CapacityExceeded {
                kind: "point light set",
                max: MAX_POINT_LIGHTS,
            });
        }
        self.lights[self.count] = light;
        self.count += 1;
        Ok(())
    }

    /// Number of active lights
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the set holds no active lights
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The active lights as a slice
    pub fn active(&self) -> &[PointLight] {
        &self.lights[..self.count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_intensity_is_rejected() {
        let result = PointLight::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), -1.0);
        assert_eq!(result.unwrap_err(), SceneError::NegativeIntensity(-1.0));
        assert!(AmbientLight::new(Vec3::zeros(), -0.5).is_err());
    }

    #[test]
    fn set_capacity_is_enforced() {
        let light = PointLight::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), 1.0).unwrap();
        let mut set = PointLightSet::new();
        for _ in 0..MAX_POINT_LIGHTS {
            set.push(light).expect("within capacity");
        }
        assert_eq!(set.len(), MAX_POINT_LIGHTS);
        assert_eq!(
            set.push(light).unwrap_err(),
            SceneError::CapacityExceeded {
                kind: "point light set",
                max: MAX_POINT_LIGHTS,
            }
        );
    }

    #[test]
    fn active_slice_tracks_the_count() {
        let light = PointLight::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 0.0, 0.0), 2.0)
            .unwrap();
        let set = PointLightSet::from_slice(&[light, light]).unwrap();
        assert_eq!(set.active().len(), 2);
        assert_eq!(set.active()[1].position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn homogeneous_position_has_unit_w() {
        let light = PointLight::new(Vec3::new(4.0, 5.0, 6.0), Vec3::zeros(), 1.0).unwrap();
        assert_eq!(light.homogeneous_position().w, 1.0);
    }
}
