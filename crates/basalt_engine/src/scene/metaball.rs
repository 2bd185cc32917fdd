//! Metaballs: the implicit-surface primitives of the ray-marched pipeline
//!
//! A metaball is a sphere that blends smoothly with its neighbors when the
//! distance field is evaluated. Like the point lights, the field is a
//! fixed-capacity array with an explicit active count so the per-pixel
//! march never touches a growable container.

use crate::foundation::math::Vec3;
use crate::scene::SceneError;

/// Maximum number of metaballs active in one frame
pub const MAX_METABALLS: usize = 1024;

/// A single metaball
///
/// Degenerate radii are rejected here, at scene-build time, so the
/// distance field never has to guard against them per march step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metaball {
    position: Vec3,
    color: Vec3,
    radius: f32,
}

impl Default for Metaball {
    fn default() -> Self {
        // Inactive slot filler; the active count keeps these out of the field.
        Self {
            position: Vec3::zeros(),
            color: Vec3::new(1.0, 1.0, 1.0),
            radius: 1.0,
        }
    }
}

impl Metaball {
    /// Create a metaball
    ///
    /// # Errors
    /// Returns [`SceneError::DegenerateRadius`] if `radius <= 0`.
    pub fn new(position: Vec3, color: Vec3, radius: f32) -> Result<Self, SceneError> {
        if radius <= 0.0 {
            return Err(SceneError::DegenerateRadius(radius));
        }
        Ok(Self {
            position,
            color,
            radius,
        })
    }

    /// Move the metaball
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// World-space center
    pub fn position(&self) -> &Vec3 {
        &self.position
    }

    /// Surface color
    pub fn color(&self) -> &Vec3 {
        &self.color
    }

    /// Sphere radius, always positive
    pub fn radius(&self) -> f32 {
        self.radius
    }
}

/// Fixed-capacity metaball array with an explicit active count
#[derive(Debug, Clone)]
pub struct MetaballField {
    balls: Box<[Metaball; MAX_METABALLS]>,
    count: usize,
}

impl Default for MetaballField {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaballField {
    /// Create an empty field
    pub fn new() -> Self {
        Self {
            balls: Box::new([Metaball::default(); MAX_METABALLS]),
            count: 0,
        }
    }

    /// Build a field from a slice of metaballs
    ///
    /// # Errors
    /// Returns [`SceneError::CapacityExceeded`] if the slice holds more
    /// than [`MAX_METABALLS`] entries.
    pub fn from_slice(balls: &[Metaball]) -> Result<Self, SceneError> {
        let mut field = Self::new();
        for ball in balls {
            field.push(*ball)?;
        }
        Ok(field)
    }

    /// Add a metaball to the field
    ///
    /// # Errors
    /// Returns [`SceneError::CapacityExceeded`] once the fixed capacity is
    /// reached.
    pub fn push(&mut self, ball: Metaball) -> Result<(), SceneError> {
        if self.count == MAX_METABALLS {
            return Err(SceneError::CapacityExceeded {
                kind: "metaball field",
                max: MAX_METABALLS,
            });
        }
        self.balls[self.count] = ball;
        self.count += 1;
        Ok(())
    }

    /// Mutable access to an active metaball (for per-frame animation)
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Metaball> {
        if index < self.count {
            Some(&mut self.balls[index])
        } else {
            None
        }
    }

    /// Number of active metaballs
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the field holds no active metaballs
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The active metaballs as a slice
    pub fn active(&self) -> &[Metaball] {
        &self.balls[..self.count]
    }
}
