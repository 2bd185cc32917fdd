//! Per-object model transform and its derived normal matrix
//!
//! Each renderable object carries an object-to-world model matrix paired
//! with the inverse-transpose normal matrix the geometry subpass needs for
//! world-space normals. The pair is kept consistent here so draw code can
//! never read a stale normal matrix.

use crate::foundation::math::{normal_matrix, Mat4, Transform, Vec3};
use crate::scene::SceneError;

/// Model matrix + derived normal matrix for one renderable object
///
/// Created per object at scene-build time; may be mutated between frames
/// (animation), never mid-frame. Mutation re-derives the normal matrix
/// immediately, which is also where a singular model matrix is rejected.
#[derive(Debug, Clone)]
pub struct ModelTransform {
    model: Mat4,
    normals: Mat4,
}

impl ModelTransform {
    /// Create from an explicit model matrix
    ///
    /// # Errors
    /// Returns [`SceneError::SingularModelMatrix`] if the inverse-transpose
    /// cannot be derived.
    pub fn from_matrix(model: Mat4) -> Result<Self, SceneError> {
        let normals = normal_matrix(&model).ok_or(SceneError::SingularModelMatrix)?;
        Ok(Self { model, normals })
    }

    /// Create from a position/rotation/scale transform
    ///
    /// # Errors
    /// Returns [`SceneError::SingularModelMatrix`] if any scale component
    /// is zero.
    pub fn from_transform(transform: &Transform) -> Result<Self, SceneError> {
        Self::from_matrix(transform.to_matrix())
    }

    /// Identity transform (object space is world space)
    pub fn identity() -> Self {
        Self {
            model: Mat4::identity(),
            normals: Mat4::identity(),
        }
    }

    /// Replace the model matrix, re-deriving the normal matrix
    ///
    /// # Errors
    /// Returns [`SceneError::SingularModelMatrix`] if the new matrix is
    /// singular; the previous state is left untouched in that case.
    pub fn set_matrix(&mut self, model: Mat4) -> Result<(), SceneError> {
        let normals = normal_matrix(&model).ok_or(SceneError::SingularModelMatrix)?;
        self.model = model;
        self.normals = normals;
        Ok(())
    }

    /// The object-to-world model matrix
    pub fn model(&self) -> &Mat4 {
        &self.model
    }

    /// The inverse-transpose normal matrix
    pub fn normals(&self) -> &Mat4 {
        &self.normals
    }

    /// Transform a local-space position to world space
    pub fn world_position(&self, local: &Vec3) -> Vec3 {
        self.model.transform_point(&(*local).into()).coords
    }

    /// Transform a local-space normal to (unnormalized) world space
    pub fn world_normal(&self, local: &Vec3) -> Vec3 {
        self.normals.transform_vector(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn singular_model_matrix_is_rejected() {
        let flattened = Mat4::new_nonuniform_scaling(&Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(
            ModelTransform::from_matrix(flattened).unwrap_err(),
            SceneError::SingularModelMatrix
        );
    }

    #[test]
    fn world_normal_stays_perpendicular_under_nonuniform_scale() {
        let transform = ModelTransform::from_transform(&Transform::from_position_scale(
            Vec3::zeros(),
            Vec3::new(3.0, 1.0, 0.5),
        ))
        .expect("non-degenerate scale");

        // Surface in the XZ plane: tangent along X, normal along Y.
        let tangent = transform.model().transform_vector(&Vec3::new(1.0, 0.0, 0.0));
        let normal = transform.world_normal(&Vec3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(tangent.dot(&normal), 0.0, epsilon = EPSILON);
    }

    #[test]
    fn set_matrix_keeps_the_pair_consistent() {
        let mut transform = ModelTransform::identity();
        let model = Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 2.0, 2.0));
        transform.set_matrix(model).expect("invertible");

        // Inverse-transpose of a uniform scale is the reciprocal scale.
        let normal = transform.world_normal(&Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(normal, Vec3::new(0.0, 0.0, 0.5), epsilon = EPSILON);
    }
}
