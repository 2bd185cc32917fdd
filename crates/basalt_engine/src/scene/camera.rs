//! 3D camera with view/projection matrices and ray reconstruction
//!
//! The camera owns exactly the data both pipelines need: a world-to-camera
//! view matrix and a camera-to-clip projection matrix. The mesh pipeline
//! consumes them as-is for vertex transformation; the ray-marched pipeline
//! reconstructs world-space rays per pixel from the inverse view.
//!
//! # Coordinate System
//! View space is right-handed, Y-up, with the camera looking down -Z. The
//! camera-space ray for a pixel at NDC (x, y) is therefore
//! `(x / p00, y / p11, -1)`: the depth component is negative because that
//! is where the camera faces, and the projection's focal terms scale the
//! NDC so the marched image's field of view matches the rasterized one.

use crate::foundation::math::{Mat3, Mat4, Mat4Ext, Vec3};
use crate::scene::SceneError;

/// Camera for both the deferred and the ray-marched pipeline
///
/// Updated once per frame by an external controller; read-only to the
/// rendering core. Construction validates that the view matrix is
/// invertible, since both lighting (for the specular view vector) and ray
/// marching (for ray origins) reconstruct the camera's world position from
/// the inverse view.
#[derive(Debug, Clone)]
pub struct Camera {
    view: Mat4,
    projection: Mat4,
    inverse_view: Mat4,
}

impl Camera {
    /// Create a camera from explicit view and projection matrices
    ///
    /// # Errors
    /// Returns [`SceneError::SingularViewMatrix`] if `view` cannot be
    /// inverted.
    pub fn new(view: Mat4, projection: Mat4) -> Result<Self, SceneError> {
        let inverse_view = view.try_inverse().ok_or(SceneError::SingularViewMatrix)?;
        Ok(Self {
            view,
            projection,
            inverse_view,
        })
    }

    /// Create a perspective camera looking from `eye` toward `target`
    ///
    /// * `fov_y`: vertical field of view in radians
    /// * `aspect`: viewport width / height
    /// * `near` / `far`: clipping plane distances
    ///
    /// # Errors
    /// Returns [`SceneError::SingularViewMatrix`] if `eye` and `target`
    /// coincide (the look-at matrix degenerates).
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Result<Self, SceneError> {
        let view = Mat4::look_at(eye, target, up);
        if !view.iter().all(|component| component.is_finite()) {
            return Err(SceneError::SingularViewMatrix);
        }
        let projection = Mat4::perspective(fov_y, aspect, near, far);
        Self::new(view, projection)
    }

    /// The world-to-camera view matrix
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// The camera-to-clip projection matrix
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// The combined projection * view matrix applied before the model matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// The camera's world-space position
    ///
    /// Reconstructed from the inverse view matrix's translation column;
    /// used by the specular term and as the ray-march origin.
    pub fn world_position(&self) -> Vec3 {
        self.inverse_view.column(3).xyz()
    }

    /// The camera-to-world rotational basis (upper 3x3 of the inverse view)
    pub fn world_basis(&self) -> Mat3 {
        self.inverse_view.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Reconstruct the world-space ray direction through an NDC coordinate
    ///
    /// `ndc` components are in [-1, 1] with Y up. The returned direction is
    /// unit length.
    pub fn ray_direction(&self, ndc_x: f32, ndc_y: f32) -> Vec3 {
        let camera_ray = Vec3::new(
            ndc_x / self.projection[(0, 0)],
            ndc_y / self.projection[(1, 1)],
            -1.0,
        );
        (self.world_basis() * camera_ray).normalize()
    }
}
