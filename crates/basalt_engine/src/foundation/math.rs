//! Math utilities and types
//!
//! Provides fundamental math types for 3D rendering, built on nalgebra.
//!
//! # Coordinate System
//! The engine uses a right-handed, Y-up coordinate system in view space:
//! - X+ = Right
//! - Y+ = Up
//! - Z+ = Toward the viewer (the camera looks down -Z)
//!
//! Projection maps depth to the [0, 1] range expected by the depth test.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and non-uniform scale
    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            scale,
            ..Default::default()
        }
    }

    /// Convert to an object-to-world transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min {
            min
        } else if value > max {
            max
        } else {
            value
        }
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Reflect an incident vector about a unit normal
    ///
    /// Matches the GLSL `reflect` convention: the incident vector points
    /// toward the surface, and `normal` must be unit length.
    pub fn reflect(incident: &Vec3, normal: &Vec3) -> Vec3 {
        incident - 2.0 * incident.dot(normal) * normal
    }
}

/// Extension trait for Mat4 with rendering-specific constructors
pub trait Mat4Ext {
    /// Create a perspective projection matrix
    ///
    /// Right-handed, camera looking down -Z, depth mapped to [0, 1].
    /// `fov_y` is in radians; `aspect` is width / height.
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a look-at view (world-to-camera) matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let focal = 1.0 / (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = focal / aspect;
        result[(1, 1)] = focal;
        result[(2, 2)] = far / (near - far);
        result[(2, 3)] = (near * far) / (near - far);
        result[(3, 2)] = -1.0; // Perspective divide picks up -z (view space looks down -Z)

        result
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = forward.cross(&up).normalize();
        let camera_up = right.cross(&forward);

        let translation = Mat4::new_translation(&-eye);

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }
}

/// Compute the normal matrix (inverse-transpose) for a model matrix
///
/// Normals must be transformed by the inverse-transpose of the model matrix
/// rather than the model matrix itself, or non-uniform scale would shear
/// them off the surface. Returns `None` for singular model matrices.
pub fn normal_matrix(model: &Mat4) -> Option<Mat4> {
    model.try_inverse().map(|inv| inv.transpose())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn reflect_bounces_off_a_plane() {
        let incident = Vec3::new(1.0, -1.0, 0.0).normalize();
        let normal = Vec3::new(0.0, 1.0, 0.0);
        let reflected = utils::reflect(&incident, &normal);
        assert_relative_eq!(reflected, Vec3::new(1.0, 1.0, 0.0).normalize(), epsilon = EPSILON);
    }

    #[test]
    fn perspective_maps_near_and_far_to_unit_depth() {
        let proj = Mat4::perspective(utils::deg_to_rad(60.0), 1.0, 0.1, 100.0);

        let near_point = proj * Vec4::new(0.0, 0.0, -0.1, 1.0);
        assert_relative_eq!(near_point.z / near_point.w, 0.0, epsilon = EPSILON);

        let far_point = proj * Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert_relative_eq!(far_point.z / far_point.w, 1.0, epsilon = EPSILON);
    }

    #[test]
    fn look_at_places_eye_at_view_origin() {
        let view = Mat4::look_at(
            Vec3::new(3.0, 2.0, 5.0),
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let eye_in_view = view * Vec4::new(3.0, 2.0, 5.0, 1.0);
        assert_relative_eq!(eye_in_view.xyz(), Vec3::zeros(), epsilon = EPSILON);
    }

    #[test]
    fn look_at_faces_negative_z() {
        let view = Mat4::look_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
        );
        // The target lies in front of the camera, along -Z in view space.
        let target_in_view = view * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(target_in_view.xyz(), Vec3::new(0.0, 0.0, -5.0), epsilon = EPSILON);
    }

    #[test]
    fn normal_matrix_preserves_orthogonality_under_nonuniform_scale() {
        let model = Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 1.0, 0.25))
            * Mat4::from_axis_angle(&Vec3::y_axis(), 0.7);

        // A surface tangent/normal pair that starts out perpendicular.
        let tangent = Vec3::new(1.0, 0.0, 0.0);
        let normal = Vec3::new(0.0, 0.0, 1.0);

        let world_tangent = model.transform_vector(&tangent);
        let world_normal = normal_matrix(&model)
            .expect("model matrix is invertible")
            .transform_vector(&normal);

        assert_relative_eq!(world_tangent.dot(&world_normal), 0.0, epsilon = EPSILON);

        // The naive transform does not preserve perpendicularity here.
        let naive_normal = model.transform_vector(&normal);
        assert!(world_tangent.dot(&naive_normal).abs() > 0.1);
    }
}
