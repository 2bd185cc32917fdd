//! Buffer-layout mirrors of the scene types
//!
//! Plain-old-data blocks laid out for direct upload: `#[repr(C,
//! align(16))]`, explicit padding, matrices as column-major arrays, and
//! fixed-capacity arrays paired with an element count. Conversions from
//! the scene types are the only way to build them, so the count always
//! matches the populated prefix.
//!
//! Every block is `bytemuck::Pod`, so `bytemuck::bytes_of` yields its
//! exact byte image without copies.

use crate::scene::camera::Camera;
use crate::scene::lighting::{AmbientLight, PointLight, PointLightSet, MAX_POINT_LIGHTS};
use crate::scene::metaball::{Metaball, MetaballField, MAX_METABALLS};
use crate::scene::transform::ModelTransform;

/// Per-frame camera matrices
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraData {
    /// World-to-camera view matrix, column major
    pub view: [[f32; 4]; 4],
    /// Camera-to-clip projection matrix, column major
    pub projection: [[f32; 4]; 4],
}

unsafe impl bytemuck::Zeroable for CameraData {}
unsafe impl bytemuck::Pod for CameraData {}

impl From<&Camera> for CameraData {
    fn from(camera: &Camera) -> Self {
        Self {
            view: (*camera.view()).into(),
            projection: (*camera.projection()).into(),
        }
    }
}

/// Per-object model matrices
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelData {
    /// Object-to-world model matrix, column major
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose normal matrix, column major
    pub normals: [[f32; 4]; 4],
}

unsafe impl bytemuck::Zeroable for ModelData {}
unsafe impl bytemuck::Pod for ModelData {}

impl From<&ModelTransform> for ModelData {
    fn from(transform: &ModelTransform) -> Self {
        Self {
            model: (*transform.model()).into(),
            normals: (*transform.normals()).into(),
        }
    }
}

/// Per-object specular material parameters
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecularData {
    /// Specular intensity multiplier
    pub intensity: f32,
    /// Specular shininess exponent
    pub shininess: f32,
    _pad: [f32; 2],
}

unsafe impl bytemuck::Zeroable for SpecularData {}
unsafe impl bytemuck::Pod for SpecularData {}

impl SpecularData {
    /// Pack intensity and shininess
    pub fn new(intensity: f32, shininess: f32) -> Self {
        Self {
            intensity,
            shininess,
            _pad: [0.0; 2],
        }
    }
}

/// One point light
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightData {
    /// Homogeneous world-space position, `w = 1`
    pub position: [f32; 4],
    /// Light color
    pub color: [f32; 3],
    /// Intensity scale
    pub intensity: f32,
}

unsafe impl bytemuck::Zeroable for PointLightData {}
unsafe impl bytemuck::Pod for PointLightData {}

impl From<&PointLight> for PointLightData {
    fn from(light: &PointLight) -> Self {
        Self {
            position: light.homogeneous_position().into(),
            color: light.color.into(),
            intensity: light.intensity,
        }
    }
}

/// The frame's point lights: fixed-capacity array plus populated count
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightArrayData {
    /// Light slots; only the first `count` are meaningful
    pub lights: [PointLightData; MAX_POINT_LIGHTS],
    /// Number of populated slots
    pub count: u32,
    _pad: [u32; 3],
}

unsafe impl bytemuck::Zeroable for PointLightArrayData {}
unsafe impl bytemuck::Pod for PointLightArrayData {}

impl From<&PointLightSet> for PointLightArrayData {
    fn from(set: &PointLightSet) -> Self {
        let mut lights = [PointLightData {
            position: [0.0, 0.0, 0.0, 1.0],
            color: [0.0; 3],
            intensity: 0.0,
        }; MAX_POINT_LIGHTS];
        for (slot, light) in lights.iter_mut().zip(set.active()) {
            *slot = light.into();
        }
        Self {
            lights,
            count: set.len() as u32,
            _pad: [0; 3],
        }
    }
}

/// The frame's ambient light
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientData {
    /// Ambient color
    pub color: [f32; 3],
    /// Intensity scale
    pub intensity: f32,
}

unsafe impl bytemuck::Zeroable for AmbientData {}
unsafe impl bytemuck::Pod for AmbientData {}

impl From<&AmbientLight> for AmbientData {
    fn from(ambient: &AmbientLight) -> Self {
        Self {
            color: ambient.color.into(),
            intensity: ambient.intensity,
        }
    }
}

/// One metaball: position and radius packed together
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetaballData {
    /// World-space center in `xyz`, radius in `w`
    pub center_radius: [f32; 4],
    /// Surface color, `w` unused
    pub color: [f32; 4],
}

unsafe impl bytemuck::Zeroable for MetaballData {}
unsafe impl bytemuck::Pod for MetaballData {}

impl From<&Metaball> for MetaballData {
    fn from(ball: &Metaball) -> Self {
        let position = ball.position();
        let color = ball.color();
        Self {
            center_radius: [position.x, position.y, position.z, ball.radius()],
            color: [color.x, color.y, color.z, 0.0],
        }
    }
}

/// The frame's metaball field: fixed-capacity array plus populated count
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetaballArrayData {
    /// Metaball slots; only the first `count` are meaningful
    pub balls: [MetaballData; MAX_METABALLS],
    /// Number of populated slots
    pub count: u32,
    _pad: [u32; 3],
}

unsafe impl bytemuck::Zeroable for MetaballArrayData {}
unsafe impl bytemuck::Pod for MetaballArrayData {}

impl From<&MetaballField> for MetaballArrayData {
    fn from(field: &MetaballField) -> Self {
        let mut balls = [MetaballData {
            center_radius: [0.0; 4],
            color: [0.0; 4],
        }; MAX_METABALLS];
        for (slot, ball) in balls.iter_mut().zip(field.active()) {
            *slot = ball.into();
        }
        Self {
            balls,
            count: field.len() as u32,
            _pad: [0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use std::mem::{align_of, size_of};

    #[test]
    fn blocks_have_upload_compatible_layouts() {
        assert_eq!(size_of::<CameraData>(), 128);
        assert_eq!(size_of::<ModelData>(), 128);
        assert_eq!(size_of::<SpecularData>(), 16);
        assert_eq!(size_of::<PointLightData>(), 32);
        assert_eq!(
            size_of::<PointLightArrayData>(),
            32 * MAX_POINT_LIGHTS + 16
        );
        assert_eq!(size_of::<AmbientData>(), 16);
        assert_eq!(size_of::<MetaballData>(), 32);
        assert_eq!(size_of::<MetaballArrayData>(), 32 * MAX_METABALLS + 16);

        assert_eq!(align_of::<CameraData>(), 16);
        assert_eq!(align_of::<PointLightArrayData>(), 16);
        assert_eq!(align_of::<MetaballArrayData>(), 16);
    }

    #[test]
    fn light_array_counts_the_populated_prefix() {
        let lights = [
            PointLight::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 0.0, 0.0), 2.0).unwrap(),
            PointLight::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 0.5).unwrap(),
        ];
        let set = PointLightSet::from_slice(&lights).unwrap();
        let data = PointLightArrayData::from(&set);

        assert_eq!(data.count, 2);
        assert_eq!(data.lights[0].position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(data.lights[0].intensity, 2.0);
        assert_eq!(data.lights[1].color, [0.0, 1.0, 0.0]);
        // Unpopulated slots stay inert.
        assert_eq!(data.lights[2].intensity, 0.0);
    }

    #[test]
    fn metaball_array_packs_radius_with_position() {
        let ball =
            Metaball::new(Vec3::new(0.5, -1.0, 2.0), Vec3::new(0.0, 0.0, 1.0), 1.25).unwrap();
        let field = MetaballField::from_slice(&[ball]).unwrap();
        let data = MetaballArrayData::from(&field);

        assert_eq!(data.count, 1);
        assert_eq!(data.balls[0].center_radius, [0.5, -1.0, 2.0, 1.25]);
        assert_eq!(data.balls[0].color, [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn byte_images_have_no_uninitialized_gaps() {
        let set = PointLightSet::new();
        let data = PointLightArrayData::from(&set);
        let bytes = bytemuck::bytes_of(&data);
        assert_eq!(bytes.len(), size_of::<PointLightArrayData>());
        assert!(bytes.iter().all(|&b| b == 0 || b == 0x80 || b == 0x3f));
    }
}
