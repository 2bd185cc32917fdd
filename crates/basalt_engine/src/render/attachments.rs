//! G-buffer attachments and the final color target
//!
//! The geometry subpass writes four attribute planes (albedo, normal,
//! world position, specular parameters) plus depth; the lighting subpasses
//! read them and accumulate into the color target. Attachments are cleared
//! at frame start and never persist across frames. Pixel coverage is
//! implied by the depth plane: a pixel the geometry subpass never touched
//! still holds the far-plane clear value.

use bitflags::bitflags;

use crate::foundation::math::Vec3;
use crate::render::shading::SurfaceAttributes;

/// Identifies one attachment of the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attachment {
    /// Per-pixel albedo color
    Albedo,
    /// Per-pixel world-space normal (unnormalized as stored)
    Normal,
    /// Per-pixel world-space position
    Position,
    /// Per-pixel specular parameters (intensity, shininess)
    Specular,
    /// The final color target
    Color,
    /// Depth buffer
    Depth,
}

bitflags! {
    /// How a subpass touches an attachment
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AttachmentAccess: u8 {
        /// The subpass samples the attachment
        const READ = 0b01;
        /// The subpass stores to the attachment
        const WRITE = 0b10;
    }
}

/// Depth clear value; pixels still at this value were never covered
pub const DEPTH_CLEAR: f32 = 1.0;

/// The geometry subpass's output attachments
///
/// Written exclusively by the geometry subpass, read-only afterward within
/// the same frame.
#[derive(Debug, Clone)]
pub struct GBuffer {
    width: u32,
    height: u32,
    albedo: Vec<[f32; 4]>,
    normal: Vec<[f32; 4]>,
    position: Vec<[f32; 4]>,
    specular: Vec<[f32; 2]>,
    depth: Vec<f32>,
}

impl GBuffer {
    /// Allocate a G-buffer for the given dimensions
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            albedo: vec![[0.0, 0.0, 0.0, 1.0]; len],
            normal: vec![[0.0, 0.0, 0.0, 1.0]; len],
            position: vec![[0.0, 0.0, 0.0, 1.0]; len],
            specular: vec![[0.0, 0.0]; len],
            depth: vec![DEPTH_CLEAR; len],
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reset every attachment to its clear value
    pub fn clear(&mut self) {
        self.albedo.fill([0.0, 0.0, 0.0, 1.0]);
        self.normal.fill([0.0, 0.0, 0.0, 1.0]);
        self.position.fill([0.0, 0.0, 0.0, 1.0]);
        self.specular.fill([0.0, 0.0]);
        self.depth.fill(DEPTH_CLEAR);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// The stored depth at a pixel
    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        self.depth[self.index(x, y)]
    }

    /// Depth-test a candidate fragment; stores and returns `true` if it is
    /// nearer than the current depth
    pub fn depth_test_and_store(&mut self, x: u32, y: u32, depth: f32) -> bool {
        let index = self.index(x, y);
        if depth < self.depth[index] {
            self.depth[index] = depth;
            true
        } else {
            false
        }
    }

    /// Store the full surface attribute set at a pixel
    pub fn store_surface(
        &mut self,
        x: u32,
        y: u32,
        albedo: &Vec3,
        normal: &Vec3,
        position: &Vec3,
        specular_intensity: f32,
        shininess: f32,
    ) {
        let index = self.index(x, y);
        self.albedo[index] = [albedo.x, albedo.y, albedo.z, 1.0];
        self.normal[index] = [normal.x, normal.y, normal.z, 0.0];
        self.position[index] = [position.x, position.y, position.z, 1.0];
        self.specular[index] = [specular_intensity, shininess];
    }

    /// Read back the surface attributes at a covered pixel
    ///
    /// Returns `None` where the geometry subpass wrote nothing (depth is
    /// still the clear value), so lighting skips the background.
    pub fn surface_at(&self, x: u32, y: u32) -> Option<SurfaceAttributes> {
        let index = self.index(x, y);
        if self.depth[index] >= DEPTH_CLEAR {
            return None;
        }
        let albedo = self.albedo[index];
        let normal = self.normal[index];
        let position = self.position[index];
        let [specular_intensity, shininess] = self.specular[index];
        Some(SurfaceAttributes {
            albedo: Vec3::new(albedo[0], albedo[1], albedo[2]),
            normal: Vec3::new(normal[0], normal[1], normal[2]),
            position: Vec3::new(position[0], position[1], position[2]),
            specular_intensity,
            shininess,
        })
    }

    /// Read the albedo attachment alone (the ambient subpass's only input)
    pub fn albedo_at(&self, x: u32, y: u32) -> Vec3 {
        let albedo = self.albedo[self.index(x, y)];
        Vec3::new(albedo[0], albedo[1], albedo[2])
    }
}

/// The final per-pixel RGBA color buffer
///
/// Alpha is fixed at 1.0. Values are linear and unclamped; lighting may
/// exceed [0, 1] and is clamped only at image export, which models the
/// display pipeline downstream of this core.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTarget {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
}

impl RenderTarget {
    /// Allocate a target for the given dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0, 0.0, 0.0, 1.0]; width as usize * height as usize],
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Fill the whole target with a color
    pub fn clear(&mut self, color: &Vec3) {
        self.pixels.fill([color.x, color.y, color.z, 1.0]);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Overwrite the color at a pixel
    pub fn set(&mut self, x: u32, y: u32, color: &Vec3) {
        let index = self.index(x, y);
        self.pixels[index] = [color.x, color.y, color.z, 1.0];
    }

    /// Additively blend a contribution into a pixel
    ///
    /// Each lighting subpass's contribution sums into the final color
    /// rather than overwriting it.
    pub fn accumulate(&mut self, x: u32, y: u32, contribution: &Vec3) {
        let index = self.index(x, y);
        let [r, g, b, _] = self.pixels[index];
        self.pixels[index] = [
            r + contribution.x,
            g + contribution.y,
            b + contribution.z,
            1.0,
        ];
    }

    /// The color at a pixel
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels[self.index(x, y)]
    }

    /// Export as 8-bit RGBA, clamping to [0, 1]
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            for channel in pixel {
                bytes.push((channel.clamp(0.0, 1.0) * 255.0).round() as u8);
            }
        }
        bytes
    }
}
