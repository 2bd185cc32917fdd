//! Mesh objects and the triangle rasterizer
//!
//! The explicit geometry evaluator: a mesh object pairs a validated
//! vertex stream with its model transform and specular material, and the
//! rasterizer projects its triangles through the camera into per-pixel
//! surface attributes.
//!
//! Interpolation is perspective-correct: attributes divided by clip-space
//! `w` vary linearly in screen space, as does `1 / w`, so each covered
//! pixel recovers the true attribute by dividing the interpolated sums.
//! Triangles with any vertex at `w <= 0` are discarded whole rather than
//! clipped; fragments falling outside the [0, 1] depth range are dropped
//! individually, which covers the near and far planes.

use crate::foundation::math::{Vec2, Vec3};
use crate::render::attachments::{GBuffer, RenderTarget};
use crate::scene::camera::Camera;
use crate::scene::transform::ModelTransform;
use crate::scene::SceneError;

use crate::geometry::vertex::VertexStream;

/// Whether an object takes part in deferred lighting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingVariant {
    /// Writes surface attributes for the lighting subpasses
    Lit,
    /// Writes its vertex color straight to the final target, no lighting
    Unlit,
}

/// A renderable mesh: vertex stream, transform, material
///
/// The shading variant is fixed at construction. Specular parameters are
/// carried per object, not per vertex, and validated here rather than per
/// frame.
#[derive(Debug, Clone)]
pub struct MeshObject {
    vertices: VertexStream,
    transform: ModelTransform,
    variant: ShadingVariant,
    specular_intensity: f32,
    shininess: f32,
}

impl MeshObject {
    /// Create a lit mesh object
    ///
    /// # Errors
    /// Returns [`SceneError::DegenerateShininess`] unless `shininess` is a
    /// finite positive exponent.
    pub fn lit(
        vertices: VertexStream,
        transform: ModelTransform,
        specular_intensity: f32,
        shininess: f32,
    ) -> Result<Self, SceneError> {
        if !(shininess.is_finite() && shininess > 0.0) {
            return Err(SceneError::DegenerateShininess(shininess));
        }
        Ok(Self {
            vertices,
            transform,
            variant: ShadingVariant::Lit,
            specular_intensity,
            shininess,
        })
    }

    /// Create an unlit mesh object
    ///
    /// Unlit objects never reach the lighting subpasses, so they carry no
    /// specular material.
    pub fn unlit(vertices: VertexStream, transform: ModelTransform) -> Self {
        Self {
            vertices,
            transform,
            variant: ShadingVariant::Unlit,
            specular_intensity: 0.0,
            shininess: 1.0,
        }
    }

    /// The object's vertex stream
    pub fn vertices(&self) -> &VertexStream {
        &self.vertices
    }

    /// The object's model transform
    pub fn transform(&self) -> &ModelTransform {
        &self.transform
    }

    /// Mutable transform access for between-frame animation
    pub fn transform_mut(&mut self) -> &mut ModelTransform {
        &mut self.transform
    }

    /// The object's shading variant
    pub fn variant(&self) -> ShadingVariant {
        self.variant
    }

    /// Specular intensity multiplier
    pub fn specular_intensity(&self) -> f32 {
        self.specular_intensity
    }

    /// Specular shininess exponent
    pub fn shininess(&self) -> f32 {
        self.shininess
    }
}

/// One projected vertex, attributes pre-divided by clip `w`
struct ProjectedVertex {
    screen: Vec2,
    ndc_z: f32,
    inv_w: f32,
    position_over_w: Vec3,
    normal_over_w: Vec3,
    color_over_w: Vec3,
}

/// Signed doubled area of triangle `a b p` in screen space
///
/// Screen space has Y pointing down, so counter-clockwise front faces
/// come out with negative area.
fn edge(a: &Vec2, b: &Vec2, p: &Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Triangle rasterizer for the geometry subpass
///
/// Stateless between draws; the depth plane it tests against lives in the
/// G-buffer so lit and unlit objects occlude each other correctly.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshRasterizer;

impl MeshRasterizer {
    /// Create a rasterizer
    pub fn new() -> Self {
        Self
    }

    /// Rasterize a lit object's surface attributes into the G-buffer
    pub fn draw_lit(&self, camera: &Camera, object: &MeshObject, gbuffer: &mut GBuffer) {
        let specular_intensity = object.specular_intensity();
        let shininess = object.shininess();
        self.rasterize(camera, object, gbuffer.width(), gbuffer.height(), |x, y, depth, albedo, normal, position| {
            if gbuffer.depth_test_and_store(x, y, depth) {
                gbuffer.store_surface(x, y, &albedo, &normal, &position, specular_intensity, shininess);
            }
        });
    }

    /// Rasterize an unlit object straight into the color target
    ///
    /// Depth-tests against the shared depth plane but writes interpolated
    /// vertex color to the target. Winning the depth test also zeroes the
    /// pixel's stored surface attributes; an unlit fragment may be covering
    /// lit geometry drawn earlier, and the lighting subpasses must not
    /// shade that hidden surface onto it.
    pub fn draw_unlit(
        &self,
        camera: &Camera,
        object: &MeshObject,
        gbuffer: &mut GBuffer,
        target: &mut RenderTarget,
    ) {
        self.rasterize(camera, object, gbuffer.width(), gbuffer.height(), |x, y, depth, albedo, _, _| {
            if gbuffer.depth_test_and_store(x, y, depth) {
                gbuffer.store_surface(x, y, &Vec3::zeros(), &Vec3::zeros(), &Vec3::zeros(), 0.0, 0.0);
                target.set(x, y, &albedo);
            }
        });
    }

    fn rasterize<F>(&self, camera: &Camera, object: &MeshObject, width: u32, height: u32, mut emit: F)
    where
        F: FnMut(u32, u32, f32, Vec3, Vec3, Vec3),
    {
        let transform = object.transform();
        let mvp = camera.view_projection() * transform.model();
        let stream = object.vertices();

        log::trace!(
            "rasterizing {} triangles into {}x{}",
            stream.triangle_count(),
            width,
            height
        );

        'triangles: for triangle in 0..stream.triangle_count() {
            let mut projected: [ProjectedVertex; 3] = std::array::from_fn(|_| ProjectedVertex {
                screen: Vec2::zeros(),
                ndc_z: 0.0,
                inv_w: 0.0,
                position_over_w: Vec3::zeros(),
                normal_over_w: Vec3::zeros(),
                color_over_w: Vec3::zeros(),
            });

            for corner in 0..3 {
                let vertex = stream.vertex(triangle * 3 + corner);
                let clip = mvp * vertex.position_vec().push(1.0);
                if clip.w <= 0.0 {
                    // At least one corner behind the camera plane; drop the
                    // whole triangle instead of clipping.
                    continue 'triangles;
                }
                let inv_w = 1.0 / clip.w;
                let ndc = clip.xyz() * inv_w;
                projected[corner] = ProjectedVertex {
                    screen: Vec2::new(
                        (ndc.x * 0.5 + 0.5) * width as f32,
                        (0.5 - ndc.y * 0.5) * height as f32,
                    ),
                    ndc_z: ndc.z,
                    inv_w,
                    position_over_w: transform.world_position(&vertex.position_vec()) * inv_w,
                    normal_over_w: transform.world_normal(&vertex.normal_vec()) * inv_w,
                    color_over_w: vertex.color_vec() * inv_w,
                };
            }

            let [a, b, c] = &projected;
            let area = edge(&a.screen, &b.screen, &c.screen);
            // Back-facing or degenerate.
            if area >= -f32::EPSILON {
                continue;
            }

            let min_x = a.screen.x.min(b.screen.x).min(c.screen.x).floor().max(0.0) as u32;
            let min_y = a.screen.y.min(b.screen.y).min(c.screen.y).floor().max(0.0) as u32;
            let max_x = (a.screen.x.max(b.screen.x).max(c.screen.x).ceil() as i64)
                .min(i64::from(width) - 1);
            let max_y = (a.screen.y.max(b.screen.y).max(c.screen.y).ceil() as i64)
                .min(i64::from(height) - 1);
            if max_x < i64::from(min_x) || max_y < i64::from(min_y) {
                continue;
            }

            for y in min_y..=max_y as u32 {
                for x in min_x..=max_x as u32 {
                    let pixel = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let l0 = edge(&b.screen, &c.screen, &pixel) / area;
                    let l1 = edge(&c.screen, &a.screen, &pixel) / area;
                    let l2 = edge(&a.screen, &b.screen, &pixel) / area;
                    if l0 < 0.0 || l1 < 0.0 || l2 < 0.0 {
                        continue;
                    }

                    // NDC depth is already divided by w, so it interpolates
                    // linearly in screen space.
                    let depth = l0 * a.ndc_z + l1 * b.ndc_z + l2 * c.ndc_z;
                    if !(0.0..=1.0).contains(&depth) {
                        continue;
                    }

                    let inv_w = l0 * a.inv_w + l1 * b.inv_w + l2 * c.inv_w;
                    let position = (l0 * a.position_over_w
                        + l1 * b.position_over_w
                        + l2 * c.position_over_w)
                        / inv_w;
                    let normal =
                        (l0 * a.normal_over_w + l1 * b.normal_over_w + l2 * c.normal_over_w)
                            / inv_w;
                    let albedo =
                        (l0 * a.color_over_w + l1 * b.color_over_w + l2 * c.color_over_w) / inv_w;

                    emit(x, y, depth, albedo, normal, position);
                }
            }
        }
    }
}
