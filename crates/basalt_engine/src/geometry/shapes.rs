//! Procedural vertex lists for simple shapes
//!
//! Used by the demo app and tests in place of loaded models. Winding is
//! counter-clockwise when viewed from outside (front-facing).

use crate::geometry::vertex::Vertex;

/// A unit quad in the XY plane, facing +Z, centered on the origin
pub fn quad(color: [f32; 3]) -> Vec<Vertex> {
    let normal = [0.0, 0.0, 1.0];
    let corners = [
        [-0.5, -0.5, 0.0],
        [0.5, -0.5, 0.0],
        [0.5, 0.5, 0.0],
        [-0.5, 0.5, 0.0],
    ];
    [0, 1, 2, 0, 2, 3]
        .into_iter()
        .map(|index: usize| Vertex::new(corners[index], normal, color))
        .collect()
}

/// A unit cube centered on the origin, with face normals
pub fn cube(color: [f32; 3]) -> Vec<Vertex> {
    // Each face: normal, then four corners in counter-clockwise order as
    // seen from outside.
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // +Z
        (
            [0.0, 0.0, 1.0],
            [
                [-0.5, -0.5, 0.5],
                [0.5, -0.5, 0.5],
                [0.5, 0.5, 0.5],
                [-0.5, 0.5, 0.5],
            ],
        ),
        // -Z
        (
            [0.0, 0.0, -1.0],
            [
                [0.5, -0.5, -0.5],
                [-0.5, -0.5, -0.5],
                [-0.5, 0.5, -0.5],
                [0.5, 0.5, -0.5],
            ],
        ),
        // +X
        (
            [1.0, 0.0, 0.0],
            [
                [0.5, -0.5, 0.5],
                [0.5, -0.5, -0.5],
                [0.5, 0.5, -0.5],
                [0.5, 0.5, 0.5],
            ],
        ),
        // -X
        (
            [-1.0, 0.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [-0.5, -0.5, 0.5],
                [-0.5, 0.5, 0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        // +Y
        (
            [0.0, 1.0, 0.0],
            [
                [-0.5, 0.5, 0.5],
                [0.5, 0.5, 0.5],
                [0.5, 0.5, -0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        // -Y
        (
            [0.0, -1.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [0.5, -0.5, -0.5],
                [0.5, -0.5, 0.5],
                [-0.5, -0.5, 0.5],
            ],
        ),
    ];

    let mut vertices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        for index in [0usize, 1, 2, 0, 2, 3] {
            vertices.push(Vertex::new(corners[index], normal, color));
        }
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::vertex::VertexStream;

    #[test]
    fn shapes_form_whole_triangles() {
        assert!(VertexStream::structured(quad([1.0; 3])).is_ok());
        let cube = cube([0.5; 3]);
        assert_eq!(cube.len(), 36);
        assert!(VertexStream::structured(cube).is_ok());
    }

    #[test]
    fn cube_normals_point_away_from_center() {
        for vertex in cube([1.0; 3]) {
            let outward = vertex.position_vec().dot(&vertex.normal_vec());
            assert!(outward > 0.0, "normal must face outward: {vertex:?}");
        }
    }
}
