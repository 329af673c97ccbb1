/// Unit cube geometry consumed by the transform pipeline
use nalgebra::Vector3;

use crate::draw::Rgba;
use crate::math::Vertex3D;

pub const CUBE_VERTEX_COUNT: usize = 8;

/// Six quads, four indices each, wound counter-clockwise seen from outside
#[rustfmt::skip]
pub const CUBE_FACE_INDICES: [u32; 24] = [
    6, 2, 3, 7, // x = 1
    5, 1, 0, 4, // x = 0
    7, 3, 1, 5, // y = 1
    4, 0, 2, 6, // y = 0
    2, 0, 1, 3, // z = 0
    7, 5, 4, 6, // z = 1
];

const RED: Rgba = [1.0, 0.0, 0.0, 0.9];
const BLUE: Rgba = [0.0, 0.0, 1.0, 0.9];

/// Per-vertex colors: the x = 0 half is red, the x = 1 half is blue
pub const CUBE_COLORS: [Rgba; CUBE_VERTEX_COUNT] = [RED, RED, BLUE, BLUE, RED, RED, BLUE, BLUE];

/// Corner of the unit cube at position `index`.
///
/// The index enumerates the corners as the binary number `z x y`, so the
/// order is (0,0,0), (0,1,0), (1,0,0), (1,1,0), (0,0,1), (0,1,1), (1,0,1),
/// (1,1,1). The face table relies on this order.
pub fn unit_cube_vertex(index: usize) -> Vertex3D {
    let bit = |shift: usize| ((index >> shift) & 1) as f64;
    Vertex3D::new(bit(1), bit(0), bit(2))
}

/// The unit cube with its face table and optional vertex colors
#[derive(Debug, Clone, PartialEq)]
pub struct CubeModel {
    pub vertices: [Vertex3D; CUBE_VERTEX_COUNT],
    pub faces: [u32; 24],
    pub colors: Option<[Rgba; CUBE_VERTEX_COUNT]>,
}

impl CubeModel {
    pub fn unit() -> Self {
        Self {
            vertices: std::array::from_fn(unit_cube_vertex),
            faces: CUBE_FACE_INDICES,
            colors: None,
        }
    }

    /// The unit cube carrying the red/blue vertex color table
    pub fn colored() -> Self {
        Self::unit().with_colors(CUBE_COLORS)
    }

    pub fn with_colors(mut self, colors: [Rgba; CUBE_VERTEX_COUNT]) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Face table split into quads
    pub fn quads(&self) -> impl Iterator<Item = [u32; 4]> + '_ {
        quads(&self.faces)
    }
}

impl Default for CubeModel {
    fn default() -> Self {
        Self::unit()
    }
}

/// Split a flat index list into groups of four
pub fn quads(indices: &[u32]) -> impl Iterator<Item = [u32; 4]> + '_ {
    indices
        .chunks_exact(4)
        .map(|quad| [quad[0], quad[1], quad[2], quad[3]])
}

/// Normal of a quad from its first three corners
pub fn quad_normal(vertices: &[Vertex3D], quad: [u32; 4]) -> Vector3<f64> {
    let v0 = vertices[quad[0] as usize];
    let v1 = vertices[quad[1] as usize];
    let v2 = vertices[quad[2] as usize];

    let edge1 = v1 - v0;
    let edge2 = v2 - v1;

    edge1.cross(&edge2).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_order() {
        let cube = CubeModel::unit();
        let expected = [
            (0.0, 0.0, 0.0),
            (0.0, 1.0, 0.0),
            (1.0, 0.0, 0.0),
            (1.0, 1.0, 0.0),
            (0.0, 0.0, 1.0),
            (0.0, 1.0, 1.0),
            (1.0, 0.0, 1.0),
            (1.0, 1.0, 1.0),
        ];
        for (vertex, (x, y, z)) in cube.vertices.iter().zip(expected) {
            assert_eq!(*vertex, Vertex3D::new(x, y, z));
        }
    }

    #[test]
    fn test_face_table_shape() {
        let cube = CubeModel::unit();
        assert_eq!(cube.faces.len(), 24);
        assert!(cube.faces.iter().all(|&i| i < CUBE_VERTEX_COUNT as u32));
        assert_eq!(cube.quads().count(), 6);

        // Every corner touches exactly three faces
        for corner in 0..CUBE_VERTEX_COUNT as u32 {
            let uses = cube.faces.iter().filter(|&&i| i == corner).count();
            assert_eq!(uses, 3, "corner {corner}");
        }
    }

    #[test]
    fn test_quads_are_coplanar() {
        let cube = CubeModel::unit();
        for quad in cube.quads() {
            let normal = quad_normal(&cube.vertices, quad);
            let origin = cube.vertices[quad[0] as usize];
            for &i in &quad {
                let offset = cube.vertices[i as usize] - origin;
                assert!(offset.dot(&normal).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_quads_face_outward() {
        let cube = CubeModel::unit();
        let center = Vertex3D::new(0.5, 0.5, 0.5);
        for quad in cube.quads() {
            let normal = quad_normal(&cube.vertices, quad);
            let face_center = quad
                .iter()
                .map(|&i| cube.vertices[i as usize])
                .sum::<Vertex3D>()
                / 4.0;
            assert!(normal.dot(&(face_center - center)) > 0.0, "quad {quad:?}");
            // Both halves of the quad wind the same way
            let rest = quad_normal(&cube.vertices, [quad[2], quad[3], quad[0], quad[1]]);
            assert!((rest - normal).norm() < 1e-12);
        }
    }

    #[test]
    fn test_colored_cube() {
        let cube = CubeModel::colored();
        let colors = cube.colors.unwrap();
        for (vertex, color) in cube.vertices.iter().zip(colors) {
            let expected = if vertex.x == 0.0 { RED } else { BLUE };
            assert_eq!(color, expected);
        }
        assert_eq!(CubeModel::unit().colors, None);
    }
}
