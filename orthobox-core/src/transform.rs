/// Cube transform pipeline: ordered rotations followed by depth recentering
use nalgebra::Matrix3;

use crate::draw::Rgba;
use crate::geometry::{CubeModel, CUBE_VERTEX_COUNT};
use crate::math::{subtract, Rotation, Vertex3D};

/// Rotations applied one after another, first step first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RotationSequence {
    steps: Vec<Rotation>,
}

impl RotationSequence {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Rotate about Y, then about X
    pub fn y_then_x(angle_y: f64, angle_x: f64) -> Self {
        Self::new()
            .then(Rotation::y(angle_y))
            .then(Rotation::x(angle_x))
    }

    pub fn then(mut self, rotation: Rotation) -> Self {
        self.steps.push(rotation);
        self
    }

    pub fn steps(&self) -> &[Rotation] {
        &self.steps
    }

    pub fn apply(&self, vertex: &Vertex3D) -> Vertex3D {
        self.steps
            .iter()
            .fold(*vertex, |v, rotation| rotation.apply(&v))
    }

    /// The whole sequence as one matrix
    pub fn matrix(&self) -> Matrix3<f64> {
        self.steps
            .iter()
            .fold(Matrix3::identity(), |acc, rotation| rotation.matrix() * acc)
    }
}

/// Largest z coordinate, or negative infinity for an empty slice
pub fn max_depth(points: &[Vertex3D]) -> f64 {
    points.iter().map(|p| p.z).fold(f64::NEG_INFINITY, f64::max)
}

/// Shift `points` along z so the deepest one sits at z = 0
pub fn recenter_depth(points: &[Vertex3D]) -> Vec<Vertex3D> {
    let offset = Vertex3D::new(0.0, 0.0, max_depth(points));
    points.iter().map(|p| subtract(p, &offset)).collect()
}

/// The cube after rotation and recentering
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedCube {
    pub vertices: [Vertex3D; CUBE_VERTEX_COUNT],
    pub faces: [u32; 24],
    pub colors: Option<[Rgba; CUBE_VERTEX_COUNT]>,
}

impl TransformedCube {
    /// Vertex positions narrowed to `f32` for submission
    pub fn positions(&self) -> [[f32; 3]; CUBE_VERTEX_COUNT] {
        self.vertices.map(|v| [v.x as f32, v.y as f32, v.z as f32])
    }
}

/// Apply `rotations` to every vertex of `cube`, then recenter on depth
pub fn apply_to_cube(cube: &CubeModel, rotations: &RotationSequence) -> TransformedCube {
    let rotated = cube.vertices.map(|v| rotations.apply(&v));
    let offset = Vertex3D::new(0.0, 0.0, max_depth(&rotated));

    TransformedCube {
        vertices: rotated.map(|v| subtract(&v, &offset)),
        faces: cube.faces,
        colors: cube.colors,
    }
}

/// Rotate about Y by `angle_y`, then about X by `angle_x`, then recenter.
///
/// Angles are radians and must be finite.
pub fn transform_cube(cube: &CubeModel, angle_y: f64, angle_x: f64) -> TransformedCube {
    apply_to_cube(cube, &RotationSequence::y_then_x(angle_y, angle_x))
}
