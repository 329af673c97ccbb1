/// Rotation operators for the cube transform pipeline
use nalgebra::{Matrix3, Vector3};

/// A point in world space
pub type Vertex3D = Vector3<f64>;

/// Axis a rotation turns around
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// A single-axis rotation by an angle in radians
///
/// Angles must be finite. A NaN or infinite angle yields non-finite
/// coordinates rather than an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub axis: Axis,
    pub angle: f64,
}

impl Rotation {
    pub fn x(angle: f64) -> Self {
        Self {
            axis: Axis::X,
            angle,
        }
    }

    pub fn y(angle: f64) -> Self {
        Self {
            axis: Axis::Y,
            angle,
        }
    }

    /// The same axis turned the other way
    pub fn inverse(&self) -> Self {
        Self {
            axis: self.axis,
            angle: -self.angle,
        }
    }

    pub fn matrix(&self) -> Matrix3<f64> {
        match self.axis {
            Axis::X => rotation_x_matrix(self.angle),
            Axis::Y => rotation_y_matrix(self.angle),
        }
    }

    pub fn apply(&self, vertex: &Vertex3D) -> Vertex3D {
        self.matrix() * vertex
    }
}

/// Rotation about X: `[[1,0,0],[0,c,-s],[0,s,c]]`
#[rustfmt::skip]
pub fn rotation_x_matrix(angle: f64) -> Matrix3<f64> {
    let (sin, cos) = angle.sin_cos();
    Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, cos, -sin,
        0.0, sin, cos,
    )
}

/// Rotation about Y: `[[c,0,s],[0,1,0],[-s,0,c]]`
#[rustfmt::skip]
pub fn rotation_y_matrix(angle: f64) -> Matrix3<f64> {
    let (sin, cos) = angle.sin_cos();
    Matrix3::new(
        cos, 0.0, sin,
        0.0, 1.0, 0.0,
        -sin, 0.0, cos,
    )
}

pub fn rotate_x(vertex: &Vertex3D, angle: f64) -> Vertex3D {
    rotation_x_matrix(angle) * vertex
}

pub fn rotate_y(vertex: &Vertex3D, angle: f64) -> Vertex3D {
    rotation_y_matrix(angle) * vertex
}

pub fn subtract(a: &Vertex3D, b: &Vertex3D) -> Vertex3D {
    a - b
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, SQRT_2};

    fn samples() -> Vec<Vertex3D> {
        vec![
            Vertex3D::new(0.0, 0.0, 0.0),
            Vertex3D::new(1.0, 1.0, 1.0),
            Vertex3D::new(-2.5, 0.25, 4.0),
            Vertex3D::new(3.0, -7.0, 0.5),
        ]
    }

    fn angles() -> Vec<f64> {
        vec![0.3, FRAC_PI_4, FRAC_PI_2, -1.2, 2.9, 10.0]
    }

    #[test]
    fn test_zero_angle_is_identity() {
        for v in samples() {
            assert!((rotate_x(&v, 0.0) - v).norm() < 1e-9);
            assert!((rotate_y(&v, 0.0) - v).norm() < 1e-9);
        }
    }

    #[test]
    fn test_rotation_round_trip() {
        for v in samples() {
            for theta in angles() {
                assert!((rotate_x(&rotate_x(&v, theta), -theta) - v).norm() < 1e-6);
                assert!((rotate_y(&rotate_y(&v, theta), -theta) - v).norm() < 1e-6);
            }
        }
    }

    #[test]
    fn test_rotation_preserves_norm() {
        for v in samples() {
            for theta in angles() {
                assert!((rotate_x(&v, theta).norm() - v.norm()).abs() < 1e-9);
                assert!((rotate_y(&v, theta).norm() - v.norm()).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_matrices_are_orthonormal() {
        for theta in angles() {
            for m in [rotation_x_matrix(theta), rotation_y_matrix(theta)] {
                assert!((m.determinant() - 1.0).abs() < 1e-9);
                assert!((m * m.transpose() - Matrix3::identity()).norm() < 1e-9);
            }
        }
    }

    #[test]
    fn test_quarter_turns() {
        // +Y turns into +Z about X, +Z turns into +X about Y
        let x = rotate_x(&Vertex3D::new(0.0, 1.0, 0.0), FRAC_PI_2);
        assert!((x - Vertex3D::new(0.0, 0.0, 1.0)).norm() < 1e-9);

        let y = rotate_y(&Vertex3D::new(0.0, 0.0, 1.0), FRAC_PI_2);
        assert!((y - Vertex3D::new(1.0, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_y_then_x_differs_from_x_then_y() {
        let v = Vertex3D::new(1.0, 1.0, 1.0);
        let y_then_x = rotate_x(&rotate_y(&v, FRAC_PI_4), FRAC_PI_4);
        let x_then_y = rotate_y(&rotate_x(&v, FRAC_PI_4), FRAC_PI_4);
        assert!((y_then_x - x_then_y).norm() > 1e-3);
        let expected = Vertex3D::new(SQRT_2, SQRT_2 / 2.0, SQRT_2 / 2.0);
        assert!((y_then_x - expected).norm() < 1e-9);
    }

    #[test]
    fn test_rotation_value_matches_free_functions() {
        let v = Vertex3D::new(0.5, -1.0, 2.0);
        assert_eq!(Rotation::x(0.7).apply(&v), rotate_x(&v, 0.7));
        assert_eq!(Rotation::y(0.7).apply(&v), rotate_y(&v, 0.7));
        let turned = Rotation::y(0.7).apply(&v);
        let back = Rotation::y(0.7).inverse().apply(&turned);
        assert!((back - v).norm() < 1e-9);
    }

    #[test]
    fn test_subtract() {
        let a = Vertex3D::new(1.0, 2.0, 3.0);
        let b = Vertex3D::new(0.0, 0.0, 1.5);
        assert_eq!(subtract(&a, &b), Vertex3D::new(1.0, 2.0, 1.5));
    }
}
