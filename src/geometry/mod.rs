//! Camera-to-world transform helpers.
//!
//! The editor stores camera poses right-handed with world Z up, the camera looking
//! down its local -Z axis and local +Y pointing up. The engine expects the camera to
//! look down +Z with +Y pointing down the image, and its world axes cycled so that
//! editor (x, y, z) become engine (y, z, x). Both directions are a fixed change of
//! basis:
//!
//! ```text
//! to_engine(M)   = W  * M * C
//! from_engine(M) = Wt * M * C
//! ```
//!
//! where `C = diag(1, -1, -1, 1)` re-orients the camera axes and `W` is the world
//! axis permutation. `C` is its own inverse and `W` is orthogonal, so the two are
//! exact inverses of each other.

use nalgebra::{Matrix4, Vector4};

/// Re-orients the local camera axes: +Y up / -Z forward becomes +Y down / +Z forward.
fn camera_basis() -> Matrix4<f64> {
    Matrix4::from_diagonal(&Vector4::new(1.0, -1.0, -1.0, 1.0))
}

/// Cycles world axes so that row `i` of the result is row `(i + 1) % 3` of the input.
#[rustfmt::skip]
fn world_basis() -> Matrix4<f64> {
    Matrix4::new(
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Converts an editor camera-to-world matrix into the engine convention.
///
/// # Examples
///
/// ```rust
/// use nalgebra::Matrix4;
/// use nerf_camera_tools::geometry::{host_to_engine, engine_to_host};
///
/// let pose = Matrix4::new_translation(&nalgebra::Vector3::new(1.0, 2.0, 3.0));
/// let engine = host_to_engine(&pose);
/// // Editor x/y/z translation becomes engine z/x/y.
/// assert_eq!(engine[(0, 3)], 2.0);
/// assert_eq!(engine[(1, 3)], 3.0);
/// assert_eq!(engine[(2, 3)], 1.0);
/// assert_eq!(engine_to_host(&engine), pose);
/// ```
pub fn host_to_engine(camera_to_world: &Matrix4<f64>) -> Matrix4<f64> {
    world_basis() * camera_to_world * camera_basis()
}

/// Inverse of [`host_to_engine`].
pub fn engine_to_host(camera_to_world: &Matrix4<f64>) -> Matrix4<f64> {
    world_basis().transpose() * camera_to_world * camera_basis()
}

/// Negates the vertical basis column of a camera-to-world matrix.
///
/// Applying it twice gives back the input.
pub fn flip_vertical_axis(camera_to_world: &Matrix4<f64>) -> Matrix4<f64> {
    let mut flipped = *camera_to_world;
    flipped.column_mut(1).neg_mut();
    flipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Rotation3, Translation3, Vector3};

    fn sample_pose() -> Matrix4<f64> {
        let rotation = Rotation3::from_euler_angles(0.3, -1.1, 2.4);
        let translation = Translation3::new(4.0, -2.5, 1.75);
        translation.to_homogeneous() * rotation.to_homogeneous()
    }

    #[test]
    fn test_round_trip_is_identity() {
        let pose = sample_pose();

        let there_and_back = engine_to_host(&host_to_engine(&pose));
        assert_relative_eq!(there_and_back, pose, epsilon = 1e-6);

        let back_and_there = host_to_engine(&engine_to_host(&pose));
        assert_relative_eq!(back_and_there, pose, epsilon = 1e-6);
    }

    #[test]
    fn test_identity_pose_looks_down_engine_forward() {
        let engine = host_to_engine(&Matrix4::identity());

        // Editor cameras look down -Z; the engine forward column (+Z) must map to the
        // editor's viewing direction expressed in engine world axes.
        let editor_forward = Vector3::new(0.0, 0.0, -1.0);
        let expected = world_basis().fixed_view::<3, 3>(0, 0) * editor_forward;
        let engine_forward = engine.fixed_view::<3, 1>(0, 2).into_owned();
        assert_relative_eq!(engine_forward, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_conversion_preserves_rotation() {
        let engine = host_to_engine(&sample_pose());
        let rotation = engine.fixed_view::<3, 3>(0, 0).into_owned();

        assert_relative_eq!(
            rotation * rotation.transpose(),
            nalgebra::Matrix3::identity(),
            epsilon = 1e-9
        );
        assert_relative_eq!(rotation.determinant(), 1.0, epsilon = 1e-9);
        assert_eq!(engine.row(3).into_owned(), Matrix4::<f64>::identity().row(3).into_owned());
    }

    #[test]
    fn test_flip_vertical_axis_is_involution() {
        let pose = sample_pose();
        let flipped = flip_vertical_axis(&pose);

        for row in 0..4 {
            assert_eq!(flipped[(row, 1)], -pose[(row, 1)]);
            assert_eq!(flipped[(row, 0)], pose[(row, 0)]);
            assert_eq!(flipped[(row, 2)], pose[(row, 2)]);
            assert_eq!(flipped[(row, 3)], pose[(row, 3)]);
        }
        assert_eq!(flip_vertical_axis(&flipped), pose);
    }
}
