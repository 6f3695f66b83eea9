//! Implements the pinhole camera handed to the NeRF engine.
//!
//! This module provides the [`EngineCamera`] struct: pixel resolution, clip planes,
//! pinhole intrinsics, a normalized lens shift, a camera-to-world transform in the
//! engine convention and Brown-Conrady distortion. Instances are built fresh by the
//! assemblers in [`crate::assembler`] and never mutated afterwards; derived variants
//! such as [`EngineCamera::with_flipped_y`] return a new camera.

use std::fs;
use std::io::Write;

use log::info;
use nalgebra::{Matrix4, Vector2};
use serde::{Deserialize, Serialize};

use crate::camera::{validation, CameraError, DistortionParams, Intrinsics, Resolution};
use crate::geometry;

/// A pinhole camera in engine convention.
///
/// # Examples
///
/// ```rust
/// use nalgebra::{Matrix4, Vector2};
/// use nerf_camera_tools::camera::{DistortionParams, EngineCamera, Intrinsics, Resolution};
///
/// let camera = EngineCamera {
///     resolution: Resolution::new(800, 600),
///     near: 0.01,
///     far: 100.0,
///     intrinsics: Intrinsics { fx: 1200.0, fy: 1200.0, cx: 400.0, cy: 300.0 },
///     shift: Vector2::zeros(),
///     transform: Matrix4::identity(),
///     distortion: DistortionParams::default(),
///     show_image_planes: false,
/// };
/// assert!(camera.validate_params().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineCamera {
    /// Image size in pixels.
    pub resolution: Resolution,
    pub near: f64,
    pub far: f64,
    /// Focal length and principal point in pixels.
    pub intrinsics: Intrinsics,
    /// Lens shift in units of output pixels, normalized by the image size.
    pub shift: Vector2<f64>,
    /// Camera-to-world matrix in engine convention.
    pub transform: Matrix4<f64>,
    pub distortion: DistortionParams,
    /// Whether the engine draws this camera's image plane. Metadata only.
    pub show_image_planes: bool,
}

impl EngineCamera {
    /// Validates the invariants every engine camera must hold.
    ///
    /// # Errors
    ///
    /// * [`CameraError::InvalidResolution`] if either dimension is zero.
    /// * [`CameraError::FocalLengthMustBePositive`] if `fx` or `fy` is not positive.
    /// * [`CameraError::PrincipalPointMustBeFinite`] if `cx` or `cy` is not finite.
    /// * [`CameraError::InvalidClipPlanes`] unless `near < far`.
    /// * [`CameraError::InvalidConfiguration`] if the shift or transform holds a
    ///   non-finite value.
    pub fn validate_params(&self) -> Result<(), CameraError> {
        validation::validate_resolution(&self.resolution)?;
        validation::validate_intrinsics(&self.intrinsics)?;
        validation::validate_clip_planes(self.near, self.far)?;
        validation::validate_finite("shift", self.shift.iter())?;
        validation::validate_finite("transform", self.transform.iter())?;
        Ok(())
    }

    /// Returns a copy whose vertical transform axis and vertical shift are negated.
    ///
    /// Consumers that index image rows bottom-up render with this variant. Resolution,
    /// clip planes, intrinsics and distortion are carried over untouched, and applying
    /// the flip twice gives back the original camera.
    pub fn with_flipped_y(&self) -> EngineCamera {
        EngineCamera {
            shift: Vector2::new(self.shift.x, -self.shift.y),
            transform: geometry::flip_vertical_axis(&self.transform),
            ..self.clone()
        }
    }

    /// The camera-to-world matrix converted back to the editor convention.
    pub fn host_transform(&self) -> Matrix4<f64> {
        geometry::engine_to_host(&self.transform)
    }

    /// Loads a camera previously written by [`EngineCamera::save_to_yaml`].
    ///
    /// # Errors
    ///
    /// * [`CameraError::IOError`] if the file cannot be read.
    /// * [`CameraError::YamlError`] if the document does not describe a camera.
    /// * Any error from [`EngineCamera::validate_params`].
    pub fn load_from_yaml(path: &str) -> Result<Self, CameraError> {
        let contents = fs::read_to_string(path)?;
        let camera: EngineCamera = serde_yaml::from_str(&contents)?;
        camera.validate_params()?;

        info!("Loaded engine camera from {path}");
        Ok(camera)
    }

    /// Saves the camera to a YAML file.
    ///
    /// # Errors
    ///
    /// * [`CameraError::YamlError`] if serialization fails.
    /// * [`CameraError::IOError`] if the file cannot be created or written.
    pub fn save_to_yaml(&self, path: &str) -> Result<(), CameraError> {
        let yaml_string = serde_yaml::to_string(self)?;

        let mut file = fs::File::create(path)?;
        file.write_all(yaml_string.as_bytes())?;

        info!("Saved engine camera to {path}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Rotation3, Translation3};

    fn sample_camera() -> EngineCamera {
        let pose = Translation3::new(1.0, -2.0, 0.5).to_homogeneous()
            * Rotation3::from_euler_angles(0.2, 0.4, -0.7).to_homogeneous();
        EngineCamera {
            resolution: Resolution::new(800, 600),
            near: 0.01,
            far: 100.0,
            intrinsics: Intrinsics {
                fx: 1200.0,
                fy: 1180.0,
                cx: 401.5,
                cy: 298.25,
            },
            shift: Vector2::new(0.125, -0.0625),
            transform: geometry::host_to_engine(&pose),
            distortion: DistortionParams {
                k1: 0.1,
                k2: -0.01,
                k3: 0.001,
                p1: 0.0005,
                p2: -0.0002,
            },
            show_image_planes: true,
        }
    }

    #[test]
    fn test_validate_params_rejects_bad_cameras() {
        assert!(sample_camera().validate_params().is_ok());

        let mut cam = sample_camera();
        cam.resolution.height = 0;
        assert!(matches!(
            cam.validate_params(),
            Err(CameraError::InvalidResolution { .. })
        ));

        let mut cam = sample_camera();
        cam.intrinsics.fy = -1.0;
        assert!(matches!(
            cam.validate_params(),
            Err(CameraError::FocalLengthMustBePositive)
        ));

        let mut cam = sample_camera();
        cam.near = cam.far;
        assert!(matches!(
            cam.validate_params(),
            Err(CameraError::InvalidClipPlanes { .. })
        ));
    }

    #[test]
    fn test_validate_params_rejects_non_finite_shift_and_transform() {
        let mut cam = sample_camera();
        cam.shift.y = f64::NAN;
        assert!(matches!(
            cam.validate_params(),
            Err(CameraError::InvalidConfiguration(_))
        ));

        let mut cam = sample_camera();
        cam.transform[(2, 3)] = f64::INFINITY;
        assert!(matches!(
            cam.validate_params(),
            Err(CameraError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_flipped_y_changes_only_transform_and_shift() {
        let cam = sample_camera();
        let flipped = cam.with_flipped_y();

        assert_eq!(flipped.resolution, cam.resolution);
        assert_eq!(flipped.near, cam.near);
        assert_eq!(flipped.far, cam.far);
        assert_eq!(flipped.intrinsics, cam.intrinsics);
        assert_eq!(flipped.distortion, cam.distortion);
        assert_eq!(flipped.show_image_planes, cam.show_image_planes);

        assert_eq!(flipped.shift.x, cam.shift.x);
        assert_eq!(flipped.shift.y, -cam.shift.y);
        assert_eq!(flipped.transform.column(1), -cam.transform.column(1));
        assert_eq!(flipped.transform.column(0), cam.transform.column(0));
        assert_eq!(flipped.transform.column(2), cam.transform.column(2));
        assert_eq!(flipped.transform.column(3), cam.transform.column(3));
    }

    #[test]
    fn test_flipped_y_is_involution() {
        let cam = sample_camera();
        let snapshot = cam.clone();

        let twice = cam.with_flipped_y().with_flipped_y();
        assert_eq!(twice, cam);
        // The source camera is left as it was.
        assert_eq!(cam, snapshot);
    }

    #[test]
    fn test_host_transform_undoes_engine_conversion() {
        let cam = sample_camera();
        let back = geometry::host_to_engine(&cam.host_transform());
        approx::assert_relative_eq!(back, cam.transform, epsilon = 1e-9);
    }

    #[test]
    fn test_engine_camera_save_and_load_yaml() {
        fs::create_dir_all("output").expect("Failed to create output directory for test.");
        let output_path = "output/engine_camera_saved.yaml";

        let cam = sample_camera();
        cam.save_to_yaml(output_path).unwrap();
        let loaded = EngineCamera::load_from_yaml(output_path).unwrap();

        assert_eq!(loaded.resolution, cam.resolution);
        assert_eq!(loaded.intrinsics, cam.intrinsics);
        assert_eq!(loaded.distortion, cam.distortion);
        assert_eq!(loaded.show_image_planes, cam.show_image_planes);
        approx::assert_relative_eq!(loaded.transform, cam.transform, epsilon = 1e-12);
        approx::assert_relative_eq!(loaded.shift, cam.shift, epsilon = 1e-12);

        fs::remove_file(output_path).unwrap();
    }

    #[test]
    fn test_load_from_yaml_missing_file() {
        let err = EngineCamera::load_from_yaml("samples/does_not_exist.yaml").unwrap_err();
        assert!(matches!(err, CameraError::IOError(_)));
    }
}
