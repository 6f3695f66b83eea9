//! Camera value types shared by the host and engine camera representations.
//!
//! This module holds the small building blocks ([`Resolution`], [`Intrinsics`],
//! [`DistortionParams`]) and the [`CameraError`] type returned by every fallible
//! operation in the crate. The concrete camera representations live in the
//! submodules:
//!
//! * [`host`] - the editor-side camera (sensor size, lens in millimeters, sensor fit).
//! * [`engine`] - the pinhole camera consumed by the NeRF engine.
//! * [`payload`] - the flat form of an engine camera handed across the binding boundary.

use serde::{Deserialize, Serialize};

pub mod engine;
pub mod host;
pub mod payload;

pub use engine::EngineCamera;
pub use host::{HostCamera, SensorFit};
pub use payload::EngineCameraPayload;

/// Pinhole intrinsics in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Resolution { width, height }
    }

    /// Pixel centre of the image.
    pub fn center(&self) -> (f64, f64) {
        (0.5 * self.width as f64, 0.5 * self.height as f64)
    }
}

/// Brown-Conrady lens distortion coefficients.
///
/// A camera without distortion carries all-zero coefficients rather than `None`,
/// so consumers never branch on presence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DistortionParams {
    /// Radial coefficients.
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
    /// Tangential coefficients.
    pub p1: f64,
    pub p2: f64,
}

impl DistortionParams {
    /// Returns `true` when every coefficient is zero.
    pub fn is_identity(&self) -> bool {
        self.k1 == 0.0 && self.k2 == 0.0 && self.k3 == 0.0 && self.p1 == 0.0 && self.p2 == 0.0
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CameraError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Missing field: {0}")]
    MissingField(String),
    #[error("Focal length must be positive")]
    FocalLengthMustBePositive,
    #[error("Principal point must be finite")]
    PrincipalPointMustBeFinite,
    #[error("Resolution must be positive, got {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },
    #[error("Near plane {near} must be in front of far plane {far}")]
    InvalidClipPlanes { near: f64, far: f64 },
    #[error("Failed to load YAML: {0}")]
    YamlError(String),
    #[error("JSON error: {0}")]
    JsonError(String),
    #[error("IO Error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for CameraError {
    fn from(err: std::io::Error) -> Self {
        CameraError::IOError(err.to_string())
    }
}

impl From<yaml_rust::ScanError> for CameraError {
    fn from(err: yaml_rust::ScanError) -> Self {
        CameraError::YamlError(err.to_string())
    }
}

impl From<serde_yaml::Error> for CameraError {
    fn from(err: serde_yaml::Error) -> Self {
        CameraError::YamlError(err.to_string())
    }
}

impl From<serde_json::Error> for CameraError {
    fn from(err: serde_json::Error) -> Self {
        CameraError::JsonError(err.to_string())
    }
}

/// Common validation functions for camera parameters
pub mod validation {
    use super::*;

    pub fn validate_intrinsics(intrinsics: &Intrinsics) -> Result<(), CameraError> {
        // Written negated so NaN fails too.
        if !(intrinsics.fx > 0.0 && intrinsics.fy > 0.0) {
            return Err(CameraError::FocalLengthMustBePositive);
        }
        if !intrinsics.cx.is_finite() || !intrinsics.cy.is_finite() {
            return Err(CameraError::PrincipalPointMustBeFinite);
        }
        Ok(())
    }

    pub fn validate_resolution(resolution: &Resolution) -> Result<(), CameraError> {
        if resolution.width == 0 || resolution.height == 0 {
            return Err(CameraError::InvalidResolution {
                width: resolution.width,
                height: resolution.height,
            });
        }
        Ok(())
    }

    pub fn validate_finite<'a>(
        what: &str,
        values: impl IntoIterator<Item = &'a f64>,
    ) -> Result<(), CameraError> {
        if values.into_iter().any(|v| !v.is_finite()) {
            return Err(CameraError::InvalidConfiguration(format!(
                "{what} must be finite"
            )));
        }
        Ok(())
    }

    pub fn validate_clip_planes(near: f64, far: f64) -> Result<(), CameraError> {
        if !(near < far) || !near.is_finite() || !far.is_finite() {
            return Err(CameraError::InvalidClipPlanes { near, far });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn test_validate_intrinsics() {
        let good = Intrinsics {
            fx: 500.0,
            fy: 500.0,
            cx: 320.0,
            cy: 240.0,
        };
        assert!(validate_intrinsics(&good).is_ok());

        let zero_fx = Intrinsics { fx: 0.0, ..good };
        assert!(matches!(
            validate_intrinsics(&zero_fx),
            Err(CameraError::FocalLengthMustBePositive)
        ));

        let nan_fy = Intrinsics {
            fy: f64::NAN,
            ..good
        };
        assert!(validate_intrinsics(&nan_fy).is_err());

        let inf_cx = Intrinsics {
            cx: f64::INFINITY,
            ..good
        };
        assert!(matches!(
            validate_intrinsics(&inf_cx),
            Err(CameraError::PrincipalPointMustBeFinite)
        ));
    }

    #[test]
    fn test_validate_resolution_and_clip_planes() {
        assert!(validate_resolution(&Resolution::new(800, 600)).is_ok());
        assert!(validate_resolution(&Resolution::new(0, 600)).is_err());
        assert!(validate_resolution(&Resolution::new(800, 0)).is_err());

        assert!(validate_clip_planes(0.1, 100.0).is_ok());
        assert!(validate_clip_planes(100.0, 100.0).is_err());
        assert!(validate_clip_planes(10.0, 1.0).is_err());
        assert!(validate_clip_planes(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_distortion_default_is_identity() {
        let dist = DistortionParams::default();
        assert!(dist.is_identity());

        let dist = DistortionParams { k1: 0.1, ..dist };
        assert!(!dist.is_identity());
    }

    #[test]
    fn test_resolution_center() {
        let (cx, cy) = Resolution::new(800, 600).center();
        assert_eq!(cx, 400.0);
        assert_eq!(cy, 300.0);
    }
}
