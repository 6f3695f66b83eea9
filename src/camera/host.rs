//! The editor-side camera description.
//!
//! A [`HostCamera`] mirrors the lens settings of a camera data-block in the
//! editor: a physical sensor, a focal length in millimeters, a sensor-fit policy
//! and a lens shift expressed as a fraction of the sensor. It carries no pose;
//! the pose belongs to the scene object that owns the camera.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::camera::CameraError;

/// Which sensor axis the editor keeps fixed when the output aspect changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorFit {
    /// Fit to the larger of the two output axes.
    Auto,
    Horizontal,
    Vertical,
}

impl FromStr for SensorFit {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AUTO" => Ok(SensorFit::Auto),
            "HORIZONTAL" => Ok(SensorFit::Horizontal),
            "VERTICAL" => Ok(SensorFit::Vertical),
            other => Err(CameraError::InvalidConfiguration(format!(
                "unsupported sensor fit '{other}'"
            ))),
        }
    }
}

impl fmt::Display for SensorFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorFit::Auto => "AUTO",
            SensorFit::Horizontal => "HORIZONTAL",
            SensorFit::Vertical => "VERTICAL",
        };
        f.write_str(name)
    }
}

/// Lens and sensor settings of an editor camera.
///
/// # Examples
///
/// ```rust
/// use nerf_camera_tools::camera::{HostCamera, SensorFit};
///
/// let camera = HostCamera {
///     sensor_fit: SensorFit::Vertical,
///     ..HostCamera::default()
/// };
/// assert_eq!(camera.sensor_width, 36.0);
/// assert_eq!(camera.lens, 50.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostCamera {
    /// Sensor width in millimeters.
    pub sensor_width: f64,
    /// Sensor height in millimeters.
    pub sensor_height: f64,
    /// Focal length in millimeters.
    pub lens: f64,
    pub sensor_fit: SensorFit,
    /// Horizontal lens shift as a fraction of the fitted sensor axis.
    pub shift_x: f64,
    /// Vertical lens shift as a fraction of the fitted sensor axis.
    pub shift_y: f64,
    pub clip_start: f64,
    pub clip_end: f64,
}

impl Default for HostCamera {
    /// The editor's stock camera: a 36x24mm sensor behind a 50mm lens.
    fn default() -> Self {
        HostCamera {
            sensor_width: 36.0,
            sensor_height: 24.0,
            lens: 50.0,
            sensor_fit: SensorFit::Auto,
            shift_x: 0.0,
            shift_y: 0.0,
            clip_start: 0.1,
            clip_end: 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_fit_from_str() {
        assert_eq!("AUTO".parse::<SensorFit>().unwrap(), SensorFit::Auto);
        assert_eq!(
            "HORIZONTAL".parse::<SensorFit>().unwrap(),
            SensorFit::Horizontal
        );
        assert_eq!(
            "VERTICAL".parse::<SensorFit>().unwrap(),
            SensorFit::Vertical
        );
    }

    #[test]
    fn test_sensor_fit_rejects_unknown_values() {
        for bad in ["auto", "DIAGONAL", ""] {
            let err = bad.parse::<SensorFit>().unwrap_err();
            assert!(matches!(err, CameraError::InvalidConfiguration(_)));
        }
    }

    #[test]
    fn test_sensor_fit_display_matches_parse() {
        for fit in [SensorFit::Auto, SensorFit::Horizontal, SensorFit::Vertical] {
            assert_eq!(fit.to_string().parse::<SensorFit>().unwrap(), fit);
        }
    }
}
