//! The boundary form of an [`EngineCamera`].
//!
//! The engine binding takes plain single-precision arrays, not `nalgebra` types. An
//! [`EngineCameraPayload`] is the only place where that shape is produced: it is a
//! lossy, one-way copy (f64 to f32, 4x4 to the 3x4 affine part) built with
//! `From<&EngineCamera>`, and it serializes to JSON for bindings that cross a
//! process boundary.

use serde::{Deserialize, Serialize};

use crate::camera::{CameraError, EngineCamera};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineCameraPayload {
    pub resolution: [u32; 2],
    pub near: f32,
    pub far: f32,
    pub focal_length: [f32; 2],
    pub principal_point: [f32; 2],
    pub shift: [f32; 2],
    /// Row-major affine part of the camera-to-world matrix.
    pub transform: [[f32; 4]; 3],
    /// `[k1, k2, k3, p1, p2]`
    pub dist_params: [f32; 5],
    pub show_image_planes: bool,
}

impl From<&EngineCamera> for EngineCameraPayload {
    fn from(camera: &EngineCamera) -> Self {
        let m = &camera.transform;
        let mut transform = [[0.0f32; 4]; 3];
        for (row, out) in transform.iter_mut().enumerate() {
            for (col, value) in out.iter_mut().enumerate() {
                *value = m[(row, col)] as f32;
            }
        }

        let d = &camera.distortion;
        EngineCameraPayload {
            resolution: [camera.resolution.width, camera.resolution.height],
            near: camera.near as f32,
            far: camera.far as f32,
            focal_length: [camera.intrinsics.fx as f32, camera.intrinsics.fy as f32],
            principal_point: [camera.intrinsics.cx as f32, camera.intrinsics.cy as f32],
            shift: [camera.shift.x as f32, camera.shift.y as f32],
            transform,
            dist_params: [d.k1 as f32, d.k2 as f32, d.k3 as f32, d.p1 as f32, d.p2 as f32],
            show_image_planes: camera.show_image_planes,
        }
    }
}

impl EngineCameraPayload {
    pub fn to_json(&self) -> Result<String, CameraError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
