//! Cameras reproduced from imported training-camera records.

use log::debug;
use nalgebra::Vector2;

use crate::assembler::CameraAssembler;
use crate::camera::{CameraError, DistortionParams, EngineCamera, Intrinsics, Resolution};
use crate::geometry;
use crate::scene::{keys, SceneContext, SceneObject};

/// Rebuilds a training camera from the fields stored on its object.
///
/// Training cameras were computed once at import time (typically from a calibration
/// file) and must come back bit-for-bit, so nothing is recomputed: resolution, clip
/// planes, intrinsics and distortion are read verbatim, the shift is zero and only
/// the world matrix goes through the convention change. The requested image size is
/// ignored in favor of the stored one.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrainingCameraAssembler;

impl CameraAssembler<SceneObject> for TrainingCameraAssembler {
    fn assemble(
        &self,
        _context: &SceneContext,
        object: &SceneObject,
        _image: &Resolution,
    ) -> Result<EngineCamera, CameraError> {
        let camera = EngineCamera {
            resolution: Resolution {
                width: object.get_u32(keys::IMAGE_W)?,
                height: object.get_u32(keys::IMAGE_H)?,
            },
            near: object.get_f64(keys::NEAR)?,
            far: object.get_f64(keys::FAR)?,
            intrinsics: Intrinsics {
                fx: object.get_f64(keys::FL_X)?,
                fy: object.get_f64(keys::FL_Y)?,
                cx: object.get_f64(keys::CX)?,
                cy: object.get_f64(keys::CY)?,
            },
            shift: Vector2::zeros(),
            transform: geometry::host_to_engine(&object.matrix_world),
            distortion: DistortionParams {
                k1: object.get_f64(keys::K1)?,
                k2: object.get_f64(keys::K2)?,
                k3: object.get_f64(keys::K3)?,
                p1: object.get_f64(keys::P1)?,
                p2: object.get_f64(keys::P2)?,
            },
            show_image_planes: object.get_bool(keys::SHOW_IMAGE_PLANES)?,
        };
        camera.validate_params()?;

        debug!("Restored training camera '{}'", object.name);
        Ok(camera)
    }
}
