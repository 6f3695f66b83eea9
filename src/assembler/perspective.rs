//! Cameras derived from an editor perspective camera.

use crate::assembler::CameraAssembler;
use crate::camera::{CameraError, DistortionParams, EngineCamera, Intrinsics, Resolution};
use crate::conversion;
use crate::geometry;
use crate::scene::{SceneContext, SceneObject};

/// The general case: intrinsics and shift are computed from the object's lens.
///
/// `fx` comes from [`conversion::focal_length_px`] and is reused for `fy` (square
/// pixels), the principal point sits at the image centre, clip planes are the lens
/// clip range and the shift is rescaled with [`conversion::lens_shift`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PerspectiveAssembler;

impl CameraAssembler<SceneObject> for PerspectiveAssembler {
    fn assemble(
        &self,
        context: &SceneContext,
        object: &SceneObject,
        image: &Resolution,
    ) -> Result<EngineCamera, CameraError> {
        let lens = object.camera.as_ref().ok_or_else(|| {
            CameraError::InvalidConfiguration(format!("'{}' is not a camera object", object.name))
        })?;

        let fl = conversion::focal_length_px(lens, image)?;
        let shift = conversion::lens_shift(&context.render_resolution, lens, fl, image)?;
        let (cx, cy) = image.center();

        let camera = EngineCamera {
            resolution: *image,
            near: lens.clip_start,
            far: lens.clip_end,
            intrinsics: Intrinsics {
                fx: fl,
                fy: fl,
                cx,
                cy,
            },
            shift,
            transform: geometry::host_to_engine(&object.matrix_world),
            distortion: DistortionParams::default(),
            show_image_planes: false,
        };
        camera.validate_params()?;

        Ok(camera)
    }
}
