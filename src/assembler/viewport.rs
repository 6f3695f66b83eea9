//! Cameras for interactive viewports.

use nalgebra::Vector2;

use crate::assembler::CameraAssembler;
use crate::camera::{CameraError, DistortionParams, EngineCamera, Intrinsics, Resolution};
use crate::conversion;
use crate::geometry;
use crate::scene::{SceneContext, ViewPerspective, ViewportState};

/// Builds a camera matching what a 3D viewport currently shows.
///
/// The focal lengths come from the diagonal of the projection matrix
/// (`0.5 * dim * P[i][i]`), which already folds in the lens of the scene camera when
/// the viewport looks through it. In camera view the clip planes and lens shift are
/// taken from the active scene camera and the vertical shift is negated on output;
/// otherwise the viewport's own clip range is used and there is no shift.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewportAssembler;

impl CameraAssembler<ViewportState> for ViewportAssembler {
    fn assemble(
        &self,
        context: &SceneContext,
        viewport: &ViewportState,
        image: &Resolution,
    ) -> Result<EngineCamera, CameraError> {
        let camera_to_world = viewport.view_matrix.try_inverse().ok_or_else(|| {
            CameraError::InvalidConfiguration("viewport view matrix is singular".to_string())
        })?;

        let projection = &viewport.window_matrix;
        let fx = 0.5 * image.width as f64 * projection[(0, 0)];
        let fy = 0.5 * image.height as f64 * projection[(1, 1)];

        let (near, far, shift) = match viewport.view_perspective {
            ViewPerspective::Camera => {
                let scene_camera = context.scene_camera.as_ref().ok_or_else(|| {
                    CameraError::InvalidConfiguration(
                        "viewport is in camera view but the scene has no camera".to_string(),
                    )
                })?;
                let shift =
                    conversion::lens_shift(&context.render_resolution, scene_camera, fx, image)?;
                (
                    scene_camera.clip_start,
                    scene_camera.clip_end,
                    Vector2::new(shift.x, -shift.y),
                )
            }
            ViewPerspective::Perspective | ViewPerspective::Orthographic => (
                context.viewport_clip_start,
                context.viewport_clip_end,
                Vector2::zeros(),
            ),
        };

        let (cx, cy) = image.center();
        let camera = EngineCamera {
            resolution: *image,
            near,
            far,
            intrinsics: Intrinsics { fx, fy, cx, cy },
            shift,
            transform: geometry::host_to_engine(&camera_to_world),
            distortion: DistortionParams::default(),
            show_image_planes: false,
        };
        camera.validate_params()?;

        Ok(camera)
    }
}
