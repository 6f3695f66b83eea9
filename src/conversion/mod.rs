//! Closed-form conversions from editor lens settings to pixel-space quantities.
//!
//! The editor describes a lens in millimeters against a physical sensor and lets the
//! sensor-fit policy decide which sensor axis spans the output image. The engine
//! wants a focal length in pixels and a lens shift relative to the image it is
//! actually rendering. The functions here bridge the two and are pure: they read
//! their inputs and return a new value.

use nalgebra::Vector2;

use crate::camera::{validation, CameraError, HostCamera, Resolution, SensorFit};

fn check_sensor(camera: &HostCamera) -> Result<(), CameraError> {
    if !(camera.sensor_width > 0.0) {
        return Err(CameraError::InvalidConfiguration(format!(
            "sensor width must be positive, got {}",
            camera.sensor_width
        )));
    }
    if camera.sensor_fit == SensorFit::Vertical && !(camera.sensor_height > 0.0) {
        return Err(CameraError::InvalidConfiguration(format!(
            "sensor height must be positive for vertical fit, got {}",
            camera.sensor_height
        )));
    }
    Ok(())
}

fn check_resolution(what: &str, resolution: &Resolution) -> Result<(), CameraError> {
    validation::validate_resolution(resolution).map_err(|_| {
        CameraError::InvalidConfiguration(format!(
            "{what} resolution must be positive, got {}x{}",
            resolution.width, resolution.height
        ))
    })
}

/// Computes the focal length in pixels along the reference axis.
///
/// The reference pixel width depends on the sensor fit:
///
/// * `Auto` - the output height when the image is taller than wide, otherwise the
///   output width.
/// * `Horizontal` - the output width.
/// * `Vertical` - the output height scaled by the sensor aspect
///   (`height * sensor_width / sensor_height`).
///
/// The result is `lens / sensor_width * reference_width`.
///
/// # Errors
///
/// * [`CameraError::InvalidConfiguration`] if the sensor width is not positive, the
///   sensor height is not positive under vertical fit, or `output` has a zero axis.
///
/// # Examples
///
/// ```rust
/// use nerf_camera_tools::camera::{HostCamera, Resolution, SensorFit};
/// use nerf_camera_tools::conversion::focal_length_px;
///
/// let camera = HostCamera {
///     sensor_fit: SensorFit::Vertical,
///     ..HostCamera::default()
/// };
/// let fl = focal_length_px(&camera, &Resolution::new(1920, 1080)).unwrap();
/// assert!((fl - 2250.0).abs() < 1e-9);
/// ```
pub fn focal_length_px(camera: &HostCamera, output: &Resolution) -> Result<f64, CameraError> {
    check_sensor(camera)?;
    check_resolution("output", output)?;

    let out_w = output.width as f64;
    let out_h = output.height as f64;

    let reference_width = match camera.sensor_fit {
        SensorFit::Auto => {
            // The editor treats the sensor as square under auto fit.
            let sensor_aspect = 1.0;
            if out_h / out_w > sensor_aspect {
                out_h / sensor_aspect
            } else {
                out_w
            }
        }
        SensorFit::Horizontal => out_w,
        SensorFit::Vertical => out_h * camera.sensor_width / camera.sensor_height,
    };

    Ok(camera.lens / camera.sensor_width * reference_width)
}

/// Computes the lens shift to apply at the engine image resolution.
///
/// The editor's shift is a fraction of the fitted sensor axis at the *render*
/// resolution, while training images may have a different size. The conversion
/// recovers the horizontal field of view at the render resolution, rebuilds the
/// camera plane extent at `fl_x` (the focal length already computed for the engine
/// image), picks the fitted axis from that plane and rescales the shift onto
/// `image`.
///
/// Under `Auto` fit the axis is chosen by comparing the rebuilt plane width against
/// its height, which is not the same test [`focal_length_px`] applies.
///
/// # Arguments
///
/// * `render` - The editor's output render resolution.
/// * `camera` - Lens settings holding the raw shift.
/// * `fl_x` - Engine focal length in pixels along x.
/// * `image` - Engine image resolution.
///
/// # Errors
///
/// * [`CameraError::InvalidConfiguration`] if `render` or `image` has a zero axis, or
///   the lens is rejected by [`focal_length_px`].
pub fn lens_shift(
    render: &Resolution,
    camera: &HostCamera,
    fl_x: f64,
    image: &Resolution,
) -> Result<Vector2<f64>, CameraError> {
    check_resolution("render", render)?;
    check_resolution("image", image)?;
    let render_fl = focal_length_px(camera, render)?;

    let out_w = render.width as f64;
    let out_h = render.height as f64;

    let angle_x = 2.0 * (0.5 * out_w).atan2(render_fl);
    let plane_w = 2.0 * fl_x * (0.5 * angle_x).tan();
    let plane_h = out_h / out_w * plane_w;

    let horizontal_fit = match camera.sensor_fit {
        SensorFit::Horizontal => true,
        SensorFit::Auto => plane_w > plane_h,
        SensorFit::Vertical => false,
    };
    let reference = if horizontal_fit { plane_w } else { plane_h };

    let u = reference / image.width as f64;
    let v = reference / image.height as f64;

    Ok(Vector2::new(u * camera.shift_x, v * camera.shift_y))
}

/// Converts an aperture f-stop into the aperture size the engine expects.
pub fn fstop_to_aperture_size(fstop: f64) -> Result<f64, CameraError> {
    if !(fstop > 0.0) {
        return Err(CameraError::InvalidConfiguration(format!(
            "f-stop must be positive, got {fstop}"
        )));
    }
    Ok(1.0 / (2.0 * fstop))
}
