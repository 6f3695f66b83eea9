//! Building [`EngineCamera`]s from editor state.
//!
//! A camera can come from an interactive viewport or from a scene object. Each is
//! handled by a [`CameraAssembler`] implementation:
//!
//! * [`ViewportAssembler`] reads the viewport matrices directly.
//! * [`PerspectiveAssembler`] derives intrinsics from the object's lens settings.
//! * [`TrainingCameraAssembler`] reproduces a previously imported camera verbatim from
//!   the object's custom properties.
//!
//! Scene objects pick their assembler through an [`AssemblerRegistry`] keyed by the
//! object's `camera_model` property. Unknown or missing tags fall back to the
//! registry's default assembler (the perspective one for
//! [`AssemblerRegistry::with_defaults`]). The registry is built once by the caller and
//! owned by a [`CameraConverter`], which is the entry point for conversions.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};

use crate::camera::{CameraError, EngineCamera, Resolution};
use crate::scene::{keys, CameraSource, SceneContext, SceneObject, ViewportState};

pub mod perspective;
pub mod training;
pub mod viewport;

pub use perspective::PerspectiveAssembler;
pub use training::TrainingCameraAssembler;
pub use viewport::ViewportAssembler;

/// Produces an [`EngineCamera`] from one kind of source.
///
/// Implementations are pure: they read `context` and `source` and return a fully
/// validated camera or an error, never a partially filled one.
pub trait CameraAssembler<S: ?Sized> {
    /// Builds a camera rendering at `image` resolution.
    fn assemble(
        &self,
        context: &SceneContext,
        source: &S,
        image: &Resolution,
    ) -> Result<EngineCamera, CameraError>;
}

/// Identifies a camera model stored on a scene object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CameraModelTag(Cow<'static, str>);

impl CameraModelTag {
    /// The editor's own perspective camera.
    pub const BLENDER_PERSPECTIVE: CameraModelTag =
        CameraModelTag(Cow::Borrowed("BLENDER_PERSPECTIVE"));
    /// A calibrated camera imported from a training dataset.
    pub const TRAIN_OPENCV: CameraModelTag = CameraModelTag(Cow::Borrowed("TRAIN_OPENCV"));

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CameraModelTag {
    fn from(tag: &str) -> Self {
        CameraModelTag(Cow::Owned(tag.to_string()))
    }
}

impl fmt::Display for CameraModelTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

type ObjectAssembler = Box<dyn CameraAssembler<SceneObject>>;

/// Maps camera-model tags to the assembler that handles them.
pub struct AssemblerRegistry {
    assemblers: HashMap<CameraModelTag, ObjectAssembler>,
    fallback: CameraModelTag,
}

impl AssemblerRegistry {
    /// Creates a registry holding only the fallback assembler.
    pub fn new(fallback_tag: CameraModelTag, fallback: ObjectAssembler) -> Self {
        let mut assemblers = HashMap::new();
        assemblers.insert(fallback_tag.clone(), fallback);
        AssemblerRegistry {
            assemblers,
            fallback: fallback_tag,
        }
    }

    /// Perspective cameras as the fallback plus imported training cameras.
    pub fn with_defaults() -> Self {
        AssemblerRegistry::new(
            CameraModelTag::BLENDER_PERSPECTIVE,
            Box::new(PerspectiveAssembler),
        )
        .with(
            CameraModelTag::TRAIN_OPENCV,
            Box::new(TrainingCameraAssembler),
        )
    }

    /// Registers `assembler` for `tag`, replacing any earlier one.
    pub fn with(mut self, tag: CameraModelTag, assembler: ObjectAssembler) -> Self {
        self.assemblers.insert(tag, assembler);
        self
    }

    pub fn contains(&self, tag: &CameraModelTag) -> bool {
        self.assemblers.contains_key(tag)
    }

    pub fn fallback_tag(&self) -> &CameraModelTag {
        &self.fallback
    }

    /// Returns the assembler for `tag`, or the fallback when `tag` is unknown.
    pub fn resolve(&self, tag: Option<&CameraModelTag>) -> &dyn CameraAssembler<SceneObject> {
        let chosen = match tag {
            Some(tag) if self.assemblers.contains_key(tag) => tag,
            Some(tag) => {
                warn!(
                    "Unknown camera model '{}', falling back to '{}'",
                    tag, self.fallback
                );
                &self.fallback
            }
            None => &self.fallback,
        };
        // The fallback is inserted on construction and never removed.
        self.assemblers[chosen].as_ref()
    }
}

/// Reads the camera-model tag of a scene object, if it carries a usable one.
pub fn object_camera_model(object: &SceneObject) -> Option<CameraModelTag> {
    match object.get_str(keys::CAMERA_MODEL) {
        Ok(tag) => Some(CameraModelTag::from(tag)),
        Err(CameraError::MissingField(_)) => None,
        Err(e) => {
            warn!("Ignoring camera model of '{}': {}", object.name, e);
            None
        }
    }
}

/// Entry point turning any [`CameraSource`] into an [`EngineCamera`].
///
/// # Examples
///
/// ```rust
/// use nalgebra::Matrix4;
/// use nerf_camera_tools::assembler::{AssemblerRegistry, CameraConverter};
/// use nerf_camera_tools::camera::{HostCamera, Resolution};
/// use nerf_camera_tools::scene::{CameraSource, SceneContext, SceneObject};
///
/// let converter = CameraConverter::new(AssemblerRegistry::with_defaults());
/// let object = SceneObject::new("Camera", Matrix4::identity()).with_camera(HostCamera::default());
///
/// let camera = converter
///     .convert(&SceneContext::default(), CameraSource::SceneObject(&object), &Resolution::new(800, 600))
///     .unwrap();
/// assert_eq!(camera.intrinsics.cx, 400.0);
/// ```
pub struct CameraConverter {
    registry: AssemblerRegistry,
    viewport: ViewportAssembler,
}

impl CameraConverter {
    pub fn new(registry: AssemblerRegistry) -> Self {
        CameraConverter {
            registry,
            viewport: ViewportAssembler,
        }
    }

    pub fn registry(&self) -> &AssemblerRegistry {
        &self.registry
    }

    pub fn convert(
        &self,
        context: &SceneContext,
        source: CameraSource<'_>,
        image: &Resolution,
    ) -> Result<EngineCamera, CameraError> {
        match source {
            CameraSource::Viewport(viewport) => self.convert_viewport(context, viewport, image),
            CameraSource::SceneObject(object) => {
                let tag = object_camera_model(object);
                debug!(
                    "Building camera for '{}' with model {:?}",
                    object.name,
                    tag.as_ref().map(CameraModelTag::as_str)
                );
                self.registry
                    .resolve(tag.as_ref())
                    .assemble(context, object, image)
            }
        }
    }

    fn convert_viewport(
        &self,
        context: &SceneContext,
        viewport: &ViewportState,
        image: &Resolution,
    ) -> Result<EngineCamera, CameraError> {
        debug!("Building camera for viewport ({:?})", viewport.view_perspective);
        self.viewport.assemble(context, viewport, image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{HostCamera, SensorFit};
    use crate::scene::PropertyValue;
    use nalgebra::Matrix4;

    /// Always produces the same recognizable camera.
    struct FixedAssembler(f64);

    impl CameraAssembler<SceneObject> for FixedAssembler {
        fn assemble(
            &self,
            context: &SceneContext,
            object: &SceneObject,
            image: &Resolution,
        ) -> Result<EngineCamera, CameraError> {
            let mut camera = PerspectiveAssembler.assemble(context, object, image)?;
            camera.intrinsics.fx = self.0;
            Ok(camera)
        }
    }

    fn perspective_object() -> SceneObject {
        SceneObject::new("Camera", Matrix4::identity()).with_camera(HostCamera {
            sensor_fit: SensorFit::Horizontal,
            ..HostCamera::default()
        })
    }

    #[test]
    fn test_untagged_object_uses_perspective() {
        let converter = CameraConverter::new(AssemblerRegistry::with_defaults());
        let object = perspective_object();
        let image = Resolution::new(1920, 1080);

        let camera = converter
            .convert(
                &SceneContext::default(),
                CameraSource::SceneObject(&object),
                &image,
            )
            .unwrap();
        approx::assert_relative_eq!(camera.intrinsics.fx, 50.0 / 36.0 * 1920.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unknown_tag_falls_back_to_perspective() {
        let converter = CameraConverter::new(AssemblerRegistry::with_defaults());
        let object = perspective_object().with_property(
            keys::CAMERA_MODEL,
            PropertyValue::String("SPHERICAL_QUADRILATERAL".to_string()),
        );
        let image = Resolution::new(1920, 1080);

        let camera = converter
            .convert(
                &SceneContext::default(),
                CameraSource::SceneObject(&object),
                &image,
            )
            .unwrap();
        let expected = PerspectiveAssembler
            .assemble(&SceneContext::default(), &object, &image)
            .unwrap();
        assert_eq!(camera, expected);
    }

    #[test]
    fn test_non_string_tag_falls_back() {
        let object = perspective_object().with_property(keys::CAMERA_MODEL, PropertyValue::Int(3));
        assert_eq!(object_camera_model(&object), None);
    }

    #[test]
    fn test_training_tag_dispatches_to_training_assembler() {
        let converter = CameraConverter::new(AssemblerRegistry::with_defaults());
        let object = SceneObject::load_from_yaml("samples/train_camera.yaml").unwrap();

        let camera = converter
            .convert(
                &SceneContext::default(),
                CameraSource::SceneObject(&object),
                &Resolution::new(1920, 1080),
            )
            .unwrap();
        assert_eq!(camera.resolution, Resolution::new(800, 600));
        assert_eq!(camera.intrinsics.fx, 1200.0);
        assert_eq!(camera.distortion.k1, 0.1);
    }

    #[test]
    fn test_registered_model_is_used() {
        let custom = CameraModelTag::from("CUSTOM");
        let registry =
            AssemblerRegistry::with_defaults().with(custom.clone(), Box::new(FixedAssembler(42.0)));
        assert!(registry.contains(&custom));
        assert!(registry.contains(&CameraModelTag::TRAIN_OPENCV));
        assert_eq!(registry.fallback_tag(), &CameraModelTag::BLENDER_PERSPECTIVE);

        let converter = CameraConverter::new(registry);
        let object = perspective_object()
            .with_property(keys::CAMERA_MODEL, PropertyValue::String("CUSTOM".to_string()));

        let camera = converter
            .convert(
                &SceneContext::default(),
                CameraSource::SceneObject(&object),
                &Resolution::new(640, 480),
            )
            .unwrap();
        assert_eq!(camera.intrinsics.fx, 42.0);
    }

    #[test]
    fn test_tag_equality_ignores_ownership() {
        assert_eq!(
            CameraModelTag::from("TRAIN_OPENCV"),
            CameraModelTag::TRAIN_OPENCV
        );
        assert_eq!(CameraModelTag::BLENDER_PERSPECTIVE.to_string(), "BLENDER_PERSPECTIVE");
    }
}
