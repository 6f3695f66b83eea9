//! NeRF Camera Tools Library
//!
//! Converts editor cameras into the pinhole cameras a NeRF engine trains and renders
//! with. The library covers:
//! - Pixel-space focal length and lens shift from sensor/lens settings
//! - Coordinate-convention changes of camera-to-world transforms
//! - Camera assembly from viewports, perspective cameras and imported training cameras
//! - A flat, serializable payload for the engine binding boundary
//!
//! Every conversion is a pure function of its inputs; nothing is cached.

pub mod assembler;
pub mod camera;
pub mod conversion;
pub mod geometry;
pub mod scene;

// Re-export commonly used types
pub use assembler::{
    AssemblerRegistry, CameraAssembler, CameraConverter, CameraModelTag, PerspectiveAssembler,
    TrainingCameraAssembler, ViewportAssembler,
};
pub use camera::{
    CameraError, DistortionParams, EngineCamera, EngineCameraPayload, HostCamera, Intrinsics,
    Resolution, SensorFit,
};
pub use scene::{CameraSource, SceneContext, SceneObject, ViewPerspective, ViewportState};
