//! Read-only snapshots of editor state consumed by the camera assemblers.
//!
//! Nothing here talks to the editor. The host integration copies what it needs into
//! these structs and hands them to [`crate::assembler::CameraConverter`]:
//!
//! * [`SceneContext`] - render settings, the active scene camera and viewport clipping.
//! * [`ViewportState`] - the matrices of an interactive 3D viewport.
//! * [`SceneObject`] - an object with a world matrix, optional lens data and custom
//!   properties (the persisted fields of imported training cameras live there).
//! * [`CameraSource`] - what a camera is being built from.

use std::collections::BTreeMap;
use std::fs;

use log::info;
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};
use yaml_rust::{Yaml, YamlLoader};

use crate::camera::{CameraError, HostCamera, Resolution, SensorFit};

/// Custom-property keys written on scene objects.
pub mod keys {
    pub const CAMERA_MODEL: &str = "camera_model";
    pub const IMAGE_W: &str = "image_w";
    pub const IMAGE_H: &str = "image_h";
    pub const NEAR: &str = "near";
    pub const FAR: &str = "far";
    pub const FL_X: &str = "fl_x";
    pub const FL_Y: &str = "fl_y";
    pub const CX: &str = "cx";
    pub const CY: &str = "cy";
    pub const K1: &str = "k1";
    pub const K2: &str = "k2";
    pub const K3: &str = "k3";
    pub const P1: &str = "p1";
    pub const P2: &str = "p2";
    pub const SHOW_IMAGE_PLANES: &str = "show_image_planes";
}

/// How a 3D viewport is looking at the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewPerspective {
    /// Looking through the active scene camera.
    Camera,
    Perspective,
    Orthographic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    /// Projection matrix of the viewport region.
    pub window_matrix: Matrix4<f64>,
    /// World-to-view matrix as the editor stores it.
    pub view_matrix: Matrix4<f64>,
    pub view_perspective: ViewPerspective,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneContext {
    /// Output resolution of the scene's render settings.
    pub render_resolution: Resolution,
    /// Lens data of the active scene camera, if the scene has one.
    pub scene_camera: Option<HostCamera>,
    pub viewport_clip_start: f64,
    pub viewport_clip_end: f64,
}

impl Default for SceneContext {
    fn default() -> Self {
        SceneContext {
            render_resolution: Resolution::new(1920, 1080),
            scene_camera: None,
            viewport_clip_start: 0.01,
            viewport_clip_end: 1000.0,
        }
    }
}

/// Value of an object custom property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    pub matrix_world: Matrix4<f64>,
    /// Present when the object is a camera.
    pub camera: Option<HostCamera>,
    pub properties: BTreeMap<String, PropertyValue>,
}

fn wrong_type(key: &str, expected: &str, value: &PropertyValue) -> CameraError {
    CameraError::InvalidConfiguration(format!(
        "property '{key}' should be {expected}, got {value:?}"
    ))
}

impl SceneObject {
    pub fn new(name: impl Into<String>, matrix_world: Matrix4<f64>) -> Self {
        SceneObject {
            name: name.into(),
            matrix_world,
            camera: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_camera(mut self, camera: HostCamera) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    fn property(&self, key: &str) -> Result<&PropertyValue, CameraError> {
        self.properties
            .get(key)
            .ok_or_else(|| CameraError::MissingField(key.to_string()))
    }

    /// Reads a numeric property. Integers are widened.
    pub fn get_f64(&self, key: &str) -> Result<f64, CameraError> {
        match self.property(key)? {
            PropertyValue::Float(v) => Ok(*v),
            PropertyValue::Int(v) => Ok(*v as f64),
            other => Err(wrong_type(key, "a number", other)),
        }
    }

    /// Reads a pixel count. Floats are accepted when they hold a whole number.
    pub fn get_u32(&self, key: &str) -> Result<u32, CameraError> {
        let value = self.property(key)?;
        match value {
            PropertyValue::Int(v) => u32::try_from(*v).map_err(|_| wrong_type(key, "a u32", value)),
            PropertyValue::Float(v) if v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64 => {
                Ok(*v as u32)
            }
            other => Err(wrong_type(key, "a u32", other)),
        }
    }

    /// Reads a flag. The editor stores booleans from scripts as 0/1 integers too.
    pub fn get_bool(&self, key: &str) -> Result<bool, CameraError> {
        match self.property(key)? {
            PropertyValue::Bool(v) => Ok(*v),
            PropertyValue::Int(v) => Ok(*v != 0),
            other => Err(wrong_type(key, "a bool", other)),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<&str, CameraError> {
        match self.property(key)? {
            PropertyValue::String(v) => Ok(v.as_str()),
            other => Err(wrong_type(key, "a string", other)),
        }
    }

    /// Loads an object record from a YAML file.
    ///
    /// The document holds a single `object` mapping with `name`, `matrix_world`
    /// (16 numbers, row-major), an optional `camera` mapping mirroring
    /// [`HostCamera`] and an optional `properties` mapping of scalars.
    ///
    /// # Errors
    ///
    /// * [`CameraError::IOError`] if the file cannot be read.
    /// * [`CameraError::YamlError`] if the YAML is malformed.
    /// * [`CameraError::MissingField`] if a required key is absent.
    /// * [`CameraError::InvalidConfiguration`] if a value has the wrong type or an
    ///   unsupported sensor fit.
    pub fn load_from_yaml(path: &str) -> Result<Self, CameraError> {
        let contents = fs::read_to_string(path)?;
        let docs = YamlLoader::load_from_str(&contents)?;
        let doc = docs
            .first()
            .ok_or_else(|| CameraError::YamlError(format!("{path} is empty")))?;
        let object = &doc["object"];
        if object.is_badvalue() {
            return Err(CameraError::MissingField("object".to_string()));
        }

        let name = object["name"]
            .as_str()
            .ok_or_else(|| CameraError::MissingField("name".to_string()))?
            .to_string();

        let matrix_yaml = object["matrix_world"]
            .as_vec()
            .ok_or_else(|| CameraError::MissingField("matrix_world".to_string()))?;
        if matrix_yaml.len() != 16 {
            return Err(CameraError::InvalidConfiguration(format!(
                "matrix_world needs 16 values, got {}",
                matrix_yaml.len()
            )));
        }
        let values = matrix_yaml
            .iter()
            .map(|v| yaml_number(v, "matrix_world"))
            .collect::<Result<Vec<f64>, CameraError>>()?;
        let matrix_world = Matrix4::from_row_slice(&values);

        let camera = match &object["camera"] {
            Yaml::BadValue => None,
            camera_yaml => Some(parse_host_camera(camera_yaml)?),
        };

        let mut properties = BTreeMap::new();
        match &object["properties"] {
            Yaml::BadValue => {}
            Yaml::Hash(hash) => {
                for (key, value) in hash {
                    let key = key.as_str().ok_or_else(|| {
                        CameraError::InvalidConfiguration(
                            "property keys must be strings".to_string(),
                        )
                    })?;
                    properties.insert(key.to_string(), parse_property(key, value)?);
                }
            }
            _ => {
                return Err(CameraError::InvalidConfiguration(
                    "properties must be a mapping".to_string(),
                ))
            }
        }

        info!(
            "Loaded scene object '{}' ({} properties) from {}",
            name,
            properties.len(),
            path
        );

        Ok(SceneObject {
            name,
            matrix_world,
            camera,
            properties,
        })
    }
}

fn yaml_number(value: &Yaml, what: &str) -> Result<f64, CameraError> {
    match value {
        Yaml::Real(_) => value.as_f64(),
        Yaml::Integer(i) => Some(*i as f64),
        _ => None,
    }
    .ok_or_else(|| CameraError::InvalidConfiguration(format!("{what}: not a number")))
}

fn parse_host_camera(yaml: &Yaml) -> Result<HostCamera, CameraError> {
    let number = |key: &str| -> Result<f64, CameraError> {
        let value = &yaml[key];
        if value.is_badvalue() {
            return Err(CameraError::MissingField(key.to_string()));
        }
        yaml_number(value, key)
    };

    let sensor_fit: SensorFit = yaml["sensor_fit"]
        .as_str()
        .ok_or_else(|| CameraError::MissingField("sensor_fit".to_string()))?
        .parse()?;

    Ok(HostCamera {
        sensor_width: number("sensor_width")?,
        sensor_height: number("sensor_height")?,
        lens: number("lens")?,
        sensor_fit,
        shift_x: number("shift_x")?,
        shift_y: number("shift_y")?,
        clip_start: number("clip_start")?,
        clip_end: number("clip_end")?,
    })
}

fn parse_property(key: &str, value: &Yaml) -> Result<PropertyValue, CameraError> {
    match value {
        Yaml::Boolean(b) => Ok(PropertyValue::Bool(*b)),
        Yaml::Integer(i) => Ok(PropertyValue::Int(*i)),
        Yaml::Real(_) => Ok(PropertyValue::Float(yaml_number(value, key)?)),
        Yaml::String(s) => Ok(PropertyValue::String(s.clone())),
        _ => Err(CameraError::InvalidConfiguration(format!(
            "property '{key}' is not a scalar"
        ))),
    }
}

/// What a camera is built from.
#[derive(Debug, Clone, Copy)]
pub enum CameraSource<'a> {
    Viewport(&'a ViewportState),
    SceneObject(&'a SceneObject),
}
