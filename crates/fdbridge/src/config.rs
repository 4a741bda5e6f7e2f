use std::path::Path;

use fdbridge_detect::CenterFaceFactory;
use serde::{Deserialize, Serialize};

use crate::{BridgeError, Result};

/// Runtime settings for a bridge backed by the CenterFace detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Asset path of the model definition
    pub model_path: String,
    /// Minimum candidate confidence before suppression
    pub heatmap_threshold: f32,
    /// IoU above which overlapping faces are merged
    pub nms_threshold: f32,
    /// Model input width (multiple of 32)
    pub input_width: u32,
    /// Model input height (multiple of 32)
    pub input_height: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            model_path: "centerface.onnx".to_owned(),
            heatmap_threshold: 0.5,
            nms_threshold: 0.3,
            input_width: 640,
            input_height: 480,
        }
    }
}

impl BridgeConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(BridgeError::ConfigIo)?;
        Self::from_json_str(&text)
    }

    /// Detector factory matching the configured input size.
    pub fn factory(&self) -> CenterFaceFactory {
        CenterFaceFactory::new(self.input_width, self.input_height)
    }
}
