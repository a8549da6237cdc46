//! Spatial photo encoding via spatialPhotoTool

use super::ExternalTool;
use crate::error::Result;
use serde::Serialize;
use std::ffi::OsString;
use std::path::Path;

/// Camera geometry handed to the encoder
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "form", rename_all = "kebab-case")]
pub enum EncoderParams {
    /// Baseline in mm and horizontal field of view in degrees
    FieldOfView { baseline: f64, hfov: f64 },
    /// Sensor width and focal length in mm, baseline in mm
    Sensor {
        sensor: f64,
        focal: f64,
        baseline: f64,
    },
}

impl EncoderParams {
    pub fn args(&self) -> Vec<String> {
        match *self {
            EncoderParams::FieldOfView { baseline, hfov } => vec![
                "-b".into(),
                baseline.to_string(),
                "--hfov".into(),
                hfov.to_string(),
            ],
            EncoderParams::Sensor {
                sensor,
                focal,
                baseline,
            } => vec![
                "-s".into(),
                sensor.to_string(),
                "-f".into(),
                focal.to_string(),
                "-b".into(),
                baseline.to_string(),
            ],
        }
    }
}

/// Turns a side-by-side TIFF into a spatial photo container
#[derive(Debug, Clone)]
pub struct SpatialEncoder {
    tool: ExternalTool,
    params: EncoderParams,
}

impl SpatialEncoder {
    pub fn new(tool: ExternalTool, params: EncoderParams) -> Self {
        Self { tool, params }
    }

    pub fn args(&self, input: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.params.args().into_iter().map(OsString::from).collect();
        args.push(input.as_os_str().to_owned());
        args
    }

    pub fn encode(&self, input: &Path) -> Result<()> {
        self.tool.run(self.args(input)).map(|_| ())
    }
}
