//! Configuration types for the stereo pipeline
//!
//! Everything comes from command-line flags (with environment fallbacks for
//! tool locations); there is no configuration file.

use crate::external::aligner::DEFAULT_SEARCH_RADIUS;
use crate::external::encoder::EncoderParams;
use crate::external::ffmpeg::DEFAULT_LENS_PARAMS;
use crate::naming::pattern::DEFAULT_DATE_PATTERN;
use serde::Serialize;
use std::path::PathBuf;

/// Which camera setup the run handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Workflow {
    /// Two action cameras: lens correction, identifier pairing, date stamping
    ActionCam,
    /// Two still cameras: index pairing, rotation normalization
    Pair,
}

/// How the rotation stage reads EXIF orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OrientationReader {
    /// Ask the metadata tool (ExifTool)
    #[default]
    Exiftool,
    /// Parse the embedded EXIF block in-process
    Embedded,
}

/// Program names (or paths) of the external collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub exiftool: PathBuf,
    pub jpegtran: PathBuf,
    pub aligner: PathBuf,
    pub encoder: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            exiftool: PathBuf::from("exiftool"),
            jpegtran: PathBuf::from("jpegtran"),
            aligner: PathBuf::from("StereoAutoAlign"),
            encoder: PathBuf::from("spatialPhotoTool"),
        }
    }
}

/// Configuration for one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub workflow: Workflow,

    /// Left camera directory; aligned outputs are written here
    pub left_dir: PathBuf,

    /// Right camera directory
    pub right_dir: PathBuf,

    /// Distortion model passed to the lens correction filter
    pub lens_params: String,

    /// Search radius passed to the aligner
    pub search_radius: u32,

    /// Encoder geometry; `None` skips spatial encoding
    pub encoder: Option<EncoderParams>,

    /// Regex with two capture groups (date digits, time digits)
    pub date_pattern: String,

    /// Where encoded `.heic` files are moved at the end of a run
    pub heic_destination: PathBuf,

    pub orientation_reader: OrientationReader,

    pub tools: ToolPaths,

    /// Extensions treated as camera images (lens correction, alignment)
    pub image_extensions: Vec<String>,

    /// Extensions considered when pairing by position
    pub pair_extensions: Vec<String>,

    /// Extension of the encoder's output files
    pub spatial_extension: String,

    /// Verbose output
    pub verbose: bool,
}

impl Config {
    /// Defaults for a workflow, before command-line overrides
    pub fn for_workflow(workflow: Workflow) -> Self {
        let (left_dir, right_dir, encoder) = match workflow {
            Workflow::ActionCam => (
                PathBuf::from("left"),
                PathBuf::from("right"),
                EncoderParams::FieldOfView {
                    baseline: 73.0,
                    hfov: 170.0,
                },
            ),
            Workflow::Pair => (
                PathBuf::from("folder1"),
                PathBuf::from("folder2"),
                EncoderParams::Sensor {
                    sensor: 23.5,
                    focal: 23.0,
                    baseline: 105.0,
                },
            ),
        };

        Self {
            workflow,
            left_dir,
            right_dir,
            lens_params: DEFAULT_LENS_PARAMS.to_string(),
            search_radius: DEFAULT_SEARCH_RADIUS,
            encoder: Some(encoder),
            date_pattern: DEFAULT_DATE_PATTERN.to_string(),
            heic_destination: PathBuf::from("."),
            orientation_reader: OrientationReader::default(),
            tools: ToolPaths::default(),
            image_extensions: vec![
                "jpg".into(),
                "jpeg".into(),
                "png".into(),
                "tif".into(),
                "tiff".into(),
            ],
            pair_extensions: vec!["jpg".into(), "jpeg".into()],
            spatial_extension: "heic".into(),
            verbose: false,
        }
    }
}
