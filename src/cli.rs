//! CLI argument parsing with clap

use crate::config::{Config, OrientationReader, ToolPaths, Workflow};
use crate::external::encoder::EncoderParams;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Stereo Spatial - Turn paired camera shots into spatial photos
///
/// Pairs the images of a left and a right camera, aligns every pair into a
/// side-by-side TIFF, carries over the left image's metadata and encodes the
/// result as a spatial photo.
#[derive(Parser, Debug)]
#[command(name = "stereo-spatial")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Search radius passed to the stereo aligner
    #[arg(long, global = true)]
    pub search_radius: Option<u32>,

    /// How EXIF orientation is read before rotating
    #[arg(long, value_enum, global = true)]
    pub orientation_reader: Option<OrientationReader>,

    #[command(flatten)]
    pub tools: ToolArgs,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long, global = true)]
    pub json_log: bool,

    /// Directory for log files (default: Log/ next to the executable)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Write the run report as JSON to this file
    #[arg(long, global = true)]
    pub report: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Two action cameras: lens correction, pairing by number, date stamping
    ActionCam(ActionCamArgs),
    /// Two still cameras: pairing by sorted position, rotation fix-up
    Pair(PairArgs),
}

impl Command {
    pub fn workflow(&self) -> Workflow {
        match self {
            Command::ActionCam(_) => Workflow::ActionCam,
            Command::Pair(_) => Workflow::Pair,
        }
    }
}

#[derive(Args, Debug)]
pub struct ActionCamArgs {
    /// Left camera directory [default: left]
    #[arg(short, long)]
    pub left: Option<PathBuf>,

    /// Right camera directory [default: right]
    #[arg(short, long)]
    pub right: Option<PathBuf>,

    /// Camera baseline in mm [default: 73]
    #[arg(short, long)]
    pub baseline: Option<f64>,

    /// Horizontal field of view in degrees [default: 170]
    #[arg(short = 'f', long)]
    pub hfov: Option<f64>,

    /// Lens correction coefficients [default: k1=-0.2:k2=-0.025]
    #[arg(long)]
    pub lens_params: Option<String>,

    /// Where finished .heic files are moved [default: .]
    #[arg(long)]
    pub heic_dest: Option<PathBuf>,

    /// Regex with two capture groups (8-digit date, 6-digit time)
    #[arg(long)]
    pub date_pattern: Option<String>,

    /// Stop after metadata copy and date stamping
    #[arg(long)]
    pub skip_spatial: bool,
}

#[derive(Args, Debug)]
pub struct PairArgs {
    /// Left camera directory
    pub folder1: PathBuf,

    /// Right camera directory; its files are renamed after folder1's
    pub folder2: PathBuf,

    /// Sensor width in mm [default: 23.5]
    #[arg(short, long)]
    pub sensor: Option<f64>,

    /// Focal length in mm [default: 23]
    #[arg(short, long)]
    pub focal: Option<f64>,

    /// Camera baseline in mm [default: 105]
    #[arg(short, long)]
    pub baseline: Option<f64>,

    /// Stop after metadata copy
    #[arg(long)]
    pub skip_spatial: bool,
}

/// External tool locations, from flags or `STEREO_*` variables
#[derive(Args, Debug)]
pub struct ToolArgs {
    #[arg(long, env = "STEREO_FFMPEG", default_value = "ffmpeg", global = true)]
    pub ffmpeg: PathBuf,

    #[arg(long, env = "STEREO_EXIFTOOL", default_value = "exiftool", global = true)]
    pub exiftool: PathBuf,

    #[arg(long, env = "STEREO_JPEGTRAN", default_value = "jpegtran", global = true)]
    pub jpegtran: PathBuf,

    #[arg(long, env = "STEREO_ALIGNER", default_value = "StereoAutoAlign", global = true)]
    pub aligner: PathBuf,

    #[arg(long, env = "STEREO_ENCODER", default_value = "spatialPhotoTool", global = true)]
    pub encoder: PathBuf,
}

impl ToolArgs {
    fn to_paths(&self) -> ToolPaths {
        ToolPaths {
            ffmpeg: self.ffmpeg.clone(),
            exiftool: self.exiftool.clone(),
            jpegtran: self.jpegtran.clone(),
            aligner: self.aligner.clone(),
            encoder: self.encoder.clone(),
        }
    }
}

impl Cli {
    /// Convert CLI arguments to Config, starting from the workflow defaults
    pub fn to_config(&self) -> Config {
        let mut config = Config::for_workflow(self.command.workflow());

        match &self.command {
            Command::ActionCam(args) => {
                if let Some(ref left) = args.left {
                    config.left_dir = left.clone();
                }
                if let Some(ref right) = args.right {
                    config.right_dir = right.clone();
                }
                if let Some(ref params) = args.lens_params {
                    config.lens_params = params.clone();
                }
                if let Some(ref dest) = args.heic_dest {
                    config.heic_destination = dest.clone();
                }
                if let Some(ref pattern) = args.date_pattern {
                    config.date_pattern = pattern.clone();
                }
                if let Some(EncoderParams::FieldOfView { baseline, hfov }) = &mut config.encoder {
                    if let Some(b) = args.baseline {
                        *baseline = b;
                    }
                    if let Some(h) = args.hfov {
                        *hfov = h;
                    }
                }
                if args.skip_spatial {
                    config.encoder = None;
                }
            }
            Command::Pair(args) => {
                config.left_dir = args.folder1.clone();
                config.right_dir = args.folder2.clone();
                if let Some(EncoderParams::Sensor {
                    sensor,
                    focal,
                    baseline,
                }) = &mut config.encoder
                {
                    if let Some(s) = args.sensor {
                        *sensor = s;
                    }
                    if let Some(f) = args.focal {
                        *focal = f;
                    }
                    if let Some(b) = args.baseline {
                        *baseline = b;
                    }
                }
                if args.skip_spatial {
                    config.encoder = None;
                }
            }
        }

        if let Some(radius) = self.search_radius {
            config.search_radius = radius;
        }
        if let Some(reader) = self.orientation_reader {
            config.orientation_reader = reader;
        }
        config.tools = self.tools.to_paths();
        config.verbose = self.verbose;

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_cam_defaults() {
        let cli = Cli::try_parse_from(["stereo-spatial", "action-cam"]).unwrap();
        let config = cli.to_config();

        assert_eq!(config.workflow, Workflow::ActionCam);
        assert_eq!(config.left_dir, PathBuf::from("left"));
        assert_eq!(config.right_dir, PathBuf::from("right"));
        assert_eq!(
            config.encoder,
            Some(EncoderParams::FieldOfView {
                baseline: 73.0,
                hfov: 170.0
            })
        );
        assert_eq!(config.heic_destination, PathBuf::from("."));
    }

    #[test]
    fn test_action_cam_overrides() {
        let cli = Cli::try_parse_from([
            "stereo-spatial",
            "action-cam",
            "-l",
            "cam-a",
            "-r",
            "cam-b",
            "-b",
            "65",
            "-f",
            "120",
            "--heic-dest",
            "done",
            "--search-radius",
            "20",
        ])
        .unwrap();
        let config = cli.to_config();

        assert_eq!(config.left_dir, PathBuf::from("cam-a"));
        assert_eq!(config.right_dir, PathBuf::from("cam-b"));
        assert_eq!(
            config.encoder,
            Some(EncoderParams::FieldOfView {
                baseline: 65.0,
                hfov: 120.0
            })
        );
        assert_eq!(config.heic_destination, PathBuf::from("done"));
        assert_eq!(config.search_radius, 20);
    }

    #[test]
    fn test_pair_arguments() {
        let cli = Cli::try_parse_from([
            "stereo-spatial",
            "pair",
            "one",
            "two",
            "-s",
            "36",
            "--skip-spatial",
            "--orientation-reader",
            "embedded",
            "-v",
        ])
        .unwrap();
        let config = cli.to_config();

        assert_eq!(config.workflow, Workflow::Pair);
        assert_eq!(config.left_dir, PathBuf::from("one"));
        assert_eq!(config.right_dir, PathBuf::from("two"));
        assert_eq!(config.encoder, None);
        assert_eq!(config.orientation_reader, OrientationReader::Embedded);
        assert!(config.verbose);
    }

    #[test]
    fn test_pair_sensor_overrides() {
        let cli = Cli::try_parse_from(["stereo-spatial", "pair", "a", "b", "-f", "35"]).unwrap();
        assert_eq!(
            cli.to_config().encoder,
            Some(EncoderParams::Sensor {
                sensor: 23.5,
                focal: 35.0,
                baseline: 105.0
            })
        );
    }

    #[test]
    fn test_pair_requires_both_folders() {
        assert!(Cli::try_parse_from(["stereo-spatial", "pair", "only-one"]).is_err());
    }

    #[test]
    fn test_tool_paths_from_flags() {
        let cli = Cli::try_parse_from([
            "stereo-spatial",
            "--aligner",
            "/opt/bin/StereoAutoAlign",
            "pair",
            "a",
            "b",
        ])
        .unwrap();
        assert_eq!(
            cli.to_config().tools.aligner,
            PathBuf::from("/opt/bin/StereoAutoAlign")
        );
    }
}
