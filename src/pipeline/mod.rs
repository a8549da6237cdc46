//! Pipeline driver
//!
//! Runs the stages of a workflow strictly one after another. Each stage
//! discovers its inputs by filename suffix in the left/right directories,
//! handles every file it finds, and reports processed/skipped/failed
//! counts. Only a fatal precondition (missing directory, image count
//! mismatch) stops the run; per-file failures never do.

mod stages;

use crate::config::{Config, Workflow};
use crate::error::{Error, Result};
use crate::external::ExternalTool;
use crate::external::aligner::StereoAligner;
use crate::external::encoder::SpatialEncoder;
use crate::external::exiftool::MetadataTool;
use crate::external::ffmpeg::LensCorrector;
use crate::external::jpegtran::Rotator;
use crate::naming::{RoleSuffix, ensure_dir};
use crate::naming::pattern::DateTimePattern;
use crate::report::{BatchReport, BatchSummary, FileResult};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{Level, error, info, span};

/// How a pairing stage matches files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PairingMode {
    /// Natural-sort position, fatal on count mismatch
    Index,
    /// Numeric identifier of `-corrected` files
    Identifier,
}

/// One step of a workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Write `-corrected` copies of both sides' originals
    LensCorrection,
    /// Rename right-side files to match their left-side partners
    Pairing(PairingMode),
    /// Bake EXIF orientation into the pixels on both sides
    RotationNormalize,
    /// Align same-named files of the given role into `-sbs.tiff`
    Alignment(RoleSuffix),
    /// Copy tags from each left original onto its `-sbs.tiff`
    MetadataCopy,
    /// Stamp capture time parsed from `-sbs.tiff` filenames
    DateStamp,
    /// Encode each `-sbs.tiff` into a spatial photo
    SpatialEncode,
    /// Move encoded photos out of the left directory
    Cleanup,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::LensCorrection => "lens-correction",
            Stage::Pairing(PairingMode::Index) => "pairing (index)",
            Stage::Pairing(PairingMode::Identifier) => "pairing (identifier)",
            Stage::RotationNormalize => "rotation",
            Stage::Alignment(_) => "alignment",
            Stage::MetadataCopy => "metadata-copy",
            Stage::DateStamp => "date-stamp",
            Stage::SpatialEncode => "spatial-encode",
            Stage::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Workflow {
    /// Ordered stages; `encode` controls the spatial encoding stage
    pub fn stages(&self, encode: bool) -> Vec<Stage> {
        let mut stages = match self {
            Workflow::ActionCam => vec![
                Stage::LensCorrection,
                Stage::Pairing(PairingMode::Identifier),
                Stage::Alignment(RoleSuffix::Corrected),
                Stage::MetadataCopy,
                Stage::DateStamp,
                Stage::SpatialEncode,
                Stage::Cleanup,
            ],
            Workflow::Pair => vec![
                Stage::Pairing(PairingMode::Index),
                Stage::RotationNormalize,
                Stage::Alignment(RoleSuffix::Original),
                Stage::MetadataCopy,
                Stage::SpatialEncode,
            ],
        };
        if !encode {
            stages.retain(|s| *s != Stage::SpatialEncode);
        }
        stages
    }
}

/// Results of one stage
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    #[serde(flatten)]
    pub batch: BatchReport,
}

impl StageReport {
    /// A stage that stopped early on a non-fatal error
    ///
    /// The error is recorded as one failed result against `context`, the
    /// directory the stage was working in.
    pub fn aborted(stage: Stage, context: &Path, error: &Error) -> Self {
        let mut batch = BatchReport::new();
        batch.push(FileResult::failed(context, error));
        Self { stage, batch }
    }

    pub fn summary(&self) -> BatchSummary {
        self.batch.summary
    }
}

/// Results of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub workflow: Workflow,
    pub stages: Vec<StageReport>,
}

impl RunReport {
    /// Counts summed over every stage
    pub fn totals(&self) -> BatchSummary {
        let mut totals = BatchSummary::default();
        for stage in &self.stages {
            totals.merge(&stage.batch.summary);
        }
        totals
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// Write the report as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        info!(report = %path.display(), "Run report written");
        Ok(())
    }
}

/// Runs a workflow's stages over a left/right directory pair
pub struct Pipeline {
    config: Config,
    corrector: LensCorrector,
    metadata: MetadataTool,
    rotator: Rotator,
    aligner: StereoAligner,
    encoder: Option<SpatialEncoder>,
    date_pattern: DateTimePattern,
}

impl Pipeline {
    /// Build the collaborators described by `config`
    pub fn new(config: Config) -> Result<Self> {
        let tools = &config.tools;
        let date_pattern = DateTimePattern::new(&config.date_pattern)?;

        Ok(Self {
            corrector: LensCorrector::new(ExternalTool::new(&tools.ffmpeg), config.lens_params.clone()),
            metadata: MetadataTool::new(ExternalTool::new(&tools.exiftool)),
            rotator: Rotator::new(ExternalTool::new(&tools.jpegtran)),
            aligner: StereoAligner::new(ExternalTool::new(&tools.aligner), config.search_radius),
            encoder: config
                .encoder
                .map(|params| SpatialEncoder::new(ExternalTool::new(&tools.encoder), params)),
            date_pattern,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.config.workflow.stages(self.encoder.is_some())
    }

    /// Run every stage in order
    ///
    /// Returns `Err` only for fatal preconditions; the report records
    /// everything else, including a stage that couldn't finish.
    pub fn run(&self) -> Result<RunReport> {
        ensure_dir(&self.config.left_dir)?;
        ensure_dir(&self.config.right_dir)?;

        let stages = self.stages();
        let mut report = RunReport {
            workflow: self.config.workflow,
            stages: Vec::with_capacity(stages.len()),
        };

        for (i, stage) in stages.iter().enumerate() {
            info!(step = i + 1, total = stages.len(), %stage, "Starting stage");
            let stage_report = match self.run_stage(*stage) {
                Ok(r) => r,
                Err(e) if e.is_fatal() => {
                    error!(%stage, error = %e, "Stage aborted the run");
                    return Err(e);
                }
                Err(e) => {
                    error!(%stage, error = %e, "Stage stopped early, continuing with the next one");
                    StageReport::aborted(*stage, self.stage_context(*stage), &e)
                }
            };
            info!(%stage, "{}", stage_report.batch.summary);
            report.stages.push(stage_report);
        }

        Ok(report)
    }

    /// Run a single stage against the configured directories
    pub fn run_stage(&self, stage: Stage) -> Result<StageReport> {
        let _span = span!(Level::INFO, "stage", name = stage.name()).entered();

        let batch = match stage {
            Stage::LensCorrection => {
                let mut batch = self.correct_lenses(&self.config.left_dir)?;
                batch.extend(self.correct_lenses(&self.config.right_dir)?);
                batch
            }
            Stage::Pairing(mode) => self.pair(mode)?,
            Stage::RotationNormalize => {
                let mut batch = self.normalize_rotation(&self.config.left_dir)?;
                batch.extend(self.normalize_rotation(&self.config.right_dir)?);
                batch
            }
            Stage::Alignment(role) => self.align(role)?,
            Stage::MetadataCopy => self.copy_metadata()?,
            Stage::DateStamp => self.stamp_dates()?,
            Stage::SpatialEncode => self.encode()?,
            Stage::Cleanup => self.move_spatial_photos()?,
        };

        Ok(StageReport { stage, batch })
    }

    /// Directory a stage mainly works in, for error records
    fn stage_context(&self, stage: Stage) -> &Path {
        match stage {
            Stage::Cleanup => &self.config.heic_destination,
            _ => &self.config.left_dir,
        }
    }

    /// Extensions treated as camera images for this workflow
    fn image_extensions(&self) -> &[String] {
        match self.config.workflow {
            Workflow::ActionCam => &self.config.image_extensions,
            Workflow::Pair => &self.config.pair_extensions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_cam_stage_order() {
        let stages = Workflow::ActionCam.stages(true);
        assert_eq!(stages.first(), Some(&Stage::LensCorrection));
        assert_eq!(stages[1], Stage::Pairing(PairingMode::Identifier));
        assert_eq!(stages.last(), Some(&Stage::Cleanup));
        assert!(stages.contains(&Stage::DateStamp));
    }

    #[test]
    fn test_skip_spatial_drops_encoding() {
        let stages = Workflow::Pair.stages(false);
        assert!(!stages.contains(&Stage::SpatialEncode));
        assert_eq!(stages[0], Stage::Pairing(PairingMode::Index));
        assert_eq!(stages.len(), 4);
    }

    #[test]
    fn test_invalid_date_pattern_rejected() {
        let mut config = Config::for_workflow(Workflow::ActionCam);
        config.date_pattern = r"(\d{8})".into();
        assert!(Pipeline::new(config).is_err());
    }

    #[test]
    fn test_aborted_stage_counts_as_failure() {
        let err = Error::Io(std::io::Error::other("disk vanished"));
        let report = StageReport::aborted(Stage::Cleanup, Path::new("out"), &err);

        assert_eq!(report.summary().failed, 1);
        let failure = report.batch.failures().next().unwrap();
        assert_eq!(failure.source, Path::new("out"));
        assert!(failure.message.as_deref().unwrap().contains("disk vanished"));
    }

    #[test]
    fn test_write_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = RunReport {
            workflow: Workflow::Pair,
            stages: vec![StageReport {
                stage: Stage::MetadataCopy,
                batch: BatchReport::new(),
            }],
        };
        let path = dir.path().join("reports").join("run.json");
        report.write_json(&path).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["workflow"], "pair");
        assert_eq!(json["stages"][0]["stage"], "metadata-copy");
        assert_eq!(json["stages"][0]["summary"]["failed"], 0);
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::for_workflow(Workflow::Pair);
        config.left_dir = dir.path().join("missing");
        config.right_dir = dir.path().to_path_buf();

        let err = Pipeline::new(config).unwrap().run().unwrap_err();
        assert!(err.is_fatal());
    }
}
