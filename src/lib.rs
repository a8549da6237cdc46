//! Stereo Spatial - spatial photos from two-camera rigs
//!
//! This library provides the building blocks of the stereo pipeline:
//! - Natural sorting and filename pattern matching
//! - Left/right pairing by sorted position or by numeric identifier
//! - Typed wrappers around the external image tools (ffmpeg, ExifTool,
//!   jpegtran, the stereo aligner, the spatial photo encoder)
//! - A sequential pipeline driver with per-stage reports

pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod i18n;
pub mod metadata;
pub mod naming;
pub mod pairing;
pub mod pipeline;
pub mod report;

pub use cli::Cli;
pub use config::{Config, OrientationReader, ToolPaths, Workflow};
pub use error::{Error, Result};
pub use external::{ExternalTool, ToolOutcome};
pub use naming::{MediaFile, RoleSuffix};
pub use pairing::{IdentifierPairing, IndexPairing, PairingResult, PairingStrategy, pair_directories};
pub use pipeline::{Pipeline, RunReport, Stage, StageReport};
pub use report::{BatchReport, BatchSummary, FileResult, FileStatus};
