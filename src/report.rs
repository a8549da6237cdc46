//! Per-file results and batch summaries
//!
//! Every batch operation returns its results instead of printing counters,
//! so callers (and tests) can inspect exactly what happened to each file.

use crate::error::Error;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Status of a single file within a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// The stage did its work on this file
    Processed,
    /// Nothing to do: no pattern match, already paired, missing partner...
    Skipped,
    /// The stage tried and failed for this file
    Failed,
}

/// Result of processing a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    /// Source file path
    pub source: PathBuf,
    /// Output or rename target (if any)
    pub destination: Option<PathBuf>,
    pub status: FileStatus,
    /// Skip reason or error message
    pub message: Option<String>,
}

impl FileResult {
    pub fn processed(source: &Path, destination: Option<PathBuf>) -> Self {
        Self {
            source: source.to_path_buf(),
            destination,
            status: FileStatus::Processed,
            message: None,
        }
    }

    pub fn skipped(source: &Path, reason: impl Into<String>) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: None,
            status: FileStatus::Skipped,
            message: Some(reason.into()),
        }
    }

    pub fn failed(source: &Path, error: &Error) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: None,
            status: FileStatus::Failed,
            message: Some(error.to_string()),
        }
    }
}

/// Processed / skipped / failed counts of one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }

    pub fn record(&mut self, status: FileStatus) {
        match status {
            FileStatus::Processed => self.processed += 1,
            FileStatus::Skipped => self.skipped += 1,
            FileStatus::Failed => self.failed += 1,
        }
    }

    pub fn merge(&mut self, other: &BatchSummary) {
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {}, Processed: {}, Skipped: {}, Failed: {}",
            self.total(),
            self.processed,
            self.skipped,
            self.failed
        )
    }
}

/// Ordered results of one batch with their running summary
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub results: Vec<FileResult>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result, logging it at a level matching its status
    pub fn push(&mut self, result: FileResult) {
        match result.status {
            FileStatus::Processed => debug!(
                source = %result.source.display(),
                destination = ?result.destination,
                "Processed"
            ),
            FileStatus::Skipped => info!(
                source = %result.source.display(),
                reason = result.message.as_deref().unwrap_or_default(),
                "Skipped"
            ),
            FileStatus::Failed => warn!(
                source = %result.source.display(),
                error = result.message.as_deref().unwrap_or_default(),
                "Failed"
            ),
        }
        self.summary.record(result.status);
        self.results.push(result);
    }

    /// Append another batch (e.g. the second directory of a stage)
    pub fn extend(&mut self, other: BatchReport) {
        self.summary.merge(&other.summary);
        self.results.extend(other.results);
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileResult> {
        self.results
            .iter()
            .filter(|r| r.status == FileStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_summary() {
        let mut report = BatchReport::new();
        report.push(FileResult::processed(Path::new("a.jpg"), None));
        report.push(FileResult::processed(Path::new("b.jpg"), None));
        report.push(FileResult::skipped(Path::new("c.jpg"), "no match"));
        report.push(FileResult::failed(
            Path::new("d.jpg"),
            &Error::ToolNotFound {
                tool: "exiftool".into(),
            },
        ));

        assert_eq!(
            report.summary,
            BatchSummary {
                processed: 2,
                skipped: 1,
                failed: 1
            }
        );
        let summary = report.summary.to_string();
        assert!(summary.contains("Total: 4"));
        assert!(summary.contains("Processed: 2"));
        assert!(summary.contains("Skipped: 1"));
        assert!(summary.contains("Failed: 1"));

        let failed: Vec<_> = report.failures().collect();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].message.as_deref().unwrap().contains("exiftool"));
    }

    #[test]
    fn test_extend_merges_counts() {
        let mut left = BatchReport::new();
        left.push(FileResult::processed(Path::new("l.jpg"), None));
        let mut right = BatchReport::new();
        right.push(FileResult::skipped(Path::new("r.jpg"), "already corrected"));

        left.extend(right);
        assert_eq!(left.results.len(), 2);
        assert_eq!(left.summary.total(), 2);
        assert_eq!(left.summary.skipped, 1);
    }
}
