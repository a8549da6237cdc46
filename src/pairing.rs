//! Left/right file pairing
//!
//! Two cameras name their files independently. Before anything can be
//! aligned, every right-side file must be renamed so that it shares a name
//! (or at least an identifier) with its left-side counterpart.
//!
//! A [`PairingStrategy`] decides *which* files belong together and what the
//! right-side file should be called. [`apply`] then performs the renames for
//! any strategy, never overwriting an existing file, and reports the outcome
//! in a uniform [`PairingOutcome`].

use crate::error::{Error, Result};
use crate::naming::{MediaFile, RoleSuffix};
use crate::naming::pattern::CorrectedName;
use crate::report::{BatchReport, FileResult};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, info, span, warn};

/// One left/right correspondence before renaming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPair {
    /// Logical key shared by both files
    pub key: String,
    pub left: MediaFile,
    pub right: MediaFile,
    /// Filename the right-side file must end up with
    pub target_name: String,
}

/// What a strategy decided, before touching the filesystem
#[derive(Debug, Clone, Default)]
pub struct PairingPlan {
    pub pairs: Vec<PlannedPair>,
    /// Left files with no right-side partner
    pub unmatched_left: Vec<MediaFile>,
    /// Right files with no left-side partner
    pub unmatched_right: Vec<MediaFile>,
    /// Right files the strategy can't interpret (e.g. naming template mismatch)
    pub ignored_right: Vec<MediaFile>,
    /// Right files whose key another right file already claimed
    pub duplicate_right: Vec<MediaFile>,
}

/// Matched pairs keyed by logical key, plus what stayed unmatched
#[derive(Debug, Clone, Default)]
pub struct PairingResult {
    pub pairs: BTreeMap<String, (MediaFile, MediaFile)>,
    pub unmatched_left: Vec<MediaFile>,
    pub unmatched_right: Vec<MediaFile>,
}

/// Pairing result together with per-file rename results
#[derive(Debug, Clone, Default)]
pub struct PairingOutcome {
    pub result: PairingResult,
    pub report: BatchReport,
}

impl PairingOutcome {
    /// Number of files actually renamed
    pub fn renamed(&self) -> usize {
        self.report.summary.processed
    }
}

/// Decides which left and right files belong together
pub trait PairingStrategy {
    fn name(&self) -> &'static str;

    /// File filter for directory listings fed to [`PairingStrategy::plan`]
    fn accepts(&self, file: &MediaFile) -> bool;

    /// Match `left` against `right`; both lists are in natural order
    ///
    /// An `Err` is fatal: no file may have been renamed yet.
    fn plan(&self, left_dir: &Path, left: &[MediaFile], right_dir: &Path, right: &[MediaFile]) -> Result<PairingPlan>;
}

/// Pair by position after natural sorting
///
/// Relies on both cameras having captured the same number of frames in the
/// same order. The right-side file takes the left-side file's exact name.
#[derive(Debug, Clone)]
pub struct IndexPairing {
    extensions: Vec<String>,
}

impl IndexPairing {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }
}

impl PairingStrategy for IndexPairing {
    fn name(&self) -> &'static str {
        "index"
    }

    fn accepts(&self, file: &MediaFile) -> bool {
        file.has_extension(&self.extensions)
    }

    fn plan(&self, left_dir: &Path, left: &[MediaFile], right_dir: &Path, right: &[MediaFile]) -> Result<PairingPlan> {
        if left.len() != right.len() {
            return Err(Error::CountMismatch {
                left: left_dir.to_path_buf(),
                left_count: left.len(),
                right: right_dir.to_path_buf(),
                right_count: right.len(),
            });
        }

        let pairs = left
            .iter()
            .zip(right)
            .map(|(l, r)| {
                let name = l.file_name();
                PlannedPair {
                    key: name.clone(),
                    left: l.clone(),
                    right: r.clone(),
                    target_name: name,
                }
            })
            .collect();

        Ok(PairingPlan {
            pairs,
            ..PairingPlan::default()
        })
    }
}

/// Pair by the numeric identifier of `prefix-number-corrected.ext` names
///
/// Order-independent and tolerant of missing or extra frames on either side.
/// The right-side file adopts the left prefix but keeps its own extension.
#[derive(Debug, Clone, Default)]
pub struct IdentifierPairing;

impl PairingStrategy for IdentifierPairing {
    fn name(&self) -> &'static str {
        "identifier"
    }

    fn accepts(&self, file: &MediaFile) -> bool {
        file.role == RoleSuffix::Corrected
    }

    fn plan(&self, left_dir: &Path, left: &[MediaFile], _right_dir: &Path, right: &[MediaFile]) -> Result<PairingPlan> {
        let mut plan = PairingPlan::default();

        let mut by_key: HashMap<&str, (&MediaFile, CorrectedName)> = HashMap::new();
        for file in left {
            let Some((key, name)) = identified(file) else {
                continue;
            };
            if let Some((kept, _)) = by_key.get(key) {
                warn!(
                    key,
                    kept = %kept.path.display(),
                    ignored = %file.path.display(),
                    "Duplicate identifier on the left side"
                );
                plan.unmatched_left.push(file.clone());
                continue;
            }
            by_key.insert(key, (file, name));
        }

        if by_key.is_empty() {
            warn!(dir = %left_dir.display(), "No files matching 'prefix-number-corrected.ext' on the left side");
        } else {
            info!(dir = %left_dir.display(), count = by_key.len(), "Found matching files on the left side");
        }

        // Right-side candidates per key, natural order kept
        let mut candidates: BTreeMap<&str, Vec<(&MediaFile, String)>> = BTreeMap::new();
        for file in right {
            let Some((key, name)) = identified(file) else {
                plan.ignored_right.push(file.clone());
                continue;
            };
            match by_key.get(key) {
                Some((_, left_name)) => {
                    let target = name.with_prefix(&left_name.prefix).file_name();
                    candidates.entry(key).or_default().push((file, target));
                }
                None => plan.unmatched_right.push(file.clone()),
            }
        }

        for (key, mut files) in candidates {
            // A file already carrying its target name keeps the pair on reruns
            let chosen = files
                .iter()
                .position(|(f, target)| f.file_name() == *target)
                .unwrap_or(0);
            let (file, target_name) = files.remove(chosen);
            for (duplicate, _) in files {
                warn!(
                    key,
                    kept = %file.path.display(),
                    ignored = %duplicate.path.display(),
                    "Duplicate identifier on the right side"
                );
                plan.duplicate_right.push(duplicate.clone());
            }
            if let Some((left_file, _)) = by_key.remove(key) {
                plan.pairs.push(PlannedPair {
                    key: key.to_string(),
                    left: left_file.clone(),
                    right: file.clone(),
                    target_name,
                });
            }
        }

        let mut still_unmatched: Vec<&MediaFile> = by_key.into_values().map(|(f, _)| f).collect();
        still_unmatched.sort_by_key(|f| left.iter().position(|l| l.path == f.path));
        plan.unmatched_left.extend(still_unmatched.into_iter().cloned());

        Ok(plan)
    }
}

/// Identifier and parsed name of a `prefix-number-corrected.ext` file
fn identified(file: &MediaFile) -> Option<(&str, CorrectedName)> {
    let key = file.key.as_deref()?;
    let name = CorrectedName::parse(&file.file_name())?;
    (name.number == key).then_some((key, name))
}

/// Rename `from` to `to` unless something already lives at `to`
fn rename_no_clobber(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        return Err(Error::RenameCollision {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
    }
    fs::rename(from, to)?;
    Ok(())
}

/// Perform the renames a plan calls for
///
/// Keys are unique within a plan. Pairs whose right-side file already has
/// the target name are skipped. A rename onto an existing file is a per-file
/// error; the remaining pairs are still processed. Right-side files outside
/// the pairs count as skipped and are never renamed.
pub fn apply(plan: PairingPlan) -> PairingOutcome {
    let mut outcome = PairingOutcome::default();
    let mut orphaned_left = Vec::new();

    for pair in plan.pairs {
        let from = pair.right.path.clone();
        let right_dir = from.parent().map(Path::to_path_buf).unwrap_or_default();
        let to: PathBuf = right_dir.join(&pair.target_name);

        let right = if pair.right.file_name() == pair.target_name {
            outcome
                .report
                .push(FileResult::skipped(&from, "already paired"));
            pair.right
        } else {
            match rename_no_clobber(&from, &to) {
                Ok(()) => {
                    info!(from = %from.display(), to = %pair.target_name, "Renamed");
                    outcome
                        .report
                        .push(FileResult::processed(&from, Some(to.clone())));
                    MediaFile::new(to)
                }
                Err(e) => {
                    outcome.report.push(FileResult::failed(&from, &e));
                    outcome.result.unmatched_right.push(pair.right);
                    orphaned_left.push(pair.left);
                    continue;
                }
            }
        };

        outcome.result.pairs.insert(pair.key, (pair.left, right));
    }

    let paired_left: Vec<PathBuf> = outcome
        .result
        .pairs
        .values()
        .map(|(l, _)| l.path.clone())
        .collect();
    for file in plan.unmatched_left.into_iter().chain(orphaned_left) {
        let known = outcome
            .result
            .unmatched_left
            .iter()
            .any(|f| f.path == file.path);
        if !paired_left.contains(&file.path) && !known {
            outcome.result.unmatched_left.push(file);
        }
    }

    for file in &plan.unmatched_right {
        outcome
            .report
            .push(FileResult::skipped(&file.path, "no match on the left side"));
    }
    for file in &plan.duplicate_right {
        outcome
            .report
            .push(FileResult::skipped(&file.path, "identifier already paired"));
    }
    for file in &plan.ignored_right {
        outcome.report.push(FileResult::skipped(
            &file.path,
            "doesn't match expected pattern 'prefix-number-corrected.extension'",
        ));
    }

    outcome.result.unmatched_right.extend(plan.unmatched_right);
    outcome.result.unmatched_right.extend(plan.duplicate_right);
    outcome
}

/// List both directories, plan with `strategy`, and rename
///
/// Fails before any rename if a directory is missing or the strategy rejects
/// the file sets (e.g. a count mismatch).
pub fn pair_directories(strategy: &dyn PairingStrategy, left_dir: &Path, right_dir: &Path) -> Result<PairingOutcome> {
    let _span = span!(Level::INFO, "pairing", strategy = strategy.name()).entered();

    let left = crate::naming::list_media(left_dir, |f| strategy.accepts(f))?;
    let right = crate::naming::list_media(right_dir, |f| strategy.accepts(f))?;
    debug!(left = left.len(), right = right.len(), "Pairing candidates");

    let plan = strategy.plan(left_dir, &left, right_dir, &right)?;
    let outcome = apply(plan);

    for file in &outcome.result.unmatched_left {
        info!(file = %file.path.display(), "No partner on the right side");
    }
    info!(
        pairs = outcome.result.pairs.len(),
        "{}",
        outcome.report.summary
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::FileStatus;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn setup(left: &[&str], right: &[&str]) -> (TempDir, PathBuf, PathBuf) {
        let root = tempdir().unwrap();
        let l = root.path().join("left");
        let r = root.path().join("right");
        fs::create_dir(&l).unwrap();
        fs::create_dir(&r).unwrap();
        for name in left {
            fs::write(l.join(name), name.as_bytes()).unwrap();
        }
        for name in right {
            fs::write(r.join(name), name.as_bytes()).unwrap();
        }
        (root, l, r)
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn jpeg() -> IndexPairing {
        IndexPairing::new(vec!["jpg".into(), "jpeg".into()])
    }

    #[test]
    fn test_index_pairing_renames_by_position() {
        let (_root, l, r) = setup(&["a1.jpg", "a2.jpg"], &["z9.jpg", "z1.jpg"]);

        let outcome = pair_directories(&jpeg(), &l, &r).unwrap();
        assert_eq!(outcome.renamed(), 2);
        assert_eq!(names(&r), vec!["a1.jpg", "a2.jpg"]);

        // z1 sorts first, so it took a1's name
        assert_eq!(fs::read(r.join("a1.jpg")).unwrap(), b"z1.jpg");
        assert_eq!(fs::read(r.join("a2.jpg")).unwrap(), b"z9.jpg");

        let (left, right) = &outcome.result.pairs["a1.jpg"];
        assert_eq!(left.path, l.join("a1.jpg"));
        assert_eq!(right.path, r.join("a1.jpg"));
    }

    #[test]
    fn test_index_pairing_count_mismatch_is_fatal() {
        let (_root, l, r) = setup(&["a1.jpg", "a2.jpg"], &["z1.jpg", "z2.jpg", "z3.jpg"]);

        let err = pair_directories(&jpeg(), &l, &r).unwrap_err();
        match err {
            Error::CountMismatch {
                left_count,
                right_count,
                ..
            } => {
                assert_eq!(left_count, 2);
                assert_eq!(right_count, 3);
            }
            other => panic!("expected count mismatch, got {:?}", other),
        }
        assert_eq!(names(&r), vec!["z1.jpg", "z2.jpg", "z3.jpg"]);
    }

    #[test]
    fn test_index_pairing_natural_order_and_extension_filter() {
        let (_root, l, r) = setup(
            &["L2.jpg", "L10.JPG", "notes.txt"],
            &["R10.jpeg", "R2.jpg", "R-sbs.tiff"],
        );

        let outcome = pair_directories(&jpeg(), &l, &r).unwrap();
        assert_eq!(outcome.renamed(), 2);
        assert_eq!(fs::read(r.join("L2.jpg")).unwrap(), b"R2.jpg");
        assert_eq!(fs::read(r.join("L10.JPG")).unwrap(), b"R10.jpeg");
        assert!(r.join("R-sbs.tiff").exists());
    }

    #[test]
    fn test_index_pairing_same_names_is_noop() {
        let (_root, l, r) = setup(&["a.jpg", "b.jpg"], &["a.jpg", "b.jpg"]);

        let outcome = pair_directories(&jpeg(), &l, &r).unwrap();
        assert_eq!(outcome.renamed(), 0);
        assert_eq!(outcome.report.summary.skipped, 2);
        assert_eq!(outcome.result.pairs.len(), 2);
    }

    #[test]
    fn test_index_pairing_collision_is_per_file_error() {
        // b1 -> b2 collides with the existing b2; b2 -> b3 still happens
        let (_root, l, r) = setup(&["b2.jpg", "b3.jpg"], &["b1.jpg", "b2.jpg"]);

        let outcome = pair_directories(&jpeg(), &l, &r).unwrap();
        assert_eq!(outcome.report.summary.failed, 1);
        assert_eq!(outcome.report.summary.processed, 1);
        assert_eq!(outcome.report.results[0].status, FileStatus::Failed);
        assert_eq!(names(&r), vec!["b1.jpg", "b3.jpg"]);
        // the collided file was not overwritten before being renamed away
        assert_eq!(fs::read(r.join("b3.jpg")).unwrap(), b"b2.jpg");
        assert_eq!(outcome.result.unmatched_right.len(), 1);
    }

    #[test]
    fn test_identifier_pairing_adopts_left_prefix() {
        let (_root, l, r) = setup(
            &["trip-007-corrected.jpg", "trip-008-corrected.jpg"],
            &[
                "hike-007-corrected.jpg",
                "hike-099-corrected.jpg",
                "hike-007.jpg",
                "notes-corrected.txt",
            ],
        );

        let outcome = pair_directories(&IdentifierPairing, &l, &r).unwrap();
        assert_eq!(outcome.renamed(), 1);
        assert!(r.join("trip-007-corrected.jpg").exists());
        assert!(r.join("hike-099-corrected.jpg").exists());
        assert!(r.join("hike-007.jpg").exists());
        assert!(r.join("notes-corrected.txt").exists());

        assert_eq!(outcome.result.pairs.len(), 1);
        assert!(outcome.result.pairs.contains_key("007"));
        assert_eq!(outcome.result.unmatched_right.len(), 1);
        assert_eq!(
            outcome.result.unmatched_right[0].file_name(),
            "hike-099-corrected.jpg"
        );
        assert_eq!(outcome.result.unmatched_left.len(), 1);
        assert_eq!(
            outcome.result.unmatched_left[0].file_name(),
            "trip-008-corrected.jpg"
        );
        // unmatched 099 and the unparseable notes file are skips, not errors;
        // originals aren't considered at all
        assert_eq!(outcome.report.summary.skipped, 2);
        assert_eq!(outcome.report.summary.failed, 0);
    }

    #[test]
    fn test_identifier_pairing_keeps_own_extension() {
        let (_root, l, r) = setup(&["trip-3-corrected.jpg"], &["hike-3-corrected.JPG"]);

        pair_directories(&IdentifierPairing, &l, &r).unwrap();
        assert_eq!(names(&r), vec!["trip-3-corrected.JPG"]);
    }

    #[test]
    fn test_identifier_pairing_is_idempotent() {
        let (_root, l, r) = setup(
            &["trip-001-corrected.jpg", "trip-002-corrected.jpg"],
            &["hike-001-corrected.jpg", "hike-002-corrected.jpg"],
        );

        let first = pair_directories(&IdentifierPairing, &l, &r).unwrap();
        assert_eq!(first.renamed(), 2);

        let second = pair_directories(&IdentifierPairing, &l, &r).unwrap();
        assert_eq!(second.renamed(), 0);
        assert_eq!(second.report.summary.skipped, 2);
        assert_eq!(second.result.pairs.len(), 2);
    }

    #[test]
    fn test_identifier_pairing_collision_does_not_overwrite() {
        let (_root, l, r) = setup(&["trip-5-corrected.jpg"], &["other-5-corrected.png"]);
        // a directory isn't listed, but still blocks the target name
        fs::create_dir(r.join("trip-5-corrected.png")).unwrap();
        fs::write(r.join("trip-5-corrected.png").join("keep"), b"keep me").unwrap();

        let outcome = pair_directories(&IdentifierPairing, &l, &r).unwrap();
        assert_eq!(outcome.report.summary.processed, 0);
        assert_eq!(outcome.report.summary.failed, 1);
        assert_eq!(fs::read(r.join("trip-5-corrected.png").join("keep")).unwrap(), b"keep me");
        assert!(r.join("other-5-corrected.png").exists());
        assert!(outcome.result.pairs.is_empty());
        assert_eq!(outcome.result.unmatched_right[0].file_name(), "other-5-corrected.png");
        assert_eq!(outcome.result.unmatched_left[0].file_name(), "trip-5-corrected.jpg");
    }

    #[test]
    fn test_identifier_pairing_duplicate_left_keeps_first() {
        let (_root, l, r) = setup(
            &["trip-007-corrected.jpg", "walk-007-corrected.jpg"],
            &["hike-007-corrected.jpg"],
        );

        let outcome = pair_directories(&IdentifierPairing, &l, &r).unwrap();
        assert_eq!(outcome.report.summary.processed, 1);
        assert_eq!(outcome.report.summary.skipped, 0);
        assert_eq!(outcome.report.summary.failed, 0);
        assert_eq!(names(&r), vec!["trip-007-corrected.jpg"]);

        assert_eq!(outcome.result.pairs.len(), 1);
        let (left, right) = &outcome.result.pairs["007"];
        assert_eq!(left.path, l.join("trip-007-corrected.jpg"));
        assert_eq!(right.path, r.join("trip-007-corrected.jpg"));
        let unmatched: Vec<_> = outcome.result.unmatched_left.iter().map(|f| f.file_name()).collect();
        assert_eq!(unmatched, vec!["walk-007-corrected.jpg"]);
    }

    #[test]
    fn test_identifier_pairing_duplicate_right_is_not_renamed() {
        let (_root, l, r) = setup(
            &["trip-007-corrected.jpg"],
            &["hike-007-corrected.jpg", "hike-007-corrected.png"],
        );

        let outcome = pair_directories(&IdentifierPairing, &l, &r).unwrap();
        assert_eq!(outcome.report.summary.processed, 1);
        assert_eq!(outcome.report.summary.skipped, 1);
        assert_eq!(outcome.report.summary.failed, 0);
        assert_eq!(names(&r), vec!["hike-007-corrected.png", "trip-007-corrected.jpg"]);

        assert_eq!(outcome.result.pairs.len(), 1);
        assert_eq!(outcome.result.pairs["007"].1.path, r.join("trip-007-corrected.jpg"));
        let unmatched: Vec<_> = outcome.result.unmatched_right.iter().map(|f| f.file_name()).collect();
        assert_eq!(unmatched, vec!["hike-007-corrected.png"]);
        assert!(outcome.result.unmatched_left.is_empty());

        // a rerun keeps the already renamed file as the partner
        let again = pair_directories(&IdentifierPairing, &l, &r).unwrap();
        assert_eq!(again.report.summary.processed, 0);
        assert_eq!(again.report.summary.skipped, 2);
        assert_eq!(again.result.pairs["007"].1.path, r.join("trip-007-corrected.jpg"));
        assert_eq!(names(&r), vec!["hike-007-corrected.png", "trip-007-corrected.jpg"]);
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let (_root, l, r) = setup(&[], &[]);
        let err = pair_directories(&IdentifierPairing, &l.join("missing"), &r).unwrap_err();
        assert!(err.is_fatal());
    }
}
