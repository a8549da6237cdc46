//! Stage implementations
//!
//! Each stage lists its inputs, handles them one at a time in natural order,
//! and turns every per-file error into a `Failed` result. Listing a
//! directory or a fatal pairing precondition propagates as `Err`, which the
//! driver records against the stage unless it is fatal.

use super::{PairingMode, Pipeline};
use crate::error::{Error, Result};
use crate::metadata::read_orientation;
use crate::naming::pattern::exif_timestamp;
use crate::naming::{MediaFile, RoleSuffix, SBS_EXTENSION, list_media};
use crate::pairing::{IdentifierPairing, IndexPairing, PairingStrategy, pair_directories};
use crate::report::{BatchReport, FileResult};
use crate::external::jpegtran::Transform;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

impl Pipeline {
    /// Originals of `dir` -> `name-corrected.ext`
    pub(super) fn correct_lenses(&self, dir: &Path) -> Result<BatchReport> {
        let extensions = self.image_extensions();
        let files = list_media(dir, |f| {
            f.role == RoleSuffix::Original && f.has_extension(extensions)
        })?;
        info!(dir = %dir.display(), count = files.len(), "Applying lens correction");

        let mut batch = BatchReport::new();
        for (i, file) in files.iter().enumerate() {
            let extension = file.extension().unwrap_or_default();
            let output = file.derived_path(dir, RoleSuffix::Corrected, &extension);
            debug!(
                "[{}/{}] {} -> {}",
                i + 1,
                files.len(),
                file.file_name(),
                output.display()
            );

            let result = match self.corrector.correct(&file.path, &output) {
                Ok(()) => FileResult::processed(&file.path, Some(output)),
                Err(e) => FileResult::failed(&file.path, &e),
            };
            batch.push(result);
        }
        Ok(batch)
    }

    /// Rename right-side files after their left-side partners
    pub(super) fn pair(&self, mode: PairingMode) -> Result<BatchReport> {
        let index;
        let strategy: &dyn PairingStrategy = match mode {
            PairingMode::Index => {
                index = IndexPairing::new(self.config.pair_extensions.clone());
                &index
            }
            PairingMode::Identifier => &IdentifierPairing,
        };

        let outcome = pair_directories(strategy, &self.config.left_dir, &self.config.right_dir)?;
        info!(
            pairs = outcome.result.pairs.len(),
            renamed = outcome.renamed(),
            unmatched_left = outcome.result.unmatched_left.len(),
            unmatched_right = outcome.result.unmatched_right.len(),
            "Pairing complete"
        );
        Ok(outcome.report)
    }

    /// Losslessly rotate every original whose orientation isn't 1
    ///
    /// The rotated image is written to a temporary file next to the original,
    /// its orientation tag reset, and then renamed over the original.
    pub(super) fn normalize_rotation(&self, dir: &Path) -> Result<BatchReport> {
        let extensions = self.image_extensions();
        let files = list_media(dir, |f| {
            f.role == RoleSuffix::Original && f.has_extension(extensions)
        })?;
        info!(dir = %dir.display(), count = files.len(), "Normalizing rotation");

        let mut batch = BatchReport::new();
        for file in &files {
            let result = match self.rotate_one(file, dir) {
                Ok(Some(transform)) => {
                    info!(file = %file.file_name(), ?transform, "Rotated");
                    FileResult::processed(&file.path, None)
                }
                Ok(None) => FileResult::skipped(&file.path, "already upright"),
                Err(e) => FileResult::failed(&file.path, &e),
            };
            batch.push(result);
        }
        Ok(batch)
    }

    fn rotate_one(&self, file: &MediaFile, dir: &Path) -> Result<Option<Transform>> {
        let orientation = read_orientation(self.config.orientation_reader, &self.metadata, &file.path)?;
        let Some(transform) = Transform::for_orientation(orientation) else {
            return Ok(None);
        };

        let extension = file.extension().unwrap_or_default();
        let temp = dir.join(format!(".{}-rotated.{}", file.base_stem(), extension));
        let mtime = fs::metadata(&file.path).and_then(|m| m.modified()).ok();

        let replaced = self
            .rotator
            .rotate(transform, &file.path, &temp)
            .and_then(|()| self.metadata.reset_orientation(&temp))
            .and_then(|()| fs::rename(&temp, &file.path).map_err(Into::into));

        if let Err(e) = replaced {
            if temp.exists() {
                let _ = fs::remove_file(&temp);
            }
            return Err(e);
        }

        // Keep the capture-time modification date of the original
        if let Some(mtime) = mtime {
            if let Err(e) = restore_mtime(&file.path, mtime) {
                warn!(path = %file.path.display(), error = %e, "Could not restore modification time");
            }
        }
        Ok(Some(transform))
    }

    /// Same-named files of `role` on both sides -> `left/name-sbs.tiff`
    pub(super) fn align(&self, role: RoleSuffix) -> Result<BatchReport> {
        let left_dir = &self.config.left_dir;
        let right_dir = &self.config.right_dir;
        let extensions = self.image_extensions();
        let files = list_media(left_dir, |f| f.role == role && f.has_extension(extensions))?;
        info!(count = files.len(), "Aligning stereo pairs");

        let mut batch = BatchReport::new();
        for (i, file) in files.iter().enumerate() {
            let partner = right_dir.join(file.file_name());
            if !partner.is_file() {
                batch.push(FileResult::skipped(
                    &file.path,
                    format!("no matching file in '{}'", right_dir.display()),
                ));
                continue;
            }

            let output = file.sbs_path(left_dir);
            debug!("[{}/{}] Aligning {}", i + 1, files.len(), file.file_name());
            let result = match self.aligner.align(&file.path, &partner, &output) {
                Ok(()) => FileResult::processed(&file.path, Some(output)),
                Err(e) => FileResult::failed(&file.path, &e),
            };
            batch.push(result);
        }
        Ok(batch)
    }

    /// Left originals -> tags copied onto their `-sbs.tiff`
    ///
    /// Alignment drops all metadata; the left camera's tags win.
    pub(super) fn copy_metadata(&self) -> Result<BatchReport> {
        let left_dir = &self.config.left_dir;
        let extensions = self.image_extensions();
        let files = list_media(left_dir, |f| {
            f.role == RoleSuffix::Original && f.has_extension(extensions)
        })?;
        info!(count = files.len(), "Copying metadata to aligned images");

        let mut batch = BatchReport::new();
        for file in &files {
            let target = file.sbs_path(left_dir);
            if !target.is_file() {
                batch.push(FileResult::skipped(
                    &file.path,
                    format!("aligned file not found: {}", target.display()),
                ));
                continue;
            }

            let result = match self.metadata.copy_tags(&file.path, &target) {
                Ok(()) => FileResult::processed(&file.path, Some(target)),
                Err(e) => FileResult::failed(&file.path, &e),
            };
            batch.push(result);
        }
        Ok(batch)
    }

    fn sbs_files(&self) -> Result<Vec<MediaFile>> {
        let sbs_ext = [SBS_EXTENSION.to_string()];
        list_media(&self.config.left_dir, |f| {
            f.role == RoleSuffix::Sbs && f.has_extension(&sbs_ext)
        })
    }

    /// `-sbs.tiff` files -> capture time parsed from the filename
    ///
    /// A name without a date is a skip; a date that isn't on the calendar is
    /// an error.
    pub(super) fn stamp_dates(&self) -> Result<BatchReport> {
        let files = self.sbs_files()?;
        info!(count = files.len(), pattern = self.date_pattern.as_str(), "Setting date/time from filenames");

        let mut batch = BatchReport::new();
        for file in &files {
            let name = file.file_name();
            let Some(digits) = self.date_pattern.find(&name) else {
                batch.push(FileResult::skipped(&file.path, "does not match the expected pattern"));
                continue;
            };

            let result = digits
                .to_timestamp(&name)
                .map(|ts| exif_timestamp(&ts))
                .and_then(|ts| {
                    debug!(file = %name, timestamp = %ts, "Extracted date/time");
                    self.metadata.set_timestamps(&file.path, &ts)
                });
            batch.push(match result {
                Ok(()) => FileResult::processed(&file.path, None),
                Err(e) => FileResult::failed(&file.path, &e),
            });
        }
        Ok(batch)
    }

    /// `-sbs.tiff` files -> spatial photos
    pub(super) fn encode(&self) -> Result<BatchReport> {
        let Some(encoder) = &self.encoder else {
            return Ok(BatchReport::new());
        };

        let files = self.sbs_files()?;
        info!(count = files.len(), params = ?self.config.encoder, "Creating spatial photos");

        let mut batch = BatchReport::new();
        for (i, file) in files.iter().enumerate() {
            debug!("[{}/{}] Encoding {}", i + 1, files.len(), file.file_name());
            let result = match encoder.encode(&file.path) {
                Ok(()) => FileResult::processed(&file.path, None),
                Err(e) => FileResult::failed(&file.path, &e),
            };
            batch.push(result);
        }
        Ok(batch)
    }

    /// Move encoded photos from the left directory to the destination
    ///
    /// Existing files at the destination are left alone.
    pub(super) fn move_spatial_photos(&self) -> Result<BatchReport> {
        let destination = &self.config.heic_destination;
        let spatial_ext = [self.config.spatial_extension.clone()];
        let files = list_media(&self.config.left_dir, |f| f.has_extension(&spatial_ext))?;
        info!(
            count = files.len(),
            destination = %destination.display(),
            "Moving spatial photos"
        );

        let mut batch = BatchReport::new();
        if files.is_empty() {
            return Ok(batch);
        }
        if let Err(e) = fs::create_dir_all(destination) {
            let e = Error::from(e);
            warn!(destination = %destination.display(), error = %e, "Cannot create destination");
            for file in &files {
                batch.push(FileResult::failed(&file.path, &e));
            }
            return Ok(batch);
        }

        for file in &files {
            let dest: PathBuf = destination.join(file.file_name());
            if dest.exists() {
                batch.push(FileResult::skipped(&file.path, "already exists at destination"));
                continue;
            }
            let result = match move_file(&file.path, &dest) {
                Ok(()) => FileResult::processed(&file.path, Some(dest)),
                Err(e) => FileResult::failed(&file.path, &e),
            };
            batch.push(result);
        }
        Ok(batch)
    }
}

fn restore_mtime(path: &Path, mtime: SystemTime) -> std::io::Result<()> {
    filetime::set_file_mtime(path, filetime::FileTime::from_system_time(mtime))
}

/// Rename, falling back to copy + delete across filesystems
fn move_file(source: &Path, dest: &Path) -> Result<()> {
    if fs::rename(source, dest).is_err() {
        fs::copy(source, dest)?;
        fs::remove_file(source)?;
    }
    Ok(())
}
