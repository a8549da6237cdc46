//! Media file naming model
//!
//! Stages never exchange a manifest: each one finds the previous stage's
//! outputs by filename alone. A name carries an optional role suffix
//! (`-corrected`, `-sbs`) just before the extension, and usually a numeric
//! identifier that serves as the pairing key.

pub mod natural;
pub mod pattern;

use crate::error::{Error, Result};
use natural::sort_naturally;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extension of aligned side-by-side outputs
pub const SBS_EXTENSION: &str = "tiff";

/// Which stage a file belongs to, read from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleSuffix {
    /// Camera original
    Original,
    /// Lens-corrected copy: `name-corrected.ext`
    Corrected,
    /// Aligned stereo pair: `name-sbs.tiff`
    Sbs,
}

impl RoleSuffix {
    pub fn tag(&self) -> &'static str {
        match self {
            RoleSuffix::Original => "",
            RoleSuffix::Corrected => "-corrected",
            RoleSuffix::Sbs => "-sbs",
        }
    }

    /// Role of a file stem (the name without extension)
    pub fn of_stem(stem: &str) -> Self {
        if stem.ends_with(RoleSuffix::Corrected.tag()) {
            RoleSuffix::Corrected
        } else if stem.ends_with(RoleSuffix::Sbs.tag()) {
            RoleSuffix::Sbs
        } else {
            RoleSuffix::Original
        }
    }
}

/// A file taking part in the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    /// Numeric identifier, the last digit run of the base stem
    pub key: Option<String>,
    pub role: RoleSuffix,
}

impl MediaFile {
    pub fn new(path: PathBuf) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let role = RoleSuffix::of_stem(&stem);
        let base = stem.strip_suffix(role.tag()).unwrap_or(&stem);
        let key = pattern::trailing_number(base).map(str::to_string);

        Self { path, key, role }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
    }

    /// Stem with the role suffix removed: `GOPR0001` for `GOPR0001-corrected.jpg`
    pub fn base_stem(&self) -> String {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        stem.strip_suffix(self.role.tag())
            .map(str::to_string)
            .unwrap_or(stem)
    }

    pub fn has_extension(&self, extensions: &[String]) -> bool {
        self.extension()
            .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
            .unwrap_or(false)
    }

    /// Path of this file's counterpart for another role, in `dir`
    pub fn derived_path(&self, dir: &Path, role: RoleSuffix, extension: &str) -> PathBuf {
        dir.join(format!("{}{}.{}", self.base_stem(), role.tag(), extension))
    }

    /// Path of the aligned output for this file
    pub fn sbs_path(&self, dir: &Path) -> PathBuf {
        self.derived_path(dir, RoleSuffix::Sbs, SBS_EXTENSION)
    }
}

/// Fail with `DirectoryNotFound` unless `path` is a directory
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(Error::DirectoryNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// List the files directly inside `dir` that `keep` accepts, in natural order
///
/// Entries that can't be read (dangling symlinks, permission errors) are
/// logged and left out; only a missing `dir` is an error.
pub fn list_media<F>(dir: &Path, keep: F) -> Result<Vec<MediaFile>>
where
    F: Fn(&MediaFile) -> bool,
{
    ensure_dir(dir)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(
                    dir = %dir.display(),
                    path = ?e.path(),
                    error = %e,
                    "Skipping unreadable directory entry"
                );
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let file = MediaFile::new(entry.into_path());
        if keep(&file) {
            files.push(file);
        }
    }

    sort_naturally(&mut files, |f| {
        f.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    });

    debug!(dir = %dir.display(), count = files.len(), "Listed media files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_role_suffix() {
        assert_eq!(RoleSuffix::of_stem("GOPR0001"), RoleSuffix::Original);
        assert_eq!(RoleSuffix::of_stem("GOPR0001-corrected"), RoleSuffix::Corrected);
        assert_eq!(RoleSuffix::of_stem("GOPR0001-sbs"), RoleSuffix::Sbs);
    }

    #[test]
    fn test_media_file_parts() {
        let file = MediaFile::new(PathBuf::from("left/trip-007-corrected.jpg"));
        assert_eq!(file.role, RoleSuffix::Corrected);
        assert_eq!(file.key.as_deref(), Some("007"));
        assert_eq!(file.base_stem(), "trip-007");
        assert_eq!(file.file_name(), "trip-007-corrected.jpg");
        assert_eq!(
            file.sbs_path(Path::new("left")),
            PathBuf::from("left/trip-007-sbs.tiff")
        );

        let plain = MediaFile::new(PathBuf::from("holiday.JPG"));
        assert_eq!(plain.role, RoleSuffix::Original);
        assert!(plain.key.is_none());
        assert!(plain.has_extension(&["jpg".to_string(), "jpeg".to_string()]));
        assert!(!plain.has_extension(&["tiff".to_string()]));
    }

    #[test]
    fn test_list_media_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        for name in ["IMG10.jpg", "IMG2.jpg", "IMG1.JPG", "notes.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("IMG3.jpg")).unwrap();

        let exts = vec!["jpg".to_string()];
        let files = list_media(dir.path(), |f| f.has_extension(&exts)).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, vec!["IMG1.JPG", "IMG2.jpg", "IMG10.jpg"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_media_skips_dangling_symlink() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.jpg"), dir.path().join("dangling.jpg")).unwrap();

        let files = list_media(dir.path(), |_| true).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, vec!["a.jpg"]);
    }

    #[test]
    fn test_list_media_missing_dir() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = list_media(&missing, |_| true).unwrap_err();
        assert!(matches!(err, Error::DirectoryNotFound { .. }));
    }
}
