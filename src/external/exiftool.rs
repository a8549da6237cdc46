//! Metadata edits via ExifTool

use super::ExternalTool;
use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::Path;
use tracing::debug;

/// Reads and writes image metadata
#[derive(Debug, Clone)]
pub struct MetadataTool {
    tool: ExternalTool,
}

impl MetadataTool {
    pub fn new(tool: ExternalTool) -> Self {
        Self { tool }
    }

    /// Copy every tag from `source` onto `dest`, overwriting `dest` in place
    pub fn copy_tags_args(source: &Path, dest: &Path) -> Vec<OsString> {
        vec![
            "-overwrite_original".into(),
            "-TagsFromFile".into(),
            source.as_os_str().to_owned(),
            "-all:all>all:all".into(),
            dest.as_os_str().to_owned(),
        ]
    }

    /// Set DateTimeOriginal, CreateDate and ModifyDate (`YYYY:MM:DD HH:MM:SS`)
    pub fn set_timestamps_args(file: &Path, timestamp: &str) -> Vec<OsString> {
        vec![
            "-overwrite_original".into(),
            format!("-DateTimeOriginal={}", timestamp).into(),
            format!("-CreateDate={}", timestamp).into(),
            format!("-ModifyDate={}", timestamp).into(),
            file.as_os_str().to_owned(),
        ]
    }

    /// Print the numeric Orientation tag and nothing else
    pub fn read_orientation_args(file: &Path) -> Vec<OsString> {
        vec![
            "-Orientation#".into(),
            "-s".into(),
            "-s".into(),
            "-s".into(),
            file.as_os_str().to_owned(),
        ]
    }

    pub fn reset_orientation_args(file: &Path) -> Vec<OsString> {
        vec![
            "-Orientation=1".into(),
            "-n".into(),
            "-overwrite_original".into(),
            file.as_os_str().to_owned(),
        ]
    }

    pub fn copy_tags(&self, source: &Path, dest: &Path) -> Result<()> {
        self.tool.run(Self::copy_tags_args(source, dest)).map(|_| ())
    }

    pub fn set_timestamps(&self, file: &Path, timestamp: &str) -> Result<()> {
        self.tool
            .run(Self::set_timestamps_args(file, timestamp))
            .map(|_| ())
    }

    /// Orientation value as reported by the tool
    ///
    /// Empty output means the file has no Orientation tag and reads as 1.
    /// Anything non-numeric is an `InvalidOrientation` error.
    pub fn read_orientation(&self, file: &Path) -> Result<u32> {
        let stdout = self.tool.run(Self::read_orientation_args(file))?;
        let value = stdout.trim();
        if value.is_empty() {
            debug!(file = %file.display(), "No Orientation tag, treating as upright");
            return Ok(1);
        }
        value.parse().map_err(|_| Error::InvalidOrientation {
            path: file.to_path_buf(),
            value: value.to_string(),
        })
    }

    pub fn reset_orientation(&self, file: &Path) -> Result<()> {
        self.tool.run(Self::reset_orientation_args(file)).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_copy_tags_args() {
        let args = MetadataTool::copy_tags_args(Path::new("l/a.jpg"), Path::new("l/a-sbs.tiff"));
        assert_eq!(
            strings(args),
            vec![
                "-overwrite_original",
                "-TagsFromFile",
                "l/a.jpg",
                "-all:all>all:all",
                "l/a-sbs.tiff"
            ]
        );
    }

    #[test]
    fn test_set_timestamps_args() {
        let args = MetadataTool::set_timestamps_args(Path::new("x-sbs.tiff"), "2023:07:04 15:30:00");
        assert_eq!(
            strings(args),
            vec![
                "-overwrite_original",
                "-DateTimeOriginal=2023:07:04 15:30:00",
                "-CreateDate=2023:07:04 15:30:00",
                "-ModifyDate=2023:07:04 15:30:00",
                "x-sbs.tiff"
            ]
        );
    }

    #[test]
    fn test_orientation_args() {
        assert_eq!(
            strings(MetadataTool::read_orientation_args(Path::new("a.jpg"))),
            vec!["-Orientation#", "-s", "-s", "-s", "a.jpg"]
        );
        assert_eq!(
            strings(MetadataTool::reset_orientation_args(Path::new("a.jpg"))),
            vec!["-Orientation=1", "-n", "-overwrite_original", "a.jpg"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_read_orientation_parses_stdout() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-exiftool");
        std::fs::write(&script, "#!/bin/sh\necho 6\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let tool = MetadataTool::new(ExternalTool::new(&script));
        assert_eq!(tool.read_orientation(Path::new("a.jpg")).unwrap(), 6);

        // no Orientation tag at all
        std::fs::write(&script, "#!/bin/sh\necho\n").unwrap();
        assert_eq!(tool.read_orientation(Path::new("a.jpg")).unwrap(), 1);

        std::fs::write(&script, "#!/bin/sh\necho abc\n").unwrap();
        let err = tool.read_orientation(Path::new("a.jpg")).unwrap_err();
        assert!(matches!(err, Error::InvalidOrientation { .. }));
    }
}
