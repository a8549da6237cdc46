//! EXIF orientation lookup
//!
//! Orientation is read either through the metadata tool (default, handles
//! every format ExifTool knows) or in-process from the embedded EXIF block.

use crate::config::OrientationReader;
use crate::error::{Error, Result};
use crate::external::exiftool::MetadataTool;
use crate::external::jpegtran::is_valid_orientation;
use exif::{In, Reader, Tag};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, trace};

/// Read the EXIF Orientation tag without spawning a process
///
/// EXIF without an Orientation tag reads as 1; a file without readable
/// EXIF is an error.
pub fn read_embedded_orientation(path: &Path) -> Result<u32> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let exif = Reader::new()
        .read_from_container(&mut reader)
        .map_err(|e| Error::ExifRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let Some(field) = exif.get_field(Tag::Orientation, In::PRIMARY) else {
        debug!(?path, "No Orientation tag, treating as upright");
        return Ok(1);
    };

    let value = field.value.get_uint(0).ok_or_else(|| Error::InvalidOrientation {
        path: path.to_path_buf(),
        value: field.display_value().to_string(),
    })?;

    trace!(?path, value, "Found embedded orientation");
    Ok(value)
}

/// Orientation of `path` (1..=8) using the configured reader
pub fn read_orientation(reader: OrientationReader, tool: &MetadataTool, path: &Path) -> Result<u32> {
    let value = match reader {
        OrientationReader::Exiftool => tool.read_orientation(path)?,
        OrientationReader::Embedded => read_embedded_orientation(path)?,
    };

    if !is_valid_orientation(value) {
        return Err(Error::InvalidOrientation {
            path: path.to_path_buf(),
            value: value.to_string(),
        });
    }
    Ok(value)
}
