//! Lossless JPEG rotation via jpegtran
//!
//! Baking the EXIF orientation into the pixels keeps later metadata copies
//! from re-applying a rotation the aligner has already lost.

use super::ExternalTool;
use crate::error::Result;
use std::ffi::OsString;
use std::path::Path;

/// Lossless transform undoing an EXIF orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    Transpose,
    Rotate90,
    Transverse,
    Rotate270,
}

impl Transform {
    /// Transform for an EXIF orientation value
    ///
    /// `None` for 1 (already upright) and for values outside 1..=8;
    /// use [`is_valid_orientation`] to tell those apart.
    pub fn for_orientation(orientation: u32) -> Option<Self> {
        match orientation {
            2 => Some(Transform::FlipHorizontal),
            3 => Some(Transform::Rotate180),
            4 => Some(Transform::FlipVertical),
            5 => Some(Transform::Transpose),
            6 => Some(Transform::Rotate90),
            7 => Some(Transform::Transverse),
            8 => Some(Transform::Rotate270),
            _ => None,
        }
    }

    pub fn args(&self) -> &'static [&'static str] {
        match self {
            Transform::FlipHorizontal => &["-flip", "horizontal"],
            Transform::Rotate180 => &["-rotate", "180"],
            Transform::FlipVertical => &["-flip", "vertical"],
            Transform::Transpose => &["-transpose"],
            Transform::Rotate90 => &["-rotate", "90"],
            Transform::Transverse => &["-transverse"],
            Transform::Rotate270 => &["-rotate", "270"],
        }
    }
}

pub fn is_valid_orientation(orientation: u32) -> bool {
    (1..=8).contains(&orientation)
}

/// Applies a lossless transform, writing to a separate output file
#[derive(Debug, Clone)]
pub struct Rotator {
    tool: ExternalTool,
}

impl Rotator {
    pub fn new(tool: ExternalTool) -> Self {
        Self { tool }
    }

    pub fn args(&self, transform: Transform, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-copy".into(), "all".into()];
        args.extend(transform.args().iter().map(|a| OsString::from(*a)));
        args.push("-outfile".into());
        args.push(output.as_os_str().to_owned());
        args.push(input.as_os_str().to_owned());
        args
    }

    pub fn rotate(&self, transform: Transform, input: &Path, output: &Path) -> Result<()> {
        self.tool.run(self.args(transform, input, output)).map(|_| ())
    }
}
