//! Stereo alignment via StereoAutoAlign

use super::ExternalTool;
use crate::error::Result;
use std::ffi::OsString;
use std::path::Path;

/// Search radius passed to the aligner
pub const DEFAULT_SEARCH_RADIUS: u32 = 10;

/// Aligns a left/right pair into one side-by-side TIFF
#[derive(Debug, Clone)]
pub struct StereoAligner {
    tool: ExternalTool,
    search_radius: u32,
}

impl StereoAligner {
    pub fn new(tool: ExternalTool, search_radius: u32) -> Self {
        Self {
            tool,
            search_radius,
        }
    }

    pub fn args(&self, left: &Path, right: &Path, output: &Path) -> Vec<OsString> {
        vec![
            left.as_os_str().to_owned(),
            right.as_os_str().to_owned(),
            self.search_radius.to_string().into(),
            output.as_os_str().to_owned(),
        ]
    }

    pub fn align(&self, left: &Path, right: &Path, output: &Path) -> Result<()> {
        self.tool.run(self.args(left, right, output)).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        let aligner = StereoAligner::new(ExternalTool::new("StereoAutoAlign"), DEFAULT_SEARCH_RADIUS);
        let args = aligner.args(
            Path::new("left/a.jpg"),
            Path::new("right/a.jpg"),
            Path::new("left/a-sbs.tiff"),
        );
        assert_eq!(
            args,
            vec![
                OsString::from("left/a.jpg"),
                OsString::from("right/a.jpg"),
                OsString::from("10"),
                OsString::from("left/a-sbs.tiff"),
            ]
        );
    }
}
