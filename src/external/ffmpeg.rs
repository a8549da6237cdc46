//! Lens distortion correction via FFmpeg's `lenscorrection` filter

use super::ExternalTool;
use crate::error::Result;
use std::ffi::OsString;
use std::path::Path;

/// Distortion model coefficients for typical 170° action cameras
pub const DEFAULT_LENS_PARAMS: &str = "k1=-0.2:k2=-0.025";

/// Writes a lens-corrected copy of an image
#[derive(Debug, Clone)]
pub struct LensCorrector {
    tool: ExternalTool,
    params: String,
}

impl LensCorrector {
    pub fn new(tool: ExternalTool, params: impl Into<String>) -> Self {
        Self {
            tool,
            params: params.into(),
        }
    }

    pub fn args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-i".into(),
            input.as_os_str().to_owned(),
            "-vf".into(),
            format!("lenscorrection={}", self.params).into(),
            "-q:v".into(),
            "2".into(),
            "-y".into(),
            output.as_os_str().to_owned(),
        ]
    }

    pub fn correct(&self, input: &Path, output: &Path) -> Result<()> {
        self.tool.run(self.args(input, output)).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        let corrector = LensCorrector::new(ExternalTool::new("ffmpeg"), DEFAULT_LENS_PARAMS);
        let args = corrector.args(Path::new("l/GOPR1.jpg"), Path::new("l/GOPR1-corrected.jpg"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "-i",
                "l/GOPR1.jpg",
                "-vf",
                "lenscorrection=k1=-0.2:k2=-0.025",
                "-q:v",
                "2",
                "-y",
                "l/GOPR1-corrected.jpg",
            ]
        );
    }
}
