//! JSON configuration of the `match_demo` binary.
//!
//! ```json
//! {
//!   "input": "query.png",
//!   "reference": "train.png",
//!   "params": { "ransac": { "seed": 7 } },
//!   "output": { "json_out": "out/report.json" }
//! }
//! ```
//! `params` and `output` may be omitted; missing fields take their defaults.
use crate::pipeline::PipelineParams;

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where to write the JSON report; printed to stdout when absent.
    pub json_out: Option<PathBuf>,
    /// Include every keypoint of both images in the report.
    pub include_keypoints: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    /// Query image; its coordinates are mapped by the homography.
    pub input: PathBuf,
    /// Train (reference) image.
    pub reference: PathBuf,
    #[serde(default)]
    pub params: PipelineParams,
    #[serde(default)]
    pub output: OutputConfig,
}

pub fn parse_config(contents: &str) -> Result<RuntimeConfig, String> {
    serde_json::from_str(contents).map_err(|e| format!("Failed to parse config: {e}"))
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = parse_config(r#"{"input": "a.png", "reference": "b.png"}"#).unwrap();
        assert_eq!(cfg.input, PathBuf::from("a.png"));
        assert_eq!(cfg.params, PipelineParams::default());
        assert!(cfg.output.json_out.is_none());
    }

    #[test]
    fn nested_overrides_are_applied() {
        let cfg = parse_config(
            r#"{
                "input": "a.png",
                "reference": "b.png",
                "params": {"keypoints": {"sobel_kernel_size": 5}, "matching": {"distance_threshold": 0.4}},
                "output": {"json_out": "r.json", "include_keypoints": true}
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.params.keypoints.sobel_kernel_size, 5);
        assert_eq!(cfg.params.matching.distance_threshold, Some(0.4));
        assert!(cfg.output.include_keypoints);
    }

    #[test]
    fn missing_reference_is_an_error() {
        let err = parse_config(r#"{"input": "a.png"}"#).unwrap_err();
        assert!(err.contains("reference"), "{err}");
    }
}
