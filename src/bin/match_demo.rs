use keypoint_matcher::config::{load_config, RuntimeConfig};
use keypoint_matcher::homography::Homography;
use keypoint_matcher::image::io::{load_grayscale_image, write_json_file};
use keypoint_matcher::pipeline::PairReport;
use keypoint_matcher::{FeaturePipeline, Keypoint};
use serde::Serialize;
use std::env;
use std::path::Path;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeypointRecord {
    octave: usize,
    scale_index: usize,
    x: f32,
    y: f32,
}

impl From<&Keypoint> for KeypointRecord {
    fn from(kp: &Keypoint) -> Self {
        let (x, y) = kp.image_position();
        Self {
            octave: kp.octave(),
            scale_index: kp.scale_index(),
            x,
            y,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DemoReport {
    homography: Option<Homography>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    report: PairReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_keypoints: Option<Vec<KeypointRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    train_keypoints: Option<Vec<KeypointRecord>>,
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn usage() -> String {
    "Usage: match_demo <config.json>".to_string()
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config: RuntimeConfig = load_config(Path::new(&config_path))?;

    let query = load_grayscale_image(&config.input)?;
    let train = load_grayscale_image(&config.reference)?;
    let pipeline =
        FeaturePipeline::new(config.params).map_err(|e| format!("Invalid parameters: {e}"))?;

    let (result, report) = pipeline.match_and_estimate_with_report(&query, &train);

    println!("Match summary");
    println!(
        "  keypoints: query={} train={}",
        report.query.keypoint_count, report.train.keypoint_count
    );
    println!(
        "  matches: {} (ratio-rejected={}, distance-rejected={})",
        report.matching.matches, report.matching.ratio_rejections, report.matching.distance_rejections
    );
    match &result {
        Ok(h) => {
            let m = &h.matrix;
            println!(
                "  inliers: {}/{} ({:.1}%)",
                h.inlier_count(),
                h.total_matches,
                100.0 * h.inlier_ratio()
            );
            println!(
                "  homography:\n    [{:.4} {:.4} {:.4}]\n    [{:.4} {:.4} {:.4}]\n    [{:.6} {:.6} {:.4}]",
                m[(0, 0)],
                m[(0, 1)],
                m[(0, 2)],
                m[(1, 0)],
                m[(1, 1)],
                m[(1, 2)],
                m[(2, 0)],
                m[(2, 1)],
                m[(2, 2)]
            );
        }
        Err(e) => println!("  homography: rejected ({e})"),
    }
    println!("  total_ms: {:.3}", report.timing.total_ms);

    let (query_keypoints, train_keypoints) = if config.output.include_keypoints {
        let q = pipeline.detect_keypoints(&query);
        let t = pipeline.detect_keypoints(&train);
        (
            Some(q.iter().map(KeypointRecord::from).collect()),
            Some(t.iter().map(KeypointRecord::from).collect()),
        )
    } else {
        (None, None)
    };

    let demo = DemoReport {
        error: result.as_ref().err().map(|e| e.to_string()),
        homography: result.ok(),
        report,
        query_keypoints,
        train_keypoints,
    };
    match &config.output.json_out {
        Some(path) => {
            write_json_file(path, &demo)?;
            println!("\nJSON report written to {}", path.display());
        }
        None => {
            let json = serde_json::to_string_pretty(&demo)
                .map_err(|e| format!("Failed to serialize JSON: {e}"))?;
            println!("\nJSON report:\n{json}");
        }
    }
    Ok(())
}
