use super::timing::TimingBreakdown;
use crate::keypoints::Rejection;

use serde::{Deserialize, Serialize};

/// Candidates dropped during refinement, by reason.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionCounts {
    pub low_contrast: usize,
    pub edge_response: usize,
    pub offset_too_large: usize,
    pub interpolated_contrast: usize,
    pub degenerate: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, reason: Rejection) {
        let slot = match reason {
            Rejection::LowContrast => &mut self.low_contrast,
            Rejection::EdgeResponse => &mut self.edge_response,
            Rejection::OffsetTooLarge => &mut self.offset_too_large,
            Rejection::InterpolatedContrast => &mut self.interpolated_contrast,
            Rejection::Degenerate => &mut self.degenerate,
        };
        *slot += 1;
    }

    pub fn merge(&mut self, other: &RejectionCounts) {
        self.low_contrast += other.low_contrast;
        self.edge_response += other.edge_response;
        self.offset_too_large += other.offset_too_large;
        self.interpolated_contrast += other.interpolated_contrast;
        self.degenerate += other.degenerate;
    }

    pub fn total(&self) -> usize {
        self.low_contrast
            + self.edge_response
            + self.offset_too_large
            + self.interpolated_contrast
            + self.degenerate
    }
}

/// Per-octave detection statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OctaveReport {
    pub index: usize,
    pub width: usize,
    pub height: usize,
    /// Cumulative downscale ratio with respect to the input.
    pub scale: f32,
    /// Strict extrema found over all interior DoG layers.
    pub raw_extrema: usize,
    pub accepted: usize,
    pub rejections: RejectionCounts,
}

impl OctaveReport {
    pub fn new(index: usize, width: usize, height: usize, scale: f32) -> Self {
        Self {
            index,
            width,
            height,
            scale,
            raw_extrema: 0,
            accepted: 0,
            rejections: RejectionCounts::default(),
        }
    }
}

/// Summary returned alongside the keypoints of one image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub image_width: usize,
    pub image_height: usize,
    pub octaves: Vec<OctaveReport>,
    pub keypoint_count: usize,
    pub timing: TimingBreakdown,
}

impl DetectionReport {
    pub fn raw_extrema(&self) -> usize {
        self.octaves.iter().map(|o| o.raw_extrema).sum()
    }

    pub fn rejections(&self) -> RejectionCounts {
        let mut total = RejectionCounts::default();
        for o in &self.octaves {
            total.merge(&o.rejections);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accumulate_and_merge() {
        let mut a = RejectionCounts::default();
        a.record(Rejection::EdgeResponse);
        a.record(Rejection::EdgeResponse);
        a.record(Rejection::Degenerate);
        let mut b = RejectionCounts::default();
        b.record(Rejection::LowContrast);
        b.merge(&a);
        assert_eq!(b.edge_response, 2);
        assert_eq!(b.total(), 4);
    }

    #[test]
    fn report_serializes_camel_case() {
        let report = DetectionReport {
            image_width: 8,
            image_height: 8,
            octaves: vec![OctaveReport::new(0, 8, 8, 1.0)],
            keypoint_count: 0,
            timing: TimingBreakdown::default(),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"imageWidth\":8"));
        assert!(json.contains("\"rawExtrema\":0"));
    }
}
