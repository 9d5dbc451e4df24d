use serde::{Deserialize, Serialize};

/// Outcome counts of one matching pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub query_keypoints: usize,
    pub train_keypoints: usize,
    pub matches: usize,
    /// Best candidate not clearly closer than the second best.
    pub ratio_rejections: usize,
    /// Passed the ratio test but exceeded the distance cap.
    pub distance_rejections: usize,
}
