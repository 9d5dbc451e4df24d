//! Serializable reports describing what the detector and matcher did.
//!
//! `DetectionReport` carries per-octave extrema/acceptance counts with
//! rejection reasons; `MatchReport` carries ratio-test statistics. Both embed
//! or accompany a `TimingBreakdown` and serialize with camelCase keys for the
//! demo's JSON output.

pub mod keypoints;
pub mod matching;
pub mod timing;

pub use keypoints::{DetectionReport, OctaveReport, RejectionCounts};
pub use matching::MatchReport;
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
