//! Brute-force descriptor matching with Lowe's ratio test.
//!
//! Every query keypoint scans all train keypoints, keeping the best and
//! second-best Euclidean descriptor distance. Updates use strict `<`, so when
//! distances tie the train keypoint encountered first stays best: results are
//! stable for a given input order. With a single train keypoint the second-best
//! distance is infinite and only the optional absolute cap applies.

pub mod options;

pub use options::MatchOptions;

use crate::diagnostics::MatchReport;
use crate::keypoints::Keypoint;

use log::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Correspondence between a query and a train keypoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureMatch<'a> {
    pub query: &'a Keypoint,
    pub train: &'a Keypoint,
    pub query_index: usize,
    pub train_index: usize,
    /// Euclidean descriptor distance (never negative).
    pub distance: f32,
}

impl FeatureMatch<'_> {
    /// Input-image positions `(query, train)`.
    pub fn positions(&self) -> ((f64, f64), (f64, f64)) {
        let (qx, qy) = self.query.image_position();
        let (tx, ty) = self.train.image_position();
        ((qx as f64, qy as f64), (tx as f64, ty as f64))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Nearest {
    index: usize,
    best: f32,
    second: f32,
}

fn nearest_two(query: &Keypoint, train: &[Keypoint]) -> Option<Nearest> {
    if train.is_empty() {
        return None;
    }
    let mut n = Nearest {
        index: 0,
        best: f32::INFINITY,
        second: f32::INFINITY,
    };
    for (index, candidate) in train.iter().enumerate() {
        let d = query.descriptor_distance(candidate);
        if d < n.best {
            n.second = n.best;
            n.best = d;
            n.index = index;
        } else if d < n.second {
            n.second = d;
        }
    }
    Some(n)
}

enum Verdict {
    Accepted(usize, f32),
    RatioRejected,
    DistanceRejected,
    NoCandidate,
}

fn judge(query: &Keypoint, train: &[Keypoint], options: &MatchOptions) -> Verdict {
    let Some(n) = nearest_two(query, train) else {
        return Verdict::NoCandidate;
    };
    let distinctive = n.best < options.lowe_ratio * n.second;
    if !distinctive {
        return Verdict::RatioRejected;
    }
    let within_cap = options.distance_threshold.map_or(true, |cap| n.best < cap);
    if !within_cap {
        return Verdict::DistanceRejected;
    }
    Verdict::Accepted(n.index, n.best)
}

/// Match `query` against `train`; see [`match_features_with_report`].
pub fn match_features<'a>(
    query: &'a [Keypoint],
    train: &'a [Keypoint],
    options: &MatchOptions,
) -> Vec<FeatureMatch<'a>> {
    match_features_with_report(query, train, options).0
}

/// Match every query keypoint against `train`, returning the accepted
/// matches in query order plus rejection counts.
pub fn match_features_with_report<'a>(
    query: &'a [Keypoint],
    train: &'a [Keypoint],
    options: &MatchOptions,
) -> (Vec<FeatureMatch<'a>>, MatchReport) {
    let mut report = MatchReport {
        query_keypoints: query.len(),
        train_keypoints: train.len(),
        ..Default::default()
    };
    if train.is_empty() {
        return (Vec::new(), report);
    }

    #[cfg(feature = "parallel")]
    let verdicts: Vec<Verdict> = query.par_iter().map(|q| judge(q, train, options)).collect();
    #[cfg(not(feature = "parallel"))]
    let verdicts: Vec<Verdict> = query.iter().map(|q| judge(q, train, options)).collect();

    let mut matches = Vec::new();
    for (query_index, verdict) in verdicts.into_iter().enumerate() {
        match verdict {
            Verdict::Accepted(train_index, distance) => matches.push(FeatureMatch {
                query: &query[query_index],
                train: &train[train_index],
                query_index,
                train_index,
                distance,
            }),
            Verdict::RatioRejected => report.ratio_rejections += 1,
            Verdict::DistanceRejected => report.distance_rejections += 1,
            Verdict::NoCandidate => {}
        }
    }
    report.matches = matches.len();
    debug!(
        "matching: {} x {} keypoints -> {} matches (ratio-rejected={}, distance-rejected={})",
        report.query_keypoints,
        report.train_keypoints,
        report.matches,
        report.ratio_rejections,
        report.distance_rejections
    );
    (matches, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(x: f32, desc: &[f32]) -> Keypoint {
        Keypoint::new(0, 1, x, 0.0, 1.0, desc.to_vec())
    }

    #[test]
    fn ratio_test_accepts_distinct_nearest() {
        let query = vec![kp(0.0, &[1.0, 0.0])];
        let train = vec![kp(0.0, &[0.0, 1.0]), kp(1.0, &[0.9, 0.0])];
        let (m, report) = match_features_with_report(&query, &train, &MatchOptions::default());
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].train_index, 1);
        assert!((m[0].distance - 0.1).abs() < 1e-6);
        assert_eq!(report.matches, 1);
    }

    #[test]
    fn ambiguous_match_is_rejected() {
        let query = vec![kp(0.0, &[1.0, 0.0])];
        let train = vec![kp(0.0, &[0.0, 0.1]), kp(1.0, &[0.0, -0.1])];
        let (m, report) = match_features_with_report(&query, &train, &MatchOptions::default());
        assert!(m.is_empty());
        assert_eq!(report.ratio_rejections, 1);
    }

    #[test]
    fn ties_keep_the_first_train_keypoint_as_best() {
        let q = kp(0.0, &[1.0, 0.0]);
        let train = vec![kp(0.0, &[0.0, 0.0]), kp(1.0, &[2.0, 0.0]), kp(2.0, &[5.0, 0.0])];
        let n = nearest_two(&q, &train).unwrap();
        assert_eq!(n.index, 0);
        assert_eq!((n.best, n.second), (1.0, 1.0));
    }

    #[test]
    fn single_candidate_only_faces_the_distance_cap() {
        let query = vec![kp(0.0, &[1.0, 0.0])];
        let train = vec![kp(0.0, &[0.0, 1.0])];
        assert_eq!(match_features(&query, &train, &MatchOptions::default()).len(), 1);
        let capped = MatchOptions::default().with_distance_threshold(1.0);
        let (m, report) = match_features_with_report(&query, &train, &capped);
        assert!(m.is_empty());
        assert_eq!(report.distance_rejections, 1);
    }

    #[test]
    fn empty_train_set_yields_nothing() {
        let query = vec![kp(0.0, &[1.0])];
        assert!(match_features(&query, &[], &MatchOptions::default()).is_empty());
    }

    #[test]
    fn options_validation() {
        assert!(MatchOptions::default().validate().is_ok());
        let bad = MatchOptions {
            lowe_ratio: 1.5,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        assert!(MatchOptions::default()
            .with_distance_threshold(0.0)
            .validate()
            .is_err());
    }
}
