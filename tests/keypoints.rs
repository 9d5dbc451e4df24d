mod common;

use common::init_logger;
use common::synthetic_image::{ridge_layer, textured_image};
use keypoint_matcher::image::ImageF32;
use keypoint_matcher::keypoints::{
    find_extrema, KeypointOptions, KeypointRefiner, OctaveSlice, DESCRIPTOR_LEN, SOBEL_3X3,
    SOBEL_5X5,
};
use keypoint_matcher::pyramid::ScaleSpaceOptions;
use keypoint_matcher::{detect_keypoints, FeaturePipeline, PipelineParams};

#[test]
fn straight_ridge_has_raw_extrema_but_no_keypoints() {
    init_logger();
    let side = ridge_layer(41, 20.0, 20.0, -5.0);
    let center = ridge_layer(41, 20.0, 20.0, 0.0);
    let slice = OctaveSlice {
        prev: &side,
        current: &center,
        next: &side,
        octave: 0,
        scale_index: 1,
        octave_scale: 1.0,
    };
    let opts = KeypointOptions::default();

    let candidates = find_extrema(&slice, opts.extrema_radius);
    assert!(!candidates.is_empty(), "ridge must yield raw extrema");

    for kernel in [&SOBEL_3X3, &SOBEL_5X5] {
        let refiner = KeypointRefiner::new(&opts, kernel);
        let accepted = candidates
            .iter()
            .filter_map(|&c| refiner.refine(&slice, c))
            .count();
        assert_eq!(accepted, 0);
    }
}

#[test]
fn descriptors_are_unit_length_and_non_negative() {
    init_logger();
    let img = textured_image(128, 128, 5);
    let pipeline = FeaturePipeline::new(PipelineParams::default()).unwrap();
    let (kps, report) = pipeline.detect_keypoints_with_report(&img);
    assert!(!kps.is_empty(), "no keypoints: {report:?}");
    assert!(report.raw_extrema() >= kps.len());
    for kp in &kps {
        let d = kp.descriptor();
        assert_eq!(d.len(), DESCRIPTOR_LEN);
        let norm = d.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "norm={norm}");
        assert!(d.iter().all(|&v| v >= 0.0));
    }
}

#[test]
fn keypoints_lie_inside_the_image() {
    let img = textured_image(128, 96, 8);
    let kps = detect_keypoints(&img, &ScaleSpaceOptions::default(), &KeypointOptions::default())
        .unwrap();
    for kp in &kps {
        let (x, y) = kp.image_position();
        assert!((0.0..128.0).contains(&x) && (0.0..96.0).contains(&y));
        assert!(kp.scale_index() >= 1);
        assert_eq!(kp.octave_scale(), 2f32.powi(kp.octave() as i32));
    }
}

#[test]
fn degenerate_image_yields_empty_list() {
    let pipeline = FeaturePipeline::new(PipelineParams::default()).unwrap();
    assert!(pipeline.detect_keypoints(&ImageF32::new(8, 8)).is_empty());
    let flat = ImageF32::from_fn(64, 64, |_, _| 90.0);
    assert!(pipeline.detect_keypoints(&flat).is_empty());
}

#[test]
fn detection_is_repeatable() {
    let img = textured_image(96, 96, 21);
    let pipeline = FeaturePipeline::new(PipelineParams::default()).unwrap();
    assert_eq!(pipeline.detect_keypoints(&img), pipeline.detect_keypoints(&img));
}
