mod common;

use common::init_logger;
use common::synthetic_image::textured_image;
use keypoint_matcher::image::ImageF32;
use keypoint_matcher::pyramid::{build_pyramids, octave_count, ScaleSpaceOptions};

#[test]
fn pyramid_of_256_image_has_four_octaves() {
    init_logger();
    let img = textured_image(256, 256, 3);
    let opts = ScaleSpaceOptions::default();
    assert_eq!(opts.downscale_factor, 2.0);
    assert_eq!(opts.min_image_size, 16);

    let pyramids = build_pyramids(&img, &opts);
    assert_eq!(pyramids.len(), (256f64 / 16.0).log2().floor() as usize);
    for (i, (octave, dog)) in pyramids.iter().enumerate() {
        let side = 256 >> i;
        assert_eq!((dog.width(), dog.height()), (side, side), "octave {i}");
        assert_eq!(octave.gaussians.depth(), opts.images_per_octave + 3);
        assert_eq!(dog.dogs.depth(), opts.images_per_octave + 2);
        assert_eq!(octave.sigmas.len(), opts.images_per_octave + 3);
    }
}

#[test]
fn dog_layers_are_differences_of_adjacent_gaussians() {
    let img = textured_image(64, 64, 11);
    let pyramids = build_pyramids(&img, &ScaleSpaceOptions::default());
    let (octave, dog) = &pyramids[0];
    let g = octave.gaussians.layers();
    for (i, d) in dog.dogs.layers().iter().enumerate() {
        for (x, y) in [(0, 0), (31, 17), (63, 63)] {
            let expected = g[i + 1].get(x, y) - g[i].get(x, y);
            assert!((d.get(x, y) - expected).abs() < 1e-4);
        }
    }
}

#[test]
fn degenerate_sizes_produce_no_octaves() {
    let opts = ScaleSpaceOptions::default();
    assert_eq!(octave_count(15, 400, &opts), 0);
    assert!(build_pyramids(&ImageF32::new(12, 12), &opts).is_empty());
}
