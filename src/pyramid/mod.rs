//! Gaussian and Difference-of-Gaussians scale space.
//!
//! Purpose
//! - Represent an intensity image at several resolutions (octaves) and, per
//!   octave, at geometrically increasing blur levels, so blob-like structure
//!   can be located independently of its size.
//!
//! Design
//! - Octave count: the largest `n` with `side / factor^n >= min_image_size`
//!   for both sides. Octave 0 is the input resolution; a degenerate input
//!   yields no octaves at all.
//! - Each octave holds `s + 3` Gaussian images with `sigma_i = sigma0 * 2^(i/s)`,
//!   each blurred directly from the octave base with a separable, mirrored
//!   Gaussian (`filters`), and `s + 2` DoG images `G[i+1] - G[i]`.
//! - The next octave's base is the Gaussian image whose sigma is nearest
//!   `2 * sigma0`, area-averaged down by `downscale_factor` (`downsample`).
//! - Octave bases form a cheap sequential chain (one blur + resize each);
//!   the expensive per-octave stacks are then independent and run in
//!   parallel with the `parallel` feature.
//!
//! Complexity
//! - Per octave O(W·H·Σ(2·radius_i+1)); memory is dominated by octave 0.

pub mod downsample;
pub mod filters;
pub mod options;

pub use options::ScaleSpaceOptions;

use crate::image::{ImageF32, ImageStack};
use filters::gaussian_blur;
use log::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Gaussian-blurred copies of one octave's base image.
#[derive(Clone, Debug)]
pub struct Octave {
    pub index: usize,
    /// Cumulative downscale ratio with respect to the input image.
    pub scale: f32,
    /// Blur applied to each layer, in octave pixels.
    pub sigmas: Vec<f32>,
    pub gaussians: ImageStack,
}

/// Difference-of-Gaussians layers derived from an [`Octave`].
#[derive(Clone, Debug)]
pub struct DogOctave {
    pub index: usize,
    /// Cumulative downscale ratio with respect to the input image.
    pub scale: f32,
    pub dogs: ImageStack,
}

impl DogOctave {
    pub fn width(&self) -> usize {
        self.dogs.width()
    }

    pub fn height(&self) -> usize {
        self.dogs.height()
    }
}

/// Number of octaves produced for a `w × h` input.
pub fn octave_count(w: usize, h: usize, options: &ScaleSpaceOptions) -> usize {
    let min = options.min_image_size as f64;
    let factor = options.downscale_factor as f64;
    if (w as f64) < min || (h as f64) < min || factor <= 1.0 {
        return 0;
    }
    let mut n = 0usize;
    loop {
        let div = factor.powi(n as i32 + 1);
        if w as f64 / div >= min && h as f64 / div >= min {
            n += 1;
        } else {
            return n;
        }
    }
}

/// Index of the Gaussian layer whose sigma is nearest `2 * base_sigma`.
fn next_octave_source(sigmas: &[f32], base_sigma: f32) -> usize {
    let target = 2.0 * base_sigma;
    sigmas
        .iter()
        .enumerate()
        .min_by(|a, b| (a.1 - target).abs().total_cmp(&(b.1 - target).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Base images of every octave, each already at its octave resolution.
fn octave_bases(image: &ImageF32, options: &ScaleSpaceOptions, count: usize) -> Vec<ImageF32> {
    let sigmas = options.sigmas();
    let source = next_octave_source(&sigmas, options.base_sigma);
    let mut bases: Vec<ImageF32> = Vec::with_capacity(count);
    if count == 0 {
        return bases;
    }
    bases.push(image.clone());
    while bases.len() < count {
        let Some(prev) = bases.last() else { break };
        let blurred = gaussian_blur(prev, sigmas[source]);
        let next = downsample::downscale(&blurred, options.downscale_factor);
        bases.push(next);
    }
    bases
}

fn build_octave(index: usize, base: &ImageF32, options: &ScaleSpaceOptions) -> Octave {
    let sigmas = options.sigmas();
    let layers = sigmas.iter().map(|&s| gaussian_blur(base, s)).collect();
    // Blurring preserves dimensions, so the layers always agree.
    let gaussians = ImageStack::from_layers(layers).unwrap_or_default();
    Octave {
        index,
        scale: options.downscale_factor.powi(index as i32),
        sigmas,
        gaussians,
    }
}

impl Octave {
    /// Derive the DoG layers.
    pub fn difference_of_gaussians(&self) -> DogOctave {
        DogOctave {
            index: self.index,
            scale: self.scale,
            dogs: self.gaussians.adjacent_differences(),
        }
    }
}

/// Build the Gaussian and DoG pyramids for `image`.
pub fn build_pyramids(image: &ImageF32, options: &ScaleSpaceOptions) -> Vec<(Octave, DogOctave)> {
    let count = octave_count(image.w, image.h, options);
    let bases = octave_bases(image, options, count);

    let build = |(index, base): (usize, &ImageF32)| {
        let octave = build_octave(index, base, options);
        let dog = octave.difference_of_gaussians();
        debug!(
            "scale space: octave {} {}x{} ({} gaussians, {} dogs)",
            index,
            base.w,
            base.h,
            octave.gaussians.depth(),
            dog.dogs.depth()
        );
        (octave, dog)
    };

    #[cfg(feature = "parallel")]
    let pyramids = bases.par_iter().enumerate().map(build).collect();
    #[cfg(not(feature = "parallel"))]
    let pyramids = bases.iter().enumerate().map(build).collect();

    pyramids
}

/// Build only the DoG pyramid; Gaussian layers are dropped per octave as soon
/// as their differences exist.
pub fn build_dog_pyramid(image: &ImageF32, options: &ScaleSpaceOptions) -> Vec<DogOctave> {
    let count = octave_count(image.w, image.h, options);
    let bases = octave_bases(image, options, count);

    let build =
        |(index, base): (usize, &ImageF32)| build_octave(index, base, options).difference_of_gaussians();

    #[cfg(feature = "parallel")]
    let dogs = bases.par_iter().enumerate().map(build).collect();
    #[cfg(not(feature = "parallel"))]
    let dogs = bases.iter().enumerate().map(build).collect();

    dogs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(min: usize) -> ScaleSpaceOptions {
        ScaleSpaceOptions::default().with_min_image_size(min)
    }

    #[test]
    fn octave_count_follows_size_ratio() {
        assert_eq!(octave_count(256, 256, &opts(16)), 4);
        assert_eq!(octave_count(256, 100, &opts(16)), 2);
        assert_eq!(octave_count(15, 300, &opts(16)), 0);
        assert_eq!(octave_count(16, 16, &opts(16)), 0);
        assert_eq!(octave_count(32, 32, &opts(16)), 1);
    }

    #[test]
    fn next_octave_source_is_double_sigma_layer() {
        let o = ScaleSpaceOptions::default();
        assert_eq!(next_octave_source(&o.sigmas(), o.base_sigma), 3);
    }

    #[test]
    fn pyramid_shapes_and_scales() {
        let img = ImageF32::from_fn(64, 48, |x, y| ((x * 13 + y * 7) % 29) as f32);
        let o = opts(8);
        let pyr = build_pyramids(&img, &o);
        assert_eq!(pyr.len(), 2);
        for (i, (oct, dog)) in pyr.iter().enumerate() {
            assert_eq!(oct.index, i);
            assert_eq!(oct.gaussians.depth(), o.images_per_octave + 3);
            assert_eq!(dog.dogs.depth(), o.images_per_octave + 2);
            assert_eq!(dog.scale, 2f32.powi(i as i32));
        }
        assert_eq!((pyr[1].1.width(), pyr[1].1.height()), (32, 24));
    }

    #[test]
    fn dog_of_constant_image_is_zero() {
        let img = ImageF32::from_fn(40, 40, |_, _| 90.0);
        let dogs = build_dog_pyramid(&img, &opts(16));
        assert_eq!(dogs.len(), 1);
        for layer in dogs[0].dogs.layers() {
            assert!(layer.data.iter().all(|v| v.abs() < 1e-3));
        }
    }
}
