use crate::image::{reflect_index, ImageF32};

/// Trait implemented by separable 1D filters used for scale-space construction.
pub trait SeparableFilter {
    /// Return the 1D taps (in left-to-right order). The kernel is applied
    /// centred, so an odd tap count is expected.
    fn taps(&self) -> &[f32];
}

/// Sampled, normalised Gaussian with radius `ceil(3σ)`.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianKernel {
    sigma: f32,
    taps: Vec<f32>,
}

impl GaussianKernel {
    pub fn new(sigma: f32) -> Self {
        let radius = (3.0 * sigma).ceil().max(0.0) as usize;
        let denom = 2.0 * sigma * sigma;
        let mut taps: Vec<f32> = (0..=2 * radius)
            .map(|i| {
                let x = i as f32 - radius as f32;
                if denom > 0.0 {
                    (-x * x / denom).exp()
                } else {
                    1.0
                }
            })
            .collect();
        let sum: f32 = taps.iter().sum();
        for t in &mut taps {
            *t /= sum;
        }
        Self { sigma, taps }
    }

    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    pub fn radius(&self) -> usize {
        self.taps.len() / 2
    }
}

impl SeparableFilter for GaussianKernel {
    #[inline]
    fn taps(&self) -> &[f32] {
        &self.taps
    }
}

/// Convolve `img` with `filter` horizontally, then vertically.
///
/// Samples outside the image are mirrored back in (`reflect_index`), so the
/// border keeps its local contrast instead of being pulled towards a constant.
pub fn apply(filter: &dyn SeparableFilter, img: &ImageF32) -> ImageF32 {
    let taps = filter.taps();
    if img.is_empty() || taps.is_empty() {
        return img.clone();
    }
    let radius = (taps.len() / 2) as isize;
    let (w, h) = (img.w, img.h);

    let mut tmp = ImageF32::new(w, h);
    for y in 0..h {
        let src = img.row(y);
        let dst = tmp.row_mut(y);
        for (x, out) in dst.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &tap) in taps.iter().enumerate() {
                let sx = reflect_index(x as isize + k as isize - radius, w);
                acc += tap * src[sx];
            }
            *out = acc;
        }
    }

    let mut out = ImageF32::new(w, h);
    for y in 0..h {
        for (k, &tap) in taps.iter().enumerate() {
            let sy = reflect_index(y as isize + k as isize - radius, h);
            let src = tmp.row(sy);
            let dst = out.row_mut(y);
            for (d, &s) in dst.iter_mut().zip(src) {
                *d += tap * s;
            }
        }
    }
    out
}

/// Blur with a Gaussian of the given sigma.
pub fn gaussian_blur(img: &ImageF32, sigma: f32) -> ImageF32 {
    apply(&GaussianKernel::new(sigma), img)
}
