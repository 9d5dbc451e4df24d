//! Gradient-histogram descriptor.
//!
//! The window around a keypoint is split into a 4×4 grid of square cells; each
//! cell accumulates an 8-bin histogram of gradient magnitude keyed by
//! orientation (`floor(deg / 45) mod 8`). The 128 values are concatenated in
//! row-major cell order, L2-normalised, clipped to `[0, 0.2]` and normalised
//! again.
use super::kernels::central_gradient;
use super::types::DESCRIPTOR_LEN;
use crate::image::ImageF32;

const CELLS_PER_SIDE: usize = 4;
const ORIENTATION_BINS: usize = 8;
const BIN_WIDTH_DEG: f32 = 360.0 / ORIENTATION_BINS as f32;
const CLIP: f32 = 0.2;
const NORM_EPS: f32 = 1e-12;

/// Square patch of gradient magnitudes and orientations (degrees in
/// `[0, 360)`), row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientWindow {
    pub size: usize,
    pub magnitudes: Vec<f32>,
    pub orientations: Vec<f32>,
}

impl GradientWindow {
    /// Gradients of `img` over a `size × size` patch whose top-left corner is
    /// `(col - size/2, row - size/2)`. Central differences with reflected
    /// reads, so patches overlapping the border are still full-size.
    pub fn extract(img: &ImageF32, col: usize, row: usize, size: usize) -> Self {
        let half = (size / 2) as isize;
        let (x0, y0) = (col as isize - half, row as isize - half);
        let mut magnitudes = Vec::with_capacity(size * size);
        let mut orientations = Vec::with_capacity(size * size);
        for dy in 0..size as isize {
            for dx in 0..size as isize {
                let (gx, gy) = central_gradient(img, x0 + dx, y0 + dy);
                magnitudes.push(gx.hypot(gy));
                orientations.push(gy.atan2(gx).to_degrees().rem_euclid(360.0));
            }
        }
        Self {
            size,
            magnitudes,
            orientations,
        }
    }

    pub fn descriptor(&self) -> Vec<f32> {
        build_descriptor(&self.magnitudes, &self.orientations, self.size)
    }
}

#[inline]
fn orientation_bin(deg: f32) -> usize {
    let bin = (deg / BIN_WIDTH_DEG).floor() as isize;
    bin.rem_euclid(ORIENTATION_BINS as isize) as usize
}

/// Build the 128-value descriptor from a `size × size` window (`size` a
/// positive multiple of 4).
pub fn build_descriptor(magnitudes: &[f32], orientations: &[f32], size: usize) -> Vec<f32> {
    let mut desc = accumulate_histograms(magnitudes, orientations, size);
    normalize_descriptor(&mut desc);
    desc
}

fn accumulate_histograms(magnitudes: &[f32], orientations: &[f32], size: usize) -> Vec<f32> {
    let mut desc = vec![0.0f32; DESCRIPTOR_LEN];
    let cell = (size / CELLS_PER_SIDE).max(1);
    for (i, (&mag, &deg)) in magnitudes.iter().zip(orientations).enumerate() {
        let (r, c) = (i / size, i % size);
        let (cr, cc) = ((r / cell).min(3), (c / cell).min(3));
        let idx = (cr * CELLS_PER_SIDE + cc) * ORIENTATION_BINS + orientation_bin(deg);
        desc[idx] += mag;
    }
    desc
}

fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > NORM_EPS {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

fn clip(v: &mut [f32]) {
    for x in v.iter_mut() {
        *x = x.clamp(0.0, CLIP);
    }
}

/// Normalise, clip each component to `[0, 0.2]`, normalise again.
///
/// The 0.2 bound holds on the clipped vector; after the second
/// normalisation a component exceeds it whenever others were clipped.
/// An all-zero vector (flat window) stays all-zero.
pub fn normalize_descriptor(v: &mut [f32]) {
    l2_normalize(v);
    clip(v);
    l2_normalize(v);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn bins_follow_45_degree_sectors() {
        assert_eq!(orientation_bin(0.0), 0);
        assert_eq!(orientation_bin(44.9), 0);
        assert_eq!(orientation_bin(45.0), 1);
        assert_eq!(orientation_bin(359.9), 7);
        assert_eq!(orientation_bin(360.0), 0);
    }

    #[test]
    fn evenly_spread_gradients_stay_below_clip() {
        // Every cell sees all eight orientations with equal weight.
        let size = 16;
        let mags = vec![1.0; size * size];
        let oris: Vec<f32> = (0..size * size)
            .map(|i| {
                let (r, c) = (i / size, i % size);
                ((r % 2) * 4 + (c % 4)) as f32 * 45.0 + 10.0
            })
            .collect();
        let d = build_descriptor(&mags, &oris, size);
        assert_eq!(d.len(), DESCRIPTOR_LEN);
        assert_relative_eq!(norm(&d), 1.0, epsilon = 1e-5);
        assert!(d.iter().all(|&v| (0.0..=CLIP + 1e-6).contains(&v)));
    }

    #[test]
    fn dominant_bin_is_clipped_before_renormalising() {
        let mut v = vec![0.0f32; DESCRIPTOR_LEN];
        v[0] = 10.0;
        for x in v.iter_mut().skip(1).take(30) {
            *x = 1.0;
        }
        normalize_descriptor(&mut v);
        assert_relative_eq!(norm(&v), 1.0, epsilon = 1e-5);
        // Clipping shrinks the dominant bin's share: 0.2 against 30 × (1/√130).
        let small = 1.0 / 130f32.sqrt();
        let expected = CLIP / (CLIP * CLIP + 30.0 * small * small).sqrt();
        assert_relative_eq!(v[0], expected, epsilon = 1e-5);
    }

    #[test]
    fn flat_window_gives_zero_descriptor() {
        let img = ImageF32::from_fn(20, 20, |_, _| 7.0);
        let d = GradientWindow::extract(&img, 10, 10, 16).descriptor();
        assert!(d.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn ramp_fills_a_single_orientation_bin_per_cell() {
        let img = ImageF32::from_fn(32, 32, |x, _| x as f32 * 2.0);
        let win = GradientWindow::extract(&img, 16, 16, 16);
        assert!(win.magnitudes.iter().all(|&m| (m - 2.0).abs() < 1e-5));
        let d = win.descriptor();
        for cell in 0..16 {
            assert!(d[cell * 8] > 0.0);
            assert!(d[cell * 8 + 1..cell * 8 + 8].iter().all(|&v| v == 0.0));
        }
        assert_relative_eq!(norm(&d), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn clip_bound_holds_before_the_final_normalisation() {
        let img = ImageF32::from_fn(40, 40, |x, y| {
            let (fx, fy) = (x as f32, y as f32);
            100.0 + 60.0 * (fx * 0.7).sin() * (fy * 0.4).cos() + 3.0 * fx
        });
        let win = GradientWindow::extract(&img, 20, 20, 16);

        let mut clipped = accumulate_histograms(&win.magnitudes, &win.orientations, win.size);
        l2_normalize(&mut clipped);
        clip(&mut clipped);
        assert!(clipped.iter().all(|&v| (0.0..=CLIP).contains(&v)));

        let d = win.descriptor();
        let scale = norm(&clipped);
        for (&a, &b) in d.iter().zip(&clipped) {
            assert_relative_eq!(a, b / scale, epsilon = 1e-6);
        }
        assert_relative_eq!(norm(&d), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn renormalising_lifts_clipped_components_above_the_bound() {
        // A ramp puts one equal bin in each of the 16 cells: 0.25 each, all clipped.
        let img = ImageF32::from_fn(32, 32, |x, _| x as f32 * 2.0);
        let d = GradientWindow::extract(&img, 16, 16, 16).descriptor();
        let filled: Vec<f32> = d.iter().copied().filter(|&v| v > 0.0).collect();
        assert_eq!(filled.len(), 16);
        for v in filled {
            assert_relative_eq!(v, 0.25, epsilon = 1e-5);
        }
    }
}
