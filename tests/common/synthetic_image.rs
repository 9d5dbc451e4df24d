use keypoint_matcher::image::ImageF32;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const BACKGROUND: f32 = 128.0;

/// Isotropic Gaussian blob.
#[derive(Clone, Copy, Debug)]
pub struct Blob {
    pub cx: f32,
    pub cy: f32,
    pub sigma: f32,
    pub amplitude: f32,
}

/// Render `blobs` over a flat background.
pub fn render_blobs(width: usize, height: usize, blobs: &[Blob]) -> ImageF32 {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    ImageF32::from_fn(width, height, |x, y| {
        let mut v = BACKGROUND;
        for b in blobs {
            let d2 = (x as f32 - b.cx).powi(2) + (y as f32 - b.cy).powi(2);
            v += b.amplitude * (-d2 / (2.0 * b.sigma * b.sigma)).exp();
        }
        v
    })
}

/// Jittered lattice of blobs with random size and polarity inside
/// `[margin, size - margin)`. Centres sit on multiples of 4 so they stay on
/// the pixel grid of the first three octaves.
pub fn blob_field(width: usize, height: usize, margin: usize, spacing: usize, seed: u64) -> Vec<Blob> {
    assert!(spacing % 4 == 0 && margin % 4 == 0, "lattice must be 4-aligned");
    let mut rng = StdRng::seed_from_u64(seed);
    let mut blobs = Vec::new();
    let mut y = margin;
    while y + margin <= height {
        let mut x = margin;
        while x + margin <= width {
            let jx = 4 * rng.gen_range(-1i32..=1);
            let jy = 4 * rng.gen_range(-1i32..=1);
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            blobs.push(Blob {
                cx: (x as i32 + jx) as f32,
                cy: (y as i32 + jy) as f32,
                sigma: rng.gen_range(1.5..3.0),
                amplitude: sign * rng.gen_range(60.0..110.0),
            });
            x += spacing;
        }
        y += spacing;
    }
    blobs
}

/// Textured test image used by the matching tests.
pub fn textured_image(width: usize, height: usize, seed: u64) -> ImageF32 {
    render_blobs(width, height, &blob_field(width, height, 24, 12, seed))
}

/// `src` moved by `(dx, dy)` pixels; uncovered pixels take `fill`.
pub fn shifted(src: &ImageF32, dx: isize, dy: isize, fill: f32) -> ImageF32 {
    ImageF32::from_fn(src.w, src.h, |x, y| {
        let sx = x as isize - dx;
        let sy = y as isize - dy;
        if sx >= 0 && sy >= 0 && (sx as usize) < src.w && (sy as usize) < src.h {
            src.get(sx as usize, sy as usize)
        } else {
            fill
        }
    })
}

/// DoG-like layer with a horizontal ridge through `(cx, cy)`: strong
/// curvature across the ridge, a faint one along it so the centre is still
/// a strict maximum.
pub fn ridge_layer(size: usize, cx: f32, cy: f32, offset: f32) -> ImageF32 {
    ImageF32::from_fn(size, size, |x, y| {
        let (dx, dy) = (x as f32 - cx, y as f32 - cy);
        offset + 40.0 - 8.0 * dy * dy - 0.004 * dx * dx
    })
}
