//! Area-averaging downscale used between octaves.
//!
//! Every destination pixel is the mean of the source area it covers, with
//! fractional coverage at the cell borders. The box filter is separable, so
//! the resize runs as a horizontal pass followed by a vertical pass.
use crate::image::ImageF32;

/// Per destination index: list of `(source index, weight)` with weights
/// summing to one.
type Footprint = Vec<(usize, f32)>;

fn footprints(src_len: usize, dst_len: usize) -> Vec<Footprint> {
    let ratio = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let start = d as f64 * ratio;
            let end = ((d + 1) as f64 * ratio).min(src_len as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src_len);
            let span = end - start;
            (first..last)
                .filter_map(|s| {
                    let overlap = (end.min(s as f64 + 1.0) - start.max(s as f64)).max(0.0);
                    (overlap > 0.0).then_some((s, (overlap / span) as f32))
                })
                .collect()
        })
        .collect()
}

/// Target size after dividing by `factor`, never below one pixel.
pub fn downscaled_size(w: usize, h: usize, factor: f32) -> (usize, usize) {
    let nw = ((w as f64 / factor as f64).floor() as usize).max(1);
    let nh = ((h as f64 / factor as f64).floor() as usize).max(1);
    (nw, nh)
}

/// Resize `src` to `dst_w × dst_h` (each no larger than the source) by area
/// averaging.
pub fn resize_area(src: &ImageF32, dst_w: usize, dst_h: usize) -> ImageF32 {
    if src.is_empty() || dst_w == 0 || dst_h == 0 {
        return ImageF32::new(dst_w, dst_h);
    }
    let fx = footprints(src.w, dst_w);
    let fy = footprints(src.h, dst_h);

    let mut tmp = ImageF32::new(dst_w, src.h);
    for y in 0..src.h {
        let src_row = src.row(y);
        let dst_row = tmp.row_mut(y);
        for (out, fp) in dst_row.iter_mut().zip(&fx) {
            *out = fp.iter().map(|&(s, wgt)| wgt * src_row[s]).sum();
        }
    }

    let mut out = ImageF32::new(dst_w, dst_h);
    for (y, fp) in fy.iter().enumerate() {
        for &(sy, wgt) in fp {
            let src_row = tmp.row(sy);
            let dst_row = out.row_mut(y);
            for (d, &s) in dst_row.iter_mut().zip(src_row) {
                *d += wgt * s;
            }
        }
    }
    out
}

/// Downscale by `factor` with area averaging.
pub fn downscale(src: &ImageF32, factor: f32) -> ImageF32 {
    let (nw, nh) = downscaled_size(src.w, src.h, factor);
    resize_area(src, nw, nh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn halving_averages_2x2_blocks() {
        let img = ImageF32::from_fn(4, 2, |x, y| (x + 4 * y) as f32);
        let out = downscale(&img, 2.0);
        assert_eq!((out.w, out.h), (2, 1));
        assert_relative_eq!(out.get(0, 0), (0.0 + 1.0 + 4.0 + 5.0) / 4.0);
        assert_relative_eq!(out.get(1, 0), (2.0 + 3.0 + 6.0 + 7.0) / 4.0);
    }

    #[test]
    fn fractional_factor_preserves_mean() {
        let img = ImageF32::from_fn(9, 9, |x, y| ((x * 7 + y * 3) % 11) as f32);
        let out = resize_area(&img, 6, 6);
        assert_relative_eq!(out.mean(), img.mean(), epsilon = 1e-3);
    }

    #[test]
    fn alternating_stripes_do_not_alias() {
        // Point sampling every other column would return all zeros here.
        let img = ImageF32::from_fn(8, 8, |x, _| if x % 2 == 0 { 0.0 } else { 100.0 });
        let out = downscale(&img, 2.0);
        for v in out.data {
            assert_relative_eq!(v, 50.0, epsilon = 1e-4);
        }
    }
}
