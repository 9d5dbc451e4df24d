//! Scale-space extrema search over an [`OctaveSlice`].
//!
//! A pixel of the current layer is a candidate when it is strictly greater
//! (or strictly smaller) than every other value in a `(2r+1)²` window on the
//! previous, current and next layers. Ties disqualify both. The window is
//! read with boundary reflection; only the outermost pixel ring of the
//! current layer is skipped as a centre. A reflected window position that
//! lands back on the centre pixel of the current layer is not compared.
use super::types::{OctaveSlice, PixelPoint};
use crate::image::reflect_index;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Max,
    Min,
    Neither,
}

#[inline]
fn classify(slice: &OctaveSlice<'_>, x: isize, y: isize, r: isize) -> Polarity {
    let center = slice.current.get_reflected(x, y);
    let (w, h) = (slice.width(), slice.height());
    let mut is_max = true;
    let mut is_min = true;
    for ds in -1..=1isize {
        for dy in -r..=r {
            for dx in -r..=r {
                if ds == 0
                    && reflect_index(x + dx, w) == x as usize
                    && reflect_index(y + dy, h) == y as usize
                {
                    continue;
                }
                let v = slice.sample(ds, x + dx, y + dy);
                if v >= center {
                    is_max = false;
                }
                if v <= center {
                    is_min = false;
                }
                if !is_max && !is_min {
                    return Polarity::Neither;
                }
            }
        }
    }
    if is_max {
        Polarity::Max
    } else if is_min {
        Polarity::Min
    } else {
        Polarity::Neither
    }
}

/// Strict local extrema of `slice.current` in row-major order.
pub fn find_extrema(slice: &OctaveSlice<'_>, radius: usize) -> Vec<PixelPoint> {
    let (w, h) = (slice.width(), slice.height());
    let mut out = Vec::new();
    if w < 3 || h < 3 {
        return out;
    }
    let r = radius.max(1) as isize;
    for row in 1..h - 1 {
        for col in 1..w - 1 {
            if classify(slice, col as isize, row as isize, r) != Polarity::Neither {
                out.push(PixelPoint::new(row, col));
            }
        }
    }
    out
}
