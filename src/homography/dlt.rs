//! Normalised Direct Linear Transform.
//!
//! Points on both sides are first translated to their centroid and scaled to
//! a mean distance of `√2`. Each correspondence contributes the two rows of
//! `x' × (H·x) = 0`; the flattened `H` is the right-singular vector of the
//! smallest singular value. The system is padded to at least nine rows so the
//! SVD always exposes the full 9-dimensional right space, even for a minimal
//! 4-point sample. The result is denormalised and scaled so `H[2][2] = 1`.
use nalgebra::{DMatrix, Matrix3};

/// Minimum number of correspondences for a homography.
pub const MIN_CORRESPONDENCES: usize = 4;

const DEGENERATE_SCALE: f64 = 1e-12;

fn normalize_points(pts: &[[f64; 2]]) -> (Matrix3<f64>, Vec<[f64; 2]>) {
    let n = pts.len() as f64;
    let cx = pts.iter().map(|p| p[0]).sum::<f64>() / n;
    let cy = pts.iter().map(|p| p[1]).sum::<f64>() / n;
    let mean_dist = pts
        .iter()
        .map(|p| (p[0] - cx).hypot(p[1] - cy))
        .sum::<f64>()
        / n;
    let s = if mean_dist > 1e-15 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };
    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let normalized = pts
        .iter()
        .map(|p| [s * (p[0] - cx), s * (p[1] - cy)])
        .collect();
    (t, normalized)
}

/// Scale `h` so that `h[2][2] = 1`; `None` if that entry vanishes or the
/// matrix is not finite.
pub fn normalize_homography(h: &Matrix3<f64>) -> Option<Matrix3<f64>> {
    let scale = h[(2, 2)];
    if !scale.is_finite() || scale.abs() < DEGENERATE_SCALE {
        return None;
    }
    let out = h / scale;
    out.iter().all(|v| v.is_finite()).then_some(out)
}

/// Homography mapping `src[i]` onto `dst[i]` in the least-squares sense.
///
/// Returns `None` for fewer than four pairs, mismatched lengths, or a
/// degenerate solution.
pub fn fit_homography(src: &[[f64; 2]], dst: &[[f64; 2]]) -> Option<Matrix3<f64>> {
    let n = src.len();
    if n < MIN_CORRESPONDENCES || dst.len() != n {
        return None;
    }
    let (t_src, src_n) = normalize_points(src);
    let (t_dst, dst_n) = normalize_points(dst);

    let rows = (2 * n).max(9);
    let mut a = DMatrix::<f64>::zeros(rows, 9);
    for (i, (s, d)) in src_n.iter().zip(&dst_n).enumerate() {
        let (sx, sy) = (s[0], s[1]);
        let (dx, dy) = (d[0], d[1]);
        let r = 2 * i;
        a[(r, 3)] = -sx;
        a[(r, 4)] = -sy;
        a[(r, 5)] = -1.0;
        a[(r, 6)] = dy * sx;
        a[(r, 7)] = dy * sy;
        a[(r, 8)] = dy;

        a[(r + 1, 0)] = sx;
        a[(r + 1, 1)] = sy;
        a[(r + 1, 2)] = 1.0;
        a[(r + 1, 6)] = -dx * sx;
        a[(r + 1, 7)] = -dx * sy;
        a[(r + 1, 8)] = -dx;
    }

    let svd = a.svd(false, true);
    let v_t = svd.v_t?;
    let (min_idx, _) = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|x, y| x.1.total_cmp(y.1))?;
    let h = v_t.row(min_idx);
    let h_norm = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]);

    let t_dst_inv = t_dst.try_inverse()?;
    normalize_homography(&(t_dst_inv * h_norm * t_src))
}
