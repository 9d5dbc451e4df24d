/// Map an arbitrary index into `[0, len)` by mirroring at the borders.
///
/// The edge sample is not repeated (`-1 -> 1`, `len -> len - 2`), and indices
/// further away keep bouncing between the two borders. A length of 0 or 1
/// always maps to 0.
#[inline]
pub fn reflect_index(idx: isize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let n = len as isize;
    if (0..n).contains(&idx) {
        return idx as usize;
    }
    let period = 2 * (n - 1);
    let mut i = idx.rem_euclid(period);
    if i >= n {
        i = period - i;
    }
    i as usize
}

#[cfg(test)]
mod tests {
    use super::reflect_index;

    #[test]
    fn in_range_indices_are_unchanged() {
        for i in 0..5 {
            assert_eq!(reflect_index(i, 5), i as usize);
        }
    }

    #[test]
    fn out_of_range_indices_bounce() {
        assert_eq!(reflect_index(-1, 5), 1);
        assert_eq!(reflect_index(-2, 5), 2);
        assert_eq!(reflect_index(5, 5), 3);
        assert_eq!(reflect_index(6, 5), 2);
        assert_eq!(reflect_index(-9, 5), 1);
        assert_eq!(reflect_index(13, 5), 3);
    }

    #[test]
    fn degenerate_lengths() {
        assert_eq!(reflect_index(-3, 1), 0);
        assert_eq!(reflect_index(7, 0), 0);
        assert_eq!(reflect_index(-1, 2), 1);
        assert_eq!(reflect_index(2, 2), 0);
    }
}
