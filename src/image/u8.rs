/// Borrowed 8-bit grayscale view with an explicit row stride.
#[derive(Clone, Copy, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    /// Tightly packed view (`stride == w`). Returns `None` when `data` is too
    /// short for `w × h`.
    pub fn packed(w: usize, h: usize, data: &'a [u8]) -> Option<Self> {
        (data.len() >= w * h).then_some(Self {
            w,
            h,
            stride: w,
            data,
        })
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }
}
