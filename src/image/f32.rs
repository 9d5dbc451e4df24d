//! Owned single-channel f32 image in row-major layout (stride == width).
//!
//! This is the 2D grid every stage works on: Gaussian blur, DoG differences,
//! extrema search, Hessian evaluation and descriptor windows. Besides plain
//! bounds-checked access it offers boundary-reflected reads via
//! [`ImageF32::get_reflected`], so out-of-range neighbourhoods mirror back
//! into the image instead of being clamped or skipped.
use super::reflect::reflect_index;
use super::u8::ImageU8;

#[derive(Clone, Debug, PartialEq)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Number of f32 elements between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![0.0; w * h],
        }
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(f(x, y));
            }
        }
        Self {
            w,
            h,
            stride: w,
            data,
        }
    }

    /// Wrap an existing row-major buffer. Returns `None` if the length does
    /// not match `w × h`.
    pub fn from_vec(w: usize, h: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == w * h).then_some(Self {
            w,
            h,
            stride: w,
            data,
        })
    }

    /// Convert an 8-bit grayscale view into intensities in `[0, 255]`.
    pub fn from_u8(gray: ImageU8<'_>) -> Self {
        let mut out = Self::new(gray.w, gray.h);
        for y in 0..gray.h {
            let src = &gray.data[y * gray.stride..y * gray.stride + gray.w];
            let start = y * out.stride;
            for (dst, &px) in out.data[start..start + gray.w].iter_mut().zip(src) {
                *dst = px as f32;
            }
        }
        out
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }
    #[inline]
    /// Get the pixel value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    /// Set the pixel value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Checked access; `None` outside the image.
    #[inline]
    pub fn try_get(&self, x: usize, y: usize) -> Option<f32> {
        (x < self.w && y < self.h).then(|| self.get(x, y))
    }

    /// Read with boundary reflection: `-1` maps to `1`, `w` maps to `w - 2`.
    ///
    /// Panics on an empty image.
    #[inline]
    pub fn get_reflected(&self, x: isize, y: isize) -> f32 {
        self.get(reflect_index(x, self.w), reflect_index(y, self.h))
    }

    /// Pixel-wise `self - other`. Both images must share dimensions.
    pub fn difference(&self, other: &ImageF32) -> ImageF32 {
        assert_eq!(
            (self.w, self.h),
            (other.w, other.h),
            "difference requires equal dimensions"
        );
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a - b)
            .collect();
        ImageF32 {
            w: self.w,
            h: self.h,
            stride: self.w,
            data,
        }
    }

    /// Borrow row `y`.
    #[inline]
    pub fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }

    /// Mutably borrow row `y`.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.stride;
        let end = start + self.w;
        &mut self.data[start..end]
    }

    /// Mean intensity, 0 for an empty image.
    pub fn mean(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let sum: f32 = (0..self.h).map(|y| self.row(y).iter().sum::<f32>()).sum();
        sum / (self.w * self.h) as f32
    }
}
