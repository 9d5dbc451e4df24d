//! Owned stack of equally sized `ImageF32` layers (a 3D grid).
//!
//! Used for one octave of Gaussian or DoG images. Layer access is
//! bounds-checked; the scale axis supports the same boundary reflection as
//! the spatial axes so 3D neighbourhoods never need special-casing.
use super::reflect::reflect_index;
use super::ImageF32;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageStack {
    w: usize,
    h: usize,
    layers: Vec<ImageF32>,
}

impl ImageStack {
    /// Build a stack from layers that all share the first layer's size.
    ///
    /// Returns `None` when the layers disagree on dimensions.
    pub fn from_layers(layers: Vec<ImageF32>) -> Option<Self> {
        let (w, h) = layers.first().map(|l| (l.w, l.h)).unwrap_or((0, 0));
        if layers.iter().any(|l| l.w != w || l.h != h) {
            return None;
        }
        Some(Self { w, h, layers })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.h
    }

    /// Number of layers along the scale axis.
    #[inline]
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn layer(&self, s: usize) -> Option<&ImageF32> {
        self.layers.get(s)
    }

    pub fn layers(&self) -> &[ImageF32] {
        &self.layers
    }

    pub fn into_layers(self) -> Vec<ImageF32> {
        self.layers
    }

    /// Checked voxel read.
    #[inline]
    pub fn get(&self, x: usize, y: usize, s: usize) -> Option<f32> {
        self.layers.get(s).and_then(|l| l.try_get(x, y))
    }

    /// Voxel read with reflection on all three axes. Panics on an empty stack.
    #[inline]
    pub fn get_reflected(&self, x: isize, y: isize, s: isize) -> f32 {
        let s = reflect_index(s, self.layers.len());
        self.layers[s].get_reflected(x, y)
    }

    /// Pairwise differences `layer[i + 1] - layer[i]`, producing `depth - 1`
    /// layers.
    pub fn adjacent_differences(&self) -> ImageStack {
        let layers = self
            .layers
            .windows(2)
            .map(|pair| pair[1].difference(&pair[0]))
            .collect();
        ImageStack {
            w: self.w,
            h: self.h,
            layers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_layers() {
        let layers = vec![ImageF32::new(4, 4), ImageF32::new(4, 3)];
        assert!(ImageStack::from_layers(layers).is_none());
    }

    #[test]
    fn adjacent_differences_shrink_depth_by_one() {
        let layers = (0..4)
            .map(|s| ImageF32::from_fn(3, 3, move |_, _| (s * s) as f32))
            .collect();
        let stack = ImageStack::from_layers(layers).expect("equal sizes");
        let diffs = stack.adjacent_differences();
        assert_eq!(diffs.depth(), 3);
        assert_eq!(diffs.get(1, 1, 0), Some(1.0));
        assert_eq!(diffs.get(1, 1, 2), Some(5.0));
        assert_eq!(diffs.get(3, 1, 2), None);
    }

    #[test]
    fn reflected_scale_axis() {
        let layers = (0..3)
            .map(|s| ImageF32::from_fn(2, 2, move |_, _| s as f32))
            .collect();
        let stack = ImageStack::from_layers(layers).expect("equal sizes");
        assert_eq!(stack.get_reflected(0, 0, -1), 1.0);
        assert_eq!(stack.get_reflected(0, 0, 3), 1.0);
    }
}
