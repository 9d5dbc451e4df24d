use crate::image::ImageF32;
use crate::pyramid::DogOctave;

use serde::{Deserialize, Serialize};

/// Length of every keypoint descriptor (4×4 cells × 8 orientation bins).
pub const DESCRIPTOR_LEN: usize = 128;

/// Integer location within one DoG layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub row: usize,
    pub col: usize,
}

impl PixelPoint {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Three consecutive DoG layers of one octave, centred on `scale_index`.
#[derive(Clone, Copy, Debug)]
pub struct OctaveSlice<'a> {
    pub prev: &'a ImageF32,
    pub current: &'a ImageF32,
    pub next: &'a ImageF32,
    pub octave: usize,
    /// Index of `current` within the octave's DoG stack.
    pub scale_index: usize,
    /// Cumulative downscale ratio of the octave (`factor^octave`).
    pub octave_scale: f32,
}

impl<'a> OctaveSlice<'a> {
    /// Slice around an interior DoG layer; `None` for the first and last
    /// layers, which lack a neighbour on one side.
    pub fn from_dog(dog: &'a DogOctave, scale_index: usize) -> Option<Self> {
        if scale_index == 0 {
            return None;
        }
        Some(Self {
            prev: dog.dogs.layer(scale_index - 1)?,
            current: dog.dogs.layer(scale_index)?,
            next: dog.dogs.layer(scale_index + 1)?,
            octave: dog.index,
            scale_index,
            octave_scale: dog.scale,
        })
    }

    pub fn width(&self) -> usize {
        self.current.w
    }

    pub fn height(&self) -> usize {
        self.current.h
    }

    /// Reflected read from layer `ds ∈ {-1, 0, 1}` relative to `current`.
    #[inline]
    pub fn sample(&self, ds: isize, x: isize, y: isize) -> f32 {
        let layer = match ds {
            d if d < 0 => self.prev,
            0 => self.current,
            _ => self.next,
        };
        layer.get_reflected(x, y)
    }
}

/// Accepted, sub-pixel refined scale-space extremum.
///
/// `x`/`y` are in the octave's local pixel frame; multiply by
/// `octave_scale` (or call [`Keypoint::image_position`]) to compare keypoints
/// across octaves or against input-image coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    octave: usize,
    scale_index: usize,
    x: f32,
    y: f32,
    octave_scale: f32,
    descriptor: Vec<f32>,
}

impl Keypoint {
    pub fn new(
        octave: usize,
        scale_index: usize,
        x: f32,
        y: f32,
        octave_scale: f32,
        descriptor: Vec<f32>,
    ) -> Self {
        Self {
            octave,
            scale_index,
            x,
            y,
            octave_scale,
            descriptor,
        }
    }

    pub fn octave(&self) -> usize {
        self.octave
    }

    pub fn scale_index(&self) -> usize {
        self.scale_index
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn octave_scale(&self) -> f32 {
        self.octave_scale
    }

    pub fn descriptor(&self) -> &[f32] {
        &self.descriptor
    }

    /// Position in input-image pixels.
    pub fn image_position(&self) -> (f32, f32) {
        (self.x * self.octave_scale, self.y * self.octave_scale)
    }

    /// Euclidean distance between the two descriptors.
    pub fn descriptor_distance(&self, other: &Keypoint) -> f32 {
        descriptor_distance(&self.descriptor, &other.descriptor)
    }
}

/// Euclidean distance between two descriptor vectors (over the shorter length).
pub fn descriptor_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(p, q)| {
            let d = p - q;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}
