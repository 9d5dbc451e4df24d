//! Numeric grids shared by every stage.
//!
//! - [`ImageF32`]: owned 2D grid of intensities with reflected access.
//! - [`ImageStack`]: owned 3D grid (scale × rows × cols) for one octave.
//! - [`ImageU8`]: borrowed 8-bit input view, converted with
//!   [`ImageF32::from_u8`].
//! - [`io`]: decoding image files and writing JSON reports (demo tooling).

pub mod f32;
pub mod io;
pub mod reflect;
pub mod stack;
pub mod u8;

pub use self::f32::ImageF32;
pub use self::reflect::reflect_index;
pub use self::stack::ImageStack;
pub use self::u8::ImageU8;
