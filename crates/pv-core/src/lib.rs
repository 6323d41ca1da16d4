//! Foundational image primitives shared by the oracle, the verification
//! engine, and submissions.
//!
//! ## Shape Convention
//! Images are row-major. `shape()` returns `(rows, cols)`, i.e.
//! `(height, width)`, which is the order pyramid geometry is expressed in.
//! Zero-sized images are valid values; pyramid edge cases depend on them.
//!
//! ## Image Views and Stride
//! Views use element stride. `stride` is the distance, in elements, between
//! adjacent row starts and may be greater than `width`, which allows
//! borrowed subviews into a rendered canvas.
//!
//! ## Border Modes
//! Sampling and convolution support reflect-101 and symmetric reflect.
//! Reflect mirrors around the outer pixel edge and repeats the edge element
//! (`d c b a | a b c d | d c b a`).

mod border;
mod error;
mod image;
mod sample;

pub use border::{BorderMode, map_index};
pub use error::Error;
pub use image::{Image, ImageView};
pub use sample::sample_bilinear_f64;
