//! Reference pyramid construction used as ground truth by the verifier.
//!
//! The oracle is built from its own primitives and shares no code with the
//! graded submission:
//! - blur: separable sampled Gaussian, `sigma = 2 * 2 / 6`, truncated at
//!   `4 * sigma`, reflect-101 border;
//! - resample: bilinear resize to an explicit target shape on the dyadic
//!   grid, so level pixel `d` sits over finer pixel `2d` as it does under
//!   integer subsampling.
//!
//! Reduce blurs then resizes to `(h / 2, w / 2)`; expand resizes to the exact
//! shape of the finer level then blurs. Explicit targets keep odd
//! dimensions consistent with integer-halving pyramid geometry.

mod conv;
mod kernel;
mod pyramid;
mod resize;

pub use conv::{blur_separable, convolve_f64};
pub use kernel::GaussianKernel1D;
pub use pyramid::{
    DEFAULT_MIN_LEVEL_DIM, ReferencePyramid, max_build_levels, pyramid_expand_to,
    pyramid_reduce, pyramid_reduce_to,
};
pub use resize::{SampleGrid, resize_bilinear};
