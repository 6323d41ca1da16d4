//! Verification engine for image-pyramid submissions.
//!
//! Four independent checkers share one failure taxonomy ([`Failure`]):
//! - [`conformance`]: parses submission source and inspects function
//!   signatures and bodies without running them;
//! - [`invariants`]: structural and numeric invariants of a returned pyramid
//!   and its filter vector;
//! - [`compare`]: statistical equivalence of two same-shape images;
//! - [`layout`]: geometry and zero padding of a rendered pyramid canvas.
//!
//! Pyramid geometry throughout is integer halving in `(rows, cols)` order:
//! level `i` of an `R x C` image is `(R >> i, C >> i)`.

pub mod case;
pub mod compare;
pub mod conformance;
mod failure;
pub mod geometry;
pub mod invariants;
pub mod layout;

pub use case::{PyramidKind, TestCase};
pub use compare::{ApproximateImageComparator, CompareThresholds, ImageComparison};
pub use conformance::{
    ConformanceCache, ConformanceChecker, ConformanceError, ConformanceReport, FunctionContract,
};
pub use failure::{Failure, FailureCategory, StructuralViolation};
pub use geometry::binomial_filter;
pub use invariants::{InvariantConfig, PyramidInvariantValidator};
pub use layout::RenderLayoutValidator;
