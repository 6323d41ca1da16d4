//! The contract a pyramid submission must satisfy.
//!
//! A submission is two things: source text, inspected statically against
//! [`submission_contracts`], and a [`PyramidSubmission`] implementation the
//! harness calls at runtime. [`SampleSubmission`] bundles a correct solution
//! so the harness can be exercised end to end.

mod contract;
mod solution;

use anyhow::Result;
use pv_core::Image;

pub use contract::submission_contracts;

/// Runtime entry points of a submission. `Err` and panics are both treated
/// as crashes by the harness.
pub trait PyramidSubmission {
    /// Label used in reports.
    fn name(&self) -> &str;

    /// Source text holding the four contract functions.
    fn source(&self) -> &str;

    fn build_gaussian_pyramid(
        &self,
        image: &Image<f64>,
        max_levels: usize,
        filter_size: usize,
    ) -> Result<(Vec<Image<f64>>, Image<f64>)>;

    fn build_laplacian_pyramid(
        &self,
        image: &Image<f64>,
        max_levels: usize,
        filter_size: usize,
    ) -> Result<(Vec<Image<f64>>, Image<f64>)>;

    fn laplacian_to_image(
        &self,
        lpyr: &[Image<f64>],
        filter_vec: &Image<f64>,
        coeff: &[f64],
    ) -> Result<Image<f64>>;

    fn render_pyramid(&self, pyr: &[Image<f64>], levels: usize) -> Result<Image<f64>>;
}

/// A correct reference solution with its own source text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleSubmission;

impl PyramidSubmission for SampleSubmission {
    fn name(&self) -> &str {
        "sample"
    }

    fn source(&self) -> &str {
        solution::SOURCE
    }

    fn build_gaussian_pyramid(
        &self,
        image: &Image<f64>,
        max_levels: usize,
        filter_size: usize,
    ) -> Result<(Vec<Image<f64>>, Image<f64>)> {
        solution::build_gaussian_pyramid(image, max_levels, filter_size)
    }

    fn build_laplacian_pyramid(
        &self,
        image: &Image<f64>,
        max_levels: usize,
        filter_size: usize,
    ) -> Result<(Vec<Image<f64>>, Image<f64>)> {
        solution::build_laplacian_pyramid(image, max_levels, filter_size)
    }

    fn laplacian_to_image(
        &self,
        lpyr: &[Image<f64>],
        filter_vec: &Image<f64>,
        coeff: &[f64],
    ) -> Result<Image<f64>> {
        solution::laplacian_to_image(lpyr, filter_vec, coeff)
    }

    fn render_pyramid(&self, pyr: &[Image<f64>], levels: usize) -> Result<Image<f64>> {
        solution::render_pyramid(pyr, levels)
    }
}
