use pv_core::Image;

use crate::geometry::{achievable_levels, binomial_filter, level_shape};

/// Which pyramid a case asks the submission to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PyramidKind {
    Gaussian,
    Laplacian,
}

impl PyramidKind {
    pub fn builder_name(self) -> &'static str {
        match self {
            Self::Gaussian => "build_gaussian_pyramid",
            Self::Laplacian => "build_laplacian_pyramid",
        }
    }
}

/// One invocation of a pyramid builder plus everything expected of it.
///
/// Borrows its source image: corpus images are shared read-only across
/// cases, stress matrices are owned by the case body that creates them.
#[derive(Debug, Clone)]
pub struct TestCase<'a> {
    pub name: String,
    pub image: &'a Image<f64>,
    pub max_levels: usize,
    pub filter_size: usize,
    pub min_level_dim: usize,
}

impl<'a> TestCase<'a> {
    pub const DEFAULT_MIN_LEVEL_DIM: usize = 16;

    pub fn new(
        name: impl Into<String>,
        image: &'a Image<f64>,
        max_levels: usize,
        filter_size: usize,
    ) -> Self {
        Self {
            name: name.into(),
            image,
            max_levels,
            filter_size,
            min_level_dim: Self::DEFAULT_MIN_LEVEL_DIM,
        }
    }

    pub fn with_min_level_dim(mut self, min_level_dim: usize) -> Self {
        self.min_level_dim = min_level_dim;
        self
    }

    pub fn expected_filter(&self) -> Image<f64> {
        binomial_filter(self.filter_size)
    }

    /// Upper bound on pyramid length. A pyramid always holds level 0.
    pub fn level_count_ceiling(&self) -> usize {
        self.max_levels.max(1)
    }

    /// Length a pyramid reaches when it stops only at `max_levels` or at the
    /// size floor.
    pub fn achievable_levels(&self) -> usize {
        let (rows, cols) = self.image.shape();
        achievable_levels(rows, cols, self.max_levels, self.min_level_dim)
    }

    pub fn expected_shape(&self, level: usize) -> (usize, usize) {
        let (rows, cols) = self.image.shape();
        level_shape(rows, cols, level)
    }

    /// Identifying parameters, used when a submission crashes.
    pub fn params(&self) -> String {
        let (rows, cols) = self.image.shape();
        format!(
            "image={rows}x{cols}, max_levels={}, filter_size={}",
            self.max_levels, self.filter_size
        )
    }
}
