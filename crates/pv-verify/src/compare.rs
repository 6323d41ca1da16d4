//! Statistical equivalence of two images.
//!
//! Two statistics are always paired: Pearson correlation of the flattened
//! samples and the normalized squared error `sum((a - b)^2) / n`. Shapes
//! must match exactly before either is computed.
//!
//! Degenerate inputs:
//! - empty images compare as correlation 1, error 0;
//! - two constant images have correlation 1 and are judged by error alone;
//! - exactly one constant image has correlation 0;
//! - any NaN propagates and fails both thresholds.

use pv_core::Image;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::failure::Failure;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareThresholds {
    /// Correlation must be strictly greater than this.
    pub min_correlation: f64,
    /// Normalized squared error must be strictly less than this.
    pub max_error: f64,
}

impl Default for CompareThresholds {
    fn default() -> Self {
        Self {
            min_correlation: 0.9,
            max_error: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImageComparison {
    pub correlation: f64,
    pub error: f64,
}

impl ImageComparison {
    pub fn measure(a: &[f64], b: &[f64]) -> Self {
        Self {
            correlation: pearson_correlation(a, b),
            error: normalized_squared_error(a, b),
        }
    }

    pub fn passes(&self, thresholds: &CompareThresholds) -> bool {
        self.correlation > thresholds.min_correlation && self.error < thresholds.max_error
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApproximateImageComparator {
    thresholds: CompareThresholds,
}

impl ApproximateImageComparator {
    pub fn new(thresholds: CompareThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &CompareThresholds {
        &self.thresholds
    }

    /// Compares `actual` against `expected`; `what` names the output in
    /// failure messages.
    pub fn compare(
        &self,
        what: &str,
        actual: &Image<f64>,
        expected: &Image<f64>,
    ) -> Result<ImageComparison, Failure> {
        if actual.shape() != expected.shape() {
            return Err(Failure::geometric(
                format!("{what} shape"),
                expected.shape(),
                actual.shape(),
            ));
        }

        let cmp = ImageComparison::measure(actual.data(), expected.data());
        debug!(
            what,
            correlation = cmp.correlation,
            error = cmp.error,
            "compared images"
        );

        if cmp.passes(&self.thresholds) {
            Ok(cmp)
        } else {
            Err(Failure::NumericApprox {
                what: what.to_owned(),
                correlation: cmp.correlation,
                error: cmp.error,
                min_correlation: self.thresholds.min_correlation,
                max_error: self.thresholds.max_error,
            })
        }
    }
}

pub fn pearson_correlation(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "correlation needs equal-length inputs");
    let n = a.len();
    if n == 0 {
        return 1.0;
    }

    let mean_a = a.iter().sum::<f64>() / n as f64;
    let mean_b = b.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0f64;
    let mut var_a = 0.0f64;
    let mut var_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a.is_nan() || var_b.is_nan() || cov.is_nan() {
        return f64::NAN;
    }
    match (var_a == 0.0, var_b == 0.0) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => (cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0),
    }
}

pub fn normalized_squared_error(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "error needs equal-length inputs");
    if a.is_empty() {
        return 0.0;
    }
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    sum / a.len() as f64
}
