use pv_core::Image;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::case::{PyramidKind, TestCase};
use crate::failure::Failure;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvariantConfig {
    /// Slack on the `[0, max(original)]` Gaussian value range. Absorbs
    /// rounding of convex combinations; an unnormalized filter overshoots by
    /// orders of magnitude more.
    pub value_bound_eps: f64,
}

impl Default for InvariantConfig {
    fn default() -> Self {
        Self {
            value_bound_eps: 1e-9,
        }
    }
}

/// Checks a builder's `(pyramid, filter_vec)` output against its case.
///
/// Output arity and the growable-sequence requirement are carried by the
/// contract's return type and checked statically (see
/// [`crate::conformance`]); everything else is checked here, in order:
/// level count, filter vector, size floor, level shapes, value range.
#[derive(Debug, Clone, Default)]
pub struct PyramidInvariantValidator {
    config: InvariantConfig,
}

impl PyramidInvariantValidator {
    pub fn new(config: InvariantConfig) -> Self {
        Self { config }
    }

    pub fn validate(
        &self,
        case: &TestCase<'_>,
        kind: PyramidKind,
        pyramid: &[Image<f64>],
        filter_vec: &Image<f64>,
    ) -> Result<(), Failure> {
        check_level_count(case, pyramid)?;
        check_filter_vector(case, filter_vec)?;
        check_size_floor(case, pyramid)?;
        check_level_shapes(case, pyramid)?;
        if kind == PyramidKind::Gaussian {
            check_value_range(case, pyramid, self.config.value_bound_eps)?;
        }

        let achievable = case.achievable_levels();
        if pyramid.len() < achievable {
            warn!(
                case = %case.name,
                built = pyramid.len(),
                achievable,
                "pyramid stopped before max_levels and the size floor required"
            );
        }
        debug!(case = %case.name, levels = pyramid.len(), ?kind, "pyramid invariants hold");
        Ok(())
    }
}

pub fn check_level_count(case: &TestCase<'_>, pyramid: &[Image<f64>]) -> Result<(), Failure> {
    let ceiling = case.level_count_ceiling();
    if pyramid.is_empty() || pyramid.len() > ceiling {
        return Err(Failure::Geometric {
            what: "pyramid level count".into(),
            expected: format!("between 1 and {ceiling}"),
            actual: pyramid.len().to_string(),
        });
    }
    Ok(())
}

/// Exact comparison: both sides are closed-form dyadic rationals.
pub fn check_filter_vector(case: &TestCase<'_>, filter_vec: &Image<f64>) -> Result<(), Failure> {
    let expected = case.expected_filter();
    if filter_vec.shape() != expected.shape() {
        return Err(Failure::geometric(
            "filter vector shape",
            expected.shape(),
            filter_vec.shape(),
        ));
    }
    if filter_vec.data() != expected.data() {
        return Err(Failure::NumericExact {
            what: "filter vector".into(),
            expected: expected.into_vec(),
            actual: filter_vec.data().to_vec(),
        });
    }
    Ok(())
}

/// A single-level pyramid is the input itself and satisfies the floor
/// trivially, whatever the input size.
pub fn check_size_floor(case: &TestCase<'_>, pyramid: &[Image<f64>]) -> Result<(), Failure> {
    let [_, .., last] = pyramid else {
        return Ok(());
    };
    let (rows, cols) = last.shape();
    if rows < case.min_level_dim || cols < case.min_level_dim {
        return Err(Failure::Geometric {
            what: format!("last level (level {}) size", pyramid.len() - 1),
            expected: format!("at least {0}x{0}", case.min_level_dim),
            actual: format!("{rows}x{cols}"),
        });
    }
    Ok(())
}

pub fn check_level_shapes(case: &TestCase<'_>, pyramid: &[Image<f64>]) -> Result<(), Failure> {
    for (i, level) in pyramid.iter().enumerate() {
        let expected = case.expected_shape(i);
        if level.shape() != expected {
            return Err(Failure::geometric(
                format!("level {i} shape"),
                expected,
                level.shape(),
            ));
        }
    }
    Ok(())
}

/// Every Gaussian level must stay within `[0, max(original)]`.
pub fn check_value_range(
    case: &TestCase<'_>,
    pyramid: &[Image<f64>],
    eps: f64,
) -> Result<(), Failure> {
    let Some(high) = case.image.max_value() else {
        return Ok(());
    };
    let low = 0.0f64;

    for (level_idx, level) in pyramid.iter().enumerate() {
        let outside = level
            .as_view()
            .pixels()
            .find(|&(_, _, &v)| v.is_nan() || v < low - eps || v > high + eps);
        if let Some((x, y, &value)) = outside {
            return Err(Failure::ValueRange {
                what: "gaussian pyramid value".into(),
                level: level_idx,
                x,
                y,
                value,
                low,
                high,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pv_core::Image;

    use super::{InvariantConfig, PyramidInvariantValidator};
    use crate::case::{PyramidKind, TestCase};
    use crate::failure::{Failure, FailureCategory};
    use crate::geometry::binomial_filter;

    fn halving_pyramid(image: &Image<f64>, levels: usize) -> Vec<Image<f64>> {
        (0..levels)
            .map(|i| {
                let (rows, cols) = (image.height() >> i, image.width() >> i);
                Image::new_fill(cols, rows, 0.5)
            })
            .collect()
    }

    fn validator() -> PyramidInvariantValidator {
        PyramidInvariantValidator::new(InvariantConfig::default())
    }

    #[test]
    fn accepts_well_formed_256_pyramid() {
        let img = Image::new_fill(256, 256, 1.0f64);
        let case = TestCase::new("square", &img, 4, 3);
        let pyr = halving_pyramid(&img, 4);
        validator()
            .validate(&case, PyramidKind::Gaussian, &pyr, &binomial_filter(3))
            .expect("valid pyramid");
    }

    #[test]
    fn rejects_too_many_levels() {
        let img = Image::new_fill(256, 256, 1.0f64);
        let case = TestCase::new("square", &img, 3, 3);
        let pyr = halving_pyramid(&img, 4);
        let err = validator()
            .validate(&case, PyramidKind::Laplacian, &pyr, &binomial_filter(3))
            .unwrap_err();
        assert_eq!(err.category(), FailureCategory::Geometric);
        assert!(err.to_string().contains("level count"));
    }

    #[test]
    fn rejects_empty_pyramid() {
        let img = Image::new_fill(8, 8, 1.0f64);
        let case = TestCase::new("tiny", &img, 3, 3);
        assert!(
            validator()
                .validate(&case, PyramidKind::Gaussian, &[], &binomial_filter(3))
                .is_err()
        );
    }

    #[test]
    fn rejects_unnormalized_filter_with_both_vectors() {
        let img = Image::new_fill(64, 64, 1.0f64);
        let case = TestCase::new("filter", &img, 2, 3);
        let pyr = halving_pyramid(&img, 2);
        let raw = Image::from_vec(3, 1, vec![1.0, 2.0, 1.0]).expect("1x3");

        let err = validator()
            .validate(&case, PyramidKind::Gaussian, &pyr, &raw)
            .unwrap_err();
        assert_eq!(
            err,
            Failure::NumericExact {
                what: "filter vector".into(),
                expected: vec![0.25, 0.5, 0.25],
                actual: vec![1.0, 2.0, 1.0],
            }
        );
    }

    #[test]
    fn rejects_column_filter_vector() {
        let img = Image::new_fill(64, 64, 1.0f64);
        let case = TestCase::new("filter", &img, 1, 3);
        let column = Image::from_vec(1, 3, vec![0.25, 0.5, 0.25]).expect("3x1");
        let err = validator()
            .validate(&case, PyramidKind::Gaussian, &[img.clone()], &column)
            .unwrap_err();
        assert!(err.to_string().contains("filter vector shape"));
    }

    #[test]
    fn rejects_level_below_floor() {
        let img = Image::new_fill(64, 64, 1.0f64);
        let case = TestCase::new("floor", &img, 4, 3);
        let pyr = halving_pyramid(&img, 4);
        let err = validator()
            .validate(&case, PyramidKind::Laplacian, &pyr, &binomial_filter(3))
            .unwrap_err();
        assert!(err.to_string().contains("last level (level 3) size"));
    }

    #[test]
    fn rejects_ceil_halving() {
        let img = Image::new_fill(65, 65, 1.0f64);
        let case = TestCase::new("odd", &img, 2, 3);
        let pyr = vec![img.clone(), Image::new_fill(33, 33, 0.5)];
        let err = validator()
            .validate(&case, PyramidKind::Laplacian, &pyr, &binomial_filter(3))
            .unwrap_err();
        assert_eq!(
            err,
            Failure::Geometric {
                what: "level 1 shape".into(),
                expected: "(32, 32)".into(),
                actual: "(33, 33)".into(),
            }
        );
    }

    #[test]
    fn gaussian_values_must_not_exceed_source_max() {
        let img = Image::new_fill(32, 32, 0.5f64);
        let case = TestCase::new("range", &img, 2, 3);
        let mut pyr = halving_pyramid(&img, 2);
        pyr[1].data_mut()[17] = 0.75;

        let err = validator()
            .validate(&case, PyramidKind::Gaussian, &pyr, &binomial_filter(3))
            .unwrap_err();
        assert_eq!(
            err,
            Failure::ValueRange {
                what: "gaussian pyramid value".into(),
                level: 1,
                x: 1,
                y: 1,
                value: 0.75,
                low: 0.0,
                high: 0.5,
            }
        );

        // Laplacian bands are signed and exempt.
        assert!(
            validator()
                .validate(&case, PyramidKind::Laplacian, &pyr, &binomial_filter(3))
                .is_ok()
        );
    }

    #[test]
    fn gaussian_rejects_negative_values_and_nan() {
        let img = Image::new_fill(16, 16, 1.0f64);
        let case = TestCase::new("range", &img, 1, 1);
        let mut negative = img.clone();
        negative.data_mut()[3] = -0.1;
        assert!(
            validator()
                .validate(&case, PyramidKind::Gaussian, &[negative], &binomial_filter(1))
                .is_err()
        );

        let mut nan = img.clone();
        nan.data_mut()[0] = f64::NAN;
        assert!(
            validator()
                .validate(&case, PyramidKind::Gaussian, &[nan], &binomial_filter(1))
                .is_err()
        );
    }

    #[test]
    fn boundary_inputs_accept_single_level() {
        for (w, h) in [(0, 0), (1, 1), (15, 15), (3, 1)] {
            let img = Image::new_fill(w, h, 0.0f64);
            let case = TestCase::new("boundary", &img, 5, 3);
            validator()
                .validate(&case, PyramidKind::Gaussian, &[img.clone()], &binomial_filter(3))
                .unwrap_or_else(|e| panic!("{w}x{h} should pass: {e}"));
        }
    }
}
