//! Case bodies: call the submission, then hand its output to the checkers.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use pv_core::Image;
use pv_oracle::ReferencePyramid;
use pv_submission::PyramidSubmission;
use pv_verify::{
    ApproximateImageComparator, Failure, PyramidInvariantValidator, PyramidKind,
    RenderLayoutValidator, TestCase,
};
use tracing::debug;

use crate::fixture::Fixture;

type Pyramid = (Vec<Image<f64>>, Image<f64>);

/// Calls into the submission. Both an `Err` and a panic become
/// [`Failure::SubmissionCrashed`] carrying `params`.
pub fn invoke<T>(
    function: &str,
    params: &str,
    call: impl FnOnce() -> anyhow::Result<T>,
) -> Result<T, Failure> {
    let crashed = |message: String| Failure::SubmissionCrashed {
        function: function.to_owned(),
        params: params.to_owned(),
        message,
    };
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(crashed(format!("{err:#}"))),
        Err(payload) => Err(crashed(format!("panicked: {}", panic_message(payload.as_ref())))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

pub fn build_pyramid(
    submission: &dyn PyramidSubmission,
    kind: PyramidKind,
    case: &TestCase<'_>,
) -> Result<Pyramid, Failure> {
    invoke(kind.builder_name(), &case.params(), || match kind {
        PyramidKind::Gaussian => {
            submission.build_gaussian_pyramid(case.image, case.max_levels, case.filter_size)
        }
        PyramidKind::Laplacian => {
            submission.build_laplacian_pyramid(case.image, case.max_levels, case.filter_size)
        }
    })
}

fn validator(fixture: &Fixture) -> PyramidInvariantValidator {
    PyramidInvariantValidator::new(fixture.config.invariants)
}

fn comparator(fixture: &Fixture) -> ApproximateImageComparator {
    ApproximateImageComparator::new(fixture.config.compare)
}

/// Builds a pyramid and checks its invariants. Returns the pyramid for
/// further checks.
pub fn check_pyramid(
    fixture: &Fixture,
    submission: &dyn PyramidSubmission,
    kind: PyramidKind,
    case: &TestCase<'_>,
) -> Result<Pyramid, Failure> {
    let (pyr, filter_vec) = build_pyramid(submission, kind, case)?;
    validator(fixture).validate(case, kind, &pyr, &filter_vec)?;
    Ok((pyr, filter_vec))
}

/// Laplacian pyramid, collapsed with unit coefficients, must reproduce the
/// input.
pub fn check_reconstruction(
    fixture: &Fixture,
    submission: &dyn PyramidSubmission,
    case: &TestCase<'_>,
) -> Result<(), Failure> {
    let (lpyr, filter_vec) = check_pyramid(fixture, submission, PyramidKind::Laplacian, case)?;
    let coeff = vec![1.0; lpyr.len()];
    let out = invoke("laplacian_to_image", &case.params(), || {
        submission.laplacian_to_image(&lpyr, &filter_vec, &coeff)
    })?;
    comparator(fixture).compare("reconstruction", &out, case.image)?;
    Ok(())
}

/// Checks the submission's Laplacian pyramid against the reference one.
///
/// The coarsest entry is a Gaussian level and must match the reference level
/// of the same depth. The submission's collapse of its own pyramid must match
/// the reference collapse of the reference pyramid.
pub fn check_oracle_reconstruction(
    fixture: &Fixture,
    submission: &dyn PyramidSubmission,
    case: &TestCase<'_>,
) -> Result<(), Failure> {
    let (lpyr, filter_vec) = check_pyramid(fixture, submission, PyramidKind::Laplacian, case)?;
    let comparator = comparator(fixture);

    let depth = lpyr.len().saturating_sub(1);
    let gaussian = ReferencePyramid::gaussian(case.image, lpyr.len(), case.min_level_dim);
    if let (Some(top), Some(expected)) = (lpyr.last(), gaussian.level(depth)) {
        comparator.compare(&format!("coarsest laplacian level {depth}"), top, expected)?;
    }

    let coeff = vec![1.0; lpyr.len()];
    let out = invoke("laplacian_to_image", &case.params(), || {
        submission.laplacian_to_image(&lpyr, &filter_vec, &coeff)
    })?;

    let reference = ReferencePyramid::laplacian(case.image, case.max_levels, case.min_level_dim);
    let unit = vec![1.0; reference.num_levels()];
    // The reference Laplacian always has at least one level.
    let expected = ReferencePyramid::reconstruct(reference.levels(), &unit)
        .unwrap_or_else(|_| case.image.clone());
    comparator.compare("collapse against the reference collapse", &out, &expected)?;
    Ok(())
}

/// Compares every Gaussian level the submission built with the reference
/// level of the same index. A shorter pyramid is compared on its prefix.
pub fn check_against_oracle(
    fixture: &Fixture,
    submission: &dyn PyramidSubmission,
    case: &TestCase<'_>,
) -> Result<(), Failure> {
    let (pyr, _) = check_pyramid(fixture, submission, PyramidKind::Gaussian, case)?;
    let reference = ReferencePyramid::gaussian(case.image, case.max_levels, case.min_level_dim);
    let comparator = comparator(fixture);
    for (i, (level, expected)) in pyr.iter().zip(reference.levels()).enumerate() {
        let cmp = comparator.compare(&format!("gaussian level {i}"), level, expected)?;
        debug!(index = i, correlation = cmp.correlation, error = cmp.error, "level matches reference");
    }
    Ok(())
}

/// Renders the first `levels` levels of a Gaussian pyramid and checks the
/// canvas. `levels` is capped at the pyramid length.
pub fn check_render(
    fixture: &Fixture,
    submission: &dyn PyramidSubmission,
    case: &TestCase<'_>,
    levels: usize,
) -> Result<(), Failure> {
    let (pyr, _) = check_pyramid(fixture, submission, PyramidKind::Gaussian, case)?;
    render_levels(submission, case, &pyr, levels.min(pyr.len()))
}

/// Renders `levels` levels of an already built pyramid and checks the canvas.
pub fn render_levels(
    submission: &dyn PyramidSubmission,
    case: &TestCase<'_>,
    pyr: &[Image<f64>],
    levels: usize,
) -> Result<(), Failure> {
    let params = format!("{}, render_levels={levels}", case.params());
    let canvas = invoke("render_pyramid", &params, || submission.render_pyramid(pyr, levels))?;
    debug!(levels, available = pyr.len(), "rendered");
    RenderLayoutValidator.validate(&canvas, case.image, levels)
}

/// Pyramid length must reach `expected` exactly.
pub fn check_exact_length(
    fixture: &Fixture,
    submission: &dyn PyramidSubmission,
    kind: PyramidKind,
    case: &TestCase<'_>,
    expected: usize,
) -> Result<Pyramid, Failure> {
    let built = check_pyramid(fixture, submission, kind, case)?;
    if built.0.len() != expected {
        return Err(Failure::Geometric {
            what: format!("{} level count for {}", kind.builder_name(), case.params()),
            expected: expected.to_string(),
            actual: built.0.len().to_string(),
        });
    }
    Ok(built)
}

/// Two builds of the same case must be identical.
pub fn check_idempotent(
    fixture: &Fixture,
    submission: &dyn PyramidSubmission,
    kind: PyramidKind,
    case: &TestCase<'_>,
) -> Result<(), Failure> {
    let (first, _) = check_pyramid(fixture, submission, kind, case)?;
    let (second, _) = check_pyramid(fixture, submission, kind, case)?;
    if first.len() != second.len() {
        return Err(Failure::Geometric {
            what: "repeated build level count".into(),
            expected: first.len().to_string(),
            actual: second.len().to_string(),
        });
    }
    for (i, (a, b)) in first.iter().zip(&second).enumerate() {
        if a.data() != b.data() {
            return Err(Failure::NumericExact {
                what: format!("repeated build of level {i}"),
                expected: a.data().to_vec(),
                actual: b.data().to_vec(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::bail;
    use pv_verify::{Failure, FailureCategory};

    use super::invoke;

    #[test]
    fn ok_values_pass_through() {
        assert_eq!(invoke("f", "x=1", || Ok(7)), Ok(7));
    }

    #[test]
    fn errors_and_panics_are_crashes() {
        let err = invoke::<()>("f", "x=1", || bail!("bad input")).unwrap_err();
        assert_eq!(
            err,
            Failure::SubmissionCrashed {
                function: "f".into(),
                params: "x=1".into(),
                message: "bad input".into(),
            }
        );

        let err = invoke::<()>("g", "x=2", || panic!("index out of bounds")).unwrap_err();
        assert_eq!(err.category(), FailureCategory::SubmissionCrashed);
        assert!(err.to_string().contains("panicked: index out of bounds"));
    }
}
