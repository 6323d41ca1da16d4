use serde::Serialize;

/// Why a case failed. One variant per reporting category; every variant
/// carries enough context to diagnose the failure without re-running it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Failure {
    #[error("function `{function}`: {violation}")]
    Structural {
        function: String,
        violation: StructuralViolation,
    },

    #[error("{what}: expected {expected}, got {actual}")]
    Geometric {
        what: String,
        expected: String,
        actual: String,
    },

    #[error("{what} mismatch:\n  expected {expected:?}\n  actual   {actual:?}")]
    NumericExact {
        what: String,
        expected: Vec<f64>,
        actual: Vec<f64>,
    },

    #[error(
        "{what}: level {level} pixel (x={x}, y={y}) = {value} lies outside [{low}, {high}]"
    )]
    ValueRange {
        what: String,
        level: usize,
        x: usize,
        y: usize,
        value: f64,
        low: f64,
        high: f64,
    },

    #[error(
        "{what} is not close enough to the reference: correlation {correlation:.6} \
         (must exceed {min_correlation}), normalized squared error {error:.6} \
         (must stay below {max_error}); inspect the output visually"
    )]
    NumericApprox {
        what: String,
        correlation: f64,
        error: f64,
        min_correlation: f64,
        max_error: f64,
    },

    #[error(
        "padding of level {level} holds {nonzero} non-zero pixel(s), \
         first at canvas (x={x}, y={y}) = {value}"
    )]
    Padding {
        level: usize,
        nonzero: usize,
        x: usize,
        y: usize,
        value: f64,
    },

    #[error("submission crashed in `{function}` ({params}): {message}")]
    SubmissionCrashed {
        function: String,
        params: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralViolation {
    #[error("not defined in the submission source")]
    Missing,
    #[error("submission source does not parse: {message}")]
    Unparsable { message: String },
    #[error("parameter list `({actual})` differs from the required `({expected})`")]
    Signature { expected: String, actual: String },
    #[error("uses a `{construct}` loop but must not iterate explicitly")]
    Loop { construct: &'static str },
    #[error("contains an explicit `return` statement")]
    Return,
    #[error("must return a (Vec<level>, filter) pair, declared `{actual}`")]
    ReturnShape { actual: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureCategory {
    Structural,
    Geometric,
    NumericExact,
    NumericRange,
    NumericApproximate,
    Padding,
    SubmissionCrashed,
}

impl FailureCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Geometric => "geometric",
            Self::NumericExact => "numeric-exact",
            Self::NumericRange => "numeric-range",
            Self::NumericApproximate => "numeric-approximate",
            Self::Padding => "padding",
            Self::SubmissionCrashed => "submission-crashed",
        }
    }
}

impl core::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Failure {
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::Structural { .. } => FailureCategory::Structural,
            Self::Geometric { .. } => FailureCategory::Geometric,
            Self::NumericExact { .. } => FailureCategory::NumericExact,
            Self::ValueRange { .. } => FailureCategory::NumericRange,
            Self::NumericApprox { .. } => FailureCategory::NumericApproximate,
            Self::Padding { .. } => FailureCategory::Padding,
            Self::SubmissionCrashed { .. } => FailureCategory::SubmissionCrashed,
        }
    }

    pub(crate) fn geometric(
        what: impl Into<String>,
        expected: impl core::fmt::Debug,
        actual: impl core::fmt::Debug,
    ) -> Self {
        Self::Geometric {
            what: what.into(),
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Failure, FailureCategory, StructuralViolation};

    #[test]
    fn structural_message_names_function_and_construct() {
        let failure = Failure::Structural {
            function: "render_pyramid".into(),
            violation: StructuralViolation::Loop { construct: "for" },
        };
        let msg = failure.to_string();
        assert!(msg.contains("render_pyramid"));
        assert!(msg.contains("`for`"));
        assert_eq!(failure.category(), FailureCategory::Structural);
    }

    #[test]
    fn geometric_reports_expected_and_actual() {
        let failure = Failure::geometric("level 1 shape", (128, 128), (128, 127));
        assert_eq!(
            failure.to_string(),
            "level 1 shape: expected (128, 128), got (128, 127)"
        );
    }

    #[test]
    fn approximate_failure_hints_visual_inspection() {
        let failure = Failure::NumericApprox {
            what: "reconstruction".into(),
            correlation: 0.5,
            error: 0.2,
            min_correlation: 0.9,
            max_error: 0.05,
        };
        assert!(failure.to_string().contains("inspect the output visually"));
        assert_eq!(failure.category().as_str(), "numeric-approximate");
    }
}
