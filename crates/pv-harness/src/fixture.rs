use pv_submission::{PyramidSubmission, submission_contracts};
use pv_verify::{ConformanceCache, Failure, StructuralViolation};
use tracing::{info, warn};

use crate::config::HarnessConfig;
use crate::corpus::CorpusImage;

/// Read-only state shared by every case of a run.
///
/// Built once before the first case; cases only borrow it.
#[derive(Debug)]
pub struct Fixture {
    pub config: HarnessConfig,
    pub corpus: Vec<CorpusImage>,
    conformance: Result<ConformanceCache, String>,
}

impl Fixture {
    /// Parses the submission source once and inspects every contract.
    /// Unparsable source is not an error here: every conformance case of
    /// the run reports it.
    pub fn setup(
        config: HarnessConfig,
        corpus: Vec<CorpusImage>,
        submission: &dyn PyramidSubmission,
    ) -> Self {
        let conformance = ConformanceCache::build(submission.source(), &submission_contracts())
            .map_err(|e| e.to_string());
        match &conformance {
            Ok(cache) => info!(
                submission = submission.name(),
                functions = cache.reports().filter(|r| r.found).count(),
                "inspected submission source"
            ),
            Err(message) => warn!(submission = submission.name(), %message, "source does not parse"),
        }
        Self {
            config,
            corpus,
            conformance,
        }
    }

    pub fn conformance(&self) -> Option<&ConformanceCache> {
        self.conformance.as_ref().ok()
    }

    pub fn conformance_verdict(&self, function: &str) -> Result<(), Failure> {
        match &self.conformance {
            Ok(cache) => cache.verdict(function),
            Err(message) => Err(Failure::Structural {
                function: function.to_owned(),
                violation: StructuralViolation::Unparsable {
                    message: message.clone(),
                },
            }),
        }
    }

    /// Corpus image `index`. Suites index only the fixture they were
    /// registered from.
    pub fn image(&self, index: usize) -> &CorpusImage {
        &self.corpus[index]
    }
}
