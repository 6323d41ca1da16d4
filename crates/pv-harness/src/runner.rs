//! Sequential execution with console progress.
//!
//! One case runs to completion before the next starts. A failing or
//! crashing case is recorded and the run moves on. Progress goes to the
//! writer handed to [`Runner::run`]; panic messages from the submission
//! still reach stderr through the process panic hook.

use std::io::Write;
use std::time::Instant;

use anyhow::Result;
use pv_submission::PyramidSubmission;
use tracing::{debug, info};

use crate::fixture::Fixture;
use crate::report::{CaseOutcome, RunReport};
use crate::suite::Suite;

const RULE_WIDTH: usize = 70;

pub struct Runner<'a> {
    fixture: &'a Fixture,
    submission: &'a dyn PyramidSubmission,
}

impl<'a> Runner<'a> {
    pub fn new(fixture: &'a Fixture, submission: &'a dyn PyramidSubmission) -> Self {
        Self {
            fixture,
            submission,
        }
    }

    /// Runs every case of `suite` in order, writing progress to `out`.
    pub fn run(&self, suite: &Suite, out: &mut impl Write) -> Result<RunReport> {
        let total = suite.len();
        write_banner(out)?;

        let outcomes = self.run_cases(suite, total, out)?;

        let passed = outcomes.iter().filter(|o| o.passed).count();
        let report = RunReport {
            submission: self.submission.name().to_owned(),
            total,
            passed,
            failed: total - passed,
            outcomes,
            conformance: self
                .fixture
                .conformance()
                .map(|cache| cache.reports().cloned().collect())
                .unwrap_or_default(),
        };

        write_failures(out, &report)?;
        write_summary(out, &report)?;
        info!(
            submission = %report.submission,
            total,
            passed = report.passed,
            failed = report.failed,
            "run finished"
        );
        Ok(report)
    }

    fn run_cases(
        &self,
        suite: &Suite,
        total: usize,
        out: &mut impl Write,
    ) -> Result<Vec<CaseOutcome>> {
        let mut outcomes = Vec::with_capacity(total);
        for (i, case) in suite.cases().iter().enumerate() {
            let number = i + 1;
            write!(out, "[{number}/{total}] {} ... ", case.name)?;
            out.flush()?;

            let started = Instant::now();
            let result = case.run(self.fixture, self.submission);
            let elapsed_ms = started.elapsed().as_secs_f64() * 1e3;
            debug!(case = %case.name, elapsed_ms, ok = result.is_ok(), "case finished");

            let outcome = match result {
                Ok(()) => {
                    writeln!(out, "ok")?;
                    CaseOutcome {
                        number,
                        name: case.name.clone(),
                        passed: true,
                        category: None,
                        message: None,
                        elapsed_ms,
                    }
                }
                Err(failure) => {
                    writeln!(out, "FAIL")?;
                    info!(case = %case.name, category = %failure.category(), "case failed");
                    CaseOutcome {
                        number,
                        name: case.name.clone(),
                        passed: false,
                        category: Some(failure.category()),
                        message: Some(failure.to_string()),
                        elapsed_ms,
                    }
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

fn write_banner(out: &mut impl Write) -> Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "{rule}")?;
    writeln!(out, "{:^RULE_WIDTH$}", "==== Starting Tests ====")?;
    writeln!(out, "{rule}")?;
    Ok(())
}

fn write_failures(out: &mut impl Write, report: &RunReport) -> Result<()> {
    for failure in report.failures() {
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "FAIL: {}", failure.name)?;
        writeln!(out, "Test number: [{}/{}]", failure.number, report.total)?;
        if let Some(category) = failure.category {
            writeln!(out, "Category: {category}")?;
        }
        writeln!(out, "{}", failure.message.as_deref().unwrap_or_default())?;
    }
    Ok(())
}

fn write_summary(out: &mut impl Write, report: &RunReport) -> Result<()> {
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    writeln!(out, "Ran {} tests", report.total)?;
    if report.all_passed() {
        writeln!(out, "OK")?;
    } else {
        writeln!(out, "FAILED (failures={})", report.failed)?;
    }
    Ok(())
}
