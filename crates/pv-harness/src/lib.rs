//! Test orchestration for pyramid submissions.
//!
//! A run has three phases: load [`HarnessConfig`] and the corpus, build a
//! [`Fixture`] (which inspects the submission source once), then register
//! a [`Suite`] and hand it to the [`Runner`]. Cases run strictly in order;
//! each one calls the submission and routes its output through the
//! `pv_verify` checkers.

pub mod checks;
pub mod config;
pub mod corpus;
pub mod fixture;
pub mod report;
pub mod runner;
pub mod stress;
pub mod suite;

pub use config::{HarnessConfig, RoundTripConfig, StressConfig};
pub use corpus::{CorpusImage, load_corpus, read_image, synthetic_corpus};
pub use fixture::Fixture;
pub use report::{CaseOutcome, RunReport, write_json};
pub use runner::Runner;
pub use suite::{RegisteredCase, Suite};
