//! Umbrella crate for the `pyramid-verifier` workspace.
//!
//! Re-exports the image container at the root; the checkers, the reference
//! pyramids and the submission contract live under their own modules.

pub use pv_core::*;
pub use pv_oracle as oracle;
pub use pv_submission as submission;
pub use pv_verify as verify;
