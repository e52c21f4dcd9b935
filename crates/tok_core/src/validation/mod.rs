//! Quality checks for encoded event vectors.
//!
//! Validation is decoupled from encoding on purpose: the same checks apply
//! to vectors the tokenizer just produced and to vectors sampled from a
//! generative model, where the interesting failures happen.

mod report;
mod validator;

pub use report::{
    SequenceValidationReport, Severity, Strictness, ValidationIssue, ValidationReport,
};
pub use validator::{Validator, DEFAULT_MAX_LOCATION_JUMP_M, DEFAULT_MAX_TIME_GAP_S};
