//! StatsBomb match-event tokenizer.
//!
//! Encodes raw StatsBomb event JSON into fixed-length normalized vectors
//! suitable for sequence models, and validates such vectors whether they
//! came from the encoder or from a model.
//!
//! The crate is built around three pieces:
//!
//! - [`schema`]: the fixed vector layout, a common block shared by every
//!   event plus disjoint per-type blocks, partitioning all
//!   [`schema::VECTOR_SIZE`] cells.
//! - [`tokenizer`]: per-match encoding, folding roster state (lineups,
//!   tactical shifts, substitutions) through the event stream.
//! - [`validation`]: structural and semantic checks over single vectors and
//!   whole sequences, with strictness-dependent severities and a quality
//!   score.
//!
//! ```no_run
//! use tok_core::{tokenize_match, Validator};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let events: Vec<serde_json::Value> =
//!     serde_json::from_str(&std::fs::read_to_string("events/16120.json")?)?;
//! let vectors = tokenize_match(&events)?;
//! let report = Validator::default().validate_sequence(&vectors);
//! println!("score: {:.2}", report.score);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod event;
pub mod features;
pub mod parser;
pub mod pitch;
pub mod roster;
pub mod schema;
pub mod tokenizer;
pub mod validation;

pub use error::{Result, TokenizeError};
pub use parser::{EventVector, MatchEventParser};
pub use roster::RosterState;
pub use schema::{EventType, FREEZE_FRAME_SLOTS, VECTOR_SIZE};
pub use tokenizer::{tokenize_match, tokenize_matches, MatchTokenizer};
pub use validation::{
    SequenceValidationReport, Severity, Strictness, ValidationReport, Validator,
};

#[cfg(test)]
mod tests;
