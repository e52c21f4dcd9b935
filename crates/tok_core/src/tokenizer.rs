//! Match-level tokenization.
//!
//! A [`MatchTokenizer`] owns the roster state for one match and folds the
//! event stream through [`MatchEventParser`], in order, so roster mutations
//! land before the events that depend on them. [`tokenize_matches`]
//! parallelizes across matches; within a match the stream stays sequential.

use rayon::prelude::*;
use serde_json::Value;

use crate::error::Result;
use crate::parser::{EventVector, MatchEventParser};
use crate::roster::RosterState;

/// Stateful per-match tokenizer.
#[derive(Default)]
pub struct MatchTokenizer {
    parser: MatchEventParser,
    roster: RosterState,
}

impl MatchTokenizer {
    pub fn new() -> Self {
        Self { parser: MatchEventParser::new(), roster: RosterState::new() }
    }

    /// Seed the roster from an external lineup source instead of relying on
    /// the stream's own `starting_xi` events.
    pub fn with_roster(roster: RosterState) -> Self {
        Self { parser: MatchEventParser::new(), roster }
    }

    pub fn roster(&self) -> &RosterState {
        &self.roster
    }

    /// Encode a match's events in stream order. Administrative events update
    /// the roster but contribute no vector, so the output can be shorter than
    /// the input.
    pub fn tokenize(&mut self, events: &[Value]) -> Result<Vec<EventVector>> {
        let mut vectors = Vec::with_capacity(events.len());
        for event in events {
            if let Some(vector) = self.parser.encode_event(event, &mut self.roster)? {
                vectors.push(vector);
            }
        }
        tracing::debug!(events = events.len(), vectors = vectors.len(), "match tokenized");
        Ok(vectors)
    }
}

/// Tokenize one match with a fresh tokenizer.
pub fn tokenize_match(events: &[Value]) -> Result<Vec<EventVector>> {
    MatchTokenizer::new().tokenize(events)
}

/// Tokenize independent matches in parallel. Each match gets its own roster;
/// a failing match reports its own error without poisoning the others.
pub fn tokenize_matches(matches: &[Vec<Value>]) -> Vec<Result<Vec<EventVector>>> {
    matches.par_iter().map(|events| tokenize_match(events)).collect()
}
