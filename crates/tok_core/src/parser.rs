//! Single-event encoding.
//!
//! [`MatchEventParser`] turns one raw event into one [`EventVector`], driving
//! the roster mutations that lineup and substitution events imply. It is
//! deliberately stream-unaware: ordering, batching and per-match state live
//! in [`crate::tokenizer`].

use serde_json::Value;

use crate::error::{Result, TokenizeError};
use crate::event::RawEvent;
use crate::features::EncodeContext;
use crate::roster::RosterState;
use crate::schema::{registry, EventType, SchemaRegistry, VECTOR_SIZE};

/// One encoded event: [`VECTOR_SIZE`] normalized cells.
pub type EventVector = Vec<f64>;

/// Encodes raw events against the process-wide schema.
pub struct MatchEventParser {
    schema: &'static SchemaRegistry,
}

impl Default for MatchEventParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchEventParser {
    pub fn new() -> Self {
        Self { schema: registry() }
    }

    /// Encode one event, mutating `roster` as a side effect when the event is
    /// a lineup, tactical shift or substitution. Returns `Ok(None)` for
    /// administrative events that produce no vector.
    pub fn encode_event(
        &self,
        raw: &Value,
        roster: &mut RosterState,
    ) -> Result<Option<EventVector>> {
        let event = RawEvent::new(raw);
        let type_id = event
            .i64_at("type.id")
            .ok_or(TokenizeError::MissingField { path: "type.id" })?;
        let event_type =
            EventType::from_id(type_id).ok_or(TokenizeError::UnknownEventType { id: type_id })?;

        // Roster mutations happen before the skip check so lineup events take
        // effect even though they emit nothing.
        match event_type {
            EventType::StartingXi | EventType::TacticalShift => {
                self.apply_lineup(&event, roster)?;
            }
            EventType::Substitution => self.stage_substitution(&event, roster)?,
            _ => {}
        }

        if event_type.skips_vector() {
            tracing::trace!(event_type = event_type.name(), "administrative event skipped");
            return Ok(None);
        }

        let mut vector = vec![0.0; VECTOR_SIZE];
        let ctx = EncodeContext { event, roster, team_id: event.i64_at("team.id") };

        for field in self.schema.common() {
            let cells = &mut vector[field.offset..field.offset + field.parser.slot_width()];
            field.parser.encode_into(field.path, &ctx, cells)?;
        }
        if let Some(block) = self.schema.block(event_type) {
            for field in &block.fields {
                let cells = &mut vector[field.offset..field.offset + field.parser.slot_width()];
                field.parser.encode_into(field.path, &ctx, cells)?;
            }
        }

        // The outgoing player stays on the roster until their own
        // substitution event has been encoded.
        if event_type == EventType::Substitution {
            if let (Some(team_id), Some(out_id)) =
                (event.i64_at("team.id"), event.i64_at("player.id"))
            {
                roster.complete_substitution(team_id, out_id);
            }
        }

        Ok(Some(vector))
    }

    fn apply_lineup(&self, event: &RawEvent<'_>, roster: &mut RosterState) -> Result<()> {
        let team_id = event
            .i64_at("team.id")
            .ok_or(TokenizeError::MissingField { path: "team.id" })?;
        let entries = event
            .array_at("tactics.lineup")
            .ok_or(TokenizeError::MissingField { path: "tactics.lineup" })?;

        let mut lineup = Vec::with_capacity(entries.len());
        for entry in entries {
            let entry = RawEvent::new(entry);
            let player_id = entry
                .i64_at("player.id")
                .ok_or(TokenizeError::MissingField { path: "tactics.lineup[].player.id" })?;
            let position_id = entry.i64_at("position.id").unwrap_or(0);
            lineup.push((player_id, position_id));
        }
        tracing::debug!(team_id, players = lineup.len(), "lineup applied");
        roster.apply_lineup(team_id, &lineup);
        Ok(())
    }

    fn stage_substitution(&self, event: &RawEvent<'_>, roster: &mut RosterState) -> Result<()> {
        let team_id = event
            .i64_at("team.id")
            .ok_or(TokenizeError::MissingField { path: "team.id" })?;
        let out_id = event
            .i64_at("player.id")
            .ok_or(TokenizeError::MissingField { path: "player.id" })?;
        // A missing replacement means the player goes off without cover;
        // staging out for out makes phase two a plain removal.
        let in_id = event.i64_at("substitution.replacement.id").unwrap_or(out_id);
        roster.stage_substitution(team_id, out_id, in_id)
    }
}
