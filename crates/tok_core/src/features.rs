//! Feature parser primitives.
//!
//! Every parser normalizes one raw event field (or one fixed-capacity block
//! of fields) into `[0, 1]`. The closed [`FeatureParser`] enum makes each
//! variant name exactly the context it needs (the raw event, the match
//! roster, the event's team id), so the dependencies are visible at the
//! call site.

use serde_json::Value;

use crate::error::Result;
use crate::event::RawEvent;
use crate::pitch;
use crate::roster::RosterState;

/// Categorical feature over a fixed finite id set.
///
/// Construction order of the categories is irrelevant: ids are sorted and
/// ranked `1..=C`, and a value normalizes to `rank / C`. Missing or unseen
/// ids normalize to 0, which decodes back to "absent".
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalParser {
    categories: Vec<i64>,
}

impl CategoricalParser {
    pub fn new(mut categories: Vec<i64>) -> Self {
        categories.sort_unstable();
        Self { categories }
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn normalize(&self, raw: Option<i64>) -> f64 {
        match raw.and_then(|id| self.categories.binary_search(&id).ok()) {
            Some(rank0) => (rank0 + 1) as f64 / self.categories.len() as f64,
            None => 0.0,
        }
    }

    /// Exact inverse of [`normalize`](Self::normalize): `round(v * C)` picks
    /// the rank. Returns `None` for 0 (absent) and for values that do not
    /// round onto a declared rank.
    pub fn decode(&self, value: f64) -> Option<i64> {
        if value == 0.0 {
            return None;
        }
        let rank = (value * self.categories.len() as f64).round() as i64;
        if rank < 1 || rank > self.categories.len() as i64 {
            return None;
        }
        Some(self.categories[rank as usize - 1])
    }

    /// Snap a possibly-off-grid value (e.g. from a generative model) onto the
    /// nearest legal rank. 0 stays 0, meaning "absent".
    pub fn snap(&self, value: f64) -> f64 {
        snap_to_rank(value, self.categories.len())
    }
}

/// Nearest-rank snap shared by categorical and boolean features.
pub fn snap_to_rank(value: f64, num_categories: usize) -> f64 {
    if value == 0.0 {
        return 0.0;
    }
    let rank = (value * num_categories as f64).round();
    rank.clamp(1.0, num_categories as f64) / num_categories as f64
}

/// Linear range feature: clamp into `[min, max]`, scale to `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeParser {
    min: f64,
    max: f64,
}

impl RangeParser {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn normalize(&self, raw: f64) -> f64 {
        let clamped = raw.clamp(self.min, self.max);
        (clamped - self.min) / (self.max - self.min)
    }
}

/// One field parser plus the context flavor it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureParser {
    /// Fixed id set; reads an integer at the field path.
    Categorical(CategoricalParser),
    /// StatsBomb boolean flag: absent counts as false, false maps to 0.5 and
    /// true to 1.0 (a two-category categorical where rank 1 is "false").
    Boolean,
    /// Clamped linear range; reads a number at the field path, with a missing
    /// value counting as raw 0.0 *before* scaling.
    Range(RangeParser),
    /// Period-relative minute; reads the minute at the field path and the
    /// sibling `period` field for the offset.
    Minute(RangeParser),
    /// Rank of the id at the field path among the sorted roster team ids.
    TeamRank,
    /// Normalized roster position of the player id at the field path, looked
    /// up in the event's own team. Used for `player.id` and
    /// `pass.recipient.id`.
    RosterPosition,
    /// Fixed-capacity block of visible-player snapshots: two slots
    /// (normalized x, y) per entry, filled in raw input order, zero beyond.
    FreezeFrame { slots: usize },
}

/// Context handed to every parser while encoding one event.
#[derive(Clone, Copy)]
pub struct EncodeContext<'a> {
    pub event: RawEvent<'a>,
    pub roster: &'a RosterState,
    /// `team.id` of the event being encoded, when present.
    pub team_id: Option<i64>,
}

impl FeatureParser {
    /// Number of vector cells this parser writes.
    pub fn slot_width(&self) -> usize {
        match self {
            FeatureParser::FreezeFrame { slots } => slots * 2,
            _ => 1,
        }
    }

    /// Encode the field at `path` into `out`, which must be exactly
    /// [`slot_width`](Self::slot_width) cells.
    pub fn encode_into(&self, path: &str, ctx: &EncodeContext<'_>, out: &mut [f64]) -> Result<()> {
        debug_assert_eq!(out.len(), self.slot_width());
        match self {
            FeatureParser::Categorical(parser) => {
                out[0] = parser.normalize(ctx.event.i64_at(path));
            }
            FeatureParser::Boolean => {
                out[0] = if ctx.event.bool_at(path) { 1.0 } else { 0.5 };
            }
            FeatureParser::Range(parser) => {
                out[0] = parser.normalize(ctx.event.f64_at(path).unwrap_or(0.0));
            }
            FeatureParser::Minute(parser) => {
                let minute = ctx.event.f64_at(path).unwrap_or(0.0);
                let period = ctx.event.i64_at("period").unwrap_or(1);
                out[0] = parser.normalize(pitch::period_relative_minute(minute, period));
            }
            FeatureParser::TeamRank => {
                out[0] = match ctx.event.i64_at(path) {
                    Some(team_id) => ctx.roster.team_rank(team_id)?,
                    None => 0.0,
                };
            }
            FeatureParser::RosterPosition => {
                out[0] = match (ctx.event.i64_at(path), ctx.team_id) {
                    (Some(player_id), Some(team_id)) => ctx.roster.position(team_id, player_id)?,
                    _ => 0.0,
                };
            }
            FeatureParser::FreezeFrame { slots } => {
                encode_freeze_frame(ctx.event.array_at(path).unwrap_or(&[]), *slots, out);
            }
        }
        Ok(())
    }
}

/// Write up to `slots` freeze-frame entries, in input order, two cells each.
/// `out` is already zeroed, so truncation and zero-fill both come for free.
fn encode_freeze_frame(entries: &[Value], slots: usize, out: &mut [f64]) {
    let x_parser = RangeParser::new(0.0, pitch::LENGTH_M);
    let y_parser = RangeParser::new(0.0, pitch::WIDTH_M);
    for (slot, entry) in entries.iter().take(slots).enumerate() {
        let snapshot = RawEvent::new(entry);
        out[slot * 2] = x_parser.normalize(snapshot.f64_at("location[0]").unwrap_or(0.0));
        out[slot * 2 + 1] = y_parser.normalize(snapshot.f64_at("location[1]").unwrap_or(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn ctx<'a>(event: &'a Value, roster: &'a RosterState) -> EncodeContext<'a> {
        EncodeContext {
            event: RawEvent::new(event),
            roster,
            team_id: RawEvent::new(event).i64_at("team.id"),
        }
    }

    #[test]
    fn categorical_rank_is_sorted_rank_over_count() {
        let parser = CategoricalParser::new(vec![41, 1, 2, 100]);
        assert_eq!(parser.normalize(Some(41)), 0.75);
        assert_eq!(parser.normalize(Some(1)), 0.25);
        assert_eq!(parser.normalize(Some(2)), 0.5);
        assert_eq!(parser.normalize(Some(100)), 1.0);
        assert_eq!(parser.normalize(Some(7)), 0.0);
        assert_eq!(parser.normalize(None), 0.0);
    }

    #[test]
    fn categorical_decode_inverts_normalize() {
        let parser = CategoricalParser::new(vec![809, 58]);
        for id in [809, 58] {
            assert_eq!(parser.decode(parser.normalize(Some(id))), Some(id));
        }
        assert_eq!(parser.decode(0.0), None);
        assert_eq!(parser.decode(7.0), None);
    }

    #[test]
    fn range_endpoints_clamp_and_scale() {
        let parser = RangeParser::new(0.0, 2.0);
        assert_eq!(parser.normalize(1.0), 0.5);
        assert_eq!(parser.normalize(-1.0), 0.0);
        assert_eq!(parser.normalize(3.0), 1.0);

        let parser = RangeParser::new(-3.0, 3.0);
        assert_eq!(parser.normalize(0.0), 0.5);
        assert_eq!(RangeParser::new(0.0, 120.0).normalize(48.0), 0.4);
    }

    #[test]
    fn minute_reads_the_sibling_period() {
        let parser = FeatureParser::Minute(RangeParser::new(0.0, 60.0));
        let roster = RosterState::new();
        let mut out = [0.0];

        for (minute, period, expected) in [
            (15.0, 1, 0.25),
            (60.0, 2, 0.25),
            (105.0, 3, 0.25),
            (120.0, 4, 0.25),
            (45.0, 1, 0.75),
            (75.0, 1, 1.0),
            (75.0, 2, 0.5),
        ] {
            let event = json!({"minute": minute, "period": period});
            parser.encode_into("minute", &ctx(&event, &roster), &mut out).unwrap();
            assert_eq!(out[0], expected, "minute {minute} period {period}");
        }
    }

    #[test]
    fn boolean_missing_counts_as_false() {
        let parser = FeatureParser::Boolean;
        let roster = RosterState::new();
        let mut out = [0.0];

        let event = json!({"out": true});
        parser.encode_into("out", &ctx(&event, &roster), &mut out).unwrap();
        assert_eq!(out[0], 1.0);
        parser.encode_into("counterpress", &ctx(&event, &roster), &mut out).unwrap();
        assert_eq!(out[0], 0.5);
    }

    #[test]
    fn roster_position_hard_fails_on_unknown_player() {
        let parser = FeatureParser::RosterPosition;
        let mut roster = RosterState::new();
        roster.apply_lineup(333, &[(31, 7), (32, 14)]);

        let mut out = [0.0];
        let event = json!({"team": {"id": 333}, "player": {"id": 32}});
        parser.encode_into("player.id", &ctx(&event, &roster), &mut out).unwrap();
        assert_eq!(out[0], 0.56);

        let event = json!({"team": {"id": 333}, "player": {"id": 99}});
        assert!(parser.encode_into("player.id", &ctx(&event, &roster), &mut out).is_err());

        // Absent id path is an absent feature, not a failure.
        let event = json!({"team": {"id": 333}});
        parser.encode_into("player.id", &ctx(&event, &roster), &mut out).unwrap();
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn freeze_frame_keeps_input_order_and_zero_fills() {
        let parser = FeatureParser::FreezeFrame { slots: 3 };
        let roster = RosterState::new();
        let event = json!({
            "shot": {"freeze_frame": [
                {"location": [120.0, 80.0], "teammate": false},
                {"location": [60.0, 40.0], "teammate": true},
            ]}
        });

        let mut out = [0.0; 6];
        parser.encode_into("shot.freeze_frame", &ctx(&event, &roster), &mut out).unwrap();
        assert_eq!(out, [1.0, 1.0, 0.5, 0.5, 0.0, 0.0]);

        // Oversized lists truncate to the declared capacity.
        let event = json!({
            "shot": {"freeze_frame": [
                {"location": [12.0, 8.0]},
                {"location": [24.0, 16.0]},
                {"location": [36.0, 24.0]},
                {"location": [48.0, 32.0]},
            ]}
        });
        let mut out = [0.0; 6];
        parser.encode_into("shot.freeze_frame", &ctx(&event, &roster), &mut out).unwrap();
        assert_eq!(out, [0.1, 0.1, 0.2, 0.2, 0.3, 0.3]);
    }

    proptest! {
        #[test]
        fn categorical_round_trips_every_declared_id(
            ids in proptest::collection::btree_set(-1000i64..1000, 1..40)
        ) {
            let ids: Vec<i64> = ids.iter().copied().collect();
            let parser = CategoricalParser::new(ids.clone());
            for id in ids {
                prop_assert_eq!(parser.decode(parser.normalize(Some(id))), Some(id));
            }
        }

        #[test]
        fn range_output_is_bounded_and_monotone(
            (lo, hi) in (-500.0f64..500.0).prop_flat_map(|lo| (Just(lo), lo + 1.0..lo + 1000.0)),
            a in -2000.0f64..2000.0,
            b in -2000.0f64..2000.0,
        ) {
            let parser = RangeParser::new(lo, hi);
            let (na, nb) = (parser.normalize(a), parser.normalize(b));
            prop_assert!((0.0..=1.0).contains(&na));
            prop_assert!((0.0..=1.0).contains(&nb));
            if a <= b {
                prop_assert!(na <= nb);
            }
        }
    }
}
