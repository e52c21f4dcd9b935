//! The event vector schema.
//!
//! Every encoded event is one fixed-length vector of [`VECTOR_SIZE`] cells.
//! Cells `0..15` form the common block shared by all event types; the rest of
//! the vector is partitioned into disjoint per-type blocks, one per event
//! type that carries type-specific features. An event writes its common block
//! and its own type block and leaves every other cell at zero, so two events
//! of different types never populate the same type-specific cell.
//!
//! The registry below is the single source of truth for that layout: the
//! encoder walks it to fill vectors and the validator walks it to check them.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::features::{CategoricalParser, FeatureParser, RangeParser};
use crate::pitch;

/// Total width of one encoded event vector.
pub const VECTOR_SIZE: usize = 122;

/// Width of the common block at the head of every vector.
pub const COMMON_SIZE: usize = 15;

/// Fixed freeze-frame capacity: visible players beyond this are dropped.
pub const FREEZE_FRAME_SLOTS: usize = 19;

/// StatsBomb event types the tokenizer understands.
///
/// `from_id` rejects anything else, which surfaces feed drift (a new event
/// type in the upstream data) as a hard error instead of a silent zero block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventType {
    BallRecovery,
    Dispossessed,
    Duel,
    CameraOn,
    Block,
    Offside,
    Clearance,
    Interception,
    Dribble,
    Shot,
    Pressure,
    HalfStart,
    Substitution,
    OwnGoalAgainst,
    FoulWon,
    FoulCommitted,
    Goalkeeper,
    BadBehaviour,
    OwnGoalFor,
    PlayerOn,
    PlayerOff,
    Shield,
    Pass,
    FiftyFifty,
    HalfEnd,
    StartingXi,
    TacticalShift,
    Error,
    Miscontrol,
    DribbledPast,
    InjuryStoppage,
    RefereeBallDrop,
    BallReceipt,
    Carry,
}

impl EventType {
    pub const ALL: [EventType; 34] = [
        EventType::BallRecovery,
        EventType::Dispossessed,
        EventType::Duel,
        EventType::CameraOn,
        EventType::Block,
        EventType::Offside,
        EventType::Clearance,
        EventType::Interception,
        EventType::Dribble,
        EventType::Shot,
        EventType::Pressure,
        EventType::HalfStart,
        EventType::Substitution,
        EventType::OwnGoalAgainst,
        EventType::FoulWon,
        EventType::FoulCommitted,
        EventType::Goalkeeper,
        EventType::BadBehaviour,
        EventType::OwnGoalFor,
        EventType::PlayerOn,
        EventType::PlayerOff,
        EventType::Shield,
        EventType::Pass,
        EventType::FiftyFifty,
        EventType::HalfEnd,
        EventType::StartingXi,
        EventType::TacticalShift,
        EventType::Error,
        EventType::Miscontrol,
        EventType::DribbledPast,
        EventType::InjuryStoppage,
        EventType::RefereeBallDrop,
        EventType::BallReceipt,
        EventType::Carry,
    ];

    pub fn from_id(id: i64) -> Option<Self> {
        EventType::ALL.iter().copied().find(|t| t.id() == id)
    }

    /// StatsBomb `type.id`.
    pub fn id(self) -> i64 {
        match self {
            EventType::BallRecovery => 2,
            EventType::Dispossessed => 3,
            EventType::Duel => 4,
            EventType::CameraOn => 5,
            EventType::Block => 6,
            EventType::Offside => 8,
            EventType::Clearance => 9,
            EventType::Interception => 10,
            EventType::Dribble => 14,
            EventType::Shot => 16,
            EventType::Pressure => 17,
            EventType::HalfStart => 18,
            EventType::Substitution => 19,
            EventType::OwnGoalAgainst => 20,
            EventType::FoulWon => 21,
            EventType::FoulCommitted => 22,
            EventType::Goalkeeper => 23,
            EventType::BadBehaviour => 24,
            EventType::OwnGoalFor => 25,
            EventType::PlayerOn => 26,
            EventType::PlayerOff => 27,
            EventType::Shield => 28,
            EventType::Pass => 30,
            EventType::FiftyFifty => 33,
            EventType::HalfEnd => 34,
            EventType::StartingXi => 35,
            EventType::TacticalShift => 36,
            EventType::Error => 37,
            EventType::Miscontrol => 38,
            EventType::DribbledPast => 39,
            EventType::InjuryStoppage => 40,
            EventType::RefereeBallDrop => 41,
            EventType::BallReceipt => 42,
            EventType::Carry => 43,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EventType::BallRecovery => "ball_recovery",
            EventType::Dispossessed => "dispossessed",
            EventType::Duel => "duel",
            EventType::CameraOn => "camera_on",
            EventType::Block => "block",
            EventType::Offside => "offside",
            EventType::Clearance => "clearance",
            EventType::Interception => "interception",
            EventType::Dribble => "dribble",
            EventType::Shot => "shot",
            EventType::Pressure => "pressure",
            EventType::HalfStart => "half_start",
            EventType::Substitution => "substitution",
            EventType::OwnGoalAgainst => "own_goal_against",
            EventType::FoulWon => "foul_won",
            EventType::FoulCommitted => "foul_committed",
            EventType::Goalkeeper => "goalkeeper",
            EventType::BadBehaviour => "bad_behaviour",
            EventType::OwnGoalFor => "own_goal_for",
            EventType::PlayerOn => "player_on",
            EventType::PlayerOff => "player_off",
            EventType::Shield => "shield",
            EventType::Pass => "pass",
            EventType::FiftyFifty => "50_50",
            EventType::HalfEnd => "half_end",
            EventType::StartingXi => "starting_xi",
            EventType::TacticalShift => "tactical_shift",
            EventType::Error => "error",
            EventType::Miscontrol => "miscontrol",
            EventType::DribbledPast => "dribbled_past",
            EventType::InjuryStoppage => "injury_stoppage",
            EventType::RefereeBallDrop => "referee_ball_drop",
            EventType::BallReceipt => "ball_receipt",
            EventType::Carry => "carry",
        }
    }

    /// Administrative events produce no vector. `starting_xi` and
    /// `tactical_shift` still mutate the roster before being skipped.
    pub fn skips_vector(self) -> bool {
        matches!(
            self,
            EventType::CameraOn
                | EventType::HalfStart
                | EventType::HalfEnd
                | EventType::StartingXi
                | EventType::TacticalShift
        )
    }
}

/// One field of the schema: where its value comes from (dotted path into the
/// raw event), where it lands (absolute cell offset), and how it normalizes.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub path: &'static str,
    pub offset: usize,
    pub parser: FeatureParser,
}

/// A contiguous run of type-specific cells.
#[derive(Debug, Clone)]
pub struct EventBlock {
    pub offset: usize,
    pub width: usize,
    pub fields: Vec<FieldSpec>,
}

/// The full vector layout. Obtain the process-wide instance via
/// [`registry`].
#[derive(Debug)]
pub struct SchemaRegistry {
    common: Vec<FieldSpec>,
    blocks: BTreeMap<EventType, EventBlock>,
    event_types: CategoricalParser,
}

impl SchemaRegistry {
    pub fn common(&self) -> &[FieldSpec] {
        &self.common
    }

    /// Type-specific block, `None` for types whose features are all common.
    pub fn block(&self, event_type: EventType) -> Option<&EventBlock> {
        self.blocks.get(&event_type)
    }

    /// The categorical over all 34 `type.id`s, as encoded in cell 0.
    pub fn event_types(&self) -> &CategoricalParser {
        &self.event_types
    }

    /// Recover the event type from an encoded cell-0 value.
    pub fn decode_event_type(&self, value: f64) -> Option<EventType> {
        self.event_types.decode(value).and_then(EventType::from_id)
    }

    /// Absolute offset of a field path, searched in the common block and then
    /// in the given type's block.
    pub fn offset_of(&self, event_type: Option<EventType>, path: &str) -> Option<usize> {
        let common = self.common.iter().find(|f| f.path == path);
        let specific = event_type
            .and_then(|t| self.blocks.get(&t))
            .and_then(|b| b.fields.iter().find(|f| f.path == path));
        common.or(specific).map(|f| f.offset)
    }
}

fn cat(path: &'static str, ids: &[i64]) -> (&'static str, FeatureParser) {
    (path, FeatureParser::Categorical(CategoricalParser::new(ids.to_vec())))
}

fn boolean(path: &'static str) -> (&'static str, FeatureParser) {
    (path, FeatureParser::Boolean)
}

fn range(path: &'static str, min: f64, max: f64) -> (&'static str, FeatureParser) {
    (path, FeatureParser::Range(RangeParser::new(min, max)))
}

fn build_registry() -> SchemaRegistry {
    let event_type_ids: Vec<i64> = EventType::ALL.iter().map(|t| t.id()).collect();
    let event_types = CategoricalParser::new(event_type_ids.clone());

    let common_specs = vec![
        cat("type.id", &event_type_ids),
        cat("play_pattern.id", &[1, 2, 3, 4, 5, 6, 7, 8, 9]),
        range("location[0]", 0.0, pitch::LENGTH_M),
        range("location[1]", 0.0, pitch::WIDTH_M),
        range("duration", 0.0, pitch::MAX_EVENT_DURATION_S),
        boolean("under_pressure"),
        boolean("out"),
        boolean("counterpress"),
        cat("period", &[1, 2, 3, 4, 5]),
        cat("second", &(0..60).collect::<Vec<i64>>()),
        cat("position.id", &(1..=25).collect::<Vec<i64>>()),
        (
            "minute",
            FeatureParser::Minute(RangeParser::new(0.0, pitch::MAX_PERIOD_MINUTE)),
        ),
        ("team.id", FeatureParser::TeamRank),
        ("possession_team.id", FeatureParser::TeamRank),
        ("player.id", FeatureParser::RosterPosition),
    ];

    // Block order fixes the cell layout; changing it is a format break.
    let block_specs: Vec<(EventType, Vec<(&'static str, FeatureParser)>)> = vec![
        (
            EventType::BallRecovery,
            vec![
                boolean("ball_recovery.offensive"),
                boolean("ball_recovery.recovery_failure"),
            ],
        ),
        (
            EventType::Duel,
            vec![
                cat("duel.type.id", &[10, 11]),
                cat("duel.outcome.id", &[1, 4, 13, 14, 15, 16, 17]),
            ],
        ),
        (
            EventType::Block,
            vec![
                boolean("block.deflection"),
                boolean("block.offensive"),
                boolean("block.save_block"),
            ],
        ),
        (
            EventType::Clearance,
            vec![
                boolean("clearance.aerial_won"),
                cat("clearance.body_part.id", &[37, 38, 40, 70]),
            ],
        ),
        (
            EventType::Interception,
            vec![cat("interception.outcome.id", &[1, 4, 13, 14, 15, 16, 17])],
        ),
        (
            EventType::Dribble,
            vec![
                boolean("dribble.overrun"),
                boolean("dribble.nutmeg"),
                cat("dribble.outcome.id", &[8, 9]),
                boolean("dribble.no_touch"),
            ],
        ),
        (
            EventType::Shot,
            vec![
                cat("shot.type.id", &[61, 62, 87, 88]),
                range("shot.end_location[0]", 0.0, pitch::LENGTH_M),
                range("shot.end_location[1]", 0.0, pitch::WIDTH_M),
                range("shot.end_location[2]", 0.0, pitch::MAX_SHOT_HEIGHT_M),
                boolean("shot.aerial_won"),
                boolean("shot.follows_dribble"),
                boolean("shot.first_time"),
                boolean("shot.open_goal"),
                boolean("shot.one_on_one"),
                range("shot.statsbomb_xg", 0.0, 1.0),
                boolean("shot.deflected"),
                cat("shot.technique.id", &[89, 90, 91, 92, 93, 94, 95]),
                cat("shot.body_part.id", &[37, 38, 40, 70]),
                cat("shot.outcome.id", &[96, 97, 98, 99, 100, 101, 115, 116]),
                (
                    "shot.freeze_frame",
                    FeatureParser::FreezeFrame { slots: FREEZE_FRAME_SLOTS },
                ),
            ],
        ),
        (
            EventType::Substitution,
            vec![cat("substitution.outcome.id", &[102, 103])],
        ),
        (
            EventType::FoulWon,
            vec![
                boolean("foul_won.defensive"),
                boolean("foul_won.advantage"),
                boolean("foul_won.penalty"),
            ],
        ),
        (
            EventType::FoulCommitted,
            vec![
                cat("foul_committed.type.id", &[19, 20, 21, 22, 23, 24]),
                boolean("foul_committed.offensive"),
                boolean("foul_committed.advantage"),
                boolean("foul_committed.penalty"),
                cat("foul_committed.card.id", &[5, 6, 7]),
            ],
        ),
        (
            EventType::Goalkeeper,
            vec![
                cat(
                    "goalkeeper.type.id",
                    &[25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 109, 110, 113, 114],
                ),
                cat(
                    "goalkeeper.outcome.id",
                    &[
                        1, 4, 13, 14, 15, 16, 17, 47, 48, 49, 50, 51, 52, 53, 55, 56, 58, 59,
                        117,
                    ],
                ),
                cat("goalkeeper.position.id", &[42, 43, 44]),
                cat("goalkeeper.technique.id", &[45, 46]),
                cat("goalkeeper.body_part.id", &[35, 36, 37, 38, 39, 40, 41]),
                range("goalkeeper.end_location[0]", 0.0, pitch::LENGTH_M),
                range("goalkeeper.end_location[1]", 0.0, pitch::WIDTH_M),
            ],
        ),
        (
            EventType::BadBehaviour,
            vec![cat("bad_behaviour.card.id", &[5, 6, 7])],
        ),
        (
            EventType::Pass,
            vec![
                cat("pass.type.id", &[61, 62, 63, 64, 65, 66, 67]),
                range("pass.length", 0.0, pitch::LENGTH_M),
                range("pass.angle", -pitch::MAX_PASS_ANGLE, pitch::MAX_PASS_ANGLE),
                cat("pass.height.id", &[1, 2, 3]),
                range("pass.end_location[0]", 0.0, pitch::LENGTH_M),
                range("pass.end_location[1]", 0.0, pitch::WIDTH_M),
                boolean("pass.backheel"),
                boolean("pass.deflected"),
                boolean("pass.miscommunication"),
                boolean("pass.cross"),
                boolean("pass.cut_back"),
                boolean("pass.switch"),
                boolean("pass.shot_assist"),
                boolean("pass.goal_assist"),
                cat("pass.body_part.id", &[37, 38, 40, 68, 69, 70, 106]),
                cat("pass.outcome.id", &[9, 74, 75, 76, 77]),
                cat("pass.technique.id", &[104, 105, 107, 108]),
                ("pass.recipient.id", FeatureParser::RosterPosition),
            ],
        ),
        (
            EventType::FiftyFifty,
            vec![cat("50_50.outcome.id", &[1, 2, 3, 4])],
        ),
        (EventType::Miscontrol, vec![boolean("miscontrol.aerial_won")]),
        (
            EventType::InjuryStoppage,
            vec![boolean("injury_stoppage.in_chain")],
        ),
        (
            EventType::BallReceipt,
            vec![cat("ball_receipt.outcome.id", &[9])],
        ),
        (
            EventType::Carry,
            vec![
                range("carry.end_location[0]", 0.0, pitch::LENGTH_M),
                range("carry.end_location[1]", 0.0, pitch::WIDTH_M),
            ],
        ),
    ];

    let mut offset = 0;
    let common = common_specs
        .into_iter()
        .map(|(path, parser)| {
            let spec = FieldSpec { path, offset, parser };
            offset += spec.parser.slot_width();
            spec
        })
        .collect();
    debug_assert_eq!(offset, COMMON_SIZE);

    let mut blocks = BTreeMap::new();
    for (event_type, specs) in block_specs {
        let block_offset = offset;
        let fields: Vec<FieldSpec> = specs
            .into_iter()
            .map(|(path, parser)| {
                let spec = FieldSpec { path, offset, parser };
                offset += spec.parser.slot_width();
                spec
            })
            .collect();
        blocks.insert(
            event_type,
            EventBlock { offset: block_offset, width: offset - block_offset, fields },
        );
    }
    debug_assert_eq!(offset, VECTOR_SIZE);

    SchemaRegistry { common, blocks, event_types }
}

static REGISTRY: Lazy<SchemaRegistry> = Lazy::new(build_registry);

/// Process-wide schema instance.
pub fn registry() -> &'static SchemaRegistry {
    &REGISTRY
}
