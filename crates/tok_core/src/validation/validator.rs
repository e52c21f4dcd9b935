//! Vector and sequence validation.
//!
//! The validator is independent of the encoder: it only sees finished
//! vectors, so it works equally on tokenizer output and on generated
//! (model-sampled) embeddings. Checks run in two tiers. Structural checks
//! (size, NaN, bounds) short-circuit, because nothing downstream is
//! meaningful on a malformed vector. Semantic checks then interpret cells
//! through the shared schema and accumulate findings.

use once_cell::sync::Lazy;
use rayon::prelude::*;

use crate::features::{snap_to_rank, FeatureParser};
use crate::parser::EventVector;
use crate::pitch;
use crate::schema::{registry, EventType, FieldSpec, FREEZE_FRAME_SLOTS, VECTOR_SIZE};
use crate::validation::report::{
    SequenceValidationReport, Severity, Strictness, ValidationIssue, ValidationReport,
};

/// Default cross-event thresholds.
pub const DEFAULT_MAX_TIME_GAP_S: f64 = 30.0;
pub const DEFAULT_MAX_LOCATION_JUMP_M: f64 = 70.0;

/// Pass length may disagree with the start/end displacement by this much
/// before it is flagged; the feed itself carries rounding slack.
const PASS_LENGTH_TOLERANCE_M: f64 = 10.0;

/// Start/end displacements below this normalized distance count as no
/// movement (about 1.2 m along the pitch length). Generated vectors land
/// near, not on, the encoder's values, so exact comparison would miss them.
const NO_MOVEMENT_EPSILON: f64 = 0.01;

/// Possession cells within this of each other encode the same team.
const POSSESSION_EPSILON: f64 = 0.01;

/// Tolerance when deciding whether a value sits on a categorical rank grid.
const GRID_EPSILON: f64 = 1e-6;

/// Event types after which possession may legitimately move to the other
/// team.
fn may_change_possession(event_type: EventType) -> bool {
    matches!(
        event_type,
        EventType::Interception
            | EventType::Duel
            | EventType::FiftyFifty
            | EventType::Pass
            | EventType::Shot
            | EventType::Clearance
            | EventType::Miscontrol
            | EventType::Dispossessed
            | EventType::DribbledPast
            | EventType::Error
            | EventType::FoulWon
            | EventType::FoulCommitted
            | EventType::Goalkeeper
    )
}

/// Cell offsets the semantic checks read directly. Resolved once from the
/// schema so the validator cannot drift from the encoder's layout.
struct Indices {
    x: usize,
    y: usize,
    period: usize,
    second: usize,
    minute: usize,
    team: usize,
    possession_team: usize,
    shot_end_x: usize,
    shot_end_y: usize,
    shot_freeze_frame: usize,
    pass_length: usize,
    pass_end_x: usize,
    pass_end_y: usize,
    carry_end_x: usize,
    carry_end_y: usize,
}

static INDICES: Lazy<Indices> = Lazy::new(|| {
    let schema = registry();
    let common = |path| schema.offset_of(None, path).expect("common field in schema");
    let of = |event_type, path| {
        schema.offset_of(Some(event_type), path).expect("typed field in schema")
    };
    Indices {
        x: common("location[0]"),
        y: common("location[1]"),
        period: common("period"),
        second: common("second"),
        minute: common("minute"),
        team: common("team.id"),
        possession_team: common("possession_team.id"),
        shot_end_x: of(EventType::Shot, "shot.end_location[0]"),
        shot_end_y: of(EventType::Shot, "shot.end_location[1]"),
        shot_freeze_frame: of(EventType::Shot, "shot.freeze_frame"),
        pass_length: of(EventType::Pass, "pass.length"),
        pass_end_x: of(EventType::Pass, "pass.end_location[0]"),
        pass_end_y: of(EventType::Pass, "pass.end_location[1]"),
        carry_end_x: of(EventType::Carry, "carry.end_location[0]"),
        carry_end_y: of(EventType::Carry, "carry.end_location[1]"),
    }
});

/// Validates encoded event vectors and sequences.
#[derive(Debug, Clone)]
pub struct Validator {
    strictness: Strictness,
    max_time_gap_s: f64,
    max_location_jump_m: f64,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(Strictness::default())
    }
}

impl Validator {
    pub fn new(strictness: Strictness) -> Self {
        Self {
            strictness,
            max_time_gap_s: DEFAULT_MAX_TIME_GAP_S,
            max_location_jump_m: DEFAULT_MAX_LOCATION_JUMP_M,
        }
    }

    pub fn with_max_time_gap(mut self, seconds: f64) -> Self {
        self.max_time_gap_s = seconds;
        self
    }

    pub fn with_max_location_jump(mut self, meters: f64) -> Self {
        self.max_location_jump_m = meters;
        self
    }

    /// Severity for findings that lenient runs tolerate as warnings.
    fn warning_or_error(&self) -> Severity {
        match self.strictness {
            Strictness::Lenient => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Severity for soft findings lenient runs keep informational.
    fn info_or_warning(&self) -> Severity {
        match self.strictness {
            Strictness::Lenient => Severity::Info,
            _ => Severity::Warning,
        }
    }

    /// Validate one vector. Structural violations short-circuit: the report
    /// carries only the structural finding, never semantic noise derived
    /// from garbage cells.
    pub fn validate_event(&self, vector: &[f64]) -> ValidationReport {
        if let Some(issue) = structural_issue(vector) {
            return ValidationReport::from_issues(vec![issue]);
        }

        let schema = registry();
        let mut issues = Vec::new();

        let type_cell = vector[0];
        let event_type = if type_cell == 0.0 {
            issues.push(ValidationIssue::new(
                "INVALID_EVENT_TYPE",
                Severity::Error,
                "event type cell is zero".into(),
            ));
            return ValidationReport::from_issues(issues);
        } else {
            match schema.decode_event_type(type_cell) {
                Some(event_type) => event_type,
                None => {
                    issues.push(ValidationIssue::new(
                        "UNKNOWN_EVENT_TYPE",
                        Severity::Error,
                        format!("event type cell {type_cell} decodes to no known type"),
                    ));
                    return ValidationReport::from_issues(issues);
                }
            }
        };

        for field in schema.common() {
            self.check_field_grid(field, vector, &mut issues);
        }
        if let Some(block) = schema.block(event_type) {
            for field in &block.fields {
                self.check_field_grid(field, vector, &mut issues);
            }
        }

        if vector[INDICES.team] == 0.0 {
            issues.push(
                ValidationIssue::new(
                    "INVALID_TEAM_ID",
                    Severity::Error,
                    "event carries no team".into(),
                )
                .for_field("team.id"),
            );
        }

        match event_type {
            EventType::Shot => self.check_shot(vector, &mut issues),
            EventType::Pass => self.check_pass(vector, &mut issues),
            EventType::Carry => self.check_carry(vector, &mut issues),
            EventType::Goalkeeper => self.check_goalkeeper(vector, &mut issues),
            _ => {}
        }

        ValidationReport::from_issues(issues)
    }

    /// Validate independent vectors in parallel. Unlike
    /// [`validate_sequence`](Self::validate_sequence) this applies no
    /// cross-event checks, so the vectors need not be ordered or even come
    /// from the same match.
    pub fn validate_events(&self, vectors: &[EventVector]) -> Vec<ValidationReport> {
        vectors.par_iter().map(|v| self.validate_event(v)).collect()
    }

    /// Validate a sequence: every vector individually plus the cross-event
    /// invariants (chronology, possession continuity, movement plausibility).
    pub fn validate_sequence(&self, vectors: &[EventVector]) -> SequenceValidationReport {
        let event_reports: Vec<ValidationReport> =
            vectors.iter().map(|v| self.validate_event(v)).collect();

        let mut issues = Vec::new();
        for index in 1..vectors.len() {
            let (prev, cur) = (&vectors[index - 1], &vectors[index]);
            // Cross-event checks only make sense between well-formed pairs.
            if prev.len() != VECTOR_SIZE || cur.len() != VECTOR_SIZE {
                continue;
            }
            self.check_pair(prev, cur, index, &mut issues);
        }

        SequenceValidationReport::new(event_reports, issues)
    }

    /// [`validate_sequence`](Self::validate_sequence) preceded by the
    /// deterministic alignment pass, applied identically to every vector.
    /// Intended for generated sequences, where off-grid cells are expected.
    pub fn validate_sequence_aligned(
        &self,
        vectors: &mut [EventVector],
    ) -> SequenceValidationReport {
        for vector in vectors.iter_mut() {
            self.align_embedding(vector);
        }
        self.validate_sequence(vectors)
    }

    fn check_pair(
        &self,
        prev: &[f64],
        cur: &[f64],
        index: usize,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let (t_prev, t_cur) = (timestamp_s(prev), timestamp_s(cur));
        if t_cur < t_prev {
            issues.push(
                ValidationIssue::new(
                    "NON_CHRONOLOGICAL_ORDER",
                    Severity::Error,
                    format!("event at {t_cur:.0}s follows event at {t_prev:.0}s"),
                )
                .at(index),
            );
        }

        let same_period = prev[INDICES.period] == cur[INDICES.period];
        if same_period && t_cur >= t_prev {
            let gap = t_cur - t_prev;
            if gap > self.max_time_gap_s {
                issues.push(
                    ValidationIssue::new(
                        "LARGE_TIME_GAP",
                        self.info_or_warning(),
                        format!("{gap:.0}s between consecutive events"),
                    )
                    .at(index),
                );
            }
        }

        // Unlike the time gap, the jump check spans period boundaries.
        let (px, py) = (prev[INDICES.x], prev[INDICES.y]);
        let (cx, cy) = (cur[INDICES.x], cur[INDICES.y]);
        if (px > 0.0 || py > 0.0) && (cx > 0.0 || cy > 0.0) {
            let jump = pitch::distance_m(px, py, cx, cy);
            if jump > self.max_location_jump_m {
                issues.push(
                    ValidationIssue::new(
                        "IMPLAUSIBLE_LOCATION_JUMP",
                        self.warning_or_error(),
                        format!("ball moved {jump:.0}m between consecutive events"),
                    )
                    .at(index),
                );
            }
        }

        let (prev_possession, cur_possession) =
            (prev[INDICES.possession_team], cur[INDICES.possession_team]);
        if prev_possession > 0.0
            && cur_possession > 0.0
            && (prev_possession - cur_possession).abs() > POSSESSION_EPSILON
        {
            // Either endpoint of the handover may be the contested event.
            let allowed = [prev[0], cur[0]].iter().any(|&cell| {
                registry().decode_event_type(cell).is_some_and(may_change_possession)
            });
            if !allowed {
                issues.push(
                    ValidationIssue::new(
                        "INVALID_POSSESSION_CHANGE",
                        self.warning_or_error(),
                        "possession changed after an event that cannot transfer it".into(),
                    )
                    .at(index),
                );
            }
        }
    }

    fn check_field_grid(
        &self,
        field: &FieldSpec,
        vector: &[f64],
        issues: &mut Vec<ValidationIssue>,
    ) {
        let value = vector[field.offset];
        match &field.parser {
            FeatureParser::Categorical(parser) => {
                if value != 0.0 && !on_rank_grid(value, parser.len()) {
                    issues.push(
                        ValidationIssue::new(
                            "CATEGORICAL_OUT_OF_RANGE",
                            Severity::Error,
                            format!("{} = {value} is not a valid category rank", field.path),
                        )
                        .for_field(field.path),
                    );
                }
            }
            FeatureParser::Boolean => {
                if value != 0.0 && !on_rank_grid(value, 2) {
                    issues.push(
                        ValidationIssue::new(
                            "BOOLEAN_OUT_OF_RANGE",
                            Severity::Error,
                            format!("{} = {value} is not a boolean encoding", field.path),
                        )
                        .for_field(field.path),
                    );
                }
            }
            _ => {}
        }
    }

    fn check_shot(&self, vector: &[f64], issues: &mut Vec<ValidationIssue>) {
        let (x, y) = (vector[INDICES.x], vector[INDICES.y]);
        // A zero x (absent location) is just as implausible as an own-half
        // origin.
        if x < 0.3 {
            let severity = match self.strictness {
                Strictness::Strict => Severity::Error,
                _ => Severity::Warning,
            };
            issues.push(ValidationIssue::new(
                "UNUSUAL_SHOT_LOCATION",
                severity,
                format!("shot taken from own half (x = {:.1}m)", x * pitch::LENGTH_M),
            ));
        }

        let (end_x, end_y) = (vector[INDICES.shot_end_x], vector[INDICES.shot_end_y]);
        if (end_x > 0.0 || end_y > 0.0)
            && normalized_distance(x, y, end_x, end_y) < NO_MOVEMENT_EPSILON
        {
            issues.push(ValidationIssue::new(
                "SHOT_NO_MOVEMENT",
                Severity::Warning,
                "shot ends where it started".into(),
            ));
        }

        let frame = &vector
            [INDICES.shot_freeze_frame..INDICES.shot_freeze_frame + 2 * FREEZE_FRAME_SLOTS];
        if frame.iter().all(|&v| v == 0.0) {
            issues.push(ValidationIssue::new(
                "MISSING_FREEZE_FRAME",
                self.info_or_warning(),
                "shot carries no freeze frame".into(),
            ));
        } else {
            // Slots fill front-to-back; a populated slot after an empty one
            // cannot come from the encoder.
            let mut seen_empty = false;
            for slot in 0..FREEZE_FRAME_SLOTS {
                let populated = frame[slot * 2] > 0.0 || frame[slot * 2 + 1] > 0.0;
                if populated && seen_empty {
                    issues.push(ValidationIssue::new(
                        "INVALID_FREEZE_FRAME_POSITION",
                        Severity::Warning,
                        format!("freeze-frame slot {slot} is populated after an empty slot"),
                    ));
                    break;
                }
                seen_empty |= !populated;
            }
        }
    }

    fn check_pass(&self, vector: &[f64], issues: &mut Vec<ValidationIssue>) {
        let (x, y) = (vector[INDICES.x], vector[INDICES.y]);
        let (end_x, end_y) = (vector[INDICES.pass_end_x], vector[INDICES.pass_end_y]);
        if end_x == 0.0 && end_y == 0.0 {
            return;
        }

        if normalized_distance(x, y, end_x, end_y) < NO_MOVEMENT_EPSILON {
            issues.push(ValidationIssue::new(
                "PASS_NO_MOVEMENT",
                Severity::Error,
                "pass ends where it started".into(),
            ));
            return;
        }

        let stored_length_m = vector[INDICES.pass_length] * pitch::LENGTH_M;
        if stored_length_m > 0.0 {
            let displacement_m = pitch::distance_m(x, y, end_x, end_y);
            if (stored_length_m - displacement_m).abs() > PASS_LENGTH_TOLERANCE_M {
                issues.push(ValidationIssue::new(
                    "PASS_LENGTH_MISMATCH",
                    self.warning_or_error(),
                    format!(
                        "pass length {stored_length_m:.0}m disagrees with displacement \
                         {displacement_m:.0}m"
                    ),
                ));
            }
        }
    }

    fn check_carry(&self, vector: &[f64], issues: &mut Vec<ValidationIssue>) {
        let (x, y) = (vector[INDICES.x], vector[INDICES.y]);
        let (end_x, end_y) = (vector[INDICES.carry_end_x], vector[INDICES.carry_end_y]);
        if (end_x > 0.0 || end_y > 0.0)
            && normalized_distance(x, y, end_x, end_y) < NO_MOVEMENT_EPSILON
        {
            issues.push(ValidationIssue::new(
                "CARRY_NO_MOVEMENT",
                self.warning_or_error(),
                "carry ends where it started".into(),
            ));
        }
    }

    fn check_goalkeeper(&self, vector: &[f64], issues: &mut Vec<ValidationIssue>) {
        let x = vector[INDICES.x];
        if x > 0.2 && x < 0.8 {
            issues.push(ValidationIssue::new(
                "GOALKEEPER_UNUSUAL_LOCATION",
                self.info_or_warning(),
                format!("goalkeeper event at midfield (x = {:.1}m)", x * pitch::LENGTH_M),
            ));
        }
    }

    /// Coerce a generated embedding onto the nearest legal vector: clip every
    /// cell into `[0, 1]`, then snap categorical and boolean cells onto their
    /// rank grids. Range cells keep their clipped values.
    pub fn align_embedding(&self, vector: &mut [f64]) {
        for cell in vector.iter_mut() {
            if !cell.is_finite() {
                *cell = 0.0;
            } else {
                *cell = cell.clamp(0.0, 1.0);
            }
        }
        if vector.len() != VECTOR_SIZE {
            return;
        }

        let schema = registry();
        vector[0] = schema.event_types().snap(vector[0]);
        let event_type = schema.decode_event_type(vector[0]);

        for field in schema.common() {
            snap_field(field, vector);
        }
        if let Some(block) = event_type.and_then(|t| schema.block(t)) {
            for field in &block.fields {
                snap_field(field, vector);
            }
        }
    }
}

fn snap_field(field: &FieldSpec, vector: &mut [f64]) {
    match &field.parser {
        FeatureParser::Categorical(parser) => {
            vector[field.offset] = parser.snap(vector[field.offset]);
        }
        FeatureParser::Boolean => {
            vector[field.offset] = snap_to_rank(vector[field.offset], 2);
        }
        _ => {}
    }
}

/// Euclidean distance between two normalized locations, in normalized units.
fn normalized_distance(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt()
}

fn on_rank_grid(value: f64, num_categories: usize) -> bool {
    let scaled = value * num_categories as f64;
    let rank = scaled.round();
    (1.0..=num_categories as f64).contains(&rank) && (scaled - rank).abs() <= GRID_EPSILON
}

/// First structural violation, if any. Checked in order of interpretability:
/// a wrong-sized vector makes every other finding meaningless.
fn structural_issue(vector: &[f64]) -> Option<ValidationIssue> {
    if vector.len() != VECTOR_SIZE {
        return Some(ValidationIssue::new(
            "INVALID_VECTOR_SIZE",
            Severity::Error,
            format!("expected {VECTOR_SIZE} cells, got {}", vector.len()),
        ));
    }
    if vector.iter().any(|v| v.is_nan()) {
        return Some(ValidationIssue::new(
            "NAN_VALUES",
            Severity::Error,
            "vector contains NaN cells".into(),
        ));
    }
    if vector.iter().any(|&v| !(0.0..=1.0).contains(&v)) {
        return Some(ValidationIssue::new(
            "VALUES_OUT_OF_RANGE",
            Severity::Error,
            "vector contains cells outside [0, 1]".into(),
        ));
    }
    None
}

/// Absolute match clock in seconds, rebuilt from the encoded period,
/// period-relative minute and second cells. The second cell decodes to a
/// rank rather than the raw second; the offset is uniform across events, so
/// ordering comparisons are unaffected.
fn timestamp_s(vector: &[f64]) -> f64 {
    let period = (vector[INDICES.period] * 5.0).round();
    let minute = vector[INDICES.minute] * pitch::MAX_PERIOD_MINUTE;
    let second = (vector[INDICES.second] * 60.0).round();
    period * 2700.0 + minute * 60.0 + second
}
