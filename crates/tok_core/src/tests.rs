//! End-to-end tests over real-shaped StatsBomb event payloads.

use serde_json::{json, Value};

use crate::parser::MatchEventParser;
use crate::roster::RosterState;
use crate::schema::VECTOR_SIZE;
use crate::tokenizer::{tokenize_match, MatchTokenizer};
use crate::validation::{Strictness, Validator};

fn lineup_event(team_id: i64, players: &[(i64, i64)]) -> Value {
    let lineup: Vec<Value> = players
        .iter()
        .map(|&(player, position)| json!({"player": {"id": player}, "position": {"id": position}}))
        .collect();
    json!({"type": {"id": 35}, "team": {"id": team_id}, "tactics": {"lineup": lineup}})
}

/// Shot from match 16120: Ángel Rodríguez, period 1, 05:09, right-footed
/// first-time shot from [103.7, 48.2] with a nine-player freeze frame.
fn reference_shot() -> Value {
    json!({
        "type": {"id": 16},
        "play_pattern": {"id": 1},
        "period": 1,
        "minute": 5,
        "second": 9,
        "duration": 0.808543,
        "team": {"id": 216},
        "possession_team": {"id": 216},
        "player": {"id": 6611},
        "position": {"id": 22},
        "location": [103.7, 48.2],
        "shot": {
            "type": {"id": 87},
            "end_location": [120.0, 40.8, 5.6],
            "first_time": true,
            "statsbomb_xg": 0.12042114,
            "technique": {"id": 95},
            "body_part": {"id": 40},
            "outcome": {"id": 98},
            "freeze_frame": [
                {"location": [105.1, 39.8]},
                {"location": [91.4, 32.6]},
                {"location": [108.8, 51.4]},
                {"location": [118.4, 42.7]},
                {"location": [113.7, 63.4]},
                {"location": [103.5, 53.1]},
                {"location": [101.1, 72.2]},
                {"location": [96.4, 65.6]},
                {"location": [114.2, 72.4]},
            ],
        },
    })
}

fn getafe_barcelona_roster() -> RosterState {
    let mut roster = RosterState::new();
    roster.apply_lineup(216, &[(6611, 22), (6612, 1), (6613, 5)]);
    roster.apply_lineup(217, &[(5503, 23), (5504, 1)]);
    roster
}

#[test]
fn reference_shot_encodes_every_cell_as_expected() {
    let mut roster = getafe_barcelona_roster();
    let vector = MatchEventParser::new()
        .encode_event(&reference_shot(), &mut roster)
        .unwrap()
        .unwrap();

    let mut expected = vec![0.0; VECTOR_SIZE];
    // Common block.
    expected[0] = 10.0 / 34.0; // shot is the 10th of 34 sorted type ids
    expected[1] = 1.0 / 9.0; // regular play
    expected[2] = 103.7 / 120.0;
    expected[3] = 48.2 / 80.0;
    expected[4] = 0.808543 / 3.0;
    expected[5] = 0.5; // under_pressure absent
    expected[6] = 0.5; // out absent
    expected[7] = 0.5; // counterpress absent
    expected[8] = 1.0 / 5.0; // period 1
    expected[9] = 10.0 / 60.0; // second 9, rank 10
    expected[10] = 22.0 / 25.0; // position id
    expected[11] = 5.0 / 60.0; // minute 5 of period 1
    expected[12] = 0.5; // Getafe, first of two team ids
    expected[13] = 0.5;
    expected[14] = 22.0 / 25.0; // shooter's roster position
    // Shot block.
    expected[29] = 3.0 / 4.0; // open play among {61, 62, 87, 88}
    expected[30] = 1.0; // end x on the goal line
    expected[31] = 40.8 / 80.0;
    expected[32] = 1.0; // 5.6m clamps to the 5m ceiling
    expected[33] = 0.5; // aerial_won
    expected[34] = 0.5; // follows_dribble
    expected[35] = 1.0; // first_time
    expected[36] = 0.5; // open_goal
    expected[37] = 0.5; // one_on_one
    expected[38] = 0.12042114;
    expected[39] = 0.5; // deflected
    expected[40] = 7.0 / 7.0; // technique: normal
    expected[41] = 3.0 / 4.0; // body part: right foot
    expected[42] = 3.0 / 8.0; // outcome
    // Freeze frame, nine slots in input order, ten left zero.
    let frame = [
        (105.1, 39.8),
        (91.4, 32.6),
        (108.8, 51.4),
        (118.4, 42.7),
        (113.7, 63.4),
        (103.5, 53.1),
        (101.1, 72.2),
        (96.4, 65.6),
        (114.2, 72.4),
    ];
    for (slot, (x, y)) in frame.iter().enumerate() {
        expected[43 + slot * 2] = x / 120.0;
        expected[43 + slot * 2 + 1] = y / 80.0;
    }

    assert_eq!(vector.len(), expected.len());
    for (cell, (&got, &want)) in vector.iter().zip(expected.iter()).enumerate() {
        assert_eq!(got, want, "cell {cell}");
    }
}

#[test]
fn per_type_blocks_encode_their_declared_features() {
    // Each case: type-specific payload plus the expected (cell, value) pairs.
    let cases: Vec<(Value, Vec<(usize, f64)>)> = vec![
        (
            json!({"type": {"id": 4}, "duel": {"type": {"id": 11}, "outcome": {"id": 16}}}),
            vec![(17, 1.0), (18, 6.0 / 7.0)],
        ),
        (
            json!({"type": {"id": 6}, "block": {"deflection": true, "save_block": true}}),
            vec![(19, 1.0), (20, 0.5), (21, 1.0)],
        ),
        (
            json!({"type": {"id": 9}, "clearance": {"aerial_won": true, "body_part": {"id": 70}}}),
            vec![(22, 1.0), (23, 1.0)],
        ),
        (
            json!({"type": {"id": 10}, "interception": {"outcome": {"id": 4}}}),
            vec![(24, 2.0 / 7.0)],
        ),
        (
            json!({"type": {"id": 14}, "dribble": {"nutmeg": true, "outcome": {"id": 8}}}),
            vec![(25, 0.5), (26, 1.0), (27, 0.5), (28, 0.5)],
        ),
        (
            json!({"type": {"id": 22}, "foul_committed": {
                "type": {"id": 24}, "penalty": true, "card": {"id": 5},
            }}),
            vec![(85, 1.0), (86, 0.5), (87, 0.5), (88, 1.0), (89, 1.0 / 3.0)],
        ),
        (
            json!({"type": {"id": 23}, "goalkeeper": {
                "type": {"id": 33}, "outcome": {"id": 15}, "position": {"id": 44},
                "technique": {"id": 46}, "body_part": {"id": 35},
                "end_location": [6.0, 40.0],
            }}),
            vec![
                (90, 9.0 / 14.0),
                (91, 5.0 / 19.0),
                (92, 1.0),
                (93, 1.0),
                (94, 1.0 / 7.0),
                (95, 0.05),
                (96, 0.5),
            ],
        ),
        (
            json!({"type": {"id": 24}, "bad_behaviour": {"card": {"id": 7}}}),
            vec![(97, 1.0)],
        ),
        (
            json!({"type": {"id": 33}, "50_50": {"outcome": {"id": 3}}}),
            vec![(116, 0.75)],
        ),
        (
            json!({"type": {"id": 38}, "miscontrol": {"aerial_won": true}}),
            vec![(117, 1.0)],
        ),
        (
            json!({"type": {"id": 40}, "injury_stoppage": {"in_chain": true}}),
            vec![(118, 1.0)],
        ),
        (
            json!({"type": {"id": 42}, "ball_receipt": {"outcome": {"id": 9}}}),
            vec![(119, 1.0)],
        ),
        (
            json!({"type": {"id": 43}, "carry": {"end_location": [30.0, 20.0]}}),
            vec![(120, 0.25), (121, 0.25)],
        ),
    ];

    let parser = MatchEventParser::new();
    for (mut event, expectations) in cases {
        let type_id = event["type"]["id"].as_i64().unwrap();
        event["team"] = json!({"id": 216});
        event["player"] = json!({"id": 6611});
        let mut roster = getafe_barcelona_roster();
        let vector = parser.encode_event(&event, &mut roster).unwrap().unwrap();
        for (cell, value) in expectations {
            assert_eq!(vector[cell], value, "type {type_id} cell {cell}");
        }
    }
}

#[test]
fn roster_follows_lineups_shifts_and_substitutions_through_a_stream() {
    let events = vec![
        lineup_event(216, &[(6611, 22), (6612, 1)]),
        lineup_event(217, &[(5503, 23)]),
        json!({
            "type": {"id": 30},
            "period": 1, "minute": 3, "second": 0,
            "team": {"id": 216}, "possession_team": {"id": 216},
            "player": {"id": 6612},
            "location": [40.0, 40.0],
            "pass": {"length": 20.0, "end_location": [60.0, 40.0],
                     "recipient": {"id": 6611}, "height": {"id": 1}},
        }),
        json!({
            "type": {"id": 19},
            "period": 2, "minute": 60, "second": 0,
            "team": {"id": 216}, "player": {"id": 6611},
            "substitution": {"replacement": {"id": 7000}, "outcome": {"id": 102}},
        }),
        // The tactical shift rebuilds team 217 wholesale.
        json!({
            "type": {"id": 36}, "team": {"id": 217},
            "tactics": {"lineup": [{"player": {"id": 5504}, "position": {"id": 10}}]},
        }),
        json!({
            "type": {"id": 43},
            "period": 2, "minute": 61, "second": 0,
            "team": {"id": 217}, "possession_team": {"id": 217},
            "player": {"id": 5504},
            "location": [50.0, 30.0],
            "carry": {"end_location": [55.0, 30.0]},
        }),
    ];

    let mut tokenizer = MatchTokenizer::new();
    let vectors = tokenizer.tokenize(&events).unwrap();
    assert_eq!(vectors.len(), 3);

    // The pass resolves the recipient through the roster.
    assert_eq!(vectors[0][115], 22.0 / 25.0);
    // The substitution event itself still names the outgoing player.
    assert_eq!(vectors[1][14], 22.0 / 25.0);
    // The carry is taken by the player the tactical shift brought on.
    assert_eq!(vectors[2][14], 10.0 / 25.0);

    let roster = tokenizer.roster();
    assert_eq!(roster.position(216, 7000).unwrap(), 22.0 / 25.0);
    assert!(roster.position(216, 6611).is_err());
    assert_eq!(roster.team(217).unwrap().len(), 1);
}

#[test]
fn missing_optional_values_encode_their_declared_defaults() {
    let parser = MatchEventParser::new();
    let mut roster = getafe_barcelona_roster();

    // A pass without an angle sits at the middle of the symmetric range.
    let pass = json!({
        "type": {"id": 30},
        "team": {"id": 216}, "player": {"id": 6611},
        "location": [60.0, 40.0],
        "pass": {"length": 20.0, "end_location": [80.0, 40.0], "height": {"id": 1}},
    });
    let vector = parser.encode_event(&pass, &mut roster).unwrap().unwrap();
    assert_eq!(vector[100], 0.5); // pass.angle
    assert_eq!(vector[115], 0.0); // no recipient
    assert_eq!(vector[104], 0.5); // pass.backheel, missing boolean

    // A foul without a card leaves the categorical absent.
    let foul = json!({
        "type": {"id": 22},
        "team": {"id": 216}, "player": {"id": 6611},
        "foul_committed": {"advantage": true},
    });
    let vector = parser.encode_event(&foul, &mut roster).unwrap().unwrap();
    assert_eq!(vector[89], 0.0); // foul_committed.card.id
    assert_eq!(vector[87], 1.0); // foul_committed.advantage
}

#[test]
fn tokenized_matches_validate_clean() {
    let events = vec![
        lineup_event(216, &[(6611, 22), (6612, 1)]),
        lineup_event(217, &[(5503, 23)]),
        json!({
            "type": {"id": 30}, "play_pattern": {"id": 1},
            "period": 1, "minute": 5, "second": 5,
            "team": {"id": 216}, "possession_team": {"id": 216},
            "player": {"id": 6612},
            "location": [80.0, 44.0],
            "pass": {"length": 24.0, "end_location": [103.7, 48.2],
                     "recipient": {"id": 6611}, "height": {"id": 1}},
        }),
        reference_shot(),
    ];

    let vectors = tokenize_match(&events).unwrap();
    assert_eq!(vectors.len(), 2);

    for strictness in [Strictness::Lenient, Strictness::Moderate, Strictness::Strict] {
        let report = Validator::new(strictness).validate_sequence(&vectors);
        assert!(report.valid, "{strictness:?}: {:?}", report);
        assert_eq!(report.score, 1.0, "{strictness:?}");
    }
}
