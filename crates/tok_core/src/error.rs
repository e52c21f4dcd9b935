use thiserror::Error;

/// Errors raised while encoding a match's event stream.
///
/// Roster lookup failures are deliberately fatal to the match being encoded:
/// they mean the feed is structurally incomplete (a lineup or substitution
/// event is missing upstream), which is not something the encoder can paper
/// over with a default value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenizeError {
    #[error("unknown event type id: {id}")]
    UnknownEventType { id: i64 },

    #[error("event is missing required field `{path}`")]
    MissingField { path: &'static str },

    #[error("team {team_id} is not in the match roster")]
    TeamNotInRoster { team_id: i64 },

    #[error("player {player_id} is not in the roster of team {team_id}")]
    PlayerNotInRoster { team_id: i64, player_id: i64 },
}

pub type Result<T> = std::result::Result<T, TokenizeError>;
