use thiserror::Error;

/// Failures surfaced by the prediction generator, snapshot validation and the
/// prediction store. Aggregation functions are total and never produce these.
#[derive(Debug, Error)]
pub enum Error {
    #[error("home and away team must differ (match {match_id}, team {team_id})")]
    InvalidPair { match_id: String, team_id: u32 },

    #[error("a prediction already exists for match {match_id}")]
    DuplicatePrediction { match_id: String },

    #[error("malformed {entity} record {id}: {reason}")]
    MalformedInput {
        entity: &'static str,
        id: String,
        reason: String,
    },

    #[error("team {team_id} is not part of the snapshot")]
    UnknownTeam { team_id: u32 },

    #[error("prediction store failure")]
    Store(#[from] rusqlite::Error),
}

impl Error {
    pub fn malformed(entity: &'static str, id: impl ToString, reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            entity,
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
