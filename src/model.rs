use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub league: String,
    #[serde(default)]
    pub founded: Option<u16>,
    #[serde(default)]
    pub stadium: Option<String>,
    #[serde(default)]
    pub coach: Option<String>,
}

/// The closed set of on-pitch positions. Anything else buckets to the
/// `Unknown` slot of the distribution rather than being dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Forward,
    Midfielder,
    Defender,
    Goalkeeper,
}

impl Position {
    /// Loose text parser for position labels seen in provider feeds.
    pub fn from_label(raw: &str) -> Option<Position> {
        let s = raw.trim().to_lowercase();
        if s.contains("goalkeeper") || s.contains("keeper") || s == "gk" {
            return Some(Position::Goalkeeper);
        }
        if s.contains("defender") || s.contains("back") {
            return Some(Position::Defender);
        }
        if s.contains("midfield") {
            return Some(Position::Midfielder);
        }
        if s.contains("forward") || s.contains("striker") || s.contains("attacker") || s.contains("wing") {
            return Some(Position::Forward);
        }
        None
    }
}

/// Distribution key: recognized positions plus the sentinel bucket for
/// players with no (or an unrecognized) position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PositionBucket {
    Forward,
    Midfielder,
    Defender,
    Goalkeeper,
    Unknown,
}

impl PositionBucket {
    pub fn from_position(position: Option<Position>) -> PositionBucket {
        match position {
            Some(Position::Forward) => PositionBucket::Forward,
            Some(Position::Midfielder) => PositionBucket::Midfielder,
            Some(Position::Defender) => PositionBucket::Defender,
            Some(Position::Goalkeeper) => PositionBucket::Goalkeeper,
            None => PositionBucket::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PositionBucket::Forward => "Forward",
            PositionBucket::Midfielder => "Midfielder",
            PositionBucket::Defender => "Defender",
            PositionBucket::Goalkeeper => "Goalkeeper",
            PositionBucket::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub name: String,
    /// Weak reference: a player may exist without a team, and the referenced
    /// team is not required to be part of the snapshot.
    #[serde(default)]
    pub team_id: Option<u32>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default, deserialize_with = "null_to_zero")]
    pub goals: u32,
    #[serde(default, deserialize_with = "null_to_zero")]
    pub assists: u32,
    #[serde(default, deserialize_with = "null_to_zero")]
    pub matches_played: u32,
    #[serde(default, deserialize_with = "null_to_zero")]
    pub yellow_cards: u32,
    #[serde(default, deserialize_with = "null_to_zero")]
    pub red_cards: u32,
    #[serde(default)]
    pub market_value: Option<f64>,
}

// Provider feeds serialize absent counters as explicit nulls.
fn null_to_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Completed,
    Postponed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub home_id: u32,
    pub away_id: u32,
    /// ISO-8601; string ordering is chronological for well-formed feeds.
    pub utc_time: String,
    pub status: MatchStatus,
    #[serde(default)]
    pub home_goals: Option<u32>,
    #[serde(default)]
    pub away_goals: Option<u32>,
    pub league: String,
    pub season: String,
}

impl Match {
    /// Both scores, available only for completed matches.
    pub fn final_score(&self) -> Option<(u32, u32)> {
        if self.status != MatchStatus::Completed {
            return None;
        }
        match (self.home_goals, self.away_goals) {
            (Some(h), Some(a)) => Some((h, a)),
            _ => None,
        }
    }
}

/// One outcome forecast for a match. Created once, never mutated; the store
/// removes it when its match is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Assigned by the store on insert.
    #[serde(default)]
    pub id: Option<i64>,
    pub match_id: String,
    pub home_score: f64,
    pub away_score: f64,
    pub p_home: f64,
    pub p_draw: f64,
    pub p_away: f64,
    pub key_factors: Vec<String>,
    pub analysis: String,
    pub created_at: String,
}

impl Prediction {
    pub fn probabilities(&self) -> [f64; 3] {
        [self.p_home, self.p_draw, self.p_away]
    }

    /// The leading probability, on the 0-100 scale.
    pub fn confidence(&self) -> f64 {
        self.p_home.max(self.p_draw).max(self.p_away)
    }
}

/// Immutable point-in-time view of the entity collections. Every aggregation
/// and prediction call receives one of these explicitly; nothing is cached at
/// module level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub matches: Vec<Match>,
}

impl Snapshot {
    pub fn team(&self, id: u32) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn team_name(&self, id: u32) -> Option<&str> {
        self.team(id).map(|t| t.name.as_str())
    }

    pub fn team_names(&self) -> HashMap<u32, &str> {
        self.teams.iter().map(|t| (t.id, t.name.as_str())).collect()
    }
}

/// Checks the structural invariants a persistence collaborator is supposed to
/// uphold. Returns the first violation with the offending identifiers.
pub fn validate_snapshot(snapshot: &Snapshot) -> Result<(), Error> {
    for player in &snapshot.players {
        if let Some(value) = player.market_value {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::malformed(
                    "player",
                    player.id,
                    format!("market value {value} must be a non-negative number"),
                ));
            }
        }
    }

    for m in &snapshot.matches {
        if m.home_id == m.away_id {
            return Err(Error::malformed(
                "match",
                &m.id,
                format!("home and away team are both {}", m.home_id),
            ));
        }
        for team_id in [m.home_id, m.away_id] {
            if snapshot.team(team_id).is_none() {
                return Err(Error::malformed(
                    "match",
                    &m.id,
                    format!("references team {team_id} missing from the snapshot"),
                ));
            }
        }
        let has_scores = m.home_goals.is_some() && m.away_goals.is_some();
        match m.status {
            MatchStatus::Completed if !has_scores => {
                return Err(Error::malformed("match", &m.id, "completed without scores"));
            }
            MatchStatus::Scheduled | MatchStatus::Postponed
                if m.home_goals.is_some() || m.away_goals.is_some() =>
            {
                return Err(Error::malformed(
                    "match",
                    &m.id,
                    "scores present before completion",
                ));
            }
            _ => {}
        }
    }

    Ok(())
}
