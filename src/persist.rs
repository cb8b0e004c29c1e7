//! Versioned JSON snapshot files. The persistence collaborator (or a fixture
//! in tests) hands the core a point-in-time snapshot; this module is the file
//! form of that hand-off.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::model::{Match, Player, Snapshot, Team};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    teams: Vec<Team>,
    players: Vec<Player>,
    matches: Vec<Match>,
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read snapshot {}", path.display()))?;
    let file: SnapshotFile = serde_json::from_str(&raw)
        .with_context(|| format!("parse snapshot {}", path.display()))?;
    if file.version != SNAPSHOT_VERSION {
        return Err(anyhow!(
            "snapshot version {} is not supported (expected {SNAPSHOT_VERSION})",
            file.version
        ));
    }
    Ok(Snapshot {
        teams: file.teams,
        players: file.players,
        matches: file.matches,
    })
}

pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    let file = SnapshotFile {
        version: SNAPSHOT_VERSION,
        teams: snapshot.teams.clone(),
        players: snapshot.players.clone(),
        matches: snapshot.matches.clone(),
    };
    let raw = serde_json::to_string_pretty(&file).context("encode snapshot")?;
    fs::write(path, raw).with_context(|| format!("write snapshot {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MatchStatus, Position};

    #[test]
    fn snapshot_round_trips_through_disk() {
        let dir = std::env::temp_dir().join("matchcast-persist-test");
        let path = dir.join("snapshot.json");
        let snapshot = Snapshot {
            teams: vec![Team {
                id: 1,
                name: "Alpha".to_string(),
                league: "Premier League".to_string(),
                founded: Some(1892),
                stadium: None,
                coach: None,
            }],
            players: vec![Player {
                id: 10,
                name: "Ada".to_string(),
                team_id: Some(1),
                position: Some(Position::Forward),
                goals: 7,
                assists: 2,
                matches_played: 11,
                yellow_cards: 1,
                red_cards: 0,
                market_value: Some(4_500_000.0),
            }],
            matches: vec![Match {
                id: "m1".to_string(),
                home_id: 1,
                away_id: 2,
                utc_time: "2026-02-07T15:00:00Z".to_string(),
                status: MatchStatus::Scheduled,
                home_goals: None,
                away_goals: None,
                league: "Premier League".to_string(),
                season: "2025/2026".to_string(),
            }],
        };

        save_snapshot(&path, &snapshot).unwrap();
        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded.teams.len(), 1);
        assert_eq!(loaded.players[0].goals, 7);
        assert_eq!(loaded.matches[0].status, MatchStatus::Scheduled);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn version_mismatch_is_an_error() {
        let dir = std::env::temp_dir().join("matchcast-persist-version-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("snapshot.json");
        fs::write(&path, r#"{"version":99,"teams":[],"players":[],"matches":[]}"#).unwrap();
        assert!(load_snapshot(&path).is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
