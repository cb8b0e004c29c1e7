//! Pure transformations from an entity snapshot into display-ready views.
//! Every function here is total: empty input yields empty output or zero
//! totals, never an error.

use std::collections::HashMap;

use crate::model::{Match, MatchStatus, Player, PositionBucket, Snapshot, Team};

/// Sentinel league selector that keeps every entity.
pub const ALL_LEAGUES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMetric {
    Goals,
    Assists,
    MatchesPlayed,
}

impl RankMetric {
    pub fn value_of(&self, player: &Player) -> u32 {
        match self {
            RankMetric::Goals => player.goals,
            RankMetric::Assists => player.assists,
            RankMetric::MatchesPlayed => player.matches_played,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RankMetric::Goals => "Goals",
            RankMetric::Assists => "Assists",
            RankMetric::MatchesPlayed => "Matches Played",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    pub player_id: u32,
    pub name: String,
    /// Resolved team name, when the player's weak team reference resolves.
    pub team: Option<String>,
    pub value: u32,
}

/// Ranks players by `metric`, descending. Players whose value is 0 are left
/// out. Ties order by case-insensitive name, then by id, so the ranking is
/// reproducible regardless of input order.
pub fn rank_by_metric(snapshot: &Snapshot, metric: RankMetric, limit: usize) -> Vec<LeaderboardRow> {
    rank_by_metric_filtered(snapshot, metric, limit, |_| true)
}

/// Same as [`rank_by_metric`] with an extra caller-supplied filter, applied
/// before the value > 0 cut.
pub fn rank_by_metric_filtered(
    snapshot: &Snapshot,
    metric: RankMetric,
    limit: usize,
    keep: impl Fn(&Player) -> bool,
) -> Vec<LeaderboardRow> {
    let names = snapshot.team_names();
    let mut rows: Vec<LeaderboardRow> = snapshot
        .players
        .iter()
        .filter(|p| keep(p))
        .filter_map(|p| {
            let value = metric.value_of(p);
            if value == 0 {
                return None;
            }
            Some(LeaderboardRow {
                player_id: p.id,
                name: p.name.clone(),
                team: resolve_team(&names, p),
                value,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.value
            .cmp(&a.value)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
    rows.truncate(limit);
    rows
}

/// Counts players per position. Players without a recognized position land in
/// the `Unknown` bucket; buckets with zero players are absent from the map.
pub fn position_distribution(players: &[Player]) -> HashMap<PositionBucket, usize> {
    let mut counts: HashMap<PositionBucket, usize> = HashMap::new();
    for player in players {
        *counts
            .entry(PositionBucket::from_position(player.position))
            .or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceRow {
    pub player_id: u32,
    pub name: String,
    pub team: Option<String>,
    pub goals: u32,
    pub assists: u32,
    pub total: u32,
}

/// Combined goal-contribution ranking: players with at least one goal or
/// assist, ordered by goals + assists with the leaderboard tie-break rule.
pub fn performance_index(snapshot: &Snapshot, limit: usize) -> Vec<PerformanceRow> {
    let names = snapshot.team_names();
    let mut rows: Vec<PerformanceRow> = snapshot
        .players
        .iter()
        .filter(|p| p.goals > 0 || p.assists > 0)
        .map(|p| PerformanceRow {
            player_id: p.id,
            name: p.name.clone(),
            team: resolve_team(&names, p),
            goals: p.goals,
            assists: p.assists,
            total: p.goals + p.assists,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
    rows.truncate(limit);
    rows
}

fn resolve_team(names: &HashMap<u32, &str>, player: &Player) -> Option<String> {
    player
        .team_id
        .and_then(|id| names.get(&id).map(|n| (*n).to_string()))
}

pub trait LeagueTagged {
    fn league(&self) -> &str;
}

impl LeagueTagged for Team {
    fn league(&self) -> &str {
        &self.league
    }
}

impl LeagueTagged for Match {
    fn league(&self) -> &str {
        &self.league
    }
}

/// Retains entities whose league label matches `selector` exactly
/// (case-sensitive). The sentinel `"all"` returns the input unchanged.
pub fn filter_league<'a, T: LeagueTagged>(items: &'a [T], selector: &str) -> Vec<&'a T> {
    if selector == ALL_LEAGUES {
        return items.iter().collect();
    }
    items.iter().filter(|item| item.league() == selector).collect()
}

pub fn matches_with_status(matches: &[Match], status: MatchStatus) -> Vec<&Match> {
    matches.iter().filter(|m| m.status == status).collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchTotals {
    pub total_goals: u32,
    pub average_goals_per_match: f64,
}

/// Sums goals over completed matches with both scores present. The average is
/// 0.0 when no match qualifies.
pub fn match_summary(matches: &[Match]) -> MatchTotals {
    let mut total_goals = 0u32;
    let mut counted = 0usize;
    for m in matches {
        if let Some((home, away)) = m.final_score() {
            total_goals += home + away;
            counted += 1;
        }
    }
    let average_goals_per_match = if counted == 0 {
        0.0
    } else {
        f64::from(total_goals) / counted as f64
    };
    MatchTotals {
        total_goals,
        average_goals_per_match,
    }
}

/// Per-team results summary over completed matches, the feature input the
/// prediction strategies consume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamForm {
    pub team_id: u32,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl TeamForm {
    pub fn win_rate(&self) -> f64 {
        if self.played == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.played)
        }
    }

    pub fn avg_goals_for(&self) -> f64 {
        if self.played == 0 {
            0.0
        } else {
            f64::from(self.goals_for) / f64::from(self.played)
        }
    }

    pub fn avg_goals_against(&self) -> f64 {
        if self.played == 0 {
            0.0
        } else {
            f64::from(self.goals_against) / f64::from(self.played)
        }
    }
}

pub fn team_form(snapshot: &Snapshot, team_id: u32) -> TeamForm {
    let mut form = TeamForm {
        team_id,
        played: 0,
        wins: 0,
        draws: 0,
        losses: 0,
        goals_for: 0,
        goals_against: 0,
    };

    for m in &snapshot.matches {
        let Some((home_goals, away_goals)) = m.final_score() else {
            continue;
        };
        let (scored, conceded) = if m.home_id == team_id {
            (home_goals, away_goals)
        } else if m.away_id == team_id {
            (away_goals, home_goals)
        } else {
            continue;
        };

        form.played += 1;
        form.goals_for += scored;
        form.goals_against += conceded;
        if scored > conceded {
            form.wins += 1;
        } else if scored < conceded {
            form.losses += 1;
        } else {
            form.draws += 1;
        }
    }

    form
}
