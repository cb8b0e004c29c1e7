use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use matchcast::aggregate::{self, ALL_LEAGUES, RankMetric};
use matchcast::export;
use matchcast::model::{Match, validate_snapshot};
use matchcast::persist;
use matchcast::predict::PredictionEngine;
use matchcast::store::{PredictionStore, SqliteStore};

const DEFAULT_DB: &str = "matchcast.sqlite";
const DEFAULT_LIMIT: usize = 5;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let snapshot_path = parse_path_arg("--snapshot")
        .or_else(|| std::env::var("MATCHCAST_SNAPSHOT").ok().map(PathBuf::from))
        .context("no snapshot given; pass --snapshot <file> or set MATCHCAST_SNAPSHOT")?;

    let snapshot = persist::load_snapshot(&snapshot_path)?;
    validate_snapshot(&snapshot)?;

    let league = parse_string_arg("--league").unwrap_or_else(|| ALL_LEAGUES.to_string());
    let limit = parse_string_arg("--limit")
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(DEFAULT_LIMIT);

    let matches: Vec<Match> = aggregate::filter_league(&snapshot.matches, &league)
        .into_iter()
        .cloned()
        .collect();

    println!(
        "Snapshot: {} teams, {} players, {} matches (league: {league})",
        snapshot.teams.len(),
        snapshot.players.len(),
        matches.len()
    );

    for metric in [RankMetric::Goals, RankMetric::Assists, RankMetric::MatchesPlayed] {
        println!("\nTop {} by {}:", limit, metric.label());
        let rows = aggregate::rank_by_metric(&snapshot, metric, limit);
        if rows.is_empty() {
            println!("  (no players with a non-zero value)");
        }
        for (idx, row) in rows.iter().enumerate() {
            println!(
                "  {}. {} ({}) - {}",
                idx + 1,
                row.name,
                row.team.as_deref().unwrap_or("free agent"),
                row.value
            );
        }
    }

    println!("\nPosition distribution:");
    let distribution = aggregate::position_distribution(&snapshot.players);
    let mut buckets: Vec<_> = distribution.into_iter().collect();
    buckets.sort_by_key(|(bucket, _)| *bucket);
    for (bucket, count) in buckets {
        println!("  {}: {count}", bucket.label());
    }

    let totals = aggregate::match_summary(&matches);
    println!(
        "\nCompleted-match totals: {} goals, {:.2} per match",
        totals.total_goals, totals.average_goals_per_match
    );

    if let Some((match_id, home_id, away_id)) = parse_forecast_args()? {
        let db_path = parse_path_arg("--db")
            .or_else(|| std::env::var("MATCHCAST_DB").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB));
        let mut store = SqliteStore::open(&db_path)?;

        let engine = PredictionEngine::default();
        let prediction = engine.generate(&snapshot, &store, &match_id, home_id, away_id)?;
        let id = store.insert(&prediction)?;

        println!("\nForecast #{id} for match {match_id}:");
        println!(
            "  predicted score {:.2} - {:.2}",
            prediction.home_score, prediction.away_score
        );
        println!(
            "  probabilities H {:.2}% / D {:.2}% / A {:.2}% (confidence {:.2}%)",
            prediction.p_home,
            prediction.p_draw,
            prediction.p_away,
            prediction.confidence()
        );
        println!("  key factors: {}", prediction.key_factors.join(", "));
        println!("  {}", prediction.analysis);
    }

    if let Some(export_path) = parse_path_arg("--export") {
        let report = export::export_dashboard(&export_path, &snapshot, limit)?;
        println!(
            "\nExported {} scorer rows, {} assist rows, {} performance rows, {} position rows to {}",
            report.scorer_rows,
            report.assist_rows,
            report.performance_rows,
            report.position_rows,
            export_path.display()
        );
    }

    Ok(())
}

fn parse_forecast_args() -> Result<Option<(String, u32, u32)>> {
    let match_id = parse_string_arg("--match");
    let home = parse_string_arg("--home");
    let away = parse_string_arg("--away");
    match (match_id, home, away) {
        (None, None, None) => Ok(None),
        (Some(match_id), Some(home), Some(away)) => {
            let home_id = home
                .parse::<u32>()
                .map_err(|_| anyhow!("--home expects a team id, got {home}"))?;
            let away_id = away
                .parse::<u32>()
                .map_err(|_| anyhow!("--away expects a team id, got {away}"))?;
            Ok(Some((match_id, home_id, away_id)))
        }
        _ => Err(anyhow!("--match, --home and --away must be given together")),
    }
}

fn parse_path_arg(flag: &str) -> Option<PathBuf> {
    parse_string_arg(flag).map(PathBuf::from)
}

fn parse_string_arg(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
