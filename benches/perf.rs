use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use matchcast::aggregate::{RankMetric, match_summary, position_distribution, rank_by_metric};
use matchcast::model::{Match, MatchStatus, Player, Position, Snapshot, Team};
use matchcast::predict::PredictionEngine;
use matchcast::store::MemoryStore;

fn sample_snapshot(players: u32, matches: u32) -> Snapshot {
    let teams: Vec<Team> = (1..=20)
        .map(|id| Team {
            id,
            name: format!("Team {id}"),
            league: "Premier League".to_string(),
            founded: None,
            stadium: None,
            coach: None,
        })
        .collect();

    let positions = [
        Some(Position::Forward),
        Some(Position::Midfielder),
        Some(Position::Defender),
        Some(Position::Goalkeeper),
        None,
    ];
    let players: Vec<Player> = (1..=players)
        .map(|id| Player {
            id,
            name: format!("Player {id}"),
            team_id: Some(id % 20 + 1),
            position: positions[(id % 5) as usize],
            goals: id % 23,
            assists: id % 11,
            matches_played: 10 + id % 28,
            yellow_cards: id % 6,
            red_cards: id % 2,
            market_value: Some(f64::from(id) * 10_000.0),
        })
        .collect();

    let matches: Vec<Match> = (1..=matches)
        .map(|n| Match {
            id: format!("m{n}"),
            home_id: n % 20 + 1,
            away_id: (n + 7) % 20 + 1,
            utc_time: format!("2026-01-{:02}T15:00:00Z", n % 28 + 1),
            status: MatchStatus::Completed,
            home_goals: Some(n % 4),
            away_goals: Some((n + 1) % 3),
            league: "Premier League".to_string(),
            season: "2025/2026".to_string(),
        })
        .collect();

    Snapshot { teams, players, matches }
}

fn bench_rank_by_metric(c: &mut Criterion) {
    let snapshot = sample_snapshot(2_000, 0);
    c.bench_function("rank_by_metric_2000", |b| {
        b.iter(|| {
            let rows = rank_by_metric(black_box(&snapshot), RankMetric::Goals, 10);
            black_box(rows.len());
        })
    });
}

fn bench_position_distribution(c: &mut Criterion) {
    let snapshot = sample_snapshot(2_000, 0);
    c.bench_function("position_distribution_2000", |b| {
        b.iter(|| {
            let counts = position_distribution(black_box(&snapshot.players));
            black_box(counts.len());
        })
    });
}

fn bench_match_summary(c: &mut Criterion) {
    let snapshot = sample_snapshot(0, 1_000);
    c.bench_function("match_summary_1000", |b| {
        b.iter(|| {
            let totals = match_summary(black_box(&snapshot.matches));
            black_box(totals.total_goals);
        })
    });
}

fn bench_generate(c: &mut Criterion) {
    let snapshot = sample_snapshot(0, 500);
    let engine = PredictionEngine::default();
    let store = MemoryStore::new();
    c.bench_function("generate_forecast", |b| {
        b.iter(|| {
            let prediction = engine
                .generate(black_box(&snapshot), &store, "bench-match", 1, 2)
                .unwrap();
            black_box(prediction.p_home);
        })
    });
}

criterion_group!(
    benches,
    bench_rank_by_metric,
    bench_position_distribution,
    bench_match_summary,
    bench_generate
);
criterion_main!(benches);
