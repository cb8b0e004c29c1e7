use std::fs;
use std::path::PathBuf;

use matchcast::error::Error;
use matchcast::model::Prediction;
use matchcast::store::{PredictionStore, SqliteStore};

fn temp_db(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("matchcast-store-tests");
    fs::create_dir_all(&dir).ok();
    let path = dir.join(name);
    fs::remove_file(&path).ok();
    path
}

fn sample(match_id: &str) -> Prediction {
    Prediction {
        id: None,
        match_id: match_id.to_string(),
        home_score: 2.35,
        away_score: 1.02,
        p_home: 48.5,
        p_draw: 27.25,
        p_away: 24.25,
        key_factors: vec![
            "Home advantage".to_string(),
            "Strong recent form".to_string(),
            "Favorable head-to-head record".to_string(),
        ],
        analysis: "Alpha United is predicted to win with 48.5% win probability due to strong home form and historical advantage.".to_string(),
        created_at: "2026-03-01T12:00:00+00:00".to_string(),
    }
}

#[test]
fn insert_then_load_preserves_every_field() {
    let path = temp_db("round_trip.sqlite");
    let mut store = SqliteStore::open(&path).unwrap();

    let id = store.insert(&sample("match-1")).unwrap();
    let loaded = store.for_match("match-1").unwrap().expect("row stored");

    assert_eq!(loaded.id, Some(id));
    assert_eq!(loaded.match_id, "match-1");
    assert_eq!(loaded.home_score, 2.35);
    assert_eq!(loaded.away_score, 1.02);
    assert_eq!(loaded.probabilities(), [48.5, 27.25, 24.25]);
    assert_eq!(loaded.key_factors.len(), 3);
    assert_eq!(loaded.created_at, "2026-03-01T12:00:00+00:00");
    fs::remove_file(&path).ok();
}

#[test]
fn uniqueness_is_enforced_by_the_database_not_the_caller() {
    let path = temp_db("uniqueness.sqlite");
    {
        let mut first = SqliteStore::open(&path).unwrap();
        first.insert(&sample("match-2")).unwrap();
    }

    // A second handle that never ran the advisory check still cannot insert:
    // the UNIQUE constraint is the invariant, not in-process state.
    let mut second = SqliteStore::open(&path).unwrap();
    assert!(second.contains("match-2").unwrap());
    let err = second.insert(&sample("match-2")).unwrap_err();
    assert!(matches!(err, Error::DuplicatePrediction { .. }));
    fs::remove_file(&path).ok();
}

#[test]
fn delete_for_match_cascades_and_frees_the_slot() {
    let path = temp_db("cascade.sqlite");
    let mut store = SqliteStore::open(&path).unwrap();

    store.insert(&sample("match-3")).unwrap();
    assert!(store.delete_for_match("match-3").unwrap());
    assert!(!store.contains("match-3").unwrap());
    assert!(!store.delete_for_match("match-3").unwrap());

    // With the old prediction gone, the match can be forecast again.
    store.insert(&sample("match-3")).unwrap();
    fs::remove_file(&path).ok();
}

#[test]
fn all_lists_predictions_in_insert_order() {
    let path = temp_db("listing.sqlite");
    let mut store = SqliteStore::open(&path).unwrap();

    store.insert(&sample("match-a")).unwrap();
    store.insert(&sample("match-b")).unwrap();
    store.insert(&sample("match-c")).unwrap();

    let rows = store.all().unwrap();
    let ids: Vec<&str> = rows.iter().map(|p| p.match_id.as_str()).collect();
    assert_eq!(ids, vec!["match-a", "match-b", "match-c"]);
    fs::remove_file(&path).ok();
}
