//! Prediction persistence. The generator runs an advisory duplicate check
//! through [`PredictionStore::contains`]; the SQLite implementation also
//! enforces the one-prediction-per-match invariant with a UNIQUE constraint,
//! so two racing generate-then-insert sequences collapse to a single winner.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use crate::error::Error;
use crate::model::Prediction;

pub trait PredictionStore {
    fn contains(&self, match_id: &str) -> Result<bool, Error>;
    /// Inserts and returns the assigned id. Rejects a second prediction for
    /// the same match with [`Error::DuplicatePrediction`].
    fn insert(&mut self, prediction: &Prediction) -> Result<i64, Error>;
    fn for_match(&self, match_id: &str) -> Result<Option<Prediction>, Error>;
    /// Cascade hook: removes the prediction when its match is deleted.
    /// Returns whether anything was removed.
    fn delete_for_match(&mut self, match_id: &str) -> Result<bool, Error>;
    fn all(&self) -> Result<Vec<Prediction>, Error>;
}

/// HashMap-backed store for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    predictions: HashMap<String, Prediction>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PredictionStore for MemoryStore {
    fn contains(&self, match_id: &str) -> Result<bool, Error> {
        Ok(self.predictions.contains_key(match_id))
    }

    fn insert(&mut self, prediction: &Prediction) -> Result<i64, Error> {
        if self.predictions.contains_key(&prediction.match_id) {
            return Err(Error::DuplicatePrediction {
                match_id: prediction.match_id.clone(),
            });
        }
        self.next_id += 1;
        let mut stored = prediction.clone();
        stored.id = Some(self.next_id);
        self.predictions.insert(prediction.match_id.clone(), stored);
        Ok(self.next_id)
    }

    fn for_match(&self, match_id: &str) -> Result<Option<Prediction>, Error> {
        Ok(self.predictions.get(match_id).cloned())
    }

    fn delete_for_match(&mut self, match_id: &str) -> Result<bool, Error> {
        Ok(self.predictions.remove(match_id).is_some())
    }

    fn all(&self) -> Result<Vec<Prediction>, Error> {
        let mut out: Vec<Prediction> = self.predictions.values().cloned().collect();
        out.sort_by_key(|p| p.id);
        Ok(out)
    }
}

/// SQLite-backed store. The `match_id` UNIQUE constraint is what makes the
/// duplicate check atomic with respect to concurrent inserts.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        info!(path = %path.display(), "opened prediction store");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn init_schema(conn: &Connection) -> Result<(), Error> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS predictions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            match_id TEXT NOT NULL UNIQUE,
            home_score REAL NOT NULL,
            away_score REAL NOT NULL,
            p_home REAL NOT NULL,
            p_draw REAL NOT NULL,
            p_away REAL NOT NULL,
            key_factors TEXT NOT NULL,
            analysis TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn row_to_prediction(row: &rusqlite::Row<'_>) -> rusqlite::Result<Prediction> {
    let factors_json: String = row.get(7)?;
    Ok(Prediction {
        id: Some(row.get(0)?),
        match_id: row.get(1)?,
        home_score: row.get(2)?,
        away_score: row.get(3)?,
        p_home: row.get(4)?,
        p_draw: row.get(5)?,
        p_away: row.get(6)?,
        key_factors: serde_json::from_str(&factors_json).unwrap_or_default(),
        analysis: row.get(8)?,
        created_at: row.get(9)?,
    })
}

const PREDICTION_COLUMNS: &str =
    "id, match_id, home_score, away_score, p_home, p_draw, p_away, key_factors, analysis, created_at";

impl PredictionStore for SqliteStore {
    fn contains(&self, match_id: &str) -> Result<bool, Error> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM predictions WHERE match_id = ?1",
                params![match_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert(&mut self, prediction: &Prediction) -> Result<i64, Error> {
        let factors_json =
            serde_json::to_string(&prediction.key_factors).unwrap_or_else(|_| "[]".to_string());
        let inserted = self.conn.execute(
            "INSERT INTO predictions
                (match_id, home_score, away_score, p_home, p_draw, p_away, key_factors, analysis, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                prediction.match_id,
                prediction.home_score,
                prediction.away_score,
                prediction.p_home,
                prediction.p_draw,
                prediction.p_away,
                factors_json,
                prediction.analysis,
                prediction.created_at,
            ],
        );
        match inserted {
            Ok(_) => {
                let id = self.conn.last_insert_rowid();
                debug!(match_id = %prediction.match_id, id, "stored prediction");
                Ok(id)
            }
            Err(err) if is_unique_violation(&err) => Err(Error::DuplicatePrediction {
                match_id: prediction.match_id.clone(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn for_match(&self, match_id: &str) -> Result<Option<Prediction>, Error> {
        let found = self
            .conn
            .query_row(
                &format!("SELECT {PREDICTION_COLUMNS} FROM predictions WHERE match_id = ?1"),
                params![match_id],
                row_to_prediction,
            )
            .optional()?;
        Ok(found)
    }

    fn delete_for_match(&mut self, match_id: &str) -> Result<bool, Error> {
        let removed = self.conn.execute(
            "DELETE FROM predictions WHERE match_id = ?1",
            params![match_id],
        )?;
        if removed > 0 {
            debug!(match_id, "cascaded prediction delete");
        }
        Ok(removed > 0)
    }

    fn all(&self) -> Result<Vec<Prediction>, Error> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PREDICTION_COLUMNS} FROM predictions ORDER BY id ASC"))?;
        let rows = stmt.query_map([], row_to_prediction)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
