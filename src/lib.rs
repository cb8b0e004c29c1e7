//! Analytics and prediction core for a football statistics app.
//!
//! `aggregate` turns entity snapshots into display-ready views (leaderboards,
//! position distributions, scoring totals). `predict` synthesizes a single
//! normalized outcome forecast per match, with the scoring heuristic behind a
//! swappable strategy trait. Persistence of forecasts goes through `store`,
//! which owns the one-prediction-per-match constraint.

pub mod aggregate;
pub mod error;
pub mod export;
pub mod model;
pub mod persist;
pub mod predict;
pub mod store;
