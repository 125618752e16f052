//! # Party Stats
//!
//! Records sessions of a two-sided party game (villains against kind
//! players) and derives statistics from them.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (players, games, participations, reports)
//! - **storage**: JSONL ledger on disk and the `DataSource` seam
//! - **calculate**: Cross-tab, partner summaries, leaderboards, game detail
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod config;
pub mod models;
pub mod storage;

pub use models::*;
