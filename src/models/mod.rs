//! Core data models for the party-game ledger.

mod game;
mod ids;
mod participation;
mod player;
mod role;
mod stats;

pub use game::*;
pub use ids::*;
pub use participation::*;
pub use player::*;
pub use role::*;
pub use stats::*;
