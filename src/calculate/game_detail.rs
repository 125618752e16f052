//! Single game view: who sat where and who won.

use super::snapshot::Snapshot;
use super::StatsError;
use crate::models::{GameDetail, GameId, GameSeat};

/// Participants of `game_id` ordered by name, each marked as winner or not.
pub fn compute_game_detail(snapshot: &Snapshot, game_id: GameId) -> Result<GameDetail, StatsError> {
    let game = snapshot
        .game(game_id)
        .ok_or(StatsError::GameNotFound(game_id))?;

    let mut participants: Vec<GameSeat> = snapshot
        .roster(game_id)
        .into_iter()
        .flatten()
        .map(|(&player_id, seat)| GameSeat {
            player_id,
            name: snapshot.name_of(player_id),
            role: seat.role,
            info: seat.info,
            is_winner: game.is_won_by(seat.role),
        })
        .collect();
    participants.sort_by(|a, b| a.name.cmp(&b.name).then(a.player_id.cmp(&b.player_id)));

    Ok(GameDetail {
        game: game.clone(),
        master_name: game.master.and_then(|m| snapshot.player(m)).map(|p| p.name.clone()),
        participants,
    })
}
