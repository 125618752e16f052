//! In-memory indexes over one consistent read of the ledger.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use super::StatsError;
use crate::models::{Game, GameId, InfoTag, Participation, Player, PlayerId, Role};
use crate::storage::{DataSource, ParticipationFilter};

static NO_GAMES: BTreeSet<GameId> = BTreeSet::new();

/// What one player did in one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seat {
    pub role: Role,
    pub info: InfoTag,
}

/// Indexed view of players, games and participations.
///
/// Built once per report and dropped afterwards.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Players ordered by name, then id
    players: Vec<Player>,
    player_index: HashMap<PlayerId, usize>,
    games: HashMap<GameId, Game>,
    game_ids_by_player: HashMap<PlayerId, BTreeSet<GameId>>,
    rosters: HashMap<GameId, HashMap<PlayerId, Seat>>,
    participation_count: usize,
}

impl Snapshot {
    /// Index the given collections.
    ///
    /// Fails without producing anything if an id repeats, a participation
    /// points at an unknown player or game, or a player sits twice in the
    /// same game.
    pub fn build(
        mut players: Vec<Player>,
        games: Vec<Game>,
        participations: Vec<Participation>,
    ) -> Result<Self, StatsError> {
        players.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let mut player_index = HashMap::with_capacity(players.len());
        for (idx, player) in players.iter().enumerate() {
            if player_index.insert(player.id, idx).is_some() {
                return Err(StatsError::DuplicatePlayer(player.id));
            }
        }

        let mut game_map = HashMap::with_capacity(games.len());
        let mut rosters: HashMap<GameId, HashMap<PlayerId, Seat>> =
            HashMap::with_capacity(games.len());
        for game in games {
            let id = game.id;
            if game_map.insert(id, game).is_some() {
                return Err(StatsError::DuplicateGame(id));
            }
            rosters.insert(id, HashMap::new());
        }

        let mut game_ids_by_player: HashMap<PlayerId, BTreeSet<GameId>> = players
            .iter()
            .map(|p| (p.id, BTreeSet::new()))
            .collect();

        let participation_count = participations.len();
        for part in participations {
            let Some(played) = game_ids_by_player.get_mut(&part.player_id) else {
                return Err(StatsError::UnknownPlayer {
                    participation: part.id,
                    player: part.player_id,
                });
            };
            let Some(roster) = rosters.get_mut(&part.game_id) else {
                return Err(StatsError::UnknownGame {
                    participation: part.id,
                    game: part.game_id,
                });
            };

            let seat = Seat {
                role: part.role,
                info: part.info,
            };
            if roster.insert(part.player_id, seat).is_some() {
                return Err(StatsError::DuplicateParticipation {
                    player: part.player_id,
                    game: part.game_id,
                });
            }
            played.insert(part.game_id);
        }

        debug!(
            "Built snapshot: {} players, {} games, {} participations",
            players.len(),
            game_map.len(),
            participation_count
        );

        Ok(Self {
            players,
            player_index,
            games: game_map,
            game_ids_by_player,
            rosters,
            participation_count,
        })
    }

    /// Read every collection from `source` and index it.
    pub fn load<S: DataSource + ?Sized>(source: &S) -> Result<Self, StatsError> {
        let players = source.list_players()?;
        let games = source.list_games()?;
        let participations = source.list_participations(&ParticipationFilter::all())?;
        Self::build(players, games, participations)
    }

    /// All players, ordered by name.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.player_index.get(&id).map(|&idx| &self.players[idx])
    }

    /// Name of `id`, empty for unknown players.
    pub fn name_of(&self, id: PlayerId) -> String {
        self.player(id).map(|p| p.name.clone()).unwrap_or_default()
    }

    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.games.get(&id)
    }

    /// Winning side of a game, if recorded.
    pub fn winner(&self, id: GameId) -> Option<Role> {
        self.games.get(&id).and_then(|g| g.winner_role)
    }

    /// Games `player` took part in; empty for unknown players.
    pub fn game_ids(&self, player: PlayerId) -> &BTreeSet<GameId> {
        self.game_ids_by_player.get(&player).unwrap_or(&NO_GAMES)
    }

    /// Seats of one game keyed by player.
    pub fn roster(&self, game: GameId) -> Option<&HashMap<PlayerId, Seat>> {
        self.rosters.get(&game)
    }

    pub fn seat(&self, player: PlayerId, game: GameId) -> Option<Seat> {
        self.rosters.get(&game).and_then(|r| r.get(&player)).copied()
    }

    /// Every seat `player` held, in game order.
    pub fn seats_of(&self, player: PlayerId) -> impl Iterator<Item = (GameId, Seat)> + '_ {
        self.game_ids(player)
            .iter()
            .filter_map(move |&game| self.seat(player, game).map(|seat| (game, seat)))
    }

    /// All rosters, one per game.
    pub fn rosters(&self) -> impl Iterator<Item = (GameId, &HashMap<PlayerId, Seat>)> + '_ {
        self.rosters.iter().map(|(id, roster)| (*id, roster))
    }

    pub fn participation_count(&self) -> usize {
        self.participation_count
    }
}
