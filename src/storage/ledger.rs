//! In-memory ledger of players, games and participations.
//!
//! The ledger owns the write-time rules: player names are unique, a player
//! sits at most once per game, role and info values outside their closed
//! sets fall back to the previous value (or the default on creation), and
//! deletions cascade.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, info};

use super::{
    DataSource, EntityType, JsonlReader, JsonlWriter, ParticipationFilter, StorageConfig,
    StorageError,
};
use crate::models::{
    Game, GameId, InfoTag, Participation, ParticipationId, Player, PlayerId, Role,
};

/// Requested role/info for one seat, as raw caller input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatAssignment {
    pub player_id: PlayerId,
    pub role: Option<String>,
    pub info: Option<String>,
}

impl SeatAssignment {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            role: None,
            info: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }
}

/// The current records.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    players: BTreeMap<PlayerId, Player>,
    games: BTreeMap<GameId, Game>,
    participations: BTreeMap<ParticipationId, Participation>,
    /// Seat lookup, kept in step with `participations`
    seat_index: BTreeMap<(GameId, PlayerId), ParticipationId>,
    next_player: u64,
    next_game: u64,
    next_participation: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from loaded collections, rejecting duplicate ids,
    /// duplicate seats and participations that point nowhere.
    pub fn from_parts(
        players: Vec<Player>,
        games: Vec<Game>,
        participations: Vec<Participation>,
    ) -> Result<Self, StorageError> {
        let mut ledger = Self::new();

        for player in players {
            let id = player.id;
            if ledger.players.insert(id, player).is_some() {
                return Err(StorageError::DuplicateId {
                    kind: "player",
                    id: id.get(),
                });
            }
        }

        for game in games {
            let id = game.id;
            if ledger.games.insert(id, game).is_some() {
                return Err(StorageError::DuplicateId {
                    kind: "game",
                    id: id.get(),
                });
            }
        }

        for part in participations {
            if !ledger.players.contains_key(&part.player_id) {
                return Err(StorageError::PlayerNotFound(part.player_id));
            }
            if !ledger.games.contains_key(&part.game_id) {
                return Err(StorageError::GameNotFound(part.game_id));
            }
            if ledger.seat_id(part.game_id, part.player_id).is_some() {
                return Err(StorageError::DuplicateParticipation {
                    player: part.player_id,
                    game: part.game_id,
                });
            }
            if ledger.participations.contains_key(&part.id) {
                return Err(StorageError::DuplicateId {
                    kind: "participation",
                    id: part.id.get(),
                });
            }
            ledger.insert_participation(part);
        }

        ledger.next_player = ledger.players.keys().last().map_or(0, |id| id.get());
        ledger.next_game = ledger.games.keys().last().map_or(0, |id| id.get());
        ledger.next_participation = ledger
            .participations
            .keys()
            .last()
            .map_or(0, |id| id.get());

        Ok(ledger)
    }

    /// Load the ledger from its JSONL files.
    pub fn load(config: &StorageConfig) -> Result<Self, StorageError> {
        let players = JsonlReader::for_entity(config, EntityType::Player).read_all()?;
        let games = JsonlReader::for_entity(config, EntityType::Game).read_all()?;
        let participations =
            JsonlReader::for_entity(config, EntityType::Participation).read_all()?;

        let ledger = Self::from_parts(players, games, participations)?;
        info!(
            "Loaded ledger: {} players, {} games, {} participations",
            ledger.players.len(),
            ledger.games.len(),
            ledger.participations.len()
        );
        Ok(ledger)
    }

    /// Write every collection back to its JSONL file.
    pub fn save(&self, config: &StorageConfig) -> Result<(), StorageError> {
        JsonlWriter::for_entity(config, EntityType::Player).write_all(self.players.values())?;
        JsonlWriter::for_entity(config, EntityType::Game).write_all(self.games.values())?;
        JsonlWriter::for_entity(config, EntityType::Participation)
            .write_all(self.participations.values())?;
        Ok(())
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn find_player(&self, name: &str) -> Option<&Player> {
        let name = name.trim();
        self.players.values().find(|p| p.name == name)
    }

    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.games.get(&id)
    }

    /// The first game that is started and not ended.
    pub fn active_game(&self) -> Option<&Game> {
        self.games.values().find(|g| g.is_active())
    }

    /// Participation of `player` in `game`, if any.
    pub fn seat(&self, game: GameId, player: PlayerId) -> Option<&Participation> {
        self.seat_id(game, player)
            .and_then(|id| self.participations.get(&id))
    }

    fn seat_id(&self, game: GameId, player: PlayerId) -> Option<ParticipationId> {
        self.seat_index.get(&(game, player)).copied()
    }

    fn insert_participation(&mut self, part: Participation) {
        self.seat_index.insert((part.game_id, part.player_id), part.id);
        self.participations.insert(part.id, part);
    }

    fn game_mut(&mut self, id: GameId) -> Result<&mut Game, StorageError> {
        self.games.get_mut(&id).ok_or(StorageError::GameNotFound(id))
    }

    // ── Players ─────────────────────────────────────────────────

    /// Get or create the player called `name` (surrounding blanks ignored).
    pub fn add_player(&mut self, name: &str) -> Result<PlayerId, StorageError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StorageError::EmptyName);
        }
        if let Some(existing) = self.find_player(name) {
            return Ok(existing.id);
        }

        self.next_player += 1;
        let id = PlayerId::new(self.next_player);
        self.players.insert(id, Player::new(id, name));
        debug!("Registered player {} ({})", name, id);
        Ok(id)
    }

    /// Delete a player with their participations; games they mastered
    /// lose their master.
    pub fn delete_player(&mut self, id: PlayerId) -> Result<(), StorageError> {
        self.players
            .remove(&id)
            .ok_or(StorageError::PlayerNotFound(id))?;

        self.participations.retain(|_, p| p.player_id != id);
        self.seat_index.retain(|&(_, player), _| player != id);
        for game in self.games.values_mut() {
            if game.master == Some(id) {
                game.master = None;
            }
        }
        debug!("Deleted player {}", id);
        Ok(())
    }

    // ── Games ───────────────────────────────────────────────────

    /// Create a game, registering the master by name if given, and start
    /// it immediately.
    pub fn create_game(&mut self, master: Option<&str>) -> Result<GameId, StorageError> {
        let master = match master.map(str::trim).filter(|m| !m.is_empty()) {
            Some(name) => Some(self.add_player(name)?),
            None => None,
        };

        self.next_game += 1;
        let id = GameId::new(self.next_game);
        let mut game = Game::new(id);
        game.master = master;
        self.games.insert(id, game);
        self.start_game(id)?;
        Ok(id)
    }

    /// (Re)start a game: stamp the start time and clear any end time.
    pub fn start_game(&mut self, id: GameId) -> Result<(), StorageError> {
        let game = self.game_mut(id)?;
        game.started_at = Some(Utc::now());
        game.ended_at = None;
        debug!("Started game {}", id);
        Ok(())
    }

    /// End a game, optionally recording the winning side and final seats.
    pub fn end_game(
        &mut self,
        id: GameId,
        winner: Option<&str>,
        assignments: &[SeatAssignment],
    ) -> Result<(), StorageError> {
        self.game_mut(id)?.ended_at = Some(Utc::now());
        self.set_roles(id, assignments, winner)?;
        debug!("Ended game {}", id);
        Ok(())
    }

    /// Update seats and optionally the winner. Allowed on ended games.
    pub fn set_roles(
        &mut self,
        id: GameId,
        assignments: &[SeatAssignment],
        winner: Option<&str>,
    ) -> Result<(), StorageError> {
        let game = self.game_mut(id)?;
        if let Some(raw) = winner.map(str::trim).filter(|w| !w.is_empty()) {
            let previous = game.winner_role;
            game.winner_role = match raw.parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    tracing::warn!("{}, keeping winner {:?}", e, previous);
                    previous
                }
            };
        }

        for assignment in assignments {
            let seat = self
                .seat_id(id, assignment.player_id)
                .and_then(|sid| self.participations.get_mut(&sid));
            if let Some(seat) = seat {
                seat.role = Role::parse_or(assignment.role.as_deref(), seat.role);
                seat.info = InfoTag::parse_or(assignment.info.as_deref(), seat.info);
            }
        }
        Ok(())
    }

    /// Seat `player_name` in a game, or update their seat if present.
    ///
    /// Ended games only accept this in edit mode.
    pub fn join_game(
        &mut self,
        id: GameId,
        player_name: &str,
        role: &str,
        info: Option<&str>,
        edit: bool,
    ) -> Result<ParticipationId, StorageError> {
        let game = self.game(id).ok_or(StorageError::GameNotFound(id))?;
        if game.is_ended() && !edit {
            return Err(StorageError::GameEnded(id));
        }
        let player = self.add_player(player_name)?;

        if let Some(sid) = self.seat_id(id, player) {
            if let Some(seat) = self.participations.get_mut(&sid) {
                seat.role = Role::parse_or(Some(role), seat.role);
                seat.info = InfoTag::parse_or(info, seat.info);
            }
            return Ok(sid);
        }

        self.next_participation += 1;
        let sid = ParticipationId::new(self.next_participation);
        let seat = Participation::new(sid, player, id, Role::parse_or(Some(role), Role::default()))
            .with_info(InfoTag::parse_or(info, InfoTag::default()));
        self.insert_participation(seat);
        debug!("Player {} joined game {}", player, id);
        Ok(sid)
    }

    /// Remove a player from a game. Ended games only accept this in edit
    /// mode. Returns whether a seat was removed.
    pub fn remove_participation(
        &mut self,
        id: GameId,
        player: PlayerId,
        edit: bool,
    ) -> Result<bool, StorageError> {
        let game = self.game(id).ok_or(StorageError::GameNotFound(id))?;
        if game.is_ended() && !edit {
            return Err(StorageError::GameEnded(id));
        }

        Ok(match self.seat_index.remove(&(id, player)) {
            Some(sid) => self.participations.remove(&sid).is_some(),
            None => false,
        })
    }

    /// Start a new game with the same master and seats as `id`.
    pub fn rematch(&mut self, id: GameId) -> Result<GameId, StorageError> {
        let old = self.game(id).ok_or(StorageError::GameNotFound(id))?;
        let master = old.master;
        let seats: Vec<(PlayerId, Role, InfoTag)> = self
            .participations
            .values()
            .filter(|p| p.game_id == id)
            .map(|p| (p.player_id, p.role, p.info))
            .collect();

        self.next_game += 1;
        let new_id = GameId::new(self.next_game);
        let mut game = Game::new(new_id);
        game.master = master;
        self.games.insert(new_id, game);

        for (player, role, info) in seats {
            self.next_participation += 1;
            let sid = ParticipationId::new(self.next_participation);
            self.insert_participation(Participation::new(sid, player, new_id, role).with_info(info));
        }

        self.start_game(new_id)?;
        Ok(new_id)
    }

    /// Delete a game with its participations.
    pub fn delete_game(&mut self, id: GameId) -> Result<(), StorageError> {
        self.games
            .remove(&id)
            .ok_or(StorageError::GameNotFound(id))?;
        self.participations.retain(|_, p| p.game_id != id);
        self.seat_index.retain(|&(game, _), _| game != id);
        debug!("Deleted game {}", id);
        Ok(())
    }
}

impl DataSource for Ledger {
    fn list_players(&self) -> Result<Vec<Player>, StorageError> {
        Ok(self.players.values().cloned().collect())
    }

    fn list_games(&self) -> Result<Vec<Game>, StorageError> {
        Ok(self.games.values().cloned().collect())
    }

    fn list_participations(
        &self,
        filter: &ParticipationFilter,
    ) -> Result<Vec<Participation>, StorageError> {
        Ok(self
            .participations
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ledger_with_game() -> (Ledger, GameId) {
        let mut ledger = Ledger::new();
        let game = ledger.create_game(Some("Mia")).unwrap();
        ledger.join_game(game, "Alice", "villain", None, false).unwrap();
        ledger.join_game(game, "Bob", "kind", Some("meilleur"), false).unwrap();
        (ledger, game)
    }

    fn id_of(ledger: &Ledger, name: &str) -> PlayerId {
        ledger.find_player(name).unwrap().id
    }

    #[test]
    fn test_add_player_is_get_or_create() {
        let mut ledger = Ledger::new();
        let a = ledger.add_player("  Alice ").unwrap();
        let b = ledger.add_player("Alice").unwrap();

        assert_eq!(a, b);
        assert_eq!(ledger.list_players().unwrap().len(), 1);
        assert_eq!(ledger.player(a).unwrap().name, "Alice");
    }

    #[test]
    fn test_add_player_rejects_blank_name() {
        let mut ledger = Ledger::new();
        assert!(matches!(ledger.add_player("   "), Err(StorageError::EmptyName)));
    }

    #[test]
    fn test_create_game_starts_it() {
        let (ledger, game) = ledger_with_game();
        let game = ledger.game(game).unwrap();

        assert!(game.is_active());
        assert_eq!(game.master, Some(id_of(&ledger, "Mia")));
        assert_eq!(ledger.active_game().map(|g| g.id), Some(game.id));
    }

    #[test]
    fn test_join_game_defaults() {
        let (ledger, game) = ledger_with_game();
        let alice = ledger.seat(game, id_of(&ledger, "Alice")).unwrap();
        let bob = ledger.seat(game, id_of(&ledger, "Bob")).unwrap();

        assert_eq!(alice.role, Role::Villain);
        assert_eq!(alice.info, InfoTag::Neutre);
        assert_eq!(bob.role, Role::Kind);
        assert_eq!(bob.info, InfoTag::Meilleur);
    }

    #[test]
    fn test_join_game_invalid_values_on_create_use_defaults() {
        let mut ledger = Ledger::new();
        let game = ledger.create_game(None).unwrap();
        ledger.join_game(game, "Cleo", "werewolf", Some("great"), false).unwrap();

        let seat = ledger.seat(game, id_of(&ledger, "Cleo")).unwrap();
        assert_eq!(seat.role, Role::Kind);
        assert_eq!(seat.info, InfoTag::Neutre);
    }

    #[test]
    fn test_join_game_twice_updates_seat() {
        let (mut ledger, game) = ledger_with_game();
        let first = ledger.seat(game, id_of(&ledger, "Bob")).unwrap().id;
        let second = ledger.join_game(game, "Bob", "villain", Some("bogus"), false).unwrap();

        assert_eq!(first, second);
        let seat = ledger.seat(game, id_of(&ledger, "Bob")).unwrap();
        assert_eq!(seat.role, Role::Villain);
        // unknown tag keeps the previous one
        assert_eq!(seat.info, InfoTag::Meilleur);
        assert_eq!(
            ledger
                .count_participations(&ParticipationFilter::for_game(game))
                .unwrap(),
            2
        );
    }

    #[test]
    fn test_ended_game_requires_edit_mode() {
        let (mut ledger, game) = ledger_with_game();
        ledger.end_game(game, Some("villain"), &[]).unwrap();

        assert!(matches!(
            ledger.join_game(game, "Dan", "kind", None, false),
            Err(StorageError::GameEnded(_))
        ));
        assert!(ledger.join_game(game, "Dan", "kind", None, true).is_ok());

        let alice = id_of(&ledger, "Alice");
        assert!(matches!(
            ledger.remove_participation(game, alice, false),
            Err(StorageError::GameEnded(_))
        ));
        assert!(ledger.remove_participation(game, alice, true).unwrap());
        assert!(!ledger.remove_participation(game, alice, true).unwrap());
    }

    #[test]
    fn test_end_game_sets_winner_and_seats() {
        let (mut ledger, game) = ledger_with_game();
        let bob = id_of(&ledger, "Bob");
        ledger
            .end_game(
                game,
                Some("kind"),
                &[SeatAssignment::new(bob).with_role("villain").with_info("pire")],
            )
            .unwrap();

        let g = ledger.game(game).unwrap();
        assert!(g.is_ended());
        assert_eq!(g.winner_role, Some(Role::Kind));
        let seat = ledger.seat(game, bob).unwrap();
        assert_eq!(seat.role, Role::Villain);
        assert_eq!(seat.info, InfoTag::Pire);
    }

    #[test]
    fn test_set_roles_keeps_previous_on_invalid_input() {
        let (mut ledger, game) = ledger_with_game();
        ledger.set_roles(game, &[], Some("kind")).unwrap();

        let alice = id_of(&ledger, "Alice");
        ledger
            .set_roles(
                game,
                &[SeatAssignment::new(alice).with_role("boss").with_info("top")],
                Some("nobody"),
            )
            .unwrap();

        assert_eq!(ledger.game(game).unwrap().winner_role, Some(Role::Kind));
        let seat = ledger.seat(game, alice).unwrap();
        assert_eq!(seat.role, Role::Villain);
        assert_eq!(seat.info, InfoTag::Neutre);
    }

    #[test]
    fn test_rematch_copies_master_and_seats() {
        let (mut ledger, game) = ledger_with_game();
        ledger.end_game(game, Some("kind"), &[]).unwrap();
        let next = ledger.rematch(game).unwrap();

        assert_ne!(next, game);
        let g = ledger.game(next).unwrap();
        assert!(g.is_active());
        assert_eq!(g.winner_role, None);
        assert_eq!(g.master, ledger.game(game).unwrap().master);

        let bob = ledger.seat(next, id_of(&ledger, "Bob")).unwrap();
        assert_eq!(bob.role, Role::Kind);
        assert_eq!(bob.info, InfoTag::Meilleur);
    }

    #[test]
    fn test_delete_player_cascades() {
        let (mut ledger, game) = ledger_with_game();
        let mia = id_of(&ledger, "Mia");
        let alice = id_of(&ledger, "Alice");

        ledger.delete_player(alice).unwrap();
        ledger.delete_player(mia).unwrap();

        assert!(ledger.seat(game, alice).is_none());
        assert_eq!(ledger.game(game).unwrap().master, None);
        assert!(matches!(
            ledger.delete_player(alice),
            Err(StorageError::PlayerNotFound(_))
        ));
    }

    #[test]
    fn test_seat_lookup_follows_removals() {
        let (mut ledger, game) = ledger_with_game();
        let alice = id_of(&ledger, "Alice");
        let bob = id_of(&ledger, "Bob");

        let old_seat = ledger.seat(game, alice).unwrap().id;
        assert!(ledger.remove_participation(game, alice, false).unwrap());
        assert!(ledger.seat(game, alice).is_none());

        let new_seat = ledger.join_game(game, "Alice", "kind", None, false).unwrap();
        assert_ne!(new_seat, old_seat);
        assert_eq!(ledger.seat(game, alice).map(|p| p.role), Some(Role::Kind));

        let next = ledger.rematch(game).unwrap();
        assert!(ledger.seat(next, bob).is_some());
        ledger.delete_player(bob).unwrap();
        assert!(ledger.seat(game, bob).is_none());
        assert!(ledger.seat(next, bob).is_none());

        ledger.delete_game(next).unwrap();
        assert!(ledger.seat(next, alice).is_none());
        assert!(ledger.seat(game, alice).is_some());
    }

    #[test]
    fn test_from_parts_indexes_seats() {
        let players = vec![
            Player::new(PlayerId::new(1), "Alice"),
            Player::new(PlayerId::new(2), "Bob"),
        ];
        let games = vec![Game::new(GameId::new(1)), Game::new(GameId::new(2))];
        let parts = vec![
            Participation::new(ParticipationId::new(5), PlayerId::new(1), GameId::new(1), Role::Kind),
            Participation::new(ParticipationId::new(6), PlayerId::new(2), GameId::new(2), Role::Villain),
        ];

        let ledger = Ledger::from_parts(players, games, parts).unwrap();

        assert_eq!(
            ledger.seat(GameId::new(2), PlayerId::new(2)).map(|p| p.id),
            Some(ParticipationId::new(6))
        );
        assert!(ledger.seat(GameId::new(2), PlayerId::new(1)).is_none());
    }

    #[test]
    fn test_count_participations_by_player() {
        let (mut ledger, game) = ledger_with_game();
        let next = ledger.create_game(None).unwrap();
        ledger.join_game(next, "Alice", "villain", Some("pire"), false).unwrap();
        let (alice, bob) = (id_of(&ledger, "Alice"), id_of(&ledger, "Bob"));

        let all = ledger
            .count_participations_by_player(&ParticipationFilter::all())
            .unwrap();
        assert_eq!(all, BTreeMap::from([(alice, 2), (bob, 1)]));

        let villains = ledger
            .count_participations_by_player(&ParticipationFilter::all().with_role(Role::Villain))
            .unwrap();
        assert_eq!(villains, BTreeMap::from([(alice, 2)]));

        let first_game = ledger
            .count_participations_by_player(&ParticipationFilter::for_game(game))
            .unwrap();
        assert_eq!(first_game.values().sum::<usize>(), 2);
    }

    #[test]
    fn test_delete_game_cascades() {
        let (mut ledger, game) = ledger_with_game();
        ledger.delete_game(game).unwrap();

        assert!(ledger.game(game).is_none());
        assert!(ledger
            .list_participations(&ParticipationFilter::all())
            .unwrap()
            .is_empty());
        assert_eq!(ledger.list_players().unwrap().len(), 3);
    }

    #[test]
    fn test_from_parts_rejects_duplicate_seat() {
        let players = vec![Player::new(PlayerId::new(1), "Alice")];
        let games = vec![Game::new(GameId::new(1))];
        let parts = vec![
            Participation::new(ParticipationId::new(1), PlayerId::new(1), GameId::new(1), Role::Kind),
            Participation::new(ParticipationId::new(2), PlayerId::new(1), GameId::new(1), Role::Villain),
        ];

        assert!(matches!(
            Ledger::from_parts(players, games, parts),
            Err(StorageError::DuplicateParticipation { .. })
        ));
    }

    #[test]
    fn test_from_parts_rejects_dangling_participation() {
        let parts = vec![Participation::new(
            ParticipationId::new(1),
            PlayerId::new(9),
            GameId::new(1),
            Role::Kind,
        )];
        assert!(matches!(
            Ledger::from_parts(vec![], vec![Game::new(GameId::new(1))], parts),
            Err(StorageError::PlayerNotFound(_))
        ));
    }

    #[test]
    fn test_save_and_load_round_trip_continues_ids() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig::new(temp_dir.path().to_path_buf());

        let (ledger, _) = ledger_with_game();
        ledger.save(&config).unwrap();

        let mut loaded = Ledger::load(&config).unwrap();
        assert_eq!(loaded.list_players().unwrap(), ledger.list_players().unwrap());

        let eve = loaded.add_player("Eve").unwrap();
        assert_eq!(eve, PlayerId::new(4));
        let game = loaded.create_game(None).unwrap();
        assert_eq!(game, GameId::new(2));
    }
}
