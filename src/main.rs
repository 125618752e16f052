use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use party_stats::calculate::StatsEngine;
use party_stats::config::AppConfig;
use party_stats::models::{GameId, PlayerId};
use party_stats::storage::{
    DataSource, JsonlSource, Ledger, SeatAssignment, StorageConfig, StorageError,
};

#[derive(Parser)]
#[command(name = "party-stats")]
#[command(about = "Party game ledger and statistics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pairwise win rates when two players shared a side
    CrossTab,

    /// Totals, partners and info tags of one player
    Partners {
        /// Player name or id
        player: String,
    },

    /// All leaderboards and the most frequent pairs
    Leaderboard,

    /// Every player with their number of games
    Players,

    /// Participants and outcome of one game
    Game {
        /// Game id
        id: u64,
    },

    /// Register a player (no-op if the name exists)
    AddPlayer {
        name: String,
    },

    /// Create and start a game
    NewGame {
        /// Name of the game master
        #[arg(long)]
        master: Option<String>,
    },

    /// Seat a player in a game, or update their seat
    Join {
        /// Game id
        game: u64,

        /// Player name (registered if new)
        player: String,

        /// villain or kind
        #[arg(long, default_value = "kind")]
        role: String,

        /// pire, neutre or meilleur
        #[arg(long)]
        info: Option<String>,

        /// Allow changes to an ended game
        #[arg(long)]
        edit: bool,
    },

    /// Remove a player from a game
    Leave {
        /// Game id
        game: u64,

        /// Player name or id
        player: String,

        /// Allow changes to an ended game
        #[arg(long)]
        edit: bool,
    },

    /// End a game, recording the winner and final seats
    EndGame {
        /// Game id
        game: u64,

        /// Winning side: villain or kind
        #[arg(long)]
        winner: Option<String>,

        /// Final seat as PLAYER:ROLE[:INFO], repeatable
        #[arg(long = "seat")]
        seats: Vec<String>,
    },

    /// Start a new game with the same master and seats
    Rematch {
        /// Game id
        game: u64,
    },

    /// Delete a player and their participations
    DeletePlayer {
        /// Player name or id
        player: String,
    },

    /// Delete a game and its participations
    DeleteGame {
        /// Game id
        game: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::from_file_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    // Initialize tracing
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let storage = StorageConfig::new(cli.data_dir.unwrap_or(config.data_dir));
    tracing::debug!("Using ledger at {:?}", storage.ledger_dir());

    let engine = StatsEngine::new(config.stats);
    let source = JsonlSource::new(storage.clone());

    match cli.command {
        // ── Reports ─────────────────────────────────────────────
        Commands::CrossTab => print_json(&engine.compute_cross_tab(&source)?)?,
        Commands::Partners { player } => {
            let player = resolve_player(&source, &player)?;
            print_json(&engine.compute_partner_summary(&source, player)?)?;
        }
        Commands::Leaderboard => print_json(&engine.compute_leaderboards(&source)?)?,
        Commands::Players => print_json(&engine.compute_player_directory(&source)?)?,
        Commands::Game { id } => {
            print_json(&engine.compute_game_detail(&source, GameId::new(id))?)?;
        }

        // ── Ledger edits ────────────────────────────────────────
        Commands::AddPlayer { name } => {
            let mut ledger = Ledger::load(&storage)?;
            let id = ledger.add_player(&name)?;
            ledger.save(&storage)?;
            println!("{}", id);
        }
        Commands::NewGame { master } => {
            let mut ledger = Ledger::load(&storage)?;
            let id = ledger.create_game(master.as_deref())?;
            ledger.save(&storage)?;
            tracing::info!("Started game {}", id);
            println!("{}", id);
        }
        Commands::Join {
            game,
            player,
            role,
            info,
            edit,
        } => {
            let mut ledger = Ledger::load(&storage)?;
            let seat = ledger.join_game(GameId::new(game), &player, &role, info.as_deref(), edit)?;
            ledger.save(&storage)?;
            tracing::info!("{} seated in game {} ({})", player, game, seat);
        }
        Commands::Leave { game, player, edit } => {
            let mut ledger = Ledger::load(&storage)?;
            let player_id = resolve_player(&ledger, &player)?;
            if ledger.remove_participation(GameId::new(game), player_id, edit)? {
                ledger.save(&storage)?;
                tracing::info!("{} left game {}", player, game);
            } else {
                tracing::warn!("{} was not seated in game {}", player, game);
            }
        }
        Commands::EndGame {
            game,
            winner,
            seats,
        } => {
            let mut ledger = Ledger::load(&storage)?;
            let assignments = seats
                .iter()
                .map(|raw| parse_seat(&ledger, raw))
                .collect::<Result<Vec<_>>>()?;
            ledger.end_game(GameId::new(game), winner.as_deref(), &assignments)?;
            ledger.save(&storage)?;
            tracing::info!("Ended game {}", game);
        }
        Commands::Rematch { game } => {
            let mut ledger = Ledger::load(&storage)?;
            let id = ledger.rematch(GameId::new(game))?;
            ledger.save(&storage)?;
            tracing::info!("Rematch of game {} started as game {}", game, id);
            println!("{}", id);
        }
        Commands::DeletePlayer { player } => {
            let mut ledger = Ledger::load(&storage)?;
            let id = resolve_player(&ledger, &player)?;
            ledger.delete_player(id)?;
            ledger.save(&storage)?;
            tracing::info!("Deleted player {}", player);
        }
        Commands::DeleteGame { game } => {
            let mut ledger = Ledger::load(&storage)?;
            ledger.delete_game(GameId::new(game))?;
            ledger.save(&storage)?;
            tracing::info!("Deleted game {}", game);
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Look a player up by exact name, falling back to a numeric id.
fn resolve_player<S: DataSource + ?Sized>(source: &S, raw: &str) -> Result<PlayerId> {
    let players = source.list_players()?;
    let wanted = raw.trim();

    if let Some(player) = players.iter().find(|p| p.name == wanted) {
        return Ok(player.id);
    }
    if let Ok(id) = wanted.parse::<PlayerId>() {
        if players.iter().any(|p| p.id == id) {
            return Ok(id);
        }
    }
    Err(StorageError::PlayerNameNotFound(wanted.to_string()).into())
}

/// Parse `PLAYER:ROLE[:INFO]` into a seat assignment.
fn parse_seat(ledger: &Ledger, raw: &str) -> Result<SeatAssignment> {
    let mut parts = raw.splitn(3, ':');
    let (Some(player), Some(role)) = (parts.next(), parts.next()) else {
        bail!("Invalid seat {:?}, expected PLAYER:ROLE[:INFO]", raw);
    };

    let mut seat = SeatAssignment::new(resolve_player(ledger, player)?).with_role(role);
    if let Some(info) = parts.next() {
        seat = seat.with_info(info);
    }
    Ok(seat)
}
