//! JSONL (JSON Lines) storage.
//!
//! Each ledger collection lives in its own file, one JSON object per line.
//! Reads are strict: a line that does not parse fails the whole read, so a
//! report is never computed over a partially loaded collection.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use super::{DataSource, ParticipationFilter, StorageConfig, StorageError};
use crate::models::{Game, Participation, Player};

/// Entity types for JSONL storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Player,
    Game,
    Participation,
}

impl EntityType {
    /// Get the filename for this entity type.
    pub fn filename(&self) -> &'static str {
        match self {
            EntityType::Player => "players.jsonl",
            EntityType::Game => "games.jsonl",
            EntityType::Participation => "participations.jsonl",
        }
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a writer for a ledger collection.
    pub fn for_entity(config: &StorageConfig, entity: EntityType) -> Self {
        Self::new(config.entity_path(entity))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists.
    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Write entities, replacing the entire file.
    pub fn write_all<'a, I>(&self, entities: I) -> Result<usize, StorageError>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        let mut count = 0;

        for entity in entities {
            let json = serde_json::to_string(entity)?;
            writeln!(writer, "{}", json)?;
            count += 1;
        }

        writer.flush()?;
        info!("Wrote {} entities to {:?}", count, self.path);

        Ok(count)
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a reader for a ledger collection.
    pub fn for_entity(config: &StorageConfig, entity: EntityType) -> Self {
        Self::new(config.entity_path(entity))
    }

    /// Check if the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all entities from the file. A missing file is an empty
    /// collection; a malformed line is an error.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            let entity =
                serde_json::from_str(&line).map_err(|source| StorageError::MalformedLine {
                    path: self.path.clone(),
                    line: idx + 1,
                    source,
                })?;
            entities.push(entity);
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }
}

/// A [`DataSource`] that re-reads the JSONL files on every query.
#[derive(Debug, Clone)]
pub struct JsonlSource {
    config: StorageConfig,
}

impl JsonlSource {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }
}

impl DataSource for JsonlSource {
    fn list_players(&self) -> Result<Vec<Player>, StorageError> {
        JsonlReader::for_entity(&self.config, EntityType::Player).read_all()
    }

    fn list_games(&self) -> Result<Vec<Game>, StorageError> {
        JsonlReader::for_entity(&self.config, EntityType::Game).read_all()
    }

    fn list_participations(
        &self,
        filter: &ParticipationFilter,
    ) -> Result<Vec<Participation>, StorageError> {
        let all: Vec<Participation> =
            JsonlReader::for_entity(&self.config, EntityType::Participation).read_all()?;
        Ok(all.into_iter().filter(|p| filter.matches(p)).collect())
    }
}
