//! Character persistence behind the [`CharacterStore`] contract.
//!
//! The core never talks to a backend directly; callers hand it a store
//! implementation. [`FileCharacterStore`] keeps one JSON document per
//! character and is the reference implementation. Hosted backends plug in
//! the same way.
//!
//! Characters are validated before every write and their schema version is
//! normalized on load.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, instrument, warn};

use crate::character::{generate_character_id, Character, SCHEMA_VERSION};

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Character not found: {0}")]
    CharacterNotFound(String),

    #[error("Invalid character data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Quick-access listing entry for a stored character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSummary {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub race: String,
    /// e.g. "Fighter 3/Wizard 2".
    pub classes: String,
    pub last_updated: u64,
}

impl CharacterSummary {
    pub fn of(character: &Character) -> Self {
        CharacterSummary {
            id: character.info.id.clone(),
            name: character.info.name.clone(),
            level: character.classes.total_level,
            race: character.info.race.name.clone(),
            classes: character.classes.summary(),
            last_updated: character.last_updated,
        }
    }
}

/// Storage contract for character documents.
#[async_trait]
pub trait CharacterStore {
    /// Persist a new character for an owner, assigning a storage id if the
    /// character does not carry one. Returns the stored character.
    async fn create(&self, owner_id: &str, character: Character)
        -> Result<Character, StoreError>;

    /// Summaries of an owner's characters, most recently updated first.
    async fn user_characters(&self, owner_id: &str) -> Result<Vec<CharacterSummary>, StoreError>;

    /// Load one character by id.
    async fn character(&self, id: &str) -> Result<Character, StoreError>;

    /// Replace a stored character.
    async fn update(&self, id: &str, character: Character) -> Result<Character, StoreError>;

    /// Remove a stored character.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// On-disk document wrapping a character with its ownership record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCharacter {
    owner_id: String,
    summary: CharacterSummary,
    character: Character,
}

/// File-backed store: one JSON document per character under a directory.
#[derive(Debug, Clone)]
pub struct FileCharacterStore {
    dir: PathBuf,
}

impl FileCharacterStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileCharacterStore { dir: dir.into() }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        let sanitized: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        self.dir.join(format!("{sanitized}.json"))
    }

    async fn read_document(&self, path: &Path) -> Result<StoredCharacter, StoreError> {
        let content = fs::read_to_string(path).await?;
        let mut stored: StoredCharacter = serde_json::from_str(&content)?;

        if stored.character.schema_version != SCHEMA_VERSION {
            debug!(
                id = %stored.character.info.id,
                from = %stored.character.schema_version,
                "normalizing schema version on load"
            );
            stored.character.schema_version = SCHEMA_VERSION.to_string();
            stored.character.touch();
        }

        Ok(stored)
    }

    async fn write_document(&self, stored: &StoredCharacter) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(&stored.character.info.id);
        let content = serde_json::to_string_pretty(stored)?;
        fs::write(path, content).await?;
        Ok(())
    }

    fn validated(character: Character) -> Result<Character, StoreError> {
        let report = character.validate();
        if !report.is_valid {
            return Err(StoreError::InvalidData(report.errors.join(", ")));
        }
        Ok(character)
    }
}

#[async_trait]
impl CharacterStore for FileCharacterStore {
    #[instrument(skip(self, character), fields(name = %character.info.name))]
    async fn create(
        &self,
        owner_id: &str,
        mut character: Character,
    ) -> Result<Character, StoreError> {
        if character.info.id.trim().is_empty() {
            character.info.id = generate_character_id();
        }
        let character = Self::validated(character)?;

        let stored = StoredCharacter {
            owner_id: owner_id.to_string(),
            summary: CharacterSummary::of(&character),
            character,
        };
        self.write_document(&stored).await?;
        debug!(id = %stored.character.info.id, "character created");
        Ok(stored.character)
    }

    #[instrument(skip(self))]
    async fn user_characters(&self, owner_id: &str) -> Result<Vec<CharacterSummary>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match self.read_document(&path).await {
                    Ok(stored) if stored.owner_id == owner_id => summaries.push(stored.summary),
                    Ok(_) => {}
                    Err(error) => {
                        warn!(path = %path.display(), %error, "skipping unreadable document")
                    }
                }
            }
        }

        summaries.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(summaries)
    }

    #[instrument(skip(self))]
    async fn character(&self, id: &str) -> Result<Character, StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(StoreError::CharacterNotFound(id.to_string()));
        }
        Ok(self.read_document(&path).await?.character)
    }

    #[instrument(skip(self, character))]
    async fn update(&self, id: &str, character: Character) -> Result<Character, StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(StoreError::CharacterNotFound(id.to_string()));
        }
        let previous = self.read_document(&path).await?;

        let mut character = Self::validated(character)?;
        character.info.id = id.to_string();
        character.touch();

        let stored = StoredCharacter {
            owner_id: previous.owner_id,
            summary: CharacterSummary::of(&character),
            character,
        };
        self.write_document(&stored).await?;
        debug!(id, "character updated");
        Ok(stored.character)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(StoreError::CharacterNotFound(id.to_string()));
        }
        fs::remove_file(path).await?;
        debug!(id, "character deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::create_sample_character;
    use tempfile::TempDir;

    fn store_in(temp: &TempDir) -> FileCharacterStore {
        FileCharacterStore::new(temp.path().join("characters"))
    }

    #[tokio::test]
    async fn test_create_and_load_round_trip() {
        let temp = TempDir::new().expect("temp dir");
        let store = store_in(&temp);

        let character = create_sample_character("Stored Hero");
        let created = store.create("owner-1", character.clone()).await.unwrap();
        assert_eq!(created.info.id, character.info.id);

        let loaded = store.character(&created.info.id).await.unwrap();
        assert_eq!(loaded, created);
    }

    #[tokio::test]
    async fn test_create_assigns_missing_id() {
        let temp = TempDir::new().expect("temp dir");
        let store = store_in(&temp);

        let mut character = create_sample_character("Nameless Id");
        character.info.id = String::new();
        let created = store.create("owner-1", character).await.unwrap();
        assert!(created.info.id.starts_with("char_"));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_characters() {
        let temp = TempDir::new().expect("temp dir");
        let store = store_in(&temp);

        let mut character = create_sample_character("Broken");
        character.classes.classes.clear();
        character.classes.total_level = 0;

        let result = store.create("owner-1", character).await;
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_missing_character_errors() {
        let temp = TempDir::new().expect("temp dir");
        let store = store_in(&temp);

        let error = store.character("char_0_missing00").await.unwrap_err();
        assert!(matches!(&error, StoreError::CharacterNotFound(_)));
        assert!(error.to_string().contains("Character not found"));

        assert!(matches!(
            store.delete("char_0_missing00").await,
            Err(StoreError::CharacterNotFound(_))
        ));
        assert!(matches!(
            store
                .update("char_0_missing00", create_sample_character("Ghost"))
                .await,
            Err(StoreError::CharacterNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_listing_is_per_owner_and_sorted_by_recency() {
        let temp = TempDir::new().expect("temp dir");
        let store = store_in(&temp);

        let mut old = create_sample_character("Old Hand");
        old.last_updated = 1_000;
        let mut recent = create_sample_character("Fresh Face");
        recent.last_updated = 2_000;
        let other = create_sample_character("Someone Else");

        store.create("owner-1", old).await.unwrap();
        store.create("owner-1", recent).await.unwrap();
        store.create("owner-2", other).await.unwrap();

        let listing = store.user_characters("owner-1").await.unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].name, "Fresh Face");
        assert_eq!(listing[1].name, "Old Hand");
        assert_eq!(listing[0].classes, "Fighter 1");
        assert_eq!(listing[0].race, "Dwarf");

        let empty = store.user_characters("owner-3").await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_listing_on_missing_directory_is_empty() {
        let temp = TempDir::new().expect("temp dir");
        let store = store_in(&temp);
        assert!(store.user_characters("owner-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_and_restamps() {
        let temp = TempDir::new().expect("temp dir");
        let store = store_in(&temp);

        let character = create_sample_character("Renamed");
        let created = store.create("owner-1", character).await.unwrap();

        let mut edited = created.clone();
        edited.info.name = "Renamed Twice".to_string();
        let updated = store.update(&created.info.id, edited).await.unwrap();

        assert_eq!(updated.info.name, "Renamed Twice");
        assert_eq!(updated.info.id, created.info.id);
        assert!(updated.last_updated >= created.last_updated);

        let loaded = store.character(&created.info.id).await.unwrap();
        assert_eq!(loaded.info.name, "Renamed Twice");
    }

    #[tokio::test]
    async fn test_delete_removes_document() {
        let temp = TempDir::new().expect("temp dir");
        let store = store_in(&temp);

        let created = store
            .create("owner-1", create_sample_character("Doomed"))
            .await
            .unwrap();
        store.delete(&created.info.id).await.unwrap();

        assert!(matches!(
            store.character(&created.info.id).await,
            Err(StoreError::CharacterNotFound(_))
        ));
        assert!(store.user_characters("owner-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stale_schema_version_normalized_on_load() {
        let temp = TempDir::new().expect("temp dir");
        let store = store_in(&temp);

        let mut character = create_sample_character("Migrant");
        character.schema_version = "1.0.0".to_string();
        // Bypass create() so the stale version reaches disk untouched.
        let stored = StoredCharacter {
            owner_id: "owner-1".to_string(),
            summary: CharacterSummary::of(&character),
            character: character.clone(),
        };
        store.write_document(&stored).await.unwrap();

        let loaded = store.character(&character.info.id).await.unwrap();
        assert_eq!(loaded.schema_version, SCHEMA_VERSION);
    }
}
