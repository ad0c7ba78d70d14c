//! First-run starter data.
//!
//! The loader inserts a fixed folder tree and a handful of collections with
//! their cards, then records a `dataLoaded` flag in the settings store so
//! later launches skip it. Seed folders and collections keep the ids from the
//! seed files; cards get fresh ids.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{Sqlite, Transaction};
use tracing::{info, warn};

use flashbox_core::error::{AppError, ErrorKind};
use flashbox_core::result::AppResult;
use flashbox_core::traits::settings::SettingsStore;
use flashbox_core::types::{CardId, CollectionId, FolderId};
use flashbox_entity::card::{CardText, CreateCard};
use flashbox_entity::collection::CreateCollection;
use flashbox_entity::folder::{CreateFolder, FolderScope};

use crate::connection::Store;
use crate::repositories::card::insert_card;
use crate::repositories::collection::insert_collection;
use crate::repositories::folder::insert_folder;

/// Settings key marking that starter data has been loaded.
pub const DATA_LOADED_KEY: &str = "dataLoaded";

const BUILTIN_FOLDERS: &str = include_str!("../seed/folders.json");
const BUILTIN_COLLECTIONS: [(&str, &str); 2] = [
    (
        "english_irregular_verbs.json",
        include_str!("../seed/collections/english_irregular_verbs.json"),
    ),
    (
        "kazakh_common_words.json",
        include_str!("../seed/collections/kazakh_common_words.json"),
    ),
];

/// A folder entry in `folders.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedFolder {
    pub id: FolderId,
    pub name: String,
    #[serde(default)]
    pub parent_folder_id: Option<FolderId>,
    #[serde(default)]
    pub created_by_user: Option<i64>,
}

/// One `collections/*.json` file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedCollection {
    pub id: CollectionId,
    pub name: String,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    #[serde(default)]
    pub created_by_user: Option<i64>,
    /// Accepts `true`/`false` as well as `1`/`0`.
    #[serde(default, deserialize_with = "flexible_bool")]
    pub selected: bool,
    #[serde(default)]
    pub cards: Vec<SeedCard>,
}

/// A card inside a seed collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedCard {
    pub front_text: String,
    pub back_text: String,
}

/// A complete set of starter data.
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub folders: Vec<SeedFolder>,
    pub collections: Vec<SeedCollection>,
}

impl SeedData {
    /// Starter data compiled into the binary.
    pub fn builtin() -> AppResult<Self> {
        let folders = parse_json("folders.json", BUILTIN_FOLDERS)?;
        let collections = BUILTIN_COLLECTIONS
            .iter()
            .map(|(name, raw)| parse_json(name, raw))
            .collect::<AppResult<Vec<SeedCollection>>>()?;
        Ok(Self {
            folders,
            collections,
        })
    }

    /// Read `folders.json` and every `collections/*.json` under `dir`.
    ///
    /// Collection files load in file-name order.
    pub async fn from_dir(dir: impl AsRef<Path>) -> AppResult<Self> {
        let dir = dir.as_ref();
        let raw = tokio::fs::read_to_string(dir.join("folders.json")).await?;
        let folders: Vec<SeedFolder> = parse_json("folders.json", &raw)?;

        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir.join("collections")).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();

        let mut collections = Vec::with_capacity(files.len());
        for path in files {
            let raw = tokio::fs::read_to_string(&path).await?;
            collections.push(parse_json(&path.display().to_string(), &raw)?);
        }

        info!(
            dir = %dir.display(),
            folders = folders.len(),
            collections = collections.len(),
            "Seed data read from directory"
        );
        Ok(Self {
            folders,
            collections,
        })
    }

    /// Total number of cards across all collections.
    pub fn card_count(&self) -> usize {
        self.collections.iter().map(|c| c.cards.len()).sum()
    }

    /// Folders ordered so every parent precedes its children.
    ///
    /// Parents outside the seed set are left for the database to check.
    fn folders_parents_first(&self) -> AppResult<Vec<&SeedFolder>> {
        let known: HashSet<&FolderId> = self.folders.iter().map(|f| &f.id).collect();
        let mut placed: HashSet<&FolderId> = HashSet::new();
        let mut pending: Vec<&SeedFolder> = self.folders.iter().collect();
        let mut ordered = Vec::with_capacity(pending.len());

        while !pending.is_empty() {
            let before = pending.len();
            pending.retain(|folder| {
                let ready = match &folder.parent_folder_id {
                    None => true,
                    Some(parent) => !known.contains(parent) || placed.contains(parent),
                };
                if ready {
                    placed.insert(&folder.id);
                    ordered.push(*folder);
                }
                !ready
            });
            if pending.len() == before {
                let ids: Vec<&str> = pending.iter().map(|f| f.id.as_str()).collect();
                return Err(AppError::validation(format!(
                    "Seed folders form a cycle: {}",
                    ids.join(", ")
                )));
            }
        }
        Ok(ordered)
    }
}

/// Result of a seed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SeedOutcome {
    /// The data was already present.
    Skipped,
    /// Rows inserted by this run.
    Loaded {
        folders: usize,
        collections: usize,
        cards: usize,
    },
}

/// Loads starter data once, gated by the [`DATA_LOADED_KEY`] flag.
#[derive(Debug, Clone)]
pub struct SeedLoader {
    store: Store,
    settings: Arc<dyn SettingsStore>,
    data: SeedData,
    owner: i64,
}

impl SeedLoader {
    /// Create a loader. Records without `createdByUser` are tagged `0`.
    pub fn new(store: Store, settings: Arc<dyn SettingsStore>, data: SeedData) -> Self {
        Self {
            store,
            settings,
            data,
            owner: 0,
        }
    }

    /// Tag records that lack `createdByUser` with `owner`.
    pub fn with_owner(mut self, owner: i64) -> Self {
        self.owner = owner;
        self
    }

    /// Whether the loaded flag is set.
    pub async fn is_loaded(&self) -> AppResult<bool> {
        self.settings.flag(DATA_LOADED_KEY).await
    }

    /// Insert the starter data unless it was loaded before.
    ///
    /// Everything goes in one transaction; the flag is set only after commit.
    pub async fn load(&self) -> AppResult<SeedOutcome> {
        if self.is_loaded().await? {
            info!("Starter data already loaded");
            return Ok(SeedOutcome::Skipped);
        }

        let folders = self.data.folders_parents_first()?;
        let pool = self.store.pool()?;
        let mut tx = pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin seed transaction", e)
        })?;

        if self.already_present(&mut tx).await? {
            drop(tx);
            warn!("Starter data found without a loaded flag; marking as loaded");
            self.settings.set_flag(DATA_LOADED_KEY, true).await?;
            return Ok(SeedOutcome::Skipped);
        }

        for folder in &folders {
            let data = CreateFolder::new(
                folder.name.clone(),
                FolderScope::from(folder.parent_folder_id.clone()),
                folder.created_by_user.unwrap_or(self.owner),
            );
            insert_folder(&mut *tx, &folder.id, &data)
                .await
                .map_err(|e| seed_error("folder", folder.id.as_str(), e))?;
        }

        let mut cards = 0;
        for collection in &self.data.collections {
            let owner = collection.created_by_user.unwrap_or(self.owner);
            let data = CreateCollection::new(
                collection.name.clone(),
                FolderScope::from(collection.folder_id.clone()),
                owner,
                collection.selected,
            );
            insert_collection(&mut *tx, &collection.id, &data)
                .await
                .map_err(|e| seed_error("collection", collection.id.as_str(), e))?;

            for card in &collection.cards {
                let data = CreateCard::new(
                    CardText::new(card.front_text.clone(), card.back_text.clone()),
                    collection.id.clone(),
                    owner,
                );
                insert_card(&mut *tx, &CardId::generate(), &data)
                    .await
                    .map_err(|e| seed_error("card", collection.id.as_str(), e))?;
                cards += 1;
            }
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit starter data", e)
        })?;
        self.settings.set_flag(DATA_LOADED_KEY, true).await?;

        let outcome = SeedOutcome::Loaded {
            folders: folders.len(),
            collections: self.data.collections.len(),
            cards,
        };
        info!(?outcome, "Starter data loaded");
        Ok(outcome)
    }

    /// Clear the flag and the stored data, then load again.
    ///
    /// With `drop_schema` the tables are dropped and re-created; otherwise
    /// their rows are deleted.
    pub async fn reset(&self, drop_schema: bool) -> AppResult<SeedOutcome> {
        warn!(drop_schema, "Resetting application data");
        self.settings.set_flag(DATA_LOADED_KEY, false).await?;

        if drop_schema {
            self.store.reset_schema().await?;
        } else {
            self.clear_rows().await?;
        }

        self.load().await
    }

    async fn clear_rows(&self) -> AppResult<()> {
        let pool = self.store.pool()?;
        let mut tx = pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        for table in ["cards", "collections", "folders"] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, format!("Failed to clear {table}"), e)
                })?;
        }
        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit data reset", e)
        })
    }

    async fn already_present(&self, tx: &mut Transaction<'_, Sqlite>) -> AppResult<bool> {
        for folder in &self.data.folders {
            let hit: Option<i64> = sqlx::query_scalar("SELECT 1 FROM folders WHERE id = ?1")
                .bind(&folder.id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to probe seed folders", e)
                })?;
            if hit.is_some() {
                return Ok(true);
            }
        }
        for collection in &self.data.collections {
            let hit: Option<i64> = sqlx::query_scalar("SELECT 1 FROM collections WHERE id = ?1")
                .bind(&collection.id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Database,
                        "Failed to probe seed collections",
                        e,
                    )
                })?;
            if hit.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(name: &str, raw: &str) -> AppResult<T> {
    serde_json::from_str(raw).map_err(|e| {
        AppError::with_source(
            ErrorKind::Serialization,
            format!("Invalid seed file {name}: {e}"),
            e,
        )
    })
}

fn seed_error(what: &str, id: &str, e: sqlx::Error) -> AppError {
    AppError::with_source(
        ErrorKind::Database,
        format!("Failed to insert seed {what} {id}"),
        e,
    )
}

fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettingsStore;

    async fn setup() -> (Store, Arc<MemorySettingsStore>, SeedLoader) {
        let store = Store::in_memory().await.unwrap();
        let settings = Arc::new(MemorySettingsStore::new());
        let loader = SeedLoader::new(
            store.clone(),
            settings.clone(),
            SeedData::builtin().unwrap(),
        );
        (store, settings, loader)
    }

    async fn count(store: &Store, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&store.pool().unwrap())
            .await
            .unwrap()
    }

    #[test]
    fn test_builtin_data_parses() {
        let data = SeedData::builtin().unwrap();
        assert_eq!(data.folders.len(), 6);
        let names: Vec<&str> = data.collections.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["English Irregular Verbs", "Kazakh Common Words"]);
        assert!(data.collections[0].selected);
        assert!(!data.collections[1].selected);
        assert!(data.card_count() > 0);
    }

    #[tokio::test]
    async fn test_load_twice_inserts_once() {
        let (store, settings, loader) = setup().await;
        let data = SeedData::builtin().unwrap();

        let first = loader.load().await.unwrap();
        assert_eq!(
            first,
            SeedOutcome::Loaded {
                folders: data.folders.len(),
                collections: data.collections.len(),
                cards: data.card_count(),
            }
        );
        assert!(settings.flag(DATA_LOADED_KEY).await.unwrap());

        assert_eq!(loader.load().await.unwrap(), SeedOutcome::Skipped);
        assert_eq!(count(&store, "folders").await, data.folders.len() as i64);
        assert_eq!(count(&store, "collections").await, data.collections.len() as i64);
        assert_eq!(count(&store, "cards").await, data.card_count() as i64);
    }

    #[tokio::test]
    async fn test_lost_flag_with_existing_rows_is_skipped() {
        let (store, settings, loader) = setup().await;
        loader.load().await.unwrap();
        settings.remove(DATA_LOADED_KEY).await.unwrap();

        assert_eq!(loader.load().await.unwrap(), SeedOutcome::Skipped);
        assert!(settings.flag(DATA_LOADED_KEY).await.unwrap());
        assert_eq!(count(&store, "folders").await, 6);
    }

    #[tokio::test]
    async fn test_reset_restores_starter_data() {
        let (store, _settings, loader) = setup().await;
        loader.load().await.unwrap();
        sqlx::query("INSERT INTO folders (id, name) VALUES ('mine', 'Mine')")
            .execute(&store.pool().unwrap())
            .await
            .unwrap();

        let outcome = loader.reset(false).await.unwrap();
        assert!(matches!(outcome, SeedOutcome::Loaded { folders: 6, .. }));
        assert_eq!(count(&store, "folders").await, 6);

        let outcome = loader.reset(true).await.unwrap();
        assert!(matches!(outcome, SeedOutcome::Loaded { collections: 2, .. }));
        assert_eq!(count(&store, "collections").await, 2);
    }

    #[tokio::test]
    async fn test_children_listed_before_parents_still_load() {
        let store = Store::in_memory().await.unwrap();
        let data: Vec<SeedFolder> = serde_json::from_str(
            r#"[
                {"id": "leaf", "name": "Leaf", "parentFolderId": "mid"},
                {"id": "mid", "name": "Mid", "parentFolderId": "top"},
                {"id": "top", "name": "Top"}
            ]"#,
        )
        .unwrap();
        let loader = SeedLoader::new(
            store.clone(),
            Arc::new(MemorySettingsStore::new()),
            SeedData {
                folders: data,
                collections: Vec::new(),
            },
        )
        .with_owner(7);

        let outcome = loader.load().await.unwrap();
        assert!(matches!(outcome, SeedOutcome::Loaded { folders: 3, .. }));
        let owner: i64 = sqlx::query_scalar("SELECT createdByUser FROM folders WHERE id = 'leaf'")
            .fetch_one(&store.pool().unwrap())
            .await
            .unwrap();
        assert_eq!(owner, 7);
    }

    #[tokio::test]
    async fn test_cyclic_seed_folders_are_rejected() {
        let store = Store::in_memory().await.unwrap();
        let settings = Arc::new(MemorySettingsStore::new());
        let folders: Vec<SeedFolder> = serde_json::from_str(
            r#"[
                {"id": "a", "name": "A", "parentFolderId": "b"},
                {"id": "b", "name": "B", "parentFolderId": "a"}
            ]"#,
        )
        .unwrap();
        let loader = SeedLoader::new(
            store.clone(),
            settings.clone(),
            SeedData {
                folders,
                collections: Vec::new(),
            },
        );

        let err = loader.load().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(!settings.flag(DATA_LOADED_KEY).await.unwrap());
        assert_eq!(count(&store, "folders").await, 0);
    }

    #[tokio::test]
    async fn test_failed_seed_rolls_back() {
        let store = Store::in_memory().await.unwrap();
        let settings = Arc::new(MemorySettingsStore::new());
        let collections: Vec<SeedCollection> = serde_json::from_str(
            r#"[{"id": "c", "name": "C", "folderId": "missing", "selected": 1, "cards": []}]"#,
        )
        .unwrap();
        assert!(collections[0].selected);
        let folders: Vec<SeedFolder> =
            serde_json::from_str(r#"[{"id": "ok", "name": "Ok"}]"#).unwrap();
        let loader = SeedLoader::new(
            store.clone(),
            settings.clone(),
            SeedData {
                folders,
                collections,
            },
        );

        assert!(loader.load().await.is_err());
        assert_eq!(count(&store, "folders").await, 0);
        assert!(!settings.flag(DATA_LOADED_KEY).await.unwrap());
    }

    #[tokio::test]
    async fn test_from_dir_reads_collection_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("collections")).unwrap();
        std::fs::write(
            dir.path().join("folders.json"),
            r#"[{"id": "f", "name": "F", "parentFolderId": null}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("collections").join("b.json"),
            r#"{"id": "b", "name": "B", "folderId": "f", "cards": [{"frontText": "x", "backText": "y"}]}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("collections").join("a.json"),
            r#"{"id": "a", "name": "A", "selected": false}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("collections").join("notes.txt"), "ignored").unwrap();

        let data = SeedData::from_dir(dir.path()).await.unwrap();
        let ids: Vec<&str> = data.collections.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(data.card_count(), 1);
    }
}
