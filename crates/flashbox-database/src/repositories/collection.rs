//! Collection repository implementation.

use sqlx::{Executor, Sqlite};
use tracing::info;

use flashbox_core::error::{AppError, ErrorKind};
use flashbox_core::result::AppResult;
use flashbox_core::types::CollectionId;
use flashbox_entity::collection::{Collection, CreateCollection};
use flashbox_entity::folder::FolderScope;

use crate::connection::Store;

/// Repository for collections, their folder placement, and study selection.
#[derive(Debug, Clone)]
pub struct CollectionRepository {
    store: Store,
}

impl CollectionRepository {
    /// Create a new collection repository.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Find a collection by ID.
    pub async fn find_by_id(&self, id: &CollectionId) -> AppResult<Option<Collection>> {
        let pool = self.store.pool()?;
        sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE id = ?1")
            .bind(id)
            .fetch_optional(&pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find collection", e))
    }

    /// List every collection.
    pub async fn find_all(&self) -> AppResult<Vec<Collection>> {
        let pool = self.store.pool()?;
        sqlx::query_as::<_, Collection>("SELECT * FROM collections ORDER BY name ASC")
            .fetch_all(&pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list collections", e)
            })
    }

    /// List the collections filed directly in a scope. `Root` lists unfiled ones.
    pub async fn find_by_folder(&self, scope: &FolderScope) -> AppResult<Vec<Collection>> {
        let pool = self.store.pool()?;
        sqlx::query_as::<_, Collection>(
            "SELECT * FROM collections WHERE folderId IS ?1 ORDER BY name ASC",
        )
        .bind(scope.parent_id())
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list folder collections", e)
        })
    }

    /// List the collections that make up the study pool.
    pub async fn find_selected(&self) -> AppResult<Vec<Collection>> {
        let pool = self.store.pool()?;
        sqlx::query_as::<_, Collection>(
            "SELECT * FROM collections WHERE selected != 0 ORDER BY name ASC",
        )
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list selected collections", e)
        })
    }

    /// Create a new collection with a freshly generated ID.
    pub async fn create(&self, data: &CreateCollection) -> AppResult<Collection> {
        self.create_with_id(&CollectionId::generate(), data).await
    }

    /// Create a collection under a caller-supplied ID.
    pub async fn create_with_id(
        &self,
        id: &CollectionId,
        data: &CreateCollection,
    ) -> AppResult<Collection> {
        let pool = self.store.pool()?;
        let collection = insert_collection(&pool, id, data)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    AppError::conflict(format!("Collection {id} already exists"))
                }
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::not_found(format!("Folder {} not found", data.folder))
                }
                _ => AppError::with_source(ErrorKind::Database, "Failed to create collection", e),
            })?;

        info!(
            collection_id = %collection.id,
            folder = %data.folder,
            selected = collection.selected,
            "Collection created"
        );
        Ok(collection)
    }

    /// Rename a collection.
    pub async fn rename(&self, id: &CollectionId, new_name: &str) -> AppResult<Collection> {
        let pool = self.store.pool()?;
        let collection = sqlx::query_as::<_, Collection>(
            "UPDATE collections SET name = ?2 WHERE id = ?1 RETURNING *",
        )
        .bind(id)
        .bind(new_name)
        .fetch_optional(&pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to rename collection", e))?
        .ok_or_else(|| AppError::not_found(format!("Collection {id} not found")))?;

        info!(collection_id = %id, name = %new_name, "Collection renamed");
        Ok(collection)
    }

    /// File a collection under another folder, or at the root.
    pub async fn move_to(&self, id: &CollectionId, folder: &FolderScope) -> AppResult<Collection> {
        let pool = self.store.pool()?;
        let collection = sqlx::query_as::<_, Collection>(
            "UPDATE collections SET folderId = ?2 WHERE id = ?1 RETURNING *",
        )
        .bind(id)
        .bind(folder.parent_id())
        .fetch_optional(&pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::not_found(format!("Folder {folder} not found"))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to move collection", e),
        })?
        .ok_or_else(|| AppError::not_found(format!("Collection {id} not found")))?;

        info!(collection_id = %id, folder = %folder, "Collection moved");
        Ok(collection)
    }

    /// Set study-pool membership. Setting the current value again changes nothing.
    pub async fn set_selected(&self, id: &CollectionId, selected: bool) -> AppResult<Collection> {
        let pool = self.store.pool()?;
        let collection = sqlx::query_as::<_, Collection>(
            "UPDATE collections SET selected = ?2 WHERE id = ?1 RETURNING *",
        )
        .bind(id)
        .bind(i64::from(selected))
        .fetch_optional(&pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update collection selection", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Collection {id} not found")))?;

        info!(collection_id = %id, selected, "Collection selection updated");
        Ok(collection)
    }

    /// Delete a collection and all of its cards in one transaction.
    ///
    /// Returns `false` when no such collection existed.
    pub async fn delete(&self, id: &CollectionId) -> AppResult<bool> {
        let pool = self.store.pool()?;
        let mut tx = pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let cards = sqlx::query("DELETE FROM cards WHERE collectionId = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete cards", e))?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM collections WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete collection", e)
            })?
            .rows_affected()
            > 0;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit collection delete", e)
        })?;

        if deleted {
            info!(collection_id = %id, cards, "Collection deleted");
        }
        Ok(deleted)
    }
}

/// Insert one collection row. Shared by the repository and the seed loader.
pub(crate) async fn insert_collection<'e, E>(
    executor: E,
    id: &CollectionId,
    data: &CreateCollection,
) -> Result<Collection, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Collection>(
        "INSERT INTO collections (id, name, folderId, createdByUser, selected) \
         VALUES (?1, ?2, ?3, ?4, ?5) RETURNING *",
    )
    .bind(id)
    .bind(&data.name)
    .bind(data.folder.parent_id())
    .bind(data.created_by_user)
    .bind(i64::from(data.selected))
    .fetch_one(executor)
    .await
}
