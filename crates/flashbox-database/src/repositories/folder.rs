//! Folder repository implementation.

use std::collections::HashSet;

use serde::Serialize;
use sqlx::{Executor, Sqlite};
use tracing::{debug, info, warn};

use flashbox_core::error::{AppError, ErrorKind};
use flashbox_core::result::AppResult;
use flashbox_core::types::FolderId;
use flashbox_entity::folder::{CreateFolder, Folder, FolderScope};

use crate::connection::Store;

/// Every folder strictly below `?1`. `UNION` keeps each id once and stops on a cycle.
const DESCENDANT_IDS: &str = "\
    WITH RECURSIVE subtree(id) AS ( \
        SELECT id FROM folders WHERE parentFolderId = ?1 \
        UNION \
        SELECT f.id FROM folders f INNER JOIN subtree s ON f.parentFolderId = s.id \
    ) SELECT id FROM subtree WHERE id != ?1";

const DESCENDANTS: &str = "\
    WITH RECURSIVE subtree(id) AS ( \
        SELECT id FROM folders WHERE parentFolderId = ?1 \
        UNION \
        SELECT f.id FROM folders f INNER JOIN subtree s ON f.parentFolderId = s.id \
    ) SELECT * FROM folders WHERE id IN (SELECT id FROM subtree) AND id != ?1 ORDER BY name ASC";

const DELETE_SUBTREE_CARDS: &str = "\
    WITH RECURSIVE subtree(id) AS ( \
        SELECT ?1 \
        UNION \
        SELECT f.id FROM folders f INNER JOIN subtree s ON f.parentFolderId = s.id \
    ) DELETE FROM cards WHERE collectionId IN \
        (SELECT id FROM collections WHERE folderId IN (SELECT id FROM subtree))";

const DELETE_SUBTREE_COLLECTIONS: &str = "\
    WITH RECURSIVE subtree(id) AS ( \
        SELECT ?1 \
        UNION \
        SELECT f.id FROM folders f INNER JOIN subtree s ON f.parentFolderId = s.id \
    ) DELETE FROM collections WHERE folderId IN (SELECT id FROM subtree)";

const DELETE_SUBTREE_FOLDERS: &str = "\
    WITH RECURSIVE subtree(id) AS ( \
        SELECT ?1 \
        UNION \
        SELECT f.id FROM folders f INNER JOIN subtree s ON f.parentFolderId = s.id \
    ) DELETE FROM folders WHERE id IN (SELECT id FROM subtree)";

/// Rows removed by a cascading folder delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FolderDeletion {
    /// The folder itself plus every descendant folder.
    pub folders: u64,
    /// Collections filed anywhere in the subtree.
    pub collections: u64,
    /// Cards belonging to those collections.
    pub cards: u64,
}

/// Repository for folder CRUD and tree queries.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    store: Store,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Find a folder by ID.
    pub async fn find_by_id(&self, id: &FolderId) -> AppResult<Option<Folder>> {
        let pool = self.store.pool()?;
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    /// List every folder, unordered by tree position.
    pub async fn find_all(&self) -> AppResult<Vec<Folder>> {
        let pool = self.store.pool()?;
        sqlx::query_as::<_, Folder>("SELECT * FROM folders ORDER BY name ASC")
            .fetch_all(&pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list folders", e))
    }

    /// List the folders directly inside a scope. `Root` lists top-level folders.
    pub async fn find_by_parent(&self, scope: &FolderScope) -> AppResult<Vec<Folder>> {
        let pool = self.store.pool()?;
        // `IS` matches NULL against NULL, so one statement serves both scopes.
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE parentFolderId IS ?1 ORDER BY name ASC",
        )
        .bind(scope.parent_id())
        .fetch_all(&pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list child folders", e))
    }

    /// IDs of every transitive descendant of a folder, each exactly once.
    pub async fn descendant_ids(&self, id: &FolderId) -> AppResult<Vec<FolderId>> {
        let pool = self.store.pool()?;
        let ids = descendant_ids(&pool, id).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list descendants", e)
        })?;
        debug!(folder_id = %id, count = ids.len(), "Resolved folder descendants");
        Ok(ids)
    }

    /// Every transitive descendant folder record.
    pub async fn find_descendants(&self, id: &FolderId) -> AppResult<Vec<Folder>> {
        let pool = self.store.pool()?;
        sqlx::query_as::<_, Folder>(DESCENDANTS)
            .bind(id)
            .fetch_all(&pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list descendants", e)
            })
    }

    /// Get the ancestor chain of a folder, root first, ending with the folder itself.
    ///
    /// The walk stops at a root, at a dangling parent reference, or at a
    /// folder already visited, so a corrupted cyclic tree still terminates.
    /// A missing starting folder yields an empty chain.
    pub async fn find_ancestors(&self, id: &FolderId) -> AppResult<Vec<Folder>> {
        let mut chain: Vec<Folder> = Vec::new();
        let mut visited: HashSet<FolderId> = HashSet::new();
        let mut current = Some(id.clone());

        while let Some(folder_id) = current.take() {
            if !visited.insert(folder_id.clone()) {
                warn!(folder_id = %folder_id, "Folder cycle detected while building breadcrumbs");
                break;
            }
            match self.find_by_id(&folder_id).await? {
                Some(folder) => {
                    current = folder.parent_folder_id.clone();
                    chain.push(folder);
                }
                None => {
                    if !chain.is_empty() {
                        warn!(folder_id = %folder_id, "Breadcrumb walk hit a missing parent folder");
                    }
                }
            }
        }

        chain.reverse();
        Ok(chain)
    }

    /// Create a new folder with a freshly generated ID.
    pub async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        self.create_with_id(&FolderId::generate(), data).await
    }

    /// Create a folder under a caller-supplied ID.
    pub async fn create_with_id(&self, id: &FolderId, data: &CreateFolder) -> AppResult<Folder> {
        let pool = self.store.pool()?;
        let folder = insert_folder(&pool, id, data)
            .await
            .map_err(|e| map_insert_error(e, id, &data.parent))?;

        info!(folder_id = %folder.id, parent = %data.parent, name = %folder.name, "Folder created");
        Ok(folder)
    }

    /// Rename a folder.
    pub async fn rename(&self, id: &FolderId, new_name: &str) -> AppResult<Folder> {
        let pool = self.store.pool()?;
        let folder =
            sqlx::query_as::<_, Folder>("UPDATE folders SET name = ?2 WHERE id = ?1 RETURNING *")
                .bind(id)
                .bind(new_name)
                .fetch_optional(&pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to rename folder", e)
                })?
                .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;

        info!(folder_id = %id, name = %new_name, "Folder renamed");
        Ok(folder)
    }

    /// Move a folder to a new parent.
    ///
    /// Rejects a move onto the folder itself or onto any of its descendants,
    /// so the tree stays acyclic whatever the caller offered as destinations.
    pub async fn move_folder(&self, id: &FolderId, new_parent: &FolderScope) -> AppResult<Folder> {
        let pool = self.store.pool()?;
        let mut tx = pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        if !folder_exists(&mut *tx, id).await? {
            return Err(AppError::not_found(format!("Folder {id} not found")));
        }

        if let FolderScope::Under(target) = new_parent {
            if target == id {
                return Err(AppError::validation(format!(
                    "Folder {id} cannot be moved into itself"
                )));
            }
            if !folder_exists(&mut *tx, target).await? {
                return Err(AppError::not_found(format!(
                    "Destination folder {target} not found"
                )));
            }
            let descendants = descendant_ids(&mut *tx, id).await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list descendants", e)
            })?;
            if descendants.contains(target) {
                return Err(AppError::validation(format!(
                    "Folder {id} cannot be moved into its descendant {target}"
                )));
            }
        }

        let folder = sqlx::query_as::<_, Folder>(
            "UPDATE folders SET parentFolderId = ?2 WHERE id = ?1 RETURNING *",
        )
        .bind(id)
        .bind(new_parent.parent_id())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to move folder", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit folder move", e)
        })?;

        info!(folder_id = %id, parent = %new_parent, "Folder moved");
        Ok(folder)
    }

    /// Delete a folder together with its whole subtree.
    ///
    /// Descendant folders, every collection filed in the subtree, and those
    /// collections' cards are removed in one transaction. Deleting a missing
    /// folder removes nothing.
    pub async fn delete(&self, id: &FolderId) -> AppResult<FolderDeletion> {
        let pool = self.store.pool()?;
        let mut tx = pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        if !folder_exists(&mut *tx, id).await? {
            debug!(folder_id = %id, "Delete requested for missing folder");
            return Ok(FolderDeletion::default());
        }

        let cards = sqlx::query(DELETE_SUBTREE_CARDS)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete cards", e))?
            .rows_affected();

        let collections = sqlx::query(DELETE_SUBTREE_COLLECTIONS)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete collections", e)
            })?
            .rows_affected();

        let folders = sqlx::query(DELETE_SUBTREE_FOLDERS)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete folders", e))?
            .rows_affected();

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit folder delete", e)
        })?;

        let deletion = FolderDeletion {
            folders,
            collections,
            cards,
        };
        info!(
            folder_id = %id,
            folders = deletion.folders,
            collections = deletion.collections,
            cards = deletion.cards,
            "Folder deleted"
        );
        Ok(deletion)
    }
}

/// Insert one folder row. Shared by the repository and the seed loader.
pub(crate) async fn insert_folder<'e, E>(
    executor: E,
    id: &FolderId,
    data: &CreateFolder,
) -> Result<Folder, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Folder>(
        "INSERT INTO folders (id, name, parentFolderId, createdByUser) \
         VALUES (?1, ?2, ?3, ?4) RETURNING *",
    )
    .bind(id)
    .bind(&data.name)
    .bind(data.parent.parent_id())
    .bind(data.created_by_user)
    .fetch_one(executor)
    .await
}

async fn descendant_ids<'e, E>(executor: E, id: &FolderId) -> Result<Vec<FolderId>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, FolderId>(DESCENDANT_IDS)
        .bind(id)
        .fetch_all(executor)
        .await
}

async fn folder_exists<'e, E>(executor: E, id: &FolderId) -> AppResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let found: Option<FolderId> = sqlx::query_scalar("SELECT id FROM folders WHERE id = ?1")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))?;
    Ok(found.is_some())
}

fn map_insert_error(e: sqlx::Error, id: &FolderId, parent: &FolderScope) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::conflict(format!("Folder {id} already exists"))
        }
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::not_found(format!("Parent folder {parent} not found"))
        }
        _ => AppError::with_source(ErrorKind::Database, "Failed to create folder", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> FolderRepository {
        FolderRepository::new(Store::in_memory().await.unwrap())
    }

    async fn add(repo: &FolderRepository, name: &str, parent: Option<&Folder>) -> Folder {
        let scope = FolderScope::from(parent.map(|p| p.id.clone()));
        repo.create(&CreateFolder::new(name, scope, 1)).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_then_find_matches_input() {
        let repo = repo().await;
        let root = add(&repo, "Languages", None).await;
        let child = add(&repo, "Kazakh", Some(&root)).await;

        let found = repo.find_by_id(&child.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Kazakh");
        assert_eq!(found.parent_folder_id, Some(root.id.clone()));
        assert_eq!(found.created_by_user, 1);
        assert!(repo.find_by_id(&FolderId::new("missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_parent_distinguishes_root() {
        let repo = repo().await;
        let a = add(&repo, "A", None).await;
        let b = add(&repo, "B", None).await;
        let a1 = add(&repo, "A1", Some(&a)).await;

        let roots = repo.find_by_parent(&FolderScope::Root).await.unwrap();
        let root_ids: Vec<_> = roots.iter().map(|f| f.id.clone()).collect();
        assert_eq!(root_ids, vec![a.id.clone(), b.id.clone()]);

        let under_a = repo.find_by_parent(&FolderScope::Under(a.id)).await.unwrap();
        assert_eq!(under_a.len(), 1);
        assert_eq!(under_a[0].id, a1.id);
    }

    #[tokio::test]
    async fn test_create_under_missing_parent_is_not_found() {
        let repo = repo().await;
        let err = repo
            .create(&CreateFolder::new(
                "Orphan",
                FolderScope::Under(FolderId::new("ghost")),
                1,
            ))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(repo.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_conflict() {
        let repo = repo().await;
        let id = FolderId::new("fixed");
        let data = CreateFolder::new("One", FolderScope::Root, 1);
        repo.create_with_id(&id, &data).await.unwrap();
        let err = repo.create_with_id(&id, &data).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_descendants_are_complete_and_unique() {
        let repo = repo().await;
        let root = add(&repo, "root", None).await;
        let a = add(&repo, "a", Some(&root)).await;
        let b = add(&repo, "b", Some(&root)).await;
        let a1 = add(&repo, "a1", Some(&a)).await;
        let a1x = add(&repo, "a1x", Some(&a1)).await;
        let _other = add(&repo, "other", None).await;

        let mut ids = repo.descendant_ids(&root.id).await.unwrap();
        ids.sort();
        let mut expected = vec![a.id, b.id, a1.id.clone(), a1x.id.clone()];
        expected.sort();
        assert_eq!(ids, expected);

        assert_eq!(repo.descendant_ids(&a1x.id).await.unwrap(), Vec::<FolderId>::new());
        assert_eq!(repo.find_descendants(&a1.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_move_rejects_self_and_descendants() {
        let repo = repo().await;
        let a = add(&repo, "a", None).await;
        let b = add(&repo, "b", Some(&a)).await;
        let c = add(&repo, "c", Some(&b)).await;

        let err = repo
            .move_folder(&a.id, &FolderScope::Under(a.id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = repo
            .move_folder(&a.id, &FolderScope::Under(c.id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let unchanged = repo.find_by_id(&a.id).await.unwrap().unwrap();
        assert!(unchanged.is_root());
    }

    #[tokio::test]
    async fn test_move_to_root_and_under_sibling() {
        let repo = repo().await;
        let a = add(&repo, "a", None).await;
        let b = add(&repo, "b", None).await;
        let c = add(&repo, "c", Some(&a)).await;

        let moved = repo
            .move_folder(&c.id, &FolderScope::Under(b.id.clone()))
            .await
            .unwrap();
        assert_eq!(moved.parent_folder_id, Some(b.id.clone()));

        let moved = repo.move_folder(&c.id, &FolderScope::Root).await.unwrap();
        assert!(moved.is_root());

        let err = repo
            .move_folder(&c.id, &FolderScope::Under(FolderId::new("ghost")))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rename_missing_folder_is_not_found() {
        let repo = repo().await;
        let a = add(&repo, "a", None).await;
        assert_eq!(repo.rename(&a.id, "renamed").await.unwrap().name, "renamed");
        let err = repo.rename(&FolderId::new("ghost"), "x").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_cascades_whole_subtree() {
        let store = Store::in_memory().await.unwrap();
        let repo = FolderRepository::new(store.clone());
        let root = add(&repo, "root", None).await;
        let child = add(&repo, "child", Some(&root)).await;
        let grandchild = add(&repo, "grandchild", Some(&child)).await;
        let keep = add(&repo, "keep", None).await;

        let pool = store.pool().unwrap();
        for (collection, folder) in [("c1", &child.id), ("c2", &grandchild.id), ("c3", &keep.id)] {
            sqlx::query("INSERT INTO collections (id, name, folderId) VALUES (?1, ?1, ?2)")
                .bind(collection)
                .bind(folder)
                .execute(&pool)
                .await
                .unwrap();
            sqlx::query(
                "INSERT INTO cards (id, frontText, backText, collectionId) VALUES (?1, 'f', 'b', ?2)",
            )
            .bind(format!("card-{collection}"))
            .bind(collection)
            .execute(&pool)
            .await
            .unwrap();
        }

        let deletion = repo.delete(&root.id).await.unwrap();
        assert_eq!(
            deletion,
            FolderDeletion {
                folders: 3,
                collections: 2,
                cards: 2
            }
        );

        for id in [&root.id, &child.id, &grandchild.id] {
            assert!(repo.find_by_id(id).await.unwrap().is_none());
        }
        let remaining: Vec<String> = sqlx::query_scalar("SELECT id FROM collections")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, vec!["c3".to_string()]);
        assert!(repo.find_by_id(&keep.id).await.unwrap().is_some());

        assert_eq!(repo.delete(&root.id).await.unwrap(), FolderDeletion::default());
    }

    #[tokio::test]
    async fn test_ancestors_are_root_first() {
        let repo = repo().await;
        let a = add(&repo, "Languages", None).await;
        let b = add(&repo, "Kazakh", Some(&a)).await;
        let c = add(&repo, "Verbs", Some(&b)).await;

        let names: Vec<String> = repo
            .find_ancestors(&c.id)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["Languages", "Kazakh", "Verbs"]);
        assert!(repo.find_ancestors(&FolderId::new("ghost")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ancestor_walk_terminates_on_cycle() {
        let store = Store::in_memory().await.unwrap();
        let repo = FolderRepository::new(store.clone());
        let a = add(&repo, "a", None).await;
        let b = add(&repo, "b", Some(&a)).await;

        // Corrupt the tree behind the repository's back.
        sqlx::query("UPDATE folders SET parentFolderId = ?1 WHERE id = ?2")
            .bind(&b.id)
            .bind(&a.id)
            .execute(&store.pool().unwrap())
            .await
            .unwrap();

        let chain = repo.find_ancestors(&b.id).await.unwrap();
        assert_eq!(chain.len(), 2);
        let descendants = repo.descendant_ids(&a.id).await.unwrap();
        assert_eq!(descendants, vec![b.id.clone()]);
    }

    #[tokio::test]
    async fn test_ancestor_walk_stops_at_dangling_parent() {
        let store = Store::in_memory().await.unwrap();
        let repo = FolderRepository::new(store.clone());
        let pool = store.pool().unwrap();

        // The in-memory store has a single connection, so the pragma sticks.
        sqlx::query("PRAGMA foreign_keys = OFF")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO folders (id, name, parentFolderId) VALUES \
             ('a', 'A', 'ghost'), ('b', 'B', 'a')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let names: Vec<String> = repo
            .find_ancestors(&FolderId::new("b"))
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
