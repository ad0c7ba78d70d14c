//! Folder tree building, breadcrumbs, and move pickers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use flashbox_core::error::AppError;
use flashbox_core::types::{CollectionId, FolderId};
use flashbox_database::repositories::{CollectionRepository, FolderRepository};
use flashbox_entity::collection::Collection;
use flashbox_entity::folder::{Breadcrumb, Folder, FolderNode, FolderScope, FolderTree};

/// Everything filed directly under one scope.
#[derive(Debug, Clone, Serialize)]
pub struct FolderContents {
    /// The scope that was listed.
    pub scope: FolderScope,
    /// Child folders.
    pub folders: Vec<Folder>,
    /// Collections filed here.
    pub collections: Vec<Collection>,
}

/// Builds folder trees and resolves navigation paths.
#[derive(Debug, Clone)]
pub struct TreeService {
    /// Folder repository.
    folder_repo: Arc<FolderRepository>,
    /// Collection repository.
    collection_repo: Arc<CollectionRepository>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(
        folder_repo: Arc<FolderRepository>,
        collection_repo: Arc<CollectionRepository>,
    ) -> Self {
        Self {
            folder_repo,
            collection_repo,
        }
    }

    /// Folders a folder may be moved under.
    ///
    /// Excludes the folder itself and all of its descendants. The root is
    /// always a valid destination and is not part of the list.
    pub async fn move_destinations(&self, folder_id: &FolderId) -> Result<Vec<Folder>, AppError> {
        if self.folder_repo.find_by_id(folder_id).await?.is_none() {
            return Err(AppError::not_found(format!("Folder {folder_id} not found")));
        }

        let mut excluded: HashSet<FolderId> = self
            .folder_repo
            .descendant_ids(folder_id)
            .await?
            .into_iter()
            .collect();
        excluded.insert(folder_id.clone());

        let all = self.folder_repo.find_all().await?;
        Ok(all.into_iter().filter(|f| !excluded.contains(&f.id)).collect())
    }

    /// Breadcrumb from the root down to `folder_id`.
    pub async fn folder_path(&self, folder_id: &FolderId) -> Result<Breadcrumb, AppError> {
        Ok(Breadcrumb::new(
            self.folder_repo.find_ancestors(folder_id).await?,
        ))
    }

    /// Breadcrumb of the folder a collection is filed in. Empty for unfiled collections.
    pub async fn collection_path(
        &self,
        collection_id: &CollectionId,
    ) -> Result<Breadcrumb, AppError> {
        let collection = self
            .collection_repo
            .find_by_id(collection_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Collection {collection_id} not found")))?;

        match &collection.folder_id {
            Some(folder_id) => self.folder_path(folder_id).await,
            None => Ok(Breadcrumb::default()),
        }
    }

    /// Child folders and collections directly under a scope.
    pub async fn contents(&self, scope: &FolderScope) -> Result<FolderContents, AppError> {
        if let FolderScope::Under(id) = scope {
            if self.folder_repo.find_by_id(id).await?.is_none() {
                return Err(AppError::not_found(format!("Folder {id} not found")));
            }
        }

        Ok(FolderContents {
            scope: scope.clone(),
            folders: self.folder_repo.find_by_parent(scope).await?,
            collections: self.collection_repo.find_by_folder(scope).await?,
        })
    }

    /// Nested folder tree below a scope, with per-folder collection counts.
    pub async fn tree(&self, scope: &FolderScope) -> Result<FolderTree, AppError> {
        let folders = self.folder_repo.find_all().await?;
        let collections = self.collection_repo.find_all().await?;

        let mut collection_counts: HashMap<&FolderId, u64> = HashMap::new();
        for collection in &collections {
            if let Some(folder_id) = &collection.folder_id {
                *collection_counts.entry(folder_id).or_default() += 1;
            }
        }

        let mut children: HashMap<Option<&FolderId>, Vec<&Folder>> = HashMap::new();
        for folder in &folders {
            children
                .entry(folder.parent_folder_id.as_ref())
                .or_default()
                .push(folder);
        }

        let mut visited = HashSet::new();
        if let FolderScope::Under(id) = scope {
            visited.insert(id);
        }
        let roots = build_nodes(
            scope.parent_id(),
            &children,
            &collection_counts,
            &mut visited,
        );
        Ok(FolderTree::from_roots(roots))
    }
}

/// Builds the nodes under `parent`. Folders already placed are skipped so a
/// corrupted parent chain cannot recurse forever.
fn build_nodes<'a>(
    parent: Option<&'a FolderId>,
    children: &HashMap<Option<&'a FolderId>, Vec<&'a Folder>>,
    collection_counts: &HashMap<&'a FolderId, u64>,
    visited: &mut HashSet<&'a FolderId>,
) -> Vec<FolderNode> {
    let Some(direct) = children.get(&parent) else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(direct.len());
    for folder in direct {
        if !visited.insert(&folder.id) {
            continue;
        }
        nodes.push(FolderNode {
            id: folder.id.clone(),
            name: folder.name.clone(),
            collection_count: collection_counts.get(&folder.id).copied().unwrap_or(0),
            children: build_nodes(Some(&folder.id), children, collection_counts, visited),
        });
    }
    nodes
}
