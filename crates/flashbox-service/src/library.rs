//! The collaborator-facing facade over the three repositories.
//!
//! Every operation here is infallible from the caller's point of view:
//! lookups return `None` or an empty list, writes report whether they were
//! applied. Failures are logged.

use std::sync::Arc;

use flashbox_core::types::{CardId, CollectionId, FolderId};
use flashbox_database::Store;
use flashbox_database::repositories::{CardRepository, CollectionRepository, FolderRepository};
use flashbox_entity::card::{Card, CardText, CreateCard};
use flashbox_entity::collection::{Collection, CreateCollection};
use flashbox_entity::folder::{Breadcrumb, CreateFolder, Folder, FolderScope};

use crate::policy::{applied, listing, lookup, outcome};

/// Folder, collection, and card operations with degrade-on-failure semantics.
#[derive(Debug, Clone)]
pub struct Library {
    folder_repo: Arc<FolderRepository>,
    collection_repo: Arc<CollectionRepository>,
    card_repo: Arc<CardRepository>,
}

impl Library {
    /// Build the facade over a store handle.
    pub fn new(store: Store) -> Self {
        Self {
            folder_repo: Arc::new(FolderRepository::new(store.clone())),
            collection_repo: Arc::new(CollectionRepository::new(store.clone())),
            card_repo: Arc::new(CardRepository::new(store)),
        }
    }

    /// Folder repository shared with the other services.
    pub fn folder_repo(&self) -> Arc<FolderRepository> {
        Arc::clone(&self.folder_repo)
    }

    /// Collection repository shared with the other services.
    pub fn collection_repo(&self) -> Arc<CollectionRepository> {
        Arc::clone(&self.collection_repo)
    }

    /// Card repository shared with the other services.
    pub fn card_repo(&self) -> Arc<CardRepository> {
        Arc::clone(&self.card_repo)
    }

    // -- Folders --

    pub async fn create_folder(
        &self,
        name: &str,
        parent: FolderScope,
        created_by_user: i64,
    ) -> Option<FolderId> {
        let data = CreateFolder::new(name, parent, created_by_user);
        outcome("create_folder", self.folder_repo.create(&data).await).map(|f| f.id)
    }

    pub async fn rename_folder(&self, id: &FolderId, new_name: &str) -> bool {
        applied("rename_folder", self.folder_repo.rename(id, new_name).await)
    }

    /// Move a folder. Returns `false` when the destination is the folder
    /// itself or one of its descendants.
    pub async fn move_folder(&self, id: &FolderId, new_parent: &FolderScope) -> bool {
        applied(
            "move_folder",
            self.folder_repo.move_folder(id, new_parent).await,
        )
    }

    /// Delete a folder, its subtree, and everything filed in it.
    pub async fn delete_folder(&self, id: &FolderId) -> bool {
        outcome("delete_folder", self.folder_repo.delete(id).await)
            .is_some_and(|deletion| deletion.folders > 0)
    }

    pub async fn get_folders_by_parent_id(&self, parent: &FolderScope) -> Vec<Folder> {
        listing(
            "get_folders_by_parent_id",
            self.folder_repo.find_by_parent(parent).await,
        )
    }

    pub async fn get_folder_by_id(&self, id: &FolderId) -> Option<Folder> {
        lookup("get_folder_by_id", self.folder_repo.find_by_id(id).await)
    }

    pub async fn get_folders(&self) -> Vec<Folder> {
        listing("get_folders", self.folder_repo.find_all().await)
    }

    pub async fn get_all_descendants(&self, id: &FolderId) -> Vec<FolderId> {
        listing(
            "get_all_descendants",
            self.folder_repo.descendant_ids(id).await,
        )
    }

    /// Root-first ancestor chain ending at `id`. A broken parent link ends
    /// the chain early.
    pub async fn get_breadcrumb(&self, id: &FolderId) -> Breadcrumb {
        Breadcrumb::new(listing(
            "get_breadcrumb",
            self.folder_repo.find_ancestors(id).await,
        ))
    }

    // -- Collections --

    pub async fn create_collection(
        &self,
        name: &str,
        folder: FolderScope,
        created_by_user: i64,
        selected: bool,
    ) -> Option<CollectionId> {
        let data = CreateCollection::new(name, folder, created_by_user, selected);
        outcome(
            "create_collection",
            self.collection_repo.create(&data).await,
        )
        .map(|c| c.id)
    }

    pub async fn rename_collection(&self, id: &CollectionId, new_name: &str) -> bool {
        applied(
            "rename_collection",
            self.collection_repo.rename(id, new_name).await,
        )
    }

    pub async fn move_collection(&self, id: &CollectionId, folder: &FolderScope) -> bool {
        applied(
            "move_collection",
            self.collection_repo.move_to(id, folder).await,
        )
    }

    pub async fn set_selected(&self, id: &CollectionId, selected: bool) -> bool {
        applied(
            "set_selected",
            self.collection_repo.set_selected(id, selected).await,
        )
    }

    /// Delete a collection together with its cards.
    pub async fn delete_collection(&self, id: &CollectionId) -> bool {
        outcome("delete_collection", self.collection_repo.delete(id).await).unwrap_or(false)
    }

    pub async fn get_collections(&self) -> Vec<Collection> {
        listing("get_collections", self.collection_repo.find_all().await)
    }

    pub async fn get_collection_by_id(&self, id: &CollectionId) -> Option<Collection> {
        lookup(
            "get_collection_by_id",
            self.collection_repo.find_by_id(id).await,
        )
    }

    pub async fn get_collections_by_folder_id(&self, folder: &FolderScope) -> Vec<Collection> {
        listing(
            "get_collections_by_folder_id",
            self.collection_repo.find_by_folder(folder).await,
        )
    }

    pub async fn get_selected_collections(&self) -> Vec<Collection> {
        listing(
            "get_selected_collections",
            self.collection_repo.find_selected().await,
        )
    }

    // -- Cards --

    pub async fn create_card(
        &self,
        front_text: &str,
        back_text: &str,
        collection_id: &CollectionId,
        created_by_user: i64,
    ) -> Option<CardId> {
        let data = CreateCard::new(
            CardText::new(front_text, back_text),
            collection_id.clone(),
            created_by_user,
        );
        outcome("create_card", self.card_repo.create(&data).await).map(|c| c.id)
    }

    pub async fn update_card(&self, id: &CardId, front_text: &str, back_text: &str) -> bool {
        applied(
            "update_card",
            self.card_repo
                .update(id, &CardText::new(front_text, back_text))
                .await,
        )
    }

    pub async fn delete_card(&self, id: &CardId) -> bool {
        outcome("delete_card", self.card_repo.delete(id).await).unwrap_or(false)
    }

    pub async fn get_card_by_id(&self, id: &CardId) -> Option<Card> {
        lookup("get_card_by_id", self.card_repo.find_by_id(id).await)
    }

    pub async fn get_cards_by_collection(&self, collection_id: &CollectionId) -> Vec<Card> {
        listing(
            "get_cards_by_collection",
            self.card_repo.find_by_collection(collection_id).await,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unopened_store_degrades_instead_of_failing() {
        let store = Store::new(flashbox_core::config::DatabaseConfig::in_memory());
        let library = Library::new(store);

        assert!(library.get_folders().await.is_empty());
        assert!(library.get_folder_by_id(&FolderId::new("x")).await.is_none());
        assert!(
            library
                .create_folder("Nope", FolderScope::Root, 1)
                .await
                .is_none()
        );
        assert!(!library.set_selected(&CollectionId::new("x"), true).await);
    }

    #[tokio::test]
    async fn test_writes_to_missing_records_are_not_applied() {
        let library = Library::new(Store::in_memory().await.unwrap());
        assert!(!library.rename_folder(&FolderId::new("ghost"), "X").await);
        assert!(!library.delete_folder(&FolderId::new("ghost")).await);
        assert!(!library.delete_collection(&CollectionId::new("ghost")).await);
        assert!(!library.update_card(&CardId::new("ghost"), "a", "b").await);
        assert!(
            library
                .create_card("a", "b", &CollectionId::new("ghost"), 1)
                .await
                .is_none()
        );
    }
}
