//! Integration tests for the library facade over a file-backed store.

mod helpers;

use flashbox_core::types::FolderId;
use flashbox_entity::folder::FolderScope;

#[tokio::test]
async fn test_created_folder_reads_back() {
    let app = helpers::TestApp::new().await;
    let lib = &app.ctx.library;

    let root = lib.create_folder("Languages", FolderScope::Root, 3).await.unwrap();
    let child = lib
        .create_folder("Kazakh", FolderScope::Under(root.clone()), 3)
        .await
        .unwrap();

    let folder = lib.get_folder_by_id(&child).await.unwrap();
    assert_eq!(folder.name, "Kazakh");
    assert_eq!(folder.parent_folder_id, Some(root.clone()));
    assert_eq!(folder.created_by_user, 3);

    let roots = lib.get_folders_by_parent_id(&FolderScope::Root).await;
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].id, root);
}

#[tokio::test]
async fn test_delete_folder_clears_whole_subtree() {
    let app = helpers::TestApp::new().await;
    let lib = &app.ctx.library;

    let top = lib.create_folder("Top", FolderScope::Root, 1).await.unwrap();
    let mid = lib
        .create_folder("Mid", FolderScope::Under(top.clone()), 1)
        .await
        .unwrap();
    let leaf = lib
        .create_folder("Leaf", FolderScope::Under(mid.clone()), 1)
        .await
        .unwrap();
    let keep = lib.create_folder("Keep", FolderScope::Root, 1).await.unwrap();

    for folder in [&top, &mid, &leaf, &keep] {
        let collection = lib
            .create_collection("Deck", FolderScope::Under(folder.clone()), 1, false)
            .await
            .unwrap();
        lib.create_card("front", "back", &collection, 1).await.unwrap();
    }

    assert!(lib.delete_folder(&top).await);

    for folder in [&top, &mid, &leaf] {
        assert!(lib.get_folder_by_id(folder).await.is_none());
        assert!(
            lib.get_collections_by_folder_id(&FolderScope::Under(folder.clone()))
                .await
                .is_empty()
        );
    }
    assert!(lib.get_folder_by_id(&keep).await.is_some());
    assert_eq!(app.count("collections").await, 1);
    assert_eq!(app.count("cards").await, 1);
}

#[tokio::test]
async fn test_descendants_and_move_guard() {
    let app = helpers::TestApp::new().await;
    let lib = &app.ctx.library;

    let a = lib.create_folder("A", FolderScope::Root, 1).await.unwrap();
    let b = lib
        .create_folder("B", FolderScope::Under(a.clone()), 1)
        .await
        .unwrap();
    let c = lib
        .create_folder("C", FolderScope::Under(b.clone()), 1)
        .await
        .unwrap();
    let d = lib
        .create_folder("D", FolderScope::Under(a.clone()), 1)
        .await
        .unwrap();

    let mut descendants = lib.get_all_descendants(&a).await;
    descendants.sort();
    let mut expected = vec![b.clone(), c.clone(), d.clone()];
    expected.sort();
    assert_eq!(descendants, expected);

    let destinations: Vec<FolderId> = app
        .ctx
        .tree
        .move_destinations(&a)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.id)
        .collect();
    assert!(!destinations.contains(&b));
    assert!(!destinations.contains(&a));

    assert!(!lib.move_folder(&a, &FolderScope::Under(c.clone())).await);
    assert!(!lib.move_folder(&a, &FolderScope::Under(a.clone())).await);
    assert_eq!(
        lib.get_folder_by_id(&a).await.unwrap().parent_folder_id,
        None
    );

    assert!(lib.move_folder(&c, &FolderScope::Under(d.clone())).await);
    assert_eq!(lib.get_breadcrumb(&c).await.display_path(), "A / D / C");
}

#[tokio::test]
async fn test_selection_toggles() {
    let app = helpers::TestApp::new().await;
    let lib = &app.ctx.library;

    let id = lib
        .create_collection("Deck", FolderScope::Root, 1, false)
        .await
        .unwrap();
    assert!(!lib.get_collection_by_id(&id).await.unwrap().selected);

    assert!(lib.set_selected(&id, true).await);
    assert!(lib.set_selected(&id, true).await);
    assert_eq!(lib.get_selected_collections().await.len(), 1);

    assert!(lib.set_selected(&id, false).await);
    assert!(lib.get_selected_collections().await.is_empty());
}

#[tokio::test]
async fn test_card_update_keeps_identity() {
    let app = helpers::TestApp::new().await;
    let lib = &app.ctx.library;

    let collection = lib
        .create_collection("Deck", FolderScope::Root, 1, false)
        .await
        .unwrap();
    let card = lib.create_card("go", "went", &collection, 1).await.unwrap();

    let cards = lib.get_cards_by_collection(&collection).await;
    assert_eq!(cards.len(), 1);
    assert_eq!((cards[0].front_text.as_str(), cards[0].back_text.as_str()), ("go", "went"));

    assert!(lib.update_card(&card, "go", "went, gone").await);
    let updated = lib.get_card_by_id(&card).await.unwrap();
    assert_eq!(updated.id, card);
    assert_eq!(updated.collection_id, collection);
    assert_eq!(updated.back_text, "went, gone");

    assert!(lib.delete_card(&card).await);
    assert!(lib.get_cards_by_collection(&collection).await.is_empty());
}

#[tokio::test]
async fn test_delete_collection_removes_its_cards() {
    let app = helpers::TestApp::new().await;
    let lib = &app.ctx.library;

    let collection = lib
        .create_collection("Deck", FolderScope::Root, 1, true)
        .await
        .unwrap();
    lib.create_card("a", "b", &collection, 1).await.unwrap();
    lib.create_card("c", "d", &collection, 1).await.unwrap();

    assert!(lib.delete_collection(&collection).await);
    assert_eq!(app.count("cards").await, 0);
    assert!(app.ctx.study.pool().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_languages_walkthrough() {
    let app = helpers::TestApp::new().await;
    let lib = &app.ctx.library;

    let languages = lib.create_folder("Languages", FolderScope::Root, 1).await.unwrap();
    let kazakh = lib
        .create_folder("Kazakh", FolderScope::Under(languages.clone()), 1)
        .await
        .unwrap();
    let words = lib
        .create_collection("Common Words", FolderScope::Under(kazakh.clone()), 1, false)
        .await
        .unwrap();
    lib.create_card("сәлем", "hello", &words, 1).await.unwrap();

    let cards = lib.get_cards_by_collection(&words).await;
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].front_text, "сәлем");
    assert_eq!(cards[0].back_text, "hello");

    assert!(lib.set_selected(&words, true).await);
    assert!(
        lib.get_selected_collections()
            .await
            .iter()
            .any(|c| c.id == words)
    );
    assert_eq!(
        app.ctx.study.draw().await.unwrap().unwrap().front_text,
        "сәлем"
    );

    assert!(lib.delete_folder(&languages).await);
    let folders = lib.get_folders().await;
    assert!(folders.iter().all(|f| f.id != languages && f.id != kazakh));
    assert!(lib.get_collections().await.iter().all(|c| c.id != words));
    assert_eq!(app.count("cards").await, 0);
}
