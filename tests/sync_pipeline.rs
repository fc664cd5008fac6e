//! End-to-end sync pipeline tests
//!
//! Drive scripted wire batches through the connection manager and applier
//! and assert on the resulting store and view state.

mod common;

use common::{batch, changed, deleted, open_link, settle, ScriptedTransport};
use podium::projector::{ProjectorView, SlideRegistry, PROJECTOR_COLLECTION};
use podium::store::Datastore;
use podium::sync::{ConnectionManager, SyncApplier};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

async fn pipeline(
    transport: Arc<ScriptedTransport>,
) -> (Arc<Datastore>, Arc<ConnectionManager>, tokio::task::JoinHandle<()>) {
    let store = Arc::new(Datastore::new());
    store.register_collection(PROJECTOR_COLLECTION, vec![]).await;
    store.register_collection("agenda/item", vec![]).await;

    let manager = Arc::new(ConnectionManager::new(transport, Duration::from_millis(10)));
    manager
        .on_message(Arc::new(SyncApplier::new(store.clone())))
        .await;

    let runner = manager.clone();
    let handle = tokio::spawn(async move { runner.run().await });
    (store, manager, handle)
}

async fn settle_store(store: &Datastore, collection: &str, revision: u64) {
    for _ in 0..200 {
        if store.last_modified(collection).await >= revision {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_batches_populate_store() {
    let transport = Arc::new(ScriptedTransport::new(vec![open_link(
        vec![batch(vec![
            changed("agenda/item", json!({"id": 1, "title": "Opening"})),
            changed("agenda/item", json!({"id": 2, "title": "Budget"})),
        ])],
        true,
    )]));
    let (store, manager, handle) = pipeline(transport).await;

    settle_store(&store, "agenda/item", 1).await;
    manager.shutdown();
    let _ = handle.await;

    let items = store.get_all("agenda/item").await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["title"], "Opening");
}

#[tokio::test(start_paused = true)]
async fn test_later_batch_supersedes_earlier() {
    let transport = Arc::new(ScriptedTransport::new(vec![open_link(
        vec![
            batch(vec![changed("agenda/item", json!({"id": 1, "title": "Draft"}))]),
            batch(vec![
                changed("agenda/item", json!({"id": 1, "title": "Final"})),
                deleted("agenda/item", 2),
            ]),
        ],
        true,
    )]));
    let (store, manager, handle) = pipeline(transport).await;

    settle_store(&store, "agenda/item", 2).await;
    manager.shutdown();
    let _ = handle.await;

    let item = store.get("agenda/item", 1).await.unwrap();
    assert_eq!(item["title"], "Final");
}

#[tokio::test(start_paused = true)]
async fn test_store_survives_reconnect() {
    // First link delivers one batch and closes; the second delivers another.
    // The store keeps earlier state across the gap.
    let transport = Arc::new(ScriptedTransport::new(vec![
        open_link(
            vec![batch(vec![changed(
                "agenda/item",
                json!({"id": 1, "title": "Opening"}),
            )])],
            false,
        ),
        open_link(
            vec![batch(vec![changed(
                "agenda/item",
                json!({"id": 2, "title": "Budget"}),
            )])],
            true,
        ),
    ]));
    let (store, manager, handle) = pipeline(transport.clone()).await;

    settle_store(&store, "agenda/item", 2).await;
    manager.shutdown();
    let _ = handle.await;

    assert_eq!(transport.attempts(), 2);
    assert_eq!(store.get_all("agenda/item").await.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_batch_does_not_stall_channel() {
    let transport = Arc::new(ScriptedTransport::new(vec![open_link(
        vec![
            "not json".to_string(),
            batch(vec![changed("agenda/item", json!({"id": 1, "title": "Opening"}))]),
        ],
        true,
    )]));
    let (store, manager, handle) = pipeline(transport).await;

    settle_store(&store, "agenda/item", 1).await;
    manager.shutdown();
    let _ = handle.await;

    assert_eq!(store.get_all("agenda/item").await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_view_follows_synced_projector() {
    let element = json!({
        "uuid": "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
        "name": "core/clock"
    });
    let transport = Arc::new(ScriptedTransport::new(vec![open_link(
        vec![batch(vec![changed(
            PROJECTOR_COLLECTION,
            json!({"id": 1, "elements": [element], "scroll": 2}),
        )])],
        true,
    )]));
    let (store, manager, handle) = pipeline(transport).await;

    settle_store(&store, PROJECTOR_COLLECTION, 1).await;
    manager.shutdown();
    let _ = handle.await;

    let mut view = ProjectorView::new(1, store, SlideRegistry::with_core_slides());
    assert!(view.refresh().await);
    assert_eq!(view.elements().len(), 1);
    assert_eq!(view.elements()[0].element.name, "core/clock");
    assert_eq!(view.scroll_offset(), -500);
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_server_keeps_retrying() {
    let transport = Arc::new(ScriptedTransport::new(vec![]));
    let manager = Arc::new(ConnectionManager::new(
        transport.clone(),
        Duration::from_millis(10),
    ));

    let runner = manager.clone();
    let handle = tokio::spawn(async move { runner.run().await });

    let probe = transport.clone();
    settle(move || probe.attempts() >= 5).await;
    manager.shutdown();
    let _ = handle.await;

    assert!(transport.attempts() >= 5);
}
