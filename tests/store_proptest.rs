//! Property-based tests for the store and the element reconciler

use podium::projector::{format_seconds, ElementList, ProjectorElement};
use podium::store::Datastore;
use proptest::prelude::*;
use serde_json::json;
use tokio_test::block_on;
use uuid::Uuid;

fn objects(max: usize) -> impl Strategy<Value = Vec<(i64, String)>> {
    proptest::collection::vec((1..1000i64, "[a-z]{1,8}"), 1..max)
}

proptest! {
    #[test]
    fn test_inject_is_idempotent(objects in objects(20)) {
        block_on(async {
            let store = Datastore::new();
            store.register_collection("agenda/item", vec![]).await;

            let batch: Vec<_> = objects
                .iter()
                .map(|(id, title)| json!({"id": id, "title": title}))
                .collect();
            store.inject_batch("agenda/item", batch.clone()).await.unwrap();
            let first = store.get_all("agenda/item").await;

            store.inject_batch("agenda/item", batch).await.unwrap();
            let second = store.get_all("agenda/item").await;

            prop_assert_eq!(first, second);
            Ok(())
        })?;
    }

    #[test]
    fn test_get_all_sorted_by_id(objects in objects(20)) {
        block_on(async {
            let store = Datastore::new();
            store.register_collection("agenda/item", vec![]).await;
            let batch: Vec<_> = objects
                .iter()
                .map(|(id, title)| json!({"id": id, "title": title}))
                .collect();
            store.inject_batch("agenda/item", batch).await.unwrap();

            let ids: Vec<i64> = store
                .get_all("agenda/item")
                .await
                .iter()
                .filter_map(|o| o["id"].as_i64())
                .collect();
            let mut sorted = ids.clone();
            sorted.sort_unstable();
            prop_assert_eq!(ids, sorted);
            Ok(())
        })?;
    }

    #[test]
    fn test_evict_then_inject_restores(objects in objects(10)) {
        block_on(async {
            let store = Datastore::new();
            store.register_collection("agenda/item", vec![]).await;
            let batch: Vec<_> = objects
                .iter()
                .map(|(id, title)| json!({"id": id, "title": title}))
                .collect();
            store.inject_batch("agenda/item", batch.clone()).await.unwrap();
            let before = store.get_all("agenda/item").await;

            for (id, _) in &objects {
                store.evict("agenda/item", *id).await.unwrap();
            }
            prop_assert!(store.get_all("agenda/item").await.is_empty());

            store.inject_batch("agenda/item", batch).await.unwrap();
            prop_assert_eq!(store.get_all("agenda/item").await, before);
            Ok(())
        })?;
    }

    #[test]
    fn test_reconcile_matches_target_order(ids in proptest::collection::vec(0..50u8, 0..20)) {
        let mut list = ElementList::new();
        // Seed with an arbitrary prefix so reconciliation has survivors.
        let seed: Vec<ProjectorElement> = ids
            .iter()
            .take(ids.len() / 2)
            .map(|&id| element(id))
            .collect();
        list.reconcile(seed);

        let target: Vec<ProjectorElement> = dedup(&ids).into_iter().map(element).collect();
        let expected: Vec<Uuid> = target.iter().map(|e| e.uuid).collect();
        list.reconcile(target);

        let actual: Vec<Uuid> = list.entries().iter().map(|e| e.element.uuid).collect();
        prop_assert_eq!(actual, expected);

        // Render identities stay unique.
        let mut instances: Vec<u64> = list.entries().iter().map(|e| e.instance).collect();
        instances.sort_unstable();
        instances.dedup();
        prop_assert_eq!(instances.len(), list.len());
    }

    #[test]
    fn test_format_seconds_reconstructs(total in -86_400i64..86_400) {
        let formatted = format_seconds(total);
        let negative = formatted.starts_with('-');
        let parts: Vec<i64> = formatted
            .trim_start_matches('-')
            .split(':')
            .map(|p| p.parse().expect("numeric component"))
            .collect();
        let magnitude = parts.iter().fold(0i64, |acc, part| acc * 60 + part);
        let reconstructed = if negative { -magnitude } else { magnitude };
        prop_assert_eq!(reconstructed, total);
    }
}

fn element(id: u8) -> ProjectorElement {
    let mut element = ProjectorElement::new("core/clock");
    element.uuid = Uuid::from_u128(id as u128);
    element
}

fn dedup(ids: &[u8]) -> Vec<u8> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
