//! Synchronization Applier
//!
//! Bridges the push channel and the local object store: every raw message is
//! decoded into change envelopes, grouped by collection, and applied. After
//! a batch fully applies the store reflects exactly the union of explicit
//! changes in that batch.
//!
//! For each collection group, in arrival order:
//!
//! 1. every object the group names that is currently present is evicted
//!    first, so relation cleanup runs against the *old* version before the
//!    replacement lands (field values, not just presence, determine
//!    relation targets);
//! 2. all `changed` payloads are injected in one call (bulk injection
//!    avoids redundant derived-state recomputation);
//! 3. every `deleted` id is evicted.
//!
//! A malformed message is dropped with a diagnostic; an unknown collection
//! skips its group only. Neither aborts the sync loop.

use crate::shared::envelope::{decode_batch, group_by_collection, CollectionBatch};
use crate::store::Datastore;
use crate::sync::connection::MessageReceiver;
use async_trait::async_trait;
use std::sync::Arc;

/// Applies decoded change batches to the datastore
pub struct SyncApplier {
    store: Arc<Datastore>,
}

impl SyncApplier {
    /// Create an applier writing to the given store
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }

    /// Apply one grouped collection batch
    async fn apply_group(&self, group: CollectionBatch) {
        if !self.store.is_registered(&group.collection).await {
            tracing::error!(
                "[Sync] Unknown collection '{}', skipping {} record(s)",
                group.collection,
                group.touched.len()
            );
            return;
        }

        // Evict stale versions before the replacements land.
        for id in &group.touched {
            if self.store.get(&group.collection, *id).await.is_some() {
                if let Err(e) = self.store.evict(&group.collection, *id).await {
                    tracing::error!("[Sync] Evicting {}:{} failed: {}", group.collection, id, e);
                }
            }
        }

        if !group.changed.is_empty() {
            if let Err(e) = self
                .store
                .inject_batch(&group.collection, group.changed)
                .await
            {
                tracing::error!("[Sync] Injecting into '{}' failed: {}", group.collection, e);
            }
        }

        for id in group.deleted {
            if let Err(e) = self.store.evict(&group.collection, id).await {
                tracing::error!("[Sync] Evicting {}:{} failed: {}", group.collection, id, e);
            }
        }
    }
}

#[async_trait]
impl MessageReceiver for SyncApplier {
    async fn on_message(&self, raw: &str) {
        let envelopes = match decode_batch(raw) {
            Ok(envelopes) => envelopes,
            Err(e) => {
                tracing::error!("[Sync] Dropping malformed batch: {}", e);
                return;
            }
        };

        for group in group_by_collection(envelopes) {
            self.apply_group(group).await;
        }
    }
}
