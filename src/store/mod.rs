//! Local Object Store
//!
//! An in-memory mapping from `(collection, id)` to the latest known object
//! version, shared by every consumer view of the client. The store is the
//! single cache the sync engine keeps consistent with server state: the
//! applier is its only writer during normal operation, and the liveness
//! probe may wipe it wholesale when the session loses authorization.
//!
//! # Revision counters
//!
//! Every mutation bumps a global revision counter and records it per
//! collection and per object. Consumers poll `last_modified` /
//! `last_modified_object` to know when to re-derive their state; this
//! replaces a reactivity framework with explicit counters.
//!
//! # Relations
//!
//! Resolved relations are cached per referencing object. Evicting an object
//! drops every cached pointer to it (the referencing objects themselves
//! stay resident), so replacing an object can never serve a stale version
//! through a relation.

/// Relation metadata
pub mod relations;

pub use relations::RelationDef;

use crate::shared::envelope::CollectionKey;
use crate::shared::error::SyncError;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// State of one registered collection
#[derive(Debug, Default)]
struct CollectionState {
    /// Relations declared on this (referencing) collection
    relations: Vec<RelationDef>,
    /// Objects by id
    objects: HashMap<i64, Value>,
    /// Revision of the last mutation per object
    object_revisions: HashMap<i64, u64>,
    /// Revision of the last mutation touching this collection
    last_modified: u64,
    /// Cached resolved relations: (object id, foreign key) -> target key
    relation_cache: HashMap<(i64, String), CollectionKey>,
}

#[derive(Debug, Default)]
struct StoreInner {
    collections: HashMap<String, CollectionState>,
    revision: u64,
}

impl StoreInner {
    fn next_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    /// Drop every cached relation pointer targeting `key`, in any collection.
    fn drop_pointers_to(&mut self, key: &CollectionKey) {
        for state in self.collections.values_mut() {
            state.relation_cache.retain(|_, target| target != key);
        }
    }
}

/// In-memory object cache shared by all consumer views
#[derive(Debug, Default)]
pub struct Datastore {
    inner: RwLock<StoreInner>,
}

impl Datastore {
    /// Create an empty datastore
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection with its relation metadata.
    ///
    /// Envelopes naming an unregistered collection are skipped by the
    /// applier, so every collection the server pushes must be declared here.
    pub async fn register_collection(&self, name: impl Into<String>, relations: Vec<RelationDef>) {
        let name = name.into();
        let mut inner = self.inner.write().await;
        let state = inner.collections.entry(name).or_default();
        state.relations = relations;
    }

    /// Whether a collection has been registered
    pub async fn is_registered(&self, collection: &str) -> bool {
        self.inner.read().await.collections.contains_key(collection)
    }

    /// Get the latest known version of an object
    pub async fn get(&self, collection: &str, id: i64) -> Option<Value> {
        let inner = self.inner.read().await;
        inner
            .collections
            .get(collection)?
            .objects
            .get(&id)
            .cloned()
    }

    /// Get all objects of a collection, ordered by id
    pub async fn get_all(&self, collection: &str) -> Vec<Value> {
        let inner = self.inner.read().await;
        let Some(state) = inner.collections.get(collection) else {
            return Vec::new();
        };
        let mut ids: Vec<i64> = state.objects.keys().copied().collect();
        ids.sort_unstable();
        ids.iter()
            .filter_map(|id| state.objects.get(id).cloned())
            .collect()
    }

    /// Insert or replace a batch of objects.
    ///
    /// Each object is identified by its integer `id` field; objects without
    /// one are logged and skipped. Objects absent from the batch are left
    /// untouched -- a batch is a partial update, not a snapshot.
    pub async fn inject_batch(
        &self,
        collection: &str,
        objects: Vec<Value>,
    ) -> Result<(), SyncError> {
        let mut inner = self.inner.write().await;
        if !inner.collections.contains_key(collection) {
            return Err(SyncError::unknown_collection(collection));
        }
        let revision = inner.next_revision();

        let state = inner
            .collections
            .get_mut(collection)
            .ok_or_else(|| SyncError::unknown_collection(collection))?;
        for object in objects {
            let Some(id) = object.get("id").and_then(Value::as_i64) else {
                tracing::warn!(
                    "[Store] Object without integer id in '{}' batch, skipping",
                    collection
                );
                continue;
            };
            state.objects.insert(id, object);
            state.object_revisions.insert(id, revision);
            state.last_modified = revision;
        }
        Ok(())
    }

    /// Remove an object and drop every cached relation pointer to it.
    ///
    /// Referencing objects are kept; only their cached pointers are cleared,
    /// so a later resolve sees the replacement (or absence) instead of a
    /// stale version. Evicting an absent object is a no-op.
    pub async fn evict(&self, collection: &str, id: i64) -> Result<(), SyncError> {
        let mut inner = self.inner.write().await;
        if !inner.collections.contains_key(collection) {
            return Err(SyncError::unknown_collection(collection));
        }

        let key = CollectionKey::new(collection, id);
        let revision = inner.next_revision();
        if let Some(state) = inner.collections.get_mut(collection) {
            if state.objects.remove(&id).is_none() {
                return Ok(());
            }
            state.object_revisions.insert(id, revision);
            state.last_modified = revision;
            // Cached pointers held by the evicted object itself.
            state.relation_cache.retain(|(owner, _), _| *owner != id);
        }
        inner.drop_pointers_to(&key);
        Ok(())
    }

    /// Resolve the object referenced through `foreign_key` on
    /// `(collection, id)`, caching the resolved pointer.
    ///
    /// Returns `None` if the relation is not declared, the referencing
    /// object is absent, the foreign key is unset, or the target has been
    /// evicted.
    pub async fn resolve_relation(
        &self,
        collection: &str,
        id: i64,
        foreign_key: &str,
    ) -> Option<Value> {
        let mut inner = self.inner.write().await;

        let state = inner.collections.get(collection)?;
        let cache_key = (id, foreign_key.to_string());

        // Cached pointer; eviction would have removed it.
        if let Some(target) = state.relation_cache.get(&cache_key).cloned() {
            if let Some(data) = inner
                .collections
                .get(&target.collection)
                .and_then(|s| s.objects.get(&target.id))
            {
                return Some(data.clone());
            }
        }

        let state = inner.collections.get(collection)?;
        let def = state
            .relations
            .iter()
            .find(|d| d.foreign_key == foreign_key)?
            .clone();
        let target_id = state
            .objects
            .get(&id)?
            .get(foreign_key)
            .and_then(Value::as_i64)?;

        let data = inner
            .collections
            .get(&def.target_collection)?
            .objects
            .get(&target_id)
            .cloned()?;

        if let Some(state) = inner.collections.get_mut(collection) {
            state
                .relation_cache
                .insert(cache_key, CollectionKey::new(def.target_collection, target_id));
        }
        Some(data)
    }

    /// Wipe every object and cached relation, keeping registrations.
    ///
    /// Used when the liveness probe detects an authorization loss: the
    /// cached objects may no longer be valid for this session and must not
    /// be silently revived.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        let revision = inner.next_revision();
        for state in inner.collections.values_mut() {
            state.objects.clear();
            state.object_revisions.clear();
            state.relation_cache.clear();
            state.last_modified = revision;
        }
        tracing::info!("[Store] Cache cleared");
    }

    /// Revision of the last mutation touching a collection
    pub async fn last_modified(&self, collection: &str) -> u64 {
        let inner = self.inner.read().await;
        inner
            .collections
            .get(collection)
            .map(|s| s.last_modified)
            .unwrap_or(0)
    }

    /// Revision of the last mutation touching one object
    pub async fn last_modified_object(&self, collection: &str, id: i64) -> u64 {
        let inner = self.inner.read().await;
        inner
            .collections
            .get(collection)
            .and_then(|s| s.object_revisions.get(&id))
            .copied()
            .unwrap_or(0)
    }
}
