//! Change Envelopes
//!
//! This module defines the wire format of the push channel: each transport
//! message is a JSON array of change envelopes, every envelope describing the
//! insert/replace or delete of a single object in a named collection.
//!
//! # Decoding
//!
//! Decoding is tolerant in two layers:
//!
//! - A message that does not parse as a JSON array is dropped as a whole;
//!   the caller logs it and processing continues on the next message.
//! - A record inside a well-formed message that does not parse as an
//!   envelope (unknown action, `changed` without `data`) is logged and
//!   skipped; its siblings are still applied.
//!
//! Unknown fields inside `data` are preserved opaquely as JSON values.

use crate::shared::error::SyncError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Globally unique identity of an object instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionKey {
    /// Collection name, e.g. `agenda/item`
    pub collection: String,
    /// Object id within the collection
    pub id: i64,
}

impl CollectionKey {
    /// Create a new collection key
    pub fn new(collection: impl Into<String>, id: i64) -> Self {
        Self {
            collection: collection.into(),
            id,
        }
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.collection, self.id)
    }
}

/// Action carried by a change envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    /// The object was inserted or replaced; `data` holds the new version
    Changed,
    /// The object was deleted
    Deleted,
}

/// One change record describing the insert/replace or delete of one object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEnvelope {
    /// Collection the object belongs to
    pub collection: String,
    /// Object id within the collection
    pub id: i64,
    /// Whether the object changed or was deleted
    pub action: ChangeAction,
    /// New object version for `changed` envelopes; absent for `deleted`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ChangeEnvelope {
    /// The collection key this envelope targets
    pub fn key(&self) -> CollectionKey {
        CollectionKey::new(self.collection.clone(), self.id)
    }
}

/// All envelopes of one batch that target a single collection
///
/// Produced by [`group_by_collection`]. `touched` lists every id the group
/// names in arrival order, so the applier can evict stale versions before
/// injecting new ones.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionBatch {
    /// Collection all records in this group belong to
    pub collection: String,
    /// Ids of every record in the group, in arrival order
    pub touched: Vec<i64>,
    /// Payloads of `changed` records, in arrival order
    pub changed: Vec<Value>,
    /// Ids of `deleted` records, in arrival order
    pub deleted: Vec<i64>,
}

/// Decode one transport message into a sequence of change envelopes.
///
/// Returns an error only if the message as a whole is not a JSON array;
/// individually malformed records are logged and skipped.
pub fn decode_batch(raw: &str) -> Result<Vec<ChangeEnvelope>, SyncError> {
    let records: Vec<Value> = serde_json::from_str(raw)?;

    let mut envelopes = Vec::with_capacity(records.len());
    for record in records {
        match serde_json::from_value::<ChangeEnvelope>(record.clone()) {
            Ok(envelope) => {
                if envelope.action == ChangeAction::Changed && envelope.data.is_none() {
                    tracing::error!(
                        "[Sync] Changed envelope without data ({}), skipping record",
                        envelope.key()
                    );
                    continue;
                }
                envelopes.push(envelope);
            }
            Err(e) => {
                tracing::error!("[Sync] Undecodable change record, skipping: {} ({})", e, record);
            }
        }
    }
    Ok(envelopes)
}

/// Group envelopes by collection, preserving arrival order.
///
/// Collections appear in the order of their first envelope; records keep
/// their order within each group. For repeated ids within one batch the
/// later envelope supersedes the earlier one, so a `deleted` record followed
/// by a `changed` record for the same key leaves the object present, and
/// vice versa.
pub fn group_by_collection(envelopes: Vec<ChangeEnvelope>) -> Vec<CollectionBatch> {
    let mut groups: Vec<CollectionBatch> = Vec::new();

    for envelope in envelopes {
        let index = match groups.iter().position(|g| g.collection == envelope.collection) {
            Some(index) => index,
            None => {
                groups.push(CollectionBatch {
                    collection: envelope.collection.clone(),
                    touched: Vec::new(),
                    changed: Vec::new(),
                    deleted: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[index];

        if !group.touched.contains(&envelope.id) {
            group.touched.push(envelope.id);
        }

        // Last envelope for a key wins within one batch.
        match envelope.action {
            ChangeAction::Changed => {
                group.deleted.retain(|id| *id != envelope.id);
                group
                    .changed
                    .retain(|payload| payload.get("id").and_then(Value::as_i64) != Some(envelope.id));
                if let Some(data) = envelope.data {
                    group.changed.push(data);
                }
            }
            ChangeAction::Deleted => {
                group
                    .changed
                    .retain(|payload| payload.get("id").and_then(Value::as_i64) != Some(envelope.id));
                group.deleted.retain(|id| *id != envelope.id);
                group.deleted.push(envelope.id);
            }
        }
    }

    groups
}
