//! Relation metadata
//!
//! Collections can declare that their objects reference objects of another
//! collection through a foreign-key field (an agenda item references the
//! list of speakers, a chat message references its user). The datastore
//! caches resolved references and uses this metadata to drop every cached
//! pointer to an object when that object is evicted or replaced, so a stale
//! version is never served through a relation.

use serde::{Deserialize, Serialize};

/// One relation declared on a referencing collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    /// Collection the foreign key points into
    pub target_collection: String,
    /// Field on the referencing object holding the target id
    pub foreign_key: String,
}

impl RelationDef {
    /// Create a new relation definition
    pub fn new(target_collection: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            target_collection: target_collection.into(),
            foreign_key: foreign_key.into(),
        }
    }
}
