//! Projector wire model
//!
//! A projector is one logical display target holding an ordered list of
//! content elements. Projector records are mutated exclusively by
//! server-origin sync; this client only consumes them out of the store.

use crate::shared::error::SyncError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Collection name of projector records
pub const PROJECTOR_COLLECTION: &str = "core/projector";

/// One content element on a projector.
///
/// `uuid` is the sole render identity used for reconciliation; `name` plus
/// `id` identify the *content*, not the rendered instance. Unknown fields
/// are carried opaquely in `extra`; keys prefixed with `_` are treated as
/// private to the rendering layer and never overwritten by sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectorElement {
    /// Stable render identity, assigned once per element instance
    pub uuid: Uuid,
    /// Content-type identifier, e.g. `core/clock`
    pub name: String,
    /// Id of the projected object, if the content type projects one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Stable elements survive a prune of the projector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stable: Option<bool>,
    /// Template attached by the content-type registry; never on the wire
    #[serde(skip)]
    pub template: Option<String>,
    /// All remaining fields, preserved opaquely
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectorElement {
    /// Create an element of the given content type with a fresh identity
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            id: None,
            stable: None,
            template: None,
            extra: Map::new(),
        }
    }

    /// Set the projected object id
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Set an opaque field
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// One logical display target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projector {
    /// Projector id; one record per physical display
    pub id: i64,
    /// Ordered list of content elements
    #[serde(default)]
    pub elements: Vec<ProjectorElement>,
    /// Whether the display is blanked
    #[serde(default)]
    pub blank: bool,
    /// Scroll position, in steps
    #[serde(default)]
    pub scroll: i64,
    /// Id of the projector this display mirrors; 0 = none
    #[serde(default)]
    pub broadcast: i64,
    /// All remaining fields, preserved opaquely
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Projector {
    /// Deserialize a projector from its stored representation
    pub fn from_value(value: &Value) -> Result<Self, SyncError> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_element_builder() {
        let element = ProjectorElement::new("core/countdown")
            .with_id(3)
            .with_field("fullscreen", json!(true));
        assert_eq!(element.name, "core/countdown");
        assert_eq!(element.id, Some(3));
        assert_eq!(element.extra["fullscreen"], json!(true));
    }

    #[test]
    fn test_element_deserialization_preserves_unknown_fields() {
        let raw = json!({
            "uuid": "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
            "name": "core/message",
            "id": 2,
            "message_text": "welcome"
        });
        let element: ProjectorElement = serde_json::from_value(raw).unwrap();
        assert_eq!(element.extra["message_text"], "welcome");
        assert!(element.template.is_none());
    }

    #[test]
    fn test_projector_defaults() {
        let projector = Projector::from_value(&json!({"id": 1})).unwrap();
        assert!(projector.elements.is_empty());
        assert!(!projector.blank);
        assert_eq!(projector.scroll, 0);
        assert_eq!(projector.broadcast, 0);
    }

    #[test]
    fn test_projector_roundtrip() {
        let raw = json!({
            "id": 1,
            "blank": true,
            "scroll": 2,
            "broadcast": 0,
            "width": 1024,
            "elements": [{
                "uuid": "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
                "name": "core/clock"
            }]
        });
        let projector = Projector::from_value(&raw).unwrap();
        assert!(projector.blank);
        assert_eq!(projector.scroll, 2);
        assert_eq!(projector.extra["width"], 1024);
        assert_eq!(projector.elements.len(), 1);
    }
}
