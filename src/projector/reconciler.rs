//! Element Reconciler
//!
//! Updates a rendered ordered list of projector elements to match a newly
//! computed target list while preserving the identity of entries that
//! persist. A destructive full re-render would make unrelated elements
//! flicker (a running clock, a video); instead, entries are matched by
//! their stable `uuid` and mutated in place.
//!
//! Identity is witnessed by a monotonically assigned instance id on every
//! rendered entry: an entry that survives reconciliation keeps its instance
//! id no matter how many fields change, so a remount is observable as a new
//! instance id.

use crate::projector::model::ProjectorElement;
use uuid::Uuid;

/// One entry of the rendered list
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedElement {
    /// Monotonic id assigned when the entry first appeared; survives field
    /// updates, changes only on remount
    pub instance: u64,
    /// Current element state
    pub element: ProjectorElement,
}

/// Rendered ordered list of projector elements
#[derive(Debug, Default)]
pub struct ElementList {
    entries: Vec<RenderedElement>,
    next_instance: u64,
}

impl ElementList {
    /// Create an empty rendered list
    pub fn new() -> Self {
        Self::default()
    }

    /// Current rendered entries, in display order
    pub fn entries(&self) -> &[RenderedElement] {
        &self.entries
    }

    /// Number of rendered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is rendered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find a rendered entry by its element uuid
    pub fn get(&self, uuid: Uuid) -> Option<&RenderedElement> {
        self.entries.iter().find(|e| e.element.uuid == uuid)
    }

    /// Discard every rendered entry.
    ///
    /// Used when the element source changes wholesale (broadcast target
    /// switch): reconciliation restarts fresh against the new source.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Merge the target list into the rendered list.
    ///
    /// Entries absent from the target are dropped; entries matched by uuid
    /// are updated field-by-field in place and keep their instance id; new
    /// target elements are appended. The final order matches the target.
    pub fn reconcile(&mut self, target: Vec<ProjectorElement>) {
        let mut previous = std::mem::take(&mut self.entries);

        for element in target {
            match previous.iter().position(|e| e.element.uuid == element.uuid) {
                Some(index) => {
                    let mut entry = previous.remove(index);
                    copy_public_fields(&mut entry.element, element);
                    self.entries.push(entry);
                }
                None => {
                    self.next_instance += 1;
                    self.entries.push(RenderedElement {
                        instance: self.next_instance,
                        element,
                    });
                }
            }
        }
        // Entries left in `previous` have no target counterpart and drop.
    }
}

/// Copy every public field that differs onto the existing element.
///
/// Extra-map keys prefixed with `_` belong to the rendering layer and are
/// never touched; existing private keys also survive the update.
fn copy_public_fields(existing: &mut ProjectorElement, target: ProjectorElement) {
    if existing.name != target.name {
        existing.name = target.name;
    }
    existing.id = target.id;
    existing.stable = target.stable;
    if existing.template != target.template {
        existing.template = target.template;
    }
    for (key, value) in target.extra {
        if key.starts_with('_') {
            continue;
        }
        if existing.extra.get(&key) != Some(&value) {
            existing.extra.insert(key, value);
        }
    }
}
