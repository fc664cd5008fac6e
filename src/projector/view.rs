//! Projector View
//!
//! Derives what one physical display renders from the datastore: the
//! element list of its source projector (its own, or the one it mirrors
//! while a broadcast is active), the blank flag and the scroll offset.
//!
//! The view polls the store's revision counters and reconciles the derived
//! element list into its rendered list, so elements that did not change
//! keep their render identity across updates.

use crate::projector::model::{Projector, PROJECTOR_COLLECTION};
use crate::projector::reconciler::{ElementList, RenderedElement};
use crate::projector::slides::{SlideRegistry, CLOCK_SLIDE};
use crate::store::Datastore;
use std::sync::Arc;

/// Vertical pixels per scroll step
pub const SCROLL_STEP_PX: i64 = 250;

/// Render state of one physical display
pub struct ProjectorView {
    display_id: i64,
    store: Arc<Datastore>,
    registry: SlideRegistry,
    elements: ElementList,
    blank: bool,
    scroll_offset: i64,
    /// Projector currently feeding the renderer; 0 = the view's own
    broadcast_source: i64,
    clock_enabled: bool,
    last_seen: Option<u64>,
}

impl ProjectorView {
    /// Create a view for the given display
    pub fn new(display_id: i64, store: Arc<Datastore>, registry: SlideRegistry) -> Self {
        Self {
            display_id,
            store,
            registry,
            elements: ElementList::new(),
            blank: true,
            scroll_offset: 0,
            broadcast_source: 0,
            clock_enabled: true,
            last_seen: None,
        }
    }

    /// Globally enable or disable the clock element
    pub fn set_clock_enabled(&mut self, enabled: bool) {
        self.clock_enabled = enabled;
        // Re-derive on the next refresh even without a store change.
        self.last_seen = None;
    }

    /// Rendered elements, in display order
    pub fn elements(&self) -> &[RenderedElement] {
        self.elements.entries()
    }

    /// Whether the display is blanked
    pub fn blank(&self) -> bool {
        self.blank
    }

    /// Vertical scroll offset in pixels (negative scrolls content up)
    pub fn scroll_offset(&self) -> i64 {
        self.scroll_offset
    }

    /// Projector currently feeding the renderer; 0 = the view's own
    pub fn broadcast_source(&self) -> i64 {
        self.broadcast_source
    }

    /// Re-derive the render state if the store changed since the last call.
    ///
    /// Returns `true` if the render state was recomputed.
    pub async fn refresh(&mut self) -> bool {
        let own_rev = self
            .store
            .last_modified_object(PROJECTOR_COLLECTION, self.display_id)
            .await;
        let source_rev = if self.broadcast_source > 0 {
            self.store
                .last_modified_object(PROJECTOR_COLLECTION, self.broadcast_source)
                .await
        } else {
            0
        };
        let revision = own_rev.max(source_rev);
        if self.last_seen == Some(revision) {
            return false;
        }
        self.last_seen = Some(revision);

        let own = match self.own_projector().await {
            Some(projector) => projector,
            None => {
                // Blank the display while its record is gone.
                self.elements.clear();
                self.blank = true;
                self.scroll_offset = 0;
                self.broadcast_source = 0;
                return true;
            }
        };

        // Exactly one source feeds the renderer; switching discards the
        // applied list so reconciliation restarts fresh.
        if own.broadcast != self.broadcast_source {
            self.broadcast_source = own.broadcast;
            self.elements.clear();
        }

        let source = if self.broadcast_source > 0 {
            match self.projector(self.broadcast_source).await {
                Some(projector) => projector,
                None => {
                    // Mirror source not in the store yet; keep the current
                    // output until its record arrives.
                    self.scroll_offset = -SCROLL_STEP_PX * own.scroll;
                    return true;
                }
            }
        } else {
            own.clone()
        };

        let mut target = self.registry.elements_for(&source);
        if !self.clock_enabled {
            target.retain(|element| element.name != CLOCK_SLIDE);
        }
        self.elements.reconcile(target);
        self.blank = source.blank;
        // Scroll always follows the view's own projector, even while
        // mirroring another one.
        self.scroll_offset = -SCROLL_STEP_PX * own.scroll;
        true
    }

    async fn own_projector(&self) -> Option<Projector> {
        self.projector(self.display_id).await
    }

    async fn projector(&self, id: i64) -> Option<Projector> {
        let value = self.store.get(PROJECTOR_COLLECTION, id).await?;
        match Projector::from_value(&value) {
            Ok(projector) => Some(projector),
            Err(e) => {
                tracing::error!("[Projector] Undecodable projector {}: {}", id, e);
                None
            }
        }
    }
}
