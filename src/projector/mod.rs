//! # Projector Engine
//!
//! Turns synchronized server state into per-display render state.
//!
//! ## Components
//!
//! - **Model**: wire representation of projectors and their elements
//! - **Slides**: registry mapping content-type names to templates
//! - **Reconciler**: identity-preserving merge of element lists
//! - **View**: per-display state (elements, blank, scroll, broadcast relay)
//! - **Countdown**: server-clock-driven timers
//!
//! A view never receives pushed updates directly; it polls the store's
//! revision counters and re-derives its state when they move. The store is
//! the single source of truth, the view a pure function of it plus render
//! identity carried across refreshes.

/// Projector and element wire model
pub mod model;

/// Identity-preserving element list reconciliation
pub mod reconciler;

/// Content-type registry
pub mod slides;

/// Per-display render state
pub mod view;

/// Server-clock-driven countdown timers
pub mod countdown;

/// Re-export commonly used types for convenience
pub use countdown::{format_seconds, Countdown, ServerClock, COUNTDOWN_COLLECTION};
pub use model::{Projector, ProjectorElement, PROJECTOR_COLLECTION};
pub use reconciler::{ElementList, RenderedElement};
pub use slides::{SlideDef, SlideRegistry, CLOCK_SLIDE, COUNTDOWN_SLIDE, MESSAGE_SLIDE};
pub use view::{ProjectorView, SCROLL_STEP_PX};
