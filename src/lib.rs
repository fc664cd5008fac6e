//! Podium - Main Library
//!
//! Podium is a realtime projection client built with Rust: it keeps a local
//! object store synchronized with server-side meeting state over a push
//! channel and derives per-display render state (projector elements, blank,
//! scroll, broadcast relay) from that store.
//!
//! # Overview
//!
//! This library provides the core functionality for Podium, including:
//! - Local object store with revision counters and relation resolution
//! - Change-envelope decoding and batch application
//! - Connection lifecycle with a fixed-interval unbounded retry loop
//! - Liveness probing that distinguishes outages from authorization loss
//! - Identity-preserving projector element reconciliation
//! - Server-clock-driven countdown timers
//!
//! # Module Structure
//!
//! The library is organized into four main modules:
//!
//! - **`shared`** - Types used across the sync and projection layers
//!   - Change envelopes and collection batches
//!   - Configuration and channel realms
//!   - Error types
//!
//! - **`store`** - Local object store
//!   - Collection registration and relation definitions
//!   - Revision counters for change-driven consumers
//!   - Cached relation pointers with eviction cleanup
//!
//! - **`sync`** - Realtime synchronization
//!   - Transport seam (websocket in production)
//!   - Connection manager with retry hook and receiver fan-out
//!   - Change-batch applier
//!   - Liveness probe against the identity endpoint
//!
//! - **`projector`** - Projection engine
//!   - Projector and element wire model
//!   - Content-type registry
//!   - Element reconciler and per-display views
//!   - Countdowns synchronized to the server clock
//!
//! # Usage
//!
//! ```rust,no_run
//! use podium::store::Datastore;
//! use podium::sync::{ConnectionManager, SyncApplier, WebSocketTransport};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let store = Arc::new(Datastore::new());
//! store.register_collection("core/projector", vec![]).await;
//!
//! let transport = Arc::new(WebSocketTransport::new("ws://localhost:8000/ws/site/"));
//! let manager = Arc::new(ConnectionManager::new(transport, Duration::from_secs(1)));
//! manager
//!     .on_message(Arc::new(SyncApplier::new(store.clone())))
//!     .await;
//! manager.run().await;
//! # }
//! ```
//!
//! # Architecture
//!
//! Server state flows one way: transport -> connection manager -> applier ->
//! store -> views. Views never receive pushed updates directly; they poll
//! the store's revision counters and re-derive their state when the
//! counters move.
//!
//! # Thread Safety
//!
//! All shared state is thread-safe using `Arc<RwLock<>>`; the connection
//! manager processes messages and timer ticks one at a time on a single
//! cooperative event stream.
//!
//! # Error Handling
//!
//! The library uses Rust's standard error handling:
//!
//! - `Result<T, E>` for fallible operations
//! - `Option<T>` for optional values
//! - Custom error types in `shared::error`

/// Shared types and data structures
pub mod shared;

/// Local object store
pub mod store;

/// Realtime synchronization engine
pub mod sync;

/// Projection engine
pub mod projector;

pub use shared::{ChangeEnvelope, CollectionKey, Realm, SyncConfig, SyncError};
pub use store::Datastore;
pub use sync::{ConnectionManager, SyncApplier};
pub use projector::ProjectorView;
