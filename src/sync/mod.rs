//! # Realtime Synchronization
//!
//! Keeps the local object store consistent with server-side state via a
//! push channel, and keeps that channel alive.
//!
//! ## Architecture
//!
//! The sync engine is a pipeline of small components:
//!
//! - **Transport**: opens the push channel (websocket in production)
//! - **Connection Manager**: lifecycle state machine with a fixed-interval
//!   unbounded retry loop and receiver fan-out
//! - **Applier**: decodes change batches and mutates the datastore
//! - **Liveness Probe**: distinguishes "unreachable" from "unauthorized"
//!   before each reconnect attempt
//!
//! ## Control flow
//!
//! Connection Manager receives raw batches from the transport, hands them
//! to the decoder, the applier mutates the store, and consumer views poll
//! the store's revision counters to re-derive their state.
//!
//! All of this runs on one cooperative event-processing stream: messages
//! and timer ticks are handled one at a time to completion, so no external
//! locking is needed around store mutation.

/// Connection lifecycle state machine
pub mod connection;

/// Change-batch application
pub mod applier;

/// Liveness probe and authorization-loss handling
pub mod liveness;

/// Push-channel transport seam
pub mod transport;

/// Re-export commonly used types for convenience
pub use applier::SyncApplier;
pub use connection::{ConnectionManager, ConnectionState, MessageReceiver, RetryDirective, RetryHook};
pub use liveness::{LivenessProbe, ProbeRetryHook, WhoAmI};
pub use transport::{Transport, TransportLink, WebSocketTransport};
