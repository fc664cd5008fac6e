//! Connection Manager
//!
//! Owns the lifecycle of the push channel: connect, detect failure, wait a
//! fixed interval, probe liveness, reconnect. There is exactly one manager
//! per physical client; consumers receive raw messages through registered
//! receivers and observe connectivity through the state/live flag.
//!
//! # State machine
//!
//! - `Disconnected -> Connecting` on start or explicit reconnect
//! - `Connecting -> Connected` on transport open (live flag set)
//! - `Connected -> Disconnected` on close or error (live flag cleared)
//! - `Disconnected -> Retrying` immediately after; each retry tick first
//!   invokes the registered retry hook, then attempts a raw reconnect
//!
//! Retry is unbounded: a display with no operator present must self-heal.
//! The interval is fixed (1 second by default), no exponential backoff.
//!
//! # Failure semantics
//!
//! Transport errors never surface to callers as errors; they only manifest
//! as state transitions. The retry hook may decide that the session lost
//! authorization, in which case the local cache is reset instead of
//! reconnecting (see [`crate::sync::liveness`]).

use crate::sync::transport::Transport;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify, RwLock};

/// Lifecycle state of the push channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and no retry scheduled yet
    Disconnected,
    /// A connection attempt is in flight
    Connecting,
    /// The push channel is live
    Connected,
    /// Waiting for the next fixed-interval retry tick
    Retrying,
}

/// Consumer of raw push-channel messages.
///
/// Receivers are invoked in registration order, one message fully processed
/// before the next. Delivery is not deduplicated.
#[async_trait]
pub trait MessageReceiver: Send + Sync {
    /// Handle one raw transport message
    async fn on_message(&self, raw: &str);
}

/// Decision of a retry hook, taken before each reconnect attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDirective {
    /// Proceed with the reconnect attempt
    Reconnect,
    /// The session is no longer authorized; the cache was reset, do not
    /// reconnect on this tick
    ResetCache,
    /// Out-of-band check failed (server unreachable); wait for the next tick
    Wait,
}

/// Hook invoked on each retry tick before a raw reconnect
#[async_trait]
pub trait RetryHook: Send + Sync {
    /// Decide whether this tick should reconnect
    async fn before_retry(&self) -> RetryDirective;
}

/// Outcome of one wait on a live link
enum LinkEvent {
    /// A message arrived, or the link reported closure
    Message(Option<String>),
    /// An explicit reconnect was requested
    Reconnect,
    /// The manager is shutting down
    Shutdown,
}

/// Process-wide manager of the push-channel lifecycle
pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    retry_interval: Duration,
    receivers: RwLock<Vec<Arc<dyn MessageReceiver>>>,
    retry_hook: RwLock<Option<Arc<dyn RetryHook>>>,
    state: RwLock<ConnectionState>,
    connected: AtomicBool,
    reconnect: Notify,
    shutdown_tx: watch::Sender<bool>,
}

impl ConnectionManager {
    /// Create a manager for the given transport
    pub fn new(transport: Arc<dyn Transport>, retry_interval: Duration) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            transport,
            retry_interval,
            receivers: RwLock::new(Vec::new()),
            retry_hook: RwLock::new(None),
            state: RwLock::new(ConnectionState::Disconnected),
            connected: AtomicBool::new(false),
            reconnect: Notify::new(),
            shutdown_tx,
        }
    }

    /// Register a message receiver; receivers are called in registration order
    pub async fn on_message(&self, receiver: Arc<dyn MessageReceiver>) {
        self.receivers.write().await.push(receiver);
    }

    /// Register the retry hook invoked before each reconnect attempt
    pub async fn set_retry_hook(&self, hook: Arc<dyn RetryHook>) {
        *self.retry_hook.write().await = Some(hook);
    }

    /// Whether the push channel is currently live
    pub fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Current lifecycle state
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Close the current connection if one is open.
    ///
    /// The close path schedules the retry, so this forces a fresh connect.
    /// A no-op when nothing is connected.
    pub fn reconnect(&self) {
        if self.connected() {
            self.reconnect.notify_one();
        }
    }

    /// Stop the manager: cancels the retry timer and closes any open link
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    async fn set_state(&self, state: ConnectionState) {
        *self.state.write().await = state;
    }

    async fn dispatch(&self, raw: &str) {
        let receivers = self.receivers.read().await.clone();
        for receiver in receivers {
            receiver.on_message(raw).await;
        }
    }

    /// Drive the connection lifecycle until [`shutdown`](Self::shutdown).
    ///
    /// This is the single cooperative event-processing loop of the client:
    /// messages and timer ticks are handled one at a time to completion, so
    /// two messages are never interleaved.
    pub async fn run(&self) {
        let mut shutdown = self.shutdown_tx.subscribe();

        loop {
            if *shutdown.borrow() {
                self.set_state(ConnectionState::Disconnected).await;
                return;
            }

            self.set_state(ConnectionState::Connecting).await;
            match self.transport.open().await {
                Ok(mut link) => {
                    self.connected.store(true, Ordering::SeqCst);
                    self.set_state(ConnectionState::Connected).await;
                    tracing::info!("[Connection] Push channel connected");

                    loop {
                        let event = tokio::select! {
                            message = link.recv() => LinkEvent::Message(message),
                            _ = self.reconnect.notified() => LinkEvent::Reconnect,
                            _ = shutdown.changed() => LinkEvent::Shutdown,
                        };
                        match event {
                            LinkEvent::Message(Some(raw)) => self.dispatch(&raw).await,
                            LinkEvent::Message(None) => break,
                            LinkEvent::Reconnect => {
                                tracing::info!("[Connection] Explicit reconnect, closing channel");
                                link.close().await;
                                break;
                            }
                            LinkEvent::Shutdown => {
                                link.close().await;
                                self.connected.store(false, Ordering::SeqCst);
                                self.set_state(ConnectionState::Disconnected).await;
                                return;
                            }
                        }
                    }

                    self.connected.store(false, Ordering::SeqCst);
                    self.set_state(ConnectionState::Disconnected).await;
                    tracing::warn!("[Connection] Push channel lost");
                }
                Err(e) => {
                    self.set_state(ConnectionState::Disconnected).await;
                    tracing::warn!("[Connection] Connect failed: {}", e);
                }
            }

            // Fixed-interval retry, unbounded. Each tick consults the hook
            // before attempting a raw reconnect.
            self.set_state(ConnectionState::Retrying).await;
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(self.retry_interval) => {}
                    _ = shutdown.changed() => {
                        self.set_state(ConnectionState::Disconnected).await;
                        return;
                    }
                }

                let hook = self.retry_hook.read().await.clone();
                match hook {
                    None => break,
                    Some(hook) => match hook.before_retry().await {
                        RetryDirective::Reconnect => break,
                        RetryDirective::ResetCache => {
                            tracing::warn!(
                                "[Connection] Session no longer authorized, cache was reset"
                            );
                        }
                        RetryDirective::Wait => {
                            tracing::debug!("[Connection] Liveness probe failed, waiting");
                        }
                    },
                }
            }
        }
    }
}
