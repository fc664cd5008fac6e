//! Shared helpers for integration tests

use async_trait::async_trait;
use podium::shared::SyncError;
use podium::sync::{Transport, TransportLink};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Link that yields scripted messages, then reports the channel closed.
pub struct ScriptedLink {
    messages: VecDeque<String>,
    /// Keep the link open after the script is exhausted
    stay_open: bool,
}

#[async_trait]
impl TransportLink for ScriptedLink {
    async fn recv(&mut self) -> Option<String> {
        match self.messages.pop_front() {
            Some(message) => Some(message),
            None if self.stay_open => {
                futures_util::future::pending::<()>().await;
                None
            }
            None => None,
        }
    }

    async fn close(&mut self) {
        self.stay_open = false;
    }
}

/// Transport serving a scripted sequence of open results.
pub struct ScriptedTransport {
    opens: Mutex<VecDeque<Result<ScriptedLink, SyncError>>>,
    attempts: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(opens: Vec<Result<ScriptedLink, SyncError>>) -> Self {
        Self {
            opens: Mutex::new(opens.into()),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn open(&self) -> Result<Box<dyn TransportLink>, SyncError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let next = self
            .opens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match next {
            Some(Ok(link)) => Ok(Box::new(link)),
            Some(Err(e)) => Err(e),
            // Script exhausted: behave like an unreachable server.
            None => Err(SyncError::transport("script exhausted")),
        }
    }
}

/// Build a link delivering the given raw batches.
pub fn open_link(messages: Vec<String>, stay_open: bool) -> Result<ScriptedLink, SyncError> {
    Ok(ScriptedLink {
        messages: messages.into(),
        stay_open,
    })
}

/// One `changed` envelope carrying the given object.
pub fn changed(collection: &str, data: Value) -> Value {
    json!({
        "collection": collection,
        "id": data["id"],
        "action": "changed",
        "data": data
    })
}

/// One `deleted` envelope.
pub fn deleted(collection: &str, id: i64) -> Value {
    json!({
        "collection": collection,
        "id": id,
        "action": "deleted"
    })
}

/// Serialize envelopes into one raw wire batch.
pub fn batch(envelopes: Vec<Value>) -> String {
    Value::Array(envelopes).to_string()
}

/// Poll until the condition holds; relies on paused-time auto-advance.
pub async fn settle(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
