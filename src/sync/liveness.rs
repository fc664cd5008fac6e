//! Liveness Probe
//!
//! When the push channel is down, a plain reconnect cannot distinguish
//! "server unreachable" from "server reachable but this session is no
//! longer authorized". The probe asks an idempotent identity endpoint and
//! the retry hook turns the answer into a directive:
//!
//! - reachable and authorized: proceed with the reconnect;
//! - reachable but anonymous with guests disabled: the session lost its
//!   authorization -- the local cache is wiped and no reconnect happens on
//!   this tick, so stale objects are never silently revived;
//! - unreachable: wait for the next retry tick.

use crate::shared::error::SyncError;
use crate::store::Datastore;
use crate::sync::connection::{RetryDirective, RetryHook};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// Answer of the identity endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WhoAmI {
    /// Id of the authenticated user, `null` for anonymous sessions
    pub user_id: Option<i64>,
    /// Whether anonymous guests are allowed
    pub guest_enabled: bool,
}

impl WhoAmI {
    /// Whether this session may keep using its cached state
    pub fn authorized(&self) -> bool {
        self.user_id.is_some() || self.guest_enabled
    }
}

/// HTTP client for the identity endpoint
#[derive(Debug, Clone)]
pub struct LivenessProbe {
    client: reqwest::Client,
    url: String,
}

impl LivenessProbe {
    /// Create a probe for the given identity endpoint URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Ask the server who this session is
    pub async fn check(&self) -> Result<WhoAmI, SyncError> {
        let response = self.client.get(&self.url).send().await?;
        let response = response
            .error_for_status()
            .map_err(|e| SyncError::http(e.to_string()))?;
        Ok(response.json::<WhoAmI>().await?)
    }
}

/// Retry hook combining the probe with the datastore
pub struct ProbeRetryHook {
    probe: LivenessProbe,
    store: Arc<Datastore>,
}

impl ProbeRetryHook {
    /// Create a hook probing before every reconnect attempt
    pub fn new(probe: LivenessProbe, store: Arc<Datastore>) -> Self {
        Self { probe, store }
    }
}

#[async_trait]
impl RetryHook for ProbeRetryHook {
    async fn before_retry(&self) -> RetryDirective {
        match self.probe.check().await {
            Ok(identity) if identity.authorized() => RetryDirective::Reconnect,
            Ok(_) => {
                tracing::warn!("[Connection] Session lost authorization, resetting cache");
                self.store.clear().await;
                RetryDirective::ResetCache
            }
            Err(e) => {
                tracing::debug!("[Connection] Liveness probe failed: {}", e);
                RetryDirective::Wait
            }
        }
    }
}
