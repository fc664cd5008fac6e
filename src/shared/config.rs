//! Connection configuration
//!
//! Provides configuration types for the sync engine: which host to talk to,
//! which realm (site or a single projector display) this client belongs to,
//! and the retry policy of the push channel.
//!
//! Configuration can be assembled with the builder or loaded from a TOML
//! file. The channel path is derived from the realm: site clients share one
//! fixed channel, projector clients get a per-display channel.

use crate::shared::error::SyncError;
use serde::Deserialize;
use std::time::Duration;

/// Default retry interval of the push channel, in milliseconds
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 1_000;

/// Which realm this client connects as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Realm {
    /// Operator/site client; connects to the shared site channel
    Site,
    /// Projector display client for one physical display
    Projector(i64),
}

impl Realm {
    /// Path of the push channel for this realm
    pub fn channel_path(&self) -> String {
        match self {
            Realm::Site => "/ws/site/".to_string(),
            Realm::Projector(id) => format!("/ws/projector/{}/", id),
        }
    }
}

/// Parse the display id out of a projector location path.
///
/// Display clients run under a path like `/projector/4/`; the id in that
/// path selects the per-display channel.
pub fn parse_display_id(path: &str) -> Option<i64> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    while let Some(segment) = segments.next() {
        if segment == "projector" {
            return segments.next().and_then(|id| id.parse().ok());
        }
    }
    None
}

/// Connection configuration for the sync engine
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Server host, e.g. `assembly.example.org:8000`
    pub host: String,
    /// Use TLS (`wss`/`https`) instead of plain (`ws`/`http`)
    pub tls: bool,
    /// Realm this client connects as
    pub realm: Realm,
    /// Interval between reconnect attempts
    pub retry_interval: Duration,
    /// Path of the identity endpoint used by the liveness probe
    pub whoami_path: String,
    /// Path of the server time endpoint
    pub servertime_path: String,
}

impl SyncConfig {
    /// Create a new builder
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Websocket URL of the push channel for this realm
    pub fn channel_url(&self) -> String {
        let scheme = if self.tls { "wss" } else { "ws" };
        format!("{}://{}{}", scheme, self.host, self.realm.channel_path())
    }

    /// HTTP URL for a server path
    pub fn http_url(&self, path: &str) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{}://{}{}", scheme, self.host, path)
    }

    /// Load configuration from a TOML document
    pub fn from_toml_str(raw: &str) -> Result<Self, SyncError> {
        let file: ConfigFile =
            toml::from_str(raw).map_err(|e| SyncError::config(e.to_string()))?;

        let realm = match file.realm.as_deref() {
            None | Some("site") => Realm::Site,
            Some("projector") => {
                let id = file
                    .display_id
                    .ok_or_else(|| SyncError::config("projector realm requires display_id"))?;
                Realm::Projector(id)
            }
            Some(other) => {
                return Err(SyncError::config(format!("unknown realm '{}'", other)));
            }
        };

        let mut builder = Self::builder().host(file.host).realm(realm);
        if let Some(tls) = file.tls {
            builder = builder.tls(tls);
        }
        if let Some(ms) = file.retry_interval_ms {
            builder = builder.retry_interval(Duration::from_millis(ms));
        }
        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.host.is_empty() {
            return Err(SyncError::config("host must not be empty"));
        }
        if self.retry_interval.is_zero() {
            return Err(SyncError::config("retry interval must be positive"));
        }
        Ok(())
    }
}

/// On-disk TOML shape of [`SyncConfig`]
#[derive(Debug, Deserialize)]
struct ConfigFile {
    host: String,
    tls: Option<bool>,
    realm: Option<String>,
    display_id: Option<i64>,
    retry_interval_ms: Option<u64>,
}

/// Builder for [`SyncConfig`]
#[derive(Debug, Default)]
pub struct SyncConfigBuilder {
    host: Option<String>,
    tls: bool,
    realm: Option<Realm>,
    retry_interval: Option<Duration>,
}

impl SyncConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Enable or disable TLS
    pub fn tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Set the realm
    pub fn realm(mut self, realm: Realm) -> Self {
        self.realm = Some(realm);
        self
    }

    /// Set the retry interval
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = Some(interval);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<SyncConfig, SyncError> {
        let config = SyncConfig {
            host: self.host.ok_or_else(|| SyncError::config("host is required"))?,
            tls: self.tls,
            realm: self.realm.unwrap_or(Realm::Site),
            retry_interval: self
                .retry_interval
                .unwrap_or(Duration::from_millis(DEFAULT_RETRY_INTERVAL_MS)),
            whoami_path: "/users/whoami/".to_string(),
            servertime_path: "/core/servertime/".to_string(),
        };
        config.validate()?;
        Ok(config)
    }
}
