//! Podium Display Client Entry Point
//!
//! Headless client for one physical display: connects to the per-display
//! push channel, keeps the local store synchronized and logs the derived
//! render state whenever it changes.

use podium::projector::{
    ProjectorView, ServerClock, SlideRegistry, COUNTDOWN_COLLECTION, PROJECTOR_COLLECTION,
};
use podium::shared::{Realm, SyncConfig, SyncError};
use podium::store::{Datastore, RelationDef};
use podium::sync::{ConnectionManager, LivenessProbe, ProbeRetryHook, SyncApplier, WebSocketTransport};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = load_config()?;
    let display_id = match config.realm {
        Realm::Projector(id) => id,
        Realm::Site => {
            return Err("display client requires a projector realm (pass a display id)".into());
        }
    };
    tracing::info!("[Startup] Display {} connecting to {}", display_id, config.host);

    let store = Arc::new(Datastore::new());
    register_collections(&store).await;

    let transport = Arc::new(WebSocketTransport::new(config.channel_url()));
    let manager = Arc::new(ConnectionManager::new(transport, config.retry_interval));
    manager
        .on_message(Arc::new(SyncApplier::new(store.clone())))
        .await;
    manager
        .set_retry_hook(Arc::new(ProbeRetryHook::new(
            LivenessProbe::new(config.http_url(&config.whoami_path)),
            store.clone(),
        )))
        .await;

    let client = reqwest::Client::new();
    let clock = match ServerClock::fetch(&client, &config.http_url(&config.servertime_path)).await {
        Ok(clock) => clock,
        Err(e) => {
            tracing::warn!("[Startup] Server time unavailable, assuming no skew: {}", e);
            ServerClock::new()
        }
    };
    tracing::debug!("[Startup] Server clock offset measured: {:?}", clock);

    let runner = manager.clone();
    tokio::spawn(async move { runner.run().await });

    let mut view = ProjectorView::new(display_id, store, SlideRegistry::with_core_slides());
    loop {
        if view.refresh().await {
            log_render_state(&view);
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Load configuration from the file given as the first argument, or build a
/// default one from host and display id arguments.
fn load_config() -> Result<SyncConfig, SyncError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some(path) if path.ends_with(".toml") => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| SyncError::config(format!("cannot read {}: {}", path, e)))?;
            SyncConfig::from_toml_str(&raw)
        }
        Some(host) => {
            let display_id = args
                .get(1)
                .and_then(|id| id.parse().ok())
                .ok_or_else(|| SyncError::config("usage: podium-display <host> <display-id>"))?;
            SyncConfig::builder()
                .host(host)
                .realm(Realm::Projector(display_id))
                .build()
        }
        None => Err(SyncError::config(
            "usage: podium-display <config.toml> | <host> <display-id>",
        )),
    }
}

/// Register the collections a display consumes.
async fn register_collections(store: &Datastore) {
    store.register_collection(PROJECTOR_COLLECTION, vec![]).await;
    store.register_collection(COUNTDOWN_COLLECTION, vec![]).await;
    store
        .register_collection(
            "core/projection-default",
            vec![RelationDef::new(PROJECTOR_COLLECTION, "projector_id")],
        )
        .await;
    store.register_collection("core/projector-message", vec![]).await;
}

fn log_render_state(view: &ProjectorView) {
    if view.blank() {
        tracing::info!("[Display] Blanked");
        return;
    }
    let names: Vec<&str> = view
        .elements()
        .iter()
        .map(|e| e.element.name.as_str())
        .collect();
    tracing::info!(
        "[Display] Rendering {:?} (scroll {}, source {})",
        names,
        view.scroll_offset(),
        view.broadcast_source()
    );
}
