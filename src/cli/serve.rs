// src/cli/serve.rs — Wire up state and run the HTTP service

use std::sync::Arc;
use std::time::Duration;

use crate::api::{self, AppState};
use crate::infra::config::Config;
use crate::infra::paths;
use crate::memory::{ConversationStore, MemoryLimits};
use crate::provider::registry;
use crate::sessions;

/// Build the shared application state and start the session store task.
pub fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let client = registry::http_client();
    let resolver = registry::build_resolver(config, &client)?;
    let images = registry::build_image_cascade(config, &client);

    let db_path = paths::resolve_data_path(&config.server.database);
    let store = sessions::open(&db_path)?;
    let (session_handle, _join) = sessions::spawn_store_server(store);
    tracing::debug!("Session database: {}", db_path.display());

    let system_prompt = Some(config.cascade.system_prompt.clone()).filter(|s| !s.trim().is_empty());

    Ok(AppState {
        resolver: Arc::new(resolver),
        images: Arc::new(images),
        memory: ConversationStore::new(MemoryLimits::from(&config.memory)),
        sessions: session_handle,
        system_prompt,
        stream_chunk_delay: Duration::from_millis(config.server.stream_chunk_delay_ms),
    })
}

pub async fn run_serve(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let state = build_state(&config)?;

    let names: Vec<&str> = state.resolver.providers().iter().map(|p| p.name()).collect();
    tracing::info!("Provider cascade: {}", names.join(" → "));

    let _sweeper = state.memory.spawn_sweeper(config.memory.sweep_interval());

    api::start_server(&config.server, state).await
}
