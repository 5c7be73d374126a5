//! Shared setup for commands that touch the store.

use super::config::{default_config_path, StoryproofConfig};
use std::path::PathBuf;
use std::sync::Arc;
use storyproof::config::ServiceConfig;
use storyproof::identity::Identity;
use storyproof::kv::SqliteKvStore;
use storyproof::service::CheckpointService;
use tracing_subscriber::EnvFilter;

pub struct CliContext {
    pub service: CheckpointService,
    store: SqliteKvStore,
}

impl CliContext {
    /// Load config, start logging, open the store and build the service.
    ///
    /// The CLI has no wallet or content-network client, so registrations run
    /// on the local tier unless a library embedder supplies them.
    pub async fn open(config_path: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = config_path
            .map(PathBuf::from)
            .unwrap_or_else(default_config_path);
        let config = StoryproofConfig::load_or_create(&config_path)?;
        init_logging(&config.logging.level);

        let store = SqliteKvStore::open(&config.storage.db_path).await.map_err(|e| {
            format!(
                "Failed to open store '{}': {}",
                config.storage.db_path.display(),
                e
            )
        })?;

        let mut service_config = ServiceConfig::from_env();
        service_config.use_testnet |= config.network.use_testnet;

        let service = CheckpointService::builder(Arc::new(store.clone()))
            .with_config(service_config)
            .build();

        Ok(Self { service, store })
    }

    pub async fn close(self) {
        self.store.close().await;
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A second init (tests, repeated calls) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn parse_identity(raw: &str) -> Result<Identity, Box<dyn std::error::Error>> {
    Ok(Identity::new(raw).map_err(|e| format!("Invalid identity '{}': {}", raw, e))?)
}
