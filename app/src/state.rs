//! Application state: effective configuration and where the records live.

use anyhow::Context;
use consulta_core::AppConfig;
use consulta_gateway::HttpLookupGateway;
use consulta_queue::{Consultation, QueuePolicy};
use consulta_store::{RecordStore, SqliteKvStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a command needs to reach the records and the gateway.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Effective configuration (file, then environment overrides)
    pub config: AppConfig,
    /// Config file the configuration was read from
    pub config_path: PathBuf,
    /// SQLite database holding the record collection
    pub database_path: PathBuf,
}

impl AppState {
    /// Resolve configuration and paths, honoring explicit overrides.
    ///
    /// # Errors
    /// Returns error if the configuration cannot be read or is invalid, or
    /// the platform directories cannot be determined.
    pub fn load(config_path: Option<&Path>, database_path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => AppConfig::config_path().context("failed to locate config directory")?,
        };

        let config = AppConfig::load_with_env(&config_path)
            .with_context(|| format!("failed to load {}", config_path.display()))?;

        let database_path = match database_path {
            Some(path) => path.to_path_buf(),
            None => config
                .database_path()
                .context("failed to locate data directory")?,
        };

        tracing::debug!("Database: {}", database_path.display());

        Ok(Self {
            config,
            config_path,
            database_path,
        })
    }

    /// Open the record collection.
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or the stored
    /// collection cannot be read.
    pub async fn open_store(&self) -> anyhow::Result<RecordStore> {
        let kv = SqliteKvStore::open(&self.database_path)
            .await
            .with_context(|| format!("failed to open {}", self.database_path.display()))?;
        let store = RecordStore::load(Arc::new(kv), self.config.storage.records_key.as_str())
            .await
            .context("failed to load records")?;
        Ok(store)
    }

    /// Open the record collection and wire it to the HTTP gateway.
    ///
    /// # Errors
    /// Returns error if the store cannot be opened or the HTTP client cannot
    /// be built.
    pub async fn consultation(&self) -> anyhow::Result<Consultation> {
        let store = self.open_store().await?;
        let gateway =
            HttpLookupGateway::new(&self.config.gateway).context("failed to create gateway")?;
        Ok(Consultation::new(
            store,
            Arc::new(gateway),
            QueuePolicy::from_config(&self.config.queue),
        ))
    }
}
