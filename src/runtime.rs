//! Process setup: logging, backend selection and the delete worker lifecycle.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::services::{IdentityService, SecretKey};
use crate::config::{Backend, Config};
use crate::domain::delete_worker::DeletePipeline;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::persistence::{FileUrlRepository, MemoryUrlRepository, PgUrlRepository};
use crate::state::AppState;

/// Installs the global `tracing` subscriber.
///
/// Honours `RUST_LOG` through [`Config::log_level`] and switches to JSON lines
/// when `LOG_FORMAT=json`. Calling it twice keeps the first subscriber.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let _ = if config.log_format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Opens the backend selected by `config`.
///
/// A database that cannot be reached does not fail startup; the repository
/// reports the connection error from `ping` instead.
///
/// # Errors
///
/// Returns an error if the snapshot file cannot be read or created.
pub async fn build_repository(config: &Config) -> Result<Arc<dyn UrlRepository>> {
    let repository: Arc<dyn UrlRepository> = match config.backend() {
        Backend::Database(dsn) => {
            tracing::warn!("Saving will be done through the database");
            Arc::new(
                PgUrlRepository::connect(&dsn, config.pg_pool_options(), config.base_url.clone())
                    .await,
            )
        }
        Backend::File(path) => {
            tracing::warn!("Saving will be done through file {}", path.display());
            Arc::new(
                FileUrlRepository::open(config.base_url.clone(), path)
                    .await
                    .context("Failed to open URL snapshot")?,
            )
        }
        Backend::Memory => {
            tracing::warn!("Saving will be done through memory");
            Arc::new(MemoryUrlRepository::new(config.base_url.clone()))
        }
    };

    Ok(repository)
}

/// Everything the request-handling layer needs, plus the worker it feeds.
pub struct Runtime {
    pub state: AppState,
    pipeline: DeletePipeline,
}

impl Runtime {
    /// Opens the backend, generates the signing key and starts the delete
    /// worker.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be opened or the system RNG is
    /// unavailable.
    pub async fn start(config: &Config) -> Result<Self> {
        let repository = build_repository(config).await?;
        let key = SecretKey::generate().context("Failed to generate identity secret key")?;

        let pipeline = DeletePipeline::spawn(
            repository.clone(),
            config.delete_queue_capacity,
            config.delete_batch_size,
        );

        let state = AppState::new(
            repository,
            Arc::new(IdentityService::new(key)),
            pipeline.queue(),
        );

        Ok(Self { state, pipeline })
    }

    /// Drops the runtime's producer handle and waits for the final flush.
    ///
    /// Clones of [`AppState`] held elsewhere keep the queue open; drop them
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete worker panicked.
    pub async fn shutdown(self) -> Result<()> {
        let Self { state, pipeline } = self;
        drop(state);

        pipeline
            .shutdown()
            .await
            .context("Delete worker terminated abnormally")
    }
}
