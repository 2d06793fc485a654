use std::sync::Arc;

use crate::clients::{MovieCatalog, MovieClient};
use crate::config::Config;
use crate::services::{DashboardService, ExplorerService, GenreResolver};
use crate::store::TableStore;

/// Build the HTTP client used for movie-service lookups.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(concat!("movielens-explorer/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Services shared by the web server and the CLI commands.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub tables: Arc<TableStore>,

    pub catalog: Arc<dyn MovieCatalog>,

    pub genres: Arc<GenreResolver>,

    pub explorer: Arc<ExplorerService>,

    pub dashboard: Arc<DashboardService>,
}

impl SharedState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.movie_service.request_timeout_seconds)?;
        let catalog = Arc::new(MovieClient::with_client(
            http_client,
            &config.movie_service.base_url,
        ));
        Ok(Self::with_catalog(config, catalog))
    }

    /// Wires the services around an arbitrary catalog implementation.
    #[must_use]
    pub fn with_catalog(config: Config, catalog: Arc<dyn MovieCatalog>) -> Self {
        let tables = Arc::new(TableStore::new(config.data.output_path()));

        let genres = Arc::new(GenreResolver::new(
            catalog.clone(),
            config.movie_service.genre_cache_capacity,
            config.movie_service.lookup_concurrency,
        ));

        let explorer = Arc::new(ExplorerService::new(
            tables.clone(),
            genres.clone(),
            config.explorer.clone(),
            config.posters.clone(),
        ));

        let dashboard = Arc::new(DashboardService::new(tables.clone()));

        Self {
            config: Arc::new(config),
            tables,
            catalog,
            genres,
            explorer,
            dashboard,
        }
    }
}
