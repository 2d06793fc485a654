use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::YearRange;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub data: DataConfig,

    pub movie_service: MovieServiceConfig,

    pub posters: PosterConfig,

    pub explorer: ExplorerConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// "pretty" (default) or "json"
    pub log_format: String,

    #[serde(default)]
    pub suppress_connection_errors: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            suppress_connection_errors: false,
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the pre-aggregated Parquet tables.
    pub output_dir: String,

    /// Raw MovieLens link table read by `enrich`.
    pub links_csv: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            output_dir: "./output".to_string(),
            links_csv: "./links.csv".to_string(),
        }
    }
}

impl DataConfig {
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieServiceConfig {
    pub base_url: String,

    /// Request timeout in seconds (default: 15)
    pub request_timeout_seconds: u64,

    /// Maximum number of movie ids whose genres are memoized.
    pub genre_cache_capacity: usize,

    /// Genre lookups issued concurrently for a single search.
    pub lookup_concurrency: usize,

    pub health_check_on_startup: bool,
}

impl Default for MovieServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://movie-backend-x8iq.onrender.com".to_string(),
            request_timeout_seconds: 15,
            genre_cache_capacity: 10_000,
            lookup_concurrency: 8,
            health_check_on_startup: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PosterConfig {
    pub imdb_title_base: String,

    pub omdb_image_base: String,

    /// Overridden by the `OMDB_API_KEY` environment variable when set.
    pub omdb_api_key: String,

    pub placeholder_url: String,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            imdb_title_base: "https://www.imdb.com/title".to_string(),
            omdb_image_base: "https://img.omdbapi.com/".to_string(),
            omdb_api_key: String::new(),
            placeholder_url: crate::constants::links::PLACEHOLDER_POSTER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// How many genres (alphabetically first) are pre-selected.
    pub default_genre_count: usize,

    pub default_year_range: YearRange,

    pub default_min_rating: f64,

    pub default_min_votes: u64,

    pub page_size: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            default_genre_count: 3,
            default_year_range: YearRange::new(1990, 2018),
            default_min_rating: 3.5,
            default_min_votes: 50,
            page_size: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub bind_address: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0".to_string(),
            port: 8501,
            cors_allowed_origins: vec![
                "http://localhost:8501".to_string(),
                "http://127.0.0.1:8501".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            data: DataConfig::default(),
            movie_service: MovieServiceConfig::default(),
            posters: PosterConfig::default(),
            explorer: ExplorerConfig::default(),
            server: ServerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path).map(Self::with_env_overrides);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default().with_env_overrides())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("OMDB_API_KEY")
            && !key.trim().is_empty()
        {
            self.posters.omdb_api_key = key.trim().to_string();
        }
        self
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("movielens-explorer").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".movielens-explorer").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.movie_service.base_url).with_context(|| {
            format!(
                "Invalid movie service URL: {}",
                self.movie_service.base_url
            )
        })?;

        if self.movie_service.genre_cache_capacity == 0 {
            anyhow::bail!("movie_service.genre_cache_capacity must be > 0");
        }

        if self.movie_service.lookup_concurrency == 0 {
            anyhow::bail!("movie_service.lookup_concurrency must be > 0");
        }

        if self.explorer.page_size == 0 {
            anyhow::bail!("explorer.page_size must be > 0");
        }

        if !(0.0..=5.0).contains(&self.explorer.default_min_rating) {
            anyhow::bail!("explorer.default_min_rating must be within 0.0..=5.0");
        }

        if self.data.output_dir.trim().is_empty() {
            anyhow::bail!("data.output_dir cannot be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.explorer.default_genre_count, 3);
        assert_eq!(config.explorer.default_year_range, YearRange::new(1990, 2018));
        assert!((config.explorer.default_min_rating - 3.5).abs() < f64::EPSILON);
        assert_eq!(config.explorer.default_min_votes, 50);
        assert_eq!(config.data.output_dir, "./output");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[movie_service]"));
        assert!(toml_str.contains("[explorer]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [explorer]
            page_size = 10
            default_year_range = { from = 2000, to = 2010 }
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.explorer.page_size, 10);
        assert_eq!(config.explorer.default_year_range, YearRange::new(2000, 2010));

        assert_eq!(
            config.movie_service.base_url,
            "https://movie-backend-x8iq.onrender.com"
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.movie_service.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.movie_service.genre_cache_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.explorer.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_from_path() {
        let path = std::env::temp_dir().join(format!(
            "movielens-config-test-{}.toml",
            uuid::Uuid::new_v4()
        ));
        let mut config = Config::default();
        config.server.port = 9999;
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.server.port, 9999);

        std::fs::remove_file(&path).ok();
    }
}
