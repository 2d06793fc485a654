use crate::clients::{MovieCatalog, MovieClient};
use crate::config::Config;

pub async fn cmd_health(config: &Config) -> anyhow::Result<()> {
    let base_url = &config.movie_service.base_url;
    let client = MovieClient::new(base_url, config.movie_service.request_timeout_seconds)?;

    println!("Checking movie service at {base_url} ...");
    match client.health_check().await {
        Ok(()) => {
            println!("✓ Movie service is healthy");
            Ok(())
        }
        Err(e) => {
            println!("✗ {e}");
            Err(e.into())
        }
    }
}
