use anyhow::Context;
use std::path::PathBuf;

use crate::config::Config;
use crate::constants::tables::LINKS_ENRICHED;
use crate::services::run_enrichment;

pub fn cmd_enrich(
    config: &Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let input = input.unwrap_or_else(|| PathBuf::from(&config.data.links_csv));
    let output = output.unwrap_or_else(|| config.data.output_path().join(LINKS_ENRICHED));

    println!("Enriching {} ...", input.display());

    let report = run_enrichment(&input, &output, &config.posters)
        .with_context(|| format!("Enrichment of {} failed", input.display()))?;

    println!("Rows read:    {}", report.rows_read);
    println!("Rows written: {}", report.rows_written);
    if report.duplicates_dropped > 0 {
        println!("Duplicates:   {} (first row kept)", report.duplicates_dropped);
    }
    println!("Output:       {}", report.output.display());

    if config.posters.omdb_api_key.is_empty() {
        println!();
        println!("Note: no OMDb API key configured. Set OMDB_API_KEY or posters.omdb_api_key.");
    }

    Ok(())
}
