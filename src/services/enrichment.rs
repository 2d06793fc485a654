//! Link-table enrichment: `links.csv` in, `links_enriched.parquet` out.

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::PosterConfig;
use crate::domain::{ImdbId, MovieId};
use crate::models::{EnrichedLink, LinkRow};
use crate::store::{TableError, write_parquet};

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("Failed to read link table {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Row for movie {movie_id} has a negative IMDb number ({imdb_id})")]
    InvalidImdbId { movie_id: i64, imdb_id: i64 },

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Builds the per-movie URLs from the configured templates.
#[derive(Debug, Clone)]
pub struct UrlTemplates {
    imdb_title_base: String,
    omdb_image_base: String,
    api_key: String,
}

impl UrlTemplates {
    #[must_use]
    pub fn from_config(posters: &PosterConfig) -> Self {
        Self {
            imdb_title_base: posters.imdb_title_base.trim_end_matches('/').to_string(),
            omdb_image_base: posters.omdb_image_base.clone(),
            api_key: posters.omdb_api_key.clone(),
        }
    }

    #[must_use]
    pub fn imdb_url(&self, id: &ImdbId) -> String {
        format!("{}/{id}", self.imdb_title_base)
    }

    #[must_use]
    pub fn poster_url(&self, id: &ImdbId) -> String {
        format!(
            "{}?i={id}&apikey={}",
            self.omdb_image_base,
            urlencoding::encode(&self.api_key)
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentReport {
    pub rows_read: usize,
    pub rows_written: usize,
    pub duplicates_dropped: usize,
    pub output: PathBuf,
}

pub fn read_links(path: &Path) -> Result<Vec<LinkRow>, EnrichmentError> {
    let csv_error = |source| EnrichmentError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    reader
        .deserialize()
        .collect::<Result<Vec<LinkRow>, _>>()
        .map_err(csv_error)
}

/// Derives ids and URLs. The first row of a repeated movie id wins.
pub fn enrich_links(
    rows: &[LinkRow],
    templates: &UrlTemplates,
) -> Result<(Vec<EnrichedLink>, usize), EnrichmentError> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut duplicates = 0;
    let mut links = Vec::with_capacity(rows.len());

    for row in rows {
        if !seen.insert(row.movie_id) {
            duplicates += 1;
            continue;
        }

        let imdb_id =
            ImdbId::try_from_raw(row.imdb_id).ok_or(EnrichmentError::InvalidImdbId {
                movie_id: row.movie_id,
                imdb_id: row.imdb_id,
            })?;

        links.push(EnrichedLink {
            movie_id: MovieId::new(row.movie_id),
            imdb_number: row.imdb_id,
            tmdb_id: row.tmdb_id,
            imdb_url: templates.imdb_url(&imdb_id),
            poster_url: templates.poster_url(&imdb_id),
            imdb_id,
        });
    }

    if duplicates > 0 {
        warn!(duplicates, "Dropped repeated movie ids from link table");
    }

    Ok((links, duplicates))
}

pub fn run_enrichment(
    input: &Path,
    output: &Path,
    posters: &PosterConfig,
) -> Result<EnrichmentReport, EnrichmentError> {
    if posters.omdb_api_key.is_empty() {
        warn!("No OMDb API key configured, poster URLs will not resolve");
    }

    let rows = read_links(input)?;
    info!(rows = rows.len(), input = %input.display(), "Read link table");

    let templates = UrlTemplates::from_config(posters);
    let (links, duplicates_dropped) = enrich_links(&rows, &templates)?;

    if let Some(first) = links.first() {
        info!(imdb_url = %first.imdb_url, poster_url = %first.poster_url, "Sample enriched row");
    }

    let mut frame = EnrichedLink::to_frame(&links)?;
    write_parquet(output, &mut frame)?;
    info!(rows = links.len(), output = %output.display(), "Enriched links written");

    Ok(EnrichmentReport {
        rows_read: rows.len(),
        rows_written: links.len(),
        duplicates_dropped,
        output: output.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinkIndex;
    use crate::store::read_parquet;

    fn templates() -> UrlTemplates {
        UrlTemplates::from_config(&PosterConfig {
            omdb_api_key: "abc123".to_string(),
            ..PosterConfig::default()
        })
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("movielens-enrich-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_urls_follow_templates() {
        let t = templates();
        let id = ImdbId::from_numeric(27);
        assert_eq!(t.imdb_url(&id), "https://www.imdb.com/title/tt0000027");
        assert_eq!(
            t.poster_url(&id),
            "https://img.omdbapi.com/?i=tt0000027&apikey=abc123"
        );
    }

    #[test]
    fn test_duplicate_movie_ids_keep_first_row() {
        let rows = vec![
            LinkRow { movie_id: 1, imdb_id: 114_709, tmdb_id: Some(862) },
            LinkRow { movie_id: 1, imdb_id: 1, tmdb_id: None },
            LinkRow { movie_id: 2, imdb_id: 113_497, tmdb_id: None },
        ];
        let (links, duplicates) = enrich_links(&rows, &templates()).unwrap();
        assert_eq!(duplicates, 1);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].imdb_id.as_str(), "tt0114709");
    }

    #[test]
    fn test_negative_imdb_number_is_rejected() {
        let rows = vec![LinkRow { movie_id: 5, imdb_id: -3, tmdb_id: None }];
        assert!(matches!(
            enrich_links(&rows, &templates()),
            Err(EnrichmentError::InvalidImdbId { movie_id: 5, imdb_id: -3 })
        ));
    }

    #[test]
    fn test_run_enrichment_writes_parquet() {
        let dir = temp_dir();
        let input = dir.join("links.csv");
        std::fs::write(
            &input,
            "movieId,imdbId,tmdbId\n1,114709,862\n2,113497,8844\n3,27,\n",
        )
        .unwrap();
        let output = dir.join("output").join("links_enriched.parquet");

        let posters = PosterConfig {
            omdb_api_key: "abc123".to_string(),
            ..PosterConfig::default()
        };
        let report = run_enrichment(&input, &output, &posters).unwrap();
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.rows_written, 3);

        let df = read_parquet(&output).unwrap();
        assert_eq!(df.height(), 3);
        let index = LinkIndex::from_frame(&df).unwrap();
        let links = index.get(MovieId::new(3)).unwrap();
        assert_eq!(links.imdb_url, "https://www.imdb.com/title/tt0000027");
    }

    #[test]
    fn test_missing_input_is_a_csv_error() {
        let dir = temp_dir();
        let err = read_links(&dir.join("absent.csv")).unwrap_err();
        assert!(matches!(err, EnrichmentError::Csv { .. }));
    }
}
