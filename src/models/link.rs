use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::links::MISSING_IMDB_URL;
use crate::constants::tables::LINKS_ENRICHED;
use crate::domain::{ImdbId, MovieId};
use crate::store::TableError;
use crate::store::frame::{has_column, i64_values, required, string_values};

/// One row of the MovieLens `links.csv` file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkRow {
    #[serde(rename = "movieId")]
    pub movie_id: i64,
    #[serde(rename = "imdbId")]
    pub imdb_id: i64,
    #[serde(rename = "tmdbId", default)]
    pub tmdb_id: Option<i64>,
}

/// A link row with its derived IMDb id and URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedLink {
    pub movie_id: MovieId,
    pub imdb_number: i64,
    pub tmdb_id: Option<i64>,
    pub imdb_id: ImdbId,
    pub imdb_url: String,
    pub poster_url: String,
}

impl EnrichedLink {
    /// Builds the Parquet frame written by the enrichment step. Column names
    /// keep the MovieLens spelling so downstream notebooks can join on them.
    pub fn to_frame(links: &[Self]) -> Result<DataFrame, TableError> {
        let movie_ids: Vec<i64> = links.iter().map(|l| l.movie_id.value()).collect();
        let imdb_numbers: Vec<i64> = links.iter().map(|l| l.imdb_number).collect();
        let tmdb_ids: Vec<Option<i64>> = links.iter().map(|l| l.tmdb_id).collect();
        let imdb_ids: Vec<&str> = links.iter().map(|l| l.imdb_id.as_str()).collect();
        let imdb_urls: Vec<&str> = links.iter().map(|l| l.imdb_url.as_str()).collect();
        let poster_urls: Vec<&str> = links.iter().map(|l| l.poster_url.as_str()).collect();

        Ok(df!(
            "movieId" => movie_ids,
            "imdbId" => imdb_numbers,
            "tmdbId" => tmdb_ids,
            "imdb_id" => imdb_ids,
            "imdb_url" => imdb_urls,
            "poster_url" => poster_urls,
        )?)
    }
}

/// Page and poster URLs for one movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieLinks {
    pub imdb_url: String,
    pub poster_url: String,
}

/// Lookup from movie id to its enriched URLs.
#[derive(Debug, Clone, Default)]
pub struct LinkIndex {
    links: HashMap<MovieId, MovieLinks>,
}

impl LinkIndex {
    pub fn from_frame(df: &DataFrame) -> Result<Self, TableError> {
        let ids = required(
            i64_values(df, LINKS_ENRICHED, "movieId")?,
            LINKS_ENRICHED,
            "movieId",
        )?;
        let imdb_urls = optional_strings(df, "imdb_url")?;
        let poster_urls = optional_strings(df, "poster_url")?;

        let links = ids
            .into_iter()
            .zip(imdb_urls)
            .zip(poster_urls)
            .filter_map(|((id, imdb_url), poster_url)| {
                // Rows without any URL carry nothing over the placeholders.
                if imdb_url.is_none() && poster_url.is_none() {
                    return None;
                }
                Some((
                    MovieId::new(id),
                    MovieLinks {
                        imdb_url: imdb_url.unwrap_or_else(|| MISSING_IMDB_URL.to_string()),
                        poster_url: poster_url.unwrap_or_default(),
                    },
                ))
            })
            .collect();

        Ok(Self { links })
    }

    #[must_use]
    pub fn get(&self, id: MovieId) -> Option<&MovieLinks> {
        self.links.get(&id)
    }

    /// URLs for a movie, falling back to `#` and the placeholder poster.
    #[must_use]
    pub fn resolve(&self, id: MovieId, placeholder_poster: &str) -> MovieLinks {
        let found = self.links.get(&id);
        MovieLinks {
            imdb_url: found
                .map_or(MISSING_IMDB_URL, |l| l.imdb_url.as_str())
                .to_string(),
            poster_url: found
                .map(|l| l.poster_url.as_str())
                .filter(|url| !url.is_empty())
                .unwrap_or(placeholder_poster)
                .to_string(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

fn optional_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, TableError> {
    if has_column(df, name) {
        string_values(df, LINKS_ENRICHED, name)
    } else {
        Ok(vec![None; df.height()])
    }
}
