//! Movie search for the explorer page.
//!
//! The pipeline runs the cheap predicates (rating, votes, year, keyword,
//! tags) first, resolves genres for the surviving rows through the
//! [`GenreResolver`], applies the genre predicate and finally sorts by
//! average rating, highest first. The sort is stable, so equal ratings keep
//! table order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ExplorerConfig, PosterConfig};
use crate::constants::limits::{MAX_RATING, MIN_RATING, RATING_STEP, VOTES_STEP};
use crate::constants::tables;
use crate::domain::{MovieId, YearRange};
use crate::models::{GenreCount, LinkIndex, MovieStat, MovieTable, TagCount, split_pipe_list};
use crate::services::genres::GenreResolver;
use crate::store::{TableError, TableStore};

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

/// Filter selection. Empty or `None` fields are inactive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieFilter {
    pub genres: Vec<String>,
    pub years: Option<YearRange>,
    pub min_rating: Option<f64>,
    pub min_votes: Option<u64>,
    pub keyword: Option<String>,
    pub tags: Vec<String>,
}

impl MovieFilter {
    pub fn validate(&self) -> Result<(), ExplorerError> {
        if let Some(rating) = self.min_rating
            && !(0.0..=MAX_RATING).contains(&rating)
        {
            return Err(ExplorerError::InvalidFilter(format!(
                "min_rating must be within 0..={MAX_RATING}, got {rating}"
            )));
        }
        Ok(())
    }

    fn keyword(&self) -> Option<String> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase)
    }

    fn matches_stats(&self, movie: &MovieStat) -> bool {
        if let Some(min) = self.min_rating
            && movie.avg_rating < min
        {
            return false;
        }
        if let Some(min) = self.min_votes
            && movie.rating_count < min
        {
            return false;
        }
        if let Some(range) = self.years
            && !movie.year.is_some_and(|y| range.contains(y))
        {
            return false;
        }
        true
    }
}

/// Compact form of the active filters, `none` when nothing is selected.
impl fmt::Display for MovieFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.genres.is_empty() {
            parts.push(format!("genres={}", self.genres.join("|")));
        }
        if let Some(years) = self.years {
            parts.push(format!("years={years}"));
        }
        if let Some(rating) = self.min_rating {
            parts.push(format!("min_rating={rating}"));
        }
        if let Some(votes) = self.min_votes {
            parts.push(format!("min_votes={votes}"));
        }
        if let Some(keyword) = self.keyword() {
            parts.push(format!("keyword={keyword}"));
        }
        if !self.tags.is_empty() {
            parts.push(format!("tags={}", self.tags.join("|")));
        }

        if parts.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

/// A movie that passed every active filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieMatch {
    pub movie: MovieStat,
    pub genres: Option<String>,
}

/// The filtering stages of a search, split around the genre lookup.
pub struct FilterPipeline<'a> {
    filter: &'a MovieFilter,
    tags_available: bool,
}

impl<'a> FilterPipeline<'a> {
    #[must_use]
    pub const fn new(filter: &'a MovieFilter, tags_available: bool) -> Self {
        Self {
            filter,
            tags_available,
        }
    }

    /// Whether the tag predicate can be evaluated against this table.
    #[must_use]
    pub const fn tag_filter_applies(&self) -> bool {
        self.tags_available && !self.filter.tags.is_empty()
    }

    /// Rating, votes, year, keyword and tag predicates.
    #[must_use]
    pub fn prefilter<'m>(&self, movies: &'m [MovieStat]) -> Vec<&'m MovieStat> {
        let keyword = self.filter.keyword();
        let check_tags = self.tag_filter_applies();

        movies
            .iter()
            .filter(|m| self.filter.matches_stats(m))
            .filter(|m| {
                keyword
                    .as_ref()
                    .is_none_or(|k| m.title.to_lowercase().contains(k.as_str()))
            })
            .filter(|m| !check_tags || has_all_tags(m, &self.filter.tags))
            .collect()
    }

    /// Genre predicate plus ordering. `genres[i]` belongs to `movies[i]`.
    #[must_use]
    pub fn finish(&self, movies: Vec<&MovieStat>, genres: Vec<Option<String>>) -> Vec<MovieMatch> {
        let selected = &self.filter.genres;

        let mut matches: Vec<MovieMatch> = movies
            .into_iter()
            .zip(genres)
            .filter(|(_, g)| {
                selected.is_empty() || g.as_deref().is_some_and(|g| has_any_genre(g, selected))
            })
            .map(|(movie, genres)| MovieMatch {
                movie: movie.clone(),
                genres,
            })
            .collect();

        matches.sort_by(|a, b| b.movie.avg_rating.total_cmp(&a.movie.avg_rating));
        matches
    }
}

fn has_any_genre(genres: &str, selected: &[String]) -> bool {
    split_pipe_list(genres).any(|g| selected.iter().any(|s| s == g))
}

fn has_all_tags(movie: &MovieStat, required: &[String]) -> bool {
    let Some(tags) = movie.tags.as_ref() else {
        return false;
    };
    required.iter().all(|r| tags.iter().any(|t| t == r))
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchSummary {
    pub total: usize,
    pub mean_rating: Option<f64>,
    pub mean_votes: Option<f64>,
}

impl SearchSummary {
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_matches(matches: &[MovieMatch]) -> Self {
        let total = matches.len();
        if total == 0 {
            return Self {
                total,
                mean_rating: None,
                mean_votes: None,
            };
        }

        let n = total as f64;
        let rating_sum: f64 = matches.iter().map(|m| m.movie.avg_rating).sum();
        let votes_sum: f64 = matches.iter().map(|m| m.movie.rating_count as f64).sum();

        Self {
            total,
            mean_rating: Some(rating_sum / n),
            mean_votes: Some(votes_sum / n),
        }
    }

    #[must_use]
    pub fn mean_rating_display(&self) -> String {
        self.mean_rating
            .map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
    }

    #[must_use]
    pub fn mean_votes_display(&self) -> String {
        self.mean_votes
            .map_or_else(|| "N/A".to_string(), |v| format!("{v:.0}"))
    }
}

/// Display data for one result card.
#[derive(Debug, Clone, Serialize)]
pub struct MovieCard {
    pub movie_id: MovieId,
    pub title: String,
    pub year: Option<i32>,
    pub genres: Option<String>,
    pub avg_rating: f64,
    pub rating_count: u64,
    pub tags: Option<Vec<String>>,
    pub imdb_url: String,
    pub poster_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub summary: SearchSummary,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub cards: Vec<MovieCard>,
    /// Filters that were requested but could not be evaluated.
    pub ignored_filters: Vec<String>,
}

/// Widget choices and their defaults.
#[derive(Debug, Clone, Serialize)]
pub struct ExplorerOptions {
    pub genres: Vec<String>,
    pub default_genres: Vec<String>,
    pub year_bounds: Option<YearRange>,
    pub default_years: Option<YearRange>,
    pub min_rating: f64,
    pub max_rating: f64,
    pub rating_step: f64,
    pub default_min_rating: f64,
    pub max_votes: u64,
    pub votes_step: u64,
    pub default_min_votes: u64,
    pub tags: Vec<String>,
    pub tags_filterable: bool,
}

impl ExplorerOptions {
    #[must_use]
    pub fn default_filter(&self) -> MovieFilter {
        MovieFilter {
            genres: self.default_genres.clone(),
            years: self.default_years,
            min_rating: Some(self.default_min_rating),
            min_votes: Some(self.default_min_votes),
            keyword: None,
            tags: Vec::new(),
        }
    }
}

pub struct ExplorerService {
    store: Arc<TableStore>,
    resolver: Arc<GenreResolver>,
    settings: ExplorerConfig,
    posters: PosterConfig,
}

impl ExplorerService {
    #[must_use]
    pub const fn new(
        store: Arc<TableStore>,
        resolver: Arc<GenreResolver>,
        settings: ExplorerConfig,
        posters: PosterConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            settings,
            posters,
        }
    }

    fn movies(&self) -> Result<MovieTable, ExplorerError> {
        Ok(MovieTable::from_frame(self.store.load(tables::TOP_MOVIES)?.as_ref())?)
    }

    /// Enriched links are optional: without them every card uses placeholders.
    fn links(&self) -> Result<LinkIndex, ExplorerError> {
        match self.store.load(tables::LINKS_ENRICHED) {
            Ok(df) => Ok(LinkIndex::from_frame(&df)?),
            Err(TableError::NotFound(path)) => {
                warn!(path = %path.display(), "Enriched links missing, using placeholders");
                Ok(LinkIndex::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn options(&self) -> Result<ExplorerOptions, ExplorerError> {
        let movies = self.movies()?;
        let genre_rows = GenreCount::from_frame(self.store.load(tables::GENRES)?.as_ref())?;
        let tag_rows = TagCount::from_frame(
            self.store.load(tables::USER_TAG_STATS)?.as_ref(),
            tables::USER_TAG_STATS,
        )?;

        let genres: Vec<String> = genre_rows
            .into_iter()
            .map(|r| r.genre)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let tags: Vec<String> = tag_rows
            .into_iter()
            .map(|r| r.tag)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let year_bounds = movies.year_bounds().map(|(lo, hi)| YearRange::new(lo, hi));
        let default_years =
            year_bounds.map(|bounds| self.settings.default_year_range.clamp_to(bounds));

        Ok(ExplorerOptions {
            default_genres: genres
                .iter()
                .take(self.settings.default_genre_count)
                .cloned()
                .collect(),
            genres,
            year_bounds,
            default_years,
            min_rating: MIN_RATING,
            max_rating: MAX_RATING,
            rating_step: RATING_STEP,
            default_min_rating: self.settings.default_min_rating,
            max_votes: movies.max_rating_count(),
            votes_step: VOTES_STEP,
            default_min_votes: self.settings.default_min_votes,
            tags,
            tags_filterable: movies.has_tags,
        })
    }

    /// Every movie matching `filter`, best rated first.
    pub async fn search_all(
        &self,
        filter: &MovieFilter,
    ) -> Result<(Vec<MovieMatch>, Vec<String>), ExplorerError> {
        filter.validate()?;
        let table = self.movies()?;
        let pipeline = FilterPipeline::new(filter, table.has_tags);

        let mut ignored = Vec::new();
        if !filter.tags.is_empty() && !pipeline.tag_filter_applies() {
            warn!(
                tags = ?filter.tags,
                "Movie table has no tags column, tag filter ignored"
            );
            ignored.push("tags".to_string());
        }

        let candidates = pipeline.prefilter(&table.movies);
        let ids: Vec<MovieId> = candidates.iter().map(|m| m.movie_id).collect();
        let genres = self.resolver.resolve_many(&ids).await;
        let matches = pipeline.finish(candidates, genres);

        info!(
            candidates = ids.len(),
            matches = matches.len(),
            filter = %filter,
            "Explorer search finished"
        );

        Ok((matches, ignored))
    }

    /// One page of result cards. Pages are 1-based; out-of-range pages are empty.
    pub async fn search(
        &self,
        filter: &MovieFilter,
        page: usize,
    ) -> Result<SearchResults, ExplorerError> {
        let (matches, ignored_filters) = self.search_all(filter).await?;
        let links = self.links()?;

        let page_size = self.settings.page_size.max(1);
        let page = page.max(1);
        let summary = SearchSummary::from_matches(&matches);
        let total_pages = matches.len().div_ceil(page_size);

        let cards = matches
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .map(|m| {
                let urls = links.resolve(m.movie.movie_id, &self.posters.placeholder_url);
                MovieCard {
                    movie_id: m.movie.movie_id,
                    title: m.movie.title,
                    year: m.movie.year,
                    genres: m.genres,
                    avg_rating: m.movie.avg_rating,
                    rating_count: m.movie.rating_count,
                    tags: m.movie.tags,
                    imdb_url: urls.imdb_url,
                    poster_url: urls.poster_url,
                }
            })
            .collect();

        Ok(SearchResults {
            summary,
            page,
            page_size,
            total_pages,
            cards,
            ignored_filters,
        })
    }

    pub fn movie_links(&self, id: MovieId) -> Result<Option<crate::models::MovieLinks>, ExplorerError> {
        Ok(self.links()?.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::genres::testing::FakeCatalog;

    fn table() -> Vec<MovieStat> {
        vec![
            MovieStat::new(1, "The Matrix (1999)", 4.2, 278),
            MovieStat::new(2, "Toy Story (1995)", 3.9, 215),
            MovieStat::new(3, "Heat (1995)", 3.9, 102),
            MovieStat::new(4, "Jumanji (1990)", 3.2, 110),
            MovieStat::new(5, "Grumpier Old Men (2018)", 3.6, 52),
            MovieStat::new(6, "Unknown Film", 4.8, 500),
            MovieStat::new(7, "Obscure (1994)", 4.5, 49),
        ]
    }

    fn catalog() -> Arc<FakeCatalog> {
        Arc::new(FakeCatalog::with_genres(&[
            (1, "Action|Sci-Fi|Thriller"),
            (2, "Adventure|Animation|Children|Comedy|Fantasy"),
            (3, "Action|Crime|Thriller"),
            (4, "Adventure|Children|Fantasy"),
            (5, "Comedy|Romance"),
            (6, "Drama"),
            (7, "Drama"),
        ]))
    }

    async fn run(filter: &MovieFilter, movies: &[MovieStat], catalog: Arc<FakeCatalog>) -> Vec<MovieMatch> {
        let resolver = GenreResolver::new(catalog, 100, 4);
        let pipeline = FilterPipeline::new(filter, movies.iter().any(|m| m.tags.is_some()));
        let candidates = pipeline.prefilter(movies);
        let ids: Vec<MovieId> = candidates.iter().map(|m| m.movie_id).collect();
        let genres = resolver.resolve_many(&ids).await;
        pipeline.finish(candidates, genres)
    }

    fn ids(matches: &[MovieMatch]) -> Vec<i64> {
        matches.iter().map(|m| m.movie.movie_id.value()).collect()
    }

    #[test]
    fn test_filter_display_lists_active_filters() {
        assert_eq!(MovieFilter::default().to_string(), "none");

        let filter = MovieFilter {
            genres: vec!["Action".into(), "Drama".into()],
            years: Some(YearRange::new(1990, 2000)),
            min_votes: Some(50),
            keyword: Some("  Matrix ".into()),
            ..MovieFilter::default()
        };
        assert_eq!(
            filter.to_string(),
            "genres=Action|Drama years=1990-2000 min_votes=50 keyword=matrix"
        );
    }

    #[tokio::test]
    async fn test_no_active_filter_keeps_everything_sorted_by_rating() {
        let result = run(&MovieFilter::default(), &table(), catalog()).await;
        assert_eq!(ids(&result), vec![6, 7, 1, 2, 3, 5, 4]);
    }

    #[tokio::test]
    async fn test_equal_ratings_keep_table_order() {
        let result = run(&MovieFilter::default(), &table(), catalog()).await;
        let pos2 = ids(&result).iter().position(|&i| i == 2).unwrap();
        let pos3 = ids(&result).iter().position(|&i| i == 3).unwrap();
        assert!(pos2 < pos3);
    }

    #[tokio::test]
    async fn test_genre_filter_requires_one_selected_genre() {
        let filter = MovieFilter {
            genres: vec!["Comedy".to_string(), "Crime".to_string()],
            ..MovieFilter::default()
        };
        let result = run(&filter, &table(), catalog()).await;
        assert_eq!(ids(&result), vec![2, 3, 5]);
        for m in &result {
            let genres = m.genres.as_deref().unwrap();
            assert!(split_pipe_list(genres).any(|g| g == "Comedy" || g == "Crime"));
        }
    }

    #[tokio::test]
    async fn test_genre_match_is_exact_not_substring() {
        let filter = MovieFilter {
            genres: vec!["Fi".to_string()],
            ..MovieFilter::default()
        };
        assert!(run(&filter, &table(), catalog()).await.is_empty());
    }

    #[tokio::test]
    async fn test_rating_and_vote_thresholds() {
        let filter = MovieFilter {
            min_rating: Some(3.9),
            min_votes: Some(110),
            ..MovieFilter::default()
        };
        let result = run(&filter, &table(), catalog()).await;
        assert_eq!(ids(&result), vec![6, 1, 2]);
        for m in &result {
            assert!(m.movie.avg_rating >= 3.9);
            assert!(m.movie.rating_count >= 110);
        }
    }

    #[tokio::test]
    async fn test_year_filter_is_inclusive_and_drops_yearless_titles() {
        let filter = MovieFilter {
            years: Some(YearRange::new(1990, 1995)),
            ..MovieFilter::default()
        };
        let result = run(&filter, &table(), catalog()).await;
        assert_eq!(ids(&result), vec![7, 2, 3, 4]);
        assert!(!ids(&result).contains(&6));
    }

    #[tokio::test]
    async fn test_keyword_is_case_insensitive_substring() {
        let filter = MovieFilter {
            keyword: Some("  matrix ".to_string()),
            ..MovieFilter::default()
        };
        assert_eq!(ids(&run(&filter, &table(), catalog()).await), vec![1]);

        let blank = MovieFilter {
            keyword: Some("   ".to_string()),
            ..MovieFilter::default()
        };
        assert_eq!(run(&blank, &table(), catalog()).await.len(), 7);
    }

    #[tokio::test]
    async fn test_movie_unknown_to_service_only_survives_without_genre_filter() {
        let mut movies = table();
        movies.push(MovieStat::new(99, "Ghost Movie (2000)", 5.0, 1000));

        let result = run(&MovieFilter::default(), &movies, catalog()).await;
        let ghost = result.iter().find(|m| m.movie.movie_id.value() == 99).unwrap();
        assert!(ghost.genres.is_none());

        let filter = MovieFilter {
            genres: vec!["Drama".to_string()],
            ..MovieFilter::default()
        };
        let result = run(&filter, &movies, catalog()).await;
        assert!(!ids(&result).contains(&99));
    }

    #[tokio::test]
    async fn test_lookup_failure_behaves_like_missing_genre() {
        let mut fake = FakeCatalog::with_genres(&[(1, "Action")]);
        fake.failing.insert(1);
        let catalog = Arc::new(fake);

        let movies = vec![MovieStat::new(1, "The Matrix (1999)", 4.2, 278)];
        assert_eq!(run(&MovieFilter::default(), &movies, catalog.clone()).await.len(), 1);

        let filter = MovieFilter {
            genres: vec!["Action".to_string()],
            ..MovieFilter::default()
        };
        assert!(run(&filter, &movies, catalog).await.is_empty());
    }

    #[tokio::test]
    async fn test_tag_filter_requires_every_selected_tag() {
        let movies = vec![
            MovieStat::new(1, "A (2000)", 4.0, 10).with_tags(["pixar", "funny"]),
            MovieStat::new(2, "B (2000)", 3.0, 10).with_tags(["funny"]),
            MovieStat::new(3, "C (2000)", 2.0, 10).with_tags(Vec::<String>::new()),
        ];
        let catalog = Arc::new(FakeCatalog::with_genres(&[(1, "Comedy"), (2, "Comedy"), (3, "Comedy")]));
        let filter = MovieFilter {
            tags: vec!["funny".to_string(), "pixar".to_string()],
            ..MovieFilter::default()
        };
        assert_eq!(ids(&run(&filter, &movies, catalog).await), vec![1]);
    }

    #[test]
    fn test_tag_filter_is_skipped_without_tags_column() {
        let filter = MovieFilter {
            tags: vec!["funny".to_string()],
            ..MovieFilter::default()
        };
        let pipeline = FilterPipeline::new(&filter, false);
        assert!(!pipeline.tag_filter_applies());
        assert_eq!(pipeline.prefilter(&table()).len(), 7);
    }

    #[tokio::test]
    async fn test_genres_are_only_fetched_for_prefiltered_rows() {
        let catalog = catalog();
        let filter = MovieFilter {
            keyword: Some("heat".to_string()),
            ..MovieFilter::default()
        };
        run(&filter, &table(), catalog.clone()).await;
        assert_eq!(catalog.lookups(), 1);
    }

    #[test]
    fn test_summary_formats_means() {
        let matches = vec![
            MovieMatch {
                movie: MovieStat::new(1, "A (2000)", 4.0, 10),
                genres: None,
            },
            MovieMatch {
                movie: MovieStat::new(2, "B (2000)", 3.5, 16),
                genres: None,
            },
        ];
        let summary = SearchSummary::from_matches(&matches);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.mean_rating_display(), "3.75");
        assert_eq!(summary.mean_votes_display(), "13");

        let empty = SearchSummary::from_matches(&[]);
        assert_eq!(empty.mean_rating_display(), "N/A");
        assert_eq!(empty.mean_votes_display(), "N/A");
    }

    #[test]
    fn test_filter_validation() {
        let filter = MovieFilter {
            min_rating: Some(7.0),
            ..MovieFilter::default()
        };
        assert!(matches!(filter.validate(), Err(ExplorerError::InvalidFilter(_))));
        assert!(MovieFilter::default().validate().is_ok());
    }
}
