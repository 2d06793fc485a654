use polars::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::constants::tables::TOP_MOVIES;
use crate::domain::MovieId;
use crate::store::TableError;
use crate::store::frame::{
    count_values, f64_values, has_column, i64_values, required, string_values,
};

/// Release year embedded in a MovieLens title, e.g. `Heat (1995)`.
///
/// The first parenthesised four-digit group wins, so
/// `Seven (a.k.a. Se7en) (1995)` still yields 1995.
#[must_use]
pub fn extract_year(title: &str) -> Option<i32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\((\d{4})\)").expect("Invalid regex"));

    re.captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Splits a `|`-separated list (genres, tags), dropping blanks.
pub fn split_pipe_list(value: &str) -> impl Iterator<Item = &str> {
    value.split('|').map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieStat {
    pub movie_id: MovieId,
    pub title: String,
    pub avg_rating: f64,
    pub rating_count: u64,
    pub year: Option<i32>,
    pub tags: Option<Vec<String>>,
}

impl MovieStat {
    #[must_use]
    pub fn new(movie_id: i64, title: impl Into<String>, avg_rating: f64, rating_count: u64) -> Self {
        let title = title.into();
        Self {
            movie_id: MovieId::new(movie_id),
            year: extract_year(&title),
            title,
            avg_rating,
            rating_count,
            tags: None,
        }
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}

/// The explorer's base table.
#[derive(Debug, Clone, Default)]
pub struct MovieTable {
    pub movies: Vec<MovieStat>,
    /// Whether the source carried a per-movie `tags` column.
    pub has_tags: bool,
}

impl MovieTable {
    #[must_use]
    pub const fn new(movies: Vec<MovieStat>, has_tags: bool) -> Self {
        Self { movies, has_tags }
    }

    pub fn from_frame(df: &DataFrame) -> Result<Self, TableError> {
        let ids = required(i64_values(df, TOP_MOVIES, "movieId")?, TOP_MOVIES, "movieId")?;
        let titles = required(string_values(df, TOP_MOVIES, "title")?, TOP_MOVIES, "title")?;
        let ratings = required(
            f64_values(df, TOP_MOVIES, "avg_rating")?,
            TOP_MOVIES,
            "avg_rating",
        )?;
        let counts = count_values(df, TOP_MOVIES, "rating_count")?;

        let has_tags = has_column(df, "tags");
        let tags = if has_tags {
            string_values(df, TOP_MOVIES, "tags")?
        } else {
            vec![None; df.height()]
        };

        let movies = ids
            .into_iter()
            .zip(titles)
            .zip(ratings)
            .zip(counts)
            .zip(tags)
            .map(|((((id, title), rating), count), tags)| {
                let movie = MovieStat::new(id, title, rating, count);
                match tags {
                    Some(raw) => movie.with_tags(split_pipe_list(&raw)),
                    None if has_tags => movie.with_tags(Vec::<String>::new()),
                    None => movie,
                }
            })
            .collect();

        Ok(Self { movies, has_tags })
    }

    /// Smallest and largest extracted release years.
    #[must_use]
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let mut years = self.movies.iter().filter_map(|m| m.year);
        let first = years.next()?;
        Some(years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
    }

    #[must_use]
    pub fn max_rating_count(&self) -> u64 {
        self.movies.iter().map(|m| m.rating_count).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("Toy Story (1995)"), Some(1995));
        assert_eq!(extract_year("Seven (a.k.a. Se7en) (1995)"), Some(1995));
        assert_eq!(extract_year("Babylon 5"), None);
        assert_eq!(extract_year("Movie (19999)"), None);
        assert_eq!(extract_year("2001: A Space Odyssey (1968)"), Some(1968));
    }

    #[test]
    fn test_split_pipe_list() {
        let genres: Vec<&str> = split_pipe_list("Comedy| Drama||Romance ").collect();
        assert_eq!(genres, vec!["Comedy", "Drama", "Romance"]);
    }

    #[test]
    fn test_table_from_frame_without_tags() {
        let df = df!(
            "movieId" => [1i64, 2],
            "title" => ["Toy Story (1995)", "Untitled"],
            "avg_rating" => [3.9f64, 2.1],
            "rating_count" => [215u32, 7],
        )
        .unwrap();

        let table = MovieTable::from_frame(&df).unwrap();
        assert!(!table.has_tags);
        assert_eq!(table.movies.len(), 2);
        assert_eq!(table.movies[0].year, Some(1995));
        assert_eq!(table.movies[1].year, None);
        assert_eq!(table.movies[0].rating_count, 215);
        assert_eq!(table.year_bounds(), Some((1995, 1995)));
        assert_eq!(table.max_rating_count(), 215);
    }

    #[test]
    fn test_table_from_frame_with_tags() {
        let df = df!(
            "movieId" => [1i64, 2],
            "title" => ["A (2000)", "B (2001)"],
            "avg_rating" => [4.0f64, 3.0],
            "rating_count" => [10i64, 20],
            "tags" => [Some("pixar|funny"), None],
        )
        .unwrap();

        let table = MovieTable::from_frame(&df).unwrap();
        assert!(table.has_tags);
        assert_eq!(
            table.movies[0].tags,
            Some(vec!["pixar".to_string(), "funny".to_string()])
        );
        assert_eq!(table.movies[1].tags, Some(vec![]));
    }
}
