//! Rows of the pre-aggregated tables behind the overview and tag pages.

use polars::prelude::*;
use serde::Serialize;

use crate::constants::tables::{
    GENRE_RATING_STATS, GENRES, MOVIES_BY_YEAR, TAGS_BY_GENRE, TAGS_COMPARE,
};
use crate::store::TableError;
use crate::store::frame::{count_values, f64_values, i64_values, required, string_values};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: u64,
}

impl GenreCount {
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>, TableError> {
        let genres = required(string_values(df, GENRES, "genre")?, GENRES, "genre")?;
        let counts = count_values(df, GENRES, "count")?;
        Ok(genres
            .into_iter()
            .zip(counts)
            .map(|(genre, count)| Self { genre, count })
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreRatingStat {
    pub genre: String,
    pub rating_count: u64,
    pub avg_rating: f64,
}

impl GenreRatingStat {
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>, TableError> {
        let t = GENRE_RATING_STATS;
        let genres = required(string_values(df, t, "genre")?, t, "genre")?;
        let counts = count_values(df, t, "rating_count")?;
        let ratings = required(f64_values(df, t, "avg_rating")?, t, "avg_rating")?;
        Ok(genres
            .into_iter()
            .zip(counts)
            .zip(ratings)
            .map(|((genre, rating_count), avg_rating)| Self {
                genre,
                rating_count,
                avg_rating,
            })
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i64,
    pub movie_count: u64,
}

impl YearCount {
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>, TableError> {
        let t = MOVIES_BY_YEAR;
        let years = required(i64_values(df, t, "year")?, t, "year")?;
        let counts = count_values(df, t, "movie_count")?;
        Ok(years
            .into_iter()
            .zip(counts)
            .map(|(year, movie_count)| Self { year, movie_count })
            .collect())
    }
}

/// `(tag, count)` rows shared by `user_tag_stats` and `tags_good_rating`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

impl TagCount {
    pub fn from_frame(df: &DataFrame, table: &str) -> Result<Vec<Self>, TableError> {
        let tags = required(string_values(df, table, "tag")?, table, "tag")?;
        let counts = count_values(df, table, "count")?;
        Ok(tags
            .into_iter()
            .zip(counts)
            .map(|(tag, count)| Self { tag, count })
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagComparison {
    pub tag: String,
    pub count_good: u64,
    pub count_bad: u64,
}

impl TagComparison {
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>, TableError> {
        let t = TAGS_COMPARE;
        let tags = required(string_values(df, t, "tag")?, t, "tag")?;
        let good = count_values(df, t, "count_good")?;
        let bad = count_values(df, t, "count_bad")?;
        Ok(tags
            .into_iter()
            .zip(good)
            .zip(bad)
            .map(|((tag, count_good), count_bad)| Self {
                tag,
                count_good,
                count_bad,
            })
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreTagCount {
    pub genre: String,
    pub tag: String,
    pub count: u64,
}

impl GenreTagCount {
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>, TableError> {
        let t = TAGS_BY_GENRE;
        let genres = required(string_values(df, t, "genre")?, t, "genre")?;
        let tags = required(string_values(df, t, "tag")?, t, "tag")?;
        let counts = count_values(df, t, "count")?;
        Ok(genres
            .into_iter()
            .zip(tags)
            .zip(counts)
            .map(|((genre, tag), count)| Self { genre, tag, count })
            .collect())
    }

    /// `tag (genre)`, the axis label of the per-genre chart.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.tag, self.genre)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_comparison_from_frame() {
        let df = df!(
            "tag" => ["funny", "boring"],
            "count_good" => [12i64, 1],
            "count_bad" => [3i64, 9],
        )
        .unwrap();

        let rows = TagComparison::from_frame(&df).unwrap();
        assert_eq!(
            rows[1],
            TagComparison {
                tag: "boring".to_string(),
                count_good: 1,
                count_bad: 9,
            }
        );
    }

    #[test]
    fn test_genre_tag_label() {
        let row = GenreTagCount {
            genre: "Drama".to_string(),
            tag: "atmospheric".to_string(),
            count: 4,
        };
        assert_eq!(row.label(), "atmospheric (Drama)");
    }

    #[test]
    fn test_year_counts_accept_float_years() {
        let df = df!("year" => [1995.0f64, 1996.0], "movie_count" => [10i64, 12]).unwrap();
        let rows = YearCount::from_frame(&df).unwrap();
        assert_eq!(rows[0].year, 1995);
        assert_eq!(rows[1].movie_count, 12);
    }
}
