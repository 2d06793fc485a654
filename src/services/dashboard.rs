//! Chart assembly for the overview and tag-insights pages.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use thiserror::Error;

use crate::charts::{BarChart, BarMode, BarTrace, Orientation};
use crate::constants::limits::{TAGS_PER_GENRE, TOP_GENRE_STATS};
use crate::constants::tables;
use crate::models::{
    GenreCount, GenreRatingStat, GenreTagCount, MovieTable, TagComparison, TagCount, YearCount,
};
use crate::store::{TableError, TableStore};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewCharts {
    pub genres: BarChart,
    pub genre_ratings: BarChart,
    pub top_movies: BarChart,
    pub movies_by_year: BarChart,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagInsights {
    pub user_tags: BarChart,
    pub good_rating_tags: BarChart,
    pub tag_comparison: BarChart,
    pub tags_by_genre: BarChart,
    /// Every genre offered by the selector.
    pub genres: Vec<String>,
    /// Genres actually drawn.
    pub selected_genres: Vec<String>,
}

pub struct DashboardService {
    store: Arc<TableStore>,
}

impl DashboardService {
    #[must_use]
    pub const fn new(store: Arc<TableStore>) -> Self {
        Self { store }
    }

    pub fn overview(&self) -> Result<OverviewCharts, DashboardError> {
        let genres = GenreCount::from_frame(self.store.load(tables::GENRES)?.as_ref())?;
        let genre_stats =
            GenreRatingStat::from_frame(self.store.load(tables::GENRE_RATING_STATS)?.as_ref())?;
        let by_year = YearCount::from_frame(self.store.load(tables::MOVIES_BY_YEAR)?.as_ref())?;
        let top_movies = MovieTable::from_frame(self.store.load(tables::TOP_MOVIES)?.as_ref())?;

        Ok(OverviewCharts {
            genres: genre_chart(&genres),
            genre_ratings: genre_rating_chart(&genre_stats),
            top_movies: top_movies_chart(&top_movies),
            movies_by_year: movies_by_year_chart(&by_year),
        })
    }

    /// Builds the tag page. `selection` of `None` draws every genre.
    pub fn tag_insights(&self, selection: Option<&[String]>) -> Result<TagInsights, DashboardError> {
        let user_tags =
            TagCount::from_frame(self.store.load(tables::USER_TAG_STATS)?.as_ref(), tables::USER_TAG_STATS)?;
        let good_tags = TagCount::from_frame(
            self.store.load(tables::TAGS_GOOD_RATING)?.as_ref(),
            tables::TAGS_GOOD_RATING,
        )?;
        let compare = TagComparison::from_frame(self.store.load(tables::TAGS_COMPARE)?.as_ref())?;
        let by_genre = GenreTagCount::from_frame(self.store.load(tables::TAGS_BY_GENRE)?.as_ref())?;

        let top = top_tags_per_genre(&by_genre, TAGS_PER_GENRE);
        let genres: Vec<String> = top
            .iter()
            .map(|row| row.genre.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let selected_genres: Vec<String> = match selection {
            None => genres.clone(),
            Some(chosen) => genres
                .iter()
                .filter(|g| chosen.contains(g))
                .cloned()
                .collect(),
        };

        let filtered: Vec<GenreTagCount> = top
            .into_iter()
            .filter(|row| selected_genres.contains(&row.genre))
            .collect();

        Ok(TagInsights {
            user_tags: tag_count_chart(
                "user-tags",
                "Top tags used by users",
                "Uses",
                &user_tags,
            ),
            good_rating_tags: tag_count_chart(
                "good-rating-tags",
                "Most frequent tags in well-rated movies (rating ≥ 4)",
                "Occurrences",
                &good_tags,
            ),
            tag_comparison: tag_comparison_chart(&compare),
            tags_by_genre: tags_by_genre_chart(&filtered),
            genres,
            selected_genres,
        })
    }
}

#[must_use]
pub fn genre_chart(rows: &[GenreCount]) -> BarChart {
    let counts: Vec<f64> = rows.iter().map(|r| as_f64(r.count)).collect();
    BarChart::new("genres", "Top genres by number of movies", Orientation::Horizontal)
        .trace(
            BarTrace::from_pairs(
                Orientation::Horizontal,
                rows.iter().map(|r| (r.genre.clone(), r.count)),
            )
            .colored(counts),
        )
        .label("x", "Movies")
        .label("y", "Genre")
        .color_title("Movies")
        .height(350)
}

/// Ten genres with the most ratings, coloured by their average rating.
#[must_use]
pub fn genre_rating_chart(rows: &[GenreRatingStat]) -> BarChart {
    let mut top: Vec<&GenreRatingStat> = rows.iter().collect();
    top.sort_by(|a, b| b.rating_count.cmp(&a.rating_count));
    top.truncate(TOP_GENRE_STATS);

    BarChart::new(
        "genre-ratings",
        "Top 10 genres by number of ratings and average rating",
        Orientation::Horizontal,
    )
    .trace(
        BarTrace::from_pairs(
            Orientation::Horizontal,
            top.iter().map(|r| (r.genre.clone(), r.rating_count)),
        )
        .colored(top.iter().map(|r| r.avg_rating).collect()),
    )
    .label("x", "Ratings")
    .label("y", "Genre")
    .color_title("Average rating")
    .height(350)
}

#[must_use]
pub fn top_movies_chart(table: &MovieTable) -> BarChart {
    let mut movies: Vec<_> = table.movies.iter().collect();
    movies.sort_by_key(|m| m.rating_count);

    BarChart::new(
        "top-movies",
        format!("Top {} movies by number of ratings", movies.len()),
        Orientation::Horizontal,
    )
    .trace(
        BarTrace::from_pairs(
            Orientation::Horizontal,
            movies.iter().map(|m| (m.title.clone(), m.rating_count)),
        )
        .colored(movies.iter().map(|m| m.avg_rating).collect()),
    )
    .label("x", "Ratings")
    .label("y", "Movie")
    .color_title("Average rating")
    .height(700)
}

#[must_use]
pub fn movies_by_year_chart(rows: &[YearCount]) -> BarChart {
    BarChart::new(
        "movies-by-year",
        "Movies per year (from the title)",
        Orientation::Vertical,
    )
    .trace(BarTrace::from_pairs(
        Orientation::Vertical,
        rows.iter().map(|r| (r.year, r.movie_count)),
    ))
    .label("x", "Year")
    .label("y", "Movies")
    .category_order(crate::charts::CategoryOrder::Trace)
    .height(500)
}

#[must_use]
pub fn tag_count_chart(id: &str, title: &str, count_label: &str, rows: &[TagCount]) -> BarChart {
    let counts: Vec<f64> = rows.iter().map(|r| as_f64(r.count)).collect();
    BarChart::new(id, title, Orientation::Horizontal)
        .trace(
            BarTrace::from_pairs(
                Orientation::Horizontal,
                rows.iter().map(|r| (r.tag.clone(), r.count)),
            )
            .colored(counts),
        )
        .label("x", count_label)
        .label("y", "Tag")
        .color_title(count_label)
        .height(500)
}

/// Good and bad counts side by side, one trace per rating class.
#[must_use]
pub fn tag_comparison_chart(rows: &[TagComparison]) -> BarChart {
    BarChart::new(
        "tag-comparison",
        "Tags: well-rated vs poorly-rated movies",
        Orientation::Horizontal,
    )
    .trace(
        BarTrace::from_pairs(
            Orientation::Horizontal,
            rows.iter().map(|r| (r.tag.clone(), r.count_good)),
        )
        .named("count_good"),
    )
    .trace(
        BarTrace::from_pairs(
            Orientation::Horizontal,
            rows.iter().map(|r| (r.tag.clone(), r.count_bad)),
        )
        .named("count_bad"),
    )
    .barmode(BarMode::Group)
    .label("x", "Occurrences")
    .label("y", "Tag")
    .height(500)
}

/// Keeps the `n` most used tags of every genre. Ties keep table order.
#[must_use]
pub fn top_tags_per_genre(rows: &[GenreTagCount], n: usize) -> Vec<GenreTagCount> {
    let mut by_genre: BTreeMap<&str, Vec<&GenreTagCount>> = BTreeMap::new();
    for row in rows {
        by_genre.entry(row.genre.as_str()).or_default().push(row);
    }

    by_genre
        .into_values()
        .flat_map(|mut group| {
            group.sort_by(|a, b| b.count.cmp(&a.count));
            group.into_iter().take(n).cloned()
        })
        .collect()
}

/// One trace per genre so each gets its own colour, bars sorted by count.
#[must_use]
pub fn tags_by_genre_chart(rows: &[GenreTagCount]) -> BarChart {
    let mut sorted: Vec<&GenreTagCount> = rows.iter().collect();
    sorted.sort_by_key(|r| r.count);

    let mut traces: BTreeMap<&str, Vec<&GenreTagCount>> = BTreeMap::new();
    for row in sorted {
        traces.entry(row.genre.as_str()).or_default().push(row);
    }

    let chart = BarChart::new(
        "tags-by-genre",
        "Top 3 most used tags per genre",
        Orientation::Horizontal,
    )
    .label("x", "Occurrences")
    .label("y", "Tag (Genre)")
    .height(800);

    traces.into_iter().fold(chart, |chart, (genre, rows)| {
        chart.trace(
            BarTrace::from_pairs(
                Orientation::Horizontal,
                rows.iter().map(|r| (r.label(), r.count)),
            )
            .named(genre),
        )
    })
}

#[allow(clippy::cast_precision_loss)]
const fn as_f64(value: u64) -> f64 {
    value as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn genre_tag(genre: &str, tag: &str, count: u64) -> GenreTagCount {
        GenreTagCount {
            genre: genre.to_string(),
            tag: tag.to_string(),
            count,
        }
    }

    #[test]
    fn test_top_tags_per_genre_keeps_three_largest() {
        let rows = vec![
            genre_tag("Drama", "a", 1),
            genre_tag("Drama", "b", 9),
            genre_tag("Drama", "c", 5),
            genre_tag("Drama", "d", 7),
            genre_tag("Comedy", "e", 2),
        ];

        let top = top_tags_per_genre(&rows, 3);
        let labels: Vec<String> = top.iter().map(GenreTagCount::label).collect();
        assert_eq!(
            labels,
            vec!["e (Comedy)", "b (Drama)", "d (Drama)", "c (Drama)"]
        );
    }

    #[test]
    fn test_top_tags_ties_keep_table_order() {
        let rows = vec![
            genre_tag("Drama", "first", 4),
            genre_tag("Drama", "second", 4),
        ];
        let top = top_tags_per_genre(&rows, 1);
        assert_eq!(top[0].tag, "first");
    }

    #[test]
    fn test_genre_rating_chart_keeps_top_ten_by_rating_count() {
        let rows: Vec<GenreRatingStat> = (0..12u64)
            .map(|i| GenreRatingStat {
                genre: format!("g{i}"),
                rating_count: i * 100,
                avg_rating: 3.0,
            })
            .collect();

        let chart = genre_rating_chart(&rows);
        assert_eq!(chart.traces[0].len(), 10);
        assert_eq!(chart.traces[0].y[0], json!("g11"));
        assert!(!chart.traces[0].y.contains(&json!("g1")));
    }

    #[test]
    fn test_tag_comparison_has_good_and_bad_traces() {
        let rows = vec![TagComparison {
            tag: "funny".to_string(),
            count_good: 5,
            count_bad: 2,
        }];
        let chart = tag_comparison_chart(&rows);
        assert_eq!(chart.barmode, BarMode::Group);
        assert_eq!(chart.traces.len(), 2);
        assert_eq!(chart.traces[0].name.as_deref(), Some("count_good"));
        assert_eq!(chart.traces[1].x, vec![json!(2)]);
    }

    #[test]
    fn test_tags_by_genre_chart_uses_one_trace_per_genre() {
        let rows = vec![
            genre_tag("Drama", "slow", 3),
            genre_tag("Comedy", "funny", 8),
            genre_tag("Drama", "sad", 6),
        ];
        let chart = tags_by_genre_chart(&rows);
        assert_eq!(chart.traces.len(), 2);
        let drama = chart
            .traces
            .iter()
            .find(|t| t.name.as_deref() == Some("Drama"))
            .unwrap();
        assert_eq!(drama.y, vec![json!("slow (Drama)"), json!("sad (Drama)")]);
    }

    #[test]
    fn test_top_movies_chart_is_sorted_ascending() {
        let table = MovieTable::new(
            vec![
                crate::models::MovieStat::new(1, "Big (1988)", 3.5, 300),
                crate::models::MovieStat::new(2, "Small (1990)", 4.0, 10),
            ],
            false,
        );
        let chart = top_movies_chart(&table);
        assert_eq!(chart.traces[0].y[0], json!("Small (1990)"));
        assert_eq!(chart.traces[0].color, Some(vec![4.0, 3.5]));
    }
}
