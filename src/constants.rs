pub mod tables {
    pub const LINKS_ENRICHED: &str = "links_enriched.parquet";

    pub const TOP_MOVIES: &str = "top_movies_by_ratings.parquet";

    pub const GENRES: &str = "genre_df.parquet";

    pub const GENRE_RATING_STATS: &str = "genre_rating_stats.parquet";

    pub const MOVIES_BY_YEAR: &str = "movies_by_year.parquet";

    pub const USER_TAG_STATS: &str = "user_tag_stats.parquet";

    pub const TAGS_GOOD_RATING: &str = "tags_good_rating.parquet";

    pub const TAGS_COMPARE: &str = "tags_compare.parquet";

    pub const TAGS_BY_GENRE: &str = "tags_by_genre.parquet";

    pub const ALL: &[&str] = &[
        LINKS_ENRICHED,
        TOP_MOVIES,
        GENRES,
        GENRE_RATING_STATS,
        MOVIES_BY_YEAR,
        USER_TAG_STATS,
        TAGS_GOOD_RATING,
        TAGS_COMPARE,
        TAGS_BY_GENRE,
    ];
}

pub mod links {
    pub const PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/120x180?text=No+Image";

    pub const MISSING_IMDB_URL: &str = "#";
}

pub mod limits {

    pub const TOP_GENRE_STATS: usize = 10;

    pub const TAGS_PER_GENRE: usize = 3;

    pub const MIN_RATING: f64 = 0.5;

    pub const MAX_RATING: f64 = 5.0;

    pub const RATING_STEP: f64 = 0.1;

    pub const VOTES_STEP: u64 = 10;
}
