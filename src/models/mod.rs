pub mod aggregates;
pub mod link;
pub mod movie;

pub use aggregates::{
    GenreCount, GenreRatingStat, GenreTagCount, TagComparison, TagCount, YearCount,
};
pub use link::{EnrichedLink, LinkIndex, LinkRow, MovieLinks};
pub use movie::{MovieStat, MovieTable, extract_year, split_pipe_list};
