use crate::cli::SearchArgs;
use crate::domain::YearRange;
use crate::services::MovieFilter;
use crate::state::SharedState;

impl SearchArgs {
    #[must_use]
    pub fn to_filter(&self) -> MovieFilter {
        let years = match (self.year_from, self.year_to) {
            (None, None) => None,
            (from, to) => Some(YearRange::new(
                from.unwrap_or(i32::MIN),
                to.unwrap_or(i32::MAX),
            )),
        };

        MovieFilter {
            genres: self.genres.clone(),
            years,
            min_rating: self.min_rating,
            min_votes: self.min_votes,
            keyword: self.keyword.clone(),
            tags: self.tags.clone(),
        }
    }
}

fn truncate(title: &str, width: usize) -> String {
    if title.chars().count() <= width {
        title.to_string()
    } else {
        let cut: String = title.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

pub async fn cmd_search(state: &SharedState, args: &SearchArgs) -> anyhow::Result<()> {
    let filter = args.to_filter();
    let (matches, ignored) = state.explorer.search_all(&filter).await?;

    for name in &ignored {
        println!("Warning: the {name} filter is not available for this data and was ignored.");
    }

    if matches.is_empty() {
        println!("No movies match these filters.");
        return Ok(());
    }

    let summary = crate::services::SearchSummary::from_matches(&matches);
    println!(
        "{} movies · mean rating {} · mean votes {}",
        summary.total,
        summary.mean_rating_display(),
        summary.mean_votes_display()
    );
    println!();
    println!("{:>7}  {:<48}  {:>6}  {:>6}  Genres", "ID", "Title", "Rating", "Votes");
    println!("{:-<100}", "");

    for m in matches.iter().take(args.limit) {
        println!(
            "{:>7}  {:<48}  {:>6.2}  {:>6}  {}",
            m.movie.movie_id,
            truncate(&m.movie.title, 48),
            m.movie.avg_rating,
            m.movie.rating_count,
            m.genres.as_deref().unwrap_or("?"),
        );
    }

    if matches.len() > args.limit {
        println!();
        println!("... {} more (use --limit to show more)", matches.len() - args.limit);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_args_to_filter() {
        let args = SearchArgs {
            genres: vec!["Drama".to_string()],
            year_from: Some(1995),
            ..SearchArgs::default()
        };
        let filter = args.to_filter();
        assert_eq!(filter.genres, vec!["Drama"]);
        let years = filter.years.unwrap();
        assert!(years.contains(1995));
        assert!(years.contains(2030));
        assert!(!years.contains(1994));
    }

    #[test]
    fn test_truncate_long_titles() {
        assert_eq!(truncate("Heat (1995)", 48), "Heat (1995)");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }
}
