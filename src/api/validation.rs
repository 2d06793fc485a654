//! Query-string decoding for the explorer and tag pages.
//!
//! Multi-selects submit one `key=value` pair per chosen option, so these
//! parsers walk the raw query with `form_urlencoded` instead of going
//! through `Query<T>`.

use url::form_urlencoded;

use super::ApiError;
use crate::constants::limits::MAX_RATING;
use crate::domain::YearRange;
use crate::services::MovieFilter;

/// A decoded explorer request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplorerQuery {
    pub filter: MovieFilter,
    pub page: usize,
    /// False when the request carried no filter keys at all.
    pub submitted: bool,
}

fn pairs(raw: Option<&str>) -> impl Iterator<Item = (String, String)> + '_ {
    form_urlencoded::parse(raw.unwrap_or_default().as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<Option<T>, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| ApiError::validation(format!("Invalid value for {key}: '{value}'")))
}

pub fn parse_explorer_query(raw: Option<&str>) -> Result<ExplorerQuery, ApiError> {
    let mut query = ExplorerQuery {
        page: 1,
        ..ExplorerQuery::default()
    };
    let mut year_from: Option<i32> = None;
    let mut year_to: Option<i32> = None;

    for (key, value) in pairs(raw) {
        match key.as_str() {
            "genre" | "genres" => {
                query.submitted = true;
                if !value.trim().is_empty() {
                    query.filter.genres.push(value.trim().to_string());
                }
            }
            "tag" | "tags" => {
                query.submitted = true;
                if !value.trim().is_empty() {
                    query.filter.tags.push(value.trim().to_string());
                }
            }
            "year_from" => {
                query.submitted = true;
                year_from = parse_number(&key, &value)?;
            }
            "year_to" => {
                query.submitted = true;
                year_to = parse_number(&key, &value)?;
            }
            "min_rating" => {
                query.submitted = true;
                query.filter.min_rating = parse_number(&key, &value)?;
            }
            "min_votes" => {
                query.submitted = true;
                query.filter.min_votes = parse_number(&key, &value)?;
            }
            "keyword" | "q" => {
                query.submitted = true;
                query.filter.keyword = Some(value).filter(|v| !v.trim().is_empty());
            }
            "page" => {
                query.page = parse_number(&key, &value)?.unwrap_or(1);
            }
            "submit" => query.submitted = true,
            _ => {}
        }
    }

    query.filter.years = match (year_from, year_to) {
        (Some(from), Some(to)) => Some(YearRange::new(from, to)),
        (Some(from), None) => Some(YearRange::new(from, i32::MAX)),
        (None, Some(to)) => Some(YearRange::new(i32::MIN, to)),
        (None, None) => None,
    };

    validate_min_rating(query.filter.min_rating)?;
    query.page = validate_page(query.page)?;
    Ok(query)
}

/// Genre selection for the tag page. `None` when the form was never applied.
#[must_use]
pub fn parse_genre_selection(raw: Option<&str>) -> Option<Vec<String>> {
    let mut applied = false;
    let mut genres = Vec::new();

    for (key, value) in pairs(raw) {
        match key.as_str() {
            "genre" | "genres" => {
                applied = true;
                genres.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|g| !g.is_empty())
                        .map(str::to_string),
                );
            }
            "applied" => applied = true,
            _ => {}
        }
    }

    applied.then_some(genres)
}

pub fn validate_min_rating(rating: Option<f64>) -> Result<Option<f64>, ApiError> {
    if let Some(r) = rating
        && !(0.0..=MAX_RATING).contains(&r)
    {
        return Err(ApiError::validation(format!(
            "Invalid min_rating: {r}. Must be between 0 and {MAX_RATING}"
        )));
    }
    Ok(rating)
}

pub fn validate_page(page: usize) -> Result<usize, ApiError> {
    if page == 0 {
        return Err(ApiError::validation("Invalid page: 0. Pages start at 1"));
    }
    Ok(page)
}

pub fn validate_movie_id(id: i64) -> Result<i64, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid movie ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_keys_become_lists() {
        let q = parse_explorer_query(Some(
            "genre=Comedy&genre=Sci-Fi&tag=funny&year_from=1990&year_to=2000&min_rating=3.5&min_votes=50&keyword=the+matrix&page=2",
        ))
        .unwrap();

        assert!(q.submitted);
        assert_eq!(q.page, 2);
        assert_eq!(q.filter.genres, vec!["Comedy", "Sci-Fi"]);
        assert_eq!(q.filter.tags, vec!["funny"]);
        assert_eq!(q.filter.years, Some(YearRange::new(1990, 2000)));
        assert_eq!(q.filter.min_rating, Some(3.5));
        assert_eq!(q.filter.min_votes, Some(50));
        assert_eq!(q.filter.keyword.as_deref(), Some("the matrix"));
    }

    #[test]
    fn test_empty_query_is_not_submitted() {
        let q = parse_explorer_query(None).unwrap();
        assert!(!q.submitted);
        assert_eq!(q.page, 1);
        assert_eq!(q.filter, MovieFilter::default());
    }

    #[test]
    fn test_blank_values_are_inactive() {
        let q = parse_explorer_query(Some("keyword=+&min_votes=&year_from=")).unwrap();
        assert!(q.submitted);
        assert!(q.filter.keyword.is_none());
        assert!(q.filter.min_votes.is_none());
        assert!(q.filter.years.is_none());
    }

    #[test]
    fn test_bad_numbers_are_rejected() {
        assert!(parse_explorer_query(Some("min_votes=many")).is_err());
        assert!(parse_explorer_query(Some("min_rating=7")).is_err());
        assert!(parse_explorer_query(Some("page=0")).is_err());
    }

    #[test]
    fn test_genre_selection() {
        assert_eq!(parse_genre_selection(None), None);
        assert_eq!(parse_genre_selection(Some("applied=1")), Some(vec![]));
        assert_eq!(
            parse_genre_selection(Some("genres=Drama,Comedy&genre=Horror")),
            Some(vec![
                "Drama".to_string(),
                "Comedy".to_string(),
                "Horror".to_string()
            ])
        );
    }

    #[test]
    fn test_validate_movie_id() {
        assert!(validate_movie_id(1).is_ok());
        assert!(validate_movie_id(0).is_err());
        assert!(validate_movie_id(-4).is_err());
    }
}
