use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use html_escape::{encode_double_quoted_attribute as attr, encode_safe as text};
use std::fmt::Write as _;
use std::sync::Arc;
use url::form_urlencoded;

use super::{PAGES, alert, chart_block, layout};
use crate::api::validation::{ExplorerQuery, parse_explorer_query, parse_genre_selection};
use crate::api::{ApiError, AppState};
use crate::constants::tables;
use crate::services::{ExplorerOptions, MovieCard, MovieFilter, SearchResults};

fn render_error(active: &str, heading: &str, err: &ApiError) -> Response {
    let (status, message) = err.status_and_message();
    let body = format!("<h1>{}</h1>{}", text(heading), alert("error", &message));
    (status, Html(layout(active, &body))).into_response()
}

/// `GET /`
pub async fn home_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut body = String::from(
        "<h1>🏠 MovieLens Explorer</h1>\
         <p class=\"lead\">Explore the MovieLens ratings: genre and release trends, \
         what users tag, and a searchable catalogue with posters.</p>\
         <div class=\"cards\">",
    );

    for page in PAGES.iter().filter(|p| p.path != "/") {
        let _ = write!(
            body,
            "<a class=\"card nav-card\" href=\"{}\"><h3>{} {}</h3><p>{}</p></a>",
            page.path,
            page.icon,
            text(page.title),
            text(page.summary)
        );
    }
    body.push_str("</div><h2>Data files</h2><table class=\"tables\">");
    body.push_str("<tr><th>Table</th><th>Status</th><th>Rows</th></tr>");

    for info in state.shared.tables.describe(tables::ALL) {
        let status = match (info.present, info.cached) {
            (false, _) => "missing",
            (true, true) => "loaded",
            (true, false) => "not loaded yet",
        };
        let rows = info.rows.map_or_else(|| "–".to_string(), |r| r.to_string());
        let _ = write!(
            body,
            "<tr><td><code>{}</code></td><td>{status}</td><td>{rows}</td></tr>",
            text(&info.name)
        );
    }
    body.push_str("</table>");

    Html(layout("/", &body))
}

/// `GET /overview`
pub async fn overview_page(State(state): State<Arc<AppState>>) -> Response {
    const HEADING: &str = "🎬 Movies and ratings overview";

    let charts = match state.dashboard().overview() {
        Ok(charts) => charts,
        Err(e) => return render_error("/overview", HEADING, &e.into()),
    };

    let body = format!(
        "<h1>{HEADING}</h1><div class=\"grid\">{}{}</div>{}{}",
        chart_block(&charts.genres),
        chart_block(&charts.genre_ratings),
        chart_block(&charts.top_movies),
        chart_block(&charts.movies_by_year),
    );

    Html(layout("/overview", &body)).into_response()
}

/// `GET /tags`
pub async fn tags_page(State(state): State<Arc<AppState>>, RawQuery(query): RawQuery) -> Response {
    const HEADING: &str = "📊 Tags insights";

    let selection = parse_genre_selection(query.as_deref());
    let insights = match state.dashboard().tag_insights(selection.as_deref()) {
        Ok(insights) => insights,
        Err(e) => return render_error("/tags", HEADING, &e.into()),
    };

    let mut options = String::new();
    for genre in &insights.genres {
        let selected = if insights.selected_genres.contains(genre) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            options,
            "<option value=\"{}\"{selected}>{}</option>",
            attr(genre),
            text(genre)
        );
    }

    let body = format!(
        "<h1>{HEADING}</h1>\
         <div class=\"grid\">{}{}</div>{}\
         <h2>Top 3 tags per genre</h2>\
         <form method=\"get\" action=\"/tags\" class=\"filters inline\">\
         <input type=\"hidden\" name=\"applied\" value=\"1\">\
         <label>Genres <select name=\"genre\" multiple size=\"8\">{options}</select></label>\
         <button type=\"submit\">Apply</button></form>{}",
        chart_block(&insights.user_tags),
        chart_block(&insights.good_rating_tags),
        chart_block(&insights.tag_comparison),
        chart_block(&insights.tags_by_genre),
    );

    Html(layout("/tags", &body)).into_response()
}

/// `GET /explorer`
pub async fn explorer_page(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> Response {
    const HEADING: &str = "🔎 Movie explorer";

    let query = match parse_explorer_query(raw.as_deref()) {
        Ok(query) => query,
        Err(e) => return render_error("/explorer", HEADING, &e),
    };
    let options = match state.explorer().options() {
        Ok(options) => options,
        Err(e) => return render_error("/explorer", HEADING, &e.into()),
    };

    let filter = if query.submitted {
        query.filter.clone()
    } else {
        options.default_filter()
    };

    let mut body = format!("<h1>{HEADING}</h1>{}", filter_form(&options, &filter));

    if query.submitted {
        match state.explorer().search(&query.filter, query.page).await {
            Ok(results) => body.push_str(&results_section(&results, &query, raw.as_deref())),
            Err(e) => return render_error("/explorer", HEADING, &e.into()),
        }
    } else {
        body.push_str(&alert(
            "info",
            "Choose your filters and press Search to list matching movies.",
        ));
    }

    Html(layout("/explorer", &body)).into_response()
}

pub async fn not_found_page() -> Response {
    let body = format!(
        "<h1>Page not found</h1>{}",
        alert("warning", "This page does not exist.")
    );
    (StatusCode::NOT_FOUND, Html(layout("", &body))).into_response()
}

fn multi_select(name: &str, choices: &[String], selected: &[String]) -> String {
    let mut html = format!("<select name=\"{}\" multiple size=\"8\">", attr(name));
    for choice in choices {
        let mark = if selected.contains(choice) { " selected" } else { "" };
        let _ = write!(
            html,
            "<option value=\"{}\"{mark}>{}</option>",
            attr(choice),
            text(choice)
        );
    }
    html.push_str("</select>");
    html
}

fn filter_form(options: &ExplorerOptions, filter: &MovieFilter) -> String {
    let (year_min, year_max) = options
        .year_bounds
        .map_or((String::new(), String::new()), |b| {
            (b.from.to_string(), b.to.to_string())
        });
    // One-sided ranges are stored with an open end at the i32 limits.
    let bound = |year: i32| {
        if year == i32::MIN || year == i32::MAX {
            String::new()
        } else {
            year.to_string()
        }
    };
    let (year_from, year_to) = filter
        .years
        .map_or((String::new(), String::new()), |y| (bound(y.from), bound(y.to)));

    let tag_note = if options.tags_filterable {
        String::new()
    } else {
        "<small>The movie table has no tags column; a tag selection will be ignored.</small>"
            .to_string()
    };

    format!(
        "<form method=\"get\" action=\"/explorer\" class=\"filters\">\
         <label>Genres {genres}</label>\
         <fieldset><legend>Release year</legend>\
         <input type=\"number\" name=\"year_from\" min=\"{year_min}\" max=\"{year_max}\" value=\"{year_from}\">\
         <input type=\"number\" name=\"year_to\" min=\"{year_min}\" max=\"{year_max}\" value=\"{year_to}\">\
         </fieldset>\
         <label>Minimum rating <input type=\"number\" name=\"min_rating\" min=\"{rmin}\" max=\"{rmax}\" step=\"{rstep}\" value=\"{rating}\"></label>\
         <label>Minimum votes <input type=\"number\" name=\"min_votes\" min=\"0\" max=\"{vmax}\" step=\"{vstep}\" value=\"{votes}\"></label>\
         <label>Title keyword <input type=\"text\" name=\"keyword\" value=\"{keyword}\"></label>\
         <label>Tags {tags}{tag_note}</label>\
         <button type=\"submit\" name=\"submit\" value=\"1\">Search</button>\
         </form>",
        genres = multi_select("genre", &options.genres, &filter.genres),
        tags = multi_select("tag", &options.tags, &filter.tags),
        rmin = options.min_rating,
        rmax = options.max_rating,
        rstep = options.rating_step,
        rating = filter.min_rating.map(|r| r.to_string()).unwrap_or_default(),
        vmax = options.max_votes,
        vstep = options.votes_step,
        votes = filter.min_votes.map(|v| v.to_string()).unwrap_or_default(),
        keyword = attr(filter.keyword.as_deref().unwrap_or_default()),
    )
}

fn results_section(results: &SearchResults, query: &ExplorerQuery, raw: Option<&str>) -> String {
    let summary = &results.summary;
    let mut html = format!(
        "<div class=\"metrics\">\
         <div class=\"metric\"><span>Movies found</span><strong>{}</strong></div>\
         <div class=\"metric\"><span>Mean rating</span><strong>{}</strong></div>\
         <div class=\"metric\"><span>Mean votes</span><strong>{}</strong></div></div>",
        summary.total,
        summary.mean_rating_display(),
        summary.mean_votes_display(),
    );

    for ignored in &results.ignored_filters {
        html.push_str(&alert(
            "warning",
            &format!("The {ignored} filter is not available for this data and was ignored."),
        ));
    }

    if summary.total == 0 {
        html.push_str(&alert("warning", "No movies match these filters."));
        return html;
    }

    html.push_str("<div class=\"cards\">");
    for card in &results.cards {
        html.push_str(&movie_card(card));
    }
    html.push_str("</div>");
    html.push_str(&pagination(results, query.page, raw));
    html
}

fn movie_card(card: &MovieCard) -> String {
    let year = card.year.map(|y| format!(" ({y})")).unwrap_or_default();
    let tags = card
        .tags
        .as_ref()
        .filter(|t| !t.is_empty())
        .map(|t| format!("<p class=\"tags\">🏷️ {}</p>", text(&t.join(", "))))
        .unwrap_or_default();

    format!(
        "<article class=\"card movie\">\
         <img src=\"{poster}\" alt=\"Poster\" width=\"120\" height=\"180\" loading=\"lazy\">\
         <div><h3><a href=\"{imdb}\" target=\"_blank\" rel=\"noopener\">{title}</a>{year}</h3>\
         <p>🎭 {genres}</p>\
         <p>⭐ {rating:.2} · 🗳️ {votes} votes</p>{tags}</div></article>",
        poster = attr(&card.poster_url),
        imdb = attr(&card.imdb_url),
        title = text(&card.title),
        genres = text(card.genres.as_deref().unwrap_or("Unknown")),
        rating = card.avg_rating,
        votes = card.rating_count,
    )
}

fn pagination(results: &SearchResults, page: usize, raw: Option<&str>) -> String {
    if results.total_pages <= 1 {
        return String::new();
    }

    let link = |target: usize, label: &str| {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            if k != "page" {
                serializer.append_pair(&k, &v);
            }
        }
        serializer.append_pair("page", &target.to_string());
        format!("<a href=\"/explorer?{}\">{label}</a>", attr(&serializer.finish()))
    };

    let mut html = String::from("<nav class=\"pagination\">");
    if page > 1 {
        html.push_str(&link(page - 1, "← Previous"));
    }
    let _ = write!(
        html,
        "<span>Page {page} of {}</span>",
        results.total_pages
    );
    if page < results.total_pages {
        html.push_str(&link(page + 1, "Next →"));
    }
    html.push_str("</nav>");
    html
}
