//! Server-rendered dashboard pages.
//!
//! Each page is a plain HTML document. Charts are emitted as JSON inside a
//! `<script type="application/json">` block and drawn by `assets/dashboard.js`.

mod pages;

pub use pages::{explorer_page, home_page, not_found_page, overview_page, tags_page};

use html_escape::{encode_double_quoted_attribute, encode_safe};
use std::fmt::Write as _;

use crate::charts::BarChart;

/// One entry of the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub title: &'static str,
    pub path: &'static str,
    pub icon: &'static str,
    pub summary: &'static str,
}

pub const PAGES: &[Page] = &[
    Page {
        title: "Home",
        path: "/",
        icon: "🏠",
        summary: "Start page and dataset status.",
    },
    Page {
        title: "Overview",
        path: "/overview",
        icon: "🎬",
        summary: "Genres, ratings and releases across the catalogue.",
    },
    Page {
        title: "Tags Insights",
        path: "/tags",
        icon: "📊",
        summary: "What users write about the movies they rate.",
    },
    Page {
        title: "Movie Explorer",
        path: "/explorer",
        icon: "🔎",
        summary: "Filter movies by genre, year, rating, votes, keyword and tags.",
    },
];

#[must_use]
pub fn page_for(path: &str) -> Option<&'static Page> {
    PAGES.iter().find(|p| p.path == path)
}

/// Wraps `body` in the shared layout with `active` highlighted in the nav.
#[must_use]
pub fn layout(active: &str, body: &str) -> String {
    let title = page_for(active).map_or("MovieLens Explorer", |p| p.title);

    let mut nav = String::new();
    for page in PAGES {
        let class = if page.path == active { " class=\"active\"" } else { "" };
        let _ = write!(
            nav,
            "<a href=\"{}\"{class}>{} {}</a>",
            page.path,
            page.icon,
            encode_safe(page.title)
        );
    }

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · MovieLens Explorer</title>
<link rel="stylesheet" href="/assets/app.css">
<script src="https://cdn.plot.ly/plotly-2.35.2.min.js" defer></script>
<script src="/assets/dashboard.js" defer></script>
</head>
<body>
<nav class="sidebar">{nav}</nav>
<main>
{body}
</main>
</body>
</html>
"#,
        title = encode_safe(title),
    )
}

/// Emits a chart placeholder plus its JSON description.
#[must_use]
pub fn chart_block(chart: &BarChart) -> String {
    if chart.is_empty() {
        return format!(
            "<section class=\"chart\"><h3>{}</h3>{}</section>",
            encode_safe(&chart.title),
            alert("info", "No data to display.")
        );
    }

    // `</` inside JSON would close the script element early.
    let json = serde_json::to_string(chart)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/");

    format!(
        "<section class=\"chart\"><div class=\"plot\" id=\"{id}\"></div>\
         <script type=\"application/json\" data-chart=\"{id}\">{json}</script></section>",
        id = encode_double_quoted_attribute(&chart.id),
    )
}

#[must_use]
pub fn alert(kind: &str, message: &str) -> String {
    format!(
        "<div class=\"alert alert-{}\">{}</div>",
        encode_double_quoted_attribute(kind),
        encode_safe(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{BarTrace, Orientation};

    #[test]
    fn test_every_page_is_in_the_nav() {
        let html = layout("/tags", "<p>x</p>");
        for page in PAGES {
            assert!(html.contains(&format!("href=\"{}\"", page.path)));
        }
        assert!(html.contains("<a href=\"/tags\" class=\"active\">"));
        assert!(html.contains("<title>Tags Insights · MovieLens Explorer</title>"));
    }

    #[test]
    fn test_chart_json_cannot_close_script() {
        let chart = BarChart::new("c", "Title", Orientation::Vertical).trace(
            BarTrace::from_pairs(Orientation::Vertical, [("</script>", 1u64)]),
        );
        let html = chart_block(&chart);
        assert_eq!(html.matches("</script>").count(), 1);
    }

    #[test]
    fn test_empty_chart_renders_notice() {
        let chart = BarChart::new("c", "<Empty>", Orientation::Vertical);
        let html = chart_block(&chart);
        assert!(html.contains("&lt;Empty&gt;"));
        assert!(html.contains("No data to display."));
    }
}
