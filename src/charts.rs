//! Bar-chart descriptions handed to the browser.
//!
//! A [`BarChart`] serializes to a small JSON document that the embedded
//! `dashboard.js` turns into a Plotly figure.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    #[serde(rename = "h")]
    Horizontal,
    #[serde(rename = "v")]
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    Relative,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CategoryOrder {
    #[serde(rename = "total ascending")]
    TotalAscending,
    #[serde(rename = "trace")]
    Trace,
}

/// One bar series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarTrace {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: Vec<Value>,
    pub y: Vec<Value>,
    /// Continuous colour values, rendered with the viridis scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Vec<f64>>,
}

impl BarTrace {
    /// Builds a trace from `(category, value)` pairs in the given orientation.
    pub fn from_pairs<C, N>(orientation: Orientation, pairs: impl IntoIterator<Item = (C, N)>) -> Self
    where
        C: Into<Value>,
        N: Into<Value>,
    {
        let (categories, values): (Vec<Value>, Vec<Value>) = pairs
            .into_iter()
            .map(|(c, n)| (c.into(), n.into()))
            .unzip();

        let (x, y) = match orientation {
            Orientation::Horizontal => (values, categories),
            Orientation::Vertical => (categories, values),
        };

        Self {
            name: None,
            x,
            y,
            color: None,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn colored(mut self, values: Vec<f64>) -> Self {
        self.color = Some(values);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub id: String,
    pub title: String,
    pub orientation: Orientation,
    pub traces: Vec<BarTrace>,
    pub barmode: BarMode,
    pub category_order: CategoryOrder,
    /// Axis and colour-bar titles keyed by `x`, `y` and `color`.
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_title: Option<String>,
    pub height: u32,
}

impl BarChart {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, orientation: Orientation) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            orientation,
            traces: Vec::new(),
            barmode: BarMode::Relative,
            category_order: CategoryOrder::TotalAscending,
            labels: BTreeMap::new(),
            color_title: None,
            height: 450,
        }
    }

    #[must_use]
    pub fn trace(mut self, trace: BarTrace) -> Self {
        self.traces.push(trace);
        self
    }

    #[must_use]
    pub fn label(mut self, axis: &str, text: impl Into<String>) -> Self {
        self.labels.insert(axis.to_string(), text.into());
        self
    }

    #[must_use]
    pub fn color_title(mut self, text: impl Into<String>) -> Self {
        self.color_title = Some(text.into());
        self
    }

    #[must_use]
    pub const fn height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    #[must_use]
    pub const fn barmode(mut self, barmode: BarMode) -> Self {
        self.barmode = barmode;
        self
    }

    #[must_use]
    pub const fn category_order(mut self, order: CategoryOrder) -> Self {
        self.category_order = order;
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traces.iter().all(BarTrace::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_horizontal_trace_puts_categories_on_y() {
        let trace = BarTrace::from_pairs(Orientation::Horizontal, [("Drama", 10u64), ("Comedy", 7)]);
        assert_eq!(trace.y, vec![json!("Drama"), json!("Comedy")]);
        assert_eq!(trace.x, vec![json!(10), json!(7)]);
    }

    #[test]
    fn test_chart_serialization_shape() {
        let chart = BarChart::new("by-year", "Movies per year", Orientation::Vertical)
            .trace(BarTrace::from_pairs(Orientation::Vertical, [(1995i64, 3u64)]))
            .label("x", "Year")
            .height(500);

        let value = serde_json::to_value(&chart).unwrap();
        assert_eq!(value["orientation"], "v");
        assert_eq!(value["category_order"], "total ascending");
        assert_eq!(value["barmode"], "relative");
        assert_eq!(value["labels"]["x"], "Year");
        assert_eq!(value["traces"][0]["x"][0], 1995);
        assert!(value["traces"][0].get("color").is_none());
    }
}
