//! Plotly figure payloads.
//!
//! A [`Figure`] is the JSON Plotly.js expects for `Plotly.newPlot`: a list of
//! traces and a layout object.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Value, json};

/// Timestamp format understood by Plotly date axes
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    /// DOM id of the chart container
    #[serde(skip)]
    pub id: String,
    pub data: Vec<Value>,
    pub layout: Value,
}

impl Figure {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            data: Vec::new(),
            layout: base_layout(title),
        }
    }

    pub fn trace(mut self, trace: Value) -> Self {
        self.data.push(trace);
        self
    }

    /// Set a top-level layout key, replacing any previous value
    pub fn layout(mut self, key: &str, value: Value) -> Self {
        if let Value::Object(ref mut map) = self.layout {
            map.insert(key.to_string(), value);
        }
        self
    }

    /// Axis titles of a single-axis chart
    pub fn axis_titles(self, x: &str, y: &str) -> Self {
        self.layout("xaxis", json!({ "title": { "text": x } }))
            .layout("yaxis", json!({ "title": { "text": y } }))
    }

    /// Attach a dropdown menu in the top-right corner
    pub fn dropdown(self, buttons: Vec<Value>) -> Self {
        if buttons.is_empty() {
            return self;
        }
        self.layout(
            "updatemenus",
            json!([{
                "buttons": buttons,
                "direction": "down",
                "x": 1.02,
                "xanchor": "left",
                "y": 1,
                "yanchor": "top",
            }]),
        )
    }

    /// `{"data": [...], "layout": {...}}`
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn base_layout(title: &str) -> Value {
    let mut layout = Map::new();
    layout.insert("title".to_string(), json!({ "text": title }));
    layout.insert("template".to_string(), plotly_white());
    layout.insert(
        "margin".to_string(),
        json!({ "l": 10, "r": 10, "t": 60, "b": 10 }),
    );
    Value::Object(layout)
}

/// Light theme with white background and pale grid lines
pub fn plotly_white() -> Value {
    let axis = json!({
        "gridcolor": "#EBF0F8",
        "linecolor": "#EBF0F8",
        "zerolinecolor": "#EBF0F8",
        "zerolinewidth": 2,
        "automargin": true,
        "ticks": "",
    });
    json!({
        "layout": {
            "paper_bgcolor": "white",
            "plot_bgcolor": "white",
            "font": { "color": "#2a3f5f" },
            "hovermode": "closest",
            "colorway": [
                "#636efa", "#EF553B", "#00cc96", "#ab63fa", "#FFA15A",
                "#19d3f3", "#FF6692", "#B6E880", "#FF97FF", "#FECB52"
            ],
            "xaxis": axis.clone(),
            "yaxis": axis,
        }
    })
}

/// Range slider under a date axis
pub fn date_axis_with_slider(title: &str) -> Value {
    json!({
        "title": { "text": title },
        "type": "date",
        "rangeslider": { "visible": true },
    })
}

pub fn timestamps(values: impl IntoIterator<Item = NaiveDateTime>) -> Vec<String> {
    values
        .into_iter()
        .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
        .collect()
}
