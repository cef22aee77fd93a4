use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};

use super::figure::{Figure, date_axis_with_slider, timestamps};
use crate::analysis::profiles::{self, WEEKDAYS};
use crate::analysis::{Analysis, MonthlyAverage};
use crate::core::constants::{defaults, display::PRICE_UNIT, workbook};
use crate::core::types::PriceTable;
use crate::reporting::logging;

/// Columns of the sparkline grid
const SPARK_COLUMNS: usize = 4;
const SPARK_HEIGHT: u32 = 700;

/// Knobs for [`ChartSet::render`]
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub top_zones: usize,
    pub spark_zones: usize,
    pub histogram_bins: usize,
    /// Rolling window in hours, used for the chart title
    pub rolling_window: usize,
    /// Zone pre-selected in single-zone charts
    pub default_zone: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            top_zones: defaults::TOP_ZONES,
            spark_zones: defaults::SPARK_ZONES,
            histogram_bins: defaults::HISTOGRAM_BINS,
            rolling_window: defaults::ROLLING_WINDOW_HOURS,
            default_zone: None,
        }
    }
}

/// Every chart of the dashboard, in page order
#[derive(Debug, Clone)]
pub struct ChartSet {
    pub average: Figure,
    pub top_zones: Figure,
    pub hour_dow: Figure,
    pub monthly_box: Figure,
    pub sparklines: Figure,
    pub rolling: Figure,
    pub spread: Figure,
    pub hour_of_day: Figure,
    pub day_of_week: Figure,
    pub seasonal: Figure,
    pub histogram: Figure,
    pub correlation: Figure,
    pub monthly_heatmap: Figure,
    pub zone_by_year: Figure,
    pub year_by_zone: Figure,
}

impl ChartSet {
    pub fn render(table: &PriceTable, analysis: &Analysis, options: &RenderOptions) -> Self {
        let default_zone = default_zone(table, options.default_zone.as_deref());
        let top = analysis.top_zones(options.top_zones);
        let sparks = analysis.top_zones(options.spark_zones);

        Self {
            average: average_chart(analysis),
            top_zones: top_zones_chart(table, &top),
            hour_dow: hour_dow_chart(table, default_zone),
            monthly_box: monthly_box_chart(table, &top),
            sparklines: sparkline_chart(table, &sparks),
            rolling: rolling_chart(analysis, options.rolling_window),
            spread: spread_chart(analysis),
            hour_of_day: hour_of_day_chart(analysis),
            day_of_week: day_of_week_chart(analysis),
            seasonal: seasonal_chart(analysis),
            histogram: histogram_chart(table, analysis, options.histogram_bins),
            correlation: correlation_chart(analysis),
            monthly_heatmap: monthly_heatmap_chart(&analysis.monthly),
            zone_by_year: zone_by_year_chart(table, analysis, default_zone),
            year_by_zone: year_by_zone_chart(analysis),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Figure> {
        [
            &self.average,
            &self.top_zones,
            &self.hour_dow,
            &self.monthly_box,
            &self.sparklines,
            &self.rolling,
            &self.spread,
            &self.hour_of_day,
            &self.day_of_week,
            &self.seasonal,
            &self.histogram,
            &self.correlation,
            &self.monthly_heatmap,
            &self.zone_by_year,
            &self.year_by_zone,
        ]
        .into_iter()
    }
}

/// Zone pre-selected in the dropdown charts.
///
/// The requested zone wins when present, then `PJM-RTO ZONE`, then the
/// first column.
pub fn default_zone(table: &PriceTable, requested: Option<&str>) -> Option<usize> {
    if let Some(zone) = requested {
        match table.zone_index(zone) {
            Some(idx) => return Some(idx),
            None => logging::log_warning(&format!(
                "Default zone '{zone}' not found; falling back"
            )),
        }
    }
    table
        .zone_index(workbook::PREFERRED_ZONE)
        .or_else(|| (!table.zones().is_empty()).then_some(0))
}

fn price_axis() -> String {
    PRICE_UNIT.to_string()
}

fn average_chart(analysis: &Analysis) -> Figure {
    let x = timestamps(analysis.rolling.iter().map(|p| p.timestamp));
    let y: Vec<Option<f64>> = analysis.rolling.iter().map(|p| p.average).collect();

    Figure::new("chart-average", "PJM Day-Ahead: Average Across Zones")
        .trace(json!({
            "type": "scatter",
            "mode": "lines",
            "name": "Average",
            "x": x,
            "y": y,
        }))
        .layout("xaxis", date_axis_with_slider("Date"))
        .layout(
            "yaxis",
            json!({ "title": { "text": format!("Average Price ({PRICE_UNIT})") } }),
        )
}

fn top_zones_chart(table: &PriceTable, zones: &[&str]) -> Figure {
    let x = timestamps(table.rows().iter().map(|r| r.timestamp));
    let mut fig = Figure::new(
        "chart-top-zones",
        &format!("Top {} Zones by Mean Price: Trend", zones.len()),
    );

    for zone in zones {
        let Some(idx) = table.zone_index(zone) else {
            continue;
        };
        let y: Vec<Option<f64>> = table.column(idx).collect();
        fig = fig.trace(json!({
            "type": "scatter",
            "mode": "lines",
            "name": zone,
            "x": x,
            "y": y,
        }));
    }

    fig.layout("xaxis", date_axis_with_slider("Date"))
        .layout("yaxis", json!({ "title": { "text": price_axis() } }))
        .layout("legend", json!({ "title": { "text": "Zone" } }))
}

fn hour_dow_title(zone: &str) -> String {
    format!("Hourly × Day-of-Week Heatmap: {zone}")
}

fn hour_dow_chart(table: &PriceTable, default_zone: Option<usize>) -> Figure {
    let Some(default_idx) = default_zone else {
        return Figure::new("chart-hour-dow", "Hourly × Day-of-Week Heatmap");
    };
    let default_name = &table.zones()[default_idx];
    let hours: Vec<u32> = (0..24).collect();

    let buttons: Vec<Value> = table
        .zones()
        .iter()
        .enumerate()
        .map(|(idx, zone)| {
            json!({
                "method": "update",
                "label": zone,
                "args": [
                    { "z": [profiles::hour_dow_matrix(table, idx)] },
                    { "title.text": hour_dow_title(zone) },
                ],
            })
        })
        .collect();

    Figure::new("chart-hour-dow", &hour_dow_title(default_name))
        .trace(json!({
            "type": "heatmap",
            "x": hours,
            "y": WEEKDAYS,
            "z": profiles::hour_dow_matrix(table, default_idx),
            "colorscale": "Viridis",
            "colorbar": { "title": { "text": PRICE_UNIT } },
        }))
        .layout("xaxis", json!({ "title": { "text": "Hour" }, "dtick": 1 }))
        .layout(
            "yaxis",
            json!({ "title": { "text": "Day of week" }, "autorange": "reversed" }),
        )
        .dropdown(buttons)
}

fn monthly_box_chart(table: &PriceTable, zones: &[&str]) -> Figure {
    let indices: Vec<usize> = zones.iter().filter_map(|z| table.zone_index(z)).collect();
    let means = profiles::monthly_zone_means(table, &indices);

    let mut fig = Figure::new(
        "chart-monthly-box",
        &format!("Monthly Average Price Distribution: Top {} Zones", zones.len()),
    );
    for (idx, values) in indices.iter().zip(means) {
        fig = fig.trace(json!({
            "type": "box",
            "name": table.zones()[*idx],
            "y": values,
            "boxpoints": "outliers",
        }));
    }
    fig.axis_titles("Zone", &format!("Monthly average ({PRICE_UNIT})"))
        .layout("showlegend", json!(false))
}

fn sparkline_chart(table: &PriceTable, zones: &[&str]) -> Figure {
    let title = format!("Sparklines: First {} Zones by Mean", zones.len());
    let fig = Figure::new("chart-sparklines", &title)
        .layout("showlegend", json!(false))
        .layout("height", json!(SPARK_HEIGHT));
    if zones.is_empty() {
        return fig;
    }

    let x = timestamps(table.rows().iter().map(|r| r.timestamp));
    let mut traces = Vec::new();
    let mut annotations = Vec::new();

    for (i, zone) in zones.iter().enumerate() {
        let Some(idx) = table.zone_index(zone) else {
            continue;
        };
        // Plotly names the first axis pair "x"/"y", then "x2"/"y2", ...
        let suffix = if i == 0 { String::new() } else { (i + 1).to_string() };
        let y: Vec<Option<f64>> = table.column(idx).collect();

        traces.push(json!({
            "type": "scatter",
            "mode": "lines",
            "name": zone,
            "x": x,
            "y": y,
            "xaxis": format!("x{suffix}"),
            "yaxis": format!("y{suffix}"),
            "line": { "width": 1 },
        }));
        annotations.push(json!({
            "text": zone,
            "showarrow": false,
            "xref": format!("x{suffix} domain"),
            "yref": format!("y{suffix} domain"),
            "x": 0.5,
            "y": 1.0,
            "xanchor": "center",
            "yanchor": "bottom",
            "font": { "size": 11 },
        }));
    }

    let rows = zones.len().div_ceil(SPARK_COLUMNS);
    let mut fig = fig
        .layout(
            "grid",
            json!({
                "rows": rows,
                "columns": SPARK_COLUMNS,
                "pattern": "independent",
                "ygap": 0.35,
            }),
        )
        .layout("annotations", Value::Array(annotations));
    for trace in traces {
        fig = fig.trace(trace);
    }
    fig
}

fn rolling_label(window: usize) -> String {
    if window % 24 == 0 {
        format!("{}-Day", window / 24)
    } else {
        format!("{window}-Hour")
    }
}

fn rolling_chart(analysis: &Analysis, window: usize) -> Figure {
    let label = rolling_label(window);
    let x = timestamps(analysis.rolling.iter().map(|p| p.timestamp));
    let avg: Vec<Option<f64>> = analysis.rolling.iter().map(|p| p.average).collect();
    let mean: Vec<Option<f64>> = analysis.rolling.iter().map(|p| p.mean).collect();
    let vol: Vec<Option<f64>> = analysis.rolling.iter().map(|p| p.volatility).collect();

    Figure::new(
        "chart-rolling",
        &format!("Rolling {label} Mean & Volatility (Across All Zones)"),
    )
    .trace(json!({ "type": "scatter", "mode": "lines", "name": "Hourly Avg", "x": x, "y": avg }))
    .trace(json!({
        "type": "scatter",
        "mode": "lines",
        "name": format!("{label} Mean"),
        "x": x,
        "y": mean,
    }))
    .trace(json!({
        "type": "scatter",
        "mode": "lines",
        "name": format!("{label} Volatility (σ)"),
        "x": x,
        "y": vol,
    }))
    .layout("xaxis", date_axis_with_slider("Date"))
    .layout("yaxis", json!({ "title": { "text": price_axis() } }))
}

fn spread_chart(analysis: &Analysis) -> Figure {
    let x = timestamps(analysis.spread.iter().map(|p| p.timestamp));
    let y: Vec<Option<f64>> = analysis.spread.iter().map(|p| p.spread).collect();

    Figure::new("chart-spread", "Inter-Zonal Price Spread (Max - Min by Hour)")
        .trace(json!({ "type": "scatter", "mode": "lines", "name": "Spread", "x": x, "y": y }))
        .layout("xaxis", date_axis_with_slider("Date"))
        .layout("yaxis", json!({ "title": { "text": price_axis() } }))
}

fn hour_of_day_chart(analysis: &Analysis) -> Figure {
    let x: Vec<u32> = analysis.hour_of_day.iter().map(|h| h.hour).collect();
    let y: Vec<f64> = analysis.hour_of_day.iter().map(|h| h.price).collect();

    Figure::new("chart-hour-of-day", "Average by Hour of Day (All Zones)")
        .trace(json!({ "type": "scatter", "mode": "lines+markers", "name": "Price", "x": x, "y": y }))
        .axis_titles("Hour", PRICE_UNIT)
}

fn day_of_week_chart(analysis: &Analysis) -> Figure {
    let x: Vec<&str> = analysis.day_of_week.iter().map(|d| d.weekday).collect();
    let y: Vec<Option<f64>> = analysis.day_of_week.iter().map(|d| d.price).collect();

    Figure::new("chart-day-of-week", "Average by Day of Week (All Zones)")
        .trace(json!({ "type": "bar", "name": "Price", "x": x, "y": y }))
        .axis_titles("Day of week", PRICE_UNIT)
}

fn seasonal_chart(analysis: &Analysis) -> Figure {
    let x: Vec<&str> = analysis.seasonal.iter().map(|s| s.season.name()).collect();
    let y: Vec<Option<f64>> = analysis.seasonal.iter().map(|s| s.mean).collect();
    let err: Vec<Option<f64>> = analysis.seasonal.iter().map(|s| s.std).collect();

    Figure::new("chart-seasonal", "Seasonal Average Price (±σ)")
        .trace(json!({
            "type": "bar",
            "name": "Mean",
            "x": x,
            "y": y,
            "error_y": { "type": "data", "array": err, "visible": true },
        }))
        .axis_titles("Season", PRICE_UNIT)
}

fn histogram_chart(table: &PriceTable, analysis: &Analysis, bins: usize) -> Figure {
    let fig = Figure::new("chart-histogram", "Price Distribution (All Zones, Hourly)")
        .trace(json!({
            "type": "histogram",
            "name": "Prices",
            "x": table.all_values(),
            "nbinsx": bins,
        }))
        .axis_titles(PRICE_UNIT, "Hours");

    let Some(p95) = analysis.overall.p95 else {
        return fig;
    };
    fig.layout(
        "shapes",
        json!([{
            "type": "line",
            "x0": p95,
            "x1": p95,
            "y0": 0,
            "y1": 1,
            "yref": "paper",
            "line": { "dash": "dash" },
        }]),
    )
    .layout(
        "annotations",
        json!([{
            "x": p95,
            "y": 1,
            "yref": "paper",
            "text": format!("P95 = {p95:.2}"),
            "showarrow": true,
            "arrowhead": 2,
        }]),
    )
}

fn correlation_chart(analysis: &Analysis) -> Figure {
    let corr = &analysis.correlation;
    Figure::new("chart-correlation", "Correlation Between Zones").trace(json!({
        "type": "heatmap",
        "x": corr.zones,
        "y": corr.zones,
        "z": corr.values,
        "zmin": -1,
        "zmax": 1,
        "colorscale": "RdBu",
    }))
}

fn monthly_heatmap_chart(monthly: &[MonthlyAverage]) -> Figure {
    let zones: BTreeSet<&str> = monthly.iter().map(|m| m.zone.as_str()).collect();
    let labels: BTreeSet<String> = monthly.iter().map(MonthlyAverage::label).collect();
    let cells: BTreeMap<(&str, String), f64> = monthly
        .iter()
        .map(|m| ((m.zone.as_str(), m.label()), m.price))
        .collect();

    let z: Vec<Vec<Option<f64>>> = zones
        .iter()
        .map(|zone| {
            labels
                .iter()
                .map(|label| cells.get(&(*zone, label.clone())).copied())
                .collect()
        })
        .collect();

    Figure::new(
        "chart-monthly-heatmap",
        "Monthly Average Prices: Zone × Year-Month",
    )
    .trace(json!({
        "type": "heatmap",
        "x": labels,
        "y": zones,
        "z": z,
        "colorscale": "Viridis",
        "colorbar": { "title": { "text": PRICE_UNIT } },
    }))
    .axis_titles("Year-Month", "Zone")
}

/// Months and prices of one zone in one year, month ascending
fn zone_year_series(monthly: &[MonthlyAverage], zone: &str, year: i32) -> (Vec<u32>, Vec<f64>) {
    monthly
        .iter()
        .filter(|m| m.zone == zone && m.year == year)
        .map(|m| (m.month, m.price))
        .unzip()
}

fn month_ticks() -> Value {
    json!({
        "title": { "text": "Month" },
        "tickmode": "array",
        "tickvals": (1..=12).collect::<Vec<u32>>(),
    })
}

fn zone_by_year_title(zone: &str) -> String {
    format!("Monthly Average: {zone} (lines by Year)")
}

fn zone_by_year_chart(
    table: &PriceTable,
    analysis: &Analysis,
    default_zone: Option<usize>,
) -> Figure {
    let Some(default_idx) = default_zone else {
        return Figure::new("chart-zone-by-year", "Monthly Average (lines by Year)");
    };
    let years = analysis.years();
    let default_name = &table.zones()[default_idx];

    let mut fig = Figure::new("chart-zone-by-year", &zone_by_year_title(default_name));
    for year in &years {
        let (x, y) = zone_year_series(&analysis.monthly, default_name, *year);
        fig = fig.trace(json!({
            "type": "scatter",
            "mode": "lines+markers",
            "name": year.to_string(),
            "x": x,
            "y": y,
        }));
    }

    let buttons: Vec<Value> = table
        .zones()
        .iter()
        .map(|zone| {
            let (xs, ys): (Vec<Vec<u32>>, Vec<Vec<f64>>) = years
                .iter()
                .map(|year| zone_year_series(&analysis.monthly, zone, *year))
                .unzip();
            json!({
                "method": "update",
                "label": zone,
                "args": [
                    { "x": xs, "y": ys },
                    { "title.text": zone_by_year_title(zone) },
                ],
            })
        })
        .collect();

    fig.layout("xaxis", month_ticks())
        .layout("yaxis", json!({ "title": { "text": price_axis() } }))
        .dropdown(buttons)
}

fn year_by_zone_title(year: i32) -> String {
    format!("Year {year}: Zone-wise Monthly Average Prices")
}

fn year_by_zone_chart(analysis: &Analysis) -> Figure {
    let years = analysis.years();
    let Some(&default_year) = years.last() else {
        return Figure::new("chart-year-by-zone", "Zone-wise Monthly Average Prices");
    };
    let zones: BTreeSet<&str> = analysis.monthly.iter().map(|m| m.zone.as_str()).collect();

    let mut fig = Figure::new("chart-year-by-zone", &year_by_zone_title(default_year));
    for zone in &zones {
        let (x, y) = zone_year_series(&analysis.monthly, zone, default_year);
        fig = fig.trace(json!({ "type": "bar", "name": zone, "x": x, "y": y }));
    }

    let buttons: Vec<Value> = years
        .iter()
        .map(|year| {
            let (xs, ys): (Vec<Vec<u32>>, Vec<Vec<f64>>) = zones
                .iter()
                .map(|zone| zone_year_series(&analysis.monthly, zone, *year))
                .unzip();
            json!({
                "method": "update",
                "label": year.to_string(),
                "args": [
                    { "x": xs, "y": ys },
                    { "title.text": year_by_zone_title(*year) },
                ],
            })
        })
        .collect();

    fig.layout("barmode", json!("group"))
        .layout("xaxis", month_ticks())
        .layout("yaxis", json!({ "title": { "text": price_axis() } }))
        .dropdown(buttons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisOptions;
    use crate::core::types::PriceRow;
    use chrono::{Duration, NaiveDate};

    fn table(zones: &[&str]) -> PriceTable {
        let start = NaiveDate::from_ymd_opt(2023, 12, 30)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let rows = (0..96)
            .map(|h| {
                let prices = (0..zones.len())
                    .map(|z| Some(20.0 + z as f64 * 10.0 + (h % 24) as f64))
                    .collect();
                PriceRow::new(start + Duration::hours(h), prices)
            })
            .collect();
        PriceTable::new(zones.iter().map(|z| z.to_string()).collect(), rows).unwrap()
    }

    fn render(table: &PriceTable, options: &RenderOptions) -> ChartSet {
        let analysis = Analysis::compute(table, &AnalysisOptions::default());
        ChartSet::render(table, &analysis, options)
    }

    #[test]
    fn test_renders_fifteen_charts_with_unique_ids() {
        let charts = render(&table(&["AECO", "BGE", "PJM-RTO ZONE"]), &RenderOptions::default());
        let ids: BTreeSet<&str> = charts.iter().map(|f| f.id.as_str()).collect();

        assert_eq!(charts.iter().count(), 15);
        assert_eq!(ids.len(), 15);
    }

    #[test]
    fn test_default_zone_resolution() {
        let t = table(&["AECO", "PJM-RTO ZONE"]);
        assert_eq!(default_zone(&t, None), Some(1));
        assert_eq!(default_zone(&t, Some("AECO")), Some(0));
        assert_eq!(default_zone(&t, Some("MISSING")), Some(1));

        let t = table(&["AECO", "BGE"]);
        assert_eq!(default_zone(&t, None), Some(0));

        let empty = PriceTable::new(vec![], vec![]).unwrap();
        assert_eq!(default_zone(&empty, None), None);
    }

    #[test]
    fn test_top_zones_chart_orders_by_mean() {
        let options = RenderOptions {
            top_zones: 2,
            ..Default::default()
        };
        let charts = render(&table(&["LOW", "MID", "HIGH"]), &options);

        let names: Vec<&str> = charts
            .top_zones
            .data
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["HIGH", "MID"]);
        assert_eq!(charts.monthly_box.data.len(), 2);
    }

    #[test]
    fn test_heatmap_dropdown_lists_every_zone() {
        let charts = render(&table(&["AECO", "BGE"]), &RenderOptions::default());
        let heat = &charts.hour_dow;

        assert_eq!(heat.data[0]["type"], "heatmap");
        assert_eq!(heat.data[0]["z"].as_array().unwrap().len(), 7);
        assert_eq!(heat.data[0]["z"][0].as_array().unwrap().len(), 24);
        let buttons = heat.layout["updatemenus"][0]["buttons"].as_array().unwrap();
        assert_eq!(buttons.len(), 2);
        assert!(heat.layout["title"]["text"].as_str().unwrap().ends_with("AECO"));
    }

    #[test]
    fn test_sparklines_grid() {
        let options = RenderOptions {
            spark_zones: 5,
            ..Default::default()
        };
        let charts = render(&table(&["A", "B", "C", "D", "E", "F"]), &options);
        let sparks = &charts.sparklines;

        assert_eq!(sparks.data.len(), 5);
        assert_eq!(sparks.layout["grid"]["rows"], 2);
        assert_eq!(sparks.layout["grid"]["columns"], 4);
        assert_eq!(sparks.data[0]["xaxis"], "x");
        assert_eq!(sparks.data[1]["yaxis"], "y2");
        assert_eq!(sparks.layout["annotations"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_histogram_marks_p95() {
        let charts = render(&table(&["AECO"]), &RenderOptions::default());
        let hist = &charts.histogram;

        assert_eq!(hist.data[0]["nbinsx"], 80);
        assert_eq!(hist.layout["shapes"][0]["type"], "line");
        assert!(
            hist.layout["annotations"][0]["text"]
                .as_str()
                .unwrap()
                .starts_with("P95 = ")
        );
    }

    #[test]
    fn test_year_chart_defaults_to_latest_year() {
        let charts = render(&table(&["AECO", "BGE"]), &RenderOptions::default());

        let year = &charts.year_by_zone;
        assert!(year.layout["title"]["text"].as_str().unwrap().contains("2024"));
        assert_eq!(year.layout["updatemenus"][0]["buttons"].as_array().unwrap().len(), 2);
        assert_eq!(year.layout["barmode"], "group");

        let zone = &charts.zone_by_year;
        // one line per year
        assert_eq!(zone.data.len(), 2);
    }

    #[test]
    fn test_empty_zone_renders_without_panicking() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let t = PriceTable::new(
            vec!["AECO".into(), "EMPTY".into()],
            vec![
                PriceRow::new(start, vec![Some(10.0), None]),
                PriceRow::new(start + Duration::hours(1), vec![Some(12.0), None]),
            ],
        )
        .unwrap();

        let charts = render(&t, &RenderOptions::default());
        assert_eq!(charts.top_zones.data.len(), 1);
        assert_eq!(charts.correlation.data[0]["z"][1][1], Value::Null);
    }

    #[test]
    fn test_rolling_label() {
        assert_eq!(rolling_label(720), "30-Day");
        assert_eq!(rolling_label(36), "36-Hour");
    }
}
