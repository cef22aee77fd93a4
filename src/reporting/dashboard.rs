use crate::analysis::{Analysis, ZoneSummary};
use crate::core::constants::{display::PRICE_UNIT, include_modes};
use crate::core::error::{DashboardError, Result, WriteError};
use crate::core::types::Observation;
use crate::render::{ChartSet, Figure};
use crate::reporting::csv_export::CsvAsset;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

/// Constants for dashboard styling and layout
mod dashboard_constants {
    /// Plotly.js CDN URL used in `cdn` mode
    pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

    /// Browser tab title
    pub const PAGE_TITLE: &str = "PJM Unified HTML Dashboard";

    /// DOM id of the embedded zone summary JSON
    pub const SUMMARY_JSON_ID: &str = "zone-summary-data";

    /// Shown for statistics of zones without prices
    pub const MISSING: &str = "n/a";
}

pub use dashboard_constants::SUMMARY_JSON_ID;

/// How the page obtains Plotly.js
#[derive(Debug, Clone, PartialEq)]
pub enum PlotlyJsMode {
    /// `<script src>` pointing at the Plotly CDN
    Cdn,
    /// Inline the bundle read from this file
    Embed(PathBuf),
    /// No script; Plotly must already be available to the page
    None,
}

impl PlotlyJsMode {
    /// Resolve a configured mode (`cdn`, `true`, `false`)
    pub fn from_config(mode: &str, bundle: Option<&str>) -> Result<Self> {
        match mode {
            include_modes::CDN => Ok(PlotlyJsMode::Cdn),
            include_modes::EMBED => bundle
                .filter(|b| !b.trim().is_empty())
                .map(|b| PlotlyJsMode::Embed(PathBuf::from(b)))
                .ok_or_else(|| {
                    DashboardError::Config(
                        "include_plotlyjs = \"true\" needs a local bundle. Pass --plotlyjs-bundle <path/to/plotly.min.js>."
                            .to_string(),
                    )
                }),
            include_modes::NONE => Ok(PlotlyJsMode::None),
            other => Err(DashboardError::Config(format!(
                "Invalid include_plotlyjs mode '{other}'. Expected one of: {}.",
                include_modes::ALL.join(", ")
            ))),
        }
    }

    fn script_tag(&self) -> std::result::Result<String, WriteError> {
        match self {
            PlotlyJsMode::Cdn => Ok(format!(
                r#"<script src="{}" charset="utf-8"></script>"#,
                dashboard_constants::PLOTLY_CDN
            )),
            PlotlyJsMode::Embed(path) => {
                let js = fs::read_to_string(path).map_err(|e| WriteError::io(path, e))?;
                Ok(format!(
                    r#"<script type="text/javascript">{}</script>"#,
                    js.replace("</script", "<\\/script")
                ))
            }
            PlotlyJsMode::None => Ok(String::new()),
        }
    }
}

/// Everything the HTML page shows
#[derive(Debug, Clone)]
pub struct DashboardData<'a> {
    pub analysis: &'a Analysis,
    pub charts: &'a ChartSet,
    /// CSV files to link, in list order
    pub assets: &'a [CsvAsset],
    /// Prefix of CSV links, relative to the HTML file when possible
    pub asset_href: String,
    /// Name of the input workbook
    pub source: String,
    /// Timestamp when the dashboard was generated
    pub generated_at: String,
}

/// HTML dashboard generator for zonal price analysis
pub struct HtmlDashboard;

impl HtmlDashboard {
    /// Render the page and write it atomically to `output_path`.
    ///
    /// The page goes to a temporary file next to the target first, so a
    /// failed write leaves no partial dashboard behind.
    pub fn generate_dashboard(
        data: &DashboardData,
        output_path: &Path,
        mode: &PlotlyJsMode,
    ) -> std::result::Result<(), WriteError> {
        let html_content = Self::generate_html_content(data, mode)?;
        write_atomic(output_path, html_content.as_bytes())
    }

    /// Generate the complete HTML document content
    pub fn generate_html_content(
        data: &DashboardData,
        mode: &PlotlyJsMode,
    ) -> std::result::Result<String, WriteError> {
        let plotly_script = mode.script_tag()?;
        let css_styles = Self::generate_css();
        let body_content = Self::generate_body_content(data)?;

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
    {}
    <style>{}</style>
</head>
<body>
    {}
</body>
</html>"#,
            dashboard_constants::PAGE_TITLE,
            plotly_script,
            css_styles,
            body_content
        ))
    }

    fn generate_css() -> &'static str {
        r#"
        :root {
            --bg: #0b1220;
            --card: #121a2b;
            --ink: #e6eefc;
            --muted: #9fb2d8;
            --brand: #7aa2f7;
            --chip: #1f2a44;
        }

        * { box-sizing: border-box; }

        body {
            margin: 24px;
            background: var(--bg);
            color: var(--ink);
            font: 14px/1.5 system-ui, -apple-system, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif;
        }

        h1, h2, h3 { color: var(--ink); margin: 0 0 12px; }

        .header p { color: var(--muted); }

        .section { margin: 28px 0; }

        .grid { display: grid; gap: 16px; }
        .grid.cols-2 { grid-template-columns: 1fr 1fr; }

        .card {
            background: var(--card);
            border: 1px solid #19233a;
            border-radius: 16px;
            padding: 16px;
            box-shadow: 0 6px 24px rgba(0, 0, 0, .25);
        }

        .kpis {
            display: grid;
            grid-template-columns: repeat(5, 1fr);
            gap: 12px;
        }

        .kpi {
            background: linear-gradient(180deg, #16213a, #101827);
            border: 1px solid #1b2642;
            border-radius: 14px;
            padding: 14px;
        }

        .kpi .label { color: var(--muted); font-size: 12px; }
        .kpi .value { font-size: 22px; font-weight: 700; margin-top: 6px; }

        .table { width: 100%; border-collapse: separate; border-spacing: 0 8px; }
        .table th { color: #cbd5e1; text-align: left; font-weight: 600; padding: 8px; }
        .table td {
            padding: 10px 8px;
            background: #0f172a;
            border-top: 1px solid #1e293b;
            border-bottom: 1px solid #1e293b;
        }

        .badge {
            display: inline-block;
            padding: 2px 8px;
            border-radius: 999px;
            font-size: 12px;
            background: var(--chip);
            color: var(--ink);
        }

        a { color: var(--brand); text-decoration: none; }
        a:hover { text-decoration: underline; }

        .footer { color: var(--muted); margin-top: 24px; font-size: 12px; }

        @media (max-width: 960px) {
            .grid.cols-2 { grid-template-columns: 1fr; }
            .kpis { grid-template-columns: repeat(2, 1fr); }
        }
        "#
    }

    /// Generate the main body content of the dashboard
    fn generate_body_content(data: &DashboardData) -> std::result::Result<String, WriteError> {
        let charts = data.charts;
        let chart = |fig: &Figure| Self::generate_chart_div(fig);

        Ok(format!(
            r#"
    <div class="header">
        <h1>PJM Day-Ahead Prices: Unified HTML Dashboard</h1>
        <p>Source: {} &middot; Generated on {}</p>
    </div>

    <div class="section card">{}</div>

    {}

    <div class="section grid cols-2">
        <div class="card">{}</div>
        <div class="card">{}</div>
    </div>

    <div class="section grid cols-2">
        <div class="card">{}</div>
        <div class="card">{}</div>
    </div>

    <div class="section card">{}</div>

    <div class="section grid cols-2">
        <div class="card">{}</div>
        <div class="card">{}</div>
    </div>

    <div class="section grid cols-2">
        <div class="card">{}</div>
        <div class="card">{}</div>
    </div>

    <div class="section grid cols-2">
        <div class="card">{}</div>
        <div class="card">{}</div>
    </div>

    <div class="section card">{}</div>

    {}

    {}

    <div class="section card">{}</div>

    <div class="section grid cols-2">
        <div class="card">{}</div>
        <div class="card">{}</div>
    </div>

    {}

    {}

    <div class="footer">Use the dropdowns on the heatmaps and charts to switch Zone/Year. Range sliders help focus on specific periods.</div>
"#,
            escape_html(&data.source),
            escape_html(&data.generated_at),
            Self::generate_stats_section(data.analysis),
            Self::generate_zone_table_section(data),
            chart(&charts.average)?,
            chart(&charts.top_zones)?,
            chart(&charts.hour_dow)?,
            chart(&charts.monthly_box)?,
            chart(&charts.sparklines)?,
            chart(&charts.rolling)?,
            chart(&charts.spread)?,
            chart(&charts.hour_of_day)?,
            chart(&charts.day_of_week)?,
            chart(&charts.seasonal)?,
            chart(&charts.histogram)?,
            chart(&charts.correlation)?,
            Self::generate_extremes_section(data),
            Self::generate_monthly_section(data),
            chart(&charts.monthly_heatmap)?,
            chart(&charts.zone_by_year)?,
            chart(&charts.year_by_zone)?,
            Self::generate_downloads_section(data),
            Self::generate_summary_json(&data.analysis.zone_summaries)?,
        ))
    }

    /// Generate the KPI cards
    fn generate_stats_section(analysis: &Analysis) -> String {
        let overall = &analysis.overall;
        let span = match (overall.start, overall.end) {
            (Some(start), Some(end)) => format!("{start} → {end}"),
            _ => dashboard_constants::MISSING.to_string(),
        };

        format!(
            r#"
        <div class="kpis">
            {}
            {}
            {}
            {}
            {}
        </div>"#,
            Self::generate_stat_card("Data Span", &span),
            Self::generate_stat_card("Hours", &format_thousands(overall.hours)),
            Self::generate_stat_card("Zones", &overall.zones.to_string()),
            Self::generate_stat_card("Mean Price", &format_price(overall.mean)),
            Self::generate_stat_card("Volatility (σ)", &format_number(overall.stdev)),
        )
    }

    /// Generate a single KPI card
    fn generate_stat_card(label: &str, value: &str) -> String {
        format!(
            r#"<div class="kpi"><div class="label">{}</div><div class="value">{}</div></div>"#,
            label, value
        )
    }

    fn generate_zone_table_section(data: &DashboardData) -> String {
        let rows: String = data
            .analysis
            .zone_summaries
            .iter()
            .map(|s| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    s.rank,
                    escape_html(&s.zone),
                    format_price(s.mean),
                    format_price(s.median),
                    format_price(s.p95),
                    format_price(s.min),
                    format_price(s.max),
                    format_number(s.stdev),
                )
            })
            .collect();

        format!(
            r#"
    <div class="section card">
        <h2>Zone Summary</h2>
        <p class="badge">{}</p>
        <table class="table"><tr><th>#</th><th>Zone</th><th>Mean</th><th>Median</th><th>P95</th><th>Min</th><th>Max</th><th>σ</th></tr>{}</table>
    </div>"#,
            Self::generate_asset_link(data, crate::core::constants::asset_files::ZONE_SUMMARY),
            rows
        )
    }

    fn generate_extremes_table(observations: &[Observation]) -> String {
        let rows: String = observations
            .iter()
            .map(|o| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                    o.timestamp.format("%Y-%m-%d %H:%M"),
                    escape_html(&o.zone),
                    format_price(Some(o.price)),
                )
            })
            .collect();
        format!(
            "<table class=\"table\"><tr><th>Date</th><th>Zone</th><th>Price ({PRICE_UNIT})</th></tr>{rows}</table>"
        )
    }

    fn generate_extremes_section(data: &DashboardData) -> String {
        use crate::core::constants::asset_files;

        format!(
            r#"
    <div class="section grid cols-2">
        <div class="card">
            <h2>Top Spikes (Top {})</h2>
            <p class="badge">{}</p>
            {}
        </div>
        <div class="card">
            <h2>Top Dips (Bottom {})</h2>
            <p class="badge">{}</p>
            {}
        </div>
    </div>"#,
            data.analysis.spikes.len(),
            Self::generate_asset_link(data, &asset_files::spikes(data.analysis.extremes)),
            Self::generate_extremes_table(&data.analysis.spikes),
            data.analysis.dips.len(),
            Self::generate_asset_link(data, &asset_files::dips(data.analysis.extremes)),
            Self::generate_extremes_table(&data.analysis.dips),
        )
    }

    fn generate_monthly_section(data: &DashboardData) -> String {
        format!(
            r#"
    <div class="section card">
        <h2>Monthly Averages: All Zones, Years &amp; Months</h2>
        <p class="badge">Download full table (CSV): {}</p>
    </div>"#,
            Self::generate_asset_link(
                data,
                crate::core::constants::asset_files::MONTHLY_AVERAGES
            )
        )
    }

    fn generate_downloads_section(data: &DashboardData) -> String {
        let items: String = data
            .assets
            .iter()
            .map(|asset| {
                format!(
                    r#"<li><a href="{}">{} (CSV)</a></li>"#,
                    Self::asset_href(data, &asset.file_name),
                    escape_html(asset.label)
                )
            })
            .collect();

        format!(
            r#"
    <div class="section card">
        <h2>Downloads</h2>
        <ul>{items}</ul>
    </div>"#
        )
    }

    fn asset_href(data: &DashboardData, file_name: &str) -> String {
        escape_html(&format!("{}{}", data.asset_href, file_name))
    }

    fn generate_asset_link(data: &DashboardData, file_name: &str) -> String {
        format!(
            r#"<a href="{}">{}</a>"#,
            Self::asset_href(data, file_name),
            escape_html(file_name)
        )
    }

    /// A chart container plus the script that draws it
    fn generate_chart_div(figure: &Figure) -> std::result::Result<String, WriteError> {
        let payload = script_safe(&figure.to_json()?);
        Ok(format!(
            r#"<div id="{id}" class="chart"></div>
        <script>(function () {{ var fig = {payload}; Plotly.newPlot("{id}", fig.data, fig.layout, {{"responsive": true}}); }})();</script>"#,
            id = figure.id,
        ))
    }

    /// Zone summary values as machine-readable JSON
    fn generate_summary_json(
        summaries: &[ZoneSummary],
    ) -> std::result::Result<String, WriteError> {
        let json = serde_json::to_string(summaries)?;
        Ok(format!(
            r#"<script type="application/json" id="{}">{}</script>"#,
            dashboard_constants::SUMMARY_JSON_ID,
            script_safe(&json)
        ))
    }
}

/// Link prefix for CSV files as seen from the HTML file.
///
/// The prefix is relative to the HTML file's directory, climbing with `..`
/// where needed. When no relative route exists (one path absolute and the
/// other not, or the HTML directory itself climbing above its base) the
/// asset directory is used as given.
pub fn asset_link_prefix(output_html: &Path, assets_dir: &Path) -> String {
    let html_dir = normalized(output_html.parent().unwrap_or(Path::new("")));
    let assets = normalized(assets_dir);

    let link_dir = relative_to(&assets, &html_dir).unwrap_or(assets);

    let parts: Vec<String> = link_dir
        .components()
        .filter_map(|c| match c {
            Component::RootDir | Component::Prefix(_) => None,
            other => Some(percent_encode(&other.as_os_str().to_string_lossy())),
        })
        .collect();
    let root = if link_dir.has_root() { "/" } else { "" };
    if parts.is_empty() {
        return root.to_string();
    }
    format!("{root}{}/", parts.join("/"))
}

/// `target` as seen from `base`, both already normalized
fn relative_to(target: &Path, base: &Path) -> Option<PathBuf> {
    if target.has_root() != base.has_root() {
        return None;
    }
    let target: Vec<Component> = target.components().collect();
    let base: Vec<Component> = base.components().collect();
    let common = target
        .iter()
        .zip(&base)
        .take_while(|(t, b)| t == b)
        .count();
    // climbing out of a `..` would need the name of its parent
    if base[common..].iter().any(|c| !matches!(c, Component::Normal(_))) {
        return None;
    }

    let mut relative: PathBuf = base[common..].iter().map(|_| Component::ParentDir).collect();
    relative.extend(&target[common..]);
    Some(relative)
}

/// Lexically drop `.` and fold `name/..` pairs
fn normalized(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if matches!(out.last(), Some(Component::Normal(_))) => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.into_iter().collect()
}

/// Percent-encode one path segment for use in an `href`
fn percent_encode(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Write through a temporary file in the destination directory, then rename
fn write_atomic(path: &Path, bytes: &[u8]) -> std::result::Result<(), WriteError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = temp_file_in(dir).map_err(|e| WriteError::io(path, e))?;
    // an existing dashboard keeps its mode
    if let Ok(existing) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| WriteError::io(path, e))?;
    }
    tmp.write_all(bytes).map_err(|e| WriteError::io(path, e))?;
    tmp.flush().map_err(|e| WriteError::io(path, e))?;
    tmp.persist(path).map_err(|e| WriteError::io(path, e.error))?;
    Ok(())
}

/// Temporary file created like a regular one, so the umask decides its mode
#[cfg(unix)]
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    tempfile::Builder::new()
        .prefix(".pjm-dashboard")
        .permissions(fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    NamedTempFile::new_in(dir)
}

/// Keep JSON from opening or closing tags inside its `<script>` element
fn script_safe(json: &str) -> String {
    json.replace('<', "\\u003c")
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_price(value: Option<f64>) -> String {
    match value {
        Some(v) if v < 0.0 => format!("-${:.2}", -v),
        Some(v) => format!("${v:.2}"),
        None => dashboard_constants::MISSING.to_string(),
    }
}

fn format_number(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| dashboard_constants::MISSING.to_string())
}

fn format_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisOptions;
    use crate::core::types::{PriceRow, PriceTable};
    use crate::render::RenderOptions;
    use chrono::{Duration, NaiveDate};
    use tempfile::TempDir;

    fn fixtures() -> (Analysis, ChartSet) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let rows = (0..72)
            .map(|h| {
                PriceRow::new(
                    start + Duration::hours(h),
                    vec![Some(25.0 + (h % 24) as f64), Some(-3.5), None],
                )
            })
            .collect();
        let table = PriceTable::new(
            vec!["AECO".into(), "<script>".into(), "EMPTY".into()],
            rows,
        )
        .unwrap();
        let analysis = Analysis::compute(&table, &AnalysisOptions::default());
        let charts = ChartSet::render(&table, &analysis, &RenderOptions::default());
        (analysis, charts)
    }

    fn data<'a>(analysis: &'a Analysis, charts: &'a ChartSet) -> DashboardData<'a> {
        DashboardData {
            analysis,
            charts,
            assets: &[],
            asset_href: "assets/".to_string(),
            source: "prices.xlsx".to_string(),
            generated_at: "2025-01-01 12:00:00".to_string(),
        }
    }

    fn embedded_summary(html: &str) -> serde_json::Value {
        let open = format!(r#"<script type="application/json" id="{SUMMARY_JSON_ID}">"#);
        let start = html.find(&open).unwrap() + open.len();
        let end = start + html[start..].find("</script>").unwrap();
        serde_json::from_str(&html[start..end]).unwrap()
    }

    #[test]
    fn test_plotlyjs_mode_from_config() {
        assert_eq!(PlotlyJsMode::from_config("cdn", None).unwrap(), PlotlyJsMode::Cdn);
        assert_eq!(PlotlyJsMode::from_config("false", None).unwrap(), PlotlyJsMode::None);
        assert_eq!(
            PlotlyJsMode::from_config("true", Some("vendor/plotly.min.js")).unwrap(),
            PlotlyJsMode::Embed(PathBuf::from("vendor/plotly.min.js"))
        );
        assert!(PlotlyJsMode::from_config("true", None).is_err());
        assert!(PlotlyJsMode::from_config("true", Some("  ")).is_err());
        assert!(PlotlyJsMode::from_config("inline", None).is_err());
    }

    #[test]
    fn test_generate_html_content() {
        let (analysis, charts) = fixtures();
        let html =
            HtmlDashboard::generate_html_content(&data(&analysis, &charts), &PlotlyJsMode::Cdn)
                .unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("cdn.plot.ly"));
        assert!(html.contains("Zone Summary"));
        assert!(html.contains("prices.xlsx"));
        assert!(html.contains(r#"href="assets/zone_summary.csv""#));
        assert_eq!(html.matches("Plotly.newPlot").count(), 15);
        for fig in charts.iter() {
            assert!(html.contains(&format!(r#"<div id="{}""#, fig.id)));
        }
    }

    #[test]
    fn test_plotlyjs_none_mode_omits_script() {
        let (analysis, charts) = fixtures();
        let html =
            HtmlDashboard::generate_html_content(&data(&analysis, &charts), &PlotlyJsMode::None)
                .unwrap();
        assert!(!html.contains("cdn.plot.ly"));
    }

    #[test]
    fn test_plotlyjs_embed_mode_inlines_bundle() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let dir = TempDir::new()?;
        let bundle = dir.path().join("plotly.min.js");
        fs::write(&bundle, "window.Plotly = {}; // </script>")?;

        let (analysis, charts) = fixtures();
        let html = HtmlDashboard::generate_html_content(
            &data(&analysis, &charts),
            &PlotlyJsMode::Embed(bundle),
        )?;
        assert!(html.contains("window.Plotly = {};"));
        assert!(html.contains("<\\/script>"));
        assert!(!html.contains("cdn.plot.ly"));
        Ok(())
    }

    #[test]
    fn test_embed_mode_missing_bundle_is_write_error() {
        let (analysis, charts) = fixtures();
        let err = HtmlDashboard::generate_html_content(
            &data(&analysis, &charts),
            &PlotlyJsMode::Embed(PathBuf::from("/definitely/not/plotly.min.js")),
        )
        .unwrap_err();
        assert!(matches!(err, WriteError::Io { .. }));
    }

    #[test]
    fn test_zone_names_are_escaped() {
        let (analysis, charts) = fixtures();
        let html =
            HtmlDashboard::generate_html_content(&data(&analysis, &charts), &PlotlyJsMode::None)
                .unwrap();

        assert!(html.contains("&lt;script&gt;"));
        // JSON payloads never close their script element early
        assert!(!html.contains("\"<script>\""));
    }

    #[test]
    fn test_embedded_summary_matches_analysis() {
        let (analysis, charts) = fixtures();
        let html =
            HtmlDashboard::generate_html_content(&data(&analysis, &charts), &PlotlyJsMode::None)
                .unwrap();

        let summary = embedded_summary(&html);
        let entries = summary.as_array().unwrap();
        assert_eq!(entries.len(), analysis.zone_summaries.len());
        assert_eq!(entries[0]["zone"], "AECO");
        assert_eq!(entries[0]["mean"], analysis.zone_summaries[0].mean.unwrap());
        assert_eq!(entries[1]["zone"], "<script>");
        assert!(entries[2]["mean"].is_null());
    }

    #[test]
    fn test_generate_stat_card() {
        let card = HtmlDashboard::generate_stat_card("Zones", "21");
        assert!(card.contains("kpi"));
        assert!(card.contains("Zones"));
        assert!(card.contains("21"));
    }

    #[test]
    fn test_generate_css() {
        let css = HtmlDashboard::generate_css();
        assert!(css.contains("body"));
        assert!(css.contains(".kpis"));
        assert!(css.contains("margin:"));
    }

    #[test]
    fn test_generate_dashboard_file_creation() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let dir = TempDir::new()?;
        let output = dir.path().join("dashboard.html");
        let (analysis, charts) = fixtures();

        HtmlDashboard::generate_dashboard(
            &data(&analysis, &charts),
            &output,
            &PlotlyJsMode::Cdn,
        )?;

        let content = fs::read_to_string(&output)?;
        assert!(content.contains("<!DOCTYPE html>"));
        // only the dashboard remains, no temporary files
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_generate_dashboard_file_mode_matches_regular_files()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new()?;
        let output = dir.path().join("dashboard.html");
        let reference = dir.path().join("reference.html");
        fs::write(&reference, "")?;
        let (analysis, charts) = fixtures();

        HtmlDashboard::generate_dashboard(
            &data(&analysis, &charts),
            &output,
            &PlotlyJsMode::None,
        )?;

        let mode = |p: &Path| -> std::io::Result<u32> {
            Ok(fs::metadata(p)?.permissions().mode() & 0o777)
        };
        assert_eq!(mode(&output)?, mode(&reference)?);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_generate_dashboard_keeps_existing_mode()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new()?;
        let output = dir.path().join("dashboard.html");
        fs::write(&output, "old")?;
        fs::set_permissions(&output, fs::Permissions::from_mode(0o640))?;
        let (analysis, charts) = fixtures();

        HtmlDashboard::generate_dashboard(
            &data(&analysis, &charts),
            &output,
            &PlotlyJsMode::None,
        )?;

        assert_eq!(fs::metadata(&output)?.permissions().mode() & 0o777, 0o640);
        assert!(fs::read_to_string(&output)?.starts_with("<!DOCTYPE html>"));
        Ok(())
    }

    #[test]
    fn test_generate_dashboard_unwritable_path() {
        let (analysis, charts) = fixtures();
        let output = PathBuf::from("/definitely/not/a/dir/dashboard.html");

        let err = HtmlDashboard::generate_dashboard(
            &data(&analysis, &charts),
            &output,
            &PlotlyJsMode::Cdn,
        )
        .unwrap_err();

        assert!(matches!(err, WriteError::Io { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_asset_link_prefix() {
        let cases = [
            ("PJM_Unified_Dashboard.html", "assets", "assets/"),
            ("./out.html", "./assets", "assets/"),
            ("site/out.html", "site/assets", "assets/"),
            ("site/out.html", "site/data/csv", "data/csv/"),
            ("site/out.html", "site", ""),
            ("site/out.html", "other/assets", "../other/assets/"),
            ("site/deep/out.html", "assets", "../../assets/"),
            ("site/out.html", "./site/../assets", "../assets/"),
            ("out.html", "../shared", "../shared/"),
            ("../out.html", "assets", "assets/"),
            ("/srv/www/out.html", "/srv/www/assets", "assets/"),
            ("/srv/www/out.html", "/tmp/assets", "../../tmp/assets/"),
            ("site/out.html", "/tmp/assets", "/tmp/assets/"),
            ("out.html", "my assets", "my%20assets/"),
            ("out.html", "runs#2/q?a", "runs%232/q%3Fa/"),
        ];
        for (html, assets, expected) in cases {
            assert_eq!(
                asset_link_prefix(Path::new(html), Path::new(assets)),
                expected,
                "html={html} assets={assets}"
            );
        }
    }

    #[test]
    fn test_formatting_helpers() {
        assert_eq!(format_price(Some(31.456)), "$31.46");
        assert_eq!(format_price(Some(-3.5)), "-$3.50");
        assert_eq!(format_price(None), "n/a");
        assert_eq!(format_number(Some(1.0)), "1.00");
        assert_eq!(format_thousands(8784), "8,784");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000_000), "1,000,000");
        assert_eq!(escape_html("A&B <\"x\">"), "A&amp;B &lt;&quot;x&quot;&gt;");
    }
}
