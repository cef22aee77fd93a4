//! Terminal output for a finished run

use crate::config::Config;
use crate::core::constants::display;
use crate::ui::color::{Colors, colorize};
use std::path::Path;

/// Metadata for displaying results
#[derive(Debug, Clone)]
pub struct DisplayMetadata {
    pub hours: usize,
    pub zones: usize,
    pub empty_zones: usize,
    pub csv_files: usize,
    pub elapsed_ms: u128,
}

fn label(text: &str) -> String {
    colorize(&format!("{}{}{}", Colors::BOLD, text, Colors::RESET), Colors::CYAN)
}

/// Display configuration information in a user-friendly format
pub fn display_config_info(config: &Config) {
    let input = config.input.as_deref().unwrap_or("<none>");
    println!("{}: {}", label("Workbook"), input);
    println!(
        "{}: {} (header row {})",
        label("Sheet"),
        config.sheet_name(),
        config.header_row()
    );
    println!(
        "{}: {}",
        label("Plotly.js"),
        config.include_plotlyjs.as_deref().unwrap_or("cdn")
    );
    println!();
}

/// Lines printed after the dashboard was written
pub fn result_lines(html: &Path, assets_dir: &Path, metadata: &DisplayMetadata) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} Wrote {}",
            display::SUCCESS_EMOJI,
            colorize(&html.display().to_string(), Colors::GREEN)
        ),
        format!(
            "{} CSV downloads ({}) in {}",
            display::FOLDER_EMOJI,
            metadata.csv_files,
            assets_dir.display()
        ),
        colorize(
            &format!(
                "{} hourly rows, {} zones ({} ms)",
                metadata.hours, metadata.zones, metadata.elapsed_ms
            ),
            Colors::DIM,
        ),
    ];
    if metadata.empty_zones > 0 {
        lines.push(colorize(
            &format!(
                "{} zone(s) had no prices and are listed without statistics",
                metadata.empty_zones
            ),
            Colors::YELLOW,
        ));
    }
    lines
}

pub fn display_results(html: &Path, assets_dir: &Path, metadata: &DisplayMetadata) {
    for line in result_lines(html, assets_dir, metadata) {
        println!("{line}");
    }
}

/// Print a failure in the `Error: <message>` form
pub fn display_error(err: &dyn std::error::Error) {
    eprintln!("{} {}", colorize("Error:", Colors::RED), err);
}
