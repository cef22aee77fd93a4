use clap::Parser;
use std::path::Path;
use std::time::Instant;

use pjm_dashboard::analysis::{Analysis, AnalysisOptions};
use pjm_dashboard::config::{CliConfig, Config};
use pjm_dashboard::core::Result;
use pjm_dashboard::loader::WorkbookLoader;
use pjm_dashboard::render::{ChartSet, RenderOptions};
use pjm_dashboard::reporting::{
    CsvExporter, DashboardData, HtmlDashboard, asset_link_prefix, logging,
};
use pjm_dashboard::ui::output::{self, DisplayMetadata};
use pjm_dashboard::ui::{Cli, Commands, ProgressReporter, cli_to_config, completion_script};

fn main() {
    let cli = Cli::parse();

    // Handle completion commands first
    if let Some(exit_code) = handle_completion_commands(&cli) {
        std::process::exit(exit_code);
    }

    if let Err(e) = run_dashboard_logic(&cli) {
        output::display_error(&e);
        std::process::exit(1);
    }
}

/// Handle completion commands and return exit code if a completion command was processed
pub fn handle_completion_commands(cli: &Cli) -> Option<i32> {
    match cli.command {
        Some(Commands::CompletionGenerate { shell }) => match completion_script(shell) {
            Ok(script) => {
                print!("{script}");
                Some(0)
            }
            Err(e) => {
                eprintln!("Error: {e}");
                Some(1)
            }
        },
        None => None,
    }
}

/// Main dashboard logic extracted from main() for testing
pub fn run_dashboard_logic(cli: &Cli) -> Result<()> {
    let cli_config = cli_to_config(cli);

    let config = load_and_merge_config(&cli_config)?;
    let output_settings = setup_output_settings(&cli_config, &config);
    logging::init_logger(output_settings.verbose, output_settings.quiet);

    config.validate().inspect_err(|e| {
        logging::log_error("Invalid configuration", Some(e));
    })?;
    logging::log_config_info(&config);

    if output_settings.should_show_config_info() {
        output::display_config_info(&config);
    }

    let mut progress = ProgressReporter::new(output_settings.show_progress);
    let metadata = generate(&config, &mut progress)?;
    progress.finish();

    if !output_settings.quiet {
        output::display_results(&config.output_path(), &config.assets_path(), &metadata);
    }
    Ok(())
}

/// Load, aggregate, render and write; the whole pipeline for one workbook
pub fn generate(config: &Config, progress: &mut ProgressReporter) -> Result<DisplayMetadata> {
    let started = Instant::now();
    let input = config.input_path()?;
    let mode = config.plotlyjs_mode()?;

    progress.stage(&format!("Loading {}", input.display()));
    let loaded = WorkbookLoader::new(&input, config.sheet_name())
        .header_row(config.header_row())
        .exclude(config.compile_exclude_patterns()?)
        .load()?;
    let table = loaded.table;

    progress.stage("Computing zone statistics");
    let analysis_started = Instant::now();
    let analysis = Analysis::compute(
        &table,
        &AnalysisOptions {
            granularity: config.granularity()?,
            extremes: config.extremes(),
            rolling_window: config.rolling_window(),
            rolling_min_periods: config.rolling_min_periods(),
        },
    );
    let empty_zones = analysis
        .zone_summaries
        .iter()
        .filter(|s| s.is_empty())
        .count();
    logging::log_summary_computed(
        analysis.zone_summaries.len(),
        empty_zones,
        analysis_started.elapsed().as_millis(),
    );

    progress.stage("Rendering charts");
    let charts = ChartSet::render(
        &table,
        &analysis,
        &RenderOptions {
            top_zones: config.top_zones(),
            spark_zones: config.spark_zones(),
            histogram_bins: config.histogram_bins(),
            rolling_window: config.rolling_window(),
            default_zone: config.default_zone.clone(),
        },
    );

    let output_path = config.output_path();
    let assets_dir = config.assets_path();

    progress.stage(&format!("Writing CSV files to {}", assets_dir.display()));
    let assets = CsvExporter::new(&assets_dir).write_all(&analysis)?;

    progress.stage(&format!("Writing {}", output_path.display()));
    let data = DashboardData {
        analysis: &analysis,
        charts: &charts,
        assets: &assets,
        asset_href: asset_link_prefix(&output_path, &assets_dir),
        source: source_name(&input),
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    };
    HtmlDashboard::generate_dashboard(&data, &output_path, &mode)?;
    logging::log_asset_written(&output_path, analysis.zone_summaries.len());

    Ok(DisplayMetadata {
        hours: table.len(),
        zones: table.zones().len(),
        empty_zones,
        csv_files: assets.len(),
        elapsed_ms: started.elapsed().as_millis(),
    })
}

fn source_name(input: &Path) -> String {
    input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}

/// Load configuration and merge with CLI arguments
pub fn load_and_merge_config(cli_config: &CliConfig) -> Result<Config> {
    let mut config = if cli_config.no_config {
        Config::default()
    } else if let Some(ref config_file) = cli_config.config_file {
        Config::load_from_file(config_file).inspect_err(|e| {
            logging::log_error(
                &format!("Could not load config file '{config_file}'"),
                Some(e),
            );
        })?
    } else {
        Config::load_from_standard_locations()
    };

    // Merge CLI arguments with configuration (CLI takes precedence)
    config.merge_with_cli(cli_config);
    Ok(config)
}

/// Settings for output formatting and display
pub struct OutputSettings {
    pub quiet: bool,
    pub verbose: bool,
    pub show_progress: bool,
}

impl OutputSettings {
    pub fn should_show_config_info(&self) -> bool {
        !self.quiet && self.verbose
    }
}

/// Setup output settings based on CLI and config
pub fn setup_output_settings(cli_config: &CliConfig, config: &Config) -> OutputSettings {
    let quiet = cli_config.quiet;
    let verbose = config.verbose.unwrap_or(false);

    OutputSettings {
        quiet,
        verbose,
        show_progress: !quiet,
    }
}
