// Command-line interface definitions and parsing for pjm-dashboard

use crate::config::CliConfig;
use crate::core::constants::{buckets, include_modes};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "pjm-dashboard",
    author,
    version,
    about = "Turn a PJM day-ahead zonal price workbook into an HTML dashboard and CSV summaries",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // Input
    /// Price workbook (.xlsx, .xls, .ods)
    #[arg(short = 'i', long, value_name = "PATH", help_heading = "Input")]
    pub input: Option<String>,

    /// Sheet with the zone-wise prices (default: ZoneWisePrices)
    #[arg(short = 's', long, value_name = "NAME", help_heading = "Input")]
    pub sheet: Option<String>,

    /// 0-based row holding the column headers (default: 0)
    #[arg(long, value_name = "ROW", help_heading = "Input")]
    pub header_row: Option<usize>,

    /// Leave out zones whose name matches (regex, repeatable)
    #[arg(long = "exclude-zone", value_name = "REGEX", help_heading = "Input")]
    pub exclude_zone: Vec<String>,

    // Output
    /// Dashboard HTML file (default: PJM_Unified_Dashboard.html)
    #[arg(short = 'o', long, value_name = "PATH", help_heading = "Output")]
    pub output: Option<String>,

    /// Folder for CSV downloads (default: assets)
    #[arg(long, value_name = "PATH", help_heading = "Output")]
    pub assets_dir: Option<String>,

    /// How the page loads Plotly.js (default: cdn)
    #[arg(long, value_name = "MODE", value_parser = include_modes::ALL, help_heading = "Output")]
    pub include_plotlyjs: Option<String>,

    /// Local plotly.min.js to inline with --include-plotlyjs true
    #[arg(long, value_name = "PATH", help_heading = "Output")]
    pub plotlyjs_bundle: Option<String>,

    // Analysis
    /// Time bucket for per-zone statistics (default: monthly)
    #[arg(long, value_name = "BUCKET", value_parser = buckets::ALL, help_heading = "Analysis")]
    pub bucket: Option<String>,

    /// Zones shown in the trend and box charts (default: 10)
    #[arg(long, value_name = "COUNT", help_heading = "Analysis")]
    pub top_zones: Option<usize>,

    /// Zone selected initially in single-zone charts
    #[arg(long, value_name = "ZONE", help_heading = "Analysis")]
    pub default_zone: Option<String>,

    // Output & Verbosity
    /// Suppress progress output
    #[arg(short = 'q', long, help_heading = "Output & Verbosity")]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, help_heading = "Output & Verbosity")]
    pub verbose: bool,

    // Configuration
    /// Use specific config file
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Ignore config files
    #[arg(long, help_heading = "Configuration")]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate shell completions
    #[command(name = "completion-generate", arg_required_else_help = true)]
    CompletionGenerate {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Convert derive-based CLI arguments directly to CliConfig structure
pub fn cli_to_config(cli: &Cli) -> CliConfig {
    let mut cli_config = CliConfig {
        input: cli.input.clone(),
        sheet: cli.sheet.clone(),
        header_row: cli.header_row,
        ..CliConfig::default()
    };

    let patterns: Vec<String> = cli
        .exclude_zone
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if !patterns.is_empty() {
        cli_config.exclude_zones = Some(patterns);
    }

    // Output
    cli_config.output = cli.output.clone();
    cli_config.assets_dir = cli.assets_dir.clone();
    cli_config.include_plotlyjs = cli.include_plotlyjs.clone();
    cli_config.plotlyjs_bundle = cli.plotlyjs_bundle.clone();

    // Analysis
    cli_config.bucket = cli.bucket.clone();
    cli_config.top_zones = cli.top_zones;
    cli_config.default_zone = cli.default_zone.clone();

    cli_config.quiet = cli.quiet;
    cli_config.verbose = cli.verbose;

    // Configuration
    cli_config.config_file = cli.config.clone();
    cli_config.no_config = cli.no_config;

    cli_config
}
