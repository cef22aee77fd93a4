//! Shell completion scripts for pjm-dashboard

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::ui::cli::Cli;

/// Name the completions are registered under
pub const BIN_NAME: &str = "pjm-dashboard";

/// Completion script for `shell` as a string
pub fn completion_script(shell: Shell) -> Result<String, String> {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    generate(shell, &mut cmd, BIN_NAME, &mut buf);

    String::from_utf8(buf).map_err(|e| format!("Failed to generate completion script: {e}"))
}
