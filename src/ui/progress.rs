use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while the pipeline stages run
pub struct ProgressReporter {
    spinner: Option<ProgressBar>,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self {
            spinner: None,
            enabled,
        }
    }

    /// Start a stage, replacing the message of a running spinner
    pub fn stage(&mut self, message: &str) {
        if !self.enabled {
            return;
        }

        match &self.spinner {
            Some(pb) => pb.set_message(message.to_string()),
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} [{elapsed}] {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb.set_message(message.to_string());
                pb.enable_steady_tick(Duration::from_millis(120));
                self.spinner = Some(pb);
            }
        }
    }

    pub fn finish(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_reporter_never_spins() {
        let mut reporter = ProgressReporter::new(false);
        reporter.stage("Loading workbook");
        assert!(reporter.spinner.is_none());
    }

    #[test]
    fn test_stages_reuse_one_spinner() {
        let mut reporter = ProgressReporter::new(true);
        reporter.stage("Loading workbook");
        reporter.stage("Computing summaries");
        assert!(reporter.spinner.is_some());

        reporter.finish();
        assert!(reporter.spinner.is_none());
    }
}
