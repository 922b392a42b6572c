//! Progress indicators for import jobs

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const RECORD_TEMPLATE: &str = "{spinner:.green} [{elapsed}] {msg} {pos} records";

/// Spinner counting the records of one job, or a hidden bar when disabled
pub fn record_spinner(message: &str, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template(RECORD_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Stop the spinner, leaving a completion line with the final count
pub fn finish_records(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("{message} done:"));
}

/// Stop the spinner and clear it from the terminal
pub fn abandon_records(pb: &ProgressBar) {
    pb.finish_and_clear();
}
