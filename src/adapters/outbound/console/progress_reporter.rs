use crate::ports::outbound::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};

/// StderrProgressReporter adapter for reporting progress to stderr
///
/// This adapter implements the ProgressReporter port, writing progress
/// information to stderr so it doesn't interfere with a report on stdout.
/// The bar's length follows the reported total, which may grow while the
/// dependency tree is discovered.
pub struct StderrProgressReporter {
    progress_bar: Mutex<Option<ProgressBar>>,
}

impl StderrProgressReporter {
    pub fn new() -> Self {
        Self {
            progress_bar: Mutex::new(None),
        }
    }

    fn get_or_create_progress_bar(&self, total: usize) -> ProgressBar {
        let mut slot = self
            .progress_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(pb) = slot.as_ref() {
            return pb.clone();
        }

        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("   {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} - {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        *slot = Some(pb.clone());
        pb
    }

    fn finish(&self) {
        let mut slot = self
            .progress_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(pb) = slot.take() {
            pb.finish_and_clear();
        }
    }
}

impl Default for StderrProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for StderrProgressReporter {
    fn report(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn report_progress(&self, current: usize, total: usize, message: Option<&str>) {
        let pb = self.get_or_create_progress_bar(total);
        pb.set_length(total as u64);
        pb.set_position(current as u64);
        if let Some(msg) = message {
            pb.set_message(msg.to_string());
        }
    }

    fn report_error(&self, message: &str) {
        self.finish();
        eprintln!("{}", message);
    }

    fn report_completion(&self, message: &str) {
        self.finish();
        eprintln!("{}", message);
    }
}
