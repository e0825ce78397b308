//! Progress reporting for long-running pipeline stages.
//!
//! The pipeline only talks to [`ProgressReporter`]; [`NoProgress`] is the
//! default and [`BarProgress`] draws an `indicatif` bar on stderr.

use std::cell::RefCell;

use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str = "{prefix:>20.bold} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg:.dim}";

/// Receives progress events from a pipeline stage.
pub trait ProgressReporter {
    /// Begins a stage that will process `total` items.
    fn start(&self, label: &str, total: usize);

    /// Marks one item as done.
    fn advance(&self, item: &str);

    /// Ends the current stage.
    fn finish(&self);
}

/// Reporter that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn start(&self, _label: &str, _total: usize) {}

    fn advance(&self, _item: &str) {}

    fn finish(&self) {}
}

/// Terminal progress bar, one bar per stage.
#[derive(Default)]
pub struct BarProgress {
    current: RefCell<Option<ProgressBar>>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
    }
}

impl ProgressReporter for BarProgress {
    fn start(&self, label: &str, total: usize) {
        let bar = ProgressBar::new(total as u64)
            .with_style(Self::style())
            .with_prefix(label.to_string());
        if let Some(previous) = self.current.replace(Some(bar)) {
            previous.finish_and_clear();
        }
    }

    fn advance(&self, item: &str) {
        if let Some(bar) = self.current.borrow().as_ref() {
            bar.set_message(item.to_string());
            bar.inc(1);
        }
    }

    fn finish(&self) {
        if let Some(bar) = self.current.take() {
            bar.finish_and_clear();
        }
    }
}
