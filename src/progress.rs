//! Progress reporting and cooperative cancellation.
//!
//! The engine only calls into a [`ProgressMonitor`]; hosts decide what to
//! do with the reports.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Callbacks the engine reports progress to.
pub trait ProgressMonitor {
    /// Starts a task; `total` is `None` when the amount of work is unknown.
    fn begin_task(&mut self, label: &str, total: Option<usize>);

    fn worked(&mut self, units: usize);

    fn done(&mut self);

    /// Polled at every iteration and every depression step.
    fn is_canceled(&self) -> bool;

    fn message(&mut self, text: &str);
}

/// Monitor that ignores everything and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMonitor;

impl ProgressMonitor for NullMonitor {
    fn begin_task(&mut self, _label: &str, _total: Option<usize>) {}

    fn worked(&mut self, _units: usize) {}

    fn done(&mut self) {}

    fn is_canceled(&self) -> bool {
        false
    }

    fn message(&mut self, _text: &str) {}
}

/// Monitor forwarding to the `log` facade.
///
/// Tasks and messages go out at info level, progress in 10% steps at debug
/// level. Cancel it from anywhere through [`LogMonitor::cancel_handle`].
#[derive(Debug, Default)]
pub struct LogMonitor {
    task: String,
    total: Option<usize>,
    worked: usize,
    last_decile: usize,
    canceled: Arc<AtomicBool>,
}

impl LogMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared flag; storing `true` cancels the run at its next check.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.canceled)
    }
}

impl ProgressMonitor for LogMonitor {
    fn begin_task(&mut self, label: &str, total: Option<usize>) {
        self.task = label.to_string();
        self.total = total;
        self.worked = 0;
        self.last_decile = 0;
        log::info!("{}", label);
    }

    fn worked(&mut self, units: usize) {
        self.worked += units;
        if let Some(total) = self.total.filter(|&t| t > 0) {
            let decile = (self.worked * 10 / total).min(10);
            if decile > self.last_decile {
                self.last_decile = decile;
                log::debug!("{} {}%", self.task, decile * 10);
            }
        }
    }

    fn done(&mut self) {
        log::debug!("{} done ({} units)", self.task, self.worked);
    }

    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Relaxed)
    }

    fn message(&mut self, text: &str) {
        log::info!("{}", text);
    }
}
