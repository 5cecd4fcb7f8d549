use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{info, warn};

/// Counts of what the apply step did for one instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Decisions handed to the apply step
    pub decisions: usize,
    /// Decisions written to the target service
    pub applied: usize,
    /// Decisions with no target item (media server search came back empty)
    pub skipped: usize,
    /// Decisions whose mutation call failed
    pub failed: usize,
}

impl ApplyReport {
    pub fn merge(&mut self, other: &ApplyReport) {
        self.decisions += other.decisions;
        self.applied += other.applied;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Tracks apply progress and logs periodic updates and a final summary
pub struct ApplyTracker {
    report: ApplyReport,
    dry_run: bool,
    start_time: Instant,
    progress_interval: usize,
    last_progress_log: usize,
    error_counts: HashMap<String, usize>,
}

impl ApplyTracker {
    /// `progress_interval`: log progress every N decisions
    pub fn new(total: usize, progress_interval: usize, dry_run: bool) -> Self {
        if total > progress_interval {
            info!("Applying {} decisions", total);
        }
        Self {
            report: ApplyReport {
                decisions: total,
                ..Default::default()
            },
            dry_run,
            start_time: Instant::now(),
            progress_interval: progress_interval.max(1),
            last_progress_log: 0,
            error_counts: HashMap::new(),
        }
    }

    pub fn record_applied(&mut self, count: usize) {
        self.report.applied += count;
    }

    pub fn record_skipped(&mut self) {
        self.report.skipped += 1;
    }

    /// Record a failure, grouped by category in the summary
    pub fn record_failed(&mut self, count: usize, error_category: &str) {
        self.report.failed += count;
        *self.error_counts.entry(error_category.to_string()).or_insert(0) += count;
    }

    /// `current` is 1-based
    pub fn log_progress(&mut self, current: usize) {
        let total = self.report.decisions;
        if current - self.last_progress_log < self.progress_interval && current != total {
            return;
        }
        if self.last_progress_log == 0 && current == total && total <= self.progress_interval {
            // Small batches only get the summary
            return;
        }
        info!(
            "Progress: {}/{} | Applied: {} | Skipped: {} | Failed: {}",
            current, total, self.report.applied, self.report.skipped, self.report.failed
        );
        self.last_progress_log = current;
    }

    pub fn log_summary(&self, operation_name: &str) -> ApplyReport {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let r = &self.report;
        if self.dry_run {
            info!(
                operation = operation_name,
                dry_run = true,
                "{} dry run: {} decisions, nothing written",
                operation_name,
                r.decisions
            );
        } else if r.failed > 0 || r.skipped > 0 {
            warn!(
                operation = operation_name,
                "{} completed in {:.1}s | Decisions: {} | Applied: {} | Skipped: {} | Failed: {}",
                operation_name, elapsed, r.decisions, r.applied, r.skipped, r.failed
            );
            if !self.error_counts.is_empty() {
                let mut entries: Vec<_> = self.error_counts.iter().collect();
                entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
                let breakdown: Vec<String> = entries
                    .iter()
                    .map(|(category, count)| format!("{}: {}", category, count))
                    .collect();
                info!("Error breakdown: {}", breakdown.join(", "));
            }
        } else if r.decisions > 0 {
            info!(
                operation = operation_name,
                "{} completed in {:.1}s | Decisions: {} | Applied: {}",
                operation_name, elapsed, r.decisions, r.applied
            );
        }
        self.report.clone()
    }
}
