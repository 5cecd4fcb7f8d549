//! Executes reconciler decisions against the target service.
//!
//! Every decision is logged with the same wording in dry runs and real runs;
//! dry runs issue no mutating calls at all.

use crate::progress::{ApplyReport, ApplyTracker};
use crate::reconcile::{FromServerPlan, ToServerPlan};
use labelarr_models::{CatalogId, MediaKind, SyncAction, SyncDecision};
use labelarr_sources::{CatalogManager, MediaServer};
use tracing::{error, info, instrument};

const PROGRESS_INTERVAL: usize = 50;

fn log_decision(decision: &SyncDecision, dry_run: bool) {
    info!(
        label = %decision.label,
        title = %decision.title,
        year = %decision.year_display(),
        action = %decision.action,
        dry_run,
        "{}",
        decision
    );
}

/// Apply media server label changes.
///
/// Each decision's item is looked up by title and year and the first result is
/// edited. Items that cannot be found or edited are logged and skipped. Dry runs
/// still search, so missing items are reported the same way, but never edit.
#[instrument(skip_all, fields(operation = "apply_to_server", dry_run = dry_run))]
pub async fn apply_to_server(server: &dyn MediaServer, kind: MediaKind, plan: &ToServerPlan, dry_run: bool) -> ApplyReport {
    let mut tracker = ApplyTracker::new(plan.len(), PROGRESS_INTERVAL, dry_run);

    for (idx, decision) in plan.decisions().enumerate() {
        log_decision(decision, dry_run);

        let found = match server.search_item(&decision.title, decision.year, kind).await {
            Ok(found) => found,
            Err(e) => {
                error!("{} | Search failed: {}", decision, e);
                tracker.record_failed(1, "search failed");
                tracker.log_progress(idx + 1);
                continue;
            }
        };
        let Some(item) = found.first() else {
            error!("{} | Title not found in {}", decision, server.server_name());
            tracker.record_skipped();
            tracker.log_progress(idx + 1);
            continue;
        };
        if dry_run {
            tracker.log_progress(idx + 1);
            continue;
        }

        let result = match decision.action {
            SyncAction::Add => server.add_label(item, &decision.label).await,
            SyncAction::Remove => server.remove_label(item, &decision.label).await,
        };
        match result {
            Ok(()) => tracker.record_applied(1),
            Err(e) => {
                error!("{} | Edit failed: {}", decision, e);
                tracker.record_failed(1, "edit failed");
            }
        }
        tracker.log_progress(idx + 1);
    }

    tracker.log_summary(&format!("{} label sync", server.server_name()))
}

/// Apply catalog manager tag changes, one editor call per non-empty batch.
#[instrument(skip_all, fields(operation = "apply_from_server", instance = catalog.instance_name(), dry_run = dry_run))]
pub async fn apply_from_server(catalog: &dyn CatalogManager, plan: &FromServerPlan, dry_run: bool) -> ApplyReport {
    let mut tracker = ApplyTracker::new(plan.len(), PROGRESS_INTERVAL, dry_run);
    let mut done = 0;

    for batch in &plan.batches {
        for decision in &batch.decisions {
            log_decision(decision, dry_run);
        }
        if dry_run || batch.is_empty() {
            continue;
        }

        let Some(tag) = batch.tag else {
            error!(label = %batch.label, "No tag id for label '{}'; batch not sent", batch.label);
            tracker.record_failed(batch.decisions.len(), "missing tag");
            continue;
        };

        for (action, ids) in [(SyncAction::Add, &batch.add), (SyncAction::Remove, &batch.remove)] {
            if ids.is_empty() {
                continue;
            }
            let ids: Vec<CatalogId> = ids.iter().copied().collect();
            let result = match action {
                SyncAction::Add => catalog.add_tags(&ids, tag).await,
                SyncAction::Remove => catalog.remove_tags(&ids, tag).await,
            };
            match result {
                Ok(()) => {
                    info!(label = %batch.label, tag = tag.0, action = %action, count = ids.len(), "Updated {} items", ids.len());
                    tracker.record_applied(ids.len());
                }
                Err(e) => {
                    error!(label = %batch.label, tag = tag.0, action = %action, "Tag edit failed for {} items: {}", ids.len(), e);
                    tracker.record_failed(ids.len(), "tag edit failed");
                }
            }
            done += ids.len();
            tracker.log_progress(done);
        }
    }

    tracker.log_summary(&format!("{} '{}' tag sync", catalog.instance_kind(), catalog.instance_name()))
}
