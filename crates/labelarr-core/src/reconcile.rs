//! Computes label changes for one instance in either direction.
//!
//! Planning only reads from the services (plus tag creation when syncing away
//! from the media server). Mutations happen in [`crate::apply`].

use crate::retry::{attempt, TAG_LOOKUP_ATTEMPTS};
use indexmap::{IndexMap, IndexSet};
use labelarr_models::{CatalogId, CatalogRecord, Label, MediaRecord, SyncAction, SyncDecision, TagId};
use labelarr_sources::{CatalogManager, SourceError};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, error, instrument};

/// Media server label changes, keyed by media title.
///
/// A later decision for the same title replaces the earlier one.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ToServerPlan {
    decisions: IndexMap<String, SyncDecision>,
    pub skipped_labels: Vec<String>,
}

impl ToServerPlan {
    pub fn insert(&mut self, decision: SyncDecision) {
        self.decisions.insert(decision.title.clone(), decision);
    }

    pub fn decisions(&self) -> impl Iterator<Item = &SyncDecision> {
        self.decisions.values()
    }

    pub fn get(&self, title: &str) -> Option<&SyncDecision> {
        self.decisions.get(title)
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}

/// Catalog ids to tag and untag for one label.
#[derive(Debug, Clone, Serialize)]
pub struct TagBatch {
    pub label: String,
    /// `None` only in dry runs, when the tag does not exist yet
    pub tag: Option<TagId>,
    pub add: IndexSet<CatalogId>,
    pub remove: IndexSet<CatalogId>,
    pub decisions: Vec<SyncDecision>,
}

impl TagBatch {
    pub fn new(label: &Label, tag: Option<TagId>) -> Self {
        Self {
            label: label.display().to_string(),
            tag,
            add: IndexSet::new(),
            remove: IndexSet::new(),
            decisions: Vec::new(),
        }
    }

    fn record(&mut self, catalog: &CatalogRecord, action: SyncAction) {
        let batch = match action {
            SyncAction::Add => &mut self.add,
            SyncAction::Remove => &mut self.remove,
        };
        if batch.insert(catalog.id) {
            self.decisions
                .push(SyncDecision::new(catalog.title.clone(), catalog.year, self.label.clone(), action));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// Catalog manager tag changes, one batch per label.
#[derive(Debug, Default, Clone, Serialize)]
pub struct FromServerPlan {
    pub batches: Vec<TagBatch>,
    pub skipped_labels: Vec<String>,
}

impl FromServerPlan {
    pub fn decisions(&self) -> impl Iterator<Item = &SyncDecision> {
        self.batches.iter().flat_map(|b| b.decisions.iter())
    }

    pub fn len(&self) -> usize {
        self.batches.iter().map(|b| b.decisions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.iter().all(TagBatch::is_empty)
    }
}

/// Labels with duplicates (by case-insensitive key) removed, first one kept
pub fn unique_labels(labels: &[Label]) -> Vec<&Label> {
    let mut seen = HashSet::new();
    labels
        .iter()
        .filter(|l| !l.key().is_empty() && seen.insert(l.key().to_string()))
        .collect()
}

/// Decide media server changes for one label whose tag is `tag`.
pub fn decide_to_server(pairs: &[(&CatalogRecord, &MediaRecord)], label: &Label, tag: TagId, plan: &mut ToServerPlan) {
    for (catalog, media) in pairs {
        let tagged = catalog.has_tag(tag);
        let labelled = media.has_label(label);
        let action = match (tagged, labelled) {
            (true, false) => SyncAction::Add,
            (false, true) => SyncAction::Remove,
            _ => continue,
        };
        plan.insert(SyncDecision::new(media.title.clone(), media.year, label.display(), action));
    }
}

/// Decide catalog manager changes for one label. A `None` tag is treated as
/// present on no item.
pub fn decide_from_server(pairs: &[(&MediaRecord, &CatalogRecord)], label: &Label, tag: Option<TagId>) -> TagBatch {
    let mut batch = TagBatch::new(label, tag);
    for (media, catalog) in pairs {
        let labelled = media.has_label(label);
        let tagged = tag.map_or(false, |t| catalog.has_tag(t));
        match (labelled, tagged) {
            (true, false) => batch.record(catalog, SyncAction::Add),
            (false, true) => batch.record(catalog, SyncAction::Remove),
            _ => {}
        }
    }
    batch
}

async fn lookup_tag(catalog: &dyn CatalogManager, label: &Label) -> Result<TagId, SourceError> {
    match catalog.get_tag_id_by_name(label.key()).await? {
        Some(id) => Ok(id),
        None => Err(SourceError::NotFound(format!("tag '{}'", label.key()))),
    }
}

/// Resolve each label's tag (retrying the lookup) and decide media server changes.
#[instrument(skip_all, fields(instance = catalog.instance_name()))]
pub async fn plan_to_server(
    catalog: &dyn CatalogManager,
    labels: &[Label],
    pairs: &[(&CatalogRecord, &MediaRecord)],
) -> ToServerPlan {
    let mut plan = ToServerPlan::default();

    for label in unique_labels(labels) {
        let tag = match attempt(TAG_LOOKUP_ATTEMPTS, |_| lookup_tag(catalog, label)).await {
            Ok(tag) => tag,
            Err(exhausted) => {
                error!(
                    label = label.display(),
                    "Unable to find tag id for label '{}' after {} attempts: {}",
                    label,
                    exhausted.attempts,
                    exhausted.last
                );
                plan.skipped_labels.push(label.display().to_string());
                continue;
            }
        };
        debug!(label = label.display(), tag = tag.0, "Resolved tag");
        decide_to_server(pairs, label, tag, &mut plan);
    }

    plan
}

/// Resolve (or create) each label's tag and decide catalog manager changes.
///
/// Dry runs only look tags up; a missing tag is planned as if it existed on
/// no item and is not created.
#[instrument(skip_all, fields(instance = catalog.instance_name(), dry_run = dry_run))]
pub async fn plan_from_server(
    catalog: &dyn CatalogManager,
    labels: &[Label],
    pairs: &[(&MediaRecord, &CatalogRecord)],
    dry_run: bool,
) -> FromServerPlan {
    let mut plan = FromServerPlan::default();

    for label in unique_labels(labels) {
        let resolved = if dry_run {
            catalog.get_tag_id_by_name(label.key()).await
        } else {
            catalog.get_or_create_tag_id(label.key()).await.map(Some)
        };
        let tag = match resolved {
            Ok(tag) => tag,
            Err(e) => {
                error!(label = label.display(), "Unable to resolve tag for label '{}': {}", label, e);
                plan.skipped_labels.push(label.display().to_string());
                continue;
            }
        };
        debug!(label = label.display(), tag = ?tag, "Resolved tag");
        plan.batches.push(decide_from_server(pairs, label, tag));
    }

    plan
}
