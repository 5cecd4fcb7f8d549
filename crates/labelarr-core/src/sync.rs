use crate::apply::{apply_from_server, apply_to_server};
use crate::correlate::{ambiguous_keys, correlate, correlate_media_major};
use crate::progress::ApplyReport;
use crate::reconcile::{plan_from_server, plan_to_server};
use anyhow::Result;
use labelarr_config::{SyncDirection, SyncOptions};
use labelarr_models::{InstanceKind, SyncDecision};
use labelarr_sources::{CatalogManager, MediaServer};
use serde::{Serialize, Serializer};
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

/// Runs one label sync pass over every configured instance
pub struct LabelSyncOrchestrator {
    server: Box<dyn MediaServer>,
    catalogs: Vec<Box<dyn CatalogManager>>,
    options: SyncOptions,
    connected: bool,
}

/// Outcome for a single Radarr or Sonarr instance
#[derive(Debug, Clone, Serialize)]
pub struct InstanceReport {
    pub instance: String,
    pub kind: InstanceKind,
    pub catalog_items: usize,
    pub media_items: usize,
    pub matched: usize,
    /// Normalized titles (with year) that paired more than one item
    pub ambiguous: Vec<String>,
    pub skipped_labels: Vec<String>,
    pub decisions: Vec<SyncDecision>,
    pub apply: ApplyReport,
    /// Set when the instance could not be processed at all
    pub error: Option<String>,
}

impl InstanceReport {
    fn new(catalog: &dyn CatalogManager) -> Self {
        Self {
            instance: catalog.instance_name().to_string(),
            kind: catalog.instance_kind(),
            catalog_items: 0,
            media_items: 0,
            matched: 0,
            ambiguous: Vec::new(),
            skipped_labels: Vec::new(),
            decisions: Vec::new(),
            apply: ApplyReport::default(),
            error: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    pub dry_run: bool,
    pub direction: SyncDirection,
    pub instances: Vec<InstanceReport>,
    #[serde(flatten)]
    pub totals: ApplyReport,
    #[serde(rename = "duration_seconds", serialize_with = "serialize_seconds")]
    pub duration: Duration,
    pub errors: Vec<String>,
}

fn serialize_seconds<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl LabelSyncOrchestrator {
    pub fn new(server: Box<dyn MediaServer>, catalogs: Vec<Box<dyn CatalogManager>>, options: SyncOptions) -> Self {
        Self {
            server,
            catalogs,
            options,
            connected: false,
        }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn instance_names(&self) -> Vec<String> {
        self.catalogs.iter().map(|c| c.instance_name().to_string()).collect()
    }

    /// Connect to the media server. A failure here aborts the run.
    pub async fn connect(&mut self) -> Result<()> {
        self.server.connect().await.map_err(|e| {
            anyhow::anyhow!("Unable to connect to {}: {}", self.server.server_name(), e)
        })?;
        self.connected = true;
        Ok(())
    }

    pub async fn sync(&mut self) -> Result<SyncResult> {
        self.sync_with_progress(|_, _, _| {}).await
    }

    /// Run every instance in order. `on_instance` is called with the 1-based
    /// position, the instance count and the instance name before each one.
    #[instrument(skip_all, fields(operation = "sync", dry_run = self.options.dry_run, direction = %self.options.direction))]
    pub async fn sync_with_progress<F>(&mut self, mut on_instance: F) -> Result<SyncResult>
    where
        F: FnMut(usize, usize, &str),
    {
        let start = Instant::now();
        if self.options.dry_run {
            warn!(dry_run = true, "Dry run enabled: no labels or tags will be changed");
        }
        if !self.connected {
            self.connect().await?;
        }

        let total = self.catalogs.len();
        let mut instances = Vec::with_capacity(total);
        for (idx, catalog) in self.catalogs.iter().enumerate() {
            on_instance(idx + 1, total, catalog.instance_name());
            instances.push(self.sync_instance(catalog.as_ref()).await);
        }

        let mut totals = ApplyReport::default();
        let mut errors = Vec::new();
        for report in &instances {
            totals.merge(&report.apply);
            if let Some(e) = &report.error {
                errors.push(format!("{} '{}': {}", report.kind, report.instance, e));
            }
        }

        let duration = start.elapsed();
        info!(
            operation = "sync_complete",
            instances = instances.len(),
            decisions = totals.decisions,
            applied = totals.applied,
            failed = totals.failed,
            duration_secs = duration.as_secs_f64(),
            "Label sync finished in {:.2}s",
            duration.as_secs_f64()
        );

        Ok(SyncResult {
            dry_run: self.options.dry_run,
            direction: self.options.direction,
            instances,
            totals,
            duration,
            errors,
        })
    }

    /// Read both sides, plan one direction and apply it for a single instance.
    ///
    /// Listing failures are recorded in the report instead of aborting the run.
    #[instrument(skip_all, fields(instance = catalog.instance_name(), kind = %catalog.instance_kind()))]
    pub async fn sync_instance(&self, catalog: &dyn CatalogManager) -> InstanceReport {
        let mut report = InstanceReport::new(catalog);
        let kind = catalog.instance_kind();
        let media_kind = kind.media_kind();
        info!("Processing {} instance '{}'", kind, catalog.instance_name());

        let catalog_records = match catalog.list_media().await {
            Ok(records) => records,
            Err(e) => {
                error!("Unable to read {} '{}': {}", kind, catalog.instance_name(), e);
                report.error = Some(e.to_string());
                return report;
            }
        };
        let media_records = match self
            .server
            .list_library_items(&self.options.library_names, media_kind)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                error!("Unable to read {} {} libraries: {}", self.server.server_name(), media_kind, e);
                report.error = Some(e.to_string());
                return report;
            }
        };
        report.catalog_items = catalog_records.len();
        report.media_items = media_records.len();

        report.ambiguous = ambiguous_keys(&catalog_records, &media_records)
            .into_iter()
            .map(|(title, year)| match year {
                Some(y) => format!("{} ({})", title, y),
                None => title,
            })
            .collect();
        if !report.ambiguous.is_empty() {
            warn!(
                "{} titles match more than one item and every pairing will be used: {}",
                report.ambiguous.len(),
                report.ambiguous.join(", ")
            );
        }

        let dry_run = self.options.dry_run;
        match self.options.direction {
            SyncDirection::ToMediaServer => {
                let pairs = correlate(&catalog_records, &media_records);
                report.matched = pairs.len();
                let plan = plan_to_server(catalog, &self.options.labels, &pairs).await;
                report.apply = apply_to_server(self.server.as_ref(), media_kind, &plan, dry_run).await;
                report.skipped_labels = plan.skipped_labels.clone();
                report.decisions = plan.decisions().cloned().collect();
            }
            SyncDirection::FromMediaServer => {
                let pairs = correlate_media_major(&media_records, &catalog_records);
                report.matched = pairs.len();
                let plan = plan_from_server(catalog, &self.options.labels, &pairs, dry_run).await;
                report.apply = apply_from_server(catalog, &plan, dry_run).await;
                report.skipped_labels = plan.skipped_labels.clone();
                report.decisions = plan.decisions().cloned().collect();
            }
        }

        info!(
            matched = report.matched,
            decisions = report.decisions.len(),
            "{} '{}': {} matched items, {} decisions",
            kind,
            report.instance,
            report.matched,
            report.decisions.len()
        );
        report
    }
}
