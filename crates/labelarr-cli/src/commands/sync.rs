use crate::commands::config::{load_config, load_credentials};
use crate::commands::sync_ui::SyncUI;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Color, Table};
use labelarr_config::{Config, SyncDirection};
use labelarr_core::{LabelSyncOrchestrator, SyncResult};
use labelarr_models::Label;
use labelarr_sources::SourceFactory;
use owo_colors::OwoColorize;
use std::path::Path;

/// Command-line overrides for the `[sync]` section
#[derive(Debug, Default, Clone)]
pub struct SyncOverrides {
    pub dry_run: bool,
    pub direction: Option<SyncDirection>,
    pub labels: Vec<String>,
}

impl SyncOverrides {
    /// `--dry-run` can only turn dry run on. `--label` replaces the configured labels.
    pub fn apply(&self, config: &mut Config) {
        if self.dry_run {
            config.sync.dry_run = true;
        }
        if let Some(direction) = self.direction {
            config.sync.direction = direction;
        }
        if !self.labels.is_empty() {
            config.sync.labels = self.labels.iter().map(|l| Label::new(l)).collect();
        }
    }
}

pub async fn run_sync(overrides: SyncOverrides, config_path: Option<&Path>, output: &Output) -> Result<()> {
    let (mut config, path) = load_config(config_path)?;
    overrides.apply(&mut config);
    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration in {}: {}", path.display(), e))?;
    let credentials = load_credentials(&path)?;

    let server = SourceFactory::create_media_server(&config, &credentials).map_err(|e| eyre!("{:#}", e))?;
    let catalogs = SourceFactory::create_catalog_managers(&config, &credentials).map_err(|e| eyre!("{:#}", e))?;
    if catalogs.is_empty() {
        output.warn("No Radarr or Sonarr instances selected under [sync]; nothing to do");
        return Ok(());
    }

    let mut orchestrator = LabelSyncOrchestrator::new(server, catalogs, config.sync);
    let options = orchestrator.options();
    tracing::info!(
        operation = "sync_start",
        direction = %options.direction,
        dry_run = options.dry_run,
        instances = ?orchestrator.instance_names(),
        labels = ?options.labels.iter().map(|l| l.display()).collect::<Vec<_>>(),
        "Starting label sync"
    );

    let ui = SyncUI::new(!output.is_json() && !output.is_quiet());
    let result = orchestrator
        .sync_with_progress(|position, total, name| ui.start_instance(position, total, name))
        .await;
    ui.finish();
    let result = result.map_err(|e| eyre!("{:#}", e))?;

    if output.is_json() {
        output.json(&serde_json::to_value(&result)?);
    } else if !output.is_quiet() {
        print_summary(&result);
    }

    for error in &result.errors {
        output.error(error);
    }
    if result.errors.is_empty() {
        output.success(if result.dry_run {
            "Dry run complete, no changes were made"
        } else {
            "Label sync complete"
        });
    }
    Ok(())
}

fn print_summary(result: &SyncResult) {
    let mode = if result.dry_run { "dry run" } else { "live" };
    println!(
        "\n{} ({}, {})\n",
        "Label Sync Summary".bright_cyan().bold(),
        result.direction,
        mode
    );

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Instance").fg(Color::Cyan),
        Cell::new("Catalog").fg(Color::Cyan),
        Cell::new("Media").fg(Color::Cyan),
        Cell::new("Matched").fg(Color::Cyan),
        Cell::new("Decisions").fg(Color::Cyan),
        Cell::new("Applied").fg(Color::Cyan),
        Cell::new("Skipped").fg(Color::Cyan),
        Cell::new("Failed").fg(Color::Cyan),
    ]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    for report in &result.instances {
        let name = format!("{} ({})", report.instance, report.kind);
        let name_cell = if report.is_failed() {
            Cell::new(name).fg(Color::Red)
        } else {
            Cell::new(name)
        };
        table.add_row(vec![
            name_cell,
            Cell::new(report.catalog_items),
            Cell::new(report.media_items),
            Cell::new(report.matched),
            Cell::new(report.apply.decisions),
            Cell::new(report.apply.applied),
            Cell::new(report.apply.skipped),
            Cell::new(report.apply.failed),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(comfy_table::Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(result.totals.decisions),
        Cell::new(result.totals.applied),
        Cell::new(result.totals.skipped),
        Cell::new(result.totals.failed),
    ]);
    println!("{}", table);

    for report in &result.instances {
        if !report.ambiguous.is_empty() {
            println!(
                "{} {}: ambiguous titles {}",
                "⚠".yellow(),
                report.instance,
                report.ambiguous.join(", ")
            );
        }
        if !report.skipped_labels.is_empty() {
            println!(
                "{} {}: skipped labels {}",
                "⚠".yellow(),
                report.instance,
                report.skipped_labels.join(", ")
            );
        }
    }
    println!("Finished in {:.2}s\n", result.duration.as_secs_f64());
}
