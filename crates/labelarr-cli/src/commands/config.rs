use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use labelarr_config::{includes_all_libraries, Config, CredentialStore, PathManager};
use labelarr_sources::mask_secret;
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::{Path, PathBuf};

pub fn run_config(cmd: crate::ConfigCommands, config_path: Option<&Path>, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(full, config_path, output),
        crate::ConfigCommands::Init { force } => init_config(force, config_path, output),
    }
}

/// `--config` if given, otherwise the default location
pub fn config_file(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathManager::default().config_file())
}

/// Credentials live next to the config file
pub fn credentials_file(config_file: &Path) -> PathBuf {
    config_file
        .parent()
        .map(|dir| dir.join("credentials.toml"))
        .unwrap_or_else(|| PathManager::default().credentials_file())
}

pub fn load_config(config_path: Option<&Path>) -> Result<(Config, PathBuf)> {
    let path = config_file(config_path);
    if !path.exists() {
        return Err(eyre!(
            "Configuration file not found at {}. Run 'labelarr config init' to create one.",
            path.display()
        ));
    }
    let config = Config::load_from_file(&path)
        .map_err(|e| eyre!("Failed to load config from {}: {}", path.display(), e))?;
    Ok((config, path))
}

pub fn load_credentials(config_file: &Path) -> Result<CredentialStore> {
    let path = credentials_file(config_file);
    let mut store = CredentialStore::new(path.clone());
    store
        .load()
        .map_err(|e| eyre!("Failed to load credentials from {}: {}", path.display(), e))?;
    Ok(store)
}

fn secret_display(secret: Option<&String>, full: bool) -> String {
    match secret {
        None => "<not set>".to_string(),
        Some(s) if full => s.clone(),
        Some(s) => mask_secret(s),
    }
}

fn styled_table(title: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(title).fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
    ]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn show_config(full: bool, config_path: Option<&Path>, output: &Output) -> Result<()> {
    let (config, path) = load_config(config_path)?;
    let credentials = load_credentials(&path)?;
    let plex_token = config.plex.token.as_ref().or_else(|| credentials.get_plex_token());

    let instance_json = |instances: &[labelarr_config::InstanceConfig]| {
        instances
            .iter()
            .map(|i| {
                let key = i.api_key.as_ref().or_else(|| credentials.get_instance_api_key(&i.name));
                json!({
                    "name": i.name,
                    "url": i.url,
                    "api_key": secret_display(key, full),
                })
            })
            .collect::<Vec<_>>()
    };

    if output.is_json() {
        output.json(&json!({
            "config_file": path.display().to_string(),
            "plex": {
                "url": config.plex.url,
                "token": secret_display(plex_token, full),
            },
            "instances": {
                "radarr": instance_json(&config.instances.radarr),
                "sonarr": instance_json(&config.instances.sonarr),
            },
            "sync": config.sync,
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    println!("\n{}", "Configuration".bright_cyan().bold());
    println!("{} {}\n", "File:".bold(), path.display());

    let mut plex_table = styled_table("Plex");
    plex_table.add_row(vec![Cell::new("URL"), Cell::new(&config.plex.url)]);
    plex_table.add_row(vec![Cell::new("Token"), Cell::new(secret_display(plex_token, full))]);
    println!("{}\n", plex_table);

    let mut instance_table = Table::new();
    instance_table.set_header(vec!["Kind", "Name", "URL", "API key", "Selected"]);
    instance_table.load_preset(comfy_table::presets::UTF8_FULL);
    instance_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    for (kind, instances, selected) in [
        ("Radarr", &config.instances.radarr, &config.sync.radarr),
        ("Sonarr", &config.instances.sonarr, &config.sync.sonarr),
    ] {
        for instance in instances {
            let key = instance
                .api_key
                .as_ref()
                .or_else(|| credentials.get_instance_api_key(&instance.name));
            let is_selected = selected.contains(&instance.name);
            instance_table.add_row(vec![
                Cell::new(kind),
                Cell::new(&instance.name),
                Cell::new(&instance.url),
                Cell::new(secret_display(key, full)),
                Cell::new(if is_selected { "✓".green().to_string() } else { "✗".red().to_string() }),
            ]);
        }
    }
    println!("{}\n", instance_table);

    let sync = &config.sync;
    let mut sync_table = styled_table("Sync Options");
    sync_table.add_row(vec![Cell::new("Direction"), Cell::new(sync.direction.to_string())]);
    sync_table.add_row(vec![Cell::new("Dry run"), Cell::new(sync.dry_run.to_string())]);
    sync_table.add_row(vec![
        Cell::new("Labels"),
        Cell::new(sync.labels.iter().map(|l| l.display()).collect::<Vec<_>>().join(", ")),
    ]);
    let libraries = if includes_all_libraries(&sync.library_names) {
        "All".to_string()
    } else {
        sync.library_names.join(", ")
    };
    sync_table.add_row(vec![Cell::new("Libraries"), Cell::new(libraries)]);
    println!("{}", sync_table);

    if let Err(e) = config.validate() {
        output.warn(format!("Configuration is not valid: {}", e));
    }
    Ok(())
}

fn init_config(force: bool, config_path: Option<&Path>, output: &Output) -> Result<()> {
    let path = config_file(config_path);
    if path.exists() && !force {
        return Err(eyre!(
            "Configuration file already exists at {}. Use --force to overwrite it.",
            path.display()
        ));
    }
    if config_path.is_none() {
        PathManager::default()
            .ensure_directories()
            .map_err(|e| eyre!("Failed to create config directories: {}", e))?;
    }

    Config::template()
        .save_to_file(&path)
        .map_err(|e| eyre!("Failed to write config to {}: {}", path.display(), e))?;

    output.success(format!("Wrote template configuration to {}", path.display()));
    output.info(format!(
        "Add your Plex token and API keys to it, or to {}",
        credentials_file(&path).display()
    ));
    Ok(())
}
