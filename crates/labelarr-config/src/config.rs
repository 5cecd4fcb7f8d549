use labelarr_models::{InstanceKind, Label};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub plex: PlexConfig,
    #[serde(default)]
    pub instances: InstancesConfig,
    pub sync: SyncOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlexConfig {
    pub url: String,
    /// Falls back to `plex_token` in the credentials file when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstancesConfig {
    #[serde(default)]
    pub radarr: Vec<InstanceConfig>,
    #[serde(default)]
    pub sonarr: Vec<InstanceConfig>,
}

/// Connection settings for one Radarr or Sonarr instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    pub name: String,
    pub url: String,
    /// Falls back to `<name>_api_key` in the credentials file when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncDirection {
    /// Catalog manager tags are pushed to media server labels
    #[default]
    #[serde(alias = "to_plex")]
    ToMediaServer,
    /// Media server labels are pushed to catalog manager tags
    #[serde(alias = "from_plex")]
    FromMediaServer,
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncDirection::ToMediaServer => f.write_str("to_media_server"),
            SyncDirection::FromMediaServer => f.write_str("from_media_server"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOptions {
    #[serde(default = "default_true")]
    pub dry_run: bool,
    pub labels: Vec<Label>,
    #[serde(default)]
    pub direction: SyncDirection,
    /// Media server libraries to read from. Empty, or containing "All", means every library.
    #[serde(default)]
    pub library_names: Vec<String>,
    /// Names of the Radarr instances to process
    #[serde(default)]
    pub radarr: Vec<String>,
    /// Names of the Sonarr instances to process
    #[serde(default)]
    pub sonarr: Vec<String>,
}

/// Empty, or containing "All", selects every library
pub fn includes_all_libraries(library_names: &[String]) -> bool {
    library_names.is_empty() || library_names.iter().any(|n| n.trim().eq_ignore_ascii_case("all"))
}

/// Whether a media server library with this title should be read
pub fn includes_library(library_names: &[String], title: &str) -> bool {
    includes_all_libraries(library_names)
        || library_names
            .iter()
            .any(|n| n.trim().eq_ignore_ascii_case(title.trim()))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("plex.url is required")]
    MissingPlexUrl,
    #[error("sync.labels must contain at least one label")]
    NoLabels,
    #[error("{kind} instance '{name}' is selected in [sync] but not defined under [instances]")]
    UnknownInstance { kind: InstanceKind, name: String },
    #[error("{kind} instance '{name}' has an empty url")]
    MissingInstanceUrl { kind: InstanceKind, name: String },
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plex.url.trim().is_empty() {
            return Err(ConfigError::MissingPlexUrl);
        }
        if self.sync.labels.iter().all(|l| l.key().is_empty()) {
            return Err(ConfigError::NoLabels);
        }

        for (kind, names) in [
            (InstanceKind::Radarr, &self.sync.radarr),
            (InstanceKind::Sonarr, &self.sync.sonarr),
        ] {
            for name in names {
                let instance = self
                    .instance(kind, name)
                    .ok_or_else(|| ConfigError::UnknownInstance { kind, name: name.clone() })?;
                if instance.url.trim().is_empty() {
                    return Err(ConfigError::MissingInstanceUrl { kind, name: name.clone() });
                }
            }
        }

        Ok(())
    }

    pub fn instance(&self, kind: InstanceKind, name: &str) -> Option<&InstanceConfig> {
        let defined = match kind {
            InstanceKind::Radarr => &self.instances.radarr,
            InstanceKind::Sonarr => &self.instances.sonarr,
        };
        defined.iter().find(|i| i.name == name)
    }

    /// Instances selected for this run, Radarr first, in the order listed under [sync]
    pub fn selected_instances(&self) -> Vec<(InstanceKind, &InstanceConfig)> {
        let mut selected = Vec::new();
        for (kind, names) in [
            (InstanceKind::Radarr, &self.sync.radarr),
            (InstanceKind::Sonarr, &self.sync.sonarr),
        ] {
            for name in names {
                if let Some(instance) = self.instance(kind, name) {
                    selected.push((kind, instance));
                }
            }
        }
        selected
    }

    /// Starting point written by `labelarr config init`
    pub fn template() -> Self {
        Self {
            plex: PlexConfig {
                url: "http://localhost:32400".to_string(),
                token: None,
            },
            instances: InstancesConfig {
                radarr: vec![InstanceConfig {
                    name: "radarr_1".to_string(),
                    url: "http://localhost:7878".to_string(),
                    api_key: None,
                }],
                sonarr: vec![InstanceConfig {
                    name: "sonarr_1".to_string(),
                    url: "http://localhost:8989".to_string(),
                    api_key: None,
                }],
            },
            sync: SyncOptions {
                dry_run: true,
                labels: vec![Label::new("kids")],
                direction: SyncDirection::ToMediaServer,
                library_names: vec!["Movies".to_string(), "TV Shows".to_string()],
                radarr: vec!["radarr_1".to_string()],
                sonarr: vec!["sonarr_1".to_string()],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::template();
        config.plex.token = Some("plex_token".to_string());
        config.sync.direction = SyncDirection::FromMediaServer;

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.plex.token.as_deref(), Some("plex_token"));
        assert_eq!(loaded.sync.direction, SyncDirection::FromMediaServer);
        assert_eq!(loaded.sync.labels, vec![Label::new("kids")]);
        assert_eq!(loaded.instances.radarr[0].name, "radarr_1");
        assert_eq!(loaded.sync.dry_run, true);
    }

    #[test]
    fn test_config_parses_defaults_and_aliases() {
        let toml_str = r#"
            [plex]
            url = "http://plex:32400"

            [[instances.radarr]]
            name = "radarr_4k"
            url = "http://radarr:7878"
            api_key = "abc"

            [sync]
            labels = ["kids", "Anime"]
            direction = "from_plex"
            radarr = ["radarr_4k"]
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.sync.dry_run);
        assert_eq!(config.sync.direction, SyncDirection::FromMediaServer);
        assert_eq!(config.sync.labels[1].display(), "Anime");
        assert!(config.instances.sonarr.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::template();
        assert!(config.validate().is_ok());

        config.sync.sonarr.push("sonarr_missing".to_string());
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownInstance {
                kind: InstanceKind::Sonarr,
                name: "sonarr_missing".to_string(),
            })
        );

        config.sync.sonarr.pop();
        config.sync.labels.clear();
        assert_eq!(config.validate(), Err(ConfigError::NoLabels));

        config.sync.labels.push(Label::new("kids"));
        config.instances.radarr[0].url = " ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::MissingInstanceUrl { .. })));

        config.plex.url = String::new();
        assert_eq!(config.validate(), Err(ConfigError::MissingPlexUrl));
    }

    #[test]
    fn test_selected_instances_order() {
        let mut config = Config::template();
        config.instances.radarr.push(InstanceConfig {
            name: "radarr_4k".to_string(),
            url: "http://localhost:7879".to_string(),
            api_key: None,
        });
        config.sync.radarr = vec!["radarr_4k".to_string(), "radarr_1".to_string()];

        let selected: Vec<_> = config
            .selected_instances()
            .into_iter()
            .map(|(kind, i)| (kind, i.name.as_str()))
            .collect();
        assert_eq!(
            selected,
            vec![
                (InstanceKind::Radarr, "radarr_4k"),
                (InstanceKind::Radarr, "radarr_1"),
                (InstanceKind::Sonarr, "sonarr_1"),
            ]
        );
    }

    #[test]
    fn test_library_filter() {
        let mut names = Config::template().sync.library_names;
        assert!(includes_library(&names, "movies"));
        assert!(!includes_library(&names, "Anime"));
        assert!(!includes_all_libraries(&names));

        names.push("All".to_string());
        assert!(includes_library(&names, "Anime"));

        names.clear();
        assert!(includes_all_libraries(&names));
    }
}
