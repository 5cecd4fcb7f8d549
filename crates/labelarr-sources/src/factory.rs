//! Builds the media server and catalog manager clients from configuration
//!
//! Secrets missing from config.toml are looked up in the credential store.

use anyhow::{anyhow, Result};
use labelarr_config::{Config, CredentialStore, InstanceConfig};
use labelarr_models::InstanceKind;
use tracing::debug;
use crate::{ArrClient, CatalogManager, MediaServer, PlexClient};

pub struct SourceFactory;

impl SourceFactory {
    /// The Plex client for `[plex]`. Not yet connected.
    pub fn create_media_server(config: &Config, credentials: &CredentialStore) -> Result<Box<dyn MediaServer>> {
        let token = config
            .plex
            .token
            .clone()
            .or_else(|| credentials.get_plex_token().cloned())
            .ok_or_else(|| anyhow!("Plex token not found. Set plex.token in config.toml or plex_token in the credentials file"))?;

        debug!("Plex token: {}", mask_secret(&token));
        let client = PlexClient::new(&config.plex.url, &token)?;
        Ok(Box::new(client))
    }

    /// One client per instance selected under `[sync]`, Radarr first
    pub fn create_catalog_managers(config: &Config, credentials: &CredentialStore) -> Result<Vec<Box<dyn CatalogManager>>> {
        config
            .selected_instances()
            .into_iter()
            .map(|(kind, instance)| Self::create_catalog_manager(kind, instance, credentials))
            .collect()
    }

    pub fn create_catalog_manager(
        kind: InstanceKind,
        instance: &InstanceConfig,
        credentials: &CredentialStore,
    ) -> Result<Box<dyn CatalogManager>> {
        let api_key = instance
            .api_key
            .clone()
            .or_else(|| credentials.get_instance_api_key(&instance.name).cloned())
            .ok_or_else(|| {
                anyhow!(
                    "API key for {} instance '{}' not found. Set api_key in config.toml or {}_api_key in the credentials file",
                    kind,
                    instance.name,
                    instance.name
                )
            })?;

        debug!("{} '{}' API key: {}", kind, instance.name, mask_secret(&api_key));
        let client = ArrClient::new(&instance.name, kind, &instance.url, &api_key)?;
        Ok(Box::new(client))
    }
}

/// Hide all but the last five characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let len = secret.chars().count();
    if len <= 5 {
        return "*".repeat(len);
    }
    let visible: String = secret.chars().skip(len - 5).collect();
    format!("{}{}", "*".repeat(len - 5), visible)
}
