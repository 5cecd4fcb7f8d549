use crate::plex::api::{PlexHttpClient, PlexItem};
use crate::traits::MediaServer;
use crate::SourceError;
use async_trait::async_trait;
use labelarr_config::includes_library;
use labelarr_models::{MediaKind, MediaRecord};
use tracing::{debug, info};

pub struct PlexClient {
    api: PlexHttpClient,
    server_url: String,
}

impl PlexClient {
    pub fn new(server_url: &str, token: &str) -> Result<Self, SourceError> {
        if server_url.trim().is_empty() {
            return Err(SourceError::Connection("Plex URL is empty".to_string()));
        }
        let api = PlexHttpClient::new(token)
            .map_err(|e| SourceError::Unauthorized(e.to_string()))?;
        Ok(Self {
            api,
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    fn to_record(item: PlexItem) -> MediaRecord {
        MediaRecord::new(item.rating_key, item.title, item.year, item.labels)
    }

    /// Fresh copy of an item, needed for its section id and its labels in original case
    async fn fetch_item(&self, item: &MediaRecord) -> Result<(PlexItem, String), SourceError> {
        let fresh = self
            .api
            .get_metadata_item(&self.server_url, &item.rating_key)
            .await
            .map_err(|_| SourceError::NotFound(format!("Plex item '{}' ({})", item.title, item.rating_key)))?;
        let section_id = fresh
            .library_section_id
            .clone()
            .ok_or_else(|| SourceError::new(format!("Plex item '{}' has no library section", item.title)))?;
        Ok((fresh, section_id))
    }
}

#[async_trait]
impl MediaServer for PlexClient {
    fn server_name(&self) -> &str {
        "Plex"
    }

    async fn connect(&mut self) -> Result<(), SourceError> {
        let status = self.api.check_server(&self.server_url).await?;
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SourceError::Unauthorized("Plex URL or token is incorrect".to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::Connection(format!("Plex returned {} for {}", status, self.server_url)));
        }
        info!("Connected to Plex at {}", self.server_url);
        Ok(())
    }

    async fn list_library_items(&self, library_names: &[String], kind: MediaKind) -> Result<Vec<MediaRecord>, SourceError> {
        let libraries = self.api.get_libraries(&self.server_url).await?;

        let mut records = Vec::new();
        for library in libraries.iter().filter(|l| l.type_ == kind.plex_type()) {
            if !includes_library(library_names, &library.title) {
                debug!("Plex: Skipping library '{}' (not in library_names)", library.title);
                continue;
            }

            let items = self
                .api
                .get_section_items(&self.server_url, &library.key, kind.plex_type_number())
                .await?;
            info!("Plex: Read {} items from library '{}'", items.len(), library.title);
            records.extend(items.into_iter().map(Self::to_record));
        }

        Ok(records)
    }

    async fn search_item(&self, title: &str, year: Option<u32>, kind: MediaKind) -> Result<Vec<MediaRecord>, SourceError> {
        let items = self
            .api
            .search(&self.server_url, title, year, kind.plex_type_number())
            .await?;
        Ok(items.into_iter().map(Self::to_record).collect())
    }

    async fn add_label(&self, item: &MediaRecord, label: &str) -> Result<(), SourceError> {
        let (fresh, section_id) = self.fetch_item(item).await?;
        let type_num = fresh.type_number();

        let mut labels = fresh.labels.clone();
        if labels.iter().any(|l| l.eq_ignore_ascii_case(label)) {
            debug!("Plex: '{}' already labelled '{}'", item.title, label);
            return Ok(());
        }
        labels.push(label.to_string());

        self.api
            .set_labels(&self.server_url, &section_id, &fresh.rating_key, type_num, &labels)
            .await?;
        Ok(())
    }

    async fn remove_label(&self, item: &MediaRecord, label: &str) -> Result<(), SourceError> {
        let (fresh, section_id) = self.fetch_item(item).await?;
        let type_num = fresh.type_number();

        // Plex matches the removal by exact tag text
        let existing: Vec<String> = fresh
            .labels
            .iter()
            .filter(|l| l.eq_ignore_ascii_case(label))
            .cloned()
            .collect();
        if existing.is_empty() {
            debug!("Plex: '{}' has no label '{}'", item.title, label);
            return Ok(());
        }

        self.api
            .remove_labels(&self.server_url, &section_id, &fresh.rating_key, type_num, &existing)
            .await?;
        Ok(())
    }
}
