use async_trait::async_trait;
use labelarr_models::{CatalogId, CatalogRecord, InstanceKind, MediaKind, MediaRecord, TagId};
use crate::SourceError;

/// The media server hosting the user-facing library (Plex)
#[async_trait]
pub trait MediaServer: Send + Sync {
    fn server_name(&self) -> &str;

    /// Verify URL and credentials. Failure here is fatal for a run.
    async fn connect(&mut self) -> Result<(), SourceError>;

    // Data retrieval
    /// All items of `kind` in the named libraries (empty or "All" = every library)
    async fn list_library_items(&self, library_names: &[String], kind: MediaKind) -> Result<Vec<MediaRecord>, SourceError>;
    async fn search_item(&self, title: &str, year: Option<u32>, kind: MediaKind) -> Result<Vec<MediaRecord>, SourceError>;

    // Data modification
    async fn add_label(&self, item: &MediaRecord, label: &str) -> Result<(), SourceError>;
    async fn remove_label(&self, item: &MediaRecord, label: &str) -> Result<(), SourceError>;
}

/// A catalog manager instance (Radarr or Sonarr)
#[async_trait]
pub trait CatalogManager: Send + Sync {
    fn instance_name(&self) -> &str;
    fn instance_kind(&self) -> InstanceKind;

    // Data retrieval
    async fn list_media(&self) -> Result<Vec<CatalogRecord>, SourceError>;
    /// `Ok(None)` when no tag with this label exists
    async fn get_tag_id_by_name(&self, label: &str) -> Result<Option<TagId>, SourceError>;

    // Data modification
    /// Look the tag up and create it when missing
    async fn get_or_create_tag_id(&self, label: &str) -> Result<TagId, SourceError>;
    async fn add_tags(&self, media_ids: &[CatalogId], tag: TagId) -> Result<(), SourceError>;
    async fn remove_tags(&self, media_ids: &[CatalogId], tag: TagId) -> Result<(), SourceError>;
}
