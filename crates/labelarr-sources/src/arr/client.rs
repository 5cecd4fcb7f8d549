use crate::arr::api::{ApplyTags, ArrHttpClient, ArrMedia, ArrTag};
use crate::traits::CatalogManager;
use crate::SourceError;
use async_trait::async_trait;
use labelarr_models::{CatalogId, CatalogRecord, InstanceKind, TagId};
use tracing::{debug, info};

/// One Radarr or Sonarr instance
pub struct ArrClient {
    name: String,
    kind: InstanceKind,
    api: ArrHttpClient,
}

impl ArrClient {
    pub fn new(name: &str, kind: InstanceKind, base_url: &str, api_key: &str) -> Result<Self, SourceError> {
        if base_url.trim().is_empty() {
            return Err(SourceError::Connection(format!("{} instance '{}' has no url", kind, name)));
        }
        let api = ArrHttpClient::new(base_url, api_key, kind)
            .map_err(|e| SourceError::Unauthorized(e.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            kind,
            api,
        })
    }

    fn to_record(media: ArrMedia) -> CatalogRecord {
        CatalogRecord::new(media.id, media.title, media.year, media.tags)
    }

    fn raw_ids(media_ids: &[CatalogId]) -> Vec<u64> {
        media_ids.iter().map(|id| id.0).collect()
    }
}

/// Tag labels are compared without regard to case
fn find_tag(tags: &[ArrTag], label: &str) -> Option<TagId> {
    let label = label.trim();
    tags.iter()
        .find(|t| t.label.trim().eq_ignore_ascii_case(label))
        .map(|t| TagId(t.id))
}

#[async_trait]
impl CatalogManager for ArrClient {
    fn instance_name(&self) -> &str {
        &self.name
    }

    fn instance_kind(&self) -> InstanceKind {
        self.kind
    }

    async fn list_media(&self) -> Result<Vec<CatalogRecord>, SourceError> {
        let media = self.api.get_media().await?;
        info!("{} '{}': Read {} items", self.kind, self.name, media.len());
        Ok(media.into_iter().map(Self::to_record).collect())
    }

    async fn get_tag_id_by_name(&self, label: &str) -> Result<Option<TagId>, SourceError> {
        let tags = self.api.get_tags().await?;
        Ok(find_tag(&tags, label))
    }

    async fn get_or_create_tag_id(&self, label: &str) -> Result<TagId, SourceError> {
        if let Some(id) = self.get_tag_id_by_name(label).await? {
            debug!("{} '{}': Tag '{}' has id {}", self.kind, self.name, label, id);
            return Ok(id);
        }
        let created = self.api.create_tag(label).await?;
        info!("{} '{}': Created tag '{}' (id {})", self.kind, self.name, created.label, created.id);
        Ok(TagId(created.id))
    }

    async fn add_tags(&self, media_ids: &[CatalogId], tag: TagId) -> Result<(), SourceError> {
        if media_ids.is_empty() {
            return Ok(());
        }
        self.api
            .edit_tags(&Self::raw_ids(media_ids), tag.0, ApplyTags::Add)
            .await?;
        Ok(())
    }

    async fn remove_tags(&self, media_ids: &[CatalogId], tag: TagId) -> Result<(), SourceError> {
        if media_ids.is_empty() {
            return Ok(());
        }
        self.api
            .edit_tags(&Self::raw_ids(media_ids), tag.0, ApplyTags::Remove)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(id: u32, label: &str) -> ArrTag {
        ArrTag {
            id,
            label: label.to_string(),
        }
    }

    #[test]
    fn test_find_tag_ignores_case() {
        let tags = vec![tag(1, "4k"), tag(2, "kids")];
        assert_eq!(find_tag(&tags, "Kids"), Some(TagId(2)));
        assert_eq!(find_tag(&tags, " KIDS "), Some(TagId(2)));
        assert_eq!(find_tag(&tags, "anime"), None);
    }

    #[test]
    fn test_record_conversion() {
        let record = ArrClient::to_record(ArrMedia {
            id: 12,
            title: "Inception".to_string(),
            year: Some(2010),
            tags: vec![3, 4],
        });
        assert_eq!(record.id, CatalogId(12));
        assert!(record.has_tag(TagId(3)));
        assert!(!record.has_tag(TagId(5)));
    }

    #[test]
    fn test_new_rejects_empty_url() {
        let result = ArrClient::new("radarr_1", InstanceKind::Radarr, " ", "key");
        assert!(matches!(result, Err(SourceError::Connection(_))));
    }
}
