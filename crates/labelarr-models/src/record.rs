use crate::label::{CatalogId, Label, TagId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An item as seen by the media server.
///
/// Labels are stored lowercase so membership checks are case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaRecord {
    pub title: String,
    pub year: Option<u32>,
    pub labels: BTreeSet<String>,
    /// Media server handle used by label mutations
    pub rating_key: String,
}

impl MediaRecord {
    pub fn new<I, S>(rating_key: impl Into<String>, title: impl Into<String>, year: Option<u32>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            title: title.into(),
            year,
            labels: labels
                .into_iter()
                .map(|l| l.as_ref().trim().to_lowercase())
                .collect(),
            rating_key: rating_key.into(),
        }
    }

    pub fn has_label(&self, label: &Label) -> bool {
        self.labels.contains(label.key())
    }
}

/// An item as seen by a catalog manager (Radarr movie / Sonarr series).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogRecord {
    pub id: CatalogId,
    pub title: String,
    pub year: Option<u32>,
    pub tags: BTreeSet<TagId>,
}

impl CatalogRecord {
    pub fn new(id: u64, title: impl Into<String>, year: Option<u32>, tags: impl IntoIterator<Item = u32>) -> Self {
        Self {
            id: CatalogId(id),
            title: title.into(),
            year,
            tags: tags.into_iter().map(TagId).collect(),
        }
    }

    pub fn has_tag(&self, tag: TagId) -> bool {
        self.tags.contains(&tag)
    }
}
