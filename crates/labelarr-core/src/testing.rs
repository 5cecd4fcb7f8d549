//! In-memory media server and catalog manager that record every call.

use async_trait::async_trait;
use labelarr_models::{CatalogId, CatalogRecord, InstanceKind, MediaKind, MediaRecord, TagId};
use labelarr_sources::{CatalogManager, MediaServer, SourceError};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCall {
    Search { title: String, year: Option<u32> },
    AddLabel { rating_key: String, label: String },
    RemoveLabel { rating_key: String, label: String },
}

#[derive(Default)]
pub struct FakeMediaServer {
    pub items: Vec<MediaRecord>,
    pub reject_connect: bool,
    pub fail_listing: bool,
    /// Rating keys whose label mutations fail
    pub failing_items: Vec<String>,
    pub calls: Arc<Mutex<Vec<MediaCall>>>,
}

impl FakeMediaServer {
    pub fn with_items(items: Vec<MediaRecord>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<MediaCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutating_calls(&self) -> Vec<MediaCall> {
        mutating_media_calls(&self.calls)
    }

    fn record(&self, call: MediaCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn mutate(&self, item: &MediaRecord, call: MediaCall) -> Result<(), SourceError> {
        self.record(call);
        if self.failing_items.contains(&item.rating_key) {
            return Err(SourceError::new(format!("edit of {} rejected", item.rating_key)));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaServer for FakeMediaServer {
    fn server_name(&self) -> &str {
        "Fake"
    }

    async fn connect(&mut self) -> Result<(), SourceError> {
        if self.reject_connect {
            return Err(SourceError::Unauthorized("bad token".to_string()));
        }
        Ok(())
    }

    async fn list_library_items(&self, _library_names: &[String], _kind: MediaKind) -> Result<Vec<MediaRecord>, SourceError> {
        if self.fail_listing {
            return Err(SourceError::Connection("library unavailable".to_string()));
        }
        Ok(self.items.clone())
    }

    async fn search_item(&self, title: &str, year: Option<u32>, _kind: MediaKind) -> Result<Vec<MediaRecord>, SourceError> {
        self.record(MediaCall::Search {
            title: title.to_string(),
            year,
        });
        Ok(self
            .items
            .iter()
            .filter(|i| i.title.eq_ignore_ascii_case(title) && (year.is_none() || i.year == year))
            .cloned()
            .collect())
    }

    async fn add_label(&self, item: &MediaRecord, label: &str) -> Result<(), SourceError> {
        self.mutate(
            item,
            MediaCall::AddLabel {
                rating_key: item.rating_key.clone(),
                label: label.to_string(),
            },
        )
    }

    async fn remove_label(&self, item: &MediaRecord, label: &str) -> Result<(), SourceError> {
        self.mutate(
            item,
            MediaCall::RemoveLabel {
                rating_key: item.rating_key.clone(),
                label: label.to_string(),
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCall {
    Lookup(String),
    Create(String),
    AddTags(Vec<CatalogId>, TagId),
    RemoveTags(Vec<CatalogId>, TagId),
}

pub struct FakeCatalog {
    pub name: String,
    pub kind: InstanceKind,
    pub media: Vec<CatalogRecord>,
    pub tags: Mutex<Vec<(TagId, String)>>,
    /// Lookups that fail with a transport error before lookups start answering
    pub lookup_failures: Mutex<u32>,
    pub fail_create: bool,
    pub fail_listing: bool,
    pub fail_edits: bool,
    pub calls: Arc<Mutex<Vec<CatalogCall>>>,
}

impl FakeCatalog {
    pub fn new(kind: InstanceKind, media: Vec<CatalogRecord>, tags: &[(u32, &str)]) -> Self {
        Self {
            name: format!("{}_1", kind.to_string().to_lowercase()),
            kind,
            media,
            tags: Mutex::new(tags.iter().map(|(id, l)| (TagId(*id), l.to_string())).collect()),
            lookup_failures: Mutex::new(0),
            fail_create: false,
            fail_listing: false,
            fail_edits: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<CatalogCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutating_calls(&self) -> Vec<CatalogCall> {
        mutating_catalog_calls(&self.calls)
    }

    pub fn lookups(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, CatalogCall::Lookup(_)))
            .count()
    }

    fn record(&self, call: CatalogCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn find(&self, label: &str) -> Option<TagId> {
        self.tags
            .lock()
            .unwrap()
            .iter()
            .find(|(_, l)| l.eq_ignore_ascii_case(label))
            .map(|(id, _)| *id)
    }
}

#[async_trait]
impl CatalogManager for FakeCatalog {
    fn instance_name(&self) -> &str {
        &self.name
    }

    fn instance_kind(&self) -> InstanceKind {
        self.kind
    }

    async fn list_media(&self) -> Result<Vec<CatalogRecord>, SourceError> {
        if self.fail_listing {
            return Err(SourceError::Connection("instance unavailable".to_string()));
        }
        Ok(self.media.clone())
    }

    async fn get_tag_id_by_name(&self, label: &str) -> Result<Option<TagId>, SourceError> {
        self.record(CatalogCall::Lookup(label.to_string()));
        let mut failures = self.lookup_failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(SourceError::Connection("timed out".to_string()));
        }
        drop(failures);
        Ok(self.find(label))
    }

    async fn get_or_create_tag_id(&self, label: &str) -> Result<TagId, SourceError> {
        if let Some(id) = self.find(label) {
            self.record(CatalogCall::Lookup(label.to_string()));
            return Ok(id);
        }
        self.record(CatalogCall::Create(label.to_string()));
        if self.fail_create {
            return Err(SourceError::new("tag creation rejected"));
        }
        let mut tags = self.tags.lock().unwrap();
        let id = TagId(tags.iter().map(|(id, _)| id.0).max().unwrap_or(0) + 1);
        tags.push((id, label.to_string()));
        Ok(id)
    }

    async fn add_tags(&self, media_ids: &[CatalogId], tag: TagId) -> Result<(), SourceError> {
        self.record(CatalogCall::AddTags(media_ids.to_vec(), tag));
        if self.fail_edits {
            return Err(SourceError::new("editor rejected"));
        }
        Ok(())
    }

    async fn remove_tags(&self, media_ids: &[CatalogId], tag: TagId) -> Result<(), SourceError> {
        self.record(CatalogCall::RemoveTags(media_ids.to_vec(), tag));
        if self.fail_edits {
            return Err(SourceError::new("editor rejected"));
        }
        Ok(())
    }
}

/// Label edits in a shared media server call log
pub fn mutating_media_calls(calls: &Mutex<Vec<MediaCall>>) -> Vec<MediaCall> {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter(|c| !matches!(c, MediaCall::Search { .. }))
        .cloned()
        .collect()
}

/// Tag creations and edits in a shared catalog call log
pub fn mutating_catalog_calls(calls: &Mutex<Vec<CatalogCall>>) -> Vec<CatalogCall> {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter(|c| !matches!(c, CatalogCall::Lookup(_)))
        .cloned()
        .collect()
}
