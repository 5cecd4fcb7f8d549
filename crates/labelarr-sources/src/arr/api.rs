use anyhow::{anyhow, Context, Result};
use labelarr_models::InstanceKind;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const API_PREFIX: &str = "api/v3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A Radarr movie or a Sonarr series; both share these fields
#[derive(Debug, Clone, Deserialize)]
pub struct ArrMedia {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub tags: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrTag {
    #[serde(skip_serializing)]
    pub id: u32,
    pub label: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApplyTags {
    Add,
    Remove,
}

/// Body of PUT /movie/editor and PUT /series/editor
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EditorRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    movie_ids: Option<&'a [u64]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    series_ids: Option<&'a [u64]>,
    tags: [u32; 1],
    apply_tags: ApplyTags,
}

#[derive(Debug, Serialize)]
struct NewTag<'a> {
    label: &'a str,
}

pub struct ArrHttpClient {
    client: Client,
    base_url: String,
    kind: InstanceKind,
}

impl ArrHttpClient {
    pub fn new(base_url: &str, api_key: &str, kind: InstanceKind) -> Result<Self> {
        let client = Client::builder()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers.insert(
                    reqwest::header::HeaderName::from_static("x-api-key"),
                    reqwest::header::HeaderValue::from_str(api_key)
                        .context("Invalid API key format")?,
                );
                headers
            })
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            kind,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, API_PREFIX, path)
    }

    pub async fn get_media(&self) -> Result<Vec<ArrMedia>> {
        let url = self.url(self.kind.api_resource());
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to get {} library", self.kind))?;
        let response = check_status(response, &url)?;

        let media: Vec<ArrMedia> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} library response", self.kind))?;
        debug!("{}: Found {} items", self.kind, media.len());
        Ok(media)
    }

    pub async fn get_tags(&self) -> Result<Vec<ArrTag>> {
        let url = self.url("tag");
        let response = self.client.get(&url).send().await.context("Failed to get tags")?;
        let response = check_status(response, &url)?;
        let tags: Vec<ArrTag> = response.json().await.context("Failed to parse tags response")?;
        Ok(tags)
    }

    pub async fn create_tag(&self, label: &str) -> Result<ArrTag> {
        let url = self.url("tag");
        let response = self
            .client
            .post(&url)
            .json(&NewTag { label })
            .send()
            .await
            .context("Failed to create tag")?;
        let response = check_status(response, &url)?;
        let tag: ArrTag = response.json().await.context("Failed to parse created tag")?;
        debug!("{}: Created tag '{}' with id {}", self.kind, tag.label, tag.id);
        Ok(tag)
    }

    /// Add or remove one tag on many items in a single editor call
    pub async fn edit_tags(&self, media_ids: &[u64], tag_id: u32, apply: ApplyTags) -> Result<()> {
        let url = self.url(&format!("{}/editor", self.kind.api_resource()));
        let body = editor_request(self.kind, media_ids, tag_id, apply);
        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to edit tags")?;
        check_status(response, &url)?;
        Ok(())
    }
}

fn editor_request(kind: InstanceKind, media_ids: &[u64], tag_id: u32, apply: ApplyTags) -> EditorRequest<'_> {
    let (movie_ids, series_ids) = match kind {
        InstanceKind::Radarr => (Some(media_ids), None),
        InstanceKind::Sonarr => (None, Some(media_ids)),
    };
    EditorRequest {
        movie_ids,
        series_ids,
        tags: [tag_id],
        apply_tags: apply,
    }
}

fn check_status(response: reqwest::Response, url: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(anyhow!("API key rejected by {}", url));
    }
    Err(anyhow!("{} returned {}", url, status))
}
