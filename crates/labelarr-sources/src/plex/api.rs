use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const CLIENT_IDENTIFIER: &str = "labelarr";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub key: String,
    pub type_: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlexItem {
    pub rating_key: String,
    pub title: String,
    pub year: Option<u32>,
    /// Labels as Plex stores them (original case)
    pub labels: Vec<String>,
    pub library_section_id: Option<String>,
    /// "movie", "show", ...
    pub type_: Option<String>,
}

impl PlexItem {
    /// Metadata type number used by the edit endpoint
    pub fn type_number(&self) -> u8 {
        match self.type_.as_deref() {
            Some("show") => 2,
            _ => 1,
        }
    }
}

pub struct PlexHttpClient {
    client: Client,
}

impl PlexHttpClient {
    pub fn new(token: &str) -> Result<Self> {
        let client = Client::builder()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers.insert(
                    reqwest::header::HeaderName::from_static("x-plex-token"),
                    reqwest::header::HeaderValue::from_str(token)
                        .context("Invalid token format")?,
                );
                headers.insert(
                    reqwest::header::HeaderName::from_static("x-plex-client-identifier"),
                    reqwest::header::HeaderValue::from_static(CLIENT_IDENTIFIER),
                );
                headers
            })
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Hit the server root; returns the HTTP status so callers can tell a bad token from a bad URL
    pub async fn check_server(&self, server_url: &str) -> std::result::Result<StatusCode, reqwest::Error> {
        let url = format!("{}/", server_url);
        let response = self.client.get(&url).send().await?;
        Ok(response.status())
    }

    pub async fn get_libraries(&self, server_url: &str) -> Result<Vec<LibraryInfo>> {
        let url = format!("{}/library/sections", server_url);
        let json = self.get_json(&url).await.context("Failed to get libraries")?;

        let mut libraries = Vec::new();
        if let Some(dir_array) = json
            .get("MediaContainer")
            .and_then(|mc| mc.get("Directory"))
            .and_then(|d| d.as_array())
        {
            for dir in dir_array {
                let key = dir.get("key").and_then(|k| k.as_str()).unwrap_or("").to_string();
                let type_ = dir.get("type").and_then(|t| t.as_str()).unwrap_or("").to_string();
                let title = dir.get("title").and_then(|t| t.as_str()).unwrap_or("").to_string();
                libraries.push(LibraryInfo { key, type_, title });
            }
        }

        debug!("Plex get_libraries: Found {} libraries", libraries.len());
        Ok(libraries)
    }

    pub async fn get_section_items(&self, server_url: &str, library_key: &str, type_num: u8) -> Result<Vec<PlexItem>> {
        let url = format!(
            "{}/library/sections/{}/all?type={}",
            server_url, library_key, type_num
        );
        let json = self.get_json(&url).await.context("Failed to get library items")?;
        let items = parse_metadata_array(&json);
        debug!("Plex get_section_items: {} items in library {}", items.len(), library_key);
        Ok(items)
    }

    /// Search every library by title, optionally narrowed by year
    pub async fn search(&self, server_url: &str, title: &str, year: Option<u32>, type_num: u8) -> Result<Vec<PlexItem>> {
        let mut url = format!(
            "{}/library/all?type={}&title={}",
            server_url,
            type_num,
            urlencoding::encode(title)
        );
        if let Some(year_val) = year {
            url.push_str(&format!("&year={}", year_val));
        }

        debug!("Plex search: Searching for '{}' (type: {}, year: {:?})", title, type_num, year);
        let json = self.get_json(&url).await.context("Failed to search Plex library")?;
        let results = parse_metadata_array(&json);
        debug!("Plex search: Found {} results for '{}'", results.len(), title);
        Ok(results)
    }

    pub async fn get_metadata_item(&self, server_url: &str, rating_key: &str) -> Result<PlexItem> {
        let id = rating_key.trim_start_matches("/library/metadata/").trim();
        let url = format!("{}/library/metadata/{}", server_url, id);
        let json = self.get_json(&url).await.context("Failed to get metadata item")?;

        parse_metadata_array(&json)
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Metadata item {} not found", id))
    }

    /// Replace the label set of an item with `labels` (locked so agents don't overwrite it)
    pub async fn set_labels(
        &self,
        server_url: &str,
        section_id: &str,
        rating_key: &str,
        type_num: u8,
        labels: &[String],
    ) -> Result<()> {
        let mut params = base_edit_params(rating_key, type_num);
        for (idx, label) in labels.iter().enumerate() {
            params.push((format!("label[{}].tag.tag", idx), label.clone()));
        }
        self.put_edit(server_url, section_id, &params).await
    }

    pub async fn remove_labels(
        &self,
        server_url: &str,
        section_id: &str,
        rating_key: &str,
        type_num: u8,
        labels: &[String],
    ) -> Result<()> {
        let mut params = base_edit_params(rating_key, type_num);
        params.push(("label[].tag.tag-".to_string(), labels.join(",")));
        self.put_edit(server_url, section_id, &params).await
    }

    async fn put_edit(&self, server_url: &str, section_id: &str, params: &[(String, String)]) -> Result<()> {
        let url = format!("{}/library/sections/{}/all", server_url, section_id);
        let response = self
            .client
            .put(&url)
            .query(params)
            .send()
            .await
            .context("Failed to edit labels")?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(anyhow::anyhow!("Failed to edit labels: {}", response.status()))
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("Plex returned {} for {}", status, url));
        }
        Ok(response.json().await?)
    }
}

fn base_edit_params(rating_key: &str, type_num: u8) -> Vec<(String, String)> {
    vec![
        ("type".to_string(), type_num.to_string()),
        ("id".to_string(), rating_key.to_string()),
        ("label.locked".to_string(), "1".to_string()),
    ]
}

fn parse_metadata_array(json: &Value) -> Vec<PlexItem> {
    let Some(media_container) = json.get("MediaContainer") else {
        debug!("Plex: No MediaContainer in response");
        return Vec::new();
    };
    // Listings use "Metadata"; some older servers answer searches with "Video"/"Directory"
    let items = media_container
        .get("Metadata")
        .or_else(|| media_container.get("Video"))
        .or_else(|| media_container.get("Directory"))
        .and_then(|v| v.as_array());

    let Some(items) = items else {
        return Vec::new();
    };

    let mut parsed = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for item in items {
        match parse_item(item) {
            Some(p) => parsed.push(p),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!("Plex: Skipped {} items that couldn't be parsed", skipped);
    }
    parsed
}

pub(crate) fn parse_item(item: &Value) -> Option<PlexItem> {
    let rating_key = match item.get("ratingKey")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let title = item.get("title")?.as_str()?.to_string();
    let year = item.get("year").and_then(|y| y.as_u64()).map(|y| y as u32);
    let labels = item
        .get("Label")
        .and_then(|l| l.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|l| l.get("tag").and_then(|t| t.as_str()))
                .map(|t| t.to_string())
                .collect()
        })
        .unwrap_or_default();
    let library_section_id = match item.get("librarySectionID") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let type_ = item.get("type").and_then(|t| t.as_str()).map(|t| t.to_string());

    Some(PlexItem {
        rating_key,
        title,
        year,
        labels,
        library_section_id,
        type_,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_item_with_labels() {
        let item = json!({
            "ratingKey": "1234",
            "title": "Inception",
            "year": 2010,
            "librarySectionID": 1,
            "type": "movie",
            "Label": [{"tag": "Kids"}, {"tag": "4K"}]
        });
        let parsed = parse_item(&item).unwrap();
        assert_eq!(parsed.rating_key, "1234");
        assert_eq!(parsed.year, Some(2010));
        assert_eq!(parsed.labels, vec!["Kids".to_string(), "4K".to_string()]);
        assert_eq!(parsed.library_section_id.as_deref(), Some("1"));
        assert_eq!(parsed.type_number(), 1);
    }

    #[test]
    fn test_parse_item_without_optional_fields() {
        let item = json!({"ratingKey": 99, "title": "Untitled"});
        let parsed = parse_item(&item).unwrap();
        assert_eq!(parsed.rating_key, "99");
        assert_eq!(parsed.year, None);
        assert!(parsed.labels.is_empty());
        assert!(parsed.library_section_id.is_none());
        assert_eq!(parsed.type_number(), 1);
    }

    #[test]
    fn test_show_type_number() {
        let parsed = parse_item(&json!({"ratingKey": "5", "title": "Bluey", "type": "show"})).unwrap();
        assert_eq!(parsed.type_number(), 2);
    }

    #[test]
    fn test_parse_item_requires_title() {
        assert!(parse_item(&json!({"ratingKey": "1"})).is_none());
    }

    #[test]
    fn test_parse_metadata_array_falls_back_to_video() {
        let json = json!({
            "MediaContainer": {
                "Video": [{"ratingKey": "1", "title": "Alien", "year": 1979}]
            }
        });
        let items = parse_metadata_array(&json);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Alien");
    }

    #[test]
    fn test_edit_params() {
        let params = base_edit_params("42", 2);
        assert!(params.contains(&("id".to_string(), "42".to_string())));
        assert!(params.contains(&("type".to_string(), "2".to_string())));
        assert!(params.contains(&("label.locked".to_string(), "1".to_string())));
    }
}
