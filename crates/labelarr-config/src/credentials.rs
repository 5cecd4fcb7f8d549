use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Secrets kept outside config.toml (Plex token, *arr API keys)
pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn get_plex_token(&self) -> Option<&String> {
        self.get("plex_token")
    }

    pub fn get_instance_api_key(&self, instance_name: &str) -> Option<&String> {
        self.get(&format!("{}_api_key", instance_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_store_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        std::fs::write(&path, "plex_token = \"plex_secret\"\nradarr_1_api_key = \"radarr_secret\"\n").unwrap();

        let mut store = CredentialStore::new(path);
        store.load().unwrap();
        assert_eq!(store.get_plex_token(), Some(&"plex_secret".to_string()));
        assert_eq!(store.get_instance_api_key("radarr_1"), Some(&"radarr_secret".to_string()));
        assert_eq!(store.get_instance_api_key("sonarr_1"), None);
    }

    #[test]
    fn test_credential_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CredentialStore::new(dir.path().join("credentials.toml"));
        store.load().unwrap();
        assert_eq!(store.get_plex_token(), None);
    }

    #[test]
    fn test_credential_store_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        std::fs::write(&path, "plex_token = ").unwrap();

        let mut store = CredentialStore::new(path);
        assert!(store.load().is_err());
    }
}
