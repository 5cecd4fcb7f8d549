use serde::{Deserialize, Serialize};
use std::fmt;

/// Library type shared by the media server and the catalog managers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Show,
}

impl MediaKind {
    /// Plex library section type ("movie" / "show")
    pub fn plex_type(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Show => "show",
        }
    }

    /// Plex metadata type number used by listing, search and edit endpoints
    pub fn plex_type_number(&self) -> u8 {
        match self {
            MediaKind::Movie => 1,
            MediaKind::Show => 2,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plex_type())
    }
}

/// The two kinds of catalog manager instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InstanceKind {
    /// Movie-oriented catalog manager
    Radarr,
    /// Show-oriented catalog manager
    Sonarr,
}

impl InstanceKind {
    pub fn media_kind(&self) -> MediaKind {
        match self {
            InstanceKind::Radarr => MediaKind::Movie,
            InstanceKind::Sonarr => MediaKind::Show,
        }
    }

    /// API resource holding this instance's library ("movie" / "series")
    pub fn api_resource(&self) -> &'static str {
        match self {
            InstanceKind::Radarr => "movie",
            InstanceKind::Sonarr => "series",
        }
    }
}

impl fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceKind::Radarr => f.write_str("Radarr"),
            InstanceKind::Sonarr => f.write_str("Sonarr"),
        }
    }
}
