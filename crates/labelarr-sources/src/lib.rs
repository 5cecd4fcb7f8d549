pub mod traits;
pub mod factory;
pub mod plex;
pub mod arr;
pub mod error;

pub use traits::{CatalogManager, MediaServer};
pub use factory::{mask_secret, SourceFactory};
pub use error::SourceError;
pub use plex::PlexClient;
pub use arr::ArrClient;
