pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{
    includes_all_libraries, includes_library, Config, ConfigError, InstanceConfig, InstancesConfig, PlexConfig,
    SyncDirection, SyncOptions,
};
pub use credentials::CredentialStore;
pub use paths::{PathManager, container_base_path};
