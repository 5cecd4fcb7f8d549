pub mod config;
pub mod sync;
pub mod sync_ui;
