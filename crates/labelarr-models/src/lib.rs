pub mod decision;
pub mod label;
pub mod media;
pub mod record;

pub use decision::{SyncAction, SyncDecision};
pub use label::{CatalogId, Label, TagId};
pub use media::{InstanceKind, MediaKind};
pub use record::{CatalogRecord, MediaRecord};
