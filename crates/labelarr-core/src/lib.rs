pub mod normalize;
pub mod correlate;
pub mod retry;
pub mod reconcile;
pub mod apply;
pub mod progress;
pub mod sync;

#[cfg(test)]
mod testing;

pub use normalize::normalize_title;
pub use correlate::{ambiguous_keys, correlate, correlate_media_major, correlation_key, CorrelationKey};
pub use retry::{attempt, Exhausted, TAG_LOOKUP_ATTEMPTS};
pub use reconcile::{FromServerPlan, TagBatch, ToServerPlan};
pub use progress::{ApplyReport, ApplyTracker};
pub use sync::{InstanceReport, LabelSyncOrchestrator, SyncResult};
