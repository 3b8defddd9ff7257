pub mod dedup_cache;
pub mod error;
pub mod line_protocol;
pub mod metric_lookup;
pub mod point_encoder;

pub use dedup_cache::{DedupCache, DedupOutcome};
pub use error::EncodingError;
pub use metric_lookup::{MetricTarget, lookup};
pub use point_encoder::{ENTITY_TAG, PointEncoder, Timestamping, ValueKind};
