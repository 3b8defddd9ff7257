pub mod aggregator;
pub mod error;
pub mod gap_filler;
pub mod labels;
pub mod production;

pub use aggregator::{AggregateReport, Aggregator, Reconciliation};
pub use error::ReconcileError;
pub use gap_filler::fill_gaps;
pub use labels::check_device_labels;
