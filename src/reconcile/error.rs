use thiserror::Error;

/// Errors raised while reconciling device series into a site series
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    /// Every sample of the series is null, there is nothing to fill from
    #[error("Incomplete series: {label} has no non-null sample")]
    IncompleteSeries { label: String },

    /// The source produced timestamps out of order or twice
    #[error("Unordered series: {label} has timestamp {timestamp} after {previous}")]
    UnorderedSeries {
        label: String,
        previous: i64,
        timestamp: i64,
    },

    /// Two devices report under the same label
    #[error("Duplicate device label: {label}")]
    DuplicateLabel { label: String },

    /// A device label collides with the site series
    #[error("Reserved device label: {label}")]
    ReservedLabel { label: String },

    #[error("Cannot aggregate an empty series set")]
    EmptySeriesSet,
}
