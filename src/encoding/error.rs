use thiserror::Error;

/// Errors raised while turning samples into line protocol points
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    /// The metric path is not in the lookup table
    #[error("Unknown metric path: {path}")]
    UnknownMetric { path: String },

    /// Only one level of sub-keys can be flattened into fields
    #[error("Entity {entity} nests mappings deeper than one level")]
    NestedTooDeep { entity: String },

    /// NaN and infinities have no line protocol representation
    #[error("Field {field} of entity {entity} is not a finite number")]
    NonFiniteFloat { entity: String, field: String },

    #[error("Failed to read the current time: {details}")]
    Clock { details: String },
}
