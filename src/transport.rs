use thiserror::Error;

/// Errors raised by history sources, irradiance sources and point writers
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source answered but its payload could not be understood
    #[error("Failed to decode data from {source_name}: {details}")]
    Decode {
        source_name: String,
        details: String,
    },

    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

impl TransportError {
    pub fn decode(source_name: impl Into<String>, details: impl ToString) -> Self {
        TransportError::Decode {
            source_name: source_name.into(),
            details: details.to_string(),
        }
    }
}
