use crate::datamodel::EncodedPoint;
use crate::transport::TransportError;
use async_trait::async_trait;
use std::fmt::Debug;

pub mod line_protocol_file;

pub use line_protocol_file::{LineProtocolFileWriter, OutputCompression};

/// Sink for encoded points. A failed write is reported to the caller and
/// never retried.
#[async_trait]
pub trait PointWriter: Send + Sync + Debug {
    async fn write(&self, points: &[EncodedPoint]) -> Result<(), TransportError>;
}
