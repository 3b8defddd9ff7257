use super::PointWriter;
use crate::datamodel::EncodedPoint;
use crate::encoding::line_protocol::render_lines;
use crate::transport::TransportError;
use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const STDOUT_TARGET: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputCompression {
    #[default]
    None,
    /// One gzip member per written batch.
    Gzip,
}

impl FromStr for OutputCompression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "" => Ok(OutputCompression::None),
            "gzip" | "gz" => Ok(OutputCompression::Gzip),
            other => Err(format!("Unsupported output compression: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum OutputTarget {
    Stdout,
    File(PathBuf),
}

type Output = Box<dyn AsyncWrite + Send + Unpin>;

/// Appends line protocol to a file, or to stdout for `-`.
///
/// A batch is either fully handed to the output or dropped: bytes a failed
/// batch left in the buffer never reach the output with the next one.
pub struct LineProtocolFileWriter {
    target: OutputTarget,
    compression: OutputCompression,
    buffer_size: usize,
    output: Mutex<BufWriter<Output>>,
}

impl fmt::Debug for LineProtocolFileWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineProtocolFileWriter")
            .field("target", &self.target)
            .field("compression", &self.compression)
            .finish()
    }
}

impl LineProtocolFileWriter {
    pub async fn open(
        output: &str,
        compression: OutputCompression,
        buffer_size: usize,
    ) -> Result<Self, TransportError> {
        let (target, inner): (OutputTarget, Output) = if output == STDOUT_TARGET {
            (OutputTarget::Stdout, Box::new(tokio::io::stdout()))
        } else {
            let file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(output)
                .await?;
            (OutputTarget::File(PathBuf::from(output)), Box::new(file))
        };

        Ok(Self::with_output(target, compression, buffer_size, inner))
    }

    fn with_output(
        target: OutputTarget,
        compression: OutputCompression,
        buffer_size: usize,
        inner: Output,
    ) -> Self {
        let buffer_size = buffer_size.max(1);
        Self {
            target,
            compression,
            buffer_size,
            output: Mutex::new(BufWriter::with_capacity(buffer_size, inner)),
        }
    }

    fn encode_batch(&self, points: &[EncodedPoint]) -> Result<Vec<u8>, TransportError> {
        let lines = render_lines(points);
        match self.compression {
            OutputCompression::None => Ok(lines.into_bytes()),
            OutputCompression::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(lines.as_bytes())?;
                Ok(encoder.finish()?)
            }
        }
    }
}

#[async_trait]
impl PointWriter for LineProtocolFileWriter {
    async fn write(&self, points: &[EncodedPoint]) -> Result<(), TransportError> {
        if points.is_empty() {
            return Ok(());
        }
        let bytes = self.encode_batch(points)?;

        let mut output = self.output.lock().await;
        let written = match output.write_all(&bytes).await {
            Ok(()) => output.flush().await,
            Err(error) => Err(error),
        };
        if let Err(error) = written {
            // Keep the inner writer, discard the buffered bytes
            let placeholder: Output = Box::new(tokio::io::sink());
            let failed = std::mem::replace(
                &mut *output,
                BufWriter::with_capacity(self.buffer_size, placeholder),
            );
            *output = BufWriter::with_capacity(self.buffer_size, failed.into_inner());
            warn!(
                "Dropped a batch of {} points to {:?}: {}",
                points.len(),
                self.target,
                error
            );
            return Err(error.into());
        }
        debug!(
            "Wrote {} points ({} bytes) to {:?}",
            points.len(),
            bytes.len(),
            self.target
        );
        Ok(())
    }
}
