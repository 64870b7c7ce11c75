//! Structured progress stream for docking runs.
//!
//! One JSON object per line in the "sath" envelope:
//! `{"format":"sath","version":"1.0","type":"progress","data":{"progress":N}}`

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::Result;

/// Heuristic progress step per `*` byte in docking output. Vina prints a
/// fixed bar of 51 asterisks, which this maps onto the 1..99 range.
pub const PROGRESS_PER_MARKER: f64 = 98.0 / 51.0;

#[derive(Debug, Serialize)]
pub struct ProgressData {
    pub progress: f64,
}

#[derive(Debug, Serialize)]
pub struct ProgressMessage {
    pub format: &'static str,
    pub version: &'static str,
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub data: ProgressData,
}

impl ProgressMessage {
    pub fn new(progress: f64) -> Self {
        Self {
            format: "sath",
            version: "1.0",
            message_type: "progress",
            data: ProgressData { progress },
        }
    }
}

/// Emits progress records to a sink, one JSON line per update.
///
/// The value is a best-effort estimate: it starts at 1.0, grows by
/// [`PROGRESS_PER_MARKER`] per marker byte and may overshoot 100 for runs
/// that print more markers than expected. A successful run always ends with
/// an exact 100.0 record.
pub struct ProgressReporter<W> {
    sink: W,
    value: f64,
}

impl<W: AsyncWrite + Unpin> ProgressReporter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink, value: 0.0 }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Direct access to the underlying sink, for interleaving raw output
    /// with progress records.
    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Set the progress value and emit a record.
    pub async fn set(&mut self, value: f64) -> Result<()> {
        self.value = value;
        let line = serde_json::to_vec(&ProgressMessage::new(self.value))?;
        self.sink.write_all(&line).await?;
        self.sink.write_all(b"\n").await?;
        Ok(())
    }

    /// Advance by one marker step and emit a record.
    pub async fn advance(&mut self) -> Result<()> {
        self.set(self.value + PROGRESS_PER_MARKER).await
    }
}
