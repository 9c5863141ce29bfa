use std::io::{self, Write};

use serde::Serialize;

use crate::error::VfsError;
use crate::protocol::CommandResponse;

/// Writes one JSON object per line.
pub struct NdjsonTransport<W: Write> {
    writer: W,
}

impl NdjsonTransport<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> NdjsonTransport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_response(&mut self, response: &CommandResponse<'_>) -> Result<(), VfsError> {
        self.write_line(response)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Serialization failures are logged and the line is dropped; write
    /// failures are returned.
    fn write_line(&mut self, value: &impl Serialize) -> Result<(), VfsError> {
        let mut line = match serde_json::to_vec(value) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to serialize: {}", e);
                return Ok(());
            }
        };
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.writer.flush()?;
        Ok(())
    }
}
