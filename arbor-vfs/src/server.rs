use std::io::{BufRead, Write};

use crate::commands::Session;
use crate::error::VfsError;
use crate::protocol::CommandResponse;
use crate::transport::NdjsonTransport;

/// Line-oriented shell server: one command in, one JSON response out.
pub struct ShellServer<W: Write> {
    session: Session,
    transport: NdjsonTransport<W>,
}

impl<W: Write> ShellServer<W> {
    pub fn new(session: Session, transport: NdjsonTransport<W>) -> Self {
        Self { session, transport }
    }

    pub fn into_parts(self) -> (Session, NdjsonTransport<W>) {
        (self.session, self.transport)
    }

    /// Main loop: read commands until EOF or `exit`. Blank lines are
    /// skipped without a response.
    pub fn run(&mut self, reader: impl BufRead) -> Result<(), VfsError> {
        for line_result in reader.lines() {
            let line = line_result?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed == "exit" {
                tracing::info!("exit requested");
                break;
            }

            let result = self.session.execute(trimmed);
            let response = CommandResponse::new(&result, self.session.cwd());
            self.transport.write_response(&response)?;
        }

        Ok(())
    }
}
