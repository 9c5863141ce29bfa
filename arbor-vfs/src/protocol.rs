use serde::Serialize;

use crate::commands::CommandResult;

// ── Outgoing response ───────────────────────────────────────────────────────

/// One NDJSON line written after every command.
#[derive(Debug, Serialize)]
pub struct CommandResponse<'a> {
    pub ok: bool,
    pub stdout: &'a str,
    pub stderr: &'a str,
    pub cwd: String,
    pub suggestions: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'a str>,
}

impl<'a> CommandResponse<'a> {
    pub fn new(result: &'a CommandResult, cwd: String) -> Self {
        Self {
            ok: result.is_ok(),
            stdout: &result.stdout,
            stderr: &result.stderr,
            cwd,
            suggestions: &result.suggestions,
            code: result.code,
        }
    }
}
