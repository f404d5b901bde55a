use std::path::PathBuf;

use thiserror::Error;

/// Failures talking to the browser driver process.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Driver process failed to spawn
    #[error("failed to spawn {program} (is Node.js installed?): {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing a request to the driver's stdin failed
    #[error("failed to write to driver stdin: {0}")]
    Write(#[source] std::io::Error),

    /// Driver output was not the JSON we expected
    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Driver answered `ok: false`
    #[error("driver command '{command}' failed: {error}")]
    Protocol { command: String, error: String },

    #[error("driver command '{command}' timed out after {timeout_ms} ms")]
    Timeout { command: String, timeout_ms: u64 },

    /// Driver stdout closed; the process has exited
    #[error("browser driver exited")]
    Closed,

    #[error("driver did not signal ready: {0}")]
    NotReady(String),
}

impl SessionError {
    /// Whether the session can no longer be used after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::Write(_) | SessionError::Closed | SessionError::NotReady(_)
        )
    }
}

/// Failures surfaced by the graph assembler.
#[derive(Debug, Error)]
pub enum GraphError {
    /// `generate_graph` was called before a browser session was opened
    #[error("no browser session: call open() or use GraphGenerator::scoped")]
    NoSession,

    #[error("failed to launch browser session: {0}")]
    Launch(#[source] SessionError),

    /// Navigation, extraction or timeout against the live page
    #[error("failed to generate action graph for {url}: {source}")]
    Generation {
        url: String,
        #[source]
        source: SessionError,
    },

    #[error("failed to read {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error ({context}): {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Why a single raw element record was dropped by the sanitizer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SanitizeError {
    #[error("record is not an object (got {0})")]
    NotAnObject(&'static str),

    #[error("field '{field}' must be {expected}, got {found}")]
    InvalidField {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown element type '{0}'")]
    UnknownElementType(String),

    #[error("duplicate element id '{0}'")]
    DuplicateId(String),

    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
}
