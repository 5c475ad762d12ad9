//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: model error (invalid configuration file, bad dimensions)
//! - 11: I/O error (reading the config, writing the export)
//! - 12: input error (bad --set JSON)
//! - 13: serialization error
//! - 14: export error (rasterization or encoding failed)

use noisy_gradient_core::ArtError;
use noisy_gradient_export::ExportError;
use std::fmt;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
#[derive(Debug)]
pub enum CliError {
    /// A model-level error (configuration failed validation).
    Art(ArtError),
    /// An I/O error (config file read, export write).
    Io(String),
    /// A user input error (unparseable JSON argument).
    Input(String),
    /// A serialization error (JSON output failure).
    Serialization(String),
    /// The export pipeline did not produce a file.
    Export(String),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Art(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
            CliError::Export(_) => 14,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Art(e) => write!(f, "{e}"),
            CliError::Io(msg) => write!(f, "{msg}"),
            CliError::Input(msg) => write!(f, "{msg}"),
            CliError::Serialization(msg) => write!(f, "{msg}"),
            CliError::Export(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<ArtError> for CliError {
    fn from(e: ArtError) -> Self {
        CliError::Art(e)
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::Io(io) => CliError::Io(io.to_string()),
            other => CliError::Export(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
