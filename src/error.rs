//! Exit codes and structured error reporting for the CLI.

use serde::Serialize;

/// Exit codes for the `homefeed` binary.
///
/// - 0: Success (the query returned at least one result)
/// - 1: General error (bad configuration, unwritable output, ...)
/// - 2: No media (the query completed but returned nothing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// The query returned results.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// The query completed with an empty result.
    NoMedia = 2,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "HF000",
            Self::GeneralError => "HF001",
            Self::NoMedia => "HF002",
        }
    }
}

/// Error report printed as JSON with `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "HF001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including causes
    pub message: String,
}

impl StructuredError {
    /// Create a structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
        }
    }
}
