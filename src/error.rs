//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the lumascan CLI.
///
/// - 0: Success (scan completed, findings produced)
/// - 1: General error (unexpected failure)
/// - 2: Clean scan (completed, nothing flagged)
/// - 3: Partial success (completed, but some files failed analysis)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Scan completed and findings were produced.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// Scan completed with nothing flagged.
    CleanScan = 2,
    /// Scan completed but some files could not be analyzed.
    PartialSuccess = 3,
    /// Scan was interrupted by the user.
    Interrupted = 130,
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
            Self::Success => "LS000",
            Self::GeneralError => "LS001",
            Self::CleanScan => "LS002",
            Self::PartialSuccess => "LS003",
            Self::Interrupted => "LS130",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "LS001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
