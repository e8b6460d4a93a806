//! CLI-specific error types and exit code mapping

use ironsbom_catalog::CatalogError;
use ironsbom_core::error::IronsbomError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Input file (packages, image layout) could not be used.
    #[error("invalid input {path}: {reason}")]
    Input {
        /// Input file path
        path: String,
        /// Failure reason
        reason: String,
    },

    /// Strict projection aborted on an unresolved location.
    #[error("projection failed: {0}")]
    Projection(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from ironsbom-core.
    #[error("{0}")]
    Core(#[from] IronsbomError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                              |
    /// |------|--------------------------------------|
    /// | 0    | Success                              |
    /// | 1    | General / command / input error       |
    /// | 2    | Configuration error                   |
    /// | 4    | Projection failed (strict mode)       |
    /// | 10   | IO error                              |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(IronsbomError::Config(_)) => 2,
            Self::Projection(_) => 4,
            Self::Io(_) | Self::Core(IronsbomError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Input { .. } | Self::Core(_) => 1,
        }
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::UnresolvedLocation { .. } => Self::Projection(e.to_string()),
            CatalogError::Config { .. } => Self::Config(e.to_string()),
            _ => Self::Command(e.to_string()),
        }
    }
}
