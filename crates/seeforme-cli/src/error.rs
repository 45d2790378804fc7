//! CLI-specific error types.

use seeforme_core::SettingsError;
use thiserror::Error;

use crate::paths::PathError;

#[derive(Debug, Error)]
pub enum CliError {
    /// Settings file or flags hold an invalid value.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Path(#[from] PathError),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),
}

impl CliError {
    /// Map error to an exit code (sysexits.h conventions).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Settings(_) => 78, // EX_CONFIG
            Self::Path(_) => 74,                       // EX_IOERR
            Self::Arguments(_) => 2,                   // EX_USAGE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_errors_are_config_errors() {
        let err = CliError::from(SettingsError::EmptyModelId);
        assert_eq!(err.exit_code(), 78);
        assert_eq!(err.to_string(), "Model id cannot be empty");
    }

    #[test]
    fn argument_errors_use_usage_code() {
        assert_eq!(CliError::Arguments("bad".into()).exit_code(), 2);
    }
}
