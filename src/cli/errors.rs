//! CLI-specific error types
//!
//! All CLI errors end the process with a non-zero exit status.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::ledger::LedgerError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Ledger snapshot already exists
    AlreadyInitialized,
    /// Ledger snapshot could not be read, committed or written
    LedgerError,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "DOCREG_CLI_CONFIG_ERROR",
            Self::IoError => "DOCREG_CLI_IO_ERROR",
            Self::AlreadyInitialized => "DOCREG_CLI_ALREADY_INITIALIZED",
            Self::LedgerError => "DOCREG_CLI_LEDGER_ERROR",
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn already_initialized(path: &std::path::Path) -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            format!("Ledger already initialized at {}", path.display()),
        )
    }

    pub fn ledger_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::LedgerError, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<LedgerError> for CliError {
    fn from(e: LedgerError) -> Self {
        Self::ledger_error(e.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;
