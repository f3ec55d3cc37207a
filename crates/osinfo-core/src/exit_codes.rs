//! Exit codes for the osinfo tools.
//!
//! Every tool exits 0 on success and 1 on any failure. The code names tell
//! failures apart in JSON output without changing the numeric contract.

use osinfo_common::{Error, ErrorCategory};

/// Exit codes for osinfo operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Clean,
    /// Wrong argument count or an argument rejected before any OS call.
    ArgsError,
    /// An OS query or mutation failed.
    QueryError,
    /// Writing the report failed.
    IoError,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        match self {
            ExitCode::Clean => 0,
            ExitCode::ArgsError | ExitCode::QueryError | ExitCode::IoError => 1,
        }
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Get the code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::QueryError => "ERR_QUERY",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err.category() {
            ErrorCategory::Usage => ExitCode::ArgsError,
            ErrorCategory::Query => ExitCode::QueryError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
