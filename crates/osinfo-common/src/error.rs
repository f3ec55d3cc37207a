//! Error types for the osinfo query tools.
//!
//! Two classes of failure exist:
//! - Usage errors: bad argument count or a literal that fails a local,
//!   syscall-free check. Detected before any OS call.
//! - Query errors: an OS call reported failure. The OS error description is
//!   kept as the `source` and the failing operation is named in `op`.
//!
//! An unresolvable UID/GID is not an error at all; the resolver substitutes
//! `"Unknown"` and carries on.
//!
//! # JSON form
//!
//! With `--format json` an error is reported on stderr as:
//! ```json
//! {
//!   "code": "ERR_QUERY",
//!   "category": "query",
//!   "message": "getpriority: No such process (os error 3)",
//!   "operation": "getpriority"
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for osinfo operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure class, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Wrong arguments or an argument rejected without asking the OS.
    Usage,
    /// An OS query or mutation reported failure.
    Query,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Usage => write!(f, "usage"),
            ErrorCategory::Query => write!(f, "query"),
        }
    }
}

/// Unified error type for osinfo.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{message}")]
    Usage { message: String },

    #[error("Invalid process ID: {0:?}")]
    InvalidTarget(String),

    #[error("{op}: {source}")]
    Query {
        op: &'static str,
        source: std::io::Error,
    },
}

impl Error {
    /// Build a query error for `op` from the calling thread's last OS error.
    pub fn last_os(op: &'static str) -> Self {
        Error::Query {
            op,
            source: std::io::Error::last_os_error(),
        }
    }

    /// Build a query error for `op` from an existing I/O error.
    pub fn query(op: &'static str, source: std::io::Error) -> Self {
        Error::Query { op, source }
    }

    /// Returns the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Usage { .. } | Error::InvalidTarget(_) => ErrorCategory::Usage,
            Error::Query { .. } => ErrorCategory::Query,
        }
    }

    /// Stable code name for machine consumers.
    pub fn code_name(&self) -> &'static str {
        match self {
            Error::Usage { .. } => "ERR_USAGE",
            Error::InvalidTarget(_) => "ERR_INVALID_TARGET",
            Error::Query { .. } => "ERR_QUERY",
        }
    }

    /// Name of the OS operation that failed, if any.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Error::Query { op, .. } => Some(op),
            _ => None,
        }
    }

    /// Raw OS error number behind a query failure.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Error::Query { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }

    pub fn is_usage(&self) -> bool {
        self.category() == ErrorCategory::Usage
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code name.
    pub code: String,

    pub category: ErrorCategory,

    /// Same text the text-mode report prints.
    pub message: String,

    /// OS operation that failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    /// Raw errno value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_error: Option<i32>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        StructuredError {
            code: err.code_name().to_string(),
            category: err.category(),
            message: err.to_string(),
            operation: err.operation().map(str::to_string),
            os_error: err.raw_os_error(),
        }
    }
}

impl StructuredError {
    /// Compact JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":"{}","error":"serialization_failed"}}"#, self.code)
        })
    }

    /// Indented JSON.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}
