//! osinfo common types and errors.
//!
//! This crate provides the pieces shared by every query surface:
//! - The error taxonomy (usage vs. query failures)
//! - Output format selection

pub mod error;
pub mod output;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use output::OutputFormat;
