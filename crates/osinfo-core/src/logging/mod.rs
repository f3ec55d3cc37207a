//! Diagnostic logging for the osinfo tools.
//!
//! Logs never touch stdout, which carries only the command's report. On
//! stderr they are either `tracing_subscriber::fmt` lines (default) or JSON
//! lines from [`JsonlLayer`] when `--format json` or `OSINFO_LOG_FORMAT=jsonl`
//! is in effect.
//!
//! ```ignore
//! use osinfo_core::logging::{init_logging, LogConfig, LogLevel};
//!
//! init_logging(&LogConfig::from_env(Some(LogLevel::Debug), None));
//! ```

pub mod config;
pub mod events;
pub mod layer;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, level_name, Stage};
pub use layer::JsonlLayer;

use std::io::{self, IsTerminal};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Target prefixes that pass the filter: the library itself plus the
/// dotted event families of [`event_names`].
const LOG_TARGETS: [&str; 5] = ["osinfo_core", "run", "resolve", "probe", "mutate"];

/// Filter directives enabling `level` for every osinfo target.
pub fn filter_directives(level: LogLevel) -> String {
    let mut directives = String::new();
    for target in LOG_TARGETS {
        if !directives.is_empty() {
            directives.push(',');
        }
        directives.push_str(target);
        directives.push('=');
        directives.push_str(level.as_str());
    }
    directives
}

/// Install the global subscriber for this process.
///
/// Call once before the first event. Later calls leave the installed
/// subscriber in place.
pub fn init_logging(config: &LogConfig) {
    let registry = tracing_subscriber::registry().with(EnvFilter::new(filter_directives(config.level)));
    let human = || {
        fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .with_ansi(io::stderr().is_terminal())
    };

    let installed = match (config.format, config.timestamps) {
        (LogFormat::Jsonl, _) => registry.with(JsonlLayer::stderr()).try_init(),
        (LogFormat::Human, true) => registry.with(human()).try_init(),
        (LogFormat::Human, false) => registry.with(human().without_time()).try_init(),
    };
    if installed.is_err() {
        tracing::debug!("subscriber already installed");
    }
}

/// Emit a named event tagged with its [`Stage`].
///
/// ```ignore
/// log_event!(DEBUG, event_names::PROBE_OK, Stage::Query, "clock read", seconds = 17);
/// ```
#[macro_export]
macro_rules! log_event {
    (INFO, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::info!(target: $event, stage = %$stage, message = $msg, $($key = $val,)*)
    };
    (DEBUG, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::debug!(target: $event, stage = %$stage, message = $msg, $($key = $val,)*)
    };
    (WARN, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::warn!(target: $event, stage = %$stage, message = $msg, $($key = $val,)*)
    };
    (ERROR, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::error!(target: $event, stage = %$stage, message = $msg, $($key = $val,)*)
    };
}
