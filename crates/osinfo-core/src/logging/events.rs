//! Event vocabulary.
//!
//! An event's dotted name is its tracing target, so `probe.failed` can be
//! filtered with the directive `probe=info` like any module path.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowercase severity name as written in JSON lines.
pub fn level_name(level: &tracing::Level) -> &'static str {
    match *level {
        tracing::Level::TRACE => "trace",
        tracing::Level::DEBUG => "debug",
        tracing::Level::INFO => "info",
        tracing::Level::WARN => "warn",
        tracing::Level::ERROR => "error",
    }
}

/// Where in the query-resolve-format pipeline an event happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Argument checks and picking the target process.
    Resolve,
    /// Talking to the OS.
    Query,
    /// Rendering the report.
    Format,
    /// Changing the caller's own priority.
    Mutate,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Resolve => "resolve",
            Stage::Query => "query",
            Stage::Format => "format",
            Stage::Mutate => "mutate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event names, grouped by the stage that emits them.
pub mod event_names {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    pub const TARGET_RESOLVED: &str = "resolve.target";
    pub const TARGET_REJECTED: &str = "resolve.rejected";

    pub const PROBE_OK: &str = "probe.ok";
    pub const PROBE_FAILED: &str = "probe.failed";

    pub const PRIORITY_LOWERED: &str = "mutate.priority_lowered";
    pub const PAUSE_FINISHED: &str = "mutate.pause_finished";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_display_matches_serde() {
        for stage in [Stage::Resolve, Stage::Query, Stage::Format, Stage::Mutate] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage));
        }
    }

    #[test]
    fn level_names() {
        assert_eq!(level_name(&tracing::Level::INFO), "info");
        assert_eq!(level_name(&tracing::Level::ERROR), "error");
    }

    #[test]
    fn event_families_match_filter_targets() {
        for name in [
            event_names::RUN_STARTED,
            event_names::TARGET_REJECTED,
            event_names::PROBE_FAILED,
            event_names::PAUSE_FINISHED,
        ] {
            let family = name.split('.').next().unwrap();
            assert!(["run", "resolve", "probe", "mutate"].contains(&family), "{name}");
        }
    }
}
