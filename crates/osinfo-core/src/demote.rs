//! Self-demotion: lower the caller's scheduling priority, then pause.
//!
//! Uses `nice(2)` on the current process and a single `nanosleep(2)`.
//! An interrupted sleep is reported as a failure and not resumed.

use crate::log_event;
use crate::logging::{event_names, Stage};
use crate::sys;
use osinfo_common::{Error, Result};
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;

/// Default niceness increment (positive = lower priority).
pub const DEFAULT_DELTA: i32 = 10;

/// Default pause after the priority change.
pub const DEFAULT_PAUSE: Duration = Duration::new(1, 837_272_638);

/// Demotion configuration.
#[derive(Debug, Clone)]
pub struct DemoteConfig {
    /// Increment passed to `nice(2)`.
    pub delta: i32,
    /// How long to sleep once the priority is lowered.
    pub pause: Duration,
}

impl Default for DemoteConfig {
    fn default() -> Self {
        Self {
            delta: DEFAULT_DELTA,
            pause: DEFAULT_PAUSE,
        }
    }
}

/// Outcome of a completed demotion.
#[derive(Debug, Clone, Serialize)]
pub struct DemotionReport {
    pub delta: i32,
    /// Nice value after the change.
    pub nice: i32,
    pub pause_ms: u64,
}

/// Add `delta` to the caller's nice value. Returns the new nice value.
///
/// The kernel clamps the result to the allowed range.
pub fn lower_priority(delta: i32) -> Result<i32> {
    sys::call_with_errno(|| unsafe { libc::nice(delta) }).map_err(|e| Error::query("nice", e))
}

/// Sleep for `duration` with one `nanosleep(2)` call.
pub fn pause(duration: Duration) -> Result<()> {
    // SAFETY: timespec is plain old data.
    let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
    ts.tv_sec = duration.as_secs() as _;
    ts.tv_nsec = duration.subsec_nanos() as _;

    let rc = unsafe { libc::nanosleep(&ts, std::ptr::null_mut()) };
    if rc == -1 {
        return Err(Error::last_os("nanosleep"));
    }
    Ok(())
}

/// Priority demotion runner.
#[derive(Debug)]
pub struct PriorityDemotion {
    config: DemoteConfig,
}

impl PriorityDemotion {
    pub fn new(config: DemoteConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(DemoteConfig::default())
    }

    pub fn config(&self) -> &DemoteConfig {
        &self.config
    }

    /// Lower priority, confirm, pause, confirm.
    ///
    /// Confirmations go to `out` when `out` is `Some`. Either failure aborts
    /// and nothing further is printed.
    pub fn run<W: Write>(&self, mut out: Option<&mut W>) -> Result<DemotionReport> {
        let delta = self.config.delta;
        let nice = lower_priority(delta)?;
        log_event!(
            INFO,
            event_names::PRIORITY_LOWERED,
            Stage::Mutate,
            "priority lowered",
            delta = delta,
            nice = nice
        );
        if let Some(w) = out.as_mut() {
            emit(w, format_args!("Priority successfully reduced by {}.", delta))?;
        }

        pause(self.config.pause)?;
        log_event!(
            DEBUG,
            event_names::PAUSE_FINISHED,
            Stage::Mutate,
            "pause finished",
            pause_ms = self.config.pause.as_millis() as u64
        );
        if let Some(w) = out.as_mut() {
            emit(w, format_args!("Goodbye! Process exiting."))?;
        }

        Ok(DemotionReport {
            delta,
            nice,
            pause_ms: self.config.pause.as_millis() as u64,
        })
    }
}

fn emit<W: Write>(w: &mut W, line: std::fmt::Arguments<'_>) -> Result<()> {
    writeln!(w, "{}", line)
        .and_then(|_| w.flush())
        .map_err(|e: io::Error| Error::query("write stdout", e))
}
