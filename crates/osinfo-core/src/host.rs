//! Host snapshot collection.
//!
//! Four independent probes feed a [`HostSnapshot`]:
//! - wall clock (`clock_gettime(CLOCK_REALTIME)`)
//! - system identity (`uname(2)`, all five fields as one unit)
//! - online CPU count (`sysconf(_SC_NPROCESSORS_ONLN)`)
//! - total/free memory (`/proc/meminfo`)
//!
//! A failing probe never blocks the others. Its slot becomes
//! [`Field::Unavailable`] and collection continues.

use crate::log_event;
use crate::logging::{event_names, Stage};
use crate::sys::c_chars_to_string;
use osinfo_common::{Error, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Default memory status source.
pub const MEMINFO_PATH: &str = "/proc/meminfo";

const MEM_TOTAL_LABEL: &str = "MemTotal:";
const MEM_FREE_LABEL: &str = "MemFree:";

/// Outcome of one probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Field<T> {
    Available { value: T },
    Unavailable { op: String, reason: String },
}

impl<T> Field<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Available { value } => Some(value),
            Field::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Field::Available { .. })
    }
}

impl<T> From<Result<T>> for Field<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Field::Available { value },
            Err(err) => Field::Unavailable {
                op: err.operation().unwrap_or("probe").to_string(),
                reason: err.to_string(),
            },
        }
    }
}

/// Realtime clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockReading {
    pub seconds: i64,
    pub nanoseconds: i64,
}

impl ClockReading {
    /// Whole reading expressed in nanoseconds since the epoch.
    pub fn total_nanos(&self) -> i128 {
        i128::from(self.seconds) * 1_000_000_000 + i128::from(self.nanoseconds)
    }
}

/// Kernel and machine identity from `uname(2)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemIdentity {
    pub node_name: String,
    pub sysname: String,
    pub release: String,
    pub version: String,
    pub machine: String,
}

/// Memory totals in bytes. A field the source did not report stays `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemoryInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_bytes: Option<u64>,
}

impl MemoryInfo {
    fn complete(&self) -> bool {
        self.total_bytes.is_some() && self.free_bytes.is_some()
    }
}

/// Where the file-backed probes read from.
#[derive(Debug, Clone)]
pub struct ProbePaths {
    pub meminfo: PathBuf,
}

impl Default for ProbePaths {
    fn default() -> Self {
        ProbePaths {
            meminfo: PathBuf::from(MEMINFO_PATH),
        }
    }
}

/// Best-effort host summary.
#[derive(Debug, Clone, Serialize)]
pub struct HostSnapshot {
    pub clock: Field<ClockReading>,
    pub identity: Field<SystemIdentity>,
    pub cpus: Field<u64>,
    pub memory: Field<MemoryInfo>,
}

impl HostSnapshot {
    /// Every unavailable field, in probe order.
    pub fn failures(&self) -> Vec<ProbeFailure> {
        [
            ProbeFailure::of("clock", &self.clock),
            ProbeFailure::of("identity", &self.identity),
            ProbeFailure::of("cpus", &self.cpus),
            ProbeFailure::of("memory", &self.memory),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Write one JSON object per failed probe, each on its own line.
    pub fn write_failures_jsonl<E: Write>(&self, err: &mut E) -> io::Result<()> {
        for failure in self.failures() {
            serde_json::to_writer(&mut *err, &failure)?;
            writeln!(err)?;
        }
        Ok(())
    }

    /// Write available fields to `out` and a line per failure to `err`.
    pub fn write_text<W: Write, E: Write>(&self, out: &mut W, err: &mut E) -> io::Result<()> {
        writeln!(out, "System Information:")?;

        match &self.clock {
            Field::Available { value } => {
                writeln!(out, "Current Time (seconds): {}", value.seconds)?;
                writeln!(out, "Current Time (nanoseconds): {}", value.total_nanos())?;
            }
            Field::Unavailable { reason, .. } => writeln!(err, "{}", reason)?,
        }

        match &self.identity {
            Field::Available { value } => {
                writeln!(out, "System Network Name: {}", value.node_name)?;
                writeln!(out, "Operating System: {}", value.sysname)?;
                writeln!(out, "OS Release: {}", value.release)?;
                writeln!(out, "OS Version: {}", value.version)?;
                writeln!(out, "Hardware Type: {}", value.machine)?;
            }
            Field::Unavailable { reason, .. } => writeln!(err, "{}", reason)?,
        }

        match &self.cpus {
            Field::Available { value } => writeln!(out, "Number of CPUs: {}", value)?,
            Field::Unavailable { reason, .. } => writeln!(err, "{}", reason)?,
        }

        match &self.memory {
            Field::Available { value } => {
                if let Some(total) = value.total_bytes {
                    writeln!(out, "Total Memory: {} bytes", total)?;
                }
                if let Some(free) = value.free_bytes {
                    writeln!(out, "Free Memory: {} bytes", free)?;
                }
            }
            Field::Unavailable { reason, .. } => writeln!(err, "{}", reason)?,
        }

        Ok(())
    }
}

/// A probe that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeFailure {
    pub probe: &'static str,
    pub operation: String,
    pub message: String,
}

impl ProbeFailure {
    fn of<T>(probe: &'static str, field: &Field<T>) -> Option<Self> {
        match field {
            Field::Unavailable { op, reason } => Some(ProbeFailure {
                probe,
                operation: op.clone(),
                message: reason.clone(),
            }),
            Field::Available { .. } => None,
        }
    }
}

/// Read the realtime clock.
pub fn read_clock() -> Result<ClockReading> {
    // SAFETY: timespec is plain old data; clock_gettime fills it in.
    let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_REALTIME, &mut ts) };
    if rc == -1 {
        return Err(Error::last_os("clock_gettime"));
    }
    Ok(ClockReading {
        seconds: ts.tv_sec as i64,
        nanoseconds: ts.tv_nsec as i64,
    })
}

/// Read kernel name, release, version, node name and machine in one call.
pub fn read_identity() -> Result<SystemIdentity> {
    let mut uts = std::mem::MaybeUninit::<libc::utsname>::uninit();
    let rc = unsafe { libc::uname(uts.as_mut_ptr()) };
    if rc == -1 {
        return Err(Error::last_os("uname"));
    }
    // SAFETY: uname returned success, so every field is initialized.
    let uts = unsafe { uts.assume_init() };
    Ok(SystemIdentity {
        node_name: c_chars_to_string(&uts.nodename),
        sysname: c_chars_to_string(&uts.sysname),
        release: c_chars_to_string(&uts.release),
        version: c_chars_to_string(&uts.version),
        machine: c_chars_to_string(&uts.machine),
    })
}

/// Count processors currently online.
pub fn read_online_cpus() -> Result<u64> {
    let count = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
    if count < 0 {
        let err = io::Error::last_os_error();
        let source = if err.raw_os_error().unwrap_or(0) == 0 {
            io::Error::new(io::ErrorKind::Unsupported, "online processor count not reported")
        } else {
            err
        };
        return Err(Error::query("sysconf", source));
    }
    Ok(count as u64)
}

/// Read total/free memory from [`MEMINFO_PATH`].
pub fn read_memory() -> Result<MemoryInfo> {
    read_memory_from(MEMINFO_PATH)
}

/// Read total/free memory from a meminfo-formatted file.
pub fn read_memory_from(path: impl AsRef<Path>) -> Result<MemoryInfo> {
    let file = File::open(path.as_ref()).map_err(|e| Error::query("open meminfo", e))?;
    Ok(parse_meminfo(BufReader::new(file)))
}

/// Scan meminfo lines for `MemTotal:` and `MemFree:` (kB), stopping as soon
/// as both are seen. Values are returned in bytes.
///
/// Lines that are not valid UTF-8 are skipped. A read error ends the scan
/// and whatever was found so far is kept.
pub fn parse_meminfo<R: BufRead>(reader: R) -> MemoryInfo {
    let mut info = MemoryInfo::default();
    for raw in reader.split(b'\n').map_while(io::Result::ok) {
        let Ok(line) = std::str::from_utf8(&raw) else {
            continue;
        };
        if let Some(rest) = line.strip_prefix(MEM_TOTAL_LABEL) {
            info.total_bytes = info.total_bytes.or_else(|| parse_kib(rest));
        } else if let Some(rest) = line.strip_prefix(MEM_FREE_LABEL) {
            info.free_bytes = info.free_bytes.or_else(|| parse_kib(rest));
        }
        if info.complete() {
            break;
        }
    }
    info
}

fn parse_kib(rest: &str) -> Option<u64> {
    rest.split_whitespace()
        .next()?
        .parse::<u64>()
        .ok()?
        .checked_mul(1024)
}

/// Run every probe against the default sources.
pub fn collect_snapshot() -> HostSnapshot {
    collect_snapshot_with(&ProbePaths::default())
}

/// Run every probe, reading file-backed sources from `paths`.
pub fn collect_snapshot_with(paths: &ProbePaths) -> HostSnapshot {
    HostSnapshot {
        clock: probe("clock", read_clock()),
        identity: probe("identity", read_identity()),
        cpus: probe("cpus", read_online_cpus()),
        memory: probe("memory", read_memory_from(&paths.meminfo)),
    }
}

fn probe<T>(name: &'static str, result: Result<T>) -> Field<T> {
    match &result {
        Ok(_) => {
            log_event!(DEBUG, event_names::PROBE_OK, Stage::Query, "probe succeeded", probe = name);
        }
        Err(err) => {
            log_event!(
                INFO,
                event_names::PROBE_FAILED,
                Stage::Query,
                "probe failed",
                probe = name,
                error = tracing::field::display(err)
            );
        }
    }
    Field::from(result)
}
