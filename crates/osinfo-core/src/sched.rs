//! Process scheduling state: nice value and scheduling policy.

use crate::log_event;
use crate::logging::{event_names, Stage};
use crate::sys;
use osinfo_common::{Error, Result};
use serde::Serialize;
use std::io::{self, Write};

/// Flag the kernel may OR into a policy code; never part of the policy itself.
const SCHED_RESET_ON_FORK: i32 = 0x4000_0000;

#[cfg(any(target_os = "linux", target_os = "android"))]
use libc::{SCHED_BATCH, SCHED_IDLE};
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const SCHED_BATCH: i32 = 3;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const SCHED_IDLE: i32 = 5;

const SCHED_DEADLINE: i32 = 6;

/// Which process to inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The calling process.
    Current,
    /// A specific process ID, always in `1..=i32::MAX`.
    Pid(u32),
}

impl Target {
    /// Resolve an optional PID literal.
    ///
    /// No literal selects the caller. Anything that is not a positive integer
    /// representable as a `pid_t` is rejected without touching the OS.
    pub fn parse(arg: Option<&str>) -> Result<Self> {
        let Some(raw) = arg else {
            return Ok(Target::Current);
        };
        match raw.parse::<i64>() {
            Ok(n) if n > 0 && n <= i64::from(libc::pid_t::MAX) => Ok(Target::Pid(n as u32)),
            _ => Err(Error::InvalidTarget(raw.to_string())),
        }
    }

    /// Concrete process ID this target refers to.
    pub fn pid(&self) -> u32 {
        match self {
            Target::Current => std::process::id(),
            Target::Pid(pid) => *pid,
        }
    }
}

/// Scheduling policy, from a closed table of known codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedPolicy {
    Normal,
    Fifo,
    RoundRobin,
    Batch,
    Idle,
    Deadline,
    Unknown,
}

impl SchedPolicy {
    pub fn from_code(code: i32) -> Self {
        match code & !SCHED_RESET_ON_FORK {
            libc::SCHED_OTHER => SchedPolicy::Normal,
            libc::SCHED_FIFO => SchedPolicy::Fifo,
            libc::SCHED_RR => SchedPolicy::RoundRobin,
            SCHED_BATCH => SchedPolicy::Batch,
            SCHED_IDLE => SchedPolicy::Idle,
            SCHED_DEADLINE => SchedPolicy::Deadline,
            _ => SchedPolicy::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SchedPolicy::Normal => "Normal",
            SchedPolicy::Fifo => "FIFO",
            SchedPolicy::RoundRobin => "Round Robin",
            SchedPolicy::Batch => "Batch",
            SchedPolicy::Idle => "Idle",
            SchedPolicy::Deadline => "Deadline",
            SchedPolicy::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for SchedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Scheduling snapshot for one process.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessScheduleInfo {
    pub pid: u32,
    pub priority: i32,
    pub policy: SchedPolicy,
}

impl ProcessScheduleInfo {
    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Process ID: {}", self.pid)?;
        writeln!(out, "Priority: {}", self.priority)?;
        writeln!(out, "Scheduling Method: {}", self.policy)
    }
}

/// Nice value of `pid` via `getpriority(2)`.
pub fn read_priority(pid: u32) -> Result<i32> {
    sys::call_with_errno(|| unsafe { libc::getpriority(libc::PRIO_PROCESS, pid as libc::id_t) })
        .map_err(|e| Error::query("getpriority", e))
}

/// Raw policy code of `pid` via `sched_getscheduler(2)`.
#[cfg(target_os = "linux")]
pub fn read_policy(pid: u32) -> Result<SchedPolicy> {
    let code = unsafe { libc::sched_getscheduler(pid as libc::pid_t) };
    if code == -1 {
        return Err(Error::last_os("sched_getscheduler"));
    }
    Ok(SchedPolicy::from_code(code))
}

#[cfg(not(target_os = "linux"))]
pub fn read_policy(_pid: u32) -> Result<SchedPolicy> {
    Err(Error::query(
        "sched_getscheduler",
        io::Error::new(io::ErrorKind::Unsupported, "not supported on this platform"),
    ))
}

/// Read priority and policy of `target`. Either failure fails the query.
pub fn read_schedule_info(target: Target) -> Result<ProcessScheduleInfo> {
    let pid = target.pid();
    log_event!(DEBUG, event_names::TARGET_RESOLVED, Stage::Resolve, "target resolved", pid = pid);

    let info = read_priority(pid).and_then(|priority| {
        read_policy(pid).map(|policy| ProcessScheduleInfo {
            pid,
            priority,
            policy,
        })
    });

    match &info {
        Ok(info) => log_event!(
            DEBUG,
            event_names::PROBE_OK,
            Stage::Query,
            "schedule read",
            pid = pid,
            priority = info.priority,
            policy = info.policy.label()
        ),
        Err(err) => log_event!(
            INFO,
            event_names::PROBE_FAILED,
            Stage::Query,
            "schedule query failed",
            pid = pid,
            error = tracing::field::display(err)
        ),
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Numbered field of `/proc/<pid>/stat` (1-based, `state` is field 3).
    #[cfg(target_os = "linux")]
    fn proc_stat_field(pid: u32, field: usize) -> Option<i32> {
        let content = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
        let comm_end = content.rfind(')')?;
        let after_comm = content.get(comm_end + 2..)?;
        after_comm.split_whitespace().nth(field - 3)?.parse().ok()
    }

    #[cfg(target_os = "linux")]
    fn proc_nice(pid: u32) -> Option<i32> {
        proc_stat_field(pid, 19)
    }

    #[cfg(target_os = "linux")]
    fn proc_policy(pid: u32) -> Option<i32> {
        proc_stat_field(pid, 41)
    }

    #[test]
    fn parse_absent_is_current() {
        assert_eq!(Target::parse(None).unwrap(), Target::Current);
        assert_eq!(Target::Current.pid(), std::process::id());
    }

    #[test]
    fn parse_valid_pid() {
        assert_eq!(Target::parse(Some("1")).unwrap(), Target::Pid(1));
        assert_eq!(Target::parse(Some("4242")).unwrap().pid(), 4242);
        assert_eq!(
            Target::parse(Some("2147483647")).unwrap(),
            Target::Pid(i32::MAX as u32)
        );
    }

    #[test]
    fn parse_rejects_invalid_literals() {
        for raw in ["0", "-5", "abc", "", "12abc", "2147483648", "99999999999999999999"] {
            let err = Target::parse(Some(raw)).unwrap_err();
            assert!(matches!(err, Error::InvalidTarget(ref s) if s == raw), "{raw}");
            assert!(err.is_usage());
        }
    }

    #[test]
    fn policy_table() {
        assert_eq!(SchedPolicy::from_code(0).label(), "Normal");
        assert_eq!(SchedPolicy::from_code(1).label(), "FIFO");
        assert_eq!(SchedPolicy::from_code(2).label(), "Round Robin");
        assert_eq!(SchedPolicy::from_code(3).label(), "Batch");
        assert_eq!(SchedPolicy::from_code(5).label(), "Idle");
        assert_eq!(SchedPolicy::from_code(6).label(), "Deadline");
        assert_eq!(SchedPolicy::from_code(4).label(), "Unknown");
        assert_eq!(SchedPolicy::from_code(-3).label(), "Unknown");
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn libc_policy_codes_map() {
        assert_eq!(SchedPolicy::from_code(libc::SCHED_BATCH), SchedPolicy::Batch);
        assert_eq!(SchedPolicy::from_code(libc::SCHED_IDLE), SchedPolicy::Idle);
        assert_eq!(
            SchedPolicy::from_code(libc::SCHED_IDLE | SCHED_RESET_ON_FORK),
            SchedPolicy::Idle
        );
    }

    #[test]
    fn reset_on_fork_bit_is_ignored() {
        assert_eq!(
            SchedPolicy::from_code(libc::SCHED_RR | SCHED_RESET_ON_FORK),
            SchedPolicy::RoundRobin
        );
    }

    #[test]
    fn write_text_lines() {
        let info = ProcessScheduleInfo {
            pid: 7,
            priority: -1,
            policy: SchedPolicy::Batch,
        };
        let mut out = Vec::new();
        info.write_text(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Process ID: 7\nPriority: -1\nScheduling Method: Batch\n"
        );
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn self_schedule_matches_proc_stat() {
        let info = read_schedule_info(Target::Current).unwrap();
        assert_eq!(info.pid, std::process::id());
        assert_eq!(Some(info.priority), proc_nice(info.pid));
        let policy = proc_policy(info.pid).map(SchedPolicy::from_code);
        assert_eq!(policy, Some(info.policy));
        assert_ne!(info.policy, SchedPolicy::Unknown);
    }

    #[test]
    fn nonexistent_pid_fails_on_getpriority() {
        let err = read_schedule_info(Target::Pid(999_999_999)).unwrap_err();
        assert_eq!(err.operation(), Some("getpriority"));
        assert_eq!(err.raw_os_error(), Some(libc::ESRCH));
    }

    #[cfg(target_os = "linux")]
    mod child_tests {
        use super::*;
        use std::process::Command;

        struct ChildGuard(std::process::Child);

        impl Drop for ChildGuard {
            fn drop(&mut self) {
                let _ = self.0.kill();
                let _ = self.0.wait();
            }
        }

        #[test]
        fn reads_reniced_child() {
            let child = Command::new("sleep")
                .arg("60")
                .spawn()
                .expect("failed to spawn sleep");
            let pid = child.id();
            let _guard = ChildGuard(child);

            let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, pid as libc::id_t, 15) };
            assert_eq!(rc, 0);

            let info = read_schedule_info(Target::Pid(pid)).unwrap();
            assert_eq!(info.pid, pid);
            assert_eq!(info.priority, 15);
            assert_eq!(info.policy, SchedPolicy::Normal);
        }
    }

    proptest! {
        #[test]
        fn any_positive_pid_literal_round_trips(pid in 1u32..=(i32::MAX as u32)) {
            prop_assert_eq!(Target::parse(Some(&pid.to_string())).unwrap(), Target::Pid(pid));
        }

        #[test]
        fn non_numeric_literals_rejected(raw in "[a-zA-Z_ ]{1,12}") {
            prop_assert!(Target::parse(Some(&raw)).is_err());
        }

        #[test]
        fn from_code_never_panics(code in any::<i32>()) {
            let _ = SchedPolicy::from_code(code).label();
        }
    }
}
