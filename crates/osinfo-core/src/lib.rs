//! osinfo core library
//!
//! POSIX introspection behind four small tools:
//! - File metadata (`finfo`)
//! - Host summary: clock, identity, CPUs, memory (`hostinfo`)
//! - Process priority and scheduling policy (`pinfo`)
//! - Self priority demotion with a timed pause (`pmod`)
//!
//! The `osinfo` binary in `main.rs` dispatches to the same commands.

pub mod cli;
pub mod demote;
pub mod exit_codes;
pub mod fileinfo;
pub mod format;
pub mod host;
pub mod identity;
pub mod logging;
pub mod sched;
pub mod sys;
