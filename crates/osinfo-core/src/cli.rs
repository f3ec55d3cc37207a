//! Command-line surface shared by `osinfo` and the standalone tools.
//!
//! Each `run_*` function owns one command end to end: resolve arguments,
//! query the OS, render the report, and map the outcome to an [`ExitCode`].
//! Binaries only parse arguments and call into here.

use crate::demote::PriorityDemotion;
use crate::exit_codes::ExitCode;
use crate::fileinfo::query_file;
use crate::host::collect_snapshot;
use crate::identity::SystemResolver;
use crate::log_event;
use crate::logging::{event_names, init_logging, LogConfig, LogFormat, LogLevel, Stage};
use crate::sched::{read_schedule_info, Target};
use clap::error::ErrorKind;
use clap::{Args, Parser};
use osinfo_common::{Error, OutputFormat, StructuredError};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

/// Options accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl GlobalOpts {
    /// Log level requested on the command line, if any.
    pub fn log_level(&self) -> Option<LogLevel> {
        if self.quiet {
            return Some(LogLevel::Error);
        }
        match self.verbose {
            0 => None,
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }

    /// JSON payloads get JSONL logs so stderr stays machine-readable too.
    pub fn log_format(&self) -> Option<LogFormat> {
        self.format.is_machine().then_some(LogFormat::Jsonl)
    }
}

/// Arguments for the file metadata query.
#[derive(Args, Debug, Clone)]
pub struct FileArgs {
    /// Path to describe
    pub path: PathBuf,

    /// Describe a symbolic link itself rather than its target
    #[arg(long)]
    pub no_follow: bool,
}

/// Arguments for the host summary (none).
#[derive(Args, Debug, Clone, Default)]
pub struct HostArgs {}

/// Arguments for the scheduling query.
#[derive(Args, Debug, Clone, Default)]
pub struct SchedArgs {
    /// Process ID to inspect (defaults to this process)
    #[arg(allow_negative_numbers = true)]
    pub pid: Option<String>,
}

/// Arguments for the priority demotion (none).
#[derive(Args, Debug, Clone, Default)]
pub struct DemoteArgs {}

/// Parse the process arguments, exiting 0 for help/version and 1 for any
/// usage error.
pub fn parse_or_exit<T: Parser>() -> T {
    match T::try_parse() {
        Ok(parsed) => parsed,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    }
}

/// Initialize logging from the environment and the global flags.
pub fn init_logging_for(global: &GlobalOpts) {
    let config = LogConfig::from_env(global.log_level(), global.log_format());
    init_logging(&config);
}

/// Describe one file.
pub fn run_file_info(tool: &'static str, global: &GlobalOpts, args: &FileArgs) -> ExitCode {
    in_tool_span(tool, || {
        match query_file(&args.path, !args.no_follow, &SystemResolver) {
            Ok(report) => emit(global.format, &report, |out| report.write_text(out)),
            Err(err) => fail(&err, global.format, &format!("Usage: {tool} <path>")),
        }
    })
}

/// Print the host snapshot. Probe failures are reported on stderr but never
/// fail the run.
pub fn run_host_info(tool: &'static str, global: &GlobalOpts, _args: &HostArgs) -> ExitCode {
    in_tool_span(tool, || {
        let snapshot = collect_snapshot();
        let code = emit(global.format, &snapshot, |out| {
            let stderr = io::stderr();
            let mut err = stderr.lock();
            snapshot.write_text(out, &mut err)
        });
        if global.format.is_machine() {
            let _ = snapshot.write_failures_jsonl(&mut io::stderr().lock());
        }
        code
    })
}

/// Print scheduling information for a process.
pub fn run_sched_info(tool: &'static str, global: &GlobalOpts, args: &SchedArgs) -> ExitCode {
    in_tool_span(tool, || {
        let usage = format!("Usage: {tool} [PID]");
        let target = match Target::parse(args.pid.as_deref()) {
            Ok(target) => target,
            Err(err) => {
                log_event!(
                    INFO,
                    event_names::TARGET_REJECTED,
                    Stage::Resolve,
                    "target rejected",
                    literal = args.pid.as_deref().unwrap_or_default()
                );
                return fail(&err, global.format, &usage);
            }
        };
        match read_schedule_info(target) {
            Ok(info) => emit(global.format, &info, |out| info.write_text(out)),
            Err(err) => fail(&err, global.format, &usage),
        }
    })
}

/// Lower this process's priority and pause.
pub fn run_demote(tool: &'static str, global: &GlobalOpts, _args: &DemoteArgs) -> ExitCode {
    in_tool_span(tool, || {
        let demotion = PriorityDemotion::with_defaults();
        match global.format {
            OutputFormat::Text => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                match demotion.run(Some(&mut out)) {
                    Ok(_) => ExitCode::Clean,
                    Err(err) => fail(&err, global.format, tool),
                }
            }
            OutputFormat::Json => match demotion.run::<io::Stdout>(None) {
                Ok(report) => emit(global.format, &report, |_| Ok(())),
                Err(err) => fail(&err, global.format, tool),
            },
        }
    })
}

/// Report `err` on stderr in the requested format.
pub fn report_error(err: &Error, format: OutputFormat, usage: &str) {
    match format {
        OutputFormat::Json => eprintln!("{}", StructuredError::from(err).to_json_pretty()),
        OutputFormat::Text => {
            eprintln!("{}", err);
            if err.is_usage() {
                eprintln!("{}", usage);
            }
        }
    }
}

fn fail(err: &Error, format: OutputFormat, usage: &str) -> ExitCode {
    report_error(err, format, usage);
    ExitCode::from(err)
}

fn emit<T, F>(format: OutputFormat, value: &T, text: F) -> ExitCode
where
    T: Serialize,
    F: FnOnce(&mut io::StdoutLock<'static>) -> io::Result<()>,
{
    let mut out = io::stdout().lock();
    let written = match format {
        OutputFormat::Json => serde_json::to_writer_pretty(&mut out, value)
            .map_err(io::Error::from)
            .and_then(|_| writeln!(out)),
        OutputFormat::Text => text(&mut out),
    };
    match written.and_then(|_| out.flush()) {
        Ok(()) => ExitCode::Clean,
        Err(e) => {
            report_error(&Error::query("write stdout", e), format, "");
            ExitCode::IoError
        }
    }
}

fn in_tool_span<F: FnOnce() -> ExitCode>(tool: &'static str, f: F) -> ExitCode {
    let span = tracing::info_span!("tool", tool = tool);
    let _guard = span.enter();
    log_event!(DEBUG, event_names::RUN_STARTED, Stage::Resolve, "run started", tool = tool);
    let code = f();
    log_event!(
        DEBUG,
        event_names::RUN_FINISHED,
        Stage::Format,
        "run finished",
        exit_code = code.as_i32(),
        code_name = code.code_name()
    );
    code
}
