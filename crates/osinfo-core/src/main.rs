//! osinfo - file, host and process introspection
//!
//! One binary with a subcommand per tool. The standalone binaries in
//! `src/bin/` expose the same commands under their historical names.

use clap::{Parser, Subcommand};
use osinfo_core::cli::{
    self, DemoteArgs, FileArgs, GlobalOpts, HostArgs, SchedArgs,
};

/// File, host and process introspection over POSIX interfaces
#[derive(Parser)]
#[command(name = "osinfo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

#[derive(Subcommand)]
enum Commands {
    /// Show size, permissions, owner, group and modification time of a path
    File(FileArgs),
    /// Show clock, system identity, CPU count and memory totals
    Host(HostArgs),
    /// Show priority and scheduling policy of a process
    Sched(SchedArgs),
    /// Lower this process's priority by 10, then pause briefly
    Demote(DemoteArgs),
}

fn main() {
    let cli: Cli = cli::parse_or_exit();
    cli::init_logging_for(&cli.global);

    let exit_code = match &cli.command {
        Commands::File(args) => cli::run_file_info("osinfo file", &cli.global, args),
        Commands::Host(args) => cli::run_host_info("osinfo host", &cli.global, args),
        Commands::Sched(args) => cli::run_sched_info("osinfo sched", &cli.global, args),
        Commands::Demote(args) => cli::run_demote("osinfo demote", &cli.global, args),
    };

    std::process::exit(exit_code.as_i32());
}
