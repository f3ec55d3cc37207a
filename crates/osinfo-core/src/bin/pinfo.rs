//! pinfo - priority and scheduling policy of a process.

use clap::Parser;
use osinfo_core::cli::{self, GlobalOpts, SchedArgs};

/// Show priority and scheduling policy of a process (default: this one)
#[derive(Parser)]
#[command(name = "pinfo", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    args: SchedArgs,

    #[command(flatten)]
    global: GlobalOpts,
}

fn main() {
    let cli: Cli = cli::parse_or_exit();
    cli::init_logging_for(&cli.global);
    let code = cli::run_sched_info("pinfo", &cli.global, &cli.args);
    std::process::exit(code.as_i32());
}
