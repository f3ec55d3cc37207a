//! hostinfo - best-effort host summary.

use clap::Parser;
use osinfo_core::cli::{self, GlobalOpts, HostArgs};

/// Show clock, system identity, CPU count and memory totals
#[derive(Parser)]
#[command(name = "hostinfo", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    args: HostArgs,

    #[command(flatten)]
    global: GlobalOpts,
}

fn main() {
    let cli: Cli = cli::parse_or_exit();
    cli::init_logging_for(&cli.global);
    let code = cli::run_host_info("hostinfo", &cli.global, &cli.args);
    std::process::exit(code.as_i32());
}
