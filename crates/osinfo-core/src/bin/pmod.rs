//! pmod - lower this process's priority, then pause.

use clap::Parser;
use osinfo_core::cli::{self, DemoteArgs, GlobalOpts};

/// Lower this process's priority by 10, then pause for about 1.837 seconds
#[derive(Parser)]
#[command(name = "pmod", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    args: DemoteArgs,

    #[command(flatten)]
    global: GlobalOpts,
}

fn main() {
    let cli: Cli = cli::parse_or_exit();
    cli::init_logging_for(&cli.global);
    let code = cli::run_demote("pmod", &cli.global, &cli.args);
    std::process::exit(code.as_i32());
}
