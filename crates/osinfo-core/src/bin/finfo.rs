//! finfo - describe one file.

use clap::Parser;
use osinfo_core::cli::{self, FileArgs, GlobalOpts};

/// Show size, permissions, owner, group and modification time of a path
#[derive(Parser)]
#[command(name = "finfo", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    args: FileArgs,

    #[command(flatten)]
    global: GlobalOpts,
}

fn main() {
    let cli: Cli = cli::parse_or_exit();
    cli::init_logging_for(&cli.global);
    let code = cli::run_file_info("finfo", &cli.global, &cli.args);
    std::process::exit(code.as_i32());
}
