use crate::executor::Isolation;
use std::path::PathBuf;
use structopt::StructOpt;

/// Options for the CLI.
#[derive(StructOpt, Debug)]
#[structopt(about = "Runs a suite of isolated unit tests.")]
pub struct Opts {
    /// Disable colored output.
    #[structopt(long)]
    pub no_color: bool,

    /// Do not show CPU and wall-clock times.
    #[structopt(long)]
    pub no_timing: bool,

    /// Only report failing, crashing and skipped tests.
    #[structopt(short, long)]
    pub quiet: bool,

    /// Where each test runs: `process` (default) or `in-process`.
    #[structopt(long)]
    pub isolation: Option<Isolation>,

    /// TOML file with default options.
    #[structopt(short, long, parse(from_os_str))]
    pub config: Option<PathBuf>,
}
