//! Entry point for test programs.
use crate::{
    cli::Opts,
    config::Config,
    errors::Result,
    executor::{isolation, run_child, Executor, Isolation, RunContext},
    printer::Reporter,
    registry::Registration,
};
use std::io;
use structopt::StructOpt;
use tokio::runtime;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "ISOTEST_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber installed by the program itself wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run<R: FnOnce(&mut Registration)>(register: R) -> Result<i32> {
    let opts = Opts::from_args();
    let conf = Config::from_opts(&opts)?;
    let request = isolation::child_request()?;

    let mut suite = Registration::new();
    register(&mut suite);
    let registry = suite.finish()?;

    if let Some(request) = request {
        run_child(&registry, &request, &mut io::stdout())?;
        return Ok(0);
    }

    if conf.isolation == Isolation::InProcess {
        warn!("running tests in-process: a crashing test ends the whole run");
    }

    let runtime = runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mut ctx = RunContext::new();
    let mut reporter = Reporter::new(io::stdout(), &conf);
    let executor = Executor::new(&registry, conf.isolation);
    runtime.block_on(executor.run_all(&mut ctx, &mut reporter))?;
    Ok(ctx.exit_code())
}

/// Register the suite with `register`, run it and exit.
///
/// The exit status is the number of failed and crashed tests, capped at 255,
/// or 1 if the suite could not be registered or run. The same program is
/// started again for each isolated test, so `register` must declare the same
/// fixtures and tests in the same order every time.
pub fn main<R: FnOnce(&mut Registration)>(register: R) -> ! {
    init_logging();
    std::process::exit(match run(register) {
        Err(err) => {
            println!("error: {}", err);
            1
        }
        Ok(failures) => failures,
    })
}
