//! Process isolation for test bodies.
//!
//! The controller re-executes the current program with the index and name
//! of one test unit in the environment. The child registers the same suite,
//! runs that unit's lifecycle and writes its [TestResult] to stdout as a
//! single marker-prefixed JSON line. A child that crashes takes its whole
//! address space with it; the controller only sees how it terminated.
//!
//! A crashed child never reaches its fixture teardown. The controller then
//! starts a second child in the recovery phase, which sets up fresh fixture
//! data and tears it down again without running the body. Setup therefore
//! runs twice for a crashed unit, and teardown sees the recovery child's
//! data rather than the data the body crashed with.
//!
//! Text the body wrote to stdout without a trailing newline is still in the
//! child's buffer when it crashes and is lost.
use super::results::{Status, TestResult};
use crate::{
    errors::{Error, Result},
    format,
    registry::TestUnit,
};
use std::{
    env,
    io::Write,
    process::{ExitStatus, Stdio},
    time::{Duration, Instant},
};
use tokio::process::Command;
use tracing::{debug, warn};

/// Index of the unit an isolated child should run.
pub const CHILD_UNIT_ENV: &str = "ISOTEST_CHILD_UNIT";
/// Name of that unit, checked against the child's own registry.
pub const CHILD_NAME_ENV: &str = "ISOTEST_CHILD_NAME";
/// What the child does with its unit, `run` when unset.
pub const CHILD_PHASE_ENV: &str = "ISOTEST_CHILD_PHASE";

/// Precedes the report on the child's stdout.
const REPORT_MARKER: &str = "\u{1e}isotest-report ";

/// What an isolated child does with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The whole lifecycle.
    Run,
    /// Setup and teardown only, after a crashed run.
    Recover,
}

impl Phase {
    fn as_str(self) -> &'static str {
        match self {
            Phase::Run => "run",
            Phase::Recover => "recover",
        }
    }
}

/// The unit a child process was started for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRequest {
    pub index: usize,
    pub name: String,
    pub phase: Phase,
}

/// Returns the request if this process was started as an isolated child.
pub fn child_request() -> Result<Option<ChildRequest>> {
    let index = match env::var(CHILD_UNIT_ENV) {
        Ok(index) => index,
        Err(_) => return Ok(None),
    };
    let name = env::var(CHILD_NAME_ENV).unwrap_or_default();
    let index = index.parse().map_err(|_| Error::ChildProtocol {
        name: name.clone(),
        reason: format!("{} is not a unit index: {:?}", CHILD_UNIT_ENV, index),
    })?;
    let phase = match env::var(CHILD_PHASE_ENV).as_deref() {
        Err(_) | Ok("run") => Phase::Run,
        Ok("recover") => Phase::Recover,
        Ok(other) => {
            return Err(Error::ChildProtocol {
                name,
                reason: format!("unknown {}: {:?}", CHILD_PHASE_ENV, other),
            })
        }
    };
    Ok(Some(ChildRequest { index, name, phase }))
}

/// Write `result` to the report channel.
pub fn report<W: Write>(result: &TestResult, out: &mut W) -> Result<()> {
    let json = serde_json::to_string(result)?;
    // Start on a fresh line in case the body printed without a newline.
    writeln!(out, "\n{}{}", REPORT_MARKER, json)?;
    out.flush()?;
    Ok(())
}

/// How an isolated child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The child exited with this status code.
    Exited(i32),
    /// The child was killed by this signal.
    Signaled(i32),
}

impl From<ExitStatus> for Termination {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Termination::Signaled(signal);
            }
        }
        Termination::Exited(status.code().unwrap_or(-1))
    }
}

/// A running isolated child.
pub struct Handle {
    name: String,
    started: Instant,
    child: tokio::process::Child,
}

/// Everything the controller learns from a finished child.
#[derive(Debug)]
pub struct Exit {
    pub termination: Termination,
    /// Bytes the child wrote to stdout.
    pub channel: Vec<u8>,
    /// Wall-clock lifetime of the child, measured by the controller.
    pub wall: Duration,
}

/// Start an isolated child for `unit`. The child gets the controller's
/// arguments, so it parses the same configuration.
pub fn spawn(unit: &TestUnit, phase: Phase) -> Result<Handle> {
    let mut cmd = Command::new(env::current_exe()?);
    cmd.args(env::args_os().skip(1))
        .env(CHILD_UNIT_ENV, unit.index.to_string())
        .env(CHILD_NAME_ENV, &unit.name)
        .env(CHILD_PHASE_ENV, phase.as_str())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);
    debug!(
        index = unit.index,
        test = %unit.name,
        phase = phase.as_str(),
        "spawning isolated child"
    );
    Ok(Handle {
        name: unit.name.clone(),
        started: Instant::now(),
        child: cmd.spawn()?,
    })
}

/// Suspend until the child terminates.
pub async fn wait(handle: Handle) -> Result<Exit> {
    let Handle {
        name,
        started,
        child,
    } = handle;
    let output = child.wait_with_output().await?;
    let termination = Termination::from(output.status);
    debug!(test = %name, ?termination, "isolated child finished");
    Ok(Exit {
        termination,
        channel: output.stdout,
        wall: started.elapsed(),
    })
}

/// Split the channel into the text the body printed and the decoded report.
pub fn read_channel(channel: &[u8]) -> (String, Option<Result<TestResult>>) {
    let text = String::from_utf8_lossy(channel);
    match text.rfind(REPORT_MARKER) {
        None => (text.into_owned(), None),
        Some(at) => {
            // Drop the newline `report` inserted before the marker.
            let printed = text[..at].strip_suffix('\n').unwrap_or(&text[..at]);
            let json = text[at + REPORT_MARKER.len()..].trim_end();
            let report = serde_json::from_str(json).map_err(Error::from);
            (printed.to_string(), Some(report))
        }
    }
}

/// Turn a child's termination and report into a result.
pub fn classify(exit: &Exit, report: Option<Result<TestResult>>) -> TestResult {
    let crashed = |message: String| {
        TestResult::crashed(message).with_timing(super::results::Timing {
            wall: exit.wall,
            cpu: None,
        })
    };
    match (exit.termination, report) {
        (Termination::Signaled(signal), _) => {
            crashed(format!("terminated by {}", describe_signal(signal)))
        }
        (Termination::Exited(0), Some(Ok(result))) => result,
        (Termination::Exited(code), Some(Ok(result))) => crashed(format!(
            "exited with status {} after reporting {:?}",
            code, result.status
        )),
        (_, Some(Err(err))) => crashed(format::bounded(format_args!(
            "unreadable report: {}",
            err
        ))),
        (Termination::Exited(code), None) => {
            crashed(format!("exited with status {} before reporting", code))
        }
    }
}

/// True unless the child delivered a readable report, which it only writes
/// after its teardown.
pub fn needs_recovery(report: &Option<Result<TestResult>>) -> bool {
    !matches!(report, Some(Ok(_)))
}

/// Run `unit` in a child process and classify how it ended. The returned
/// text is whatever the children printed to stdout.
pub async fn run_isolated(unit: &TestUnit) -> Result<(TestResult, String)> {
    let exit = wait(spawn(unit, Phase::Run)?).await?;
    let (mut printed, report) = read_channel(&exit.channel);
    let recover = needs_recovery(&report);
    let result = classify(&exit, report);
    if recover {
        printed.push_str(&recover_isolated(unit).await?);
    }
    Ok((result, printed))
}

/// Release the fixture of a crashed unit in a fresh child.
async fn recover_isolated(unit: &TestUnit) -> Result<String> {
    let exit = wait(spawn(unit, Phase::Recover)?).await?;
    let (printed, report) = read_channel(&exit.channel);
    let outcome = classify(&exit, report);
    if outcome.status != Status::Passed {
        warn!(
            test = %unit.name,
            status = ?outcome.status,
            message = outcome.message.as_deref().unwrap_or(""),
            "fixture teardown after a crash did not complete"
        );
    }
    Ok(printed)
}

/// "signal N (NAME)" for the common POSIX signals.
pub fn describe_signal(signal: i32) -> String {
    let name = match signal {
        1 => Some("SIGHUP"),
        2 => Some("SIGINT"),
        3 => Some("SIGQUIT"),
        4 => Some("SIGILL"),
        5 => Some("SIGTRAP"),
        6 => Some("SIGABRT"),
        7 if cfg!(target_os = "linux") => Some("SIGBUS"),
        8 => Some("SIGFPE"),
        9 => Some("SIGKILL"),
        10 if !cfg!(target_os = "linux") => Some("SIGBUS"),
        11 => Some("SIGSEGV"),
        13 => Some("SIGPIPE"),
        14 => Some("SIGALRM"),
        15 => Some("SIGTERM"),
        _ => None,
    };
    match name {
        Some(name) => format!("signal {} ({})", signal, name),
        None => format!("signal {}", signal),
    }
}
