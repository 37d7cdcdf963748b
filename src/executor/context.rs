use super::{
    isolation::{self, ChildRequest, Phase},
    recover_unit,
    results::{Status, TestResult},
    run_unit, Isolation,
};
use crate::{
    errors::{Error, Result},
    printer::Reporter,
    registry::{Registry, TestUnit},
};
use std::io::Write;
use tracing::debug;

/// Running totals for one execution of the suite.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub passed: usize,
    pub failed: usize,
    pub crashed: usize,
    pub skipped: usize,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `result` towards the totals.
    pub fn record(&mut self, result: &TestResult) {
        match result.status {
            Status::Passed => self.passed += 1,
            Status::Failed => self.failed += 1,
            Status::Crashed => self.crashed += 1,
            Status::Skipped => self.skipped += 1,
        }
    }

    /// Number of units that have been recorded.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.crashed + self.skipped
    }

    /// Failed and crashed units.
    pub fn failures(&self) -> usize {
        self.failed + self.crashed
    }

    /// Process exit status for the run.
    pub fn exit_code(&self) -> i32 {
        self.failures().min(255) as i32
    }
}

/// An executor runs the units of a registry one after another.
pub struct Executor<'a> {
    registry: &'a Registry,
    isolation: Isolation,
}

impl<'a> Executor<'a> {
    pub fn new(registry: &'a Registry, isolation: Isolation) -> Self {
        Self {
            registry,
            isolation,
        }
    }

    async fn run(&self, unit: &TestUnit) -> Result<(TestResult, String)> {
        match self.isolation {
            Isolation::Process => isolation::run_isolated(unit).await,
            Isolation::InProcess => Ok((run_unit(unit), String::new())),
        }
    }

    /// Run every unit in registration order, reporting each result as soon
    /// as it is known and the totals at the end.
    pub async fn run_all<W: Write>(
        &self,
        ctx: &mut RunContext,
        reporter: &mut Reporter<W>,
    ) -> Result<()> {
        reporter.header()?;
        for unit in self.registry.units() {
            reporter.start(unit)?;
            let (result, printed) = self.run(unit).await?;
            reporter.passthrough(&printed)?;
            ctx.record(&result);
            reporter.result(unit, &result)?;
        }
        debug!(?ctx, "run finished");
        reporter.summary(ctx)?;
        Ok(())
    }
}

/// Run the phase an isolated child was started for and write its report.
pub fn run_child<W: Write>(
    registry: &Registry,
    request: &ChildRequest,
    out: &mut W,
) -> Result<()> {
    let unit = registry
        .tests
        .get(request.index)
        .filter(|unit| unit.name == request.name)
        .ok_or_else(|| Error::UnknownUnit {
            index: request.index,
            name: request.name.clone(),
        })?;
    debug!(
        index = unit.index,
        test = %unit.name,
        phase = ?request.phase,
        "running as isolated child"
    );
    let result = match request.phase {
        Phase::Run => run_unit(unit),
        Phase::Recover => recover_unit(unit),
    };
    isolation::report(&result, out)
}
