//! Reports test progress and the final summary as text.
pub mod diff;

use crate::{
    config::Config,
    executor::{
        results::{Status, TestResult, Timing},
        RunContext,
    },
    registry::TestUnit,
};
use colored::{ColoredString, Colorize};
use std::io::{self, Write};

const RULE_WIDTH: usize = 80;

/// Styles used for the different parts of the report.
#[derive(Clone, Copy)]
enum Style {
    Header,
    Start,
    Pass,
    Fail,
    Skip,
    Runtime,
    Mute,
    Value,
}

impl Style {
    fn apply(self, text: &str) -> ColoredString {
        match self {
            Style::Header => text.bold(),
            Style::Start => text.blue().bold(),
            Style::Pass => text.green().bold(),
            Style::Fail => text.red().bold(),
            Style::Skip => text.bright_black().bold(),
            Style::Runtime => text.cyan(),
            Style::Mute => text.bright_black(),
            Style::Value => text.yellow(),
        }
    }
}

/// Writes one line per test and a trailing summary to `out`.
pub struct Reporter<W: Write> {
    out: W,
    color: bool,
    timing: bool,
    passing: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, conf: &Config) -> Self {
        Self {
            out,
            color: conf.color,
            timing: conf.timing,
            passing: conf.passing,
        }
    }

    /// Consume the reporter and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            style.apply(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// A line of `=` with `title` centered in it.
    fn rule(&self, title: &str) -> String {
        let title = format!(" {} ", title);
        let left = RULE_WIDTH.saturating_sub(title.len()) / 2;
        let right = RULE_WIDTH.saturating_sub(title.len() + left);
        self.paint(
            &format!("{}{}{}", "=".repeat(left), title, "=".repeat(right)),
            Style::Header,
        )
    }

    pub fn header(&mut self) -> io::Result<()> {
        let line = self.rule("BEGIN TEST RUN");
        writeln!(self.out, "{}", line)
    }

    /// Announce that `unit` is about to run.
    pub fn start(&mut self, unit: &TestUnit) -> io::Result<()> {
        if !self.passing {
            return Ok(());
        }
        let tag = self.paint("[ START      ]", Style::Start);
        writeln!(self.out, "{} {}", tag, unit.name)?;
        self.out.flush()
    }

    /// Text the isolated test wrote to its standard output.
    pub fn passthrough(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    fn timing_str(&self, timing: Option<&Timing>) -> String {
        match timing {
            Some(Timing { wall, cpu }) if self.timing => {
                let cpu = cpu
                    .map(|cpu| format!("{:7.3}", cpu.as_secs_f64()))
                    .unwrap_or_else(|| format!("{:>7}", "n/a"));
                let text =
                    format!("({}/{:7.3}s)", cpu, wall.as_secs_f64());
                format!(" {}", self.paint(&text, Style::Runtime))
            }
            _ => String::new(),
        }
    }

    /// Report the result of running `unit`.
    pub fn result(
        &mut self,
        unit: &TestUnit,
        result: &TestResult,
    ) -> io::Result<()> {
        let (tag, style) = match result.status {
            Status::Passed if !self.passing => return Ok(()),
            Status::Passed => ("[       PASS ]", Style::Pass),
            Status::Failed => ("[       FAIL ]", Style::Fail),
            Status::Skipped => ("[       SKIP ]", Style::Skip),
            Status::Crashed => ("[      CRASH ]", Style::Fail),
        };
        let tag = self.paint(tag, style);
        let timing = match result.status {
            Status::Skipped => String::new(),
            _ => self.timing_str(result.timing.as_ref()),
        };
        writeln!(self.out, "{}{} {}", tag, timing, unit.name)?;

        if let Some(message) = &result.message {
            let style = match result.status {
                Status::Skipped => Style::Mute,
                _ => Style::Value,
            };
            for line in message.lines() {
                let line = self.paint(line, style);
                writeln!(self.out, "    {}", line)?;
            }
        }
        self.out.flush()
    }

    /// Print the totals for the run.
    pub fn summary(&mut self, ctx: &RunContext) -> io::Result<()> {
        let rule = self.rule("TEST SUMMARY");
        writeln!(self.out)?;
        writeln!(self.out, "{}", rule)?;
        if ctx.failures() == 0 {
            let line =
                self.paint(&format!("All {} tests passed!", ctx.passed), Style::Pass);
            writeln!(self.out, "{}", line)?;
        } else {
            let passed = self.paint("Test(s) passed:", Style::Pass);
            let failed = self.paint("Test(s) failed:", Style::Fail);
            writeln!(self.out, "{} {}", passed, ctx.passed)?;
            writeln!(self.out, "{} {}", failed, ctx.failures())?;
        }
        if ctx.skipped > 0 {
            let skipped = self.paint("Test(s) skipped:", Style::Value);
            writeln!(self.out, "{} {}", skipped, ctx.skipped)?;
        }
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Registration, TestUnit};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn plain(timing: bool, passing: bool) -> Reporter<Vec<u8>> {
        let conf = Config {
            color: false,
            timing,
            passing,
            ..Config::default()
        };
        Reporter::new(Vec::new(), &conf)
    }

    fn output(reporter: Reporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    fn with_unit<F: FnOnce(&TestUnit)>(name: &str, f: F) {
        let mut suite = Registration::new();
        let fixture = suite.fixture::<()>("Plain");
        suite.test(name, &fixture, |_| {});
        let registry = suite.finish().unwrap();
        f(registry.tests.get(0).unwrap());
    }

    #[test]
    fn boxed_rules_are_eighty_columns() {
        let mut reporter = plain(false, true);
        reporter.header().unwrap();
        reporter.summary(&RunContext::new()).unwrap();
        let text = output(reporter);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "================================ BEGIN TEST RUN ================================"
        );
        assert_eq!(
            lines[2],
            "================================= TEST SUMMARY ================================="
        );
        assert_eq!(lines[3], "All 0 tests passed!");
    }

    #[test]
    fn failure_message_is_indented_under_the_tag() {
        with_unit("adds", |unit| {
            let mut reporter = plain(false, true);
            reporter.start(unit).unwrap();
            reporter
                .result(unit, &TestResult::failed("line one\nline two"))
                .unwrap();
            assert_eq!(
                output(reporter),
                "[ START      ] adds\n[       FAIL ] adds\n    line one\n    line two\n"
            );
        });
    }

    #[test]
    fn timing_suffix_shows_cpu_and_wall() {
        with_unit("timed", |unit| {
            let mut reporter = plain(true, true);
            let result = TestResult::passed().with_timing(Timing {
                wall: Duration::from_millis(1500),
                cpu: Some(Duration::from_millis(250)),
            });
            reporter.result(unit, &result).unwrap();
            assert_eq!(
                output(reporter),
                "[       PASS ] (  0.250/  1.500s) timed\n"
            );
        });
    }

    #[test]
    fn quiet_mode_hides_passing_tests() {
        with_unit("quiet", |unit| {
            let mut reporter = plain(false, false);
            reporter.start(unit).unwrap();
            reporter.result(unit, &TestResult::passed()).unwrap();
            reporter
                .result(unit, &TestResult::skipped("not ready"))
                .unwrap();
            assert_eq!(output(reporter), "[       SKIP ] quiet\n    not ready\n");
        });
    }

    #[test]
    fn summary_counts_crashes_as_failures() {
        let mut ctx = RunContext::new();
        ctx.record(&TestResult::passed());
        ctx.record(&TestResult::failed("x"));
        ctx.record(&TestResult::crashed("y"));
        ctx.record(&TestResult::skipped("z"));
        let mut reporter = plain(false, true);
        reporter.summary(&ctx).unwrap();
        let text = output(reporter);
        assert!(text.contains("Test(s) passed: 1\n"), "{}", text);
        assert!(text.contains("Test(s) failed: 2\n"), "{}", text);
        assert!(text.contains("Test(s) skipped: 1\n"), "{}", text);
    }
}
