//! Isotest is a unit-testing harness that runs every test in its own process.
//!
//! A test that segfaults, aborts or panics is reported as crashed, and the
//! rest of the suite keeps running. Tests are plain functions over a fixture
//! value, grouped by fixture and registered explicitly.
//!
//! ## Testing Model
//! A *fixture* names a data type and an optional setup and teardown
//! function. Every test runs against a fresh `Default` value of its
//! fixture's type:
//! 1. the data is allocated,
//! 2. the fixture setup runs,
//! 3. the test body runs,
//! 4. the fixture teardown runs, whatever the body did,
//! 5. the data is released.
//!
//! All of this happens inside a child process, so a crash anywhere in the
//! lifecycle only takes the one test down.
//!
//! ## Writing a Suite
//! A test program calls [harness::main] with a function that registers the
//! suite:
//! ```no_run
//! use isotest::{check_eq, check_not_null, check_str_eq, registry::Registration};
//!
//! #[derive(Default)]
//! struct Buffer {
//!     data: Option<Vec<u8>>,
//! }
//!
//! fn register(suite: &mut Registration) {
//!     let buffer = suite.fixture::<Buffer>("Buffer");
//!     suite.setup(&buffer, |b| b.data = Some(Vec::with_capacity(1024)));
//!     suite.teardown(&buffer, |b| b.data = None);
//!
//!     suite.test("copies", &buffer, |b| {
//!         check_not_null!(b.data);
//!         let data = b.data.get_or_insert_with(Vec::new);
//!         data.extend_from_slice(b"hello");
//!         check_eq!(data.len(), 5);
//!     });
//!
//!     suite
//!         .parameterized("lengths", &buffer, |b| {
//!             let text = String::from_utf8_lossy(b.data.as_deref().unwrap_or(&[]));
//!             check_str_eq!(text, "ab");
//!         })
//!         .case(|b| b.data = Some(b"ab".to_vec()))
//!         .case(|b| b.data = Some(vec![b'a', b'b']));
//! }
//!
//! fn main() {
//!     isotest::harness::main(register)
//! }
//! ```
//! Setup and teardown overrides apply to every test of the fixture, including
//! tests registered before the override.
//!
//! ## Assertions
//! The `check_*` macros end the test with a failure when their condition does
//! not hold; nothing after a failed check runs. [skip!] and [skip_if!] end the
//! test as skipped. Failure messages show the source of both operands and
//! their values. Integers, floats, characters, strings and pointers have
//! dedicated renderings; any other type is shown as an opaque address.
//!
//! ## Running a Suite
//! ```text
//! ================================ BEGIN TEST RUN ================================
//! [ START      ] copies
//! [       PASS ] (  0.000/  0.001s) copies
//! [ START      ] lengths(case 1)
//! [       PASS ] (  0.000/  0.001s) lengths(case 1)
//! ...
//! ================================= TEST SUMMARY =================================
//! All 3 tests passed!
//! ```
//! The exit status is the number of failed and crashed tests. `--no-color`,
//! `--no-timing` and `--quiet` adjust the report, and `--config <file>` reads
//! the same options from TOML:
//! ```toml
//! color = false
//! timing = true
//! passing = false
//! isolation = "process"
//! ```
//! `isolation = "in-process"` runs every test in the controlling process.
//! Panics are still contained but a crash ends the run.
//!
//! Set `ISOTEST_LOG` (for example `ISOTEST_LOG=debug`) to see what the runner
//! is doing.
pub mod assert;
pub mod cli;
pub mod config;
pub mod errors;
pub mod executor;
pub mod format;
pub mod harness;
pub mod printer;
pub mod registry;

pub use executor::results::{Status, TestResult};
pub use registry::{Fixture, Registration, Registry};
