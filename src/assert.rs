//! Assertions and skips for test bodies.
//!
//! Every macro evaluates each operand exactly once. A failing assertion or a
//! skip ends the current test body immediately: it unwinds with an
//! [Interrupt] payload that the executor turns into a result. The unwind goes
//! through [std::panic::resume_unwind], so the panic hook never prints it.
//! Bodies must therefore be built with `panic = "unwind"`.
use crate::{format, printer::diff};
use std::{fmt, panic, ptr::NonNull};

/// Why a test body stopped early.
#[derive(Debug, Clone, PartialEq)]
pub enum Interrupt {
    /// An assertion did not hold. Contains the diagnostic.
    Failed(String),
    /// The test asked to be skipped. Contains the reason.
    Skipped(String),
}

/// End the running test as failed with `message`.
pub fn fail(message: String) -> ! {
    panic::resume_unwind(Box::new(Interrupt::Failed(format::clamp(message))))
}

/// End the running test as skipped with `message`.
pub fn skip(message: String) -> ! {
    panic::resume_unwind(Box::new(Interrupt::Skipped(format::clamp(message))))
}

/// Comparison applied by an assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cmp {
    pub fn symbol(self) -> &'static str {
        match self {
            Cmp::Eq => "==",
            Cmp::Ne => "!=",
            Cmp::Lt => "<",
            Cmp::Le => "<=",
            Cmp::Gt => ">",
            Cmp::Ge => ">=",
        }
    }
}

impl fmt::Display for Cmp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Where an assertion was written and the source text of its operands.
#[doc(hidden)]
pub struct Site {
    pub file: &'static str,
    pub line: u32,
    pub actual: &'static str,
    pub expected: &'static str,
}

/// Build the diagnostic written for a failed assertion.
pub fn diagnostic(
    headline: fmt::Arguments,
    value_1: &str,
    value_2: &str,
    file: &str,
    line: u32,
) -> String {
    format::bounded(format_args!(
        "Assertion failed! {}\n    Value 1: {}\n    Value 2: {}\nFile: {}:{}",
        headline, value_1, value_2, file, line
    ))
}

#[doc(hidden)]
pub fn fail_comparison(
    site: &Site,
    cmp: Cmp,
    actual: String,
    expected: String,
) -> ! {
    fail(diagnostic(
        format_args!("({}) {} ({})", site.actual, cmp, site.expected),
        &actual,
        &expected,
        site.file,
        site.line,
    ))
}

#[doc(hidden)]
pub fn fail_str(site: &Site, cmp: Cmp, actual: &str, expected: &str) -> ! {
    let mut message = diagnostic(
        format_args!("({}) {} ({})", site.actual, cmp, site.expected),
        &format::render(actual),
        &format::render(expected),
        site.file,
        site.line,
    );
    if cmp == Cmp::Eq && (actual.contains('\n') || expected.contains('\n')) {
        message.push('\n');
        message.push_str(&diff::gen_diff(expected, actual, false));
    }
    fail(message)
}

#[doc(hidden)]
pub fn fail_truth(file: &str, line: u32, source: &str, expected: bool) -> ! {
    fail(diagnostic(
        format_args!("Expression is {}: ({})", expected, source),
        &format!("{} (expected)", expected),
        &(!expected).to_string(),
        file,
        line,
    ))
}

#[doc(hidden)]
pub fn fail_null(
    file: &str,
    line: u32,
    source: &str,
    expected_null: bool,
    actual: String,
) -> ! {
    let (headline, expected) = if expected_null {
        ("non-null", "null (0x0)")
    } else {
        ("null", "non-null (!= 0x0)")
    };
    fail(diagnostic(
        format_args!("Pointer is {}: ({})", headline, source),
        expected,
        &actual,
        file,
        line,
    ))
}

/// Values that can be checked with `check_null!` and `check_not_null!`.
pub trait Nullable {
    fn is_null_value(&self) -> bool;
}

impl<T: ?Sized> Nullable for *const T {
    fn is_null_value(&self) -> bool {
        self.is_null()
    }
}

impl<T: ?Sized> Nullable for *mut T {
    fn is_null_value(&self) -> bool {
        self.is_null()
    }
}

impl<T: ?Sized> Nullable for NonNull<T> {
    fn is_null_value(&self) -> bool {
        false
    }
}

impl<T> Nullable for Option<T> {
    fn is_null_value(&self) -> bool {
        self.is_none()
    }
}

impl<T: Nullable + ?Sized> Nullable for &T {
    fn is_null_value(&self) -> bool {
        (**self).is_null_value()
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __check_operand {
    ($value:ident) => {
        $crate::__render!($value)
    };
    ($value:ident, $hint:literal) => {
        $crate::format::bounded(::std::format_args!($hint, $value))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __check_cmp {
    ($op:tt, $cmp:ident, $actual:expr, $expected:expr $(, $hint:literal)?) => {
        match (&$actual, &$expected) {
            (actual, expected) => {
                if !(*actual $op *expected) {
                    $crate::assert::fail_comparison(
                        &$crate::assert::Site {
                            file: ::std::file!(),
                            line: ::std::line!(),
                            actual: ::std::stringify!($actual),
                            expected: ::std::stringify!($expected),
                        },
                        $crate::assert::Cmp::$cmp,
                        $crate::__check_operand!(actual $(, $hint)?),
                        $crate::__check_operand!(expected $(, $hint)?),
                    );
                }
            }
        }
    };
}

/// Assert `actual == expected`. An optional format string replaces the
/// default rendering of both operands.
#[macro_export]
macro_rules! check_eq {
    ($actual:expr, $expected:expr $(,)?) => {
        $crate::__check_cmp!(==, Eq, $actual, $expected)
    };
    ($actual:expr, $expected:expr, $hint:literal $(,)?) => {
        $crate::__check_cmp!(==, Eq, $actual, $expected, $hint)
    };
}

/// Assert `actual != expected`.
#[macro_export]
macro_rules! check_ne {
    ($actual:expr, $expected:expr $(,)?) => {
        $crate::__check_cmp!(!=, Ne, $actual, $expected)
    };
    ($actual:expr, $expected:expr, $hint:literal $(,)?) => {
        $crate::__check_cmp!(!=, Ne, $actual, $expected, $hint)
    };
}

/// Assert `actual < expected`.
#[macro_export]
macro_rules! check_lt {
    ($actual:expr, $expected:expr $(,)?) => {
        $crate::__check_cmp!(<, Lt, $actual, $expected)
    };
    ($actual:expr, $expected:expr, $hint:literal $(,)?) => {
        $crate::__check_cmp!(<, Lt, $actual, $expected, $hint)
    };
}

/// Assert `actual <= expected`.
#[macro_export]
macro_rules! check_le {
    ($actual:expr, $expected:expr $(,)?) => {
        $crate::__check_cmp!(<=, Le, $actual, $expected)
    };
    ($actual:expr, $expected:expr, $hint:literal $(,)?) => {
        $crate::__check_cmp!(<=, Le, $actual, $expected, $hint)
    };
}

/// Assert `actual > expected`.
#[macro_export]
macro_rules! check_gt {
    ($actual:expr, $expected:expr $(,)?) => {
        $crate::__check_cmp!(>, Gt, $actual, $expected)
    };
    ($actual:expr, $expected:expr, $hint:literal $(,)?) => {
        $crate::__check_cmp!(>, Gt, $actual, $expected, $hint)
    };
}

/// Assert `actual >= expected`.
#[macro_export]
macro_rules! check_ge {
    ($actual:expr, $expected:expr $(,)?) => {
        $crate::__check_cmp!(>=, Ge, $actual, $expected)
    };
    ($actual:expr, $expected:expr, $hint:literal $(,)?) => {
        $crate::__check_cmp!(>=, Ge, $actual, $expected, $hint)
    };
}

/// Assert that a boolean expression is true.
#[macro_export]
macro_rules! check_true {
    ($pred:expr $(,)?) => {{
        let value: bool = $pred;
        if !value {
            $crate::assert::fail_truth(
                ::std::file!(),
                ::std::line!(),
                ::std::stringify!($pred),
                true,
            );
        }
    }};
}

/// Assert that a boolean expression is false.
#[macro_export]
macro_rules! check_false {
    ($pred:expr $(,)?) => {{
        let value: bool = $pred;
        if value {
            $crate::assert::fail_truth(
                ::std::file!(),
                ::std::line!(),
                ::std::stringify!($pred),
                false,
            );
        }
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __check_null {
    ($ptr:expr, $expected_null:expr) => {
        match &$ptr {
            ptr => {
                if $crate::assert::Nullable::is_null_value(ptr)
                    != $expected_null
                {
                    $crate::assert::fail_null(
                        ::std::file!(),
                        ::std::line!(),
                        ::std::stringify!($ptr),
                        $expected_null,
                        $crate::__render!(ptr),
                    );
                }
            }
        }
    };
}

/// Assert that a raw pointer is null or an `Option` is `None`.
#[macro_export]
macro_rules! check_null {
    ($ptr:expr $(,)?) => {
        $crate::__check_null!($ptr, true)
    };
}

/// Assert that a raw pointer is non-null or an `Option` is `Some`.
#[macro_export]
macro_rules! check_not_null {
    ($ptr:expr $(,)?) => {
        $crate::__check_null!($ptr, false)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __check_str {
    ($op:tt, $cmp:ident, $actual:expr, $expected:expr) => {
        match (&$actual, &$expected) {
            (actual, expected) => {
                let actual: &str = ::std::convert::AsRef::<str>::as_ref(actual);
                let expected: &str =
                    ::std::convert::AsRef::<str>::as_ref(expected);
                if !(actual $op expected) {
                    $crate::assert::fail_str(
                        &$crate::assert::Site {
                            file: ::std::file!(),
                            line: ::std::line!(),
                            actual: ::std::stringify!($actual),
                            expected: ::std::stringify!($expected),
                        },
                        $crate::assert::Cmp::$cmp,
                        actual,
                        expected,
                    );
                }
            }
        }
    };
}

/// Assert that two strings are equal. Multi-line mismatches include a diff.
#[macro_export]
macro_rules! check_str_eq {
    ($actual:expr, $expected:expr $(,)?) => {
        $crate::__check_str!(==, Eq, $actual, $expected)
    };
}

/// Assert that two strings differ.
#[macro_export]
macro_rules! check_str_ne {
    ($actual:expr, $expected:expr $(,)?) => {
        $crate::__check_str!(!=, Ne, $actual, $expected)
    };
}

/// Skip the rest of the current test.
#[macro_export]
macro_rules! skip {
    ($($arg:tt)+) => {
        $crate::assert::skip(::std::format!($($arg)+))
    };
}

/// Skip the rest of the current test if `cond` holds.
#[macro_export]
macro_rules! skip_if {
    ($cond:expr, $($arg:tt)+) => {
        if $cond {
            $crate::skip!($($arg)+);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::Interrupt;
    use std::{cell::Cell, panic};

    fn interrupt<F: FnOnce()>(body: F) -> Option<Interrupt> {
        match panic::catch_unwind(panic::AssertUnwindSafe(body)) {
            Ok(()) => None,
            Err(payload) => match payload.downcast::<Interrupt>() {
                Ok(interrupt) => Some(*interrupt),
                Err(_) => panic!("body panicked without an interrupt"),
            },
        }
    }

    fn failure<F: FnOnce()>(body: F) -> String {
        match interrupt(body) {
            Some(Interrupt::Failed(message)) => message,
            other => panic!("expected a failure, got {:?}", other),
        }
    }

    #[test]
    fn passing_assertions_return_normally() {
        assert_eq!(
            interrupt(|| {
                check_eq!(2 + 2, 4);
                check_ne!(42, 437);
                check_lt!(42, 437);
                check_le!(437, 437);
                check_gt!(437, 42);
                check_ge!(437, 437);
                check_true!(1 < 2);
                check_false!(2 < 1);
                check_str_eq!("Hello!", String::from("Hello!"));
                check_str_ne!("a", "b");
                check_null!(std::ptr::null::<u8>());
                check_not_null!(Some(1));
            }),
            None
        );
    }

    #[test]
    fn failed_equality_names_values_and_operator() {
        let message = failure(|| check_eq!(42, 437));
        assert!(message.starts_with("Assertion failed! (42) == (437)"));
        assert!(message.contains("Value 1: 42"), "{}", message);
        assert!(message.contains("Value 2: 437"), "{}", message);
        assert!(message.contains("File: src/assert.rs:"), "{}", message);
    }

    #[test]
    fn failure_stops_the_body() {
        let reached = Cell::new(false);
        failure(|| {
            check_lt!(10, 3);
            reached.set(true);
        });
        assert!(!reached.get());
    }

    #[test]
    fn operands_are_evaluated_once() {
        let calls = Cell::new(0);
        let next = || {
            calls.set(calls.get() + 1);
            calls.get()
        };
        let message = failure(|| check_eq!(next(), 5));
        assert_eq!(calls.get(), 1);
        assert!(message.contains("(next()) == (5)"), "{}", message);
        assert!(message.contains("Value 1: 1"), "{}", message);
    }

    #[test]
    fn format_hint_replaces_rendering() {
        let message = failure(|| check_eq!(255u32, 16u32, "{:08b}"));
        assert!(message.contains("Value 1: 11111111"), "{}", message);
        assert!(message.contains("Value 2: 00010000"), "{}", message);
    }

    #[test]
    fn unknown_operands_fall_back_to_addresses() {
        #[derive(PartialEq)]
        struct Point(i32, i32);
        let message = failure(|| check_eq!(Point(1, 2), Point(3, 4)));
        assert!(message.contains("Value 1: <unknown type"), "{}", message);
        assert!(message.contains("Point>"), "{}", message);
    }

    #[test]
    fn string_mismatch_is_quoted_with_diff() {
        let message = failure(|| check_str_eq!("a\nb\n", "a\nc\n"));
        assert!(message.contains("Value 1: \"a\nb\n\""), "{}", message);
        assert!(message.contains("+b"), "{}", message);
        assert!(message.contains("-c"), "{}", message);
    }

    #[test]
    fn truthiness_and_nullness_messages() {
        let message = failure(|| check_true!(1 > 2));
        assert!(message.contains("Expression is true: (1 > 2)"));
        let message = failure(|| check_false!(true));
        assert!(message.contains("Expression is false: (true)"));
        let value = 7u8;
        let message = failure(|| check_null!(&value as *const u8));
        assert!(message.contains("Pointer is non-null"), "{}", message);
        assert!(message.contains("Value 2: 0x"), "{}", message);
        let message = failure(|| check_not_null!(None::<u8>));
        assert!(message.contains("Value 2: None"), "{}", message);
    }

    #[test]
    fn skip_if_false_does_not_interrupt() {
        let reached = Cell::new(false);
        assert_eq!(
            interrupt(|| {
                skip_if!(false, "This skip directive will not run.");
                reached.set(true);
            }),
            None
        );
        assert!(reached.get());
    }

    #[test]
    fn skip_if_true_ends_the_body() {
        let outcome = interrupt(|| {
            skip_if!(true, "not ready");
            check_true!(false);
        });
        assert_eq!(outcome, Some(Interrupt::Skipped("not ready".to_string())));
    }

    #[test]
    fn skip_formats_its_message() {
        let outcome = interrupt(|| skip!("needs {} cores", 4));
        assert_eq!(
            outcome,
            Some(Interrupt::Skipped("needs 4 cores".to_string()))
        );
    }
}
