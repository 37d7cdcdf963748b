//! Type-directed rendering of assertion operands.
//!
//! Every operand that appears in a failure message goes through [Render].
//! Types without an implementation still render: the assertion macros pick
//! the implementation statically at the call site and fall back to an opaque
//! address tagged with the type name. Output is always bounded by
//! [MAX_MESSAGE_LEN].
use std::{
    ffi::{CStr, CString},
    fmt::{self, Write},
    ptr::NonNull,
};

/// Capacity of a failure message, in bytes.
pub const MAX_MESSAGE_LEN: usize = 1024;

/// Appended to output that did not fit.
const ELLIPSIS: &str = "...";

/// A string sink that keeps at most `cap` bytes and drops the rest.
///
/// Once full, writes return `fmt::Error` so that formatters stop early
/// instead of producing text that is thrown away.
pub struct Bounded {
    buf: String,
    cap: usize,
    truncated: bool,
}

impl Bounded {
    pub fn new() -> Self {
        Self::with_capacity(MAX_MESSAGE_LEN)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: String::new(),
            cap,
            truncated: false,
        }
    }

    /// True if some output was dropped.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// The collected text. Truncated output ends with `...` and still fits
    /// in the capacity.
    pub fn into_string(self) -> String {
        let Bounded {
            mut buf,
            cap,
            truncated,
        } = self;
        if truncated {
            let end = floor_char_boundary(
                &buf,
                cap.saturating_sub(ELLIPSIS.len()),
            );
            buf.truncate(end);
            buf.push_str(ELLIPSIS);
        }
        buf
    }
}

impl Default for Bounded {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for Bounded {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Err(fmt::Error);
        }
        let room = self.cap.saturating_sub(self.buf.len());
        if s.len() <= room {
            self.buf.push_str(s);
            return Ok(());
        }
        self.buf.push_str(&s[..floor_char_boundary(s, room)]);
        self.truncated = true;
        Err(fmt::Error)
    }
}

/// Largest index `<= at` that lies on a char boundary of `s`.
fn floor_char_boundary(s: &str, at: usize) -> usize {
    let mut end = at.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    end
}

/// Format `args` into a string of at most [MAX_MESSAGE_LEN] bytes.
pub fn bounded(args: fmt::Arguments) -> String {
    let mut out = Bounded::new();
    // A full buffer reports an error; the prefix is what we want.
    let _ = out.write_fmt(args);
    out.into_string()
}

/// Bound an already built message.
pub fn clamp(message: String) -> String {
    if message.len() <= MAX_MESSAGE_LEN {
        return message;
    }
    bounded(format_args!("{}", message))
}

/// Renders a value for a failure message.
pub trait Render {
    fn render(&self, out: &mut dyn Write) -> fmt::Result;
}

/// Render `value` through its [Render] implementation.
pub fn render<T: Render + ?Sized>(value: &T) -> String {
    let mut out = Bounded::new();
    let _ = value.render(&mut out);
    out.into_string()
}

/// Render a value whose type has no [Render] implementation.
pub fn unknown<T: ?Sized>(value: &T) -> String {
    bounded(format_args!(
        "<unknown type {}> @ {:p}",
        std::any::type_name::<T>(),
        value
    ))
}

impl Render for bool {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        write!(out, "{}", self)
    }
}

impl Render for char {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        write!(out, "'{}' ({})", self.escape_default(), *self as u32)
    }
}

macro_rules! render_decimal {
    ($($ty:ty),*) => {
        $(impl Render for $ty {
            fn render(&self, out: &mut dyn Write) -> fmt::Result {
                write!(out, "{}", self)
            }
        })*
    };
}

macro_rules! render_unsigned {
    ($($ty:ty),*) => {
        $(impl Render for $ty {
            fn render(&self, out: &mut dyn Write) -> fmt::Result {
                write!(out, "{} ({:#x})", self, self)
            }
        })*
    };
}

render_decimal!(i8, i16, i32, i64, i128, isize, f32, f64);
render_unsigned!(u8, u16, u32, u64, u128);

// Sizes and lengths read better without the hex form.
impl Render for usize {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        write!(out, "{}", self)
    }
}

impl Render for str {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        write!(out, "\"{}\"", self)
    }
}

impl Render for String {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        self.as_str().render(out)
    }
}

impl Render for CStr {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        write!(out, "\"{}\"", self.to_string_lossy())
    }
}

impl Render for CString {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        self.as_c_str().render(out)
    }
}

impl<T: ?Sized> Render for *const T {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        write!(out, "{:p}", *self)
    }
}

impl<T: ?Sized> Render for *mut T {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        write!(out, "{:p}", *self)
    }
}

impl<T: ?Sized> Render for NonNull<T> {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        write!(out, "{:p}", self.as_ptr())
    }
}

impl<T: Render> Render for Option<T> {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        match self {
            None => out.write_str("None"),
            Some(inner) => {
                out.write_str("Some(")?;
                inner.render(out)?;
                out.write_str(")")
            }
        }
    }
}

impl<T: Render + ?Sized> Render for &T {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        (**self).render(out)
    }
}

impl<T: Render + ?Sized> Render for &mut T {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        (**self).render(out)
    }
}

impl<T: Render + ?Sized> Render for Box<T> {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        (**self).render(out)
    }
}

/// Call-site wrapper used by the assertion macros to choose between [Render]
/// and the opaque fallback. `(&Probe(v)).render_operand()` resolves to
/// [RenderKnown] when the operand type implements [Render], and to
/// [RenderUnknown] through one more auto-reference otherwise.
#[doc(hidden)]
pub struct Probe<'a, T: ?Sized>(pub &'a T);

#[doc(hidden)]
pub trait RenderKnown {
    fn render_operand(&self) -> String;
}

impl<T: Render + ?Sized> RenderKnown for Probe<'_, T> {
    fn render_operand(&self) -> String {
        render(self.0)
    }
}

#[doc(hidden)]
pub trait RenderUnknown {
    fn render_operand(&self) -> String;
}

impl<T: ?Sized> RenderUnknown for &Probe<'_, T> {
    fn render_operand(&self) -> String {
        unknown(self.0)
    }
}

/// Render an operand, falling back to an opaque address for types without a
/// [Render] implementation.
#[doc(hidden)]
#[macro_export]
macro_rules! __render {
    ($value:expr) => {{
        #[allow(unused_imports)]
        use $crate::format::{RenderKnown as _, RenderUnknown as _};
        (&$crate::format::Probe($value)).render_operand()
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Opaque;

    #[test]
    fn scalars() {
        assert_eq!(render(&true), "true");
        assert_eq!(render(&-42i32), "-42");
        assert_eq!(render(&255u8), "255 (0xff)");
        assert_eq!(render(&437u64), "437 (0x1b5)");
        assert_eq!(render(&28usize), "28");
        assert_eq!(render(&1.5f64), "1.5");
        assert_eq!(render(&'a'), "'a' (97)");
    }

    #[test]
    fn text_is_quoted() {
        assert_eq!(render("Hello!"), "\"Hello!\"");
        assert_eq!(render(&String::from("x")), "\"x\"");
        let c = CString::new("abc").unwrap();
        assert_eq!(render(&c), "\"abc\"");
    }

    #[test]
    fn pointers_and_options() {
        assert_eq!(render(&std::ptr::null::<u8>()), "0x0");
        assert!(render(&(&7u8 as *const u8)).starts_with("0x"));
        assert_eq!(render(&Some(3i8)), "Some(3)");
        assert_eq!(render(&None::<i8>), "None");
    }

    #[test]
    fn call_site_dispatch() {
        let known = 42i32;
        assert_eq!(crate::__render!(&known), "42");
        let opaque = Opaque;
        let text = crate::__render!(&opaque);
        assert!(text.starts_with("<unknown type"), "{}", text);
        assert!(text.contains("Opaque"), "{}", text);
        assert!(text.contains("@ 0x"), "{}", text);
    }

    #[test]
    fn long_values_are_truncated() {
        let long = "é".repeat(2000);
        let text = render(long.as_str());
        assert!(text.len() <= MAX_MESSAGE_LEN);
        assert!(text.ends_with("..."));
        assert!(text.starts_with("\"é"));
    }

    #[test]
    fn bounded_sink_stops_writing() {
        let mut out = Bounded::with_capacity(8);
        assert!(out.write_str("abcd").is_ok());
        assert!(out.write_str("efghij").is_err());
        assert!(out.is_truncated());
        assert_eq!(out.into_string(), "abcde...");
    }

    #[test]
    fn clamp_keeps_short_messages() {
        assert_eq!(clamp("short".to_string()), "short");
        assert_eq!(clamp("x".repeat(4096)).len(), MAX_MESSAGE_LEN);
    }
}
