//! Host-facing exception values.
//!
//! The interpreter's in-flight errors use interned ids and borrow from
//! the run; at the public boundary they are resolved into owned
//! [`Exception`] values that outlive the `Runner`.

use std::fmt;

use crate::exception_private::{ExcType, ExceptionRaise, SimpleException};
use crate::intern::Interns;

/// One resolved traceback frame: where a call was executing when the
/// exception passed through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Source filename recorded in the code object.
    pub filename: String,
    /// Code object name (`<module>` for module-level code).
    pub code_name: String,
    /// One-based source line number.
    pub lineno: u32,
}

/// An unhandled guest exception, as reported to the host.
///
/// Carries the exception type, the optional message, the chain of causes,
/// and the traceback ordered outermost frame first (the display order of
/// the source language).
#[derive(Debug, Clone, PartialEq)]
pub struct Exception {
    exc_type: ExcType,
    message: Option<String>,
    cause: Option<Box<Exception>>,
    traceback: Vec<StackFrame>,
}

impl Exception {
    /// Resolves an in-flight error into an owned exception.
    ///
    /// Traceback entries were accumulated innermost-first during
    /// unwinding; they are reversed here into display order.
    pub(crate) fn from_raise(raise: ExceptionRaise, interns: &Interns) -> Self {
        let traceback = raise
            .traceback
            .iter()
            .rev()
            .map(|entry| StackFrame {
                filename: interns.get_str(entry.filename).to_owned(),
                code_name: interns.get_str(entry.code_name).to_owned(),
                lineno: entry.lineno,
            })
            .collect();
        let mut exc = Self::from_simple(raise.exc);
        exc.traceback = traceback;
        exc
    }

    fn from_simple(exc: SimpleException) -> Self {
        let exc_type = exc.exc_type();
        let cause = exc.cause().cloned().map(|c| Box::new(Self::from_simple(c)));
        Self {
            exc_type,
            message: exc.into_message(),
            cause,
            traceback: Vec::new(),
        }
    }

    /// The exception's type.
    #[must_use]
    pub fn exc_type(&self) -> ExcType {
        self.exc_type
    }

    /// The exception's message, if it carries one.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The explicit cause set by a chained raise, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&Exception> {
        self.cause.as_deref()
    }

    /// The traceback, outermost frame first.
    #[must_use]
    pub fn traceback(&self) -> &[StackFrame] {
        &self.traceback
    }
}

impl fmt::Display for Exception {
    /// Formats the exception the way the source language prints an
    /// unhandled one: cause first, then the traceback, then the
    /// `Type: message` line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cause) = &self.cause {
            writeln!(f, "{cause}")?;
            writeln!(f)?;
            writeln!(
                f,
                "The above exception was the direct cause of the following exception:"
            )?;
            writeln!(f)?;
        }
        if !self.traceback.is_empty() {
            writeln!(f, "Traceback (most recent call last):")?;
            for frame in &self.traceback {
                writeln!(
                    f,
                    "  File \"{}\", line {}, in {}",
                    frame.filename, frame.lineno, frame.code_name
                )?;
            }
        }
        match &self.message {
            Some(msg) if !msg.is_empty() => write!(f, "{}: {msg}", self.exc_type),
            _ => write!(f, "{}", self.exc_type),
        }
    }
}
