//! Output seam for the `print()` builtin.
//!
//! All guest output flows through [`PrintWriter`]; the engine itself
//! never writes to stdout, so hosts and tests can capture or discard
//! output by swapping the writer.

use std::borrow::Cow;
use std::io::{self, Write as _};

use crate::exception_public::Exception;

/// Trait for handling output from the `print()` builtin function.
pub trait PrintWriter {
    /// Writes one already-formatted chunk of output, with no separators
    /// or terminators added.
    fn stdout_write(&mut self, output: Cow<'_, str>) -> Result<(), Exception>;

    /// Writes a single separator or terminator character.
    fn stdout_push(&mut self, end: char) -> Result<(), Exception>;
}

/// Default `PrintWriter` that writes to the process stdout.
#[derive(Debug, Default)]
pub struct StdPrint;

impl PrintWriter for StdPrint {
    fn stdout_write(&mut self, output: Cow<'_, str>) -> Result<(), Exception> {
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(output.as_bytes());
        Ok(())
    }

    fn stdout_push(&mut self, end: char) -> Result<(), Exception> {
        let mut buf = [0u8; 4];
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(end.encode_utf8(&mut buf).as_bytes());
        Ok(())
    }
}

impl Drop for StdPrint {
    fn drop(&mut self) {
        let _ = io::stdout().flush();
    }
}

/// A `PrintWriter` that collects all output into a string.
///
/// Useful for testing or capturing print output programmatically.
#[derive(Debug, Default)]
pub struct CollectStringPrint(String);

impl CollectStringPrint {
    #[must_use]
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Returns the collected output.
    #[must_use]
    pub fn output(&self) -> &str {
        self.0.as_str()
    }

    /// Consumes the writer and returns the collected output.
    #[must_use]
    pub fn into_output(self) -> String {
        self.0
    }
}

impl PrintWriter for CollectStringPrint {
    fn stdout_write(&mut self, output: Cow<'_, str>) -> Result<(), Exception> {
        self.0.push_str(&output);
        Ok(())
    }

    fn stdout_push(&mut self, end: char) -> Result<(), Exception> {
        self.0.push(end);
        Ok(())
    }
}

/// `PrintWriter` that ignores all output.
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintWriter for NoPrint {
    fn stdout_write(&mut self, _output: Cow<'_, str>) -> Result<(), Exception> {
        Ok(())
    }

    fn stdout_push(&mut self, _end: char) -> Result<(), Exception> {
        Ok(())
    }
}
