//! Public interface for loading and running KYC modules.

use std::fmt;

use crate::bytecode::CodeId;
use crate::bytecode::code::Code;
use crate::bytecode::vm::{Frame, Vm};
use crate::exception_private::RunError;
use crate::exception_public::Exception;
use crate::heap::Heap;
use crate::intern::Interns;
use crate::io::PrintWriter;
use crate::loader::{LoadError, load_module};
use crate::namespace::Namespace;
use crate::prepare::prepare_module;

/// An unrecoverable engine fault: corrupted bytecode that survived
/// loading, or an internal invariant violation. Never guest-visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFault(String);

impl fmt::Display for EngineFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fatal engine error: {}", self.0)
    }
}

impl std::error::Error for EngineFault {}

/// Why a run did not complete normally.
///
/// The two variants are the two error planes: guest exceptions are part
/// of the program's observable behavior, engine faults mean the input
/// or the engine itself is broken.
#[derive(Debug)]
pub enum RunFailure {
    /// The root frame returned an unhandled guest exception.
    Exception(Exception),
    /// The engine aborted.
    Fatal(EngineFault),
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exception(exc) => exc.fmt(f),
            Self::Fatal(fault) => fault.fmt(f),
        }
    }
}

/// A loaded module, ready to run.
///
/// Owns everything a run needs: the interned strings, the prepared code
/// table, the heap (seeded with container constants), and the module
/// globals with the builtin surface installed. Running consumes the
/// runner; one `Runner` is one execution.
#[derive(Debug)]
pub struct Runner {
    interns: Interns,
    codes: Vec<Code>,
    heap: Heap,
    globals: Namespace,
    root: CodeId,
}

impl Runner {
    /// Decodes and prepares a module image.
    ///
    /// # Errors
    /// Returns a [`LoadError`] for any malformed input: bad magic,
    /// unknown version or tag, truncation, or an unusable code object.
    /// The interpreter is never entered for a module that fails here.
    pub fn load(bytes: &[u8]) -> Result<Self, LoadError> {
        let module = load_module(bytes)?;
        let mut interns = Interns::new();
        let mut codes = Vec::new();
        let mut heap = Heap::new();
        let root = prepare_module(module, &mut interns, &mut codes, &mut heap)?;
        let globals = Namespace::with_builtins(&mut interns);
        Ok(Self {
            interns,
            codes,
            heap,
            globals,
            root,
        })
    }

    /// Runs the module body to completion.
    ///
    /// Returns `Ok(())` when the root frame returns; an unhandled guest
    /// exception or an engine fault is reported as [`RunFailure`].
    pub fn run(mut self, print: &mut dyn PrintWriter) -> Result<(), RunFailure> {
        let code = &self.codes[self.root.index()];
        let mut vm = Vm::new(&mut self.heap, &self.interns, &self.codes, &mut self.globals, print);
        let mut frame = Frame::new_module(code);
        match vm.run_frame(&mut frame) {
            Ok(_) => Ok(()),
            Err(RunError::Exc(raise)) => Err(RunFailure::Exception(Exception::from_raise(*raise, &self.interns))),
            Err(RunError::Internal(msg)) => Err(RunFailure::Fatal(EngineFault(msg))),
        }
    }
}
