//! User-defined callables.

use std::fmt::{self, Write};

use crate::bytecode::CodeId;
use crate::intern::{Interns, StringId};
use crate::signature::Signature;
use crate::value::Value;

/// A function created by MAKE_FUNCTION.
///
/// Owns its signature and evaluated defaults; shares the module globals
/// with every other function of the run (the run has exactly one module,
/// so the globals mapping lives on the interpreter rather than here).
#[derive(Debug)]
pub(crate) struct Function {
    /// Code object name, used for binding errors and repr.
    pub name: StringId,
    /// Qualified name popped by MAKE_FUNCTION.
    pub qualname: StringId,
    /// The compiled body.
    pub code: CodeId,
    /// Parameter layout derived from the code object.
    pub signature: Signature,
    /// Defaults for trailing positional parameters, in declaration order.
    pub defaults: Vec<Value>,
    /// Defaults for keyword-only parameters.
    pub kw_defaults: Vec<(StringId, Value)>,
}

impl Function {
    /// Writes the guest repr, e.g. `<function f at 0x2a>`.
    pub fn py_repr_fmt<W: Write>(&self, f: &mut W, interns: &Interns, py_id: usize) -> fmt::Result {
        write!(f, "<function {} at {py_id:#x}>", interns.get_str(self.qualname))
    }
}

/// A callable bound to its receiver by attribute access.
///
/// Invocation prepends the receiver to the positional arguments and
/// delegates to the wrapped callable.
#[derive(Debug)]
pub(crate) struct BoundMethod {
    pub receiver: Value,
    pub callable: Value,
}
