//! Implementation of the type() builtin function (single-argument form).

use crate::args::ArgValues;
use crate::builtins::Builtins;
use crate::exception_private::RunResult;
use crate::heap::Heap;
use crate::types::Type;
use crate::value::Value;

/// `type(x)` returns the type object of `x`. The three-argument
/// class-building form is not part of this engine's surface.
pub(crate) fn builtin_type(heap: &mut Heap, args: ArgValues) -> RunResult<Value> {
    let arg = args.get_one_arg("type")?;
    let builtin = match arg.py_type(heap) {
        Type::Exception(exc) => Builtins::ExcType(exc),
        other => Builtins::Type(other),
    };
    Ok(Value::Builtin(builtin))
}
