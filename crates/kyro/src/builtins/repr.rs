//! Implementation of the repr() builtin function.

use crate::args::ArgValues;
use crate::exception_private::RunResult;
use crate::heap::Heap;
use crate::intern::Interns;
use crate::types::str::allocate_str;
use crate::value::Value;

pub(crate) fn builtin_repr(heap: &mut Heap, args: ArgValues, interns: &Interns) -> RunResult<Value> {
    let arg = args.get_one_arg("repr")?;
    let mut out = String::new();
    arg.py_repr_fmt(&mut out, heap, interns)
        .expect("write to String cannot fail");
    Ok(allocate_str(out, heap))
}
