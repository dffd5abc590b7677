//! Implementation of the hash() builtin function.

use crate::args::ArgValues;
use crate::exception_private::RunResult;
use crate::heap::Heap;
use crate::intern::Interns;
use crate::value::Value;

pub(crate) fn builtin_hash(heap: &mut Heap, args: ArgValues, interns: &Interns) -> RunResult<Value> {
    let arg = args.get_one_arg("hash")?;
    let hash = arg.py_hash(heap, interns)?;
    Ok(Value::Int(hash))
}
