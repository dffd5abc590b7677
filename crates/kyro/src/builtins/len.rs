//! Implementation of the len() builtin function.

use crate::args::ArgValues;
use crate::exception_private::{ExcType, RunResult};
use crate::heap::Heap;
use crate::intern::Interns;
use crate::value::Value;

pub(crate) fn builtin_len(heap: &mut Heap, args: ArgValues, interns: &Interns) -> RunResult<Value> {
    let arg = args.get_one_arg("len")?;
    match arg.py_len(heap, interns) {
        Some(len) => Ok(Value::Int(len as i64)),
        None => Err(ExcType::type_error_no_len(arg.py_type(heap))),
    }
}
