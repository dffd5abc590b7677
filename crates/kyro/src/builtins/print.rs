//! Implementation of the print() builtin function.

use std::borrow::Cow;

use crate::args::ArgValues;
use crate::exception_private::{ExcType, RunResult};
use crate::heap::Heap;
use crate::intern::Interns;
use crate::io::PrintWriter;
use crate::value::Value;

/// Implementation of the print() builtin function.
///
/// Supports the keyword arguments:
/// - `sep`: separator between values (default: " ")
/// - `end`: string appended after the last value (default: "\n")
/// - `flush`: accepted but ignored (output is not buffered per value)
pub(crate) fn builtin_print(
    heap: &mut Heap,
    args: ArgValues,
    interns: &Interns,
    print: &mut dyn PrintWriter,
) -> RunResult<Value> {
    let (positional, kwargs) = args.into_parts();
    let (sep, end) = extract_print_kwargs(kwargs, heap, interns)?;

    for (index, value) in positional.iter().enumerate() {
        if index > 0 {
            match &sep {
                Some(sep) => print.stdout_write(Cow::Borrowed(sep))?,
                None => print.stdout_push(' ')?,
            }
        }
        print.stdout_write(value.py_str(heap, interns))?;
    }
    match &end {
        Some(end) => print.stdout_write(Cow::Borrowed(end))?,
        None => print.stdout_push('\n')?,
    }
    Ok(Value::None)
}

/// Extracts the sep and end keywords; `None` argument values fall back
/// to the defaults.
fn extract_print_kwargs(
    kwargs: Vec<(crate::intern::StringId, Value)>,
    heap: &Heap,
    interns: &Interns,
) -> RunResult<(Option<String>, Option<String>)> {
    let mut sep: Option<String> = None;
    let mut end: Option<String> = None;
    for (key, value) in kwargs {
        match interns.get_str(key) {
            "sep" => sep = extract_string_kwarg(&value, "sep", heap, interns)?,
            "end" => end = extract_string_kwarg(&value, "end", heap, interns)?,
            "flush" => {}
            other => return Err(ExcType::type_error_unexpected_keyword("print", other)),
        }
    }
    Ok((sep, end))
}

/// A print() string keyword: `None` means default, anything non-string
/// is a TypeError.
fn extract_string_kwarg(
    value: &Value,
    name: &str,
    heap: &Heap,
    interns: &Interns,
) -> RunResult<Option<String>> {
    match value {
        Value::None => Ok(None),
        _ => match value.as_str(heap, interns) {
            Some(text) => Ok(Some(text.to_owned())),
            None => Err(ExcType::type_error(format!(
                "{name} must be None or a string, not {}",
                value.py_type(heap)
            ))),
        },
    }
}
