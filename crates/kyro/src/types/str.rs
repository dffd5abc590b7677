//! Runtime string values and the str method table.

use std::fmt::{self, Write};

use crate::args::ArgValues;
use crate::exception_private::{ExcType, RunResult};
use crate::heap::{Heap, HeapData};
use crate::intern::{Interns, StaticStrings, StringId};
use crate::types::list::allocate_list;
use crate::value::Value;

/// A string created at runtime. Literals from the module file stay in
/// the intern table; only computed strings are heap-allocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Str(String);

impl Str {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Character count, not byte count, to match guest semantics.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

/// Allocates a runtime string and returns a reference to it.
pub(crate) fn allocate_str(s: impl Into<String>, heap: &mut Heap) -> Value {
    Value::Ref(heap.allocate(HeapData::Str(Str::new(s))))
}

/// Writes the guest `repr()` of a string: single quotes preferred,
/// switching to double quotes when the text contains a single quote but
/// no double quote, with the usual escapes.
pub(crate) fn string_repr_fmt<W: Write>(s: &str, f: &mut W) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    f.write_char(quote)?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c == quote => {
                f.write_char('\\')?;
                f.write_char(c)?;
            }
            c if (c as u32) < 0x20 => write!(f, "\\x{:02x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}

/// Calls a str method on the given receiver content.
///
/// The receiver has already been resolved to text; `method_id` is the
/// interned attribute name.
pub(crate) fn call_str_method(
    s: &str,
    method_id: StringId,
    args: ArgValues,
    heap: &mut Heap,
    interns: &Interns,
) -> RunResult<Value> {
    let Some(method) = StaticStrings::from_id(method_id) else {
        return Err(ExcType::attribute_error("str", interns.get_str(method_id)));
    };
    match method {
        StaticStrings::Upper => {
            args.check_zero_args("str.upper")?;
            Ok(allocate_str(s.to_uppercase(), heap))
        }
        StaticStrings::Lower => {
            args.check_zero_args("str.lower")?;
            Ok(allocate_str(s.to_lowercase(), heap))
        }
        StaticStrings::Capitalize => {
            args.check_zero_args("str.capitalize")?;
            let mut chars = s.chars();
            let capitalized = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            };
            Ok(allocate_str(capitalized, heap))
        }
        StaticStrings::Title => {
            args.check_zero_args("str.title")?;
            Ok(allocate_str(title_case(s), heap))
        }
        StaticStrings::Strip | StaticStrings::Lstrip | StaticStrings::Rstrip => {
            let chars = optional_strip_chars(args, method, heap, interns)?;
            let stripped = match (&chars, method) {
                (None, StaticStrings::Strip) => s.trim(),
                (None, StaticStrings::Lstrip) => s.trim_start(),
                (None, StaticStrings::Rstrip) => s.trim_end(),
                (Some(set), StaticStrings::Strip) => s.trim_matches(|c| set.contains(&c)),
                (Some(set), StaticStrings::Lstrip) => s.trim_start_matches(|c| set.contains(&c)),
                (Some(set), StaticStrings::Rstrip) => s.trim_end_matches(|c| set.contains(&c)),
                _ => unreachable!("method is restricted to Strip | Lstrip | Rstrip by outer match"),
            };
            Ok(allocate_str(stripped, heap))
        }
        StaticStrings::Startswith => {
            let prefix = one_str_arg(args, "startswith", heap, interns)?;
            Ok(Value::Bool(s.starts_with(&prefix)))
        }
        StaticStrings::Endswith => {
            let suffix = one_str_arg(args, "endswith", heap, interns)?;
            Ok(Value::Bool(s.ends_with(&suffix)))
        }
        StaticStrings::Find => {
            let needle = one_str_arg(args, "find", heap, interns)?;
            Ok(Value::Int(char_position(s, &needle).map_or(-1, |i| i as i64)))
        }
        StaticStrings::Index => {
            let needle = one_str_arg(args, "index", heap, interns)?;
            match char_position(s, &needle) {
                Some(i) => Ok(Value::Int(i as i64)),
                None => Err(ExcType::value_error("substring not found")),
            }
        }
        StaticStrings::Count => {
            let needle = one_str_arg(args, "count", heap, interns)?;
            let count = if needle.is_empty() {
                s.chars().count() + 1
            } else {
                s.matches(&needle).count()
            };
            Ok(Value::Int(count as i64))
        }
        StaticStrings::Replace => {
            let (old, new) = args.get_two_args("replace")?;
            let old = require_str(&old, "replace", heap, interns)?;
            let new = require_str(&new, "replace", heap, interns)?;
            Ok(allocate_str(s.replace(&old, &new), heap))
        }
        StaticStrings::Split => split(s, args, heap, interns),
        StaticStrings::Join => join(s, args, heap, interns),
        _ => Err(ExcType::attribute_error("str", interns.get_str(method_id))),
    }
}

/// `str.split`: whitespace split with no argument, separator split with
/// one. An empty separator is a ValueError.
fn split(s: &str, args: ArgValues, heap: &mut Heap, interns: &Interns) -> RunResult<Value> {
    let parts: Vec<String> = match args {
        ArgValues::Empty => s.split_whitespace().map(str::to_owned).collect(),
        ArgValues::One(sep) => {
            let sep = require_str(&sep, "split", heap, interns)?;
            if sep.is_empty() {
                return Err(ExcType::value_error("empty separator"));
            }
            s.split(sep.as_str()).map(str::to_owned).collect()
        }
        other => return Err(ExcType::type_error_at_most("split", 1, other.count())),
    };
    let items = parts.into_iter().map(|p| allocate_str(p, heap)).collect();
    Ok(allocate_list(items, heap))
}

/// `sep.join(iterable)` over a list or tuple of strings.
fn join(sep: &str, args: ArgValues, heap: &mut Heap, interns: &Interns) -> RunResult<Value> {
    let arg = args.get_one_arg("str.join")?;
    let items: Vec<Value> = match &arg {
        Value::Ref(id) => match heap.get(*id) {
            HeapData::List(list) => list.items().to_vec(),
            HeapData::Tuple(tuple) => tuple.items().to_vec(),
            _ => return Err(ExcType::type_error("can only join an iterable")),
        },
        _ => return Err(ExcType::type_error("can only join an iterable")),
    };
    let mut joined = String::new();
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str(heap, interns) else {
            return Err(ExcType::type_error(format!(
                "sequence item {index}: expected str instance, {} found",
                item.py_type(heap)
            )));
        };
        if index > 0 {
            joined.push_str(sep);
        }
        joined.push_str(text);
    }
    Ok(allocate_str(joined, heap))
}

/// Uppercases the first letter of every alphabetic run, lowercasing the
/// rest, matching the guest's `str.title`.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Character index of `needle` in `s`, or `None`.
fn char_position(s: &str, needle: &str) -> Option<usize> {
    s.find(needle).map(|byte_pos| s[..byte_pos].chars().count())
}

/// Extracts the optional chars argument of strip/lstrip/rstrip.
fn optional_strip_chars(
    args: ArgValues,
    method: StaticStrings,
    heap: &Heap,
    interns: &Interns,
) -> RunResult<Option<Vec<char>>> {
    match args {
        ArgValues::Empty => Ok(None),
        ArgValues::One(Value::None) => Ok(None),
        ArgValues::One(arg) => {
            let chars = require_str(&arg, method.as_str(), heap, interns)?;
            Ok(Some(chars.chars().collect()))
        }
        other => Err(ExcType::type_error_at_most(method.as_str(), 1, other.count())),
    }
}

/// Extracts exactly one string argument.
fn one_str_arg(args: ArgValues, name: &str, heap: &Heap, interns: &Interns) -> RunResult<String> {
    let arg = args.get_one_arg(name)?;
    require_str(&arg, name, heap, interns)
}

/// Requires a value to be a string, returning owned text.
fn require_str(value: &Value, name: &str, heap: &Heap, interns: &Interns) -> RunResult<String> {
    value
        .as_str(heap, interns)
        .map(str::to_owned)
        .ok_or_else(|| ExcType::type_error(format!("{name} argument must be str, not {}", value.py_type(heap))))
}
