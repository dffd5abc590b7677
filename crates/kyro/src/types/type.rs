//! The type metaobject.
//!
//! Guest types form a closed set described by [`Type`]. A `Type` names
//! itself, knows its place in the exception hierarchy where relevant,
//! carries its constructor (`call`), and answers attribute lookups from
//! its method table (see `type_has_method` and the per-type dispatch in
//! the `types` submodules).

use std::fmt;

use crate::args::ArgValues;
use crate::exception_private::{ExcType, RunResult};
use crate::heap::{Heap, HeapData};
use crate::intern::{Interns, StaticStrings};
use crate::types::dict::Dict;
use crate::types::list::allocate_list;
use crate::types::str::allocate_str;
use crate::types::tuple::allocate_tuple;
use crate::value::Value;

/// The guest type of a value.
///
/// Used both for type checks and as a callable constructor: `int("3")`
/// dispatches to `Type::Int.call(...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Type,
    NoneType,
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    List,
    Tuple,
    Dict,
    /// A user-defined function.
    Function,
    /// A host-implemented callable.
    BuiltinFunction,
    /// A callable bound to a receiver by attribute access.
    Method,
    /// A compiled code object.
    Code,
    Exception(ExcType),
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Type => "type",
            Self::NoneType => "NoneType",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bytes => "bytes",
            Self::List => "list",
            Self::Tuple => "tuple",
            Self::Dict => "dict",
            Self::Function => "function",
            Self::BuiltinFunction => "builtin_function_or_method",
            Self::Method => "method",
            Self::Code => "code",
            Self::Exception(exc) => return write!(f, "{exc}"),
        };
        f.write_str(name)
    }
}

impl Type {
    /// Calls this type as a constructor.
    pub(crate) fn call(self, heap: &mut Heap, args: ArgValues, interns: &Interns) -> RunResult<Value> {
        match self {
            Self::Int => construct_int(args, heap, interns),
            Self::Float => construct_float(args, heap, interns),
            Self::Str => match args {
                ArgValues::Empty => Ok(allocate_str(String::new(), heap)),
                ArgValues::One(arg) => {
                    let text = arg.py_str(heap, interns).into_owned();
                    Ok(allocate_str(text, heap))
                }
                other => Err(ExcType::type_error_at_most("str", 1, other.count())),
            },
            Self::Bool => match args {
                ArgValues::Empty => Ok(Value::Bool(false)),
                ArgValues::One(arg) => Ok(Value::Bool(arg.py_bool(heap, interns))),
                other => Err(ExcType::type_error_arg_count("bool", 1, other.count())),
            },
            Self::List => match args {
                ArgValues::Empty => Ok(allocate_list(Vec::new(), heap)),
                ArgValues::One(arg) => {
                    let items = sequence_items(&arg, heap, interns)?;
                    Ok(allocate_list(items, heap))
                }
                other => Err(ExcType::type_error_arg_count("list", 1, other.count())),
            },
            Self::Tuple => match args {
                ArgValues::Empty => Ok(allocate_tuple(Vec::new(), heap)),
                ArgValues::One(arg) => {
                    let items = sequence_items(&arg, heap, interns)?;
                    Ok(allocate_tuple(items, heap))
                }
                other => Err(ExcType::type_error_arg_count("tuple", 1, other.count())),
            },
            Self::Dict => match args {
                ArgValues::Empty => Ok(Value::Ref(heap.allocate(HeapData::Dict(Dict::new())))),
                ArgValues::One(arg) => {
                    let copied = match &arg {
                        Value::Ref(id) => match heap.get(*id) {
                            HeapData::Dict(dict) => dict.clone(),
                            _ => {
                                return Err(ExcType::type_error(format!(
                                    "'{}' object is not a mapping",
                                    arg.py_type(heap)
                                )));
                            }
                        },
                        _ => {
                            return Err(ExcType::type_error(format!(
                                "'{}' object is not a mapping",
                                arg.py_type(heap)
                            )));
                        }
                    };
                    Ok(Value::Ref(heap.allocate(HeapData::Dict(copied))))
                }
                other => Err(ExcType::type_error_arg_count("dict", 1, other.count())),
            },
            _ => Err(ExcType::type_error(format!("cannot create '{self}' instances"))),
        }
    }
}

/// `int(...)`: identity for ints, truncation for floats, base-10 parse
/// for strings.
fn construct_int(args: ArgValues, heap: &Heap, interns: &Interns) -> RunResult<Value> {
    match args {
        ArgValues::Empty => Ok(Value::Int(0)),
        ArgValues::One(arg) => match &arg {
            Value::Int(i) => Ok(Value::Int(*i)),
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            Value::Float(f) => {
                let truncated = f.trunc();
                if truncated >= i64::MIN as f64 && truncated <= i64::MAX as f64 {
                    Ok(Value::Int(truncated as i64))
                } else {
                    Err(ExcType::int_overflow("int()"))
                }
            }
            _ => match arg.as_str(heap, interns) {
                Some(text) => text
                    .trim()
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| ExcType::value_error_int_literal(text)),
                None => Err(ExcType::type_error_int_conversion(arg.py_type(heap))),
            },
        },
        other => Err(ExcType::type_error_at_most("int", 1, other.count())),
    }
}

/// `float(...)`: widening for ints, parse for strings.
fn construct_float(args: ArgValues, heap: &Heap, interns: &Interns) -> RunResult<Value> {
    match args {
        ArgValues::Empty => Ok(Value::Float(0.0)),
        ArgValues::One(arg) => match &arg {
            Value::Float(f) => Ok(Value::Float(*f)),
            Value::Int(i) => Ok(Value::Float(*i as f64)),
            Value::Bool(b) => Ok(Value::Float(f64::from(u8::from(*b)))),
            _ => match arg.as_str(heap, interns) {
                Some(text) => text
                    .trim()
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| ExcType::value_error_float_literal(text)),
                None => Err(ExcType::type_error_float_conversion(arg.py_type(heap))),
            },
        },
        other => Err(ExcType::type_error_at_most("float", 1, other.count())),
    }
}

/// Extracts the items of a list, tuple, or string for the sequence
/// constructors.
fn sequence_items(value: &Value, heap: &mut Heap, interns: &Interns) -> RunResult<Vec<Value>> {
    match value {
        Value::Ref(id) => match heap.get(*id) {
            HeapData::List(list) => Ok(list.items().to_vec()),
            HeapData::Tuple(tuple) => Ok(tuple.items().to_vec()),
            HeapData::Str(s) => {
                let chars: Vec<String> = s.as_str().chars().map(String::from).collect();
                Ok(chars.into_iter().map(|c| allocate_str(c, heap)).collect())
            }
            _ => Err(ExcType::type_error(format!(
                "'{}' object is not iterable",
                value.py_type(heap)
            ))),
        },
        Value::InternString(id) => {
            let chars: Vec<String> = interns.get_str(*id).chars().map(String::from).collect();
            Ok(chars.into_iter().map(|c| allocate_str(c, heap)).collect())
        }
        _ => Err(ExcType::type_error(format!(
            "'{}' object is not iterable",
            value.py_type(heap)
        ))),
    }
}

/// Whether a type's method table contains the given method, for unbound
/// access like `str.upper`.
pub(crate) fn type_has_method(ty: Type, method: StaticStrings) -> bool {
    use StaticStrings as S;
    match ty {
        Type::Str => matches!(
            method,
            S::Upper
                | S::Lower
                | S::Strip
                | S::Lstrip
                | S::Rstrip
                | S::Startswith
                | S::Endswith
                | S::Find
                | S::Index
                | S::Count
                | S::Replace
                | S::Split
                | S::Join
                | S::Capitalize
                | S::Title
        ),
        Type::List => matches!(
            method,
            S::Append
                | S::Extend
                | S::Insert
                | S::Pop
                | S::Remove
                | S::Index
                | S::Count
                | S::Clear
                | S::Copy
                | S::Reverse
        ),
        Type::Dict => matches!(
            method,
            S::Get | S::Keys | S::Values | S::Items | S::Pop | S::Setdefault | S::Update | S::Clear | S::Copy
        ),
        Type::Tuple => matches!(method, S::Index | S::Count),
        Type::Bytes => matches!(method, S::Decode),
        _ => false,
    }
}
