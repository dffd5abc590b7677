//! Host-implemented callables: builtin functions, type constructors,
//! exception types, and unbound type methods.
//!
//! Everything here answers the same uniform call surface the interpreter
//! dispatches through ([`Builtins::call`]); none of these need a
//! bytecode frame.

mod hash;
mod len;
mod print;
mod repr;
mod type_;

use std::fmt::Write;

use strum::{Display, EnumString, IntoStaticStr};

use crate::args::ArgValues;
use crate::exception_private::{ExcType, RunResult};
use crate::heap::{Heap, HeapData};
use crate::intern::{Interns, StaticStrings};
use crate::io::PrintWriter;
use crate::types::{Type, bytes, dict, list, str as str_type, tuple};
use crate::value::Value;

/// Enumerates every host-implemented callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Builtins {
    /// A builtin function like `print` or `len`.
    Function(BuiltinsFunctions),
    /// An exception type constructor like `ValueError`.
    ExcType(ExcType),
    /// A type constructor like `int` or `list`.
    Type(Type),
    /// An unbound method of a builtin type, e.g. `str.upper`. When
    /// called, the first argument is the receiver.
    TypeMethod { ty: Type, method: StaticStrings },
}

/// The builtin functions proper.
///
/// Uses strum derives so the variant name doubles as the guest-level
/// name (`Print` -> "print").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum BuiltinsFunctions {
    Print,
    Len,
    Repr,
    Hash,
    Type,
}

impl Builtins {
    /// Calls this builtin with the given arguments.
    pub fn call(
        self,
        heap: &mut Heap,
        args: ArgValues,
        interns: &Interns,
        print: &mut dyn PrintWriter,
    ) -> RunResult<Value> {
        match self {
            Self::Function(b) => b.call(heap, args, interns, print),
            Self::ExcType(exc) => exc.call(heap, args, interns),
            Self::Type(t) => t.call(heap, args, interns),
            Self::TypeMethod { ty, method } => call_type_method(ty, method, heap, args, interns),
        }
    }

    /// Writes the guest repr for this callable.
    pub fn py_repr_fmt<W: Write>(self, f: &mut W) -> std::fmt::Result {
        match self {
            Self::Function(BuiltinsFunctions::Type) => write!(f, "<class 'type'>"),
            Self::Function(b) => write!(f, "<built-in function {b}>"),
            Self::ExcType(e) => write!(f, "<class '{e}'>"),
            Self::Type(t) => write!(f, "<class '{t}'>"),
            Self::TypeMethod { ty, method } => {
                write!(f, "<method '{}' of '{ty}' objects>", method.as_str())
            }
        }
    }

    /// Returns the guest type of this callable.
    pub fn py_type(self) -> Type {
        match self {
            Self::Function(BuiltinsFunctions::Type) => Type::Type,
            Self::Function(_) | Self::TypeMethod { .. } => Type::BuiltinFunction,
            Self::ExcType(_) | Self::Type(_) => Type::Type,
        }
    }
}

impl BuiltinsFunctions {
    fn call(
        self,
        heap: &mut Heap,
        args: ArgValues,
        interns: &Interns,
        print: &mut dyn PrintWriter,
    ) -> RunResult<Value> {
        match self {
            Self::Print => print::builtin_print(heap, args, interns, print),
            Self::Len => len::builtin_len(heap, args, interns),
            Self::Repr => repr::builtin_repr(heap, args, interns),
            Self::Hash => hash::builtin_hash(heap, args, interns),
            Self::Type => type_::builtin_type(heap, args),
        }
    }
}

/// Calls an unbound type method like `str.upper('HELLO')` or a method
/// bound by attribute access.
///
/// The first argument is the receiver; the method table of the receiver's
/// type performs the actual work.
fn call_type_method(
    ty: Type,
    method: StaticStrings,
    heap: &mut Heap,
    args: ArgValues,
    interns: &Interns,
) -> RunResult<Value> {
    let (mut positional, kwargs) = args.into_parts();
    if !kwargs.is_empty() {
        return Err(ExcType::type_error(format!(
            "{}.{}() takes no keyword arguments",
            ty,
            method.as_str()
        )));
    }
    if positional.is_empty() {
        return Err(ExcType::type_error(format!(
            "descriptor '{}' of '{ty}' object needs an argument",
            method.as_str()
        )));
    }
    let receiver = positional.remove(0);
    let rest = ArgValues::positional(positional);
    let method_id = method.into();

    match ty {
        Type::Str => match receiver.as_str(heap, interns) {
            Some(text) => {
                let text = text.to_owned();
                str_type::call_str_method(&text, method_id, rest, heap, interns)
            }
            None => Err(descriptor_mismatch(ty, method, &receiver, heap)),
        },
        Type::Bytes => match receiver.as_bytes(heap, interns) {
            Some(content) => {
                let content = content.to_vec();
                bytes::call_bytes_method(&content, method_id, rest, heap, interns)
            }
            None => Err(descriptor_mismatch(ty, method, &receiver, heap)),
        },
        Type::List => match receiver {
            Value::Ref(id) if matches!(heap.get(id), HeapData::List(_)) => {
                list::call_list_method(id, method_id, rest, heap, interns)
            }
            _ => Err(descriptor_mismatch(ty, method, &receiver, heap)),
        },
        Type::Tuple => match receiver {
            Value::Ref(id) if matches!(heap.get(id), HeapData::Tuple(_)) => {
                tuple::call_tuple_method(id, method_id, rest, heap, interns)
            }
            _ => Err(descriptor_mismatch(ty, method, &receiver, heap)),
        },
        Type::Dict => match receiver {
            Value::Ref(id) if matches!(heap.get(id), HeapData::Dict(_)) => {
                dict::call_dict_method(id, method_id, rest, heap, interns)
            }
            _ => Err(descriptor_mismatch(ty, method, &receiver, heap)),
        },
        _ => Err(ExcType::type_error(format!(
            "descriptor '{}' not supported by type '{ty}'",
            method.as_str()
        ))),
    }
}

fn descriptor_mismatch(
    ty: Type,
    method: StaticStrings,
    receiver: &Value,
    heap: &Heap,
) -> crate::exception_private::RunError {
    ExcType::type_error(format!(
        "descriptor '{}' requires a '{ty}' object but received a '{}'",
        method.as_str(),
        receiver.py_type(heap)
    ))
}
