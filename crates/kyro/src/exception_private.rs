use std::fmt::{self, Write};

use smallvec::SmallVec;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    args::ArgValues,
    heap::{Heap, HeapData},
    intern::{Interns, StringId},
    types::Type,
    value::Value,
};

/// Result type alias for operations that can produce a runtime error.
pub(crate) type RunResult<T> = Result<T, RunError>;

/// Guest exception types supported by the engine.
///
/// Uses strum derives for automatic `Display`, `FromStr`, and
/// `Into<&'static str>` implementations. The string representation
/// matches the variant name exactly (e.g. `ValueError` -> "ValueError").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
pub enum ExcType {
    /// Root of the exception tree - matches any exception.
    BaseException,
    /// Base class of every ordinary exception.
    Exception,

    AttributeError,

    // --- NameError hierarchy ---
    NameError,
    /// Subclass of NameError - local variable read before assignment.
    UnboundLocalError,

    // --- RuntimeError hierarchy ---
    RuntimeError,
    /// Subclass of RuntimeError - call depth limit reached.
    RecursionError,
    /// Subclass of RuntimeError.
    NotImplementedError,

    // --- Lookup failures ---
    IndexError,
    KeyError,

    // --- Arithmetic failures ---
    OverflowError,
    ZeroDivisionError,

    // --- Standalone exception types ---
    StopIteration,
    TypeError,
    ValueError,
}

impl ExcType {
    /// Checks if this exception type is a subclass of another, for
    /// instance checks against the exception tree.
    ///
    /// Returns true if `self` is `handler_type` or descends from it.
    #[must_use]
    pub fn is_subclass_of(self, handler_type: Self) -> bool {
        if self == handler_type {
            return true;
        }
        match handler_type {
            Self::BaseException => true,
            Self::Exception => self != Self::BaseException,
            Self::NameError => self == Self::UnboundLocalError,
            Self::RuntimeError => matches!(self, Self::RecursionError | Self::NotImplementedError),
            _ => false,
        }
    }

    /// Returns the parent type in the exception tree, `None` at the root.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::BaseException => None,
            Self::Exception => Some(Self::BaseException),
            Self::UnboundLocalError => Some(Self::NameError),
            Self::RecursionError | Self::NotImplementedError => Some(Self::RuntimeError),
            _ => Some(Self::Exception),
        }
    }

    /// Creates an exception instance from a constructor call like
    /// `ValueError('message')`.
    ///
    /// Accepts zero arguments or one argument; a string argument becomes
    /// the message verbatim, anything else is stringified.
    pub(crate) fn call(
        self,
        heap: &mut Heap,
        args: ArgValues,
        interns: &Interns,
    ) -> RunResult<Value> {
        let exc = match args {
            ArgValues::Empty => SimpleException::new_none(self),
            ArgValues::One(arg) => {
                let msg = arg.py_str(heap, interns).into_owned();
                SimpleException::new_msg(self, msg)
            }
            other => {
                return Err(Self::type_error(format!(
                    "{self}() takes at most 1 argument ({} given)",
                    other.count()
                )));
            }
        };
        let heap_id = heap.allocate(HeapData::Exception(exc));
        Ok(Value::Ref(heap_id))
    }

    /// Creates a simple TypeError with a custom message.
    #[must_use]
    pub(crate) fn type_error(msg: impl fmt::Display) -> RunError {
        SimpleException::new_msg(Self::TypeError, msg).into()
    }

    /// Creates a simple ValueError with a custom message.
    #[must_use]
    pub(crate) fn value_error(msg: impl fmt::Display) -> RunError {
        SimpleException::new_msg(Self::ValueError, msg).into()
    }

    /// Creates an AttributeError for a missing attribute.
    #[must_use]
    pub(crate) fn attribute_error(type_name: impl fmt::Display, attr: &str) -> RunError {
        SimpleException::new_msg(
            Self::AttributeError,
            format!("'{type_name}' object has no attribute '{attr}'"),
        )
        .into()
    }

    /// Creates an AttributeError for attribute assignment on a type with
    /// read-only attributes.
    #[must_use]
    pub(crate) fn attribute_error_no_setattr(type_: Type, attr: &str) -> RunError {
        SimpleException::new_msg(
            Self::AttributeError,
            format!("'{type_}' object attribute '{attr}' is read-only"),
        )
        .into()
    }

    /// Creates a NameError for an undefined variable.
    #[must_use]
    pub(crate) fn name_error(name: &str) -> RunError {
        SimpleException::new_msg(Self::NameError, format!("name '{name}' is not defined")).into()
    }

    /// Creates an UnboundLocalError for a local read before assignment.
    #[must_use]
    pub(crate) fn unbound_local_error(name: &str) -> RunError {
        SimpleException::new_msg(
            Self::UnboundLocalError,
            format!("cannot access local variable '{name}' where it is not associated with a value"),
        )
        .into()
    }

    /// Creates a ZeroDivisionError for integer division by zero.
    #[must_use]
    pub(crate) fn zero_division() -> RunError {
        SimpleException::new_msg(Self::ZeroDivisionError, "division by zero").into()
    }

    /// Creates a ZeroDivisionError for float division by zero.
    #[must_use]
    pub(crate) fn float_zero_division() -> RunError {
        SimpleException::new_msg(Self::ZeroDivisionError, "float division by zero").into()
    }

    /// Creates a ZeroDivisionError for integer modulo by zero.
    #[must_use]
    pub(crate) fn zero_modulo() -> RunError {
        SimpleException::new_msg(Self::ZeroDivisionError, "integer modulo by zero").into()
    }

    /// Creates a RecursionError for exceeding the frame depth limit.
    #[must_use]
    pub(crate) fn recursion_error() -> RunError {
        SimpleException::new_msg(Self::RecursionError, "maximum recursion depth exceeded").into()
    }

    /// Creates the RuntimeError raised by a bare `raise` with no active
    /// exception.
    #[must_use]
    pub(crate) fn no_active_exception() -> RunError {
        SimpleException::new_msg(Self::RuntimeError, "No active exception to re-raise").into()
    }

    /// Creates an OverflowError for i64 arithmetic overflow.
    #[must_use]
    pub(crate) fn int_overflow(op: &str) -> RunError {
        SimpleException::new_msg(Self::OverflowError, format!("integer overflow in {op}")).into()
    }

    /// Creates a KeyError for a missing dict key.
    #[must_use]
    pub(crate) fn key_error(key: &Value, heap: &Heap, interns: &Interns) -> RunError {
        let mut msg = String::new();
        key.py_repr_fmt(&mut msg, heap, interns).expect("write to String cannot fail");
        SimpleException::new_msg(Self::KeyError, msg).into()
    }

    /// Creates an IndexError for list index out of range.
    #[must_use]
    pub(crate) fn list_index_error() -> RunError {
        SimpleException::new_msg(Self::IndexError, "list index out of range").into()
    }

    /// Creates an IndexError for popping from an empty list.
    #[must_use]
    pub(crate) fn index_error_pop_empty_list() -> RunError {
        SimpleException::new_msg(Self::IndexError, "pop from empty list").into()
    }

    /// Creates an IndexError for `list.pop(index)` with an invalid index.
    #[must_use]
    pub(crate) fn index_error_pop_out_of_range() -> RunError {
        SimpleException::new_msg(Self::IndexError, "pop index out of range").into()
    }

    /// Creates an IndexError for tuple index out of range.
    #[must_use]
    pub(crate) fn tuple_index_error() -> RunError {
        SimpleException::new_msg(Self::IndexError, "tuple index out of range").into()
    }

    /// Creates an IndexError for string index out of range.
    #[must_use]
    pub(crate) fn str_index_error() -> RunError {
        SimpleException::new_msg(Self::IndexError, "string index out of range").into()
    }

    /// Creates an IndexError for bytes index out of range.
    #[must_use]
    pub(crate) fn bytes_index_error() -> RunError {
        SimpleException::new_msg(Self::IndexError, "index out of range").into()
    }

    /// Creates a TypeError for subscripting a non-subscriptable value.
    #[must_use]
    pub(crate) fn type_error_not_sub(type_: Type) -> RunError {
        SimpleException::new_msg(Self::TypeError, format!("'{type_}' object is not subscriptable")).into()
    }

    /// Creates a TypeError for non-integer sequence indices.
    #[must_use]
    pub(crate) fn type_error_indices(type_: Type, index_type: Type) -> RunError {
        SimpleException::new_msg(
            Self::TypeError,
            format!("{type_} indices must be integers, not '{index_type}'"),
        )
        .into()
    }

    /// Creates a TypeError for calling a non-callable value.
    #[must_use]
    pub(crate) fn type_error_not_callable(type_: Type) -> RunError {
        SimpleException::new_msg(Self::TypeError, format!("'{type_}' object is not callable")).into()
    }

    /// Creates a TypeError for `hash()` of an unhashable value.
    #[must_use]
    pub(crate) fn type_error_unhashable(type_: Type) -> RunError {
        SimpleException::new_msg(Self::TypeError, format!("unhashable type: '{type_}'")).into()
    }

    /// Creates a TypeError for an unhashable value used as a dict key.
    #[must_use]
    pub(crate) fn type_error_unhashable_dict_key(type_: Type) -> RunError {
        SimpleException::new_msg(
            Self::TypeError,
            format!("cannot use '{type_}' as a dict key (unhashable type: '{type_}')"),
        )
        .into()
    }

    /// Creates a TypeError for a value with no `len()`.
    #[must_use]
    pub(crate) fn type_error_no_len(type_: Type) -> RunError {
        SimpleException::new_msg(Self::TypeError, format!("object of type '{type_}' has no len()")).into()
    }

    /// Creates a TypeError for unsupported binary operations.
    ///
    /// For `+` with str/list on the left, the source language has a
    /// dedicated concatenation message.
    #[must_use]
    pub(crate) fn binary_type_error(op: &str, lhs_type: Type, rhs_type: Type) -> RunError {
        let message = if op == "+" && (lhs_type == Type::Str || lhs_type == Type::List) {
            format!("can only concatenate {lhs_type} (not \"{rhs_type}\") to {lhs_type}")
        } else {
            format!("unsupported operand type(s) for {op}: '{lhs_type}' and '{rhs_type}'")
        };
        SimpleException::new_msg(Self::TypeError, message).into()
    }

    /// Creates a TypeError for unsupported unary operations.
    #[must_use]
    pub(crate) fn unary_type_error(op: &str, value_type: Type) -> RunError {
        SimpleException::new_msg(
            Self::TypeError,
            format!("bad operand type for unary {op}: '{value_type}'"),
        )
        .into()
    }

    /// Creates a TypeError for unorderable operand types.
    #[must_use]
    pub(crate) fn compare_type_error(op: &str, lhs_type: Type, rhs_type: Type) -> RunError {
        SimpleException::new_msg(
            Self::TypeError,
            format!("'{op}' not supported between instances of '{lhs_type}' and '{rhs_type}'"),
        )
        .into()
    }

    /// Creates a TypeError for a function receiving the wrong number of
    /// arguments, in the builtin-call format.
    #[must_use]
    pub(crate) fn type_error_arg_count(name: &str, expected: usize, actual: usize) -> RunError {
        if expected == 1 {
            SimpleException::new_msg(
                Self::TypeError,
                format!("{name}() takes exactly one argument ({actual} given)"),
            )
            .into()
        } else {
            SimpleException::new_msg(
                Self::TypeError,
                format!("{name} expected {expected} arguments, got {actual}"),
            )
            .into()
        }
    }

    /// Creates a TypeError for a method receiving fewer arguments than
    /// required.
    #[must_use]
    pub(crate) fn type_error_at_least(name: &str, min: usize, actual: usize) -> RunError {
        SimpleException::new_msg(
            Self::TypeError,
            format!("{name} expected at least {min} argument, got {actual}"),
        )
        .into()
    }

    /// Creates a TypeError for a method receiving more arguments than
    /// allowed.
    #[must_use]
    pub(crate) fn type_error_at_most(name: &str, max: usize, actual: usize) -> RunError {
        SimpleException::new_msg(
            Self::TypeError,
            format!("{name} expected at most {max} arguments, got {actual}"),
        )
        .into()
    }

    /// Creates a TypeError for missing positional arguments, naming them.
    #[must_use]
    pub(crate) fn type_error_missing_positional(name: &str, missing_names: &[&str]) -> RunError {
        let count = missing_names.len();
        let names_str = format_param_names(missing_names);
        let plural = if count == 1 { "argument" } else { "arguments" };
        SimpleException::new_msg(
            Self::TypeError,
            format!("{name}() missing {count} required positional {plural}: {names_str}"),
        )
        .into()
    }

    /// Creates a TypeError for missing keyword-only arguments, naming them.
    #[must_use]
    pub(crate) fn type_error_missing_kwonly(name: &str, missing_names: &[&str]) -> RunError {
        let count = missing_names.len();
        let names_str = format_param_names(missing_names);
        let plural = if count == 1 { "argument" } else { "arguments" };
        SimpleException::new_msg(
            Self::TypeError,
            format!("{name}() missing {count} required keyword-only {plural}: {names_str}"),
        )
        .into()
    }

    /// Creates a TypeError for too many positional arguments.
    #[must_use]
    pub(crate) fn type_error_too_many_positional(name: &str, max: usize, actual: usize) -> RunError {
        let takes_word = if max == 1 { "argument" } else { "arguments" };
        let given_word = if actual == 1 { "was" } else { "were" };
        SimpleException::new_msg(
            Self::TypeError,
            format!("{name}() takes {max} positional {takes_word} but {actual} {given_word} given"),
        )
        .into()
    }

    /// Creates a TypeError for an unexpected keyword argument.
    #[must_use]
    pub(crate) fn type_error_unexpected_keyword(name: &str, key: &str) -> RunError {
        SimpleException::new_msg(
            Self::TypeError,
            format!("{name}() got an unexpected keyword argument '{key}'"),
        )
        .into()
    }

    /// Creates a TypeError for an argument passed both positionally and
    /// by keyword.
    #[must_use]
    pub(crate) fn type_error_duplicate_arg(name: &str, param: &str) -> RunError {
        SimpleException::new_msg(
            Self::TypeError,
            format!("{name}() got multiple values for argument '{param}'"),
        )
        .into()
    }

    /// Creates a TypeError for a positional-only parameter passed as a
    /// keyword.
    #[must_use]
    pub(crate) fn type_error_positional_only(name: &str, param: &str) -> RunError {
        SimpleException::new_msg(
            Self::TypeError,
            format!("{name}() got some positional-only arguments passed as keyword arguments: '{param}'"),
        )
        .into()
    }

    /// Creates the ValueError raised by `int()` on an unparsable string.
    #[must_use]
    pub(crate) fn value_error_int_literal(text: &str) -> RunError {
        SimpleException::new_msg(
            Self::ValueError,
            format!("invalid literal for int() with base 10: '{text}'"),
        )
        .into()
    }

    /// Creates the ValueError raised by `float()` on an unparsable string.
    #[must_use]
    pub(crate) fn value_error_float_literal(text: &str) -> RunError {
        SimpleException::new_msg(
            Self::ValueError,
            format!("could not convert string to float: '{text}'"),
        )
        .into()
    }

    /// Creates a TypeError for `int()` applied to an unconvertible type.
    #[must_use]
    pub(crate) fn type_error_int_conversion(type_: Type) -> RunError {
        SimpleException::new_msg(
            Self::TypeError,
            format!("int() argument must be a string, a bytes-like object or a real number, not '{type_}'"),
        )
        .into()
    }

    /// Creates a TypeError for `float()` applied to an unconvertible type.
    #[must_use]
    pub(crate) fn type_error_float_conversion(type_: Type) -> RunError {
        SimpleException::new_msg(
            Self::TypeError,
            format!("float() argument must be a string or a real number, not '{type_}'"),
        )
        .into()
    }
}

/// Formats parameter names as `'a'`, `'a' and 'b'`, or `'a', 'b', and 'c'`.
fn format_param_names(names: &[&str]) -> String {
    let mut quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    let last = quoted.pop().unwrap_or_default();
    if quoted.is_empty() {
        last
    } else {
        format!("{}, and {last}", quoted.join(", "))
    }
}

/// Lightweight representation of an exception instance.
///
/// Shared between in-flight errors ([`RunError::Exc`]) and heap-allocated
/// exception values created by constructor calls; raising a heap
/// exception clones this out of the heap.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SimpleException {
    exc_type: ExcType,
    arg: Option<String>,
    /// Explicit chaining cause set by a two-operand raise.
    cause: Option<Box<SimpleException>>,
}

impl SimpleException {
    /// Creates a new exception with the given type and message.
    #[must_use]
    pub fn new_msg(exc_type: ExcType, arg: impl fmt::Display) -> Self {
        Self {
            exc_type,
            arg: Some(arg.to_string()),
            cause: None,
        }
    }

    /// Creates a new exception with no message, e.g. a bare `StopIteration`.
    #[must_use]
    pub fn new_none(exc_type: ExcType) -> Self {
        Self {
            exc_type,
            arg: None,
            cause: None,
        }
    }

    #[must_use]
    pub fn exc_type(&self) -> ExcType {
        self.exc_type
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.arg.as_deref()
    }

    pub fn into_message(self) -> Option<String> {
        self.arg
    }

    #[must_use]
    pub fn cause(&self) -> Option<&Self> {
        self.cause.as_ref().map(Box::as_ref)
    }

    /// Attaches a chaining cause, consuming self.
    #[must_use]
    pub fn with_cause(mut self, cause: Self) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Writes `str(exc)`: the message, or empty for a message-less
    /// exception.
    pub fn py_str_fmt<W: Write>(&self, f: &mut W) -> fmt::Result {
        match &self.arg {
            Some(arg) => f.write_str(arg),
            None => Ok(()),
        }
    }

    /// Writes `repr(exc)`, e.g. `ValueError('bad value')`.
    pub fn py_repr_fmt<W: Write>(&self, f: &mut W) -> fmt::Result {
        match &self.arg {
            Some(arg) => write!(f, "{}({arg:?})", self.exc_type),
            None => write!(f, "{}()", self.exc_type),
        }
    }
}

impl fmt::Display for SimpleException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.py_repr_fmt(f)
    }
}

/// One traceback entry, captured as an error unwinds through a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TraceEntry {
    pub filename: StringId,
    pub code_name: StringId,
    pub lineno: u32,
}

/// An exception in flight, accumulating its traceback frame by frame.
///
/// Entries are appended innermost-first as frames unwind; display order
/// (outermost first) is the reverse.
#[derive(Debug, Clone)]
pub(crate) struct ExceptionRaise {
    pub exc: SimpleException,
    pub traceback: SmallVec<[TraceEntry; 8]>,
}

/// A failed operation: either a guest exception or an engine fault.
///
/// Guest errors propagate through frames and are observable by guest
/// code; engine faults indicate corrupted input or an engine bug and
/// abort the run without ever being visible to the guest.
#[derive(Debug)]
pub(crate) enum RunError {
    /// A guest exception with its accumulated traceback.
    Exc(Box<ExceptionRaise>),
    /// An unrecoverable engine fault (invariant violation, bad dispatch).
    Internal(String),
}

impl RunError {
    /// Creates an engine fault with a diagnostic message.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Appends a traceback entry to a guest error; engine faults pass
    /// through untouched.
    #[must_use]
    pub fn with_frame(mut self, entry: TraceEntry) -> Self {
        if let Self::Exc(raise) = &mut self {
            raise.traceback.push(entry);
        }
        self
    }
}

impl From<crate::exception_public::Exception> for RunError {
    fn from(exc: crate::exception_public::Exception) -> Self {
        let simple = match exc.message() {
            Some(msg) => SimpleException::new_msg(exc.exc_type(), msg),
            None => SimpleException::new_none(exc.exc_type()),
        };
        simple.into()
    }
}

impl From<SimpleException> for RunError {
    fn from(exc: SimpleException) -> Self {
        Self::Exc(Box::new(ExceptionRaise {
            exc,
            traceback: SmallVec::new(),
        }))
    }
}
