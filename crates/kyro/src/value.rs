//! The runtime value universe.
//!
//! `Value` is a closed tagged union: small immediate values are stored
//! inline, interned literals point into the intern table, and compound
//! values live in the arena heap behind `Value::Ref`. The capability
//! surface every value answers (`py_type`, `py_bool`, `py_len`, `py_eq`,
//! `py_hash`, `py_str`, `py_repr_fmt`) is implemented here, delegating
//! to the heap data types for compound values.

use std::borrow::Cow;
use std::fmt::{self, Write};

use crate::builtins::Builtins;
use crate::bytecode::CodeId;
use crate::exception_private::{ExcType, RunResult};
use crate::heap::{Heap, HeapData, HeapId};
use crate::intern::{BytesId, Interns, StringId};
use crate::py_hash::{hash_bytes, hash_float, hash_int, hash_str};
use crate::types::Type;
use crate::types::bytes::bytes_repr_fmt;
use crate::types::str::string_repr_fmt;

/// Primary value type representing guest objects at runtime.
///
/// Cloning a `Value` clones a handle, never the underlying data: two
/// clones of a `Ref` alias the same heap slot, which is exactly the
/// guest language's sharing semantics.
#[derive(Debug, Clone)]
pub(crate) enum Value {
    /// Sentinel for an unassigned local or name-cache slot. Never guest
    /// visible; reading one raises before the value escapes.
    Undefined,
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// An interned string literal from the module file.
    InternString(StringId),
    /// An interned bytes literal from the module file.
    InternBytes(BytesId),
    /// A builtin function, type constructor, exception type, or unbound
    /// type method.
    Builtin(Builtins),
    /// A compiled code object, as found in module constants.
    Code(CodeId),
    /// A compound value in the arena heap.
    Ref(HeapId),
}

impl Value {
    /// Returns the guest type of this value.
    pub fn py_type(&self, heap: &Heap) -> Type {
        match self {
            Self::Undefined => Type::NoneType,
            Self::None => Type::NoneType,
            Self::Bool(_) => Type::Bool,
            Self::Int(_) => Type::Int,
            Self::Float(_) => Type::Float,
            Self::InternString(_) => Type::Str,
            Self::InternBytes(_) => Type::Bytes,
            Self::Builtin(b) => b.py_type(),
            Self::Code(_) => Type::Code,
            Self::Ref(id) => heap.get(*id).py_type(),
        }
    }

    /// Truthiness: empty containers, zero numbers, and `None` are false.
    pub fn py_bool(&self, heap: &Heap, interns: &Interns) -> bool {
        match self {
            Self::Undefined | Self::None => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::InternString(id) => !interns.get_str(*id).is_empty(),
            Self::InternBytes(id) => !interns.get_bytes(*id).is_empty(),
            Self::Builtin(_) | Self::Code(_) => true,
            Self::Ref(id) => match heap.get(*id) {
                HeapData::Str(s) => !s.as_str().is_empty(),
                HeapData::Bytes(b) => b.len() != 0,
                HeapData::List(list) => list.len() != 0,
                HeapData::Tuple(tuple) => tuple.len() != 0,
                HeapData::Dict(dict) => !dict.is_empty(),
                HeapData::Function(_) | HeapData::BoundMethod(_) | HeapData::Exception(_) => true,
            },
        }
    }

    /// Length for sized values, `None` for everything else.
    ///
    /// Strings count characters, not bytes, to match guest semantics.
    pub fn py_len(&self, heap: &Heap, interns: &Interns) -> Option<usize> {
        match self {
            Self::InternString(id) => Some(interns.get_str(*id).chars().count()),
            Self::InternBytes(id) => Some(interns.get_bytes(*id).len()),
            Self::Ref(id) => match heap.get(*id) {
                HeapData::Str(s) => Some(s.char_len()),
                HeapData::Bytes(b) => Some(b.len()),
                HeapData::List(list) => Some(list.len()),
                HeapData::Tuple(tuple) => Some(tuple.len()),
                HeapData::Dict(dict) => Some(dict.len()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Borrows string content for interned or heap strings.
    pub fn as_str<'a>(&self, heap: &'a Heap, interns: &'a Interns) -> Option<&'a str> {
        match self {
            Self::InternString(id) => Some(interns.get_str(*id)),
            Self::Ref(id) => match heap.get(*id) {
                HeapData::Str(s) => Some(s.as_str()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Borrows bytes content for interned or heap bytes.
    pub fn as_bytes<'a>(&self, heap: &'a Heap, interns: &'a Interns) -> Option<&'a [u8]> {
        match self {
            Self::InternBytes(id) => Some(interns.get_bytes(*id)),
            Self::Ref(id) => match heap.get(*id) {
                HeapData::Bytes(b) => Some(b.as_slice()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Structural equality with the guest's cross-type numeric rules.
    pub fn py_eq(&self, other: &Self, heap: &Heap, interns: &Interns) -> bool {
        match (self, other) {
            (Self::Undefined, _) | (_, Self::Undefined) => false,
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Bool(a), Self::Int(b)) | (Self::Int(b), Self::Bool(a)) => i64::from(*a) == *b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => (*a as f64) == *b,
            (Self::Bool(a), Self::Float(b)) | (Self::Float(b), Self::Bool(a)) => f64::from(u8::from(*a)) == *b,
            (Self::InternString(a), Self::InternString(b)) => a == b,
            (Self::Builtin(a), Self::Builtin(b)) => a == b,
            (Self::Code(a), Self::Code(b)) => a == b,
            (Self::Ref(a), Self::Ref(b)) if a == b => true,
            _ => {
                // String and bytes content comparison across the
                // interned/heap divide.
                if let (Some(a), Some(b)) = (self.as_str(heap, interns), other.as_str(heap, interns)) {
                    return a == b;
                }
                if let (Some(a), Some(b)) = (self.as_bytes(heap, interns), other.as_bytes(heap, interns)) {
                    return a == b;
                }
                let (Self::Ref(a), Self::Ref(b)) = (self, other) else {
                    return false;
                };
                match (heap.get(*a), heap.get(*b)) {
                    (HeapData::List(x), HeapData::List(y)) => {
                        sequence_eq(x.items(), y.items(), heap, interns)
                    }
                    (HeapData::Tuple(x), HeapData::Tuple(y)) => {
                        sequence_eq(x.items(), y.items(), heap, interns)
                    }
                    (HeapData::Dict(x), HeapData::Dict(y)) => x.py_eq(y, heap, interns),
                    (HeapData::Exception(x), HeapData::Exception(y)) => x == y,
                    _ => false,
                }
            }
        }
    }

    /// Hash for hashable values; unhashable types raise TypeError.
    ///
    /// Numeric values of equal magnitude hash identically across int,
    /// bool, and float, matching the equality rules above.
    pub fn py_hash(&self, heap: &Heap, interns: &Interns) -> RunResult<i64> {
        match self {
            Self::None => Ok(hash_bytes(b"None")),
            Self::Bool(b) => Ok(hash_int(i64::from(*b))),
            Self::Int(i) => Ok(hash_int(*i)),
            Self::Float(f) => Ok(hash_float(*f)),
            Self::InternString(id) => Ok(hash_str(interns.get_str(*id))),
            Self::InternBytes(id) => Ok(hash_bytes(interns.get_bytes(*id))),
            Self::Ref(id) => match heap.get(*id) {
                HeapData::Str(s) => Ok(hash_str(s.as_str())),
                HeapData::Bytes(b) => Ok(hash_bytes(b.as_slice())),
                HeapData::Tuple(tuple) => {
                    let mut hashes = Vec::with_capacity(tuple.len());
                    for item in tuple.items() {
                        hashes.push(item.py_hash(heap, interns)?);
                    }
                    Ok(tuple_hash(&hashes))
                }
                _ => Err(ExcType::type_error_unhashable(self.py_type(heap))),
            },
            _ => Err(ExcType::type_error_unhashable(self.py_type(heap))),
        }
    }

    /// Human-readable textual form, the `str()` of this value.
    pub fn py_str(&self, heap: &Heap, interns: &Interns) -> Cow<'static, str> {
        match self {
            Self::None => Cow::Borrowed("None"),
            Self::Bool(true) => Cow::Borrowed("True"),
            Self::Bool(false) => Cow::Borrowed("False"),
            Self::Int(i) => Cow::Owned(i.to_string()),
            Self::Float(f) => Cow::Owned(float_repr(*f)),
            Self::InternString(id) => Cow::Owned(interns.get_str(*id).to_owned()),
            Self::Ref(id) => {
                if let HeapData::Str(s) = heap.get(*id) {
                    return Cow::Owned(s.as_str().to_owned());
                }
                if let HeapData::Exception(exc) = heap.get(*id) {
                    let mut out = String::new();
                    exc.py_str_fmt(&mut out).expect("write to String cannot fail");
                    return Cow::Owned(out);
                }
                let mut out = String::new();
                self.py_repr_fmt(&mut out, heap, interns)
                    .expect("write to String cannot fail");
                Cow::Owned(out)
            }
            _ => {
                let mut out = String::new();
                self.py_repr_fmt(&mut out, heap, interns)
                    .expect("write to String cannot fail");
                Cow::Owned(out)
            }
        }
    }

    /// Round-trip-oriented textual form, the `repr()` of this value.
    pub fn py_repr_fmt<W: Write>(&self, f: &mut W, heap: &Heap, interns: &Interns) -> fmt::Result {
        let mut stack = Vec::new();
        self.repr_into(f, heap, interns, &mut stack)
    }

    /// Repr with cycle detection: a container currently being printed
    /// renders as its elided form instead of recursing forever.
    fn repr_into<W: Write>(
        &self,
        f: &mut W,
        heap: &Heap,
        interns: &Interns,
        stack: &mut Vec<HeapId>,
    ) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("<undefined>"),
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => f.write_str(&float_repr(*v)),
            Self::InternString(id) => string_repr_fmt(interns.get_str(*id), f),
            Self::InternBytes(id) => bytes_repr_fmt(interns.get_bytes(*id), f),
            Self::Builtin(b) => b.py_repr_fmt(f),
            Self::Code(_) => f.write_str("<code object>"),
            Self::Ref(id) => {
                if stack.contains(id) {
                    return f.write_str(match heap.get(*id) {
                        HeapData::List(_) => "[...]",
                        HeapData::Tuple(_) => "(...)",
                        HeapData::Dict(_) => "{...}",
                        _ => "...",
                    });
                }
                match heap.get(*id) {
                    HeapData::Str(s) => string_repr_fmt(s.as_str(), f),
                    HeapData::Bytes(b) => bytes_repr_fmt(b.as_slice(), f),
                    HeapData::List(list) => {
                        stack.push(*id);
                        f.write_char('[')?;
                        for (index, item) in list.items().iter().enumerate() {
                            if index > 0 {
                                f.write_str(", ")?;
                            }
                            item.repr_into(f, heap, interns, stack)?;
                        }
                        stack.pop();
                        f.write_char(']')
                    }
                    HeapData::Tuple(tuple) => {
                        stack.push(*id);
                        f.write_char('(')?;
                        for (index, item) in tuple.items().iter().enumerate() {
                            if index > 0 {
                                f.write_str(", ")?;
                            }
                            item.repr_into(f, heap, interns, stack)?;
                        }
                        if tuple.len() == 1 {
                            f.write_char(',')?;
                        }
                        stack.pop();
                        f.write_char(')')
                    }
                    HeapData::Dict(dict) => {
                        stack.push(*id);
                        f.write_char('{')?;
                        for (index, (key, value)) in dict.iter().enumerate() {
                            if index > 0 {
                                f.write_str(", ")?;
                            }
                            key.repr_into(f, heap, interns, stack)?;
                            f.write_str(": ")?;
                            value.repr_into(f, heap, interns, stack)?;
                        }
                        stack.pop();
                        f.write_char('}')
                    }
                    HeapData::Function(func) => func.py_repr_fmt(f, interns, id.index()),
                    HeapData::BoundMethod(method) => {
                        write!(f, "<bound method of ")?;
                        method.receiver.repr_into(f, heap, interns, stack)?;
                        f.write_char('>')
                    }
                    HeapData::Exception(exc) => exc.py_repr_fmt(f),
                }
            }
        }
    }
}

/// Elementwise equality for sequences of the same kind.
fn sequence_eq(a: &[Value], b: &[Value], heap: &Heap, interns: &Interns) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.py_eq(y, heap, interns))
}

/// Combines element hashes into a tuple hash.
///
/// Classic multiply-xor accumulation; deterministic, and distinct from
/// the hash of any single element so `(x,)` does not collide with `x`.
fn tuple_hash(hashes: &[i64]) -> i64 {
    let mut acc: u64 = 0x3456_789a_bcde_f012;
    let mut mult: u64 = 1_000_003;
    let mut remaining = hashes.len() as u64;
    for &h in hashes {
        remaining -= 1;
        acc = (acc ^ (h as u64)).wrapping_mul(mult);
        mult = mult.wrapping_add(82_520 + 2 * remaining);
    }
    let result = acc.wrapping_add(97_531) as i64;
    if result == -1 { -2 } else { result }
}

/// Returns a string representation of a float matching the guest's
/// `repr()` behavior.
///
/// Uses the `ryu` crate for the shortest decimal representation that
/// round-trips through `f64` parsing. Key behaviors:
/// - special values render as `inf`, `-inf`, `nan`
/// - a decimal point or exponent is always present (`3.0`, not `3`)
/// - positive exponents carry an explicit sign (`1e+20`)
pub(crate) fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_owned();
    }
    if f.is_infinite() {
        return if f.is_sign_negative() { "-inf".to_owned() } else { "inf".to_owned() };
    }

    let mut buffer = ryu::Buffer::new();
    let s = buffer.format(f);
    fix_exponent(s)
}

/// Normalizes ryu output to the guest's float text: `1e20` becomes
/// `1e+20`, and integral values keep their `.0` suffix.
fn fix_exponent(s: &str) -> String {
    if let Some(e_pos) = s.find('e') {
        let (mantissa, exp_part) = s.split_at(e_pos);
        let exp = &exp_part[1..];
        if exp.starts_with('-') {
            return s.to_owned();
        }
        return format!("{mantissa}e+{exp}");
    }
    if s.contains('.') {
        s.to_owned()
    } else {
        format!("{s}.0")
    }
}
