//! Runtime bytes values.

use std::fmt::{self, Write};

use crate::args::ArgValues;
use crate::exception_private::{ExcType, RunResult};
use crate::heap::Heap;
use crate::intern::{Interns, StaticStrings, StringId};
use crate::types::str::allocate_str;
use crate::value::Value;

/// A bytes value created at runtime. Literal bytes from the module file
/// stay in the intern table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Bytes(Vec<u8>);

impl Bytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Writes the guest `repr()` of bytes: `b'...'` with hex escapes for
/// non-printable bytes.
pub(crate) fn bytes_repr_fmt<W: Write>(bytes: &[u8], f: &mut W) -> fmt::Result {
    f.write_str("b'")?;
    for &byte in bytes {
        match byte {
            b'\\' => f.write_str("\\\\")?,
            b'\'' => f.write_str("\\'")?,
            b'\n' => f.write_str("\\n")?,
            b'\r' => f.write_str("\\r")?,
            b'\t' => f.write_str("\\t")?,
            0x20..=0x7e => f.write_char(byte as char)?,
            _ => write!(f, "\\x{byte:02x}")?,
        }
    }
    f.write_char('\'')
}

/// Calls a bytes method on the given receiver content.
pub(crate) fn call_bytes_method(
    bytes: &[u8],
    method_id: StringId,
    args: ArgValues,
    heap: &mut Heap,
    interns: &Interns,
) -> RunResult<Value> {
    match StaticStrings::from_id(method_id) {
        Some(StaticStrings::Decode) => {
            // Only the default encoding is supported; an explicit
            // "utf-8"/"utf8" argument is accepted for compatibility.
            match &args {
                ArgValues::Empty => {}
                ArgValues::One(encoding) => match encoding.as_str(heap, interns) {
                    Some("utf-8" | "utf8") => {}
                    Some(other) => {
                        return Err(ExcType::value_error(format!("unknown encoding: {other}")));
                    }
                    None => {
                        return Err(ExcType::type_error(format!(
                            "decode() argument 'encoding' must be str, not {}",
                            encoding.py_type(heap)
                        )));
                    }
                },
                other => return Err(ExcType::type_error_at_most("decode", 1, other.count())),
            }
            match std::str::from_utf8(bytes) {
                Ok(text) => Ok(allocate_str(text, heap)),
                Err(_) => Err(ExcType::value_error("invalid utf-8 sequence")),
            }
        }
        _ => Err(ExcType::attribute_error("bytes", interns.get_str(method_id))),
    }
}
