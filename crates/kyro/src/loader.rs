//! The KYC bytecode file decoder.
//!
//! Reads the binary module artifact produced by the external compiler
//! and yields a fully typed [`KycModule`] tree. This is the only place
//! raw bytes are read; every downstream component receives typed
//! structures, and every malformed input aborts with a [`LoadError`]
//! carrying the byte offset and the observed byte.
//!
//! # Format
//!
//! Little-endian throughout. The file starts with the three ASCII bytes
//! `KYC`, a one-byte format version (`A`), and one byte recording the
//! source-language version. A single self-describing root object
//! follows; each object starts with a one-byte type tag:
//!
//! | tag       | payload                                             |
//! |-----------|-----------------------------------------------------|
//! | `F` / `T` | none (false / true)                                 |
//! | `N`       | none                                                |
//! | `i`       | 4-byte signed int                                   |
//! | `l`       | 8-byte signed int                                   |
//! | `f`       | 8-byte IEEE-754 double                              |
//! | `u`       | u32 length + UTF-8 bytes                            |
//! | `b`       | u32 length + raw bytes                              |
//! | `(` / `[` | u32 count + that many objects (tuple / list)        |
//! | `{`       | u32 count + count (key, value) object pairs         |
//! | `c`       | 16 tagged code-object fields in fixed order         |
//! | `K`       | module envelope: hash (long), comment, code object   |

use std::fmt;

use strum::FromRepr;

/// Object type tags of the on-disk format.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
enum Tag {
    False = b'F',
    True = b'T',
    None = b'N',
    Int = b'i',
    Long = b'l',
    Float = b'f',
    Str = b'u',
    Bytes = b'b',
    Tuple = b'(',
    List = b'[',
    Dict = b'{',
    Code = b'c',
    KycFile = b'K',
}

/// Maximum object nesting the decoder accepts before giving up.
///
/// Bounds stack use on adversarial input; legitimate compiler output
/// nests a handful of levels.
const MAX_NESTING: usize = 200;

/// A decoding failure. Always an engine-plane error: the interpreter is
/// never entered for a module that fails to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The input ended before the current item was complete.
    UnexpectedEof { offset: usize },
    /// The first three bytes were not `KYC`.
    BadMagic { found: [u8; 3] },
    /// The format version byte was not a known version.
    UnknownVersion { found: u8 },
    /// An object began with an unknown type tag.
    UnknownTag { tag: u8, offset: usize },
    /// A string payload was not valid UTF-8.
    InvalidUtf8 { offset: usize },
    /// A code-object field had the wrong kind.
    FieldKind {
        field: &'static str,
        expected: &'static str,
        offset: usize,
    },
    /// An integer field was negative or out of range for its use.
    FieldRange { field: &'static str, offset: usize },
    /// Objects nested deeper than [`MAX_NESTING`].
    NestingTooDeep { offset: usize },
    /// A code blob's byte length was not a multiple of the two-byte
    /// instruction size.
    TruncatedCode { code_name: String },
    /// A code blob contained an opcode byte outside the supported set.
    UnknownOpcode {
        opcode: u8,
        index: usize,
        code_name: String,
    },
    /// A jump operand pointed past the end of the instruction sequence.
    BadJumpTarget {
        target: usize,
        index: usize,
        code_name: String,
    },
    /// A constant was not usable in its position (e.g. an unhashable
    /// dict key).
    BadConstant { code_name: String },
    /// The varnames tuple does not cover the declared parameters.
    ShortVarnames { code_name: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof { offset } => {
                write!(f, "unexpected end of file at offset {offset}")
            }
            Self::BadMagic { found } => {
                write!(
                    f,
                    "bad magic: expected 'KYC', found {:02x} {:02x} {:02x}",
                    found[0], found[1], found[2]
                )
            }
            Self::UnknownVersion { found } => {
                write!(f, "unknown format version {found:#04x} (expected 'A')")
            }
            Self::UnknownTag { tag, offset } => {
                write!(f, "unknown object tag {tag:#04x} at offset {offset}")
            }
            Self::InvalidUtf8 { offset } => {
                write!(f, "invalid UTF-8 in string at offset {offset}")
            }
            Self::FieldKind {
                field,
                expected,
                offset,
            } => {
                write!(f, "code field '{field}' at offset {offset}: expected {expected}")
            }
            Self::FieldRange { field, offset } => {
                write!(f, "code field '{field}' at offset {offset} is out of range")
            }
            Self::NestingTooDeep { offset } => {
                write!(f, "object nesting exceeds {MAX_NESTING} levels at offset {offset}")
            }
            Self::TruncatedCode { code_name } => {
                write!(f, "code object '{code_name}': bytecode length is not a multiple of 2")
            }
            Self::UnknownOpcode {
                opcode,
                index,
                code_name,
            } => {
                write!(
                    f,
                    "code object '{code_name}': unknown opcode {opcode:#04x} at instruction {index}"
                )
            }
            Self::BadJumpTarget {
                target,
                index,
                code_name,
            } => {
                write!(
                    f,
                    "code object '{code_name}': jump at instruction {index} targets {target}, past the end"
                )
            }
            Self::BadConstant { code_name } => {
                write!(f, "code object '{code_name}': unusable constant")
            }
            Self::ShortVarnames { code_name } => {
                write!(
                    f,
                    "code object '{code_name}': varnames do not cover the declared parameters"
                )
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// A decoded object from the module file.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LoadedObject {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<LoadedObject>),
    List(Vec<LoadedObject>),
    Dict(Vec<(LoadedObject, LoadedObject)>),
    Code(Box<LoadedCode>),
}

/// A decoded code object, still in file-level form: names are plain
/// strings and the bytecode is the raw two-byte-per-instruction blob.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LoadedCode {
    pub arg_count: usize,
    pub posonly_arg_count: usize,
    pub kwonly_arg_count: usize,
    pub nlocals: usize,
    pub stack_size: usize,
    pub flags: u32,
    pub code: Vec<u8>,
    pub consts: Vec<LoadedObject>,
    pub names: Vec<String>,
    pub varnames: Vec<String>,
    pub freevars: Vec<String>,
    pub cellvars: Vec<String>,
    pub filename: String,
    pub name: String,
    pub first_lineno: u32,
    pub lnotab: Vec<u8>,
}

/// A decoded module file.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct KycModule {
    /// Hash recorded by the compiler; carried, not interpreted.
    pub py_hash: i64,
    /// Free-form comment recorded by the compiler.
    pub comment: String,
    /// Source-language version byte from the header.
    pub lang_version: u8,
    /// The module body.
    pub code: LoadedCode,
}

/// Decodes a complete module file.
pub(crate) fn load_module(bytes: &[u8]) -> Result<KycModule, LoadError> {
    let mut reader = Reader { bytes, pos: 0 };

    let magic = reader.take::<3>()?;
    if &magic != b"KYC" {
        return Err(LoadError::BadMagic { found: magic });
    }
    let version = reader.read_u8()?;
    if version != b'A' {
        return Err(LoadError::UnknownVersion { found: version });
    }
    let lang_version = reader.read_u8()?;

    let envelope_offset = reader.pos;
    let envelope_tag = reader.read_u8()?;
    if Tag::from_repr(envelope_tag) != Some(Tag::KycFile) {
        return Err(LoadError::FieldKind {
            field: "root",
            expected: "kyc-file envelope",
            offset: envelope_offset,
        });
    }

    let hash_offset = reader.pos;
    let py_hash = match reader.read_object(0)? {
        LoadedObject::Int(value) => value,
        _ => {
            return Err(LoadError::FieldKind {
                field: "pyHash",
                expected: "long",
                offset: hash_offset,
            })
        }
    };
    let comment_offset = reader.pos;
    let comment = match reader.read_object(0)? {
        LoadedObject::Str(value) => value,
        _ => {
            return Err(LoadError::FieldKind {
                field: "comment",
                expected: "unicode",
                offset: comment_offset,
            })
        }
    };
    let code_offset = reader.pos;
    let code = match reader.read_object(0)? {
        LoadedObject::Code(code) => *code,
        _ => {
            return Err(LoadError::FieldKind {
                field: "code",
                expected: "code",
                offset: code_offset,
            })
        }
    };

    Ok(KycModule {
        py_hash,
        comment,
        lang_version,
        code,
    })
}

/// Byte cursor over the module image.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn read_u8(&mut self) -> Result<u8, LoadError> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or(LoadError::UnexpectedEof { offset: self.pos })?;
        self.pos += 1;
        Ok(byte)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], LoadError> {
        let slice = self
            .bytes
            .get(self.pos..self.pos + N)
            .ok_or(LoadError::UnexpectedEof { offset: self.pos })?;
        self.pos += N;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn take_slice(&mut self, len: usize) -> Result<&[u8], LoadError> {
        let slice = self
            .bytes
            .get(self.pos..self.pos.checked_add(len).ok_or(LoadError::UnexpectedEof { offset: self.pos })?)
            .ok_or(LoadError::UnexpectedEof { offset: self.pos })?;
        self.pos += len;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32, LoadError> {
        Ok(u32::from_le_bytes(self.take::<4>()?))
    }

    fn read_i32(&mut self) -> Result<i32, LoadError> {
        Ok(i32::from_le_bytes(self.take::<4>()?))
    }

    fn read_i64(&mut self) -> Result<i64, LoadError> {
        Ok(i64::from_le_bytes(self.take::<8>()?))
    }

    fn read_f64(&mut self) -> Result<f64, LoadError> {
        Ok(f64::from_le_bytes(self.take::<8>()?))
    }

    /// Reads one self-describing object.
    fn read_object(&mut self, depth: usize) -> Result<LoadedObject, LoadError> {
        if depth > MAX_NESTING {
            return Err(LoadError::NestingTooDeep { offset: self.pos });
        }
        let tag_offset = self.pos;
        let tag_byte = self.read_u8()?;
        let Some(tag) = Tag::from_repr(tag_byte) else {
            return Err(LoadError::UnknownTag {
                tag: tag_byte,
                offset: tag_offset,
            });
        };
        match tag {
            Tag::False => Ok(LoadedObject::Bool(false)),
            Tag::True => Ok(LoadedObject::Bool(true)),
            Tag::None => Ok(LoadedObject::None),
            Tag::Int => Ok(LoadedObject::Int(i64::from(self.read_i32()?))),
            Tag::Long => Ok(LoadedObject::Int(self.read_i64()?)),
            Tag::Float => Ok(LoadedObject::Float(self.read_f64()?)),
            Tag::Str => {
                let len = self.read_u32()? as usize;
                let payload_offset = self.pos;
                let payload = self.take_slice(len)?;
                match std::str::from_utf8(payload) {
                    Ok(text) => Ok(LoadedObject::Str(text.to_owned())),
                    Err(_) => Err(LoadError::InvalidUtf8 { offset: payload_offset }),
                }
            }
            Tag::Bytes => {
                let len = self.read_u32()? as usize;
                Ok(LoadedObject::Bytes(self.take_slice(len)?.to_vec()))
            }
            Tag::Tuple | Tag::List => {
                let count = self.read_u32()? as usize;
                let mut items = Vec::with_capacity(count.min(4096));
                for _ in 0..count {
                    items.push(self.read_object(depth + 1)?);
                }
                Ok(if tag == Tag::Tuple {
                    LoadedObject::Tuple(items)
                } else {
                    LoadedObject::List(items)
                })
            }
            Tag::Dict => {
                let count = self.read_u32()? as usize;
                let mut pairs = Vec::with_capacity(count.min(4096));
                for _ in 0..count {
                    let key = self.read_object(depth + 1)?;
                    let value = self.read_object(depth + 1)?;
                    pairs.push((key, value));
                }
                Ok(LoadedObject::Dict(pairs))
            }
            Tag::Code => Ok(LoadedObject::Code(Box::new(self.read_code(depth)?))),
            Tag::KycFile => Err(LoadError::UnknownTag {
                tag: tag_byte,
                offset: tag_offset,
            }),
        }
    }

    /// Reads the sixteen fields of a code object, validating each kind.
    fn read_code(&mut self, depth: usize) -> Result<LoadedCode, LoadError> {
        let arg_count = self.read_count_field("argcount", depth)?;
        let posonly_arg_count = self.read_count_field("posonlyargcount", depth)?;
        let kwonly_arg_count = self.read_count_field("kwonlyargcount", depth)?;
        let nlocals = self.read_count_field("nlocals", depth)?;
        let stack_size = self.read_count_field("stacksize", depth)?;
        let flags = u32::try_from(self.read_int_field("flags", depth)?)
            .map_err(|_| LoadError::FieldRange { field: "flags", offset: self.pos })?;
        let code = self.read_bytes_field("code", depth)?;
        let consts = self.read_tuple_field("consts", depth)?;
        let names = self.read_name_tuple_field("names", depth)?;
        let varnames = self.read_name_tuple_field("varnames", depth)?;
        let freevars = self.read_name_tuple_field("freevars", depth)?;
        let cellvars = self.read_name_tuple_field("cellvars", depth)?;
        let filename = self.read_str_field("filename", depth)?;
        let name = self.read_str_field("name", depth)?;
        let first_lineno = u32::try_from(self.read_int_field("firstlineno", depth)?)
            .map_err(|_| LoadError::FieldRange { field: "firstlineno", offset: self.pos })?;
        let lnotab = self.read_bytes_field("lnotab", depth)?;

        Ok(LoadedCode {
            arg_count,
            posonly_arg_count,
            kwonly_arg_count,
            nlocals,
            stack_size,
            flags,
            code,
            consts,
            names,
            varnames,
            freevars,
            cellvars,
            filename,
            name,
            first_lineno,
            lnotab,
        })
    }

    fn read_int_field(&mut self, field: &'static str, depth: usize) -> Result<i64, LoadError> {
        let offset = self.pos;
        match self.read_object(depth + 1)? {
            LoadedObject::Int(value) => Ok(value),
            _ => Err(LoadError::FieldKind {
                field,
                expected: "int",
                offset,
            }),
        }
    }

    fn read_count_field(&mut self, field: &'static str, depth: usize) -> Result<usize, LoadError> {
        let offset = self.pos;
        let value = self.read_int_field(field, depth)?;
        usize::try_from(value).map_err(|_| LoadError::FieldRange { field, offset })
    }

    fn read_bytes_field(&mut self, field: &'static str, depth: usize) -> Result<Vec<u8>, LoadError> {
        let offset = self.pos;
        match self.read_object(depth + 1)? {
            LoadedObject::Bytes(bytes) => Ok(bytes),
            _ => Err(LoadError::FieldKind {
                field,
                expected: "bytestring",
                offset,
            }),
        }
    }

    fn read_str_field(&mut self, field: &'static str, depth: usize) -> Result<String, LoadError> {
        let offset = self.pos;
        match self.read_object(depth + 1)? {
            LoadedObject::Str(text) => Ok(text),
            _ => Err(LoadError::FieldKind {
                field,
                expected: "unicode",
                offset,
            }),
        }
    }

    fn read_tuple_field(&mut self, field: &'static str, depth: usize) -> Result<Vec<LoadedObject>, LoadError> {
        let offset = self.pos;
        match self.read_object(depth + 1)? {
            LoadedObject::Tuple(items) => Ok(items),
            _ => Err(LoadError::FieldKind {
                field,
                expected: "tuple",
                offset,
            }),
        }
    }

    /// Reads a tuple field whose elements must all be strings.
    fn read_name_tuple_field(&mut self, field: &'static str, depth: usize) -> Result<Vec<String>, LoadError> {
        let offset = self.pos;
        let items = self.read_tuple_field(field, depth)?;
        items
            .into_iter()
            .map(|item| match item {
                LoadedObject::Str(text) => Ok(text),
                _ => Err(LoadError::FieldKind {
                    field,
                    expected: "tuple of unicode",
                    offset,
                }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Test-side encoder mirroring the on-disk format; round-trip tests
    /// pin the byte layout.
    fn header(out: &mut Vec<u8>) {
        out.extend_from_slice(b"KYC");
        out.push(b'A');
        out.push(8);
    }

    fn encode(obj: &LoadedObject, out: &mut Vec<u8>) {
        match obj {
            LoadedObject::None => out.push(b'N'),
            LoadedObject::Bool(false) => out.push(b'F'),
            LoadedObject::Bool(true) => out.push(b'T'),
            LoadedObject::Int(i) => {
                if let Ok(small) = i32::try_from(*i) {
                    out.push(b'i');
                    out.extend_from_slice(&small.to_le_bytes());
                } else {
                    out.push(b'l');
                    out.extend_from_slice(&i.to_le_bytes());
                }
            }
            LoadedObject::Float(f) => {
                out.push(b'f');
                out.extend_from_slice(&f.to_le_bytes());
            }
            LoadedObject::Str(s) => {
                out.push(b'u');
                out.extend_from_slice(&(s.len() as u32).to_le_bytes());
                out.extend_from_slice(s.as_bytes());
            }
            LoadedObject::Bytes(b) => {
                out.push(b'b');
                out.extend_from_slice(&(b.len() as u32).to_le_bytes());
                out.extend_from_slice(b);
            }
            LoadedObject::Tuple(items) => {
                out.push(b'(');
                out.extend_from_slice(&(items.len() as u32).to_le_bytes());
                for item in items {
                    encode(item, out);
                }
            }
            LoadedObject::List(items) => {
                out.push(b'[');
                out.extend_from_slice(&(items.len() as u32).to_le_bytes());
                for item in items {
                    encode(item, out);
                }
            }
            LoadedObject::Dict(pairs) => {
                out.push(b'{');
                out.extend_from_slice(&(pairs.len() as u32).to_le_bytes());
                for (key, value) in pairs {
                    encode(key, out);
                    encode(value, out);
                }
            }
            LoadedObject::Code(code) => encode_code(code, out),
        }
    }

    fn encode_code(code: &LoadedCode, out: &mut Vec<u8>) {
        out.push(b'c');
        for field in [
            code.arg_count,
            code.posonly_arg_count,
            code.kwonly_arg_count,
            code.nlocals,
            code.stack_size,
        ] {
            encode(&LoadedObject::Int(field as i64), out);
        }
        encode(&LoadedObject::Int(i64::from(code.flags)), out);
        encode(&LoadedObject::Bytes(code.code.clone()), out);
        encode(&LoadedObject::Tuple(code.consts.clone()), out);
        for names in [&code.names, &code.varnames, &code.freevars, &code.cellvars] {
            let items = names.iter().map(|n| LoadedObject::Str(n.clone())).collect();
            encode(&LoadedObject::Tuple(items), out);
        }
        encode(&LoadedObject::Str(code.filename.clone()), out);
        encode(&LoadedObject::Str(code.name.clone()), out);
        encode(&LoadedObject::Int(i64::from(code.first_lineno)), out);
        encode(&LoadedObject::Bytes(code.lnotab.clone()), out);
    }

    fn encode_module(code: &LoadedCode) -> Vec<u8> {
        let mut out = Vec::new();
        header(&mut out);
        out.push(b'K');
        encode(&LoadedObject::Int(0x1234_5678_9abc), &mut out);
        encode(&LoadedObject::Str("compiled by tests".to_owned()), &mut out);
        encode_code(code, &mut out);
        out
    }

    fn minimal_code() -> LoadedCode {
        LoadedCode {
            arg_count: 0,
            posonly_arg_count: 0,
            kwonly_arg_count: 0,
            nlocals: 0,
            stack_size: 1,
            flags: 0,
            code: vec![100, 0, 83, 0],
            consts: vec![LoadedObject::None],
            names: Vec::new(),
            varnames: Vec::new(),
            freevars: Vec::new(),
            cellvars: Vec::new(),
            filename: "test.py".to_owned(),
            name: "<module>".to_owned(),
            first_lineno: 1,
            lnotab: Vec::new(),
        }
    }

    #[test]
    fn every_value_kind_round_trips() {
        let mut code = minimal_code();
        code.consts = vec![
            LoadedObject::None,
            LoadedObject::Bool(true),
            LoadedObject::Bool(false),
            LoadedObject::Int(42),
            LoadedObject::Int(i64::MIN),
            LoadedObject::Float(2.5),
            LoadedObject::Str("héllo".to_owned()),
            LoadedObject::Bytes(vec![0, 1, 255]),
            LoadedObject::Tuple(vec![LoadedObject::Int(1), LoadedObject::Str("x".to_owned())]),
            LoadedObject::List(vec![LoadedObject::Float(0.0)]),
            LoadedObject::Dict(vec![(LoadedObject::Str("k".to_owned()), LoadedObject::Int(9))]),
        ];
        let image = encode_module(&code);
        let module = load_module(&image).unwrap();
        assert_eq!(module.code, code);
        assert_eq!(module.py_hash, 0x1234_5678_9abc);
        assert_eq!(module.comment, "compiled by tests");
        assert_eq!(module.lang_version, 8);
    }

    #[test]
    fn nested_code_objects_round_trip() {
        let mut inner = minimal_code();
        inner.name = "f".to_owned();
        inner.arg_count = 1;
        inner.nlocals = 1;
        inner.varnames = vec!["a".to_owned()];
        let mut outer = minimal_code();
        outer.consts = vec![LoadedObject::Code(Box::new(inner.clone()))];
        let image = encode_module(&outer);
        let module = load_module(&image).unwrap();
        match &module.code.consts[0] {
            LoadedObject::Code(decoded) => assert_eq!(**decoded, inner),
            other => panic!("expected code constant, got {other:?}"),
        }
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut image = encode_module(&minimal_code());
        image[0] = b'X';
        let err = load_module(&image).unwrap_err();
        assert_eq!(err, LoadError::BadMagic { found: *b"XYC" });
        assert!(err.to_string().contains("bad magic"));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut image = encode_module(&minimal_code());
        image[3] = b'B';
        let err = load_module(&image).unwrap_err();
        assert_eq!(err, LoadError::UnknownVersion { found: b'B' });
    }

    #[test]
    fn unknown_tag_reports_its_offset() {
        let mut image = Vec::new();
        header(&mut image);
        image.push(b'K');
        image.push(b'z'); // where the pyHash long should start
        let err = load_module(&image).unwrap_err();
        assert_eq!(err, LoadError::UnknownTag { tag: b'z', offset: 6 });
    }

    #[test]
    fn truncated_file_is_rejected() {
        let image = encode_module(&minimal_code());
        let err = load_module(&image[..image.len() - 3]).unwrap_err();
        assert!(matches!(err, LoadError::UnexpectedEof { .. }));
    }

    #[test]
    fn non_string_name_tuple_is_rejected() {
        let mut out = Vec::new();
        header(&mut out);
        out.push(b'K');
        encode(&LoadedObject::Int(0), &mut out);
        encode(&LoadedObject::Str(String::new()), &mut out);
        // Hand-build a code object whose names tuple holds an int.
        out.push(b'c');
        for _ in 0..5 {
            encode(&LoadedObject::Int(0), &mut out);
        }
        encode(&LoadedObject::Int(0), &mut out); // flags
        encode(&LoadedObject::Bytes(Vec::new()), &mut out);
        encode(&LoadedObject::Tuple(Vec::new()), &mut out); // consts
        encode(&LoadedObject::Tuple(vec![LoadedObject::Int(3)]), &mut out); // names
        let err = load_module(&out).unwrap_err();
        assert!(matches!(
            err,
            LoadError::FieldKind { field: "names", .. } | LoadError::UnexpectedEof { .. }
        ));
    }

    #[test]
    fn empty_input_is_eof() {
        assert!(matches!(load_module(&[]), Err(LoadError::UnexpectedEof { offset: 0 })));
    }
}
