//! Test-side KYC assembler.
//!
//! Builds module images byte-for-byte in the on-disk format so the
//! end-to-end tests exercise the whole pipeline: decode, prepare, run.

#![allow(dead_code)]

// Opcode numbering of the external compiler.
pub const POP_TOP: u8 = 1;
pub const ROT_TWO: u8 = 2;
pub const ROT_THREE: u8 = 3;
pub const DUP_TOP: u8 = 4;
pub const NOP: u8 = 9;
pub const UNARY_NEGATIVE: u8 = 11;
pub const UNARY_NOT: u8 = 12;
pub const BINARY_MULTIPLY: u8 = 20;
pub const BINARY_MODULO: u8 = 22;
pub const BINARY_ADD: u8 = 23;
pub const BINARY_SUBTRACT: u8 = 24;
pub const BINARY_SUBSCR: u8 = 25;
pub const BINARY_FLOOR_DIVIDE: u8 = 26;
pub const BINARY_TRUE_DIVIDE: u8 = 27;
pub const RETURN_VALUE: u8 = 83;
pub const STORE_NAME: u8 = 90;
pub const STORE_ATTR: u8 = 95;
pub const LOAD_CONST: u8 = 100;
pub const LOAD_NAME: u8 = 101;
pub const BUILD_TUPLE: u8 = 102;
pub const BUILD_LIST: u8 = 103;
pub const BUILD_MAP: u8 = 105;
pub const LOAD_ATTR: u8 = 106;
pub const COMPARE_OP: u8 = 107;
pub const JUMP_ABSOLUTE: u8 = 113;
pub const POP_JUMP_IF_FALSE: u8 = 114;
pub const POP_JUMP_IF_TRUE: u8 = 115;
pub const LOAD_GLOBAL: u8 = 116;
pub const LOAD_FAST: u8 = 124;
pub const STORE_FAST: u8 = 125;
pub const RAISE_VARARGS: u8 = 130;
pub const CALL_FUNCTION: u8 = 131;
pub const MAKE_FUNCTION: u8 = 132;
pub const CALL_FUNCTION_KW: u8 = 141;
pub const LOAD_METHOD: u8 = 160;
pub const CALL_METHOD: u8 = 161;

/// Code flag: the function declares `*args`.
pub const CO_VARARGS: u32 = 0x04;
/// Code flag: the function declares `**kwargs`.
pub const CO_VARKEYWORDS: u32 = 0x08;

/// A constant in a code object under construction.
#[derive(Debug, Clone)]
pub enum Obj {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'static str),
    Bytes(Vec<u8>),
    Tuple(Vec<Obj>),
    List(Vec<Obj>),
    Dict(Vec<(Obj, Obj)>),
    Code(CodeBld),
}

/// A code object under construction.
#[derive(Debug, Clone)]
pub struct CodeBld {
    pub argcount: u32,
    pub posonly: u32,
    pub kwonly: u32,
    pub nlocals: u32,
    pub stacksize: u32,
    pub flags: u32,
    pub instrs: Vec<(u8, u8)>,
    pub consts: Vec<Obj>,
    pub names: Vec<&'static str>,
    pub varnames: Vec<&'static str>,
    pub filename: &'static str,
    pub name: &'static str,
    pub firstlineno: u32,
    pub lnotab: Vec<u8>,
}

impl CodeBld {
    pub fn new(name: &'static str) -> Self {
        Self {
            argcount: 0,
            posonly: 0,
            kwonly: 0,
            nlocals: 0,
            stacksize: 32,
            flags: 0,
            instrs: Vec::new(),
            consts: Vec::new(),
            names: Vec::new(),
            varnames: Vec::new(),
            filename: "test.kyc",
            name,
            firstlineno: 1,
            lnotab: Vec::new(),
        }
    }

    /// A module body named `<module>`.
    pub fn module() -> Self {
        Self::new("<module>")
    }
}

/// Encodes a complete module image around the given body.
pub fn module_image(code: &CodeBld) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"KYC");
    out.push(b'A');
    out.push(8); // source-language version byte
    out.push(b'K');
    encode(&Obj::Int(0), &mut out); // pyHash
    encode(&Obj::Str("assembled by tests"), &mut out);
    encode_code(code, &mut out);
    out
}

fn encode(obj: &Obj, out: &mut Vec<u8>) {
    match obj {
        Obj::None => out.push(b'N'),
        Obj::Bool(false) => out.push(b'F'),
        Obj::Bool(true) => out.push(b'T'),
        Obj::Int(i) => {
            if let Ok(small) = i32::try_from(*i) {
                out.push(b'i');
                out.extend_from_slice(&small.to_le_bytes());
            } else {
                out.push(b'l');
                out.extend_from_slice(&i.to_le_bytes());
            }
        }
        Obj::Float(f) => {
            out.push(b'f');
            out.extend_from_slice(&f.to_le_bytes());
        }
        Obj::Str(s) => {
            out.push(b'u');
            out.extend_from_slice(&(s.len() as u32).to_le_bytes());
            out.extend_from_slice(s.as_bytes());
        }
        Obj::Bytes(b) => {
            out.push(b'b');
            out.extend_from_slice(&(b.len() as u32).to_le_bytes());
            out.extend_from_slice(b);
        }
        Obj::Tuple(items) => {
            out.push(b'(');
            out.extend_from_slice(&(items.len() as u32).to_le_bytes());
            for item in items {
                encode(item, out);
            }
        }
        Obj::List(items) => {
            out.push(b'[');
            out.extend_from_slice(&(items.len() as u32).to_le_bytes());
            for item in items {
                encode(item, out);
            }
        }
        Obj::Dict(pairs) => {
            out.push(b'{');
            out.extend_from_slice(&(pairs.len() as u32).to_le_bytes());
            for (key, value) in pairs {
                encode(key, out);
                encode(value, out);
            }
        }
        Obj::Code(code) => encode_code(code, out),
    }
}

fn encode_code(code: &CodeBld, out: &mut Vec<u8>) {
    out.push(b'c');
    for field in [
        code.argcount,
        code.posonly,
        code.kwonly,
        code.nlocals,
        code.stacksize,
        code.flags,
    ] {
        encode(&Obj::Int(i64::from(field)), out);
    }
    let mut blob = Vec::with_capacity(code.instrs.len() * 2);
    for &(op, arg) in &code.instrs {
        blob.push(op);
        blob.push(arg);
    }
    encode(&Obj::Bytes(blob), out);
    encode(&Obj::Tuple(code.consts.clone()), out);
    for names in [&code.names, &code.varnames] {
        let items = names.iter().map(|&n| Obj::Str(n)).collect();
        encode(&Obj::Tuple(items), out);
    }
    encode(&Obj::Tuple(Vec::new()), out); // freevars
    encode(&Obj::Tuple(Vec::new()), out); // cellvars
    encode(&Obj::Str(code.filename), out);
    encode(&Obj::Str(code.name), out);
    encode(&Obj::Int(i64::from(code.firstlineno)), out);
    encode(&Obj::Bytes(code.lnotab.clone()), out);
}
