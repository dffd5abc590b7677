//! Turns the decoded module tree into runtime code objects.
//!
//! Preparation is the second half of loading: it interns every name and
//! string constant, splits raw bytecode blobs into `(opcode, arg)`
//! instruction pairs, materialises constants into values (allocating
//! container constants in the heap once), and registers every code
//! object, nested ones first, in the run's flat code table. Anything
//! malformed fails here, before the interpreter is entered.

use crate::bytecode::code::{CO_VARARGS, CO_VARKEYWORDS, Code, CodeId, Instr};
use crate::bytecode::op::Opcode;
use crate::heap::{Heap, HeapData};
use crate::intern::Interns;
use crate::loader::{KycModule, LoadError, LoadedCode, LoadedObject};
use crate::types::{Dict, List, Tuple};
use crate::value::Value;

/// Prepares a decoded module, returning the id of its body code object.
pub(crate) fn prepare_module(
    module: KycModule,
    interns: &mut Interns,
    codes: &mut Vec<Code>,
    heap: &mut Heap,
) -> Result<CodeId, LoadError> {
    prepare_code(module.code, interns, codes, heap)
}

/// Prepares one code object and everything nested in its constants.
fn prepare_code(
    loaded: LoadedCode,
    interns: &mut Interns,
    codes: &mut Vec<Code>,
    heap: &mut Heap,
) -> Result<CodeId, LoadError> {
    let code_name = loaded.name.clone();
    let instrs = decode_instrs(&loaded.code, &code_name)?;
    validate_jumps(&instrs, &code_name)?;

    let mut consts = Vec::with_capacity(loaded.consts.len());
    for obj in loaded.consts {
        consts.push(prepare_const(obj, interns, codes, heap, &code_name)?);
    }

    let names = loaded.names.iter().map(|n| interns.intern(n)).collect();
    let varnames: Vec<_> = loaded.varnames.iter().map(|n| interns.intern(n)).collect();
    let freevars = loaded.freevars.iter().map(|n| interns.intern(n)).collect();
    let cellvars = loaded.cellvars.iter().map(|n| interns.intern(n)).collect();

    // Parameters live in the leading local slots, so the varnames tuple
    // must name every declared parameter.
    let mut param_slots = loaded.arg_count + loaded.kwonly_arg_count;
    if loaded.flags & CO_VARARGS != 0 {
        param_slots += 1;
    }
    if loaded.flags & CO_VARKEYWORDS != 0 {
        param_slots += 1;
    }
    if varnames.len() < param_slots {
        return Err(LoadError::ShortVarnames { code_name });
    }
    let nlocals = loaded.nlocals.max(varnames.len());

    let code = Code {
        arg_count: loaded.arg_count,
        posonly_arg_count: loaded.posonly_arg_count,
        kwonly_arg_count: loaded.kwonly_arg_count,
        nlocals,
        stack_size: loaded.stack_size,
        flags: loaded.flags,
        instrs,
        consts,
        names,
        varnames,
        freevars,
        cellvars,
        filename: interns.intern(&loaded.filename),
        name: interns.intern(&loaded.name),
        first_lineno: loaded.first_lineno,
        lnotab: loaded.lnotab,
    };
    let id = CodeId(u32::try_from(codes.len()).expect("code table overflow"));
    codes.push(code);
    Ok(id)
}

/// Splits the raw blob into instruction pairs, rejecting unknown
/// opcode bytes.
fn decode_instrs(blob: &[u8], code_name: &str) -> Result<Vec<Instr>, LoadError> {
    if blob.len() % 2 != 0 {
        return Err(LoadError::TruncatedCode {
            code_name: code_name.to_owned(),
        });
    }
    blob.chunks_exact(2)
        .enumerate()
        .map(|(index, pair)| {
            let Some(op) = Opcode::from_repr(pair[0]) else {
                return Err(LoadError::UnknownOpcode {
                    opcode: pair[0],
                    index,
                    code_name: code_name.to_owned(),
                });
            };
            Ok(Instr { op, arg: pair[1] })
        })
        .collect()
}

/// Jump operands address instruction indices; a target past the end of
/// the sequence is corrupted input.
fn validate_jumps(instrs: &[Instr], code_name: &str) -> Result<(), LoadError> {
    for (index, instr) in instrs.iter().enumerate() {
        if matches!(
            instr.op,
            Opcode::JumpAbsolute | Opcode::PopJumpIfFalse | Opcode::PopJumpIfTrue
        ) {
            let target = usize::from(instr.arg);
            if target >= instrs.len() {
                return Err(LoadError::BadJumpTarget {
                    target,
                    index,
                    code_name: code_name.to_owned(),
                });
            }
        }
    }
    Ok(())
}

/// Materialises one constant into a runtime value.
fn prepare_const(
    obj: LoadedObject,
    interns: &mut Interns,
    codes: &mut Vec<Code>,
    heap: &mut Heap,
    code_name: &str,
) -> Result<Value, LoadError> {
    Ok(match obj {
        LoadedObject::None => Value::None,
        LoadedObject::Bool(b) => Value::Bool(b),
        LoadedObject::Int(i) => Value::Int(i),
        LoadedObject::Float(f) => Value::Float(f),
        LoadedObject::Str(s) => Value::InternString(interns.intern(&s)),
        LoadedObject::Bytes(b) => Value::InternBytes(interns.intern_bytes(b)),
        LoadedObject::Tuple(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(prepare_const(item, interns, codes, heap, code_name)?);
            }
            Value::Ref(heap.allocate(HeapData::Tuple(Tuple::new(values))))
        }
        LoadedObject::List(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(prepare_const(item, interns, codes, heap, code_name)?);
            }
            Value::Ref(heap.allocate(HeapData::List(List::new(values))))
        }
        LoadedObject::Dict(pairs) => {
            let mut dict = Dict::with_capacity(pairs.len());
            for (key, value) in pairs {
                let key = prepare_const(key, interns, codes, heap, code_name)?;
                let value = prepare_const(value, interns, codes, heap, code_name)?;
                dict.set(key, value, heap, interns).map_err(|_| LoadError::BadConstant {
                    code_name: code_name.to_owned(),
                })?;
            }
            Value::Ref(heap.allocate(HeapData::Dict(dict)))
        }
        LoadedObject::Code(code) => Value::Code(prepare_code(*code, interns, codes, heap)?),
    })
}
