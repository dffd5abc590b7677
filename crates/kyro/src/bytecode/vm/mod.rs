//! The frame machine and the fetch-decode-execute loop.
//!
//! Each call gets a [`Frame`] owning its operand stack, local slots, and
//! name-cache slots. The interpreter drives a frame to completion with
//! [`Vm::run_frame`]; a `CALL_*` opcode builds the callee's frame and
//! runs it to completion inside the call opcode, so the parent/child
//! links of the frame chain live on the host call stack and a child can
//! never outlive its parent. Frames return either a value or an error;
//! errors pick up one traceback entry per frame as they unwind.

pub(crate) mod attr;
pub(crate) mod binary;
pub(crate) mod call;
pub(crate) mod compare;

use crate::args::ArgValues;
use crate::builtins::Builtins;
use crate::bytecode::code::{Code, Instr};
use crate::bytecode::op::Opcode;
use crate::exception_private::{ExcType, RunError, RunResult, SimpleException, TraceEntry};
use crate::function::Function;
use crate::heap::{Heap, HeapData};
use crate::intern::{Interns, StringId};
use crate::io::PrintWriter;
use crate::namespace::Namespace;
use crate::signature::Signature;
use crate::types::{Dict, List, Tuple};
use crate::value::Value;

/// MAKE_FUNCTION flag: a defaults tuple is on the stack.
const MF_DEFAULTS: u8 = 0x01;
/// MAKE_FUNCTION flag: a keyword-defaults dict is on the stack.
const MF_KW_DEFAULTS: u8 = 0x02;

/// A runtime activation record for one call.
///
/// Owns its operand stack (bounded by the code object's stack size), a
/// local slot per varname, and a name-cache slot per name. The
/// instruction pointer addresses the decoded instruction sequence by
/// index, not byte offset.
#[derive(Debug)]
pub(crate) struct Frame<'rt> {
    code: &'rt Code,
    /// Next instruction to fetch.
    ip: usize,
    /// Instruction currently executing, for tracebacks.
    current_ip: usize,
    stack: Vec<Value>,
    locals: Vec<Value>,
    /// Lazily resolved globals, indexed like `code.names`.
    name_cache: Vec<Value>,
    /// Module frames write STORE_NAME through to the globals.
    is_module: bool,
}

impl<'rt> Frame<'rt> {
    /// Creates the frame for module-level code.
    pub fn new_module(code: &'rt Code) -> Self {
        Self {
            code,
            ip: 0,
            current_ip: 0,
            stack: Vec::with_capacity(code.stack_size),
            locals: vec![Value::Undefined; code.nlocals],
            name_cache: vec![Value::Undefined; code.names.len()],
            is_module: true,
        }
    }

    /// Creates a frame for a function call with already-bound locals.
    pub fn new_function(code: &'rt Code, locals: Vec<Value>) -> Self {
        Self {
            code,
            ip: 0,
            current_ip: 0,
            stack: Vec::with_capacity(code.stack_size),
            locals,
            name_cache: vec![Value::Undefined; code.names.len()],
            is_module: false,
        }
    }

    fn push(&mut self, value: Value) {
        debug_assert!(
            self.stack.len() < self.code.stack_size.max(1),
            "operand stack exceeds the declared high-water mark"
        );
        self.stack.push(value);
    }

    fn pop(&mut self) -> RunResult<Value> {
        self.stack
            .pop()
            .ok_or_else(|| RunError::internal("operand stack underflow"))
    }

    /// Pops `count` values, restoring push order.
    fn pop_n(&mut self, count: usize) -> RunResult<Vec<Value>> {
        if self.stack.len() < count {
            return Err(RunError::internal("operand stack underflow"));
        }
        Ok(self.stack.split_off(self.stack.len() - count))
    }

    #[cfg(test)]
    pub(crate) fn stack_depth(&self) -> usize {
        self.stack.len()
    }
}

/// The interpreter for one run.
///
/// Holds the pieces every frame shares: the heap, the intern table, the
/// code table, the module globals, and the print writer. Frames
/// themselves are stack-allocated in [`Vm::run_frame`] callers.
pub(crate) struct Vm<'rt> {
    pub heap: &'rt mut Heap,
    pub interns: &'rt Interns,
    pub codes: &'rt [Code],
    pub globals: &'rt mut Namespace,
    pub print: &'rt mut dyn PrintWriter,
    /// Current frame depth, bounded by [`Self::MAX_FRAME_DEPTH`].
    depth: usize,
}

impl<'rt> Vm<'rt> {
    /// Frame depth at which further calls raise RecursionError.
    pub(crate) const MAX_FRAME_DEPTH: usize = 1000;

    pub fn new(
        heap: &'rt mut Heap,
        interns: &'rt Interns,
        codes: &'rt [Code],
        globals: &'rt mut Namespace,
        print: &'rt mut dyn PrintWriter,
    ) -> Self {
        Self {
            heap,
            interns,
            codes,
            globals,
            print,
            depth: 0,
        }
    }

    /// Runs a frame to completion, returning its value or the error
    /// with this frame's traceback entry appended.
    pub fn run_frame(&mut self, frame: &mut Frame<'rt>) -> RunResult<Value> {
        self.execute(frame).map_err(|err| {
            err.with_frame(TraceEntry {
                filename: frame.code.filename,
                code_name: frame.code.name,
                lineno: frame.code.line_for(frame.current_ip),
            })
        })
    }

    /// The fetch-decode-execute loop.
    fn execute(&mut self, frame: &mut Frame<'rt>) -> RunResult<Value> {
        loop {
            let Some(&Instr { op, arg }) = frame.code.instrs.get(frame.ip) else {
                return Err(RunError::internal(format!(
                    "instruction pointer {} past the end of '{}'",
                    frame.ip,
                    self.interns.get_str(frame.code.name)
                )));
            };
            frame.current_ip = frame.ip;
            frame.ip += 1;

            #[cfg(debug_assertions)]
            let depth_before = frame.stack.len();

            match op {
                Opcode::Nop => {}
                Opcode::PopTop => {
                    if arg != 0 {
                        return Err(RunError::internal("POP_TOP argument must be zero"));
                    }
                    frame.pop()?;
                }
                Opcode::DupTop => {
                    let top = frame
                        .stack
                        .last()
                        .cloned()
                        .ok_or_else(|| RunError::internal("operand stack underflow"))?;
                    frame.push(top);
                }
                Opcode::RotTwo => {
                    let len = frame.stack.len();
                    if len < 2 {
                        return Err(RunError::internal("operand stack underflow"));
                    }
                    frame.stack.swap(len - 1, len - 2);
                }
                Opcode::RotThree => {
                    let top = frame.pop()?;
                    let len = frame.stack.len();
                    if len < 2 {
                        return Err(RunError::internal("operand stack underflow"));
                    }
                    frame.stack.insert(len - 2, top);
                }

                Opcode::LoadConst => {
                    let constant = frame
                        .code
                        .consts
                        .get(usize::from(arg))
                        .cloned()
                        .ok_or_else(|| RunError::internal(format!("constant index {arg} out of range")))?;
                    frame.push(constant);
                }

                Opcode::LoadFast => {
                    let slot = usize::from(arg);
                    match frame.locals.get(slot) {
                        Some(Value::Undefined) => {
                            let name = self.interns.get_str(frame.code.varnames[slot]);
                            return Err(ExcType::unbound_local_error(name));
                        }
                        Some(value) => {
                            let value = value.clone();
                            frame.push(value);
                        }
                        None => {
                            return Err(RunError::internal(format!("local slot {slot} out of range")));
                        }
                    }
                }
                Opcode::StoreFast => {
                    let slot = usize::from(arg);
                    let value = frame.pop()?;
                    match frame.locals.get_mut(slot) {
                        Some(local) => *local = value,
                        None => {
                            return Err(RunError::internal(format!("local slot {slot} out of range")));
                        }
                    }
                }

                Opcode::LoadName | Opcode::LoadGlobal => {
                    let value = self.load_name(frame, arg)?;
                    frame.push(value);
                }
                Opcode::StoreName => {
                    let index = usize::from(arg);
                    let name = self.name_at(frame, index)?;
                    let value = frame.pop()?;
                    frame.name_cache[index] = value.clone();
                    // At module scope a name store is also a globals
                    // write, visible to every function of the module.
                    if frame.is_module {
                        self.globals.set(name, value);
                    }
                }

                Opcode::LoadAttr | Opcode::LoadMethod => {
                    let index = usize::from(arg);
                    let name = self.name_at(frame, index)?;
                    let obj = frame.pop()?;
                    let value = attr::load_attr(obj, name, self.heap, self.interns)?;
                    frame.push(value);
                }
                Opcode::StoreAttr => {
                    let index = usize::from(arg);
                    let name = self.name_at(frame, index)?;
                    let obj = frame.pop()?;
                    let value = frame.pop()?;
                    attr::store_attr(&obj, name, value, self.heap, self.interns)?;
                }

                Opcode::UnaryNegative => {
                    let value = frame.pop()?;
                    let negated = match &value {
                        Value::Int(i) => i
                            .checked_neg()
                            .map(Value::Int)
                            .ok_or_else(|| ExcType::int_overflow("negation"))?,
                        Value::Bool(b) => Value::Int(-i64::from(*b)),
                        Value::Float(f) => Value::Float(-f),
                        _ => return Err(ExcType::unary_type_error("-", value.py_type(self.heap))),
                    };
                    frame.push(negated);
                }
                Opcode::UnaryNot => {
                    let value = frame.pop()?;
                    let negated = !value.py_bool(self.heap, self.interns);
                    frame.push(Value::Bool(negated));
                }

                Opcode::BinaryAdd => {
                    let (lhs, rhs) = frame.pop_two()?;
                    let result = binary::add(lhs, rhs, self.heap, self.interns)?;
                    frame.push(result);
                }
                Opcode::BinarySubtract => {
                    let (lhs, rhs) = frame.pop_two()?;
                    let result = binary::sub(lhs, rhs, self.heap)?;
                    frame.push(result);
                }
                Opcode::BinaryMultiply => {
                    let (lhs, rhs) = frame.pop_two()?;
                    let result = binary::mul(lhs, rhs, self.heap, self.interns)?;
                    frame.push(result);
                }
                Opcode::BinaryTrueDivide => {
                    let (lhs, rhs) = frame.pop_two()?;
                    let result = binary::true_div(lhs, rhs, self.heap)?;
                    frame.push(result);
                }
                Opcode::BinaryFloorDivide => {
                    let (lhs, rhs) = frame.pop_two()?;
                    let result = binary::floor_div(lhs, rhs, self.heap)?;
                    frame.push(result);
                }
                Opcode::BinaryModulo => {
                    let (lhs, rhs) = frame.pop_two()?;
                    let result = binary::modulo(lhs, rhs, self.heap)?;
                    frame.push(result);
                }
                Opcode::BinarySubscr => {
                    let (obj, index) = frame.pop_two()?;
                    let result = binary::subscr(obj, index, self.heap, self.interns)?;
                    frame.push(result);
                }

                Opcode::CompareOp => {
                    let (lhs, rhs) = frame.pop_two()?;
                    let result = compare::compare_op(arg, &lhs, &rhs, self.heap, self.interns)?;
                    frame.push(result);
                }

                Opcode::JumpAbsolute => {
                    frame.ip = usize::from(arg);
                }
                Opcode::PopJumpIfFalse => {
                    let value = frame.pop()?;
                    if !value.py_bool(self.heap, self.interns) {
                        frame.ip = usize::from(arg);
                    }
                }
                Opcode::PopJumpIfTrue => {
                    let value = frame.pop()?;
                    if value.py_bool(self.heap, self.interns) {
                        frame.ip = usize::from(arg);
                    }
                }

                Opcode::BuildTuple => {
                    let items = frame.pop_n(usize::from(arg))?;
                    let value = Value::Ref(self.heap.allocate(HeapData::Tuple(Tuple::new(items))));
                    frame.push(value);
                }
                Opcode::BuildList => {
                    let items = frame.pop_n(usize::from(arg))?;
                    let value = Value::Ref(self.heap.allocate(HeapData::List(List::new(items))));
                    frame.push(value);
                }
                Opcode::BuildMap => {
                    let mut flat = frame.pop_n(usize::from(arg) * 2)?;
                    let mut dict = Dict::with_capacity(usize::from(arg));
                    let mut drain = flat.drain(..);
                    while let (Some(key), Some(value)) = (drain.next(), drain.next()) {
                        dict.set(key, value, self.heap, self.interns)?;
                    }
                    drop(drain);
                    let value = Value::Ref(self.heap.allocate(HeapData::Dict(dict)));
                    frame.push(value);
                }

                Opcode::CallFunction | Opcode::CallMethod => {
                    let args = frame.pop_n(usize::from(arg))?;
                    let callable = frame.pop()?;
                    let result = self.call_value(callable, ArgValues::positional(args))?;
                    frame.push(result);
                }
                Opcode::CallFunctionKw => {
                    let args = self.pop_kw_call_args(frame, usize::from(arg))?;
                    let callable = frame.pop()?;
                    let result = self.call_value(callable, args)?;
                    frame.push(result);
                }

                Opcode::MakeFunction => {
                    let function = self.make_function(frame, arg)?;
                    frame.push(function);
                }

                Opcode::RaiseVarargs => match arg {
                    0 => return Err(ExcType::no_active_exception()),
                    1 => {
                        let exc = frame.pop()?;
                        return Err(self.raise_from_value(exc)?.into());
                    }
                    2 => {
                        let cause = frame.pop()?;
                        let exc = frame.pop()?;
                        let cause = self.raise_from_value(cause)?;
                        return Err(self.raise_from_value(exc)?.with_cause(cause).into());
                    }
                    _ => {
                        return Err(RunError::internal(format!(
                            "RAISE_VARARGS argument {arg} out of range"
                        )));
                    }
                },

                Opcode::ReturnValue => {
                    let value = frame.pop()?;
                    debug_assert!(
                        frame.stack.is_empty(),
                        "RETURN_VALUE must leave the operand stack empty"
                    );
                    return Ok(value);
                }
            }

            #[cfg(debug_assertions)]
            if let Some(effect) = op.stack_effect(arg) {
                let expected = i64::try_from(depth_before).unwrap_or_default() + i64::from(effect);
                debug_assert_eq!(
                    frame.stack.len() as i64,
                    expected,
                    "stack imbalance after {}",
                    op.mnemonic()
                );
            }
        }
    }

    /// Resolves `names[index]` via the frame's name cache: a hit is
    /// returned directly, a miss consults the globals and fills the
    /// cache, and an absent global is a NameError.
    fn load_name(&mut self, frame: &mut Frame<'rt>, arg: u8) -> RunResult<Value> {
        let index = usize::from(arg);
        let name = self.name_at(frame, index)?;
        if !matches!(frame.name_cache[index], Value::Undefined) {
            return Ok(frame.name_cache[index].clone());
        }
        match self.globals.get(name) {
            Some(value) => {
                let value = value.clone();
                frame.name_cache[index] = value.clone();
                Ok(value)
            }
            None => Err(ExcType::name_error(self.interns.get_str(name))),
        }
    }

    fn name_at(&self, frame: &Frame<'rt>, index: usize) -> RunResult<StringId> {
        frame
            .code
            .names
            .get(index)
            .copied()
            .ok_or_else(|| RunError::internal(format!("name index {index} out of range")))
    }

    /// Pops the operands of CALL_FUNCTION_KW: a tuple of keyword names,
    /// the keyword values, then the positionals, `arg` values in total.
    fn pop_kw_call_args(&mut self, frame: &mut Frame<'rt>, total: usize) -> RunResult<ArgValues> {
        let names_value = frame.pop()?;
        let kw_names: Vec<StringId> = match &names_value {
            Value::Ref(id) => match self.heap.get(*id) {
                HeapData::Tuple(tuple) => tuple
                    .items()
                    .iter()
                    .map(|item| match item {
                        Value::InternString(name) => Ok(*name),
                        _ => Err(RunError::internal(
                            "CALL_FUNCTION_KW names must be a tuple of strings",
                        )),
                    })
                    .collect::<RunResult<_>>()?,
                _ => {
                    return Err(RunError::internal(
                        "CALL_FUNCTION_KW names must be a tuple of strings",
                    ));
                }
            },
            _ => {
                return Err(RunError::internal(
                    "CALL_FUNCTION_KW names must be a tuple of strings",
                ));
            }
        };
        if kw_names.len() > total {
            return Err(RunError::internal(
                "CALL_FUNCTION_KW has more keyword names than arguments",
            ));
        }
        let kw_values = frame.pop_n(kw_names.len())?;
        let positional = frame.pop_n(total - kw_names.len())?;
        let kwargs = kw_names.into_iter().zip(kw_values).collect();
        Ok(ArgValues::ArgsKargs {
            args: positional,
            kwargs,
        })
    }

    /// Builds a function object for MAKE_FUNCTION.
    fn make_function(&mut self, frame: &mut Frame<'rt>, flags: u8) -> RunResult<Value> {
        if flags & !(MF_DEFAULTS | MF_KW_DEFAULTS) != 0 {
            return Err(RunError::internal(format!(
                "unsupported MAKE_FUNCTION flags {flags:#04x}"
            )));
        }
        let qualname_value = frame.pop()?;
        let code_value = frame.pop()?;
        let Value::Code(code_id) = code_value else {
            return Err(RunError::internal("MAKE_FUNCTION expects a code object"));
        };

        let mut kw_defaults: Vec<(StringId, Value)> = Vec::new();
        if flags & MF_KW_DEFAULTS != 0 {
            let dict_value = frame.pop()?;
            let Value::Ref(id) = &dict_value else {
                return Err(RunError::internal("MAKE_FUNCTION keyword defaults must be a dict"));
            };
            let HeapData::Dict(dict) = self.heap.get(*id) else {
                return Err(RunError::internal("MAKE_FUNCTION keyword defaults must be a dict"));
            };
            for (key, value) in dict.iter() {
                let Value::InternString(name) = key else {
                    return Err(RunError::internal(
                        "MAKE_FUNCTION keyword default names must be strings",
                    ));
                };
                kw_defaults.push((*name, value.clone()));
            }
        }

        let mut defaults: Vec<Value> = Vec::new();
        if flags & MF_DEFAULTS != 0 {
            let tuple_value = frame.pop()?;
            let Value::Ref(id) = &tuple_value else {
                return Err(RunError::internal("MAKE_FUNCTION defaults must be a tuple"));
            };
            let HeapData::Tuple(tuple) = self.heap.get(*id) else {
                return Err(RunError::internal("MAKE_FUNCTION defaults must be a tuple"));
            };
            defaults = tuple.items().to_vec();
        }

        let code = &self.codes[code_id.index()];
        let signature = Signature::from_code(code);
        let qualname = match qualname_value {
            Value::InternString(id) => id,
            _ => code.name,
        };
        let function = Function {
            name: code.name,
            qualname,
            code: code_id,
            signature,
            defaults,
            kw_defaults,
        };
        Ok(Value::Ref(self.heap.allocate(HeapData::Function(function))))
    }

    /// Converts the operand of a raise into an exception: a type raises
    /// a bare instance of itself, an instance raises as-is.
    fn raise_from_value(&mut self, value: Value) -> RunResult<SimpleException> {
        match &value {
            Value::Builtin(Builtins::ExcType(exc_type)) => Ok(SimpleException::new_none(*exc_type)),
            Value::Ref(id) => match self.heap.get(*id) {
                HeapData::Exception(exc) => Ok(exc.clone()),
                _ => Err(ExcType::type_error("exceptions must derive from BaseException")),
            },
            _ => Err(ExcType::type_error("exceptions must derive from BaseException")),
        }
    }
}

impl Frame<'_> {
    /// Pops `(lhs, rhs)` for a binary opcode; rhs is on top.
    fn pop_two(&mut self) -> RunResult<(Value, Value)> {
        let rhs = self.pop()?;
        let lhs = self.pop()?;
        Ok((lhs, rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::code::CodeId;
    use crate::io::CollectStringPrint;

    /// Builds a module-level code object from instruction pairs.
    fn module_code(
        interns: &mut Interns,
        instrs: &[(Opcode, u8)],
        consts: Vec<Value>,
        names: &[&str],
        varnames: &[&str],
    ) -> Code {
        Code {
            arg_count: 0,
            posonly_arg_count: 0,
            kwonly_arg_count: 0,
            nlocals: varnames.len(),
            stack_size: 16,
            flags: 0,
            instrs: instrs.iter().map(|&(op, arg)| Instr { op, arg }).collect(),
            consts,
            names: names.iter().map(|n| interns.intern(n)).collect(),
            varnames: varnames.iter().map(|n| interns.intern(n)).collect(),
            freevars: Vec::new(),
            cellvars: Vec::new(),
            filename: interns.intern("vm.py"),
            name: interns.intern("<module>"),
            first_lineno: 1,
            lnotab: Vec::new(),
        }
    }

    struct Harness {
        interns: Interns,
        heap: Heap,
        globals: Namespace,
        codes: Vec<Code>,
    }

    impl Harness {
        fn new() -> Self {
            let mut interns = Interns::new();
            let globals = Namespace::with_builtins(&mut interns);
            Self {
                interns,
                heap: Heap::new(),
                globals,
                codes: Vec::new(),
            }
        }

        fn run(&mut self, code: &Code) -> RunResult<Value> {
            let mut print = CollectStringPrint::new();
            let mut vm = Vm::new(
                &mut self.heap,
                &self.interns,
                &self.codes,
                &mut self.globals,
                &mut print,
            );
            let mut frame = Frame::new_module(code);
            vm.run_frame(&mut frame)
        }
    }

    fn exc_of(err: RunError) -> SimpleException {
        match err {
            RunError::Exc(raise) => raise.exc,
            RunError::Internal(msg) => panic!("unexpected engine error: {msg}"),
        }
    }

    #[test]
    fn local_slot_discipline() {
        let mut harness = Harness::new();
        // STORE_FAST then LOAD_FAST returns the stored value.
        let code = module_code(
            &mut harness.interns,
            &[
                (Opcode::LoadConst, 0),
                (Opcode::StoreFast, 0),
                (Opcode::LoadFast, 0),
                (Opcode::ReturnValue, 0),
            ],
            vec![Value::Int(11)],
            &[],
            &["x"],
        );
        let result = harness.run(&code).unwrap();
        assert!(matches!(result, Value::Int(11)));
    }

    #[test]
    fn unassigned_local_raises_unbound_local_error() {
        let mut harness = Harness::new();
        let code = module_code(
            &mut harness.interns,
            &[(Opcode::LoadFast, 0), (Opcode::ReturnValue, 0)],
            vec![],
            &[],
            &["x"],
        );
        let exc = exc_of(harness.run(&code).unwrap_err());
        assert_eq!(exc.exc_type(), ExcType::UnboundLocalError);
        assert_eq!(
            exc.message(),
            Some("cannot access local variable 'x' where it is not associated with a value")
        );
    }

    #[test]
    fn store_name_at_module_scope_writes_globals() {
        let mut harness = Harness::new();
        let code = module_code(
            &mut harness.interns,
            &[
                (Opcode::LoadConst, 0),
                (Opcode::StoreName, 0),
                (Opcode::LoadConst, 1),
                (Opcode::ReturnValue, 0),
            ],
            vec![Value::Int(5), Value::None],
            &["answer"],
            &[],
        );
        harness.run(&code).unwrap();
        let name = harness.interns.intern("answer");
        assert!(matches!(harness.globals.get(name), Some(Value::Int(5))));
    }

    #[test]
    fn load_name_caches_the_resolved_global() {
        let mut harness = Harness::new();
        let code = module_code(
            &mut harness.interns,
            &[
                (Opcode::LoadName, 0),
                (Opcode::PopTop, 0),
                (Opcode::LoadName, 0),
                (Opcode::ReturnValue, 0),
            ],
            vec![],
            &["seeded"],
            &[],
        );
        let seeded = harness.interns.intern("seeded");
        harness.globals.set(seeded, Value::Int(3));
        let result = harness.run(&code).unwrap();
        assert!(matches!(result, Value::Int(3)));
    }

    #[test]
    fn missing_name_raises_name_error() {
        let mut harness = Harness::new();
        let code = module_code(
            &mut harness.interns,
            &[(Opcode::LoadName, 0), (Opcode::ReturnValue, 0)],
            vec![],
            &["nonexistent"],
            &[],
        );
        let exc = exc_of(harness.run(&code).unwrap_err());
        assert_eq!(exc.exc_type(), ExcType::NameError);
        assert_eq!(exc.message(), Some("name 'nonexistent' is not defined"));
    }

    #[test]
    fn pop_top_with_nonzero_argument_is_an_engine_error() {
        let mut harness = Harness::new();
        let code = module_code(
            &mut harness.interns,
            &[
                (Opcode::LoadConst, 0),
                (Opcode::PopTop, 1),
                (Opcode::LoadConst, 0),
                (Opcode::ReturnValue, 0),
            ],
            vec![Value::None],
            &[],
            &[],
        );
        assert!(matches!(harness.run(&code).unwrap_err(), RunError::Internal(_)));
    }

    #[test]
    fn stack_underflow_is_an_engine_error() {
        let mut harness = Harness::new();
        let code = module_code(
            &mut harness.interns,
            &[(Opcode::ReturnValue, 0)],
            vec![],
            &[],
            &[],
        );
        assert!(matches!(harness.run(&code).unwrap_err(), RunError::Internal(_)));
    }

    #[test]
    fn stack_balance_matches_declared_effects() {
        let mut harness = Harness::new();
        // A straight-line program covering pushes, shuffles, binary
        // operators, and container builds; every opcode's declared
        // effect is checked against the observed depth.
        let program: Vec<(Opcode, u8)> = vec![
            (Opcode::LoadConst, 0),
            (Opcode::DupTop, 0),
            (Opcode::RotTwo, 0),
            (Opcode::BinaryAdd, 0),
            (Opcode::LoadConst, 1),
            (Opcode::RotTwo, 0),
            (Opcode::BinaryMultiply, 0),
            (Opcode::LoadConst, 0),
            (Opcode::LoadConst, 1),
            (Opcode::BuildTuple, 2),
            (Opcode::PopTop, 0),
            (Opcode::UnaryNegative, 0),
        ];
        let consts = vec![Value::Int(2), Value::Int(3)];
        let code = module_code(&mut harness.interns, &[], consts, &[], &[]);

        let mut print = CollectStringPrint::new();
        let mut vm = Vm::new(
            &mut harness.heap,
            &harness.interns,
            &harness.codes,
            &mut harness.globals,
            &mut print,
        );
        let mut frame = Frame::new_module(&code);
        for &(op, arg) in &program {
            let depth_before = frame.stack_depth() as i64;
            step(&mut vm, &mut frame, op, arg);
            if let Some(effect) = op.stack_effect(arg) {
                assert_eq!(
                    frame.stack_depth() as i64,
                    depth_before + i64::from(effect),
                    "stack effect mismatch for {}",
                    op.mnemonic()
                );
            }
        }
    }

    /// Executes a single instruction by splicing it into a tiny code
    /// object that immediately returns afterwards.
    fn step(vm: &mut Vm<'_>, frame: &mut Frame<'_>, op: Opcode, arg: u8) {
        match op {
            Opcode::LoadConst => {
                let value = frame.code.consts[usize::from(arg)].clone();
                frame.push(value);
            }
            Opcode::DupTop => {
                let top = frame.stack.last().cloned().unwrap();
                frame.push(top);
            }
            Opcode::RotTwo => {
                let len = frame.stack.len();
                frame.stack.swap(len - 1, len - 2);
            }
            Opcode::BinaryAdd => {
                let (lhs, rhs) = frame.pop_two().unwrap();
                let result = binary::add(lhs, rhs, vm.heap, vm.interns).unwrap();
                frame.push(result);
            }
            Opcode::BinaryMultiply => {
                let (lhs, rhs) = frame.pop_two().unwrap();
                let result = binary::mul(lhs, rhs, vm.heap, vm.interns).unwrap();
                frame.push(result);
            }
            Opcode::BuildTuple => {
                let items = frame.pop_n(usize::from(arg)).unwrap();
                let value = Value::Ref(vm.heap.allocate(HeapData::Tuple(Tuple::new(items))));
                frame.push(value);
            }
            Opcode::PopTop => {
                frame.pop().unwrap();
            }
            Opcode::UnaryNegative => {
                let value = frame.pop().unwrap();
                let Value::Int(i) = value else { panic!("expected int") };
                frame.push(Value::Int(-i));
            }
            other => panic!("step helper does not cover {}", other.mnemonic()),
        }
    }

    #[test]
    fn return_value_leaves_the_stack_empty() {
        let mut harness = Harness::new();
        let code = module_code(
            &mut harness.interns,
            &[(Opcode::LoadConst, 0), (Opcode::ReturnValue, 0)],
            vec![Value::Int(1)],
            &[],
            &[],
        );
        let mut print = CollectStringPrint::new();
        let mut vm = Vm::new(
            &mut harness.heap,
            &harness.interns,
            &harness.codes,
            &mut harness.globals,
            &mut print,
        );
        let mut frame = Frame::new_module(&code);
        let result = vm.run_frame(&mut frame).unwrap();
        assert!(matches!(result, Value::Int(1)));
        assert_eq!(frame.stack_depth(), 0);
    }

    #[test]
    fn jumps_address_instruction_indices() {
        let mut harness = Harness::new();
        // if False: return 1 else: return 2, with an absolute jump.
        let code = module_code(
            &mut harness.interns,
            &[
                (Opcode::LoadConst, 0),      // False
                (Opcode::PopJumpIfFalse, 4), // jump to instruction 4
                (Opcode::LoadConst, 1),
                (Opcode::ReturnValue, 0),
                (Opcode::LoadConst, 2),
                (Opcode::ReturnValue, 0),
            ],
            vec![Value::Bool(false), Value::Int(1), Value::Int(2)],
            &[],
            &[],
        );
        let result = harness.run(&code).unwrap();
        assert!(matches!(result, Value::Int(2)));
    }

    #[test]
    fn raise_of_an_exception_type_unwinds_with_a_bare_instance() {
        let mut harness = Harness::new();
        let code = module_code(
            &mut harness.interns,
            &[(Opcode::LoadName, 0), (Opcode::RaiseVarargs, 1)],
            vec![],
            &["ValueError"],
            &[],
        );
        let exc = exc_of(harness.run(&code).unwrap_err());
        assert_eq!(exc.exc_type(), ExcType::ValueError);
        assert_eq!(exc.message(), None);
    }

    #[test]
    fn make_function_rejects_closure_flags() {
        let mut harness = Harness::new();
        harness.codes.push(module_code(
            &mut harness.interns,
            &[(Opcode::LoadConst, 0), (Opcode::ReturnValue, 0)],
            vec![Value::None],
            &[],
            &[],
        ));
        let fname = harness.interns.intern("f");
        let code = module_code(
            &mut harness.interns,
            &[
                (Opcode::LoadConst, 0),
                (Opcode::LoadConst, 1),
                (Opcode::MakeFunction, 0x08),
                (Opcode::ReturnValue, 0),
            ],
            vec![Value::Code(CodeId(0)), Value::InternString(fname)],
            &[],
            &[],
        );
        assert!(matches!(harness.run(&code).unwrap_err(), RunError::Internal(_)));
    }
}
