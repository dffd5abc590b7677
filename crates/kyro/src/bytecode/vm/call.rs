//! Callable dispatch.
//!
//! Every callable answers the same question: produce a fresh frame for
//! this call. User functions bind their arguments into a new frame's
//! local slots and run it to completion; builtins short-circuit the
//! frame and invoke the host procedure directly; bound methods prepend
//! their receiver and delegate. There is no inheritance tower, just the
//! match below.

use crate::args::ArgValues;
use crate::bytecode::vm::{Frame, Vm};
use crate::exception_private::{ExcType, RunResult};
use crate::heap::{HeapData, HeapId};
use crate::intern::StringId;
use crate::signature::Signature;
use crate::value::Value;

impl<'rt> Vm<'rt> {
    /// Invokes a callable value with packaged arguments.
    pub(crate) fn call_value(&mut self, callable: Value, args: ArgValues) -> RunResult<Value> {
        match callable {
            Value::Builtin(builtin) => builtin.call(self.heap, args, self.interns, self.print),
            Value::Ref(id) => match self.heap.get(id) {
                HeapData::Function(_) => self.call_function(id, args),
                HeapData::BoundMethod(method) => {
                    let receiver = method.receiver.clone();
                    let callable = method.callable.clone();
                    self.call_value(callable, args.with_receiver(receiver))
                }
                _ => Err(ExcType::type_error_not_callable(callable.py_type(self.heap))),
            },
            other => Err(ExcType::type_error_not_callable(other.py_type(self.heap))),
        }
    }

    /// Calls a user-defined function: binds arguments into a fresh
    /// frame and runs it to completion.
    fn call_function(&mut self, func_id: HeapId, args: ArgValues) -> RunResult<Value> {
        if self.depth >= Self::MAX_FRAME_DEPTH {
            return Err(ExcType::recursion_error());
        }

        // Copy what binding needs out of the heap; the function object
        // stays untouched while its frame runs.
        let (code_id, signature, defaults, kw_defaults, name): (_, Signature, Vec<Value>, Vec<(StringId, Value)>, _) =
            match self.heap.get(func_id) {
                HeapData::Function(func) => (
                    func.code,
                    func.signature.clone(),
                    func.defaults.clone(),
                    func.kw_defaults.clone(),
                    func.name,
                ),
                _ => unreachable!("call_function dispatched on a non-function"),
            };

        let codes: &'rt [crate::bytecode::code::Code] = self.codes;
        let code = &codes[code_id.index()];
        let mut locals = vec![Value::Undefined; code.nlocals];
        let (positional, kwargs) = args.into_parts();
        signature.bind(
            positional,
            kwargs,
            &defaults,
            &kw_defaults,
            &mut locals,
            self.heap,
            self.interns,
            name,
        )?;

        let mut frame = Frame::new_function(code, locals);
        self.depth += 1;
        let result = self.run_frame(&mut frame);
        self.depth -= 1;
        result
    }
}
