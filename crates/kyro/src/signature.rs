//! Function signature representation and argument binding.
//!
//! A signature is an ordered list of `(name, kind)` parameters derived
//! from a code object's metadata. Binding walks the declared parameters,
//! consumes call-site positionals and keywords, collects excess into the
//! star parameters when present, applies defaults, and reports every
//! mismatch as a TypeError in the source language's wording.

use crate::bytecode::code::{CO_VARARGS, CO_VARKEYWORDS, Code};
use crate::exception_private::{ExcType, RunResult};
use crate::heap::{Heap, HeapData};
use crate::intern::{Interns, StringId};
use crate::types::{Dict, allocate_tuple};
use crate::value::Value;

/// How one declared parameter consumes arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParamKind {
    /// Ordinary parameter, fillable by position or keyword.
    Positional,
    /// `*args`: collects excess positionals into a tuple.
    PositionalStar,
    /// Keyword-only parameter.
    Keyword,
    /// `**kwargs`: collects unrecognized keywords into a dict.
    KeywordStar,
}

/// One declared parameter.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Param {
    pub name: StringId,
    pub kind: ParamKind,
}

/// Declared parameters of a callable, in local-slot order.
///
/// Slot layout matches the code object's varnames: positional
/// parameters, then keyword-only parameters, then the `*args` slot, then
/// the `**kwargs` slot. Default values live on the `Function` (they are
/// evaluated at definition time), keyed here by position.
#[derive(Debug, Clone, Default)]
pub(crate) struct Signature {
    params: Vec<Param>,
    /// Leading parameters that cannot be passed by keyword.
    posonly_count: usize,
}

impl Signature {
    /// Derives the signature from a code object's metadata.
    pub fn from_code(code: &Code) -> Self {
        let mut params = Vec::with_capacity(code.arg_count + code.kwonly_arg_count + 2);
        let mut slot = 0;
        for _ in 0..code.arg_count {
            params.push(Param {
                name: code.varnames[slot],
                kind: ParamKind::Positional,
            });
            slot += 1;
        }
        for _ in 0..code.kwonly_arg_count {
            params.push(Param {
                name: code.varnames[slot],
                kind: ParamKind::Keyword,
            });
            slot += 1;
        }
        if code.flags & CO_VARARGS != 0 {
            params.push(Param {
                name: code.varnames[slot],
                kind: ParamKind::PositionalStar,
            });
            slot += 1;
        }
        if code.flags & CO_VARKEYWORDS != 0 {
            params.push(Param {
                name: code.varnames[slot],
                kind: ParamKind::KeywordStar,
            });
        }
        Self {
            params,
            posonly_count: code.posonly_arg_count,
        }
    }

    /// Number of local slots the parameters occupy.
    pub fn slot_count(&self) -> usize {
        self.params.len()
    }

    fn positional_count(&self) -> usize {
        self.params
            .iter()
            .filter(|p| p.kind == ParamKind::Positional)
            .count()
    }

    fn has_var_args(&self) -> bool {
        self.params.iter().any(|p| p.kind == ParamKind::PositionalStar)
    }

    fn has_var_kwargs(&self) -> bool {
        self.params.iter().any(|p| p.kind == ParamKind::KeywordStar)
    }

    /// Binds call arguments into the leading local slots of a frame.
    ///
    /// `locals` must already be sized to the code object's nlocals and
    /// filled with `Value::Undefined`; on success the parameter slots
    /// hold the bound values and the rest stay undefined.
    ///
    /// The binding order follows the declaration: positionals are
    /// consumed left to right, excess positionals go to `*args` (or fail
    /// with "too many"), keywords match positional-or-keyword and
    /// keyword-only names (never positional-only ones), unrecognized
    /// keywords go to `**kwargs` (or fail), and defaults fill whatever
    /// is still unbound.
    pub fn bind(
        &self,
        args: Vec<Value>,
        kwargs: Vec<(StringId, Value)>,
        defaults: &[Value],
        kw_defaults: &[(StringId, Value)],
        locals: &mut [Value],
        heap: &mut Heap,
        interns: &Interns,
        func_name: StringId,
    ) -> RunResult<()> {
        let positional_param_count = self.positional_count();
        let func = interns.get_str(func_name);

        // Track bound parameter slots for duplicate detection. A u64
        // bitmap supports 64 named parameters, beyond any real function.
        let mut bound: u64 = 0;

        // 1. Positionals fill positional parameter slots left to right.
        let arg_count = args.len();
        if arg_count > positional_param_count && !self.has_var_args() {
            return Err(ExcType::type_error_too_many_positional(
                func,
                positional_param_count,
                arg_count,
            ));
        }
        let mut excess_positional = Vec::new();
        for (index, value) in args.into_iter().enumerate() {
            if index < positional_param_count {
                locals[index] = value;
                bound |= 1 << index;
            } else {
                excess_positional.push(value);
            }
        }

        // 2. The *args slot takes whatever positionals remain.
        if self.has_var_args() {
            let star_slot = self
                .params
                .iter()
                .position(|p| p.kind == ParamKind::PositionalStar)
                .expect("checked by has_var_args");
            locals[star_slot] = allocate_tuple(excess_positional, heap);
            bound |= 1 << star_slot;
        }

        // 3. Keywords bind by name; positional-only parameters are
        //    invisible to them.
        let mut excess_kwargs = Dict::new();
        for (key, value) in kwargs {
            let matched = self.params.iter().position(|p| {
                p.name == key && matches!(p.kind, ParamKind::Positional | ParamKind::Keyword)
            });
            match matched {
                Some(slot) if slot < self.posonly_count => {
                    if self.has_var_kwargs() {
                        excess_kwargs.set(Value::InternString(key), value, heap, interns)?;
                    } else {
                        return Err(ExcType::type_error_positional_only(func, interns.get_str(key)));
                    }
                }
                Some(slot) => {
                    if bound & (1 << slot) != 0 {
                        return Err(ExcType::type_error_duplicate_arg(func, interns.get_str(key)));
                    }
                    locals[slot] = value;
                    bound |= 1 << slot;
                }
                None => {
                    if self.has_var_kwargs() {
                        excess_kwargs.set(Value::InternString(key), value, heap, interns)?;
                    } else {
                        return Err(ExcType::type_error_unexpected_keyword(func, interns.get_str(key)));
                    }
                }
            }
        }

        // 4. Defaults fill the remaining optional slots. Positional
        //    defaults align with the tail of the positional parameters.
        let first_defaulted = positional_param_count - defaults.len().min(positional_param_count);
        for (offset, default) in defaults.iter().enumerate() {
            let slot = first_defaulted + offset;
            if bound & (1 << slot) == 0 {
                locals[slot] = default.clone();
                bound |= 1 << slot;
            }
        }
        for (name, default) in kw_defaults {
            if let Some(slot) = self
                .params
                .iter()
                .position(|p| p.name == *name && p.kind == ParamKind::Keyword)
            {
                if bound & (1 << slot) == 0 {
                    locals[slot] = default.clone();
                    bound |= 1 << slot;
                }
            }
        }

        // 5. Everything declared must now be bound.
        let mut missing_positional: Vec<&str> = Vec::new();
        let mut missing_kwonly: Vec<&str> = Vec::new();
        for (slot, param) in self.params.iter().enumerate() {
            if bound & (1 << slot) != 0 {
                continue;
            }
            match param.kind {
                ParamKind::Positional => missing_positional.push(interns.get_str(param.name)),
                ParamKind::Keyword => missing_kwonly.push(interns.get_str(param.name)),
                ParamKind::PositionalStar => unreachable!("star slot bound in step 2"),
                ParamKind::KeywordStar => {}
            }
        }
        if !missing_positional.is_empty() {
            return Err(ExcType::type_error_missing_positional(func, &missing_positional));
        }
        if !missing_kwonly.is_empty() {
            return Err(ExcType::type_error_missing_kwonly(func, &missing_kwonly));
        }

        // 6. The **kwargs slot takes the leftover keywords.
        if let Some(slot) = self.params.iter().position(|p| p.kind == ParamKind::KeywordStar) {
            locals[slot] = Value::Ref(heap.allocate(HeapData::Dict(excess_kwargs)));
        }

        Ok(())
    }
}
