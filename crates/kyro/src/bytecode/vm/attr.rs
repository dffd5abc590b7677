//! Attribute access and method binding.
//!
//! Lookup order follows the object model protocol: instance data first,
//! then the type's method table, then parent types. A callable resolved
//! through a type's table behaves as a descriptor: accessed through an
//! instance it binds the receiver into a method; accessed on the type
//! itself it stays unbound.

use crate::builtins::Builtins;
use crate::exception_private::{ExcType, RunResult};
use crate::function::BoundMethod;
use crate::heap::{Heap, HeapData};
use crate::intern::{Interns, StaticStrings, StringId};
use crate::types::str::allocate_str;
use crate::types::{Type, allocate_tuple, type_has_method};
use crate::value::Value;

/// Resolves `obj.name`.
pub(crate) fn load_attr(
    obj: Value,
    name_id: StringId,
    heap: &mut Heap,
    interns: &Interns,
) -> RunResult<Value> {
    let method = StaticStrings::from_id(name_id);

    // Attribute access on a type object yields the unbound method: the
    // descriptor was not reached through an instance, so it returns
    // itself.
    if let Value::Builtin(Builtins::Type(ty)) = obj {
        if let Some(method) = method {
            if type_has_method(ty, method) {
                return Ok(Value::Builtin(Builtins::TypeMethod { ty, method }));
            }
        }
        return Err(ExcType::attribute_error(format!("type[{ty}]"), interns.get_str(name_id)));
    }

    // Instance-level attributes: exception instances expose `args`.
    if method == Some(StaticStrings::Args) {
        if let Value::Ref(id) = &obj {
            let message = match heap.get(*id) {
                HeapData::Exception(exc) => Some(exc.message().map(str::to_owned)),
                _ => None,
            };
            if let Some(message) = message {
                let items = match message {
                    Some(msg) => vec![allocate_str(msg, heap)],
                    None => Vec::new(),
                };
                return Ok(allocate_tuple(items, heap));
            }
        }
    }

    // Type method table, walking parent types for exception instances.
    let ty = obj.py_type(heap);
    if let Some(method) = method {
        let mut current = Some(ty);
        while let Some(ty) = current {
            if type_has_method(ty, method) {
                let bound = BoundMethod {
                    receiver: obj,
                    callable: Value::Builtin(Builtins::TypeMethod { ty, method }),
                };
                return Ok(Value::Ref(heap.allocate(HeapData::BoundMethod(bound))));
            }
            current = parent_type(ty);
        }
    }

    Err(ExcType::attribute_error(ty, interns.get_str(name_id)))
}

/// Performs `obj.name = value`.
///
/// Every type in this engine's universe has a read-only attribute
/// surface, so attribute assignment is uniformly rejected; the error
/// names the type and attribute.
pub(crate) fn store_attr(
    obj: &Value,
    name_id: StringId,
    _value: Value,
    heap: &Heap,
    interns: &Interns,
) -> RunResult<()> {
    Err(ExcType::attribute_error_no_setattr(
        obj.py_type(heap),
        interns.get_str(name_id),
    ))
}

/// Parent type in the attribute-lookup chain. Only exception types have
/// parents; everything else terminates immediately.
fn parent_type(ty: Type) -> Option<Type> {
    match ty {
        Type::Exception(exc) => exc.parent().map(Type::Exception),
        _ => None,
    }
}
