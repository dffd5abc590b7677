//! The module-level namespace.
//!
//! One run executes one module, so there is a single globals mapping,
//! shared by every frame: module-level stores are immediately visible to
//! every function of the module. Name resolution goes through the
//! globals only, so the builtin surface is seeded here before the root
//! frame runs.

use ahash::AHashMap;
use strum::IntoEnumIterator;

use crate::builtins::{Builtins, BuiltinsFunctions};
use crate::exception_private::ExcType;
use crate::intern::{Interns, StringId};
use crate::types::Type;
use crate::value::Value;

/// The globals mapping of the loaded module.
#[derive(Debug, Default)]
pub(crate) struct Namespace {
    map: AHashMap<StringId, Value>,
}

impl Namespace {
    /// Creates the module namespace with the builtin surface seeded.
    pub fn with_builtins(interns: &mut Interns) -> Self {
        let mut namespace = Self::default();

        for function in [
            BuiltinsFunctions::Print,
            BuiltinsFunctions::Len,
            BuiltinsFunctions::Repr,
            BuiltinsFunctions::Hash,
            BuiltinsFunctions::Type,
        ] {
            let id = interns.intern(function.into());
            namespace.map.insert(id, Value::Builtin(Builtins::Function(function)));
        }

        for (name, ty) in [
            ("int", Type::Int),
            ("float", Type::Float),
            ("str", Type::Str),
            ("bool", Type::Bool),
            ("list", Type::List),
            ("tuple", Type::Tuple),
            ("dict", Type::Dict),
        ] {
            let id = interns.intern(name);
            namespace.map.insert(id, Value::Builtin(Builtins::Type(ty)));
        }

        for exc_type in ExcType::iter() {
            let id = interns.intern(exc_type.into());
            namespace.map.insert(id, Value::Builtin(Builtins::ExcType(exc_type)));
        }

        namespace
    }

    /// Looks up a name.
    pub fn get(&self, name: StringId) -> Option<&Value> {
        self.map.get(&name)
    }

    /// Binds or rebinds a name.
    pub fn set(&mut self, name: StringId, value: Value) {
        self.map.insert(name, value);
    }
}
