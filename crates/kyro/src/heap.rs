//! Arena storage for compound guest values.
//!
//! Strings built at runtime, containers, functions, bound methods, and
//! exception instances live here and are referenced from `Value::Ref` by
//! [`HeapId`]. Aliased references share the same slot, so a mutation is
//! observable through every alias, which is the sharing model the guest
//! language exposes.
//!
//! The arena uses region semantics: one run owns every allocation and
//! releases them together when the `Runner` is dropped. Collection policy
//! is the host's concern; nothing in the engine frees individual slots.

use crate::exception_private::SimpleException;
use crate::function::{BoundMethod, Function};
use crate::types::{Bytes, Dict, List, Str, Tuple, Type};

/// Index of an allocation in the heap arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapId(u32);

impl HeapId {
    /// Returns the raw index, used as the value's guest-visible identity.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A compound value stored in the arena.
#[derive(Debug)]
pub(crate) enum HeapData {
    /// A string created at runtime (literals stay interned).
    Str(Str),
    /// Bytes created at runtime.
    Bytes(Bytes),
    List(List),
    Tuple(Tuple),
    Dict(Dict),
    /// A user-defined function created by MAKE_FUNCTION.
    Function(Function),
    /// A callable bound to its receiver by attribute access.
    BoundMethod(BoundMethod),
    /// An exception instance created by an exception type constructor.
    Exception(SimpleException),
}

impl HeapData {
    /// Returns the guest type of this allocation.
    pub fn py_type(&self) -> Type {
        match self {
            Self::Str(_) => Type::Str,
            Self::Bytes(_) => Type::Bytes,
            Self::List(_) => Type::List,
            Self::Tuple(_) => Type::Tuple,
            Self::Dict(_) => Type::Dict,
            Self::Function(_) => Type::Function,
            Self::BoundMethod(_) => Type::Method,
            Self::Exception(exc) => Type::Exception(exc.exc_type()),
        }
    }
}

/// The arena heap for one run.
#[derive(Debug, Default)]
pub(crate) struct Heap {
    entries: Vec<HeapData>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value and returns its id.
    pub fn allocate(&mut self, data: HeapData) -> HeapId {
        let id = HeapId(u32::try_from(self.entries.len()).expect("heap arena overflow"));
        self.entries.push(data);
        id
    }

    /// Returns the allocation for an id. Ids are only minted by
    /// [`Heap::allocate`], so an out-of-range index is an engine bug.
    #[inline]
    pub fn get(&self, id: HeapId) -> &HeapData {
        &self.entries[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: HeapId) -> &mut HeapData {
        &mut self.entries[id.index()]
    }
}
