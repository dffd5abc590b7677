//! The immutable tuple type.

use crate::args::ArgValues;
use crate::exception_private::{ExcType, RunResult};
use crate::heap::{Heap, HeapData, HeapId};
use crate::intern::{Interns, StaticStrings, StringId};
use crate::types::list::resolve_sequence_index;
use crate::value::Value;

/// Immutable ordered sequence of values.
#[derive(Debug, Default)]
pub(crate) struct Tuple {
    items: Vec<Value>,
}

impl Tuple {
    pub fn new(items: Vec<Value>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, index: i64) -> Option<&Value> {
        resolve_sequence_index(index, self.items.len()).map(|i| &self.items[i])
    }
}

/// Allocates a tuple from already-built items.
pub(crate) fn allocate_tuple(items: Vec<Value>, heap: &mut Heap) -> Value {
    Value::Ref(heap.allocate(HeapData::Tuple(Tuple::new(items))))
}

/// Calls a tuple method.
pub(crate) fn call_tuple_method(
    tuple_id: HeapId,
    method_id: StringId,
    args: ArgValues,
    heap: &mut Heap,
    interns: &Interns,
) -> RunResult<Value> {
    let items = match heap.get(tuple_id) {
        HeapData::Tuple(tuple) => tuple.items.clone(),
        _ => return Err(ExcType::type_error("tuple method requires a tuple receiver")),
    };
    match StaticStrings::from_id(method_id) {
        Some(StaticStrings::Index) => {
            let target = args.get_one_arg("index")?;
            match items.iter().position(|item| item.py_eq(&target, heap, interns)) {
                Some(position) => Ok(Value::Int(position as i64)),
                None => Err(ExcType::value_error("tuple.index(x): x not in tuple")),
            }
        }
        Some(StaticStrings::Count) => {
            let target = args.get_one_arg("count")?;
            let count = items.iter().filter(|item| item.py_eq(&target, heap, interns)).count();
            Ok(Value::Int(count as i64))
        }
        _ => Err(ExcType::attribute_error("tuple", interns.get_str(method_id))),
    }
}
