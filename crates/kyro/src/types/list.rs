//! The mutable list type and its method table.

use crate::args::ArgValues;
use crate::exception_private::{ExcType, RunResult};
use crate::heap::{Heap, HeapData, HeapId};
use crate::intern::{Interns, StaticStrings, StringId};
use crate::value::Value;

/// Mutable ordered sequence of values.
#[derive(Debug, Default)]
pub(crate) struct List {
    items: Vec<Value>,
}

impl List {
    pub fn new(items: Vec<Value>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Resolves a possibly negative index, per guest indexing rules.
    pub fn resolve_index(&self, index: i64) -> Option<usize> {
        resolve_sequence_index(index, self.items.len())
    }

    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }
}

/// Resolves a possibly negative sequence index against a length.
pub(crate) fn resolve_sequence_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let resolved = if index < 0 { index + len } else { index };
    if (0..len).contains(&resolved) {
        Some(resolved as usize)
    } else {
        None
    }
}

/// Allocates a list from already-built items.
pub(crate) fn allocate_list(items: Vec<Value>, heap: &mut Heap) -> Value {
    Value::Ref(heap.allocate(HeapData::List(List::new(items))))
}

/// Calls a list method. The receiver is passed by id so methods can
/// mutate it in place.
pub(crate) fn call_list_method(
    list_id: HeapId,
    method_id: StringId,
    args: ArgValues,
    heap: &mut Heap,
    interns: &Interns,
) -> RunResult<Value> {
    let Some(method) = StaticStrings::from_id(method_id) else {
        return Err(ExcType::attribute_error("list", interns.get_str(method_id)));
    };
    match method {
        StaticStrings::Append => {
            let value = args.get_one_arg("append")?;
            let HeapData::List(list) = heap.get_mut(list_id) else {
                return Err(ExcType::type_error("append requires a list receiver"));
            };
            list.items.push(value);
            Ok(Value::None)
        }
        StaticStrings::Extend => {
            let value = args.get_one_arg("extend")?;
            let added: Vec<Value> = match &value {
                Value::Ref(id) => match heap.get(*id) {
                    HeapData::List(other) => other.items.clone(),
                    HeapData::Tuple(tuple) => tuple.items().to_vec(),
                    _ => return Err(ExcType::type_error(format!("'{}' object is not iterable", value.py_type(heap)))),
                },
                _ => return Err(ExcType::type_error(format!("'{}' object is not iterable", value.py_type(heap)))),
            };
            let HeapData::List(list) = heap.get_mut(list_id) else {
                return Err(ExcType::type_error("extend requires a list receiver"));
            };
            list.items.extend(added);
            Ok(Value::None)
        }
        StaticStrings::Insert => {
            let (index, value) = args.get_two_args("insert")?;
            let Value::Int(index) = index else {
                return Err(ExcType::type_error(format!(
                    "'{}' object cannot be interpreted as an integer",
                    index.py_type(heap)
                )));
            };
            let HeapData::List(list) = heap.get_mut(list_id) else {
                return Err(ExcType::type_error("insert requires a list receiver"));
            };
            // Out-of-range insert indices clamp instead of raising.
            let len = list.items.len() as i64;
            let position = if index < 0 { (index + len).max(0) } else { index.min(len) };
            list.items.insert(position as usize, value);
            Ok(Value::None)
        }
        StaticStrings::Pop => {
            let index = match args {
                ArgValues::Empty => -1,
                ArgValues::One(Value::Int(i)) => i,
                ArgValues::One(other) => {
                    return Err(ExcType::type_error(format!(
                        "'{}' object cannot be interpreted as an integer",
                        other.py_type(heap)
                    )));
                }
                other => return Err(ExcType::type_error_at_most("pop", 1, other.count())),
            };
            let HeapData::List(list) = heap.get_mut(list_id) else {
                return Err(ExcType::type_error("pop requires a list receiver"));
            };
            if list.items.is_empty() {
                return Err(ExcType::index_error_pop_empty_list());
            }
            match list.resolve_index(index) {
                Some(position) => Ok(list.items.remove(position)),
                None => Err(ExcType::index_error_pop_out_of_range()),
            }
        }
        StaticStrings::Remove => {
            let target = args.get_one_arg("remove")?;
            let position = {
                let HeapData::List(list) = heap.get(list_id) else {
                    return Err(ExcType::type_error("remove requires a list receiver"));
                };
                let items = list.items.clone();
                items.iter().position(|item| item.py_eq(&target, heap, interns))
            };
            match position {
                Some(position) => {
                    let HeapData::List(list) = heap.get_mut(list_id) else {
                        return Err(ExcType::type_error("remove requires a list receiver"));
                    };
                    list.items.remove(position);
                    Ok(Value::None)
                }
                None => Err(ExcType::value_error("list.remove(x): x not in list")),
            }
        }
        StaticStrings::Index => {
            let target = args.get_one_arg("index")?;
            let items = match heap.get(list_id) {
                HeapData::List(list) => list.items.clone(),
                _ => return Err(ExcType::type_error("index requires a list receiver")),
            };
            match items.iter().position(|item| item.py_eq(&target, heap, interns)) {
                Some(position) => Ok(Value::Int(position as i64)),
                None => Err(ExcType::value_error("list.index(x): x not in list")),
            }
        }
        StaticStrings::Count => {
            let target = args.get_one_arg("count")?;
            let items = match heap.get(list_id) {
                HeapData::List(list) => list.items.clone(),
                _ => return Err(ExcType::type_error("count requires a list receiver")),
            };
            let count = items.iter().filter(|item| item.py_eq(&target, heap, interns)).count();
            Ok(Value::Int(count as i64))
        }
        StaticStrings::Clear => {
            args.check_zero_args("list.clear")?;
            let HeapData::List(list) = heap.get_mut(list_id) else {
                return Err(ExcType::type_error("clear requires a list receiver"));
            };
            list.items.clear();
            Ok(Value::None)
        }
        StaticStrings::Copy => {
            args.check_zero_args("list.copy")?;
            let items = match heap.get(list_id) {
                HeapData::List(list) => list.items.clone(),
                _ => return Err(ExcType::type_error("copy requires a list receiver")),
            };
            Ok(allocate_list(items, heap))
        }
        StaticStrings::Reverse => {
            args.check_zero_args("list.reverse")?;
            let HeapData::List(list) = heap.get_mut(list_id) else {
                return Err(ExcType::type_error("reverse requires a list receiver"));
            };
            list.items.reverse();
            Ok(Value::None)
        }
        _ => Err(ExcType::attribute_error("list", interns.get_str(method_id))),
    }
}
