//! The insertion-ordered dict type and its method table.

use hashbrown::HashTable;

use crate::args::ArgValues;
use crate::exception_private::{ExcType, RunError, RunResult};
use crate::heap::{Heap, HeapData, HeapId};
use crate::intern::{Interns, StaticStrings, StringId};
use crate::types::list::allocate_list;
use crate::types::tuple::allocate_tuple;
use crate::value::Value;

/// Mapping from hashable keys to values, preserving insertion order.
///
/// Uses a `HashTable<usize>` for hash lookups combined with a dense
/// `Vec<DictEntry>` that preserves insertion order. The hash table maps
/// key hashes to indices in the entries vector, giving O(1) lookups
/// while iteration follows insertion order.
#[derive(Debug, Default, Clone)]
pub(crate) struct Dict {
    /// Mapping from entry hash to index in `entries`.
    indices: HashTable<usize>,
    /// Dense entry storage in insertion order.
    entries: Vec<DictEntry>,
}

#[derive(Debug, Clone)]
struct DictEntry {
    key: Value,
    value: Value,
    /// Kept so the table can rehash without re-deriving key hashes.
    hash: u64,
}

impl Dict {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            indices: HashTable::with_capacity(capacity),
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|entry| (&entry.key, &entry.value))
    }

    /// Finds the entry index for a key, returning the key's hash either
    /// way. Fails if the key is unhashable.
    fn find_index(&self, key: &Value, heap: &Heap, interns: &Interns) -> RunResult<(Option<usize>, u64)> {
        let hash = match key.py_hash(heap, interns) {
            Ok(hash) => hash as u64,
            Err(_) => return Err(ExcType::type_error_unhashable_dict_key(key.py_type(heap))),
        };
        let found = self
            .indices
            .find(hash, |&idx| {
                self.entries[idx].hash == hash && self.entries[idx].key.py_eq(key, heap, interns)
            })
            .copied();
        Ok((found, hash))
    }

    /// Inserts or replaces a key's value.
    pub fn set(&mut self, key: Value, value: Value, heap: &Heap, interns: &Interns) -> RunResult<()> {
        let (found, hash) = self.find_index(&key, heap, interns)?;
        if let Some(index) = found {
            self.entries[index].value = value;
        } else {
            let index = self.entries.len();
            self.entries.push(DictEntry { key, value, hash });
            self.indices
                .insert_unique(hash, index, |&idx| self.entries[idx].hash);
        }
        Ok(())
    }

    /// Looks up a key's value.
    pub fn get(&self, key: &Value, heap: &Heap, interns: &Interns) -> RunResult<Option<&Value>> {
        let (found, _) = self.find_index(key, heap, interns)?;
        Ok(found.map(|index| &self.entries[index].value))
    }

    /// Removes a key, returning its value if present.
    ///
    /// Removal preserves the order of the remaining entries, so the
    /// index table is rebuilt; removal is O(n), lookups stay O(1).
    pub fn remove(&mut self, key: &Value, heap: &Heap, interns: &Interns) -> RunResult<Option<Value>> {
        let (found, _) = self.find_index(key, heap, interns)?;
        let Some(index) = found else { return Ok(None) };
        let entry = self.entries.remove(index);
        self.rebuild_indices();
        Ok(Some(entry.value))
    }

    pub fn clear(&mut self) {
        self.indices.clear();
        self.entries.clear();
    }

    fn rebuild_indices(&mut self) {
        self.indices.clear();
        for (index, entry) in self.entries.iter().enumerate() {
            self.indices
                .insert_unique(entry.hash, index, |&idx| self.entries[idx].hash);
        }
    }

    /// Structural equality: same length and every key maps to an equal
    /// value, insertion order ignored.
    pub fn py_eq(&self, other: &Self, heap: &Heap, interns: &Interns) -> bool {
        if self.len() != other.len() {
            return false;
        }
        for (key, value) in self.iter() {
            match other.get(key, heap, interns) {
                Ok(Some(other_value)) => {
                    if !value.py_eq(other_value, heap, interns) {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

/// Calls a dict method.
///
/// The dict is moved out of its heap slot for the duration of the call
/// so methods can hash and compare keys (which needs the heap) while
/// holding the dict mutably; keys can never alias their own dict because
/// dicts are unhashable.
pub(crate) fn call_dict_method(
    dict_id: HeapId,
    method_id: StringId,
    args: ArgValues,
    heap: &mut Heap,
    interns: &Interns,
) -> RunResult<Value> {
    let HeapData::Dict(slot) = heap.get_mut(dict_id) else {
        return Err(ExcType::type_error("dict method requires a dict receiver"));
    };
    let mut dict = std::mem::take(slot);
    let result = dict_method_inner(&mut dict, method_id, args, heap, interns);
    let HeapData::Dict(slot) = heap.get_mut(dict_id) else {
        return Err(RunError::internal("dict slot changed type during method call"));
    };
    *slot = dict;
    result
}

fn dict_method_inner(
    dict: &mut Dict,
    method_id: StringId,
    args: ArgValues,
    heap: &mut Heap,
    interns: &Interns,
) -> RunResult<Value> {
    let Some(method) = StaticStrings::from_id(method_id) else {
        return Err(ExcType::attribute_error("dict", interns.get_str(method_id)));
    };
    match method {
        StaticStrings::Get => {
            let (key, default) = args.get_one_two_args("get")?;
            match dict.get(&key, heap, interns)? {
                Some(value) => Ok(value.clone()),
                None => Ok(default.unwrap_or(Value::None)),
            }
        }
        StaticStrings::Keys => {
            args.check_zero_args("dict.keys")?;
            let keys = dict.iter().map(|(k, _)| k.clone()).collect();
            Ok(allocate_list(keys, heap))
        }
        StaticStrings::Values => {
            args.check_zero_args("dict.values")?;
            let values = dict.iter().map(|(_, v)| v.clone()).collect();
            Ok(allocate_list(values, heap))
        }
        StaticStrings::Items => {
            args.check_zero_args("dict.items")?;
            let pairs: Vec<(Value, Value)> = dict.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            let items = pairs
                .into_iter()
                .map(|(k, v)| allocate_tuple(vec![k, v], heap))
                .collect();
            Ok(allocate_list(items, heap))
        }
        StaticStrings::Pop => {
            let (key, default) = args.get_one_two_args("pop")?;
            match dict.remove(&key, heap, interns)? {
                Some(value) => Ok(value),
                None => match default {
                    Some(default) => Ok(default),
                    None => Err(ExcType::key_error(&key, heap, interns)),
                },
            }
        }
        StaticStrings::Setdefault => {
            let (key, default) = args.get_one_two_args("setdefault")?;
            if let Some(value) = dict.get(&key, heap, interns)? {
                return Ok(value.clone());
            }
            let value = default.unwrap_or(Value::None);
            dict.set(key, value.clone(), heap, interns)?;
            Ok(value)
        }
        StaticStrings::Update => {
            let other = args.get_one_arg("update")?;
            let pairs: Vec<(Value, Value)> = match &other {
                Value::Ref(id) => match heap.get(*id) {
                    HeapData::Dict(other_dict) => {
                        other_dict.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
                    }
                    _ => {
                        return Err(ExcType::type_error(format!(
                            "'{}' object is not a mapping",
                            other.py_type(heap)
                        )));
                    }
                },
                _ => {
                    return Err(ExcType::type_error(format!(
                        "'{}' object is not a mapping",
                        other.py_type(heap)
                    )));
                }
            };
            for (key, value) in pairs {
                dict.set(key, value, heap, interns)?;
            }
            Ok(Value::None)
        }
        StaticStrings::Clear => {
            args.check_zero_args("dict.clear")?;
            dict.clear();
            Ok(Value::None)
        }
        StaticStrings::Copy => {
            args.check_zero_args("dict.copy")?;
            let copy = dict.clone();
            Ok(Value::Ref(heap.allocate(HeapData::Dict(copy))))
        }
        _ => Err(ExcType::attribute_error("dict", interns.get_str(method_id))),
    }
}
