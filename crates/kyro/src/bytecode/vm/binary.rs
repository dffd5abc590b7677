//! Binary operator dispatch.

use crate::exception_private::{ExcType, RunResult};
use crate::heap::{Heap, HeapData};
use crate::intern::Interns;
use crate::types::list::{allocate_list, resolve_sequence_index};
use crate::types::str::allocate_str;
use crate::types::tuple::allocate_tuple;
use crate::value::Value;

/// A numeric operand, with bools already widened to int.
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

/// Extracts a numeric operand; bool counts as int, nothing else does.
fn as_num(value: &Value) -> Option<Num> {
    match value {
        Value::Bool(b) => Some(Num::Int(i64::from(*b))),
        Value::Int(i) => Some(Num::Int(*i)),
        Value::Float(f) => Some(Num::Float(*f)),
        _ => None,
    }
}

/// `lhs + rhs`: numeric addition, or concatenation of like sequences.
pub(crate) fn add(lhs: Value, rhs: Value, heap: &mut Heap, interns: &Interns) -> RunResult<Value> {
    if let (Some(a), Some(b)) = (as_num(&lhs), as_num(&rhs)) {
        return match (a, b) {
            (Num::Int(a), Num::Int(b)) => a
                .checked_add(b)
                .map(Value::Int)
                .ok_or_else(|| ExcType::int_overflow("addition")),
            _ => Ok(Value::Float(a.as_f64() + b.as_f64())),
        };
    }
    if let (Some(a), Some(b)) = (lhs.as_str(heap, interns), rhs.as_str(heap, interns)) {
        let mut joined = String::with_capacity(a.len() + b.len());
        joined.push_str(a);
        joined.push_str(b);
        return Ok(allocate_str(joined, heap));
    }
    if let (Value::Ref(a), Value::Ref(b)) = (&lhs, &rhs) {
        match (heap.get(*a), heap.get(*b)) {
            (HeapData::List(x), HeapData::List(y)) => {
                let mut items = x.items().to_vec();
                items.extend_from_slice(y.items());
                return Ok(allocate_list(items, heap));
            }
            (HeapData::Tuple(x), HeapData::Tuple(y)) => {
                let mut items = x.items().to_vec();
                items.extend_from_slice(y.items());
                return Ok(allocate_tuple(items, heap));
            }
            _ => {}
        }
    }
    Err(ExcType::binary_type_error("+", lhs.py_type(heap), rhs.py_type(heap)))
}

/// `lhs - rhs`: numeric only.
pub(crate) fn sub(lhs: Value, rhs: Value, heap: &Heap) -> RunResult<Value> {
    match (as_num(&lhs), as_num(&rhs)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => a
            .checked_sub(b)
            .map(Value::Int)
            .ok_or_else(|| ExcType::int_overflow("subtraction")),
        (Some(a), Some(b)) => Ok(Value::Float(a.as_f64() - b.as_f64())),
        _ => Err(ExcType::binary_type_error("-", lhs.py_type(heap), rhs.py_type(heap))),
    }
}

/// `lhs * rhs`: numeric multiplication, or sequence repetition when one
/// operand is an int.
pub(crate) fn mul(lhs: Value, rhs: Value, heap: &mut Heap, interns: &Interns) -> RunResult<Value> {
    if let (Some(a), Some(b)) = (as_num(&lhs), as_num(&rhs)) {
        return match (a, b) {
            (Num::Int(a), Num::Int(b)) => a
                .checked_mul(b)
                .map(Value::Int)
                .ok_or_else(|| ExcType::int_overflow("multiplication")),
            _ => Ok(Value::Float(a.as_f64() * b.as_f64())),
        };
    }
    // seq * int and int * seq both repeat; a negative count is empty.
    let (seq, count) = match (as_num(&lhs), as_num(&rhs)) {
        (Some(Num::Int(count)), None) => (&rhs, count),
        (None, Some(Num::Int(count))) => (&lhs, count),
        _ => {
            return Err(ExcType::binary_type_error("*", lhs.py_type(heap), rhs.py_type(heap)));
        }
    };
    let count = usize::try_from(count).unwrap_or(0);
    if let Some(text) = seq.as_str(heap, interns) {
        let repeated = text.repeat(count);
        return Ok(allocate_str(repeated, heap));
    }
    if let Value::Ref(id) = seq {
        match heap.get(*id) {
            HeapData::List(list) => {
                let items = repeat_items(list.items(), count);
                return Ok(allocate_list(items, heap));
            }
            HeapData::Tuple(tuple) => {
                let items = repeat_items(tuple.items(), count);
                return Ok(allocate_tuple(items, heap));
            }
            _ => {}
        }
    }
    Err(ExcType::binary_type_error("*", lhs.py_type(heap), rhs.py_type(heap)))
}

fn repeat_items(items: &[Value], count: usize) -> Vec<Value> {
    let mut out = Vec::with_capacity(items.len() * count);
    for _ in 0..count {
        out.extend_from_slice(items);
    }
    out
}

/// `lhs / rhs`: always float division.
pub(crate) fn true_div(lhs: Value, rhs: Value, heap: &Heap) -> RunResult<Value> {
    match (as_num(&lhs), as_num(&rhs)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => {
            if b == 0 {
                Err(ExcType::zero_division())
            } else {
                Ok(Value::Float(a as f64 / b as f64))
            }
        }
        (Some(a), Some(b)) => {
            let divisor = b.as_f64();
            if divisor == 0.0 {
                Err(ExcType::float_zero_division())
            } else {
                Ok(Value::Float(a.as_f64() / divisor))
            }
        }
        _ => Err(ExcType::binary_type_error("/", lhs.py_type(heap), rhs.py_type(heap))),
    }
}

/// `lhs // rhs`: floor division.
pub(crate) fn floor_div(lhs: Value, rhs: Value, heap: &Heap) -> RunResult<Value> {
    match (as_num(&lhs), as_num(&rhs)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => {
            if b == 0 {
                return Err(ExcType::zero_division());
            }
            match a.checked_div(b) {
                Some(q) => {
                    // Quotient rounds toward negative infinity.
                    let adjusted = if a % b != 0 && (a < 0) != (b < 0) { q - 1 } else { q };
                    Ok(Value::Int(adjusted))
                }
                None => Err(ExcType::int_overflow("floor division")),
            }
        }
        (Some(a), Some(b)) => {
            let divisor = b.as_f64();
            if divisor == 0.0 {
                Err(ExcType::float_zero_division())
            } else {
                Ok(Value::Float((a.as_f64() / divisor).floor()))
            }
        }
        _ => Err(ExcType::binary_type_error("//", lhs.py_type(heap), rhs.py_type(heap))),
    }
}

/// `lhs % rhs`: remainder with the divisor's sign.
pub(crate) fn modulo(lhs: Value, rhs: Value, heap: &Heap) -> RunResult<Value> {
    match (as_num(&lhs), as_num(&rhs)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => {
            if b == 0 {
                return Err(ExcType::zero_modulo());
            }
            match a.checked_rem(b) {
                Some(r) => {
                    let adjusted = if r != 0 && (r < 0) != (b < 0) { r + b } else { r };
                    Ok(Value::Int(adjusted))
                }
                None => Err(ExcType::int_overflow("modulo")),
            }
        }
        (Some(a), Some(b)) => {
            let divisor = b.as_f64();
            if divisor == 0.0 {
                return Err(ExcType::float_zero_division());
            }
            let r = a.as_f64() % divisor;
            let adjusted = if r != 0.0 && (r < 0.0) != (divisor < 0.0) { r + divisor } else { r };
            Ok(Value::Float(adjusted))
        }
        _ => Err(ExcType::binary_type_error("%", lhs.py_type(heap), rhs.py_type(heap))),
    }
}

/// `obj[index]`: sequence indexing and dict lookup.
pub(crate) fn subscr(obj: Value, index: Value, heap: &mut Heap, interns: &Interns) -> RunResult<Value> {
    // String receivers yield one-character strings.
    if let Some(text) = obj.as_str(heap, interns) {
        let Some(i) = int_index(&index) else {
            return Err(ExcType::type_error_indices(obj.py_type(heap), index.py_type(heap)));
        };
        let chars: Vec<char> = text.chars().collect();
        return match resolve_sequence_index(i, chars.len()) {
            Some(position) => {
                let ch = chars[position].to_string();
                Ok(allocate_str(ch, heap))
            }
            None => Err(ExcType::str_index_error()),
        };
    }
    if let Some(content) = obj.as_bytes(heap, interns) {
        let Some(i) = int_index(&index) else {
            return Err(ExcType::type_error_indices(obj.py_type(heap), index.py_type(heap)));
        };
        return match resolve_sequence_index(i, content.len()) {
            Some(position) => Ok(Value::Int(i64::from(content[position]))),
            None => Err(ExcType::bytes_index_error()),
        };
    }
    if let Value::Ref(id) = &obj {
        match heap.get(*id) {
            HeapData::List(list) => {
                let Some(i) = int_index(&index) else {
                    return Err(ExcType::type_error_indices(obj.py_type(heap), index.py_type(heap)));
                };
                return match list.resolve_index(i) {
                    Some(position) => Ok(list.items()[position].clone()),
                    None => Err(ExcType::list_index_error()),
                };
            }
            HeapData::Tuple(tuple) => {
                let Some(i) = int_index(&index) else {
                    return Err(ExcType::type_error_indices(obj.py_type(heap), index.py_type(heap)));
                };
                return match tuple.get(i) {
                    Some(item) => Ok(item.clone()),
                    None => Err(ExcType::tuple_index_error()),
                };
            }
            HeapData::Dict(dict) => {
                return match dict.get(&index, heap, interns)? {
                    Some(value) => Ok(value.clone()),
                    None => Err(ExcType::key_error(&index, heap, interns)),
                };
            }
            _ => {}
        }
    }
    Err(ExcType::type_error_not_sub(obj.py_type(heap)))
}

/// An index operand: int or bool, never float.
fn int_index(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}
