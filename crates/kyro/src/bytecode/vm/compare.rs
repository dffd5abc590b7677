//! Comparison operator dispatch.

use std::cmp::Ordering;

use crate::exception_private::{ExcType, RunError, RunResult};
use crate::heap::{Heap, HeapData};
use crate::intern::Interns;
use crate::value::Value;

/// Integer-coded relational operators of COMPARE_OP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareKind {
    Lt = 0,
    Le = 1,
    Eq = 2,
    Ne = 3,
    Gt = 4,
    Ge = 5,
}

impl CompareKind {
    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Lt),
            1 => Some(Self::Le),
            2 => Some(Self::Eq),
            3 => Some(Self::Ne),
            4 => Some(Self::Gt),
            5 => Some(Self::Ge),
            _ => None,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// Executes COMPARE_OP. An out-of-range code is corrupted input, not a
/// guest error.
pub(crate) fn compare_op(
    code: u8,
    lhs: &Value,
    rhs: &Value,
    heap: &Heap,
    interns: &Interns,
) -> RunResult<Value> {
    let Some(kind) = CompareKind::from_code(code) else {
        return Err(RunError::internal(format!("unknown comparison code {code}")));
    };
    match kind {
        CompareKind::Eq => Ok(Value::Bool(lhs.py_eq(rhs, heap, interns))),
        CompareKind::Ne => Ok(Value::Bool(!lhs.py_eq(rhs, heap, interns))),
        ordered => {
            let ordering = try_ordering(lhs, rhs, heap, interns)
                .ok_or_else(|| ExcType::compare_type_error(ordered.symbol(), lhs.py_type(heap), rhs.py_type(heap)))?;
            let result = match (ordered, ordering) {
                (CompareKind::Lt, Some(Ordering::Less))
                | (CompareKind::Le, Some(Ordering::Less | Ordering::Equal))
                | (CompareKind::Gt, Some(Ordering::Greater))
                | (CompareKind::Ge, Some(Ordering::Greater | Ordering::Equal)) => true,
                // `None` means an unordered numeric pair (NaN involved):
                // every ordered comparison is false.
                _ => false,
            };
            Ok(Value::Bool(result))
        }
    }
}

/// Orders two values when their types are comparable.
///
/// Returns `None` for incomparable types (the caller raises), and
/// `Some(None)` for comparable-but-unordered pairs (NaN).
#[expect(clippy::option_option, reason = "distinguishes incomparable types from NaN unordered pairs")]
fn try_ordering(lhs: &Value, rhs: &Value, heap: &Heap, interns: &Interns) -> Option<Option<Ordering>> {
    // Exact integer ordering first; the float path loses precision at
    // the top of the i64 range.
    if let (Some(a), Some(b)) = (int_like(lhs), int_like(rhs)) {
        return Some(Some(a.cmp(&b)));
    }
    if let (Some(a), Some(b)) = (numeric(lhs), numeric(rhs)) {
        return Some(a.partial_cmp(&b));
    }
    if let (Some(a), Some(b)) = (lhs.as_str(heap, interns), rhs.as_str(heap, interns)) {
        return Some(Some(a.cmp(b)));
    }
    if let (Some(a), Some(b)) = (lhs.as_bytes(heap, interns), rhs.as_bytes(heap, interns)) {
        return Some(Some(a.cmp(b)));
    }
    if let (Value::Ref(a), Value::Ref(b)) = (lhs, rhs) {
        match (heap.get(*a), heap.get(*b)) {
            (HeapData::List(x), HeapData::List(y)) => {
                return sequence_ordering(x.items(), y.items(), heap, interns);
            }
            (HeapData::Tuple(x), HeapData::Tuple(y)) => {
                return sequence_ordering(x.items(), y.items(), heap, interns);
            }
            _ => {}
        }
    }
    None
}

/// Lexicographic ordering over like sequences: the first non-equal pair
/// decides, otherwise the shorter sequence orders first.
fn sequence_ordering(
    a: &[Value],
    b: &[Value],
    heap: &Heap,
    interns: &Interns,
) -> Option<Option<Ordering>> {
    for (x, y) in a.iter().zip(b) {
        if x.py_eq(y, heap, interns) {
            continue;
        }
        return try_ordering(x, y, heap, interns);
    }
    Some(Some(a.len().cmp(&b.len())))
}

fn int_like(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Int(i) => Some(*i),
        _ => None,
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}
