//! Heap data types and the type metaobject.

pub(crate) mod bytes;
pub(crate) mod dict;
pub(crate) mod list;
pub(crate) mod str;
pub(crate) mod tuple;
mod r#type;

pub(crate) use bytes::Bytes;
pub(crate) use dict::Dict;
pub(crate) use list::List;
pub(crate) use str::Str;
pub(crate) use tuple::{Tuple, allocate_tuple};
pub use r#type::Type;
pub(crate) use r#type::type_has_method;
