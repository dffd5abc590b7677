//! String and bytes interning for identifiers and literals.
//!
//! The loader interns every name, varname, and string constant it reads
//! from a module file; the rest of the engine compares `StringId`s rather
//! than string contents. Method names the engine dispatches on are
//! pre-seeded from [`StaticStrings`] so that a `StringId` read from a
//! module resolves to the same id the dispatch tables match on.

use ahash::AHashMap;
use strum::{EnumCount, FromRepr, IntoStaticStr};

/// Index into the string interner's storage.
///
/// Uses `u32` to keep `Value` small; four billion distinct strings is far
/// more than any module can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StringId(u32);

impl StringId {
    /// Returns the raw index value.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<StaticStrings> for StringId {
    fn from(s: StaticStrings) -> Self {
        Self(s as u32)
    }
}

/// Index into the interner's bytes storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BytesId(u32);

/// Strings known at compile time: the method names the engine dispatches
/// on, plus a couple of fixed identifiers.
///
/// The discriminant of each variant is its `StringId`, so conversion in
/// both directions is free. Variants serialize to the guest-level
/// spelling via strum.
#[repr(u16)]
#[derive(Debug, Clone, Copy, FromRepr, EnumCount, IntoStaticStr, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum StaticStrings {
    #[strum(serialize = "")]
    EmptyString,
    #[strum(serialize = "<module>")]
    Module,

    // Shared between several container types
    Pop,
    Clear,
    Copy,
    Index,
    Count,

    // String methods
    Upper,
    Lower,
    Strip,
    Lstrip,
    Rstrip,
    Startswith,
    Endswith,
    Find,
    Replace,
    Split,
    Join,
    Capitalize,
    Title,

    // List methods
    Append,
    Extend,
    Insert,
    Remove,
    Reverse,

    // Dict methods
    Get,
    Keys,
    Values,
    Items,
    Setdefault,
    Update,

    // Bytes methods
    Decode,

    // Exception instance attributes
    Args,
}

impl StaticStrings {
    /// Looks up the static string for an interned id, if the id falls in
    /// the pre-seeded block.
    #[inline]
    pub fn from_id(id: StringId) -> Option<Self> {
        u16::try_from(id.0).ok().and_then(Self::from_repr)
    }

    /// Returns the guest-level spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Interned string and bytes storage for one loaded module.
///
/// Construction seeds the [`StaticStrings`] block so that interning the
/// text of a static string returns its fixed id.
#[derive(Debug)]
pub(crate) struct Interns {
    strings: Vec<String>,
    index: AHashMap<String, StringId>,
    bytes: Vec<Vec<u8>>,
}

impl Default for Interns {
    fn default() -> Self {
        Self::new()
    }
}

impl Interns {
    pub fn new() -> Self {
        let mut interns = Self {
            strings: Vec::with_capacity(StaticStrings::COUNT + 16),
            index: AHashMap::with_capacity(StaticStrings::COUNT + 16),
            bytes: Vec::new(),
        };
        for repr in 0..StaticStrings::COUNT {
            let s = StaticStrings::from_repr(repr as u16).expect("static string repr in range");
            let text: &'static str = s.into();
            interns.strings.push(text.to_owned());
            interns.index.insert(text.to_owned(), StringId(repr as u32));
        }
        interns
    }

    /// Interns a string, returning the existing id if the same text was
    /// interned before (including the static block).
    pub fn intern(&mut self, s: &str) -> StringId {
        if let Some(&id) = self.index.get(s) {
            return id;
        }
        let id = StringId(u32::try_from(self.strings.len()).expect("intern table overflow"));
        self.strings.push(s.to_owned());
        self.index.insert(s.to_owned(), id);
        id
    }

    /// Returns the text for an interned string id.
    pub fn get_str(&self, id: StringId) -> &str {
        &self.strings[id.index()]
    }

    /// Stores a bytes literal. Bytes are not deduplicated; each constant
    /// in the module file gets its own id.
    pub fn intern_bytes(&mut self, bytes: Vec<u8>) -> BytesId {
        let id = BytesId(u32::try_from(self.bytes.len()).expect("bytes table overflow"));
        self.bytes.push(bytes);
        id
    }

    /// Returns the content for an interned bytes id.
    pub fn get_bytes(&self, id: BytesId) -> &[u8] {
        &self.bytes[id.0 as usize]
    }
}
