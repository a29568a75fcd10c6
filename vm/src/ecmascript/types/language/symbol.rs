// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.1.5 The Symbol Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-symbol-type)

use super::string::JsString;
use crate::heap::indices::SymbolIndex;

#[derive(Debug)]
pub struct SymbolHeapData {
    pub descriptor: Option<JsString>,
}

/// A symbol's identity is its heap slot; two `Symbol`s are `==` only if
/// they were produced by the same `Symbol(...)` call (or are the same
/// well-known symbol), never by description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(pub SymbolIndex);

/// ### [6.1.5.1 Well-Known Symbols](https://tc39.es/ecma262/#table-well-known-symbols)
///
/// Only the subset this crate's supported syntax actually dispatches on:
/// `instanceof`'s `@@hasInstance` fallback and iteration's `@@iterator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownSymbol {
    Iterator,
    AsyncIterator,
    HasInstance,
    ToStringTag,
    Unscopables,
}
