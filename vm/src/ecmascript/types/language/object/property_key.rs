// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::types::language::string::JsString;
use crate::ecmascript::types::language::symbol::Symbol;

/// ### [6.1.7 Property Keys](https://tc39.es/ecma262/#sec-object-type)
///
/// A property is keyed by a String or a Symbol. Integer-index keys are
/// still represented as `String` here (their own-property-order priority
/// over other strings is handled by [`super::property_storage::PropertyStorage`],
/// per §4.1's canonical order, rather than by a third `PropertyKey` variant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(JsString),
    Symbol(Symbol),
}

impl PropertyKey {
    pub fn from_static_str(s: &'static str) -> Self {
        PropertyKey::String(JsString::from_static_str(s))
    }

    /// Parses this key as a canonical numeric index, per the "array index"
    /// notion used throughout §4.1's `OwnPropertyKeys` ordering and the
    /// exotic Array `[[DefineOwnProperty]]`.
    pub fn as_array_index(&self, heap: &crate::heap::Heap) -> Option<u32> {
        let PropertyKey::String(s) = self else {
            return None;
        };
        let text = s.as_str(heap);
        if text == "0" {
            return Some(0);
        }
        if text.starts_with('0') || text.is_empty() {
            return None;
        }
        text.parse::<u32>().ok().filter(|n| *n != u32::MAX)
    }
}

impl From<JsString> for PropertyKey {
    fn from(s: JsString) -> Self {
        PropertyKey::String(s)
    }
}

impl From<Symbol> for PropertyKey {
    fn from(s: Symbol) -> Self {
        PropertyKey::Symbol(s)
    }
}
