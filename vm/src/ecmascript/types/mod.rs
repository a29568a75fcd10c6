// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6 ECMAScript Data Types and Values](https://tc39.es/ecma262/#sec-ecmascript-data-types-and-values)

pub mod language;
pub mod spec;

pub use language::{BigInt, JsString, Object, Symbol, Value};
pub use spec::{Completion, PropertyDescriptor, Reference};
