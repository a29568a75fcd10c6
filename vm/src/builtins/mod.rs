// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [19-28 Fundamental / Control Abstraction / Managing Memory / Reflection Objects](https://tc39.es/ecma262/#sec-fundamental-objects)
//!
//! Only the subset of the global object's surface this crate's supported
//! syntax subset actually exercises is implemented — see `DESIGN.md` for the
//! per-intrinsic grounding ledger.

pub mod array;
pub mod console;
pub mod control_abstraction;
pub mod error;
pub mod function_objects;
pub mod object_global;
pub mod ordinary;
pub mod prelude;
pub mod promise;
