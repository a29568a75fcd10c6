// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Implements ECMA-262's runtime semantics: the type system (§6), execution
//! contexts and environments (§9), the abstract operations built on top of
//! them (§7, §13-§27 as needed), and the syntax-directed evaluation that
//! drives a parsed [`crate::ast`] tree through all of the above.

pub mod abstract_operations;
pub mod execution;
pub mod syntax_directed_operations;
pub mod types;
