// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9 Executable Code and Execution Contexts](https://tc39.es/ecma262/#sec-executable-code-and-execution-contexts)

pub mod agent;
pub mod environments;
pub mod execution_context;
pub mod realm;

pub use agent::{Agent, ExceptionType, JsError, JsResult, Options};
pub use environments::Environment;
pub use execution_context::ExecutionContext;
pub use realm::{Realm, RealmIdentifier};
