// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.4 Execution Contexts](https://tc39.es/ecma262/#sec-execution-contexts)

use super::agent::Agent;
use super::environments::Environment;
use super::realm::RealmIdentifier;
use crate::ecmascript::types::language::object::Object;
use crate::heap::indices::PrivateEnvironmentIndex;

/// ### [code evaluation state](https://tc39.es/ecma262/#table-state-components-for-all-execution-contexts)
#[derive(Debug, Clone, Copy)]
pub struct EcmaScriptCodeEvaluationState {
    pub lexical_environment: Environment,
    pub variable_environment: Environment,
    pub private_environment: Option<PrivateEnvironmentIndex>,
    /// Not one of ECMA-262's own execution-context fields, but needed
    /// everywhere `IsStrict` would otherwise be consulted.
    pub is_strict_mode: bool,
}

/// ### [9.4 Execution Contexts](https://tc39.es/ecma262/#sec-execution-contexts)
#[derive(Debug, Clone, Copy)]
pub struct ExecutionContext {
    pub ecmascript_code: Option<EcmaScriptCodeEvaluationState>,
    pub function: Option<Object>,
    pub realm: RealmIdentifier,
    pub script_or_module: bool,
}

/// ### [9.4.6 GetGlobalObject ( )](https://tc39.es/ecma262/#sec-getglobalobject)
pub(crate) fn get_global_object(agent: &Agent) -> Object {
    agent.current_realm().global_object()
}
