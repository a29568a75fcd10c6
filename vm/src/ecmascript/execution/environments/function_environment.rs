// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.1.1.3 Function Environment Records](https://tc39.es/ecma262/#sec-function-environment-records)

use super::declarative_environment::DeclarativeEnvironmentRecord;
use crate::ecmascript::types::language::object::Object;
use crate::ecmascript::types::language::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThisBindingStatus {
    /// An ArrowFunction: there is no local `this` to bind at all.
    Lexical,
    Initialized,
    Uninitialized,
}

#[derive(Debug)]
pub struct FunctionEnvironmentRecord {
    this_value: Option<Value>,
    this_binding_status: ThisBindingStatus,
    pub(crate) function_object: Object,
    pub(crate) new_target: Option<Object>,
    pub(crate) declarative_environment: DeclarativeEnvironmentRecord,
}

impl FunctionEnvironmentRecord {
    /// ### [9.1.2.4 NewFunctionEnvironment ( F, newTarget )](https://tc39.es/ecma262/#sec-newfunctionenvironment)
    pub fn new(
        function_object: Object,
        this_binding_status: ThisBindingStatus,
        new_target: Option<Object>,
        outer_env: super::Environment,
    ) -> Self {
        Self {
            this_value: None,
            this_binding_status,
            function_object,
            new_target,
            declarative_environment: DeclarativeEnvironmentRecord::new(Some(outer_env)),
        }
    }

    pub fn has_this_binding(&self) -> bool {
        self.this_binding_status != ThisBindingStatus::Lexical
    }

    pub fn has_super_binding(&self) -> bool {
        self.this_binding_status != ThisBindingStatus::Lexical && self.home_object().is_some()
    }

    fn home_object(&self) -> Option<Object> {
        // HomeObject lives on the function object itself (`EcmaFunctionData::home_object`);
        // looked up through the heap by the caller, not stored redundantly here.
        Some(self.function_object)
    }

    /// ### [9.1.1.3.4 GetThisBinding ( )](https://tc39.es/ecma262/#sec-function-environment-records-getthisbinding)
    pub fn get_this_binding(&self) -> Option<Value> {
        debug_assert_ne!(self.this_binding_status, ThisBindingStatus::Lexical);
        self.this_value
    }

    /// ### [9.1.1.3.1 BindThisValue ( V )](https://tc39.es/ecma262/#sec-bindthisvalue)
    pub fn bind_this_value(&mut self, value: Value) {
        debug_assert_eq!(self.this_binding_status, ThisBindingStatus::Uninitialized);
        self.this_value = Some(value);
        self.this_binding_status = ThisBindingStatus::Initialized;
    }

    pub fn this_binding_status(&self) -> ThisBindingStatus {
        self.this_binding_status
    }

    pub fn declarative(&self) -> &DeclarativeEnvironmentRecord {
        &self.declarative_environment
    }

    pub fn declarative_mut(&mut self) -> &mut DeclarativeEnvironmentRecord {
        &mut self.declarative_environment
    }
}
