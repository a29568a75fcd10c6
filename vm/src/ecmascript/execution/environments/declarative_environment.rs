// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! #### [9.1.1.1 Declarative Environment Records](https://tc39.es/ecma262/#sec-declarative-environment-records)

use super::Environment;
use crate::ecmascript::types::language::value::Value;
use ahash::AHashMap;

/// Keyed by owned `String` rather than `JsString`: binding names come from
/// several different call sites (declaration instantiation, `resolve_binding`,
/// catch clauses) and nothing in this crate interns identifiers, so two
/// `JsString::Heap` handles for the same text would otherwise compare unequal.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    /// `None` means the binding exists but hasn't been initialized yet —
    /// this is how the temporal dead zone is represented.
    pub value: Option<Value>,
    pub mutable: bool,
    pub strict: bool,
    pub deletable: bool,
}

#[derive(Debug, Default)]
pub struct DeclarativeEnvironmentRecord {
    pub(crate) outer_env: Option<Environment>,
    bindings: AHashMap<String, Binding>,
}

impl DeclarativeEnvironmentRecord {
    /// #### [9.1.2.2 NewDeclarativeEnvironment ( E )](https://tc39.es/ecma262/#sec-newdeclarativeenvironment)
    pub fn new(outer_env: Option<Environment>) -> Self {
        Self {
            outer_env,
            bindings: AHashMap::default(),
        }
    }

    pub fn has_binding(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn create_mutable_binding(&mut self, name: &str, is_deletable: bool) {
        debug_assert!(!self.has_binding(name));
        self.bindings.insert(
            name.to_owned(),
            Binding {
                value: None,
                mutable: true,
                strict: false,
                deletable: is_deletable,
            },
        );
    }

    pub fn create_immutable_binding(&mut self, name: &str, is_strict: bool) {
        debug_assert!(!self.has_binding(name));
        self.bindings.insert(
            name.to_owned(),
            Binding {
                value: None,
                mutable: false,
                strict: is_strict,
                deletable: false,
            },
        );
    }

    pub fn initialize_binding(&mut self, name: &str, value: Value) {
        let binding = self.bindings.get_mut(name).expect("uninitialized binding must exist");
        debug_assert!(binding.value.is_none());
        binding.value = Some(value);
    }

    /// Returns `Ok(None)` for an existing-but-uninitialized (TDZ) binding —
    /// the caller turns that into a `ReferenceError`.
    pub fn get_binding_value(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).expect("binding must exist").value
    }

    /// `Err(is_immutable)` lets the caller pick ReferenceError (TDZ) vs
    /// TypeError (write to a `const`) at the point it has an `Agent` to throw with.
    pub fn set_mutable_binding(&mut self, name: &str, value: Value) -> Result<(), SetBindingError> {
        if !self.has_binding(name) {
            self.create_mutable_binding(name, true);
            self.initialize_binding(name, value);
            return Ok(());
        }
        let binding = self.bindings.get_mut(name).unwrap();
        if binding.value.is_none() {
            return Err(SetBindingError::Uninitialized);
        }
        if binding.mutable {
            binding.value = Some(value);
            Ok(())
        } else {
            Err(SetBindingError::Immutable)
        }
    }

    pub fn delete_binding(&mut self, name: &str) -> bool {
        let Some(binding) = self.bindings.get(name) else {
            return false;
        };
        if !binding.deletable {
            return false;
        }
        self.bindings.remove(name);
        true
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn binding_names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum SetBindingError {
    Uninitialized,
    Immutable,
}
