// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.1 Environment Records](https://tc39.es/ecma262/#sec-environment-records)
//!
//! Module Environment Records are out of scope (no module system), so
//! [`Environment`] has one fewer variant than ECMA-262's full list.

pub mod declarative_environment;
pub mod function_environment;
pub mod global_environment;
pub mod object_environment;
pub mod private_environment;

use std::cell::RefCell;

use declarative_environment::{DeclarativeEnvironmentRecord, SetBindingError};
use function_environment::ThisBindingStatus;
use object_environment::ObjectEnvironmentRecord;

use crate::ecmascript::execution::agent::{Agent, ExceptionType, JsResult};
use crate::ecmascript::types::language::object::property_key::PropertyKey;
use crate::ecmascript::types::language::object::Object;
use crate::ecmascript::types::language::string::JsString;
use crate::ecmascript::types::language::value::Value;
use crate::ecmascript::types::spec::reference::{Reference, ReferenceBase};
use crate::heap::indices::{
    DeclarativeEnvironmentIndex, FunctionEnvironmentIndex, GlobalEnvironmentIndex,
    ObjectEnvironmentIndex,
};

// Thin re-exports of the object-internal-method abstract operations this
// module needs; the real implementations live in `abstract_operations`
// (operations_on_objects.rs).
use crate::ecmascript::abstract_operations::operations_on_objects::{
    create_data_property_or_throw, delete_property, get, has_property_by_str, set,
};

/// A handle to one of the four kinds of Environment Record this crate
/// implements. Dispatch methods below mirror the abstract "Environment
/// Record" interface (HasBinding, CreateMutableBinding, ...) from table 15.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Declarative(DeclarativeEnvironmentIndex),
    Function(FunctionEnvironmentIndex),
    Global(GlobalEnvironmentIndex),
    Object(ObjectEnvironmentIndex),
}

impl Environment {
    pub fn outer_env(self, agent: &RefCell<Agent>) -> Option<Environment> {
        let a = agent.borrow();
        match self {
            Environment::Declarative(idx) => a.heap.declarative_environments[idx.into_index()].outer_env,
            Environment::Function(idx) => a.heap.function_environments[idx.into_index()].declarative().outer_env,
            Environment::Global(_) => None,
            Environment::Object(idx) => a.heap.object_environments[idx.into_index()].outer_env,
        }
    }

    pub fn has_binding(self, agent: &RefCell<Agent>, name: &str) -> JsResult<bool> {
        let a = agent.borrow();
        Ok(match self {
            Environment::Declarative(idx) => a.heap.declarative_environments[idx.into_index()].has_binding(name),
            Environment::Function(idx) => {
                a.heap.function_environments[idx.into_index()].declarative().has_binding(name)
            }
            Environment::Global(idx) => {
                let rec = &a.heap.global_environments[idx.into_index()];
                a.heap.declarative_environments[rec.declarative_record.into_index()].has_binding(name)
                    || has_object_binding(&a, rec.object_record, name)
            }
            Environment::Object(idx) => has_object_binding(&a, idx, name),
        })
    }

    pub fn create_mutable_binding(self, agent: &RefCell<Agent>, name: &str, deletable: bool) -> JsResult<()> {
        match self {
            Environment::Declarative(idx) => {
                agent.borrow_mut().heap.declarative_environments[idx.into_index()]
                    .create_mutable_binding(name, deletable);
            }
            Environment::Function(idx) => {
                agent.borrow_mut().heap.function_environments[idx.into_index()]
                    .declarative_mut()
                    .create_mutable_binding(name, deletable);
            }
            Environment::Global(idx) => {
                let mut a = agent.borrow_mut();
                let decl_idx = a.heap.global_environments[idx.into_index()].declarative_record;
                a.heap.declarative_environments[decl_idx.into_index()].create_mutable_binding(name, deletable);
            }
            Environment::Object(idx) => {
                let binding_object = agent.borrow().heap.object_environments[idx.into_index()].binding_object;
                create_data_property_or_throw(agent, binding_object, name, Value::Undefined)?;
            }
        }
        Ok(())
    }

    pub fn create_immutable_binding(self, agent: &RefCell<Agent>, name: &str, strict: bool) -> JsResult<()> {
        let mut a = agent.borrow_mut();
        match self {
            Environment::Declarative(idx) => {
                a.heap.declarative_environments[idx.into_index()].create_immutable_binding(name, strict)
            }
            Environment::Function(idx) => a.heap.function_environments[idx.into_index()]
                .declarative_mut()
                .create_immutable_binding(name, strict),
            Environment::Global(idx) => {
                let decl_idx = a.heap.global_environments[idx.into_index()].declarative_record;
                a.heap.declarative_environments[decl_idx.into_index()].create_immutable_binding(name, strict);
            }
            Environment::Object(_) => unreachable!("Object Environment Records have no immutable bindings"),
        }
        Ok(())
    }

    pub fn initialize_binding(self, agent: &RefCell<Agent>, name: &str, value: Value) -> JsResult<()> {
        match self {
            Environment::Declarative(idx) => {
                agent.borrow_mut().heap.declarative_environments[idx.into_index()].initialize_binding(name, value);
            }
            Environment::Function(idx) => {
                agent.borrow_mut().heap.function_environments[idx.into_index()]
                    .declarative_mut()
                    .initialize_binding(name, value);
            }
            Environment::Global(idx) => {
                let (has_declarative, object_record) = {
                    let a = agent.borrow();
                    let rec = &a.heap.global_environments[idx.into_index()];
                    (
                        a.heap.declarative_environments[rec.declarative_record.into_index()].has_binding(name),
                        rec.object_record,
                    )
                };
                if has_declarative {
                    let mut a = agent.borrow_mut();
                    let decl_idx = a.heap.global_environments[idx.into_index()].declarative_record;
                    a.heap.declarative_environments[decl_idx.into_index()].initialize_binding(name, value);
                } else {
                    let binding_object = agent.borrow().heap.object_environments[object_record.into_index()].binding_object;
                    set(agent, binding_object, name, value, false)?;
                }
            }
            Environment::Object(idx) => {
                let binding_object = agent.borrow().heap.object_environments[idx.into_index()].binding_object;
                set(agent, binding_object, name, value, false)?;
            }
        }
        Ok(())
    }

    pub fn get_binding_value(self, agent: &RefCell<Agent>, name: &str, strict: bool) -> JsResult<Value> {
        {
            let a = agent.borrow();
            match self {
                Environment::Declarative(idx) => {
                    let rec = &a.heap.declarative_environments[idx.into_index()];
                    if let Some(value) = rec.get_binding_value(name) {
                        return Ok(value);
                    }
                }
                Environment::Function(idx) => {
                    let rec = a.heap.function_environments[idx.into_index()].declarative();
                    if let Some(value) = rec.get_binding_value(name) {
                        return Ok(value);
                    }
                }
                Environment::Global(idx) => {
                    let rec = &a.heap.global_environments[idx.into_index()];
                    let decl = &a.heap.declarative_environments[rec.declarative_record.into_index()];
                    if decl.has_binding(name) {
                        if let Some(value) = decl.get_binding_value(name) {
                            return Ok(value);
                        }
                    } else {
                        let binding_object = a.heap.object_environments[rec.object_record.into_index()].binding_object;
                        drop(a);
                        return get_or_throw_not_found(agent, binding_object, name, strict);
                    }
                }
                Environment::Object(idx) => {
                    let binding_object = a.heap.object_environments[idx.into_index()].binding_object;
                    drop(a);
                    return get_or_throw_not_found(agent, binding_object, name, strict);
                }
            }
        }
        // Falling through here means a declarative-style binding existed but
        // was uninitialized: the temporal dead zone.
        let mut a = agent.borrow_mut();
        Err(a.throw_exception(
            ExceptionType::ReferenceError,
            format!("Cannot access '{name}' before initialization"),
        ))
    }

    pub fn set_mutable_binding(self, agent: &RefCell<Agent>, name: &str, value: Value, strict: bool) -> JsResult<()> {
        match self {
            Environment::Declarative(idx) => {
                let result = agent.borrow_mut().heap.declarative_environments[idx.into_index()]
                    .set_mutable_binding(name, value);
                translate_set_binding_error(agent, name, strict, result)
            }
            Environment::Function(idx) => {
                let result = agent.borrow_mut().heap.function_environments[idx.into_index()]
                    .declarative_mut()
                    .set_mutable_binding(name, value);
                translate_set_binding_error(agent, name, strict, result)
            }
            Environment::Global(idx) => {
                let (decl_idx, obj_idx) = {
                    let a = agent.borrow();
                    let rec = &a.heap.global_environments[idx.into_index()];
                    (rec.declarative_record, rec.object_record)
                };
                let has_declarative = agent.borrow().heap.declarative_environments[decl_idx.into_index()].has_binding(name);
                if has_declarative {
                    let result = agent.borrow_mut().heap.declarative_environments[decl_idx.into_index()]
                        .set_mutable_binding(name, value);
                    translate_set_binding_error(agent, name, strict, result)
                } else {
                    let binding_object = agent.borrow().heap.object_environments[obj_idx.into_index()].binding_object;
                    set(agent, binding_object, name, value, strict)
                }
            }
            Environment::Object(idx) => {
                let binding_object = agent.borrow().heap.object_environments[idx.into_index()].binding_object;
                set(agent, binding_object, name, value, strict)
            }
        }
    }

    pub fn delete_binding(self, agent: &RefCell<Agent>, name: &str) -> JsResult<bool> {
        Ok(match self {
            Environment::Declarative(idx) => {
                agent.borrow_mut().heap.declarative_environments[idx.into_index()].delete_binding(name)
            }
            Environment::Function(idx) => agent.borrow_mut().heap.function_environments[idx.into_index()]
                .declarative_mut()
                .delete_binding(name),
            Environment::Global(idx) => {
                let decl_idx = agent.borrow().heap.global_environments[idx.into_index()].declarative_record;
                agent.borrow_mut().heap.declarative_environments[decl_idx.into_index()].delete_binding(name)
            }
            Environment::Object(idx) => {
                let binding_object = agent.borrow().heap.object_environments[idx.into_index()].binding_object;
                delete_property(agent, binding_object, name)?
            }
        })
    }

    pub fn has_this_binding(self, agent: &RefCell<Agent>) -> bool {
        let a = agent.borrow();
        match self {
            Environment::Function(idx) => a.heap.function_environments[idx.into_index()].has_this_binding(),
            Environment::Global(_) => true,
            Environment::Declarative(_) | Environment::Object(_) => false,
        }
    }

    pub fn has_super_binding(self, agent: &RefCell<Agent>) -> bool {
        let a = agent.borrow();
        match self {
            Environment::Function(idx) => a.heap.function_environments[idx.into_index()].has_super_binding(),
            _ => false,
        }
    }

    pub fn with_base_object(self, agent: &RefCell<Agent>) -> Option<Object> {
        match self {
            Environment::Object(idx) => {
                let a = agent.borrow();
                let rec = &a.heap.object_environments[idx.into_index()];
                rec.is_with_environment.then_some(rec.binding_object)
            }
            _ => None,
        }
    }

    /// ### [9.1.1.3.4 GetThisBinding ( )](https://tc39.es/ecma262/#sec-function-environment-records-getthisbinding) /
    /// ### [9.1.1.4.5 GetThisBinding ( )](https://tc39.es/ecma262/#sec-global-environment-records-getthisbinding)
    ///
    /// Only ever called on an environment `get_this_environment` returned, so
    /// `Declarative`/`Object` are unreachable and a `Function` environment's
    /// `this` is always initialized by the time user code can observe it.
    pub fn get_this_binding(self, agent: &RefCell<Agent>) -> Value {
        let a = agent.borrow();
        match self {
            Environment::Function(idx) => a.heap.function_environments[idx.into_index()]
                .get_this_binding()
                .expect("GetThisBinding called before BindThisValue"),
            Environment::Global(idx) => {
                Value::Object(a.heap.global_environments[idx.into_index()].global_this_value)
            }
            Environment::Declarative(_) | Environment::Object(_) => {
                unreachable!("get_this_environment never returns a Declarative/Object environment")
            }
        }
    }
}

/// ### [9.4.3 GetThisEnvironment ( )](https://tc39.es/ecma262/#sec-getthisenvironment) helper
///
/// Walks outward from `env` to the nearest environment that actually binds
/// `this` (skips arrow functions' lexical-`this` environments, which report
/// `has_this_binding() == false`). Every environment chain bottoms out at a
/// Global Environment Record, which always has one, so this never falls off
/// the end.
pub fn get_this_environment(agent: &RefCell<Agent>, mut env: Environment) -> Environment {
    loop {
        if env.has_this_binding(agent) {
            return env;
        }
        env = env.outer_env(agent).expect("environment chain must bottom out at a Global Environment Record");
    }
}

fn has_object_binding(agent: &Agent, idx: ObjectEnvironmentIndex, name: &str) -> bool {
    let binding_object = agent.heap.object_environments[idx.into_index()].binding_object;
    has_property_by_str(agent, binding_object, name)
}

/// ### [9.4.2 ResolveBinding ( name \[ , env \] )](https://tc39.es/ecma262/#sec-resolvebinding) helper
pub fn get_identifier_reference(
    agent: &RefCell<Agent>,
    env: Option<Environment>,
    name: JsString,
    strict: bool,
) -> JsResult<Reference> {
    // Environment lookups work in terms of `&str`; bindings are keyed by
    // owned `String` rather than `JsString` (see declarative_environment.rs),
    // so resolve the text once up front and thread it through the recursion.
    let name_str = {
        let a = agent.borrow();
        name.as_str(&a.heap).to_owned()
    };
    get_identifier_reference_inner(agent, env, &name_str, name, strict)
}

fn get_identifier_reference_inner(
    agent: &RefCell<Agent>,
    env: Option<Environment>,
    name_str: &str,
    name: JsString,
    strict: bool,
) -> JsResult<Reference> {
    let Some(env) = env else {
        return Ok(Reference {
            base: ReferenceBase::Unresolvable,
            referenced_name: PropertyKey::from(name),
            strict,
            this_value: None,
        });
    };
    if env.has_binding(agent, name_str)? {
        Ok(Reference {
            base: ReferenceBase::Environment(env),
            referenced_name: PropertyKey::from(name),
            strict,
            this_value: None,
        })
    } else {
        let outer = env.outer_env(agent);
        get_identifier_reference_inner(agent, outer, name_str, name, strict)
    }
}

fn translate_set_binding_error(
    agent: &RefCell<Agent>,
    name: &str,
    strict: bool,
    result: Result<(), SetBindingError>,
) -> JsResult<()> {
    match result {
        Ok(()) => Ok(()),
        Err(SetBindingError::Uninitialized) => Err(agent.borrow_mut().throw_exception(
            ExceptionType::ReferenceError,
            format!("Cannot access '{name}' before initialization"),
        )),
        Err(SetBindingError::Immutable) => {
            if strict {
                Err(agent
                    .borrow_mut()
                    .throw_exception(ExceptionType::TypeError, format!("Assignment to constant variable '{name}'")))
            } else {
                Ok(())
            }
        }
    }
}

fn get_or_throw_not_found(agent: &RefCell<Agent>, binding_object: Object, name: &str, strict: bool) -> JsResult<Value> {
    let not_found = !has_property_by_str(&agent.borrow(), binding_object, name);
    if not_found {
        if strict {
            return Err(agent
                .borrow_mut()
                .throw_exception(ExceptionType::ReferenceError, format!("{name} is not defined")));
        }
        return Ok(Value::Undefined);
    }
    get(agent, binding_object, name)
}

pub fn new_declarative_environment(agent: &RefCell<Agent>, outer_env: Option<Environment>) -> Environment {
    let mut a = agent.borrow_mut();
    let idx = a
        .heap
        .push_declarative_environment(DeclarativeEnvironmentRecord::new(outer_env));
    Environment::Declarative(idx)
}

pub fn new_object_environment(
    agent: &RefCell<Agent>,
    binding_object: Object,
    is_with_environment: bool,
    outer_env: Option<Environment>,
) -> Environment {
    let mut a = agent.borrow_mut();
    let idx = a.heap.push_object_environment(ObjectEnvironmentRecord::new(
        binding_object,
        is_with_environment,
        outer_env,
    ));
    Environment::Object(idx)
}

pub fn new_function_environment(
    agent: &RefCell<Agent>,
    function_object: Object,
    this_binding_status: ThisBindingStatus,
    new_target: Option<Object>,
    outer_env: Environment,
) -> Environment {
    let mut a = agent.borrow_mut();
    let record = function_environment::FunctionEnvironmentRecord::new(
        function_object,
        this_binding_status,
        new_target,
        outer_env,
    );
    let idx = a.heap.push_function_environment(record);
    Environment::Function(idx)
}

/// ### [9.1.2.5 NewGlobalEnvironment ( G, thisValue )](https://tc39.es/ecma262/#sec-newglobalenvironment)
pub fn new_global_environment(agent: &RefCell<Agent>, global: Object, this_value: Object) -> Environment {
    let mut a = agent.borrow_mut();
    let object_record = a
        .heap
        .push_object_environment(ObjectEnvironmentRecord::new(global, false, None));
    let declarative_record = a
        .heap
        .push_declarative_environment(DeclarativeEnvironmentRecord::new(None));
    let idx = a.heap.push_global_environment(
        global_environment::GlobalEnvironmentRecord::new(object_record, declarative_record, this_value),
    );
    Environment::Global(idx)
}
