// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [7.3 Operations on Objects](https://tc39.es/ecma262/#sec-operations-on-objects)
//!
//! The `&str`-keyed functions here (`get`, `set`, `has_property_by_str`, ...)
//! are this crate's convenience layer over the `PropertyKey`-keyed
//! internal methods — used by [`crate::ecmascript::execution::environments`]
//! and builtins, where the key is always a known identifier rather than a
//! computed value. Syntax-directed evaluation of member expressions goes
//! through the `PropertyKey` variants directly (`get_property`/`set_property`).

use std::cell::RefCell;

use crate::ecmascript::execution::agent::{Agent, ExceptionType, JsResult};
use crate::ecmascript::types::language::object::internal_methods;
use crate::ecmascript::types::language::object::property_key::PropertyKey;
use crate::ecmascript::types::language::object::Object;
use crate::ecmascript::types::language::value::Value;
use crate::ecmascript::types::spec::property_descriptor::PartialPropertyDescriptor;
use crate::heap::CreateHeapData;

/// ### [7.3.2 Get ( O, P )](https://tc39.es/ecma262/#sec-get-o-p)
pub fn get_property(agent: &RefCell<Agent>, object: Object, key: &PropertyKey) -> JsResult<Value> {
    get_property_with_receiver(agent, object, key, Value::Object(object))
}

fn get_property_with_receiver(
    agent: &RefCell<Agent>,
    object: Object,
    key: &PropertyKey,
    receiver: Value,
) -> JsResult<Value> {
    let desc = {
        let a = agent.borrow();
        internal_methods::get_own_property(&a, object, key)
    };
    use crate::ecmascript::types::spec::property_descriptor::PropertyDescriptor;
    match desc {
        Some(PropertyDescriptor::Data { value, .. }) => Ok(value),
        Some(PropertyDescriptor::Accessor { get: Some(getter), .. }) => {
            call_function(agent, getter, receiver, &[])
        }
        Some(PropertyDescriptor::Accessor { get: None, .. }) => Ok(Value::Undefined),
        None => {
            let parent = {
                let a = agent.borrow();
                internal_methods::get_prototype_of(&a, object)
            };
            match parent {
                Some(parent) => get_property_with_receiver(agent, parent, key, receiver),
                None => Ok(Value::Undefined),
            }
        }
    }
}

/// ### [7.3.4 Set ( O, P, V, Throw )](https://tc39.es/ecma262/#sec-set-o-p-v-throw)
pub fn set_property(agent: &RefCell<Agent>, object: Object, key: PropertyKey, value: Value, throw: bool) -> JsResult<()> {
    let ok = set_property_with_receiver(agent, object, key, value, Value::Object(object))?;
    if !ok && throw {
        let name = property_key_display(agent, &key);
        return Err(agent.borrow_mut().throw_exception(
            ExceptionType::TypeError,
            format!("Cannot assign to read only property '{name}'"),
        ));
    }
    Ok(())
}

fn set_property_with_receiver(
    agent: &RefCell<Agent>,
    object: Object,
    key: PropertyKey,
    value: Value,
    receiver: Value,
) -> JsResult<bool> {
    use crate::ecmascript::types::spec::property_descriptor::PropertyDescriptor;
    let desc = {
        let a = agent.borrow();
        internal_methods::get_own_property(&a, object, &key)
    };
    match desc {
        Some(PropertyDescriptor::Data { writable: false, .. }) => Ok(false),
        Some(PropertyDescriptor::Data { .. }) => {
            let Value::Object(receiver_object) = receiver else {
                return Ok(false);
            };
            let receiver_desc = {
                let a = agent.borrow();
                internal_methods::get_own_property(&a, receiver_object, &key)
            };
            match receiver_desc {
                Some(PropertyDescriptor::Accessor { .. }) => Ok(false),
                Some(PropertyDescriptor::Data { writable: false, .. }) => Ok(false),
                Some(PropertyDescriptor::Data { enumerable, configurable, .. }) => internal_methods::define_own_property(
                    agent,
                    receiver_object,
                    key,
                    PartialPropertyDescriptor {
                        value: Some(value),
                        enumerable: Some(enumerable),
                        configurable: Some(configurable),
                        ..Default::default()
                    },
                ),
                None => internal_methods::define_own_property(agent, receiver_object, key, PartialPropertyDescriptor::new_data(value)),
            }
        }
        Some(PropertyDescriptor::Accessor { set: Some(setter), .. }) => {
            call_function(agent, setter, receiver, &[value])?;
            Ok(true)
        }
        Some(PropertyDescriptor::Accessor { set: None, .. }) => Ok(false),
        None => {
            let parent = {
                let a = agent.borrow();
                internal_methods::get_prototype_of(&a, object)
            };
            match parent {
                Some(parent) => set_property_with_receiver(agent, parent, key, value, receiver),
                None => {
                    let Value::Object(receiver_object) = receiver else {
                        return Ok(false);
                    };
                    internal_methods::define_own_property(agent, receiver_object, key, PartialPropertyDescriptor::new_data(value))
                }
            }
        }
    }
}

fn property_key_display(agent: &RefCell<Agent>, key: &PropertyKey) -> std::string::String {
    match key {
        PropertyKey::String(s) => s.as_str(&agent.borrow().heap).to_owned(),
        PropertyKey::Symbol(_) => "Symbol(...)".to_owned(),
    }
}

/// ### [7.3.7 CreateDataPropertyOrThrow ( O, P, V )](https://tc39.es/ecma262/#sec-createdatapropertyorthrow)
pub fn create_data_property_or_throw_key(
    agent: &RefCell<Agent>,
    object: Object,
    key: PropertyKey,
    value: Value,
) -> JsResult<()> {
    let created = internal_methods::define_own_property(agent, object, key, PartialPropertyDescriptor::new_data(value))?;
    if !created {
        let name = property_key_display(agent, &key);
        return Err(agent
            .borrow_mut()
            .throw_exception(ExceptionType::TypeError, format!("Cannot define property '{name}'")));
    }
    Ok(())
}

/// ### [7.3.11 DeletePropertyOrThrow ( O, P )](https://tc39.es/ecma262/#sec-deletepropertyorthrow)
pub fn delete_property_or_throw(agent: &RefCell<Agent>, object: Object, key: &PropertyKey) -> JsResult<()> {
    let deleted = {
        let mut a = agent.borrow_mut();
        internal_methods::delete(&mut a, object, key)
    };
    if !deleted {
        let name = property_key_display(agent, key);
        return Err(agent
            .borrow_mut()
            .throw_exception(ExceptionType::TypeError, format!("Cannot delete property '{name}'")));
    }
    Ok(())
}

/// ### [7.2.7 IsCallable ( argument )](https://tc39.es/ecma262/#sec-iscallable)
pub fn is_callable(agent: &Agent, value: Value) -> bool {
    matches!(value, Value::Object(o) if o.is_callable(&agent.heap))
}

/// ### [7.3.1 MakeBasicObject ( internalSlotsList )](https://tc39.es/ecma262/#sec-makebasicobject) helper used by
/// builtins; this crate doesn't model arbitrary internal slot lists, so
/// callers build `ObjectHeapData` directly and this just pushes it.
pub fn make_basic_object(
    agent: &RefCell<Agent>,
    prototype: Option<Object>,
) -> Object {
    use crate::ecmascript::types::language::object::ObjectHeapData;
    let mut a = agent.borrow_mut();
    a.heap.create(ObjectHeapData::new_ordinary(prototype))
}

/// ### [7.3.14 Call ( F, V \[ , argumentsList \] )](https://tc39.es/ecma262/#sec-call)
///
/// Runs synchronously from the caller's perspective even for generator and
/// async functions: those only *create* their generator/promise object here
/// and (for async functions) drive the body to its first suspend point, per
/// `crate::engine::suspension`'s doc comment — the body's own remaining
/// execution is driven later by whoever resumes the generator/awaits the
/// promise, not by this call.
pub fn call_function(agent: &RefCell<Agent>, function: Value, this: Value, args: &[Value]) -> JsResult<Value> {
    let Value::Object(function_object) = function else {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "value is not a function"));
    };
    call_object(agent, function_object, this, args)
}

pub fn call_object(agent: &RefCell<Agent>, function_object: Object, this: Value, args: &[Value]) -> JsResult<Value> {
    use crate::ecmascript::types::language::function::FunctionData;
    use crate::ecmascript::types::language::object::ExoticData;
    let data = {
        let a = agent.borrow();
        match &a.heap[function_object.0].exotic {
            ExoticData::Function(f) => f.clone(),
            _ => {
                drop(a);
                return Err(agent
                    .borrow_mut()
                    .throw_exception_with_static_message(ExceptionType::TypeError, "value is not a function"));
            }
        }
    };
    match data {
        FunctionData::Ecma(ecma) => {
            crate::ecmascript::syntax_directed_operations::evaluation::call_ecma_function(
                agent,
                function_object,
                &ecma,
                this,
                args,
            )
        }
        FunctionData::Builtin(builtin) => (builtin.behavior)(agent, this, args),
        FunctionData::Bound(bound) => {
            let mut combined = bound.bound_args.clone();
            combined.extend_from_slice(args);
            call_function(agent, Value::Object(bound.target), bound.bound_this, &combined)
        }
        FunctionData::PromiseResolving(resolving) => {
            crate::builtins::promise::abstract_operations::call_resolving_function(agent, &resolving, args)
        }
    }
}

/// ### [7.3.15 Construct ( F \[ , argumentsList \[ , newTarget \] \] )](https://tc39.es/ecma262/#sec-construct)
pub fn construct(agent: &RefCell<Agent>, constructor: Object, args: &[Value], new_target: Object) -> JsResult<Object> {
    use crate::ecmascript::types::language::function::FunctionData;
    use crate::ecmascript::types::language::object::ExoticData;
    let data = {
        let a = agent.borrow();
        match &a.heap[constructor.0].exotic {
            ExoticData::Function(f) => Some(f.clone()),
            _ => None,
        }
    };
    match data {
        Some(FunctionData::Ecma(ecma)) => crate::ecmascript::syntax_directed_operations::evaluation::construct_ecma_function(
            agent, constructor, &ecma, args, new_target,
        ),
        Some(FunctionData::Builtin(builtin)) => {
            let Some(construct_behavior) = builtin.construct_behavior else {
                return Err(agent
                    .borrow_mut()
                    .throw_exception_with_static_message(ExceptionType::TypeError, "not a constructor"));
            };
            let result = construct_behavior(agent, Value::Undefined, args)?;
            match result {
                Value::Object(o) => Ok(o),
                _ => Err(agent
                    .borrow_mut()
                    .throw_exception_with_static_message(ExceptionType::TypeError, "constructor did not return an object")),
            }
        }
        Some(FunctionData::Bound(bound)) => {
            let mut combined = bound.bound_args.clone();
            combined.extend_from_slice(args);
            construct(agent, bound.target, &combined, new_target)
        }
        Some(FunctionData::PromiseResolving(_)) => Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "not a constructor")),
        None => Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "not a constructor")),
    }
}

// --- `&str`-keyed convenience wrappers, used by environment records and ---
// --- builtins whose property names are always known string literals.   ---

pub fn get(agent: &RefCell<Agent>, object: Object, name: &str) -> JsResult<Value> {
    let key = str_key(agent, name);
    get_property(agent, object, &key)
}

pub fn set(agent: &RefCell<Agent>, object: Object, name: &str, value: Value, throw: bool) -> JsResult<()> {
    let key = str_key(agent, name);
    set_property(agent, object, key, value, throw)
}

pub fn has_property_by_str(agent: &Agent, object: Object, name: &str) -> bool {
    internal_methods::has_property_by_str(agent, object, name)
}

pub fn create_data_property_or_throw(agent: &RefCell<Agent>, object: Object, name: &str, value: Value) -> JsResult<()> {
    let key = str_key(agent, name);
    create_data_property_or_throw_key(agent, object, key, value)
}

pub fn delete_property(agent: &RefCell<Agent>, object: Object, name: &str) -> JsResult<bool> {
    let key = str_key(agent, name);
    let mut a = agent.borrow_mut();
    Ok(internal_methods::delete(&mut a, object, &key))
}

/// `JsString::from_string` only actually touches the heap arena for names
/// longer than `SMALL_STRING_CAPACITY`; short ones (the overwhelming common
/// case for property names) stay inline, so this is cheap despite requiring
/// `&mut Heap`.
fn str_key(agent: &RefCell<Agent>, name: &str) -> PropertyKey {
    let mut a = agent.borrow_mut();
    PropertyKey::String(a.heap.create(name.to_owned()))
}
