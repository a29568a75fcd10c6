// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [20.1 Object Objects](https://tc39.es/ecma262/#sec-object-objects)
//!
//! Only the handful of
//! `Object.prototype` methods this crate's supported syntax subset actually
//! reaches (`toString`, `hasOwnProperty`) plus the bare `Object()` call/
//! construct behavior are implemented — `Object.keys`/`assign`/`freeze`/
//! `defineProperty` and friends are non-goals.

use std::cell::RefCell;

use crate::builtins::ordinary::define_builtin_method;
use crate::ecmascript::abstract_operations::operations_on_objects::{create_data_property_or_throw, make_basic_object};
use crate::ecmascript::abstract_operations::type_conversion::{to_object, to_property_key};
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::types::language::object::internal_methods::get_own_property;
use crate::ecmascript::types::language::object::Object;
use crate::ecmascript::types::language::value::Value;

/// ### [20.1.1.1 Object ( \[ value \] )](https://tc39.es/ecma262/#sec-object-value)
fn object_constructor(agent: &RefCell<Agent>, _this: Value, args: &[Value]) -> JsResult<Value> {
    match args.first().copied().unwrap_or(Value::Undefined) {
        Value::Undefined | Value::Null => {
            let object_prototype = {
                let a = agent.borrow();
                a.current_realm().intrinsics().object_prototype
            };
            Ok(Value::Object(make_basic_object(agent, Some(object_prototype))))
        }
        other => to_object(agent, other).map(Value::Object),
    }
}

/// ### [20.1.3.2 Object.prototype.hasOwnProperty ( V )](https://tc39.es/ecma262/#sec-object.prototype.hasownproperty)
fn object_has_own_property(agent: &RefCell<Agent>, this: Value, args: &[Value]) -> JsResult<Value> {
    let key = to_property_key(agent, args.first().copied().unwrap_or(Value::Undefined))?;
    let object = to_object(agent, this)?;
    let a = agent.borrow();
    Ok(Value::Boolean(get_own_property(&a, object, &key).is_some()))
}

/// ### [20.1.3.6 Object.prototype.toString ( )](https://tc39.es/ecma262/#sec-object.prototype.tostring)
fn object_to_string(agent: &RefCell<Agent>, this: Value, _args: &[Value]) -> JsResult<Value> {
    let tag = match this {
        Value::Undefined => "Undefined",
        Value::Null => "Null",
        Value::Object(o) if o.is_array(&agent.borrow().heap) => "Array",
        Value::Object(o) if o.is_callable(&agent.borrow().heap) => "Function",
        Value::Object(_) => "Object",
        _ => "Object",
    };
    let text = format!("[object {tag}]");
    let text = {
        let mut a = agent.borrow_mut();
        a.heap.create(text)
    };
    Ok(Value::String(text))
}

/// Installs `Object.prototype`'s own methods and the bare `Object`
/// constructor onto a realm's intrinsics, called from `builtins::prelude`.
pub fn install(agent: &RefCell<Agent>, function_prototype: Option<Object>) -> JsResult<()> {
    let object_prototype = {
        let a = agent.borrow();
        a.current_realm().intrinsics().object_prototype
    };
    define_builtin_method(agent, object_prototype, "hasOwnProperty", 1, object_has_own_property, function_prototype)?;
    define_builtin_method(agent, object_prototype, "toString", 0, object_to_string, function_prototype)?;

    let object_constructor_fn = crate::builtins::ordinary::create_builtin_function(
        agent,
        object_constructor,
        Some(object_constructor),
        "Object",
        1,
        function_prototype,
    );
    create_data_property_or_throw(agent, object_constructor_fn, "prototype", Value::Object(object_prototype))?;
    Ok(())
}
