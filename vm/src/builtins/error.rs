// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [20.5 Error Objects](https://tc39.es/ecma262/#sec-error-objects)
//!
//! `Error` and its four native subclasses (`TypeError`, `RangeError`,
//! `ReferenceError`, `SyntaxError`) share one constructor behavior
//! parameterized by which prototype to attach, matching §20.5.6.1's
//! `NativeError` constructor table. `AggregateError`/`URIError`/`EvalError`
//! are non-goals — this evaluator only ever throws the other five kinds
//! itself.

use std::cell::RefCell;

use crate::builtins::ordinary::{create_builtin_function, define_builtin_method};
use crate::ecmascript::abstract_operations::operations_on_objects::create_data_property_or_throw;
use crate::ecmascript::abstract_operations::type_conversion::to_string;
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::types::language::object::{ErrorData, ExoticData, Object, ObjectHeapData};
use crate::ecmascript::types::language::value::Value;
use crate::heap::CreateHeapData;

fn make_error(agent: &RefCell<Agent>, prototype: Option<Object>, kind: &'static str, args: &[Value]) -> JsResult<Value> {
    let message = match args.first() {
        Some(Value::Undefined) | None => None,
        Some(other) => Some(to_string(agent, *other)?),
    };
    let object = {
        let mut a = agent.borrow_mut();
        a.heap.create(ObjectHeapData {
            prototype,
            extensible: true,
            properties: Default::default(),
            exotic: ExoticData::Error(ErrorData { kind, message }),
        })
    };
    create_data_property_or_throw(agent, object, "name", Value::from(static_jsstring(agent, kind)))?;
    if let Some(message) = message {
        create_data_property_or_throw(agent, object, "message", Value::String(message))?;
    }
    Ok(Value::Object(object))
}

fn static_jsstring(_agent: &RefCell<Agent>, s: &'static str) -> crate::ecmascript::types::language::string::JsString {
    crate::ecmascript::types::language::string::JsString::from_static_str(s)
}

macro_rules! native_error_constructor {
    ($fn_name:ident, $kind:literal, $intrinsic:ident) => {
        fn $fn_name(agent: &RefCell<Agent>, _this: Value, args: &[Value]) -> JsResult<Value> {
            let prototype = {
                let a = agent.borrow();
                a.current_realm().intrinsics().$intrinsic
            };
            make_error(agent, prototype, $kind, args)
        }
    };
}

native_error_constructor!(error_constructor, "Error", error_prototype);
native_error_constructor!(type_error_constructor, "TypeError", type_error_prototype);
native_error_constructor!(range_error_constructor, "RangeError", range_error_prototype);
native_error_constructor!(reference_error_constructor, "ReferenceError", reference_error_prototype);
native_error_constructor!(syntax_error_constructor, "SyntaxError", syntax_error_prototype);

/// ### [20.5.3.4 Error.prototype.toString ( )](https://tc39.es/ecma262/#sec-error.prototype.tostring)
fn error_to_string(agent: &RefCell<Agent>, this: Value, _args: &[Value]) -> JsResult<Value> {
    let name = crate::ecmascript::abstract_operations::operations_on_objects::get(agent, as_object(agent, this)?, "name")?;
    let name = match name {
        Value::Undefined => "Error".to_owned(),
        other => to_string(agent, other)?.as_str(&agent.borrow().heap).to_owned(),
    };
    let message = crate::ecmascript::abstract_operations::operations_on_objects::get(agent, as_object(agent, this)?, "message")?;
    let message = match message {
        Value::Undefined => std::string::String::new(),
        other => to_string(agent, other)?.as_str(&agent.borrow().heap).to_owned(),
    };
    let joined = if message.is_empty() {
        name
    } else {
        format!("{name}: {message}")
    };
    let joined = {
        let mut a = agent.borrow_mut();
        a.heap.create(joined)
    };
    Ok(Value::String(joined))
}

fn as_object(agent: &RefCell<Agent>, value: Value) -> JsResult<Object> {
    value.as_object().ok_or_else(|| {
        agent.borrow_mut().throw_exception_with_static_message(
            crate::ecmascript::execution::agent::ExceptionType::TypeError,
            "Error.prototype.toString requires an object receiver",
        )
    })
}

/// Builds one `NativeError.prototype` (20.5.6.3): an ordinary object
/// chaining to `%Error.prototype%` with its own `"name"` data property,
/// *not* `error_prototype` itself — sharing that one object across subtypes
/// is what made `new RangeError() instanceof TypeError` true.
fn install_native_error_prototype(agent: &RefCell<Agent>, error_prototype: Object, name: &'static str) -> JsResult<Object> {
    let prototype = {
        let mut a = agent.borrow_mut();
        a.heap.create(ObjectHeapData::new_ordinary(Some(error_prototype)))
    };
    create_data_property_or_throw(agent, prototype, "name", Value::from(static_jsstring(agent, name)))?;
    Ok(prototype)
}

/// Builds `Error.prototype`/`Error` and the four native-error subtype
/// prototypes/constructors, called from `builtins::prelude`.
pub fn install(agent: &RefCell<Agent>, object_prototype: Object, function_prototype: Option<Object>) -> JsResult<()> {
    let error_prototype = {
        let mut a = agent.borrow_mut();
        a.heap.create(ObjectHeapData::new_ordinary(Some(object_prototype)))
    };
    define_builtin_method(agent, error_prototype, "toString", 0, error_to_string, function_prototype)?;
    create_data_property_or_throw(agent, error_prototype, "name", Value::from(static_jsstring(agent, "Error")))?;
    create_data_property_or_throw(agent, error_prototype, "message", Value::from(static_jsstring(agent, "")))?;

    {
        let mut a = agent.borrow_mut();
        a.current_realm_mut().intrinsics_mut().error_prototype = Some(error_prototype);
    }

    let type_error_prototype = install_native_error_prototype(agent, error_prototype, "TypeError")?;
    let range_error_prototype = install_native_error_prototype(agent, error_prototype, "RangeError")?;
    let reference_error_prototype = install_native_error_prototype(agent, error_prototype, "ReferenceError")?;
    let syntax_error_prototype = install_native_error_prototype(agent, error_prototype, "SyntaxError")?;
    {
        let mut a = agent.borrow_mut();
        let intrinsics = a.current_realm_mut().intrinsics_mut();
        intrinsics.type_error_prototype = Some(type_error_prototype);
        intrinsics.range_error_prototype = Some(range_error_prototype);
        intrinsics.reference_error_prototype = Some(reference_error_prototype);
        intrinsics.syntax_error_prototype = Some(syntax_error_prototype);
    }

    let error_constructor = create_builtin_function(agent, error_constructor, Some(error_constructor), "Error", 1, function_prototype);
    let type_error_constructor =
        create_builtin_function(agent, type_error_constructor, Some(type_error_constructor), "TypeError", 1, function_prototype);
    let range_error_constructor =
        create_builtin_function(agent, range_error_constructor, Some(range_error_constructor), "RangeError", 1, function_prototype);
    let reference_error_constructor = create_builtin_function(
        agent,
        reference_error_constructor,
        Some(reference_error_constructor),
        "ReferenceError",
        1,
        function_prototype,
    );
    let syntax_error_constructor =
        create_builtin_function(agent, syntax_error_constructor, Some(syntax_error_constructor), "SyntaxError", 1, function_prototype);

    create_data_property_or_throw(agent, error_constructor, "prototype", Value::Object(error_prototype))?;
    create_data_property_or_throw(agent, error_prototype, "constructor", Value::Object(error_constructor))?;
    for (ctor, prototype) in [
        (type_error_constructor, type_error_prototype),
        (range_error_constructor, range_error_prototype),
        (reference_error_constructor, reference_error_prototype),
        (syntax_error_constructor, syntax_error_prototype),
    ] {
        create_data_property_or_throw(agent, ctor, "prototype", Value::Object(prototype))?;
        create_data_property_or_throw(agent, prototype, "constructor", Value::Object(ctor))?;
    }

    let mut a = agent.borrow_mut();
    let intrinsics = a.current_realm_mut().intrinsics_mut();
    intrinsics.error_constructor = Some(error_constructor);
    intrinsics.type_error_constructor = Some(type_error_constructor);
    intrinsics.range_error_constructor = Some(range_error_constructor);
    intrinsics.reference_error_constructor = Some(reference_error_constructor);
    intrinsics.syntax_error_constructor = Some(syntax_error_constructor);
    Ok(())
}
