// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [20.2 Function Objects](https://tc39.es/ecma262/#sec-function-objects)
//!
//! `Function.prototype`'s own methods. `Function`'s own constructor (dynamic
//! `new Function(...)`) is out of scope — see DESIGN.md's eval/dynamic-code
//! decision.

use std::cell::RefCell;

use crate::builtins::ordinary::define_builtin_method;
use crate::ecmascript::abstract_operations::operations_on_objects::{call_function, get, is_callable};
use crate::ecmascript::execution::agent::{Agent, ExceptionType, JsResult};
use crate::ecmascript::types::language::function::{BoundFunctionData, FunctionData};
use crate::ecmascript::types::language::object::{ExoticData, Object, ObjectHeapData};
use crate::ecmascript::types::language::value::Value;
use crate::heap::CreateHeapData;

/// ### [20.2.3.3 Function.prototype.call ( thisArg, ...args )](https://tc39.es/ecma262/#sec-function.prototype.call)
fn function_call(agent: &RefCell<Agent>, this: Value, args: &[Value]) -> JsResult<Value> {
    let this_arg = args.first().copied().unwrap_or(Value::Undefined);
    let rest = args.get(1..).unwrap_or(&[]);
    call_function(agent, this, this_arg, rest)
}

/// ### [20.2.3.1 Function.prototype.apply ( thisArg, argArray )](https://tc39.es/ecma262/#sec-function.prototype.apply)
fn function_apply(agent: &RefCell<Agent>, this: Value, args: &[Value]) -> JsResult<Value> {
    let this_arg = args.first().copied().unwrap_or(Value::Undefined);
    let arg_array = args.get(1).copied().unwrap_or(Value::Undefined);
    let spread = match arg_array {
        Value::Undefined | Value::Null => Vec::new(),
        Value::Object(array) => create_list_from_array_like(agent, array)?,
        _ => {
            return Err(agent
                .borrow_mut()
                .throw_exception_with_static_message(ExceptionType::TypeError, "CreateListFromArrayLike called on non-object"))
        }
    };
    call_function(agent, this, this_arg, &spread)
}

fn create_list_from_array_like(agent: &RefCell<Agent>, array_like: Object) -> JsResult<Vec<Value>> {
    let length = get(agent, array_like, "length")?;
    let length = match length {
        Value::Number(n) if n.is_finite() && n >= 0.0 => n as u32,
        _ => 0,
    };
    let mut out = Vec::with_capacity(length as usize);
    for i in 0..length {
        out.push(get(agent, array_like, &i.to_string())?);
    }
    Ok(out)
}

/// ### [20.2.3.2 Function.prototype.bind ( thisArg, ...args )](https://tc39.es/ecma262/#sec-function.prototype.bind)
fn function_bind(agent: &RefCell<Agent>, this: Value, args: &[Value]) -> JsResult<Value> {
    let Value::Object(target) = this else {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Bind must be called on a function"));
    };
    if !is_callable(&agent.borrow(), this) {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Bind must be called on a function"));
    }
    let bound_this = args.first().copied().unwrap_or(Value::Undefined);
    let bound_args = args.get(1..).unwrap_or(&[]).to_vec();
    let function_prototype = {
        let a = agent.borrow();
        a.current_realm().intrinsics().function_prototype
    };
    let bound = {
        let mut a = agent.borrow_mut();
        a.heap.create(ObjectHeapData {
            prototype: function_prototype,
            extensible: true,
            properties: Default::default(),
            exotic: ExoticData::Function(FunctionData::Bound(BoundFunctionData {
                target,
                bound_this,
                bound_args,
            })),
        })
    };
    Ok(Value::Object(bound))
}

/// Installs `call`/`apply`/`bind` onto `Function.prototype`, called from
/// `builtins::prelude` once the prototype object itself exists.
pub fn install(agent: &RefCell<Agent>, function_prototype: Object) -> JsResult<()> {
    define_builtin_method(agent, function_prototype, "call", 1, function_call, function_prototype.into())?;
    define_builtin_method(agent, function_prototype, "apply", 2, function_apply, function_prototype.into())?;
    define_builtin_method(agent, function_prototype, "bind", 1, function_bind, function_prototype.into())?;
    Ok(())
}
