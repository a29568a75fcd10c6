// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [23.1 Array Objects](https://tc39.es/ecma262/#sec-array-objects)
//!
//! Exotic `[[DefineOwnProperty]]`/length-tracking behavior is already
//! implemented in `object::internal_methods::array_create`/`insert_own_property`;
//! the iterator-protocol shape here is adapted to a
//! `NativeFn` (`fn` pointer, no captured state) builtin model: the iterator's
//! `[[IteratedArrayLike]]`/`[[ArrayLikeNextIndex]]` internal slots are stored
//! as the iterator object's own `"array"`/`"index"` properties instead of a
//! dedicated exotic payload, since nothing outside this module ever needs to
//! see them.

use std::cell::RefCell;

use crate::builtins::ordinary::define_builtin_method;
use crate::ecmascript::abstract_operations::operations_on_iterator_objects::create_iter_result_object;
use crate::ecmascript::abstract_operations::operations_on_objects::{
    create_data_property_or_throw, get, make_basic_object, set,
};
use crate::ecmascript::execution::agent::{Agent, ExceptionType, JsResult};
use crate::ecmascript::types::language::object::internal_methods::array_create;
use crate::ecmascript::types::language::object::Object;
use crate::ecmascript::types::language::value::Value;

/// ### [23.1.1.1 Array ( ...values )](https://tc39.es/ecma262/#sec-array)
fn array_constructor(agent: &RefCell<Agent>, _this: Value, args: &[Value]) -> JsResult<Value> {
    let array_prototype = {
        let a = agent.borrow();
        a.current_realm().intrinsics().array_prototype
    };
    if let [Value::Number(n)] = args {
        if *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64 {
            let mut a = agent.borrow_mut();
            let array = array_create(&mut a, *n as u32, array_prototype);
            return Ok(Value::Object(array));
        }
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::RangeError, "Invalid array length"));
    }
    let array = {
        let mut a = agent.borrow_mut();
        array_create(&mut a, 0, array_prototype)
    };
    for (i, value) in args.iter().enumerate() {
        create_data_property_or_throw(agent, array, &i.to_string(), *value)?;
    }
    Ok(Value::Object(array))
}

fn array_length(agent: &RefCell<Agent>, array: Object) -> JsResult<u32> {
    match get(agent, array, "length")? {
        Value::Number(n) => Ok(n as u32),
        _ => Ok(0),
    }
}

/// ### [23.1.3.21 Array.prototype.push ( ...items )](https://tc39.es/ecma262/#sec-array.prototype.push)
fn array_push(agent: &RefCell<Agent>, this: Value, args: &[Value]) -> JsResult<Value> {
    let Value::Object(array) = this else {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Array.prototype.push called on non-object"));
    };
    let mut length = array_length(agent, array)?;
    for value in args {
        create_data_property_or_throw(agent, array, &length.to_string(), *value)?;
        length += 1;
    }
    set(agent, array, "length", Value::from(length as f64), true)?;
    Ok(Value::from(length as f64))
}

/// ### [23.1.3.16 Array.prototype.join ( separator )](https://tc39.es/ecma262/#sec-array.prototype.join)
fn array_join(agent: &RefCell<Agent>, this: Value, args: &[Value]) -> JsResult<Value> {
    let Value::Object(array) = this else {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Array.prototype.join called on non-object"));
    };
    let separator = match args.first() {
        Some(Value::Undefined) | None => ",".to_owned(),
        Some(other) => crate::ecmascript::abstract_operations::type_conversion::to_string(agent, *other)?
            .as_str(&agent.borrow().heap)
            .to_owned(),
    };
    let length = array_length(agent, array)?;
    let mut parts = Vec::with_capacity(length as usize);
    for i in 0..length {
        let element = get(agent, array, &i.to_string())?;
        parts.push(match element {
            Value::Undefined | Value::Null => std::string::String::new(),
            other => crate::ecmascript::abstract_operations::type_conversion::to_string(agent, other)?
                .as_str(&agent.borrow().heap)
                .to_owned(),
        });
    }
    let joined = parts.join(&separator);
    let joined = {
        let mut a = agent.borrow_mut();
        a.heap.create(joined)
    };
    Ok(Value::String(joined))
}

/// ### [23.1.5.1 CreateArrayIterator ( array, kind )](https://tc39.es/ecma262/#sec-createarrayiterator)
///
/// Only "values" iteration (the `for...of`/spread-relevant kind) is
/// implemented; `entries`/`keys` are non-goals for this crate's supported
/// syntax subset.
fn array_values(agent: &RefCell<Agent>, this: Value, _args: &[Value]) -> JsResult<Value> {
    let Value::Object(array) = this else {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Array iteration called on non-object"));
    };
    let iterator_prototype = {
        let a = agent.borrow();
        a.current_realm().intrinsics().iterator_prototype
    };
    let iterator = make_basic_object(agent, iterator_prototype);
    create_data_property_or_throw(agent, iterator, "array", Value::Object(array))?;
    create_data_property_or_throw(agent, iterator, "index", Value::from(0.0))?;
    let next_prototype = {
        let a = agent.borrow();
        a.current_realm().intrinsics().object_prototype
    };
    define_builtin_method(agent, iterator, "next", 0, array_iterator_next, Some(next_prototype))?;
    Ok(Value::Object(iterator))
}

fn array_iterator_next(agent: &RefCell<Agent>, this: Value, _args: &[Value]) -> JsResult<Value> {
    let Value::Object(iterator) = this else {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "not an array iterator"));
    };
    let Value::Object(array) = get(agent, iterator, "array")? else {
        return create_iter_result_object(agent, Value::Undefined, true).map(Value::Object);
    };
    let index = match get(agent, iterator, "index")? {
        Value::Number(n) => n as u32,
        _ => 0,
    };
    let length = array_length(agent, array)?;
    if index >= length {
        return create_iter_result_object(agent, Value::Undefined, true).map(Value::Object);
    }
    let value = get(agent, array, &index.to_string())?;
    set(agent, iterator, "index", Value::from((index + 1) as f64), true)?;
    create_iter_result_object(agent, value, false).map(Value::Object)
}

/// Installs `Array.prototype`'s own methods and the well-known
/// `[Symbol.iterator]` entry (see `operations_on_iterator_objects`'s note on
/// why this crate keys it by a plain string instead of a real `Symbol`),
/// called from `builtins::prelude` once the prototype object itself exists.
pub fn install(agent: &RefCell<Agent>, array_prototype: Object, function_prototype: Option<Object>) -> JsResult<()> {
    define_builtin_method(agent, array_prototype, "push", 1, array_push, function_prototype)?;
    define_builtin_method(agent, array_prototype, "join", 1, array_join, function_prototype)?;
    define_builtin_method(agent, array_prototype, "values", 0, array_values, function_prototype)?;
    let iterator_method = get(agent, array_prototype, "values")?;
    create_data_property_or_throw(agent, array_prototype, "Symbol(Symbol.iterator)", iterator_method)?;
    Ok(())
}

pub use array_constructor as constructor;
