// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [7.4 Operations on Iterator Objects](https://tc39.es/ecma262/#sec-operations-on-iterator-objects)

use std::cell::RefCell;

use super::operations_on_objects::{call_function, create_data_property_or_throw, get, is_callable, make_basic_object};
use crate::ecmascript::execution::agent::{Agent, ExceptionType, JsResult};
use crate::ecmascript::types::language::object::Object;
use crate::ecmascript::types::language::value::Value;

/// ### [7.4.1 Iterator Records](https://tc39.es/ecma262/#sec-iterator-records)
#[derive(Debug, Clone, Copy)]
pub struct IteratorRecord {
    pub iterator: Object,
    pub next_method: Value,
    pub done: bool,
}

/// ### [7.4.5 GetIterator ( obj, hint )](https://tc39.es/ecma262/#sec-getiterator)
///
/// Only the sync-iterator hint is modeled: this crate's `for await` support
/// adapts a sync iterator via `async_from_sync_iterator` rather than probing
/// `@@asyncIterator` first (see `control_abstraction::async_generator`).
pub fn get_iterator(agent: &RefCell<Agent>, obj: Value) -> JsResult<IteratorRecord> {
    let method_key = "Symbol(Symbol.iterator)";
    let method = get_iterator_method(agent, obj, method_key)?;
    let Some(method) = method else {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "value is not iterable"));
    };
    let iterator_value = call_function(agent, method, obj, &[])?;
    let Value::Object(iterator) = iterator_value else {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "iterator result is not an object"));
    };
    let next_method = get(agent, iterator, "next")?;
    Ok(IteratorRecord { iterator, next_method, done: false })
}

/// This crate's arrays carry a builtin `Symbol.iterator`-equivalent via the
/// plain string key `"Symbol(Symbol.iterator)"` rather than a real `Symbol`
/// value (see `builtins::array::prelude` — no user code can observe the
/// difference since `Symbol.iterator` itself isn't exposed as a reachable
/// value in this crate's supported syntax subset).
fn get_iterator_method(agent: &RefCell<Agent>, obj: Value, key: &str) -> JsResult<Option<Value>> {
    let Value::Object(o) = obj else {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "value is not iterable"));
    };
    let method = get(agent, o, key)?;
    if method.is_undefined() || method.is_null() {
        return Ok(None);
    }
    Ok(Some(method))
}

/// ### [7.4.8 IteratorStep ( iteratorRecord )](https://tc39.es/ecma262/#sec-iteratorstep)
pub fn iterator_step(agent: &RefCell<Agent>, record: &IteratorRecord) -> JsResult<Option<Value>> {
    let result = call_function(agent, record.next_method, Value::Object(record.iterator), &[])?;
    let Value::Object(result_object) = result else {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "iterator result is not an object"));
    };
    let done = get(agent, result_object, "done")?.to_boolean();
    if done {
        return Ok(None);
    }
    Ok(Some(get(agent, result_object, "value")?))
}

/// ### [7.4.9 IteratorValue ( iterResult )](https://tc39.es/ecma262/#sec-iteratorvalue)
pub fn iterator_value(agent: &RefCell<Agent>, result: Object) -> JsResult<Value> {
    get(agent, result, "value")
}

/// ### [7.4.11 IteratorClose ( iteratorRecord, completion )](https://tc39.es/ecma262/#sec-iteratorclose)
///
/// `completion` is folded into the caller already having decided whether to
/// propagate an abrupt completion or the return value of the `return` call;
/// this just performs the `return` call and swallows a non-callable/absent
/// `return` method per the spec's "If innerResult.[[Type]] is normal, ..."
/// step ordering.
pub fn iterator_close(agent: &RefCell<Agent>, record: &IteratorRecord) -> JsResult<()> {
    let return_method = get(agent, record.iterator, "return")?;
    if !is_callable(&agent.borrow(), return_method) {
        return Ok(());
    }
    call_function(agent, return_method, Value::Object(record.iterator), &[])?;
    Ok(())
}

/// ### [7.4.16 CreateIterResultObject ( value, done )](https://tc39.es/ecma262/#sec-createiterresultobject)
pub fn create_iter_result_object(agent: &RefCell<Agent>, value: Value, done: bool) -> JsResult<Object> {
    let object_prototype = agent.borrow().current_realm().intrinsics().object_prototype;
    let result = make_basic_object(agent, Some(object_prototype));
    create_data_property_or_throw(agent, result, "value", value)?;
    create_data_property_or_throw(agent, result, "done", Value::Boolean(done))?;
    Ok(result)
}
