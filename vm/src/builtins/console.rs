// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The host-provided `console` object. Not part of the ECMAScript
//! specification proper (§6 WHATWG console), grounded on the
//! [`boa`](https://github.com/boa-dev/boa) engine's `console` builtin but
//! trimmed to the handful of methods this crate's supported syntax subset
//! exercises — `log`/`info`/`warn`/`error`, all writing to stdout/stderr
//! rather than maintaining a group/indent/timer state table.

use std::cell::RefCell;

use crate::ecmascript::abstract_operations::type_conversion::{number_to_string_radix10, to_string};
use crate::ecmascript::execution::agent::{Agent, ConsoleStream, JsResult};
use crate::ecmascript::types::language::object::{ExoticData, Object};
use crate::ecmascript::types::language::value::Value;

/// Formats a value the way `console.log` displays its *top-level* arguments:
/// strings print without quotes (unlike `JSON.stringify` or the `%o`
/// inspector format other engines use for nested values). This crate has no
/// circular-reference-aware inspector, so nested objects just print their
/// own `toString`.
fn display_value(agent: &RefCell<Agent>, value: Value) -> JsResult<std::string::String> {
    Ok(match value {
        Value::String(s) => s.as_str(&agent.borrow().heap).to_owned(),
        Value::Number(n) => number_to_string_radix10(n),
        Value::Boolean(b) => if b { "true" } else { "false" }.to_owned(),
        Value::Undefined => "undefined".to_owned(),
        Value::Null => "null".to_owned(),
        Value::BigInt(b) => format!("{}n", b.to_num_bigint(&agent.borrow().heap)),
        Value::Symbol(_) => "Symbol()".to_owned(),
        Value::Object(o) => display_object(agent, o)?,
    })
}

fn display_object(agent: &RefCell<Agent>, object: Object) -> JsResult<std::string::String> {
    let is_array = matches!(&agent.borrow().heap[object.0].exotic, ExoticData::Array(_));
    if is_array {
        let length = crate::ecmascript::abstract_operations::operations_on_objects::get(agent, object, "length")?;
        let length = match length {
            Value::Number(n) => n as u32,
            _ => 0,
        };
        let mut parts = Vec::with_capacity(length as usize);
        for i in 0..length {
            let element = crate::ecmascript::abstract_operations::operations_on_objects::get(agent, object, &i.to_string())?;
            parts.push(display_value(agent, element)?);
        }
        return Ok(format!("[ {} ]", parts.join(", ")));
    }
    let stringified = to_string(agent, Value::Object(object))?;
    Ok(stringified.as_str(&agent.borrow().heap).to_owned())
}

fn join_args(agent: &RefCell<Agent>, args: &[Value]) -> JsResult<std::string::String> {
    let mut parts = Vec::with_capacity(args.len());
    for arg in args {
        parts.push(display_value(agent, *arg)?);
    }
    Ok(parts.join(" "))
}

fn write_line(agent: &RefCell<Agent>, stream: ConsoleStream, line: &str) {
    agent.borrow().console_host().write_line(stream, line);
}

pub fn console_log(agent: &RefCell<Agent>, _this: Value, args: &[Value]) -> JsResult<Value> {
    let line = join_args(agent, args)?;
    write_line(agent, ConsoleStream::Out, &line);
    Ok(Value::Undefined)
}

pub fn console_info(agent: &RefCell<Agent>, _this: Value, args: &[Value]) -> JsResult<Value> {
    let line = join_args(agent, args)?;
    write_line(agent, ConsoleStream::Out, &line);
    Ok(Value::Undefined)
}

pub fn console_warn(agent: &RefCell<Agent>, _this: Value, args: &[Value]) -> JsResult<Value> {
    let line = join_args(agent, args)?;
    write_line(agent, ConsoleStream::Err, &line);
    Ok(Value::Undefined)
}

pub fn console_error(agent: &RefCell<Agent>, _this: Value, args: &[Value]) -> JsResult<Value> {
    let line = join_args(agent, args)?;
    write_line(agent, ConsoleStream::Err, &line);
    Ok(Value::Undefined)
}
