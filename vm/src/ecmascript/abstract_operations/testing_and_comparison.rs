// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [7.2 Testing and Comparison Operations](https://tc39.es/ecma262/#sec-testing-and-comparison-operations)

use std::cell::RefCell;

use super::type_conversion::{to_number, to_primitive, PreferredType};
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::types::language::value::Value;

/// ### [7.2.4 IsConstructor ( argument )](https://tc39.es/ecma262/#sec-isconstructor)
pub fn is_constructor(agent: &Agent, value: Value) -> bool {
    match value {
        Value::Object(o) => match o.function_data(&agent.heap) {
            Some(f) => f.is_constructor(),
            None => false,
        },
        _ => false,
    }
}

fn is_same_type(x: Value, y: Value) -> bool {
    std::mem::discriminant(&x) == std::mem::discriminant(&y)
}

/// ### [7.2.10 SameValue ( x, y )](https://tc39.es/ecma262/#sec-samevalue)
pub fn same_value(agent: &Agent, x: Value, y: Value) -> bool {
    if !is_same_type(x, y) {
        return false;
    }
    if let (Value::Number(a), Value::Number(b)) = (x, y) {
        if a.is_nan() && b.is_nan() {
            return true;
        }
        if a == 0.0 && b == 0.0 {
            return a.is_sign_positive() == b.is_sign_positive();
        }
        return a == b;
    }
    same_value_non_number(agent, x, y)
}

/// ### [7.2.11 SameValueZero ( x, y )](https://tc39.es/ecma262/#sec-samevaluezero)
pub fn same_value_zero(agent: &Agent, x: Value, y: Value) -> bool {
    if !is_same_type(x, y) {
        return false;
    }
    if let (Value::Number(a), Value::Number(b)) = (x, y) {
        if a.is_nan() && b.is_nan() {
            return true;
        }
        return a == b;
    }
    same_value_non_number(agent, x, y)
}

/// ### [7.2.12 SameValueNonNumber ( x, y )](https://tc39.es/ecma262/#sec-samevaluenonnumber)
fn same_value_non_number(agent: &Agent, x: Value, y: Value) -> bool {
    match (x, y) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::BigInt(a), Value::BigInt(b)) => a.to_num_bigint(&agent.heap) == b.to_num_bigint(&agent.heap),
        (Value::String(a), Value::String(b)) => a.as_str(&agent.heap) == b.as_str(&agent.heap),
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        _ => x == y,
    }
}

/// ### [7.2.13 IsStrictlyEqual ( x, y )](https://tc39.es/ecma262/#sec-strict-equality-comparison)
pub fn is_strictly_equal(agent: &Agent, x: Value, y: Value) -> bool {
    if !is_same_type(x, y) {
        return false;
    }
    if let (Value::Number(a), Value::Number(b)) = (x, y) {
        return a == b;
    }
    same_value_non_number(agent, x, y)
}

/// ### [7.2.14 IsLooselyEqual ( x, y )](https://tc39.es/ecma262/#sec-abstract-equality-comparison)
pub fn is_loosely_equal(agent: &RefCell<Agent>, x: Value, y: Value) -> JsResult<bool> {
    if is_same_type(x, y) {
        return Ok(is_strictly_equal(&agent.borrow(), x, y));
    }
    match (x, y) {
        (Value::Null, Value::Undefined) | (Value::Undefined, Value::Null) => Ok(true),
        (Value::Number(_), Value::String(_)) => {
            let ny = to_number(agent, y)?;
            Ok(is_strictly_equal(&agent.borrow(), x, Value::Number(ny)))
        }
        (Value::String(_), Value::Number(_)) => {
            let nx = to_number(agent, x)?;
            Ok(is_strictly_equal(&agent.borrow(), Value::Number(nx), y))
        }
        (Value::BigInt(a), Value::String(s)) => {
            let text = { let ag = agent.borrow(); s.as_str(&ag.heap).trim().to_owned() };
            match text.parse::<i64>() {
                Ok(n) => Ok(a.to_num_bigint(&agent.borrow().heap) == num_bigint::BigInt::from(n)),
                Err(_) => Ok(false),
            }
        }
        (Value::String(_), Value::BigInt(_)) => is_loosely_equal(agent, y, x),
        (Value::Boolean(b), _) => {
            let nx = Value::Number(if b { 1.0 } else { 0.0 });
            is_loosely_equal(agent, nx, y)
        }
        (_, Value::Boolean(b)) => {
            let ny = Value::Number(if b { 1.0 } else { 0.0 });
            is_loosely_equal(agent, x, ny)
        }
        (Value::Number(_) | Value::String(_) | Value::BigInt(_) | Value::Symbol(_), Value::Object(_)) => {
            let py = to_primitive(agent, y, PreferredType::Default)?;
            is_loosely_equal(agent, x, py)
        }
        (Value::Object(_), Value::Number(_) | Value::String(_) | Value::BigInt(_) | Value::Symbol(_)) => {
            let px = to_primitive(agent, x, PreferredType::Default)?;
            is_loosely_equal(agent, px, y)
        }
        (Value::BigInt(a), Value::Number(b)) | (Value::Number(b), Value::BigInt(a)) => {
            if b.is_nan() || b.is_infinite() || b.fract() != 0.0 {
                return Ok(false);
            }
            Ok(a.to_num_bigint(&agent.borrow().heap) == num_bigint::BigInt::from(b as i64))
        }
        _ => Ok(false),
    }
}

/// ### [7.2.15 IsLessThan ( x, y, LeftFirst )](https://tc39.es/ecma262/#sec-islessthan)
///
/// Only the already-left-to-right-evaluated-operands shape is needed here:
/// syntax-directed evaluation of `<`/`>`/`<=`/`>=` evaluates both operands to
/// values before calling this, so there's no `LeftFirst` flag to thread
/// through a second round of `ToPrimitive` side effects.
pub fn is_less_than(agent: &RefCell<Agent>, x: Value, y: Value) -> JsResult<Option<bool>> {
    let px = to_primitive(agent, x, PreferredType::Number)?;
    let py = to_primitive(agent, y, PreferredType::Number)?;
    if let (Value::String(sx), Value::String(sy)) = (px, py) {
        let a = agent.borrow();
        return Ok(Some(sx.as_str(&a.heap) < sy.as_str(&a.heap)));
    }
    if let (Value::BigInt(bx), Value::BigInt(by)) = (px, py) {
        let a = agent.borrow();
        return Ok(Some(bx.to_num_bigint(&a.heap) < by.to_num_bigint(&a.heap)));
    }
    let nx = to_number(agent, px)?;
    let ny = to_number(agent, py)?;
    if nx.is_nan() || ny.is_nan() {
        return Ok(None);
    }
    Ok(Some(nx < ny))
}
