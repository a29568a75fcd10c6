// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [7.1 Type Conversion](https://tc39.es/ecma262/#sec-type-conversion)

use std::cell::RefCell;

use super::operations_on_objects::call_function;
use crate::ecmascript::execution::agent::{Agent, ExceptionType, JsResult};
use crate::ecmascript::types::language::bigint::BigInt;
use crate::ecmascript::types::language::object::property_key::PropertyKey;
use crate::ecmascript::types::language::object::{ExoticData, Object, ObjectHeapData};
use crate::ecmascript::types::language::string::JsString;
use crate::ecmascript::types::language::symbol::{Symbol, WellKnownSymbol};
use crate::ecmascript::types::language::value::Value;
use crate::heap::CreateHeapData;

/// ### [7.1.1 ToPrimitive ( input \[ , preferredType \] )](https://tc39.es/ecma262/#sec-toprimitive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    Default,
    String,
    Number,
}

pub fn to_primitive(agent: &RefCell<Agent>, input: Value, preferred_type: PreferredType) -> JsResult<Value> {
    let Value::Object(object) = input else {
        return Ok(input);
    };
    let exotic_to_prim = get_symbol_method(agent, object, WellKnownSymbol::ToStringTag)?;
    if let Some(exotic_to_prim) = exotic_to_prim {
        let hint = match preferred_type {
            PreferredType::Default => "default",
            PreferredType::String => "string",
            PreferredType::Number => "number",
        };
        let hint = {
            let mut a = agent.borrow_mut();
            Value::String(a.heap.create(hint.to_owned()))
        };
        let result = call_function(agent, exotic_to_prim, Value::Object(object), &[hint])?;
        if !result.is_object() {
            return Ok(result);
        }
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Cannot convert object to primitive value"));
    }
    let method_names: [&'static str; 2] = match preferred_type {
        PreferredType::String => ["toString", "valueOf"],
        PreferredType::Number | PreferredType::Default => ["valueOf", "toString"],
    };
    for name in method_names {
        let key = PropertyKey::from_static_str(name);
        let method = super::operations_on_objects::get_property(agent, object, &key)?;
        let is_callable = matches!(method, Value::Object(o) if o.is_callable(&agent.borrow().heap));
        if is_callable {
            let result = call_function(agent, method, Value::Object(object), &[])?;
            if !result.is_object() {
                return Ok(result);
            }
        }
    }
    Err(agent
        .borrow_mut()
        .throw_exception_with_static_message(ExceptionType::TypeError, "Cannot convert object to primitive value"))
}

fn get_symbol_method(agent: &RefCell<Agent>, object: Object, symbol: WellKnownSymbol) -> JsResult<Option<Value>> {
    // This crate's supported syntax subset never lets user code override
    // `Symbol.toPrimitive` (no `Symbol` registry entry is pre-populated for
    // it), so the exotic conversion path is always absent.
    let _ = (agent, object, symbol);
    Ok(None)
}

/// ### [7.1.2 ToBoolean ( argument )](https://tc39.es/ecma262/#sec-toboolean)
pub fn to_boolean(value: Value) -> bool {
    value.to_boolean()
}

/// ### [7.1.4 ToNumber ( argument )](https://tc39.es/ecma262/#sec-tonumber)
pub fn to_number(agent: &RefCell<Agent>, value: Value) -> JsResult<f64> {
    match value {
        Value::Number(n) => Ok(n),
        Value::Undefined => Ok(f64::NAN),
        Value::Null => Ok(0.0),
        Value::Boolean(b) => Ok(if b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            let a = agent.borrow();
            Ok(string_to_number(s.as_str(&a.heap)))
        }
        Value::BigInt(_) => Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Cannot convert a BigInt to a number")),
        Value::Symbol(_) => Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Cannot convert a Symbol to a number")),
        Value::Object(_) => {
            let primitive = to_primitive(agent, value, PreferredType::Number)?;
            to_number(agent, primitive)
        }
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(|c: char| c.is_whitespace());
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).map(|n| n as f64).unwrap_or(f64::NAN);
    }
    if let Some(oct) = trimmed.strip_prefix("0o").or_else(|| trimmed.strip_prefix("0O")) {
        return i64::from_str_radix(oct, 8).map(|n| n as f64).unwrap_or(f64::NAN);
    }
    if let Some(bin) = trimmed.strip_prefix("0b").or_else(|| trimmed.strip_prefix("0B")) {
        return i64::from_str_radix(bin, 2).map(|n| n as f64).unwrap_or(f64::NAN);
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
    }
}

/// ### [6.1.6.1.20 Number::toString ( x, radix )](https://tc39.es/ecma262/#sec-numeric-types-number-tostring), radix 10 case
pub fn number_to_string_radix10(n: f64) -> std::string::String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n == 0.0 {
        return "0".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity".to_owned() } else { "-Infinity".to_owned() };
    }
    let mut buffer = ryu_js::Buffer::new();
    buffer.format(n).to_owned()
}

/// ### [7.1.17 ToString ( argument )](https://tc39.es/ecma262/#sec-tostring)
pub fn to_string(agent: &RefCell<Agent>, value: Value) -> JsResult<JsString> {
    match value {
        Value::String(s) => Ok(s),
        Value::Undefined => Ok(JsString::from_static_str("undefined")),
        Value::Null => Ok(JsString::from_static_str("null")),
        Value::Boolean(b) => Ok(JsString::from_static_str(if b { "true" } else { "false" })),
        Value::Number(n) => {
            let text = number_to_string_radix10(n);
            let mut a = agent.borrow_mut();
            Ok(a.heap.create(text))
        }
        Value::BigInt(b) => {
            let mut a = agent.borrow_mut();
            let text = b.to_num_bigint(&a.heap).to_string();
            Ok(a.heap.create(text))
        }
        Value::Symbol(_) => Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Cannot convert a Symbol to a string")),
        Value::Object(_) => {
            let primitive = to_primitive(agent, value, PreferredType::String)?;
            to_string(agent, primitive)
        }
    }
}

/// ### [7.1.18 ToObject ( argument )](https://tc39.es/ecma262/#sec-toobject)
pub fn to_object(agent: &RefCell<Agent>, value: Value) -> JsResult<Object> {
    match value {
        Value::Object(o) => Ok(o),
        Value::Undefined | Value::Null => Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Cannot convert undefined or null to object")),
        Value::Boolean(b) => {
            let prototype = agent.borrow().current_realm().intrinsics().boolean_prototype;
            let mut a = agent.borrow_mut();
            Ok(a.heap.create(ObjectHeapData {
                prototype,
                extensible: true,
                properties: Default::default(),
                exotic: ExoticData::BooleanWrapper(b),
            }))
        }
        Value::Number(n) => {
            let prototype = agent.borrow().current_realm().intrinsics().number_prototype;
            let mut a = agent.borrow_mut();
            Ok(a.heap.create(ObjectHeapData {
                prototype,
                extensible: true,
                properties: Default::default(),
                exotic: ExoticData::NumberWrapper(n),
            }))
        }
        Value::String(s) => {
            let prototype = agent.borrow().current_realm().intrinsics().string_prototype;
            let mut a = agent.borrow_mut();
            Ok(a.heap.create(ObjectHeapData {
                prototype,
                extensible: true,
                properties: Default::default(),
                exotic: ExoticData::StringWrapper(s),
            }))
        }
        Value::BigInt(_) | Value::Symbol(_) => Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Cannot wrap this value in an object")),
    }
}

/// ### [7.1.19 ToPropertyKey ( argument )](https://tc39.es/ecma262/#sec-topropertykey)
pub fn to_property_key(agent: &RefCell<Agent>, value: Value) -> JsResult<PropertyKey> {
    if let Value::Symbol(s) = value {
        return Ok(PropertyKey::Symbol(s));
    }
    Ok(PropertyKey::String(to_string(agent, value)?))
}

/// ### [7.1.6 ToInt32 ( argument )](https://tc39.es/ecma262/#sec-toint32)
pub fn to_int32(agent: &RefCell<Agent>, value: Value) -> JsResult<i32> {
    let n = to_number(agent, value)?;
    Ok(to_int32_from_f64(n))
}

pub fn to_int32_from_f64(n: f64) -> i32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    let n = n.trunc();
    let modulo = n.rem_euclid(4294967296.0);
    if modulo >= 2147483648.0 {
        (modulo - 4294967296.0) as i32
    } else {
        modulo as i32
    }
}

/// ### [7.1.7 ToUint32 ( argument )](https://tc39.es/ecma262/#sec-touint32)
pub fn to_uint32(agent: &RefCell<Agent>, value: Value) -> JsResult<u32> {
    let n = to_number(agent, value)?;
    if !n.is_finite() || n == 0.0 {
        return Ok(0);
    }
    Ok(n.trunc().rem_euclid(4294967296.0) as u32)
}

/// ### [7.1.5 ToIntegerOrInfinity ( argument )](https://tc39.es/ecma262/#sec-tointegerorinfinity)
pub fn to_integer_or_infinity(agent: &RefCell<Agent>, value: Value) -> JsResult<f64> {
    let n = to_number(agent, value)?;
    if n.is_nan() || n == 0.0 {
        return Ok(0.0);
    }
    if n.is_infinite() {
        return Ok(n);
    }
    Ok(n.trunc())
}

/// ### [7.1.21 ToLength ( argument )](https://tc39.es/ecma262/#sec-tolength)
pub fn to_length(agent: &RefCell<Agent>, value: Value) -> JsResult<u32> {
    let len = to_integer_or_infinity(agent, value)?;
    if len <= 0.0 {
        return Ok(0);
    }
    Ok(len.min(u32::MAX as f64) as u32)
}

/// ### [7.1.13 ToBigInt ( argument )](https://tc39.es/ecma262/#sec-tobigint)
pub fn to_bigint(agent: &RefCell<Agent>, value: Value) -> JsResult<BigInt> {
    match value {
        Value::BigInt(b) => Ok(b),
        Value::Boolean(b) => Ok(BigInt::from_i64(if b { 1 } else { 0 })),
        Value::String(s) => {
            let a = agent.borrow();
            let text = s.as_str(&a.heap).trim();
            text.parse::<i64>()
                .map(BigInt::from_i64)
                .map_err(|_| {
                    drop(a);
                    agent
                        .borrow_mut()
                        .throw_exception_with_static_message(ExceptionType::SyntaxError, "Cannot convert string to a BigInt")
                })
        }
        _ => Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Cannot convert value to a BigInt")),
    }
}

pub fn new_symbol(agent: &RefCell<Agent>, description: Option<std::string::String>) -> Symbol {
    let mut a = agent.borrow_mut();
    let descriptor = description.map(|d| a.heap.create(d));
    a.heap.create(crate::ecmascript::types::language::symbol::SymbolHeapData { descriptor })
}
