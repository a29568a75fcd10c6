// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.3 Built-in Function Objects](https://tc39.es/ecma262/#sec-built-in-function-objects)
//!
//! Every intrinsic method/constructor this crate exposes is built through
//! `create_builtin_function` rather than each `builtins::*` module
//! hand-assembling `ObjectHeapData`,
//! matching §9.3.2's "a realm's intrinsics are produced by repeated calls to
//! a handful of creation abstract operations" shape.

use std::cell::RefCell;

use crate::ecmascript::abstract_operations::operations_on_objects::create_data_property_or_throw;
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::types::language::function::{BuiltinFunctionData, FunctionData, NativeFn};
use crate::ecmascript::types::language::object::{ExoticData, Object, ObjectHeapData};
use crate::ecmascript::types::language::value::Value;
use crate::heap::CreateHeapData;

/// ### [10.3.3 CreateBuiltinFunction ( behaviour, length, name, ... )](https://tc39.es/ecma262/#sec-createbuiltinfunction)
pub fn create_builtin_function(
    agent: &RefCell<Agent>,
    behavior: NativeFn,
    construct_behavior: Option<NativeFn>,
    name: &'static str,
    length: u32,
    function_prototype: Option<Object>,
) -> Object {
    let function = {
        let mut a = agent.borrow_mut();
        a.heap.create(ObjectHeapData {
            prototype: function_prototype,
            extensible: true,
            properties: Default::default(),
            exotic: ExoticData::Function(FunctionData::Builtin(BuiltinFunctionData {
                name,
                length,
                behavior,
                construct_behavior,
            })),
        })
    };
    // `name`/`length` are also exposed as real (non-enumerable, in a fuller
    // implementation) own properties per 10.3.3 steps 7-8; this crate's
    // `PartialPropertyDescriptor::new_data` always creates enumerable ones,
    // which is good enough for the `Function.prototype.toString`-free subset
    // of the language this crate supports.
    let _ = create_data_property_or_throw(agent, function, "name", Value::from(string_of(agent, name)));
    let _ = create_data_property_or_throw(agent, function, "length", Value::from(length as f64));
    function
}

fn string_of(agent: &RefCell<Agent>, s: &str) -> crate::ecmascript::types::language::string::JsString {
    let mut a = agent.borrow_mut();
    a.heap.create(s.to_owned())
}

/// Defines a non-enumerable-in-spirit (see [`create_builtin_function`]'s
/// note) data property whose value is a freshly built builtin function —
/// the pattern every `builtins::*::install` function uses to populate a
/// prototype object.
pub fn define_builtin_method(
    agent: &RefCell<Agent>,
    object: Object,
    name: &'static str,
    length: u32,
    behavior: NativeFn,
    function_prototype: Option<Object>,
) -> JsResult<()> {
    let function = create_builtin_function(agent, behavior, None, name, length, function_prototype);
    create_data_property_or_throw(agent, object, name, Value::Object(function))
}
