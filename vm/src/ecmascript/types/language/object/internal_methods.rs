// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.1 Ordinary Object Internal Methods and Internal Slots](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots)
//!
//! The eleven essential internal methods, implemented directly against
//! `ObjectHeapData`/`PropertyStorage` for ordinary objects and exotic Arrays;
//! Proxy/module-namespace/bound-function exotic behavior is out of scope.

use std::cell::RefCell;

use super::property_key::PropertyKey;
use super::{ArrayData, ExoticData, Object};
use crate::ecmascript::abstract_operations::type_conversion::{to_number, to_uint32};
use crate::ecmascript::execution::agent::{Agent, ExceptionType, JsResult};
use crate::ecmascript::types::language::value::Value;
use crate::ecmascript::types::spec::property_descriptor::{PartialPropertyDescriptor, PropertyDescriptor};

/// ### [10.1.1 \[\[GetPrototypeOf\]\] ( )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-getprototypeof)
pub fn get_prototype_of(agent: &Agent, object: Object) -> Option<Object> {
    agent.heap[object.0].prototype
}

/// ### [10.1.2 \[\[SetPrototypeOf\]\] ( V )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-setprototypeof-v)
pub fn set_prototype_of(agent: &mut Agent, object: Object, prototype: Option<Object>) -> bool {
    if !agent.heap[object.0].extensible {
        return get_prototype_of(agent, object) == prototype;
    }
    // Cycle check: walk the would-be prototype chain looking for `object` itself.
    let mut p = prototype;
    while let Some(candidate) = p {
        if candidate == object {
            return false;
        }
        p = get_prototype_of(agent, candidate);
    }
    agent.heap[object.0].prototype = prototype;
    true
}

/// ### [10.1.3 \[\[IsExtensible\]\] ( )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-isextensible)
pub fn is_extensible(agent: &Agent, object: Object) -> bool {
    agent.heap[object.0].extensible
}

/// ### [10.1.4 \[\[PreventExtensions\]\] ( )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-preventextensions)
pub fn prevent_extensions(agent: &mut Agent, object: Object) -> bool {
    agent.heap[object.0].extensible = false;
    true
}

/// ### [10.1.5 \[\[GetOwnProperty\]\] ( P )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-getownproperty-p)
pub fn get_own_property(agent: &Agent, object: Object, key: &PropertyKey) -> Option<PropertyDescriptor> {
    if let (PropertyKey::String(s), ExoticData::Array(array)) = (*key, &agent.heap[object.0].exotic) {
        if s.as_str(&agent.heap) == "length" {
            return Some(PropertyDescriptor::data(
                Value::from(array.length as f64),
                true,
                false,
                false,
            ));
        }
    }
    agent.heap[object.0].properties.get(key).cloned()
}

/// ### [10.1.6 \[\[DefineOwnProperty\]\] ( P, Desc )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-defineownproperty-p-desc)
///
/// Array's `"length"` key is intercepted into [`array_set_length`] (10.4.2.1)
/// before reaching the ordinary algorithm; everything else, on any object
/// kind, goes through [`validate_and_apply_property_descriptor`] unchanged.
pub fn define_own_property(
    agent: &RefCell<Agent>,
    object: Object,
    key: PropertyKey,
    desc: PartialPropertyDescriptor,
) -> JsResult<bool> {
    if is_array_length_key(agent, object, &key) {
        return array_set_length(agent, object, desc);
    }
    let mut a = agent.borrow_mut();
    let current = get_own_property(&a, object, &key);
    let extensible = is_extensible(&a, object);
    Ok(validate_and_apply_property_descriptor(&mut a, Some(object), &key, extensible, desc, current))
}

fn is_array_length_key(agent: &RefCell<Agent>, object: Object, key: &PropertyKey) -> bool {
    let a = agent.borrow();
    let PropertyKey::String(s) = key else {
        return false;
    };
    matches!(&a.heap[object.0].exotic, ExoticData::Array(_)) && s.as_str(&a.heap) == "length"
}

/// ### [10.4.2.1 ArraySetLength ( A, Desc )](https://tc39.es/ecma262/#sec-arraysetlength)
///
/// A `"length"` redefinition that carries no `[[Value]]` (only touching
/// writable/enumerable/configurable) falls back to the ordinary algorithm
/// against the synthetic current descriptor [`get_own_property`] builds for
/// `"length"`; one that does is validated as an array length and, when it
/// shrinks the array, deletes every own property at or past the new length.
fn array_set_length(agent: &RefCell<Agent>, object: Object, desc: PartialPropertyDescriptor) -> JsResult<bool> {
    let length_key = PropertyKey::from_static_str("length");
    let Some(value) = desc.value else {
        let mut a = agent.borrow_mut();
        let current = get_own_property(&a, object, &length_key);
        let extensible = is_extensible(&a, object);
        return Ok(validate_and_apply_property_descriptor(&mut a, Some(object), &length_key, extensible, desc, current));
    };
    let new_len = to_uint32(agent, value)?;
    let number_len = to_number(agent, value)?;
    if new_len as f64 != number_len {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::RangeError, "Invalid array length"));
    }
    let mut a = agent.borrow_mut();
    let old_len = match &a.heap[object.0].exotic {
        ExoticData::Array(array) => array.length,
        _ => unreachable!("array_set_length is only reached for Array-exotic objects"),
    };
    if new_len < old_len {
        for key in a.heap[object.0].properties.keys_in_order(&a.heap) {
            if key.as_array_index(&a.heap).is_some_and(|index| index >= new_len) {
                a.heap[object.0].properties.remove(&key);
            }
        }
    }
    if let ExoticData::Array(array) = &mut a.heap[object.0].exotic {
        array.length = new_len;
    }
    Ok(true)
}

/// ### [10.1.6.3 ValidateAndApplyPropertyDescriptor ( O, P, extensible, Desc, current )](https://tc39.es/ecma262/#sec-validateandapplypropertydescriptor)
fn validate_and_apply_property_descriptor(
    agent: &mut Agent,
    object: Option<Object>,
    key: &PropertyKey,
    extensible: bool,
    desc: PartialPropertyDescriptor,
    current: Option<PropertyDescriptor>,
) -> bool {
    let Some(current) = current else {
        if !extensible {
            return false;
        }
        let Some(object) = object else { return true };
        let merged = if desc.is_accessor_descriptor() {
            PropertyDescriptor::Accessor {
                get: desc.get,
                set: desc.set,
                enumerable: desc.enumerable.unwrap_or(false),
                configurable: desc.configurable.unwrap_or(false),
            }
        } else {
            PropertyDescriptor::Data {
                value: desc.value.unwrap_or(Value::Undefined),
                writable: desc.writable.unwrap_or(false),
                enumerable: desc.enumerable.unwrap_or(false),
                configurable: desc.configurable.unwrap_or(false),
            }
        };
        insert_own_property(agent, object, *key, merged);
        return true;
    };

    if !current.configurable() {
        if desc.configurable == Some(true) {
            return false;
        }
        if let Some(enumerable) = desc.enumerable {
            if enumerable != current.enumerable() {
                return false;
            }
        }
        if !desc.is_generic() && desc.is_accessor_descriptor() != current.is_accessor() {
            return false;
        }
        if current.is_accessor() {
            if let PropertyDescriptor::Accessor { get, set, .. } = &current {
                let cur_get = get.unwrap_or(Value::Undefined);
                let cur_set = set.unwrap_or(Value::Undefined);
                if let Some(new_get) = desc.get {
                    if !same_value(new_get, cur_get) {
                        return false;
                    }
                }
                if let Some(new_set) = desc.set {
                    if !same_value(new_set, cur_set) {
                        return false;
                    }
                }
            }
        } else if !current.is_writable().unwrap_or(false) {
            if desc.writable == Some(true) {
                return false;
            }
            if let Some(new_value) = desc.value {
                if !same_value(new_value, current_data_value(&current)) {
                    return false;
                }
            }
        }
    }

    let Some(object) = object else { return true };
    let merged = merge_descriptor(current, desc);
    insert_own_property(agent, object, *key, merged);
    true
}

fn current_data_value(desc: &PropertyDescriptor) -> Value {
    match desc {
        PropertyDescriptor::Data { value, .. } => *value,
        PropertyDescriptor::Accessor { .. } => Value::Undefined,
    }
}

fn merge_descriptor(current: PropertyDescriptor, desc: PartialPropertyDescriptor) -> PropertyDescriptor {
    if desc.is_accessor_descriptor() || (desc.is_generic() && current.is_accessor()) {
        let (cur_get, cur_set) = match current {
            PropertyDescriptor::Accessor { get, set, .. } => (get, set),
            PropertyDescriptor::Data { .. } => (None, None),
        };
        PropertyDescriptor::Accessor {
            get: desc.get.or(cur_get),
            set: desc.set.or(cur_set),
            enumerable: desc.enumerable.unwrap_or(current.enumerable()),
            configurable: desc.configurable.unwrap_or(current.configurable()),
        }
    } else {
        let (cur_value, cur_writable) = match current {
            PropertyDescriptor::Data { value, writable, .. } => (value, Some(writable)),
            PropertyDescriptor::Accessor { .. } => (Value::Undefined, None),
        };
        let cur_writable = cur_writable.unwrap_or(false);
        PropertyDescriptor::Data {
            value: desc.value.unwrap_or(cur_value),
            writable: desc.writable.unwrap_or(cur_writable),
            enumerable: desc.enumerable.unwrap_or(current.enumerable()),
            configurable: desc.configurable.unwrap_or(current.configurable()),
        }
    }
}

fn insert_own_property(agent: &mut Agent, object: Object, key: PropertyKey, desc: PropertyDescriptor) {
    if let Some(index) = key.as_array_index(&agent.heap) {
        if let ExoticData::Array(array) = &mut agent.heap[object.0].exotic {
            if index != u32::MAX && index.checked_add(1).map(|n| n > array.length).unwrap_or(false) {
                array.length = index + 1;
            }
        }
    }
    agent.heap[object.0].properties.insert(key, desc);
}

/// ### [7.2.11 SameValue ( x, y )](https://tc39.es/ecma262/#sec-samevalue)
///
/// `Value`'s derived `PartialEq` treats NaN as unequal to itself and doesn't
/// distinguish +0/-0, so Number needs its own bitwise comparison; every other
/// variant is a `Copy` heap handle or primitive where structural equality and
/// SameValue coincide.
fn same_value(a: Value, b: Value) -> bool {
    if let (Value::Number(x), Value::Number(y)) = (a, b) {
        return x.to_bits() == y.to_bits();
    }
    a == b
}

/// ### [10.1.7 \[\[HasProperty\]\] ( P )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-hasproperty-p)
pub fn has_property(agent: &Agent, object: Object, key: &PropertyKey) -> bool {
    if get_own_property(agent, object, key).is_some() {
        return true;
    }
    match get_prototype_of(agent, object) {
        Some(parent) => has_property(agent, parent, key),
        None => false,
    }
}

/// By-name variant of [`get_own_property`] for callers holding only a
/// borrowed `&str` (see [`super::property_storage::PropertyStorage::get_by_str`]).
pub fn get_own_property_by_str(agent: &Agent, object: Object, name: &str) -> Option<PropertyDescriptor> {
    if name == "length" {
        if let ExoticData::Array(array) = &agent.heap[object.0].exotic {
            return Some(PropertyDescriptor::data(Value::from(array.length as f64), true, false, false));
        }
    }
    agent.heap[object.0].properties.get_by_str(&agent.heap, name).cloned()
}

/// By-name variant of [`has_property`].
pub fn has_property_by_str(agent: &Agent, object: Object, name: &str) -> bool {
    if get_own_property_by_str(agent, object, name).is_some() {
        return true;
    }
    match get_prototype_of(agent, object) {
        Some(parent) => has_property_by_str(agent, parent, name),
        None => false,
    }
}

// `[[Get]]`/`[[Set]]` (10.1.8/10.1.9) are implemented in
// `abstract_operations::operations_on_objects` instead of here: an accessor
// property's getter/setter is an arbitrary function, and invoking one needs
// `&RefCell<Agent>` (see `Agent::call_function`'s doc comment) — every other
// internal method in this file only ever touches property-descriptor data,
// so it stays on plain `&Agent`/`&mut Agent`.

/// ### [10.1.10 \[\[Delete\]\] ( P )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-delete-p)
pub fn delete(agent: &mut Agent, object: Object, key: &PropertyKey) -> bool {
    match get_own_property(agent, object, key) {
        None => true,
        Some(desc) => {
            if desc.configurable() {
                agent.heap[object.0].properties.remove(key);
                true
            } else {
                false
            }
        }
    }
}

/// ### [10.1.11 \[\[OwnPropertyKeys\]\] ( )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-ownpropertykeys)
pub fn own_property_keys(agent: &Agent, object: Object) -> Vec<PropertyKey> {
    agent.heap[object.0].properties.keys_in_order(&agent.heap)
}

pub(crate) fn throw_type_error(agent: &mut Agent, message: &'static str) -> crate::ecmascript::execution::agent::JsError {
    agent.throw_exception_with_static_message(ExceptionType::TypeError, message)
}

/// Constructs an Array exotic object with the standard `length` handling
/// `ArrayData` exists for — the rest of Array's own methods are ordinary.
pub fn array_create(agent: &mut Agent, length: u32, prototype: Option<Object>) -> Object {
    use crate::ecmascript::types::language::object::ObjectHeapData;
    use crate::heap::CreateHeapData;
    agent.heap.create(ObjectHeapData {
        prototype,
        extensible: true,
        properties: Default::default(),
        exotic: ExoticData::Array(ArrayData { length }),
    })
}
