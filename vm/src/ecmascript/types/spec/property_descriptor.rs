// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.2.6 The Property Descriptor Specification Type](https://tc39.es/ecma262/#sec-property-descriptor-specification-type)

use crate::ecmascript::types::language::value::Value;

/// A *complete* data-or-accessor descriptor, the shape every own property
/// actually stored on an object has. [`PartialPropertyDescriptor`] is the
/// "some fields may be absent" shape used as input to `DefineOwnProperty`.
#[derive(Debug, Clone, Copy)]
pub enum PropertyDescriptor {
    Data {
        value: Value,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    },
    Accessor {
        get: Option<Value>,
        set: Option<Value>,
        enumerable: bool,
        configurable: bool,
    },
}

impl PropertyDescriptor {
    pub fn enumerable(&self) -> bool {
        match self {
            PropertyDescriptor::Data { enumerable, .. }
            | PropertyDescriptor::Accessor { enumerable, .. } => *enumerable,
        }
    }

    pub fn configurable(&self) -> bool {
        match self {
            PropertyDescriptor::Data { configurable, .. }
            | PropertyDescriptor::Accessor { configurable, .. } => *configurable,
        }
    }

    pub fn set_configurable(&mut self, value: bool) {
        match self {
            PropertyDescriptor::Data { configurable, .. }
            | PropertyDescriptor::Accessor { configurable, .. } => *configurable = value,
        }
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self, PropertyDescriptor::Accessor { .. })
    }

    pub fn is_writable(&self) -> Option<bool> {
        match self {
            PropertyDescriptor::Data { writable, .. } => Some(*writable),
            PropertyDescriptor::Accessor { .. } => None,
        }
    }

    pub fn data(value: Value, writable: bool, enumerable: bool, configurable: bool) -> Self {
        PropertyDescriptor::Data {
            value,
            writable,
            enumerable,
            configurable,
        }
    }
}

/// ### A partial Property Descriptor
///
/// Any field may be left `None` ("absent"), which `ValidateAndApplyPropertyDescriptor`
/// (see `object::internal_methods::validate_and_apply_property_descriptor`)
/// interprets as "keep the current value on reconfiguration" or "default to
/// false/undefined on creation".
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialPropertyDescriptor {
    pub value: Option<Value>,
    pub writable: Option<bool>,
    pub get: Option<Value>,
    pub set: Option<Value>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PartialPropertyDescriptor {
    pub fn is_generic(&self) -> bool {
        self.value.is_none() && self.writable.is_none() && self.get.is_none() && self.set.is_none()
    }

    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    pub fn new_data(value: Value) -> Self {
        Self {
            value: Some(value),
            writable: Some(true),
            enumerable: Some(true),
            configurable: Some(true),
            ..Default::default()
        }
    }
}

impl From<PropertyDescriptor> for PartialPropertyDescriptor {
    fn from(d: PropertyDescriptor) -> Self {
        match d {
            PropertyDescriptor::Data {
                value,
                writable,
                enumerable,
                configurable,
            } => Self {
                value: Some(value),
                writable: Some(writable),
                enumerable: Some(enumerable),
                configurable: Some(configurable),
                ..Default::default()
            },
            PropertyDescriptor::Accessor {
                get,
                set,
                enumerable,
                configurable,
            } => Self {
                get,
                set,
                enumerable: Some(enumerable),
                configurable: Some(configurable),
                ..Default::default()
            },
        }
    }
}
