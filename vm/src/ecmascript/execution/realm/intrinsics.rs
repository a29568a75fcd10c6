// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.3.2 CreateIntrinsics ( realmRec )](https://tc39.es/ecma262/#sec-createintrinsics)
//!
//! Intrinsics are populated incrementally by whichever `builtins::prelude`
//! plugins are active for a realm, run in dependency order — so only the
//! well-known slots every plugin can assume already exist (the object and
//! function prototypes) are mandatory; the rest start `None` and are filled
//! in as each plugin runs.

use crate::ecmascript::types::language::object::Object;

#[derive(Debug)]
pub struct Intrinsics {
    pub object_prototype: Object,
    pub function_prototype: Option<Object>,
    pub array_prototype: Option<Object>,
    pub array_constructor: Option<Object>,
    pub string_prototype: Option<Object>,
    pub number_prototype: Option<Object>,
    pub boolean_prototype: Option<Object>,
    pub error_prototype: Option<Object>,
    pub error_constructor: Option<Object>,
    pub type_error_prototype: Option<Object>,
    pub type_error_constructor: Option<Object>,
    pub range_error_prototype: Option<Object>,
    pub range_error_constructor: Option<Object>,
    pub reference_error_prototype: Option<Object>,
    pub reference_error_constructor: Option<Object>,
    pub syntax_error_prototype: Option<Object>,
    pub syntax_error_constructor: Option<Object>,
    pub iterator_prototype: Option<Object>,
    pub generator_function_prototype: Option<Object>,
    pub generator_prototype: Option<Object>,
    pub async_generator_function_prototype: Option<Object>,
    pub async_generator_prototype: Option<Object>,
    pub async_function_prototype: Option<Object>,
    pub promise_prototype: Option<Object>,
    pub promise_constructor: Option<Object>,
}

impl Intrinsics {
    pub(crate) fn new(object_prototype: Object) -> Self {
        Self {
            object_prototype,
            function_prototype: None,
            array_prototype: None,
            array_constructor: None,
            string_prototype: None,
            number_prototype: None,
            boolean_prototype: None,
            error_prototype: None,
            error_constructor: None,
            type_error_prototype: None,
            type_error_constructor: None,
            range_error_prototype: None,
            range_error_constructor: None,
            reference_error_prototype: None,
            reference_error_constructor: None,
            syntax_error_prototype: None,
            syntax_error_constructor: None,
            iterator_prototype: None,
            generator_function_prototype: None,
            generator_prototype: None,
            async_generator_function_prototype: None,
            async_generator_prototype: None,
            async_function_prototype: None,
            promise_prototype: None,
            promise_constructor: None,
        }
    }
}
