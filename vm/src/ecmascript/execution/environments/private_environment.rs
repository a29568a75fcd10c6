// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.2 PrivateEnvironment Records](https://tc39.es/ecma262/#sec-privateenvironment-records)

use crate::ecmascript::types::language::object::Object;
use crate::ecmascript::types::language::value::Value;
use crate::heap::indices::PrivateEnvironmentIndex;
use ahash::AHashMap;

#[derive(Debug)]
pub enum PrivateName {
    Field(Option<Value>),
    Method(Object),
    /// `Accessor(get, set)` — either half may be absent for a get-only or
    /// set-only private accessor pair.
    Accessor(Option<Object>, Option<Object>),
}

#[derive(Debug)]
pub struct PrivateEnvironmentRecord {
    pub(crate) outer_private_environment: Option<PrivateEnvironmentIndex>,
    names: AHashMap<String, PrivateName>,
}

impl PrivateEnvironmentRecord {
    /// ### [9.2.1.1 NewPrivateEnvironment ( outerPrivEnv )](https://tc39.es/ecma262/#sec-newprivateenvironment)
    pub fn new(outer_private_environment: Option<PrivateEnvironmentIndex>) -> Self {
        Self {
            outer_private_environment,
            names: AHashMap::default(),
        }
    }

    pub fn add_private_name(&mut self, description: &str, name: PrivateName) {
        self.names.insert(description.to_owned(), name);
    }

    pub fn get(&self, description: &str) -> Option<&PrivateName> {
        self.names.get(description)
    }

    pub fn get_mut(&mut self, description: &str) -> Option<&mut PrivateName> {
        self.names.get_mut(description)
    }

    pub fn contains(&self, description: &str) -> bool {
        self.names.contains_key(description)
    }
}
