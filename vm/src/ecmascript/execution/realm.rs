// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.3 Realms](https://tc39.es/ecma262/#sec-code-realms)

pub mod intrinsics;

use std::cell::RefCell;

use super::agent::Agent;
use super::environments::{self, Environment};
use crate::ecmascript::types::language::object::{Object, ObjectHeapData};
use crate::heap::indices::RealmIndex;
use crate::heap::CreateHeapData;
use intrinsics::Intrinsics;

/// A `Copy` handle to a heap-allocated [`Realm`]. Named `RealmIdentifier` to
/// match §9.3's prose rather than the generic index-naming convention, since
/// it is threaded through almost every execution-time abstract operation.
pub type RealmIdentifier = RealmIndex;

/// ### [9.3 Realms](https://tc39.es/ecma262/#sec-code-realms)
#[derive(Debug)]
pub struct Realm {
    intrinsics: Intrinsics,
    pub(crate) global_object: Object,
    pub(crate) global_env: Option<Environment>,
}

impl Realm {
    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    pub fn intrinsics_mut(&mut self) -> &mut Intrinsics {
        &mut self.intrinsics
    }

    pub fn global_object(&self) -> Object {
        self.global_object
    }

    pub fn global_env(&self) -> Environment {
        self.global_env.expect("realm global environment not yet initialized")
    }
}

/// ### [9.3.1 CreateRealm ( )](https://tc39.es/ecma262/#sec-createrealm)
///
/// Plugins (see `crate::builtins::prelude`) are what actually fill in
/// `intrinsics` and the global object's own properties; this just allocates
/// the empty shell table-26 describes, same division of labor as the
/// teacher's `CreateRealm` / `InitializeHostDefinedRealm` split.
pub(crate) fn create_realm(agent: &RefCell<Agent>) -> RealmIdentifier {
    let mut a = agent.borrow_mut();
    let object_prototype = a.heap.create(ObjectHeapData::new_ordinary(None));
    let realm_rec = Realm {
        intrinsics: Intrinsics::new(object_prototype),
        global_object: object_prototype,
        global_env: None,
    };
    a.heap.push_realm(realm_rec)
}

/// ### [9.3.3 SetRealmGlobalObject ( realmRec, globalObj, thisValue )](https://tc39.es/ecma262/#sec-setrealmglobalobject)
pub(crate) fn set_realm_global_object(
    agent: &RefCell<Agent>,
    realm_id: RealmIdentifier,
    global_object: Object,
    this_value: Object,
) {
    let global_env = environments::new_global_environment(agent, global_object, this_value);
    let mut a = agent.borrow_mut();
    let realm = &mut a.heap[realm_id];
    realm.global_object = global_object;
    realm.global_env = Some(global_env);
}
