// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The per-[`Agent`](crate::ecmascript::execution::Agent) arena.
//!
//! Objects, strings, symbols, bigints, environments and realms are all
//! allocated here and referenced elsewhere only by the `Copy` indices in
//! [`indices`]. The arena is append-only: nothing is ever freed or moved,
//! so a handle minted from one `push` stays valid until the `Agent` itself
//! is dropped.

pub mod indices;

use crate::ecmascript::execution::environments::{
    declarative_environment::DeclarativeEnvironmentRecord,
    function_environment::FunctionEnvironmentRecord, global_environment::GlobalEnvironmentRecord,
    object_environment::ObjectEnvironmentRecord, private_environment::PrivateEnvironmentRecord,
};
use crate::ecmascript::execution::realm::Realm;
use crate::ecmascript::types::language::bigint::HeapBigInt;
use crate::ecmascript::types::language::object::ObjectHeapData;
use crate::ecmascript::types::language::string::HeapString;
use crate::ecmascript::types::language::symbol::SymbolHeapData;
use indices::*;

#[derive(Debug, Default)]
pub struct Heap {
    pub(crate) objects: Vec<ObjectHeapData>,
    pub(crate) strings: Vec<HeapString>,
    pub(crate) symbols: Vec<SymbolHeapData>,
    pub(crate) bigints: Vec<HeapBigInt>,
    pub(crate) declarative_environments: Vec<DeclarativeEnvironmentRecord>,
    pub(crate) object_environments: Vec<ObjectEnvironmentRecord>,
    pub(crate) function_environments: Vec<FunctionEnvironmentRecord>,
    pub(crate) global_environments: Vec<GlobalEnvironmentRecord>,
    pub(crate) private_environments: Vec<PrivateEnvironmentRecord>,
    pub(crate) realms: Vec<Realm>,
}

/// Every heap-backed kind implements push-and-return-a-handle through one
/// interface instead of the caller poking at `Heap` fields directly.
pub trait CreateHeapData<Data, Handle> {
    fn create(&mut self, data: Data) -> Handle;
}

impl CreateHeapData<ObjectHeapData, crate::ecmascript::types::language::object::Object> for Heap {
    fn create(&mut self, data: ObjectHeapData) -> crate::ecmascript::types::language::object::Object {
        crate::ecmascript::types::language::object::Object(self.push_object(data))
    }
}

impl CreateHeapData<std::string::String, crate::ecmascript::types::language::string::JsString> for Heap {
    fn create(&mut self, data: std::string::String) -> crate::ecmascript::types::language::string::JsString {
        crate::ecmascript::types::language::string::JsString::from_string(self, data)
    }
}

impl CreateHeapData<SymbolHeapData, crate::ecmascript::types::language::symbol::Symbol> for Heap {
    fn create(&mut self, data: SymbolHeapData) -> crate::ecmascript::types::language::symbol::Symbol {
        crate::ecmascript::types::language::symbol::Symbol(self.push_symbol(data))
    }
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_object(&mut self, data: ObjectHeapData) -> ObjectIndex {
        self.objects.push(data);
        ObjectIndex::from_index(self.objects.len() - 1)
    }

    pub(crate) fn push_string(&mut self, data: HeapString) -> StringIndex {
        self.strings.push(data);
        StringIndex::from_index(self.strings.len() - 1)
    }

    pub(crate) fn push_symbol(&mut self, data: SymbolHeapData) -> SymbolIndex {
        self.symbols.push(data);
        SymbolIndex::from_index(self.symbols.len() - 1)
    }

    pub(crate) fn push_bigint(&mut self, data: HeapBigInt) -> BigIntIndex {
        self.bigints.push(data);
        BigIntIndex::from_index(self.bigints.len() - 1)
    }

    pub(crate) fn push_declarative_environment(
        &mut self,
        data: DeclarativeEnvironmentRecord,
    ) -> DeclarativeEnvironmentIndex {
        self.declarative_environments.push(data);
        DeclarativeEnvironmentIndex::from_index(self.declarative_environments.len() - 1)
    }

    pub(crate) fn push_object_environment(
        &mut self,
        data: ObjectEnvironmentRecord,
    ) -> ObjectEnvironmentIndex {
        self.object_environments.push(data);
        ObjectEnvironmentIndex::from_index(self.object_environments.len() - 1)
    }

    pub(crate) fn push_function_environment(
        &mut self,
        data: FunctionEnvironmentRecord,
    ) -> FunctionEnvironmentIndex {
        self.function_environments.push(data);
        FunctionEnvironmentIndex::from_index(self.function_environments.len() - 1)
    }

    pub(crate) fn push_global_environment(
        &mut self,
        data: GlobalEnvironmentRecord,
    ) -> GlobalEnvironmentIndex {
        self.global_environments.push(data);
        GlobalEnvironmentIndex::from_index(self.global_environments.len() - 1)
    }

    pub(crate) fn push_private_environment(
        &mut self,
        data: PrivateEnvironmentRecord,
    ) -> PrivateEnvironmentIndex {
        self.private_environments.push(data);
        PrivateEnvironmentIndex::from_index(self.private_environments.len() - 1)
    }

    pub(crate) fn push_realm(&mut self, data: Realm) -> RealmIndex {
        self.realms.push(data);
        RealmIndex::from_index(self.realms.len() - 1)
    }
}

impl std::ops::Index<ObjectIndex> for Heap {
    type Output = ObjectHeapData;
    fn index(&self, index: ObjectIndex) -> &Self::Output {
        &self.objects[index.into_index()]
    }
}
impl std::ops::IndexMut<ObjectIndex> for Heap {
    fn index_mut(&mut self, index: ObjectIndex) -> &mut Self::Output {
        &mut self.objects[index.into_index()]
    }
}

impl std::ops::Index<StringIndex> for Heap {
    type Output = HeapString;
    fn index(&self, index: StringIndex) -> &Self::Output {
        &self.strings[index.into_index()]
    }
}

impl std::ops::Index<SymbolIndex> for Heap {
    type Output = SymbolHeapData;
    fn index(&self, index: SymbolIndex) -> &Self::Output {
        &self.symbols[index.into_index()]
    }
}

impl std::ops::Index<BigIntIndex> for Heap {
    type Output = HeapBigInt;
    fn index(&self, index: BigIntIndex) -> &Self::Output {
        &self.bigints[index.into_index()]
    }
}

impl std::ops::Index<DeclarativeEnvironmentIndex> for Heap {
    type Output = DeclarativeEnvironmentRecord;
    fn index(&self, index: DeclarativeEnvironmentIndex) -> &Self::Output {
        &self.declarative_environments[index.into_index()]
    }
}
impl std::ops::IndexMut<DeclarativeEnvironmentIndex> for Heap {
    fn index_mut(&mut self, index: DeclarativeEnvironmentIndex) -> &mut Self::Output {
        &mut self.declarative_environments[index.into_index()]
    }
}

impl std::ops::Index<ObjectEnvironmentIndex> for Heap {
    type Output = ObjectEnvironmentRecord;
    fn index(&self, index: ObjectEnvironmentIndex) -> &Self::Output {
        &self.object_environments[index.into_index()]
    }
}
impl std::ops::IndexMut<ObjectEnvironmentIndex> for Heap {
    fn index_mut(&mut self, index: ObjectEnvironmentIndex) -> &mut Self::Output {
        &mut self.object_environments[index.into_index()]
    }
}

impl std::ops::Index<FunctionEnvironmentIndex> for Heap {
    type Output = FunctionEnvironmentRecord;
    fn index(&self, index: FunctionEnvironmentIndex) -> &Self::Output {
        &self.function_environments[index.into_index()]
    }
}
impl std::ops::IndexMut<FunctionEnvironmentIndex> for Heap {
    fn index_mut(&mut self, index: FunctionEnvironmentIndex) -> &mut Self::Output {
        &mut self.function_environments[index.into_index()]
    }
}

impl std::ops::Index<GlobalEnvironmentIndex> for Heap {
    type Output = GlobalEnvironmentRecord;
    fn index(&self, index: GlobalEnvironmentIndex) -> &Self::Output {
        &self.global_environments[index.into_index()]
    }
}
impl std::ops::IndexMut<GlobalEnvironmentIndex> for Heap {
    fn index_mut(&mut self, index: GlobalEnvironmentIndex) -> &mut Self::Output {
        &mut self.global_environments[index.into_index()]
    }
}

impl std::ops::Index<PrivateEnvironmentIndex> for Heap {
    type Output = PrivateEnvironmentRecord;
    fn index(&self, index: PrivateEnvironmentIndex) -> &Self::Output {
        &self.private_environments[index.into_index()]
    }
}
impl std::ops::IndexMut<PrivateEnvironmentIndex> for Heap {
    fn index_mut(&mut self, index: PrivateEnvironmentIndex) -> &mut Self::Output {
        &mut self.private_environments[index.into_index()]
    }
}

impl std::ops::Index<RealmIndex> for Heap {
    type Output = Realm;
    fn index(&self, index: RealmIndex) -> &Self::Output {
        &self.realms[index.into_index()]
    }
}
impl std::ops::IndexMut<RealmIndex> for Heap {
    fn index_mut(&mut self, index: RealmIndex) -> &mut Self::Output {
        &mut self.realms[index.into_index()]
    }
}
