// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed indices into [`super::Heap`]'s per-kind arenas.
//!
//! Every handle here is a plain `Copy` newtype around a `u32`. Because the
//! heap never moves or frees an allocation (see the crate-level design
//! note in `DESIGN.md` on why there is no compacting collector), a handle
//! stays valid for the lifetime of the [`crate::ecmascript::execution::Agent`]
//! that created it, with no GC-scope lifetime parameter required.

use std::marker::PhantomData;

macro_rules! heap_index {
    ($name:ident, $data:ty) => {
        #[derive(Debug)]
        pub struct $name {
            index: u32,
            marker: PhantomData<$data>,
        }

        impl $name {
            pub(crate) fn from_index(index: usize) -> Self {
                Self {
                    index: u32::try_from(index).expect("heap arena exceeded u32::MAX entries"),
                    marker: PhantomData,
                }
            }

            pub(crate) fn into_index(self) -> usize {
                self.index as usize
            }
        }

        impl Clone for $name {
            fn clone(&self) -> Self {
                *self
            }
        }
        impl Copy for $name {}
        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.index == other.index
            }
        }
        impl Eq for $name {}
        impl std::hash::Hash for $name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.index.hash(state);
            }
        }
    };
}

heap_index!(ObjectIndex, crate::ecmascript::types::language::object::ObjectHeapData);
heap_index!(StringIndex, crate::ecmascript::types::language::string::HeapString);
heap_index!(SymbolIndex, crate::ecmascript::types::language::symbol::SymbolHeapData);
heap_index!(BigIntIndex, crate::ecmascript::types::language::bigint::HeapBigInt);
heap_index!(
    DeclarativeEnvironmentIndex,
    crate::ecmascript::execution::environments::declarative_environment::DeclarativeEnvironmentRecord
);
heap_index!(
    ObjectEnvironmentIndex,
    crate::ecmascript::execution::environments::object_environment::ObjectEnvironmentRecord
);
heap_index!(
    FunctionEnvironmentIndex,
    crate::ecmascript::execution::environments::function_environment::FunctionEnvironmentRecord
);
heap_index!(
    GlobalEnvironmentIndex,
    crate::ecmascript::execution::environments::global_environment::GlobalEnvironmentRecord
);
heap_index!(
    PrivateEnvironmentIndex,
    crate::ecmascript::execution::environments::private_environment::PrivateEnvironmentRecord
);
heap_index!(RealmIndex, crate::ecmascript::execution::realm::Realm);
