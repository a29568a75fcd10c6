// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.1.6.2 The BigInt Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-bigint-type)

use crate::heap::indices::BigIntIndex;
use num_bigint::BigInt as NumBigInt;

#[derive(Debug)]
pub struct HeapBigInt(pub NumBigInt);

/// Small bigints that fit in an `i64` are kept inline; anything larger
/// spills to the heap arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BigInt {
    Small(i64),
    Heap(BigIntIndex),
}

impl BigInt {
    pub fn from_i64(value: i64) -> Self {
        BigInt::Small(value)
    }

    pub fn from_num_bigint(heap: &mut crate::heap::Heap, value: NumBigInt) -> Self {
        if let Some(small) = i64::try_from(&value).ok() {
            return BigInt::Small(small);
        }
        BigInt::Heap(heap.push_bigint(HeapBigInt(value)))
    }

    pub fn is_zero(&self) -> bool {
        match self {
            BigInt::Small(v) => *v == 0,
            BigInt::Heap(_) => false,
        }
    }

    pub fn to_num_bigint(&self, heap: &crate::heap::Heap) -> NumBigInt {
        match self {
            BigInt::Small(v) => NumBigInt::from(*v),
            BigInt::Heap(idx) => heap[*idx].0.clone(),
        }
    }
}
