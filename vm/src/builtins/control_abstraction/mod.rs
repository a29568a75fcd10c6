// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27 Control Abstraction Objects](https://tc39.es/ecma262/#sec-control-abstraction-objects)

pub mod async_function;
pub mod async_generator;
pub mod generator;
