// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.2 Promise Objects](https://tc39.es/ecma262/#sec-promise-objects)

pub mod abstract_operations;

use std::rc::Rc;

use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::types::language::object::Object;
use crate::ecmascript::types::language::value::Value;
use std::cell::RefCell;

/// \[\[Handler\]\]: a registered JS callback, "empty" (a reaction created by
/// `then(undefined)`/`catch()` with no handler for that settlement type,
/// which just passes the value/reason through), or a `Native` closure used
/// by this crate's internal `await` continuation (`control_abstraction::async_function`),
/// which never needs a heap-allocated function object of its own.
#[derive(Clone)]
pub enum ReactionHandler {
    Callback(Value),
    Empty,
    Native(Rc<dyn Fn(&RefCell<Agent>, Value)>),
}

impl std::fmt::Debug for ReactionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReactionHandler::Callback(v) => f.debug_tuple("Callback").field(v).finish(),
            ReactionHandler::Empty => write!(f, "Empty"),
            ReactionHandler::Native(_) => write!(f, "Native(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseReactionType {
    Fulfill,
    Reject,
}

/// ### [27.2.1.1 PromiseCapability Records](https://tc39.es/ecma262/#sec-promisecapability-records)
///
/// Only built-in (non-subclassed) promises are supported, so resolve/reject
/// closures are synthesized on demand by `abstract_operations::make_resolving_functions`
/// rather than stored here — this just names the promise.
#[derive(Debug, Clone, Copy)]
pub struct PromiseCapability {
    pub promise: Object,
}

/// ### [27.2.1.2 PromiseReaction Records](https://tc39.es/ecma262/#sec-promisereaction-records)
#[derive(Debug, Clone)]
pub struct PromiseReaction {
    pub capability: Option<PromiseCapability>,
    pub reaction_type: PromiseReactionType,
    pub handler: ReactionHandler,
}

#[derive(Debug)]
pub enum PromiseState {
    Pending {
        fulfill_reactions: Vec<PromiseReaction>,
        reject_reactions: Vec<PromiseReaction>,
        is_resolved: bool,
    },
    Fulfilled {
        result: Value,
    },
    Rejected {
        result: Value,
        is_handled: bool,
    },
}

impl Default for PromiseState {
    fn default() -> Self {
        PromiseState::Pending {
            fulfill_reactions: Vec::new(),
            reject_reactions: Vec::new(),
            is_resolved: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct PromiseData {
    pub state: PromiseState,
}
