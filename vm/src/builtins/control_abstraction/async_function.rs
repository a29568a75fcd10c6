// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.7 AsyncFunction Objects](https://tc39.es/ecma262/#sec-async-function-objects)
//!
//! An async function body runs
//! synchronously (via `drive_boxed_body`) up to its first `await`, then
//! parks. Resumption is driven by subscribing to the awaited value's promise
//! with `perform_promise_then_native`, whose fulfill/reject reactions inject
//! the settled value back into the body's [`Suspension`] and re-drive it —
//! this crate has no event loop, so that redrive happens synchronously
//! inside the reaction job rather than being scheduled back onto a
//! microtask queue of its own.

use std::cell::RefCell;
use std::rc::Rc;
use std::task::Poll;

use crate::builtins::promise::abstract_operations::{fulfill_promise, perform_promise_then_native, promise_resolve, reject_promise};
use crate::ecmascript::execution::agent::{Agent, JsError};
use crate::ecmascript::types::language::object::Object;
use crate::ecmascript::types::language::value::Value;
use crate::ecmascript::types::spec::completion::Completion;
use crate::engine::{drive_boxed_body, BoxedBody, Suspension, SuspendedOp};

/// ### [27.7.5.1 AsyncFunctionStart ( promiseCapability, asyncFunctionBody )](https://tc39.es/ecma262/#sec-async-functions-abstract-operations-async-function-start)
pub fn async_function_start(agent: &RefCell<Agent>, promise: Object, mut body: BoxedBody, suspension: Rc<Suspension>) {
    match drive_boxed_body(&mut body) {
        Poll::Ready(completion) => settle_from_completion(agent, promise, completion),
        Poll::Pending => park_on_await(agent, promise, body, suspension),
    }
}

fn settle_from_completion(agent: &RefCell<Agent>, promise: Object, completion: Completion) {
    match completion {
        Completion::Normal(v) | Completion::Return(v) => fulfill_promise(agent, promise, v),
        Completion::Throw(e) => reject_promise(agent, promise, e.value()),
        Completion::Break(_) | Completion::Continue(_) => {
            unreachable!("an async function body completed with a stray break/continue")
        }
    }
}

fn park_on_await(agent: &RefCell<Agent>, promise: Object, body: BoxedBody, suspension: Rc<Suspension>) {
    let Some(SuspendedOp::Await(awaited)) = suspension.take_pending() else {
        unreachable!("an async function body parked without an Await op")
    };
    let awaited_promise = promise_resolve(agent, awaited);
    let body = Rc::new(RefCell::new(Some(body)));

    let on_fulfilled = {
        let body = body.clone();
        let suspension = suspension.clone();
        move |agent: &RefCell<Agent>, value: Value| -> crate::ecmascript::execution::agent::JsResult<()> {
            suspension.inject_resume(Completion::Normal(value));
            resume_body(agent, promise, &body, &suspension);
            Ok(())
        }
    };
    let on_rejected = {
        let suspension = suspension.clone();
        move |agent: &RefCell<Agent>, reason: Value| -> crate::ecmascript::execution::agent::JsResult<()> {
            suspension.inject_resume(Completion::Throw(JsError::new(reason)));
            resume_body(agent, promise, &body, &suspension);
            Ok(())
        }
    };
    perform_promise_then_native(agent, awaited_promise, on_fulfilled, on_rejected);
}

fn resume_body(agent: &RefCell<Agent>, promise: Object, body: &Rc<RefCell<Option<BoxedBody>>>, suspension: &Rc<Suspension>) {
    let mut owned = body.borrow_mut().take().expect("async function body resumed twice");
    match drive_boxed_body(&mut owned) {
        Poll::Ready(completion) => settle_from_completion(agent, promise, completion),
        Poll::Pending => park_on_await(agent, promise, owned, suspension.clone()),
    }
}
