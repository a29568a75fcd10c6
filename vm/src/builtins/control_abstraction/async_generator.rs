// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.6 AsyncGeneratorFunction Objects](https://tc39.es/ecma262/#sec-asyncgeneratorfunction-objects)
//!
//! Combines this crate's generator machinery ([`super::generator`]) with its
//! async-await continuation ([`super::async_function`]): an async generator body is an
//! `async fn` that can suspend at either a `yield` or an `await`; each
//! `next()`/`return()`/`throw()` call produces a Promise for the resulting
//! `{value, done}` pair rather than returning it directly.

use std::cell::RefCell;
use std::rc::Rc;
use std::task::Poll;

use crate::builtins::promise::abstract_operations::{fulfill_promise, new_promise_object, reject_promise};
use crate::ecmascript::abstract_operations::operations_on_iterator_objects::create_iter_result_object;
use crate::ecmascript::execution::agent::{Agent, ExceptionType, JsResult};
use crate::ecmascript::types::language::object::{ExoticData, Object};
use crate::ecmascript::types::language::value::Value;
use crate::ecmascript::types::spec::completion::Completion;
use crate::engine::{drive_boxed_body, BoxedBody, Suspension, SuspendedOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncGeneratorState {
    SuspendedStart,
    SuspendedYield,
    Executing,
    AwaitingReturn,
    Completed,
}

pub struct AsyncGeneratorData {
    pub state: AsyncGeneratorState,
    pub body: Option<BoxedBody>,
    pub suspension: Rc<Suspension>,
    /// `next`/`return`/`throw` calls queued while the generator is already
    /// executing or awaiting, drained one at a time as the generator
    /// reaches its next suspend point (27.6.3.8 AsyncGeneratorDrainQueue).
    pub queue: Vec<(Completion, Object)>,
}

impl std::fmt::Debug for AsyncGeneratorData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncGeneratorData")
            .field("state", &self.state)
            .field("body", &self.body.is_some())
            .field("queue_len", &self.queue.len())
            .finish()
    }
}

impl AsyncGeneratorData {
    pub fn new(body: BoxedBody, suspension: Rc<Suspension>) -> Self {
        Self { state: AsyncGeneratorState::SuspendedStart, body: Some(body), suspension, queue: Vec::new() }
    }
}

fn data_mut(agent: &mut Agent, generator: Object) -> &mut AsyncGeneratorData {
    match &mut agent.heap[generator.0].exotic {
        ExoticData::AsyncGenerator(data) => data,
        _ => unreachable!("async generator operation called on a non-async-generator object"),
    }
}

/// ### [27.6.3.7/.8/.9 AsyncGeneratorEnqueue / Resume / Drain](https://tc39.es/ecma262/#sec-asyncgeneratorenqueue)
///
/// Request entry points for `next`/`return`/`throw`: each produces its own
/// result Promise and queues the request if the generator is busy.
pub fn async_generator_enqueue(agent: &RefCell<Agent>, generator: Object, completion: Completion) -> Object {
    let result_promise = new_promise_object(agent);
    let state = data_mut(&mut agent.borrow_mut(), generator).state;
    {
        let mut a = agent.borrow_mut();
        data_mut(&mut a, generator).queue.push((completion, result_promise));
    }
    if state != AsyncGeneratorState::Executing && state != AsyncGeneratorState::AwaitingReturn {
        drain_queue(agent, generator);
    }
    result_promise
}

fn drain_queue(agent: &RefCell<Agent>, generator: Object) {
    loop {
        let state = data_mut(&mut agent.borrow_mut(), generator).state;
        if state == AsyncGeneratorState::Executing || state == AsyncGeneratorState::AwaitingReturn {
            return;
        }
        let next = {
            let mut a = agent.borrow_mut();
            let data = data_mut(&mut a, generator);
            if data.queue.is_empty() {
                return;
            }
            data.queue.remove(0)
        };
        let (completion, result_promise) = next;
        if state == AsyncGeneratorState::Completed {
            settle_request(agent, result_promise, completion_to_iter_result(agent, completion));
            continue;
        }
        resume(agent, generator, result_promise, completion);
        return;
    }
}

fn completion_to_iter_result(agent: &RefCell<Agent>, completion: Completion) -> JsResult<Value> {
    match completion {
        Completion::Throw(e) => Err(e),
        Completion::Return(v) => create_iter_result_object(agent, v, true).map(Value::Object),
        _ => create_iter_result_object(agent, Value::Undefined, true).map(Value::Object),
    }
}

fn settle_request(agent: &RefCell<Agent>, result_promise: Object, result: JsResult<Value>) {
    match result {
        Ok(v) => fulfill_promise(agent, result_promise, v),
        Err(e) => reject_promise(agent, result_promise, e.value()),
    }
}

fn resume(agent: &RefCell<Agent>, generator: Object, result_promise: Object, completion: Completion) {
    let (suspension, was_suspended_yield) = {
        let mut a = agent.borrow_mut();
        let data = data_mut(&mut a, generator);
        let was_yield = data.state == AsyncGeneratorState::SuspendedYield;
        data.state = AsyncGeneratorState::Executing;
        (data.suspension.clone(), was_yield)
    };
    if was_suspended_yield {
        suspension.inject_resume(completion);
    }
    let mut body = {
        let mut a = agent.borrow_mut();
        data_mut(&mut a, generator).body.take().expect("async generator body missing while suspended")
    };
    match drive_boxed_body(&mut body) {
        Poll::Ready(result) => {
            {
                let mut a = agent.borrow_mut();
                let data = data_mut(&mut a, generator);
                data.state = AsyncGeneratorState::Completed;
                data.body = None;
            }
            settle_request(agent, result_promise, completion_to_iter_result(agent, result));
            drain_queue(agent, generator);
        }
        Poll::Pending => match suspension.take_pending() {
            Some(SuspendedOp::Yield(v)) => {
                {
                    let mut a = agent.borrow_mut();
                    let data = data_mut(&mut a, generator);
                    data.state = AsyncGeneratorState::SuspendedYield;
                    data.body = Some(body);
                }
                let result = create_iter_result_object(agent, v, false).map(Value::Object);
                settle_request(agent, result_promise, result);
                drain_queue(agent, generator);
            }
            Some(SuspendedOp::Await(awaited)) => {
                {
                    let mut a = agent.borrow_mut();
                    let data = data_mut(&mut a, generator);
                    data.state = AsyncGeneratorState::AwaitingReturn;
                    data.body = Some(body);
                }
                await_then_resume(agent, generator, result_promise, awaited, suspension);
            }
            None => unreachable!("an async generator body parked without announcing an op"),
        },
    }
}

fn await_then_resume(agent: &RefCell<Agent>, generator: Object, result_promise: Object, awaited: Value, suspension: Rc<Suspension>) {
    let awaited_promise = crate::builtins::promise::abstract_operations::promise_resolve(agent, awaited);
    let on_fulfilled = {
        let suspension = suspension.clone();
        move |agent: &RefCell<Agent>, value: Value| -> JsResult<()> {
            suspension.inject_resume(Completion::Normal(value));
            resume(agent, generator, result_promise, Completion::Normal(Value::Undefined));
            Ok(())
        }
    };
    let on_rejected = move |agent: &RefCell<Agent>, reason: Value| -> JsResult<()> {
        suspension.inject_resume(Completion::Throw(crate::ecmascript::execution::agent::JsError::new(reason)));
        resume(agent, generator, result_promise, Completion::Normal(Value::Undefined));
        Ok(())
    };
    crate::builtins::promise::abstract_operations::perform_promise_then_native(agent, awaited_promise, on_fulfilled, on_rejected);
}

pub fn throw_not_async_generator(agent: &RefCell<Agent>) -> crate::ecmascript::execution::agent::JsError {
    agent
        .borrow_mut()
        .throw_exception_with_static_message(ExceptionType::TypeError, "value is not an async generator")
}

fn as_async_generator(agent: &RefCell<Agent>, this: Value) -> JsResult<Object> {
    if let Value::Object(o) = this {
        if matches!(&agent.borrow().heap[o.0].exotic, ExoticData::AsyncGenerator(_)) {
            return Ok(o);
        }
    }
    Err(throw_not_async_generator(agent))
}

/// ### [27.6.1.2 AsyncGenerator.prototype.next ( value )](https://tc39.es/ecma262/#sec-asyncgenerator-prototype-next)
fn async_generator_prototype_next(agent: &RefCell<Agent>, this: Value, args: &[Value]) -> JsResult<Value> {
    let generator = as_async_generator(agent, this)?;
    let value = args.first().copied().unwrap_or(Value::Undefined);
    Ok(Value::Object(async_generator_enqueue(agent, generator, Completion::Normal(value))))
}

/// ### [27.6.1.3 AsyncGenerator.prototype.return ( value )](https://tc39.es/ecma262/#sec-asyncgenerator-prototype-return)
fn async_generator_prototype_return(agent: &RefCell<Agent>, this: Value, args: &[Value]) -> JsResult<Value> {
    let generator = as_async_generator(agent, this)?;
    let value = args.first().copied().unwrap_or(Value::Undefined);
    Ok(Value::Object(async_generator_enqueue(agent, generator, Completion::Return(value))))
}

/// ### [27.6.1.4 AsyncGenerator.prototype.throw ( exception )](https://tc39.es/ecma262/#sec-asyncgenerator-prototype-throw)
fn async_generator_prototype_throw(agent: &RefCell<Agent>, this: Value, args: &[Value]) -> JsResult<Value> {
    let generator = as_async_generator(agent, this)?;
    let exception = args.first().copied().unwrap_or(Value::Undefined);
    let completion = Completion::Throw(crate::ecmascript::execution::agent::JsError::new(exception));
    Ok(Value::Object(async_generator_enqueue(agent, generator, completion)))
}

/// Builds `AsyncGeneratorFunction.prototype.prototype`. Unlike the
/// synchronous generator prototype, this one does *not* inherit from
/// `iterator_prototype` — §27.1's synchronous/async iterator hierarchies are
/// separate, and this crate does not model `%AsyncIteratorPrototype%`
/// separately since nothing but async generators ever reaches it.
pub fn install(agent: &RefCell<Agent>, object_prototype: Object, function_prototype: Option<Object>) -> JsResult<Object> {
    use crate::ecmascript::types::language::object::ObjectHeapData;
    use crate::heap::CreateHeapData;

    let async_generator_prototype = {
        let mut a = agent.borrow_mut();
        a.heap.create(ObjectHeapData::new_ordinary(Some(object_prototype)))
    };
    crate::builtins::ordinary::define_builtin_method(
        agent,
        async_generator_prototype,
        "next",
        1,
        async_generator_prototype_next,
        function_prototype,
    )?;
    crate::builtins::ordinary::define_builtin_method(
        agent,
        async_generator_prototype,
        "return",
        1,
        async_generator_prototype_return,
        function_prototype,
    )?;
    crate::builtins::ordinary::define_builtin_method(
        agent,
        async_generator_prototype,
        "throw",
        1,
        async_generator_prototype_throw,
        function_prototype,
    )?;
    Ok(async_generator_prototype)
}
