// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.5 GeneratorFunction Objects](https://tc39.es/ecma262/#sec-generatorfunction-objects)
//!
//! Driven by Rust's own `Future` state machine (see `crate::engine::suspension`)
//! instead of a bytecode VM: a generator body is an `async fn` over
//! the function's statement list, and a `yield` expression is a
//! [`crate::engine::SuspendPoint`] awaiting the shared [`Suspension`].

use std::cell::RefCell;
use std::rc::Rc;
use std::task::Poll;

use crate::ecmascript::abstract_operations::operations_on_iterator_objects::create_iter_result_object;
use crate::ecmascript::execution::agent::{Agent, ExceptionType, JsResult};
use crate::ecmascript::types::language::object::{ExoticData, Object};
use crate::ecmascript::types::language::value::Value;
use crate::ecmascript::types::spec::completion::Completion;
use crate::engine::{drive_boxed_body, BoxedBody, Suspension, SuspendedOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    SuspendedStart,
    SuspendedYield,
    Executing,
    Completed,
}

/// ### [27.5.1.1 Generator Instances](https://tc39.es/ecma262/#sec-generator-instances)
pub struct GeneratorData {
    pub state: GeneratorState,
    /// `None` only after the body has run to completion and its future has
    /// been dropped; `state` is `Completed` in that case.
    pub body: Option<BoxedBody>,
    pub suspension: Rc<Suspension>,
}

impl std::fmt::Debug for GeneratorData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorData")
            .field("state", &self.state)
            .field("body", &self.body.is_some())
            .finish()
    }
}

impl GeneratorData {
    pub fn new(body: BoxedBody, suspension: Rc<Suspension>) -> Self {
        Self { state: GeneratorState::SuspendedStart, body: Some(body), suspension }
    }
}

fn generator_data_mut(agent: &mut Agent, generator: Object) -> &mut GeneratorData {
    match &mut agent.heap[generator.0].exotic {
        ExoticData::Generator(data) => data,
        _ => unreachable!("generator_resume called on a non-generator object"),
    }
}

/// ### [27.5.3.3 GeneratorResume ( generator, value, generatorBrand )](https://tc39.es/ecma262/#sec-generatorresume)
pub fn generator_resume(agent: &RefCell<Agent>, generator: Object, value: Value) -> JsResult<Value> {
    let state = generator_data_mut(&mut agent.borrow_mut(), generator).state;
    match state {
        GeneratorState::Executing => {
            return Err(agent
                .borrow_mut()
                .throw_exception_with_static_message(ExceptionType::TypeError, "Generator is already running"));
        }
        GeneratorState::Completed => {
            let result = create_iter_result_object(agent, Value::Undefined, true)?;
            return Ok(Value::Object(result));
        }
        GeneratorState::SuspendedStart | GeneratorState::SuspendedYield => {}
    }
    drive_generator(agent, generator, state, Completion::Normal(value))
}

/// ### [27.5.3.4 GeneratorResumeAbrupt ( generator, resumptionValue, generatorBrand )](https://tc39.es/ecma262/#sec-generatorresumeabrupt)
pub fn generator_resume_abrupt(agent: &RefCell<Agent>, generator: Object, completion: Completion) -> JsResult<Value> {
    let state = generator_data_mut(&mut agent.borrow_mut(), generator).state;
    match state {
        GeneratorState::Executing => {
            return Err(agent
                .borrow_mut()
                .throw_exception_with_static_message(ExceptionType::TypeError, "Generator is already running"));
        }
        GeneratorState::SuspendedStart => {
            let mut a = agent.borrow_mut();
            let data = generator_data_mut(&mut a, generator);
            data.state = GeneratorState::Completed;
            data.body = None;
            drop(a);
            return match completion {
                Completion::Throw(e) => Err(e),
                Completion::Return(v) => {
                    let result = create_iter_result_object(agent, v, true)?;
                    Ok(Value::Object(result))
                }
                _ => {
                    let result = create_iter_result_object(agent, Value::Undefined, true)?;
                    Ok(Value::Object(result))
                }
            };
        }
        GeneratorState::Completed => {
            return match completion {
                Completion::Throw(e) => Err(e),
                Completion::Return(v) => {
                    let result = create_iter_result_object(agent, v, true)?;
                    Ok(Value::Object(result))
                }
                _ => {
                    let result = create_iter_result_object(agent, Value::Undefined, true)?;
                    Ok(Value::Object(result))
                }
            };
        }
        GeneratorState::SuspendedYield => {}
    }
    drive_generator(agent, generator, state, completion)
}

fn drive_generator(
    agent: &RefCell<Agent>,
    generator: Object,
    prior_state: GeneratorState,
    resume_with: Completion,
) -> JsResult<Value> {
    let suspension = {
        let mut a = agent.borrow_mut();
        let data = generator_data_mut(&mut a, generator);
        data.state = GeneratorState::Executing;
        data.suspension.clone()
    };
    if prior_state == GeneratorState::SuspendedYield {
        suspension.inject_resume(resume_with);
    }
    let mut body = {
        let mut a = agent.borrow_mut();
        generator_data_mut(&mut a, generator).body.take().expect("generator body missing while suspended")
    };
    let poll = drive_boxed_body(&mut body);
    match poll {
        Poll::Ready(completion) => {
            let mut a = agent.borrow_mut();
            let data = generator_data_mut(&mut a, generator);
            data.state = GeneratorState::Completed;
            data.body = None;
            drop(a);
            match completion {
                Completion::Return(v) | Completion::Normal(v) => {
                    let result = create_iter_result_object(agent, v, true)?;
                    Ok(Value::Object(result))
                }
                Completion::Throw(e) => Err(e),
                Completion::Break(_) | Completion::Continue(_) => {
                    unreachable!("a generator body completed with a stray break/continue")
                }
            }
        }
        Poll::Pending => {
            let pending = suspension.take_pending();
            let mut a = agent.borrow_mut();
            let data = generator_data_mut(&mut a, generator);
            data.state = GeneratorState::SuspendedYield;
            data.body = Some(body);
            drop(a);
            match pending {
                Some(SuspendedOp::Yield(v)) => {
                    let result = create_iter_result_object(agent, v, false)?;
                    Ok(Value::Object(result))
                }
                Some(SuspendedOp::Await(_)) | None => {
                    unreachable!("a synchronous generator body awaited")
                }
            }
        }
    }
}

fn as_generator(agent: &RefCell<Agent>, this: Value) -> JsResult<Object> {
    if let Value::Object(o) = this {
        if matches!(&agent.borrow().heap[o.0].exotic, ExoticData::Generator(_)) {
            return Ok(o);
        }
    }
    Err(agent
        .borrow_mut()
        .throw_exception_with_static_message(ExceptionType::TypeError, "value is not a generator"))
}

/// ### [27.5.1.2 Generator.prototype.next ( value )](https://tc39.es/ecma262/#sec-generator.prototype.next)
fn generator_prototype_next(agent: &RefCell<Agent>, this: Value, args: &[Value]) -> JsResult<Value> {
    let generator = as_generator(agent, this)?;
    generator_resume(agent, generator, args.first().copied().unwrap_or(Value::Undefined))
}

/// ### [27.5.1.3 Generator.prototype.return ( value )](https://tc39.es/ecma262/#sec-generator.prototype.return)
fn generator_prototype_return(agent: &RefCell<Agent>, this: Value, args: &[Value]) -> JsResult<Value> {
    let generator = as_generator(agent, this)?;
    generator_resume_abrupt(agent, generator, Completion::Return(args.first().copied().unwrap_or(Value::Undefined)))
}

/// ### [27.5.1.4 Generator.prototype.throw ( exception )](https://tc39.es/ecma262/#sec-generator.prototype.throw)
fn generator_prototype_throw(agent: &RefCell<Agent>, this: Value, args: &[Value]) -> JsResult<Value> {
    let generator = as_generator(agent, this)?;
    let exception = args.first().copied().unwrap_or(Value::Undefined);
    generator_resume_abrupt(
        agent,
        generator,
        Completion::Throw(crate::ecmascript::execution::agent::JsError::new(exception)),
    )
}

/// Builds `GeneratorFunction.prototype.prototype` (i.e. the object every
/// generator instance inherits from). Its prototype is `iterator_prototype`
/// (built by `builtins::prelude`, whose own `[Symbol.iterator]` returns
/// `this`), so generator instances satisfy the iterator protocol's
/// "an iterator is also iterable" clause through the chain rather than
/// needing their own copy of that method.
pub fn install(
    agent: &RefCell<Agent>,
    iterator_prototype: Object,
    function_prototype: Option<Object>,
) -> JsResult<Object> {
    use crate::ecmascript::types::language::object::ObjectHeapData;
    use crate::heap::CreateHeapData;

    let generator_prototype = {
        let mut a = agent.borrow_mut();
        a.heap.create(ObjectHeapData::new_ordinary(Some(iterator_prototype)))
    };
    crate::builtins::ordinary::define_builtin_method(agent, generator_prototype, "next", 1, generator_prototype_next, function_prototype)?;
    crate::builtins::ordinary::define_builtin_method(
        agent,
        generator_prototype,
        "return",
        1,
        generator_prototype_return,
        function_prototype,
    )?;
    crate::builtins::ordinary::define_builtin_method(
        agent,
        generator_prototype,
        "throw",
        1,
        generator_prototype_throw,
        function_prototype,
    )?;
    Ok(generator_prototype)
}
