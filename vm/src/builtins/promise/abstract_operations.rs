// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.2.1 Promise Abstract Operations](https://tc39.es/ecma262/#sec-promise-abstract-operations)

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{PromiseCapability, PromiseData, PromiseReaction, PromiseReactionType, PromiseState, ReactionHandler};
use crate::ecmascript::abstract_operations::operations_on_objects::{call_function, get_property, is_callable};
use crate::ecmascript::execution::agent::{Agent, ExceptionType, Job, JsResult};
use crate::ecmascript::types::language::function::{
    BuiltinFunctionData, EcmaFunctionData, FunctionData, PromiseResolvingFunctionData,
};
use crate::ecmascript::types::language::object::property_key::PropertyKey;
use crate::ecmascript::types::language::object::{ExoticData, Object, ObjectHeapData};
use crate::ecmascript::types::language::value::Value;
use crate::heap::CreateHeapData;

/// ### [27.2.1.5 NewPromiseCapability ( C )](https://tc39.es/ecma262/#sec-newpromisecapability)
///
/// `C` is always the built-in `%Promise%` constructor in this crate (no
/// subclassing support), so there's nothing to call back into — this just
/// allocates the promise object directly.
pub fn new_promise_capability(agent: &RefCell<Agent>) -> PromiseCapability {
    let promise = new_promise_object(agent);
    PromiseCapability { promise }
}

pub fn new_promise_object(agent: &RefCell<Agent>) -> Object {
    let prototype = agent.borrow().current_realm().intrinsics().promise_prototype;
    let mut a = agent.borrow_mut();
    a.heap.create(ObjectHeapData {
        prototype,
        extensible: true,
        properties: Default::default(),
        exotic: ExoticData::Promise(PromiseData::default()),
    })
}

/// ### [27.2.1.3 CreateResolvingFunctions ( promise )](https://tc39.es/ecma262/#sec-createresolvingfunctions)
pub fn create_resolving_functions(agent: &RefCell<Agent>, promise: Object) -> (Value, Value) {
    let already_resolved = Rc::new(Cell::new(false));
    let function_prototype = agent.borrow().current_realm().intrinsics().function_prototype;
    let mut a = agent.borrow_mut();
    let resolve = a.heap.create(ObjectHeapData {
        prototype: function_prototype,
        extensible: true,
        properties: Default::default(),
        exotic: ExoticData::Function(FunctionData::PromiseResolving(PromiseResolvingFunctionData {
            promise,
            is_reject: false,
            already_resolved: already_resolved.clone(),
        })),
    });
    let reject = a.heap.create(ObjectHeapData {
        prototype: function_prototype,
        extensible: true,
        properties: Default::default(),
        exotic: ExoticData::Function(FunctionData::PromiseResolving(PromiseResolvingFunctionData {
            promise,
            is_reject: true,
            already_resolved,
        })),
    });
    (Value::Object(resolve), Value::Object(reject))
}

/// ### [27.2.1.3.1/.2 Promise Resolve/Reject Functions](https://tc39.es/ecma262/#sec-promise-reject-functions)
///
/// Dispatched directly from `operations_on_objects::call_object` for the
/// `FunctionData::PromiseResolving` variant.
pub fn call_resolving_function(
    agent: &RefCell<Agent>,
    data: &PromiseResolvingFunctionData,
    args: &[Value],
) -> JsResult<Value> {
    if data.already_resolved.get() {
        return Ok(Value::Undefined);
    }
    data.already_resolved.set(true);
    let argument = args.first().copied().unwrap_or(Value::Undefined);
    if data.is_reject {
        reject_promise(agent, data.promise, argument);
    } else {
        resolve_promise(agent, data.promise, argument)?;
    }
    Ok(Value::Undefined)
}

/// ### [27.2.1.3.2 Promise Resolve Functions](https://tc39.es/ecma262/#sec-promise-resolve-functions), steps 7-16
fn resolve_promise(agent: &RefCell<Agent>, promise: Object, resolution: Value) -> JsResult<()> {
    if let Value::Object(o) = resolution {
        if o == promise {
            let error = agent
                .borrow_mut()
                .throw_exception_with_static_message(ExceptionType::TypeError, "Chaining cycle detected for promise");
            reject_promise(agent, promise, error.value());
            return Ok(());
        }
    }
    let Value::Object(resolution_object) = resolution else {
        fulfill_promise(agent, promise, resolution);
        return Ok(());
    };
    let then_key = PropertyKey::from_static_str("then");
    let then_action = match get_property(agent, resolution_object, &then_key) {
        Ok(v) => v,
        Err(e) => {
            reject_promise(agent, promise, e.value());
            return Ok(());
        }
    };
    if !is_callable(&agent.borrow(), then_action) {
        fulfill_promise(agent, promise, resolution);
        return Ok(());
    }
    let (resolve, reject) = create_resolving_functions(agent, promise);
    let realm = agent.borrow().current_realm_id();
    agent.borrow_mut().job_queue.push_back(Job::new(Some(realm), move |agent| {
        match call_function(agent, then_action, resolution, &[resolve, reject]) {
            Ok(_) => Ok(()),
            Err(e) => call_function(agent, reject, Value::Undefined, &[e.value()]).map(|_| ()),
        }
    }));
    Ok(())
}

/// ### [27.2.1.4 FulfillPromise ( promise, value )](https://tc39.es/ecma262/#sec-fulfillpromise)
pub fn fulfill_promise(agent: &RefCell<Agent>, promise: Object, value: Value) {
    let reactions = {
        let mut a = agent.borrow_mut();
        let ExoticData::Promise(data) = &mut a.heap[promise.0].exotic else {
            unreachable!("fulfill_promise called on a non-promise object")
        };
        let reactions = match &mut data.state {
            PromiseState::Pending { fulfill_reactions, .. } => std::mem::take(fulfill_reactions),
            _ => return,
        };
        data.state = PromiseState::Fulfilled { result: value };
        reactions
    };
    trigger_promise_reactions(agent, reactions, value);
}

/// ### [27.2.1.7 RejectPromise ( promise, reason )](https://tc39.es/ecma262/#sec-rejectpromise)
pub fn reject_promise(agent: &RefCell<Agent>, promise: Object, reason: Value) {
    let reactions = {
        let mut a = agent.borrow_mut();
        let ExoticData::Promise(data) = &mut a.heap[promise.0].exotic else {
            unreachable!("reject_promise called on a non-promise object")
        };
        let reactions = match &mut data.state {
            PromiseState::Pending { reject_reactions, .. } => std::mem::take(reject_reactions),
            _ => return,
        };
        let is_handled = !reactions.is_empty();
        data.state = PromiseState::Rejected { result: reason, is_handled };
        reactions
    };
    if reactions.is_empty() {
        agent.borrow_mut().mark_rejection_unhandled(promise);
    }
    trigger_promise_reactions(agent, reactions, reason);
}

/// ### [27.2.1.8 TriggerPromiseReactions ( reactions, argument )](https://tc39.es/ecma262/#sec-triggerpromisereactions)
fn trigger_promise_reactions(agent: &RefCell<Agent>, reactions: Vec<PromiseReaction>, argument: Value) {
    let realm = agent.borrow().current_realm_id();
    for reaction in reactions {
        agent.borrow_mut().job_queue.push_back(Job::new(Some(realm), move |agent| {
            run_promise_reaction_job(agent, &reaction, argument)
        }));
    }
}

/// ### [27.2.2.1 NewPromiseReactionJob ( reaction, argument )](https://tc39.es/ecma262/#sec-newpromisereactionjob) body
fn run_promise_reaction_job(agent: &RefCell<Agent>, reaction: &PromiseReaction, argument: Value) -> JsResult<()> {
    if let ReactionHandler::Native(f) = &reaction.handler {
        f(agent, argument);
        return Ok(());
    }
    let handler_result = match &reaction.handler {
        ReactionHandler::Empty => match reaction.reaction_type {
            PromiseReactionType::Fulfill => Ok(argument),
            PromiseReactionType::Reject => Err(crate::ecmascript::execution::agent::JsError::new(argument)),
        },
        ReactionHandler::Callback(handler) => call_function(agent, *handler, Value::Undefined, &[argument]),
        ReactionHandler::Native(_) => unreachable!(),
    };
    let Some(capability) = reaction.capability else {
        return Ok(());
    };
    match handler_result {
        Ok(value) => resolve_promise(agent, capability.promise, value),
        Err(e) => {
            reject_promise(agent, capability.promise, e.value());
            Ok(())
        }
    }
}

/// ### [27.2.5.4.1 PerformPromiseThen ( promise, onFulfilled, onRejected [ , resultCapability ] )](https://tc39.es/ecma262/#sec-performpromisethen)
pub fn perform_promise_then(
    agent: &RefCell<Agent>,
    promise: Object,
    on_fulfilled: Value,
    on_rejected: Value,
    result_capability: Option<PromiseCapability>,
) {
    let fulfill_handler = if is_callable(&agent.borrow(), on_fulfilled) {
        ReactionHandler::Callback(on_fulfilled)
    } else {
        ReactionHandler::Empty
    };
    let reject_handler = if is_callable(&agent.borrow(), on_rejected) {
        ReactionHandler::Callback(on_rejected)
    } else {
        ReactionHandler::Empty
    };
    let fulfill_reaction = PromiseReaction {
        capability: result_capability,
        reaction_type: PromiseReactionType::Fulfill,
        handler: fulfill_handler,
    };
    let reject_reaction = PromiseReaction {
        capability: result_capability,
        reaction_type: PromiseReactionType::Reject,
        handler: reject_handler,
    };
    let mut a = agent.borrow_mut();
    let ExoticData::Promise(data) = &mut a.heap[promise.0].exotic else {
        unreachable!("perform_promise_then called on a non-promise object")
    };
    match &mut data.state {
        PromiseState::Pending { fulfill_reactions, reject_reactions, .. } => {
            fulfill_reactions.push(fulfill_reaction);
            reject_reactions.push(reject_reaction);
            return;
        }
        PromiseState::Fulfilled { result } => {
            let result = *result;
            drop(a);
            trigger_promise_reactions(agent, vec![fulfill_reaction], result);
        }
        PromiseState::Rejected { result, is_handled } => {
            let result = *result;
            *is_handled = true;
            drop(a);
            agent.borrow_mut().mark_rejection_handled(promise);
            trigger_promise_reactions(agent, vec![reject_reaction], result);
        }
    }
}

/// Internal variant of [`perform_promise_then`] for this crate's own
/// `await`-continuation machinery (`control_abstraction::async_function`):
/// registers plain Rust closures as reactions instead of `Value` function
/// objects, with no result capability — the continuation drives the
/// suspended body itself rather than needing a derived promise.
pub fn perform_promise_then_native(
    agent: &RefCell<Agent>,
    promise: Object,
    on_fulfilled: impl FnOnce(&RefCell<Agent>, Value) -> JsResult<()> + 'static,
    on_rejected: impl FnOnce(&RefCell<Agent>, Value) -> JsResult<()> + 'static,
) {
    let on_fulfilled = RefCell::new(Some(on_fulfilled));
    let on_rejected = RefCell::new(Some(on_rejected));
    let fulfill_reaction = PromiseReaction {
        capability: None,
        reaction_type: PromiseReactionType::Fulfill,
        handler: ReactionHandler::Native(Rc::new(move |agent: &RefCell<Agent>, value: Value| {
            if let Some(f) = on_fulfilled.borrow_mut().take() {
                let _ = f(agent, value);
            }
        })),
    };
    let reject_reaction = PromiseReaction {
        capability: None,
        reaction_type: PromiseReactionType::Reject,
        handler: ReactionHandler::Native(Rc::new(move |agent: &RefCell<Agent>, reason: Value| {
            if let Some(f) = on_rejected.borrow_mut().take() {
                let _ = f(agent, reason);
            }
        })),
    };
    let mut a = agent.borrow_mut();
    let ExoticData::Promise(data) = &mut a.heap[promise.0].exotic else {
        unreachable!("perform_promise_then_native called on a non-promise object")
    };
    match &mut data.state {
        PromiseState::Pending { fulfill_reactions, reject_reactions, .. } => {
            fulfill_reactions.push(fulfill_reaction);
            reject_reactions.push(reject_reaction);
        }
        PromiseState::Fulfilled { result } => {
            let result = *result;
            drop(a);
            trigger_promise_reactions(agent, vec![fulfill_reaction], result);
        }
        PromiseState::Rejected { result, is_handled } => {
            let result = *result;
            *is_handled = true;
            drop(a);
            agent.borrow_mut().mark_rejection_handled(promise);
            trigger_promise_reactions(agent, vec![reject_reaction], result);
        }
    }
}

/// Convenience used by `await` evaluation and `Promise.resolve`: wraps a
/// plain value in an already-fulfilled promise without going through
/// `resolve_promise`'s thenable check (the caller already knows `value` is
/// not a thenable it needs to adopt state from, e.g. `await` on a
/// non-promise).
pub fn promise_resolve(agent: &RefCell<Agent>, value: Value) -> Object {
    if let Value::Object(o) = value {
        let is_promise = matches!(&agent.borrow().heap[o.0].exotic, ExoticData::Promise(_));
        if is_promise {
            return o;
        }
    }
    let promise = new_promise_object(agent);
    fulfill_promise(agent, promise, value);
    promise
}

/// A builtin-constructor-shaped entry point for `new Promise(executor)`,
/// registered as `%Promise%` by `builtins::prelude`.
pub fn promise_constructor(agent: &RefCell<Agent>, _this: Value, args: &[Value]) -> JsResult<Value> {
    let executor = args.first().copied().unwrap_or(Value::Undefined);
    if !is_callable(&agent.borrow(), executor) {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Promise resolver is not a function"));
    }
    let promise = new_promise_object(agent);
    let (resolve, reject) = create_resolving_functions(agent, promise);
    if let Err(e) = call_function(agent, executor, Value::Undefined, &[resolve, reject]) {
        reject_promise(agent, promise, e.value());
    }
    Ok(Value::Object(promise))
}

pub(crate) const _ASSERT_UNUSED_IMPORTS: () = {
    let _ = std::mem::size_of::<BuiltinFunctionData>();
    let _ = std::mem::size_of::<EcmaFunctionData>();
};

/// ### [27.2.5.4 Promise.prototype.then ( onFulfilled, onRejected )](https://tc39.es/ecma262/#sec-promise.prototype.then)
pub fn promise_then(agent: &RefCell<Agent>, this: Value, args: &[Value]) -> JsResult<Value> {
    let Value::Object(promise) = this else {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Promise.prototype.then called on non-promise"));
    };
    let on_fulfilled = args.first().copied().unwrap_or(Value::Undefined);
    let on_rejected = args.get(1).copied().unwrap_or(Value::Undefined);
    let capability = new_promise_capability(agent);
    perform_promise_then(agent, promise, on_fulfilled, on_rejected, Some(capability));
    Ok(Value::Object(capability.promise))
}

/// ### [27.2.5.1 Promise.prototype.catch ( onRejected )](https://tc39.es/ecma262/#sec-promise.prototype.catch)
pub fn promise_catch(agent: &RefCell<Agent>, this: Value, args: &[Value]) -> JsResult<Value> {
    let on_rejected = args.first().copied().unwrap_or(Value::Undefined);
    promise_then(agent, this, &[Value::Undefined, on_rejected])
}

/// ### [27.2.4.5 Promise.resolve ( x )](https://tc39.es/ecma262/#sec-promise.resolve)
pub fn promise_resolve_static(agent: &RefCell<Agent>, _this: Value, args: &[Value]) -> JsResult<Value> {
    Ok(Value::Object(promise_resolve(agent, args.first().copied().unwrap_or(Value::Undefined))))
}

/// ### [27.2.4.7 Promise.reject ( r )](https://tc39.es/ecma262/#sec-promise.reject)
pub fn promise_reject_static(agent: &RefCell<Agent>, _this: Value, args: &[Value]) -> JsResult<Value> {
    let promise = new_promise_object(agent);
    reject_promise(agent, promise, args.first().copied().unwrap_or(Value::Undefined));
    Ok(Value::Object(promise))
}

/// Builds `Promise.prototype`/`Promise`, called from `builtins::prelude`.
pub fn install(agent: &RefCell<Agent>, object_prototype: Object, function_prototype: Option<Object>) -> JsResult<()> {
    use crate::builtins::ordinary::{create_builtin_function, define_builtin_method};
    use crate::ecmascript::abstract_operations::operations_on_objects::create_data_property_or_throw;

    let promise_prototype = {
        let mut a = agent.borrow_mut();
        a.heap.create(ObjectHeapData::new_ordinary(Some(object_prototype)))
    };
    define_builtin_method(agent, promise_prototype, "then", 2, promise_then, function_prototype)?;
    define_builtin_method(agent, promise_prototype, "catch", 1, promise_catch, function_prototype)?;

    let promise_ctor = create_builtin_function(agent, promise_constructor, Some(promise_constructor), "Promise", 1, function_prototype);
    create_data_property_or_throw(agent, promise_ctor, "prototype", Value::Object(promise_prototype))?;
    define_builtin_method(agent, promise_ctor, "resolve", 1, promise_resolve_static, function_prototype)?;
    define_builtin_method(agent, promise_ctor, "reject", 1, promise_reject_static, function_prototype)?;

    let mut a = agent.borrow_mut();
    let intrinsics = a.current_realm_mut().intrinsics_mut();
    intrinsics.promise_prototype = Some(promise_prototype);
    intrinsics.promise_constructor = Some(promise_ctor);
    Ok(())
}
