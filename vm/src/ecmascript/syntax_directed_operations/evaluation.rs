// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [Runtime Semantics: Evaluation](https://tc39.es/ecma262/#sec-runtime-semantics-evaluation)
//!
//! The tree walker proper. [`eval_expression`]/[`eval_statement`]/[`eval_reference`]
//! are mutually recursive over [`crate::ast`] and each other; every crossing
//! between them goes through `Box::pin(...).await` to keep the resulting
//! future's size finite (the same pattern `binding_patterns::binding_initialization`
//! already uses for its own recursion). A `yield`/`await` expression suspends
//! through `ctx`'s active [`crate::engine::Suspension`] rather than actually
//! blocking, so these functions only ever run to a `Poll::Pending` boundary
//! when called from a generator/async function body — see
//! `crate::engine::suspension` and [`call_ecma_function`]/[`construct_ecma_function`].

use std::cell::RefCell;
use std::rc::Rc;

use num_bigint::BigInt as NumBigInt;

use crate::ast;
use crate::builtins::promise::abstract_operations::{async_function_start, new_promise_object};
use crate::ecmascript::abstract_operations::operations_on_iterator_objects::{
    create_iter_result_object, get_iterator, iterator_close, iterator_step, iterator_value, IteratorRecord,
};
use crate::ecmascript::abstract_operations::operations_on_objects::{
    call_function, construct, create_data_property_or_throw_key, delete_property_or_throw, get_property, is_callable,
    make_basic_object, set_property,
};
use crate::ecmascript::abstract_operations::testing_and_comparison::{is_less_than, is_loosely_equal, is_same_type, is_strictly_equal, same_value_non_number};
use crate::ecmascript::abstract_operations::type_conversion::{
    number_to_string_radix10, to_boolean, to_int32, to_number, to_object, to_primitive, to_property_key, to_string, to_uint32, PreferredType,
};
use crate::ecmascript::execution::agent::{Agent, ExceptionType, JsError, JsResult};
use crate::ecmascript::execution::environments::function_environment::ThisBindingStatus;
use crate::ecmascript::execution::environments::{
    get_identifier_reference, get_this_environment, new_declarative_environment, new_function_environment, new_object_environment, Environment,
};
use crate::ecmascript::syntax_directed_operations::binding_patterns::{binding_initialization, get_v};
use crate::ecmascript::syntax_directed_operations::declaration_instantiation::{
    collect_param_names, collect_pattern_names, function_declaration_instantiation, instantiate_block_scope,
};
use crate::ecmascript::syntax_directed_operations::Ctx;
use crate::ecmascript::types::language::bigint::BigInt;
use crate::ecmascript::types::language::function::{
    ConstructorKind, EcmaFunctionData, FunctionData, ThisMode,
};
use crate::ecmascript::types::language::object::internal_methods;
use crate::ecmascript::types::language::object::property_key::PropertyKey;
use crate::ecmascript::types::language::object::{ExoticData, Object, ObjectHeapData};
use crate::ecmascript::types::language::string::JsString;
use crate::ecmascript::types::language::value::Value;
use crate::ecmascript::types::spec::completion::{Completion, ValueOrReference};
use crate::ecmascript::types::spec::property_descriptor::PartialPropertyDescriptor;
use crate::ecmascript::types::spec::reference::{Reference, ReferenceBase};
use crate::engine::suspension::{drive_to_first_suspend, erase_body_lifetime, run_to_completion, BoxedBody, SuspendPoint, Suspension, SuspendedOp};
use crate::heap::CreateHeapData;

/// Bails out of the enclosing `Completion`-returning function with whatever
/// non-`Normal` completion `$c` carries, otherwise yields its value. Used at
/// every point an expression needs a subexpression's plain value — it is the
/// `?`-operator equivalent for [`Completion`] rather than [`JsResult`].
macro_rules! val {
    ($c:expr) => {
        match $c {
            Completion::Normal(v) => v,
            other => return other,
        }
    };
}

/// Lifts a `JsResult` into the enclosing `Completion`-returning function,
/// turning `Err` into `Completion::Throw` instead of propagating a bare
/// `JsError`.
macro_rules! okc {
    ($r:expr) => {
        match $r {
            Ok(v) => v,
            Err(e) => return Completion::Throw(e),
        }
    };
}

fn js_string(agent: &RefCell<Agent>, s: &str) -> JsString {
    let mut a = agent.borrow_mut();
    JsString::from_string(&mut a.heap, s.to_owned())
}

fn str_key(agent: &RefCell<Agent>, s: &str) -> PropertyKey {
    PropertyKey::String(js_string(agent, s))
}

fn index_key(agent: &RefCell<Agent>, index: u32) -> PropertyKey {
    PropertyKey::String(js_string(agent, &index.to_string()))
}

// ======================================================================
// GetValue / PutValue — [6.2.5.5 / 6.2.5.6]
// ======================================================================

fn key_display(agent: &RefCell<Agent>, key: &PropertyKey) -> String {
    match key {
        PropertyKey::String(s) => {
            let a = agent.borrow();
            s.as_str(&a.heap).to_owned()
        }
        PropertyKey::Symbol(_) => "Symbol(...)".to_owned(),
    }
}

/// ### [6.2.5.5 GetValue ( V )](https://tc39.es/ecma262/#sec-getvalue)
pub fn get_value(agent: &RefCell<Agent>, reference: &Reference) -> JsResult<Value> {
    match &reference.base {
        ReferenceBase::Unresolvable => {
            let name = key_display(agent, &reference.referenced_name);
            Err(agent.borrow_mut().throw_exception(ExceptionType::ReferenceError, format!("{name} is not defined")))
        }
        ReferenceBase::Environment(env) => {
            let name = key_display(agent, &reference.referenced_name);
            env.get_binding_value(agent, &name, reference.strict)
        }
        ReferenceBase::Value(base) => match base {
            Value::Object(o) => get_property(agent, *o, &reference.referenced_name),
            Value::Undefined if reference.is_super_reference() => Ok(Value::Undefined),
            other => {
                let object = to_object(agent, *other)?;
                get_property(agent, object, &reference.referenced_name)
            }
        },
    }
}

/// ### [6.2.5.6 PutValue ( V, W )](https://tc39.es/ecma262/#sec-putvalue)
pub fn put_value(agent: &RefCell<Agent>, reference: &Reference, value: Value) -> JsResult<()> {
    match &reference.base {
        ReferenceBase::Unresolvable => {
            if reference.strict {
                let name = key_display(agent, &reference.referenced_name);
                return Err(agent.borrow_mut().throw_exception(ExceptionType::ReferenceError, format!("{name} is not defined")));
            }
            let global = { agent.borrow().current_realm().global_object() };
            set_property(agent, global, reference.referenced_name, value, false)
        }
        ReferenceBase::Environment(env) => {
            let name = key_display(agent, &reference.referenced_name);
            env.set_mutable_binding(agent, &name, value, reference.strict)
        }
        ReferenceBase::Value(base) => {
            let object = match base {
                Value::Object(o) => *o,
                other => to_object(agent, *other)?,
            };
            set_property(agent, object, reference.referenced_name, value, reference.strict)
        }
    }
}

// ======================================================================
// `this` / `super` / `new.target` resolution
// ======================================================================

/// Safe wrapper around `Environment::get_this_binding` for the one case it
/// can't express: reading `this` inside a derived-class constructor before
/// `super(...)` has run. `get_this_binding` itself panics there (it asserts
/// an invariant that holds everywhere else); this turns that into the
/// catchable `ReferenceError` [10.2.1.1 `%Function.prototype%`'s `[[Call]]`]
/// requires.
fn resolve_this_binding(agent: &RefCell<Agent>, env: Environment) -> JsResult<Value> {
    if let Environment::Function(idx) = env {
        let status = { agent.borrow().heap.function_environments[idx.into_index()].this_binding_status() };
        if status == ThisBindingStatus::Uninitialized {
            return Err(agent
                .borrow_mut()
                .throw_exception_with_static_message(ExceptionType::ReferenceError, "Must call super constructor before accessing 'this'"));
        }
    }
    Ok(env.get_this_binding(agent))
}

/// Walks `lexical` outward for the nearest Function Environment Record —
/// every function body's `ctx.lexical` bottoms out at one, so this never
/// needs to fall further than the function's own top-level scope.
fn active_function_environment(agent: &RefCell<Agent>, mut lexical: Environment) -> Environment {
    loop {
        if let Environment::Function(_) = lexical {
            return lexical;
        }
        lexical = lexical
            .outer_env(agent)
            .expect("a function body's lexical environment chain always contains a Function environment");
    }
}

fn new_target_value(agent: &RefCell<Agent>, ctx: Ctx) -> Value {
    let env = active_function_environment(agent, ctx.lexical);
    let Environment::Function(idx) = env else { return Value::Undefined };
    let new_target = { agent.borrow().heap.function_environments[idx.into_index()].new_target };
    new_target.map(Value::Object).unwrap_or(Value::Undefined)
}

/// ### [13.3.7.3 GetSuperBase ( )](https://tc39.es/ecma262/#sec-getsuperbase)
///
/// Finds the nearest environment with a super binding and reads its
/// function's home object's `[[Prototype]]`.
fn home_object_of(agent: &RefCell<Agent>, ctx: Ctx) -> JsResult<Object> {
    let mut env = ctx.lexical;
    loop {
        if env.has_super_binding(agent) {
            break;
        }
        match env.outer_env(agent) {
            Some(outer) => env = outer,
            None => {
                return Err(agent
                    .borrow_mut()
                    .throw_exception_with_static_message(ExceptionType::SyntaxError, "'super' keyword unexpected here"))
            }
        }
    }
    let Environment::Function(idx) = env else { unreachable!("has_super_binding only true for Function environments") };
    let function_object = { agent.borrow().heap.function_environments[idx.into_index()].function_object };
    let home = {
        let a = agent.borrow();
        match &a.heap[function_object.0].exotic {
            ExoticData::Function(FunctionData::Ecma(ecma)) => ecma.home_object,
            _ => None,
        }
    };
    home.ok_or_else(|| agent.borrow_mut().throw_exception_with_static_message(ExceptionType::SyntaxError, "'super' keyword unexpected here"))
}

fn super_base(agent: &RefCell<Agent>, ctx: Ctx) -> JsResult<Value> {
    let home = home_object_of(agent, ctx)?;
    let proto = { internal_methods::get_prototype_of(&agent.borrow(), home) };
    Ok(proto.map(Value::Object).unwrap_or(Value::Null))
}

// ======================================================================
// Property keys
// ======================================================================

pub async fn property_key_from_expr(agent: &RefCell<Agent>, ctx: Ctx, key: &ast::PropertyKeyExpr) -> JsResult<PropertyKey> {
    match key {
        ast::PropertyKeyExpr::Identifier(name) => Ok(str_key(agent, name)),
        // Private names are not modeled as a distinct brand-checked slot
        // kind (see DESIGN.md) — stored as ordinary string-keyed properties
        // under a `#`-prefixed name, which real user code cannot spell.
        ast::PropertyKeyExpr::PrivateName(name) => Ok(str_key(agent, &format!("#{name}"))),
        ast::PropertyKeyExpr::Computed(expr) => {
            let value = Box::pin(eval_expression(agent, ctx, expr)).await.into_value_or_throw()?;
            to_property_key(agent, value)
        }
    }
}

async fn member_property_key(agent: &RefCell<Agent>, ctx: Ctx, prop: &ast::MemberProperty) -> JsResult<PropertyKey> {
    match prop {
        ast::MemberProperty::Identifier(name) => Ok(str_key(agent, name)),
        ast::MemberProperty::PrivateName(name) => Ok(str_key(agent, &format!("#{name}"))),
        ast::MemberProperty::Computed(expr) => {
            let value = Box::pin(eval_expression(agent, ctx, expr)).await.into_value_or_throw()?;
            to_property_key(agent, value)
        }
    }
}

// ======================================================================
// Hidden-property helpers (`.name`/`.length`/`.prototype`/class members)
// ======================================================================

/// A non-writable, non-enumerable, configurable own data property — the
/// shape [20.2.4 function instances' `.length`/`.name`] and every class
/// method/accessor want, which `PartialPropertyDescriptor::new_data`'s
/// all-true defaults don't give us.
fn define_hidden(agent: &RefCell<Agent>, object: Object, key: PropertyKey, value: Value) {
    let _ = internal_methods::define_own_property(
        agent,
        object,
        key,
        PartialPropertyDescriptor {
            value: Some(value),
            writable: Some(false),
            enumerable: Some(false),
            configurable: Some(true),
            ..Default::default()
        },
    );
}

fn define_hidden_writable(agent: &RefCell<Agent>, object: Object, key: PropertyKey, value: Value) {
    let _ = internal_methods::define_own_property(
        agent,
        object,
        key,
        PartialPropertyDescriptor {
            value: Some(value),
            writable: Some(true),
            enumerable: Some(false),
            configurable: Some(true),
            ..Default::default()
        },
    );
}

/// `.prototype` on an ordinary (non-method, non-arrow) function: writable,
/// not enumerable, not configurable — [20.2.4.3].
fn define_own_prototype_slot(agent: &RefCell<Agent>, function_object: Object, proto_obj: Object) {
    let _ = internal_methods::define_own_property(
        agent,
        function_object,
        PropertyKey::from_static_str("prototype"),
        PartialPropertyDescriptor {
            value: Some(Value::Object(proto_obj)),
            writable: Some(true),
            enumerable: Some(false),
            configurable: Some(false),
            ..Default::default()
        },
    );
}

/// Class methods/accessors/getters/setters are never constructible and
/// never carry their own `.prototype` — only `make_ecma_function`'s ordinary
/// non-arrow/non-generator path assumes one exists, so this undoes it for
/// the method-definition call sites (class bodies, object-literal methods).
pub(crate) fn strip_own_prototype(agent: &RefCell<Agent>, function_object: Object) {
    let mut a = agent.borrow_mut();
    internal_methods::delete(&mut a, function_object, &PropertyKey::from_static_str("prototype"));
}

pub(crate) fn set_home_object(agent: &RefCell<Agent>, function_object: Object, home_object: Object) {
    let mut a = agent.borrow_mut();
    if let ExoticData::Function(FunctionData::Ecma(ecma)) = &mut a.heap[function_object.0].exotic {
        ecma.home_object = Some(home_object);
    }
}

fn set_function_name(agent: &RefCell<Agent>, function_object: Object, name: &str, prefix: Option<&str>) {
    let full = match prefix {
        Some(p) => format!("{p} {name}"),
        None => name.to_owned(),
    };
    define_hidden(agent, function_object, PropertyKey::from_static_str("name"), Value::String(js_string(agent, &full)));
}

fn property_key_display_for_name(agent: &RefCell<Agent>, key: &PropertyKey) -> String {
    key_display(agent, key)
}

// ======================================================================
// make_ecma_function — [10.2.3 OrdinaryFunctionCreate]
// ======================================================================

/// ### [10.2.3 OrdinaryFunctionCreate ( functionPrototype, sourceText, ParameterList, Body, thisMode, env, privateEnv )](https://tc39.es/ecma262/#sec-ordinaryfunctioncreate)
///
/// Builds a plain function object from a parsed [`ast::Function`], closing
/// over `ctx.lexical` as its `[[Environment]]`. Shared by function
/// declarations/expressions, object-literal methods, and class
/// methods/constructors — the latter two always post-process the result
/// with [`strip_own_prototype`]/[`set_home_object`], since a fresh own
/// `.prototype` and absent home object are only right for the plain case.
pub fn make_ecma_function(agent: &RefCell<Agent>, ctx: Ctx, definition: Rc<ast::Function>) -> Object {
    let this_mode = if definition.is_arrow {
        ThisMode::Lexical
    } else if definition.strict {
        ThisMode::Strict
    } else {
        ThisMode::Global
    };
    let strict = definition.strict;
    let realm = { agent.borrow().current_realm_id() };
    let function_prototype = { agent.borrow().current_realm().intrinsics().function_prototype };

    let ecma = EcmaFunctionData {
        definition: definition.clone(),
        environment: ctx.lexical,
        this_mode,
        strict,
        home_object: None,
        constructor_kind: None,
        realm,
        is_class_constructor: false,
        fields_to_initialize: Vec::new(),
    };
    let function_object = {
        let mut a = agent.borrow_mut();
        a.heap.create(ObjectHeapData {
            prototype: function_prototype,
            extensible: true,
            properties: Default::default(),
            exotic: ExoticData::Function(FunctionData::Ecma(ecma)),
        })
    };

    define_hidden(
        agent,
        function_object,
        PropertyKey::from_static_str("name"),
        Value::String(js_string(agent, definition.name.as_deref().unwrap_or(""))),
    );
    define_hidden(
        agent,
        function_object,
        PropertyKey::from_static_str("length"),
        Value::Number(definition.params.len() as f64),
    );

    if !definition.is_arrow {
        let object_prototype = { agent.borrow().current_realm().intrinsics().object_prototype };
        if definition.is_generator && definition.is_async {
            let proto = { agent.borrow().current_realm().intrinsics().async_generator_prototype }.or(Some(object_prototype));
            let own_proto = { let mut a = agent.borrow_mut(); a.heap.create(ObjectHeapData::new_ordinary(proto)) };
            define_own_prototype_slot(agent, function_object, own_proto);
        } else if definition.is_generator {
            let proto = { agent.borrow().current_realm().intrinsics().generator_prototype }.or(Some(object_prototype));
            let own_proto = { let mut a = agent.borrow_mut(); a.heap.create(ObjectHeapData::new_ordinary(proto)) };
            define_own_prototype_slot(agent, function_object, own_proto);
        } else if definition.is_async {
            // Plain async functions have no `.prototype` own property.
        } else {
            let own_proto = { let mut a = agent.borrow_mut(); a.heap.create(ObjectHeapData::new_ordinary(Some(object_prototype))) };
            define_hidden_writable(agent, own_proto, PropertyKey::from_static_str("constructor"), Value::Object(function_object));
            define_own_prototype_slot(agent, function_object, own_proto);
        }
    }

    function_object
}

// ======================================================================
// call_ecma_function / construct_ecma_function
// ======================================================================

fn make_call_ctx(agent: &RefCell<Agent>, ecma: &EcmaFunctionData) -> Environment {
    new_declarative_environment(agent, Some(ecma.environment))
}

async fn bind_arguments(agent: &RefCell<Agent>, ctx: Ctx, params: &[ast::BindingPattern], args: &[Value]) -> JsResult<()> {
    for (i, param) in params.iter().enumerate() {
        let value = args.get(i).copied().unwrap_or(Value::Undefined);
        binding_initialization(agent, ctx, param, value, Some(ctx.variable)).await?;
    }
    Ok(())
}

/// Plain (non-arrow) functions bind an `arguments`-like array of every call
/// argument when no parameter is itself literally named `arguments` — a
/// simplified stand-in for the real exotic Arguments object (no `callee`,
/// no parameter-index aliasing; see DESIGN.md). Mainly exists so a
/// synthesized implicit derived-class constructor has something to spread
/// into `super(...arguments)`.
fn bind_arguments_object(agent: &RefCell<Agent>, ctx: Ctx, params: &[ast::BindingPattern], args: &[Value]) -> JsResult<()> {
    let already_named = params.iter().any(|p| matches!(p, ast::BindingPattern::Identifier(n) if n == "arguments"));
    if already_named {
        return Ok(());
    }
    let array_prototype = { agent.borrow().current_realm().intrinsics().array_prototype };
    let array = {
        let mut a = agent.borrow_mut();
        internal_methods::array_create(&mut a, args.len() as u32, array_prototype)
    };
    for (i, value) in args.iter().enumerate() {
        create_data_property_or_throw_key(agent, array, index_key(agent, i as u32), *value)?;
    }
    if !ctx.variable.has_binding(agent, "arguments")? {
        ctx.variable.create_mutable_binding(agent, "arguments", false)?;
    }
    ctx.variable.initialize_binding(agent, "arguments", Value::Object(array))
}

/// Runs a function body's statement list to its `Return`/fall-off
/// completion, turning a normal (non-abrupt) completion into `undefined`
/// per [10.2.1 `[[Call]]`]'s "if result.[[Type]] is normal, return undefined".
async fn eval_function_body(agent: &RefCell<Agent>, ctx: Ctx, body: &ast::FunctionBody) -> Completion {
    match body {
        ast::FunctionBody::Expression(expr) => Box::pin(eval_expression(agent, ctx, expr)).await,
        ast::FunctionBody::Block(stmts) => match Box::pin(eval_statement_list(agent, ctx, stmts)).await {
            Completion::Return(v) => Completion::Normal(v),
            Completion::Normal(_) => Completion::normal_undefined(),
            other => other,
        },
    }
}

fn setup_function_ctx(
    agent: &RefCell<Agent>,
    ecma: &EcmaFunctionData,
    function_object: Object,
    this: Value,
    new_target: Option<Object>,
) -> JsResult<Ctx> {
    let this_binding_status = match ecma.this_mode {
        ThisMode::Lexical => unreachable!("arrow functions never reach setup_function_ctx"),
        _ if ecma.definition.is_arrow => unreachable!(),
        _ => ThisBindingStatus::Uninitialized,
    };
    let _ = this_binding_status;
    let function_env = new_function_environment(agent, function_object, ThisBindingStatus::Uninitialized, new_target, ecma.environment);
    let Environment::Function(idx) = function_env else { unreachable!() };
    let bound_this = if ecma.strict {
        this
    } else if this.is_nullish() {
        Value::Object(agent.borrow().current_realm().global_object())
    } else {
        Value::Object(to_object(agent, this)?)
    };
    {
        let mut a = agent.borrow_mut();
        a.heap.function_environments[idx.into_index()].bind_this_value(bound_this);
    }
    Ok(Ctx {
        lexical: function_env,
        variable: function_env,
        private: None,
        strict: ecma.strict,
        suspension: None,
    })
}

/// Builds the `Ctx`/environment a call to `ecma` runs in: arrow functions
/// simply inherit the closure's lexical/variable environment and `this`
/// ([10.2.1.1], first branch); everything else gets a fresh Function
/// Environment Record with its own `this` binding ([10.2.1.1], `OrdinaryCallBindThis`).
fn enter_call(agent: &RefCell<Agent>, ecma: &EcmaFunctionData, function_object: Object, this: Value, new_target: Option<Object>) -> JsResult<Ctx> {
    if ecma.definition.is_arrow {
        return Ok(Ctx {
            lexical: ecma.environment,
            variable: ecma.environment,
            private: None,
            strict: ecma.strict,
            suspension: None,
        });
    }
    setup_function_ctx(agent, ecma, function_object, this, new_target)
}

/// Builds the future that drives one call/construct's statement list,
/// erased to `BoxedBody` so it can be parked across a `yield`/`await` and
/// resumed later by the generator/async-function machinery in
/// `crate::builtins::control_abstraction`.
fn make_body_future<'a>(agent: &'a RefCell<Agent>, ctx: Ctx, ecma: &'a EcmaFunctionData, suspension: Rc<Suspension>) -> BoxedBody {
    let ctx = ctx.with_suspension(&suspension);
    let body = ecma.definition.body.clone();
    let param_names = collect_param_names(&ecma.definition.params);
    let fut: std::pin::Pin<Box<dyn std::future::Future<Output = Completion> + 'a>> = Box::pin(async move {
        let _suspension = suspension;
        if let Err(e) = function_declaration_instantiation(agent, ctx, body_stmts(&body), &param_names).await {
            return Completion::Throw(e);
        }
        eval_function_body(agent, ctx, &body).await
    });
    unsafe { erase_body_lifetime(fut) }
}

fn body_stmts(body: &ast::FunctionBody) -> &[ast::Statement] {
    match body {
        ast::FunctionBody::Block(stmts) => stmts,
        ast::FunctionBody::Expression(_) => &[],
    }
}

/// ### [10.2.1 \[\[Call\]\] ( thisArgument, argumentsList )](https://tc39.es/ecma262/#sec-ecmascript-function-objects-call-thisargument-argumentslist)
pub fn call_ecma_function(agent: &RefCell<Agent>, function_object: Object, ecma: &EcmaFunctionData, this: Value, args: &[Value]) -> JsResult<Value> {
    let ctx = enter_call(agent, ecma, function_object, this, None)?;
    if !ecma.definition.is_arrow {
        bind_arguments_object(agent, ctx, &ecma.definition.params, args)?;
    }
    bind_arguments_blocking(agent, ctx, &ecma.definition.params, args)?;

    if ecma.definition.is_generator && ecma.definition.is_async {
        return Ok(Value::Object(start_async_generator(agent, ctx, ecma, function_object)));
    }
    if ecma.definition.is_generator {
        return Ok(Value::Object(start_generator(agent, ctx, ecma, function_object)));
    }
    if ecma.definition.is_async {
        return Ok(start_async_function(agent, ctx, ecma));
    }

    let param_names = collect_param_names(&ecma.definition.params);
    function_declaration_instantiation_blocking(agent, ctx, body_stmts(&ecma.definition.body), &param_names)?;
    let completion = run_to_completion(eval_function_body(agent, ctx, &ecma.definition.body));
    completion.into_value_or_throw()
}

fn bind_arguments_blocking(agent: &RefCell<Agent>, ctx: Ctx, params: &[ast::BindingPattern], args: &[Value]) -> JsResult<()> {
    run_to_completion_result(Box::pin(bind_arguments(agent, ctx, params, args)))
}

fn function_declaration_instantiation_blocking(agent: &RefCell<Agent>, ctx: Ctx, body: &[ast::Statement], param_names: &[String]) -> JsResult<()> {
    run_to_completion_result(Box::pin(function_declaration_instantiation(agent, ctx, body, param_names)))
}

/// Plain (non-generator, non-async) helper bodies can't actually suspend —
/// the frontend never lowers a `yield`/`await` into one — so polling once
/// is equivalent to running to completion, matching `run_to_completion`'s
/// own invariant but for a `JsResult`-returning future instead of a
/// `Completion`-returning one.
fn run_to_completion_result<F: std::future::Future<Output = JsResult<()>>>(fut: F) -> JsResult<()> {
    let mut boxed = Box::pin(fut);
    match drive_to_first_suspend_result(boxed.as_mut()) {
        Some(r) => r,
        None => unreachable!("a non-generator, non-async helper body suspended"),
    }
}

fn drive_to_first_suspend_result<F>(fut: std::pin::Pin<&mut F>) -> Option<JsResult<()>>
where
    F: std::future::Future<Output = JsResult<()>>,
{
    use std::task::Poll;
    let waker = std::task::Waker::noop();
    let mut cx = std::task::Context::from_waker(waker);
    match fut.poll(&mut cx) {
        Poll::Ready(r) => Some(r),
        Poll::Pending => None,
    }
}

/// The generator/async-generator's own `.prototype` property wins over the
/// realm intrinsic when present, per [27.5.3.1 CreateIteratorFromClosure](https://tc39.es/ecma262/#sec-ordinarycreatefromconstructor)'s
/// use of `GetPrototypeFromConstructor`: `function* f() {}; f.prototype = x;`
/// makes `f()` an instance of `x`, not of `%GeneratorPrototype%`.
fn prototype_from_function_object(agent: &RefCell<Agent>, function_object: Object, fallback: Object) -> JsResult<Object> {
    match get_property(agent, function_object, &PropertyKey::from_static_str("prototype"))? {
        Value::Object(o) => Ok(o),
        _ => Ok(fallback),
    }
}

fn start_generator(agent: &RefCell<Agent>, ctx: Ctx, ecma: &EcmaFunctionData, function_object: Object) -> Object {
    use crate::builtins::control_abstraction::generator::GeneratorData;
    let suspension = Rc::new(Suspension::new());
    let body = make_body_future(agent, ctx, ecma, suspension.clone());
    let fallback = { agent.borrow().current_realm().intrinsics().generator_prototype };
    let prototype = prototype_from_function_object(agent, function_object, fallback).unwrap_or(fallback);
    let mut a = agent.borrow_mut();
    a.heap.create(ObjectHeapData {
        prototype,
        extensible: true,
        properties: Default::default(),
        exotic: ExoticData::Generator(GeneratorData::new(body, suspension)),
    })
}

fn start_async_generator(agent: &RefCell<Agent>, ctx: Ctx, ecma: &EcmaFunctionData, function_object: Object) -> Object {
    use crate::builtins::control_abstraction::async_generator::AsyncGeneratorData;
    let suspension = Rc::new(Suspension::new());
    let body = make_body_future(agent, ctx, ecma, suspension.clone());
    let fallback = { agent.borrow().current_realm().intrinsics().async_generator_prototype };
    let prototype = prototype_from_function_object(agent, function_object, fallback).unwrap_or(fallback);
    let mut a = agent.borrow_mut();
    a.heap.create(ObjectHeapData {
        prototype,
        extensible: true,
        properties: Default::default(),
        exotic: ExoticData::AsyncGenerator(AsyncGeneratorData::new(body, suspension)),
    })
}

fn start_async_function(agent: &RefCell<Agent>, ctx: Ctx, ecma: &EcmaFunctionData) -> Value {
    let promise = new_promise_object(agent);
    let suspension = Rc::new(Suspension::new());
    let body = make_body_future(agent, ctx, ecma, suspension.clone());
    async_function_start(agent, promise, body, suspension);
    Value::Object(promise)
}

/// ### [10.2.2 \[\[Construct\]\] ( argumentsList, newTarget )](https://tc39.es/ecma262/#sec-ecmascript-function-objects-construct-argumentslist-newtarget)
pub fn construct_ecma_function(agent: &RefCell<Agent>, constructor: Object, ecma: &EcmaFunctionData, args: &[Value], new_target: Object) -> JsResult<Object> {
    let this = if ecma.constructor_kind == Some(ConstructorKind::Base) || ecma.constructor_kind.is_none() {
        let proto = {
            let proto = get_property(agent, new_target, &PropertyKey::from_static_str("prototype"))?;
            match proto {
                Value::Object(o) => Some(o),
                _ => Some(agent.borrow().current_realm().intrinsics().object_prototype),
            }
        };
        Some(make_basic_object(agent, proto))
    } else {
        None
    };

    let ctx = enter_call(agent, ecma, constructor, Value::Undefined, Some(new_target))?;
    if let Some(this_obj) = this {
        if let Environment::Function(idx) = ctx.lexical {
            let mut a = agent.borrow_mut();
            a.heap.function_environments[idx.into_index()].bind_this_value(Value::Object(this_obj));
        }
        initialize_instance_fields_blocking(agent, ctx, &ecma.fields_to_initialize, this_obj)?;
    }

    bind_arguments_object(agent, ctx, &ecma.definition.params, args)?;
    bind_arguments_blocking(agent, ctx, &ecma.definition.params, args)?;
    let param_names = collect_param_names(&ecma.definition.params);
    function_declaration_instantiation_blocking(agent, ctx, body_stmts(&ecma.definition.body), &param_names)?;
    let completion = run_to_completion(eval_function_body(agent, ctx, &ecma.definition.body));
    let result = completion.into_value_or_throw()?;
    match result {
        Value::Object(o) => Ok(o),
        _ => {
            let env = ctx.lexical;
            Ok(match resolve_this_binding(agent, env)? {
                Value::Object(o) => o,
                _ => unreachable!("a base-class constructor always binds `this` before returning"),
            })
        }
    }
}

fn initialize_instance_fields_blocking(agent: &RefCell<Agent>, ctx: Ctx, fields: &[(ast::PropertyKeyExpr, Option<ast::Expression>)], this_obj: Object) -> JsResult<()> {
    run_to_completion_result(Box::pin(initialize_instance_fields(agent, ctx, fields, this_obj)))
}

pub async fn initialize_instance_fields(agent: &RefCell<Agent>, ctx: Ctx, fields: &[(ast::PropertyKeyExpr, Option<ast::Expression>)], this_obj: Object) -> JsResult<()> {
    for (key_expr, value_expr) in fields {
        let field_env = new_declarative_environment(agent, Some(ctx.lexical));
        let field_ctx = ctx.with_lexical(field_env);
        let key = property_key_from_expr(agent, field_ctx, key_expr).await?;
        let value = match value_expr {
            Some(expr) => Box::pin(eval_expression(agent, field_ctx, expr)).await.into_value_or_throw()?,
            None => Value::Undefined,
        };
        create_data_property_or_throw_key(agent, this_obj, key, value)?;
    }
    Ok(())
}

// ======================================================================
// Statement evaluation
// ======================================================================

async fn eval_statement_list<'a>(agent: &'a RefCell<Agent>, ctx: Ctx, stmts: &'a [ast::Statement]) -> Completion {
    let mut last = Completion::normal_undefined();
    for stmt in stmts {
        let completion = Box::pin(eval_statement(agent, ctx, stmt)).await;
        if completion.is_abrupt() {
            return completion;
        }
        last = completion;
    }
    last
}

/// ### [14 Statements and Declarations: Evaluation](https://tc39.es/ecma262/#sec-statement-semantics)
pub async fn eval_statement(agent: &RefCell<Agent>, ctx: Ctx, stmt: &ast::Statement) -> Completion {
    if let Err(e) = agent.borrow_mut().consume_step() {
        return Completion::Throw(e);
    }
    match stmt {
        ast::Statement::Empty => Completion::normal_undefined(),
        ast::Statement::Expression(expr) => Box::pin(eval_expression(agent, ctx, expr)).await,
        ast::Statement::VariableDeclaration(decl) => eval_variable_declaration(agent, ctx, decl).await,
        ast::Statement::FunctionDeclaration(_) => Completion::normal_undefined(),
        ast::Statement::ClassDeclaration(class_def) => {
            let value = val!(Box::pin(eval_class(agent, ctx, class_def)).await);
            let Value::Object(class_obj) = value else { unreachable!() };
            if let Some(name) = &class_def.name {
                okc!(ctx.lexical.initialize_binding(agent, name, Value::Object(class_obj)));
            }
            Completion::normal_undefined()
        }
        ast::Statement::Block(body) => {
            let block_env = new_declarative_environment(agent, Some(ctx.lexical));
            let block_ctx = ctx.with_lexical(block_env);
            okc!(instantiate_block_scope(agent, block_ctx, body));
            Box::pin(eval_statement_list(agent, block_ctx, body)).await
        }
        ast::Statement::If { test, consequent, alternate } => {
            let cond = val!(Box::pin(eval_expression(agent, ctx, test)).await);
            if cond.to_boolean() {
                Box::pin(eval_statement(agent, ctx, consequent)).await
            } else if let Some(alt) = alternate {
                Box::pin(eval_statement(agent, ctx, alt)).await
            } else {
                Completion::normal_undefined()
            }
        }
        ast::Statement::While { .. } | ast::Statement::DoWhile { .. } | ast::Statement::For { .. } | ast::Statement::ForIn { .. } | ast::Statement::ForOf { .. } => {
            Box::pin(eval_loop_statement(agent, ctx, stmt, None)).await
        }
        ast::Statement::Return(arg) => match arg {
            Some(expr) => {
                let v = val!(Box::pin(eval_expression(agent, ctx, expr)).await);
                Completion::Return(v)
            }
            None => Completion::Return(Value::Undefined),
        },
        ast::Statement::Break(label) => Completion::Break(label.clone()),
        ast::Statement::Continue(label) => Completion::Continue(label.clone()),
        ast::Statement::Throw(expr) => {
            let v = val!(Box::pin(eval_expression(agent, ctx, expr)).await);
            Completion::Throw(JsError::new(v))
        }
        ast::Statement::Try { block, handler, finalizer } => Box::pin(eval_try_statement(agent, ctx, block, handler.as_ref(), finalizer.as_deref())).await,
        ast::Statement::Switch { discriminant, cases } => Box::pin(eval_switch_statement(agent, ctx, discriminant, cases)).await,
        ast::Statement::Labeled { label, body } => {
            let inner = Box::pin(eval_labeled_statement(agent, ctx, label, body)).await;
            match inner {
                Completion::Break(Some(l)) if &l == label => Completion::normal_undefined(),
                other => other,
            }
        }
    }
}

/// Loop statements need to know their own label (to match a same-labeled
/// `break`/`continue` targeting them directly) without re-threading it
/// through every AST variant, so `Statement::Labeled` peels labels off
/// until it reaches a non-labeled statement and hands them to
/// [`eval_loop_statement`] together.
async fn eval_labeled_statement(agent: &RefCell<Agent>, ctx: Ctx, label: &str, body: &ast::Statement) -> Completion {
    match body {
        ast::Statement::While { .. } | ast::Statement::DoWhile { .. } | ast::Statement::For { .. } | ast::Statement::ForIn { .. } | ast::Statement::ForOf { .. } => {
            Box::pin(eval_loop_statement(agent, ctx, body, Some(label))).await
        }
        ast::Statement::Labeled { label: inner_label, body: inner_body } => {
            let inner = Box::pin(eval_labeled_statement(agent, ctx, inner_label, inner_body)).await;
            match inner {
                Completion::Break(Some(l)) if l == inner_label => Completion::normal_undefined(),
                other => other,
            }
        }
        _ => Box::pin(eval_statement(agent, ctx, body)).await,
    }
}

async fn eval_variable_declaration(agent: &RefCell<Agent>, ctx: Ctx, decl: &ast::VariableDeclaration) -> Completion {
    for (pattern, init) in &decl.declarations {
        let value = match init {
            Some(expr) => val!(Box::pin(eval_expression(agent, ctx, expr)).await),
            None => Value::Undefined,
        };
        let value = if init.is_none() {
            value
        } else if let ast::BindingPattern::Identifier(name) = pattern {
            name_anonymous_function(agent, value, name);
            value
        } else {
            value
        };
        let environment = if decl.kind == ast::VarKind::Var { None } else { Some(ctx.lexical) };
        okc!(Box::pin(binding_initialization(agent, ctx, pattern, value, environment)).await);
    }
    Completion::normal_undefined()
}

/// ### [8.6.1 Runtime Semantics: NamedEvaluation](https://tc39.es/ecma262/#sec-runtime-semantics-namedevaluation)
///
/// An anonymous function/class expression bound directly to `const f = ...`
/// gets that identifier as its `.name`; this only handles the common
/// `BindingPattern::Identifier` case (array/object destructuring targets
/// never trigger NamedEvaluation since the initializer isn't itself an
/// anonymous function expression in that grammar position).
fn name_anonymous_function(agent: &RefCell<Agent>, value: Value, name: &str) {
    if let Value::Object(o) = value {
        let is_anonymous_function = {
            let a = agent.borrow();
            match &a.heap[o.0].exotic {
                ExoticData::Function(FunctionData::Ecma(ecma)) => ecma.definition.name.is_none(),
                _ => false,
            }
        };
        if is_anonymous_function {
            set_function_name(agent, o, name, None);
        }
    }
}

async fn eval_try_statement(agent: &RefCell<Agent>, ctx: Ctx, block: &[ast::Statement], handler: Option<&ast::CatchClause>, finalizer: Option<&[ast::Statement]>) -> Completion {
    let block_env = new_declarative_environment(agent, Some(ctx.lexical));
    let block_ctx = ctx.with_lexical(block_env);
    let block_result = okc_instantiate_then(agent, block_ctx, block).await;

    let result = match block_result {
        Completion::Throw(e) if handler.is_some() => {
            let handler = handler.unwrap();
            let catch_env = new_declarative_environment(agent, Some(ctx.lexical));
            let catch_ctx = ctx.with_lexical(catch_env);
            if let Some(param) = &handler.param {
                okc!(catch_env.create_mutable_binding(agent, &pattern_first_name(param), false));
                let r = Box::pin(binding_initialization(agent, catch_ctx, param, e.value(), Some(catch_env))).await;
                if let Err(err) = r {
                    Completion::Throw(err)
                } else {
                    okc!(instantiate_block_scope(agent, catch_ctx, &handler.body));
                    Box::pin(eval_statement_list(agent, catch_ctx, &handler.body)).await
                }
            } else {
                okc!(instantiate_block_scope(agent, catch_ctx, &handler.body));
                Box::pin(eval_statement_list(agent, catch_ctx, &handler.body)).await
            }
        }
        other => other,
    };

    if let Some(finalizer) = finalizer {
        let finally_env = new_declarative_environment(agent, Some(ctx.lexical));
        let finally_ctx = ctx.with_lexical(finally_env);
        okc!(instantiate_block_scope(agent, finally_ctx, finalizer));
        let finally_result = Box::pin(eval_statement_list(agent, finally_ctx, finalizer)).await;
        if finally_result.is_abrupt() {
            return finally_result;
        }
    }
    result
}

async fn okc_instantiate_then(agent: &RefCell<Agent>, ctx: Ctx, block: &[ast::Statement]) -> Completion {
    if let Err(e) = instantiate_block_scope(agent, ctx, block) {
        return Completion::Throw(e);
    }
    Box::pin(eval_statement_list(agent, ctx, block)).await
}

/// Only used to pre-create the catch parameter's binding before
/// `binding_initialization` walks the (possibly destructuring) pattern; a
/// plain identifier is the overwhelmingly common case and the only one
/// whose single name this needs up front (patterns create their own
/// sub-bindings as they recurse).
fn pattern_first_name(pattern: &ast::BindingPattern) -> String {
    match pattern {
        ast::BindingPattern::Identifier(name) => name.clone(),
        _ => String::new(),
    }
}

async fn eval_switch_statement(agent: &RefCell<Agent>, ctx: Ctx, discriminant: &ast::Expression, cases: &[ast::SwitchCase]) -> Completion {
    let switch_value = val!(Box::pin(eval_expression(agent, ctx, discriminant)).await);
    let switch_env = new_declarative_environment(agent, Some(ctx.lexical));
    let switch_ctx = ctx.with_lexical(switch_env);
    let all_stmts: Vec<&ast::Statement> = cases.iter().flat_map(|c| c.body.iter()).collect();
    okc!(instantiate_block_scope(agent, switch_ctx, &all_stmts.into_iter().cloned().collect::<Vec<_>>()));

    let mut matched_index = None;
    for (i, case) in cases.iter().enumerate() {
        if let Some(test) = &case.test {
            let test_value = val!(Box::pin(eval_expression(agent, switch_ctx, test)).await);
            if is_strictly_equal(&agent.borrow(), switch_value, test_value) {
                matched_index = Some(i);
                break;
            }
        }
    }
    let start = match matched_index {
        Some(i) => i,
        None => match cases.iter().position(|c| c.test.is_none()) {
            Some(i) => i,
            None => return Completion::normal_undefined(),
        },
    };

    for case in &cases[start..] {
        let result = Box::pin(eval_statement_list(agent, switch_ctx, &case.body)).await;
        match result {
            Completion::Break(None) => return Completion::normal_undefined(),
            other if other.is_abrupt() => return other,
            _ => {}
        }
    }
    Completion::normal_undefined()
}

// ======================================================================
// Loops
// ======================================================================

/// What a loop body's completion means for the enclosing loop: keep
/// iterating, stop (a same-label `break`), or bubble further up (any
/// other abrupt completion, or a labeled `break`/`continue` aimed at an
/// outer construct). Shared by every loop-kind helper so the
/// break/continue/label matching logic ([14.7.*] `LoopContinues`) lives in
/// one place instead of five near-identical copies.
enum LoopSignal {
    Continue,
    Break,
    Propagate(Completion),
}

fn classify_body_completion(completion: Completion, own_label: Option<&str>) -> LoopSignal {
    match completion {
        Completion::Normal(_) => LoopSignal::Continue,
        Completion::Continue(None) => LoopSignal::Continue,
        Completion::Continue(Some(l)) if Some(l.as_str()) == own_label => LoopSignal::Continue,
        Completion::Break(None) => LoopSignal::Break,
        Completion::Break(Some(l)) if Some(l.as_str()) == own_label => LoopSignal::Break,
        other => LoopSignal::Propagate(other),
    }
}

async fn eval_loop_statement(agent: &RefCell<Agent>, ctx: Ctx, stmt: &ast::Statement, label: Option<&str>) -> Completion {
    match stmt {
        ast::Statement::While { test, body } => Box::pin(loop_while(agent, ctx, test, body, label)).await,
        ast::Statement::DoWhile { body, test } => Box::pin(loop_do_while(agent, ctx, body, test, label)).await,
        ast::Statement::For { init, test, update, body } => Box::pin(loop_for(agent, ctx, init.as_deref(), test.as_ref(), update.as_ref(), body, label)).await,
        ast::Statement::ForIn { left, right, body } => Box::pin(loop_for_in(agent, ctx, left, right, body, label)).await,
        ast::Statement::ForOf { left, right, is_await, body } => {
            if *is_await {
                Box::pin(for_await_of(agent, ctx, left, right, body, label)).await
            } else {
                Box::pin(loop_for_of(agent, ctx, left, right, body, label)).await
            }
        }
        _ => unreachable!("eval_loop_statement called on a non-loop statement"),
    }
}

async fn loop_while(agent: &RefCell<Agent>, ctx: Ctx, test: &ast::Expression, body: &ast::Statement, label: Option<&str>) -> Completion {
    let mut last_value = Value::Undefined;
    loop {
        let cond = val!(Box::pin(eval_expression(agent, ctx, test)).await);
        if !cond.to_boolean() {
            break;
        }
        let result = Box::pin(eval_statement(agent, ctx, body)).await;
        if let Completion::Normal(v) = &result {
            last_value = *v;
        }
        match classify_body_completion(result, label) {
            LoopSignal::Continue => {}
            LoopSignal::Break => break,
            LoopSignal::Propagate(c) => return c,
        }
    }
    Completion::Normal(last_value)
}

async fn loop_do_while(agent: &RefCell<Agent>, ctx: Ctx, body: &ast::Statement, test: &ast::Expression, label: Option<&str>) -> Completion {
    let mut last_value = Value::Undefined;
    loop {
        let result = Box::pin(eval_statement(agent, ctx, body)).await;
        if let Completion::Normal(v) = &result {
            last_value = *v;
        }
        match classify_body_completion(result, label) {
            LoopSignal::Continue => {}
            LoopSignal::Break => break,
            LoopSignal::Propagate(c) => return c,
        }
        let cond = val!(Box::pin(eval_expression(agent, ctx, test)).await);
        if !cond.to_boolean() {
            break;
        }
    }
    Completion::Normal(last_value)
}

async fn loop_for(
    agent: &RefCell<Agent>,
    ctx: Ctx,
    init: Option<&ast::ForInit>,
    test: Option<&ast::Expression>,
    update: Option<&ast::Expression>,
    body: &ast::Statement,
    label: Option<&str>,
) -> Completion {
    let mut loop_ctx = ctx;
    let mut per_iteration_names: Vec<String> = Vec::new();
    if let Some(init) = init {
        match init {
            ast::ForInit::Declaration(decl) if decl.kind != ast::VarKind::Var => {
                let loop_env = new_declarative_environment(agent, Some(ctx.lexical));
                for (pattern, _) in &decl.declarations {
                    collect_pattern_names(pattern, &mut per_iteration_names);
                }
                for name in &per_iteration_names {
                    if decl.kind == ast::VarKind::Const {
                        okc!(loop_env.create_immutable_binding(agent, name, true));
                    } else {
                        okc!(loop_env.create_mutable_binding(agent, name, false));
                    }
                }
                loop_ctx = ctx.with_lexical(loop_env);
                let c = Box::pin(eval_variable_declaration(agent, loop_ctx, decl)).await;
                if c.is_abrupt() {
                    return c;
                }
            }
            ast::ForInit::Declaration(decl) => {
                let c = Box::pin(eval_variable_declaration(agent, loop_ctx, decl)).await;
                if c.is_abrupt() {
                    return c;
                }
            }
            ast::ForInit::Expression(expr) => {
                let c = Box::pin(eval_expression(agent, loop_ctx, expr)).await;
                if c.is_abrupt() {
                    return c;
                }
            }
        }
    }

    if !per_iteration_names.is_empty() {
        loop_ctx = okc!(copy_per_iteration_env(agent, loop_ctx, &per_iteration_names));
    }

    let mut last_value = Value::Undefined;
    loop {
        if let Some(test) = test {
            let cond = val!(Box::pin(eval_expression(agent, loop_ctx, test)).await);
            if !cond.to_boolean() {
                break;
            }
        }
        let result = Box::pin(eval_statement(agent, loop_ctx, body)).await;
        if let Completion::Normal(v) = &result {
            last_value = *v;
        }
        match classify_body_completion(result, label) {
            LoopSignal::Continue => {}
            LoopSignal::Break => break,
            LoopSignal::Propagate(c) => return c,
        }
        if !per_iteration_names.is_empty() {
            loop_ctx = okc!(copy_per_iteration_env(agent, loop_ctx, &per_iteration_names));
        }
        if let Some(update) = update {
            let c = Box::pin(eval_expression(agent, loop_ctx, update)).await;
            if c.is_abrupt() {
                return c;
            }
        }
    }
    Completion::Normal(last_value)
}

/// ### [14.7.4.3 CreatePerIterationEnvironment ( perIterationBindings )](https://tc39.es/ecma262/#sec-createperiterationenvironment)
fn copy_per_iteration_env(agent: &RefCell<Agent>, ctx: Ctx, names: &[String]) -> JsResult<Ctx> {
    let outer = ctx.lexical.outer_env(agent);
    let new_env = new_declarative_environment(agent, outer);
    for name in names {
        let value = ctx.lexical.get_binding_value(agent, name, true)?;
        new_env.create_mutable_binding(agent, name, false)?;
        new_env.initialize_binding(agent, name, value)?;
    }
    Ok(ctx.with_lexical(new_env))
}

/// Builds the `Ctx` a single for-in/for-of/for-await-of iteration's body
/// runs in: a `let`/`const` target gets a fresh per-iteration declarative
/// environment (per [14.7.5.4 ForIn/OfBodyEvaluation] step 1.d); `var` and
/// bare-pattern assignment targets reuse `ctx` directly and just write
/// through a normal reference/binding.
async fn bind_for_target(agent: &RefCell<Agent>, ctx: Ctx, target: &ast::ForTarget, value: Value) -> JsResult<Ctx> {
    match target {
        ast::ForTarget::Declaration(ast::VarKind::Var, pattern) => {
            binding_initialization(agent, ctx, pattern, value, None).await?;
            Ok(ctx)
        }
        ast::ForTarget::Declaration(kind, pattern) => {
            let loop_env = new_declarative_environment(agent, Some(ctx.lexical));
            let mut names = Vec::new();
            collect_pattern_names(pattern, &mut names);
            for name in &names {
                if *kind == ast::VarKind::Const {
                    loop_env.create_immutable_binding(agent, name, true)?;
                } else {
                    loop_env.create_mutable_binding(agent, name, false)?;
                }
            }
            let loop_ctx = ctx.with_lexical(loop_env);
            binding_initialization(agent, loop_ctx, pattern, value, Some(loop_env)).await?;
            Ok(loop_ctx)
        }
        ast::ForTarget::Pattern(pattern) => {
            binding_initialization(agent, ctx, pattern, value, None).await?;
            Ok(ctx)
        }
    }
}

async fn loop_for_in(agent: &RefCell<Agent>, ctx: Ctx, left: &ast::ForTarget, right: &ast::Expression, body: &ast::Statement, label: Option<&str>) -> Completion {
    let right_value = val!(Box::pin(eval_expression(agent, ctx, right)).await);
    if right_value.is_nullish() {
        return Completion::normal_undefined();
    }
    let object = okc!(to_object(agent, right_value));
    let keys = okc!(enumerate_for_in_keys(agent, object));

    let mut last_value = Value::Undefined;
    for key in keys {
        let still_there = { internal_methods::has_property(&agent.borrow(), object, &key) };
        if !still_there {
            continue;
        }
        let key_value = Value::String(js_string(agent, &key_display(agent, &key)));
        let iter_ctx = okc!(bind_for_target(agent, ctx, left, key_value).await);
        let result = Box::pin(eval_statement(agent, iter_ctx, body)).await;
        if let Completion::Normal(v) = &result {
            last_value = *v;
        }
        match classify_body_completion(result, label) {
            LoopSignal::Continue => {}
            LoopSignal::Break => break,
            LoopSignal::Propagate(c) => return c,
        }
    }
    Completion::Normal(last_value)
}

/// ### [14.7.5.9 EnumerateObjectProperties ( O )](https://tc39.es/ecma262/#sec-enumerate-object-properties)
///
/// Walks the prototype chain, skipping shadowed and non-enumerable keys,
/// and only ever yields string keys (symbols are never enumerable to
/// `for`-`in` per [6.1.7.1]'s own property-key ordering, though this
/// crate's property keys can't be numeric-index-ordered separately from
/// insertion order — see DESIGN.md).
fn enumerate_for_in_keys(agent: &RefCell<Agent>, object: Object) -> JsResult<Vec<PropertyKey>> {
    let mut seen: Vec<PropertyKey> = Vec::new();
    let mut out = Vec::new();
    let mut current = Some(object);
    while let Some(o) = current {
        let keys = { internal_methods::own_property_keys(&agent.borrow(), o) };
        for key in keys {
            if matches!(key, PropertyKey::Symbol(_)) || seen.contains(&key) {
                continue;
            }
            seen.push(key);
            let enumerable = {
                let a = agent.borrow();
                internal_methods::get_own_property(&a, o, &key).map(|d| d.enumerable()).unwrap_or(false)
            };
            if enumerable {
                out.push(key);
            }
        }
        current = { internal_methods::get_prototype_of(&agent.borrow(), o) };
    }
    Ok(out)
}

async fn loop_for_of(agent: &RefCell<Agent>, ctx: Ctx, left: &ast::ForTarget, right: &ast::Expression, body: &ast::Statement, label: Option<&str>) -> Completion {
    let right_value = val!(Box::pin(eval_expression(agent, ctx, right)).await);
    let record = okc!(get_iterator(agent, right_value));
    let mut last_value = Value::Undefined;
    loop {
        let next = okc!(iterator_step(agent, &record));
        let Some(next_value) = next else { break };
        let iter_ctx = match bind_for_target(agent, ctx, left, next_value).await {
            Ok(c) => c,
            Err(e) => {
                let _ = iterator_close(agent, &record);
                return Completion::Throw(e);
            }
        };
        let result = Box::pin(eval_statement(agent, iter_ctx, body)).await;
        if let Completion::Normal(v) = &result {
            last_value = *v;
        }
        match classify_body_completion(result, label) {
            LoopSignal::Continue => {}
            LoopSignal::Break => {
                let _ = iterator_close(agent, &record);
                break;
            }
            LoopSignal::Propagate(c) => {
                let _ = iterator_close(agent, &record);
                return c;
            }
        }
    }
    Completion::Normal(last_value)
}

/// `for await (... of ...)`: tries the synchronous `Symbol.iterator`
/// protocol first, awaiting each yielded value per
/// [27.1.4.1 CreateAsyncFromSyncIterator] (this crate adapts rather than
/// implementing a distinct async-from-sync iterator object). If the
/// right-hand value isn't sync-iterable, falls back to treating it as an
/// async iterator directly — calling `.next()` and awaiting the resulting
/// promise each iteration — since `get_iterator` only probes
/// `Symbol.iterator` and async generator objects here expose no
/// `Symbol.asyncIterator` (see DESIGN.md).
async fn for_await_of(agent: &RefCell<Agent>, ctx: Ctx, left: &ast::ForTarget, right: &ast::Expression, body: &ast::Statement, label: Option<&str>) -> Completion {
    let Some(susp) = ctx.suspension() else {
        return Completion::Throw(okc_panic_err(agent, "'for await' used outside an async function"));
    };
    let right_value = val!(Box::pin(eval_expression(agent, ctx, right)).await);

    enum Source {
        SyncIterator(IteratorRecord),
        AsyncObject(Object),
    }
    let source = match get_iterator(agent, right_value) {
        Ok(record) => Source::SyncIterator(record),
        Err(_) => match right_value {
            Value::Object(o) => Source::AsyncObject(o),
            _ => return Completion::Throw(okc_panic_err(agent, "value is not async iterable")),
        },
    };

    let mut last_value = Value::Undefined;
    loop {
        let next_value = match &source {
            Source::SyncIterator(record) => match iterator_step(agent, record) {
                Ok(Some(v)) => {
                    let awaited = SuspendPoint::new(&susp, SuspendedOp::Await(v)).await;
                    match awaited {
                        Completion::Normal(v) => v,
                        other => return other,
                    }
                }
                Ok(None) => break,
                Err(e) => return Completion::Throw(e),
            },
            Source::AsyncObject(obj) => {
                let next_method = match get_property(agent, *obj, &PropertyKey::from_static_str("next")) {
                    Ok(v) => v,
                    Err(e) => return Completion::Throw(e),
                };
                if !is_callable(&agent.borrow(), next_method) {
                    return Completion::Throw(okc_panic_err(agent, "async iterator has no 'next' method"));
                }
                let promise = match call_function(agent, next_method, Value::Object(*obj), &[]) {
                    Ok(v) => v,
                    Err(e) => return Completion::Throw(e),
                };
                let settled = SuspendPoint::new(&susp, SuspendedOp::Await(promise)).await;
                let result = match settled {
                    Completion::Normal(v) => v,
                    other => return other,
                };
                let Value::Object(result_object) = result else {
                    return Completion::Throw(okc_panic_err(agent, "iterator result is not an object"));
                };
                let done = match get_property(agent, result_object, &PropertyKey::from_static_str("done")) {
                    Ok(v) => v.to_boolean(),
                    Err(e) => return Completion::Throw(e),
                };
                if done {
                    break;
                }
                match get_property(agent, result_object, &PropertyKey::from_static_str("value")) {
                    Ok(v) => v,
                    Err(e) => return Completion::Throw(e),
                }
            }
        };

        let iter_ctx = okc!(bind_for_target(agent, ctx, left, next_value).await);
        let result = Box::pin(eval_statement(agent, iter_ctx, body)).await;
        if let Completion::Normal(v) = &result {
            last_value = *v;
        }
        match classify_body_completion(result, label) {
            LoopSignal::Continue => {}
            LoopSignal::Break => break,
            LoopSignal::Propagate(c) => return c,
        }
    }
    Completion::Normal(last_value)
}

fn okc_panic_err(agent: &RefCell<Agent>, message: &'static str) -> JsError {
    agent.borrow_mut().throw_exception_with_static_message(ExceptionType::TypeError, message)
}

// ======================================================================
// eval_reference — [13.1/13.3 Identifier/Member/Super references]
// ======================================================================

/// ### [13.3.7 The super Keyword](https://tc39.es/ecma262/#sec-super-keyword)/[13.3 Property Accessors: Evaluation]
pub async fn eval_reference(agent: &RefCell<Agent>, ctx: Ctx, expr: &ast::Expression) -> JsResult<Reference> {
    match expr {
        ast::Expression::Identifier(name) => {
            let js_name = js_string(agent, name);
            get_identifier_reference(agent, Some(ctx.lexical), js_name, ctx.strict)
        }
        ast::Expression::Member { object, property, .. } => {
            let base = Box::pin(eval_expression(agent, ctx, object)).await.into_value_or_throw()?;
            let key = member_property_key(agent, ctx, property).await?;
            Ok(Reference {
                base: ReferenceBase::Value(base),
                referenced_name: key,
                strict: ctx.strict,
                this_value: None,
            })
        }
        ast::Expression::SuperMember { property } => {
            let base = super_base(agent, ctx)?;
            let key = member_property_key(agent, ctx, property).await?;
            let this_env = get_this_environment(agent, ctx.lexical);
            let this_value = resolve_this_binding(agent, this_env)?;
            Ok(Reference {
                base: ReferenceBase::Value(base),
                referenced_name: key,
                strict: ctx.strict,
                this_value: Some(this_value),
            })
        }
        _ => Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::ReferenceError, "Invalid left-hand side in reference")),
    }
}

// ======================================================================
// eval_expression
// ======================================================================

/// ### [13 Expressions: Evaluation](https://tc39.es/ecma262/#sec-ecmascript-language-expressions)
pub async fn eval_expression(agent: &RefCell<Agent>, ctx: Ctx, expr: &ast::Expression) -> Completion {
    match expr {
        ast::Expression::Literal(lit) => eval_literal(agent, lit),
        ast::Expression::Identifier(_) => {
            let reference = okc!(Box::pin(eval_reference(agent, ctx, expr)).await);
            Completion::Normal(okc!(get_value(agent, &reference)))
        }
        ast::Expression::This => {
            let this_env = get_this_environment(agent, ctx.lexical);
            Completion::Normal(okc!(resolve_this_binding(agent, this_env)))
        }
        ast::Expression::Super => Completion::Throw(okc_panic_err(agent, "'super' keyword is only valid inside a call or member expression")),
        ast::Expression::NewTarget => Completion::Normal(new_target_value(agent, ctx)),
        ast::Expression::Array(elements) => eval_array_literal(agent, ctx, elements).await,
        ast::Expression::Object(props) => eval_object_literal(agent, ctx, props).await,
        ast::Expression::Function(def) => {
            let obj = make_ecma_function(agent, ctx, def.clone());
            Completion::Normal(Value::Object(obj))
        }
        ast::Expression::Class(def) => Box::pin(eval_class(agent, ctx, def)).await,
        ast::Expression::Template { quasis, expressions } => eval_template(agent, ctx, quasis, expressions).await,
        ast::Expression::Unary { op, argument } => eval_unary(agent, ctx, *op, argument).await,
        ast::Expression::Update { op, argument, prefix } => eval_update(agent, ctx, *op, argument, *prefix).await,
        ast::Expression::Binary { op, left, right } => eval_binary(agent, ctx, *op, left, right).await,
        ast::Expression::Logical { op, left, right } => eval_logical(agent, ctx, *op, left, right).await,
        ast::Expression::Assignment { op, target, value } => eval_assignment(agent, ctx, *op, target, value).await,
        ast::Expression::Conditional { test, consequent, alternate } => {
            let cond = val!(Box::pin(eval_expression(agent, ctx, test)).await);
            if cond.to_boolean() {
                Box::pin(eval_expression(agent, ctx, consequent)).await
            } else {
                Box::pin(eval_expression(agent, ctx, alternate)).await
            }
        }
        ast::Expression::Call { callee, arguments, optional } => eval_call(agent, ctx, callee, arguments, *optional).await,
        ast::Expression::New { callee, arguments } => eval_new(agent, ctx, callee, arguments).await,
        ast::Expression::Member { .. } | ast::Expression::SuperMember { .. } => {
            let reference = okc!(Box::pin(eval_reference(agent, ctx, expr)).await);
            Completion::Normal(okc!(get_value(agent, &reference)))
        }
        ast::Expression::SuperCall { arguments } => Box::pin(eval_super_call(agent, ctx, arguments)).await,
        ast::Expression::Sequence(exprs) => {
            let mut last = Value::Undefined;
            for e in exprs {
                last = val!(Box::pin(eval_expression(agent, ctx, e)).await);
            }
            Completion::Normal(last)
        }
        ast::Expression::Yield { argument, delegate } => Box::pin(eval_yield(agent, ctx, argument.as_deref(), *delegate)).await,
        ast::Expression::Await { argument } => Box::pin(eval_await(agent, ctx, argument)).await,
        ast::Expression::Spread(inner) => Box::pin(eval_expression(agent, ctx, inner)).await,
    }
}

fn eval_literal(agent: &RefCell<Agent>, lit: &ast::Literal) -> Completion {
    Completion::Normal(match lit {
        ast::Literal::Null => Value::Null,
        ast::Literal::Boolean(b) => Value::Boolean(*b),
        ast::Literal::Number(n) => Value::Number(*n),
        ast::Literal::String(s) => Value::String(js_string(agent, s)),
        ast::Literal::BigInt(digits) => parse_bigint_literal(agent, digits),
    })
}

fn parse_bigint_literal(agent: &RefCell<Agent>, digits: &str) -> Value {
    let digits = digits.trim_end_matches('n');
    let (radix, rest) = if let Some(r) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        (16, r)
    } else if let Some(r) = digits.strip_prefix("0o").or_else(|| digits.strip_prefix("0O")) {
        (8, r)
    } else if let Some(r) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        (2, r)
    } else {
        (10, digits)
    };
    let num = NumBigInt::parse_bytes(rest.as_bytes(), radix).unwrap_or_default();
    let mut a = agent.borrow_mut();
    Value::BigInt(BigInt::from_num_bigint(&mut a.heap, num))
}

async fn eval_array_literal(agent: &RefCell<Agent>, ctx: Ctx, elements: &[ast::ArrayElement]) -> Completion {
    let array_prototype = { agent.borrow().current_realm().intrinsics().array_prototype };
    let array = { internal_methods::array_create(&mut agent.borrow_mut(), 0, array_prototype) };
    let mut index = 0u32;
    for element in elements {
        match element {
            ast::ArrayElement::Elision => {
                index += 1;
            }
            ast::ArrayElement::Expression(expr) => {
                let v = val!(Box::pin(eval_expression(agent, ctx, expr)).await);
                okc!(create_data_property_or_throw_key(agent, array, index_key(agent, index), v));
                index += 1;
            }
            ast::ArrayElement::Spread(expr) => {
                let v = val!(Box::pin(eval_expression(agent, ctx, expr)).await);
                let record = okc!(get_iterator(agent, v));
                loop {
                    match okc!(iterator_step(agent, &record)) {
                        Some(item) => {
                            okc!(create_data_property_or_throw_key(agent, array, index_key(agent, index), item));
                            index += 1;
                        }
                        None => break,
                    }
                }
            }
        }
    }
    Completion::Normal(Value::Object(array))
}

async fn eval_object_literal(agent: &RefCell<Agent>, ctx: Ctx, props: &[ast::PropertyDef]) -> Completion {
    let object_prototype = { agent.borrow().current_realm().intrinsics().object_prototype };
    let object = make_basic_object(agent, Some(object_prototype));
    for prop in props {
        match prop {
            ast::PropertyDef::KeyValue { key, value, .. } => {
                let property_key = okc!(property_key_from_expr(agent, ctx, key).await);
                let v = val!(Box::pin(eval_expression(agent, ctx, value)).await);
                if let ast::PropertyKeyExpr::Identifier(name) = key {
                    name_anonymous_function(agent, v, name);
                }
                okc!(create_data_property_or_throw_key(agent, object, property_key, v));
            }
            ast::PropertyDef::Spread(expr) => {
                let v = val!(Box::pin(eval_expression(agent, ctx, expr)).await);
                if !v.is_nullish() {
                    let source = okc!(to_object(agent, v));
                    let keys = { internal_methods::own_property_keys(&agent.borrow(), source) };
                    for key in keys {
                        let enumerable = {
                            let a = agent.borrow();
                            internal_methods::get_own_property(&a, source, &key).map(|d| d.enumerable()).unwrap_or(false)
                        };
                        if !enumerable {
                            continue;
                        }
                        let value = okc!(get_property(agent, source, &key));
                        okc!(create_data_property_or_throw_key(agent, object, key, value));
                    }
                }
            }
            ast::PropertyDef::Method { key, kind, function } => {
                let property_key = okc!(property_key_from_expr(agent, ctx, key).await);
                let func_obj = make_ecma_function(agent, ctx, function.clone());
                strip_own_prototype(agent, func_obj);
                set_home_object(agent, func_obj, object);
                let name = property_key_display_for_name(agent, &property_key);
                let prefix = match kind {
                    ast::MethodKind::Get => Some("get"),
                    ast::MethodKind::Set => Some("set"),
                    ast::MethodKind::Method => None,
                };
                set_function_name(agent, func_obj, &name, prefix);
                match kind {
                    ast::MethodKind::Method => {
                        okc!(create_data_property_or_throw_key(agent, object, property_key, Value::Object(func_obj)));
                    }
                    ast::MethodKind::Get => define_accessor(agent, object, property_key, Some(func_obj), None, true),
                    ast::MethodKind::Set => define_accessor(agent, object, property_key, None, Some(func_obj), true),
                }
            }
        }
    }
    Completion::Normal(Value::Object(object))
}

fn define_accessor(agent: &RefCell<Agent>, object: Object, key: PropertyKey, getter: Option<Object>, setter: Option<Object>, enumerable: bool) {
    let existing = { internal_methods::get_own_property(&agent.borrow(), object, &key) };
    let (mut get, mut set) = match existing {
        Some(crate::ecmascript::types::spec::property_descriptor::PropertyDescriptor::Accessor { get, set, .. }) => (get, set),
        _ => (None, None),
    };
    if let Some(g) = getter {
        get = Some(Value::Object(g));
    }
    if let Some(s) = setter {
        set = Some(Value::Object(s));
    }
    let _ = internal_methods::define_own_property(
        agent,
        object,
        key,
        PartialPropertyDescriptor {
            get: Some(get),
            set: Some(set),
            enumerable: Some(enumerable),
            configurable: Some(true),
            ..Default::default()
        },
    );
}

async fn eval_template(agent: &RefCell<Agent>, ctx: Ctx, quasis: &[String], expressions: &[ast::Expression]) -> Completion {
    let mut out = String::new();
    let mut quasis_iter = quasis.iter();
    if let Some(first) = quasis_iter.next() {
        out.push_str(first);
    }
    for (expr, quasi) in expressions.iter().zip(quasis_iter) {
        let v = val!(Box::pin(eval_expression(agent, ctx, expr)).await);
        let s = okc!(to_string(agent, v));
        out.push_str({
            let a = agent.borrow();
            s.as_str(&a.heap)
        });
        out.push_str(quasi);
    }
    Completion::Normal(Value::String(js_string(agent, &out)))
}

// ----------------------------------------------------------------------
// Unary / update operators
// ----------------------------------------------------------------------

async fn eval_unary(agent: &RefCell<Agent>, ctx: Ctx, op: ast::UnaryOp, argument: &ast::Expression) -> Completion {
    if op == ast::UnaryOp::TypeOf {
        if let ast::Expression::Identifier(_) = argument {
            let reference = match Box::pin(eval_reference(agent, ctx, argument)).await {
                Ok(r) => r,
                Err(_) => return Completion::Normal(Value::String(js_string(agent, "undefined"))),
            };
            if reference.is_unresolvable() {
                return Completion::Normal(Value::String(js_string(agent, "undefined")));
            }
            let value = okc!(get_value(agent, &reference));
            return Completion::Normal(type_of_value(agent, value));
        }
    }
    if op == ast::UnaryOp::Delete {
        return Box::pin(eval_delete(agent, ctx, argument)).await;
    }
    let value = val!(Box::pin(eval_expression(agent, ctx, argument)).await);
    match op {
        ast::UnaryOp::Minus => match value {
            Value::BigInt(b) => {
                let n = b.to_num_bigint({ &agent.borrow().heap });
                Completion::Normal(bigint_value(agent, -n))
            }
            _ => Completion::Normal(Value::Number(-okc!(to_number(agent, value)))),
        },
        ast::UnaryOp::Plus => Completion::Normal(Value::Number(okc!(to_number(agent, value)))),
        ast::UnaryOp::Not => Completion::Normal(Value::Boolean(!to_boolean(value))),
        ast::UnaryOp::BitNot => match value {
            Value::BigInt(b) => {
                let n = b.to_num_bigint({ &agent.borrow().heap });
                Completion::Normal(bigint_value(agent, !n))
            }
            _ => Completion::Normal(Value::Number(!okc!(to_int32(agent, value)) as f64)),
        },
        ast::UnaryOp::Void => Completion::Normal(Value::Undefined),
        ast::UnaryOp::TypeOf => Completion::Normal(type_of_value(agent, value)),
        ast::UnaryOp::Delete => unreachable!("handled above"),
    }
}

fn type_of_value(agent: &RefCell<Agent>, value: Value) -> Value {
    let name = if is_callable(&agent.borrow(), value) { "function" } else { value.type_of_name() };
    Value::String(js_string(agent, name))
}

async fn eval_delete(agent: &RefCell<Agent>, ctx: Ctx, argument: &ast::Expression) -> Completion {
    match argument {
        ast::Expression::Identifier(_) => {
            if ctx.strict {
                // A real early error (static SyntaxError, rejected before the
                // script runs at all); this tree walker has no static-analysis
                // pass to reject it ahead of time, so it surfaces here as a
                // thrown SyntaxError instead, the first point evaluation
                // reaches the offending `delete`.
                let error = agent
                    .borrow_mut()
                    .throw_exception_with_static_message(ExceptionType::SyntaxError, "Delete of an unqualified identifier in strict mode");
                return Completion::Throw(error);
            }
            let reference = okc!(Box::pin(eval_reference(agent, ctx, argument)).await);
            match reference.base {
                ReferenceBase::Unresolvable => Completion::Normal(Value::Boolean(true)),
                ReferenceBase::Environment(env) => {
                    let name = key_display(agent, &reference.referenced_name);
                    Completion::Normal(Value::Boolean(okc!(env.delete_binding(agent, &name))))
                }
                ReferenceBase::Value(_) => Completion::Normal(Value::Boolean(true)),
            }
        }
        ast::Expression::Member { object, property, .. } => {
            let base = val!(Box::pin(eval_expression(agent, ctx, object)).await);
            let key = okc!(member_property_key(agent, ctx, property).await);
            let obj = okc!(to_object(agent, base));
            match delete_property_or_throw(agent, obj, &key) {
                Ok(()) => Completion::Normal(Value::Boolean(true)),
                Err(_) if !ctx.strict => Completion::Normal(Value::Boolean(false)),
                Err(e) => Completion::Throw(e),
            }
        }
        _ => {
            let _ = val!(Box::pin(eval_expression(agent, ctx, argument)).await);
            Completion::Normal(Value::Boolean(true))
        }
    }
}

async fn eval_update(agent: &RefCell<Agent>, ctx: Ctx, op: ast::UpdateOp, argument: &ast::Expression, prefix: bool) -> Completion {
    let reference = okc!(Box::pin(eval_reference(agent, ctx, argument)).await);
    let old_value = okc!(get_value(agent, &reference));
    let new_value = match old_value {
        Value::BigInt(b) => {
            let n = b.to_num_bigint({ &agent.borrow().heap });
            let result = if op == ast::UpdateOp::Increment { n + 1 } else { n - 1 };
            bigint_value(agent, result)
        }
        _ => {
            let n = okc!(to_number(agent, old_value));
            Value::Number(if op == ast::UpdateOp::Increment { n + 1.0 } else { n - 1.0 })
        }
    };
    okc!(put_value(agent, &reference, new_value));
    Completion::Normal(if prefix { new_value } else { coerce_numeric(agent, old_value) })
}

/// `++`/`--`'s old-value result must itself be the numeric (not whatever
/// object/string) form — `ToNumeric` already ran above via `to_number`/
/// `to_num_bigint`, this just re-wraps the already-produced value for the
/// `x++` (postfix, returns the pre-update numeric value) case.
fn coerce_numeric(agent: &RefCell<Agent>, value: Value) -> Value {
    match value {
        Value::Number(_) | Value::BigInt(_) => value,
        other => Value::Number(to_number(agent, other).unwrap_or(f64::NAN)),
    }
}

fn bigint_value(agent: &RefCell<Agent>, n: NumBigInt) -> Value {
    let mut a = agent.borrow_mut();
    Value::BigInt(BigInt::from_num_bigint(&mut a.heap, n))
}

// ----------------------------------------------------------------------
// Binary / logical / relational operators
// ----------------------------------------------------------------------

async fn eval_binary(agent: &RefCell<Agent>, ctx: Ctx, op: ast::BinaryOp, left: &ast::Expression, right: &ast::Expression) -> Completion {
    if op == ast::BinaryOp::Instanceof {
        let l = val!(Box::pin(eval_expression(agent, ctx, left)).await);
        let r = val!(Box::pin(eval_expression(agent, ctx, right)).await);
        return Completion::Normal(Value::Boolean(okc!(instanceof_operator(agent, l, r))));
    }
    if op == ast::BinaryOp::In {
        let l = val!(Box::pin(eval_expression(agent, ctx, left)).await);
        let r = val!(Box::pin(eval_expression(agent, ctx, right)).await);
        let Value::Object(obj) = r else {
            return Completion::Throw(okc_panic_err(agent, "Cannot use 'in' operator on a non-object"));
        };
        let key = okc!(to_property_key(agent, l));
        return Completion::Normal(Value::Boolean(internal_methods::has_property(&agent.borrow(), obj, &key)));
    }

    let l = val!(Box::pin(eval_expression(agent, ctx, left)).await);
    let r = val!(Box::pin(eval_expression(agent, ctx, right)).await);
    match op {
        ast::BinaryOp::Add => Completion::Normal(okc!(add_values(agent, l, r))),
        ast::BinaryOp::Sub | ast::BinaryOp::Mul | ast::BinaryOp::Div | ast::BinaryOp::Mod | ast::BinaryOp::Exp => {
            Completion::Normal(okc!(arithmetic(agent, op, l, r)))
        }
        ast::BinaryOp::ShiftLeft | ast::BinaryOp::ShiftRight | ast::BinaryOp::ShiftRightUnsigned | ast::BinaryOp::BitAnd | ast::BinaryOp::BitOr | ast::BinaryOp::BitXor => {
            Completion::Normal(okc!(bitwise(agent, op, l, r)))
        }
        ast::BinaryOp::Equal => Completion::Normal(Value::Boolean(okc!(is_loosely_equal(agent, l, r)))),
        ast::BinaryOp::NotEqual => Completion::Normal(Value::Boolean(!okc!(is_loosely_equal(agent, l, r)))),
        ast::BinaryOp::StrictEqual => Completion::Normal(Value::Boolean(is_strictly_equal(&agent.borrow(), l, r))),
        ast::BinaryOp::StrictNotEqual => Completion::Normal(Value::Boolean(!is_strictly_equal(&agent.borrow(), l, r))),
        ast::BinaryOp::LessThan => Completion::Normal(Value::Boolean(okc!(is_less_than(agent, l, r)).unwrap_or(false))),
        ast::BinaryOp::GreaterThan => Completion::Normal(Value::Boolean(okc!(is_less_than(agent, r, l)).unwrap_or(false))),
        ast::BinaryOp::LessEqual => Completion::Normal(Value::Boolean(matches!(okc!(is_less_than(agent, r, l)), Some(false)))),
        ast::BinaryOp::GreaterEqual => Completion::Normal(Value::Boolean(matches!(okc!(is_less_than(agent, l, r)), Some(false)))),
        ast::BinaryOp::In | ast::BinaryOp::Instanceof => unreachable!("handled above"),
    }
}

/// ### [7.3.22 InstanceofOperator ( V, target )](https://tc39.es/ecma262/#sec-instanceofoperator)
fn instanceof_operator(agent: &RefCell<Agent>, value: Value, target: Value) -> JsResult<bool> {
    let Value::Object(target_obj) = target else {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Right-hand side of 'instanceof' is not callable"));
    };
    if !is_callable(&agent.borrow(), target) {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Right-hand side of 'instanceof' is not callable"));
    }
    ordinary_has_instance(agent, target_obj, value)
}

/// ### [20.2.3.6 OrdinaryHasInstance ( C, O )](https://tc39.es/ecma262/#sec-ordinaryhasinstance)
fn ordinary_has_instance(agent: &RefCell<Agent>, constructor: Object, value: Value) -> JsResult<bool> {
    let bound_target = {
        let a = agent.borrow();
        match &a.heap[constructor.0].exotic {
            ExoticData::Function(FunctionData::Bound(bound)) => Some(bound.target),
            _ => None,
        }
    };
    if let Some(target) = bound_target {
        return ordinary_has_instance(agent, target, value);
    }
    let Value::Object(mut obj) = value else { return Ok(false) };
    let proto = get_property(agent, constructor, &PropertyKey::from_static_str("prototype"))?;
    let Value::Object(target_proto) = proto else {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Function has non-object prototype in instanceof check"));
    };
    loop {
        let parent = { internal_methods::get_prototype_of(&agent.borrow(), obj) };
        match parent {
            Some(p) => {
                if p == target_proto {
                    return Ok(true);
                }
                obj = p;
            }
            None => return Ok(false),
        }
    }
}

/// ### [13.15.3 ApplyStringOrNumericBinaryOperator ( lval, opText, rval )](https://tc39.es/ecma262/#sec-applystringornumericbinaryoperator), `+` case
fn add_values(agent: &RefCell<Agent>, left: Value, right: Value) -> JsResult<Value> {
    let lprim = to_primitive(agent, left, PreferredType::Default)?;
    let rprim = to_primitive(agent, right, PreferredType::Default)?;
    if matches!(lprim, Value::String(_)) || matches!(rprim, Value::String(_)) {
        let ls = to_string(agent, lprim)?;
        let rs = to_string(agent, rprim)?;
        let mut a = agent.borrow_mut();
        let combined = format!("{}{}", ls.as_str(&a.heap), rs.as_str(&a.heap));
        return Ok(Value::String(a.heap.create(combined)));
    }
    arithmetic_numeric(agent, ast::BinaryOp::Add, lprim, rprim)
}

fn arithmetic(agent: &RefCell<Agent>, op: ast::BinaryOp, left: Value, right: Value) -> JsResult<Value> {
    arithmetic_numeric(agent, op, left, right)
}

fn arithmetic_numeric(agent: &RefCell<Agent>, op: ast::BinaryOp, left: Value, right: Value) -> JsResult<Value> {
    let both_bigint = matches!(left, Value::BigInt(_)) && matches!(right, Value::BigInt(_));
    let either_bigint = matches!(left, Value::BigInt(_)) || matches!(right, Value::BigInt(_));
    if either_bigint && !both_bigint {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(ExceptionType::TypeError, "Cannot mix BigInt and other types"));
    }
    if both_bigint {
        let Value::BigInt(lb) = left else { unreachable!() };
        let Value::BigInt(rb) = right else { unreachable!() };
        let (ln, rn) = { let a = agent.borrow(); (lb.to_num_bigint(&a.heap), rb.to_num_bigint(&a.heap)) };
        let result = match op {
            ast::BinaryOp::Add => ln + rn,
            ast::BinaryOp::Sub => ln - rn,
            ast::BinaryOp::Mul => ln * rn,
            ast::BinaryOp::Div => {
                if rn == NumBigInt::from(0) {
                    return Err(agent.borrow_mut().throw_exception_with_static_message(ExceptionType::RangeError, "Division by zero"));
                }
                ln / rn
            }
            ast::BinaryOp::Mod => {
                if rn == NumBigInt::from(0) {
                    return Err(agent.borrow_mut().throw_exception_with_static_message(ExceptionType::RangeError, "Division by zero"));
                }
                ln % rn
            }
            ast::BinaryOp::Exp => bigint_pow(ln, rn)?,
            _ => unreachable!(),
        };
        return Ok(bigint_value(agent, result));
    }
    let ln = to_number(agent, left)?;
    let rn = to_number(agent, right)?;
    Ok(Value::Number(match op {
        ast::BinaryOp::Add => ln + rn,
        ast::BinaryOp::Sub => ln - rn,
        ast::BinaryOp::Mul => ln * rn,
        ast::BinaryOp::Div => ln / rn,
        ast::BinaryOp::Mod => ln % rn,
        ast::BinaryOp::Exp => ln.powf(rn),
        _ => unreachable!(),
    }))
}

/// `num_bigint`'s `Pow` trait impls aren't depended on directly here (avoids
/// guessing at an unverified trait surface); small-exponent repeated
/// squaring covers everything `**` realistically needs.
fn bigint_pow(base: NumBigInt, exponent: NumBigInt) -> JsResult<NumBigInt> {
    if exponent < NumBigInt::from(0) {
        return Err(JsError::new(Value::Undefined));
    }
    let mut result = NumBigInt::from(1);
    let mut base = base;
    let mut exp = exponent;
    let zero = NumBigInt::from(0);
    let two = NumBigInt::from(2);
    while exp > zero {
        if (&exp % &two) == NumBigInt::from(1) {
            result *= &base;
        }
        base = &base * &base;
        exp /= &two;
    }
    Ok(result)
}

fn bitwise(agent: &RefCell<Agent>, op: ast::BinaryOp, left: Value, right: Value) -> JsResult<Value> {
    let both_bigint = matches!(left, Value::BigInt(_)) && matches!(right, Value::BigInt(_));
    if both_bigint {
        let Value::BigInt(lb) = left else { unreachable!() };
        let Value::BigInt(rb) = right else { unreachable!() };
        let (ln, rn) = { let a = agent.borrow(); (lb.to_num_bigint(&a.heap), rb.to_num_bigint(&a.heap)) };
        let result = match op {
            ast::BinaryOp::BitAnd => ln & rn,
            ast::BinaryOp::BitOr => ln | rn,
            ast::BinaryOp::BitXor => ln ^ rn,
            ast::BinaryOp::ShiftLeft => {
                let shift: u32 = rn.try_into().unwrap_or(0);
                ln << shift
            }
            ast::BinaryOp::ShiftRight => {
                let shift: u32 = rn.try_into().unwrap_or(0);
                ln >> shift
            }
            ast::BinaryOp::ShiftRightUnsigned => {
                return Err(JsError::new(Value::Undefined));
            }
            _ => unreachable!(),
        };
        return Ok(bigint_value(agent, result));
    }
    match op {
        ast::BinaryOp::ShiftRightUnsigned => {
            let ln = to_uint32(agent, left)?;
            let shift = to_uint32(agent, right)? & 0x1f;
            Ok(Value::Number((ln >> shift) as f64))
        }
        _ => {
            let ln = to_int32(agent, left)?;
            let rn = to_int32(agent, right)?;
            Ok(Value::Number(match op {
                ast::BinaryOp::BitAnd => (ln & rn) as f64,
                ast::BinaryOp::BitOr => (ln | rn) as f64,
                ast::BinaryOp::BitXor => (ln ^ rn) as f64,
                ast::BinaryOp::ShiftLeft => ((ln as i64) << ((rn & 0x1f) as i64)) as i32 as f64,
                ast::BinaryOp::ShiftRight => (ln >> (rn & 0x1f)) as f64,
                _ => unreachable!(),
            }))
        }
    }
}

async fn eval_logical(agent: &RefCell<Agent>, ctx: Ctx, op: ast::LogicalOp, left: &ast::Expression, right: &ast::Expression) -> Completion {
    let l = val!(Box::pin(eval_expression(agent, ctx, left)).await);
    match op {
        ast::LogicalOp::And => {
            if !l.to_boolean() {
                Completion::Normal(l)
            } else {
                Box::pin(eval_expression(agent, ctx, right)).await
            }
        }
        ast::LogicalOp::Or => {
            if l.to_boolean() {
                Completion::Normal(l)
            } else {
                Box::pin(eval_expression(agent, ctx, right)).await
            }
        }
        ast::LogicalOp::Coalesce => {
            if l.is_nullish() {
                Box::pin(eval_expression(agent, ctx, right)).await
            } else {
                Completion::Normal(l)
            }
        }
    }
}

// ----------------------------------------------------------------------
// Assignment (including destructuring)
// ----------------------------------------------------------------------

async fn eval_assignment(agent: &RefCell<Agent>, ctx: Ctx, op: ast::AssignOp, target: &ast::Expression, value_expr: &ast::Expression) -> Completion {
    if op == ast::AssignOp::Assign {
        if matches!(target, ast::Expression::Array(_) | ast::Expression::Object(_)) {
            let value = val!(Box::pin(eval_expression(agent, ctx, value_expr)).await);
            okc!(Box::pin(destructuring_assignment(agent, ctx, target, value)).await);
            return Completion::Normal(value);
        }
        let reference = okc!(Box::pin(eval_reference(agent, ctx, target)).await);
        let value = val!(Box::pin(eval_expression(agent, ctx, value_expr)).await);
        if let ast::Expression::Identifier(name) = target {
            name_anonymous_function(agent, value, name);
        }
        okc!(put_value(agent, &reference, value));
        return Completion::Normal(value);
    }

    if matches!(op, ast::AssignOp::LogicalAnd | ast::AssignOp::LogicalOr | ast::AssignOp::Coalesce) {
        let reference = okc!(Box::pin(eval_reference(agent, ctx, target)).await);
        let current = okc!(get_value(agent, &reference));
        let should_assign = match op {
            ast::AssignOp::LogicalAnd => current.to_boolean(),
            ast::AssignOp::LogicalOr => !current.to_boolean(),
            ast::AssignOp::Coalesce => current.is_nullish(),
            _ => unreachable!(),
        };
        if !should_assign {
            return Completion::Normal(current);
        }
        let value = val!(Box::pin(eval_expression(agent, ctx, value_expr)).await);
        okc!(put_value(agent, &reference, value));
        return Completion::Normal(value);
    }

    let reference = okc!(Box::pin(eval_reference(agent, ctx, target)).await);
    let current = okc!(get_value(agent, &reference));
    let rhs = val!(Box::pin(eval_expression(agent, ctx, value_expr)).await);
    let binary_op = compound_assign_to_binary(op);
    let combined = if matches!(binary_op, ast::BinaryOp::ShiftLeft | ast::BinaryOp::ShiftRight | ast::BinaryOp::ShiftRightUnsigned | ast::BinaryOp::BitAnd | ast::BinaryOp::BitOr | ast::BinaryOp::BitXor) {
        okc!(bitwise(agent, binary_op, current, rhs))
    } else if binary_op == ast::BinaryOp::Add {
        okc!(add_values(agent, current, rhs))
    } else {
        okc!(arithmetic(agent, binary_op, current, rhs))
    };
    okc!(put_value(agent, &reference, combined));
    Completion::Normal(combined)
}

fn compound_assign_to_binary(op: ast::AssignOp) -> ast::BinaryOp {
    match op {
        ast::AssignOp::Add => ast::BinaryOp::Add,
        ast::AssignOp::Sub => ast::BinaryOp::Sub,
        ast::AssignOp::Mul => ast::BinaryOp::Mul,
        ast::AssignOp::Div => ast::BinaryOp::Div,
        ast::AssignOp::Mod => ast::BinaryOp::Mod,
        ast::AssignOp::Exp => ast::BinaryOp::Exp,
        ast::AssignOp::ShiftLeft => ast::BinaryOp::ShiftLeft,
        ast::AssignOp::ShiftRight => ast::BinaryOp::ShiftRight,
        ast::AssignOp::ShiftRightUnsigned => ast::BinaryOp::ShiftRightUnsigned,
        ast::AssignOp::BitAnd => ast::BinaryOp::BitAnd,
        ast::AssignOp::BitOr => ast::BinaryOp::BitOr,
        ast::AssignOp::BitXor => ast::BinaryOp::BitXor,
        ast::AssignOp::Assign | ast::AssignOp::LogicalAnd | ast::AssignOp::LogicalOr | ast::AssignOp::Coalesce => unreachable!("handled separately"),
    }
}

/// ### [13.15.5 Runtime Semantics: DestructuringAssignmentEvaluation](https://tc39.es/ecma262/#sec-destructuring-assignment)
///
/// Mirrors `binding_patterns::binding_initialization`'s algorithms but over
/// `Expression::Array`/`Expression::Object` targets (assignment targets are
/// arbitrary expressions, not `BindingPattern`s) — per-element defaults are
/// represented by reusing `Expression::Assignment { op: Assign, .. }` nodes
/// as pattern elements since there's no dedicated AssignmentPattern AST node.
async fn destructuring_assignment(agent: &RefCell<Agent>, ctx: Ctx, target: &ast::Expression, value: Value) -> JsResult<()> {
    match target {
        ast::Expression::Array(elements) => {
            let mut record: IteratorRecord = get_iterator(agent, value)?;
            for element in elements {
                match element {
                    ast::ArrayElement::Elision => {
                        if !record.done && iterator_step(agent, &record)?.is_none() {
                            record.done = true;
                        }
                    }
                    ast::ArrayElement::Spread(target_expr) => {
                        let array_prototype = { agent.borrow().current_realm().intrinsics().array_prototype };
                        let rest_array = internal_methods::array_create(&mut agent.borrow_mut(), 0, array_prototype);
                        let mut i = 0u32;
                        while !record.done {
                            match iterator_step(agent, &record)? {
                                Some(v) => {
                                    create_data_property_or_throw_key(agent, rest_array, index_key(agent, i), v)?;
                                    i += 1;
                                }
                                None => record.done = true,
                            }
                        }
                        Box::pin(assign_to_target(agent, ctx, target_expr, Value::Object(rest_array))).await?;
                    }
                    ast::ArrayElement::Expression(element_expr) => {
                        let next_value = if record.done {
                            Value::Undefined
                        } else {
                            match iterator_step(agent, &record)? {
                                Some(v) => v,
                                None => {
                                    record.done = true;
                                    Value::Undefined
                                }
                            }
                        };
                        let (inner_target, default) = unwrap_default(element_expr);
                        let next_value = apply_assignment_default(agent, ctx, next_value, default).await?;
                        Box::pin(assign_to_target(agent, ctx, inner_target, next_value)).await?;
                    }
                }
            }
            if !record.done {
                iterator_close(agent, &record)?;
            }
            Ok(())
        }
        ast::Expression::Object(props) => {
            if value.is_nullish() {
                return Err(agent
                    .borrow_mut()
                    .throw_exception_with_static_message(ExceptionType::TypeError, "cannot destructure null or undefined"));
            }
            let mut seen: Vec<PropertyKey> = Vec::new();
            let mut rest_target: Option<&ast::Expression> = None;
            for prop in props {
                match prop {
                    ast::PropertyDef::KeyValue { key, value: value_target, .. } => {
                        let property_key = property_key_from_expr(agent, ctx, key).await?;
                        seen.push(property_key);
                        let prop_value = get_v(agent, value, &property_key)?;
                        let (inner_target, default) = unwrap_default(value_target);
                        let prop_value = apply_assignment_default(agent, ctx, prop_value, default).await?;
                        Box::pin(assign_to_target(agent, ctx, inner_target, prop_value)).await?;
                    }
                    ast::PropertyDef::Spread(target_expr) => {
                        rest_target = Some(target_expr);
                    }
                    ast::PropertyDef::Method { .. } => {}
                }
            }
            if let Some(target_expr) = rest_target {
                let object_prototype = { agent.borrow().current_realm().intrinsics().object_prototype };
                let rest_object = { let mut a = agent.borrow_mut(); a.heap.create(ObjectHeapData::new_ordinary(Some(object_prototype))) };
                let source = to_object(agent, value)?;
                let keys = { internal_methods::own_property_keys(&agent.borrow(), source) };
                for key in keys {
                    if seen.contains(&key) {
                        continue;
                    }
                    let enumerable = {
                        let a = agent.borrow();
                        internal_methods::get_own_property(&a, source, &key).map(|d| d.enumerable()).unwrap_or(false)
                    };
                    if !enumerable {
                        continue;
                    }
                    let v = get_property(agent, source, &key)?;
                    create_data_property_or_throw_key(agent, rest_object, key, v)?;
                }
                Box::pin(assign_to_target(agent, ctx, target_expr, Value::Object(rest_object))).await?;
            }
            Ok(())
        }
        _ => assign_to_target(agent, ctx, target, value).await,
    }
}

/// Splits an `Expression::Assignment { op: Assign, target, value }` node
/// used as a destructuring-assignment element with a default into its
/// target and default-value expression; anything else has no default.
fn unwrap_default(expr: &ast::Expression) -> (&ast::Expression, Option<&ast::Expression>) {
    match expr {
        ast::Expression::Assignment { op: ast::AssignOp::Assign, target, value } => (target, Some(value)),
        other => (other, None),
    }
}

async fn apply_assignment_default(agent: &RefCell<Agent>, ctx: Ctx, value: Value, default: Option<&ast::Expression>) -> JsResult<Value> {
    if !value.is_undefined() {
        return Ok(value);
    }
    let Some(default) = default else { return Ok(value) };
    Box::pin(eval_expression(agent, ctx, default)).await.into_value_or_throw()
}

async fn assign_to_target(agent: &RefCell<Agent>, ctx: Ctx, target: &ast::Expression, value: Value) -> JsResult<()> {
    if matches!(target, ast::Expression::Array(_) | ast::Expression::Object(_)) {
        return Box::pin(destructuring_assignment(agent, ctx, target, value)).await;
    }
    let reference = eval_reference(agent, ctx, target).await?;
    put_value(agent, &reference, value)
}

// ----------------------------------------------------------------------
// Call / New / SuperCall
// ----------------------------------------------------------------------

async fn eval_arguments(agent: &RefCell<Agent>, ctx: Ctx, arguments: &[ast::Argument]) -> JsResult<Vec<Value>> {
    let mut out = Vec::with_capacity(arguments.len());
    for arg in arguments {
        match arg {
            ast::Argument::Expression(expr) => {
                out.push(Box::pin(eval_expression(agent, ctx, expr)).await.into_value_or_throw()?);
            }
            ast::Argument::Spread(expr) => {
                let v = Box::pin(eval_expression(agent, ctx, expr)).await.into_value_or_throw()?;
                let record = get_iterator(agent, v)?;
                loop {
                    match iterator_step(agent, &record)? {
                        Some(item) => out.push(item),
                        None => break,
                    }
                }
            }
        }
    }
    Ok(out)
}

async fn eval_call(agent: &RefCell<Agent>, ctx: Ctx, callee: &ast::Expression, arguments: &[ast::Argument], optional: bool) -> Completion {
    let is_super_member = matches!(callee, ast::Expression::SuperMember { .. });
    let (function_value, this_value) = if matches!(callee, ast::Expression::Member { .. }) || is_super_member {
        let reference = okc!(Box::pin(eval_reference(agent, ctx, callee)).await);
        let this_value = match &reference.base {
            ReferenceBase::Value(v) if is_super_member => reference.this_value.unwrap_or(*v),
            ReferenceBase::Value(v) => *v,
            _ => Value::Undefined,
        };
        let f = okc!(get_value(agent, &reference));
        (f, this_value)
    } else {
        let f = val!(Box::pin(eval_expression(agent, ctx, callee)).await);
        (f, Value::Undefined)
    };

    if optional && function_value.is_nullish() {
        return Completion::normal_undefined();
    }
    if !is_callable(&agent.borrow(), function_value) {
        return Completion::Throw(okc_panic_err(agent, "value is not a function"));
    }
    let args = okc!(Box::pin(eval_arguments(agent, ctx, arguments)).await);
    Completion::Normal(okc!(call_function(agent, function_value, this_value, &args)))
}

async fn eval_new(agent: &RefCell<Agent>, ctx: Ctx, callee: &ast::Expression, arguments: &[ast::Argument]) -> Completion {
    let constructor_value = val!(Box::pin(eval_expression(agent, ctx, callee)).await);
    let Value::Object(constructor) = constructor_value else {
        return Completion::Throw(okc_panic_err(agent, "not a constructor"));
    };
    let args = okc!(Box::pin(eval_arguments(agent, ctx, arguments)).await);
    Completion::Normal(Value::Object(okc!(construct(agent, constructor, &args, constructor))))
}

/// ### [13.3.7.1 Runtime Semantics: Evaluation, SuperCall](https://tc39.es/ecma262/#sec-super-keyword-runtime-semantics-evaluation)
async fn eval_super_call(agent: &RefCell<Agent>, ctx: Ctx, arguments: &[ast::Argument]) -> Completion {
    let this_env = active_function_environment(agent, ctx.lexical);
    let Environment::Function(idx) = this_env else { unreachable!() };
    let (function_object, new_target) = {
        let a = agent.borrow();
        let rec = &a.heap.function_environments[idx.into_index()];
        (rec.function_object, rec.new_target)
    };
    let new_target = okc!(new_target.ok_or_else(|| agent.borrow_mut().throw_exception_with_static_message(ExceptionType::TypeError, "'super' keyword unexpected here")));
    let super_constructor = {
        let proto = internal_methods::get_prototype_of(&agent.borrow(), function_object);
        proto
    };
    let Some(super_constructor) = super_constructor else {
        return Completion::Throw(okc_panic_err(agent, "super called on a constructor with no parent class"));
    };

    let args = okc!(Box::pin(eval_arguments(agent, ctx, arguments)).await);
    let result = okc!(construct(agent, super_constructor, &args, new_target));

    {
        let mut a = agent.borrow_mut();
        a.heap.function_environments[idx.into_index()].bind_this_value(Value::Object(result));
    }

    let fields = {
        let a = agent.borrow();
        match &a.heap[function_object.0].exotic {
            ExoticData::Function(FunctionData::Ecma(ecma)) => ecma.fields_to_initialize.clone(),
            _ => Vec::new(),
        }
    };
    okc!(Box::pin(initialize_instance_fields(agent, ctx, &fields, result)).await);

    Completion::Normal(Value::Object(result))
}

// ----------------------------------------------------------------------
// Yield / Await
// ----------------------------------------------------------------------

async fn eval_yield(agent: &RefCell<Agent>, ctx: Ctx, argument: Option<&ast::Expression>, delegate: bool) -> Completion {
    let Some(susp) = ctx.suspension() else {
        return Completion::Throw(okc_panic_err(agent, "'yield' used outside a generator"));
    };
    let value = match argument {
        Some(expr) => val!(Box::pin(eval_expression(agent, ctx, expr)).await),
        None => Value::Undefined,
    };
    if !delegate {
        return SuspendPoint::new(susp, SuspendedOp::Yield(value)).await;
    }

    // `yield*`: forwards every value produced by `value`'s iterator as a
    // `yield`, then resolves to the iterator's final `{ done: true }` value.
    // Per [14.4.14], an abrupt resumption (`.throw()`/`.return()`) received
    // while parked here is routed to the inner iterator's own `throw`/
    // `return` method rather than just bubbling past it, so a `finally`
    // block inside the delegated generator still runs on `.return()` and a
    // `try`/`catch` inside it still sees a `.throw()`.
    let record = okc!(get_iterator(agent, value));
    let mut received = Completion::Normal(Value::Undefined);
    loop {
        let is_return = matches!(received, Completion::Return(_));
        let step = match received {
            Completion::Normal(v) => okc!(call_function(agent, record.next_method, Value::Object(record.iterator), &[v])),
            Completion::Throw(err) => {
                let throw_method = okc!(get_property(agent, record.iterator, &PropertyKey::from_static_str("throw")));
                if !is_callable(&agent.borrow(), throw_method) {
                    okc!(iterator_close(agent, &record));
                    return Completion::Throw(okc_panic_err(agent, "iterator does not have a throw method"));
                }
                okc!(call_function(agent, throw_method, Value::Object(record.iterator), &[err.value()]))
            }
            Completion::Return(v) => {
                let return_method = okc!(get_property(agent, record.iterator, &PropertyKey::from_static_str("return")));
                if !is_callable(&agent.borrow(), return_method) {
                    return Completion::Return(v);
                }
                okc!(call_function(agent, return_method, Value::Object(record.iterator), &[v]))
            }
            other => return other,
        };
        let Value::Object(result_object) = step else {
            return Completion::Throw(okc_panic_err(agent, "iterator result is not an object"));
        };
        let done = okc!(get_property(agent, result_object, &PropertyKey::from_static_str("done"))).to_boolean();
        let item_value = okc!(get_property(agent, result_object, &PropertyKey::from_static_str("value")));
        if done {
            return if is_return {
                Completion::Return(item_value)
            } else {
                Completion::Normal(item_value)
            };
        }
        received = SuspendPoint::new(susp, SuspendedOp::Yield(item_value)).await;
    }
}

async fn eval_await(agent: &RefCell<Agent>, ctx: Ctx, argument: &ast::Expression) -> Completion {
    let Some(susp) = ctx.suspension() else {
        return Completion::Throw(okc_panic_err(agent, "'await' used outside an async function"));
    };
    let value = val!(Box::pin(eval_expression(agent, ctx, argument)).await);
    SuspendPoint::new(susp, SuspendedOp::Await(value)).await
}

// ======================================================================
// Classes
// ======================================================================

/// ### [15.7.14 Runtime Semantics: ClassDefinitionEvaluation](https://tc39.es/ecma262/#sec-runtime-semantics-classdefinitionevaluation)
async fn eval_class(agent: &RefCell<Agent>, ctx: Ctx, def: &Rc<ast::ClassDef>) -> Completion {
    let class_env = new_declarative_environment(agent, Some(ctx.lexical));
    if let Some(name) = &def.name {
        okc!(class_env.create_immutable_binding(agent, name, true));
    }
    let class_ctx = ctx.with_lexical(class_env);

    let (proto_parent, constructor_parent, constructor_kind) = match &def.super_class {
        None => {
            let object_prototype = { agent.borrow().current_realm().intrinsics().object_prototype };
            let function_prototype = { agent.borrow().current_realm().intrinsics().function_prototype };
            (Some(object_prototype), function_prototype, ConstructorKind::Base)
        }
        Some(expr) => {
            let super_value = val!(Box::pin(eval_expression(agent, class_ctx, expr)).await);
            match super_value {
                Value::Null => (None, { agent.borrow().current_realm().intrinsics().function_prototype }, ConstructorKind::Derived),
                Value::Object(super_ctor) => {
                    if !okc!(Ok::<_, JsError>(is_constructor_object(agent, super_ctor))) {
                        return Completion::Throw(okc_panic_err(agent, "Class extends value is not a constructor"));
                    }
                    let proto = okc!(get_property(agent, super_ctor, &PropertyKey::from_static_str("prototype")));
                    let proto_parent = match proto {
                        Value::Object(o) => Some(o),
                        Value::Null => None,
                        _ => return Completion::Throw(okc_panic_err(agent, "Class extends value does not have valid prototype property")),
                    };
                    (proto_parent, Some(super_ctor), ConstructorKind::Derived)
                }
                _ => return Completion::Throw(okc_panic_err(agent, "Class extends value is not a constructor")),
            }
        }
    };

    let proto_obj = { let mut a = agent.borrow_mut(); a.heap.create(ObjectHeapData::new_ordinary(proto_parent)) };

    let mut static_fields = Vec::new();
    let mut instance_fields = Vec::new();
    for field in &def.fields {
        if field.is_static {
            static_fields.push(field);
        } else {
            instance_fields.push((field.key.clone(), field.value.clone()));
        }
    }

    let constructor_function = match &def.constructor {
        Some(f) => f.clone(),
        None => Rc::new(synthesize_constructor(constructor_kind, def.name.clone())),
    };
    let constructor_obj = make_ecma_function(agent, class_ctx, constructor_function);
    strip_own_prototype(agent, constructor_obj);
    {
        let mut a = agent.borrow_mut();
        if let ExoticData::Function(FunctionData::Ecma(ecma)) = &mut a.heap[constructor_obj.0].exotic {
            ecma.home_object = Some(proto_obj);
            ecma.constructor_kind = Some(constructor_kind);
            ecma.is_class_constructor = true;
            ecma.strict = true;
            ecma.fields_to_initialize = instance_fields;
        }
        internal_methods::set_prototype_of(&mut a, constructor_obj, constructor_parent);
    }
    define_hidden(agent, constructor_obj, PropertyKey::from_static_str("name"), Value::String(js_string(agent, def.name.as_deref().unwrap_or(""))));
    define_own_prototype_slot(agent, constructor_obj, proto_obj);
    define_hidden(agent, proto_obj, PropertyKey::from_static_str("constructor"), Value::Object(constructor_obj));

    if let Some(name) = &def.name {
        okc!(class_env.initialize_binding(agent, name, Value::Object(constructor_obj)));
    }

    for method in &def.methods {
        let target = if method.is_static { constructor_obj } else { proto_obj };
        let key = okc!(property_key_from_expr(agent, class_ctx, &method.key).await);
        let func_obj = make_ecma_function(agent, class_ctx, method.function.clone());
        strip_own_prototype(agent, func_obj);
        set_home_object(agent, func_obj, target);
        let name = property_key_display_for_name(agent, &key);
        let prefix = match method.kind {
            ast::MethodKind::Get => Some("get"),
            ast::MethodKind::Set => Some("set"),
            ast::MethodKind::Method => None,
        };
        set_function_name(agent, func_obj, &name, prefix);
        match method.kind {
            ast::MethodKind::Method => define_hidden(agent, target, key, Value::Object(func_obj)),
            ast::MethodKind::Get => define_accessor(agent, target, key, Some(func_obj), None, false),
            ast::MethodKind::Set => define_accessor(agent, target, key, None, Some(func_obj), false),
        }
    }

    for field in static_fields {
        let field_env = new_declarative_environment(agent, Some(class_ctx.lexical));
        let field_ctx = class_ctx.with_lexical(field_env);
        let key = okc!(property_key_from_expr(agent, field_ctx, &field.key).await);
        let value = match &field.value {
            Some(expr) => val!(Box::pin(eval_expression(agent, field_ctx, expr)).await),
            None => Value::Undefined,
        };
        okc!(create_data_property_or_throw_key(agent, constructor_obj, key, value));
    }

    Completion::Normal(Value::Object(constructor_obj))
}

fn is_constructor_object(agent: &RefCell<Agent>, object: Object) -> bool {
    crate::ecmascript::abstract_operations::testing_and_comparison::is_constructor(&agent.borrow(), Value::Object(object))
}

/// A derived class with no explicit constructor gets the default
/// `constructor(...args) { super(...args); }` ([15.7.14 step 10.a]); a base
/// class gets the implicit no-op `constructor() {}`. Built by hand since
/// there's no source text to parse here — `ast::Function.params` has no
/// top-level rest-parameter representation, so the derived case forwards
/// through the synthesized `arguments` array instead of a real `...args`
/// rest parameter (see `bind_arguments_object`).
fn synthesize_constructor(kind: ConstructorKind, name: Option<String>) -> ast::Function {
    let body = match kind {
        ConstructorKind::Derived => vec![ast::Statement::Expression(ast::Expression::SuperCall {
            arguments: vec![ast::Argument::Spread(ast::Expression::Identifier("arguments".to_string()))],
        })],
        ConstructorKind::Base => Vec::new(),
    };
    ast::Function {
        name,
        params: Vec::new(),
        body: ast::FunctionBody::Block(body),
        is_generator: false,
        is_async: false,
        is_arrow: false,
        strict: true,
        source_text: Rc::from(""),
    }
}

// ======================================================================
// evaluate_script — top-level entry point
// ======================================================================

/// ### [16.1.6 ScriptEvaluation ( scriptRecord )](https://tc39.es/ecma262/#sec-runtime-semantics-scriptevaluation)
pub async fn evaluate_script(agent: &RefCell<Agent>, realm: crate::ecmascript::execution::realm::RealmIdentifier, program: &ast::Program) -> JsResult<Value> {
    let global_env = { agent.borrow().heap[realm].global_env() };
    let ctx = Ctx {
        lexical: global_env,
        variable: global_env,
        private: None,
        strict: program.strict,
        suspension: None,
    };
    crate::ecmascript::syntax_directed_operations::declaration_instantiation::global_declaration_instantiation(agent, ctx, &program.body).await?;
    let completion = eval_statement_list(agent, ctx, &program.body).await;
    match completion {
        Completion::Normal(v) => Ok(v),
        Completion::Throw(e) => Err(e),
        _ => Ok(Value::Undefined),
    }
}
