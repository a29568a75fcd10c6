// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [8.6 Runtime Semantics: BindingInitialization](https://tc39.es/ecma262/#sec-destructuring-binding-patterns)
//!
//! One entry point, [`binding_initialization`], covers `let`/`const`/`var`
//! declarators, function parameters, catch clause parameters, and
//! `for`-`in`/`for`-`of` declaration targets — every place the grammar
//! allows a `BindingPattern` rather than a bare identifier. `environment`
//! mirrors the spec parameter of the same name: `Some(env)` initializes a
//! binding already created in `env` (the `let`/`const`/parameter/catch
//! case); `None` resolves the name as an ordinary reference in `ctx` and
//! assigns through `PutValue` instead (the `var` case, where hoisting
//! already created the binding earlier).

use std::cell::RefCell;

use crate::ast;
use crate::ecmascript::abstract_operations::operations_on_iterator_objects::{
    get_iterator, iterator_close, iterator_step, IteratorRecord,
};
use crate::ecmascript::abstract_operations::operations_on_objects::{create_data_property_or_throw_key, get_property};
use crate::ecmascript::abstract_operations::type_conversion::to_object;
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::execution::environments::{get_identifier_reference, Environment};
use crate::ecmascript::syntax_directed_operations::evaluation::{eval_expression, property_key_from_expr, put_value};
use crate::ecmascript::syntax_directed_operations::Ctx;
use crate::ecmascript::types::language::object::internal_methods;
use crate::ecmascript::types::language::object::property_key::PropertyKey;
use crate::ecmascript::types::language::object::ObjectHeapData;
use crate::ecmascript::types::language::string::JsString;
use crate::ecmascript::types::language::value::Value;
use crate::heap::CreateHeapData;

/// ### [8.6.2 Runtime Semantics: BindingInitialization](https://tc39.es/ecma262/#sec-runtime-semantics-bindinginitialization)
pub async fn binding_initialization(
    agent: &RefCell<Agent>,
    ctx: Ctx,
    pattern: &ast::BindingPattern,
    value: Value,
    environment: Option<Environment>,
) -> JsResult<()> {
    match pattern {
        ast::BindingPattern::Identifier(name) => bind_one(agent, ctx, name, value, environment),
        ast::BindingPattern::Array(elements) => array_binding_initialization(agent, ctx, elements, value, environment).await,
        ast::BindingPattern::Object(props, rest) => {
            object_binding_initialization(agent, ctx, props, rest.as_deref(), value, environment).await
        }
    }
}

fn bind_one(agent: &RefCell<Agent>, ctx: Ctx, name: &str, value: Value, environment: Option<Environment>) -> JsResult<()> {
    match environment {
        Some(env) => env.initialize_binding(agent, name, value),
        None => {
            let js_name = {
                let mut a = agent.borrow_mut();
                JsString::from_string(&mut a.heap, name.to_owned())
            };
            let reference = get_identifier_reference(agent, Some(ctx.lexical), js_name, ctx.strict)?;
            put_value(agent, &reference, value)
        }
    }
}

/// ### [7.4.6 GetV-flavoured property read used by object patterns](https://tc39.es/ecma262/#sec-getv)
///
/// This crate's `get_property` always takes an `Object` receiver; a
/// destructuring source that's a primitive (`const {length} = "ab"`) is
/// boxed first rather than threading the raw primitive through as the
/// receiver, a documented simplification (see DESIGN.md).
pub(crate) fn get_v(agent: &RefCell<Agent>, value: Value, key: &PropertyKey) -> JsResult<Value> {
    let object = to_object(agent, value)?;
    get_property(agent, object, key)
}

async fn array_binding_initialization(
    agent: &RefCell<Agent>,
    ctx: Ctx,
    elements: &[Option<ast::BindingElement>],
    value: Value,
    environment: Option<Environment>,
) -> JsResult<()> {
    let mut record: IteratorRecord = get_iterator(agent, value)?;
    for element in elements {
        let Some(element) = element else {
            // Elision: still advances the iterator, binds nothing.
            if !record.done {
                if iterator_step(agent, &record)?.is_none() {
                    record.done = true;
                }
            }
            continue;
        };
        if element.is_rest {
            let rest_object = internal_methods::array_create(&mut agent.borrow_mut(), 0, {
                let a = agent.borrow();
                a.current_realm().intrinsics().array_prototype
            });
            let mut index = 0u32;
            while !record.done {
                match iterator_step(agent, &record)? {
                    Some(next_value) => {
                        create_data_property_or_throw_key(agent, rest_object, PropertyKey::from(index_key(agent, index)), next_value)?;
                        index += 1;
                    }
                    None => record.done = true,
                }
            }
            Box::pin(binding_initialization(agent, ctx, &element.pattern, Value::Object(rest_object), environment)).await?;
            continue;
        }
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
        let next_value = apply_default(agent, ctx, next_value, element.default.as_ref()).await?;
        Box::pin(binding_initialization(agent, ctx, &element.pattern, next_value, environment)).await?;
    }
    if !record.done {
        iterator_close(agent, &record)?;
    }
    Ok(())
}

fn index_key(agent: &RefCell<Agent>, index: u32) -> JsString {
    let mut a = agent.borrow_mut();
    JsString::from_string(&mut a.heap, index.to_string())
}

async fn object_binding_initialization(
    agent: &RefCell<Agent>,
    ctx: Ctx,
    props: &[ast::ObjectBindingProp],
    rest: Option<&str>,
    value: Value,
    environment: Option<Environment>,
) -> JsResult<()> {
    // ### [13.3.3.6 RequireObjectCoercible](https://tc39.es/ecma262/#sec-requireobjectcoercible)
    if value.is_nullish() {
        return Err(agent
            .borrow_mut()
            .throw_exception_with_static_message(crate::ecmascript::execution::agent::ExceptionType::TypeError, "cannot destructure null or undefined"));
    }
    let mut seen: Vec<PropertyKey> = Vec::with_capacity(props.len());
    for prop in props {
        let key = property_key_from_expr(agent, ctx, &prop.key).await?;
        seen.push(key);
        let prop_value = get_v(agent, value, &key)?;
        let prop_value = apply_default(agent, ctx, prop_value, prop.default.as_ref()).await?;
        Box::pin(binding_initialization(agent, ctx, &prop.value, prop_value, environment)).await?;
    }
    if let Some(rest_name) = rest {
        let object_prototype = { agent.borrow().current_realm().intrinsics().object_prototype };
        let rest_object = {
            let mut a = agent.borrow_mut();
            a.heap.create(ObjectHeapData::new_ordinary(Some(object_prototype)))
        };
        let source_object = to_object(agent, value)?;
        let keys = { internal_methods::own_property_keys(&agent.borrow(), source_object) };
        for key in keys {
            if seen.contains(&key) {
                continue;
            }
            let enumerable = {
                let a = agent.borrow();
                internal_methods::get_own_property(&a, source_object, &key).map(|d| d.enumerable()).unwrap_or(false)
            };
            if !enumerable {
                continue;
            }
            let v = get_property(agent, source_object, &key)?;
            create_data_property_or_throw_key(agent, rest_object, key, v)?;
        }
        bind_one(agent, ctx, rest_name, Value::Object(rest_object), environment)?;
    }
    Ok(())
}

/// Evaluates a binding element's default initializer only if `value` is
/// `undefined`, per [14.3.3.3 KeyedBindingInitialization](https://tc39.es/ecma262/#sec-runtime-semantics-keyedbindinginitialization).
async fn apply_default(agent: &RefCell<Agent>, ctx: Ctx, value: Value, default: Option<&ast::Expression>) -> JsResult<Value> {
    if !value.is_undefined() {
        return Ok(value);
    }
    let Some(default) = default else { return Ok(value) };
    let completion = Box::pin(eval_expression(agent, ctx, default)).await;
    completion.into_value_or_throw()
}
