// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.3.2 CreateIntrinsics ( realmRec )](https://tc39.es/ecma262/#sec-createintrinsics)
//!
//! A small plugin registry: each [`Plugin`] declares an `id` and the ids of
//! the plugins it `depends_on`, [`topological_order`] computes a load order
//! consistent with that graph (Kahn's algorithm), and [`install`] runs each
//! plugin's hook in that order. Every builtin family (`Function.prototype`,
//! `Error` and its native subtypes, `Array`, `Promise`, the generator and
//! async-generator machinery, the global object's bindings) is one plugin;
//! a plugin's hook fetches whatever intrinsics it depends on straight out of
//! the realm (guaranteed present because its dependencies already ran) and
//! fills in the ones it owns.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use crate::builtins::ordinary::{create_builtin_function, define_builtin_method};
use crate::ecmascript::abstract_operations::operations_on_objects::create_data_property_or_throw;
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::execution::realm::RealmIdentifier;
use crate::ecmascript::types::language::object::{Object, ObjectHeapData};
use crate::ecmascript::types::language::value::Value;
use crate::heap::CreateHeapData;

/// ### [27.1.2 The %IteratorPrototype% Object](https://tc39.es/ecma262/#sec-%iteratorprototype%-object)
fn install_iterator_prototype(agent: &RefCell<Agent>, object_prototype: Object) -> JsResult<Object> {
    let iterator_prototype = {
        let mut a = agent.borrow_mut();
        a.heap.create(ObjectHeapData::new_ordinary(Some(object_prototype)))
    };
    let self_return = create_builtin_function(agent, iterator_self, None, "[Symbol.iterator]", 0, None);
    create_data_property_or_throw(agent, iterator_prototype, "Symbol(Symbol.iterator)", Value::Object(self_return))?;
    Ok(iterator_prototype)
}

fn iterator_self(_agent: &RefCell<Agent>, this: Value, _args: &[Value]) -> JsResult<Value> {
    Ok(this)
}

fn object_prototype_of(agent: &RefCell<Agent>, realm: RealmIdentifier) -> Object {
    agent.borrow().heap[realm].intrinsics().object_prototype
}

fn function_prototype_of(agent: &RefCell<Agent>, realm: RealmIdentifier) -> Object {
    agent
        .borrow()
        .heap[realm]
        .intrinsics()
        .function_prototype
        .expect("function_prototype plugin is a declared dependency")
}

fn iterator_prototype_of(agent: &RefCell<Agent>, realm: RealmIdentifier) -> Object {
    agent
        .borrow()
        .heap[realm]
        .intrinsics()
        .iterator_prototype
        .expect("iterator_prototype plugin is a declared dependency")
}

fn plugin_function_prototype(agent: &RefCell<Agent>, realm: RealmIdentifier) -> JsResult<()> {
    let object_prototype = object_prototype_of(agent, realm);
    let function_prototype = {
        let mut a = agent.borrow_mut();
        a.heap.create(ObjectHeapData::new_ordinary(Some(object_prototype)))
    };
    {
        let mut a = agent.borrow_mut();
        a.heap[realm].intrinsics_mut().function_prototype = Some(function_prototype);
    }
    crate::builtins::function_objects::install(agent, function_prototype)
}

fn plugin_iterator_prototype(agent: &RefCell<Agent>, realm: RealmIdentifier) -> JsResult<()> {
    let object_prototype = object_prototype_of(agent, realm);
    let iterator_prototype = install_iterator_prototype(agent, object_prototype)?;
    let mut a = agent.borrow_mut();
    a.heap[realm].intrinsics_mut().iterator_prototype = Some(iterator_prototype);
    Ok(())
}

fn plugin_object_global(agent: &RefCell<Agent>, realm: RealmIdentifier) -> JsResult<()> {
    let function_prototype = function_prototype_of(agent, realm);
    crate::builtins::object_global::install(agent, Some(function_prototype))
}

fn plugin_error(agent: &RefCell<Agent>, realm: RealmIdentifier) -> JsResult<()> {
    let object_prototype = object_prototype_of(agent, realm);
    let function_prototype = function_prototype_of(agent, realm);
    crate::builtins::error::install(agent, object_prototype, Some(function_prototype))
}

fn plugin_array(agent: &RefCell<Agent>, realm: RealmIdentifier) -> JsResult<()> {
    let object_prototype = object_prototype_of(agent, realm);
    let function_prototype = function_prototype_of(agent, realm);
    let array_prototype = {
        let mut a = agent.borrow_mut();
        crate::ecmascript::types::language::object::internal_methods::array_create(&mut a, 0, Some(object_prototype))
    };
    {
        let mut a = agent.borrow_mut();
        a.heap[realm].intrinsics_mut().array_prototype = Some(array_prototype);
    }
    crate::builtins::array::install(agent, array_prototype, Some(function_prototype))?;
    let array_constructor = create_builtin_function(
        agent,
        crate::builtins::array::constructor,
        Some(crate::builtins::array::constructor),
        "Array",
        1,
        Some(function_prototype),
    );
    create_data_property_or_throw(agent, array_constructor, "prototype", Value::Object(array_prototype))?;
    let mut a = agent.borrow_mut();
    a.heap[realm].intrinsics_mut().array_constructor = Some(array_constructor);
    Ok(())
}

fn plugin_promise(agent: &RefCell<Agent>, realm: RealmIdentifier) -> JsResult<()> {
    let object_prototype = object_prototype_of(agent, realm);
    let function_prototype = function_prototype_of(agent, realm);
    crate::builtins::promise::abstract_operations::install(agent, object_prototype, Some(function_prototype))
}

fn plugin_generator(agent: &RefCell<Agent>, realm: RealmIdentifier) -> JsResult<()> {
    let iterator_prototype = iterator_prototype_of(agent, realm);
    let function_prototype = function_prototype_of(agent, realm);
    let generator_prototype = crate::builtins::control_abstraction::generator::install(agent, iterator_prototype, Some(function_prototype))?;
    let mut a = agent.borrow_mut();
    a.heap[realm].intrinsics_mut().generator_prototype = Some(generator_prototype);
    Ok(())
}

fn plugin_async_generator(agent: &RefCell<Agent>, realm: RealmIdentifier) -> JsResult<()> {
    let object_prototype = object_prototype_of(agent, realm);
    let function_prototype = function_prototype_of(agent, realm);
    let async_generator_prototype =
        crate::builtins::control_abstraction::async_generator::install(agent, object_prototype, Some(function_prototype))?;
    let mut a = agent.borrow_mut();
    a.heap[realm].intrinsics_mut().async_generator_prototype = Some(async_generator_prototype);
    Ok(())
}

fn plugin_globals(agent: &RefCell<Agent>, realm: RealmIdentifier) -> JsResult<()> {
    let global_object = agent.borrow().heap[realm].global_object();
    let intrinsics_snapshot = {
        let a = agent.borrow();
        let i = a.heap[realm].intrinsics();
        (
            i.error_constructor,
            i.type_error_constructor,
            i.range_error_constructor,
            i.reference_error_constructor,
            i.syntax_error_constructor,
            i.array_constructor,
            i.promise_constructor,
        )
    };
    let (error_ctor, type_error_ctor, range_error_ctor, reference_error_ctor, syntax_error_ctor, array_ctor, promise_ctor) =
        intrinsics_snapshot;
    for (name, ctor) in [
        ("Error", error_ctor),
        ("TypeError", type_error_ctor),
        ("RangeError", range_error_ctor),
        ("ReferenceError", reference_error_ctor),
        ("SyntaxError", syntax_error_ctor),
        ("Array", array_ctor),
        ("Promise", promise_ctor),
    ] {
        if let Some(ctor) = ctor {
            create_data_property_or_throw(agent, global_object, name, Value::Object(ctor))?;
        }
    }
    create_data_property_or_throw(agent, global_object, "globalThis", Value::Object(global_object))?;
    create_data_property_or_throw(agent, global_object, "undefined", Value::Undefined)?;
    create_data_property_or_throw(agent, global_object, "NaN", Value::from(f64::NAN))?;
    create_data_property_or_throw(agent, global_object, "Infinity", Value::from(f64::INFINITY))?;
    Ok(())
}

/// The host-provided `console` object, kept as its own plugin since it has
/// nothing to do with ECMA-262 intrinsics and only needs `Function.prototype`
/// to build its methods.
fn plugin_console(agent: &RefCell<Agent>, realm: RealmIdentifier) -> JsResult<()> {
    let object_prototype = object_prototype_of(agent, realm);
    let function_prototype = function_prototype_of(agent, realm);
    let global_object = agent.borrow().heap[realm].global_object();
    let console = {
        let mut a = agent.borrow_mut();
        a.heap.create(ObjectHeapData::new_ordinary(Some(object_prototype)))
    };
    define_builtin_method(agent, console, "log", 0, crate::builtins::console::console_log, Some(function_prototype))?;
    define_builtin_method(agent, console, "info", 0, crate::builtins::console::console_info, Some(function_prototype))?;
    define_builtin_method(agent, console, "warn", 0, crate::builtins::console::console_warn, Some(function_prototype))?;
    define_builtin_method(agent, console, "error", 0, crate::builtins::console::console_error, Some(function_prototype))?;
    create_data_property_or_throw(agent, global_object, "console", Value::Object(console))
}

/// One entry in the plugin DAG: an id other plugins can name in
/// `depends_on`, and the hook [`topological_order`] schedules once every
/// dependency it names has already run.
struct Plugin {
    id: &'static str,
    depends_on: &'static [&'static str],
    install: fn(&RefCell<Agent>, RealmIdentifier) -> JsResult<()>,
}

#[derive(Debug, thiserror::Error)]
pub enum PluginOrderError {
    #[error("plugin {plugin:?} depends on unknown plugin {depends_on:?}")]
    UnresolvedDependency { plugin: &'static str, depends_on: &'static str },
    #[error("plugin dependency graph has a cycle reaching {0:?}")]
    Cycle(&'static str),
}

/// This crate's realm always loads the same fixed plugin set (no
/// host-supplied plugin list), so the registry is a `const` rather than
/// something `install` builds at runtime.
const PLUGINS: &[Plugin] = &[
    Plugin { id: "function_prototype", depends_on: &[], install: plugin_function_prototype },
    Plugin { id: "iterator_prototype", depends_on: &[], install: plugin_iterator_prototype },
    Plugin { id: "object_global", depends_on: &["function_prototype"], install: plugin_object_global },
    Plugin { id: "error", depends_on: &["function_prototype"], install: plugin_error },
    Plugin { id: "array", depends_on: &["function_prototype"], install: plugin_array },
    Plugin { id: "promise", depends_on: &["function_prototype"], install: plugin_promise },
    Plugin { id: "generator", depends_on: &["iterator_prototype", "function_prototype"], install: plugin_generator },
    Plugin { id: "async_generator", depends_on: &["function_prototype"], install: plugin_async_generator },
    Plugin { id: "console", depends_on: &["function_prototype"], install: plugin_console },
    Plugin {
        id: "globals",
        depends_on: &["error", "array", "promise", "console"],
        install: plugin_globals,
    },
];

/// Kahn's algorithm over `plugins`' `depends_on` edges. Returns a load order
/// where every plugin appears after everything it depends on, or names the
/// first unresolved dependency / the id a remaining cycle is stuck on.
fn topological_order(plugins: &[Plugin]) -> Result<Vec<&Plugin>, PluginOrderError> {
    let index_of: HashMap<&str, usize> = plugins.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
    for plugin in plugins {
        for dep in plugin.depends_on {
            if !index_of.contains_key(dep) {
                return Err(PluginOrderError::UnresolvedDependency { plugin: plugin.id, depends_on: dep });
            }
        }
    }

    let mut in_degree: Vec<usize> = plugins.iter().map(|p| p.depends_on.len()).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); plugins.len()];
    for (i, plugin) in plugins.iter().enumerate() {
        for dep in plugin.depends_on {
            dependents[index_of[dep]].push(i);
        }
    }

    let mut queue: VecDeque<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &degree)| degree == 0)
        .map(|(i, _)| i)
        .collect();
    let mut order = Vec::with_capacity(plugins.len());
    while let Some(i) = queue.pop_front() {
        order.push(&plugins[i]);
        for &dependent in &dependents[i] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                queue.push_back(dependent);
            }
        }
    }

    if order.len() != plugins.len() {
        let stuck = plugins
            .iter()
            .enumerate()
            .find(|&(i, _)| in_degree[i] > 0)
            .map(|(_, p)| p.id)
            .expect("fewer scheduled plugins than total means at least one is stuck");
        return Err(PluginOrderError::Cycle(stuck));
    }
    Ok(order)
}

/// Computes the plugin load order and runs each plugin's hook in turn.
/// Called once by `agent::create_realm`, with its execution context already
/// pushed.
pub fn install(agent: &RefCell<Agent>, realm: RealmIdentifier) -> JsResult<()> {
    let order = topological_order(PLUGINS).expect("the built-in plugin registry is a fixed, acyclic, fully-resolved graph");
    for plugin in order {
        (plugin.install)(agent, realm)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_plugin_registry_has_a_valid_topological_order() {
        let order = topological_order(PLUGINS).expect("registry should resolve");
        assert_eq!(order.len(), PLUGINS.len());
        let mut scheduled = std::collections::HashSet::new();
        for plugin in order {
            for dep in plugin.depends_on {
                assert!(scheduled.contains(dep), "{} scheduled before its dependency {dep}", plugin.id);
            }
            scheduled.insert(plugin.id);
        }
    }

    #[test]
    fn unresolved_dependency_names_the_missing_id() {
        let plugins = [Plugin { id: "a", depends_on: &["missing"], install: plugin_noop }];
        let err = topological_order(&plugins).unwrap_err();
        match err {
            PluginOrderError::UnresolvedDependency { plugin, depends_on } => {
                assert_eq!(plugin, "a");
                assert_eq!(depends_on, "missing");
            }
            other => panic!("expected UnresolvedDependency, got {other:?}"),
        }
    }

    #[test]
    fn cycle_is_rejected() {
        let plugins = [
            Plugin { id: "a", depends_on: &["b"], install: plugin_noop },
            Plugin { id: "b", depends_on: &["a"], install: plugin_noop },
        ];
        let err = topological_order(&plugins).unwrap_err();
        assert!(matches!(err, PluginOrderError::Cycle(_)));
    }

    fn plugin_noop(_agent: &RefCell<Agent>, _realm: RealmIdentifier) -> JsResult<()> {
        Ok(())
    }
}
