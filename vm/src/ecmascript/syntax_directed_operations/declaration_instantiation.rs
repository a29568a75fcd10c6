// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9 Declaration Instantiation](https://tc39.es/ecma262/#sec-executable-code-and-execution-contexts)
//!
//! [`global_declaration_instantiation`] (16.1.7), [`function_declaration_instantiation`]
//! (10.2.11), and [`instantiate_block_scope`] (13.2.14) all hoist the same
//! two kinds of thing — `var`/top-level-function bindings into the running
//! variable environment, `let`/`const`/`class` bindings into the lexical
//! environment as temporal-dead-zone placeholders — so they share
//! [`instantiate_var_and_function_declarations`]/[`instantiate_lexical_declarations`]
//! rather than each re-walking the statement list.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::ast;
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::execution::environments::Environment;
use crate::ecmascript::syntax_directed_operations::evaluation::make_ecma_function;
use crate::ecmascript::syntax_directed_operations::Ctx;
use crate::ecmascript::types::language::value::Value;

/// ### [16.1.7 GlobalDeclarationInstantiation ( script, env )](https://tc39.es/ecma262/#sec-globaldeclarationinstantiation)
pub async fn global_declaration_instantiation(agent: &RefCell<Agent>, ctx: Ctx, body: &[ast::Statement]) -> JsResult<()> {
    instantiate_var_and_function_declarations(agent, ctx, ctx.variable, body, &[]).await?;
    instantiate_lexical_declarations(agent, ctx.lexical, body)
}

/// ### [10.2.11 FunctionDeclarationInstantiation ( func, argumentsList )](https://tc39.es/ecma262/#sec-functiondeclarationinstantiation)
///
/// Parameter binding itself (`args[i]` into each parameter pattern) already
/// ran in `call_ecma_function` before this is called — this only covers the
/// `var`/function/lexical hoisting half of the algorithm.
pub async fn function_declaration_instantiation(
    agent: &RefCell<Agent>,
    ctx: Ctx,
    body: &[ast::Statement],
    param_names: &[String],
) -> JsResult<()> {
    instantiate_var_and_function_declarations(agent, ctx, ctx.variable, body, param_names).await?;
    instantiate_lexical_declarations(agent, ctx.lexical, body)
}

/// ### [13.2.14 Runtime Semantics: BlockDeclarationInstantiation](https://tc39.es/ecma262/#sec-blockdeclarationinstantiation)
pub fn instantiate_block_scope(agent: &RefCell<Agent>, ctx: Ctx, body: &[ast::Statement]) -> JsResult<()> {
    instantiate_lexical_declarations(agent, ctx.lexical, body)?;
    for stmt in body {
        if let ast::Statement::FunctionDeclaration(f) = stmt {
            if let Some(name) = &f.name {
                let func_object = make_ecma_function(agent, ctx, f.clone());
                if !ctx.lexical.has_binding(agent, name)? {
                    ctx.lexical.create_mutable_binding(agent, name, false)?;
                }
                ctx.lexical.initialize_binding(agent, name, Value::Object(func_object))?;
            }
        }
    }
    Ok(())
}

/// The parameter names a function declares at its top level, used to avoid
/// re-hoisting a `var` that shadows a parameter (the parameter's binding
/// already exists and is already initialized from the call's arguments).
pub fn collect_param_names(params: &[ast::BindingPattern]) -> Vec<String> {
    let mut out = Vec::new();
    for param in params {
        collect_pattern_names(param, &mut out);
    }
    out
}

async fn instantiate_var_and_function_declarations(
    agent: &RefCell<Agent>,
    ctx: Ctx,
    env: Environment,
    body: &[ast::Statement],
    param_names: &[String],
) -> JsResult<()> {
    let mut var_names = Vec::new();
    collect_var_names(body, &mut var_names);
    var_names.sort();
    var_names.dedup();

    let functions = top_level_function_declarations(body);
    let function_names: HashSet<&str> = functions.iter().filter_map(|f| f.name.as_deref()).collect();

    for name in &var_names {
        if function_names.contains(name.as_str()) || param_names.iter().any(|p| p == name) {
            continue;
        }
        if !env.has_binding(agent, name)? {
            env.create_mutable_binding(agent, name, false)?;
            env.initialize_binding(agent, name, Value::Undefined)?;
        }
    }

    for function in functions {
        let name = function.name.clone().expect("top-level function declarations are always named");
        let func_object = make_ecma_function(agent, ctx, function);
        if !env.has_binding(agent, &name)? {
            env.create_mutable_binding(agent, &name, false)?;
        }
        env.initialize_binding(agent, &name, Value::Object(func_object))?;
    }
    Ok(())
}

fn instantiate_lexical_declarations(agent: &RefCell<Agent>, env: Environment, body: &[ast::Statement]) -> JsResult<()> {
    for stmt in body {
        match stmt {
            ast::Statement::VariableDeclaration(decl) if decl.kind != ast::VarKind::Var => {
                for (pattern, _) in &decl.declarations {
                    let mut names = Vec::new();
                    collect_pattern_names(pattern, &mut names);
                    for name in names {
                        if decl.kind == ast::VarKind::Const {
                            env.create_immutable_binding(agent, &name, true)?;
                        } else {
                            env.create_mutable_binding(agent, &name, false)?;
                        }
                    }
                }
            }
            ast::Statement::ClassDeclaration(class_def) => {
                if let Some(name) = &class_def.name {
                    env.create_mutable_binding(agent, name, false)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// [VarDeclaredNames](https://tc39.es/ecma262/#sec-static-semantics-vardeclarednames):
/// recurses into nested control-flow bodies (blocks, loops, try/switch) but
/// not into nested function/class bodies, which hoist independently.
fn collect_var_names(stmts: &[ast::Statement], out: &mut Vec<String>) {
    for stmt in stmts {
        collect_var_names_one(stmt, out);
    }
}

fn collect_var_names_one(stmt: &ast::Statement, out: &mut Vec<String>) {
    match stmt {
        ast::Statement::VariableDeclaration(decl) if decl.kind == ast::VarKind::Var => {
            for (pattern, _) in &decl.declarations {
                collect_pattern_names(pattern, out);
            }
        }
        ast::Statement::Block(body) => collect_var_names(body, out),
        ast::Statement::If { consequent, alternate, .. } => {
            collect_var_names_one(consequent, out);
            if let Some(alt) = alternate {
                collect_var_names_one(alt, out);
            }
        }
        ast::Statement::While { body, .. } | ast::Statement::DoWhile { body, .. } => collect_var_names_one(body, out),
        ast::Statement::For { init, body, .. } => {
            if let Some(init) = init {
                if let ast::ForInit::Declaration(decl) = init.as_ref() {
                    if decl.kind == ast::VarKind::Var {
                        for (pattern, _) in &decl.declarations {
                            collect_pattern_names(pattern, out);
                        }
                    }
                }
            }
            collect_var_names_one(body, out);
        }
        ast::Statement::ForIn { left, body, .. } | ast::Statement::ForOf { left, body, .. } => {
            if let ast::ForTarget::Declaration(ast::VarKind::Var, pattern) = left {
                collect_pattern_names(pattern, out);
            }
            collect_var_names_one(body, out);
        }
        ast::Statement::Try { block, handler, finalizer } => {
            collect_var_names(block, out);
            if let Some(h) = handler {
                collect_var_names(&h.body, out);
            }
            if let Some(f) = finalizer {
                collect_var_names(f, out);
            }
        }
        ast::Statement::Switch { cases, .. } => {
            for case in cases {
                collect_var_names(&case.body, out);
            }
        }
        ast::Statement::Labeled { body, .. } => collect_var_names_one(body, out),
        _ => {}
    }
}

pub(crate) fn collect_pattern_names(pattern: &ast::BindingPattern, out: &mut Vec<String>) {
    match pattern {
        ast::BindingPattern::Identifier(name) => out.push(name.clone()),
        ast::BindingPattern::Array(elements) => {
            for element in elements.iter().flatten() {
                collect_pattern_names(&element.pattern, out);
            }
        }
        ast::BindingPattern::Object(props, rest) => {
            for prop in props {
                collect_pattern_names(&prop.value, out);
            }
            if let Some(rest) = rest {
                out.push(rest.clone());
            }
        }
    }
}

/// The top-level function declarations directly in `stmts` (not nested in a
/// block) — these are var-scoped and materialized eagerly, last one with a
/// given name winning, per [16.1.7 step 10](https://tc39.es/ecma262/#sec-globaldeclarationinstantiation).
fn top_level_function_declarations(stmts: &[ast::Statement]) -> Vec<Rc<ast::Function>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for stmt in stmts.iter().rev() {
        if let ast::Statement::FunctionDeclaration(f) = stmt {
            if let Some(name) = &f.name {
                if seen.insert(name.clone()) {
                    out.push(f.clone());
                }
            }
        }
    }
    out.reverse();
    out
}
