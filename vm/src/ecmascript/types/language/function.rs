// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Function objects. Every callable object is still an ordinary `Object`
//! wearing a [`super::object::ExoticData::Function`] payload — there is no
//! separate "Function" handle type, matching §3's "Functions add: ...".

use super::object::Object;
use super::value::Value;
use crate::ast;
use crate::ecmascript::execution::agent::JsResult;
use crate::ecmascript::execution::environments::Environment;
use crate::ecmascript::execution::realm::RealmIdentifier;
use std::cell::RefCell;
use std::rc::Rc;

use crate::ecmascript::execution::Agent;

/// ### [10.2 ECMAScript Function Objects](https://tc39.es/ecma262/#sec-ecmascript-function-objects)
#[derive(Debug, Clone)]
pub struct EcmaFunctionData {
    pub definition: Rc<ast::Function>,
    /// The environment the function closes over ([[Environment]]).
    pub environment: Environment,
    pub this_mode: ThisMode,
    pub strict: bool,
    pub home_object: Option<Object>,
    pub constructor_kind: Option<ConstructorKind>,
    pub realm: RealmIdentifier,
    pub is_class_constructor: bool,
    /// Only set for derived-class constructors awaiting `super(...)`.
    pub fields_to_initialize: Vec<(ast::PropertyKeyExpr, Option<ast::Expression>)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThisMode {
    Lexical,
    Strict,
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorKind {
    Base,
    Derived,
}

/// A native, Rust-implemented function. Every builtin is a plain Rust `fn`
/// pointer (no `dyn` boxing, no captured state) operating on `&RefCell<Agent>`
/// the same way user evaluation functions do, so builtins can call back into
/// the evaluator (`Call`, `Get`, `Construct`, ...) without a separate FFI.
pub type NativeFn =
    fn(&RefCell<Agent>, Value, &[Value]) -> JsResult<Value>;

#[derive(Debug, Clone, Copy)]
pub struct BuiltinFunctionData {
    pub name: &'static str,
    pub length: u32,
    pub behavior: NativeFn,
    /// Present for builtin constructors (`Object`, `Array`, `Error`, ...);
    /// `[[Construct]]` on a plain builtin function throws TypeError.
    pub construct_behavior: Option<NativeFn>,
}

#[derive(Debug, Clone)]
pub struct BoundFunctionData {
    pub target: Object,
    pub bound_this: Value,
    pub bound_args: Vec<Value>,
}

/// ### [27.2.1.3 Promise Resolve/Reject Functions](https://tc39.es/ecma262/#sec-promise-resolve-functions)
///
/// Unlike [`BuiltinFunctionData`], these close over a specific Promise
/// identity and shared already-resolved flag, which a plain `NativeFn`
/// pointer can't capture — its own `FunctionData` variant instead of a
/// second internal-slot bag on `BuiltinFunctionData`.
#[derive(Debug, Clone)]
pub struct PromiseResolvingFunctionData {
    pub promise: Object,
    pub is_reject: bool,
    pub already_resolved: Rc<std::cell::Cell<bool>>,
}

#[derive(Debug, Clone)]
pub enum FunctionData {
    Ecma(EcmaFunctionData),
    Builtin(BuiltinFunctionData),
    Bound(BoundFunctionData),
    PromiseResolving(PromiseResolvingFunctionData),
}

impl FunctionData {
    pub fn is_constructor(&self) -> bool {
        match self {
            FunctionData::Ecma(f) => !f.this_mode.eq(&ThisMode::Lexical) && !f.definition.is_generator && !f.definition.is_async,
            FunctionData::Builtin(f) => f.construct_behavior.is_some(),
            FunctionData::Bound(_) => true,
            FunctionData::PromiseResolving(_) => false,
        }
    }
}
