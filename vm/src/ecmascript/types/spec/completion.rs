// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.2.4 The Completion Record Specification Type](https://tc39.es/ecma262/#sec-completion-record-specification-type)

use super::reference::Reference;
use crate::ecmascript::execution::agent::JsError;
use crate::ecmascript::types::language::value::Value;

/// The result of evaluating a statement or statement list: either the
/// evaluator ran normally off the end (carrying the last produced value,
/// used by scripts and `eval`), or it was diverted by `return`/`break`/
/// `continue`/`throw`. Every statement-evaluation function in
/// `syntax_directed_operations::evaluation` returns this, and the ones for
/// statement *lists* must explicitly propagate any non-Normal variant
/// without running the remaining statements — exactly the plumbing a
/// `?`-based `Result` cannot express for break/continue/return.
#[derive(Debug, Clone)]
pub enum Completion {
    Normal(Value),
    Return(Value),
    Throw(JsError),
    Break(Option<String>),
    Continue(Option<String>),
}

impl Completion {
    pub fn normal_undefined() -> Self {
        Completion::Normal(Value::Undefined)
    }

    pub fn is_abrupt(&self) -> bool {
        !matches!(self, Completion::Normal(_))
    }

    /// Unwraps a `Normal` completion's value, converting any abrupt
    /// completion other than `Throw` into a `Throw` is never correct in
    /// general (a stray `break`/`continue`/`return` escaping its target is
    /// a bug, not a JS-observable exception), so callers that expect only
    /// Normal-or-Throw (expression evaluation) use this.
    pub fn into_value_or_throw(self) -> Result<Value, JsError> {
        match self {
            Completion::Normal(v) => Ok(v),
            Completion::Throw(e) => Err(e),
            Completion::Return(_) | Completion::Break(_) | Completion::Continue(_) => {
                unreachable!("abrupt control completion escaped expression evaluation")
            }
        }
    }
}

/// The intermediate result of evaluating an expression that might be a
/// Reference (identifier or member access) rather than a plain value, per
/// §4.3's two primary evaluator operations (`Evaluation` vs `EvaluateValue`).
#[derive(Debug, Clone)]
pub enum ValueOrReference {
    Value(Value),
    Reference(Reference),
}
