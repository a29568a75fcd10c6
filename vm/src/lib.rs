// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A specification-faithful tree-walking ECMAScript evaluation runtime.
//!
//! [`ast`] is this crate's own owned syntax tree; [`frontend`] is the only
//! module that knows about `oxc_parser`/`oxc_ast`, and lowers a parsed
//! script into one. [`ecmascript`] implements ECMA-262 over that tree:
//! the type system and execution-context machinery in `execution`/`types`,
//! the abstract operations in `abstract_operations`, and the tree walk
//! itself in `syntax_directed_operations`. [`builtins`] installs the
//! global object's intrinsics. [`engine`] is the restartable-sequence
//! machinery generators and async functions suspend through. [`run_script`]
//! wires all of this together into the one entry point a host needs.

pub mod ast;
pub mod builtins;
pub mod ecmascript;
pub mod engine;
pub mod frontend;
pub mod heap;

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};

pub use ecmascript::execution::agent::{
    create_realm, run_in_realm, run_jobs, Agent, ConsoleHost, ConsoleStream, JsError, Options, StdioConsoleHost,
};
pub use ecmascript::execution::realm::RealmIdentifier;
pub use ecmascript::types::language::value::Value;

/// Parses and runs `source_text` as a classic script in a fresh realm of a
/// fresh agent, draining the job queue (promise reactions) afterwards, and
/// returns the completion value of the script's last statement.
///
/// This is the host-independent entry point both the CLI and the test
/// suite build on; a host that needs to run more than one script in the
/// same realm (a REPL) should call [`Agent::new`]/[`create_realm`] once and
/// [`evaluate`] per input instead.
pub fn run_script(source_text: &str, options: Options) -> Result<Value, ScriptError> {
    let agent = RefCell::new(Agent::new(options));
    let realm = create_realm(&agent);
    let value = evaluate(&agent, realm, source_text)?;
    run_in_realm(&agent, realm, || run_jobs(&agent)).map_err(|e| ScriptError::Js(stringify_error(&agent, e)))?;
    Ok(value)
}

/// Like [`run_script`], but with a caller-supplied [`ConsoleHost`] instead of
/// the default stdout/stderr one — how integration tests assert on
/// `console.log` output without capturing the process's real stdout.
pub fn run_script_with_console_host(source_text: &str, options: Options, console_host: Box<dyn ConsoleHost>) -> Result<Value, ScriptError> {
    let agent = RefCell::new(Agent::with_console_host(options, console_host));
    let realm = create_realm(&agent);
    let value = evaluate(&agent, realm, source_text)?;
    run_in_realm(&agent, realm, || run_jobs(&agent)).map_err(|e| ScriptError::Js(stringify_error(&agent, e)))?;
    Ok(value)
}

/// Parses and evaluates `source_text` in `realm`, without draining the job
/// queue — callers that need to interleave several scripts in one realm
/// (or control when microtasks run) call [`run_jobs`] themselves.
pub fn evaluate(agent: &RefCell<Agent>, realm: RealmIdentifier, source_text: &str) -> Result<Value, ScriptError> {
    let program = frontend::parse_script(source_text).map_err(|e| ScriptError::Parse(e.to_string()))?;
    if agent.borrow().options.print_internals {
        tracing::debug!(bytes = source_text.len(), "evaluating script");
    }
    run_in_realm(agent, realm, || {
        block_on(ecmascript::syntax_directed_operations::evaluation::evaluate_script(agent, realm, &program))
    })
    .map_err(|e| ScriptError::Js(stringify_error(agent, e)))
}

fn stringify_error(agent: &RefCell<Agent>, error: JsError) -> String {
    let js_string = error.to_string(agent);
    js_string.as_str(&agent.borrow().heap).to_string()
}

/// Top-level script evaluation can itself never suspend — a script body has
/// no `yield`/`await` of its own, only calls into generator/async functions
/// that run to a `Value`/`Promise` before returning control here — so this
/// polls exactly once and asserts readiness, the same contract
/// `engine::suspension::run_to_completion` gives non-generator function
/// bodies.
fn block_on<F: Future>(fut: F) -> F::Output {
    let mut boxed = Box::pin(fut);
    let mut cx = Context::from_waker(Waker::noop());
    match boxed.as_mut().poll(&mut cx) {
        Poll::Ready(value) => value,
        Poll::Pending => unreachable!("top-level script evaluation suspended"),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("{0}")]
    Parse(String),
    #[error("Uncaught {0}")]
    Js(String),
}
