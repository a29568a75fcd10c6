// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.7 Agents](https://tc39.es/ecma262/#sec-agents)
//!
//! One `Agent` owns one heap and drives one or more Realms. Every evaluator
//! function and builtin takes `&RefCell<Agent>` rather than `&mut Agent` —
//! see `engine::suspension` and DESIGN.md's "Generator / Async Engine" entry
//! for why: a suspended generator/async-function body holds this reference
//! across an await point, and other code (the driver that resumed it, a
//! concurrently-running microtask) must be able to touch the agent too.

use ahash::AHashMap;
use std::any::Any;
use std::cell::RefCell;

use super::environments::Environment;
use super::execution_context::ExecutionContext;
use super::realm::{self, RealmIdentifier};
use crate::ecmascript::abstract_operations::type_conversion::to_string;
use crate::ecmascript::types::language::object::property_key::PropertyKey;
use crate::ecmascript::types::language::object::property_storage::PropertyStorage;
use crate::ecmascript::types::language::object::{ErrorData, ExoticData, Object, ObjectHeapData};
use crate::ecmascript::types::language::string::JsString;
use crate::ecmascript::types::spec::property_descriptor::PropertyDescriptor;
use crate::ecmascript::types::language::symbol::Symbol;
use crate::ecmascript::types::language::value::Value;
use crate::heap::{CreateHeapData, Heap};

#[derive(Debug, Default, Clone)]
pub struct Options {
    /// Print internal engine diagnostics (job queue draining, realm setup)
    /// at `tracing::debug!` instead of staying silent.
    pub print_internals: bool,
    /// Aborts evaluation with a `RangeError` once this many statements have
    /// been evaluated, the host-supplied budget a sandboxed embedder (a
    /// serverless request, a plugin host) needs to bound a script that would
    /// otherwise run forever — there is no other cancellation point in a
    /// tree-walking evaluator. `None` means unlimited.
    pub step_budget: Option<u64>,
}

/// Where `console.log`/`warn` (§6's non-standard but universally-expected
/// host object, see `builtins::console`) actually writes. A plain CLI wants
/// process stdout/stderr; a host embedding the engine (or a test asserting
/// on emitted lines) wants to redirect or capture it instead — the same
/// "host decides" boundary the spec leaves to host hooks for things like
/// the unhandled-rejection sink.
pub trait ConsoleHost: std::fmt::Debug {
    fn write_line(&self, stream: ConsoleStream, line: &str);

    /// `HostPromiseRejectionTracker`'s "reject" outcome, surfaced once a
    /// promise is still unhandled when [`run_jobs`] finishes draining the
    /// microtask queue. Default matches what a plain CLI/REPL host (and
    /// Node's default `unhandledRejection` warning) would print; a host that
    /// wants to collect rejections instead (a test harness, an embedder with
    /// its own reporting channel) overrides this.
    fn report_unhandled_rejection(&self, reason: &str) {
        self.write_line(ConsoleStream::Err, &format!("Uncaught (in promise) {reason}"));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Out,
    Err,
}

#[derive(Debug, Default)]
pub struct StdioConsoleHost;

impl ConsoleHost for StdioConsoleHost {
    fn write_line(&self, stream: ConsoleStream, line: &str) {
        match stream {
            ConsoleStream::Out => println!("{line}"),
            ConsoleStream::Err => eprintln!("{line}"),
        }
    }
}

pub type JsResult<T> = Result<T, JsError>;

/// A thrown ECMAScript value, wrapped so it can't be constructed outside
/// `throw_exception*`/`JsError::new` and accidentally bypass `5.2.3.2 Throw
/// an Exception`.
#[derive(Debug, Clone, Copy)]
pub struct JsError(Value);

impl JsError {
    pub(crate) fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(self) -> Value {
        self.0
    }

    pub fn to_string(self, agent: &RefCell<Agent>) -> JsString {
        to_string(agent, self.0).unwrap_or_else(|_| JsString::from_static_str("<error while stringifying error>"))
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ExceptionType {
    Error,
    TypeError,
    RangeError,
    ReferenceError,
    SyntaxError,
}

impl ExceptionType {
    fn name(self) -> &'static str {
        match self {
            ExceptionType::Error => "Error",
            ExceptionType::TypeError => "TypeError",
            ExceptionType::RangeError => "RangeError",
            ExceptionType::ReferenceError => "ReferenceError",
            ExceptionType::SyntaxError => "SyntaxError",
        }
    }
}

/// A microtask queued by `HostEnqueuePromiseJob` — either half of promise
/// reaction processing. The concrete job closures live in
/// `builtins::promise::abstract_operations`; this only needs to know how to
/// run one against an `Agent` once dequeued.
pub struct Job {
    pub(crate) realm: Option<RealmIdentifier>,
    pub(crate) run: Box<dyn FnOnce(&RefCell<Agent>) -> JsResult<()>>,
}

impl Job {
    pub fn new(realm: Option<RealmIdentifier>, run: impl FnOnce(&RefCell<Agent>) -> JsResult<()> + 'static) -> Self {
        Self { realm, run }
    }

    pub fn run(self, agent: &RefCell<Agent>) -> JsResult<()> {
        (self.run)(agent)
    }
}

/// ### [9.7 Agents](https://tc39.es/ecma262/#sec-agents)
#[derive(Debug)]
pub struct Agent {
    pub(crate) heap: Heap,
    pub(crate) options: Options,
    symbol_id: u64,
    global_symbol_registry: AHashMap<&'static str, Symbol>,
    pub(crate) execution_context_stack: Vec<ExecutionContext>,
    /// Promise reaction / thenable-resolution jobs queued by
    /// `HostEnqueuePromiseJob`, drained between top-level statements by
    /// `run_jobs` — this crate's host, not the spec, decides when.
    pub(crate) job_queue: std::collections::VecDeque<Job>,
    pub(crate) console_host: Box<dyn ConsoleHost>,
    /// Statements evaluated so far against `options.step_budget`.
    pub(crate) step_count: u64,
    /// Promises currently rejected with no reaction ever attached —
    /// `HostPromiseRejectionTracker`'s "reject" operation adds an entry,
    /// attaching a `.then`/`.catch` to an already-rejected promise removes
    /// it. Reported to the host once `run_jobs` finishes draining, the
    /// "operation" timing 27.2.1.9 leaves up to the host.
    pub(crate) unhandled_rejections: Vec<Object>,
}

impl Agent {
    pub fn new(options: Options) -> Self {
        Self::with_console_host(options, Box::new(StdioConsoleHost))
    }

    pub fn with_console_host(options: Options, console_host: Box<dyn ConsoleHost>) -> Self {
        Self {
            heap: Heap::new(),
            options,
            symbol_id: 0,
            global_symbol_registry: AHashMap::default(),
            execution_context_stack: Vec::new(),
            job_queue: std::collections::VecDeque::new(),
            console_host,
            step_count: 0,
            unhandled_rejections: Vec::new(),
        }
    }

    pub fn console_host(&self) -> &dyn ConsoleHost {
        self.console_host.as_ref()
    }

    pub fn new_symbol_id(&mut self) -> u64 {
        self.symbol_id += 1;
        self.symbol_id
    }

    pub fn global_symbol_registry(&mut self) -> &mut AHashMap<&'static str, Symbol> {
        &mut self.global_symbol_registry
    }

    pub fn current_realm_id(&self) -> RealmIdentifier {
        self.execution_context_stack
            .last()
            .expect("no running execution context")
            .realm
    }

    pub fn current_realm(&self) -> &super::realm::Realm {
        &self.heap[self.current_realm_id()]
    }

    pub fn current_realm_mut(&mut self) -> &mut super::realm::Realm {
        let id = self.current_realm_id();
        &mut self.heap[id]
    }

    pub fn running_execution_context(&self) -> &ExecutionContext {
        self.execution_context_stack.last().expect("no running execution context")
    }

    pub fn running_execution_context_mut(&mut self) -> &mut ExecutionContext {
        self.execution_context_stack
            .last_mut()
            .expect("no running execution context")
    }

    pub fn lexical_environment(&self) -> Environment {
        self.running_execution_context()
            .ecmascript_code
            .expect("not evaluating ECMAScript code")
            .lexical_environment
    }

    pub fn variable_environment(&self) -> Environment {
        self.running_execution_context()
            .ecmascript_code
            .expect("not evaluating ECMAScript code")
            .variable_environment
    }

    pub fn is_strict_mode(&self) -> bool {
        self.running_execution_context()
            .ecmascript_code
            .expect("not evaluating ECMAScript code")
            .is_strict_mode
    }

    pub fn set_lexical_environment(&mut self, env: Environment) {
        self.running_execution_context_mut()
            .ecmascript_code
            .as_mut()
            .expect("not evaluating ECMAScript code")
            .lexical_environment = env;
    }

    /// Panics if no active function object exists — only called where a
    /// production guarantees one (builtin bodies, ordinary-function calls).
    pub fn active_function_object(&self) -> Object {
        self.running_execution_context()
            .function
            .expect("no active function object")
    }

    pub fn get_host_data(&self) -> &dyn Any {
        &()
    }

    /// Counts one more statement against `options.step_budget`, called from
    /// `eval_statement` so every statement a script (or a function it calls,
    /// or a loop body it repeats) executes is charged against the same
    /// counter — the only place in the tree walker guaranteed to run once
    /// per unit of forward progress.
    pub(crate) fn consume_step(&mut self) -> JsResult<()> {
        let Some(budget) = self.options.step_budget else {
            return Ok(());
        };
        if self.step_count >= budget {
            if self.options.print_internals {
                tracing::warn!(budget, "step budget exhausted, aborting evaluation");
            }
            return Err(self.throw_exception_with_static_message(ExceptionType::RangeError, "Evaluation step budget exceeded"));
        }
        self.step_count += 1;
        Ok(())
    }

    /// Records `promise` as unhandled (`HostPromiseRejectionTracker`'s
    /// "reject" operation). Called only from `reject_promise` the first time
    /// a promise settles as rejected with no reaction already attached.
    pub(crate) fn mark_rejection_unhandled(&mut self, promise: Object) {
        self.unhandled_rejections.push(promise);
    }

    /// Drops `promise` from the unhandled set (`HostPromiseRejectionTracker`'s
    /// "handle" operation) — a `.then`/`.catch` was attached after the fact.
    pub(crate) fn mark_rejection_handled(&mut self, promise: Object) {
        self.unhandled_rejections.retain(|&p| p != promise);
    }

    /// ### [5.2.3.2 Throw an Exception](https://tc39.es/ecma262/#sec-throw-an-exception)
    pub fn throw_exception_with_static_message(&mut self, kind: ExceptionType, message: &'static str) -> JsError {
        self.throw_exception(kind, message.to_owned())
    }

    pub fn throw_exception(&mut self, kind: ExceptionType, message: std::string::String) -> JsError {
        let message_string = self.heap.create(message);
        // `name`/`message` are set as plain own properties rather than
        // routed through a per-kind error prototype — this crate never
        // builds one at throw time (see `builtins::error` for the
        // constructor-based path, which does wire up a real prototype
        // chain), but host-visible code (`catch (e) { e.name }`) still
        // needs to read them directly off the thrown object.
        let mut properties = PropertyStorage::default();
        properties.insert(
            PropertyKey::from_static_str("name"),
            PropertyDescriptor::data(Value::String(JsString::from_static_str(kind.name())), true, false, true),
        );
        properties.insert(
            PropertyKey::from_static_str("message"),
            PropertyDescriptor::data(Value::String(message_string), true, false, true),
        );
        let object = self.heap.create(ObjectHeapData {
            prototype: None,
            extensible: true,
            properties,
            exotic: ExoticData::Error(ErrorData {
                kind: kind.name(),
                message: Some(message_string),
            }),
        });
        JsError::new(Value::Object(object))
    }
}

/// Creates a fresh Realm with a minimal global object and wires up a root
/// execution context for it, the scope this crate needs `InitializeHostDefinedRealm`
/// to cover (no multi-realm hosting, so `HostDefined` data / `CreateGlobalObject`
/// hooks from the full algorithm are not modeled).
pub fn create_realm(agent: &RefCell<Agent>) -> RealmIdentifier {
    if agent.borrow().options.print_internals {
        tracing::debug!("creating realm");
    }
    let realm_id = realm::create_realm(agent);
    {
        let mut a = agent.borrow_mut();
        a.execution_context_stack.push(ExecutionContext {
            ecmascript_code: None,
            function: None,
            realm: realm_id,
            script_or_module: false,
        });
    }
    let object_prototype = agent.borrow().current_realm().intrinsics().object_prototype;
    let global_object = {
        let mut a = agent.borrow_mut();
        a.heap.create(ObjectHeapData::new_ordinary(Some(object_prototype)))
    };
    realm::set_realm_global_object(agent, realm_id, global_object, global_object);
    crate::builtins::prelude::install(agent, realm_id).expect("builtin installation is infallible");
    agent.borrow_mut().execution_context_stack.pop();
    if agent.borrow().options.print_internals {
        tracing::debug!(?realm_id, "realm ready");
    }
    realm_id
}

pub fn run_in_realm<F, R>(agent: &RefCell<Agent>, realm: RealmIdentifier, func: F) -> R
where
    F: FnOnce() -> R,
{
    agent.borrow_mut().execution_context_stack.push(ExecutionContext {
        ecmascript_code: None,
        function: None,
        realm,
        script_or_module: false,
    });
    let result = func();
    agent.borrow_mut().execution_context_stack.pop();
    result
}

/// Drains `agent.job_queue` until empty, then reports any promise still
/// rejected with no handler attached. The host (CLI, tests) calls this after
/// running a script's top-level code, matching `19.4 Jobs`'s "Once all
/// ECMAScript code is run, all pending jobs are run" invariant for this
/// single-agent, no-event-loop host — and 27.2.1.9's "at some unspecified
/// time after a promise becomes rejected" as "once there's nothing left to
/// run that could still attach a handler".
pub fn run_jobs(agent: &RefCell<Agent>) -> JsResult<()> {
    let verbose = agent.borrow().options.print_internals;
    if verbose {
        tracing::debug!(pending = agent.borrow().job_queue.len(), "draining job queue");
    }
    loop {
        let job = { agent.borrow_mut().job_queue.pop_front() };
        let Some(job) = job else {
            break;
        };
        let pushed = if let Some(realm) = job.realm {
            let current = agent.borrow().current_realm_id_if_any();
            if current != Some(realm) {
                agent.borrow_mut().execution_context_stack.push(ExecutionContext {
                    ecmascript_code: None,
                    function: None,
                    realm,
                    script_or_module: false,
                });
                true
            } else {
                false
            }
        } else {
            false
        };
        let result = job.run(agent);
        if pushed {
            agent.borrow_mut().execution_context_stack.pop();
        }
        result?;
    }
    if verbose {
        tracing::debug!("job queue empty");
    }
    report_unhandled_rejections(agent);
    Ok(())
}

/// Takes the agent's unhandled-rejection set and hands each one to the
/// console host, stringifying the rejection reason the same way an uncaught
/// throw is (`JsError::to_string`).
fn report_unhandled_rejections(agent: &RefCell<Agent>) {
    let rejected = std::mem::take(&mut agent.borrow_mut().unhandled_rejections);
    for promise in rejected {
        let reason = {
            let a = agent.borrow();
            let ExoticData::Promise(data) = &a.heap[promise.0].exotic else {
                continue;
            };
            let crate::builtins::promise::PromiseState::Rejected { result, .. } = &data.state else {
                continue;
            };
            *result
        };
        let message = JsError::new(reason).to_string(agent);
        let message = message.as_str(&agent.borrow().heap).to_string();
        if agent.borrow().options.print_internals {
            tracing::warn!(%message, "unhandled promise rejection");
        }
        agent.borrow().console_host().report_unhandled_rejection(&message);
    }
}

impl Agent {
    fn current_realm_id_if_any(&self) -> Option<RealmIdentifier> {
        self.execution_context_stack.last().map(|ctx| ctx.realm)
    }
}
