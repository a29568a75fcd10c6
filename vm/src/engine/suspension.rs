// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::types::language::value::Value;
use crate::ecmascript::types::spec::completion::Completion;
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};

/// What a paused computation was doing when it parked.
#[derive(Debug, Clone)]
pub enum SuspendedOp {
    /// `yield value` (or the inner step of `yield* iterable`).
    Yield(Value),
    /// `await value`.
    Await(Value),
}

/// The shared handoff cell between an evaluator coroutine and whatever is
/// driving it (`GeneratorResume`, `AsyncFunctionStart`, `AsyncGeneratorResume`).
/// Exactly one of `pending`/`resume` is populated at any given moment: the
/// coroutine fills `pending` right before its `SuspendPoint::poll` returns
/// `Pending`; the driver drains `pending`, decides what to do, and — when
/// and if it resumes the coroutine — fills `resume` before polling again.
#[derive(Debug, Default)]
pub struct Suspension {
    pending: RefCell<Option<SuspendedOp>>,
    resume: RefCell<Option<Completion>>,
}

impl Suspension {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_pending(&self) -> Option<SuspendedOp> {
        self.pending.borrow_mut().take()
    }

    pub fn inject_resume(&self, completion: Completion) {
        *self.resume.borrow_mut() = Some(completion);
    }
}

/// An `.await`-able point inside the evaluator that represents a JS-level
/// `yield`/`await`. Constructing one stashes `op` into `susp.pending`
/// *before* the future is ever polled, so the very first `poll` — which is
/// what propagates `Poll::Pending` all the way up to the driver — already
/// has something for the driver to read out.
pub struct SuspendPoint<'s> {
    susp: &'s Suspension,
    announced: bool,
    op: SuspendedOp,
}

impl<'s> SuspendPoint<'s> {
    pub fn new(susp: &'s Suspension, op: SuspendedOp) -> Self {
        Self {
            susp,
            announced: false,
            op,
        }
    }
}

impl<'s> Future for SuspendPoint<'s> {
    type Output = Completion;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Completion> {
        let this = self.get_mut();
        if let Some(completion) = this.susp.resume.borrow_mut().take() {
            return Poll::Ready(completion);
        }
        if !this.announced {
            this.announced = true;
            *this.susp.pending.borrow_mut() = Some(this.op.clone());
        }
        Poll::Pending
    }
}

fn noop_context() -> Context<'static> {
    Context::from_waker(Waker::noop())
}

/// Polls `fut` exactly once. Used by drivers that only want to advance a
/// paused computation up to its *next* suspension point or completion
/// (`AsyncFunctionStart`'s first drive, `GeneratorResume`, `AsyncGeneratorResume`).
pub fn drive_to_first_suspend<F>(fut: Pin<&mut F>) -> Poll<Completion>
where
    F: Future<Output = Completion>,
{
    let mut cx = noop_context();
    fut.poll(&mut cx)
}

/// Polls `fut` to completion, asserting it never parks. Plain (non-generator,
/// non-async) functions can't contain `yield`/`await` — the frontend rejects
/// those at lowering time — so this is the normal way to invoke one: the
/// async plumbing is just how the tree walker is written, not an actual
/// suspension opportunity.
pub fn run_to_completion<F>(fut: F) -> Completion
where
    F: Future<Output = Completion>,
{
    let mut boxed = Box::pin(fut);
    match drive_to_first_suspend(boxed.as_mut()) {
        Poll::Ready(completion) => completion,
        Poll::Pending => {
            unreachable!("a non-generator, non-async function body suspended")
        }
    }
}

/// A generator/async function body's evaluation future, boxed so it can
/// outlive the single call that created it and be resumed later by
/// `GeneratorResume`/`AsyncFunctionStart`'s continuation, stored as an
/// `ExoticData::Generator`/`Promise` payload in the heap.
pub type BoxedBody = Pin<Box<dyn Future<Output = Completion>>>;

/// # Safety
///
/// `fut` borrows `&RefCell<Agent>` (and the `Suspension` it suspends
/// through) for the lifetime `'a` of the single `call_ecma_function`
/// invocation that created it. This crate's heap is append-only and the
/// `Agent` is never dropped while anything reachable from it (including a
/// suspended generator/async body) still exists — the whole program runs
/// inside one `Agent`'s lifetime, and everything drops together at the end
/// — so the borrow `fut` holds stays valid for as long as the boxed future
/// itself is reachable. Callers must not call this on a future whose
/// captured references could outlive the `Agent` they point into (there is
/// exactly one call site, `GeneratorObject::start`/`AsyncFunctionStart`, and
/// both only ever capture the ambient `Agent`).
pub unsafe fn erase_body_lifetime<'a>(fut: Pin<Box<dyn Future<Output = Completion> + 'a>>) -> BoxedBody {
    std::mem::transmute::<Pin<Box<dyn Future<Output = Completion> + 'a>>, BoxedBody>(fut)
}

/// Polls a boxed, already-erased body once. `drive_to_first_suspend` can't be
/// used directly on a `BoxedBody` since its `F: Future` bound defaults to
/// `Sized` and `dyn Future` isn't — this is the `dyn`-compatible equivalent,
/// used by `GeneratorResume`/`AsyncFunctionStart`'s continuation.
pub fn drive_boxed_body(fut: &mut BoxedBody) -> Poll<Completion> {
    let mut cx = noop_context();
    fut.as_mut().poll(&mut cx)
}
