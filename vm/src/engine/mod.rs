// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The restartable-sequence machinery behind §4.5's Generator/Async Engine.
//!
//! See `DESIGN.md` ("Generator / Async Engine") for why this is built on
//! Rust's native `Future` state machine rather than a bytecode VM:
//! evaluation functions in `syntax_directed_operations::evaluation`
//! are `async fn`, and a `yield`/`await` expression awaits a [`SuspendPoint`],
//! which parks the whole call chain by returning `Poll::Pending` the first
//! time it is polled and resolves with whatever completion the driver
//! injects on the next poll.

pub mod suspension;

pub use suspension::{
    drive_boxed_body, drive_to_first_suspend, erase_body_lifetime, run_to_completion, BoxedBody, SuspendPoint,
    Suspension, SuspendedOp,
};
