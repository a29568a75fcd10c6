// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end scenarios: parse -> evaluate -> assert observed console
//! output.

use std::cell::RefCell;

use quill_vm::{run_script_with_console_host, ConsoleHost, ConsoleStream, Options};

#[derive(Debug, Default)]
struct CapturingConsoleHost {
    lines: RefCell<Vec<String>>,
}

impl ConsoleHost for CapturingConsoleHost {
    fn write_line(&self, _stream: ConsoleStream, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}

/// Runs `source_text` to completion in a fresh agent/realm, returning every
/// line written through `console.*` during evaluation and job draining.
fn run_and_capture(source_text: &str) -> Vec<String> {
    run_and_capture_with_options(source_text, Options::default())
}

/// Like [`run_and_capture`], but with caller-supplied [`Options`] (e.g. a
/// step budget) instead of the defaults.
fn run_and_capture_with_options(source_text: &str, options: Options) -> Vec<String> {
    let host = std::rc::Rc::new(CapturingConsoleHost::default());
    let host_for_run: Box<dyn ConsoleHost> = Box::new(CapturingHostHandle(host.clone()));
    run_script_with_console_host(source_text, options, host_for_run).expect("script should evaluate without throwing");
    host.lines.borrow().clone()
}

/// `run_script_with_console_host` takes ownership of the `Box<dyn ConsoleHost>`,
/// so the test keeps its own `Rc` to read the captured lines back out after
/// the agent (and the host inside it) has been dropped.
#[derive(Debug)]
struct CapturingHostHandle(std::rc::Rc<CapturingConsoleHost>);

impl ConsoleHost for CapturingHostHandle {
    fn write_line(&self, stream: ConsoleStream, line: &str) {
        self.0.write_line(stream, line);
    }
}

#[test]
fn fibonacci_generator() {
    let lines = run_and_capture(
        r#"
        function* fib(){ let a=0,b=1; while(true){ yield a; [a,b]=[b,a+b]; } }
        const g=fib();
        const out=[];
        for(let i=0;i<10;i++) out.push(g.next().value);
        console.log(out.join(","));
        "#,
    );
    assert_eq!(lines, vec!["0,1,1,2,3,5,8,13,21,34"]);
}

#[test]
fn generator_injected_value() {
    let lines = run_and_capture(
        r#"
        function* f(){ const x = yield 1; yield x+1; }
        const i=f();
        i.next();
        console.log(i.next(10).value);
        "#,
    );
    assert_eq!(lines, vec!["11"]);
}

#[test]
fn promise_ordering() {
    let lines = run_and_capture(
        r#"
        Promise.resolve(1).then(x=>console.log("a",x));
        Promise.resolve(2).then(x=>console.log("b",x));
        console.log("sync");
        "#,
    );
    assert_eq!(lines, vec!["sync", "a 1", "b 2"]);
}

#[test]
fn async_await() {
    let lines = run_and_capture(
        r#"
        async function f(){ const x = await Promise.resolve(3); return x+1; }
        f().then(v=>console.log(v));
        "#,
    );
    assert_eq!(lines, vec!["4"]);
}

#[test]
fn derived_class_with_super() {
    let lines = run_and_capture(
        r#"
        class A{ m(){return 1;} }
        class B extends A{ m(){return super.m()+10;} }
        console.log(new B().m());
        "#,
    );
    assert_eq!(lines, vec!["11"]);
}

#[test]
fn temporal_dead_zone() {
    let lines = run_and_capture(
        r#"
        try{ x; let x=1; }catch(e){ console.log(e.name); }
        "#,
    );
    assert_eq!(lines, vec!["ReferenceError"]);
}

#[test]
fn strict_delete_of_variable_is_a_syntax_error() {
    // A real engine rejects this at parse time as a static SyntaxError,
    // before any code runs; this tree walker has no such static-analysis
    // pass and instead throws a `SyntaxError` when evaluation actually
    // reaches the `delete`, one step later than a real engine but with the
    // same uncaught-SyntaxError outcome for a script with no enclosing
    // `try`/`catch`.
    let lines = run_and_capture(r#""use strict"; var y=1; try { delete y; } catch(e) { console.log(e.name); }"#);
    assert_eq!(lines, vec!["SyntaxError"]);
}

#[test]
fn array_length_assignment_truncates_and_grows() {
    let lines = run_and_capture(
        r#"
        const a = [1,2,3,4,5];
        a.length = 2;
        console.log(a.length, a.join(","));
        a.length = 4;
        console.log(a.length, a[2], a[3]);
        "#,
    );
    assert_eq!(lines, vec!["2 1,2", "4 undefined undefined"]);
}

#[test]
fn array_length_assignment_rejects_non_array_length() {
    let lines = run_and_capture(
        r#"
        const a = [1,2,3];
        try { a.length = -1; } catch(e) { console.log(e.name); }
        "#,
    );
    assert_eq!(lines, vec!["RangeError"]);
}

#[test]
fn yield_star_return_closes_inner_generator() {
    let lines = run_and_capture(
        r#"
        function* inner(){ try { yield 1; } finally { console.log("closed"); } }
        function* outer(){ yield* inner(); }
        const it = outer();
        it.next();
        it.return(5);
        "#,
    );
    assert_eq!(lines, vec!["closed"]);
}

#[test]
fn yield_star_throw_is_caught_by_inner_generator() {
    let lines = run_and_capture(
        r#"
        function* inner(){ try { yield 1; } catch(e) { console.log("caught", e); yield 2; } }
        function* outer(){ yield* inner(); }
        const it = outer();
        it.next();
        console.log(it.throw("boom").value);
        "#,
    );
    assert_eq!(lines, vec!["caught boom", "2"]);
}

#[test]
fn step_budget_aborts_infinite_loop() {
    let host = std::rc::Rc::new(CapturingConsoleHost::default());
    let host_for_run: Box<dyn ConsoleHost> = Box::new(CapturingHostHandle(host.clone()));
    let options = Options {
        step_budget: Some(1000),
        ..Options::default()
    };
    let err = run_script_with_console_host("while (true) {}", options, host_for_run).expect_err("should abort");
    assert!(err.to_string().contains("RangeError"), "unexpected error: {err}");
}

#[test]
fn step_budget_does_not_trip_well_behaved_scripts() {
    let lines = run_and_capture_with_options(
        r#"
        let sum = 0;
        for (let i = 0; i < 50; i++) sum += i;
        console.log(sum);
        "#,
        Options {
            step_budget: Some(10_000),
            ..Options::default()
        },
    );
    assert_eq!(lines, vec!["1225"]);
}

#[test]
fn unhandled_promise_rejection_is_reported_at_drain_time() {
    let lines = run_and_capture(
        r#"
        Promise.reject(new Error("boom"));
        console.log("sync");
        "#,
    );
    assert_eq!(lines.first().map(String::as_str), Some("sync"));
    assert!(
        lines.iter().any(|l| l.contains("Uncaught (in promise)") && l.contains("boom")),
        "expected an unhandled-rejection report, got: {lines:?}"
    );
}

#[test]
fn handled_promise_rejection_is_not_reported() {
    let lines = run_and_capture(
        r#"
        Promise.reject(new Error("boom")).catch(e => console.log("caught", e.message));
        "#,
    );
    assert_eq!(lines, vec!["caught boom"]);
}

#[test]
fn async_generator_backpressure() {
    let lines = run_and_capture(
        r#"
        async function* g(){ yield 1; yield 2; yield 3; }
        (async ()=>{ for await (const v of g()) console.log(v); })();
        "#,
    );
    assert_eq!(lines, vec!["1", "2", "3"]);
}
