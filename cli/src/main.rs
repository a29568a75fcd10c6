// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cell::RefCell;
use std::io::Write;

use clap::{Parser as ClapParser, Subcommand};
use console::Style;
use quill_vm::{create_realm, evaluate, run_in_realm, run_jobs, run_script, Agent, Options};

#[derive(Debug, ClapParser)]
#[command(name = "quill")]
#[command(about = "A tree-walking ECMAScript evaluation runtime", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluates a script file and prints its completion value.
    #[command(arg_required_else_help = true)]
    Run {
        /// The file to evaluate.
        path: String,

        /// Prints internal engine diagnostics (job queue draining, realm setup).
        #[arg(short, long, default_value_t = false)]
        verbose: bool,

        /// Aborts evaluation with a RangeError after this many statements.
        #[arg(long)]
        step_budget: Option<u64>,
    },

    /// Starts an interactive read-eval-print loop.
    Repl {
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Cli::parse();

    let result = match args.command {
        Command::Run { path, verbose, step_budget } => run_file(&path, verbose, step_budget),
        Command::Repl { verbose } => repl(verbose),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}

fn run_file(path: &str, verbose: bool, step_budget: Option<u64>) -> Result<(), i32> {
    let source_text = std::fs::read_to_string(path).map_err(|e| {
        eprintln!("{}: {e}", Style::new().red().bold().apply_to("error"));
        1
    })?;
    match run_script(&source_text, Options { print_internals: verbose, step_budget }) {
        Ok(value) => {
            println!("{value:?}");
            Ok(())
        }
        Err(e) => {
            eprintln!("{}: {e}", Style::new().red().bold().apply_to("error"));
            Err(1)
        }
    }
}

/// A REPL keeps one `Agent`/realm alive across inputs (so a binding from one
/// line is visible on the next), unlike `run_script`, which spins up a fresh
/// one per call.
fn repl(verbose: bool) -> Result<(), i32> {
    let agent = RefCell::new(Agent::new(Options { print_internals: verbose, step_budget: None }));
    let realm = create_realm(&agent);
    let prompt = Style::new().cyan().bold();
    let mut input = String::new();

    loop {
        print!("{} ", prompt.apply_to(">"));
        std::io::stdout().flush().ok();
        input.clear();
        if std::io::stdin().read_line(&mut input).unwrap_or(0) == 0 {
            break;
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == ".exit" {
            break;
        }

        match evaluate(&agent, realm, line) {
            Ok(value) => println!("{value:?}"),
            Err(e) => eprintln!("{}: {e}", Style::new().red().bold().apply_to("Uncaught")),
        }
        if let Err(e) = run_in_realm(&agent, realm, || run_jobs(&agent)) {
            eprintln!("{}: {e:?}", Style::new().red().bold().apply_to("Uncaught"));
        }
    }
    Ok(())
}
