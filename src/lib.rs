#![allow(clippy::needless_return)]

//! Rocks is a dynamically typed, lexically scoped language with first-class
//! functions and single-inheritance classes, implemented here as a
//! tree-walking interpreter.
//!
//! ## Scanning
//! The first step is scanning: turning a string of source characters into a
//! flat sequence of tokens. The scanner lives in [`scanner`] as an iterator
//! over the source's characters; it reports lexical errors (an unterminated
//! string, a stray character) through the injected [`error::Reporter`] and
//! keeps going rather than aborting.
//!
//! ## Parsing
//! The second step is parsing: turning the token sequence into an abstract
//! syntax tree. [`parser`] implements a recursive-descent parser producing
//! [`expr::Expr`] nodes (anything that evaluates to a value) and
//! [`stmt::Stmt`] nodes (anything that acts by side effect — a variable
//! declaration, an `if`, a block). A malformed statement is reported and
//! skipped via synchronization so later statements still parse.
//!
//! ## Resolving
//! The third step, [`resolver`], is a static pass over the finished tree
//! that determines, for every variable reference, how many enclosing scopes
//! outward to look. This lets the evaluator resolve variables the same way
//! regardless of the dynamic execution path that reached a given
//! expression — the classic "closures see their own scope" fix.
//!
//! ## Interpreting
//! The final step, [`interpreter`], walks the resolved tree and executes
//! it, maintaining the chain of [`environment::Environment`] scopes and
//! producing [`object::Object`] values. Errors caught here are
//! [`error::RuntimeError`]s, distinct from the earlier compile-time errors;
//! they carry the token that failed so the reporter can point at a line.

use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub mod ast;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use environment::Environment;
use error::{ConsoleReporter, Reporter};
use function::NativeFunction;
use interpreter::Interpreter;
use object::Object;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

pub const EXIT_USAGE: i32 = 64;
pub const EXIT_DATAERR: i32 = 65;
pub const EXIT_SOFTWARE: i32 = 70;

fn history_path() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(".rocks_history"))
}

fn globals_with_builtins() -> Rc<RefCell<Environment>> {
    let globals = Rc::new(RefCell::new(Environment::new(None)));
    for builtin in NativeFunction::builtins() {
        globals.borrow_mut().define(builtin.name, Object::from(builtin));
    }
    globals
}

/// Drives the scan/parse/resolve/evaluate pipeline for one source unit at
/// a time. Holds `globals` itself (not the interpreter) so that REPL lines
/// share state across calls to [`run`](Rocks::run); a fresh [`Interpreter`]
/// is built per call so each one can reborrow `output` independently.
pub struct Rocks<'a> {
    reporter: ConsoleReporter,
    globals: Rc<RefCell<Environment>>,
    output: &'a mut dyn Write,
}

impl<'a> Rocks<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        Rocks { reporter: ConsoleReporter::default(), globals: globals_with_builtins(), output }
    }

    /// Reads and runs a whole file. Returns the process exit code the
    /// driver should use.
    pub fn run_file(&mut self, path: &str) -> i32 {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                eprintln!("Could not read file '{path}': {err}");
                return EXIT_USAGE;
            }
        };

        self.run(&contents);

        if self.reporter.had_error() {
            return EXIT_DATAERR;
        }
        if self.reporter.had_runtime_error() {
            return EXIT_SOFTWARE;
        }
        0
    }

    /// Runs an interactive REPL, reading one line at a time until EOF.
    /// Errors on one line don't prevent the next from running.
    pub fn run_prompt(&mut self) -> i32 {
        let mut editor = DefaultEditor::new().expect("a line editor to initialize");
        let history = history_path();
        if let Some(history) = &history {
            let _ = editor.load_history(history);
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    self.run(&line);
                    self.reporter.reset();
                }
                Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => break,
                Err(err) => {
                    eprintln!("{err}");
                    break;
                }
            }
        }

        if let Some(history) = &history {
            let _ = editor.save_history(history);
        }

        0
    }

    fn run(&mut self, source: &str) {
        let tokens = Scanner::new(source).scan_tokens(&mut self.reporter);
        if self.reporter.had_error() {
            return;
        }

        let statements = Parser::new(tokens, &mut self.reporter).parse();
        if self.reporter.had_error() {
            return;
        }

        Resolver::new(&mut self.reporter).resolve(&statements);
        if self.reporter.had_error() {
            return;
        }

        Interpreter::new(Rc::clone(&self.globals), &mut *self.output).interpret(&statements, &mut self.reporter);
    }
}
