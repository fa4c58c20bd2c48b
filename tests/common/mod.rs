use std::cell::RefCell;
use std::rc::Rc;

use rocks_lang::environment::Environment;
use rocks_lang::error::{CollectingReporter, Reporter};
use rocks_lang::function::NativeFunction;
use rocks_lang::interpreter::Interpreter;
use rocks_lang::object::Object;
use rocks_lang::parser::Parser;
use rocks_lang::resolver::Resolver;
use rocks_lang::scanner::Scanner;

/// The outcome of running one source unit through the full pipeline.
pub struct RunResult {
    pub stdout: String,
    pub errors: Vec<String>,
    pub had_error: bool,
    pub had_runtime_error: bool,
}

pub fn run(source: &str) -> RunResult {
    let mut output = Vec::new();
    let mut reporter = CollectingReporter::default();

    let tokens = Scanner::new(source).scan_tokens(&mut reporter);
    let statements = Parser::new(tokens, &mut reporter).parse();

    if !reporter.had_error() {
        Resolver::new(&mut reporter).resolve(&statements);
    }

    if !reporter.had_error() {
        let globals = Rc::new(RefCell::new(Environment::new(None)));
        for builtin in NativeFunction::builtins() {
            globals.borrow_mut().define(builtin.name, Object::from(builtin));
        }
        Interpreter::new(globals, &mut output).interpret(&statements, &mut reporter);
    }

    RunResult {
        stdout: String::from_utf8(output).expect("program output to be valid utf-8"),
        had_error: reporter.had_error(),
        had_runtime_error: reporter.had_runtime_error(),
        errors: reporter.messages,
    }
}

/// Declares one test driving `common::run` against inline source.
///
/// `is OK` asserts a clean run and an exact `print`ed-lines match.
/// `is ERR` asserts a compile or runtime error whose reported messages
/// contain every given substring, in order.
#[macro_export]
macro_rules! tests {
    ($name:ident is OK $source:expr => $($expected:expr),* $(,)?) => {
        #[test]
        fn $name() {
            let result = common::run($source);
            assert!(!result.had_error, "unexpected compile error: {:?}", result.errors);
            assert!(!result.had_runtime_error, "unexpected runtime error: {:?}", result.errors);

            let mut expected = vec![$($expected),*];
            let expected: String = if expected.is_empty() {
                String::new()
            } else {
                expected.push("");
                expected.join("\n")
            };

            assert_eq!(result.stdout, expected);
        }
    };

    ($name:ident is ERR $source:expr => $($expected:expr),+ $(,)?) => {
        #[test]
        fn $name() {
            let result = common::run($source);
            assert!(
                result.had_error || result.had_runtime_error,
                "expected a compile or runtime error, got stdout {:?}",
                result.stdout
            );

            let expected: Vec<&str> = vec![$($expected),+];
            for message in &expected {
                assert!(
                    result.errors.iter().any(|m| m.contains(message)),
                    "expected an error containing {message:?}, got {:?}",
                    result.errors
                );
            }
        }
    };
}
