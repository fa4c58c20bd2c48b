use crate::object::Object;
use crate::token::{Token, Type};

/// A compile-time diagnostic raised while scanning, before any token exists
/// to anchor it to.
#[derive(Debug, Clone)]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

/// A compile-time diagnostic raised while parsing, anchored to the token
/// that triggered it.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

/// A compile-time diagnostic raised while resolving scopes, anchored to the
/// offending token.
#[derive(Debug, Clone)]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

/// A runtime diagnostic, anchored to the token whose evaluation failed.
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        RuntimeError { token, message: message.into() }
    }
}

/// The two channels a statement's execution can unwind through. `Runtime`
/// is a genuine error; `Return` is ordinary control flow carrying a user
/// function's result back to its call site and must never reach a
/// `Reporter`.
#[derive(Debug)]
pub enum ExecError {
    Runtime(RuntimeError),
    Return(Object),
}

impl From<RuntimeError> for ExecError {
    fn from(err: RuntimeError) -> Self {
        ExecError::Runtime(err)
    }
}

/// Where diagnostics go, and whether any have been seen yet. Injected into
/// the scanner/parser/resolver/interpreter so the driver decides the sink
/// (stderr for real runs, an in-memory buffer for tests) instead of each
/// pass reaching into global state.
pub trait Reporter {
    fn error(&mut self, line: usize, message: &str);
    fn error_at_token(&mut self, token: &Token, message: &str);
    fn runtime_error(&mut self, error: &RuntimeError);

    fn had_error(&self) -> bool;
    fn had_runtime_error(&self) -> bool;

    /// Clears both flags so a REPL can keep accepting lines after a bad one.
    fn reset(&mut self);
}

fn location_suffix(token: &Token) -> String {
    if token.r#type == Type::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

/// Reports to stderr, matching the wire format real invocations produce.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    had_error: bool,
    had_runtime_error: bool,
}

impl Reporter for ConsoleReporter {
    fn error(&mut self, line: usize, message: &str) {
        eprintln!("[line {line}] Error: {message}");
        self.had_error = true;
    }

    fn error_at_token(&mut self, token: &Token, message: &str) {
        eprintln!("[line {}] Error{}: {}", token.line, location_suffix(token), message);
        self.had_error = true;
    }

    fn runtime_error(&mut self, error: &RuntimeError) {
        eprintln!("{}\n[line {}]", error.message, error.token.line);
        self.had_runtime_error = true;
    }

    fn had_error(&self) -> bool {
        self.had_error
    }

    fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }
}

/// Reports into memory, matching `ConsoleReporter`'s formatting exactly, so
/// tests can assert on diagnostics without spawning a process.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub messages: Vec<String>,
    had_error: bool,
    had_runtime_error: bool,
}

impl Reporter for CollectingReporter {
    fn error(&mut self, line: usize, message: &str) {
        self.messages.push(format!("[line {line}] Error: {message}"));
        self.had_error = true;
    }

    fn error_at_token(&mut self, token: &Token, message: &str) {
        self.messages.push(format!(
            "[line {}] Error{}: {}",
            token.line,
            location_suffix(token),
            message
        ));
        self.had_error = true;
    }

    fn runtime_error(&mut self, error: &RuntimeError) {
        self.messages.push(format!("{}\n[line {}]", error.message, error.token.line));
        self.had_runtime_error = true;
    }

    fn had_error(&self) -> bool {
        self.had_error
    }

    fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }
}
