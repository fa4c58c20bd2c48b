use std::cell::RefCell;
use std::fmt::{self, Debug, Display};
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::{ExecError, RuntimeError};
use crate::interpreter::Interpreter;
use crate::object::{Callable, Object};
use crate::literal::Literal;
use crate::stmt::FunctionData;
use crate::token::{Token, Type};

/// A user-defined function or method, bundled with the environment that
/// was active when it was declared. Re-evaluating the same `fun`/method
/// declaration would build an equal-looking but distinct `Function`; the
/// identity that matters for `==` lives on `Object`, which compares these
/// by pointer once wrapped in `Rc`.
#[derive(Debug)]
pub struct Function {
    pub declaration: Rc<FunctionData>,
    pub closure: Rc<RefCell<Environment>>,
    pub is_initializer: bool,
}

impl Function {
    pub fn new(declaration: Rc<FunctionData>, closure: Rc<RefCell<Environment>>, is_initializer: bool) -> Self {
        Function { declaration, closure, is_initializer }
    }

    /// Returns a new function value whose closure extends this one with
    /// `this` bound to `instance`. Called once per `Get` on a method, so
    /// every property access produces a fresh, distinct bound method.
    pub fn bind(&self, instance: Object) -> Function {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));
        environment.define("this", instance);

        Function::new(
            Rc::clone(&self.declaration),
            Rc::new(RefCell::new(environment)),
            self.is_initializer,
        )
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter<'_>, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));

        for (param, arg) in self.declaration.params.iter().zip(arguments.into_iter()) {
            environment.define(&param.lexeme, arg);
        }

        let result = interpreter.execute_block(&self.declaration.body, Rc::new(RefCell::new(environment)));

        match result {
            // An `init` method always returns the bound `this`, whether it
            // returns early or simply falls off the end. A runtime error
            // still propagates even from an initializer.
            Ok(()) | Err(ExecError::Return(_)) if self.is_initializer => {
                let this_token = Token::new(Type::This, "this".to_string(), None, self.declaration.name.line);
                self.closure.borrow().get_at(0, &this_token)
            }
            Ok(()) => Ok(Object::from(Literal::Nil)),
            Err(ExecError::Return(value)) => Ok(value),
            Err(ExecError::Runtime(err)) => Err(err),
        }
    }

    fn arity(&self) -> usize {
        self.declaration.params.len()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

/// A builtin callable implemented in the host language rather than
/// declared in source. The interpreter currently defines exactly one:
/// `clock`.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub function: fn(Vec<Object>) -> Result<Object, RuntimeError>,
}

impl Callable for NativeFunction {
    fn call(&self, _interpreter: &mut Interpreter<'_>, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        (self.function)(arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl NativeFunction {
    /// The builtins installed into a fresh globals environment.
    pub fn builtins() -> Vec<NativeFunction> {
        vec![NativeFunction {
            name: "clock",
            arity: 0,
            function: |_| {
                let now = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .expect("system clock to be after the epoch")
                    .as_secs_f64();
                Ok(Object::from(now))
            },
        }]
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn>")
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_has_zero_arity() {
        let builtins = NativeFunction::builtins();
        let clock = builtins.iter().find(|f| f.name == "clock").unwrap();
        assert_eq!(clock.arity(), 0);
    }
}
