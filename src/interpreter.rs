use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::class::{Class, Instance};
use crate::environment::Environment;
use crate::error::{ExecError, Reporter, RuntimeError};
use crate::expr::*;
use crate::function::Function;
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::*;
use crate::token::{Token, Type};

fn number_operand(operator: &Token, value: &Object) -> Result<f64, RuntimeError> {
    match value {
        Object::Literal(Literal::Number(n)) => Ok(*n),
        _ => Err(RuntimeError::new(operator.clone(), "Operand must be a number.")),
    }
}

fn number_operands(operator: &Token, left: &Object, right: &Object) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Object::Literal(Literal::Number(l)), Object::Literal(Literal::Number(r))) => Ok((*l, *r)),
        _ => Err(RuntimeError::new(operator.clone(), "Operands must be numbers.")),
    }
}

/// Renders a value the way `print` and the REPL echo it.
pub fn stringify(value: &Object) -> String {
    value.to_string()
}

/// Walks statements against a mutable "current environment" that starts as
/// `globals`. Holds its output as a trait object so the driver can point it
/// at stdout for real runs and at an in-memory buffer for tests without a
/// generic parameter threading through every runtime value.
pub struct Interpreter<'a> {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    output: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(globals: Rc<RefCell<Environment>>, output: &'a mut dyn Write) -> Self {
        Interpreter { environment: Rc::clone(&globals), globals, output }
    }

    pub fn interpret(&mut self, statements: &[Stmt], reporter: &mut dyn Reporter) {
        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {}
                Err(ExecError::Runtime(err)) => {
                    reporter.runtime_error(&err);
                    return;
                }
                Err(ExecError::Return(_)) => {
                    unreachable!("the resolver rejects 'return' outside a function")
                }
            }
        }
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), ExecError> {
        stmt.accept(self)
    }

    /// Executes `statements` with `environment` as the current scope,
    /// restoring the previous one on every exit path, including an early
    /// `?` return through a runtime error or a propagating `Return`.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> Result<(), ExecError> {
        let previous = Rc::clone(&self.environment);
        self.environment = environment;

        let result = statements.iter().try_for_each(|statement| self.execute(statement));

        self.environment = previous;
        result
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        expr.accept(self)
    }

    fn look_up_variable(&self, name: &Token, depth: &Depth) -> Result<Object, RuntimeError> {
        match depth.get() {
            Some(distance) => self.environment.borrow().get_at(distance, name),
            None => self.globals.borrow().get(name),
        }
    }
}

impl ExprVisitor<Result<Object, RuntimeError>> for Interpreter<'_> {
    fn visit_assign_expr(&mut self, data: &AssignData) -> Result<Object, RuntimeError> {
        let value = self.evaluate(&data.value)?;

        match data.depth.get() {
            Some(distance) => self.environment.borrow_mut().assign_at(distance, &data.name, value.clone()),
            None => self.globals.borrow_mut().assign(&data.name, value.clone())?,
        }

        Ok(value)
    }

    fn visit_binary_expr(&mut self, data: &BinaryData) -> Result<Object, RuntimeError> {
        let left = self.evaluate(&data.left)?;
        let right = self.evaluate(&data.right)?;
        let operator = &data.operator;

        match operator.r#type {
            Type::Greater => number_operands(operator, &left, &right).map(|(l, r)| Object::from(l > r)),
            Type::GreaterEqual => number_operands(operator, &left, &right).map(|(l, r)| Object::from(l >= r)),
            Type::Less => number_operands(operator, &left, &right).map(|(l, r)| Object::from(l < r)),
            Type::LessEqual => number_operands(operator, &left, &right).map(|(l, r)| Object::from(l <= r)),
            Type::BangEqual => Ok(Object::from(left != right)),
            Type::EqualEqual => Ok(Object::from(left == right)),
            Type::Minus => number_operands(operator, &left, &right).map(|(l, r)| Object::from(l - r)),
            Type::Slash => number_operands(operator, &left, &right).map(|(l, r)| Object::from(l / r)),
            Type::Star => number_operands(operator, &left, &right).map(|(l, r)| Object::from(l * r)),
            Type::Plus => match (&left, &right) {
                (Object::Literal(Literal::Number(l)), Object::Literal(Literal::Number(r))) => Ok(Object::from(l + r)),
                (Object::Literal(Literal::String(l)), Object::Literal(Literal::String(r))) => {
                    Ok(Object::from(format!("{l}{r}")))
                }
                _ => Err(RuntimeError::new(operator.clone(), "Operands must be two numbers or two strings.")),
            },
            _ => unreachable!("the parser never produces a non-binary operator here"),
        }
    }

    fn visit_call_expr(&mut self, data: &CallData) -> Result<Object, RuntimeError> {
        let callee = self.evaluate(&data.callee)?;

        let mut arguments = Vec::with_capacity(data.arguments.len());
        for argument in &data.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        let arity = match &callee {
            Object::Function(function) => function.arity(),
            Object::NativeFunction(function) => function.arity(),
            Object::Class(class) => class.borrow().arity(),
            _ => return Err(RuntimeError::new(data.paren.clone(), "Can only call functions and classes.")),
        };

        if arguments.len() != arity {
            return Err(RuntimeError::new(
                data.paren.clone(),
                format!("Expected {} arguments but got {}.", arity, arguments.len()),
            ));
        }

        match callee {
            Object::Function(function) => function.call(self, arguments),
            Object::NativeFunction(function) => function.call(self, arguments),
            Object::Class(class) => Class::instantiate(&class, self, arguments),
            _ => unreachable!("non-callables were rejected above"),
        }
    }

    fn visit_get_expr(&mut self, data: &GetData) -> Result<Object, RuntimeError> {
        let object = self.evaluate(&data.object)?;

        match object {
            Object::Instance(instance) => instance.borrow().get(&data.name, &instance),
            _ => Err(RuntimeError::new(data.name.clone(), "Only instances have properties.")),
        }
    }

    fn visit_grouping_expr(&mut self, data: &GroupingData) -> Result<Object, RuntimeError> {
        self.evaluate(&data.expr)
    }

    fn visit_literal_expr(&mut self, data: &Literal) -> Result<Object, RuntimeError> {
        Ok(Object::from(data.clone()))
    }

    fn visit_logical_expr(&mut self, data: &LogicalData) -> Result<Object, RuntimeError> {
        let left = self.evaluate(&data.left)?;

        match data.operator.r#type {
            Type::Or if left.is_truthy() => return Ok(left),
            Type::And if !left.is_truthy() => return Ok(left),
            _ => {}
        }

        self.evaluate(&data.right)
    }

    fn visit_set_expr(&mut self, data: &SetData) -> Result<Object, RuntimeError> {
        let object = self.evaluate(&data.object)?;

        match object {
            Object::Instance(instance) => {
                let value = self.evaluate(&data.value)?;
                instance.borrow_mut().set(&data.name, value.clone());
                Ok(value)
            }
            _ => Err(RuntimeError::new(data.name.clone(), "Only instances have fields.")),
        }
    }

    fn visit_super_expr(&mut self, data: &SuperData) -> Result<Object, RuntimeError> {
        let distance = data.depth.get().expect("resolver to have resolved 'super'");

        let superclass = match self.environment.borrow().get_at(distance, &data.keyword)? {
            Object::Class(class) => class,
            _ => unreachable!("'super' always resolves to a class"),
        };

        let this_token = Token::new(Type::This, "this".to_string(), None, data.keyword.line);
        let instance = match self.environment.borrow().get_at(distance - 1, &this_token)? {
            Object::Instance(instance) => instance,
            _ => unreachable!("'this' always resolves to an instance"),
        };

        let method = superclass.borrow().get_method(&data.method.lexeme).ok_or_else(|| {
            RuntimeError::new(data.method.clone(), format!("Undefined property '{}'.", data.method.lexeme))
        })?;

        Ok(Object::from(method.bind(Object::from(instance))))
    }

    fn visit_this_expr(&mut self, data: &ThisData) -> Result<Object, RuntimeError> {
        self.look_up_variable(&data.keyword, &data.depth)
    }

    fn visit_unary_expr(&mut self, data: &UnaryData) -> Result<Object, RuntimeError> {
        let right = self.evaluate(&data.expr)?;

        match data.operator.r#type {
            Type::Minus => Ok(Object::from(-number_operand(&data.operator, &right)?)),
            Type::Bang => Ok(Object::from(!right.is_truthy())),
            _ => unreachable!("the parser never produces a non-unary operator here"),
        }
    }

    fn visit_variable_expr(&mut self, data: &VariableData) -> Result<Object, RuntimeError> {
        self.look_up_variable(&data.name, &data.depth)
    }
}

impl StmtVisitor<Result<(), ExecError>> for Interpreter<'_> {
    fn visit_block_stmt(&mut self, data: &BlockData) -> Result<(), ExecError> {
        let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
        self.execute_block(&data.statements, environment)
    }

    fn visit_class_stmt(&mut self, data: &ClassData) -> Result<(), ExecError> {
        let superclass = match &data.superclass {
            Some(superclass_data) => match self.look_up_variable(&superclass_data.name, &superclass_data.depth)? {
                Object::Class(class) => Some(class),
                _ => {
                    return Err(ExecError::from(RuntimeError::new(
                        superclass_data.name.clone(),
                        "Superclass must be a class.",
                    )))
                }
            },
            None => None,
        };

        self.environment.borrow_mut().define(&data.name.lexeme, Object::from(Literal::Nil));

        if let Some(superclass) = &superclass {
            let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
            environment.borrow_mut().define("super", Object::from(Rc::clone(superclass)));
            self.environment = environment;
        }

        let mut methods = HashMap::new();
        for method in &data.methods {
            let is_initializer = method.name.lexeme == "init";
            let function = Function::new(Rc::clone(method), Rc::clone(&self.environment), is_initializer);
            methods.insert(method.name.lexeme.clone(), Rc::new(function));
        }

        let class = Rc::new(RefCell::new(Class::new(data.name.lexeme.clone(), methods, superclass.clone())));

        if superclass.is_some() {
            let enclosing = self
                .environment
                .borrow()
                .enclosing
                .clone()
                .expect("the superclass environment layer to have an enclosing scope");
            self.environment = enclosing;
        }

        self.environment.borrow_mut().assign(&data.name, Object::from(class))?;

        Ok(())
    }

    fn visit_expression_stmt(&mut self, data: &ExpressionData) -> Result<(), ExecError> {
        self.evaluate(&data.expr)?;
        Ok(())
    }

    fn visit_function_stmt(&mut self, data: &Rc<FunctionData>) -> Result<(), ExecError> {
        let function = Function::new(Rc::clone(data), Rc::clone(&self.environment), false);
        self.environment.borrow_mut().define(&data.name.lexeme, Object::from(function));
        Ok(())
    }

    fn visit_if_stmt(&mut self, data: &IfData) -> Result<(), ExecError> {
        if self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.then_branch)
        } else if let Some(else_branch) = &data.else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_print_stmt(&mut self, data: &PrintData) -> Result<(), ExecError> {
        let value = self.evaluate(&data.expr)?;
        writeln!(self.output, "{}", stringify(&value)).expect("writes to the configured output not to fail");
        Ok(())
    }

    fn visit_return_stmt(&mut self, data: &ReturnData) -> Result<(), ExecError> {
        let value = self.evaluate(&data.value)?;
        Err(ExecError::Return(value))
    }

    fn visit_var_stmt(&mut self, data: &VarData) -> Result<(), ExecError> {
        let value = match &data.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::from(Literal::Nil),
        };

        self.environment.borrow_mut().define(&data.name.lexeme, value);
        Ok(())
    }

    fn visit_while_stmt(&mut self, data: &WhileData) -> Result<(), ExecError> {
        while self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.body)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectingReporter;
    use crate::parser::Parser;
    use crate::scanner::Scanner;
    use crate::function::NativeFunction;

    fn run(source: &str) -> String {
        let mut output = Vec::new();
        let mut reporter = CollectingReporter::default();

        let tokens = Scanner::new(source).scan_tokens(&mut reporter);
        let statements = Parser::new(tokens, &mut reporter).parse();
        crate::resolver::Resolver::new(&mut reporter).resolve(&statements);
        assert!(!reporter.had_error(), "unexpected compile error: {:?}", reporter.messages);

        let globals = Rc::new(RefCell::new(Environment::new(None)));
        for builtin in NativeFunction::builtins() {
            globals.borrow_mut().define(builtin.name, Object::from(builtin));
        }

        Interpreter::new(globals, &mut output).interpret(&statements, &mut reporter);
        assert!(!reporter.had_runtime_error(), "unexpected runtime error: {:?}", reporter.messages);

        String::from_utf8(output).unwrap()
    }

    #[test]
    fn arithmetic_and_print() {
        assert_eq!(run("print 1 + 2;"), "3\n");
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(run(r#"var a = "hi "; var b = "there"; print a + b;"#), "hi there\n");
    }

    #[test]
    fn for_loop_accumulates() {
        assert_eq!(run("var a = 0; for (var i = 0; i < 3; i = i + 1) a = a + i; print a;"), "3\n");
    }

    #[test]
    fn closures_capture_by_reference() {
        let source = "fun mk() { var i = 0; fun inc() { i = i + 1; return i; } return inc; } \
                       var f = mk(); print f(); print f(); print f();";
        assert_eq!(run(source), "1\n2\n3\n");
    }

    #[test]
    fn resolver_binds_to_declaration_scope_not_use_site() {
        let source = r#"var a = "global";
            { fun show() { print a; } show(); var a = "local"; show(); }"#;
        assert_eq!(run(source), "global\nglobal\n");
    }

    #[test]
    fn inheritance_and_super_call() {
        let source = r#"class A { hi() { print "A"; } }
            class B < A { hi() { super.hi(); print "B"; } }
            B().hi();"#;
        assert_eq!(run(source), "A\nB\n");
    }

    #[test]
    fn initializer_returns_this() {
        assert_eq!(run("class C { init() { return; } } print C();"), "C instance\n");
    }

    #[test]
    fn runtime_error_surfaces_through_reporter() {
        let mut output = Vec::new();
        let mut reporter = CollectingReporter::default();

        let tokens = Scanner::new(r#"print "x" - 1;"#).scan_tokens(&mut reporter);
        let statements = Parser::new(tokens, &mut reporter).parse();
        crate::resolver::Resolver::new(&mut reporter).resolve(&statements);

        let globals = Rc::new(RefCell::new(Environment::new(None)));
        Interpreter::new(globals, &mut output).interpret(&statements, &mut reporter);

        assert!(reporter.had_runtime_error());
        assert!(reporter.messages[0].starts_with("Operands must be numbers."));
    }
}
