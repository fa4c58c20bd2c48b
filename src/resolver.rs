use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Reporter;
use crate::expr::*;
use crate::literal::Literal;
use crate::stmt::*;
use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

/// Static pass mirroring the evaluator's scope structure to compute, for
/// every variable-use node, how many environment links outward its name
/// resolves at. Writes the answer directly onto the node's `depth` cell
/// rather than into a side-table, so the evaluator never needs to look the
/// node up by identity.
pub struct Resolver<'r> {
    scopes: Vec<HashMap<String, bool>>,
    reporter: &'r mut dyn Reporter,
    current_function: FunctionType,
    current_class: ClassType,
}

impl<'r> Resolver<'r> {
    pub fn new(reporter: &'r mut dyn Reporter) -> Self {
        Resolver {
            scopes: Vec::new(),
            reporter,
            current_function: FunctionType::None,
            current_class: ClassType::None,
        }
    }

    pub fn resolve(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        stmt.accept(self);
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        expr.accept(self);
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&name.lexeme) {
                self.reporter.error_at_token(name, "Already a variable with this name in this scope.");
            }
            scope.insert(name.lexeme.clone(), false);
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    fn resolve_local(&mut self, name: &Token, depth: &Depth) {
        for (index, scope) in self.scopes.iter().enumerate().rev() {
            if scope.contains_key(&name.lexeme) {
                depth.set(Some(self.scopes.len() - 1 - index));
                return;
            }
        }
    }

    fn resolve_function(&mut self, data: &FunctionData, r#type: FunctionType) {
        let enclosing_function = self.current_function;
        self.current_function = r#type;

        self.begin_scope();
        for param in &data.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve(&data.body);
        self.end_scope();

        self.current_function = enclosing_function;
    }
}

impl ExprVisitor<()> for Resolver<'_> {
    fn visit_assign_expr(&mut self, data: &AssignData) {
        self.resolve_expr(&data.value);
        self.resolve_local(&data.name, &data.depth);
    }

    fn visit_binary_expr(&mut self, data: &BinaryData) {
        self.resolve_expr(&data.left);
        self.resolve_expr(&data.right);
    }

    fn visit_call_expr(&mut self, data: &CallData) {
        self.resolve_expr(&data.callee);
        for argument in &data.arguments {
            self.resolve_expr(argument);
        }
    }

    fn visit_get_expr(&mut self, data: &GetData) {
        self.resolve_expr(&data.object);
    }

    fn visit_grouping_expr(&mut self, data: &GroupingData) {
        self.resolve_expr(&data.expr);
    }

    fn visit_literal_expr(&mut self, _data: &Literal) {}

    fn visit_logical_expr(&mut self, data: &LogicalData) {
        self.resolve_expr(&data.left);
        self.resolve_expr(&data.right);
    }

    fn visit_set_expr(&mut self, data: &SetData) {
        self.resolve_expr(&data.value);
        self.resolve_expr(&data.object);
    }

    fn visit_super_expr(&mut self, data: &SuperData) {
        match self.current_class {
            ClassType::None => self.reporter.error_at_token(&data.keyword, "Can't use 'super' outside of a class."),
            ClassType::Class => {
                self.reporter.error_at_token(&data.keyword, "Can't use 'super' in a class with no superclass.")
            }
            ClassType::Subclass => self.resolve_local(&data.keyword, &data.depth),
        }
    }

    fn visit_this_expr(&mut self, data: &ThisData) {
        if self.current_class == ClassType::None {
            self.reporter.error_at_token(&data.keyword, "Can't use 'this' outside of a class.");
            return;
        }
        self.resolve_local(&data.keyword, &data.depth);
    }

    fn visit_unary_expr(&mut self, data: &UnaryData) {
        self.resolve_expr(&data.expr);
    }

    fn visit_variable_expr(&mut self, data: &VariableData) {
        if let Some(scope) = self.scopes.last() {
            if scope.get(&data.name.lexeme) == Some(&false) {
                self.reporter.error_at_token(&data.name, "Can't read local variable in its own initializer.");
            }
        }
        self.resolve_local(&data.name, &data.depth);
    }
}

impl StmtVisitor<()> for Resolver<'_> {
    fn visit_block_stmt(&mut self, data: &BlockData) {
        self.begin_scope();
        self.resolve(&data.statements);
        self.end_scope();
    }

    fn visit_class_stmt(&mut self, data: &ClassData) {
        let enclosing_class = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(&data.name);
        self.define(&data.name);

        if let Some(superclass) = &data.superclass {
            if superclass.name.lexeme == data.name.lexeme {
                self.reporter.error_at_token(&superclass.name, "A class can't inherit from itself.");
            }

            self.current_class = ClassType::Subclass;
            self.resolve_local(&superclass.name, &superclass.depth);

            self.begin_scope();
            self.scopes.last_mut().expect("stack to be not empty").insert("super".to_string(), true);
        }

        self.begin_scope();
        self.scopes.last_mut().expect("stack to be not empty").insert("this".to_string(), true);

        for method in &data.methods {
            let declaration = if method.name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            self.resolve_function(method, declaration);
        }

        self.end_scope();

        if data.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn visit_expression_stmt(&mut self, data: &ExpressionData) {
        self.resolve_expr(&data.expr);
    }

    fn visit_function_stmt(&mut self, data: &Rc<FunctionData>) {
        self.declare(&data.name);
        self.define(&data.name);
        self.resolve_function(data, FunctionType::Function);
    }

    fn visit_if_stmt(&mut self, data: &IfData) {
        self.resolve_expr(&data.condition);
        self.resolve_stmt(&data.then_branch);
        if let Some(else_branch) = &data.else_branch {
            self.resolve_stmt(else_branch);
        }
    }

    fn visit_print_stmt(&mut self, data: &PrintData) {
        self.resolve_expr(&data.expr);
    }

    fn visit_return_stmt(&mut self, data: &ReturnData) {
        if self.current_function == FunctionType::None {
            self.reporter.error_at_token(&data.keyword, "Can't return from top-level code.");
        }

        if self.current_function == FunctionType::Initializer
            && !matches!(data.value, Expr::Literal(Literal::Nil))
        {
            self.reporter.error_at_token(&data.keyword, "Can't return a value from an initializer.");
        }

        self.resolve_expr(&data.value);
    }

    fn visit_var_stmt(&mut self, data: &VarData) {
        self.declare(&data.name);
        if let Some(initializer) = &data.initializer {
            self.resolve_expr(initializer);
        }
        self.define(&data.name);
    }

    fn visit_while_stmt(&mut self, data: &WhileData) {
        self.resolve_expr(&data.condition);
        self.resolve_stmt(&data.body);
    }
}
