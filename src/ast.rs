use std::rc::Rc;

use crate::expr::*;
use crate::literal::Literal;
use crate::stmt::*;

/// Returns a string representation of the expression in paranthesize.
macro_rules! parenthesize {
    ( $self:ident, $name:expr, $( $x:expr ),+ ) => {
        {
            let mut string = String::new();
            string += "(";
            string += $name;
            $(
                string += " ";
                string += &$x.accept($self);
            )*
            string += ")";

            string
        }
    };
}

/// A debugging aid that renders the AST as a fully-parenthesized
/// Lisp-like string; not exercised by the CLI.
pub struct ASTPrinter;

impl ASTPrinter {
    pub fn print(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) -> String {
        stmt.accept(self)
    }
}

impl ExprVisitor<String> for ASTPrinter {
    fn visit_assign_expr(&mut self, data: &AssignData) -> String {
        parenthesize!(self, format!("= {}", &data.name.lexeme).as_str(), data.value)
    }

    fn visit_binary_expr(&mut self, data: &BinaryData) -> String {
        parenthesize!(self, &data.operator.lexeme, &data.left, &data.right)
    }

    fn visit_call_expr(&mut self, data: &CallData) -> String {
        let mut string = String::new();
        string += &data.callee.accept(self);
        string += "(";
        for arg in &data.arguments {
            string += &arg.accept(self);
            string += " ";
        }
        string = string.trim_end().to_string();
        string += ")";
        string
    }

    fn visit_get_expr(&mut self, data: &GetData) -> String {
        parenthesize!(self, format!(". {}", &data.name.lexeme).as_str(), data.object)
    }

    fn visit_grouping_expr(&mut self, data: &GroupingData) -> String {
        parenthesize!(self, "group", data.expr)
    }

    fn visit_literal_expr(&mut self, literal: &Literal) -> String {
        literal.to_string()
    }

    fn visit_logical_expr(&mut self, data: &LogicalData) -> String {
        parenthesize!(self, &data.operator.lexeme, &data.left, &data.right)
    }

    fn visit_set_expr(&mut self, data: &SetData) -> String {
        parenthesize!(self, format!("= . {}", &data.name.lexeme).as_str(), data.object, data.value)
    }

    fn visit_super_expr(&mut self, data: &SuperData) -> String {
        format!("(super.{})", data.method.lexeme)
    }

    fn visit_this_expr(&mut self, _data: &ThisData) -> String {
        "this".to_string()
    }

    fn visit_unary_expr(&mut self, data: &UnaryData) -> String {
        parenthesize!(self, &data.operator.lexeme, &data.expr)
    }

    fn visit_variable_expr(&mut self, data: &VariableData) -> String {
        data.name.lexeme.clone()
    }
}

impl StmtVisitor<String> for ASTPrinter {
    fn visit_block_stmt(&mut self, data: &BlockData) -> String {
        let mut string = String::new();
        string += "{";
        for stmt in &data.statements {
            string += " ";
            string += &stmt.accept(self);
        }
        string += " }";
        string
    }

    fn visit_class_stmt(&mut self, data: &ClassData) -> String {
        let mut string = String::new();
        string += "(class ";
        string += &data.name.lexeme;
        if let Some(superclass) = &data.superclass {
            string += " < ";
            string += &superclass.name.lexeme;
        }
        for method in &data.methods {
            string += " ";
            string += &self.visit_function_stmt(method);
        }
        string += ")";
        string
    }

    fn visit_expression_stmt(&mut self, data: &ExpressionData) -> String {
        parenthesize!(self, "expr", data.expr)
    }

    fn visit_function_stmt(&mut self, data: &Rc<FunctionData>) -> String {
        let mut string = String::new();
        string += "(fun ";
        string += &data.name.lexeme;
        string += "(";
        for param in &data.params {
            string += &param.lexeme;
            string += " ";
        }
        string = string.trim_end().to_string();
        string += ") { ";
        string += &data.body.iter().map(|stmt| stmt.accept(self)).collect::<Vec<String>>().join(" ");
        string += " })";
        string
    }

    fn visit_if_stmt(&mut self, data: &IfData) -> String {
        let mut string = String::new();
        string += "(if ";
        string += &data.condition.accept(self);
        string += " ";
        string += &data.then_branch.accept(self);
        if let Some(else_branch) = &data.else_branch {
            string += " else ";
            string += &else_branch.accept(self);
        }
        string += ")";
        string
    }

    fn visit_print_stmt(&mut self, data: &PrintData) -> String {
        parenthesize!(self, "print", data.expr)
    }

    fn visit_return_stmt(&mut self, data: &ReturnData) -> String {
        parenthesize!(self, "return", data.value)
    }

    fn visit_var_stmt(&mut self, data: &VarData) -> String {
        let mut string = String::new();
        string += "(var ";
        string += &data.name.lexeme;
        if let Some(initializer) = &data.initializer {
            string += " = ";
            string += &initializer.accept(self);
        }
        string += ")";
        string
    }

    fn visit_while_stmt(&mut self, data: &WhileData) -> String {
        parenthesize!(self, "while", data.condition, data.body)
    }
}
