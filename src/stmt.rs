use std::rc::Rc;

use crate::expr::{Expr, VariableData};
use crate::token::Token;

/// A function's declaration-time shape: name, parameters and body. Shared
/// (via `Rc`) between the `Stmt::Function` node the parser produced and
/// every runtime `Function` value the interpreter later builds from it, so
/// calling a function repeatedly never re-copies its body.
#[derive(Debug)]
pub struct FunctionData {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Debug)]
pub struct BlockData {
    pub statements: Vec<Stmt>,
}

#[derive(Debug)]
pub struct ClassData {
    pub name: Token,
    pub superclass: Option<VariableData>,
    pub methods: Vec<Rc<FunctionData>>,
}

#[derive(Debug)]
pub struct ExpressionData {
    pub expr: Expr,
}

#[derive(Debug)]
pub struct IfData {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
}

#[derive(Debug)]
pub struct PrintData {
    pub expr: Expr,
}

#[derive(Debug)]
pub struct ReturnData {
    pub keyword: Token,
    pub value: Expr,
}

#[derive(Debug)]
pub struct VarData {
    pub name: Token,
    pub initializer: Option<Expr>,
}

#[derive(Debug)]
pub struct WhileData {
    pub condition: Expr,
    pub body: Box<Stmt>,
}

/// A statement node. Like `Expr`, each variant holds the data of its
/// production and dispatches through `StmtVisitor`.
#[derive(Debug)]
pub enum Stmt {
    Block(BlockData),
    Class(ClassData),
    Expression(ExpressionData),
    Function(Rc<FunctionData>),
    If(IfData),
    Print(PrintData),
    Return(ReturnData),
    Var(VarData),
    While(WhileData),
}

impl Stmt {
    pub fn accept<T>(&self, visitor: &mut dyn StmtVisitor<T>) -> T {
        match self {
            Stmt::Block(data) => visitor.visit_block_stmt(data),
            Stmt::Class(data) => visitor.visit_class_stmt(data),
            Stmt::Expression(data) => visitor.visit_expression_stmt(data),
            Stmt::Function(data) => visitor.visit_function_stmt(data),
            Stmt::If(data) => visitor.visit_if_stmt(data),
            Stmt::Print(data) => visitor.visit_print_stmt(data),
            Stmt::Return(data) => visitor.visit_return_stmt(data),
            Stmt::Var(data) => visitor.visit_var_stmt(data),
            Stmt::While(data) => visitor.visit_while_stmt(data),
        }
    }
}

pub trait StmtVisitor<T> {
    fn visit_block_stmt(&mut self, data: &BlockData) -> T;
    fn visit_class_stmt(&mut self, data: &ClassData) -> T;
    fn visit_expression_stmt(&mut self, data: &ExpressionData) -> T;
    fn visit_function_stmt(&mut self, data: &Rc<FunctionData>) -> T;
    fn visit_if_stmt(&mut self, data: &IfData) -> T;
    fn visit_print_stmt(&mut self, data: &PrintData) -> T;
    fn visit_return_stmt(&mut self, data: &ReturnData) -> T;
    fn visit_var_stmt(&mut self, data: &VarData) -> T;
    fn visit_while_stmt(&mut self, data: &WhileData) -> T;
}
