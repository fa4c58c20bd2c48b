use std::rc::Rc;

use crate::error::{ParseError, Reporter};
use crate::expr::*;
use crate::literal::Literal;
use crate::stmt::*;
use crate::token::{Token, Type};

type ParseResult<T> = Result<T, ParseError>;

const MAX_ARGS: usize = 255;

/// Returns whether the next token is any of the given types, consuming it
/// if so.
macro_rules! matches_any {
    ( $self:ident, $( $type:expr ),+ ) => {
        {
            if $( $self.check($type) )||* {
                $self.advance();
                true
            } else {
                false
            }
        }
    }
}

/// Recursive-descent parser over this grammar:
///
/// - program    -> declaration* EOF
/// - declaration-> classDecl | funDecl | varDecl | statement
/// - classDecl  -> "class" IDENT ( "<" IDENT )? "{" function* "}"
/// - funDecl    -> "fun" function
/// - function   -> IDENT "(" params? ")" block
/// - params     -> IDENT ( "," IDENT )*
/// - varDecl    -> "var" IDENT ( "=" expression )? ";"
/// - statement  -> exprStmt | forStmt | ifStmt | printStmt | returnStmt | whileStmt | block
/// - block      -> "{" declaration* "}"
/// - exprStmt   -> expression ";"
/// - printStmt  -> "print" expression ";"
/// - returnStmt -> "return" expression? ";"
/// - ifStmt     -> "if" "(" expression ")" statement ( "else" statement )?
/// - whileStmt  -> "while" "(" expression ")" statement
/// - forStmt    -> "for" "(" ( varDecl | exprStmt | ";" ) expression? ";" expression? ")" statement
/// - expression -> assignment
/// - assignment -> ( call "." )? IDENT "=" assignment | logic_or
/// - logic_or   -> logic_and ( "or" logic_and )*
/// - logic_and  -> equality ( "and" equality )*
/// - equality   -> comparison ( ("!="|"==") comparison )*
/// - comparison -> term ( (">"|">="|"<"|"<=") term )*
/// - term       -> factor ( ("-"|"+") factor )*
/// - factor     -> unary ( ("/"|"*") unary )*
/// - unary      -> ("!"|"-") unary | call
/// - call       -> primary ( "(" args? ")" | "." IDENT )*
/// - args       -> expression ( "," expression )*
/// - primary    -> "true"|"false"|"nil"|NUMBER|STRING|"this"|IDENT
///              | "(" expression ")" | "super" "." IDENT
pub struct Parser<'p> {
    tokens: Vec<Token>,
    current: usize,
    reporter: &'p mut dyn Reporter,
}

impl<'p> Parser<'p> {
    pub fn new(tokens: Vec<Token>, reporter: &'p mut dyn Reporter) -> Self {
        Parser { tokens, current: 0, reporter }
    }

    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        statements
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().r#type == Type::EOF
    }

    fn check(&self, r#type: Type) -> bool {
        !self.is_at_end() && self.peek().r#type == r#type
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn consume(&mut self, r#type: Type, message: &str) -> ParseResult<Token> {
        if self.check(r#type) {
            return Ok(self.advance().clone());
        }

        Err(ParseError { token: self.peek().clone(), message: message.to_string() })
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if matches_any!(self, Type::Class) {
            self.class_declaration()
        } else if matches_any!(self, Type::Fun) {
            self.function("function").map(Stmt::Function)
        } else if matches_any!(self, Type::Var) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                self.reporter.error_at_token(&error.token, &error.message);
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect class name.")?;

        let superclass = if matches_any!(self, Type::Less) {
            self.consume(Type::Identifier, "Expect superclass name.")?;
            Some(VariableData::new(self.previous().clone()))
        } else {
            None
        };

        self.consume(Type::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        while !self.check(Type::RightBrace) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(Type::RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class(ClassData { name, superclass, methods }))
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect variable name.")?;

        let initializer = if matches_any!(self, Type::Equal) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(Type::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var(VarData { name, initializer }))
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if matches_any!(self, Type::For) {
            return self.for_statement();
        }
        if matches_any!(self, Type::If) {
            return self.if_statement();
        }
        if matches_any!(self, Type::Print) {
            return self.print_statement();
        }
        if matches_any!(self, Type::Return) {
            return self.return_statement();
        }
        if matches_any!(self, Type::While) {
            return self.while_statement();
        }
        if matches_any!(self, Type::LeftBrace) {
            return Ok(Stmt::Block(BlockData { statements: self.block()? }));
        }

        self.expression_statement()
    }

    /// Desugars into a `Block` containing the initializer (if any) and a
    /// `While` whose body is a block of the original body plus the
    /// increment (if any). No dedicated loop node exists at runtime.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if matches_any!(self, Type::Semicolon) {
            None
        } else if matches_any!(self, Type::Var) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(Type::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(Type::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(Type::RightParen) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(Type::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(BlockData {
                statements: vec![body, Stmt::Expression(ExpressionData { expr: increment })],
            });
        }

        body = Stmt::While(WhileData {
            condition: condition.unwrap_or(Expr::Literal(Literal::Bool(true))),
            body: Box::new(body),
        });

        if let Some(initializer) = initializer {
            body = Stmt::Block(BlockData { statements: vec![initializer, body] });
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if matches_any!(self, Type::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If(IfData { condition, then_branch, else_branch }))
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(PrintData { expr }))
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        let value = if !self.check(Type::Semicolon) {
            self.expression()?
        } else {
            Expr::Literal(Literal::Nil)
        };

        self.consume(Type::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return(ReturnData { keyword, value }))
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);

        Ok(Stmt::While(WhileData { condition, body }))
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(ExpressionData { expr }))
    }

    fn function(&mut self, kind: &str) -> ParseResult<Rc<FunctionData>> {
        let name = self.consume(Type::Identifier, &format!("Expect {kind} name."))?;

        self.consume(Type::LeftParen, &format!("Expect '(' after {kind} name."))?;

        let mut params = Vec::new();
        if !self.check(Type::RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    self.reporter.error_at_token(self.peek(), "Can't have more than 255 parameters.");
                }
                params.push(self.consume(Type::Identifier, "Expect parameter name.")?);

                if !matches_any!(self, Type::Comma) {
                    break;
                }
            }
        }
        self.consume(Type::RightParen, "Expect ')' after parameters.")?;

        self.consume(Type::LeftBrace, &format!("Expect '{{' before {kind} body."))?;
        let body = self.block()?;

        Ok(Rc::new(FunctionData { name, params, body }))
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(Type::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(Type::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if matches_any!(self, Type::Equal) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable(data) => Ok(Expr::Assign(AssignData {
                    name: data.name,
                    value: Box::new(value),
                    depth: data.depth,
                })),
                Expr::Get(data) => {
                    Ok(Expr::Set(SetData { object: data.object, name: data.name, value: Box::new(value) }))
                }
                _ => {
                    self.reporter.error_at_token(&equals, "Invalid assignment target.");
                    Ok(expr)
                }
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while matches_any!(self, Type::Or) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(LogicalData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while matches_any!(self, Type::And) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(LogicalData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;

        while matches_any!(self, Type::BangEqual, Type::EqualEqual) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;

        while matches_any!(self, Type::Greater, Type::GreaterEqual, Type::Less, Type::LessEqual) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;

        while matches_any!(self, Type::Minus, Type::Plus) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while matches_any!(self, Type::Slash, Type::Star) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if matches_any!(self, Type::Bang, Type::Minus) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary(UnaryData { operator, expr: Box::new(right) }));
        }

        self.call()
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(Type::RightParen) {
            loop {
                if arguments.len() >= MAX_ARGS {
                    self.reporter.error_at_token(self.peek(), "Can't have more than 255 arguments.");
                }
                arguments.push(self.expression()?);

                if !matches_any!(self, Type::Comma) {
                    break;
                }
            }
        }

        let paren = self.consume(Type::RightParen, "Expect ')' after arguments.")?;

        Ok(Expr::Call(CallData { callee: Box::new(callee), paren, arguments }))
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if matches_any!(self, Type::LeftParen) {
                expr = self.finish_call(expr)?;
            } else if matches_any!(self, Type::Dot) {
                let name = self.consume(Type::Identifier, "Expect property name after '.'.")?;
                expr = Expr::Get(GetData { object: Box::new(expr), name });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if matches_any!(self, Type::False) {
            return Ok(Expr::Literal(Literal::Bool(false)));
        }
        if matches_any!(self, Type::True) {
            return Ok(Expr::Literal(Literal::Bool(true)));
        }
        if matches_any!(self, Type::Nil) {
            return Ok(Expr::Literal(Literal::Nil));
        }
        if matches_any!(self, Type::Number, Type::String) {
            let literal = self
                .previous()
                .literal
                .clone()
                .expect("a NUMBER or STRING token to carry a decoded literal");
            return Ok(Expr::Literal(literal));
        }
        if matches_any!(self, Type::Super) {
            let keyword = self.previous().clone();
            self.consume(Type::Dot, "Expect '.' after 'super'.")?;
            let method = self.consume(Type::Identifier, "Expect superclass method name.")?;
            return Ok(Expr::Super(SuperData { keyword, method, depth: std::cell::Cell::new(None) }));
        }
        if matches_any!(self, Type::This) {
            return Ok(Expr::This(ThisData { keyword: self.previous().clone(), depth: std::cell::Cell::new(None) }));
        }
        if matches_any!(self, Type::Identifier) {
            return Ok(Expr::Variable(VariableData::new(self.previous().clone())));
        }
        if matches_any!(self, Type::LeftParen) {
            let expr = self.expression()?;
            self.consume(Type::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(GroupingData { expr: Box::new(expr) }));
        }

        Err(ParseError { token: self.peek().clone(), message: "Expect expression.".to_string() })
    }

    /// Advances past tokens until a `;` is consumed or the next token
    /// begins a new statement, so one bad statement doesn't suppress
    /// parsing of the rest of the program.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().r#type == Type::Semicolon {
                return;
            }

            match self.peek().r#type {
                Type::Class | Type::Fun | Type::Var | Type::For
                | Type::If | Type::While | Type::Print | Type::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectingReporter;
    use crate::scanner::Scanner;

    fn parse(source: &str) -> (Vec<Stmt>, CollectingReporter) {
        let mut reporter = CollectingReporter::default();
        let tokens = Scanner::new(source).scan_tokens(&mut reporter);
        let statements = Parser::new(tokens, &mut reporter).parse();
        (statements, reporter)
    }

    #[test]
    fn for_loop_desugars_to_block_with_while() {
        let (stmts, reporter) = parse("for (var i = 0; i < 3; i = i + 1) print i;");
        assert!(!reporter.had_error());
        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Stmt::Block(data) => {
                assert_eq!(data.statements.len(), 2);
                assert!(matches!(data.statements[0], Stmt::Var(_)));
                assert!(matches!(data.statements[1], Stmt::While(_)));
            }
            other => panic!("expected a block, got {other:?}"),
        }
    }

    #[test]
    fn missing_semicolon_reports_and_recovers() {
        let (stmts, reporter) = parse("print 1 print 2;");
        assert!(reporter.had_error());
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn invalid_assignment_target_is_non_fatal() {
        let (stmts, reporter) = parse("1 = 2;");
        assert!(reporter.had_error());
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn class_with_superclass_parses() {
        let (stmts, reporter) = parse("class A {} class B < A {}");
        assert!(!reporter.had_error());
        assert_eq!(stmts.len(), 2);
        match &stmts[1] {
            Stmt::Class(data) => assert!(data.superclass.is_some()),
            other => panic!("expected a class, got {other:?}"),
        }
    }
}
