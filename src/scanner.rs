use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};
use substring::Substring;

use crate::error::Reporter;
use crate::literal::Literal;
use crate::token::{Token, Type};

/// Sentinel returned by `peek`/`peek_next` once the source is exhausted, so
/// every digit/alpha/whitespace check can run uniformly up to and past EOF
/// without a `None` branch at every call site.
const EOF_SENTINEL: char = '\0';

pub struct Scanner<'a> {
    source: &'a str,
    chars: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            source,
            chars: source.chars().peekmore(),
            tokens: vec![],
            start: 0,
            current: 0,
            line: 1,
        }
    }

    /// Scans the whole source and returns every token, including a trailing
    /// EOF whose line equals the final line count.
    pub fn scan_tokens(mut self, reporter: &mut dyn Reporter) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token(reporter);
        }

        self.tokens.push(Token::new(Type::EOF, String::new(), None, self.line));
        self.tokens
    }

    fn advance(&mut self) -> char {
        let c = self.chars.next().unwrap_or(EOF_SENTINEL);
        if c != EOF_SENTINEL {
            self.current += 1;
        }
        c
    }

    fn peek(&mut self) -> char {
        *self.chars.peek().unwrap_or(&EOF_SENTINEL)
    }

    fn peek_next(&mut self) -> char {
        *self.chars.peek_next().unwrap_or(&EOF_SENTINEL)
    }

    fn match_next(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn lexeme(&self) -> String {
        self.source.substring(self.start, self.current).to_string()
    }

    fn add_token(&mut self, r#type: Type, literal: Option<Literal>) {
        self.tokens.push(Token::new(r#type, self.lexeme(), literal, self.line));
    }

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    fn string(&mut self, reporter: &mut dyn Reporter) {
        let start_line = self.line;

        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            reporter.error(start_line, "Unterminated string.");
            return;
        }

        self.advance(); // closing quote

        let value = self.source.substring(self.start + 1, self.current - 1).to_string();
        self.add_token(Type::String, Some(Literal::String(value)));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // A trailing `.` with no following digit is not part of the
        // number; leave it for the next scan_token call to tokenize on its
        // own (the parser is then free to report whatever is wrong about
        // what follows).
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume the dot
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let value: f64 = self.lexeme().parse().expect("scanned digits must parse as f64");
        self.add_token(Type::Number, Some(Literal::Number(value)));
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let token_type = match self.lexeme().as_str() {
            "and" => Type::And,
            "class" => Type::Class,
            "else" => Type::Else,
            "false" => Type::False,
            "for" => Type::For,
            "fun" => Type::Fun,
            "if" => Type::If,
            "nil" => Type::Nil,
            "or" => Type::Or,
            "print" => Type::Print,
            "return" => Type::Return,
            "super" => Type::Super,
            "this" => Type::This,
            "true" => Type::True,
            "var" => Type::Var,
            "while" => Type::While,
            _ => Type::Identifier,
        };

        self.add_token(token_type, None);
    }

    fn scan_token(&mut self, reporter: &mut dyn Reporter) {
        let c = self.advance();
        match c {
            '(' => self.add_token(Type::LeftParen, None),
            ')' => self.add_token(Type::RightParen, None),
            '{' => self.add_token(Type::LeftBrace, None),
            '}' => self.add_token(Type::RightBrace, None),
            ',' => self.add_token(Type::Comma, None),
            '.' => self.add_token(Type::Dot, None),
            '-' => self.add_token(Type::Minus, None),
            '+' => self.add_token(Type::Plus, None),
            ';' => self.add_token(Type::Semicolon, None),
            '*' => self.add_token(Type::Star, None),

            '!' => {
                let r#type = if self.match_next('=') { Type::BangEqual } else { Type::Bang };
                self.add_token(r#type, None);
            }
            '=' => {
                let r#type = if self.match_next('=') { Type::EqualEqual } else { Type::Equal };
                self.add_token(r#type, None);
            }
            '<' => {
                let r#type = if self.match_next('=') { Type::LessEqual } else { Type::Less };
                self.add_token(r#type, None);
            }
            '>' => {
                let r#type = if self.match_next('=') { Type::GreaterEqual } else { Type::Greater };
                self.add_token(r#type, None);
            }
            '/' => {
                if self.match_next('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(Type::Slash, None);
                }
            }

            ' ' | '\r' | '\t' => {}

            '\n' => {
                self.line += 1;
            }

            '"' => self.string(reporter),

            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.identifier(),

            c => reporter.error(self.line, &format!("Unexpected character '{c}'.")),
        }
    }
}
