use rocks_lang::literal::Literal;
use rocks_lang::token::{Token, Type};

#[test]
fn create_token() {
    let token = Token::new(Type::LeftParen, "(".to_string(), None, 3);

    assert_eq!(token.r#type, Type::LeftParen);
    assert_eq!(token.lexeme, "(");
    assert_eq!(token.literal, None);
    assert_eq!(token.line, 3);
}

#[test]
fn create_token_with_a_literal() {
    let token = Token::new(Type::Number, "1".to_string(), Some(Literal::Number(1.0)), 1);

    assert_eq!(token.r#type, Type::Number);
    assert_eq!(token.literal, Some(Literal::Number(1.0)));
}

#[test]
fn display_token() {
    let token = Token::new(Type::LeftParen, "(".to_string(), None, 3);

    assert_eq!(format!("{token}"), "LeftParen ( None");
}

#[test]
fn display_token_with_a_literal() {
    let token = Token::new(Type::String, "\"a\"".to_string(), Some(Literal::String("a".to_string())), 1);

    assert_eq!(format!("{token}"), "String \"a\" Some(String(\"a\"))");
}

#[test]
fn tokens_with_the_same_fields_are_equal() {
    let a = Token::new(Type::Identifier, "foo".to_string(), None, 1);
    let b = Token::new(Type::Identifier, "foo".to_string(), None, 1);

    assert_eq!(a, b);
}

#[test]
fn tokens_differing_only_in_line_are_not_equal() {
    let a = Token::new(Type::Semicolon, ";".to_string(), None, 1);
    let b = Token::new(Type::Semicolon, ";".to_string(), None, 2);

    assert_ne!(a, b);
}
