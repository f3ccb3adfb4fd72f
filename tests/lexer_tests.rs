// tests/lexer_tests.rs

use yamlexpr::expr::{Lexer, Token};

fn tokens(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize().unwrap()
}

// ============================================================================
// Single Character Tokens
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("+", Token::Plus),
        ("-", Token::Minus),
        ("*", Token::Star),
        ("/", Token::Slash),
        ("%", Token::Percent),
        ("(", Token::LParen),
        (")", Token::RParen),
        ("[", Token::LBracket),
        ("]", Token::RBracket),
        ("{", Token::LBrace),
        ("}", Token::RBrace),
        (".", Token::Dot),
        (",", Token::Comma),
        (":", Token::Colon),
        ("<", Token::Lt),
        (">", Token::Gt),
        ("!", Token::Not),
        ("?", Token::Question),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token, expected, "input: {}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

// ============================================================================
// Multi Character Operators
// ============================================================================

#[test]
fn test_two_char_operators() {
    let test_cases = vec![
        ("==", Token::EqEq),
        ("!=", Token::NotEq),
        ("<=", Token::LtEq),
        (">=", Token::GtEq),
        ("&&", Token::And),
        ("||", Token::Or),
        ("??", Token::QuestionQuestion),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.next_token().unwrap(), expected, "input: {}", input);
    }
}

#[test]
fn test_single_equals_is_rejected() {
    let mut lexer = Lexer::new("a = b");
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("a".into()));
    let err = lexer.next_token().unwrap_err();
    assert!(err.message.contains("did you mean '=='"));
    assert_eq!(err.position, 2);
}

#[test]
fn test_lone_ampersand_and_pipe_are_rejected() {
    assert!(Lexer::new("&").next_token().is_err());
    assert!(Lexer::new("|").next_token().is_err());
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_numbers() {
    assert_eq!(tokens("42"), vec![Token::Integer(42), Token::Eof]);
    assert_eq!(tokens("3.25"), vec![Token::Float(3.25), Token::Eof]);
    assert_eq!(tokens("1_000"), vec![Token::Integer(1000), Token::Eof]);
}

#[test]
fn test_number_followed_by_member() {
    // a dot not followed by a digit ends the number
    assert_eq!(
        tokens("1.abs"),
        vec![
            Token::Integer(1),
            Token::Dot,
            Token::Identifier("abs".into()),
            Token::Eof
        ]
    );
}

#[test]
fn test_strings_with_both_quotes() {
    assert_eq!(tokens("'linux'"), vec![Token::String("linux".into()), Token::Eof]);
    assert_eq!(tokens("\"linux\""), vec![Token::String("linux".into()), Token::Eof]);
    assert_eq!(tokens("\"it's\""), vec![Token::String("it's".into()), Token::Eof]);
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        tokens(r#""a\nb\t\"c\"\\""#),
        vec![Token::String("a\nb\t\"c\"\\".into()), Token::Eof]
    );
    assert!(Lexer::new(r#""bad \q""#).tokenize().is_err());
}

#[test]
fn test_unterminated_string() {
    let err = Lexer::new("'open").tokenize().unwrap_err();
    assert_eq!(err.message, "unterminated string");
}

// ============================================================================
// Keywords and Identifiers
// ============================================================================

#[test]
fn test_word_operators() {
    assert_eq!(
        tokens("a and b or not c in d"),
        vec![
            Token::Identifier("a".into()),
            Token::And,
            Token::Identifier("b".into()),
            Token::Or,
            Token::Not,
            Token::Identifier("c".into()),
            Token::In,
            Token::Identifier("d".into()),
            Token::Eof,
        ]
    );
}

#[test]
fn test_literal_keywords() {
    assert_eq!(
        tokens("true false null nil"),
        vec![
            Token::Boolean(true),
            Token::Boolean(false),
            Token::Null,
            Token::Null,
            Token::Eof
        ]
    );
}

#[test]
fn test_identifiers() {
    assert_eq!(
        tokens("item_2 _private android"),
        vec![
            Token::Identifier("item_2".into()),
            Token::Identifier("_private".into()),
            Token::Identifier("android".into()),
            Token::Eof,
        ]
    );
}

// ============================================================================
// Full Expressions
// ============================================================================

#[test]
fn test_condition_expression() {
    assert_eq!(
        tokens("item.count >= 5 && os != 'windows'"),
        vec![
            Token::Identifier("item".into()),
            Token::Dot,
            Token::Identifier("count".into()),
            Token::GtEq,
            Token::Integer(5),
            Token::And,
            Token::Identifier("os".into()),
            Token::NotEq,
            Token::String("windows".into()),
            Token::Eof,
        ]
    );
}

#[test]
fn test_ternary_and_coalesce() {
    assert_eq!(
        tokens("port ?? 80 > 1 ? 'a' : 'b'"),
        vec![
            Token::Identifier("port".into()),
            Token::QuestionQuestion,
            Token::Integer(80),
            Token::Gt,
            Token::Integer(1),
            Token::Question,
            Token::String("a".into()),
            Token::Colon,
            Token::String("b".into()),
            Token::Eof,
        ]
    );
}
