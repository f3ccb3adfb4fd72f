use std::mem;

use thiserror::Error;

use super::ast::{BinOp, Expr, UnaryOp};
use super::lexer::{LexError, Lexer};
use super::tokens::Token;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("unexpected {0}")]
    Unexpected(String),
}

fn describe(token: &Token) -> String {
    match token {
        Token::Eof => "end of expression".to_string(),
        Token::Identifier(name) => format!("identifier '{}'", name),
        Token::String(s) => format!("string {:?}", s),
        Token::Integer(n) => format!("number {}", n),
        Token::Float(n) => format!("number {}", n),
        other => format!("{:?}", other),
    }
}

/// Recursive descent parser.
///
/// Precedence, lowest first: ternary, `??`, `or`, `and`, comparison and
/// membership, additive, multiplicative, unary, postfix access.
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(ParseError::UnexpectedToken {
                expected: describe(&expected),
                found: describe(&self.current_token),
            });
        }
        self.advance()
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let expr = match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Float(n) => Expr::Float(n),
            Token::Integer(n) => Expr::Integer(n),
            Token::String(s) => Expr::String(s),
            Token::Boolean(b) => Expr::Boolean(b),
            Token::Null => Expr::Null,
            Token::Identifier(name) => {
                self.advance()?;
                if self.check(&Token::LParen) {
                    self.advance()?;
                    let args = self.parse_arguments()?;
                    return Ok(Expr::Call {
                        function: name,
                        args,
                    });
                }
                return Ok(Expr::Identifier(name));
            }
            Token::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                return Ok(expr);
            }
            Token::LBrace => {
                self.advance()?;
                return self.parse_object_literal();
            }
            Token::LBracket => {
                self.advance()?;
                return self.parse_array_literal();
            }
            token => return Err(ParseError::Unexpected(describe(&token))),
        };
        self.advance()?;
        Ok(expr)
    }

    /// Arguments after an opening parenthesis, through the closing one.
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = vec![];
        while !self.check(&Token::RParen) {
            args.push(self.parse_expression()?);
            if !self.check(&Token::RParen) {
                self.expect(Token::Comma)?;
            }
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let mut pairs = vec![];

        while !self.check(&Token::RBrace) {
            let key = match mem::replace(&mut self.current_token, Token::Eof) {
                Token::String(s) | Token::Identifier(s) => s,
                token => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "object key".to_string(),
                        found: describe(&token),
                    });
                }
            };
            self.advance()?;
            self.expect(Token::Colon)?;

            let value = self.parse_expression()?;
            pairs.push((key, value));

            if !self.check(&Token::RBrace) {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::RBrace)?;
        Ok(Expr::Object(pairs))
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let mut elements = vec![];

        while !self.check(&Token::RBracket) {
            elements.push(self.parse_expression()?);

            if !self.check(&Token::RBracket) {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::RBracket)?;
        Ok(Expr::Array(elements))
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check(&Token::LBracket) {
                self.advance()?;
                let index = self.parse_expression()?;
                self.expect(Token::RBracket)?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.check(&Token::Dot) {
                self.advance()?;
                let name = match mem::replace(&mut self.current_token, Token::Eof) {
                    Token::Identifier(n) => n,
                    token => {
                        return Err(ParseError::UnexpectedToken {
                            expected: "field name after '.'".to_string(),
                            found: describe(&token),
                        });
                    }
                };
                self.advance()?;

                if self.check(&Token::LParen) {
                    self.advance()?;
                    let args = self.parse_arguments()?;
                    expr = Expr::MethodCall {
                        object: Box::new(expr),
                        method: name,
                        args,
                    };
                } else {
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property: name,
                    };
                }
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current_token {
            Token::Not => UnaryOp::Not,
            Token::Minus => UnaryOp::Negate,
            Token::Plus => {
                self.advance()?;
                return self.parse_unary();
            }
            _ => return self.parse_postfix(),
        };
        self.advance()?;
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match &self.current_token {
                Token::Star => BinOp::Multiply,
                Token::Slash => BinOp::Divide,
                Token::Percent => BinOp::Modulo,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_unary()?;
            left = Self::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match &self.current_token {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Subtract,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_multiplicative()?;
            left = Self::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_additive()?;

        let op = match &self.current_token {
            Token::EqEq => BinOp::Equal,
            Token::NotEq => BinOp::NotEqual,
            Token::Lt => BinOp::LessThan,
            Token::Gt => BinOp::GreaterThan,
            Token::LtEq => BinOp::LessEqual,
            Token::GtEq => BinOp::GreaterEqual,
            Token::In => BinOp::In,
            Token::Not => {
                self.advance()?;
                if !self.check(&Token::In) {
                    return Err(ParseError::UnexpectedToken {
                        expected: "'in' after 'not'".to_string(),
                        found: describe(&self.current_token),
                    });
                }
                BinOp::NotIn
            }
            _ => return Ok(left),
        };
        self.advance()?;
        let right = self.parse_additive()?;
        Ok(Self::binary(op, left, right))
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;

        while self.check(&Token::And) {
            self.advance()?;
            let right = self.parse_comparison()?;
            left = Self::binary(BinOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;

        while self.check(&Token::Or) {
            self.advance()?;
            let right = self.parse_and()?;
            left = Self::binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_coalesce(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_or()?;

        while self.check(&Token::QuestionQuestion) {
            self.advance()?;
            let right = self.parse_or()?;
            left = Self::binary(BinOp::NullCoalesce, left, right);
        }
        Ok(left)
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_coalesce()?;
        if !self.check(&Token::Question) {
            return Ok(condition);
        }
        self.advance()?;
        let then = self.parse_expression()?;
        self.expect(Token::Colon)?;
        let otherwise = self.parse_expression()?;
        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_conditional()
    }

    /// Parse a complete expression; trailing input is an error.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        self.expect(Token::Eof)?;
        Ok(expr)
    }
}
