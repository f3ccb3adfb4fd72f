//! # Embedded expression language
//!
//! Conditions (`if: "env == 'prod'"`) and `${...}` substitutions are written
//! in a small expression language:
//!
//! ```text
//! item.name                       field access
//! items[0], config["log-level"]   indexing (negative indices count from the end)
//! count * 2 + 1                   arithmetic, integer results preserved
//! os == "linux" && arch != "arm"  comparison and logic (also and / or / not)
//! "x" in tags, key not in map     membership
//! port ?? 8080                    null coalescing
//! debug ? "v" : ""                ternary
//! upper(name), name.upper()       builtin functions
//! ```
//!
//! A [`Program`] is compiled against an environment: identifiers that the
//! environment does not bind are rejected at compile time, which lets callers
//! fall back to plain path lookup for keys that are not valid identifiers.

pub mod ast;
pub mod builtins;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod tokens;

use thiserror::Error;

pub use ast::{BinOp, Expr, UnaryOp};
pub use evaluator::{EvalError, Evaluator};
pub use lexer::{LexError, Lexer, Position};
pub use parser::{ParseError, Parser};
pub use tokens::Token;

use crate::value::{Mapping, Value};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unknown name '{0}'")]
    UnknownName(String),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// A parsed, ready to run expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    source: String,
    ast: Expr,
}

impl Program {
    /// Parse without checking names.
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        let mut parser = Parser::new(Lexer::new(source))?;
        let ast = parser.parse()?;
        Ok(Program {
            source: source.to_string(),
            ast,
        })
    }

    /// Parse and verify that every free identifier is bound in `env`.
    pub fn compile(source: &str, env: &Mapping) -> Result<Self, ExpressionError> {
        let program = Self::parse(source)?;
        if let Some(name) = program.ast.identifiers().into_iter().find(|n| !env.contains_key(*n)) {
            return Err(ExpressionError::UnknownName(name.to_string()));
        }
        Ok(program)
    }

    pub fn run(&self, env: &Mapping) -> Result<Value, ExpressionError> {
        Ok(Evaluator::new(env).eval(&self.ast)?)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }
}

/// Compile and run `source` against `env` in one step.
pub fn eval(source: &str, env: &Mapping) -> Result<Value, ExpressionError> {
    Program::compile(source, env)?.run(env)
}
