//! `for`: repeat a block once per element of a sequence.
//!
//! ```yaml
//! services:
//!   - for: "(i, svc) in services"
//!     name: "${svc.name}-${i}"
//! ```

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::context::Context;
use crate::directive::{Directive, Outcome, Processor, without_key};
use crate::error::{Error, Result};
use crate::value::{Mapping, Value};

static VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid loop variable pattern"));

/// Name bound to each element when `for` is given a literal sequence.
pub const IMPLICIT_VARIABLE: &str = "item";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForLoopError {
    #[error("no ' in ' found in for expression")]
    MissingIn,
    #[error("missing closing parenthesis")]
    UnclosedParen,
    #[error("trailing comma in variable list")]
    TrailingComma,
    #[error("empty variable name in list")]
    EmptyVariable,
    #[error("invalid variable name '{0}'")]
    InvalidVariable(String),
    #[error("no source expression found")]
    MissingSource,
}

/// A parsed loop header: `item in items` or `(idx, item) in items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForLoopSpec {
    /// Binding names in order; `_` binds nothing.
    pub variables: Vec<String>,
    /// Path expression naming the sequence.
    pub source: String,
}

impl ForLoopSpec {
    pub fn parse(expr: &str) -> std::result::Result<Self, ForLoopError> {
        let split = find_in_keyword(expr).ok_or(ForLoopError::MissingIn)?;
        let head = expr[..split].trim();
        let source = expr[split + 4..].trim();

        let variables = match head.strip_prefix('(') {
            Some(list) => {
                let list = list.strip_suffix(')').ok_or(ForLoopError::UnclosedParen)?;
                if list.trim_end().ends_with(',') {
                    return Err(ForLoopError::TrailingComma);
                }
                list.split(',')
                    .map(|name| check_variable(name.trim()))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                if head.ends_with(',') {
                    return Err(ForLoopError::TrailingComma);
                }
                vec![check_variable(head)?]
            }
        };

        if source.is_empty() {
            return Err(ForLoopError::MissingSource);
        }

        Ok(ForLoopSpec {
            variables,
            source: source.to_string(),
        })
    }

    /// The frame for element `index`. Exactly two variables bind the index
    /// and the element; any other count binds the element to every name.
    pub fn bindings(&self, index: usize, item: Value) -> Mapping {
        let mut frame = Mapping::new();
        match self.variables.as_slice() {
            [index_name, item_name] => {
                bind(&mut frame, index_name, Value::Integer(index as i64));
                bind(&mut frame, item_name, item);
            }
            names => {
                for name in names {
                    bind(&mut frame, name, item.clone());
                }
            }
        }
        frame
    }

    fn implicit() -> Self {
        ForLoopSpec {
            variables: vec![IMPLICIT_VARIABLE.to_string()],
            source: String::new(),
        }
    }
}

fn bind(frame: &mut Mapping, name: &str, value: Value) {
    if name != "_" {
        frame.insert(name.to_string(), value);
    }
}

fn check_variable(name: &str) -> std::result::Result<String, ForLoopError> {
    if name.is_empty() {
        Err(ForLoopError::EmptyVariable)
    } else if VARIABLE.is_match(name) {
        Ok(name.to_string())
    } else {
        Err(ForLoopError::InvalidVariable(name.to_string()))
    }
}

/// Byte offset of the first ` in ` outside parentheses.
fn find_in_keyword(expr: &str) -> Option<usize> {
    let bytes = expr.as_bytes();
    let mut depth = 0i32;
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth -= 1,
            b' ' if depth == 0 && bytes[i..].starts_with(b" in ") => return Some(i),
            _ => {}
        }
    }
    None
}

#[derive(Debug, Clone)]
pub struct Iteration {
    keyword: String,
}

impl Iteration {
    pub fn new(keyword: impl Into<String>) -> Self {
        Iteration {
            keyword: keyword.into(),
        }
    }
}

impl Directive for Iteration {
    fn handle(
        &self,
        processor: &dyn Processor,
        ctx: &Context,
        block: &Mapping,
        value: &Value,
    ) -> Result<Outcome> {
        let path = ctx.directive_path(&self.keyword);
        let (spec, items) = match value {
            Value::Sequence(items) => (ForLoopSpec::implicit(), items.clone()),
            Value::String(expr) => {
                let spec = ForLoopSpec::parse(expr).map_err(|err| {
                    Error::syntax(format!("invalid for expression '{}': {}", expr, err), &path)
                })?;
                let source = ctx
                    .stack()
                    .resolve(&spec.source)
                    .ok_or_else(|| Error::undefined(&spec.source, &path))?;
                match source {
                    Value::Sequence(items) => (spec, items),
                    other => {
                        return Err(Error::type_mismatch(
                            format!(
                                "for: variable '{}' must be a sequence, got {}",
                                spec.source,
                                other.type_name()
                            ),
                            &path,
                        ));
                    }
                }
            }
            other => {
                return Err(Error::type_mismatch(
                    format!("for: expected a sequence or loop expression, got {}", other.type_name()),
                    &path,
                ));
            }
        };

        let template = without_key(block, &self.keyword);
        let mut results = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let _scope = ctx.push_scope(spec.bindings(index, item));
            let item_ctx = ctx.append_path(&format!("[{}]", index));
            if let Some(expanded) = processor.process_map_with_context(&item_ctx, &template)? {
                results.push(expanded);
            }
        }

        tracing::debug!(path = %ctx.path(), source = %spec.source, items = results.len(), "for expanded");
        Ok(Outcome::replace(Value::Sequence(results)))
    }
}
