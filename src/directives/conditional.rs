//! `if`: keep or drop the containing block.

use crate::context::Context;
use crate::directive::{Directive, Outcome, Processor};
use crate::error::{Error, Result};
use crate::expr::Program;
use crate::interpolate::{contains_interpolation, interpolate_string};
use crate::stack::Stack;
use crate::value::{Mapping, Value};

use super::literal_bool;

const COMPARISONS: [&str; 6] = ["==", "!=", "<=", ">=", "<", ">"];

#[derive(Debug, Clone)]
pub struct Conditional {
    keyword: String,
}

impl Conditional {
    pub fn new(keyword: impl Into<String>) -> Self {
        Conditional {
            keyword: keyword.into(),
        }
    }
}

impl Directive for Conditional {
    fn handle(
        &self,
        _processor: &dyn Processor,
        ctx: &Context,
        _block: &Mapping,
        value: &Value,
    ) -> Result<Outcome> {
        let path = ctx.directive_path(&self.keyword);
        let keep = evaluate_condition(&ctx.stack(), value, &path)?;
        tracing::trace!(path = %path, keep, "condition evaluated");
        if keep {
            Ok(Outcome::proceed())
        } else {
            Ok(Outcome::omit())
        }
    }
}

/// Judge a condition value.
///
/// Booleans, numbers and null are taken at face value. Strings are boolean
/// literals or expressions; `${...}` spans are interpolated first and a
/// literal result decides directly.
pub fn evaluate_condition(stack: &Stack, condition: &Value, path: &str) -> Result<bool> {
    let text = match condition {
        Value::Boolean(b) => return Ok(*b),
        Value::Null => return Ok(false),
        Value::Integer(i) => return Ok(*i != 0),
        Value::Float(f) => return Ok(*f != 0.0),
        Value::String(s) => s,
        other => {
            return Err(Error::type_mismatch(
                format!("unsupported condition type: {}", other.type_name()),
                path,
            ));
        }
    };

    if let Some(b) = literal_bool(text) {
        return Ok(b);
    }

    let source = if contains_interpolation(text) {
        let interpolated = interpolate_string(stack, text, path)?;
        if let Some(b) = literal_bool(&interpolated) {
            return Ok(b);
        }
        quote_unquoted_comparisons(&interpolated)
    } else {
        text.clone()
    };

    let env = stack.all();
    let program = Program::compile(&source, &env).map_err(|source_err| Error::Expression {
        action: "compiling",
        expression: source.clone(),
        path: path.to_string(),
        source: source_err,
    })?;
    let result = program.run(&env).map_err(|source_err| Error::Expression {
        action: "evaluating",
        expression: source.clone(),
        path: path.to_string(),
        source: source_err,
    })?;
    Ok(result.is_truthy())
}

/// Quote bare words on either side of the first comparison operator, so an
/// interpolated `active == active` compares strings.
///
/// Operands that are quoted already, numeric, or contain `.` or `(` are
/// left alone. Expressions with more than one operator are returned as is.
pub fn quote_unquoted_comparisons(expr: &str) -> String {
    let Some(op) = COMPARISONS.iter().find(|op| expr.contains(**op)) else {
        return expr.to_string();
    };
    let parts: Vec<&str> = expr.split(op).collect();
    if parts.len() != 2 {
        return expr.to_string();
    }
    let left = quote_operand(parts[0].trim());
    let right = quote_operand(parts[1].trim());
    format!("{} {} {}", left, op, right)
}

fn quote_operand(operand: &str) -> String {
    if is_quoted(operand)
        || operand.contains('.')
        || operand.contains('(')
        || operand.parse::<f64>().is_ok()
    {
        operand.to_string()
    } else {
        format!("'{}'", operand)
    }
}

fn is_quoted(s: &str) -> bool {
    s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
}
