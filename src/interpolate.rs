//! `${...}` substitution in string scalars.
//!
//! Each span is compiled as an expression against the visible bindings. When
//! compilation fails (a key such as `${build-id}` that is not a valid
//! identifier, or a name nothing binds) the span falls back to a plain path
//! lookup. A string that consists of exactly one span keeps the native type
//! of its result, so `${replicas}` stays an integer and `${maybe}` can be
//! null.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{Error, Result};
use crate::expr::Program;
use crate::stack::Stack;
use crate::value::{Mapping, Value};

static INTERPOLATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("Invalid interpolation pattern"));

pub fn contains_interpolation(s: &str) -> bool {
    s.contains("${") && s.contains('}')
}

/// The inner expression when `s` is exactly one `${...}` span.
fn single_expression(s: &str) -> Option<&str> {
    let caps = INTERPOLATION.captures(s)?;
    let whole = caps.get(0)?;
    if whole.start() == 0 && whole.end() == s.len() {
        caps.get(1).map(|m| m.as_str())
    } else {
        None
    }
}

fn evaluate(stack: &Stack, env: &Mapping, expression: &str, path: &str) -> Result<Value> {
    let expression = expression.trim();
    match Program::compile(expression, env) {
        Ok(program) => program.run(env).map_err(|source| Error::Expression {
            action: "evaluating",
            expression: expression.to_string(),
            path: path.to_string(),
            source,
        }),
        Err(_) => match stack.resolve(expression) {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(Error::undefined(expression, path)),
        },
    }
}

/// Replace every span with the text of its value; null renders as `null`.
///
/// Undefined references are an error located at `path`.
pub fn interpolate_string(stack: &Stack, s: &str, path: &str) -> Result<String> {
    if !contains_interpolation(s) {
        return Ok(s.to_string());
    }

    let env = stack.all();
    let mut result = String::with_capacity(s.len());
    let mut last = 0;
    for caps in INTERPOLATION.captures_iter(s) {
        let (whole, inner) = match (caps.get(0), caps.get(1)) {
            (Some(whole), Some(inner)) => (whole, inner),
            _ => continue,
        };
        result.push_str(&s[last..whole.start()]);
        let value = evaluate(stack, &env, inner.as_str(), path)?;
        result.push_str(&value.as_string());
        last = whole.end();
    }
    result.push_str(&s[last..]);
    Ok(result)
}

/// Interpolate preserving the native type of a single-span string.
pub fn interpolate_value(stack: &Stack, s: &str, path: &str) -> Result<Value> {
    if !contains_interpolation(s) {
        return Ok(Value::String(s.to_string()));
    }
    if let Some(expression) = single_expression(s) {
        return evaluate(stack, &stack.all(), expression, path);
    }
    interpolate_string(stack, s, path).map(Value::String)
}

/// Lenient interpolation using plain path lookups.
///
/// If any referenced path is undefined or null the whole result is null
/// instead of an error.
pub fn interpolate_permissive(stack: &Stack, s: &str) -> Value {
    if !contains_interpolation(s) {
        return Value::String(s.to_string());
    }
    if let Some(expression) = single_expression(s) {
        return stack.resolve(expression.trim()).unwrap_or(Value::Null);
    }

    let mut missing = false;
    let text = INTERPOLATION.replace_all(s, |caps: &Captures| {
        match caps.get(1).and_then(|m| stack.resolve(m.as_str().trim())) {
            Some(value) if !value.is_null() => value.as_string(),
            _ => {
                missing = true;
                String::new()
            }
        }
    });
    if missing {
        Value::Null
    } else {
        Value::String(text.into_owned())
    }
}
