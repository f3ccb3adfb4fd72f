//! Builtin functions callable as `name(args)` or as methods `x.name(args)`.

use std::cmp::Ordering;

use super::evaluator::{EvalError, compare_values, contains};
use crate::value::Value;

pub const NAMES: &[&str] = &[
    "len", "upper", "lower", "trim", "split", "join", "hasPrefix", "hasSuffix", "contains", "keys",
    "values", "abs", "int", "float", "string", "first", "last", "min", "max", "sum",
];

pub fn call(name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
    match name {
        "len" => len(&arity(name, args, 1)?[0]),
        "upper" => map_string(name, &arity(name, args, 1)?[0], |s| s.to_uppercase()),
        "lower" => map_string(name, &arity(name, args, 1)?[0], |s| s.to_lowercase()),
        "trim" => map_string(name, &arity(name, args, 1)?[0], |s| s.trim().to_string()),
        "split" => {
            let args = arity(name, args, 2)?;
            split(string_arg(name, &args[0])?, string_arg(name, &args[1])?)
        }
        "join" => join(args),
        "hasPrefix" => {
            let args = arity(name, args, 2)?;
            let (s, prefix) = (string_arg(name, &args[0])?, string_arg(name, &args[1])?);
            Ok(Value::Boolean(s.starts_with(prefix)))
        }
        "hasSuffix" => {
            let args = arity(name, args, 2)?;
            let (s, suffix) = (string_arg(name, &args[0])?, string_arg(name, &args[1])?);
            Ok(Value::Boolean(s.ends_with(suffix)))
        }
        "contains" => {
            let args = arity(name, args, 2)?;
            contains(&args[0], &args[1]).map(Value::Boolean)
        }
        "keys" => match &arity(name, args, 1)?[0] {
            Value::Mapping(map) => Ok(Value::Sequence(
                map.keys().map(|k| Value::String(k.clone())).collect(),
            )),
            other => Err(requires(name, "mapping", other)),
        },
        "values" => match &arity(name, args, 1)?[0] {
            Value::Mapping(map) => Ok(Value::Sequence(map.values().cloned().collect())),
            other => Err(requires(name, "mapping", other)),
        },
        "abs" => match &arity(name, args, 1)?[0] {
            Value::Integer(n) => Ok(Value::Integer(n.saturating_abs())),
            Value::Float(n) => Ok(Value::Float(n.abs())),
            other => Err(requires(name, "number", other)),
        },
        "int" => to_int(&arity(name, args, 1)?[0]),
        "float" => to_float(&arity(name, args, 1)?[0]),
        "string" => Ok(Value::String(arity(name, args, 1)?[0].as_string())),
        "first" => match &arity(name, args, 1)?[0] {
            Value::Sequence(seq) => Ok(seq.first().cloned().unwrap_or(Value::Null)),
            other => Err(requires(name, "sequence", other)),
        },
        "last" => match &arity(name, args, 1)?[0] {
            Value::Sequence(seq) => Ok(seq.last().cloned().unwrap_or(Value::Null)),
            other => Err(requires(name, "sequence", other)),
        },
        "min" => extreme(name, args, Ordering::Less),
        "max" => extreme(name, args, Ordering::Greater),
        "sum" => sum(&arity(name, args, 1)?[0]),
        _ => Err(EvalError::UnknownFunction(name.to_string())),
    }
}

fn arity(name: &str, args: Vec<Value>, expected: usize) -> Result<Vec<Value>, EvalError> {
    if args.len() != expected {
        return Err(EvalError::TypeError(format!(
            "{}() takes {} argument(s), got {}",
            name,
            expected,
            args.len()
        )));
    }
    Ok(args)
}

fn requires(name: &str, kind: &str, got: &Value) -> EvalError {
    EvalError::TypeError(format!("{}() requires {}, got {}", name, kind, got.type_name()))
}

fn string_arg<'v>(name: &str, value: &'v Value) -> Result<&'v str, EvalError> {
    value.as_str().ok_or_else(|| requires(name, "string", value))
}

fn map_string(name: &str, value: &Value, f: impl Fn(&str) -> String) -> Result<Value, EvalError> {
    Ok(Value::String(f(string_arg(name, value)?)))
}

fn len(value: &Value) -> Result<Value, EvalError> {
    let n = match value {
        Value::String(s) => s.chars().count(),
        Value::Sequence(seq) => seq.len(),
        Value::Mapping(map) => map.len(),
        other => return Err(requires("len", "string, sequence or mapping", other)),
    };
    Ok(Value::Integer(n as i64))
}

fn split(s: &str, delim: &str) -> Result<Value, EvalError> {
    let parts = if delim.is_empty() {
        s.chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        s.split(delim).map(|p| Value::String(p.to_string())).collect()
    };
    Ok(Value::Sequence(parts))
}

fn join(args: Vec<Value>) -> Result<Value, EvalError> {
    let (items, delim) = match args.as_slice() {
        [Value::Sequence(items)] => (items, ""),
        [Value::Sequence(items), Value::String(delim)] => (items, delim.as_str()),
        [other, ..] => return Err(requires("join", "sequence", other)),
        [] => return Err(EvalError::TypeError("join() requires a sequence".to_string())),
    };
    let parts: Vec<String> = items.iter().map(Value::as_string).collect();
    Ok(Value::String(parts.join(delim)))
}

fn to_int(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Integer(n) => Ok(Value::Integer(*n)),
        Value::Float(n) => Ok(Value::Integer(n.trunc() as i64)),
        Value::Boolean(b) => Ok(Value::Integer(i64::from(*b))),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
                .map(Value::Integer)
                .ok_or_else(|| EvalError::TypeError(format!("int() cannot parse '{}'", s)))
        }
        other => Err(requires("int", "number or string", other)),
    }
}

fn to_float(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Integer(n) => Ok(Value::Float(*n as f64)),
        Value::Float(n) => Ok(Value::Float(*n)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| EvalError::TypeError(format!("float() cannot parse '{}'", s))),
        other => Err(requires("float", "number or string", other)),
    }
}

/// `min`/`max` over one sequence argument or over the arguments themselves.
fn extreme(name: &str, args: Vec<Value>, keep: Ordering) -> Result<Value, EvalError> {
    let items = match args.as_slice() {
        [Value::Sequence(items)] => items.clone(),
        [_] => return Err(requires(name, "sequence", &args[0])),
        _ => args,
    };

    let mut best: Option<Value> = None;
    for item in items {
        best = match best {
            None => Some(item),
            Some(current) => match compare_values(&item, &current) {
                Some(ordering) if ordering == keep => Some(item),
                Some(_) => Some(current),
                None => {
                    return Err(EvalError::TypeError(format!(
                        "{}() cannot compare {} and {}",
                        name,
                        item.type_name(),
                        current.type_name()
                    )));
                }
            },
        };
    }
    Ok(best.unwrap_or(Value::Null))
}

fn sum(value: &Value) -> Result<Value, EvalError> {
    let items = match value {
        Value::Sequence(items) => items,
        other => return Err(requires("sum", "sequence", other)),
    };

    let mut sum_int: i64 = 0;
    let mut sum_float: f64 = 0.0;
    let mut has_float = false;

    for item in items {
        match item {
            Value::Integer(n) if !has_float => match sum_int.checked_add(*n) {
                Some(total) => sum_int = total,
                None => {
                    sum_float = sum_int as f64 + *n as f64;
                    has_float = true;
                }
            },
            Value::Integer(n) => sum_float += *n as f64,
            Value::Float(n) => {
                if !has_float {
                    sum_float = sum_int as f64;
                    has_float = true;
                }
                sum_float += n;
            }
            other => return Err(requires("sum", "numeric values", other)),
        }
    }

    if has_float {
        Ok(Value::Float(sum_float))
    } else {
        Ok(Value::Integer(sum_int))
    }
}
