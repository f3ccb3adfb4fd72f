use std::cmp::Ordering;

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
use thiserror::Error;

use super::ast::{BinOp, Expr, UnaryOp};
use super::builtins;
use crate::value::{Mapping, Value};

/// Errors that can occur while evaluating a parsed expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Type mismatch or invalid operation for the given type
    #[error("type error: {0}")]
    TypeError(String),

    /// Invalid field access or index
    #[error("access error: {0}")]
    AccessError(String),

    #[error("undefined name '{0}'")]
    UndefinedName(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("division by zero")]
    DivisionByZero,
}

/// Evaluates expressions against a flat environment of bindings.
pub struct Evaluator<'a> {
    env: &'a Mapping,
}

impl<'a> Evaluator<'a> {
    pub fn new(env: &'a Mapping) -> Self {
        Evaluator { env }
    }

    pub fn eval(&self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Float(n) => Ok(Value::Float(*n)),
            Expr::Integer(n) => Ok(Value::Integer(*n)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Boolean(b) => Ok(Value::Boolean(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Identifier(name) => self
                .env
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UndefinedName(name.clone())),
            Expr::Member { object, property } => {
                let object = self.eval(object)?;
                member(&object, property)
            }
            Expr::Index { object, index } => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                apply_index(&object, &index)
            }
            Expr::Call { function, args } => {
                let args = self.eval_all(args)?;
                builtins::call(function, args)
            }
            Expr::MethodCall {
                object,
                method,
                args,
            } => {
                let mut values = vec![self.eval(object)?];
                values.extend(self.eval_all(args)?);
                builtins::call(method, values)
            }
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Boolean(!value.is_truthy())),
                    UnaryOp::Negate => match value {
                        Value::Integer(n) => n
                            .checked_neg()
                            .map(Value::Integer)
                            .ok_or_else(|| EvalError::TypeError("integer overflow".to_string())),
                        Value::Float(n) => Ok(Value::Float(-n)),
                        other => Err(EvalError::TypeError(format!(
                            "cannot negate {}",
                            other.type_name()
                        ))),
                    },
                }
            }
            Expr::BinaryOp { op, left, right } => match op {
                BinOp::And => {
                    let left = self.eval(left)?;
                    if !left.is_truthy() {
                        return Ok(Value::Boolean(false));
                    }
                    Ok(Value::Boolean(self.eval(right)?.is_truthy()))
                }
                BinOp::Or => {
                    let left = self.eval(left)?;
                    if left.is_truthy() {
                        return Ok(Value::Boolean(true));
                    }
                    Ok(Value::Boolean(self.eval(right)?.is_truthy()))
                }
                BinOp::NullCoalesce => {
                    let left = self.eval(left)?;
                    if left.is_null() {
                        self.eval(right)
                    } else {
                        Ok(left)
                    }
                }
                _ => {
                    let left = self.eval(left)?;
                    let right = self.eval(right)?;
                    apply_binop(*op, &left, &right)
                }
            },
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if self.eval(condition)?.is_truthy() {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::Object(items) => {
                let mut map = Mapping::new();
                for (key, expr) in items {
                    map.insert(key.clone(), self.eval(expr)?);
                }
                Ok(Value::Mapping(map))
            }
            Expr::Array(exprs) => Ok(Value::Sequence(self.eval_all(exprs)?)),
        }
    }

    fn eval_all(&self, exprs: &[Expr]) -> Result<Vec<Value>, EvalError> {
        exprs.iter().map(|e| self.eval(e)).collect()
    }
}

fn member(object: &Value, property: &str) -> Result<Value, EvalError> {
    match object {
        Value::Mapping(map) => Ok(map.get(property).cloned().unwrap_or(Value::Null)),
        other => Err(EvalError::AccessError(format!(
            "cannot read field '{}' of {}",
            property,
            other.type_name()
        ))),
    }
}

fn apply_index(object: &Value, index: &Value) -> Result<Value, EvalError> {
    match (object, index) {
        (Value::Mapping(map), Value::String(k)) => Ok(map.get(k).cloned().unwrap_or(Value::Null)),
        (Value::Mapping(map), Value::Integer(k)) => {
            Ok(map.get(&k.to_string()).cloned().unwrap_or(Value::Null))
        }
        (Value::Sequence(seq), Value::Integer(n)) => {
            Ok(resolve_offset(seq.len(), *n).and_then(|i| seq.get(i)).cloned().unwrap_or(Value::Null))
        }
        (Value::String(s), Value::Integer(n)) => {
            let chars: Vec<char> = s.chars().collect();
            Ok(resolve_offset(chars.len(), *n)
                .and_then(|i| chars.get(i))
                .map(|c| Value::String(c.to_string()))
                .unwrap_or(Value::Null))
        }
        (Value::Sequence(_), Value::String(k)) => Err(EvalError::TypeError(format!(
            "cannot use string key '{}' on sequence; use an integer index instead",
            k
        ))),
        _ => Err(EvalError::AccessError(format!(
            "cannot index {} with {}",
            object.type_name(),
            index.type_name()
        ))),
    }
}

/// Negative offsets count from the end (-1 = last).
fn resolve_offset(len: usize, n: i64) -> Option<usize> {
    if n < 0 {
        len.checked_sub(n.unsigned_abs() as usize)
    } else {
        Some(n as usize)
    }
}

/// Ordering for comparisons: numbers across int/float, strings
/// lexicographically.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => match (a.as_float(), b.as_float()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    }
}

fn apply_binop(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Add | BinOp::Subtract | BinOp::Multiply | BinOp::Divide | BinOp::Modulo => {
            arithmetic(op, left, right)
        }
        BinOp::Equal => Ok(Value::Boolean(left.loose_eq(right))),
        BinOp::NotEqual => Ok(Value::Boolean(!left.loose_eq(right))),
        BinOp::LessThan | BinOp::GreaterThan | BinOp::LessEqual | BinOp::GreaterEqual => {
            let ordering = compare_values(left, right).ok_or_else(|| {
                EvalError::TypeError(format!(
                    "cannot compare {} {} {}",
                    left.type_name(),
                    op.symbol(),
                    right.type_name()
                ))
            })?;
            let result = match op {
                BinOp::LessThan => ordering == Ordering::Less,
                BinOp::GreaterThan => ordering == Ordering::Greater,
                BinOp::LessEqual => ordering != Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Boolean(result))
        }
        BinOp::In => contains(right, left).map(Value::Boolean),
        BinOp::NotIn => contains(right, left).map(|found| Value::Boolean(!found)),
        BinOp::And | BinOp::Or | BinOp::NullCoalesce => Err(EvalError::TypeError(format!(
            "'{}' must be evaluated lazily",
            op.symbol()
        ))),
    }
}

/// Membership: element of a sequence, key of a mapping, substring of a string.
pub(crate) fn contains(haystack: &Value, needle: &Value) -> Result<bool, EvalError> {
    match (haystack, needle) {
        (Value::Sequence(items), needle) => Ok(items.iter().any(|item| item.loose_eq(needle))),
        (Value::Mapping(map), Value::String(key)) => Ok(map.contains_key(key)),
        (Value::String(s), Value::String(sub)) => Ok(s.contains(sub.as_str())),
        (Value::Null, _) => Ok(false),
        (h, n) => Err(EvalError::TypeError(format!(
            "cannot test {} in {}",
            n.type_name(),
            h.type_name()
        ))),
    }
}

fn arithmetic(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => integer_arithmetic(op, *a, *b),
        (Value::Float(a), Value::Float(b)) => float_arithmetic(op, *a, *b),
        (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
            mixed_arithmetic(op, left, right)
        }
        (Value::String(a), Value::String(b)) if op == BinOp::Add => {
            Ok(Value::String(format!("{}{}", a, b)))
        }
        (a, b) => Err(EvalError::TypeError(format!(
            "cannot apply {} to {} and {}",
            op.symbol(),
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn integer_arithmetic(op: BinOp, a: i64, b: i64) -> Result<Value, EvalError> {
    let checked = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Subtract => a.checked_sub(b),
        BinOp::Multiply => a.checked_mul(b),
        BinOp::Divide => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            // Exact division stays integer; i64::MIN / -1 overflows to float
            match a.checked_rem(b) {
                Some(0) => a.checked_div(b),
                Some(_) => return Ok(Value::Float(a as f64 / b as f64)),
                None => None,
            }
        }
        BinOp::Modulo => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            a.checked_rem(b)
        }
        _ => None,
    };
    match checked {
        Some(n) => Ok(Value::Integer(n)),
        None => float_arithmetic(op, a as f64, b as f64),
    }
}

fn float_arithmetic(op: BinOp, a: f64, b: f64) -> Result<Value, EvalError> {
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Subtract => a - b,
        BinOp::Multiply => a * b,
        BinOp::Divide | BinOp::Modulo if b == 0.0 => return Err(EvalError::DivisionByZero),
        BinOp::Divide => a / b,
        BinOp::Modulo => a % b,
        _ => {
            return Err(EvalError::TypeError(format!(
                "{} is not an arithmetic operator",
                op.symbol()
            )));
        }
    };
    Ok(Value::Float(result))
}

/// Integer/float mixes go through decimal arithmetic so that whole results
/// come back as integers (`0.5 + 1.5 == 2`, not `2.0`).
fn mixed_arithmetic(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    if let Some(ad) = to_decimal(left)
        && let Some(bd) = to_decimal(right)
    {
        if matches!(op, BinOp::Divide | BinOp::Modulo) && bd.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        let result = match op {
            BinOp::Add => ad.checked_add(bd),
            BinOp::Subtract => ad.checked_sub(bd),
            BinOp::Multiply => ad.checked_mul(bd),
            BinOp::Divide => ad.checked_div(bd),
            BinOp::Modulo => ad.checked_rem(bd),
            _ => None,
        };
        if let Some(rd) = result {
            if rd.is_integer()
                && let Some(r) = rd.to_i64()
            {
                return Ok(Value::Integer(r));
            } else if let Some(r) = rd.to_f64() {
                return Ok(Value::Float(r));
            }
        }
    }
    match (left.as_float(), right.as_float()) {
        (Some(a), Some(b)) => float_arithmetic(op, a, b),
        _ => Err(EvalError::TypeError(format!(
            "cannot apply {} to {} and {}",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Integer(n) => Decimal::from_i64(*n),
        Value::Float(n) => Decimal::from_f64(*n),
        _ => None,
    }
}
