use std::fmt;

use indexmap::IndexMap;

use crate::output::to_json;

/// An ordered mapping from string keys to values.
///
/// Insertion order is preserved so that processed documents render
/// reproducibly.
pub type Mapping = IndexMap<String, Value>;

/// A document node.
///
/// Documents are trees of mappings, sequences and scalars. Integers and
/// floats are kept apart so that arithmetic in expressions can preserve
/// integer results.
///
/// # Examples
///
/// ```
/// use yamlexpr::{Mapping, Value};
///
/// let mut job = Mapping::new();
/// job.insert("os".to_string(), Value::from("linux"));
/// job.insert("cores".to_string(), Value::Integer(4));
///
/// let doc = Value::Mapping(job);
/// assert_eq!(doc.type_name(), "mapping");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Explicit null
    #[default]
    Null,

    Boolean(bool),

    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    String(String),

    Sequence(Vec<Value>),

    Mapping(Mapping),
}

impl Value {
    /// Truthiness used by conditions.
    ///
    /// Numbers are true when non-zero, strings and collections when
    /// non-empty.
    pub fn is_truthy(&self) -> bool {
        use Value::*;
        match self {
            Null => false,
            Boolean(b) => *b,
            Float(n) => *n != 0.0,
            Integer(n) => *n != 0,
            String(s) => !s.is_empty(),
            Sequence(seq) => !seq.is_empty(),
            Mapping(map) => !map.is_empty(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Float(n) => Some(n.trunc() as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Text form used when a value is spliced into a larger string.
    ///
    /// Strings are returned verbatim, null becomes `null`, and collections
    /// are rendered as compact JSON.
    pub fn as_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Human-readable type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    /// Equality that treats integers and floats as numbers.
    ///
    /// `1 == 1.0` holds here, unlike the derived `PartialEq`. Mappings and
    /// sequences compare element-wise with the same rule.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                (*a as f64) == *b
            }
            (Value::Sequence(a), Value::Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Mapping(a), Value::Mapping(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.loose_eq(other)))
            }
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Sequence(_) | Value::Mapping(_) => f.write_str(&to_json(self)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(seq: Vec<Value>) -> Self {
        Value::Sequence(seq)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Mapping(map)
    }
}
