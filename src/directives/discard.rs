//! `discard`: drop a block unconditionally, the inverse of `if`.

use crate::context::Context;
use crate::directive::{Directive, Outcome, Processor};
use crate::error::{Error, Result};
use crate::value::{Mapping, Value};

use super::literal_bool;

#[derive(Debug, Clone)]
pub struct Discard {
    keyword: String,
}

impl Discard {
    pub fn new(keyword: impl Into<String>) -> Self {
        Discard {
            keyword: keyword.into(),
        }
    }

    fn should_discard(&self, value: &Value, path: &str) -> Result<bool> {
        match value {
            Value::Boolean(b) => Ok(*b),
            Value::Integer(i) => Ok(*i != 0),
            Value::Null => Ok(false),
            Value::String(s) => literal_bool(s).ok_or_else(|| {
                Error::type_mismatch(
                    format!("{} value must be boolean or 'true'/'false', got string '{}'", self.keyword, s),
                    path,
                )
            }),
            other => Err(Error::type_mismatch(
                format!("{} must be boolean, got {}", self.keyword, other.type_name()),
                path,
            )),
        }
    }
}

impl Directive for Discard {
    fn handle(
        &self,
        _processor: &dyn Processor,
        ctx: &Context,
        _block: &Mapping,
        value: &Value,
    ) -> Result<Outcome> {
        if self.should_discard(value, &ctx.directive_path(&self.keyword))? {
            Ok(Outcome::omit())
        } else {
            Ok(Outcome::proceed())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_values() {
        let discard = Discard::new("discard");
        assert!(discard.should_discard(&Value::Boolean(true), "").unwrap());
        assert!(discard.should_discard(&Value::from("yes"), "").unwrap());
        assert!(discard.should_discard(&Value::Integer(1), "").unwrap());
        assert!(!discard.should_discard(&Value::Null, "").unwrap());
        assert!(!discard.should_discard(&Value::from("no"), "").unwrap());
    }

    #[test]
    fn rejected_values() {
        let discard = Discard::new("discard");
        let err = discard.should_discard(&Value::from("maybe"), "jobs.discard").unwrap_err();
        assert_eq!(
            err.to_string(),
            "discard value must be boolean or 'true'/'false', got string 'maybe' at jobs.discard"
        );
        assert!(discard.should_discard(&Value::Float(1.0), "").is_err());
    }
}
