use serde::Serialize;

use crate::convert::json_to_value;
use crate::value::{Mapping, Value};

/// Field access on a typed root object.
///
/// The stack consults this only when a name is not bound in any frame.
pub trait FieldResolver: Send + Sync {
    /// Resolve a field by serialized name or by field name.
    fn field(&self, name: &str) -> Option<Value>;

    /// All fields, keyed by serialized name.
    fn fields(&self) -> Mapping;
}

/// [`FieldResolver`] over any `Serialize` struct or map.
///
/// Lookups try the serialized name first (honouring `#[serde(rename)]`),
/// then a normalized comparison that ignores case, `_` and `-`, so
/// `user_id`, `userId` and `UserID` reach the same field.
#[derive(Debug, Clone)]
pub struct SerdeObject {
    fields: Mapping,
}

impl SerdeObject {
    pub fn new<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        match json_to_value(serde_json::to_value(value)?) {
            Value::Mapping(fields) => Ok(SerdeObject { fields }),
            other => Err(serde::ser::Error::custom(format!(
                "typed root object must serialize to a struct or map, got {}",
                other.type_name()
            ))),
        }
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

impl FieldResolver for SerdeObject {
    fn field(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.fields.get(name) {
            return Some(value.clone());
        }
        let wanted = normalize(name);
        self.fields
            .iter()
            .find(|(key, _)| normalize(key) == wanted)
            .map(|(_, value)| value.clone())
    }

    fn fields(&self) -> Mapping {
        self.fields.clone()
    }
}
