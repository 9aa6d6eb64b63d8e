//! Purpose: Model the output tree of a revival call.
//! Exports: `Revived`, `SecretString`, `SECRET_MASK`.
//! Role: JSON-shaped tree whose nodes may also be live instances or resolved secrets.
//! Invariants: Display renderings never contain a secret value.
//! Invariants: `as_plain_json` only succeeds for trees with no instances and no secrets.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Number, Value, json};

use crate::core::registry::Serializable;

pub const SECRET_MASK: &str = "**********";

/// A resolved secret. `Debug` and `Display` are redacted; call `expose` to read it.
#[derive(Clone, Eq, PartialEq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString({SECRET_MASK})")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(SECRET_MASK)
    }
}

#[derive(Debug)]
pub enum Revived {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Secret(SecretString),
    Array(Vec<Revived>),
    Object(BTreeMap<String, Revived>),
    Instance(Box<dyn Serializable>),
}

impl Revived {
    /// Lifts plain JSON as-is, without looking at `lc` markers.
    pub(crate) fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Revived::Null,
            Value::Bool(val) => Revived::Bool(val),
            Value::Number(num) => Revived::Number(num),
            Value::String(text) => Revived::String(text),
            Value::Array(items) => {
                Revived::Array(items.into_iter().map(Revived::from_json).collect())
            }
            Value::Object(map) => Revived::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Revived::from_json(value)))
                    .collect(),
            ),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Revived::Null => "null",
            Revived::Bool(_) => "bool",
            Revived::Number(_) => "number",
            Revived::String(_) => "string",
            Revived::Secret(_) => "secret",
            Revived::Array(_) => "array",
            Revived::Object(_) => "object",
            Revived::Instance(_) => "instance",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Revived::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Revived::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_secret(&self) -> Option<&SecretString> {
        match self {
            Revived::Secret(secret) => Some(secret),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Revived]> {
        match self {
            Revived::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Revived>> {
        match self {
            Revived::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&dyn Serializable> {
        match self {
            Revived::Instance(instance) => Some(instance.as_ref()),
            _ => None,
        }
    }

    pub fn into_instance(self) -> Option<Box<dyn Serializable>> {
        match self {
            Revived::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Serializable>(&self) -> Option<&T> {
        self.as_instance()
            .and_then(|instance| instance.as_any().downcast_ref::<T>())
    }

    pub fn get(&self, key: &str) -> Option<&Revived> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Converts back to JSON when the tree holds only plain data.
    pub fn as_plain_json(&self) -> Option<Value> {
        Some(match self {
            Revived::Null => Value::Null,
            Revived::Bool(val) => Value::Bool(*val),
            Revived::Number(num) => Value::Number(num.clone()),
            Revived::String(text) => Value::String(text.clone()),
            Revived::Secret(_) | Revived::Instance(_) => return None,
            Revived::Array(items) => Value::Array(
                items
                    .iter()
                    .map(Revived::as_plain_json)
                    .collect::<Option<Vec<_>>>()?,
            ),
            Revived::Object(map) => {
                let mut out = Map::new();
                for (key, value) in map {
                    out.insert(key.clone(), value.as_plain_json()?);
                }
                Value::Object(out)
            }
        })
    }

    /// JSON rendering for output and diagnostics: secrets masked, instances summarized.
    pub fn to_display_json(&self) -> Value {
        match self {
            Revived::Null => Value::Null,
            Revived::Bool(val) => Value::Bool(*val),
            Revived::Number(num) => Value::Number(num.clone()),
            Revived::String(text) => Value::String(text.clone()),
            Revived::Secret(_) => Value::String(SECRET_MASK.to_string()),
            Revived::Array(items) => {
                Value::Array(items.iter().map(Revived::to_display_json).collect())
            }
            Revived::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_display_json()))
                    .collect(),
            ),
            Revived::Instance(instance) => json!({
                "instance": instance.type_name(),
                "repr": format!("{instance:?}"),
            }),
        }
    }
}

impl From<&str> for Revived {
    fn from(text: &str) -> Self {
        Revived::String(text.to_string())
    }
}

impl From<String> for Revived {
    fn from(text: String) -> Self {
        Revived::String(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_debug_and_display_are_masked() {
        let secret = SecretString::new("sk-live-123");
        assert!(!format!("{secret:?}").contains("sk-live"));
        assert_eq!(secret.to_string(), SECRET_MASK);
        assert_eq!(secret.expose(), "sk-live-123");
    }

    #[test]
    fn plain_json_is_refused_once_a_secret_is_present() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), Revived::from("x"));
        map.insert(
            "b".to_string(),
            Revived::Array(vec![Revived::Null, Revived::Bool(true)]),
        );
        let plain = Revived::Object(map);
        assert_eq!(
            plain.as_plain_json(),
            Some(json!({"a": "x", "b": [null, true]}))
        );

        let secret = Revived::Array(vec![Revived::Secret(SecretString::new("v"))]);
        assert!(secret.as_plain_json().is_none());
        assert_eq!(secret.to_display_json(), json!([SECRET_MASK]));
    }
}
