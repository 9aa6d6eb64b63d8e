//! Purpose: Named-argument bag handed to constructors, plus the constructor error type.
//! Exports: `Kwargs`, `ConstructError`.
//! Role: Typed accessors over already-revived arguments; constructors pull what they accept.
//! Invariants: Explicit `null` counts as "not supplied" for optional arguments.
//! Invariants: Arguments left over after construction are rejected by `finish`.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

use crate::core::registry::Serializable;
use crate::core::revived::{Revived, SecretString};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConstructError {
    field: Option<String>,
    message: String,
}

impl ConstructError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConstructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{field}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl StdError for ConstructError {}

#[derive(Debug, Default)]
pub struct Kwargs {
    args: BTreeMap<String, Revived>,
}

impl Kwargs {
    pub fn new(args: BTreeMap<String, Revived>) -> Self {
        Self { args }
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.args.contains_key(name)
    }

    pub fn take(&mut self, name: &str) -> Option<Revived> {
        self.args.remove(name)
    }

    /// Drops arguments the serializer emits but the constructor has no use for.
    pub fn ignore(&mut self, names: &[&str]) {
        for name in names {
            self.args.remove(*name);
        }
    }

    fn take_present(&mut self, name: &str) -> Option<Revived> {
        match self.args.remove(name) {
            None | Some(Revived::Null) => None,
            Some(value) => Some(value),
        }
    }

    pub fn required_string(&mut self, name: &str) -> Result<String, ConstructError> {
        self.optional_string(name)?
            .ok_or_else(|| ConstructError::for_field(name, "field required"))
    }

    /// Plain strings only; a resolved secret here would end up in unmasked renderings.
    pub fn optional_string(&mut self, name: &str) -> Result<Option<String>, ConstructError> {
        match self.take_present(name) {
            None => Ok(None),
            Some(Revived::String(text)) => Ok(Some(text)),
            Some(Revived::Secret(_)) => Err(ConstructError::for_field(
                name,
                "secret values are only accepted by secret fields",
            )),
            Some(other) => Err(type_error(name, "a string", &other)),
        }
    }

    pub fn optional_secret(&mut self, name: &str) -> Result<Option<SecretString>, ConstructError> {
        match self.take_present(name) {
            None => Ok(None),
            Some(Revived::Secret(secret)) => Ok(Some(secret)),
            Some(Revived::String(text)) => Ok(Some(SecretString::new(text))),
            Some(other) => Err(type_error(name, "a secret or string", &other)),
        }
    }

    pub fn optional_f64(&mut self, name: &str) -> Result<Option<f64>, ConstructError> {
        match self.take_present(name) {
            None => Ok(None),
            Some(Revived::Number(num)) => num
                .as_f64()
                .map(Some)
                .ok_or_else(|| ConstructError::for_field(name, "number out of range")),
            Some(other) => Err(type_error(name, "a number", &other)),
        }
    }

    pub fn optional_u64(&mut self, name: &str) -> Result<Option<u64>, ConstructError> {
        match self.take_present(name) {
            None => Ok(None),
            Some(Revived::Number(num)) => num.as_u64().map(Some).ok_or_else(|| {
                ConstructError::for_field(name, "expected a non-negative integer")
            }),
            Some(other) => Err(type_error(name, "an integer", &other)),
        }
    }

    pub fn optional_bool(&mut self, name: &str) -> Result<Option<bool>, ConstructError> {
        match self.take_present(name) {
            None => Ok(None),
            Some(Revived::Bool(val)) => Ok(Some(val)),
            Some(other) => Err(type_error(name, "a boolean", &other)),
        }
    }

    pub fn optional_string_list(
        &mut self,
        name: &str,
    ) -> Result<Option<Vec<String>>, ConstructError> {
        match self.take_present(name) {
            None => Ok(None),
            Some(Revived::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Revived::String(text) => Ok(text),
                    other => Err(type_error(name, "a list of strings", &other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(other) => Err(type_error(name, "a list of strings", &other)),
        }
    }

    pub fn required_instance<T: Serializable>(&mut self, name: &str) -> Result<T, ConstructError> {
        let instance = self.required_any_instance(name)?;
        let found = instance.type_name();
        instance
            .into_any()
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| ConstructError::for_field(name, format!("unexpected instance {found}")))
    }

    pub fn required_any_instance(
        &mut self,
        name: &str,
    ) -> Result<Box<dyn Serializable>, ConstructError> {
        match self.take_present(name) {
            None => Err(ConstructError::for_field(name, "field required")),
            Some(Revived::Instance(instance)) => Ok(instance),
            Some(other) => Err(type_error(name, "a revived object", &other)),
        }
    }

    pub fn instance_list(
        &mut self,
        name: &str,
    ) -> Result<Option<Vec<Box<dyn Serializable>>>, ConstructError> {
        match self.take_present(name) {
            None => Ok(None),
            Some(Revived::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Revived::Instance(instance) => Ok(instance),
                    other => Err(type_error(name, "a list of revived objects", &other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(other) => Err(type_error(name, "a list of revived objects", &other)),
        }
    }

    /// Fails when arguments remain that the constructor did not consume.
    pub fn finish(self) -> Result<(), ConstructError> {
        if self.args.is_empty() {
            return Ok(());
        }
        let names = self.args.keys().cloned().collect::<Vec<_>>().join(", ");
        Err(ConstructError::new(format!(
            "unexpected keyword arguments: {names}"
        )))
    }
}

fn type_error(name: &str, expected: &str, found: &Revived) -> ConstructError {
    ConstructError::for_field(
        name,
        format!("expected {expected}, found {}", found.kind_name()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Number;

    fn kwargs(pairs: Vec<(&str, Revived)>) -> Kwargs {
        Kwargs::new(
            pairs
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        )
    }

    #[test]
    fn null_is_treated_as_absent() {
        let mut args = kwargs(vec![("name", Revived::Null)]);
        assert_eq!(args.optional_string("name").unwrap(), None);
        assert!(args.finish().is_ok());
    }

    #[test]
    fn secret_is_rejected_by_plain_string_argument() {
        let mut args = kwargs(vec![("key", Revived::Secret(SecretString::new("s3cr3t")))]);
        let err = args.required_string("key").unwrap_err();
        assert_eq!(err.field(), Some("key"));
        assert!(!err.to_string().contains("s3cr3t"));
    }

    #[test]
    fn secret_field_accepts_secret_and_plain_string() {
        let mut args = kwargs(vec![
            ("a", Revived::Secret(SecretString::new("s3cr3t"))),
            ("b", Revived::from("plain")),
        ]);
        let a = args.optional_secret("a").unwrap().expect("a");
        let b = args.optional_secret("b").unwrap().expect("b");
        assert_eq!(a.expose(), "s3cr3t");
        assert_eq!(b.expose(), "plain");
    }

    #[test]
    fn type_mismatch_names_the_field() {
        let mut args = kwargs(vec![("max_tokens", Revived::from("many"))]);
        let err = args.optional_u64("max_tokens").unwrap_err();
        assert_eq!(err.field(), Some("max_tokens"));
        assert!(err.message().contains("found string"));
    }

    #[test]
    fn negative_integer_is_rejected() {
        let mut args = kwargs(vec![("n", Revived::Number(Number::from(-3)))]);
        assert!(args.optional_u64("n").is_err());
    }

    #[test]
    fn leftovers_fail_finish() {
        let args = kwargs(vec![("zeta", Revived::Null), ("alpha", Revived::Bool(true))]);
        let err = args.finish().unwrap_err();
        assert_eq!(err.message(), "unexpected keyword arguments: alpha, zeta");
    }

    #[test]
    fn missing_required_field() {
        let mut args = Kwargs::default();
        let err = args.required_string("template").unwrap_err();
        assert_eq!(err.to_string(), "template: field required");
    }
}
