//! Purpose: Chat model configuration objects revived from serialized kwargs.
//! Exports: `ChatAnthropic`.
//! Role: Built-in class whose API key arrives as a secret node.
//! Invariants: The API key is held as a `SecretString`; `Debug` never shows it.
//! Invariants: `temperature` stays within 0.0..=1.0 and `max_tokens` is positive.

use crate::core::kwargs::{ConstructError, Kwargs};
use crate::core::registry::Revivable;
use crate::core::revived::SecretString;

const DEFAULT_MAX_TOKENS: u64 = 1024;
const DEFAULT_MAX_RETRIES: u64 = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct ChatAnthropic {
    model: String,
    api_key: Option<SecretString>,
    temperature: Option<f64>,
    max_tokens: u64,
    max_retries: u64,
}

impl ChatAnthropic {
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_key(&self) -> Option<&SecretString> {
        self.api_key.as_ref()
    }

    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    pub fn max_tokens(&self) -> u64 {
        self.max_tokens
    }

    pub fn max_retries(&self) -> u64 {
        self.max_retries
    }
}

impl Revivable for ChatAnthropic {
    const NAME: &'static str = "ChatAnthropic";

    fn from_kwargs(kwargs: &mut Kwargs) -> Result<Self, ConstructError> {
        let model = match kwargs.optional_string("model")? {
            Some(model) => {
                if kwargs.contains("model_name") {
                    return Err(ConstructError::for_field(
                        "model_name",
                        "pass either model or model_name, not both",
                    ));
                }
                model
            }
            None => kwargs.required_string("model_name")?,
        };

        let api_key = match kwargs.optional_secret("anthropic_api_key")? {
            Some(key) => Some(key),
            None => kwargs.optional_secret("api_key")?,
        };

        let temperature = kwargs.optional_f64("temperature")?;
        if let Some(value) = temperature {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConstructError::for_field(
                    "temperature",
                    format!("must be between 0 and 1, got {value}"),
                ));
            }
        }

        let max_tokens = kwargs
            .optional_u64("max_tokens")?
            .unwrap_or(DEFAULT_MAX_TOKENS);
        if max_tokens == 0 {
            return Err(ConstructError::for_field("max_tokens", "must be positive"));
        }
        let max_retries = kwargs
            .optional_u64("max_retries")?
            .unwrap_or(DEFAULT_MAX_RETRIES);

        Ok(Self {
            model,
            api_key,
            temperature,
            max_tokens,
            max_retries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::revived::Revived;
    use serde_json::Number;
    use std::collections::BTreeMap;

    fn kwargs(pairs: Vec<(&str, Revived)>) -> Kwargs {
        Kwargs::new(
            pairs
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn defaults_and_secret_key() {
        let mut args = kwargs(vec![
            ("model", Revived::from("claude-3-haiku-20240307")),
            (
                "anthropic_api_key",
                Revived::Secret(SecretString::new("sk-ant-xyz")),
            ),
        ]);
        let model = ChatAnthropic::from_kwargs(&mut args).expect("model");
        assert_eq!(model.model(), "claude-3-haiku-20240307");
        assert_eq!(model.max_tokens(), DEFAULT_MAX_TOKENS);
        assert_eq!(model.max_retries(), DEFAULT_MAX_RETRIES);
        assert_eq!(model.api_key().map(SecretString::expose), Some("sk-ant-xyz"));
        assert!(!format!("{model:?}").contains("sk-ant-xyz"));
    }

    #[test]
    fn model_name_alias_is_accepted() {
        let mut args = kwargs(vec![("model_name", Revived::from("claude-2"))]);
        let model = ChatAnthropic::from_kwargs(&mut args).expect("model");
        assert_eq!(model.model(), "claude-2");
        assert!(model.api_key().is_none());
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let temperature = Number::from_f64(1.5).expect("finite");
        let mut args = kwargs(vec![
            ("model", Revived::from("claude-2")),
            ("temperature", Revived::Number(temperature)),
        ]);
        let err = ChatAnthropic::from_kwargs(&mut args).unwrap_err();
        assert_eq!(err.field(), Some("temperature"));
    }

    #[test]
    fn missing_model_is_rejected() {
        let err = ChatAnthropic::from_kwargs(&mut Kwargs::default()).unwrap_err();
        assert_eq!(err.field(), Some("model_name"));
    }
}
