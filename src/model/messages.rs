//! Purpose: Chat message classes revived from serialized kwargs.
//! Exports: `MessageRole`, `HumanMessage`, `AIMessage`, `SystemMessage`.
//! Role: Built-in members of the constructible family used directly or inside chat prompts.
//! Invariants: `content` is required and must be a string.

use crate::core::kwargs::{ConstructError, Kwargs};
use crate::core::registry::Revivable;

/// Envelope fields the serializer writes for every message.
const IGNORED_MESSAGE_FIELDS: &[&str] = &[
    "type",
    "id",
    "additional_kwargs",
    "response_metadata",
    "example",
    "tool_calls",
    "invalid_tool_calls",
    "usage_metadata",
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MessageRole {
    Human,
    Ai,
    System,
}

macro_rules! chat_message {
    ($name:ident, $role:expr) => {
        #[derive(Clone, Debug, Eq, PartialEq)]
        pub struct $name {
            content: String,
            name: Option<String>,
        }

        impl $name {
            pub fn new(content: impl Into<String>) -> Self {
                Self {
                    content: content.into(),
                    name: None,
                }
            }

            pub fn role(&self) -> MessageRole {
                $role
            }

            pub fn content(&self) -> &str {
                &self.content
            }

            pub fn name(&self) -> Option<&str> {
                self.name.as_deref()
            }
        }

        impl Revivable for $name {
            const NAME: &'static str = stringify!($name);

            fn from_kwargs(kwargs: &mut Kwargs) -> Result<Self, ConstructError> {
                let content = kwargs.required_string("content")?;
                let name = kwargs.optional_string("name")?;
                kwargs.ignore(IGNORED_MESSAGE_FIELDS);
                Ok(Self { content, name })
            }
        }
    };
}

chat_message!(HumanMessage, MessageRole::Human);
chat_message!(AIMessage, MessageRole::Ai);
chat_message!(SystemMessage, MessageRole::System);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::revived::Revived;
    use std::collections::BTreeMap;

    #[test]
    fn serializer_envelope_fields_are_accepted() {
        let mut args = BTreeMap::new();
        args.insert("content".to_string(), Revived::from("hi"));
        args.insert("type".to_string(), Revived::from("human"));
        args.insert("additional_kwargs".to_string(), Revived::Object(BTreeMap::new()));
        args.insert("id".to_string(), Revived::Null);
        let mut kwargs = Kwargs::new(args);

        let message = HumanMessage::from_kwargs(&mut kwargs).expect("message");
        assert!(kwargs.finish().is_ok());
        assert_eq!(message.content(), "hi");
        assert_eq!(message.role(), MessageRole::Human);
        assert_eq!(message.name(), None);
    }

    #[test]
    fn list_content_is_rejected() {
        let mut args = BTreeMap::new();
        args.insert(
            "content".to_string(),
            Revived::Array(vec![Revived::from("block")]),
        );
        let err = AIMessage::from_kwargs(&mut Kwargs::new(args)).unwrap_err();
        assert_eq!(err.field(), Some("content"));
    }
}
