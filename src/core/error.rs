use std::error::Error as StdError;
use std::fmt;

use serde_json::Value;

use crate::core::namespace::SymbolPath;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    Io,
    Parse,
    MalformedNode,
    MissingSecret,
    NotSerializable,
    InvalidNamespace,
    UnsupportedVersion,
    ImportResolutionFailed,
    ConstructionFailed,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    key: Option<String>,
    symbol: Option<SymbolPath>,
    node: Option<Value>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            key: None,
            symbol: None,
            node: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Secret key that could not be resolved. Secret values are never stored on errors.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn symbol(&self) -> Option<&SymbolPath> {
        self.symbol.as_ref()
    }

    /// Offending node, rendered with resolved secrets masked.
    pub fn node(&self) -> Option<&Value> {
        self.node.as_ref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_symbol(mut self, symbol: SymbolPath) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub fn with_node(mut self, node: Value) -> Self {
        self.node = Some(node);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(symbol) = &self.symbol {
            write!(f, " (symbol: {symbol})")?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {key})")?;
        }
        if let Some(node) = &self.node {
            write!(f, " (node: {node})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::Io => 3,
        ErrorKind::Parse => 4,
        ErrorKind::MalformedNode => 5,
        ErrorKind::MissingSecret => 6,
        ErrorKind::NotSerializable => 7,
        ErrorKind::InvalidNamespace => 8,
        ErrorKind::UnsupportedVersion => 9,
        ErrorKind::ImportResolutionFailed => 10,
        ErrorKind::ConstructionFailed => 11,
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind, to_exit_code};
    use crate::core::namespace::SymbolPath;

    #[test]
    fn exit_code_mapping_is_stable() {
        let cases = [
            (ErrorKind::Internal, 1),
            (ErrorKind::Usage, 2),
            (ErrorKind::Io, 3),
            (ErrorKind::Parse, 4),
            (ErrorKind::MalformedNode, 5),
            (ErrorKind::MissingSecret, 6),
            (ErrorKind::NotSerializable, 7),
            (ErrorKind::InvalidNamespace, 8),
            (ErrorKind::UnsupportedVersion, 9),
            (ErrorKind::ImportResolutionFailed, 10),
            (ErrorKind::ConstructionFailed, 11),
        ];

        for (kind, code) in cases {
            assert_eq!(to_exit_code(kind), code);
        }
    }

    #[test]
    fn display_includes_symbol_and_key() {
        let err = Error::new(ErrorKind::MissingSecret)
            .with_message("missing secret")
            .with_key("OPENAI_API_KEY")
            .with_symbol(SymbolPath::from_static(&["langchain", "llms", "OpenAI"]));
        let text = err.to_string();
        assert!(text.starts_with("MissingSecret: missing secret"));
        assert!(text.contains("(symbol: langchain.llms.OpenAI)"));
        assert!(text.contains("(key: OPENAI_API_KEY)"));
    }
}
