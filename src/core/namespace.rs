//! Purpose: Symbol path type plus the namespace allowlist and constructor-id validation.
//! Exports: `SymbolPath`, `DEFAULT_NAMESPACES`, `ROOT_NAMESPACE`, `NamespaceAllowlist`, `split_constructor_id`.
//! Role: First gate of the revival boundary; rejects ids before any lookup happens.
//! Invariants: The built-in namespaces are always allowed and always listed first.
//! Invariants: The bare root namespace (`["langchain"]`) never addresses a module.

use std::fmt;

use crate::core::error::{Error, ErrorKind};

/// Top-level namespaces that may always be revived. Keys under these go through the import table.
pub const DEFAULT_NAMESPACES: &[&str] = &[
    "langchain",
    "langchain_core",
    "langchain_community",
    "langchain_anthropic",
    "langchain_groq",
    "langchain_google_genai",
];

pub const ROOT_NAMESPACE: &str = "langchain";

/// Ordered path segments such as `langchain_core.prompts.prompt.PromptTemplate`.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SymbolPath(Vec<String>);

impl SymbolPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn from_static(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }

    /// Parses `a.b.C`. Empty segments are usage errors.
    pub fn parse_dotted(text: &str) -> Result<Self, Error> {
        let segments = text.split('.').collect::<Vec<_>>();
        if segments.iter().any(|segment| segment.trim().is_empty()) {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("invalid symbol path `{text}`"))
                .with_hint("Use dotted segments like langchain_core.prompts.PromptTemplate."));
        }
        Ok(Self::new(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Module segments: everything but the final symbol name.
    pub fn module(&self) -> &[String] {
        match self.0.split_last() {
            Some((_, module)) => module,
            None => &[],
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
}

impl fmt::Display for SymbolPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl From<Vec<String>> for SymbolPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

pub fn is_default_namespace(namespace: &str) -> bool {
    DEFAULT_NAMESPACES.contains(&namespace)
}

/// Built-in namespaces followed by caller extras, deduplicated in first-seen order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NamespaceAllowlist {
    namespaces: Vec<String>,
}

impl NamespaceAllowlist {
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut namespaces = Vec::new();
        let builtin = DEFAULT_NAMESPACES.iter().map(|ns| ns.to_string());
        for namespace in builtin.chain(extra.into_iter().map(Into::into)) {
            if !namespaces.contains(&namespace) {
                namespaces.push(namespace);
            }
        }
        Self { namespaces }
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.namespaces.iter().any(|allowed| allowed == namespace)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.namespaces
    }

    /// Checks a constructor namespace against the allowlist and the bare-root rule.
    pub fn check(&self, namespace: &[String]) -> Result<(), NamespaceRejection> {
        let Some(first) = namespace.first() else {
            return Err(NamespaceRejection::Empty);
        };
        if !self.contains(first) {
            return Err(NamespaceRejection::NotAllowed);
        }
        if namespace.len() == 1 && first == ROOT_NAMESPACE {
            return Err(NamespaceRejection::BareRoot);
        }
        Ok(())
    }
}

impl Default for NamespaceAllowlist {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NamespaceRejection {
    Empty,
    NotAllowed,
    BareRoot,
}

impl NamespaceRejection {
    pub fn describe(self) -> &'static str {
        match self {
            NamespaceRejection::Empty => "constructor id has no namespace",
            NamespaceRejection::NotAllowed => "namespace is not in the allowed namespaces",
            NamespaceRejection::BareRoot => "the root namespace alone is not a module",
        }
    }
}

/// Splits a constructor `id` into (namespace, name). `None` for an empty id.
pub fn split_constructor_id(id: &[String]) -> Option<(&[String], &str)> {
    id.split_last()
        .map(|(name, namespace)| (namespace, name.as_str()))
}
