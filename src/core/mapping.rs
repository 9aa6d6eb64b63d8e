//! Purpose: Hold the static import tables and merge them into one resolution table.
//! Exports: `ImportMappings`, `MappingRow`, the four built-in tables, `merge_layers`.
//! Role: Answers "which module path and symbol does this serialized key resolve to?".
//! Invariants: Later layers shadow earlier ones; caller overrides shadow every built-in layer.
//! Invariants: The merged built-in table is computed once and never mutated.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use crate::core::namespace::SymbolPath;

/// (serialized key, resolution path) as static segments.
pub type MappingRow = (&'static [&'static str], &'static [&'static str]);

const PROMPT_TEMPLATE: &[&str] = &["langchain_core", "prompts", "prompt", "PromptTemplate"];
const CHAT_PROMPT_TEMPLATE: &[&str] = &["langchain_core", "prompts", "chat", "ChatPromptTemplate"];
const HUMAN_PROMPT: &[&str] = &[
    "langchain_core",
    "prompts",
    "chat",
    "HumanMessagePromptTemplate",
];
const SYSTEM_PROMPT: &[&str] = &[
    "langchain_core",
    "prompts",
    "chat",
    "SystemMessagePromptTemplate",
];
const AI_PROMPT: &[&str] = &["langchain_core", "prompts", "chat", "AIMessagePromptTemplate"];
const HUMAN_MESSAGE: &[&str] = &["langchain_core", "messages", "human", "HumanMessage"];
const AI_MESSAGE: &[&str] = &["langchain_core", "messages", "ai", "AIMessage"];
const SYSTEM_MESSAGE: &[&str] = &["langchain_core", "messages", "system", "SystemMessage"];
const STR_OUTPUT_PARSER: &[&str] = &[
    "langchain_core",
    "output_parsers",
    "string",
    "StrOutputParser",
];
const RUNNABLE_SEQUENCE: &[&str] = &["langchain_core", "runnables", "base", "RunnableSequence"];
const CHAT_ANTHROPIC: &[&str] = &["langchain_anthropic", "chat_models", "ChatAnthropic"];

/// Keys emitted by the serializer for the current class layout.
pub const SERIALIZABLE_MAPPING: &[MappingRow] = &[
    (&["langchain", "prompts", "prompt", "PromptTemplate"], PROMPT_TEMPLATE),
    (&["langchain", "prompts", "chat", "ChatPromptTemplate"], CHAT_PROMPT_TEMPLATE),
    (&["langchain", "prompts", "chat", "HumanMessagePromptTemplate"], HUMAN_PROMPT),
    (&["langchain", "prompts", "chat", "SystemMessagePromptTemplate"], SYSTEM_PROMPT),
    (&["langchain", "prompts", "chat", "AIMessagePromptTemplate"], AI_PROMPT),
    (&["langchain", "schema", "messages", "HumanMessage"], HUMAN_MESSAGE),
    (&["langchain", "schema", "messages", "AIMessage"], AI_MESSAGE),
    (&["langchain", "schema", "messages", "SystemMessage"], SYSTEM_MESSAGE),
    (&["langchain", "schema", "output_parser", "StrOutputParser"], STR_OUTPUT_PARSER),
    (&["langchain", "schema", "runnable", "RunnableSequence"], RUNNABLE_SEQUENCE),
    (&["langchain", "chat_models", "anthropic", "ChatAnthropic"], CHAT_ANTHROPIC),
    (CHAT_ANTHROPIC, CHAT_ANTHROPIC),
];

/// Keys written with `langchain_core` module paths, including package-level re-exports.
pub const OLD_CORE_NAMESPACES_MAPPING: &[MappingRow] = &[
    (PROMPT_TEMPLATE, PROMPT_TEMPLATE),
    (&["langchain_core", "prompts", "PromptTemplate"], PROMPT_TEMPLATE),
    (CHAT_PROMPT_TEMPLATE, CHAT_PROMPT_TEMPLATE),
    (&["langchain_core", "prompts", "ChatPromptTemplate"], CHAT_PROMPT_TEMPLATE),
    (HUMAN_PROMPT, HUMAN_PROMPT),
    (SYSTEM_PROMPT, SYSTEM_PROMPT),
    (AI_PROMPT, AI_PROMPT),
    (HUMAN_MESSAGE, HUMAN_MESSAGE),
    (&["langchain_core", "messages", "HumanMessage"], HUMAN_MESSAGE),
    (AI_MESSAGE, AI_MESSAGE),
    (&["langchain_core", "messages", "AIMessage"], AI_MESSAGE),
    (SYSTEM_MESSAGE, SYSTEM_MESSAGE),
    (&["langchain_core", "messages", "SystemMessage"], SYSTEM_MESSAGE),
    (STR_OUTPUT_PARSER, STR_OUTPUT_PARSER),
    (&["langchain_core", "output_parsers", "StrOutputParser"], STR_OUTPUT_PARSER),
    (RUNNABLE_SEQUENCE, RUNNABLE_SEQUENCE),
    (&["langchain_core", "runnables", "RunnableSequence"], RUNNABLE_SEQUENCE),
];

/// Keys from the pre-split package layout.
pub const OG_SERIALIZABLE_MAPPING: &[MappingRow] = &[
    (&["langchain", "schema", "AIMessage"], AI_MESSAGE),
    (&["langchain", "schema", "HumanMessage"], HUMAN_MESSAGE),
    (&["langchain", "schema", "SystemMessage"], SYSTEM_MESSAGE),
    (&["langchain", "prompts", "PromptTemplate"], PROMPT_TEMPLATE),
];

/// Keys emitted by the JavaScript serializer.
pub const JS_SERIALIZABLE_MAPPING: &[MappingRow] = &[
    (&["langchain_core", "messages", "AIMessage"], AI_MESSAGE),
    (&["langchain_core", "messages", "HumanMessage"], HUMAN_MESSAGE),
    (&["langchain_core", "messages", "SystemMessage"], SYSTEM_MESSAGE),
    (&["langchain", "prompts", "index", "PromptTemplate"], PROMPT_TEMPLATE),
    (&["langchain", "schema", "StrOutputParser"], STR_OUTPUT_PARSER),
];

/// Built-in layers in increasing precedence.
pub const BUILTIN_LAYERS: &[&[MappingRow]] = &[
    SERIALIZABLE_MAPPING,
    OLD_CORE_NAMESPACES_MAPPING,
    OG_SERIALIZABLE_MAPPING,
    JS_SERIALIZABLE_MAPPING,
];

static BUILTIN_MAPPINGS: LazyLock<HashMap<SymbolPath, SymbolPath>> =
    LazyLock::new(|| merge_layers(BUILTIN_LAYERS));

/// Merges layers so that a key present in several layers takes the last layer's path.
pub fn merge_layers(layers: &[&[MappingRow]]) -> HashMap<SymbolPath, SymbolPath> {
    let mut merged = HashMap::new();
    for layer in layers {
        for (key, path) in layer.iter() {
            merged.insert(SymbolPath::from_static(key), SymbolPath::from_static(path));
        }
    }
    merged
}

/// Resolution table for one revival call: the shared built-in table plus caller overrides.
#[derive(Clone, Debug)]
pub struct ImportMappings {
    builtin: &'static HashMap<SymbolPath, SymbolPath>,
    overrides: HashMap<SymbolPath, SymbolPath>,
}

impl ImportMappings {
    pub fn builtin() -> Self {
        Self::with_overrides(HashMap::new())
    }

    pub fn with_overrides(overrides: HashMap<SymbolPath, SymbolPath>) -> Self {
        Self {
            builtin: &BUILTIN_MAPPINGS,
            overrides,
        }
    }

    pub fn resolve(&self, key: &SymbolPath) -> Option<&SymbolPath> {
        self.overrides.get(key).or_else(|| self.builtin.get(key))
    }

    /// True when the caller supplied this key, regardless of the built-in tables.
    pub fn is_override(&self, key: &SymbolPath) -> bool {
        self.overrides.contains_key(key)
    }

    /// Merged view, sorted by key for stable output.
    pub fn entries(&self) -> BTreeMap<&SymbolPath, &SymbolPath> {
        let mut merged = BTreeMap::new();
        for (key, path) in self.builtin.iter() {
            merged.insert(key, path);
        }
        for (key, path) in self.overrides.iter() {
            merged.insert(key, path);
        }
        merged
    }
}

impl Default for ImportMappings {
    fn default() -> Self {
        Self::builtin()
    }
}
