//! Purpose: Built-in constructible family and its registration into the symbol registry.
//! Exports: `register_builtins` plus the model submodules.
//! Role: The only classes the default loader will ever construct.
//! Invariants: Module paths match the resolution paths in `core::mapping`.

pub mod chat_models;
pub mod messages;
pub mod prompts;
pub mod runnables;

use crate::core::registry::SymbolRegistry;

pub fn register_builtins(registry: &mut SymbolRegistry) {
    registry
        .register_class::<prompts::PromptTemplate>("langchain_core.prompts.prompt")
        .register_class::<prompts::ChatPromptTemplate>("langchain_core.prompts.chat")
        .register_class::<prompts::HumanMessagePromptTemplate>("langchain_core.prompts.chat")
        .register_class::<prompts::SystemMessagePromptTemplate>("langchain_core.prompts.chat")
        .register_class::<prompts::AIMessagePromptTemplate>("langchain_core.prompts.chat")
        .register_class::<messages::HumanMessage>("langchain_core.messages.human")
        .register_class::<messages::AIMessage>("langchain_core.messages.ai")
        .register_class::<messages::SystemMessage>("langchain_core.messages.system")
        .register_class::<runnables::StrOutputParser>("langchain_core.output_parsers.string")
        .register_class::<runnables::RunnableSequence>("langchain_core.runnables.base")
        .register_class::<chat_models::ChatAnthropic>("langchain_anthropic.chat_models")
        .register_opaque("langchain_core.prompts.base", "format_document");
}
