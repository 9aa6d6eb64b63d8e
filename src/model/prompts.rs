//! Purpose: Prompt template classes that can be revived from serialized kwargs.
//! Exports: `PromptTemplate`, `TemplateFormat`, `MissingVariable`, message prompt templates, `ChatPromptTemplate`.
//! Role: Built-in members of the constructible family; validate their arguments on construction.
//! Invariants: Templates are parsed at construction, so a revived template always formats or reports a missing variable.
//! Invariants: Inferred input variables are sorted and deduplicated.

use std::collections::{BTreeMap, BTreeSet};
use std::error::Error as StdError;
use std::fmt;

use crate::core::kwargs::{ConstructError, Kwargs};
use crate::core::registry::{Revivable, Serializable};
use crate::core::revived::Revived;
use crate::model::messages::{AIMessage, HumanMessage, MessageRole, SystemMessage};

/// Serializer bookkeeping fields prompts accept and drop.
const IGNORED_PROMPT_FIELDS: &[&str] = &[
    "output_parser",
    "metadata",
    "tags",
    "name",
    "input_types",
    "optional_variables",
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TemplateFormat {
    FString,
    Mustache,
}

impl TemplateFormat {
    fn parse(text: &str) -> Result<Self, ConstructError> {
        match text {
            "f-string" => Ok(TemplateFormat::FString),
            "mustache" => Ok(TemplateFormat::Mustache),
            other => Err(ConstructError::for_field(
                "template_format",
                format!("unsupported template format `{other}` (expected f-string or mustache)"),
            )),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Segment {
    Literal(String),
    Variable(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MissingVariable {
    pub name: String,
}

impl fmt::Display for MissingVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing value for template variable `{}`", self.name)
    }
}

impl StdError for MissingVariable {}

fn parse_template(template: &str, format: TemplateFormat) -> Result<Vec<Segment>, ConstructError> {
    match format {
        TemplateFormat::FString => parse_fstring(template),
        TemplateFormat::Mustache => parse_mustache(template),
    }
}

fn parse_fstring(template: &str) -> Result<Vec<Segment>, ConstructError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => {
                            return Err(ConstructError::for_field(
                                "template",
                                "unterminated `{` in f-string template",
                            ));
                        }
                        Some(other) => field.push(other),
                    }
                }
                // Conversion and format specs are accepted but not applied.
                let name = field
                    .split(['!', ':'])
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                if name.is_empty() {
                    return Err(ConstructError::for_field(
                        "template",
                        "positional `{}` placeholders are not supported",
                    ));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name));
            }
            '}' => {
                return Err(ConstructError::for_field(
                    "template",
                    "single `}` in f-string template",
                ));
            }
            other => literal.push(other),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn parse_mustache(template: &str) -> Result<Vec<Segment>, ConstructError> {
    let mut segments = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        if start > 0 {
            segments.push(Segment::Literal(rest[..start].to_string()));
        }
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            return Err(ConstructError::for_field(
                "template",
                "unterminated `{{` in mustache template",
            ));
        };
        let tag = after[..end].trim();
        match tag.chars().next() {
            None => {
                return Err(ConstructError::for_field("template", "empty mustache tag"));
            }
            Some('!') => {}
            Some('#' | '^' | '/' | '>' | '&' | '{') => {
                return Err(ConstructError::for_field(
                    "template",
                    format!("mustache tag `{tag}` is not supported"),
                ));
            }
            Some(_) => segments.push(Segment::Variable(tag.to_string())),
        }
        rest = &after[end + 2..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }
    Ok(segments)
}

fn variables_of(segments: &[Segment]) -> Vec<String> {
    segments
        .iter()
        .filter_map(|segment| match segment {
            Segment::Variable(name) => Some(name.clone()),
            Segment::Literal(_) => None,
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct PromptTemplate {
    template: String,
    template_format: TemplateFormat,
    input_variables: Vec<String>,
    partial_variables: BTreeMap<String, String>,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn template_format(&self) -> TemplateFormat {
        self.template_format
    }

    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    pub fn partial_variables(&self) -> &BTreeMap<String, String> {
        &self.partial_variables
    }

    /// Renders the template. Partial variables fill in anything `values` leaves out.
    pub fn format(&self, values: &BTreeMap<String, String>) -> Result<String, MissingVariable> {
        let mut out = String::with_capacity(self.template.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(name) => {
                    let value = values
                        .get(name)
                        .or_else(|| self.partial_variables.get(name))
                        .ok_or_else(|| MissingVariable { name: name.clone() })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

fn take_partial_variables(kwargs: &mut Kwargs) -> Result<BTreeMap<String, String>, ConstructError> {
    match kwargs.take("partial_variables") {
        None | Some(Revived::Null) => Ok(BTreeMap::new()),
        Some(Revived::Object(map)) => map
            .into_iter()
            .map(|(key, value)| match value {
                Revived::String(text) => Ok((key, text)),
                other => Err(ConstructError::for_field(
                    "partial_variables",
                    format!("`{key}` must be a string, found {}", other.kind_name()),
                )),
            })
            .collect(),
        Some(other) => Err(ConstructError::for_field(
            "partial_variables",
            format!("expected a mapping, found {}", other.kind_name()),
        )),
    }
}

impl Revivable for PromptTemplate {
    const NAME: &'static str = "PromptTemplate";

    fn from_kwargs(kwargs: &mut Kwargs) -> Result<Self, ConstructError> {
        let template = kwargs.required_string("template")?;
        let template_format = match kwargs.optional_string("template_format")? {
            Some(text) => TemplateFormat::parse(&text)?,
            None => TemplateFormat::FString,
        };
        let segments = parse_template(&template, template_format)?;
        let partial_variables = take_partial_variables(kwargs)?;
        let inferred = variables_of(&segments)
            .into_iter()
            .filter(|name| !partial_variables.contains_key(name))
            .collect::<Vec<_>>();

        let declared = kwargs.optional_string_list("input_variables")?;
        let validate = kwargs.optional_bool("validate_template")?.unwrap_or(false);
        if validate {
            if let Some(declared) = &declared {
                let declared_set = declared.iter().collect::<BTreeSet<_>>();
                let inferred_set = inferred.iter().collect::<BTreeSet<_>>();
                if declared_set != inferred_set {
                    return Err(ConstructError::for_field(
                        "input_variables",
                        format!("declared {declared:?} but template uses {inferred:?}"),
                    ));
                }
            }
        }
        kwargs.ignore(IGNORED_PROMPT_FIELDS);

        Ok(Self {
            template,
            template_format,
            input_variables: declared.unwrap_or(inferred),
            partial_variables,
            segments,
        })
    }
}

/// Pairs a role with a prompt template; the three role types share this shape.
macro_rules! message_prompt_template {
    ($name:ident, $role:expr) => {
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            prompt: PromptTemplate,
        }

        impl $name {
            pub fn role(&self) -> MessageRole {
                $role
            }

            pub fn prompt(&self) -> &PromptTemplate {
                &self.prompt
            }
        }

        impl Revivable for $name {
            const NAME: &'static str = stringify!($name);

            fn from_kwargs(kwargs: &mut Kwargs) -> Result<Self, ConstructError> {
                let prompt = kwargs.required_instance::<PromptTemplate>("prompt")?;
                kwargs.ignore(&["input_variables", "additional_kwargs"]);
                kwargs.ignore(IGNORED_PROMPT_FIELDS);
                Ok(Self { prompt })
            }
        }
    };
}

message_prompt_template!(HumanMessagePromptTemplate, MessageRole::Human);
message_prompt_template!(SystemMessagePromptTemplate, MessageRole::System);
message_prompt_template!(AIMessagePromptTemplate, MessageRole::Ai);

#[derive(Clone, Debug, PartialEq)]
pub enum ChatEntry {
    Template(MessageRole, PromptTemplate),
    Message(MessageRole, String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatPromptTemplate {
    messages: Vec<ChatEntry>,
    input_variables: Vec<String>,
}

impl ChatPromptTemplate {
    pub fn messages(&self) -> &[ChatEntry] {
        &self.messages
    }

    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    pub fn format_messages(
        &self,
        values: &BTreeMap<String, String>,
    ) -> Result<Vec<(MessageRole, String)>, MissingVariable> {
        self.messages
            .iter()
            .map(|entry| match entry {
                ChatEntry::Template(role, prompt) => Ok((*role, prompt.format(values)?)),
                ChatEntry::Message(role, content) => Ok((*role, content.clone())),
            })
            .collect()
    }
}

fn chat_entry(instance: Box<dyn Serializable>) -> Result<ChatEntry, ConstructError> {
    let any = instance.as_any();
    if let Some(template) = any.downcast_ref::<HumanMessagePromptTemplate>() {
        return Ok(ChatEntry::Template(template.role(), template.prompt.clone()));
    }
    if let Some(template) = any.downcast_ref::<SystemMessagePromptTemplate>() {
        return Ok(ChatEntry::Template(template.role(), template.prompt.clone()));
    }
    if let Some(template) = any.downcast_ref::<AIMessagePromptTemplate>() {
        return Ok(ChatEntry::Template(template.role(), template.prompt.clone()));
    }
    if let Some(message) = any.downcast_ref::<HumanMessage>() {
        return Ok(ChatEntry::Message(message.role(), message.content().to_string()));
    }
    if let Some(message) = any.downcast_ref::<SystemMessage>() {
        return Ok(ChatEntry::Message(message.role(), message.content().to_string()));
    }
    if let Some(message) = any.downcast_ref::<AIMessage>() {
        return Ok(ChatEntry::Message(message.role(), message.content().to_string()));
    }
    Err(ConstructError::for_field(
        "messages",
        format!("unsupported message type {}", instance.type_name()),
    ))
}

impl Revivable for ChatPromptTemplate {
    const NAME: &'static str = "ChatPromptTemplate";

    fn from_kwargs(kwargs: &mut Kwargs) -> Result<Self, ConstructError> {
        let messages = kwargs
            .instance_list("messages")?
            .ok_or_else(|| ConstructError::for_field("messages", "field required"))?
            .into_iter()
            .map(chat_entry)
            .collect::<Result<Vec<_>, _>>()?;

        let inferred = messages
            .iter()
            .filter_map(|entry| match entry {
                ChatEntry::Template(_, prompt) => Some(prompt.input_variables().iter().cloned()),
                ChatEntry::Message(..) => None,
            })
            .flatten()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        let input_variables = kwargs.optional_string_list("input_variables")?.unwrap_or(inferred);
        kwargs.ignore(&["partial_variables", "validate_template"]);
        kwargs.ignore(IGNORED_PROMPT_FIELDS);

        Ok(Self {
            messages,
            input_variables,
        })
    }
}
