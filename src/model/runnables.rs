//! Purpose: Composition and output-parsing classes revived from serialized kwargs.
//! Exports: `RunnableSequence`, `StrOutputParser`.
//! Role: Built-in classes whose arguments are themselves revived objects.
//! Invariants: A sequence always has a first and a last step.

use crate::core::kwargs::{ConstructError, Kwargs};
use crate::core::registry::{Revivable, Serializable};

#[derive(Debug)]
pub struct RunnableSequence {
    steps: Vec<Box<dyn Serializable>>,
    name: Option<String>,
}

impl RunnableSequence {
    pub fn steps(&self) -> &[Box<dyn Serializable>] {
        &self.steps
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.type_name()).collect()
    }
}

impl Revivable for RunnableSequence {
    const NAME: &'static str = "RunnableSequence";

    fn from_kwargs(kwargs: &mut Kwargs) -> Result<Self, ConstructError> {
        let first = kwargs.required_any_instance("first")?;
        let middle = kwargs.instance_list("middle")?.unwrap_or_default();
        let last = kwargs.required_any_instance("last")?;
        let name = kwargs.optional_string("name")?;

        let mut steps = Vec::with_capacity(middle.len() + 2);
        steps.push(first);
        steps.extend(middle);
        steps.push(last);
        Ok(Self { steps, name })
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StrOutputParser;

impl Revivable for StrOutputParser {
    const NAME: &'static str = "StrOutputParser";

    fn from_kwargs(_kwargs: &mut Kwargs) -> Result<Self, ConstructError> {
        Ok(Self)
    }
}
