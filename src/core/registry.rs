//! Purpose: Compile-time factory table standing in for dynamic import.
//! Exports: `Serializable`, `Revivable`, `Symbol`, `Constructor`, `SymbolRegistry`.
//! Role: Maps (module path, symbol name) to either a constructor or a non-constructible symbol.
//! Invariants: Only `Revivable` types can be registered as constructible classes.
//! Invariants: The built-in registry is populated once and read-only afterwards.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use crate::core::error::{Error, ErrorKind};
use crate::core::kwargs::{ConstructError, Kwargs};

/// Marker for live objects produced by revival. Implemented through `Revivable` only.
pub trait Serializable: Any + fmt::Debug + Send + Sync {
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// A type that may be built from serialized named arguments.
pub trait Revivable: Any + fmt::Debug + Send + Sync + Sized {
    const NAME: &'static str;

    /// Pulls the arguments it accepts; anything left afterwards is rejected by the caller.
    fn from_kwargs(kwargs: &mut Kwargs) -> Result<Self, ConstructError>;
}

impl<T: Revivable> Serializable for T {
    fn type_name(&self) -> &'static str {
        T::NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl dyn Serializable {
    pub fn downcast_ref<T: Serializable>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Serializable>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

pub type Constructor = fn(Kwargs) -> Result<Box<dyn Serializable>, ConstructError>;

fn construct_boxed<T: Revivable>(mut kwargs: Kwargs) -> Result<Box<dyn Serializable>, ConstructError> {
    let instance = T::from_kwargs(&mut kwargs)?;
    kwargs.finish()?;
    Ok(Box::new(instance))
}

#[derive(Clone, Copy, Debug)]
pub enum Symbol {
    Class {
        name: &'static str,
        construct: Constructor,
    },
    /// Importable but outside the constructible family (functions, helpers, plain data).
    Opaque { name: &'static str },
}

impl Symbol {
    pub fn name(&self) -> &'static str {
        match self {
            Symbol::Class { name, .. } | Symbol::Opaque { name } => name,
        }
    }

    pub fn is_constructible(&self) -> bool {
        matches!(self, Symbol::Class { .. })
    }

    pub fn construct(&self, kwargs: Kwargs) -> Result<Box<dyn Serializable>, ConstructError> {
        match self {
            Symbol::Class { construct, .. } => construct(kwargs),
            Symbol::Opaque { name } => Err(ConstructError::new(format!(
                "{name} is not a constructible class"
            ))),
        }
    }
}

static BUILTIN_REGISTRY: LazyLock<SymbolRegistry> = LazyLock::new(|| {
    let mut registry = SymbolRegistry::new();
    crate::model::register_builtins(&mut registry);
    registry
});

#[derive(Clone, Debug, Default)]
pub struct SymbolRegistry {
    modules: BTreeMap<String, BTreeMap<String, Symbol>>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared registry holding the built-in object model.
    pub fn builtin() -> &'static SymbolRegistry {
        &BUILTIN_REGISTRY
    }

    /// Owned copy of the built-in registry, ready for caller registrations.
    pub fn with_builtins() -> Self {
        BUILTIN_REGISTRY.clone()
    }

    pub fn register_class<T: Revivable>(&mut self, module: &str) -> &mut Self {
        self.register_class_as::<T>(module, T::NAME)
    }

    /// Registers `T` under an explicit symbol name, e.g. for a re-export alias.
    pub fn register_class_as<T: Revivable>(&mut self, module: &str, name: &'static str) -> &mut Self {
        self.insert(
            module,
            Symbol::Class {
                name,
                construct: construct_boxed::<T>,
            },
        )
    }

    pub fn register_opaque(&mut self, module: &str, name: &'static str) -> &mut Self {
        self.insert(module, Symbol::Opaque { name })
    }

    fn insert(&mut self, module: &str, symbol: Symbol) -> &mut Self {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(symbol.name().to_string(), symbol);
        self
    }

    pub fn has_module(&self, module: &[String]) -> bool {
        self.modules.contains_key(&module.join("."))
    }

    /// Resolves `name` inside `module`, mirroring an import followed by attribute lookup.
    pub fn import_symbol(&self, module: &[String], name: &str) -> Result<&Symbol, Error> {
        let module_name = module.join(".");
        if module.is_empty() {
            return Err(Error::new(ErrorKind::ImportResolutionFailed)
                .with_message("empty module path"));
        }
        let symbols = self.modules.get(&module_name).ok_or_else(|| {
            Error::new(ErrorKind::ImportResolutionFailed)
                .with_message(format!("no module named `{module_name}`"))
                .with_hint("Register the module's classes with SymbolRegistry::register_class.")
        })?;
        symbols.get(name).ok_or_else(|| {
            Error::new(ErrorKind::ImportResolutionFailed)
                .with_message(format!("module `{module_name}` has no symbol `{name}`"))
        })
    }

    pub fn modules(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, Symbol>)> {
        self.modules
            .iter()
            .map(|(module, symbols)| (module.as_str(), symbols))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Widget {
        size: u64,
    }

    impl Revivable for Widget {
        const NAME: &'static str = "Widget";

        fn from_kwargs(kwargs: &mut Kwargs) -> Result<Self, ConstructError> {
            Ok(Self {
                size: kwargs.optional_u64("size")?.unwrap_or(1),
            })
        }
    }

    fn module(path: &str) -> Vec<String> {
        path.split('.').map(str::to_string).collect()
    }

    #[test]
    fn registered_class_constructs_and_downcasts() {
        let mut registry = SymbolRegistry::new();
        registry.register_class::<Widget>("acme.widgets");

        let symbol = registry
            .import_symbol(&module("acme.widgets"), "Widget")
            .expect("symbol");
        assert!(symbol.is_constructible());
        let instance = symbol.construct(Kwargs::default()).expect("construct");
        assert_eq!(instance.type_name(), "Widget");
        assert_eq!(instance.downcast_ref::<Widget>(), Some(&Widget { size: 1 }));
    }

    #[test]
    fn opaque_symbols_are_not_constructible() {
        let mut registry = SymbolRegistry::new();
        registry.register_opaque("acme.helpers", "build_widget");
        let symbol = registry
            .import_symbol(&module("acme.helpers"), "build_widget")
            .expect("symbol");
        assert!(!symbol.is_constructible());
        assert!(symbol.construct(Kwargs::default()).is_err());
    }

    #[test]
    fn missing_module_and_symbol_are_import_failures() {
        let mut registry = SymbolRegistry::new();
        registry.register_class::<Widget>("acme.widgets");

        let err = registry
            .import_symbol(&module("acme.gadgets"), "Widget")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ImportResolutionFailed);

        let err = registry
            .import_symbol(&module("acme.widgets"), "Gadget")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ImportResolutionFailed);
        assert!(err.message().unwrap_or_default().contains("Gadget"));
    }

    #[test]
    fn leftover_kwargs_fail_construction() {
        let mut registry = SymbolRegistry::new();
        registry.register_class::<Widget>("acme.widgets");
        let symbol = registry
            .import_symbol(&module("acme.widgets"), "Widget")
            .expect("symbol");
        let mut args = BTreeMap::new();
        args.insert("colour".to_string(), crate::core::revived::Revived::from("red"));
        let err = symbol.construct(Kwargs::new(args)).unwrap_err();
        assert!(err.message().contains("colour"));
    }

    #[test]
    fn builtin_registry_holds_prompt_template() {
        let registry = SymbolRegistry::builtin();
        assert!(registry.has_module(&module("langchain_core.prompts.prompt")));
        let symbol = registry
            .import_symbol(&module("langchain_core.prompts.prompt"), "PromptTemplate")
            .expect("symbol");
        assert!(symbol.is_constructible());
    }
}
