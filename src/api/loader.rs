//! Purpose: Public entry points that revive serialized text or parsed JSON.
//! Exports: `Loader`, `load`, `loads`, `ApiResult`.
//! Role: Binds options, a symbol registry and an environment into a per-call reviver.
//! Invariants: Each call builds a fresh reviver; nothing carries over between calls.
//! Invariants: `loads` is exactly "parse, then `load`".

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::core::env::{EnvLookup, ProcessEnv};
use crate::core::error::{Error, ErrorKind};
use crate::core::options::ReviveOptions;
use crate::core::registry::SymbolRegistry;
use crate::core::revived::Revived;
use crate::core::reviver::Reviver;
use crate::json::parse;

pub type ApiResult<T> = Result<T, Error>;

#[derive(Clone)]
pub struct Loader {
    registry: Cow<'static, SymbolRegistry>,
    env: Arc<dyn EnvLookup>,
}

impl Loader {
    /// Built-in classes, process environment.
    pub fn new() -> Self {
        Self {
            registry: Cow::Borrowed(SymbolRegistry::builtin()),
            env: Arc::new(ProcessEnv),
        }
    }

    pub fn with_registry(mut self, registry: SymbolRegistry) -> Self {
        self.registry = Cow::Owned(registry);
        self
    }

    pub fn with_env(mut self, env: impl EnvLookup + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    pub fn registry(&self) -> &SymbolRegistry {
        &self.registry
    }

    pub fn reviver<'a>(&'a self, options: &'a ReviveOptions) -> Reviver<'a> {
        Reviver::new(options, &self.registry, self.env.as_ref())
    }

    pub fn load(&self, value: Value, options: &ReviveOptions) -> ApiResult<Revived> {
        debug!(
            secrets = options.secrets_map.len(),
            extra_namespaces = options.valid_namespaces.len(),
            overrides = options.additional_import_mappings.len(),
            secrets_from_env = options.secrets_from_env,
            "starting revival"
        );
        self.reviver(options).revive(value)
    }

    pub fn loads(&self, text: &str, options: &ReviveOptions) -> ApiResult<Revived> {
        debug!(bytes = text.len(), "parsing serialized input");
        let value = parse::from_str::<Value>(text).map_err(|err| {
            Error::new(ErrorKind::Parse)
                .with_message("failed to parse JSON input")
                .with_hint(parse::hint_for_error(&err, "loads"))
                .with_source(err)
        })?;
        self.load(value, options)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owned = matches!(self.registry, Cow::Owned(_));
        f.debug_struct("Loader")
            .field("custom_registry", &owned)
            .finish_non_exhaustive()
    }
}

/// Revives an already-parsed JSON value with the built-in registry.
pub fn load(value: Value, options: &ReviveOptions) -> ApiResult<Revived> {
    Loader::new().load(value, options)
}

/// Parses `text` as JSON and revives it with the built-in registry.
pub fn loads(text: &str, options: &ReviveOptions) -> ApiResult<Revived> {
    Loader::new().loads(text, options)
}
