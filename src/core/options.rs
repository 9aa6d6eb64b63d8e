//! Purpose: Caller-facing knobs for one revival call.
//! Exports: `ReviveOptions`.
//! Role: Plain configuration struct; the reviver derives its immutable context from it.
//! Invariants: `secrets_from_env` defaults to true.
//! Invariants: `Debug` output lists secret keys but never secret values.

use std::collections::HashMap;
use std::fmt;

use crate::core::namespace::SymbolPath;
use crate::core::revived::SECRET_MASK;

#[derive(Clone)]
pub struct ReviveOptions {
    pub secrets_map: HashMap<String, String>,
    pub valid_namespaces: Vec<String>,
    pub secrets_from_env: bool,
    pub additional_import_mappings: HashMap<SymbolPath, SymbolPath>,
}

impl ReviveOptions {
    pub fn new() -> Self {
        Self {
            secrets_map: HashMap::new(),
            valid_namespaces: Vec::new(),
            secrets_from_env: true,
            additional_import_mappings: HashMap::new(),
        }
    }

    pub fn with_secret(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets_map.insert(key.into(), value.into());
        self
    }

    pub fn with_valid_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.valid_namespaces.push(namespace.into());
        self
    }

    pub fn with_secrets_from_env(mut self, enabled: bool) -> Self {
        self.secrets_from_env = enabled;
        self
    }

    pub fn with_import_mapping(mut self, key: SymbolPath, path: SymbolPath) -> Self {
        self.additional_import_mappings.insert(key, path);
        self
    }
}

impl Default for ReviveOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReviveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = self.secrets_map.keys().collect::<Vec<_>>();
        keys.sort();
        let masked = keys
            .into_iter()
            .map(|key| (key, SECRET_MASK))
            .collect::<Vec<_>>();
        f.debug_struct("ReviveOptions")
            .field("secrets_map", &masked)
            .field("valid_namespaces", &self.valid_namespaces)
            .field("secrets_from_env", &self.secrets_from_env)
            .field("additional_import_mappings", &self.additional_import_mappings)
            .finish()
    }
}
