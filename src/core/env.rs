//! Purpose: Key/value environment lookup used for secret fallback.
//! Exports: `EnvLookup`, `ProcessEnv`, `MapEnv`.
//! Role: Keeps the reviver independent of the real process environment in tests and embedders.
//! Invariants: Lookups are read-only; nothing here writes to the environment.

use std::collections::HashMap;

pub trait EnvLookup: Send + Sync {
    fn get_env(&self, key: &str) -> Option<String>;
}

/// Reads the process environment. Non-unicode values are treated as unset.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get_env(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvLookup for MapEnv {
    fn get_env(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

impl<E: EnvLookup + ?Sized> EnvLookup for &E {
    fn get_env(&self, key: &str) -> Option<String> {
        (**self).get_env(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_env_returns_only_configured_keys() {
        let env = MapEnv::new().with_var("ANTHROPIC_API_KEY", "from-env");
        assert_eq!(env.get_env("ANTHROPIC_API_KEY").as_deref(), Some("from-env"));
        assert_eq!(env.get_env("OTHER"), None);
    }

    #[test]
    fn process_env_misses_unset_key() {
        assert_eq!(ProcessEnv.get_env("LC_REVIVE_TEST_SURELY_UNSET_KEY"), None);
    }
}
