//! Purpose: Node-level revival: secret, not-implemented and constructor dispatch.
//! Exports: `Reviver`, `NodeKind`.
//! Role: The security boundary; decides which serialized nodes become live objects.
//! Invariants: Dispatch requires `lc == 1`, a recognized `type`, and a non-null `id`.
//! Invariants: Every constructor passes the allowlist, the import table (built-in namespaces),
//! Invariants: and the constructible-family check before any constructor runs.
//! Notes: Errors are returned, never logged; trace events carry symbol paths, not secret values.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tracing::{debug, trace};

use crate::core::env::EnvLookup;
use crate::core::error::{Error, ErrorKind};
use crate::core::kwargs::Kwargs;
use crate::core::mapping::ImportMappings;
use crate::core::namespace::{
    NamespaceAllowlist, SymbolPath, is_default_namespace, split_constructor_id,
};
use crate::core::options::ReviveOptions;
use crate::core::registry::{Serializable, Symbol, SymbolRegistry};
use crate::core::revived::{Revived, SecretString};
use crate::core::walk;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NodeKind {
    Secret,
    NotImplemented,
    Constructor,
}

impl NodeKind {
    /// Classifies a mapping node; `None` means ordinary data.
    pub fn of(node: &BTreeMap<String, Revived>) -> Option<NodeKind> {
        let lc_is_one = match node.get("lc") {
            Some(Revived::Number(num)) => num.as_u64() == Some(1) || num.as_f64() == Some(1.0),
            _ => false,
        };
        if !lc_is_one {
            return None;
        }
        if node.get("id").is_none_or(Revived::is_null) {
            return None;
        }
        match node.get("type").and_then(Revived::as_str) {
            Some("secret") => Some(NodeKind::Secret),
            Some("not_implemented") => Some(NodeKind::NotImplemented),
            Some("constructor") => Some(NodeKind::Constructor),
            _ => None,
        }
    }
}

/// Immutable revival context for one call.
pub struct Reviver<'a> {
    secrets_map: &'a HashMap<String, String>,
    secrets_from_env: bool,
    allowlist: NamespaceAllowlist,
    mappings: ImportMappings,
    registry: &'a SymbolRegistry,
    env: &'a dyn EnvLookup,
}

impl<'a> Reviver<'a> {
    pub fn new(
        options: &'a ReviveOptions,
        registry: &'a SymbolRegistry,
        env: &'a dyn EnvLookup,
    ) -> Self {
        Self {
            secrets_map: &options.secrets_map,
            secrets_from_env: options.secrets_from_env,
            allowlist: NamespaceAllowlist::new(options.valid_namespaces.iter().cloned()),
            mappings: ImportMappings::with_overrides(options.additional_import_mappings.clone()),
            registry,
            env,
        }
    }

    pub fn allowlist(&self) -> &NamespaceAllowlist {
        &self.allowlist
    }

    pub fn mappings(&self) -> &ImportMappings {
        &self.mappings
    }

    /// Revives a whole tree, children before parents.
    pub fn revive(&self, value: Value) -> Result<Revived, Error> {
        walk::revive_tree(self, value)
    }

    /// Revives one node whose children are already revived. Non-mappings pass through.
    pub fn revive_node(&self, value: Revived) -> Result<Revived, Error> {
        let Revived::Object(node) = value else {
            return Ok(value);
        };
        match NodeKind::of(&node) {
            None => Ok(Revived::Object(node)),
            Some(NodeKind::Secret) => self.revive_secret(&node).map(Revived::Secret),
            Some(NodeKind::NotImplemented) => Err(Error::new(ErrorKind::NotSerializable)
                .with_message("trying to load an object that doesn't implement serialization")
                .with_node(display_node(&node))),
            Some(NodeKind::Constructor) => self.revive_constructor(node).map(Revived::Instance),
        }
    }

    fn revive_secret(&self, node: &BTreeMap<String, Revived>) -> Result<SecretString, Error> {
        let key = match node.get("id").and_then(Revived::as_array) {
            Some([Revived::String(key)]) => key,
            _ => {
                return Err(malformed(
                    node,
                    "secret id must be a list holding exactly one key",
                ));
            }
        };

        if let Some(value) = self.secrets_map.get(key) {
            trace!(key = %key, source = "map", "resolved secret");
            return Ok(SecretString::new(value.clone()));
        }
        if self.secrets_from_env {
            if let Some(value) = self.env.get_env(key).filter(|value| !value.is_empty()) {
                trace!(key = %key, source = "env", "resolved secret");
                return Ok(SecretString::new(value));
            }
        }

        let hint = if self.secrets_from_env {
            format!("Pass `{key}` in the secrets map or set it in the environment.")
        } else {
            format!("Pass `{key}` in the secrets map; environment fallback is disabled.")
        };
        Err(Error::new(ErrorKind::MissingSecret)
            .with_message(format!("missing key \"{key}\" in secrets map"))
            .with_key(key.clone())
            .with_hint(hint))
    }

    fn revive_constructor(
        &self,
        mut node: BTreeMap<String, Revived>,
    ) -> Result<Box<dyn Serializable>, Error> {
        let id = constructor_id(&node)?;
        let Some((namespace, name)) = split_constructor_id(&id) else {
            return Err(malformed(&node, "constructor id is empty"));
        };

        if let Err(rejection) = self.allowlist.check(namespace) {
            return Err(Error::new(ErrorKind::InvalidNamespace)
                .with_message(format!("invalid namespace: {}", rejection.describe()))
                .with_hint("Add the namespace via valid_namespaces if it is trusted.")
                .with_node(display_node(&node)));
        }

        let key = SymbolPath::from(id.clone());
        let symbol = self
            .resolve_symbol(&key, namespace, name)
            .map_err(|err| err.with_symbol(key.clone()))?;

        if !symbol.is_constructible() {
            return Err(Error::new(ErrorKind::InvalidNamespace)
                .with_message(format!(
                    "invalid namespace: `{}` is not a serializable class",
                    symbol.name()
                ))
                .with_symbol(key)
                .with_node(display_node(&node)));
        }

        let kwargs = match node.remove("kwargs") {
            None => Kwargs::default(),
            Some(Revived::Object(args)) => Kwargs::new(args),
            Some(other) => {
                node.insert("kwargs".to_string(), other);
                return Err(malformed(&node, "constructor kwargs must be a mapping"));
            }
        };

        debug!(symbol = %key, args = kwargs.len(), "constructing revived object");
        symbol.construct(kwargs).map_err(|err| {
            Error::new(ErrorKind::ConstructionFailed)
                .with_message(format!("{name} rejected its arguments: {err}"))
                .with_symbol(key)
                .with_source(err)
        })
    }

    fn resolve_symbol(
        &self,
        key: &SymbolPath,
        namespace: &[String],
        name: &str,
    ) -> Result<&'a Symbol, Error> {
        if namespace.first().is_some_and(|first| is_default_namespace(first)) {
            let Some(path) = self.mappings.resolve(key) else {
                return Err(Error::new(ErrorKind::UnsupportedVersion)
                    .with_message(format!(
                        "trying to deserialize something that cannot be deserialized in this version: {key}"
                    ))
                    .with_hint("The producer is newer or older than this build's import table."));
            };
            trace!(symbol = %key, path = %path, "resolved through import table");
            return self.import_path(path);
        }

        if self.mappings.is_override(key) {
            if let Some(path) = self.mappings.resolve(key) {
                trace!(symbol = %key, path = %path, "resolved through caller mapping");
                return self.import_path(path);
            }
        }

        trace!(symbol = %key, "resolved by module path");
        self.registry.import_symbol(namespace, name)
    }

    fn import_path(&self, path: &SymbolPath) -> Result<&'a Symbol, Error> {
        match path.name() {
            Some(name) => self.registry.import_symbol(path.module(), name),
            None => Err(Error::new(ErrorKind::ImportResolutionFailed)
                .with_message("import mapping resolves to an empty path")),
        }
    }
}

fn constructor_id(node: &BTreeMap<String, Revived>) -> Result<Vec<String>, Error> {
    let Some(items) = node.get("id").and_then(Revived::as_array) else {
        return Err(malformed(node, "constructor id must be a list of strings"));
    };
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| malformed(node, "constructor id must be a list of strings"))
}

fn display_node(node: &BTreeMap<String, Revived>) -> Value {
    Value::Object(
        node.iter()
            .map(|(key, value)| (key.clone(), value.to_display_json()))
            .collect(),
    )
}

fn malformed(node: &BTreeMap<String, Revived>, message: &str) -> Error {
    Error::new(ErrorKind::MalformedNode)
        .with_message(message.to_string())
        .with_node(display_node(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::env::MapEnv;
    use crate::model::prompts::PromptTemplate;
    use serde_json::json;

    fn node(value: Value) -> Revived {
        Revived::from_json(value)
    }

    fn revive_with(options: &ReviveOptions, env: &MapEnv, value: Value) -> Result<Revived, Error> {
        let reviver = Reviver::new(options, SymbolRegistry::builtin(), env);
        reviver.revive_node(node(value))
    }

    #[test]
    fn node_kind_requires_lc_one_and_id() {
        let plain = json!({"lc": 2, "type": "secret", "id": ["K"]});
        let Revived::Object(map) = node(plain) else { panic!("object") };
        assert_eq!(NodeKind::of(&map), None);

        let no_id = json!({"lc": 1, "type": "secret", "id": null});
        let Revived::Object(map) = node(no_id) else { panic!("object") };
        assert_eq!(NodeKind::of(&map), None);

        let float_lc = json!({"lc": 1.0, "type": "constructor", "id": ["a", "B"]});
        let Revived::Object(map) = node(float_lc) else { panic!("object") };
        assert_eq!(NodeKind::of(&map), Some(NodeKind::Constructor));

        let unknown_type = json!({"lc": 1, "type": "other", "id": ["x"]});
        let Revived::Object(map) = node(unknown_type) else { panic!("object") };
        assert_eq!(NodeKind::of(&map), None);
    }

    #[test]
    fn secret_map_wins_over_environment() {
        let options = ReviveOptions::new().with_secret("K", "from-map");
        let env = MapEnv::new().with_var("K", "from-env");
        let revived = revive_with(&options, &env, json!({"lc": 1, "type": "secret", "id": ["K"]}))
            .expect("secret");
        assert_eq!(revived.as_secret().map(SecretString::expose), Some("from-map"));
    }

    #[test]
    fn empty_env_value_counts_as_missing() {
        let options = ReviveOptions::new();
        let env = MapEnv::new().with_var("K", "");
        let err = revive_with(&options, &env, json!({"lc": 1, "type": "secret", "id": ["K"]}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingSecret);
        assert_eq!(err.key(), Some("K"));
    }

    #[test]
    fn secret_id_with_two_keys_is_malformed() {
        let err = revive_with(
            &ReviveOptions::new(),
            &MapEnv::new(),
            json!({"lc": 1, "type": "secret", "id": ["A", "B"]}),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedNode);
    }

    #[test]
    fn single_segment_langchain_namespace_is_rejected() {
        let err = revive_with(
            &ReviveOptions::new(),
            &MapEnv::new(),
            json!({"lc": 1, "type": "constructor", "id": ["langchain", "PromptTemplate"]}),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNamespace);
        assert!(err.message().unwrap_or_default().contains("root namespace"));
    }

    #[test]
    fn constructor_builds_prompt_template() {
        let revived = revive_with(
            &ReviveOptions::new(),
            &MapEnv::new(),
            json!({
                "lc": 1,
                "type": "constructor",
                "id": ["langchain", "prompts", "prompt", "PromptTemplate"],
                "kwargs": {"template": "Hi {name}"}
            }),
        )
        .expect("revived");
        let prompt = revived.downcast_ref::<PromptTemplate>().expect("prompt");
        assert_eq!(prompt.template(), "Hi {name}");
        assert_eq!(prompt.input_variables(), &["name".to_string()]);
    }

    #[test]
    fn non_mapping_kwargs_is_malformed() {
        let err = revive_with(
            &ReviveOptions::new(),
            &MapEnv::new(),
            json!({
                "lc": 1,
                "type": "constructor",
                "id": ["langchain_core", "prompts", "PromptTemplate"],
                "kwargs": ["template"]
            }),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedNode);
        assert!(err.node().and_then(|node| node.get("kwargs")).is_some());
    }

    #[test]
    fn non_object_values_pass_through() {
        let options = ReviveOptions::default();
        let reviver = Reviver::new(
            &options,
            SymbolRegistry::builtin(),
            &crate::core::env::ProcessEnv,
        );
        let revived = reviver.revive_node(Revived::from("plain")).expect("pass");
        assert_eq!(revived.as_str(), Some("plain"));
    }
}
