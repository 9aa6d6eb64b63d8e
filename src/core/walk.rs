//! Purpose: Post-order walk of a parsed JSON tree through the reviver.
//! Exports: `revive_tree`, `MAX_REVIVE_DEPTH`.
//! Role: Guarantees nested nodes are live before their parent constructor sees them.
//! Invariants: Mapping values are revived before the mapping itself is dispatched.
//! Invariants: The first error aborts the walk; no partial tree is returned.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::error::{Error, ErrorKind};
use crate::core::reviver::Reviver;
use crate::core::revived::Revived;

/// Container nesting accepted before the walk gives up.
pub const MAX_REVIVE_DEPTH: usize = 256;

pub fn revive_tree(reviver: &Reviver<'_>, value: Value) -> Result<Revived, Error> {
    walk(reviver, value, 0)
}

fn walk(reviver: &Reviver<'_>, value: Value, depth: usize) -> Result<Revived, Error> {
    match value {
        Value::Object(map) => {
            check_depth(depth)?;
            let mut children = BTreeMap::new();
            for (key, child) in map {
                children.insert(key, walk(reviver, child, depth + 1)?);
            }
            reviver.revive_node(Revived::Object(children))
        }
        Value::Array(items) => {
            check_depth(depth)?;
            items
                .into_iter()
                .map(|item| walk(reviver, item, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Revived::Array)
        }
        scalar => Ok(Revived::from_json(scalar)),
    }
}

fn check_depth(depth: usize) -> Result<(), Error> {
    if depth >= MAX_REVIVE_DEPTH {
        return Err(Error::new(ErrorKind::MalformedNode)
            .with_message(format!("nesting exceeds {MAX_REVIVE_DEPTH} levels")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::env::MapEnv;
    use crate::core::options::ReviveOptions;
    use crate::core::registry::SymbolRegistry;
    use serde_json::json;

    fn revive(value: Value) -> Result<Revived, Error> {
        let options = ReviveOptions::new().with_secrets_from_env(false);
        let env = MapEnv::new();
        Reviver::new(&options, SymbolRegistry::builtin(), &env).revive(value)
    }

    #[test]
    fn sequences_keep_order() {
        let revived = revive(json!([3, "two", {"one": 1}, null])).expect("revive");
        assert_eq!(
            revived.as_plain_json(),
            Some(json!([3, "two", {"one": 1}, null]))
        );
    }

    #[test]
    fn nesting_limit_is_enforced() {
        let mut value = json!(0);
        for _ in 0..(MAX_REVIVE_DEPTH + 1) {
            value = Value::Array(vec![value]);
        }
        let err = revive(value).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedNode);
    }

    #[test]
    fn nesting_just_under_the_limit_is_accepted() {
        let mut value = json!({"leaf": true});
        for _ in 0..(MAX_REVIVE_DEPTH - 1) {
            value = Value::Array(vec![value]);
        }
        assert!(revive(value).is_ok());
    }

    #[test]
    fn child_error_wins_over_parent_error() {
        let value = json!({
            "lc": 1,
            "type": "not_implemented",
            "id": ["x"],
            "repr": {"lc": 1, "type": "secret", "id": ["NOPE"]}
        });
        let err = revive(value).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingSecret);
    }
}
