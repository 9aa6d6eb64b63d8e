//! Purpose: Define the stable public Rust API boundary for lc-revive.
//! Exports: Load entry points, options, revived values, registry hooks, and errors.
//! Role: Public, additive-only surface used by the CLI and embedders.
//! Invariants: Everything an embedder needs to register classes and revive input is reachable here.
//! Invariants: Internal parsing helpers remain private.

mod loader;

pub use crate::core::env::{EnvLookup, MapEnv, ProcessEnv};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::kwargs::{ConstructError, Kwargs};
pub use crate::core::mapping::ImportMappings;
pub use crate::core::namespace::{DEFAULT_NAMESPACES, NamespaceAllowlist, SymbolPath};
pub use crate::core::options::ReviveOptions;
pub use crate::core::registry::{Revivable, Serializable, Symbol, SymbolRegistry};
pub use crate::core::revived::{Revived, SECRET_MASK, SecretString};
pub use crate::core::reviver::Reviver;
pub use loader::{ApiResult, Loader, load, loads};
