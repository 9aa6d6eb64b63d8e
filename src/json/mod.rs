//! Purpose: Internal JSON parsing boundary used by the loader.
//! Exports: `parse` module with decode helpers and parse-failure categorization.
//! Role: Single seam for parser implementation so callsites avoid ad hoc decode logic.
//! Invariants: Text entry points decode through this module before revival.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

pub(crate) mod parse;
