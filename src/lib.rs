//! Purpose: Library crate for allowlisted revival of serialized JSON into typed objects.
//! Exports: `api` (load/loads, options, errors), `core` (reviver internals), `model` (built-in classes).
//! Role: Backs the `lc-revive` CLI and embedders that need to read serializer output safely.
//! Invariants: Only registered `Revivable` types are ever constructed from input.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
pub(crate) mod json;
pub mod model;
