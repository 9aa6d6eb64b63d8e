// Core modules implementing the revival boundary, lookup tables, and error modeling.
pub mod env;
pub mod error;
pub mod kwargs;
pub mod mapping;
pub mod namespace;
pub mod options;
pub mod registry;
pub mod revived;
pub mod reviver;
pub mod walk;
