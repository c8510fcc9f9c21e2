//! Migrates JavaScript and TypeScript modules from default exports to named exports.
//!
//! The entry point is [`migration::migrate`]; the other modules are the stages and the
//! code model it is built from.

pub mod alias_normalizer;
pub mod config;
pub mod converter;
pub mod edits;
pub mod exclusion;
pub mod graph_builder;
pub mod migration;
pub mod mock_fixer;
pub mod module_graph;
pub mod module_set;
pub mod registry;
pub mod resolver;
pub mod rewriter;
pub mod source_module;
pub mod tsconfig;
pub mod visitors;

pub use config::Config;
pub use migration::{MigrationReport, migrate};
