//! SQL template parsing and schema binding against live database metadata.
//!
//! Given a statement template with named placeholders (`UPDATE contacts SET
//! first_name = :first WHERE id = :id`), the engine classifies the
//! statement, validates the referenced tables against the connected schema,
//! resolves every placeholder to a concrete column with its JDBC-equivalent
//! type, and produces an immutable [`StatementDescriptor`] for a downstream
//! execution engine to bind values against. Two derived rewrites come with
//! it: the execution form (`:#name` markers) and a defaulted form with
//! sample literals substituted, which also feeds the dry-run SELECT used to
//! discover output columns.
//!
//! Live metadata access sits behind the [`SchemaIntrospect`] and
//! [`QueryDescribe`] contracts. [`AnySchemaClient`] implements both over a
//! sqlx `any` pool (PostgreSQL, MySQL, SQLite); [`StaticCatalog`] is an
//! in-memory stand-in for tests and development. Per-product differences
//! (default schemas, pattern wildcards, auto-increment detection,
//! identifier casing) live in [`dialect`] implementations selected from the
//! reported product name, with unknown products degrading gracefully to the
//! standard behavior.
//!
//! Parsing is informal by design: a delimiter-class tokenizer and a handful
//! of lookback rules stand in for a SQL grammar, which is enough for
//! stored-procedure-like templates over `INSERT`, `UPDATE`, `DELETE` and
//! `SELECT`. Anything the heuristics cannot reconcile with introspected
//! metadata fails with a typed [`ParseError`]; a parse failure is a normal
//! outcome, never a crash.

pub mod cache;
pub mod client;
pub mod dialect;
pub mod error;
pub mod introspect;
pub mod jdbc;
pub mod model;
pub mod parser;
pub mod probe;
pub mod token;

pub use cache::DescriptorCache;
pub use client::AnySchemaClient;
pub use error::ParseError;
pub use introspect::{QueryColumn, QueryDescribe, SchemaIntrospect, StaticCatalog, TableColumn};
pub use jdbc::JdbcType;
pub use model::{ColumnDescriptor, ParameterBinding, StatementDescriptor, StatementKind};
pub use parser::StatementParser;
pub use probe::MetadataProber;
pub use token::{has_placeholders, tokenize, Token};
