//! Error taxonomy for statement parsing.

use thiserror::Error;

/// Failures surfaced while parsing a statement template against live schema
/// metadata. A parse failure is a normal outcome for malformed input; no
/// partial descriptor is ever returned.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The first token is not one of INSERT, UPDATE, DELETE or SELECT.
    #[error("unsupported statement: expected INSERT, UPDATE, DELETE or SELECT")]
    UnsupportedStatement,

    /// Select-only parsing was invoked on a template carrying placeholders.
    #[error("statement must not contain input parameters")]
    InputParametersNotAllowed,

    /// A referenced table or view is absent from the introspected schema.
    #[error("table(s) '{tables}' cannot be found in schema '{schema}'")]
    UnknownTable { tables: String, schema: String },

    /// Fewer columns were discovered than parameters that must bind to them.
    #[error("found {found} column(s) for {expected} input parameter(s)")]
    ColumnCountMismatch { found: usize, expected: usize },

    /// The template is too short or inconsistent for its statement kind.
    #[error("malformed statement: {0}")]
    MalformedStatement(String),

    /// The underlying introspection or dry-run probe failed.
    #[error(transparent)]
    Metadata(#[from] anyhow::Error),
}

impl ParseError {
    pub(crate) fn unknown_tables(missing: &[&str], schema: Option<&str>) -> Self {
        ParseError::UnknownTable {
            tables: missing.join("', '"),
            schema: schema.unwrap_or("<current>").to_string(),
        }
    }
}
