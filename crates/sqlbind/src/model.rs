//! The immutable statement descriptor and its derived SQL rewrites.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::jdbc::JdbcType;
use crate::token::placeholder_spans;

/// Statement kinds the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatementKind {
    Insert,
    Update,
    Delete,
    Select,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::Select => "SELECT",
        }
    }
}

/// Column metadata as resolved by the prober. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub jdbc_type: JdbcType,
    pub ordinal: usize,
    pub auto_increment: bool,
}

/// A single input or output parameter of a parsed statement.
///
/// Input parameters carry exactly one of `column` (named binding) or
/// `values_index` (positional binding within a `VALUES` tuple); output
/// parameters carry only the name and type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterBinding {
    name: String,
    column: Option<String>,
    values_index: Option<usize>,
    jdbc_type: JdbcType,
}

impl ParameterBinding {
    pub(crate) fn named(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: Some(column.into()),
            values_index: None,
            jdbc_type: JdbcType::Other,
        }
    }

    pub(crate) fn positional(name: impl Into<String>, values_index: usize) -> Self {
        Self {
            name: name.into(),
            column: None,
            values_index: Some(values_index),
            jdbc_type: JdbcType::Other,
        }
    }

    pub(crate) fn output(name: impl Into<String>, jdbc_type: JdbcType) -> Self {
        Self {
            name: name.into(),
            column: None,
            values_index: None,
            jdbc_type,
        }
    }

    pub(crate) fn set_jdbc_type(&mut self, jdbc_type: JdbcType) {
        self.jdbc_type = jdbc_type;
    }

    /// The placeholder (or projected column) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bound column for named bindings.
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// The slot within the `VALUES` tuple for positional bindings.
    pub fn values_index(&self) -> Option<usize> {
        self.values_index
    }

    pub fn jdbc_type(&self) -> JdbcType {
        self.jdbc_type
    }

    /// The literal substituted for this parameter in the defaulted rewrite.
    pub fn sample_literal(&self) -> &'static str {
        self.jdbc_type.sample_literal()
    }
}

/// Aggregate result of parsing one statement template against live schema
/// metadata. Logically immutable; the derived SQL forms are pure functions
/// of the stored fields, so recomputing them can never go stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementDescriptor {
    kind: StatementKind,
    raw: String,
    schema: Option<String>,
    table_names: Vec<String>,
    in_params: Vec<ParameterBinding>,
    out_params: Vec<ParameterBinding>,
    auto_increment_column: Option<String>,
    batch: bool,
}

impl StatementDescriptor {
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// The trimmed statement template as submitted.
    pub fn raw_statement(&self) -> &str {
        &self.raw
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Referenced tables in order of discovery; the first one is primary.
    pub fn table_names(&self) -> &[String] {
        &self.table_names
    }

    pub fn primary_table(&self) -> Option<&str> {
        self.table_names.first().map(String::as_str)
    }

    pub fn in_params(&self) -> &[ParameterBinding] {
        &self.in_params
    }

    pub fn out_params(&self) -> &[ParameterBinding] {
        &self.out_params
    }

    /// The database-populated column an INSERT hands back, if any.
    pub fn auto_increment_column(&self) -> Option<&str> {
        self.auto_increment_column.as_deref()
    }

    /// Whether batch execution survived verification.
    pub fn batch(&self) -> bool {
        self.batch
    }

    /// The template rewritten to the execution engine's bind-marker form:
    /// every `:name` becomes `:#name`.
    pub fn executable_statement(&self) -> String {
        rewrite_executable(&self.raw)
    }

    /// The executable form with every placeholder replaced by its sample
    /// literal, suitable for a dry validation run.
    pub fn defaulted_statement(&self) -> String {
        rewrite_defaulted(&self.raw, &self.in_params)
    }
}

/// Mutable aggregation used while a statement is being parsed. `assemble`
/// freezes it into the final descriptor, verifying the batch request.
#[derive(Debug)]
pub(crate) struct DescriptorDraft {
    pub kind: StatementKind,
    pub raw: String,
    pub schema: Option<String>,
    pub table_names: Vec<String>,
    pub in_params: Vec<ParameterBinding>,
    pub out_params: Vec<ParameterBinding>,
    pub auto_increment_column: Option<String>,
}

impl DescriptorDraft {
    pub fn new(kind: StatementKind, raw: impl Into<String>, schema: Option<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
            schema,
            table_names: Vec::new(),
            in_params: Vec::new(),
            out_params: Vec::new(),
            auto_increment_column: None,
        }
    }

    pub fn assemble(self, batch_requested: bool) -> StatementDescriptor {
        let batch = if batch_requested
            && (self.kind == StatementKind::Select || self.in_params.is_empty())
        {
            warn!(
                kind = self.kind.as_str(),
                "batch execution is only meaningful for parameterized mutations, downgrading"
            );
            false
        } else {
            batch_requested
        };
        StatementDescriptor {
            kind: self.kind,
            raw: self.raw,
            schema: self.schema,
            table_names: self.table_names,
            in_params: self.in_params,
            out_params: self.out_params,
            auto_increment_column: self.auto_increment_column,
            batch,
        }
    }
}

/// Rewrites every `:name` placeholder to the `:#name` bind-marker form. A
/// pure string substitution, applied left to right over the raw template.
pub(crate) fn rewrite_executable(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    let mut last = 0;
    for (span, name) in placeholder_spans(raw) {
        out.push_str(&raw[last..span.start]);
        out.push_str(":#");
        out.push_str(name);
        last = span.end;
    }
    out.push_str(&raw[last..]);
    out
}

/// Rewrites the executable form with sample literals substituted for every
/// bound placeholder. Names with no binding are left untouched.
pub(crate) fn rewrite_defaulted(raw: &str, params: &[ParameterBinding]) -> String {
    let executable = rewrite_executable(raw);
    let mut out = String::with_capacity(executable.len());
    let mut rest = executable.as_str();
    while let Some(at) = rest.find(":#") {
        out.push_str(&rest[..at]);
        let tail = &rest[at + 2..];
        let len = identifier_prefix_len(tail);
        let name = &tail[..len];
        match params.iter().find(|p| p.name() == name) {
            Some(param) if len > 0 => out.push_str(param.sample_literal()),
            _ => {
                out.push_str(":#");
                out.push_str(name);
            }
        }
        rest = &tail[len..];
    }
    out.push_str(rest);
    out
}

fn identifier_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(&b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return 0,
    }
    bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(kind: StatementKind, raw: &str, in_params: Vec<ParameterBinding>) -> StatementDescriptor {
        let mut draft = DescriptorDraft::new(kind, raw, None);
        draft.in_params = in_params;
        draft.assemble(false)
    }

    #[test]
    fn executable_rewrite_marks_every_placeholder() {
        let desc = descriptor(
            StatementKind::Select,
            "SELECT * FROM T WHERE A = :a AND B LIKE :b",
            vec![
                ParameterBinding::named("a", "A"),
                ParameterBinding::named("b", "B"),
            ],
        );
        assert_eq!(
            desc.executable_statement(),
            "SELECT * FROM T WHERE A = :#a AND B LIKE :#b"
        );
    }

    #[test]
    fn executable_rewrite_round_trips_placeholder_names() {
        let raw = "INSERT INTO T VALUES (:id, :id2, :name)";
        let rewritten = rewrite_executable(raw);
        assert_eq!(rewritten.replace(":#", ":"), raw);
    }

    #[test]
    fn defaulted_rewrite_substitutes_typed_literals() {
        let mut age = ParameterBinding::named("age", "AGE");
        age.set_jdbc_type(JdbcType::Integer);
        let mut name = ParameterBinding::named("name", "NAME");
        name.set_jdbc_type(JdbcType::VarChar);
        let desc = descriptor(
            StatementKind::Select,
            "SELECT * FROM T WHERE AGE > :age AND NAME = :name",
            vec![age, name],
        );
        assert_eq!(
            desc.defaulted_statement(),
            "SELECT * FROM T WHERE AGE > 5 AND NAME = 'abc'"
        );
    }

    #[test]
    fn defaulted_rewrite_is_idempotent_per_descriptor() {
        let mut id = ParameterBinding::positional("id", 0);
        id.set_jdbc_type(JdbcType::Integer);
        let desc = descriptor(
            StatementKind::Insert,
            "INSERT INTO T VALUES (:id)",
            vec![id],
        );
        assert_eq!(desc.defaulted_statement(), desc.defaulted_statement());
        assert!(!desc.defaulted_statement().contains(':'));
    }

    #[test]
    fn unbound_placeholders_survive_the_defaulted_rewrite() {
        let mut id = ParameterBinding::named("id", "ID");
        id.set_jdbc_type(JdbcType::Integer);
        let desc = descriptor(
            StatementKind::Select,
            "SELECT * FROM T WHERE ID = :id AND X = :mystery",
            vec![id],
        );
        assert_eq!(
            desc.defaulted_statement(),
            "SELECT * FROM T WHERE ID = 5 AND X = :#mystery"
        );
    }

    #[test]
    fn batch_request_downgrades_for_select_and_parameterless_statements() {
        let mut select =
            DescriptorDraft::new(StatementKind::Select, "SELECT * FROM T WHERE A=:a", None);
        select.in_params.push(ParameterBinding::named("a", "A"));
        assert!(!select.assemble(true).batch());

        let no_params = DescriptorDraft::new(StatementKind::Delete, "DELETE FROM T", None);
        assert!(!no_params.assemble(true).batch());

        let mut update =
            DescriptorDraft::new(StatementKind::Update, "UPDATE T SET A=:a WHERE B=:b", None);
        update.in_params.push(ParameterBinding::named("a", "A"));
        update.in_params.push(ParameterBinding::named("b", "B"));
        assert!(update.assemble(true).batch());
    }
}
