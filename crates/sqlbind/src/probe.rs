//! Dialect-aware facade over the consumed introspection contracts.

use std::collections::BTreeSet;

use tracing::debug;

use crate::dialect::{dialect_for_product, Dialect};
use crate::error::ParseError;
use crate::introspect::{QueryDescribe, SchemaIntrospect};
use crate::model::{ColumnDescriptor, ParameterBinding};

/// Wraps a live metadata client, applying the connection's dialect to
/// pattern handling, auto-increment detection and identifier casing.
pub struct MetadataProber<'a, C> {
    client: &'a C,
    dialect: &'static dyn Dialect,
}

impl<'a, C> MetadataProber<'a, C>
where
    C: SchemaIntrospect + QueryDescribe,
{
    pub fn new(client: &'a C) -> Self {
        let dialect = dialect_for_product(client.product_name());
        Self { client, dialect }
    }

    pub fn dialect(&self) -> &'static dyn Dialect {
        self.dialect
    }

    /// Upper-cased table and view names visible under the schema pattern.
    pub async fn tables_in_schema(
        &self,
        catalog: Option<&str>,
        schema_pattern: Option<&str>,
    ) -> Result<BTreeSet<String>, ParseError> {
        let schema = self.dialect.adapt_pattern(schema_pattern);
        let table = self.dialect.adapt_pattern(None);
        let tables = self
            .client
            .list_tables(catalog, schema.as_deref(), table.as_deref())
            .await?;
        Ok(tables.into_iter().map(|name| name.to_uppercase()).collect())
    }

    /// Columns of `table` in declaration order, optionally narrowed to one
    /// column. When the first lookup comes back empty and the dialect folds
    /// identifiers to lower case, the lookup retries once with lower-cased
    /// names. `expected_min` asserts that enough columns exist for every
    /// positional parameter to bind.
    pub async fn columns_of(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: &str,
        column_pattern: Option<&str>,
        expected_min: Option<usize>,
    ) -> Result<Vec<ColumnDescriptor>, ParseError> {
        let adapted_schema = self.dialect.adapt_pattern(schema);
        let adapted_column = self.dialect.adapt_pattern(column_pattern);
        let mut rows = self
            .client
            .list_columns(catalog, adapted_schema.as_deref(), table, adapted_column.as_deref())
            .await?;
        if rows.is_empty() && self.dialect.identifier_case_fallback() {
            let lower_table = table.to_lowercase();
            let lower_column = column_pattern.map(str::to_lowercase);
            debug!(table = %table, "empty column metadata, retrying with lower-cased identifiers");
            rows = self
                .client
                .list_columns(catalog, schema, &lower_table, lower_column.as_deref())
                .await?;
        }

        let columns: Vec<ColumnDescriptor> = rows
            .into_iter()
            .enumerate()
            .map(|(ordinal, row)| ColumnDescriptor {
                auto_increment: self
                    .dialect
                    .is_auto_increment(&row.auto_increment_flag, row.default_value.as_deref()),
                name: row.name,
                jdbc_type: row.jdbc_type,
                ordinal,
            })
            .collect();

        if let Some(expected) = expected_min {
            if columns.len() < expected {
                return Err(ParseError::ColumnCountMismatch {
                    found: columns.len(),
                    expected,
                });
            }
        }
        Ok(columns)
    }

    /// The table's database-populated column, if any. SQL allows at most one
    /// per table, so the scan stops at the first match.
    pub async fn auto_increment_columns_of(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, ParseError> {
        let columns = self.columns_of(catalog, schema, table, None, None).await?;
        Ok(columns
            .into_iter()
            .filter(|column| column.auto_increment)
            .take(1)
            .collect())
    }

    /// Projected columns of a defaulted SELECT, discovered through a
    /// zero-row dry run.
    pub async fn output_columns_of(
        &self,
        defaulted_sql: &str,
    ) -> Result<Vec<ParameterBinding>, ParseError> {
        let columns = self.client.describe_query(defaulted_sql).await?;
        Ok(columns
            .into_iter()
            .map(|column| ParameterBinding::output(column.name, column.jdbc_type))
            .collect())
    }
}
