//! Contracts for the schema-introspection and query-execution capabilities
//! the engine consumes, plus an in-memory catalog used in tests.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::jdbc::JdbcType;

/// One column row as reported by the schema-introspection capability.
#[derive(Debug, Clone)]
pub struct TableColumn {
    pub name: String,
    pub jdbc_type: JdbcType,
    pub default_value: Option<String>,
    pub auto_increment_flag: String,
}

impl TableColumn {
    pub fn new(name: impl Into<String>, jdbc_type: JdbcType) -> Self {
        Self {
            name: name.into(),
            jdbc_type,
            default_value: None,
            auto_increment_flag: "NO".to_string(),
        }
    }

    pub fn with_default(mut self, expr: impl Into<String>) -> Self {
        self.default_value = Some(expr.into());
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment_flag = "YES".to_string();
        self
    }
}

/// One projected column of an executed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryColumn {
    pub name: String,
    pub jdbc_type: JdbcType,
}

impl QueryColumn {
    pub fn new(name: impl Into<String>, jdbc_type: JdbcType) -> Self {
        Self {
            name: name.into(),
            jdbc_type,
        }
    }
}

/// Live schema metadata access. Operations may perform blocking network
/// round trips; the engine never caches results across calls.
#[async_trait]
pub trait SchemaIntrospect: Send + Sync {
    /// Database product name as reported by the connection.
    fn product_name(&self) -> &str;

    /// The connection's active schema, where the driver exposes one.
    async fn current_schema(&self) -> Result<Option<String>>;

    /// The connected user, where the driver exposes one.
    async fn current_user(&self) -> Result<Option<String>>;

    /// Table and view names matching the given patterns.
    async fn list_tables(
        &self,
        catalog: Option<&str>,
        schema_pattern: Option<&str>,
        table_pattern: Option<&str>,
    ) -> Result<BTreeSet<String>>;

    /// Columns of one table in declaration order, optionally narrowed to a
    /// single column.
    async fn list_columns(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: &str,
        column_pattern: Option<&str>,
    ) -> Result<Vec<TableColumn>>;
}

/// Dry-run query execution, used solely to discover a statement's projected
/// columns. The implementation must release any statement or cursor it
/// acquires on every exit path.
#[async_trait]
pub trait QueryDescribe: Send + Sync {
    async fn describe_query(&self, sql: &str) -> Result<Vec<QueryColumn>>;
}

/// In-memory catalog implementing both contracts, used during development
/// and in tests.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    product: String,
    schema: Option<String>,
    user: Option<String>,
    tables: BTreeMap<String, Vec<TableColumn>>,
    query_columns: Vec<QueryColumn>,
    described: Mutex<Vec<String>>,
}

impl StaticCatalog {
    pub fn new(product: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            ..Default::default()
        }
    }

    pub fn with_current_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_current_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Registers a table under the name lookups will see. Lookups are
    /// case-sensitive, matching drivers that store folded identifiers.
    pub fn with_table(mut self, name: impl Into<String>, columns: Vec<TableColumn>) -> Self {
        self.tables.insert(name.into(), columns);
        self
    }

    /// Registers the projection every dry-run description returns.
    pub fn with_query_columns(mut self, columns: Vec<QueryColumn>) -> Self {
        self.query_columns = columns;
        self
    }

    /// Statements handed to [`QueryDescribe::describe_query`], in call order.
    pub fn described_queries(&self) -> Vec<String> {
        self.described.lock().clone()
    }
}

#[async_trait]
impl SchemaIntrospect for StaticCatalog {
    fn product_name(&self) -> &str {
        &self.product
    }

    async fn current_schema(&self) -> Result<Option<String>> {
        Ok(self.schema.clone())
    }

    async fn current_user(&self) -> Result<Option<String>> {
        Ok(self.user.clone())
    }

    async fn list_tables(
        &self,
        _catalog: Option<&str>,
        _schema_pattern: Option<&str>,
        table_pattern: Option<&str>,
    ) -> Result<BTreeSet<String>> {
        Ok(self
            .tables
            .keys()
            .filter(|name| pattern_matches(table_pattern, name))
            .cloned()
            .collect())
    }

    async fn list_columns(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        table: &str,
        column_pattern: Option<&str>,
    ) -> Result<Vec<TableColumn>> {
        let Some(columns) = self.tables.get(table) else {
            return Ok(Vec::new());
        };
        Ok(columns
            .iter()
            .filter(|column| pattern_matches(column_pattern, &column.name))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl QueryDescribe for StaticCatalog {
    async fn describe_query(&self, sql: &str) -> Result<Vec<QueryColumn>> {
        self.described.lock().push(sql.to_string());
        if self.query_columns.is_empty() {
            return Err(anyhow!("no projected columns registered for dry run: {sql}"));
        }
        Ok(self.query_columns.clone())
    }
}

fn pattern_matches(pattern: Option<&str>, value: &str) -> bool {
    match pattern {
        None | Some("%") => true,
        Some(exact) => exact == value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> StaticCatalog {
        StaticCatalog::new("Apache Derby")
            .with_table(
                "CONTACTS",
                vec![
                    TableColumn::new("ID", JdbcType::Integer).auto_increment(),
                    TableColumn::new("FIRST_NAME", JdbcType::VarChar),
                ],
            )
            .with_table("ADDRESSES", vec![TableColumn::new("ID", JdbcType::Integer)])
    }

    #[tokio::test]
    async fn lists_registered_tables() {
        let tables = catalog().list_tables(None, None, None).await.unwrap();
        assert_eq!(
            tables.into_iter().collect::<Vec<_>>(),
            vec!["ADDRESSES".to_string(), "CONTACTS".to_string()]
        );
    }

    #[tokio::test]
    async fn column_lookups_are_case_sensitive() {
        let catalog = catalog();
        let hit = catalog
            .list_columns(None, None, "CONTACTS", Some("ID"))
            .await
            .unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].auto_increment_flag, "YES");

        let miss = catalog
            .list_columns(None, None, "contacts", None)
            .await
            .unwrap();
        assert!(miss.is_empty());
    }

    #[tokio::test]
    async fn describe_records_the_statement() {
        let catalog = catalog().with_query_columns(vec![QueryColumn::new("ID", JdbcType::Integer)]);
        let columns = catalog.describe_query("SELECT ID FROM CONTACTS").await.unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(catalog.described_queries(), vec!["SELECT ID FROM CONTACTS"]);
    }
}
