//! sqlx-backed client implementing the consumed metadata contracts for
//! PostgreSQL, MySQL and SQLite.
//!
//! Other products (Oracle, Derby, Teiid) plug in through their own
//! implementations of the contracts; the traits are the seam to the outside
//! world, this client is merely the one shipped in-tree.

use std::collections::BTreeSet;
use std::sync::Once;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::any::AnyPoolOptions;
use sqlx::{AnyPool, Column, Executor, Row, TypeInfo};

use crate::introspect::{QueryColumn, QueryDescribe, SchemaIntrospect, TableColumn};
use crate::jdbc::JdbcType;

static DRIVERS: Once = Once::new();

/// Product families the sqlx `any` driver can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Postgres,
    MySql,
    Sqlite,
}

impl Family {
    fn from_url(url: &str) -> Result<Self> {
        let scheme = url.split(':').next().unwrap_or_default();
        match scheme {
            "postgres" | "postgresql" => Ok(Family::Postgres),
            "mysql" | "mariadb" => Ok(Family::MySql),
            "sqlite" => Ok(Family::Sqlite),
            other => Err(anyhow!("unsupported database url scheme '{other}'")),
        }
    }

    fn product_name(self) -> &'static str {
        match self {
            Family::Postgres => "PostgreSQL",
            Family::MySql => "MySQL",
            Family::Sqlite => "SQLite",
        }
    }
}

/// Pooled sqlx client over one live connection.
///
/// The pool is capped at a single connection on purpose: a parse must not
/// share its connection with concurrent parses, and the cap enforces that
/// discipline structurally. Statements and cursors are released by sqlx on
/// every exit path.
#[derive(Debug, Clone)]
pub struct AnySchemaClient {
    pool: AnyPool,
    family: Family,
}

impl AnySchemaClient {
    /// Connects to the database at `url` (e.g. `postgres://…`, `mysql://…`,
    /// `sqlite::memory:`).
    pub async fn connect(url: &str) -> Result<Self> {
        DRIVERS.call_once(sqlx::any::install_default_drivers);
        let family = Family::from_url(url)?;
        let pool = AnyPoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .connect(url)
            .await
            .with_context(|| format!("connecting to {url}"))?;
        Ok(Self { pool, family })
    }

    /// Exposes the underlying pool, e.g. for callers running their own
    /// setup statements.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    async fn postgres_columns(
        &self,
        schema: Option<&str>,
        table: &str,
        column_pattern: Option<&str>,
    ) -> Result<Vec<TableColumn>> {
        let mut rows = sqlx::query(
            "SELECT column_name::text AS column_name, data_type::text AS data_type, \
             column_default::text AS column_default, is_identity::text AS is_identity \
             FROM information_schema.columns \
             WHERE table_schema LIKE $1 AND table_name LIKE $2 AND column_name LIKE $3 \
             ORDER BY ordinal_position",
        )
        .bind(schema.unwrap_or("%"))
        .bind(table)
        .bind(column_pattern.unwrap_or("%"))
        .fetch(&self.pool);

        let mut columns = Vec::new();
        while let Some(row) = rows.try_next().await.context("listing columns")? {
            columns.push(TableColumn {
                name: row.try_get("column_name")?,
                jdbc_type: JdbcType::from_database_type(
                    row.try_get::<String, _>("data_type")?.as_str(),
                ),
                default_value: row.try_get("column_default")?,
                auto_increment_flag: row
                    .try_get::<Option<String>, _>("is_identity")?
                    .unwrap_or_else(|| "NO".to_string()),
            });
        }
        Ok(columns)
    }

    async fn mysql_columns(
        &self,
        schema: Option<&str>,
        table: &str,
        column_pattern: Option<&str>,
    ) -> Result<Vec<TableColumn>> {
        let mut rows = sqlx::query(
            "SELECT column_name AS column_name, data_type AS data_type, \
             column_default AS column_default, extra AS extra \
             FROM information_schema.columns \
             WHERE table_schema LIKE ? AND table_name LIKE ? AND column_name LIKE ? \
             ORDER BY ordinal_position",
        )
        .bind(schema.unwrap_or("%"))
        .bind(table)
        .bind(column_pattern.unwrap_or("%"))
        .fetch(&self.pool);

        let mut columns = Vec::new();
        while let Some(row) = rows.try_next().await.context("listing columns")? {
            let extra: Option<String> = row.try_get("extra")?;
            let auto = extra
                .as_deref()
                .map(|extra| extra.to_lowercase().contains("auto_increment"))
                .unwrap_or(false);
            columns.push(TableColumn {
                name: row.try_get("column_name")?,
                jdbc_type: JdbcType::from_database_type(
                    row.try_get::<String, _>("data_type")?.as_str(),
                ),
                default_value: row.try_get("column_default")?,
                auto_increment_flag: if auto { "YES" } else { "NO" }.to_string(),
            });
        }
        Ok(columns)
    }

    async fn sqlite_columns(
        &self,
        table: &str,
        column_pattern: Option<&str>,
    ) -> Result<Vec<TableColumn>> {
        let mut rows = sqlx::query(
            "SELECT name AS column_name, type AS data_type, dflt_value AS column_default \
             FROM pragma_table_info(?) ORDER BY cid",
        )
        .bind(table)
        .fetch(&self.pool);

        let mut columns = Vec::new();
        while let Some(row) = rows.try_next().await.context("listing columns")? {
            let name: String = row.try_get("column_name")?;
            // SQLite identifiers compare case-insensitively.
            if let Some(pattern) = column_pattern {
                if pattern != "%" && !name.eq_ignore_ascii_case(pattern) {
                    continue;
                }
            }
            columns.push(TableColumn {
                name,
                jdbc_type: JdbcType::from_database_type(
                    row.try_get::<Option<String>, _>("data_type")?
                        .unwrap_or_default()
                        .as_str(),
                ),
                default_value: row.try_get("column_default")?,
                auto_increment_flag: "NO".to_string(),
            });
        }
        Ok(columns)
    }
}

#[async_trait]
impl SchemaIntrospect for AnySchemaClient {
    fn product_name(&self) -> &str {
        self.family.product_name()
    }

    async fn current_schema(&self) -> Result<Option<String>> {
        let sql = match self.family {
            Family::Postgres => "SELECT current_schema()::text",
            Family::MySql => "SELECT database()",
            Family::Sqlite => return Ok(None),
        };
        let row = sqlx::query(sql)
            .fetch_one(&self.pool)
            .await
            .context("reading current schema")?;
        Ok(row.try_get(0)?)
    }

    async fn current_user(&self) -> Result<Option<String>> {
        let sql = match self.family {
            Family::Postgres => "SELECT current_user::text",
            Family::MySql => "SELECT current_user()",
            Family::Sqlite => return Ok(None),
        };
        let row = sqlx::query(sql)
            .fetch_one(&self.pool)
            .await
            .context("reading current user")?;
        let user: Option<String> = row.try_get(0)?;
        // MySQL reports `user@host`.
        Ok(user.map(|user| {
            user.split('@')
                .next()
                .unwrap_or(user.as_str())
                .to_string()
        }))
    }

    async fn list_tables(
        &self,
        _catalog: Option<&str>,
        schema_pattern: Option<&str>,
        table_pattern: Option<&str>,
    ) -> Result<BTreeSet<String>> {
        let schema = schema_pattern.unwrap_or("%");
        let table = table_pattern.unwrap_or("%");
        let mut rows = match self.family {
            Family::Postgres => sqlx::query(
                "SELECT table_name::text AS table_name FROM information_schema.tables \
                 WHERE table_type IN ('BASE TABLE', 'VIEW') \
                 AND table_schema LIKE $1 AND table_name LIKE $2",
            )
            .bind(schema)
            .bind(table)
            .fetch(&self.pool),
            Family::MySql => sqlx::query(
                "SELECT table_name AS table_name FROM information_schema.tables \
                 WHERE table_type IN ('BASE TABLE', 'VIEW') \
                 AND table_schema LIKE ? AND table_name LIKE ?",
            )
            .bind(schema)
            .bind(table)
            .fetch(&self.pool),
            Family::Sqlite => sqlx::query(
                "SELECT name AS table_name FROM sqlite_master \
                 WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' \
                 AND name LIKE ?",
            )
            .bind(table)
            .fetch(&self.pool),
        };

        let mut names = BTreeSet::new();
        while let Some(row) = rows.try_next().await.context("listing tables")? {
            names.insert(row.try_get::<String, _>("table_name")?);
        }
        Ok(names)
    }

    async fn list_columns(
        &self,
        _catalog: Option<&str>,
        schema: Option<&str>,
        table: &str,
        column_pattern: Option<&str>,
    ) -> Result<Vec<TableColumn>> {
        match self.family {
            Family::Postgres => self.postgres_columns(schema, table, column_pattern).await,
            Family::MySql => self.mysql_columns(schema, table, column_pattern).await,
            Family::Sqlite => self.sqlite_columns(table, column_pattern).await,
        }
    }
}

#[async_trait]
impl QueryDescribe for AnySchemaClient {
    async fn describe_query(&self, sql: &str) -> Result<Vec<QueryColumn>> {
        // Prepare-only: the statement is described, never fetched, and the
        // prepared handle is released with the call.
        let description = self
            .pool
            .describe(sql)
            .await
            .with_context(|| format!("describing query '{sql}'"))?;
        Ok(description
            .columns()
            .iter()
            .map(|column| QueryColumn {
                name: column.name().to_string(),
                jdbc_type: JdbcType::from_database_type(column.type_info().name()),
            })
            .collect())
    }
}
