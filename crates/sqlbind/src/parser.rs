//! Statement classification, per-kind template parsing and descriptor
//! assembly.
//!
//! Parsing is informal: the token stream stands in for a grammar, so table
//! positions are fixed per statement kind and parameter columns come from a
//! small set of lookback rules. The live schema keeps the heuristics honest;
//! anything that does not line up with introspected metadata fails loudly.

use std::collections::BTreeSet;
use std::ops::Range;

use tracing::{instrument, warn};

use crate::error::ParseError;
use crate::introspect::{QueryDescribe, SchemaIntrospect};
use crate::model::{
    rewrite_defaulted, DescriptorDraft, ParameterBinding, StatementDescriptor, StatementKind,
};
use crate::probe::MetadataProber;
use crate::token::{has_placeholders, tokenize, Token};

/// Parses SQL templates against one live connection's schema metadata.
///
/// A parser holds no mutable state and is side-effect free on shared state;
/// the borrowed client must not be shared between concurrent parses, which
/// is ordinary single-connection discipline.
pub struct StatementParser<'a, C>
where
    C: SchemaIntrospect + QueryDescribe,
{
    prober: MetadataProber<'a, C>,
    schema: Option<String>,
}

impl<'a, C> StatementParser<'a, C>
where
    C: SchemaIntrospect + QueryDescribe,
{
    /// Creates a parser, resolving the working schema from the connection:
    /// the connection's current schema if it reports one, otherwise the
    /// dialect's default for the connected user.
    pub async fn new(client: &'a C) -> Result<StatementParser<'a, C>, ParseError> {
        Self::with_schema(client, None).await
    }

    /// Creates a parser with an explicit schema, skipping resolution.
    pub async fn with_schema(
        client: &'a C,
        schema: Option<&str>,
    ) -> Result<StatementParser<'a, C>, ParseError> {
        let prober = MetadataProber::new(client);
        let schema = match schema {
            Some(explicit) => Some(explicit.to_string()),
            None => resolve_schema(client, &prober).await,
        };
        Ok(Self { prober, schema })
    }

    /// The schema every lookup runs against.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Parses a statement template into a descriptor.
    #[instrument(skip(self, sql))]
    pub async fn parse(&self, sql: &str) -> Result<StatementDescriptor, ParseError> {
        self.parse_inner(sql, false, false).await
    }

    /// Parses a statement template, requesting batch execution. The request
    /// downgrades silently when the statement cannot be batched.
    #[instrument(skip(self, sql))]
    pub async fn parse_with_batch(
        &self,
        sql: &str,
        batch_requested: bool,
    ) -> Result<StatementDescriptor, ParseError> {
        self.parse_inner(sql, batch_requested, false).await
    }

    /// Parses a pure read query: SELECT only, no input placeholders.
    #[instrument(skip(self, sql))]
    pub async fn parse_select_only(&self, sql: &str) -> Result<StatementDescriptor, ParseError> {
        self.parse_inner(sql, false, true).await
    }

    async fn parse_inner(
        &self,
        sql: &str,
        batch_requested: bool,
        select_only: bool,
    ) -> Result<StatementDescriptor, ParseError> {
        let raw = sql.trim();
        let tokens = tokenize(raw);
        let kind = classify(&tokens)?;
        if select_only {
            if kind != StatementKind::Select {
                return Err(ParseError::UnsupportedStatement);
            }
            if has_placeholders(raw) {
                return Err(ParseError::InputParametersNotAllowed);
            }
        }

        let known_tables = self
            .prober
            .tables_in_schema(None, self.schema.as_deref())
            .await?;

        let mut draft = DescriptorDraft::new(kind, raw, self.schema.clone());
        match kind {
            StatementKind::Insert => self.parse_insert(&tokens, &known_tables, &mut draft).await?,
            StatementKind::Update => self.parse_update(&tokens, &known_tables, &mut draft).await?,
            StatementKind::Delete => self.parse_delete(&tokens, &known_tables, &mut draft).await?,
            StatementKind::Select => {
                self.parse_select(raw, &tokens, &known_tables, &mut draft).await?
            }
        }
        Ok(draft.assemble(batch_requested))
    }

    async fn parse_insert(
        &self,
        tokens: &[Token],
        known_tables: &BTreeSet<String>,
        draft: &mut DescriptorDraft,
    ) -> Result<(), ParseError> {
        let table = insert_table(tokens)?;
        self.ensure_tables_known(&[table], known_tables)?;
        draft.table_names.push(table.original().to_string());

        let values_at = tokens.iter().position(|t| t.upper() == "VALUES");
        let values = match values_at {
            Some(at) => at + 1..tokens.len(),
            None => 0..0,
        };
        // Tokens between the table name and VALUES are the declared column
        // list; the parentheses are gone by tokenization.
        let column_list: Vec<&Token> = match values_at {
            Some(at) if at > 3 => tokens[3..at].iter().collect(),
            _ => Vec::new(),
        };

        let mut params = bind_parameters(tokens, &values);
        if !params.is_empty() {
            if !column_list.is_empty() {
                for param in params.iter_mut() {
                    let Some(slot) = param.values_index() else {
                        continue;
                    };
                    let column = column_list.get(slot).ok_or_else(|| {
                        ParseError::MalformedStatement(
                            "VALUES tuple is longer than the declared column list".to_string(),
                        )
                    })?;
                    let name = param.name().to_string();
                    *param = ParameterBinding::named(name, column.upper());
                }
            }
            self.resolve_parameter_types(&mut params, table.original()).await?;
        }
        draft.in_params = params;

        let auto = self
            .prober
            .auto_increment_columns_of(None, self.schema.as_deref(), table.original())
            .await?;
        if let Some(column) = auto.into_iter().next() {
            draft.auto_increment_column = Some(column.name.clone());
            draft
                .out_params
                .push(ParameterBinding::output(column.name, column.jdbc_type));
        }
        Ok(())
    }

    async fn parse_update(
        &self,
        tokens: &[Token],
        known_tables: &BTreeSet<String>,
        draft: &mut DescriptorDraft,
    ) -> Result<(), ParseError> {
        let table = update_table(tokens)?;
        self.ensure_tables_known(&[table], known_tables)?;
        draft.table_names.push(table.original().to_string());

        let mut params = bind_parameters(tokens, &(0..0));
        if !params.is_empty() {
            self.resolve_parameter_types(&mut params, table.original()).await?;
        }
        draft.in_params = params;
        Ok(())
    }

    async fn parse_delete(
        &self,
        tokens: &[Token],
        known_tables: &BTreeSet<String>,
        draft: &mut DescriptorDraft,
    ) -> Result<(), ParseError> {
        let table = delete_table(tokens)?;
        self.ensure_tables_known(&[table], known_tables)?;
        draft.table_names.push(table.original().to_string());

        let mut params = bind_parameters(tokens, &(0..0));
        if !params.is_empty() {
            self.resolve_parameter_types(&mut params, table.original()).await?;
        }
        draft.in_params = params;
        Ok(())
    }

    async fn parse_select(
        &self,
        raw: &str,
        tokens: &[Token],
        known_tables: &BTreeSet<String>,
        draft: &mut DescriptorDraft,
    ) -> Result<(), ParseError> {
        let tables = select_tables(tokens, known_tables, self.schema.as_deref())?;
        draft.table_names = tables
            .iter()
            .map(|table| table.original().to_string())
            .collect();

        let mut params = bind_parameters(tokens, &(0..0));
        if !params.is_empty() {
            // Placeholders resolve against the primary (first) table.
            let primary = draft.table_names[0].clone();
            self.resolve_parameter_types(&mut params, &primary).await?;
        }
        draft.in_params = params;

        let defaulted = rewrite_defaulted(raw, &draft.in_params);
        draft.out_params = self.prober.output_columns_of(&defaulted).await?;
        Ok(())
    }

    /// Resolves JDBC types for every bound parameter: named parameters look
    /// up their column individually, positional parameters resolve against
    /// the table's column order in one probe. The strategy follows the first
    /// parameter, matching how the two binding shapes never mix in practice.
    async fn resolve_parameter_types(
        &self,
        params: &mut [ParameterBinding],
        table: &str,
    ) -> Result<(), ParseError> {
        let by_position = params.first().is_some_and(|param| param.column().is_none());
        if by_position {
            let max_slot = params
                .iter()
                .filter_map(ParameterBinding::values_index)
                .max()
                .unwrap_or(0);
            let columns = self
                .prober
                .columns_of(None, self.schema.as_deref(), table, None, Some(max_slot + 1))
                .await?;
            for param in params.iter_mut() {
                let Some(slot) = param.values_index() else {
                    continue;
                };
                param.set_jdbc_type(columns[slot].jdbc_type);
            }
        } else {
            for param in params.iter_mut() {
                let Some(column) = param.column().map(str::to_owned) else {
                    return Err(ParseError::MalformedStatement(format!(
                        "parameter ':{}' has no column to bind against",
                        param.name()
                    )));
                };
                let columns = self
                    .prober
                    .columns_of(None, self.schema.as_deref(), table, Some(&column), Some(1))
                    .await?;
                param.set_jdbc_type(columns[0].jdbc_type);
            }
        }
        Ok(())
    }

    fn ensure_tables_known(
        &self,
        tables: &[&Token],
        known_tables: &BTreeSet<String>,
    ) -> Result<(), ParseError> {
        let missing: Vec<&str> = tables
            .iter()
            .filter(|table| !known_tables.contains(table.upper()))
            .map(|table| table.original())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ParseError::unknown_tables(&missing, self.schema.as_deref()))
        }
    }
}

fn classify(tokens: &[Token]) -> Result<StatementKind, ParseError> {
    let Some(first) = tokens.first() else {
        return Err(ParseError::UnsupportedStatement);
    };
    match first.upper() {
        "INSERT" => Ok(StatementKind::Insert),
        "UPDATE" => Ok(StatementKind::Update),
        "DELETE" => Ok(StatementKind::Delete),
        "SELECT" => Ok(StatementKind::Select),
        _ => Err(ParseError::UnsupportedStatement),
    }
}

async fn resolve_schema<C>(client: &C, prober: &MetadataProber<'_, C>) -> Option<String>
where
    C: SchemaIntrospect + QueryDescribe,
{
    match client.current_schema().await {
        Ok(Some(schema)) => return Some(schema),
        Ok(None) => {}
        Err(err) => warn!(error = %err, "could not read the current schema from the connection"),
    }
    let user = match client.current_user().await {
        Ok(user) => user,
        Err(err) => {
            warn!(error = %err, "could not read the current user from the connection");
            None
        }
    };
    user.and_then(|user| prober.dialect().default_schema(&user))
}

// Fixed-index table locators, one per statement kind, kept apart from
// parameter binding so grammar tolerance can grow without touching it.

fn insert_table(tokens: &[Token]) -> Result<&Token, ParseError> {
    table_token_at(tokens, 2)
}

fn update_table(tokens: &[Token]) -> Result<&Token, ParseError> {
    table_token_at(tokens, 1)
}

fn delete_table(tokens: &[Token]) -> Result<&Token, ParseError> {
    table_token_at(tokens, 2)
}

fn table_token_at(tokens: &[Token], index: usize) -> Result<&Token, ParseError> {
    tokens.get(index).ok_or_else(|| {
        ParseError::MalformedStatement(format!("expected a table name at token {index}"))
    })
}

/// SELECT table scan: candidates after `FROM` are collected while they are
/// members of the known-tables set. An unknown first candidate is an error;
/// with no grammar to fall back on, failing loudly beats guessing.
fn select_tables<'t>(
    tokens: &'t [Token],
    known_tables: &BTreeSet<String>,
    schema: Option<&str>,
) -> Result<Vec<&'t Token>, ParseError> {
    let from = tokens
        .iter()
        .position(|token| token.upper() == "FROM")
        .ok_or_else(|| ParseError::MalformedStatement("SELECT without FROM".to_string()))?;
    let first = tokens
        .get(from + 1)
        .ok_or_else(|| ParseError::MalformedStatement("no table follows FROM".to_string()))?;
    if !known_tables.contains(first.upper()) {
        return Err(ParseError::unknown_tables(&[first.original()], schema));
    }
    let mut tables = vec![first];
    for token in &tokens[from + 2..] {
        if !known_tables.contains(token.upper()) {
            break;
        }
        tables.push(token);
    }
    Ok(tables)
}

/// Shared placeholder binder. `values` is the token range of the VALUES
/// tuple for INSERT statements and empty otherwise.
///
/// For every placeholder the bound column is the preceding token, except:
/// after `LIKE` or `BETWEEN` the column sits two tokens back, and after
/// `AND` (the second half of `BETWEEN x AND :y`) four tokens back. A
/// resolved "column" that is itself a placeholder, the literal `VALUES`, or
/// a slot of the VALUES tuple makes the parameter positional instead.
fn bind_parameters(tokens: &[Token], values: &Range<usize>) -> Vec<ParameterBinding> {
    let mut params = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        let Some(name) = token.placeholder_name() else {
            continue;
        };
        let lookback = match index.checked_sub(1).map(|at| tokens[at].upper()) {
            Some("LIKE") | Some("BETWEEN") => 2,
            Some("AND") => 4,
            _ => 1,
        };
        let positional = match index.checked_sub(lookback) {
            None => true,
            Some(at) => {
                let preceding = &tokens[at];
                preceding.is_placeholder()
                    || preceding.upper() == "VALUES"
                    || values.contains(&at)
            }
        };
        if positional {
            let slot = index.saturating_sub(values.start);
            params.push(ParameterBinding::positional(name, slot));
        } else {
            params.push(ParameterBinding::named(name, tokens[index - lookback].upper()));
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::{QueryColumn, StaticCatalog, TableColumn};
    use crate::jdbc::JdbcType;

    fn contacts_catalog() -> StaticCatalog {
        StaticCatalog::new("Apache Derby")
            .with_current_schema("APP")
            .with_table(
                "CONTACTS",
                vec![
                    TableColumn::new("ID", JdbcType::Integer),
                    TableColumn::new("FIRST_NAME", JdbcType::VarChar),
                    TableColumn::new("LAST_NAME", JdbcType::VarChar),
                    TableColumn::new("AGE", JdbcType::Integer),
                ],
            )
            .with_table(
                "ADDRESSES",
                vec![
                    TableColumn::new("ID", JdbcType::Integer),
                    TableColumn::new("STREET", JdbcType::VarChar),
                ],
            )
            .with_query_columns(vec![
                QueryColumn::new("FIRST_NAME", JdbcType::VarChar),
                QueryColumn::new("LAST_NAME", JdbcType::VarChar),
            ])
    }

    #[tokio::test]
    async fn update_binds_columns_through_the_lookback() {
        let catalog = contacts_catalog();
        let parser = StatementParser::new(&catalog).await.unwrap();
        let descriptor = parser
            .parse("UPDATE CONTACTS SET FIRST_NAME=:first WHERE ID=:id")
            .await
            .unwrap();

        assert_eq!(descriptor.kind(), StatementKind::Update);
        assert_eq!(descriptor.primary_table(), Some("CONTACTS"));
        assert_eq!(descriptor.in_params().len(), 2);
        assert_eq!(descriptor.in_params()[0].name(), "first");
        assert_eq!(descriptor.in_params()[0].column(), Some("FIRST_NAME"));
        assert_eq!(descriptor.in_params()[0].jdbc_type(), JdbcType::VarChar);
        assert_eq!(descriptor.in_params()[1].name(), "id");
        assert_eq!(descriptor.in_params()[1].column(), Some("ID"));
        assert_eq!(descriptor.in_params()[1].jdbc_type(), JdbcType::Integer);
        assert!(descriptor.out_params().is_empty());
    }

    #[tokio::test]
    async fn delete_takes_its_table_from_the_third_token() {
        let catalog = contacts_catalog();
        let parser = StatementParser::new(&catalog).await.unwrap();
        let descriptor = parser
            .parse("DELETE FROM CONTACTS WHERE ID=:id")
            .await
            .unwrap();

        assert_eq!(descriptor.kind(), StatementKind::Delete);
        assert_eq!(descriptor.primary_table(), Some("CONTACTS"));
        assert_eq!(descriptor.in_params().len(), 1);
        assert_eq!(descriptor.in_params()[0].column(), Some("ID"));
    }

    #[tokio::test]
    async fn insert_without_column_list_binds_by_position() {
        let catalog = contacts_catalog();
        let parser = StatementParser::new(&catalog).await.unwrap();
        let descriptor = parser
            .parse("INSERT INTO CONTACTS VALUES (:id, :first, :last)")
            .await
            .unwrap();

        let params = descriptor.in_params();
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].values_index(), Some(0));
        assert_eq!(params[1].values_index(), Some(1));
        assert_eq!(params[2].values_index(), Some(2));
        assert!(params.iter().all(|p| p.column().is_none()));
        assert_eq!(params[0].jdbc_type(), JdbcType::Integer);
        assert_eq!(params[1].jdbc_type(), JdbcType::VarChar);
        assert_eq!(params[2].jdbc_type(), JdbcType::VarChar);
    }

    #[tokio::test]
    async fn insert_with_a_leading_constant_shifts_the_slots() {
        let catalog = contacts_catalog();
        let parser = StatementParser::new(&catalog).await.unwrap();
        let descriptor = parser
            .parse("INSERT INTO CONTACTS VALUES (29, :first, :last)")
            .await
            .unwrap();

        let params = descriptor.in_params();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name(), "first");
        assert_eq!(params[0].values_index(), Some(1));
        assert_eq!(params[1].name(), "last");
        assert_eq!(params[1].values_index(), Some(2));
    }

    #[tokio::test]
    async fn insert_with_column_list_binds_by_name() {
        let catalog = contacts_catalog();
        let parser = StatementParser::new(&catalog).await.unwrap();
        let descriptor = parser
            .parse("INSERT INTO CONTACTS (FIRST_NAME, LAST_NAME) VALUES (:first, :last)")
            .await
            .unwrap();

        let params = descriptor.in_params();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].column(), Some("FIRST_NAME"));
        assert_eq!(params[0].values_index(), None);
        assert_eq!(params[1].column(), Some("LAST_NAME"));
        assert_eq!(params[1].values_index(), None);
    }

    #[tokio::test]
    async fn insert_column_list_with_constant_keeps_slot_alignment() {
        let catalog = contacts_catalog();
        let parser = StatementParser::new(&catalog).await.unwrap();
        let descriptor = parser
            .parse("INSERT INTO CONTACTS (FIRST_NAME, LAST_NAME) VALUES ('Kurt', :last)")
            .await
            .unwrap();

        let params = descriptor.in_params();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name(), "last");
        assert_eq!(params[0].column(), Some("LAST_NAME"));
    }

    #[tokio::test]
    async fn between_lookback_binds_both_bounds_to_the_column() {
        let catalog = contacts_catalog();
        let parser = StatementParser::new(&catalog).await.unwrap();
        let descriptor = parser
            .parse("SELECT FIRST_NAME, LAST_NAME FROM CONTACTS WHERE AGE BETWEEN :lo AND :hi")
            .await
            .unwrap();

        let params = descriptor.in_params();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name(), "lo");
        assert_eq!(params[0].column(), Some("AGE"));
        assert_eq!(params[1].name(), "hi");
        assert_eq!(params[1].column(), Some("AGE"));

        let described = catalog.described_queries();
        assert_eq!(described.len(), 1);
        assert!(described[0].contains("BETWEEN 5 AND 5"));
        assert!(!described[0].contains(':'));
    }

    #[tokio::test]
    async fn like_lookback_skips_the_operator() {
        let catalog = contacts_catalog();
        let parser = StatementParser::new(&catalog).await.unwrap();
        let descriptor = parser
            .parse("SELECT FIRST_NAME FROM CONTACTS WHERE FIRST_NAME LIKE :pattern")
            .await
            .unwrap();

        assert_eq!(descriptor.in_params().len(), 1);
        assert_eq!(descriptor.in_params()[0].column(), Some("FIRST_NAME"));
    }

    #[tokio::test]
    async fn select_collects_adjacent_known_tables() {
        let catalog = contacts_catalog();
        let parser = StatementParser::new(&catalog).await.unwrap();
        let descriptor = parser
            .parse("SELECT FIRST_NAME FROM CONTACTS, ADDRESSES WHERE FIRST_NAME LIKE :first")
            .await
            .unwrap();

        assert_eq!(descriptor.table_names(), ["CONTACTS", "ADDRESSES"]);
        assert_eq!(descriptor.primary_table(), Some("CONTACTS"));
    }

    #[tokio::test]
    async fn select_from_an_unknown_table_fails_loudly() {
        let catalog = contacts_catalog();
        let parser = StatementParser::new(&catalog).await.unwrap();
        let err = parser.parse("SELECT * FROM GHOST").await.unwrap_err();
        assert!(matches!(err, ParseError::UnknownTable { .. }));
    }

    #[tokio::test]
    async fn mutations_against_unknown_tables_fail_too() {
        let catalog = contacts_catalog();
        let parser = StatementParser::new(&catalog).await.unwrap();
        let err = parser
            .parse("DELETE FROM GHOST WHERE ID=:id")
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::UnknownTable { .. }));
    }

    #[tokio::test]
    async fn only_the_four_statement_kinds_are_accepted() {
        let catalog = contacts_catalog();
        let parser = StatementParser::new(&catalog).await.unwrap();
        let err = parser.parse("TRUNCATE TABLE CONTACTS").await.unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedStatement));
        let err = parser.parse("   ").await.unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedStatement));
    }

    #[tokio::test]
    async fn select_only_rejects_placeholders_before_any_probe() {
        let catalog = contacts_catalog();
        let parser = StatementParser::new(&catalog).await.unwrap();
        let err = parser
            .parse_select_only("SELECT * FROM CONTACTS WHERE ID=:id")
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::InputParametersNotAllowed));
        assert!(catalog.described_queries().is_empty());

        let err = parser
            .parse_select_only("DELETE FROM CONTACTS")
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedStatement));
    }

    #[tokio::test]
    async fn select_only_accepts_a_pure_read() {
        let catalog = contacts_catalog();
        let parser = StatementParser::new(&catalog).await.unwrap();
        let descriptor = parser
            .parse_select_only("SELECT FIRST_NAME, LAST_NAME FROM CONTACTS")
            .await
            .unwrap();
        assert!(descriptor.in_params().is_empty());
        assert_eq!(descriptor.out_params().len(), 2);
        assert_eq!(descriptor.out_params()[0].name(), "FIRST_NAME");
    }

    #[tokio::test]
    async fn auto_increment_columns_become_output_parameters() {
        let catalog = StaticCatalog::new("Apache Derby")
            .with_table(
                "ORDERS",
                vec![
                    TableColumn::new("ID", JdbcType::Integer).auto_increment(),
                    TableColumn::new("TOTAL", JdbcType::Numeric),
                ],
            );
        let parser = StatementParser::new(&catalog).await.unwrap();
        let descriptor = parser
            .parse("INSERT INTO ORDERS (TOTAL) VALUES (:total)")
            .await
            .unwrap();

        assert_eq!(descriptor.auto_increment_column(), Some("ID"));
        assert_eq!(descriptor.out_params().len(), 1);
        assert_eq!(descriptor.out_params()[0].name(), "ID");
        assert_eq!(descriptor.out_params()[0].jdbc_type(), JdbcType::Integer);
    }

    #[tokio::test]
    async fn too_many_positional_parameters_fail_the_column_count_check() {
        let catalog = contacts_catalog();
        let parser = StatementParser::new(&catalog).await.unwrap();
        let err = parser
            .parse("INSERT INTO CONTACTS VALUES (:a, :b, :c, :d, :e)")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::ColumnCountMismatch { found: 4, expected: 5 }
        ));
    }

    #[tokio::test]
    async fn batch_request_survives_only_parameterized_mutations() {
        let catalog = contacts_catalog();
        let parser = StatementParser::new(&catalog).await.unwrap();

        let select = parser
            .parse_with_batch("SELECT FIRST_NAME FROM CONTACTS WHERE ID=:id", true)
            .await
            .unwrap();
        assert!(!select.batch());

        let no_params = parser
            .parse_with_batch("DELETE FROM CONTACTS", true)
            .await
            .unwrap();
        assert!(!no_params.batch());

        let update = parser
            .parse_with_batch("UPDATE CONTACTS SET FIRST_NAME=:first WHERE ID=:id", true)
            .await
            .unwrap();
        assert!(update.batch());
    }

    #[tokio::test]
    async fn postgres_column_lookups_fall_back_to_lower_case() {
        let catalog = StaticCatalog::new("PostgreSQL")
            .with_current_schema("public")
            .with_table(
                "contacts",
                vec![
                    TableColumn::new("id", JdbcType::Integer),
                    TableColumn::new("first_name", JdbcType::VarChar),
                ],
            )
            .with_query_columns(vec![QueryColumn::new("first_name", JdbcType::VarChar)]);
        let parser = StatementParser::new(&catalog).await.unwrap();
        let descriptor = parser
            .parse("SELECT FIRST_NAME FROM CONTACTS WHERE ID = :id")
            .await
            .unwrap();

        assert_eq!(descriptor.in_params().len(), 1);
        assert_eq!(descriptor.in_params()[0].jdbc_type(), JdbcType::Integer);
    }

    #[tokio::test]
    async fn explicit_schema_wins_over_connection_resolution() {
        let catalog = contacts_catalog();
        let parser = StatementParser::with_schema(&catalog, Some("HR")).await.unwrap();
        assert_eq!(parser.schema(), Some("HR"));
    }

    #[tokio::test]
    async fn schema_falls_back_to_the_dialect_default_for_the_user() {
        let catalog = StaticCatalog::new("Oracle").with_current_user("scott");
        let parser = StatementParser::new(&catalog).await.unwrap();
        assert_eq!(parser.schema(), Some("SCOTT"));

        let catalog = StaticCatalog::new("PostgreSQL").with_current_user("alice");
        let parser = StatementParser::new(&catalog).await.unwrap();
        assert_eq!(parser.schema(), Some("public"));

        let catalog = StaticCatalog::new("MySQL").with_current_user("root");
        let parser = StatementParser::new(&catalog).await.unwrap();
        assert_eq!(parser.schema(), None);
    }

    #[test]
    fn binder_handles_placeholder_chains_in_values_tuples() {
        let tokens = tokenize("INSERT INTO T VALUES (:a, :b, :c)");
        let values_at = tokens.iter().position(|t| t.upper() == "VALUES").unwrap();
        let params = bind_parameters(&tokens, &(values_at + 1..tokens.len()));
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].values_index(), Some(0));
        assert_eq!(params[1].values_index(), Some(1));
        assert_eq!(params[2].values_index(), Some(2));
    }
}
