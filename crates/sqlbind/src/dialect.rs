//! Per-product behavior: default schemas, introspection pattern quirks,
//! auto-increment detection and identifier casing.

use std::fmt;

use tracing::debug;

/// Behavioral variant for one database product. Implementations carry no
/// state; one is selected per connection from the reported product name and
/// never changes afterwards.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Canonical product label, used in logs.
    fn product(&self) -> &'static str;

    /// Schema assumed when neither the caller nor the connection supplies
    /// one.
    fn default_schema(&self, _username: &str) -> Option<String> {
        None
    }

    /// Adjusts a metadata search pattern before it reaches the driver.
    fn adapt_pattern(&self, pattern: Option<&str>) -> Option<String> {
        pattern.map(str::to_owned)
    }

    /// Whether a column is populated by the database itself. The reported
    /// flag covers identity columns; a `nextval` default expression covers
    /// sequence-backed ones.
    fn is_auto_increment(&self, flag: &str, default_expr: Option<&str>) -> bool {
        flag.eq_ignore_ascii_case("YES")
            || default_expr.is_some_and(|expr| expr.contains("nextval"))
    }

    /// Whether column lookups retry once with lower-cased identifiers when
    /// the first attempt comes back empty.
    fn identifier_case_fallback(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct Standard;

#[derive(Debug)]
pub struct Oracle;

#[derive(Debug)]
pub struct Postgres;

#[derive(Debug)]
pub struct MySql;

#[derive(Debug)]
pub struct Derby;

#[derive(Debug)]
pub struct Teiid;

impl Dialect for Standard {
    fn product(&self) -> &'static str {
        "Standard"
    }
}

impl Dialect for Oracle {
    fn product(&self) -> &'static str {
        "Oracle"
    }

    fn default_schema(&self, username: &str) -> Option<String> {
        Some(username.to_uppercase())
    }
}

impl Dialect for Postgres {
    fn product(&self) -> &'static str {
        "PostgreSQL"
    }

    fn default_schema(&self, _username: &str) -> Option<String> {
        Some("public".to_string())
    }

    // PostgreSQL folds unquoted identifiers to lower case; metadata lookups
    // with upper-cased names come back empty and need the retry.
    fn identifier_case_fallback(&self) -> bool {
        true
    }
}

impl Dialect for MySql {
    fn product(&self) -> &'static str {
        "MySQL"
    }

    // MySQL metadata lookups treat an absent pattern as "match nothing".
    fn adapt_pattern(&self, pattern: Option<&str>) -> Option<String> {
        Some(pattern.unwrap_or("%").to_owned())
    }
}

impl Dialect for Derby {
    fn product(&self) -> &'static str {
        "Apache Derby"
    }

    fn default_schema(&self, username: &str) -> Option<String> {
        Some(username.to_uppercase())
    }
}

impl Dialect for Teiid {
    fn product(&self) -> &'static str {
        "Teiid"
    }
}

static STANDARD: Standard = Standard;
static ORACLE: Oracle = Oracle;
static POSTGRES: Postgres = Postgres;
static MYSQL: MySql = MySql;
static DERBY: Derby = Derby;
static TEIID: Teiid = Teiid;

/// Resolves the dialect for a reported product name. Matching is
/// case-insensitive with spaces and underscores ignored; unknown products
/// keep the standard behavior.
pub fn dialect_for_product(product: &str) -> &'static dyn Dialect {
    match normalize(product).as_str() {
        "oracle" => &ORACLE,
        "postgresql" | "postgres" => &POSTGRES,
        "mysql" | "mariadb" => &MYSQL,
        "apachederby" | "derby" => &DERBY,
        "teiid" | "teiidserver" | "teiidembedded" => &TEIID,
        "standard" => &STANDARD,
        normalized => {
            debug!(
                product = %product,
                normalized = %normalized,
                "unknown database product, using standard dialect"
            );
            &STANDARD
        }
    }
}

fn normalize(product: &str) -> String {
    product
        .chars()
        .filter(|c| *c != ' ' && *c != '_')
        .collect::<String>()
        .to_lowercase()
}
