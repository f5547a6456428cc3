//! JDBC-equivalent column types and their dry-run sample literals.

use serde::{Deserialize, Serialize};

/// The subset of `java.sql.JDBCType` constants the engine produces when
/// classifying introspected columns. Unknown database types map to
/// [`JdbcType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JdbcType {
    Array,
    BigInt,
    Binary,
    Bit,
    Blob,
    Boolean,
    Char,
    Clob,
    Date,
    Decimal,
    Double,
    Float,
    Integer,
    LongVarBinary,
    LongVarChar,
    Numeric,
    Real,
    SmallInt,
    Time,
    Timestamp,
    TinyInt,
    VarBinary,
    VarChar,
    Other,
}

impl JdbcType {
    /// Classifies a database-reported type name. Length arguments and the
    /// MySQL `UNSIGNED` modifier are stripped before matching.
    pub fn from_database_type(name: &str) -> Self {
        let upper = name.trim().to_uppercase();
        let base = upper.split('(').next().unwrap_or_default().trim();
        let base = base.strip_suffix(" UNSIGNED").unwrap_or(base).trim();
        match base {
            "INT" | "INTEGER" | "INT4" | "MEDIUMINT" | "SERIAL" => JdbcType::Integer,
            "BIGINT" | "INT8" | "BIGSERIAL" => JdbcType::BigInt,
            "SMALLINT" | "INT2" | "SMALLSERIAL" | "YEAR" => JdbcType::SmallInt,
            "TINYINT" => JdbcType::TinyInt,
            "BOOL" | "BOOLEAN" => JdbcType::Boolean,
            "BIT" => JdbcType::Bit,
            "REAL" | "FLOAT4" => JdbcType::Real,
            "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" => JdbcType::Double,
            "FLOAT" => JdbcType::Float,
            "DECIMAL" | "DEC" => JdbcType::Decimal,
            "NUMERIC" | "NUMBER" => JdbcType::Numeric,
            "CHAR" | "CHARACTER" | "BPCHAR" | "NCHAR" => JdbcType::Char,
            "VARCHAR" | "CHARACTER VARYING" | "NVARCHAR" | "VARCHAR2" | "NVARCHAR2" | "NAME" => {
                JdbcType::VarChar
            }
            "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "LONG VARCHAR" => {
                JdbcType::LongVarChar
            }
            "CLOB" | "NCLOB" => JdbcType::Clob,
            "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => JdbcType::Blob,
            "BYTEA" | "BINARY" | "RAW" => JdbcType::Binary,
            "VARBINARY" => JdbcType::VarBinary,
            "LONG VARBINARY" => JdbcType::LongVarBinary,
            "DATE" => JdbcType::Date,
            "TIME" | "TIMETZ" | "TIME WITH TIME ZONE" | "TIME WITHOUT TIME ZONE" => JdbcType::Time,
            "TIMESTAMP" | "TIMESTAMPTZ" | "DATETIME" | "TIMESTAMP WITH TIME ZONE"
            | "TIMESTAMP WITHOUT TIME ZONE" => JdbcType::Timestamp,
            "ARRAY" => JdbcType::Array,
            other if other.starts_with('_') => JdbcType::Array,
            _ => JdbcType::Other,
        }
    }

    /// The literal substituted for a placeholder of this type in the
    /// defaulted rewrite. Character, date and time families are quoted,
    /// numeric and boolean families are not, and unknown types fall back to
    /// `NULL` so the defaulted statement always stays executable.
    pub fn sample_literal(&self) -> &'static str {
        match self {
            JdbcType::Integer
            | JdbcType::BigInt
            | JdbcType::SmallInt
            | JdbcType::TinyInt
            | JdbcType::Bit => "5",
            JdbcType::Decimal
            | JdbcType::Numeric
            | JdbcType::Double
            | JdbcType::Float
            | JdbcType::Real => "5.5",
            JdbcType::Boolean => "TRUE",
            JdbcType::Char | JdbcType::VarChar | JdbcType::LongVarChar | JdbcType::Clob => "'abc'",
            JdbcType::Binary | JdbcType::VarBinary | JdbcType::LongVarBinary | JdbcType::Blob => {
                "'0f'"
            }
            JdbcType::Date => "'2019-09-09'",
            JdbcType::Time => "'12:00:00'",
            JdbcType::Timestamp => "'2019-09-09 12:00:00'",
            JdbcType::Array | JdbcType::Other => "NULL",
        }
    }
}
