//! Per-driver SQL details.
//!
//! `%s` SQL is the portable form handed back to callers. Running a query goes
//! through [`Dialect`] instead: native placeholders, binds typed by the
//! column they are compared with, and result casts that keep every selected
//! value in a type the `Any` driver can decode (it rejects MySQL `DECIMAL`,
//! `DATE` and `DATETIME`, and PostgreSQL `NUMERIC` and `DATE`).

use crate::ast::ColumnType;
use crate::error::{ChatDbError, ChatDbResult};

/// SQL flavour of the connected database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Postgres,
    Sqlite,
}

/// What a selected expression decodes as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Float,
    Text,
}

impl From<ColumnType> for ValueKind {
    fn from(typ: ColumnType) -> Self {
        match typ {
            ColumnType::Integer => ValueKind::Integer,
            ColumnType::Float => ValueKind::Float,
            ColumnType::DateTime | ColumnType::Text => ValueKind::Text,
        }
    }
}

impl Dialect {
    /// Pick the dialect from a connection URL scheme.
    pub fn from_url(url: &str) -> ChatDbResult<Self> {
        let scheme = url.split(':').next().unwrap_or_default().to_ascii_lowercase();
        match scheme.as_str() {
            "mysql" => Ok(Dialect::MySql),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlite" => Ok(Dialect::Sqlite),
            _ => Err(ChatDbError::Connection(format!(
                "Unsupported database scheme: '{}'",
                scheme
            ))),
        }
    }

    /// Native placeholder for the 1-based parameter `index`.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::MySql | Dialect::Sqlite => "?".to_string(),
            Dialect::Postgres => format!("${}", index),
        }
    }

    /// Placeholder for a value compared against a column of type `typ`.
    pub fn param(&self, index: usize, typ: ColumnType) -> String {
        let placeholder = self.placeholder(index);
        match (self, typ) {
            // Dates travel as text; PostgreSQL will not compare text with a timestamp.
            (Dialect::Postgres, ColumnType::DateTime) => {
                format!("CAST({} AS TIMESTAMP)", placeholder)
            }
            _ => placeholder,
        }
    }

    /// Wrap a selected expression so its value decodes as `kind`.
    ///
    /// SQLite values are already dynamically typed and pass through. MySQL
    /// `CAST(.. AS DOUBLE)` needs 8.0.17 or later.
    pub fn cast_result(&self, expr: &str, kind: ValueKind) -> String {
        let target = match (self, kind) {
            (Dialect::Sqlite, _) => return expr.to_string(),
            (Dialect::MySql, ValueKind::Integer) => "SIGNED",
            (Dialect::MySql, ValueKind::Float) => "DOUBLE",
            (Dialect::MySql, ValueKind::Text) => "CHAR",
            (Dialect::Postgres, ValueKind::Integer) => "BIGINT",
            (Dialect::Postgres, ValueKind::Float) => "DOUBLE PRECISION",
            (Dialect::Postgres, ValueKind::Text) => "TEXT",
        };
        format!("CAST({} AS {})", expr, target)
    }

    /// Whether `SELECT *` has to be spelled out so each column can be cast.
    pub fn expands_star(&self) -> bool {
        !matches!(self, Dialect::Sqlite)
    }

    /// Column name and declared type for one table, in ordinal order.
    pub(crate) fn columns_query(&self) -> &'static str {
        match self {
            Dialect::MySql => {
                "SELECT CAST(COLUMN_NAME AS CHAR) AS name, CAST(DATA_TYPE AS CHAR) AS declared \
                 FROM information_schema.columns \
                 WHERE table_schema = DATABASE() AND table_name = ? \
                 ORDER BY ordinal_position"
            }
            Dialect::Postgres => {
                "SELECT column_name::text AS name, data_type::text AS declared \
                 FROM information_schema.columns \
                 WHERE table_schema = current_schema() AND table_name = $1 \
                 ORDER BY ordinal_position"
            }
            Dialect::Sqlite => {
                "SELECT name, type AS declared FROM pragma_table_info(?) ORDER BY cid"
            }
        }
    }
}

/// A parameter value as it goes to the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl BindValue {
    /// Bind `value` as the type of the column it is compared with.
    ///
    /// Text and date columns always get text, so "02134" stays "02134". A
    /// value that does not parse for a numeric column goes as text and the
    /// database decides.
    pub fn for_column(value: &str, typ: ColumnType) -> Self {
        match typ {
            ColumnType::Integer => value
                .parse::<i64>()
                .map(BindValue::Int)
                .unwrap_or_else(|_| BindValue::Text(value.to_string())),
            ColumnType::Float => value
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(BindValue::Float)
                .unwrap_or_else(|| BindValue::Text(value.to_string())),
            ColumnType::DateTime | ColumnType::Text => BindValue::Text(value.to_string()),
        }
    }
}
