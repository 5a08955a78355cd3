//! Query model for chatdb.
//!
//! Everything the translator produces is expressed with these types before
//! being rendered to SQL. Identifiers and values are kept apart: an [`Ident`]
//! can only be obtained from a validated [`Schema`], while values coming from
//! the user's sentence are plain strings that always travel as bound
//! parameters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ChatDbError, ChatDbResult};

/// A schema-validated SQL identifier (table or column name).
///
/// There is no public constructor: identifiers enter the query model only
/// through [`Schema::new`], which checks that every name is a plain
/// identifier. That is what makes it safe to render them unquoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Ident(String);

impl Ident {
    fn parse(name: &str) -> ChatDbResult<Self> {
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            None => false,
        };
        if valid {
            Ok(Self(name.to_string()))
        } else {
            Err(ChatDbError::InvalidIdentifier(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coarse classification of a column's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    DateTime,
    Text,
}

impl ColumnType {
    /// Map a declared database type (`int(11)`, `DECIMAL(10, 2)`,
    /// `varchar(255)`, `timestamp with time zone`, ...) to a type tag.
    pub fn from_declared(declared: &str) -> Self {
        let lower = declared.trim().to_ascii_lowercase();
        let base = lower
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or_default();

        match base {
            "int" | "integer" | "tinyint" | "smallint" | "mediumint" | "bigint" | "int2"
            | "int4" | "int8" | "serial" | "bigserial" | "smallserial" | "year" => {
                ColumnType::Integer
            }
            "decimal" | "numeric" | "float" | "float4" | "float8" | "double" | "real"
            | "money" => ColumnType::Float,
            "date" | "time" | "datetime" | "timestamp" | "timestamptz" | "timetz"
            | "interval" => ColumnType::DateTime,
            _ => ColumnType::Text,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::DateTime => write!(f, "datetime"),
            ColumnType::Text => write!(f, "text"),
        }
    }
}

/// A column of a [`Schema`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDef {
    pub name: Ident,
    #[serde(rename = "type")]
    pub typ: ColumnType,
}

/// The table a question is asked about: its name and ordered columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    table: Ident,
    columns: Vec<ColumnDef>,
}

impl Schema {
    /// Build a schema, validating every identifier.
    ///
    /// Column names must be unique (case-insensitively). An empty column
    /// list is accepted here; translating against it fails with
    /// [`ChatDbError::EmptySchema`].
    ///
    /// # Example
    ///
    /// ```
    /// use chatdb::ast::{ColumnType, Schema};
    ///
    /// let schema = Schema::new("sales", [("units_sold", ColumnType::Integer)]).unwrap();
    /// assert_eq!(schema.table().as_str(), "sales");
    /// ```
    pub fn new<I, S>(table: &str, columns: I) -> ChatDbResult<Self>
    where
        I: IntoIterator<Item = (S, ColumnType)>,
        S: AsRef<str>,
    {
        let table = Ident::parse(table)?;
        let mut defs: Vec<ColumnDef> = Vec::new();

        for (name, typ) in columns {
            let name = Ident::parse(name.as_ref())?;
            if defs
                .iter()
                .any(|d| d.name.as_str().eq_ignore_ascii_case(name.as_str()))
            {
                return Err(ChatDbError::DuplicateColumn(name.0));
            }
            defs.push(ColumnDef { name, typ });
        }

        Ok(Self {
            table,
            columns: defs,
        })
    }

    pub fn table(&self) -> &Ident {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Look up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name.as_str() == name)
    }
}

/// Comparison operators a condition can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Between => "BETWEEN",
        };
        f.write_str(symbol)
    }
}

/// A WHERE condition. Values are bound parameters, never rendered inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    Compare {
        column: Ident,
        op: Operator,
        value: String,
    },
    Between {
        column: Ident,
        low: String,
        high: String,
    },
}

impl Condition {
    pub fn column(&self) -> &Ident {
        match self {
            Condition::Compare { column, .. } | Condition::Between { column, .. } => column,
        }
    }

    pub fn op(&self) -> Operator {
        match self {
            Condition::Compare { op, .. } => *op,
            Condition::Between { .. } => Operator::Between,
        }
    }

    /// The values this condition binds, in placeholder order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Condition::Compare { value, .. } => vec![value.as_str()],
            Condition::Between { low, high, .. } => vec![low.as_str(), high.as_str()],
        }
    }
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AggregateFunc {
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

impl AggregateFunc {
    /// Lowercase name used to build result aliases (`sum_units_sold`).
    pub fn alias_prefix(&self) -> &'static str {
        match self {
            AggregateFunc::Sum => "sum",
            AggregateFunc::Avg => "avg",
            AggregateFunc::Count => "count",
            AggregateFunc::Min => "min",
            AggregateFunc::Max => "max",
        }
    }
}

impl fmt::Display for AggregateFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregateFunc::Sum => "SUM",
            AggregateFunc::Avg => "AVG",
            AggregateFunc::Count => "COUNT",
            AggregateFunc::Min => "MIN",
            AggregateFunc::Max => "MAX",
        };
        f.write_str(name)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("ASC"),
            SortOrder::Desc => f.write_str("DESC"),
        }
    }
}

/// ORDER BY column + direction, with the implied row limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSpec {
    pub column: Ident,
    pub order: SortOrder,
    pub limit: usize,
}

/// One entry of a SELECT list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SelectItem {
    /// All columns (*)
    Star,
    /// A plain column
    Column(Ident),
    /// `FUNC(arg) AS alias`; `arg` of `None` means `*`.
    Aggregate {
        func: AggregateFunc,
        arg: Option<Ident>,
        alias: String,
    },
}

/// A single-table SELECT statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectQuery {
    pub table: Ident,
    pub items: Vec<SelectItem>,
    pub conditions: Vec<Condition>,
    pub group_by: Vec<Ident>,
    pub order: Option<OrderSpec>,
}

impl SelectQuery {
    /// `SELECT * FROM table` with no clauses.
    pub fn all(table: Ident) -> Self {
        Self {
            table,
            items: vec![SelectItem::Star],
            conditions: vec![],
            group_by: vec![],
            order: None,
        }
    }

    /// Parameter values in placeholder order.
    pub fn params(&self) -> Vec<String> {
        self.conditions
            .iter()
            .flat_map(|c| c.values())
            .map(str::to_string)
            .collect()
    }
}

/// The terminal artifact of a translation: SQL text with `%s` placeholders
/// and the values bound to them, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatedQuery {
    pub sql: String,
    pub params: Vec<String>,
}
