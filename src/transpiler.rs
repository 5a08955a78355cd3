//! SQL rendering for the query model.
//!
//! Output is ANSI-style SQL with MySQL `LIMIT n` and `%s` positional
//! placeholders. Identifiers come from the schema and are written unquoted;
//! values never appear in the text. `to_sql_with_dialect` renders the same
//! clauses for a live driver.

use crate::ast::*;
use crate::dialect::{BindValue, Dialect, ValueKind};

/// Placeholder written for every bound value.
pub const PLACEHOLDER: &str = "%s";

/// Trait for converting query nodes to SQL.
pub trait ToSql {
    /// Convert this node to a SQL string.
    fn to_sql(&self) -> String;
}

impl ToSql for SelectQuery {
    fn to_sql(&self) -> String {
        let items: Vec<String> = self.items.iter().map(|i| i.to_sql()).collect();
        let conditions: Vec<String> = self.conditions.iter().map(|c| c.to_sql()).collect();
        self.render(&items, &conditions)
    }
}

impl ToSql for SelectItem {
    fn to_sql(&self) -> String {
        match self {
            SelectItem::Star => "*".to_string(),
            SelectItem::Column(col) => col.to_string(),
            SelectItem::Aggregate { func, arg, alias } => {
                let arg = arg.as_ref().map(Ident::as_str).unwrap_or("*");
                format!("{}({}) AS {}", func, arg, alias)
            }
        }
    }
}

impl ToSql for Condition {
    fn to_sql(&self) -> String {
        match self {
            Condition::Compare { column, op, .. } => {
                format!("{} {} {}", column, op, PLACEHOLDER)
            }
            Condition::Between { column, .. } => {
                format!("{} BETWEEN {} AND {}", column, PLACEHOLDER, PLACEHOLDER)
            }
        }
    }
}

/// A statement ready for one driver.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

impl SelectQuery {
    /// Render the statement together with its bound values.
    pub fn to_translated(&self) -> TranslatedQuery {
        TranslatedQuery {
            sql: self.to_sql(),
            params: self.params(),
        }
    }

    /// Render for `dialect`, taking column types from `schema`.
    ///
    /// Same clauses as [`ToSql::to_sql`], but every selected value is cast
    /// to a decodable type, `*` is spelled out where casts are needed, and
    /// each value is bound with the type of the column it is compared with.
    pub fn to_sql_with_dialect(&self, schema: &Schema, dialect: Dialect) -> PreparedQuery {
        let type_of = |col: &Ident| {
            schema
                .column(col.as_str())
                .map(|c| c.typ)
                .unwrap_or(ColumnType::Text)
        };

        let mut items = Vec::new();
        for item in &self.items {
            match item {
                SelectItem::Star if dialect.expands_star() && !schema.is_empty() => {
                    for column in schema.columns() {
                        let name = column.name.as_str();
                        items.push(cast_item(dialect, name, column.typ.into(), name));
                    }
                }
                SelectItem::Star => items.push("*".to_string()),
                SelectItem::Column(col) => {
                    let name = col.as_str();
                    items.push(cast_item(dialect, name, type_of(col).into(), name));
                }
                SelectItem::Aggregate { func, arg, alias } => {
                    let arg_sql = arg.as_ref().map(Ident::as_str).unwrap_or("*");
                    let expr = format!("{}({})", func, arg_sql);
                    let kind = aggregate_kind(*func, arg.as_ref().map(type_of));
                    items.push(cast_item(dialect, &expr, kind, alias));
                }
            }
        }
        if items.is_empty() && dialect.expands_star() {
            for column in schema.columns() {
                let name = column.name.as_str();
                items.push(cast_item(dialect, name, column.typ.into(), name));
            }
        }

        let mut binds = Vec::new();
        let mut conditions = Vec::new();
        for condition in &self.conditions {
            let typ = type_of(condition.column());
            let mut param = |value: &str| {
                binds.push(BindValue::for_column(value, typ));
                dialect.param(binds.len(), typ)
            };
            conditions.push(match condition {
                Condition::Compare { column, op, value } => {
                    format!("{} {} {}", column, op, param(value.as_str()))
                }
                Condition::Between { column, low, high } => {
                    let low = param(low.as_str());
                    let high = param(high.as_str());
                    format!("{} BETWEEN {} AND {}", column, low, high)
                }
            });
        }

        PreparedQuery {
            sql: self.render(&items, &conditions),
            binds,
        }
    }

    fn render(&self, items: &[String], conditions: &[String]) -> String {
        let mut sql = String::from("SELECT ");

        // Columns
        if items.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&items.join(", "));
        }

        // FROM
        sql.push_str(" FROM ");
        sql.push_str(self.table.as_str());

        // WHERE
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        // GROUP BY
        if !self.group_by.is_empty() {
            let cols: Vec<&str> = self.group_by.iter().map(Ident::as_str).collect();
            sql.push_str(" GROUP BY ");
            sql.push_str(&cols.join(", "));
        }

        // ORDER BY + LIMIT
        if let Some(order) = &self.order {
            sql.push_str(&format!(" ORDER BY {} {}", order.column, order.order));
            sql.push_str(&format!(" LIMIT {}", order.limit));
        }

        sql.push(';');
        sql
    }
}

/// `expr` cast for `dialect`, named `alias` in the result.
fn cast_item(dialect: Dialect, expr: &str, kind: ValueKind, alias: &str) -> String {
    let cast = dialect.cast_result(expr, kind);
    if cast == alias {
        cast
    } else {
        format!("{} AS {}", cast, alias)
    }
}

fn aggregate_kind(func: AggregateFunc, arg: Option<ColumnType>) -> ValueKind {
    match (func, arg) {
        (AggregateFunc::Count, _) => ValueKind::Integer,
        (AggregateFunc::Avg, _) => ValueKind::Float,
        (AggregateFunc::Sum, Some(ColumnType::Integer)) => ValueKind::Integer,
        (AggregateFunc::Sum, _) => ValueKind::Float,
        (AggregateFunc::Min | AggregateFunc::Max, Some(typ)) => typ.into(),
        (AggregateFunc::Min | AggregateFunc::Max, None) => ValueKind::Integer,
    }
}
