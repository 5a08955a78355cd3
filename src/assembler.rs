//! Builds the SELECT statement for the generic path.

use crate::ast::{AggregateFunc, Ident, SelectItem, SelectQuery};
use crate::extract::Extraction;

/// Combine an [`Extraction`] into one statement.
///
/// The select list is chosen as follows:
/// - aggregate and candidate columns: group columns as-is, then
///   `FUNC(col) AS func_col` for every other candidate;
/// - `COUNT` without candidates: group columns, then `COUNT(*) AS count`;
/// - grouping without an aggregate: group columns, then the other candidates;
/// - otherwise the candidates, or `*` when there are none.
pub fn assemble(extraction: &Extraction, table: &Ident) -> SelectQuery {
    let group_by = extraction.group_by.clone();
    let rest: Vec<&Ident> = extraction
        .columns
        .iter()
        .filter(|col| !group_by.contains(col))
        .collect();
    let grouped = group_by.iter().cloned().map(SelectItem::Column);

    let items: Vec<SelectItem> = match extraction.aggregate {
        Some(func) if !extraction.columns.is_empty() => grouped
            .chain(rest.into_iter().map(|col| SelectItem::Aggregate {
                func,
                arg: Some(col.clone()),
                alias: format!("{}_{}", func.alias_prefix(), col),
            }))
            .collect(),
        Some(AggregateFunc::Count) => grouped
            .chain(std::iter::once(SelectItem::Aggregate {
                func: AggregateFunc::Count,
                arg: None,
                alias: "count".to_string(),
            }))
            .collect(),
        _ if !group_by.is_empty() => grouped
            .chain(rest.into_iter().cloned().map(SelectItem::Column))
            .collect(),
        _ if !extraction.columns.is_empty() => extraction
            .columns
            .iter()
            .cloned()
            .map(SelectItem::Column)
            .collect(),
        _ => vec![SelectItem::Star],
    };

    SelectQuery {
        table: table.clone(),
        items,
        conditions: extraction.conditions.clone(),
        group_by,
        order: extraction.order.clone(),
    }
}
