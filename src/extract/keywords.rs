//! Aggregate, grouping and superlative keywords.

use crate::ast::{AggregateFunc, Ident, OrderSpec};
use crate::resolver::SchemaResolver;
use crate::vocabulary::{MAX_PHRASE_TOKENS, aggregate_for, is_group_keyword, superlative_for};

/// The first aggregate keyword in the sentence.
pub fn detect_aggregate<S: AsRef<str>>(tokens: &[S]) -> Option<AggregateFunc> {
    tokens.iter().find_map(|t| aggregate_for(t.as_ref()))
}

/// Columns named right after "each", "per" or "by". Every occurrence
/// counts; each column is listed once.
pub fn detect_grouping<S: AsRef<str>>(tokens: &[S], resolver: &SchemaResolver<'_>) -> Vec<Ident> {
    let mut group_by: Vec<Ident> = Vec::new();
    for (idx, token) in tokens.iter().enumerate() {
        if !is_group_keyword(token.as_ref()) {
            continue;
        }
        if let Some(column) = resolver.resolve_window(&tokens[idx + 1..], MAX_PHRASE_TOKENS) {
            if !group_by.contains(&column) {
                group_by.push(column);
            }
        }
    }
    group_by
}

/// Ordering implied by the first superlative ("highest price"). Only that
/// superlative is considered; if the phrase after it names no column there
/// is no ordering.
pub fn detect_ordering<S: AsRef<str>>(
    tokens: &[S],
    resolver: &SchemaResolver<'_>,
) -> Option<OrderSpec> {
    let (idx, (order, limit)) = tokens
        .iter()
        .enumerate()
        .find_map(|(idx, t)| superlative_for(t.as_ref()).map(|hit| (idx, hit)))?;

    let column = resolver.resolve_window(&tokens[idx + 1..], MAX_PHRASE_TOKENS)?;
    Some(OrderSpec {
        column,
        order,
        limit,
    })
}
