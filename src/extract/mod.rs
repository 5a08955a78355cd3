//! Generic extraction: what a sentence asks for when no template applies.
//!
//! Five detectors run independently over the same tokens; none depends on
//! another succeeding.

pub mod columns;
pub mod conditions;
pub mod keywords;

use serde::Serialize;
use tracing::debug;

use crate::ast::{AggregateFunc, Condition, Ident, OrderSpec};
use crate::normalizer::join_tokens;
use crate::resolver::SchemaResolver;

pub use columns::detect_columns;
pub use conditions::detect_conditions;
pub use keywords::{detect_aggregate, detect_grouping, detect_ordering};

/// Everything the generic detectors found in one sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    /// Candidate select columns; empty means all columns.
    pub columns: Vec<Ident>,
    pub conditions: Vec<Condition>,
    pub aggregate: Option<AggregateFunc>,
    pub group_by: Vec<Ident>,
    pub order: Option<OrderSpec>,
}

/// Run every detector over `tokens`.
pub fn extract<S: AsRef<str>>(tokens: &[S], resolver: &SchemaResolver<'_>) -> Extraction {
    let sentence = join_tokens(tokens);

    let extraction = Extraction {
        columns: detect_columns(tokens, resolver),
        conditions: detect_conditions(&sentence, resolver),
        aggregate: detect_aggregate(tokens),
        group_by: detect_grouping(tokens, resolver),
        order: detect_ordering(tokens, resolver),
    };

    debug!(
        columns = extraction.columns.len(),
        conditions = extraction.conditions.len(),
        aggregate = ?extraction.aggregate,
        group_by = extraction.group_by.len(),
        ordered = extraction.order.is_some(),
        "generic extraction finished"
    );
    extraction
}
