//! Whole-sentence phrase templates.
//!
//! Common aggregate questions ("total units sold by country", "number of
//! rows per currency") are recognized wholesale and turned straight into a
//! grouped query. A template only wins if every capture resolves to a
//! column; otherwise the translator falls back to generic extraction.

use regex::{Captures, Regex};
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use crate::ast::{AggregateFunc, Ident, SelectItem, SelectQuery};
use crate::resolver::SchemaResolver;
use crate::vocabulary::WILDCARD_NOUNS;

/// The known templates, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemplateKind {
    /// "(the) total/sum A by/for each/per B"
    TotalByGroup,
    /// "(the) number/count of A by/for each/per B"
    CountByGroup,
    /// "(the) average/avg of A by/for each/per B"
    AverageByGroup,
    /// "(the) number/count (of records) by/for each/per B"
    CountRowsByGroup,
    /// "(list of) A grouped by/by B"
    ListGroupedBy,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 5] = [
        TemplateKind::TotalByGroup,
        TemplateKind::CountByGroup,
        TemplateKind::AverageByGroup,
        TemplateKind::CountRowsByGroup,
        TemplateKind::ListGroupedBy,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            TemplateKind::TotalByGroup => "total_A_by_B",
            TemplateKind::CountByGroup => "count_A_by_B",
            TemplateKind::AverageByGroup => "average_A_by_B",
            TemplateKind::CountRowsByGroup => "count_by_B",
            TemplateKind::ListGroupedBy => "list_A_grouped_by_B",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            TemplateKind::TotalByGroup => &TOTAL_BY_GROUP,
            TemplateKind::CountByGroup => &COUNT_BY_GROUP,
            TemplateKind::AverageByGroup => &AVERAGE_BY_GROUP,
            TemplateKind::CountRowsByGroup => &COUNT_ROWS_BY_GROUP,
            TemplateKind::ListGroupedBy => &LIST_GROUPED_BY,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// A is lazy and B greedy, both over word characters and spaces, so B runs
// to the end of the clause.
static TOTAL_BY_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:what\s+is\s+)?(?:the\s+)?(?:total|sum)\s+(?P<A>[\w\s]+?)\s+(?:by|for\s+each|per)\s+(?P<B>[\w\s]+)",
    )
    .expect("valid template pattern")
});

static COUNT_BY_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:what\s+is\s+)?(?:the\s+)?(?:number|count)\s+of\s+(?P<A>[\w\s]+?)\s+(?:by|for\s+each|per)\s+(?P<B>[\w\s]+)",
    )
    .expect("valid template pattern")
});

static AVERAGE_BY_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:what\s+is\s+)?(?:the\s+)?(?:average|avg)\s+of\s+(?P<A>[\w\s]+?)\s+(?:by|for\s+each|per)\s+(?P<B>[\w\s]+)",
    )
    .expect("valid template pattern")
});

static COUNT_ROWS_BY_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:what\s+is\s+)?(?:the\s+)?(?:number|count)\s+(?:of\s+)?(?:records|entries|rows)?\s*(?:by|for\s+each|per)\s+(?P<B>[\w\s]+)",
    )
    .expect("valid template pattern")
});

static LIST_GROUPED_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:list\s+of\s+)?(?P<A>[\w\s]+?)\s+(?:grouped\s+by|by)\s+(?P<B>[\w\s]+)")
        .expect("valid template pattern")
});

/// A lexical template hit with its raw captured phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateMatch {
    pub kind: TemplateKind,
    pub subject: Option<String>,
    pub group: String,
}

/// What a captured A phrase resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Target {
    Column(Ident),
    /// "records", "entries", "rows": every row, i.e. `*`.
    Wildcard,
}

/// Captures after resolution. `None` means the phrase did not resolve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedCaptures {
    pub subject: Option<Target>,
    pub group: Option<Ident>,
}

/// Try each template against the normalized sentence; the first lexical
/// match wins.
pub fn detect_template(sentence: &str) -> Option<TemplateMatch> {
    TemplateKind::ALL.iter().find_map(|kind| {
        kind.pattern()
            .captures(sentence)
            .map(|caps| capture_match(*kind, &caps))
    })
}

fn capture_match(kind: TemplateKind, caps: &Captures<'_>) -> TemplateMatch {
    let text = |name: &str| caps.name(name).map(|m| m.as_str().trim().to_string());
    TemplateMatch {
        kind,
        subject: text("A"),
        group: text("B").unwrap_or_default(),
    }
}

/// Resolve a match's captured phrases against the schema.
pub fn map_captures(found: &TemplateMatch, resolver: &SchemaResolver<'_>) -> MappedCaptures {
    let subject = found.subject.as_deref().and_then(|phrase| {
        resolver
            .resolve(phrase)
            .map(Target::Column)
            .or_else(|| WILDCARD_NOUNS.contains(&phrase).then_some(Target::Wildcard))
    });
    MappedCaptures {
        subject,
        group: resolver.resolve(&found.group),
    }
}

/// Render a template's grouped query. Returns `None` when a required
/// capture is missing or when a wildcard subject makes no sense for the
/// template (only counting accepts `*`).
pub fn build(kind: TemplateKind, mapped: &MappedCaptures, table: &Ident) -> Option<SelectQuery> {
    let group = mapped.group.clone()?;

    let measure = |func: AggregateFunc, prefix: &str| -> Option<SelectItem> {
        match mapped.subject.as_ref()? {
            Target::Column(col) => Some(SelectItem::Aggregate {
                func,
                arg: Some(col.clone()),
                alias: format!("{}_{}", prefix, col),
            }),
            Target::Wildcard if func == AggregateFunc::Count => Some(count_star()),
            Target::Wildcard => None,
        }
    };

    let (items, group_by) = match kind {
        TemplateKind::TotalByGroup => (
            vec![SelectItem::Column(group.clone()), measure(AggregateFunc::Sum, "total")?],
            vec![group],
        ),
        TemplateKind::CountByGroup => (
            vec![SelectItem::Column(group.clone()), measure(AggregateFunc::Count, "count")?],
            vec![group],
        ),
        TemplateKind::AverageByGroup => (
            vec![SelectItem::Column(group.clone()), measure(AggregateFunc::Avg, "average")?],
            vec![group],
        ),
        TemplateKind::CountRowsByGroup => {
            (vec![SelectItem::Column(group.clone()), count_star()], vec![group])
        }
        TemplateKind::ListGroupedBy => {
            let Some(Target::Column(subject)) = mapped.subject.clone() else {
                return None;
            };
            (
                vec![
                    SelectItem::Column(group.clone()),
                    SelectItem::Column(subject.clone()),
                ],
                vec![group, subject],
            )
        }
    };

    Some(SelectQuery {
        table: table.clone(),
        items,
        conditions: vec![],
        group_by,
        order: None,
    })
}

fn count_star() -> SelectItem {
    SelectItem::Aggregate {
        func: AggregateFunc::Count,
        arg: None,
        alias: "count".to_string(),
    }
}
