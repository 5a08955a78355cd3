//! Filter conditions.
//!
//! For every column the detector tries, in order:
//!
//! ```text
//! <column> (is)? between <low> and <high>      BETWEEN
//! <column> (is)? <operator phrase> <value>     one pattern per phrase, longest first
//! <column> (is)? <value>                       =
//! ```
//!
//! The first pattern that matches decides the column. A value that is a
//! stop word ("price is *the* highest") is not a value, so the column then
//! contributes no condition at all. That also drops real values that happen
//! to be function words; it is a deliberate precision/recall trade-off.
//!
//! The reverse also holds: a grouping word that is not on the stop-word
//! list is read as a value. "average price per country" yields
//! `price_per_unit = %s` with `per` bound, since "per" is not an NLTK stop
//! word and follows a column name directly.
//!
//! Column names are located by plain string comparison at word starts; only
//! the part after the name is a regex, and those are compiled once per
//! process and shared by every column.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::trace;

use crate::ast::{ColumnDef, Condition, Operator};
use crate::resolver::SchemaResolver;
use crate::vocabulary::{BETWEEN_PHRASE, OPERATOR_PHRASES, is_stop_word};

static BETWEEN_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    tail_pattern(&format!(
        r"{}\s+(\S+)\s+and\s+(\S+)",
        phrase_pattern(BETWEEN_PHRASE)
    ))
});

/// One tail per operator phrase, in `OPERATOR_PHRASES` order.
static OPERATOR_TAILS: LazyLock<Vec<(Regex, Operator)>> = LazyLock::new(|| {
    OPERATOR_PHRASES
        .iter()
        .map(|(phrase, op)| (tail_pattern(&format!(r"{}\s+(\S+)", phrase_pattern(phrase))), *op))
        .collect()
});

static BARE_TAIL: LazyLock<Regex> = LazyLock::new(|| tail_pattern(r"(\S+)"));

/// Detect at most one condition per column, in schema order.
pub fn detect_conditions(sentence: &str, resolver: &SchemaResolver<'_>) -> Vec<Condition> {
    resolver
        .schema()
        .columns()
        .iter()
        .filter_map(|column| {
            let variants: Vec<String> = resolver
                .variants(column)
                .iter()
                .map(|v| v.split_whitespace().collect::<Vec<_>>().join(" "))
                .collect();
            condition_for(sentence, column, &variants)
        })
        .collect()
}

fn condition_for(sentence: &str, column: &ColumnDef, variants: &[String]) -> Option<Condition> {
    if let Some(caps) = subject_matches(sentence, variants, &BETWEEN_TAIL).first() {
        trace!(column = %column.name, "between pattern matched");
        return Some(Condition::Between {
            column: column.name.clone(),
            low: caps[1].to_string(),
            high: caps[2].to_string(),
        });
    }

    for (tail, op) in OPERATOR_TAILS.iter() {
        let found = subject_matches(sentence, variants, tail);
        if !found.is_empty() {
            trace!(column = %column.name, ?op, "operator pattern matched");
            return first_value(&found).map(|value| Condition::Compare {
                column: column.name.clone(),
                op: *op,
                value,
            });
        }
    }

    let found = subject_matches(sentence, variants, &BARE_TAIL);
    if !found.is_empty() {
        trace!(column = %column.name, "bare equality pattern matched");
        return first_value(&found).map(|value| Condition::Compare {
            column: column.name.clone(),
            op: Operator::Eq,
            value,
        });
    }

    None
}

/// `<variant><tail>` matches in `sentence`, leftmost first and
/// non-overlapping. A variant must start a word. At one position the
/// variants are tried in order and the first whose tail also matches wins.
fn subject_matches<'s>(sentence: &'s str, variants: &[String], tail: &Regex) -> Vec<Captures<'s>> {
    let mut found = Vec::new();
    let mut pos = 0;
    while pos < sentence.len() {
        let hit = if starts_word(sentence, pos) {
            variants.iter().find_map(|variant| {
                let rest = sentence[pos..].strip_prefix(variant.as_str())?;
                tail.captures(rest).map(|caps| (pos + variant.len(), caps))
            })
        } else {
            None
        };
        match hit {
            Some((after, caps)) => {
                pos = after + caps.get(0).map_or(1, |m| m.end().max(1));
                found.push(caps);
            }
            None => pos += sentence[pos..].chars().next().map_or(1, char::len_utf8),
        }
    }
    found
}

/// Same rule as the regex `\b`: word-ness changes across `pos`.
fn starts_word(sentence: &str, pos: usize) -> bool {
    let before = sentence[..pos].chars().next_back().is_some_and(is_word_char);
    let after = sentence[pos..].chars().next().is_some_and(is_word_char);
    before != after
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Anchored pattern for what follows a column name.
fn tail_pattern(body: &str) -> Regex {
    Regex::new(&format!(r"^\s+(?:is\s+)?{}", body)).expect("valid condition pattern")
}

fn phrase_pattern(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

/// The first captured value that can stand as a literal.
fn first_value(found: &[Captures<'_>]) -> Option<String> {
    found
        .iter()
        .filter_map(|caps| caps.get(caps.len() - 1).map(|m| m.as_str()))
        .find(|value| is_literal(value))
        .map(str::to_string)
}

/// Stop words and bare punctuation are never values.
fn is_literal(value: &str) -> bool {
    !is_stop_word(value) && value.chars().any(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ColumnType, Schema};
    use crate::normalizer::{join_tokens, tokenize};
    use crate::synonyms::SynonymTable;
    use crate::transpiler::ToSql;

    fn sales() -> Schema {
        Schema::new(
            "sales",
            [
                ("product_id", ColumnType::Integer),
                ("purchase_date", ColumnType::DateTime),
                ("country_code", ColumnType::Text),
                ("price_per_unit", ColumnType::Float),
                ("units_sold", ColumnType::Integer),
            ],
        )
        .unwrap()
    }

    fn detect(sentence: &str) -> Vec<Condition> {
        let schema = sales();
        let synonyms = SynonymTable::default();
        let resolver = SchemaResolver::new(&schema, &synonyms);
        detect_conditions(&join_tokens(&tokenize(sentence)), &resolver)
    }

    fn rendered(sentence: &str) -> Vec<(String, Vec<String>)> {
        detect(sentence)
            .iter()
            .map(|c| {
                (
                    c.to_sql(),
                    c.values().into_iter().map(str::to_string).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_longest_operator_phrase_wins() {
        let found = detect("price greater than or equal to 10");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].op(), Operator::Gte);
        assert_eq!(found[0].values(), vec!["10"]);

        assert_eq!(detect("price less than or equal to 3")[0].op(), Operator::Lte);
        assert_eq!(detect("price greater than 3")[0].op(), Operator::Gt);
        assert_eq!(detect("price is not equal to 3")[0].op(), Operator::Ne);
        assert_eq!(detect("price equal to 3")[0].op(), Operator::Eq);
    }

    #[test]
    fn test_between() {
        assert_eq!(
            rendered("purchase_date between 2022-01-01 and 2022-06-01"),
            vec![(
                "purchase_date BETWEEN %s AND %s".to_string(),
                vec!["2022-01-01".to_string(), "2022-06-01".to_string()]
            )]
        );
        assert_eq!(detect("date is between 2022-01-01 and 2022-02-01")[0].op(), Operator::Between);
    }

    #[test]
    fn test_temporal_phrases() {
        let found = detect("purchase date after 2022-03-01");
        assert_eq!(found[0].op(), Operator::Gt);
        assert_eq!(found[0].values(), vec!["2022-03-01"]);
        assert_eq!(detect("date before 2021-12-31")[0].op(), Operator::Lt);
    }

    #[test]
    fn test_bare_equality() {
        assert_eq!(
            rendered("sales where country is us"),
            vec![("country_code = %s".to_string(), vec!["us".to_string()])]
        );
        assert_eq!(
            rendered("product 42"),
            vec![("product_id = %s".to_string(), vec!["42".to_string()])]
        );
    }

    #[test]
    fn test_stop_word_values_are_dropped() {
        assert!(detect("units sold by country").is_empty());
        assert!(detect("what is the price of a product").is_empty());
        assert!(detect("price ?").is_empty());
    }

    #[test]
    fn test_one_condition_per_column_many_columns() {
        assert_eq!(
            rendered("country is ca and units sold more than 5 and price less than 2.5"),
            vec![
                ("country_code = %s".to_string(), vec!["ca".to_string()]),
                ("price_per_unit < %s".to_string(), vec!["2.5".to_string()]),
                ("units_sold > %s".to_string(), vec!["5".to_string()]),
            ]
        );
    }

    #[test]
    fn test_variant_must_start_a_word() {
        // "date" inside "update" is not the purchase date.
        assert!(detect("update 5").is_empty());
    }

    #[test]
    fn test_grouping_word_becomes_a_value() {
        // "per" is not a stop word, so it reads as the price.
        assert_eq!(
            rendered("average price per country"),
            vec![("price_per_unit = %s".to_string(), vec!["per".to_string()])]
        );
    }

    #[test]
    fn test_shorter_variant_retried_at_same_position() {
        let schema = Schema::new("stock", [("units_sold", ColumnType::Integer)]).unwrap();
        let synonyms = SynonymTable::empty().with("units", "units_sold");
        let resolver = SchemaResolver::new(&schema, &synonyms);
        // "units sold" has nothing after it; "units" followed by "sold" does.
        let found = detect_conditions("stock units sold", &resolver);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].values(), vec!["sold"]);
    }

    #[test]
    fn test_synonym_spacing_is_normalized() {
        let schema = Schema::new("sales", [("country_code", ColumnType::Text)]).unwrap();
        let synonyms = SynonymTable::empty().with("home   nation", "country_code");
        let resolver = SchemaResolver::new(&schema, &synonyms);
        let found = detect_conditions("home nation is fr", &resolver);
        assert_eq!(found[0].values(), vec!["fr"]);
    }

    #[test]
    fn test_wide_schema_shares_compiled_tails() {
        let names: Vec<String> = (0..300).map(|i| format!("metric_{}", i)).collect();
        let schema = Schema::new(
            "wide",
            names.iter().map(|n| (n.as_str(), ColumnType::Integer)),
        )
        .unwrap();
        let synonyms = SynonymTable::empty();
        let resolver = SchemaResolver::new(&schema, &synonyms);

        let found = detect_conditions("metric 299 greater than 7 and metric 12 is 3", &resolver);
        assert_eq!(OPERATOR_TAILS.len(), OPERATOR_PHRASES.len());
        let rendered: Vec<String> = found.iter().map(|c| c.to_sql()).collect();
        assert_eq!(rendered, vec!["metric_12 = %s", "metric_299 > %s"]);
        assert_eq!(found[1].values(), vec!["7"]);
    }
}
