//! Fixed dispatch tables.
//!
//! Every table is an ordered slice evaluated front to back, so precedence is
//! the slice order and nothing else.

use crate::ast::{AggregateFunc, Operator, SortOrder};

/// Operator phrases, longest first. `between` is handled separately because
/// it captures two values.
pub const OPERATOR_PHRASES: &[(&str, Operator)] = &[
    ("greater than or equal to", Operator::Gte),
    ("less than or equal to", Operator::Lte),
    ("greater than", Operator::Gt),
    ("not equal to", Operator::Ne),
    ("higher than", Operator::Gt),
    ("fewer than", Operator::Lt),
    ("lower than", Operator::Lt),
    ("not equals", Operator::Ne),
    ("more than", Operator::Gt),
    ("less than", Operator::Lt),
    ("equal to", Operator::Eq),
    ("equals", Operator::Eq),
    ("before", Operator::Lt),
    ("after", Operator::Gt),
    ("is", Operator::Eq),
];

pub const BETWEEN_PHRASE: &str = "between";

/// Words that request an aggregate function.
pub const AGGREGATE_KEYWORDS: &[(&str, AggregateFunc)] = &[
    ("total", AggregateFunc::Sum),
    ("sum", AggregateFunc::Sum),
    ("average", AggregateFunc::Avg),
    ("avg", AggregateFunc::Avg),
    ("count", AggregateFunc::Count),
    ("maximum", AggregateFunc::Max),
    ("max", AggregateFunc::Max),
    ("minimum", AggregateFunc::Min),
    ("min", AggregateFunc::Min),
];

/// Words introducing a grouping phrase.
pub const GROUP_KEYWORDS: &[&str] = &["each", "per", "by"];

/// Superlatives imply `ORDER BY <col> <dir> LIMIT <n>`.
pub const SUPERLATIVES: &[(&str, SortOrder, usize)] = &[
    ("highest", SortOrder::Desc, 1),
    ("largest", SortOrder::Desc, 1),
    ("most", SortOrder::Desc, 1),
    ("lowest", SortOrder::Asc, 1),
    ("smallest", SortOrder::Asc, 1),
    ("least", SortOrder::Asc, 1),
    ("latest", SortOrder::Desc, 1),
    ("earliest", SortOrder::Asc, 1),
    ("oldest", SortOrder::Asc, 1),
    ("newest", SortOrder::Desc, 1),
];

/// Nouns that stand for "every row" in counting templates.
pub const WILDCARD_NOUNS: &[&str] = &["records", "entries", "rows"];

/// Longest phrase looked at after a keyword (`by <phrase>`), in tokens.
pub const MAX_PHRASE_TOKENS: usize = 3;

/// English function words (the NLTK list). A condition whose captured
/// value is one of these is discarded.
pub const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
    "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself",
    "they", "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
    "that", "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been",
    "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the",
    "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how",
    "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can",
    "will", "just", "don", "don't", "should", "should've", "now", "d", "ll", "m", "o", "re",
    "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn",
    "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma",
    "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

pub fn aggregate_for(word: &str) -> Option<AggregateFunc> {
    AGGREGATE_KEYWORDS
        .iter()
        .find(|(keyword, _)| *keyword == word)
        .map(|(_, func)| *func)
}

pub fn superlative_for(word: &str) -> Option<(SortOrder, usize)> {
    SUPERLATIVES
        .iter()
        .find(|(keyword, _, _)| *keyword == word)
        .map(|(_, order, limit)| (*order, *limit))
}

pub fn is_group_keyword(word: &str) -> bool {
    GROUP_KEYWORDS.contains(&word)
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_phrases_longest_first() {
        for pair in OPERATOR_PHRASES.windows(2) {
            assert!(
                pair[0].0.len() >= pair[1].0.len(),
                "'{}' must not precede the longer '{}'",
                pair[0].0,
                pair[1].0
            );
        }
    }

    #[test]
    fn test_no_operator_phrase_is_shadowed() {
        // A phrase that contains an earlier phrase would never be reached.
        for (i, (later, _)) in OPERATOR_PHRASES.iter().enumerate() {
            for (earlier, _) in &OPERATOR_PHRASES[..i] {
                assert!(
                    !later.contains(earlier),
                    "'{}' is shadowed by '{}'",
                    later,
                    earlier
                );
            }
        }
    }

    #[test]
    fn test_lookups() {
        assert_eq!(aggregate_for("avg"), Some(AggregateFunc::Avg));
        assert_eq!(aggregate_for("median"), None);
        assert_eq!(superlative_for("oldest"), Some((SortOrder::Asc, 1)));
        assert_eq!(superlative_for("best"), None);
        assert!(is_group_keyword("per"));
        assert!(!is_group_keyword("grouped"));
        assert!(is_stop_word("the"));
        assert!(!is_stop_word("usd"));
    }
}
