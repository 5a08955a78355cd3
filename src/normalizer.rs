//! Sentence tokenizer using nom.
//!
//! Splits a question into lowercase word tokens. Words may carry inner
//! joiners so that values survive as a single token:
//!
//! ```text
//! "Units sold after 2022-01-01, price >= 9.99?"
//!  units | sold | after | 2022-01-01 | , | price | > | = | 9.99 | ?
//! ```
//!
//! Any other non-space character becomes a token of its own.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{multispace0, one_of, satisfy},
    combinator::recognize,
    multi::many0,
    sequence::{pair, preceded},
};

/// Tokenize a sentence into lowercase tokens.
///
/// # Example
///
/// ```
/// use chatdb::normalizer::tokenize;
///
/// assert_eq!(tokenize("Highest price?"), vec!["highest", "price", "?"]);
/// ```
pub fn tokenize(sentence: &str) -> Vec<String> {
    let lowered = sentence.trim().to_lowercase();
    match many0(preceded(multispace0, parse_token))(lowered.as_str()) {
        Ok((_, tokens)) => tokens.into_iter().map(str::to_string).collect(),
        // many0 only fails on a parser that consumes nothing; parse_token
        // always consumes at least one character.
        Err(_) => Vec::new(),
    }
}

/// Loose form of an identifier or phrase: lowercase, no whitespace, no
/// underscores. `"Units Sold"`, `"units_sold"` and `"unitssold"` all
/// normalize to the same string.
pub fn normalize_identifier(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Join tokens back into the single-spaced sentence used for pattern
/// matching.
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_token(input: &str) -> IResult<&str, &str> {
    alt((parse_word, parse_symbol))(input)
}

/// A word: word characters, optionally joined by `.`, `-`, `/`, `:` or `'`
/// when another word character follows (`9.99`, `2022-01-01`, `12:30`).
fn parse_word(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(is_word_char),
        many0(pair(one_of(".-/:'"), take_while1(is_word_char))),
    ))(input)
}

fn parse_symbol(input: &str) -> IResult<&str, &str> {
    recognize(satisfy(|c| !c.is_whitespace()))(input)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        assert_eq!(
            tokenize("  Total Units Sold BY Country  "),
            vec!["total", "units", "sold", "by", "country"]
        );
    }

    #[test]
    fn test_tokenize_keeps_values_whole() {
        assert_eq!(
            tokenize("purchase_date between 2022-01-01 and 2022-06-01"),
            vec!["purchase_date", "between", "2022-01-01", "and", "2022-06-01"]
        );
        assert_eq!(
            tokenize("price less than 9.99"),
            vec!["price", "less", "than", "9.99"]
        );
    }

    #[test]
    fn test_tokenize_splits_punctuation() {
        assert_eq!(
            tokenize("what is the price, per unit?"),
            vec!["what", "is", "the", "price", ",", "per", "unit", "?"]
        );
        assert_eq!(tokenize("v1."), vec!["v1", "."]);
        assert_eq!(tokenize("price>=10"), vec!["price", ">", "=", "10"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t ").is_empty());
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("Units Sold"), "unitssold");
        assert_eq!(normalize_identifier("units_sold"), "unitssold");
        assert_eq!(normalize_identifier(" price  per_unit "), "priceperunit");
    }

    #[test]
    fn test_join_tokens() {
        assert_eq!(join_tokens(&["a", "b", "c"]), "a b c");
        assert_eq!(join_tokens::<String>(&[]), "");
    }
}
