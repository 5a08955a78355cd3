//! Column mentions.

use crate::ast::Ident;
use crate::normalizer::join_tokens;
use crate::resolver::SchemaResolver;
use crate::vocabulary::MAX_PHRASE_TOKENS;

/// Every column named anywhere in the sentence, via 1- to 3-token windows.
///
/// Windows are scanned shortest first, left to right, and each column is
/// reported once, at its first hit.
pub fn detect_columns<S: AsRef<str>>(tokens: &[S], resolver: &SchemaResolver<'_>) -> Vec<Ident> {
    let mut found: Vec<Ident> = Vec::new();
    for len in 1..=MAX_PHRASE_TOKENS.min(tokens.len()) {
        for window in tokens.windows(len) {
            if let Some(column) = resolver.resolve(&join_tokens(window)) {
                if !found.contains(&column) {
                    found.push(column);
                }
            }
        }
    }
    found
}
