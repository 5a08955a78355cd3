//! Phrase → column resolution.

use crate::ast::{ColumnDef, Ident, Schema};
use crate::normalizer::{join_tokens, normalize_identifier};
use crate::synonyms::SynonymTable;

/// Resolves free-text phrases against one schema and a synonym table.
#[derive(Debug, Clone, Copy)]
pub struct SchemaResolver<'a> {
    schema: &'a Schema,
    synonyms: &'a SynonymTable,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(schema: &'a Schema, synonyms: &'a SynonymTable) -> Self {
        Self { schema, synonyms }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Resolve a phrase to a column.
    ///
    /// The phrase matches a column when its normalized form equals the
    /// column's normalized name or the normalized form of a synonym that
    /// targets that column. Columns are tried in schema order and the first
    /// match wins.
    pub fn resolve(&self, phrase: &str) -> Option<Ident> {
        let wanted = normalize_identifier(phrase);
        if wanted.is_empty() {
            return None;
        }
        self.schema
            .columns()
            .iter()
            .find(|column| self.matches(column, &wanted))
            .map(|column| column.name.clone())
    }

    /// Resolve the longest phrase of 1..=`max_len` tokens starting at
    /// `tokens[0]`.
    pub fn resolve_window<S: AsRef<str>>(&self, tokens: &[S], max_len: usize) -> Option<Ident> {
        (1..=max_len.min(tokens.len()))
            .rev()
            .find_map(|len| self.resolve(&join_tokens(&tokens[..len])))
    }

    /// The phrases a sentence may use to name `column`: its raw lowercase
    /// name, the name with underscores as spaces, and every synonym that
    /// targets it. Duplicates are dropped, order is kept.
    pub fn variants(&self, column: &ColumnDef) -> Vec<String> {
        let raw = column.name.as_str().to_lowercase();
        let spaced = raw.replace('_', " ");

        let mut variants: Vec<String> = Vec::new();
        let candidates = [raw, spaced]
            .into_iter()
            .chain(self.synonyms.phrases_for(column.name.as_str()).map(str::to_string));
        for candidate in candidates {
            if !variants.contains(&candidate) {
                variants.push(candidate);
            }
        }
        variants
    }

    fn matches(&self, column: &ColumnDef, wanted: &str) -> bool {
        normalize_identifier(column.name.as_str()) == wanted
            || self
                .synonyms
                .phrases_for(column.name.as_str())
                .any(|phrase| normalize_identifier(phrase) == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ColumnType;

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

    #[test]
    fn test_resolve_column_names_loosely() {
        let schema = sales();
        let synonyms = SynonymTable::empty();
        let resolver = SchemaResolver::new(&schema, &synonyms);

        assert_eq!(resolver.resolve("units sold").unwrap().as_str(), "units_sold");
        assert_eq!(resolver.resolve("Units_Sold").unwrap().as_str(), "units_sold");
        assert_eq!(resolver.resolve("unitssold").unwrap().as_str(), "units_sold");
        assert!(resolver.resolve("units").is_none());
        assert!(resolver.resolve("").is_none());
    }

    #[test]
    fn test_resolve_through_synonyms() {
        let schema = sales();
        let synonyms = SynonymTable::default();
        let resolver = SchemaResolver::new(&schema, &synonyms);

        assert_eq!(resolver.resolve("country").unwrap().as_str(), "country_code");
        assert_eq!(resolver.resolve("price").unwrap().as_str(), "price_per_unit");
        assert_eq!(resolver.resolve("date").unwrap().as_str(), "purchase_date");
    }

    #[test]
    fn test_synonym_target_must_exist() {
        // "time" points at purchase_time, which this schema lacks.
        let schema = sales();
        let synonyms = SynonymTable::default();
        let resolver = SchemaResolver::new(&schema, &synonyms);
        assert!(resolver.resolve("time").is_none());
        assert!(resolver.resolve("currency").is_none());
    }

    #[test]
    fn test_first_column_in_schema_order_wins() {
        let schema = Schema::new(
            "t",
            [("amount", ColumnType::Float), ("total", ColumnType::Float)],
        )
        .unwrap();
        let synonyms = SynonymTable::empty().with("total", "amount");
        let resolver = SchemaResolver::new(&schema, &synonyms);
        assert_eq!(resolver.resolve("total").unwrap().as_str(), "amount");
    }

    #[test]
    fn test_resolve_window_prefers_longest() {
        let schema = Schema::new(
            "t",
            [("purchase", ColumnType::Text), ("purchase_date", ColumnType::DateTime)],
        )
        .unwrap();
        let synonyms = SynonymTable::empty();
        let resolver = SchemaResolver::new(&schema, &synonyms);

        let tokens = ["purchase", "date", "please"];
        assert_eq!(
            resolver.resolve_window(&tokens, 3).unwrap().as_str(),
            "purchase_date"
        );
        assert_eq!(resolver.resolve_window(&tokens[..1], 3).unwrap().as_str(), "purchase");
        assert!(resolver.resolve_window(&tokens[2..], 3).is_none());
        assert!(resolver.resolve_window::<&str>(&[], 3).is_none());
    }

    #[test]
    fn test_variants() {
        let schema = sales();
        let synonyms = SynonymTable::default();
        let resolver = SchemaResolver::new(&schema, &synonyms);
        let column = schema.column("price_per_unit").unwrap();
        assert_eq!(
            resolver.variants(column),
            vec!["price_per_unit", "price per unit", "price"]
        );
    }
}
