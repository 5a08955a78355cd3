//! Sentence → query translation.
//!
//! ```text
//! sentence ─ tokenize ─┬─ template? ── resolve captures ── build ──┐
//!                      │        (unresolved: fall through)         ├─ SQL + params
//!                      └─ extract ── assemble ─────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, warn};

use crate::assembler::assemble;
use crate::ast::{Schema, SelectQuery, TranslatedQuery};
use crate::error::{ChatDbError, ChatDbResult};
use crate::extract::{Extraction, extract};
use crate::normalizer::{join_tokens, tokenize};
use crate::resolver::SchemaResolver;
use crate::synonyms::SynonymTable;
use crate::templates::{self, TemplateKind, TemplateMatch};

/// Translates questions into queries against a given schema.
///
/// Holds only the synonym table, so one translator can serve any number of
/// schemas and threads at once.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    synonyms: SynonymTable,
}

/// Which route produced a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum TranslationPath {
    Template { kind: TemplateKind },
    Generic {
        /// A template that matched lexically but did not resolve.
        discarded: Option<TemplateMatch>,
        extraction: Extraction,
    },
}

/// A translation with the route that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Translation {
    pub tokens: Vec<String>,
    pub path: TranslationPath,
    pub query: SelectQuery,
}

impl Translator {
    pub fn new(synonyms: SynonymTable) -> Self {
        Self { synonyms }
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    /// Translate a question into SQL text and its bound values.
    ///
    /// # Example
    ///
    /// ```
    /// use chatdb::ast::{ColumnType, Schema};
    /// use chatdb::translator::Translator;
    ///
    /// let schema = Schema::new(
    ///     "sales",
    ///     [("country_code", ColumnType::Text), ("units_sold", ColumnType::Integer)],
    /// )
    /// .unwrap();
    /// let query = Translator::default()
    ///     .translate("total units sold by country", &schema)
    ///     .unwrap();
    /// assert_eq!(
    ///     query.sql,
    ///     "SELECT country_code, SUM(units_sold) AS total_units_sold FROM sales GROUP BY country_code;"
    /// );
    /// assert!(query.params.is_empty());
    /// ```
    pub fn translate(&self, sentence: &str, schema: &Schema) -> ChatDbResult<TranslatedQuery> {
        Ok(self.explain(sentence, schema)?.query.to_translated())
    }

    /// Translate, keeping the tokens and the route taken.
    pub fn explain(&self, sentence: &str, schema: &Schema) -> ChatDbResult<Translation> {
        if schema.is_empty() {
            return Err(ChatDbError::empty_schema(schema.table().as_str()));
        }

        let resolver = SchemaResolver::new(schema, &self.synonyms);
        let tokens = tokenize(sentence);
        let normalized = join_tokens(&tokens);

        let mut discarded = None;
        if let Some(found) = templates::detect_template(&normalized) {
            let mapped = templates::map_captures(&found, &resolver);
            match templates::build(found.kind, &mapped, schema.table()) {
                Some(query) => {
                    debug!(template = %found.kind, "template matched");
                    return Ok(Translation {
                        tokens,
                        path: TranslationPath::Template { kind: found.kind },
                        query,
                    });
                }
                None => {
                    warn!(
                        template = %found.kind,
                        subject = ?found.subject,
                        group = %found.group,
                        "template captures did not resolve, using generic extraction"
                    );
                    discarded = Some(found);
                }
            }
        }

        let extraction = extract(&tokens, &resolver);
        let query = assemble(&extraction, schema.table());
        Ok(Translation {
            tokens,
            path: TranslationPath::Generic {
                discarded,
                extraction,
            },
            query,
        })
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
                ("country_code", ColumnType::Text),
                ("units_sold", ColumnType::Integer),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_template_path() {
        let translation = Translator::default()
            .explain("Total units sold by country", &sales())
            .unwrap();
        assert_eq!(
            translation.path,
            TranslationPath::Template {
                kind: TemplateKind::TotalByGroup
            }
        );
    }

    #[test]
    fn test_generic_path_records_discarded_template() {
        let translation = Translator::default()
            .explain("total units sold by region", &sales())
            .unwrap();
        match translation.path {
            TranslationPath::Generic { discarded, .. } => {
                assert_eq!(discarded.map(|m| m.kind), Some(TemplateKind::TotalByGroup));
            }
            other => panic!("expected generic path, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_schema_fails() {
        let schema = Schema::new("empty", Vec::<(&str, ColumnType)>::new()).unwrap();
        let err = Translator::default().translate("anything", &schema).unwrap_err();
        assert!(matches!(err, ChatDbError::EmptySchema { table } if table == "empty"));
    }

    #[test]
    fn test_translator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Translator>();
    }
}
