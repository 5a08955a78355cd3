//! # chatdb
//!
//! Ask a table questions in plain English and get back parameterized SQL.
//!
//! ## Quick Example
//!
//! ```rust
//! use chatdb::prelude::*;
//!
//! let schema = Schema::new(
//!     "sales",
//!     [
//!         ("country_code", ColumnType::Text),
//!         ("price_per_unit", ColumnType::Float),
//!     ],
//! )
//! .unwrap();
//!
//! let query = chatdb::translate("price greater than 10", &schema).unwrap();
//! assert_eq!(query.sql, "SELECT price_per_unit FROM sales WHERE price_per_unit > %s;");
//! assert_eq!(query.params, vec!["10"]);
//! ```
//!
//! ## How a question is read
//!
//! | Phrase                    | Becomes                         |
//! |---------------------------|---------------------------------|
//! | column name or synonym    | select-list column              |
//! | `price more than 10`      | `price_per_unit > %s`           |
//! | `between X and Y`         | `BETWEEN %s AND %s`             |
//! | `total` / `average` / ... | `SUM` / `AVG` / ...             |
//! | `by` / `per` / `each`     | `GROUP BY`                      |
//! | `highest` / `lowest`      | `ORDER BY ... DESC/ASC LIMIT 1` |
//!
//! A handful of fixed question shapes ("total A by B", "count of A per B")
//! are recognized first and produce hand-written SQL.

pub mod assembler;
pub mod ast;
pub mod config;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod extract;
pub mod normalizer;
pub mod resolver;
pub mod synonyms;
pub mod templates;
pub mod translator;
pub mod transpiler;
pub mod vocabulary;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::ChatDbConfig;
    pub use crate::dialect::{BindValue, Dialect};
    pub use crate::engine::{ChatDb, ResultRow};
    pub use crate::error::*;
    pub use crate::synonyms::SynonymTable;
    pub use crate::translator::{Translation, TranslationPath, Translator};
    pub use crate::transpiler::ToSql;
}

/// Translate a question against `schema` with the built-in synonyms.
///
/// # Example
///
/// ```
/// use chatdb::ast::{ColumnType, Schema};
///
/// let schema = Schema::new("sales", [("price_per_unit", ColumnType::Float)]).unwrap();
/// let query = chatdb::translate("what is the highest price", &schema).unwrap();
/// assert_eq!(
///     query.sql,
///     "SELECT price_per_unit FROM sales ORDER BY price_per_unit DESC LIMIT 1;"
/// );
/// ```
pub fn translate(
    sentence: &str,
    schema: &ast::Schema,
) -> error::ChatDbResult<ast::TranslatedQuery> {
    translator::Translator::default().translate(sentence, schema)
}
