//! Phrase → column hints.
//!
//! A synonym only says which column a phrase *probably* means. The target
//! may not exist in the schema being queried, so the resolver re-checks
//! every hit against the live column list.

use serde::Serialize;

/// Ordered phrase → column table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynonymTable {
    entries: Vec<(String, String)>,
}

const DEFAULT_SYNONYMS: &[(&str, &str)] = &[
    ("product", "product_id"),
    ("product id", "product_id"),
    ("date", "purchase_date"),
    ("purchase date", "purchase_date"),
    ("time", "purchase_time"),
    ("purchase time", "purchase_time"),
    ("country", "country_code"),
    ("country code", "country_code"),
    ("price", "price_per_unit"),
    ("price per unit", "price_per_unit"),
    ("units", "units_sold"),
    ("units sold", "units_sold"),
    ("total units sold", "units_sold"),
    ("currency", "currency"),
];

impl SynonymTable {
    /// A table with no entries.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add or replace a synonym. Phrases are stored lowercase with
    /// collapsed whitespace.
    pub fn insert(&mut self, phrase: &str, column: &str) {
        let phrase = phrase.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        if phrase.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(p, _)| *p == phrase) {
            Some(entry) => entry.1 = column.to_string(),
            None => self.entries.push((phrase, column.to_string())),
        }
    }

    pub fn with(mut self, phrase: &str, column: &str) -> Self {
        self.insert(phrase, column);
        self
    }

    /// Phrases pointing at `column`, in table order.
    pub fn phrases_for<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(_, target)| target == column)
            .map(|(phrase, _)| phrase.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SynonymTable {
    /// The retail-sales vocabulary (products, purchase dates, countries,
    /// prices, units sold).
    fn default() -> Self {
        let mut table = Self::empty();
        for (phrase, column) in DEFAULT_SYNONYMS {
            table.insert(phrase, column);
        }
        table
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for SynonymTable {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut table = Self::empty();
        for (phrase, column) in iter {
            table.insert(phrase, column);
        }
        table
    }
}
