//! `chatdb.toml` configuration.
//!
//! ```toml
//! [database]
//! url = "mysql://root@localhost/costco"
//!
//! [table]
//! name = "sales"
//! columns = [
//!     { name = "country_code", type = "varchar(8)" },
//!     { name = "units_sold", type = "int" },
//! ]
//!
//! [synonyms]
//! replace_defaults = false
//! "units sold" = "units_sold"
//! ```
//!
//! Every section is optional. `table.columns` gives an offline schema so
//! questions can be translated without a database.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::ast::{ColumnType, Schema};
use crate::error::{ChatDbError, ChatDbResult};
use crate::synonyms::SynonymTable;

pub const CONFIG_FILE: &str = "chatdb.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatDbConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    pub table: Option<TableConfig>,
    #[serde(default)]
    pub synonyms: SynonymsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    /// Declared type, e.g. `int`, `decimal(10,2)`, `datetime`, `varchar(255)`
    #[serde(rename = "type", default)]
    pub typ: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SynonymsConfig {
    /// Start from an empty table instead of the built-in vocabulary.
    #[serde(default)]
    pub replace_defaults: bool,
    #[serde(flatten)]
    pub entries: BTreeMap<String, String>,
}

impl ChatDbConfig {
    /// Parse a configuration document.
    pub fn from_toml(content: &str) -> ChatDbResult<Self> {
        toml::from_str(content).map_err(|e| ChatDbError::Config(e.to_string()))
    }

    /// Load from an explicit path.
    pub fn load(path: &Path) -> ChatDbResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ChatDbError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Load from `path` if given, else from `./chatdb.toml`, else from
    /// `<config dir>/chatdb/chatdb.toml`. No file at all gives the defaults.
    pub fn discover(path: Option<&Path>) -> ChatDbResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::search_paths().into_iter().find(|p| p.exists()) {
            Some(found) => Self::load(&found),
            None => Ok(Self::default()),
        }
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("chatdb").join(CONFIG_FILE));
        }
        paths
    }

    /// The synonym table: built-in entries (unless replaced) plus the
    /// configured ones, which win on conflict.
    pub fn synonym_table(&self) -> SynonymTable {
        let mut table = if self.synonyms.replace_defaults {
            SynonymTable::empty()
        } else {
            SynonymTable::default()
        };
        for (phrase, column) in &self.synonyms.entries {
            table.insert(phrase, column);
        }
        table
    }

    /// The offline schema, when the table section lists columns.
    pub fn offline_schema(&self) -> ChatDbResult<Option<Schema>> {
        match &self.table {
            Some(table) if !table.columns.is_empty() => Schema::new(
                &table.name,
                table
                    .columns
                    .iter()
                    .map(|c| (c.name.as_str(), ColumnType::from_declared(&c.typ))),
            )
            .map(Some),
            _ => Ok(None),
        }
    }
}
