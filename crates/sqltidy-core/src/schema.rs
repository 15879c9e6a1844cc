//! Optional schema catalog.
//!
//! Rules that reason about real tables (column ordering, key placement) only
//! run when a catalog is supplied; without one they skip rather than guess.
//! Unknown keys in catalog files are tolerated so catalogs exported from
//! other tools load as-is.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A set of table descriptions keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaCatalog {
    pub tables: Vec<TableSchema>,
}

impl SchemaCatalog {
    /// Look up a table by its unqualified name, case-insensitively.
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableSchema {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(default, rename = "is_primary_key")]
    pub primary_key: bool,
    #[serde(default, rename = "is_foreign_key")]
    pub foreign_key: bool,
    /// Bookkeeping columns expected to sit last in a projection.
    #[serde(default, rename = "is_system_column")]
    pub system: bool,
}

impl ColumnSchema {
    pub fn category(&self) -> ColumnCategory {
        if self.primary_key {
            ColumnCategory::Primary
        } else if self.foreign_key {
            ColumnCategory::Foreign
        } else if self.system {
            ColumnCategory::System
        } else {
            ColumnCategory::Regular
        }
    }
}

/// Projection order buckets, earliest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColumnCategory {
    Primary,
    Foreign,
    Regular,
    System,
}

impl ColumnCategory {
    pub fn label(self) -> &'static str {
        match self {
            ColumnCategory::Primary => "primary key",
            ColumnCategory::Foreign => "foreign key",
            ColumnCategory::Regular => "regular",
            ColumnCategory::System => "system",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SchemaCatalog {
        serde_json::from_str(
            r#"{
                "tables": [
                    {
                        "name": "users",
                        "columns": [
                            {"name": "id", "is_primary_key": true},
                            {"name": "account_id", "is_foreign_key": true},
                            {"name": "email"},
                            {"name": "created_at", "is_system_column": true}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = catalog();
        assert!(catalog.table("USERS").is_some());
        assert!(catalog.table("users").unwrap().column("ID").is_some());
        assert!(catalog.table("charges").is_none());
    }

    #[test]
    fn test_categories_order() {
        let catalog = catalog();
        let users = catalog.table("users").unwrap();
        let category = |name: &str| users.column(name).unwrap().category();
        assert_eq!(category("id"), ColumnCategory::Primary);
        assert_eq!(category("account_id"), ColumnCategory::Foreign);
        assert_eq!(category("email"), ColumnCategory::Regular);
        assert_eq!(category("created_at"), ColumnCategory::System);
        assert!(ColumnCategory::Primary < ColumnCategory::Foreign);
        assert!(ColumnCategory::Regular < ColumnCategory::System);
    }

    #[test]
    fn test_unknown_keys_are_tolerated() {
        let parsed: SchemaCatalog = serde_json::from_str(
            r#"{"tables": [{"name": "t", "comment": "from an exporter", "columns": []}]}"#,
        )
        .unwrap();
        assert!(parsed.table("t").is_some());
    }
}
