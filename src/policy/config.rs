use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Named constants of the table convention policy.
///
/// Loaded once at startup and passed by reference into the engine. Every field has a
/// built-in default, so a JSON override only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Surrogate key column (`BIGINT UNSIGNED AUTO_INCREMENT`).
    pub id_column: String,
    /// Creation timestamp column.
    pub created_at_column: String,
    /// Update timestamp column.
    pub updated_at_column: String,
    /// Name a primary key is registered under.
    pub primary_key_name: String,
    /// Required single-column index on the creation timestamp.
    pub created_at_index: String,
    /// Required single-column index on the update timestamp.
    pub updated_at_index: String,
    /// Required prefix of unique key names.
    pub unique_key_prefix: String,
    /// Required prefix of plain key names.
    pub index_prefix: String,
    /// Collation that may not be used.
    pub discouraged_collation: String,
    /// Collation suggested instead of the discouraged one.
    pub substitute_collation: String,
    /// The only accepted storage engine, compared case-insensitively.
    pub engine: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            id_column: "id".to_string(),
            created_at_column: "created_at".to_string(),
            updated_at_column: "updated_at".to_string(),
            primary_key_name: "pk".to_string(),
            created_at_index: "index_created_at".to_string(),
            updated_at_index: "index_updated_at".to_string(),
            unique_key_prefix: "uk_".to_string(),
            index_prefix: "index_".to_string(),
            discouraged_collation: "utf8mb4_general_ci".to_string(),
            substitute_collation: "utf8mb4_unicode_ci".to_string(),
            engine: "InnoDB".to_string(),
        }
    }
}

impl PolicyConfig {
    /// Load a policy from JSON. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::InvalidPolicy)
    }

    /// Which system column `name` refers to, if any. Matching ignores case.
    pub fn system_column(&self, name: &str) -> Option<SystemColumn> {
        [
            (SystemColumn::Id, &self.id_column),
            (SystemColumn::CreatedAt, &self.created_at_column),
            (SystemColumn::UpdatedAt, &self.updated_at_column),
        ]
        .into_iter()
        .find(|(_, column)| column.eq_ignore_ascii_case(name))
        .map(|(system, _)| system)
    }

    /// Name of a system column under this policy.
    pub fn system_column_name(&self, column: SystemColumn) -> &str {
        match column {
            SystemColumn::Id => &self.id_column,
            SystemColumn::CreatedAt => &self.created_at_column,
            SystemColumn::UpdatedAt => &self.updated_at_column,
        }
    }
}

/// The three mandatory columns every governed table carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SystemColumn {
    /// Surrogate key.
    Id,
    /// Creation timestamp.
    CreatedAt,
    /// Update timestamp.
    UpdatedAt,
}

impl SystemColumn {
    /// All system columns in the order their absence is reported.
    pub const ALL: [SystemColumn; 3] = [
        SystemColumn::Id,
        SystemColumn::CreatedAt,
        SystemColumn::UpdatedAt,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults_for_missing_keys() {
        let config = PolicyConfig::from_json(r#"{"index_prefix": "idx_", "engine": "RocksDB"}"#)
            .unwrap();
        assert_eq!(config.index_prefix, "idx_");
        assert_eq!(config.engine, "RocksDB");
        assert_eq!(config.id_column, "id");
        assert_eq!(config.unique_key_prefix, "uk_");
    }

    #[test]
    fn invalid_json_is_reported_as_invalid_policy() {
        let err = PolicyConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::InvalidPolicy(_)));
        assert!(err.to_string().starts_with("invalid policy JSON"));
    }

    #[test]
    fn system_column_lookup_ignores_case() {
        let config = PolicyConfig::default();
        assert_eq!(config.system_column("ID"), Some(SystemColumn::Id));
        assert_eq!(config.system_column("Updated_At"), Some(SystemColumn::UpdatedAt));
        assert_eq!(config.system_column("deleted_at"), None);
        assert_eq!(config.system_column_name(SystemColumn::CreatedAt), "created_at");
    }
}
