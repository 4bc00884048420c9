//! Reconciliation policy knobs.
//!
//! Loaded from TOML, e.g.
//!
//! ```toml
//! name_revert = "keep-pending-type"
//! prune_empty_edits = true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid options: {0}")]
    Toml(#[from] toml::de::Error),
}

/// What reverting a column's name does to a pending type change on the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameRevert {
    /// Remove the whole entry, type change included.
    #[default]
    DropEntry,
    /// Clear only the name change; a pending type change survives.
    KeepPendingType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileOptions {
    pub name_revert: NameRevert,

    /// Remove a column edit once a type revert leaves it with no delta.
    pub prune_empty_edits: bool,
}

impl ReconcileOptions {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ReconcileOptions::from_toml_str("").unwrap();
        assert_eq!(opts.name_revert, NameRevert::DropEntry);
        assert!(!opts.prune_empty_edits);
    }

    #[test]
    fn test_parse() {
        let opts = ReconcileOptions::from_toml_str(
            "name_revert = \"keep-pending-type\"\nprune_empty_edits = true\n",
        )
        .unwrap();
        assert_eq!(opts.name_revert, NameRevert::KeepPendingType);
        assert!(opts.prune_empty_edits);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let err = ReconcileOptions::from_toml_str("name_revert = \"sometimes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ReconcileOptions::load(Path::new("/nonexistent/schemashift.toml")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read /nonexistent/schemashift.toml"));
    }
}
