//! Baseline schema snapshot as supplied by the schema source.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Invalid schema snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate table: {0}")]
    DuplicateTable(String),
    #[error("Duplicate column: {table}.{column}")]
    DuplicateColumn { table: String, column: String },
    #[error("Unknown table: {0}")]
    UnknownTable(String),
    #[error("Unknown column: {table}.{column}")]
    UnknownColumn { table: String, column: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineSchema {
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(rename = "tableName")]
    pub name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub indexes: Vec<Index>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    pub sql_type: String,
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    #[serde(default)]
    pub is_primary: bool,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub column_name: String,
    pub references_table: String,
    pub references_column: String,
}

/// Object form of a snapshot, `{ "tables": [...] }`.
#[derive(Deserialize)]
struct Wrapped {
    tables: Vec<Table>,
}

impl BaselineSchema {
    pub fn new(tables: Vec<Table>) -> Result<Self, SchemaError> {
        let schema = Self { tables };
        schema.validate()?;
        Ok(schema)
    }

    /// Decode and validate a snapshot, given either as a bare table array
    /// or wrapped in an object.
    pub fn from_json(input: &str) -> Result<Self, SchemaError> {
        let tables = if input.trim_start().starts_with('[') {
            serde_json::from_str::<Vec<Table>>(input)?
        } else {
            serde_json::from_str::<Wrapped>(input)?.tables
        };
        Self::new(tables)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut table_names = HashSet::new();
        for table in &self.tables {
            if !table_names.insert(table.name.as_str()) {
                return Err(SchemaError::DuplicateTable(table.name.clone()));
            }

            let mut column_names = HashSet::new();
            for column in &table.columns {
                if !column_names.insert(column.name.as_str()) {
                    return Err(SchemaError::DuplicateColumn {
                        table: table.name.clone(),
                        column: column.name.clone(),
                    });
                }
            }

            let index_columns = table.indexes.iter().flat_map(|i| i.columns.iter());
            let fk_columns = table.foreign_keys.iter().map(|fk| &fk.column_name);
            if let Some(missing) = index_columns
                .chain(fk_columns)
                .find(|c| !column_names.contains(c.as_str()))
            {
                return Err(SchemaError::UnknownColumn {
                    table: table.name.clone(),
                    column: missing.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn column(&self, table: &str, column: &str) -> Option<&Column> {
        self.table(table)?.column(column)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns of the primary index, in index order.
    pub fn primary_key(&self) -> &[String] {
        self.indexes
            .iter()
            .find(|i| i.is_primary)
            .map(|i| i.columns.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_foreign_key(&self, column: &str) -> bool {
        self.foreign_keys.iter().any(|fk| fk.column_name == column)
    }
}
