//! Pending rename / add-column operations.

use crate::draft::DraftKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Duplicate plan entry: {0}")]
    DuplicateKey(OpKey),
    #[error("Column edit on {table}.{column} changes neither name nor type")]
    EmptyColumnEdit { table: String, column: String },
    #[error("No add-column keys left for table {0}")]
    KeysExhausted(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope")]
pub enum RenameOperation {
    #[serde(rename = "table", rename_all = "camelCase")]
    TableRename { table_from: String, table_to: String },
    #[serde(rename = "column", rename_all = "camelCase")]
    ColumnEdit {
        table_from: String,
        column_from: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        column_to: Option<String>,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        new_type: Option<String>,
    },
    #[serde(rename = "add-column", rename_all = "camelCase")]
    AddColumn {
        table_from: String,
        column_to: String,
        #[serde(rename = "type")]
        new_type: String,
        /// Draft the entry was confirmed from. Executor-shaped input has
        /// none; decoding a [`Plan`] assigns one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        draft: Option<DraftKey>,
    },
}

/// Identity of a plan entry. No two entries in a plan share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OpKey {
    Table(String),
    Column { table: String, column: String },
    AddColumn { table: String, index: Option<u32> },
}

impl std::fmt::Display for OpKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpKey::Table(table) => write!(f, "table {}", table),
            OpKey::Column { table, column } => write!(f, "column {}.{}", table, column),
            OpKey::AddColumn {
                table,
                index: Some(index),
            } => write!(f, "new column #{} on {}", index, table),
            OpKey::AddColumn { table, index: None } => write!(f, "new column on {}", table),
        }
    }
}

impl RenameOperation {
    pub fn table_rename(from: impl Into<String>, to: impl Into<String>) -> Self {
        RenameOperation::TableRename {
            table_from: from.into(),
            table_to: to.into(),
        }
    }

    /// Build a column edit. At least one of `column_to` / `new_type` must be given.
    pub fn column_edit(
        table: impl Into<String>,
        column: impl Into<String>,
        column_to: Option<String>,
        new_type: Option<String>,
    ) -> Result<Self, PlanError> {
        let (table, column) = (table.into(), column.into());
        if column_to.is_none() && new_type.is_none() {
            return Err(PlanError::EmptyColumnEdit { table, column });
        }
        Ok(RenameOperation::ColumnEdit {
            table_from: table,
            column_from: column,
            column_to,
            new_type,
        })
    }

    pub fn add_column(draft: DraftKey, name: impl Into<String>, typ: impl Into<String>) -> Self {
        RenameOperation::AddColumn {
            table_from: draft.table.clone(),
            column_to: name.into(),
            new_type: typ.into(),
            draft: Some(draft),
        }
    }

    pub fn key(&self) -> OpKey {
        match self {
            RenameOperation::TableRename { table_from, .. } => OpKey::Table(table_from.clone()),
            RenameOperation::ColumnEdit {
                table_from,
                column_from,
                ..
            } => OpKey::Column {
                table: table_from.clone(),
                column: column_from.clone(),
            },
            RenameOperation::AddColumn {
                table_from, draft, ..
            } => OpKey::AddColumn {
                table: table_from.clone(),
                index: draft.as_ref().map(|d| d.index),
            },
        }
    }

    fn has_key(&self, key: &OpKey) -> bool {
        match (self, key) {
            (RenameOperation::TableRename { table_from, .. }, OpKey::Table(t)) => table_from == t,
            (
                RenameOperation::ColumnEdit {
                    table_from,
                    column_from,
                    ..
                },
                OpKey::Column { table, column },
            ) => table_from == table && column_from == column,
            (
                RenameOperation::AddColumn {
                    table_from, draft, ..
                },
                OpKey::AddColumn { table, index },
            ) => table_from == table && draft.as_ref().map(|d| d.index) == *index,
            _ => false,
        }
    }

    /// True when the entry would leave the baseline untouched.
    pub fn is_noop(&self) -> bool {
        match self {
            RenameOperation::TableRename {
                table_from,
                table_to,
            } => table_from == table_to,
            RenameOperation::ColumnEdit {
                column_from,
                column_to,
                new_type,
                ..
            } => new_type.is_none() && column_to.as_ref().is_none_or(|to| to == column_from),
            RenameOperation::AddColumn { .. } => false,
        }
    }

    /// New name of a column edit, if it actually renames.
    pub fn renamed_column(&self) -> Option<&str> {
        match self {
            RenameOperation::ColumnEdit {
                column_from,
                column_to: Some(to),
                ..
            } if to != column_from => Some(to.as_str()),
            _ => None,
        }
    }
}

/// Ordered set of operations, unique by [`OpKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RenameOperation>", into = "Vec<RenameOperation>")]
pub struct Plan {
    ops: Vec<RenameOperation>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(input: &str) -> Result<Self, crate::error::Error> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn get(&self, key: &OpKey) -> Option<&RenameOperation> {
        self.ops.iter().find(|op| op.has_key(key))
    }

    pub(crate) fn get_mut(&mut self, key: &OpKey) -> Option<&mut RenameOperation> {
        self.ops.iter_mut().find(|op| op.has_key(key))
    }

    pub(crate) fn remove(&mut self, key: &OpKey) -> Option<RenameOperation> {
        let pos = self.ops.iter().position(|op| op.has_key(key))?;
        Some(self.ops.remove(pos))
    }

    /// Push a new entry; refuses one whose key is already taken.
    pub(crate) fn append(&mut self, op: RenameOperation) -> Result<(), PlanError> {
        let key = op.key();
        if self.get(&key).is_some() {
            return Err(PlanError::DuplicateKey(key));
        }
        self.ops.push(op);
        Ok(())
    }

    /// Insert a new entry, or replace the one sharing its key in place.
    pub(crate) fn upsert(&mut self, op: RenameOperation) {
        let key = op.key();
        match self.get_mut(&key) {
            Some(existing) => *existing = op,
            None => self.ops.push(op),
        }
    }

    pub fn table_rename(&self, table: &str) -> Option<&str> {
        match self.get(&OpKey::Table(table.to_string()))? {
            RenameOperation::TableRename { table_to, .. } => Some(table_to.as_str()),
            _ => None,
        }
    }

    pub fn column_edit(&self, table: &str, column: &str) -> Option<&RenameOperation> {
        self.get(&OpKey::Column {
            table: table.to_string(),
            column: column.to_string(),
        })
    }

    /// Add-column entries targeting `table`, in insertion order.
    pub fn added_columns<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a RenameOperation> {
        self.ops
            .iter()
            .filter(move |op| matches!(op, RenameOperation::AddColumn { table_from, .. } if table_from == table))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenameOperation> {
        self.ops.iter()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn as_slice(&self) -> &[RenameOperation] {
        &self.ops
    }
}

impl TryFrom<Vec<RenameOperation>> for Plan {
    type Error = PlanError;

    /// Add-column entries without a draft key get the next free index of
    /// their table, after every index already present.
    fn try_from(mut ops: Vec<RenameOperation>) -> Result<Self, Self::Error> {
        let mut next: BTreeMap<String, u32> = BTreeMap::new();
        for op in &ops {
            if let RenameOperation::AddColumn {
                table_from,
                draft: Some(draft),
                ..
            } = op
            {
                let after = draft
                    .index
                    .checked_add(1)
                    .ok_or_else(|| PlanError::KeysExhausted(table_from.clone()))?;
                let slot = next.entry(table_from.clone()).or_insert(0);
                *slot = (*slot).max(after);
            }
        }
        for op in &mut ops {
            if let RenameOperation::AddColumn {
                table_from, draft, ..
            } = op
                && draft.is_none()
            {
                let slot = next.entry(table_from.clone()).or_insert(0);
                let index = *slot;
                *slot = index
                    .checked_add(1)
                    .ok_or_else(|| PlanError::KeysExhausted(table_from.clone()))?;
                *draft = Some(DraftKey::new(table_from.clone(), index));
            }
        }

        let mut plan = Plan::new();
        for op in ops {
            plan.append(op)?;
        }
        Ok(plan)
    }
}

impl From<Plan> for Vec<RenameOperation> {
    fn from(plan: Plan) -> Self {
        plan.ops
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a RenameOperation;
    type IntoIter = std::slice::Iter<'a, RenameOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut plan = Plan::new();
        plan.upsert(RenameOperation::table_rename("A", "B"));
        plan.upsert(RenameOperation::table_rename("X", "Y"));
        plan.upsert(RenameOperation::table_rename("A", "C"));

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.as_slice()[0], RenameOperation::table_rename("A", "C"));
        assert_eq!(plan.table_rename("A"), Some("C"));
    }

    #[test]
    fn test_keys_are_scoped() {
        let mut plan = Plan::new();
        plan.upsert(RenameOperation::table_rename("Customer", "Client"));
        plan.upsert(
            RenameOperation::column_edit("Customer", "Customer", Some("Client".into()), None).unwrap(),
        );
        assert_eq!(plan.len(), 2);
        assert!(plan.column_edit("Customer", "Customer").is_some());
        assert!(plan.column_edit("Customer", "Name").is_none());
    }

    #[test]
    fn test_empty_column_edit_rejected() {
        let err = RenameOperation::column_edit("T", "c", None, None).unwrap_err();
        assert_eq!(err.to_string(), "Column edit on T.c changes neither name nor type");
    }

    #[test]
    fn test_is_noop() {
        assert!(RenameOperation::table_rename("A", "A").is_noop());
        assert!(!RenameOperation::table_rename("A", "B").is_noop());
        let same = RenameOperation::column_edit("T", "c", Some("c".into()), None).unwrap();
        assert!(same.is_noop());
        let retyped = RenameOperation::column_edit("T", "c", Some("c".into()), Some("int".into())).unwrap();
        assert!(!retyped.is_noop());
        assert_eq!(retyped.renamed_column(), None);
    }

    #[test]
    fn test_decode_rejects_duplicate_keys() {
        let input = r#"[
            { "scope": "table", "tableFrom": "A", "tableTo": "B" },
            { "scope": "table", "tableFrom": "A", "tableTo": "C" }
        ]"#;
        let err = serde_json::from_str::<Plan>(input).unwrap_err();
        assert!(err.to_string().contains("Duplicate plan entry: table A"));
    }

    #[test]
    fn test_state_json_shape() {
        let mut plan = Plan::new();
        plan.upsert(RenameOperation::column_edit("T", "c", Some("d".into()), None).unwrap());
        plan.upsert(RenameOperation::add_column(DraftKey::new("T", 0), "e", "int"));
        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json[0]["scope"], "column");
        assert_eq!(json[0]["columnTo"], "d");
        assert!(json[0].get("type").is_none());
        assert_eq!(json[1]["scope"], "add-column");
        assert_eq!(json[1]["draft"]["table"], "T");
    }

    #[test]
    fn test_append_refuses_taken_key() {
        let mut plan = Plan::new();
        plan.append(RenameOperation::add_column(DraftKey::new("T", 0), "Email", "varchar"))
            .unwrap();
        let err = plan
            .append(RenameOperation::add_column(DraftKey::new("T", 0), "Phone", "int"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Duplicate plan entry: new column #0 on T");
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_decode_add_columns_without_draft() {
        let input = r#"[
            { "scope": "add-column", "tableFrom": "T", "columnTo": "a", "type": "int" },
            { "scope": "add-column", "tableFrom": "T", "columnTo": "b", "type": "int",
              "draft": { "table": "T", "index": 3 } },
            { "scope": "add-column", "tableFrom": "T", "columnTo": "c", "type": "int" },
            { "scope": "add-column", "tableFrom": "U", "columnTo": "d", "type": "int" }
        ]"#;
        let plan = Plan::from_json(input).unwrap();
        let keys: Vec<_> = plan.iter().map(|op| op.key().to_string()).collect();
        assert_eq!(
            keys,
            [
                "new column #4 on T",
                "new column #3 on T",
                "new column #5 on T",
                "new column #0 on U",
            ]
        );
    }

    #[test]
    fn test_decode_add_column_key_overflow() {
        let input = r#"[
            { "scope": "add-column", "tableFrom": "T", "columnTo": "a", "type": "int",
              "draft": { "table": "T", "index": 4294967295 } }
        ]"#;
        let err = serde_json::from_str::<Plan>(input).unwrap_err();
        assert!(err.to_string().contains("No add-column keys left for table T"));
    }
}
