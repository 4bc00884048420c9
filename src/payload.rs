//! Request payload for the plan executor.

use crate::plan::{Plan, RenameOperation};
use serde::Serialize;

/// One entry of the `renames` array, borrowed from a plan snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope")]
pub enum Rename<'a> {
    #[serde(rename = "table", rename_all = "camelCase")]
    Table { table_from: &'a str, table_to: &'a str },
    #[serde(rename = "column", rename_all = "camelCase")]
    Column {
        table_from: &'a str,
        column_from: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        column_to: Option<&'a str>,
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        new_type: Option<&'a str>,
    },
    #[serde(rename = "add-column", rename_all = "camelCase")]
    AddColumn {
        table_from: &'a str,
        column_to: &'a str,
        #[serde(rename = "type")]
        new_type: &'a str,
    },
}

impl<'a> From<&'a RenameOperation> for Rename<'a> {
    fn from(op: &'a RenameOperation) -> Self {
        match op {
            RenameOperation::TableRename {
                table_from,
                table_to,
            } => Rename::Table {
                table_from,
                table_to,
            },
            RenameOperation::ColumnEdit {
                table_from,
                column_from,
                column_to,
                new_type,
            } => Rename::Column {
                table_from,
                column_from,
                column_to: column_to.as_deref(),
                new_type: new_type.as_deref(),
            },
            RenameOperation::AddColumn {
                table_from,
                column_to,
                new_type,
                ..
            } => Rename::AddColumn {
                table_from,
                column_to,
                new_type,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutorRequest<'a> {
    pub renames: Vec<Rename<'a>>,
}

impl<'a> ExecutorRequest<'a> {
    pub fn from_plan(plan: &'a Plan) -> Self {
        Self {
            renames: plan.iter().map(Rename::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
