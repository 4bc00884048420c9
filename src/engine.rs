//! Rename-plan reconciliation.
//!
//! Every transition takes the current plan by value and returns the next one.
//! The engine keeps no state of its own and never looks at the baseline schema
//! beyond the values passed in with an edit.

use crate::draft::{DraftError, DraftKey, Drafts};
use crate::options::{NameRevert, ReconcileOptions};
use crate::plan::{OpKey, Plan, RenameOperation};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

/// A discrete user edit, as emitted by the schema editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Edit {
    RenameTable {
        table: String,
        proposed: String,
    },
    RenameColumn {
        table: String,
        column: String,
        proposed: String,
    },
    ChangeColumnType {
        table: String,
        column: String,
        proposed: String,
        baseline: String,
    },
    OpenDraft {
        table: String,
    },
    SetDraftName {
        draft: DraftKey,
        name: String,
    },
    SetDraftType {
        draft: DraftKey,
        #[serde(rename = "type")]
        typ: String,
    },
    ConfirmDraft {
        draft: DraftKey,
    },
    CancelDraft {
        draft: DraftKey,
    },
}

/// Everything an editor session mutates: the plan and the open drafts.
///
/// On decode, every add-column key already in the plan is reserved in the
/// drafts so that a newly opened draft never reuses one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EditStateRepr", into = "EditStateRepr")]
pub struct EditState {
    pub plan: Plan,
    pub drafts: Drafts,
}

#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
struct EditStateRepr {
    plan: Plan,
    drafts: Drafts,
}

impl TryFrom<EditStateRepr> for EditState {
    type Error = DraftError;

    fn try_from(repr: EditStateRepr) -> Result<Self, Self::Error> {
        let EditStateRepr { plan, mut drafts } = repr;
        for op in &plan {
            if let RenameOperation::AddColumn {
                table_from,
                draft: Some(key),
                ..
            } = op
            {
                drafts.reserve(&DraftKey::new(table_from.clone(), key.index))?;
            }
        }
        Ok(EditState { plan, drafts })
    }
}

impl From<EditState> for EditStateRepr {
    fn from(state: EditState) -> Self {
        EditStateRepr {
            plan: state.plan,
            drafts: state.drafts,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(options: ReconcileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    pub fn rename_table(&self, mut plan: Plan, original: &str, proposed: &str) -> Plan {
        let key = OpKey::Table(original.to_string());

        if proposed == original {
            if plan.remove(&key).is_some() {
                debug!("table {} reverted", original);
            }
            return plan;
        }

        match plan.get_mut(&key) {
            Some(RenameOperation::TableRename { table_to, .. }) => {
                *table_to = proposed.to_string();
            }
            _ => plan.upsert(RenameOperation::table_rename(original, proposed)),
        }
        debug!("table {} -> {}", original, proposed);
        plan
    }

    pub fn rename_column(&self, mut plan: Plan, table: &str, original: &str, proposed: &str) -> Plan {
        let key = OpKey::Column {
            table: table.to_string(),
            column: original.to_string(),
        };

        if proposed == original {
            let keep_type = self.options.name_revert == NameRevert::KeepPendingType;
            match plan.get_mut(&key) {
                Some(RenameOperation::ColumnEdit {
                    column_to,
                    new_type: Some(_),
                    ..
                }) if keep_type => {
                    *column_to = Some(original.to_string());
                    debug!("column {}.{} name reverted, type change kept", table, original);
                }
                Some(_) => {
                    plan.remove(&key);
                    debug!("column {}.{} reverted", table, original);
                }
                None => trace!("column {}.{} unchanged", table, original),
            }
            return plan;
        }

        match plan.get_mut(&key) {
            Some(RenameOperation::ColumnEdit { column_to, .. }) => {
                *column_to = Some(proposed.to_string());
            }
            _ => plan.upsert(RenameOperation::ColumnEdit {
                table_from: table.to_string(),
                column_from: original.to_string(),
                column_to: Some(proposed.to_string()),
                new_type: None,
            }),
        }
        debug!("column {}.{} -> {}", table, original, proposed);
        plan
    }

    pub fn change_column_type(
        &self,
        mut plan: Plan,
        table: &str,
        column: &str,
        proposed: &str,
        baseline: &str,
    ) -> Plan {
        let key = OpKey::Column {
            table: table.to_string(),
            column: column.to_string(),
        };
        let is_changing = !proposed.is_empty() && proposed != baseline;

        let prune = match plan.get_mut(&key) {
            Some(RenameOperation::ColumnEdit {
                column_to, new_type, ..
            }) => {
                if is_changing {
                    *new_type = Some(proposed.to_string());
                    false
                } else {
                    *new_type = None;
                    let to = column_to.get_or_insert_with(|| column.to_string());
                    self.options.prune_empty_edits && to.as_str() == column
                }
            }
            _ if is_changing => {
                plan.upsert(RenameOperation::ColumnEdit {
                    table_from: table.to_string(),
                    column_from: column.to_string(),
                    column_to: Some(column.to_string()),
                    new_type: Some(proposed.to_string()),
                });
                false
            }
            _ => {
                trace!("column {}.{} type unchanged", table, column);
                return plan;
            }
        };

        if prune {
            plan.remove(&key);
            debug!("column {}.{} type reverted, entry pruned", table, column);
            return plan;
        }
        debug!("column {}.{} type {} -> {}", table, column, baseline, proposed);
        plan
    }

    /// Promote a complete draft to an add-column entry. Incomplete or unknown
    /// drafts leave both the plan and the drafts untouched, as does a draft
    /// whose key already names an entry in the plan.
    pub fn confirm_add_column(&self, mut plan: Plan, mut drafts: Drafts, key: &DraftKey) -> (Plan, Drafts) {
        let draft = match drafts.get(key) {
            Some(draft) if draft.is_complete() => draft.clone(),
            _ => {
                trace!("draft {}#{} not ready", key.table, key.index);
                return (plan, drafts);
            }
        };

        let op = RenameOperation::add_column(key.clone(), draft.name, draft.typ);
        match plan.append(op) {
            Ok(()) => {
                debug!("add column {}.{}", key.table, key.index);
                drafts.remove(key);
            }
            Err(e) => warn!("draft {}#{} kept: {}", key.table, key.index, e),
        }
        (plan, drafts)
    }

    pub fn cancel_add_column(&self, mut drafts: Drafts, key: &DraftKey) -> Drafts {
        if drafts.remove(key).is_some() {
            debug!("draft {}#{} discarded", key.table, key.index);
        }
        drafts
    }

    pub fn apply(&self, state: EditState, edit: &Edit) -> EditState {
        let EditState { plan, mut drafts } = state;

        match edit {
            Edit::RenameTable { table, proposed } => EditState {
                plan: self.rename_table(plan, table, proposed),
                drafts,
            },
            Edit::RenameColumn {
                table,
                column,
                proposed,
            } => EditState {
                plan: self.rename_column(plan, table, column, proposed),
                drafts,
            },
            Edit::ChangeColumnType {
                table,
                column,
                proposed,
                baseline,
            } => EditState {
                plan: self.change_column_type(plan, table, column, proposed, baseline),
                drafts,
            },
            Edit::OpenDraft { table } => {
                if let Err(e) = drafts.open(table) {
                    warn!("{}", e);
                }
                EditState { plan, drafts }
            }
            Edit::SetDraftName { draft, name } => {
                drafts.set_name(draft, name);
                EditState { plan, drafts }
            }
            Edit::SetDraftType { draft, typ } => {
                drafts.set_type(draft, typ);
                EditState { plan, drafts }
            }
            Edit::ConfirmDraft { draft } => {
                let (plan, drafts) = self.confirm_add_column(plan, drafts, draft);
                EditState { plan, drafts }
            }
            Edit::CancelDraft { draft } => EditState {
                drafts: self.cancel_add_column(drafts, draft),
                plan,
            },
        }
    }

    /// Replay an edit log from an empty state.
    pub fn replay<'a>(&self, edits: impl IntoIterator<Item = &'a Edit>) -> EditState {
        edits
            .into_iter()
            .fold(EditState::default(), |state, edit| self.apply(state, edit))
    }
}
