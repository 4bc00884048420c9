//! Caller-owned editor state: one baseline, one plan, its drafts.

use crate::draft::{DraftError, DraftKey};
use crate::engine::{Edit, EditState, Reconciler};
use crate::options::ReconcileOptions;
use crate::payload::ExecutorRequest;
use crate::plan::Plan;
use crate::preview::{SchemaPreview, preview};
use crate::schema::{BaselineSchema, SchemaError};
use log::info;

#[derive(Debug, Clone, Default)]
pub struct Workspace {
    baseline: BaselineSchema,
    state: EditState,
    reconciler: Reconciler,
}

impl Workspace {
    pub fn new(baseline: BaselineSchema) -> Self {
        Self::with_options(baseline, ReconcileOptions::default())
    }

    pub fn with_options(baseline: BaselineSchema, options: ReconcileOptions) -> Self {
        Self {
            baseline,
            state: EditState::default(),
            reconciler: Reconciler::new(options),
        }
    }

    /// Replace the baseline. Pending changes never carry over.
    pub fn load_schema(&mut self, baseline: BaselineSchema) {
        if !self.state.plan.is_empty() || !self.state.drafts.is_empty() {
            info!(
                "schema reloaded, discarding {} pending operation(s) and {} draft(s)",
                self.state.plan.len(),
                self.state.drafts.len()
            );
        }
        self.baseline = baseline;
        self.state = EditState::default();
    }

    pub fn apply(&mut self, edit: &Edit) {
        let state = std::mem::take(&mut self.state);
        self.state = self.reconciler.apply(state, edit);
    }

    pub fn apply_all<'a>(&mut self, edits: impl IntoIterator<Item = &'a Edit>) {
        for edit in edits {
            self.apply(edit);
        }
    }

    pub fn open_draft(&mut self, table: &str) -> Result<DraftKey, DraftError> {
        self.state.drafts.open(table)
    }

    /// Type change against the baseline type of `table`.`column`.
    pub fn retype_column(&mut self, table: &str, column: &str, proposed: &str) -> Result<(), SchemaError> {
        let baseline = self
            .baseline
            .column(table, column)
            .ok_or_else(|| SchemaError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            })?
            .sql_type
            .clone();
        self.apply(&Edit::ChangeColumnType {
            table: table.to_string(),
            column: column.to_string(),
            proposed: proposed.to_string(),
            baseline,
        });
        Ok(())
    }

    /// Snapshot for the plan executor. The plan itself is left as is.
    pub fn submit(&self) -> ExecutorRequest<'_> {
        info!("submitting {} operation(s)", self.state.plan.len());
        ExecutorRequest::from_plan(&self.state.plan)
    }

    pub fn preview(&self) -> SchemaPreview {
        preview(&self.baseline, &self.state.plan)
    }

    pub fn baseline(&self) -> &BaselineSchema {
        &self.baseline
    }

    pub fn plan(&self) -> &Plan {
        &self.state.plan
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }
}
