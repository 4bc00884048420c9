pub mod draft;
pub mod engine;
pub mod error;
pub mod logger;
pub mod options;
pub mod payload;
pub mod plan;
pub mod preview;
pub mod schema;
pub mod session;
pub mod summary;

use wasm_bindgen::prelude::*;

use engine::{Edit, EditState, Reconciler};
use options::ReconcileOptions;
use payload::ExecutorRequest;
use plan::Plan;
use schema::BaselineSchema;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn apply_edit_json(state: &str, edit: &str, options: Option<&str>) -> error::Result<String> {
    let state: EditState = if state.trim().is_empty() {
        EditState::default()
    } else {
        serde_json::from_str(state)?
    };
    let edit: Edit = serde_json::from_str(edit)?;
    let options: ReconcileOptions = match options {
        Some(json) => serde_json::from_str(json)?,
        None => ReconcileOptions::default(),
    };

    let next = Reconciler::new(options).apply(state, &edit);
    Ok(serde_json::to_string(&next)?)
}

/// Apply one editor event to a serialized `{ plan, drafts }` state and
/// return the next state. An empty state string starts from scratch.
#[wasm_bindgen(js_name = "applyEdit")]
pub fn apply_edit(state: &str, edit: &str, options: Option<String>) -> Result<String, String> {
    apply_edit_json(state, edit, options.as_deref()).map_err(|e| e.to_string())
}

/// Build the executor request body (`{ "renames": [...] }`) for a plan.
#[wasm_bindgen(js_name = "executorRequest")]
pub fn executor_request(plan: &str) -> Result<String, String> {
    let plan = Plan::from_json(plan).map_err(|e| e.to_string())?;
    ExecutorRequest::from_plan(&plan)
        .to_json()
        .map_err(|e| e.to_string())
}

/// Project a schema snapshot through a plan for display.
#[wasm_bindgen(js_name = "previewSchema")]
pub fn preview_schema(schema: &str, plan: &str) -> Result<String, String> {
    let schema = BaselineSchema::from_json(schema).map_err(|e| e.to_string())?;
    let plan = Plan::from_json(plan).map_err(|e| e.to_string())?;
    serde_json::to_string(&preview::preview(&schema, &plan)).map_err(|e| e.to_string())
}

/// Describe a plan as display lines, one per operation.
#[wasm_bindgen(js_name = "describePlan")]
pub fn describe_plan(plan: &str) -> Result<js_sys::Array, String> {
    let plan = Plan::from_json(plan).map_err(|e| e.to_string())?;
    Ok(summary::describe_lines(&plan)
        .into_iter()
        .map(JsValue::from)
        .collect())
}
