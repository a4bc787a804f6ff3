use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    BlockId, BlockType, BlockedWeek, EditorError, Entry, EntryDraft, EntryId, GridCell,
    GridLayout, MeetingId, PersistenceError, PlacementOutcome, PlanEditor, PlanError,
    SemesterPlan, SharedPlanStore, Spreadsheet, render,
};

pub type SharedEditor = Arc<RwLock<PlanEditor<SharedPlanStore>>>;

#[derive(Clone)]
pub struct AppState {
    editor: SharedEditor,
}

impl AppState {
    pub fn new(editor: PlanEditor<SharedPlanStore>) -> Self {
        Self {
            editor: Arc::new(RwLock::new(editor)),
        }
    }

    pub fn with_shared(editor: SharedEditor) -> Self {
        Self { editor }
    }

    fn editor(&self) -> SharedEditor {
        self.editor.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<PlanError> for ApiError {
    fn from(value: PlanError) -> Self {
        match value {
            PlanError::Validation(_) => ApiError::Invalid(value.to_string()),
            PlanError::DuplicateBlock { .. } => ApiError::Conflict(value.to_string()),
            PlanError::EntryNotFound(_) => ApiError::NotFound(value.to_string()),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

impl From<EditorError> for ApiError {
    fn from(value: EditorError) -> Self {
        match value {
            EditorError::Plan(err) => err.into(),
            EditorError::Persistence(err) => err.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct BlockPayload {
    period: u8,
    slot: u8,
    #[serde(rename = "type")]
    block_type: String,
    label: String,
}

#[derive(Debug, Deserialize)]
struct CellPayload {
    period: u8,
    slot: u8,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/plan", get(get_plan))
        .route("/layout", get(get_layout))
        .route("/blocks", get(list_blocks).post(create_block))
        .route("/blocks/:id", delete(delete_block))
        .route("/entries", get(list_entries).post(create_entry))
        .route(
            "/entries/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .route("/entries/:id/plot", post(toggle_plot))
        .route("/entries/:id/meetings", post(add_meeting))
        .route(
            "/entries/:id/meetings/:meeting_id",
            delete(remove_meeting),
        )
        .route("/suggestions/entry", get(suggest_entry))
        .route("/export/csv", get(export_csv))
        .route("/export/sheet", get(export_sheet))
        .route("/export/print", get(export_print))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, editor: PlanEditor<SharedPlanStore>) -> std::io::Result<()> {
    let state = AppState::new(editor);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_plan(State(state): State<AppState>) -> Json<SemesterPlan> {
    let editor = state.editor();
    let plan = {
        let guard = editor.read();
        guard.plan().clone()
    };
    Json(plan)
}

async fn get_layout(State(state): State<AppState>) -> Json<GridLayout> {
    let editor = state.editor();
    let layout = {
        let guard = editor.read();
        guard.layout()
    };
    Json(layout)
}

async fn list_blocks(State(state): State<AppState>) -> Json<Vec<BlockedWeek>> {
    let editor = state.editor();
    let blocks = {
        let guard = editor.read();
        guard.plan().blocked_weeks().as_slice().to_vec()
    };
    Json(blocks)
}

async fn create_block(
    State(state): State<AppState>,
    Json(payload): Json<BlockPayload>,
) -> Result<(StatusCode, Json<BlockedWeek>), ApiError> {
    let block_type: BlockType = payload.block_type.parse()?;
    let cell = GridCell::new(payload.period, payload.slot);
    let editor = state.editor();
    let created = {
        let mut guard = editor.write();
        let block_id = guard.add_block(cell, block_type, &payload.label)?;
        guard
            .plan()
            .blocked_weeks()
            .get(block_id)
            .cloned()
            .ok_or_else(|| ApiError::internal("block not found after creation"))?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

/// Removing an unknown block is not an error.
async fn delete_block(
    State(state): State<AppState>,
    Path(block_id): Path<BlockId>,
) -> Result<StatusCode, ApiError> {
    let editor = state.editor();
    {
        let mut guard = editor.write();
        guard.remove_block(block_id)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_entries(State(state): State<AppState>) -> Json<Vec<Entry>> {
    let editor = state.editor();
    let entries = {
        let guard = editor.read();
        guard.plan().entries().to_vec()
    };
    Json(entries)
}

async fn get_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<EntryId>,
) -> Result<Json<Entry>, ApiError> {
    let editor = state.editor();
    let result = {
        let guard = editor.read();
        guard.plan().entry(entry_id).cloned()
    };
    match result {
        Some(entry) => Ok(Json(entry)),
        None => Err(ApiError::not_found(format!("entry {entry_id} not found"))),
    }
}

async fn create_entry(
    State(state): State<AppState>,
    Json(draft): Json<EntryDraft>,
) -> Result<(StatusCode, Json<Entry>), ApiError> {
    let editor = state.editor();
    let created = {
        let mut guard = editor.write();
        let entry_id = guard.create_entry(draft)?;
        find_entry(&guard, entry_id)?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<EntryId>,
    Json(draft): Json<EntryDraft>,
) -> Result<Json<Entry>, ApiError> {
    let editor = state.editor();
    let updated = {
        let mut guard = editor.write();
        guard.update_entry(entry_id, draft)?;
        find_entry(&guard, entry_id)?
    };
    Ok(Json(updated))
}

async fn delete_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<EntryId>,
) -> Result<StatusCode, ApiError> {
    let editor = state.editor();
    let removed = {
        let mut guard = editor.write();
        guard.delete_entry(entry_id)?
    };
    if !removed {
        return Err(ApiError::not_found(format!("entry {entry_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_plot(
    State(state): State<AppState>,
    Path(entry_id): Path<EntryId>,
    Json(payload): Json<CellPayload>,
) -> Result<Json<PlacementOutcome>, ApiError> {
    let editor = state.editor();
    let outcome = {
        let mut guard = editor.write();
        guard.toggle_plot(entry_id, GridCell::new(payload.period, payload.slot))?
    };
    Ok(Json(outcome))
}

async fn add_meeting(
    State(state): State<AppState>,
    Path(entry_id): Path<EntryId>,
) -> Result<(StatusCode, Json<Entry>), ApiError> {
    let editor = state.editor();
    let updated = {
        let mut guard = editor.write();
        guard.add_meeting_detail(entry_id)?;
        find_entry(&guard, entry_id)?
    };
    Ok((StatusCode::CREATED, Json(updated)))
}

async fn remove_meeting(
    State(state): State<AppState>,
    Path((entry_id, meeting_id)): Path<(EntryId, MeetingId)>,
) -> Result<Json<Entry>, ApiError> {
    let editor = state.editor();
    let updated = {
        let mut guard = editor.write();
        if !guard.remove_meeting_detail(entry_id, meeting_id)? {
            let entry = find_entry(&guard, entry_id)?;
            if entry.meeting_details.iter().any(|detail| detail.id == meeting_id) {
                return Err(ApiError::Conflict(format!(
                    "entry {entry_id} must keep at least one meeting"
                )));
            }
            return Err(ApiError::not_found(format!(
                "meeting {meeting_id} not found in entry {entry_id}"
            )));
        }
        find_entry(&guard, entry_id)?
    };
    Ok(Json(updated))
}

/// Pre-filled add-entry form. Reserves the meeting number it hands out.
async fn suggest_entry(State(state): State<AppState>) -> Result<Json<EntryDraft>, ApiError> {
    let editor = state.editor();
    let draft = {
        let mut guard = editor.write();
        guard.prepare_entry_draft()?
    };
    Ok(Json(draft))
}

async fn export_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let editor = state.editor();
    let layout = {
        let guard = editor.read();
        guard.layout()
    };
    let body = Spreadsheet::from_layout(&layout).to_csv_string()?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body).into_response())
}

/// Sheet rows with their merge ranges, for clients that build real
/// spreadsheets.
async fn export_sheet(State(state): State<AppState>) -> Json<Spreadsheet> {
    let editor = state.editor();
    let layout = {
        let guard = editor.read();
        guard.layout()
    };
    Json(Spreadsheet::from_layout(&layout))
}

async fn export_print(State(state): State<AppState>) -> Html<String> {
    let editor = state.editor();
    let layout = {
        let guard = editor.read();
        guard.layout()
    };
    Html(render::print::render_document(&layout))
}

fn find_entry(editor: &PlanEditor<SharedPlanStore>, entry_id: EntryId) -> Result<Entry, ApiError> {
    editor
        .plan()
        .entry(entry_id)
        .cloned()
        .ok_or_else(|| ApiError::not_found(format!("entry {entry_id} not found")))
}
