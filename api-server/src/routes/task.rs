//! Task API endpoints
//!
//! RESTful API for task CRUD operations. Bodies use the stored field names
//! (`titulo`, `data_inicio`, ...) and the status/priority codes.

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use tarefas_core::task::{NewTask, Task, TaskPatch, TaskPriority, TaskRepository, TaskStatus};
use tarefas_core::{Error, ValidationErrors};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

/// A body value expected to be a JSON string.
///
/// Anything else is kept so it can be reported as a field error.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    Text(String),
    Other(serde_json::Value),
}

/// Body of `POST /api/tasks` and `PUT /api/tasks/{id}`.
///
/// Every key is optional here so that missing required fields come back as
/// field errors instead of a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub titulo: Option<TextInput>,
    #[serde(default)]
    pub descricao: Option<TextInput>,
    #[serde(default)]
    pub data_inicio: Option<TextInput>,
    #[serde(default)]
    pub data_termino: Option<TextInput>,
    #[serde(default)]
    pub status: Option<TextInput>,
    #[serde(default)]
    pub prioridade: Option<TextInput>,
    #[serde(default)]
    pub responsavel: Option<TextInput>,
    #[serde(default)]
    pub observacoes: Option<TextInput>,
}

/// Body of `PATCH /api/tasks/{id}`. `null` clears `responsavel`/`observacoes`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub titulo: Option<TextInput>,
    #[serde(default)]
    pub descricao: Option<TextInput>,
    #[serde(default)]
    pub data_inicio: Option<TextInput>,
    #[serde(default)]
    pub data_termino: Option<TextInput>,
    #[serde(default)]
    pub status: Option<TextInput>,
    #[serde(default)]
    pub prioridade: Option<TextInput>,
    #[serde(default, deserialize_with = "nullable")]
    pub responsavel: Option<Option<TextInput>>,
    #[serde(default, deserialize_with = "nullable")]
    pub observacoes: Option<Option<TextInput>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub prioridade: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    #[serde(flatten)]
    pub task: Task,
    pub status_display: &'static str,
    pub prioridade_display: &'static str,
    pub display: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            status_display: task.status.label(),
            prioridade_display: task.priority.label(),
            display: task.render(),
            task,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<&'static str, Vec<String>>>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: Error) -> ApiError {
    match err {
        Error::Validation(errors) => {
            tracing::debug!("Rejected task input: {}", errors);
            let mut fields: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
            for e in errors.iter() {
                fields.entry(e.field).or_default().push(e.message.clone());
            }
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Validation failed: {}", errors),
                    fields: Some(fields),
                }),
            )
        }
        Error::TaskNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Task {} not found", id),
                fields: None,
            }),
        ),
        e => {
            tracing::error!("Task store failure: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                    fields: None,
                }),
            )
        }
    }
}

/// Malformed or non-object bodies, reported in the same shape as field errors
fn rejection_response(rejection: JsonRejection) -> ApiError {
    tracing::debug!("Rejected task body: {}", rejection.body_text());
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: rejection.body_text(),
            fields: None,
        }),
    )
}

// ============================================================================
// Input conversion
// ============================================================================

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<TextInput>,
) -> Option<String> {
    match value? {
        TextInput::Text(text) => Some(text),
        TextInput::Other(_) => {
            errors.push(field, "Not a valid string.");
            None
        }
    }
}

fn required(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<TextInput>,
) -> Option<String> {
    if value.is_none() {
        errors.push(field, "This field is required.");
    }
    text(errors, field, value)
}

/// Like `text`, but keeps an explicit `null` as `Some(None)`
fn nullable_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<Option<TextInput>>,
) -> Option<Option<String>> {
    match value? {
        None => Some(None),
        Some(input) => text(errors, field, Some(input)).map(Some),
    }
}

fn parse_date(errors: &mut ValidationErrors, field: &'static str, raw: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(field, "Date has wrong format. Use YYYY-MM-DD.");
            None
        }
    }
}

fn parse_choice<T>(errors: &mut ValidationErrors, field: &'static str, raw: &str) -> Option<T>
where
    T: FromStr<Err = Error>,
{
    match raw.parse() {
        Ok(value) => Some(value),
        Err(Error::Validation(e)) => {
            errors.extend(e);
            None
        }
        Err(e) => {
            errors.push(field, e.to_string());
            None
        }
    }
}

impl CreateTaskRequest {
    pub fn into_new_task(self) -> tarefas_core::Result<NewTask> {
        let mut errors = ValidationErrors::new();

        let title = required(&mut errors, "titulo", self.titulo);
        let description = required(&mut errors, "descricao", self.descricao);
        let start_date = required(&mut errors, "data_inicio", self.data_inicio)
            .and_then(|raw| parse_date(&mut errors, "data_inicio", &raw));
        let end_date = required(&mut errors, "data_termino", self.data_termino)
            .and_then(|raw| parse_date(&mut errors, "data_termino", &raw));
        let status = text(&mut errors, "status", self.status)
            .and_then(|raw| parse_choice::<TaskStatus>(&mut errors, "status", &raw));
        let priority = text(&mut errors, "prioridade", self.prioridade)
            .and_then(|raw| parse_choice::<TaskPriority>(&mut errors, "prioridade", &raw));
        let assignee = text(&mut errors, "responsavel", self.responsavel);
        let notes = text(&mut errors, "observacoes", self.observacoes);

        match (title, description, start_date, end_date) {
            (Some(title), Some(description), Some(start_date), Some(end_date))
                if errors.is_empty() =>
            {
                Ok(NewTask {
                    title,
                    description,
                    start_date,
                    end_date,
                    status,
                    priority,
                    assignee,
                    notes,
                })
            }
            _ => Err(Error::Validation(errors)),
        }
    }
}

impl UpdateTaskRequest {
    pub fn into_patch(self) -> tarefas_core::Result<TaskPatch> {
        let mut errors = ValidationErrors::new();

        let patch = TaskPatch {
            title: text(&mut errors, "titulo", self.titulo),
            description: text(&mut errors, "descricao", self.descricao),
            start_date: text(&mut errors, "data_inicio", self.data_inicio)
                .and_then(|raw| parse_date(&mut errors, "data_inicio", &raw)),
            end_date: text(&mut errors, "data_termino", self.data_termino)
                .and_then(|raw| parse_date(&mut errors, "data_termino", &raw)),
            status: text(&mut errors, "status", self.status)
                .and_then(|raw| parse_choice(&mut errors, "status", &raw)),
            priority: text(&mut errors, "prioridade", self.prioridade)
                .and_then(|raw| parse_choice(&mut errors, "prioridade", &raw)),
            assignee: nullable_text(&mut errors, "responsavel", self.responsavel),
            notes: nullable_text(&mut errors, "observacoes", self.observacoes),
        };

        errors.into_result()?;
        Ok(patch)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/tasks - List tasks, optionally filtered by status and priority
async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let mut errors = ValidationErrors::new();
    let status = query
        .status
        .and_then(|raw| parse_choice::<TaskStatus>(&mut errors, "status", &raw));
    let priority = query
        .prioridade
        .and_then(|raw| parse_choice::<TaskPriority>(&mut errors, "prioridade", &raw));
    errors.into_result().map_err(error_response)?;

    let store = state.task_store();
    let tasks = match (status, priority) {
        (Some(status), Some(priority)) => store
            .find_by_status(status)
            .await
            .map(|tasks| {
                tasks
                    .into_iter()
                    .filter(|t| t.priority == priority)
                    .collect::<Vec<_>>()
            }),
        (Some(status), None) => store.find_by_status(status).await,
        (None, Some(priority)) => store.find_by_priority(priority).await,
        (None, None) => store.list().await,
    }
    .map_err(error_response)?;

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// POST /api/tasks - Create a new task
async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let Json(req) = body.map_err(rejection_response)?;
    let new = req.into_new_task().map_err(error_response)?;
    let created = state
        .task_store()
        .create(new)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(created))))
}

/// GET /api/tasks/:id - Get a single task
async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state.task_store().get(id).await.map_err(error_response)?;
    Ok(Json(TaskResponse::from(task)))
}

/// PUT /api/tasks/:id - Replace every mutable field of a task
async fn replace_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    // Unknown ids report 404 before body errors
    state.task_store().get(id).await.map_err(error_response)?;

    let Json(req) = body.map_err(rejection_response)?;
    let new = req.into_new_task().map_err(error_response)?;
    let updated = state
        .task_store()
        .update(id, TaskPatch::from(new))
        .await
        .map_err(error_response)?;

    Ok(Json(TaskResponse::from(updated)))
}

/// PATCH /api/tasks/:id - Update the supplied fields of a task
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    state.task_store().get(id).await.map_err(error_response)?;

    let Json(req) = body.map_err(rejection_response)?;
    let patch = req.into_patch().map_err(error_response)?;
    let updated = state
        .task_store()
        .update(id, patch)
        .await
        .map_err(error_response)?;

    Ok(Json(TaskResponse::from(updated)))
}

/// DELETE /api/tasks/:id - Delete a task
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.task_store().delete(id).await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task)
                .put(replace_task)
                .patch(update_task)
                .delete(delete_task),
        )
}
