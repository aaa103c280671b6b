use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use utoipa::OpenApi;

use std::sync::Arc;

use crate::{
    dto::{CreatedNote, NoteRequest, NoteResponse},
    error::{AppError, AppResult},
    response::Envelope,
    service::{NoteService, ServiceError},
};

#[derive(OpenApi)]
#[openapi(
    paths(create_note, get_one_note, get_all_notes, update_note, delete_note),
    components(schemas(NoteRequest, NoteResponse, CreatedNote)),
    tags(
        (name = "notes", description = "Notes management API")
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    post,
    path = "/note",
    request_body = NoteRequest,
    responses(
        (status = 201, description = "Note created successfully", body = Envelope<CreatedNote>),
        (status = 400, description = "Malformed body or missing title/content", body = Envelope<String>),
        (status = 500, description = "Internal server error", body = Envelope<String>)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(
    State(service): State<Arc<NoteService>>,
    payload: Result<Json<NoteRequest>, JsonRejection>,
) -> AppResult<Envelope<CreatedNote>> {
    let Json(payload) = payload?;
    let created = service.create_note(payload).await?;

    Ok(Envelope::new(StatusCode::CREATED, "Success Created", created))
}

#[utoipa::path(
    get,
    path = "/note/{id}",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note found", body = Envelope<NoteResponse>),
        (status = 404, description = "Note not found", body = Envelope<String>),
        (status = 500, description = "Internal server error", body = Envelope<String>)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_one_note(
    State(service): State<Arc<NoteService>>,
    Path(id): Path<String>,
) -> AppResult<Envelope<NoteResponse>> {
    let note = service.get_one_note(&id).await?;

    Ok(Envelope::ok(note))
}

#[utoipa::path(
    get,
    path = "/note",
    responses(
        (status = 200, description = "List of all notes", body = Envelope<Vec<NoteResponse>>),
        (status = 400, description = "Notes could not be listed", body = Envelope<String>)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_all_notes(
    State(service): State<Arc<NoteService>>,
) -> AppResult<Envelope<Vec<NoteResponse>>> {
    // Listing failures are reported as 400
    let notes = service.get_all_notes().await.map_err(|e| match e {
        ServiceError::Storage(_) | ServiceError::Timeout(_) => {
            tracing::error!("failed to list notes: {}", e);
            AppError::BadRequest(e.to_string())
        }
        e => e.into(),
    })?;

    Ok(Envelope::new(StatusCode::OK, "Success Get All", notes))
}

#[utoipa::path(
    put,
    path = "/note/{id}",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Note updated successfully", body = Envelope<NoteResponse>),
        (status = 400, description = "Malformed body or missing title/content", body = Envelope<String>),
        (status = 404, description = "Note not found", body = Envelope<String>),
        (status = 500, description = "Internal server error", body = Envelope<String>)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn update_note(
    State(service): State<Arc<NoteService>>,
    Path(id): Path<String>,
    payload: Result<Json<NoteRequest>, JsonRejection>,
) -> AppResult<Envelope<NoteResponse>> {
    let Json(payload) = payload?;
    let note = service.update_note(&id, payload).await?;

    Ok(Envelope::ok(note))
}

#[utoipa::path(
    delete,
    path = "/note/{id}",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note deleted successfully", body = Envelope<String>),
        (status = 404, description = "Note not found", body = Envelope<String>),
        (status = 500, description = "Internal server error", body = Envelope<String>)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn delete_note(
    State(service): State<Arc<NoteService>>,
    Path(id): Path<String>,
) -> AppResult<Envelope<&'static str>> {
    service.delete_note(&id).await?;

    Ok(Envelope::ok("Note successfully deleted!"))
}

#[debug_handler]
pub async fn root() -> Response {
    (StatusCode::OK, "Hello from notes api!").into_response()
}
