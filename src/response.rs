//! The envelope every endpoint answers with:
//! `{ "status": 200, "message": "success", "data": { "data": ... } }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct Payload<T> {
    pub data: T,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    /// HTTP status code, repeated in the body
    pub status: u16,
    pub message: String,
    pub data: Payload<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            data: Payload { data },
        }
    }

    pub fn ok(data: T) -> Self {
        Self::new(StatusCode::OK, "success", data)
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
