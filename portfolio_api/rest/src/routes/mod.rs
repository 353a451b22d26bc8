use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ApiMessage;

pub mod contact;
pub mod health;

pub fn internal_server_error(err: impl Into<anyhow::Error>) -> Response {
    let err = err.into();
    tracing::error!("internal server error: {err:#}");
    respond(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

fn respond(code: StatusCode, message: &'static str) -> Response {
    (
        code,
        Json(ApiMessage {
            message,
            errors: None,
        }),
    )
        .into_response()
}
