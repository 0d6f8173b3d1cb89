//! Send handler

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use domain::{SendOutcome, SendRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::ApiError, state::AppState};

/// Successful send response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    pub ok: bool,
    pub sent: SendOutcome,
}

/// Relay a text message or a PDF with caption
///
/// A body that is not valid JSON is treated as an empty request. A body
/// that could not be read at all (e.g. over the size limit) keeps axum's
/// rejection.
pub async fn send_message(
    State(state): State<AppState>,
    body: Result<Json<SendRequest>, JsonRejection>,
) -> Result<Json<SendResponse>, Response> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(
            rejection @ (JsonRejection::JsonSyntaxError(_)
            | JsonRejection::JsonDataError(_)
            | JsonRejection::MissingJsonContentType(_)),
        ) => {
            debug!(error = %rejection, "Unparseable send body, treating as empty");
            SendRequest::default()
        },
        Err(rejection) => {
            debug!(error = %rejection, status = %rejection.status(), "Send body rejected");
            return Err(rejection.into_response());
        },
    };

    let sent = state
        .relay_service
        .send(&request)
        .await
        .map_err(|e| ApiError::from(e).into_response())?;

    Ok(Json(SendResponse { ok: true, sent }))
}
