//! Response checks shared by every endpoint.

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{AppointmentError, ErrorResponse, Result};

/// Single records may come bare or wrapped as `{ "data": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Payload<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Payload<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Payload::Wrapped { data } | Payload::Bare(data) => data,
        }
    }
}

/// Pass successful responses through; turn everything else into an error.
///
/// 404 becomes [`AppointmentError::NotFound`] naming `what`. Other failures
/// carry whatever message the server put in its body.
pub(crate) async fn check_response(
    resp: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(AppointmentError::NotFound(what.to_string()));
    }
    let body = resp.text().await.unwrap_or_default();
    Err(AppointmentError::Api {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        return parsed.into_message();
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() && !trimmed.starts_with('<') {
        return trimmed.to_string();
    }
    status.canonical_reason().unwrap_or_default().to_string()
}

pub(crate) async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| AppointmentError::Decode(e.to_string()))
}
