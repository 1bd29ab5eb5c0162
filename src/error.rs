use serde::Deserialize;

use crate::id::Id;

/// Error body shapes the remote service is known to answer with.
///
/// `{ "message": "..." }`, `{ "message": ["...", "..."] }` and the
/// `{ "error": { "code": "...", "message": "..." } }` envelope all end up as a
/// single line of text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorResponse {
    Wrapped { error: ErrorObject },
    Flat { message: ErrorMessage },
}

#[derive(Debug, Deserialize)]
pub struct ErrorObject {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorResponse {
    pub fn into_message(self) -> String {
        match self {
            ErrorResponse::Wrapped { error } => match error.code {
                Some(code) => format!("{code}: {}", error.message),
                None => error.message,
            },
            ErrorResponse::Flat { message: ErrorMessage::One(m) } => m,
            ErrorResponse::Flat { message: ErrorMessage::Many(ms) } => ms.join("; "),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    /// Rejected before any request was sent.
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not decode response: {0}")]
    Decode(String),

    /// A record points at a state or consultation type the catalog does not know.
    #[error("{kind} {id} does not exist")]
    DanglingReference { kind: &'static str, id: Id },

    #[error("configuration error: {0}")]
    Config(String),
}

impl AppointmentError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppointmentError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppointmentError::NotFound(_) | AppointmentError::Api { status: 404, .. }
        )
    }

    /// Text suitable for showing to the practitioner.
    pub fn user_message(&self) -> String {
        match self {
            AppointmentError::Validation { message, .. } => message.clone(),
            AppointmentError::NotFound(what) => format!("{what} was not found"),
            AppointmentError::Api { message, .. } if !message.is_empty() => message.clone(),
            AppointmentError::Api { status, .. } => {
                format!("The server rejected the request (status {status})")
            }
            AppointmentError::Http(_) => "Could not reach the appointment service".to_string(),
            AppointmentError::Decode(_) => {
                "The appointment service answered with unexpected data".to_string()
            }
            AppointmentError::DanglingReference { .. } | AppointmentError::Config(_) => {
                self.to_string()
            }
        }
    }
}

pub type Result<T, E = AppointmentError> = std::result::Result<T, E>;
