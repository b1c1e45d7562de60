//! Error types for trait analysis
//!
//! Every failure along the analyze path is one `AnalysisError` variant.
//! Variants are grouped by `ErrorKind`, and only the kind decides the HTTP
//! status and the message the caller sees. The variant itself (raw upstream
//! body, raw model output, offending key) only ever reaches the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Result type alias
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Public classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad caller input
    Validation,
    /// Missing secret
    Configuration,
    /// Provider answered with a non-success status
    Upstream,
    /// Provider answer could not be turned into JSON
    Parse,
    /// JSON was parsed but does not carry the required scores
    Schema,
    /// Anything else
    Unclassified,
}

impl ErrorKind {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
            ErrorKind::Configuration
            | ErrorKind::Parse
            | ErrorKind::Schema
            | ErrorKind::Unclassified => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "text is required",
            ErrorKind::Configuration => "API key is not configured",
            ErrorKind::Upstream => "External API error",
            ErrorKind::Parse => "Failed to parse API response",
            ErrorKind::Schema | ErrorKind::Unclassified => "Analysis failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("text is required")]
    MissingText,

    #[error("ANTHROPIC_API_KEY is not set")]
    MissingApiKey,

    #[error("API error: {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("LLM request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid provider response: {0}")]
    MalformedEnvelope(String),

    #[error("Provider response contained no content")]
    EmptyContent,

    #[error("No JSON object found in model output: {raw}")]
    NoJsonObject { raw: String },

    #[error("Model output is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Missing or non-numeric trait score: {0}")]
    MissingTrait(&'static str),
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::MissingText => ErrorKind::Validation,
            AnalysisError::MissingApiKey => ErrorKind::Configuration,
            AnalysisError::Upstream { .. } => ErrorKind::Upstream,
            AnalysisError::Transport(_) => ErrorKind::Unclassified,
            AnalysisError::MalformedEnvelope(_)
            | AnalysisError::EmptyContent
            | AnalysisError::NoJsonObject { .. }
            | AnalysisError::InvalidJson(_) => ErrorKind::Parse,
            AnalysisError::MissingTrait(_) => ErrorKind::Schema,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }
}

/// Body returned for every failed request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub status_message: &'static str,
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = kind.status_code();

        if status.is_client_error() {
            warn!("Analysis rejected ({:?}): {}", kind, self);
        } else {
            error!("Analysis error ({:?}): {}", kind, self);
        }

        let body = ErrorBody {
            status_code: status.as_u16(),
            status_message: kind.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
