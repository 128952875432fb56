// src/error.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::error;
use mongodb::bson;
use serde_json::json;
use thiserror::Error;

/// Failures raised by a `CollectionStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mongodb error: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("bson serialization error: {0}")]
    Serialize(#[from] bson::ser::Error),

    /// A stored document could not be read back as an issue.
    #[error("bson deserialization error: {0}")]
    Deserialize(#[from] bson::de::Error),

    #[error("store did not return an ObjectId for the inserted document")]
    MissingInsertedId,
}

/// Everything an issue handler can fail with.
///
/// Each variant renders as `{"error": "<message>"}`; the identifier-bearing
/// variants echo the `_id` the caller sent.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input, caught before any store call.
    #[error("{0}")]
    Validation(&'static str),

    #[error("issue not found")]
    NotFound { id: String },

    /// The issue existed but the store modified zero documents.
    #[error("could not update")]
    UpdateFailed { id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn not_found(id: impl Into<String>) -> Self {
        ApiError::NotFound { id: id.into() }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::UpdateFailed { .. } | ApiError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::NotFound { id } | ApiError::UpdateFailed { id } => {
                json!({ "error": self.to_string(), "_id": id })
            }
            ApiError::Store(e) => {
                // Driver details stay in the log.
                error!("Store failure: {}", e);
                json!({ "error": "internal store error" })
            }
            ApiError::Validation(msg) => json!({ "error": msg }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
