use axum::{response::IntoResponse, Json};
use http::StatusCode;
use serde::Serialize;
use tracing::{debug, error};

use crate::service::ServiceError;

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Persistence error: {0}")]
    PersistenceError(#[source] filmoteca_dal::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PersistenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {self}");
        } else {
            debug!("Request rejected ({status}): {self}");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<filmoteca_dal::Error> for ApiError {
    fn from(value: filmoteca_dal::Error) -> Self {
        match value {
            filmoteca_dal::Error::RecordNotFound(what) => ApiError::ResourceNotFound(what),
            filmoteca_dal::Error::DatabaseError(sqlx::Error::RowNotFound) => {
                ApiError::ResourceNotFound("Record".to_string())
            }
            other => ApiError::PersistenceError(other),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Validation(report) => ApiError::InvalidRequest(report.to_string()),
            e @ ServiceError::NotFound { .. } => ApiError::ResourceNotFound(e.to_string()),
            e @ ServiceError::UnknownGenres(_) => ApiError::ResourceNotFound(e.to_string()),
            ServiceError::Persistence(e) => e.into(),
        }
    }
}
