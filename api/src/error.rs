use axum::{Json, http::StatusCode, response::IntoResponse};
use eventhub_common::{caller::CallerError, validation::ValidationErrors, views::ApiErrorResponse};
use eventhub_db::storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Invalid {resource} id: {id:?}")]
    InvalidId { resource: &'static str, id: String },

    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("A user with email {email} already exists")]
    DuplicateEmail { email: String },

    #[error("User {user_id} already joined event {event_id}")]
    AlreadyJoined { event_id: String, user_id: String },

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    CallerError(#[from] CallerError),

    #[error(transparent)]
    InternalAnyhow(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn invalid_id(resource: &'static str, id: impl Into<String>) -> Self {
        Self::InvalidId {
            resource,
            id: id.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidId { .. } | Self::InvalidCredentials => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::DuplicateEmail { .. } | Self::AlreadyJoined { .. } => StatusCode::CONFLICT,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::CallerError(ce) => match ce {
                CallerError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
                CallerError::Forbidden { .. } => StatusCode::FORBIDDEN,
            },
            Self::Storage(se) => match se {
                StoreError::DuplicateKey(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InternalAnyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::InvalidId { .. } => "InvalidId",
            Self::NotFound { .. } => "NotFound",
            Self::InvalidCredentials => "InvalidCredentials",
            Self::DuplicateEmail { .. } => "DuplicateEmail",
            Self::AlreadyJoined { .. } => "AlreadyJoined",
            Self::PayloadTooLarge { .. } => "PayloadTooLarge",
            Self::CallerError(CallerError::Unauthorized { .. }) => "Unauthenticated",
            Self::CallerError(CallerError::Forbidden { .. }) => "Forbidden",
            Self::Storage(StoreError::DuplicateKey(_)) => "DuplicateKey",
            Self::Storage(_) | Self::InternalAnyhow(_) => "InternalError",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Validation(_) => "Validation failed".into(),
            Self::InvalidId { .. } => "Invalid ID format".into(),
            Self::NotFound { resource } => format!("{resource} not found"),
            Self::InvalidCredentials => "Invalid credentials".into(),
            Self::DuplicateEmail { .. } => "User already exists".into(),
            Self::AlreadyJoined { .. } => "User already joined this event".into(),
            Self::PayloadTooLarge { limit } => format!("Request body exceeds {limit} bytes"),
            Self::CallerError(CallerError::Unauthorized { .. }) => {
                "Unauthorized: No token provided".into()
            }
            Self::CallerError(CallerError::Forbidden { .. }) => {
                "Forbidden: Invalid or expired token".into()
            }
            Self::Storage(StoreError::DuplicateKey(_)) => "Resource already exists".into(),
            Self::Storage(_) | Self::InternalAnyhow(_) => {
                "Something went wrong on our end. Please try again later.".into()
            }
        }
    }
}

impl From<ApiError> for ApiErrorResponse {
    fn from(err: ApiError) -> Self {
        ApiErrorResponse {
            code: Some(err.code().into()),
            message: err.message(),
            fields: match &err {
                ApiError::Validation(errors) => errors.fields.clone(),
                _ => Vec::new(),
            },

            #[cfg(debug_assertions)]
            details: Some(err.to_string()),

            #[cfg(not(debug_assertions))]
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!("Error returned by handler: {self}");
        } else {
            tracing::warn!(status = status_code.as_u16(), "Request rejected: {self}");
        }

        (status_code, Json(Into::<ApiErrorResponse>::into(self))).into_response()
    }
}
