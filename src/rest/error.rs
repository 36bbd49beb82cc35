use actix_web::{
    error::QueryPayloadError, http::StatusCode, web::Json, HttpRequest, HttpResponse,
    ResponseError,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

pub type RestResult<T, E = RestApiError> = std::result::Result<Json<T>, E>;

#[derive(Debug)]
pub struct RestApiError {
    pub code: RestApiErrorCode,
    pub message: String,
}

impl RestApiError {
    pub fn new(code: RestApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RestApiErrorCode::NotFound, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(RestApiErrorCode::InvalidInput, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(RestApiErrorCode::Internal, message)
    }
}

#[derive(Debug, PartialEq)]
pub enum RestApiErrorCode {
    NotFound,
    InvalidInput,
    Internal,
}

impl fmt::Display for RestApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl fmt::Display for RestApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestApiErrorCode::NotFound => write!(f, "not_found"),
            RestApiErrorCode::InvalidInput => write!(f, "invalid_input"),
            RestApiErrorCode::Internal => write!(f, "internal"),
        }
    }
}

impl RestApiErrorCode {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body, as seen by API clients.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct RestApiErrorBody {
    pub code: String,
    pub message: String,
}

impl ResponseError for RestApiError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(RestApiErrorBody {
            code: self.code.to_string(),
            message: self.message.clone(),
        })
    }

    fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }
}

pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    warn!(path = req.path(), query = req.query_string(), %err, "Rejected query string");
    RestApiError::invalid_input(format!("Invalid arguments: {err}")).into()
}
