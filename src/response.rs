use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core::error::EventError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl AppError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&EventError> for AppError {
    fn from(err: &EventError) -> Self {
        match err {
            EventError::NoActiveQuiz => {
                Self::bad_request("NO_ACTIVE_QUIZ", "нет активной карточки")
            }
            EventError::UnhandledEvent => {
                Self::bad_request("UNHANDLED_EVENT", "событие не распознано")
            }
            EventError::Store(_) => Self::service_unavailable("сервис временно недоступен"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

pub fn json_error(
    status: StatusCode,
    code: impl Into<String>,
    message: impl Into<String>,
) -> AppError {
    AppError::new(status, code, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::StoreError;

    #[test]
    fn event_errors_map_to_protocol_codes() {
        let err = AppError::from(&EventError::NoActiveQuiz);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "NO_ACTIVE_QUIZ");

        let err = AppError::from(&EventError::Store(StoreError::Unavailable(
            sqlx::Error::PoolClosed,
        )));
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
