use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::account::errors::AccountError;

pub mod authenticate;
pub mod change_login;
pub mod provision_account;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    Validation(Vec<String>),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, missing_fields) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg, None),
            ApiError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Missing required fields: {}", fields.join(", ")),
                Some(fields),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
        };

        (
            status,
            Json(ApiResponseBody::new_error(status, message, missing_fields)),
        )
            .into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation { missing_fields } => ApiError::Validation(missing_fields),
            AccountError::InvalidAccountId(_)
            | AccountError::InvalidUsername(_)
            | AccountError::InvalidRole(_) => ApiError::UnprocessableEntity(err.to_string()),
            AccountError::InvalidCredentials
            | AccountError::TokenInvalid
            | AccountError::TokenExpired => ApiError::Unauthorized(err.to_string()),
            AccountError::AccountMismatch { .. } | AccountError::AccountInactive(_) => {
                ApiError::Forbidden(err.to_string())
            }
            AccountError::NotFound(_) => ApiError::NotFound(err.to_string()),
            AccountError::UsernameAlreadyExists(_) | AccountError::Conflict(_) => {
                ApiError::Conflict(err.to_string())
            }
            AccountError::Credential(_) | AccountError::DatabaseError(_) => {
                tracing::error!(error = %err, "Account operation failed");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(
        status_code: StatusCode,
        message: String,
        missing_fields: Option<Vec<String>>,
    ) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData {
                message,
                missing_fields,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_fields: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_failures_share_one_response() {
        let wrong_password = ApiError::from(AccountError::InvalidCredentials);
        assert_eq!(
            wrong_password,
            ApiError::Unauthorized("Invalid credentials".to_string())
        );
    }

    #[test]
    fn test_internal_errors_are_not_echoed() {
        let err = ApiError::from(AccountError::DatabaseError(
            "connection refused to 10.0.0.5".to_string(),
        ));
        assert_eq!(
            err,
            ApiError::InternalServerError("Internal server error".to_string())
        );
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                AccountError::Validation {
                    missing_fields: vec!["password".to_string()],
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AccountError::TokenExpired, StatusCode::UNAUTHORIZED),
            (
                AccountError::AccountMismatch {
                    account_id: "id".to_string(),
                    username: "someone".to_string(),
                },
                StatusCode::FORBIDDEN,
            ),
            (AccountError::NotFound("id".to_string()), StatusCode::NOT_FOUND),
            (AccountError::Conflict("id".to_string()), StatusCode::CONFLICT),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }
}
