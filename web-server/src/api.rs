//! HTTP envelope, error mapping and caller identity.
//!
//! Caller identity arrives as an `x-user-id` header set by the upstream
//! auth gateway; this service never trusts client-supplied role claims.

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use mdt_admin::error::{ActionError, AdminError};

/// Response envelope shared by every endpoint.
#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Error half of every handler. Expected rejections keep their message;
/// infrastructure failures are logged here and collapse to a generic
/// message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Authentication required".to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match &err {
            AdminError::Action(action) => Self {
                status: status_for(action),
                message: action.to_string(),
            },
            _ => {
                error!("internal error: {}", err);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: err.user_message(),
                }
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        AdminError::from(err).into()
    }
}

fn status_for(action: &ActionError) -> StatusCode {
    match action {
        ActionError::Unauthorized | ActionError::NotAMember => StatusCode::FORBIDDEN,
        ActionError::ServerNotFound
        | ActionError::RoleNotFound
        | ActionError::DepartmentNotFound
        | ActionError::MemberNotFound
        | ActionError::MemberNotInRole
        | ActionError::CitizenNotFound => StatusCode::NOT_FOUND,
        ActionError::MembersOutsideServer
        | ActionError::LastOwner
        | ActionError::Validation(_) => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiResponse::<()>::failure(self.message));
        (self.status, body).into_response()
    }
}

/// Extract the authenticated user id from the gateway header.
pub fn require_user_id(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .ok_or_else(ApiError::unauthenticated)
}

/// Parse a path id, rejecting with 400 on malformed input.
pub fn parse_id(value: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value).map_err(|_| ApiError::bad_request(format!("Invalid {what} id")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shapes() {
        let ok = serde_json::to_value(ApiResponse::ok(1)).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["data"], 1);

        let failed = serde_json::to_value(ApiResponse::<()>::failure("nope")).unwrap();
        assert_eq!(failed["success"], false);
        assert_eq!(failed["error"], "nope");
    }

    #[test]
    fn test_rejections_keep_status_and_message() {
        let err = ApiError::from(AdminError::from(ActionError::RoleNotFound));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Role not found");
    }

    #[test]
    fn test_infrastructure_errors_collapse() {
        let err = ApiError::from(AdminError::from(sqlx::Error::PoolClosed));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "An unexpected error occurred.");
    }

    #[test]
    fn test_require_user_id() {
        let mut headers = HeaderMap::new();
        assert!(require_user_id(&headers).is_err());

        headers.insert("x-user-id", "not-a-uuid".parse().unwrap());
        assert!(require_user_id(&headers).is_err());

        let id = Uuid::new_v4();
        headers.insert("x-user-id", id.to_string().parse().unwrap());
        assert_eq!(require_user_id(&headers).unwrap(), id);
    }
}
