use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Terminal authorization failures. None of these are retried; each maps to
/// a stable status code and machine-readable code string at the HTTP
/// boundary. Internal detail (the unnamed payloads) is kept for logging and
/// never rendered into the response description.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header is expected")]
    HeaderMissing,
    #[error("authorization header must be of the form 'Bearer <token>'")]
    MalformedHeader,
    #[error("unable to parse authentication token")]
    MalformedToken(String),
    #[error("unable to find a signing key that matches the token")]
    KeyNotFound(String),
    #[error("signing keys could not be retrieved")]
    KeySetUnavailable(String),
    #[error("token signature could not be verified")]
    InvalidSignature,
    #[error("token is expired")]
    TokenExpired,
    #[error("incorrect claims, check the audience and issuer")]
    InvalidClaims(String),
    #[error("permissions not included in the token")]
    PermissionsClaimMissing,
    #[error("permission '{0}' not found")]
    PermissionNotFound(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::PermissionsClaimMissing | AuthError::PermissionNotFound(_) => {
                StatusCode::FORBIDDEN
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::HeaderMissing
            | AuthError::MalformedHeader
            | AuthError::MalformedToken(_)
            | AuthError::KeyNotFound(_)
            | AuthError::KeySetUnavailable(_)
            | AuthError::InvalidSignature => "invalid_header",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims(_) => "invalid_claims",
            AuthError::PermissionsClaimMissing | AuthError::PermissionNotFound(_) => "unauthorized",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: u16,
    code: &'static str,
    description: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            success: false,
            error: status.as_u16(),
            code: self.code(),
            description: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: AuthError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn missing_header_renders_401_invalid_header() {
        let err = AuthError::HeaderMissing;
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        let body = body_json(err).await;
        assert_eq!(body["success"], serde_json::json!(false));
        assert_eq!(body["error"], serde_json::json!(401));
        assert_eq!(body["code"], serde_json::json!("invalid_header"));
        assert_eq!(
            body["description"],
            serde_json::json!("authorization header is expected")
        );
    }

    #[tokio::test]
    async fn missing_permission_renders_403_unauthorized() {
        let err = AuthError::PermissionNotFound("delete:animals".into());
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        let body = body_json(err).await;
        assert_eq!(body["error"], serde_json::json!(403));
        assert_eq!(body["code"], serde_json::json!("unauthorized"));
    }

    #[test]
    fn internal_detail_stays_out_of_the_description() {
        let err = AuthError::KeySetUnavailable("connection refused to 10.0.0.1".into());
        assert_eq!(err.to_string(), "signing keys could not be retrieved");
        assert_eq!(err.code(), "invalid_header");
    }

    #[test]
    fn expired_and_claims_codes_are_distinct() {
        assert_eq!(AuthError::TokenExpired.code(), "token_expired");
        assert_eq!(
            AuthError::InvalidClaims("aud mismatch".into()).code(),
            "invalid_claims"
        );
    }
}
