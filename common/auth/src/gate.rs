use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use tracing::debug;

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::verifier::TokenVerifier;

/// Entry point for protected handlers: extracts the bearer token, verifies
/// it, and enforces the route's required permission, in that order. Every
/// failure short-circuits as a typed [`AuthError`].
#[derive(Clone)]
pub struct AuthGate {
    verifier: TokenVerifier,
}

impl AuthGate {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        required_permission: &str,
    ) -> AuthResult<Claims> {
        let token = bearer_token(headers)?;
        let claims = self.verifier.verify(&token).await?;
        ensure_permission(&claims, required_permission)?;
        debug!(subject = %claims.subject, permission = required_permission, "request authorized");
        Ok(claims)
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`. The value must be
/// exactly two whitespace-separated parts with a bearer scheme.
pub fn bearer_token(headers: &HeaderMap) -> AuthResult<String> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::HeaderMissing)?;
    let raw = value.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let mut parts = raw.split_whitespace();
    let (scheme, token) = match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) => (scheme, token),
        _ => return Err(AuthError::MalformedHeader),
    };
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token.to_owned())
}

/// Exact-match permission check. A token without a permissions claim fails
/// differently from one whose list simply lacks the required entry.
pub fn ensure_permission(claims: &Claims, required: &str) -> AuthResult<()> {
    let Some(permissions) = claims.permissions.as_deref() else {
        return Err(AuthError::PermissionsClaimMissing);
    };

    if permissions.iter().any(|value| value == required) {
        Ok(())
    } else {
        Err(AuthError::PermissionNotFound(required.to_owned()))
    }
}
