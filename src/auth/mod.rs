//! Identity extraction and authorization gates.
//!
//! Authentication itself lives upstream: the identity-aware proxy in front
//! of this service verifies the session and forwards the result as headers.
//! This module only turns those headers into request extensions and applies
//! the configured authorization predicates.

use crate::error::AppError;
use crate::server::Server;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderName, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::{trace, warn};

/// Headers the upstream identity proxy sets on every authenticated request.
static X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");
static X_USER_EMAIL_VERIFIED: HeaderName = HeaderName::from_static("x-user-email-verified");

/// The verified identity forwarded by the upstream proxy.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email_verified: bool,
}

/// Require a forwarded identity and stash it in request extensions for
/// downstream handlers.
pub async fn identity_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    let user_id = request
        .headers()
        .get(&X_USER_ID)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing user identity".to_string()))?
        .to_string();

    let email_verified = request
        .headers()
        .get(&X_USER_EMAIL_VERIFIED)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    trace!(user_id = %user_id, "identity accepted from upstream proxy");

    request.extensions_mut().insert(AuthenticatedUser {
        user_id,
        email_verified,
    });

    Ok(next.run(request).await)
}

/// Admin middleware that checks the authenticated user against the
/// configured allow-list. Must run after [`identity_middleware`].
pub async fn admin_middleware(
    State(server): State<Server>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("Missing user identity".to_string()))?;

    if !server.config.is_admin(&user.user_id) {
        warn!(user_id = %user.user_id, "admin access denied");
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    trace!(user_id = %user.user_id, "admin access granted");

    Ok(next.run(request).await)
}

/// Shared-secret gate for the externally triggered reset endpoints. The
/// trigger sends `Authorization: Bearer <secret>`; anything else is a 401.
/// An unset secret fails closed.
pub async fn cron_auth_middleware(
    State(server): State<Server>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let secret = server.config.cron.secret.as_str();
    if secret.is_empty() {
        warn!("cron secret not configured, rejecting reset trigger");
        return Err(AppError::Unauthorized(
            "Cron trigger is not configured".to_string(),
        ));
    }

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing cron secret".to_string()))?;

    if token != secret {
        warn!("cron trigger presented an invalid secret");
        return Err(AppError::Unauthorized("Invalid cron secret".to_string()));
    }

    Ok(next.run(request).await)
}

/// Custom extractor for the forwarded identity.
/// Use this in route handlers that need the authenticated user.
pub struct UserExtractor(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for UserExtractor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(UserExtractor)
            .ok_or_else(|| AppError::Unauthorized("Missing user identity".to_string()))
    }
}
