//! Authentication middleware for protected routes.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use payroll_core::account::Role;
use payroll_db::AccountRepository;
use payroll_shared::auth::Claims;
use payroll_shared::error::error_body;
use payroll_shared::jwt::JwtError;
use serde_json::Value;
use uuid::Uuid;

use crate::AppState;
use crate::error::{ApiError, ApiResult};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

fn unauthorized(code: &str, msg: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(error_body(code, msg))).into_response()
}

/// Authentication middleware that validates JWT tokens.
///
/// On success the token claims are stored in the request extensions for
/// [`AuthUser`] to pick up.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return unauthorized(
            "MISSING_TOKEN",
            "Authorization header with Bearer token is required",
        );
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(JwtError::Expired) => unauthorized("TOKEN_EXPIRED", "Token has expired"),
        Err(_) => unauthorized("INVALID_TOKEN", "Invalid or malformed token"),
    }
}

/// Blocks accounts that still use the default password.
///
/// Runs after [`auth_middleware`]. Only the account endpoints that let the
/// employee change the password stay reachable.
pub async fn password_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(account_id) = request.extensions().get::<Claims>().map(Claims::account_id) else {
        return unauthorized("UNAUTHORIZED", "Authentication required");
    };

    let repo = AccountRepository::new((*state.db).clone());
    match repo.find_by_id(account_id).await {
        Ok(Some(account)) if !account.is_active => {
            unauthorized("ACCOUNT_DISABLED", "This account is disabled")
        }
        Ok(Some(account)) if account.must_change_password => {
            ApiError::PasswordChangeRequired.into_response()
        }
        Ok(Some(_)) => next.run(request).await,
        Ok(None) => unauthorized("UNAUTHORIZED", "Account no longer exists"),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Extractor for authenticated user claims.
///
/// ```ignore
/// async fn handler(auth: AuthUser) -> impl IntoResponse {
///     let account_id = auth.account_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the account ID from the claims.
    #[must_use]
    pub fn account_id(&self) -> Uuid {
        self.0.account_id()
    }

    /// Returns the role carried by the token, if it is a known one.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.0.role)
    }

    /// Returns true for admin and hr accounts.
    #[must_use]
    pub fn can_manage_payroll(&self) -> bool {
        self.role().is_some_and(|r| r.can_manage_payroll())
    }

    /// Requires an admin or hr account.
    pub fn require_payroll_manager(&self) -> ApiResult<()> {
        if self.can_manage_payroll() {
            Ok(())
        } else {
            Err(ApiError::forbidden("You don't have permission to manage payroll"))
        }
    }

    /// Requires an admin account.
    pub fn require_admin(&self) -> ApiResult<()> {
        if self.role().is_some_and(|r| r.is_admin()) {
            Ok(())
        } else {
            Err(ApiError::forbidden("Administrator access required"))
        }
    }

    /// Returns the inner claims.
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(error_body("UNAUTHORIZED", "Authentication required")),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rstest::rstest;

    fn user(role: &str) -> AuthUser {
        AuthUser(Claims::new(Uuid::new_v4(), role, Utc::now() + Duration::hours(1)))
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[rstest]
    #[case("admin", true, true)]
    #[case("hr", true, false)]
    #[case("user", false, false)]
    #[case("owner", false, false)]
    fn test_role_checks(#[case] role: &str, #[case] payroll: bool, #[case] admin: bool) {
        let auth = user(role);
        assert_eq!(auth.require_payroll_manager().is_ok(), payroll);
        assert_eq!(auth.require_admin().is_ok(), admin);
    }
}
