use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::account::models::Role;
use crate::domain::account::models::Username;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

/// Extension type to store the authenticated subject in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    pub username: Username,
    pub role: Role,
}

/// Middleware that validates bearer tokens and adds the subject to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = authenticated_account(&state, req.headers())?;
    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}

/// Resolve the bearer token in `headers` to its subject.
///
/// For handlers whose routes are public but where some requests need a
/// caller.
pub fn authenticated_account(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthenticatedAccount, ApiError> {
    let token = extract_token_from_header(headers)?;

    let subject = state.account_service.verify_token(token).map_err(|e| {
        tracing::warn!(error = %e, "Access token rejected");
        ApiError::from(e)
    })?;

    Ok(AuthenticatedAccount {
        username: subject.username,
        role: subject.role,
    })
}

fn extract_token_from_header(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header"))?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        unauthorized("Invalid Authorization header format. Expected: Bearer <token>")
    })
}

fn unauthorized(message: &str) -> ApiError {
    ApiError::Unauthorized(message.to_string())
}
