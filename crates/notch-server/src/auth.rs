use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use notch_core::session::AdminState;
use std::time::Duration;

use crate::error::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "notch_session";

/// Admin session guard for mutation and admin-read routes.
///
/// Evaluated in order:
/// 1. No `notch_session` cookie, or a cookie whose signature does not match
///    the session secret → 401
/// 2. Token unknown or expired in the session store → 401
/// 3. Otherwise the request proceeds
///
/// A rejected request never reaches the handler, so it has no side effect.
pub async fn require_admin(State(app): State<AppState>, req: Request, next: Next) -> Response {
    let state = admin_state(&app, req.headers()).await;
    match state {
        Ok(AdminState::Authenticated { .. }) => next.run(req).await,
        Ok(AdminState::Anonymous) => AppError::unauthorized().into_response(),
        Err(e) => e.into_response(),
    }
}

/// Resolve the caller's admin state from the request cookies.
pub async fn admin_state(app: &AppState, headers: &HeaderMap) -> Result<AdminState, AppError> {
    let Some(token) = session_token(app, headers) else {
        return Ok(AdminState::Anonymous);
    };
    let sessions = app.sessions.clone();
    let state = tokio::task::spawn_blocking(move || sessions.admin_state(Some(&token)))
        .await
        .map_err(AppError::join)??;
    Ok(state)
}

/// The verified session token carried by the request, if any.
pub fn session_token(app: &AppState, headers: &HeaderMap) -> Option<String> {
    let value = cookie_value(headers, SESSION_COOKIE)?;
    app.signer.verify(value).map(str::to_string)
}

// ---------------------------------------------------------------------------
// Cookie helpers
// ---------------------------------------------------------------------------

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|part| {
            let (key, value) = part.trim().split_once('=')?;
            (key == name).then_some(value)
        })
}

/// `Set-Cookie` value starting a session.
pub fn session_cookie(signed: &str, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={signed}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        ttl.as_secs()
    )
}

/// `Set-Cookie` value that makes the browser drop the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
