use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use notch_core::order::{Order, Step};
use notch_core::parse::parse_steps;
use notch_core::store::save_order;
use serde_json::Value;

use crate::auth::{admin_state, clear_session_cookie, session_cookie, session_token};
use crate::error::AppError;
use crate::routes::orders::load_order;
use crate::state::AppState;

const MISSING_DATA: &str = "missing data: orderNo and dataText are required";

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub password: Value,
}

/// The submitted password, or `""` when the body is unreadable or the field
/// is not a string. An empty candidate never matches.
fn login_password(body: &Result<Json<LoginBody>, JsonRejection>) -> &str {
    match body {
        Ok(Json(LoginBody { password })) => password.as_str().unwrap_or(""),
        Err(_) => "",
    }
}

/// POST /api/admin/login: start an admin session on a password match.
///
/// A failed attempt also ends any session the caller already held.
pub async fn login(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let previous = session_token(&app, &headers);
    let sessions = app.sessions.clone();

    if !app.credentials.verify(login_password(&body)) {
        tracing::warn!("admin login rejected");
        tokio::task::spawn_blocking(move || match previous {
            Some(token) => sessions.remove(&token),
            None => Ok(()),
        })
        .await
        .map_err(AppError::join)??;
        return Ok((
            StatusCode::UNAUTHORIZED,
            [(header::SET_COOKIE, clear_session_cookie())],
            Json(serde_json::json!({ "ok": false, "error": "wrong password" })),
        )
            .into_response());
    }

    let ttl = app.session_ttl;
    let session = tokio::task::spawn_blocking(move || {
        if let Some(token) = previous {
            sessions.remove(&token)?;
        }
        sessions.create(ttl)
    })
    .await
    .map_err(AppError::join)??;

    tracing::info!(expires_at = %session.expires_at, "admin logged in");
    let cookie = session_cookie(&app.signer.sign(&session.token), ttl);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({ "ok": true })),
    )
        .into_response())
}

/// POST /api/admin/logout: end the caller's session, if any.
pub async fn logout(State(app): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    if let Some(token) = session_token(&app, &headers) {
        let sessions = app.sessions.clone();
        tokio::task::spawn_blocking(move || sessions.remove(&token))
            .await
            .map_err(AppError::join)??;
        tracing::info!("admin logged out");
    }
    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(serde_json::json!({ "ok": true })),
    )
        .into_response())
}

/// GET /api/admin/session: whether the caller holds an admin session.
pub async fn session_status(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let state = admin_state(&app, &headers).await?;
    Ok(Json(serde_json::json!({
        "ok": true,
        "isAdmin": state.is_admin(),
    })))
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBody {
    #[serde(default)]
    pub order_no: Option<Value>,
    #[serde(default)]
    pub data_text: Option<String>,
    #[serde(default)]
    pub steps: Option<Vec<Step>>,
}

/// Order numbers arrive as strings, but a numeric JSON value is accepted too.
fn order_no_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// POST /api/admin/save: replace an order's steps.
///
/// Steps come from `dataText` (one `step - notch` pair per line) or, when
/// that is absent, from a structured `steps` array.
pub async fn save(
    State(app): State<AppState>,
    body: Result<Json<SaveBody>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(body) = body.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let order_no = order_no_text(body.order_no.as_ref())
        .ok_or_else(|| AppError::bad_request(MISSING_DATA))?;
    let text = body.data_text.filter(|t| !t.is_empty());
    if text.is_none() && body.steps.is_none() {
        return Err(AppError::bad_request(MISSING_DATA));
    }

    let store = app.store.clone();
    let (order, placement) = tokio::task::spawn_blocking(move || {
        let steps = match (text, body.steps) {
            (Some(text), _) => parse_steps(&text)?,
            (None, Some(steps)) => steps,
            (None, None) => Vec::new(),
        };
        save_order(store.as_ref(), &order_no, steps)
    })
    .await
    .map_err(AppError::join)??;

    tracing::info!(
        order_no = %order.order_no,
        total = order.total,
        at = %placement.describe(),
        "order saved"
    );
    Ok(Json(serde_json::json!({
        "ok": true,
        "total": order.total,
        "where": placement.describe(),
    })))
}

/// GET /api/admin/order/{order_no}: admin read, same shape as the public one.
pub async fn get_order(
    State(app): State<AppState>,
    Path(order_no): Path<String>,
) -> Result<Json<Order>, AppError> {
    load_order(&app, order_no).await
}
