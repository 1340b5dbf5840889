use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use notch_core::paths::{page_path, ADMIN_HTML, INDEX_HTML, ORDER_HTML};

use crate::state::AppState;

/// GET /: order lookup page.
pub async fn index(State(app): State<AppState>) -> Response {
    serve_page(&app, INDEX_HTML).await
}

/// GET /order/{order_no}: order view page; the page fetches the order itself.
pub async fn order(State(app): State<AppState>) -> Response {
    serve_page(&app, ORDER_HTML).await
}

/// GET /admin: admin editor page.
pub async fn admin(State(app): State<AppState>) -> Response {
    serve_page(&app, ADMIN_HTML).await
}

async fn serve_page(app: &AppState, page: &str) -> Response {
    let path = page_path(&app.public_dir, page);
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => Html(content).into_response(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "page not available");
            (StatusCode::NOT_FOUND, "page not found").into_response()
        }
    }
}
