pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use notch_core::config::Config;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Largest JSON body accepted, matching what the admin editor may paste.
pub const BODY_LIMIT: usize = 5 * 1024 * 1024;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve_on()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let guarded = Router::new()
        .route("/api/admin/save", post(routes::admin::save))
        .route("/api/admin/order/{order_no}", get(routes::admin::get_order))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_admin,
        ));

    let public_dir = ServeDir::new(&app_state.public_dir);

    Router::new()
        // Public read
        .route("/api/order/{order_no}", get(routes::orders::get_order))
        // Admin session
        .route("/api/admin/login", post(routes::admin::login))
        .route("/api/admin/logout", post(routes::admin::logout))
        .route("/api/admin/session", get(routes::admin::session_status))
        // Admin (guarded)
        .merge(guarded)
        // Pages
        .route("/", get(routes::pages::index))
        .route("/order/{order_no}", get(routes::pages::order))
        .route("/admin", get(routes::pages::admin))
        .fallback_service(public_dir)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Serve on a pre-bound listener.
///
/// Accepting a bound `TcpListener` lets the caller read the actual port
/// first (useful when `port = 0` and the OS picks a free port).
pub async fn serve_on(app_state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(app_state);

    tracing::info!("order service listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Open stores, seed, bind `0.0.0.0:{port}` and serve until the future is dropped.
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let app_state = AppState::from_config(config)?;
    tracing::info!(storage = %app_state.store.location(), "order storage ready");

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(app_state, listener).await
}
