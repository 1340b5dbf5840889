use axum::extract::{Path, State};
use axum::Json;
use notch_core::order::Order;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/order/{order_no}: public read of one order.
pub async fn get_order(
    State(app): State<AppState>,
    Path(order_no): Path<String>,
) -> Result<Json<Order>, AppError> {
    load_order(&app, order_no).await
}

/// Shared by the public and admin read routes.
pub(crate) async fn load_order(app: &AppState, order_no: String) -> Result<Json<Order>, AppError> {
    let store = app.store.clone();
    let order = tokio::task::spawn_blocking(move || store.get(&order_no))
        .await
        .map_err(AppError::join)??;
    Ok(Json(order))
}
