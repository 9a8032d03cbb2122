//! `/order` routes.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use oaxaca_core::{Order, OrderItem};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/order", post(place_order))
        .route("/order/fetch-all", get(fetch_all))
        .route("/order/mark-delivered", post(mark_delivered))
        .route("/order/cancel-order", post(cancel_order))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub customer_id: i64,
    pub items: Vec<OrderItem>,
    pub total_price_cents: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderIdRequest {
    pub order_id: i64,
}

async fn place_order(
    State(state): State<AppState>,
    Json(req): Json<PlaceOrderRequest>,
) -> ApiResult<Json<Order>> {
    let order = state
        .db
        .orders()
        .place(req.customer_id, &req.items, req.total_price_cents)
        .await?;
    Ok(Json(order))
}

async fn fetch_all(State(state): State<AppState>) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.db.orders().list_all().await?))
}

async fn mark_delivered(
    State(state): State<AppState>,
    Json(req): Json<OrderIdRequest>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.db.orders().mark_delivered(req.order_id).await?))
}

async fn cancel_order(
    State(state): State<AppState>,
    Json(req): Json<OrderIdRequest>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.db.orders().cancel(req.order_id).await?))
}
