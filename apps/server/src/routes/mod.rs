//! # HTTP Routes
//!
//! ```text
//! GET  /health                 store reachable
//! GET  /table                  all tables with derived state
//! GET  /table/view-assigned    ?staffId=
//! POST /table/assign           {customerId}
//! POST /table/assign-waiter
//! POST /table/clear            {tableNumber}
//! GET  /table/status           status board
//! POST /customer               {name, allergies}
//! GET  /staff, POST /staff     {name, staffType}
//! POST /order                  {customerId, items, totalPriceCents}
//! GET  /order/fetch-all
//! POST /order/mark-delivered   {orderId}
//! POST /order/cancel-order     {orderId}
//! POST /payment                {tableNumber, amountCents, cardNumber, ...}
//! GET  /payment/get-info       ?tableNumber=
//! ```

pub mod customer;
pub mod order;
pub mod payment;
pub mod staff;
pub mod table;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(table::router())
        .merge(customer::router())
        .merge(staff::router())
        .merge(order::router())
        .merge(payment::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.db.health_check().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Database unavailable")
    }
}
