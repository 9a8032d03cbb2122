//! `/payment` routes. Card numbers are accepted but only the last four
//! digits are stored or returned.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use oaxaca_core::{NewPayment, Payment};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payment", post(record_payment))
        .route("/payment/get-info", get(payment_info))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableQuery {
    pub table_number: i64,
}

async fn record_payment(
    State(state): State<AppState>,
    Json(payment): Json<NewPayment>,
) -> ApiResult<Json<Payment>> {
    Ok(Json(state.db.payments().record(&payment).await?))
}

async fn payment_info(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(state.db.payments().list_for_table(query.table_number).await?))
}
