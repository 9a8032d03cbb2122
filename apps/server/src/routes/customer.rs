//! `/customer`: registration followed by seating.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/customer", post(register))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    #[serde(default)]
    pub allergies: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub customer_id: i64,
    pub table_number: i64,
}

/// The customer record stays even when seating fails. The error body then
/// carries `customerId` for a later `POST /table/assign`.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    let customer = state
        .db
        .customers()
        .register(&req.name, req.allergies.as_deref())
        .await?;

    let table_number = state
        .allocator()
        .assign_customer_to_table(customer.customer_id)
        .await
        .map_err(|e| {
            warn!(customer_id = customer.customer_id, error = %e, "Registered but not seated");
            ApiError::from(e).with_customer_id(customer.customer_id)
        })?;

    info!(customer_id = customer.customer_id, table_number, "Customer arrived");
    Ok(Json(RegisterResponse {
        customer_id: customer.customer_id,
        table_number,
    }))
}
