//! `/staff`: roster read and registration.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use oaxaca_core::{StaffMember, StaffType};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/staff", get(list_staff).post(add_staff))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStaffRequest {
    pub name: String,
    pub staff_type: StaffType,
}

async fn list_staff(State(state): State<AppState>) -> ApiResult<Json<Vec<StaffMember>>> {
    Ok(Json(state.db.staff().list().await?))
}

async fn add_staff(
    State(state): State<AppState>,
    Json(req): Json<AddStaffRequest>,
) -> ApiResult<Json<StaffMember>> {
    Ok(Json(state.db.staff().add(&req.name, req.staff_type).await?))
}
