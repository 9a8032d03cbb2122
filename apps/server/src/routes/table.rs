//! `/table` routes: the seating engine's HTTP face.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use oaxaca_core::{ClearReport, Table, TableStatusRow, TableView, WaiterAssignment};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/table", get(list_tables))
        .route("/table/view-assigned", get(view_assigned))
        .route("/table/assign", post(assign_customer))
        .route("/table/assign-waiter", post(assign_waiter))
        .route("/table/clear", post(clear_table))
        .route("/table/status", get(status_board))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffQuery {
    pub staff_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub customer_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignResponse {
    pub table_number: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignWaiterResponse {
    #[serde(flatten)]
    pub result: WaiterAssignment,
    pub tables: Vec<TableView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearRequest {
    pub table_number: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub cleared: bool,
    #[serde(flatten)]
    pub report: ClearReport,
}

pub(crate) fn views(tables: Vec<Table>) -> ApiResult<Vec<TableView>> {
    tables
        .into_iter()
        .map(|t| TableView::try_from(t).map_err(ApiError::from))
        .collect()
}

async fn list_tables(State(state): State<AppState>) -> ApiResult<Json<Vec<TableView>>> {
    let tables = state.db.tables().list().await?;
    Ok(Json(views(tables)?))
}

async fn view_assigned(
    State(state): State<AppState>,
    Query(query): Query<StaffQuery>,
) -> ApiResult<Json<Vec<TableView>>> {
    let tables = state.db.tables().assigned_to(query.staff_id).await?;
    Ok(Json(views(tables)?))
}

async fn assign_customer(
    State(state): State<AppState>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Json<AssignResponse>> {
    let table_number = state
        .allocator()
        .assign_customer_to_table(req.customer_id)
        .await?;
    Ok(Json(AssignResponse { table_number }))
}

async fn assign_waiter(State(state): State<AppState>) -> ApiResult<Json<AssignWaiterResponse>> {
    let result = state.allocator().assign_waiter_to_tables().await?;
    debug!(assigned = result.assignments().len(), "Waiter pass finished");

    let tables = views(state.db.tables().list().await?)?;
    Ok(Json(AssignWaiterResponse { result, tables }))
}

async fn clear_table(
    State(state): State<AppState>,
    Json(req): Json<ClearRequest>,
) -> ApiResult<Json<ClearResponse>> {
    let report = state.db.lifecycle().clear_table(req.table_number).await?;
    Ok(Json(ClearResponse {
        cleared: true,
        report,
    }))
}

async fn status_board(State(state): State<AppState>) -> ApiResult<Json<Vec<TableStatusRow>>> {
    Ok(Json(state.db.reports().status_board().await?))
}
