//! Order placement, tracking and status endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{Order, OrderId, PlaceOrderRequest, UpdateStatusRequest, ValidationErrors};
use domain::OrderError;
use store::Store;

use super::{ApiResponse, AppState, parse_id};
use crate::error::ApiError;

fn parse_order_id(raw: &str) -> Result<OrderId, ApiError> {
    parse_id(raw, "order")
}

/// Unwraps a JSON body, turning syntax and content-type failures into a
/// field error keyed `body`.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ValidationErrors::single("body", rejection.body_text()).into())
}

/// POST /api/orders — validate a checkout and place the order.
#[tracing::instrument(skip(state, body))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), ApiError> {
    let request = json_body(body)?.validate()?;
    let order = state.order_service.place_order(request).await?;

    tracing::info!(order_id = %order.id, total = %order.total_amount, "order created");
    Ok((StatusCode::CREATED, ApiResponse::ok(order)))
}

/// GET /api/orders — all orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<ApiResponse<Vec<Order>>>, ApiError> {
    let orders = state.order_service.list_orders().await?;
    Ok(ApiResponse::ok(orders))
}

/// GET /api/orders/{id} — a single order with its lines.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state
        .order_service
        .get_order(order_id)
        .await?
        .ok_or_else(|| ApiError::Domain(OrderError::NotFound(order_id).into()))?;
    Ok(ApiResponse::ok(order))
}

/// PATCH /api/orders/{id}/status — move an order to an explicit status.
#[tracing::instrument(skip(state, body))]
pub async fn update_status<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let target = json_body(body)?.validate()?;
    let order = state.order_service.update_status(order_id, target).await?;

    tracing::info!(%order_id, status = %order.status, "order status updated");
    Ok(ApiResponse::ok(order))
}

/// POST /api/orders/{id}/simulate — advance an order one step.
///
/// Delivered orders come back unchanged.
#[tracing::instrument(skip(state))]
pub async fn simulate<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.order_service.advance(order_id).await?;
    Ok(ApiResponse::ok(order))
}
