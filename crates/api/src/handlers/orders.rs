use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::debug;

use dispatch_core::models::{OrderId, OrderPriority};

use crate::{
    error::{ApiError, ApiResult},
    response::{created, success},
    routes::AppState,
};

/// 订单提交请求
#[derive(Debug, Deserialize)]
pub struct SubmitOrderRequest {
    pub priority: OrderPriority,
}

/// 获取订单快照
pub async fn list_orders(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let orders = state.dispatch.orders_snapshot().await?;
    Ok(success(orders))
}

/// 提交订单
pub async fn submit_order(
    State(state): State<AppState>,
    payload: Result<Json<SubmitOrderRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    debug!("提交 {} 订单", request.priority);

    let order = state.dispatch.submit_order(request.priority).await?;
    Ok(created(order))
}

/// 按ID获取订单
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> ApiResult<impl IntoResponse> {
    let order = state
        .dispatch
        .get_order(id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(success(order))
}

/// 获取派发统计
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let stats = state.dispatch.stats().await?;
    Ok(success(stats))
}
