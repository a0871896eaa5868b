use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use dispatch_core::models::DispatchCommand;

use crate::{error::ApiResult, response::ApiResponse, routes::AppState};

/// 命令请求
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: DispatchCommand,
}

/// 执行命令
pub async fn execute_command(
    State(state): State<AppState>,
    payload: Result<Json<CommandRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    info!("执行命令: {}", request.command);

    let outcome = state.dispatch.execute(request.command).await?;
    Ok(ApiResponse::from_outcome(outcome))
}
