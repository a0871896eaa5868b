use axum::{extract::State, response::IntoResponse};

use crate::{
    error::ApiResult,
    response::{created, success, ApiResponse},
    routes::AppState,
};

/// 获取机器人快照
pub async fn list_bots(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let bots = state.dispatch.bots_snapshot().await?;
    Ok(success(bots))
}

/// 添加机器人
pub async fn add_bot(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let bot = state.dispatch.add_bot().await?;
    Ok(created(bot))
}

/// 移除最后添加的机器人
pub async fn remove_bot(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let removed = state.dispatch.remove_bot().await?;
    Ok(ApiResponse::bot_removed(removed))
}
