use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use dispatch_core::models::{Bot, CommandOutcome};

/// 统一响应信封
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// 移除机器人的说明，没有机器人时仍算成功
pub fn removal_message(removed: Option<&Bot>) -> String {
    match removed {
        Some(bot) => match bot.order_id() {
            Some(order_id) => {
                format!("机器人 {} 已移除，订单 {} 回到待处理队列", bot.id(), order_id)
            }
            None => format!("机器人 {} 已移除", bot.id()),
        },
        None => "没有可移除的机器人".to_string(),
    }
}

impl ApiResponse<Option<Bot>> {
    pub fn bot_removed(removed: Option<Bot>) -> Self {
        let message = removal_message(removed.as_ref());
        Self::success_with_message(removed, message)
    }
}

impl ApiResponse<CommandOutcome> {
    /// 命令结果附带一句说明
    pub fn from_outcome(outcome: CommandOutcome) -> Self {
        let message = match &outcome {
            CommandOutcome::OrderSubmitted(order) => {
                format!("{} 订单 {} 已提交", order.priority, order.id)
            }
            CommandOutcome::BotAdded(bot) => format!("机器人 {} 已添加", bot.id()),
            CommandOutcome::BotRemoved(removed) => removal_message(removed.as_ref()),
        };
        Self::success_with_message(outcome, message)
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

pub fn success<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, ApiResponse::success(data))
}

pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::CREATED, ApiResponse::success(data))
}
