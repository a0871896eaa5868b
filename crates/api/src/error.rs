use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dispatch_errors::DispatchError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("派发错误: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("未找到资源")]
    NotFound,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type, suggestions) = match &self {
            ApiError::Dispatch(DispatchError::InvalidCommand(msg)) => (
                StatusCode::BAD_REQUEST,
                format!("无效的命令: {}", msg),
                "INVALID_COMMAND",
                vec![
                    "可用命令: SubmitNormalOrder, SubmitVIPOrder, AddBot, RemoveBot".to_string(),
                ],
            ),
            ApiError::Dispatch(DispatchError::EngineUnavailable) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "派发引擎不可用".to_string(),
                "ENGINE_UNAVAILABLE",
                vec![
                    "服务可能正在关闭，请稍后重试".to_string(),
                    "查看 GET /health 检查系统状态".to_string(),
                ],
            ),
            ApiError::Dispatch(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.user_message().to_string(),
                "DISPATCH_ERROR",
                vec!["如果问题持续存在，请联系系统管理员".to_string()],
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数错误: {}", msg),
                "BAD_REQUEST",
                vec![
                    "请检查请求格式和参数".to_string(),
                    "确保Content-Type为application/json".to_string(),
                ],
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "请求的资源不存在".to_string(),
                "NOT_FOUND",
                vec!["使用 GET /api/orders 查看所有订单".to_string()],
            ),
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16(),
                "suggestions": suggestions,
            },
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_conversion() {
        let api_error: ApiError = DispatchError::EngineUnavailable.into();
        assert!(matches!(
            api_error,
            ApiError::Dispatch(DispatchError::EngineUnavailable)
        ));
    }

    #[test]
    fn test_into_response_status_codes() {
        let cases = vec![
            (
                ApiError::Dispatch(DispatchError::invalid_command("Foo")),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Dispatch(DispatchError::EngineUnavailable),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::Dispatch(DispatchError::stale_completion(1)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::BadRequest("missing body".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::NotFound, StatusCode::NOT_FOUND),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(ApiError::NotFound.to_string(), "未找到资源");
        assert_eq!(
            ApiError::BadRequest("x".to_string()).to_string(),
            "请求参数错误: x"
        );
    }
}
