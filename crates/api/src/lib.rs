//! # Dispatch API
//!
//! 订单派发系统的 HTTP 接口，只通过 [`OrderDispatchService`] 与派发引擎交互。
//!
//! ## API 端点
//!
//! - `GET /health` - 健康检查
//! - `GET /api/orders` - 订单快照
//! - `POST /api/orders` - 提交订单，请求体 `{"priority": "VIP" | "Normal"}`
//! - `GET /api/orders/{id}` - 查询单个订单
//! - `GET /api/stats` - 派发统计
//! - `GET /api/bots` - 机器人快照
//! - `POST /api/bots` - 添加机器人
//! - `DELETE /api/bots` - 移除最后添加的机器人
//! - `POST /api/commands` - 执行命令，请求体 `{"command": "SubmitVIPOrder"}`
//! - `GET /api/events` - SSE 快照流，首个事件为当前订单快照
//!
//! ## 响应格式
//!
//! ```json
//! {
//!   "success": true,
//!   "data": { "pending": [], "processing": [], "completed": [] },
//!   "message": null,
//!   "timestamp": "2024-01-01T00:00:00Z"
//! }
//! ```
//!
//! 请求体缺失或格式错误时返回 400，请求不会进入派发引擎。
//!
//! [`OrderDispatchService`]: dispatch_core::traits::OrderDispatchService

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use axum::Router;
use tower::ServiceBuilder;

use dispatch_core::config::ApiConfig;
use middleware::{cors_layer, request_logging, timeout_layer, trace_layer};
use routes::{create_routes, AppState};

/// 创建完整的API应用
pub fn create_app(state: AppState, api_config: &ApiConfig, metrics_endpoint: &str) -> Router {
    let router = create_routes(state, metrics_endpoint).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(timeout_layer(api_config.request_timeout_seconds))
            .layer(axum::middleware::from_fn(request_logging)),
    );

    if api_config.cors_enabled {
        router.layer(cors_layer())
    } else {
        router
    }
}
