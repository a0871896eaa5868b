use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;

use dispatch_core::traits::OrderDispatchService;

use crate::handlers::{
    bots::{add_bot, list_bots, remove_bot},
    commands::execute_command,
    events::stream_events,
    health::health_check,
    metrics::render_metrics,
    orders::{get_order, get_stats, list_orders, submit_order},
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub dispatch: Arc<dyn OrderDispatchService>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(dispatch: Arc<dyn OrderDispatchService>) -> Self {
        Self {
            dispatch,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// 创建API路由，设置了指标句柄时挂载 `metrics_endpoint`
pub fn create_routes(state: AppState, metrics_endpoint: &str) -> Router {
    let mut router = Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 订单
        .route("/api/orders", get(list_orders).post(submit_order))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/stats", get(get_stats))
        // 机器人
        .route("/api/bots", get(list_bots).post(add_bot).delete(remove_bot))
        // 命令与事件流
        .route("/api/commands", post(execute_command))
        .route("/api/events", get(stream_events));

    if state.metrics.is_some() {
        router = router.route(metrics_endpoint, get(render_metrics));
    }

    router.with_state(state)
}
