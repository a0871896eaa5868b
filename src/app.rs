use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::{net::TcpListener, sync::broadcast, task::JoinHandle};
use tracing::{error, info, warn};

use dispatch_api::{create_app, routes::AppState};
use dispatch_core::config::AppConfig;
use dispatch_engine::{DispatchHandle, DispatchServiceBuilder};

/// 派发引擎退出的最长等待时间
const ENGINE_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// 主应用程序：派发引擎事件循环加上 HTTP 服务
pub struct Application {
    config: AppConfig,
    metrics: Option<PrometheusHandle>,
}

impl Application {
    /// 创建应用实例，启用指标时安装全局 Prometheus 记录器
    pub fn new(config: AppConfig) -> Result<Self> {
        let metrics = if config.observability.metrics_enabled {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .context("安装Prometheus指标记录器失败")?;
            Some(handle)
        } else {
            None
        };

        Ok(Self::with_metrics(config, metrics))
    }

    pub fn with_metrics(config: AppConfig, metrics: Option<PrometheusHandle>) -> Self {
        Self { config, metrics }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 构建 HTTP 路由
    pub fn router(&self, handle: DispatchHandle) -> Router {
        let mut state = AppState::new(Arc::new(handle));
        if let Some(metrics) = &self.metrics {
            state = state.with_metrics(metrics.clone());
        }
        create_app(
            state,
            &self.config.api,
            &self.config.observability.metrics_endpoint,
        )
    }

    /// 运行直到收到关闭信号
    pub async fn run(&self, shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        info!(
            "启动订单派发系统，订单处理时长: {}ms",
            self.config.engine.processing_time_ms
        );

        let (handle, engine_task) = self.start_engine(&shutdown_rx);
        self.serve(handle, shutdown_rx).await?;
        Self::stop_engine(engine_task).await;

        Ok(())
    }

    /// 启动派发引擎事件循环，关闭信号到达或所有句柄释放后退出
    pub fn start_engine(
        &self,
        shutdown_rx: &broadcast::Receiver<()>,
    ) -> (DispatchHandle, JoinHandle<()>) {
        let (service, handle) = DispatchServiceBuilder::from_config(&self.config.engine).build();
        let mut engine_shutdown = shutdown_rx.resubscribe();
        let engine_task = tokio::spawn(service.run(async move {
            let _ = engine_shutdown.recv().await;
        }));
        (handle, engine_task)
    }

    /// 对外提供服务直到收到关闭信号，期间一直持有引擎句柄
    pub async fn serve(
        &self,
        handle: DispatchHandle,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        if self.config.api.enabled {
            return self.run_api(handle, shutdown_rx).await;
        }

        info!("API服务器已禁用，仅运行派发引擎");
        let _ = shutdown_rx.recv().await;
        drop(handle);
        Ok(())
    }

    async fn stop_engine(engine_task: JoinHandle<()>) {
        match tokio::time::timeout(ENGINE_STOP_TIMEOUT, engine_task).await {
            Ok(Ok(())) => info!("派发引擎已停止"),
            Ok(Err(e)) => error!("派发引擎任务异常退出: {}", e),
            Err(_) => warn!("等待派发引擎停止超时"),
        }
    }

    async fn run_api(
        &self,
        handle: DispatchHandle,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        let app = self.router(handle);

        let listener = TcpListener::bind(&self.config.api.bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {}", self.config.api.bind_address))?;

        info!("API服务器启动在 http://{}", self.config.api.bind_address);
        if self.metrics.is_some() {
            info!(
                "指标端点: http://{}{}",
                self.config.api.bind_address, self.config.observability.metrics_endpoint
            );
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API服务器收到关闭信号");
            })
            .await
            .context("API服务器运行失败")?;

        info!("API服务器已停止");
        Ok(())
    }
}
