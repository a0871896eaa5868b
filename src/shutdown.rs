use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

/// 优雅关闭管理器
#[derive(Clone)]
pub struct ShutdownManager {
    /// 关闭信号发送器，关闭后置空
    shutdown_tx: Arc<RwLock<Option<broadcast::Sender<()>>>>,
    is_shutdown: Arc<RwLock<bool>>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(16);

        Self {
            shutdown_tx: Arc::new(RwLock::new(Some(shutdown_tx))),
            is_shutdown: Arc::new(RwLock::new(false)),
        }
    }

    /// 订阅关闭信号
    pub async fn subscribe(&self) -> broadcast::Receiver<()> {
        let shutdown_tx = self.shutdown_tx.read().await;
        if let Some(ref tx) = *shutdown_tx {
            tx.subscribe()
        } else {
            // 已经关闭时返回一个立即触发的接收器
            let (tx, rx) = broadcast::channel(1);
            let _ = tx.send(());
            rx
        }
    }

    /// 触发关闭，重复调用无效
    pub async fn shutdown(&self) {
        let mut is_shutdown = self.is_shutdown.write().await;
        if *is_shutdown {
            debug!("关闭管理器已经触发过关闭");
            return;
        }
        *is_shutdown = true;

        let mut shutdown_tx = self.shutdown_tx.write().await;
        if let Some(tx) = shutdown_tx.take() {
            debug!("发送关闭信号给 {} 个订阅者", tx.receiver_count());
            let _ = tx.send(());
        }

        info!("关闭信号已发送");
    }

    pub async fn is_shutdown(&self) -> bool {
        *self.is_shutdown.read().await
    }

    /// 等待组件在限定时间内退出，超时返回 false
    pub async fn wait_with_timeout<F>(&self, component: F, limit: Duration) -> bool
    where
        F: Future,
    {
        match tokio::time::timeout(limit, component).await {
            Ok(_) => true,
            Err(_) => {
                warn!("等待组件关闭超时 ({:?})", limit);
                false
            }
        }
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}
