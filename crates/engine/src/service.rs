use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use dispatch_core::{
    config::EngineConfig,
    models::{Bot, BotsSnapshot, DispatchStats, Order, OrderId, OrderPriority, OrdersSnapshot},
    traits::{NotificationPort, OrderDispatchService, Subscription},
    DispatchError, DispatchResult,
};

use crate::{
    completion_scheduler::CompletionDue,
    engine::DispatchEngine,
    notifier::{BroadcastNotifier, CompositeNotifier, TracingNotifier},
};

/// 进入事件循环的请求，每个请求带一个应答通道
pub enum DispatchRequest {
    SubmitOrder {
        priority: OrderPriority,
        reply: oneshot::Sender<Order>,
    },
    AddBot {
        reply: oneshot::Sender<Bot>,
    },
    RemoveBot {
        reply: oneshot::Sender<Option<Bot>>,
    },
    OrdersSnapshot {
        reply: oneshot::Sender<OrdersSnapshot>,
    },
    BotsSnapshot {
        reply: oneshot::Sender<BotsSnapshot>,
    },
    GetOrder {
        order_id: OrderId,
        reply: oneshot::Sender<Option<Order>>,
    },
    Stats {
        reply: oneshot::Sender<DispatchStats>,
    },
    Subscribe {
        reply: oneshot::Sender<Subscription>,
    },
}

/// 派发服务构建器
pub struct DispatchServiceBuilder {
    processing_time: Duration,
    command_buffer: usize,
    snapshot_buffer: usize,
    notifiers: Vec<Arc<dyn NotificationPort>>,
}

impl DispatchServiceBuilder {
    pub fn new() -> Self {
        Self::from_config(&EngineConfig::default())
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            processing_time: config.processing_time(),
            command_buffer: config.command_buffer,
            snapshot_buffer: config.snapshot_buffer,
            notifiers: Vec::new(),
        }
    }

    /// 设置订单处理时长
    pub fn processing_time(mut self, processing_time: Duration) -> Self {
        self.processing_time = processing_time;
        self
    }

    /// 设置请求通道容量
    pub fn command_buffer(mut self, command_buffer: usize) -> Self {
        self.command_buffer = command_buffer;
        self
    }

    /// 设置快照广播容量
    pub fn snapshot_buffer(mut self, snapshot_buffer: usize) -> Self {
        self.snapshot_buffer = snapshot_buffer;
        self
    }

    /// 注册额外的快照接收端
    pub fn register_notifier(mut self, notifier: Arc<dyn NotificationPort>) -> Self {
        info!("注册快照接收端: {}", notifier.name());
        self.notifiers.push(notifier);
        self
    }

    /// 构建派发服务及其句柄
    pub fn build(self) -> (DispatchService, DispatchHandle) {
        let broadcaster = Arc::new(BroadcastNotifier::new(self.snapshot_buffer));

        let mut composite = CompositeNotifier::new(vec![
            broadcaster.clone() as Arc<dyn NotificationPort>,
            Arc::new(TracingNotifier),
        ]);
        for notifier in self.notifiers {
            composite.add_notifier(notifier);
        }

        let (engine, completions) = DispatchEngine::new(self.processing_time, Arc::new(composite));
        let (sender, requests) = mpsc::channel(self.command_buffer.max(1));

        (
            DispatchService {
                engine,
                completions,
                requests,
                broadcaster,
            },
            DispatchHandle { sender },
        )
    }
}

impl Default for DispatchServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 派发引擎的事件循环
///
/// 外部请求和计时器到期事件都在这里串行处理。
pub struct DispatchService {
    engine: DispatchEngine,
    completions: mpsc::UnboundedReceiver<CompletionDue>,
    requests: mpsc::Receiver<DispatchRequest>,
    broadcaster: Arc<BroadcastNotifier>,
}

impl DispatchService {
    pub fn builder() -> DispatchServiceBuilder {
        DispatchServiceBuilder::new()
    }

    /// 在后台任务中运行，所有句柄释放后退出
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run(std::future::pending()))
    }

    /// 运行事件循环，直到 `shutdown` 完成或所有句柄被释放
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        info!(
            "派发引擎启动，订单处理时长: {:?}",
            self.engine.processing_time()
        );
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("收到关闭信号，派发引擎停止");
                    break;
                }
                Some(due) = self.completions.recv() => {
                    self.on_completion(due);
                }
                request = self.requests.recv() => match request {
                    Some(request) => self.handle_request(request),
                    None => {
                        info!("所有派发句柄已释放，派发引擎停止");
                        break;
                    }
                },
            }
        }

        self.engine.shutdown();
        info!("派发引擎已停止");
    }

    fn on_completion(&mut self, due: CompletionDue) {
        match self.engine.handle_completion(due) {
            Ok(order) => debug!("订单 {} 完成事件已处理", order.id),
            Err(e) if e.is_noop() => debug!("{}", e),
            Err(e) => error!("处理完成事件失败: {}", e),
        }
    }

    fn handle_request(&mut self, request: DispatchRequest) {
        // 请求方放弃等待时应答发送失败，忽略即可
        match request {
            DispatchRequest::SubmitOrder { priority, reply } => {
                let _ = reply.send(self.engine.submit_order(priority));
            }
            DispatchRequest::AddBot { reply } => {
                let _ = reply.send(self.engine.add_bot());
            }
            DispatchRequest::RemoveBot { reply } => {
                let _ = reply.send(self.engine.remove_bot());
            }
            DispatchRequest::OrdersSnapshot { reply } => {
                let _ = reply.send(self.engine.orders_snapshot());
            }
            DispatchRequest::BotsSnapshot { reply } => {
                let _ = reply.send(self.engine.bots_snapshot());
            }
            DispatchRequest::GetOrder { order_id, reply } => {
                let _ = reply.send(self.engine.order(order_id));
            }
            DispatchRequest::Stats { reply } => {
                let _ = reply.send(self.engine.stats());
            }
            DispatchRequest::Subscribe { reply } => {
                let receiver = self.broadcaster.subscribe();
                let orders = self.engine.orders_snapshot();
                debug!(
                    "新的快照订阅者，当前订阅者数: {}",
                    self.broadcaster.subscriber_count()
                );
                let _ = reply.send(Subscription { orders, receiver });
            }
        }
    }
}

/// 派发服务句柄，可克隆并在多个任务间共享
#[derive(Clone)]
pub struct DispatchHandle {
    sender: mpsc::Sender<DispatchRequest>,
}

impl DispatchHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> DispatchRequest,
    ) -> DispatchResult<T> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| DispatchError::EngineUnavailable)?;
        response.await.map_err(|_| DispatchError::EngineUnavailable)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[async_trait]
impl OrderDispatchService for DispatchHandle {
    async fn submit_order(&self, priority: OrderPriority) -> DispatchResult<Order> {
        self.request(|reply| DispatchRequest::SubmitOrder { priority, reply })
            .await
    }

    async fn add_bot(&self) -> DispatchResult<Bot> {
        self.request(|reply| DispatchRequest::AddBot { reply }).await
    }

    async fn remove_bot(&self) -> DispatchResult<Option<Bot>> {
        self.request(|reply| DispatchRequest::RemoveBot { reply }).await
    }

    async fn orders_snapshot(&self) -> DispatchResult<OrdersSnapshot> {
        self.request(|reply| DispatchRequest::OrdersSnapshot { reply })
            .await
    }

    async fn bots_snapshot(&self) -> DispatchResult<BotsSnapshot> {
        self.request(|reply| DispatchRequest::BotsSnapshot { reply })
            .await
    }

    async fn get_order(&self, order_id: OrderId) -> DispatchResult<Option<Order>> {
        self.request(|reply| DispatchRequest::GetOrder { order_id, reply })
            .await
    }

    async fn stats(&self) -> DispatchResult<DispatchStats> {
        self.request(|reply| DispatchRequest::Stats { reply }).await
    }

    async fn subscribe(&self) -> DispatchResult<Subscription> {
        self.request(|reply| DispatchRequest::Subscribe { reply })
            .await
    }
}
